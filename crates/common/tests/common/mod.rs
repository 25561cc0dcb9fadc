//! Shared test utilities for lister integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use common::lister::DirectoryLister;
use tempfile::TempDir;

/// Write `contents` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Set up a storage root laid out like a real share:
///
/// ```text
/// family/040124/scan.pdf
/// family/040124/voice.m4a
/// family/123123/
/// family/notes.txt
/// friends/010224/secret.txt
/// ```
pub async fn setup_storage() -> (DirectoryLister, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    write_file(root, "family/040124/scan.pdf", b"%PDF-1.4");
    write_file(root, "family/040124/voice.m4a", b"audio");
    fs::create_dir_all(root.join("family/123123")).unwrap();
    write_file(root, "family/notes.txt", b"notes");
    write_file(root, "friends/010224/secret.txt", b"secret");

    let lister = DirectoryLister::new(root).await.unwrap();
    (lister, temp_dir)
}
