//! Integration tests for directory listing

mod common;

use crate::common::setup_storage;
use ::common::guard::RequestedPath;
use ::common::lister::{DirectoryEntry, ListError, Listing};

fn names(listing: &Listing) -> Vec<&str> {
    match listing {
        Listing::Directory(entries) => entries.iter().map(|e| e.name()).collect(),
        Listing::File(path) => panic!("expected a directory, got file {}", path.display()),
    }
}

#[tokio::test]
async fn test_list_directory_root() {
    let (lister, _temp) = setup_storage().await;

    let listing = lister.list(&RequestedPath::parse("family")).await.unwrap();
    // date folders oldest first, then files
    assert_eq!(names(&listing), vec!["123123", "040124", "notes.txt"]);

    match listing {
        Listing::Directory(entries) => {
            assert!(entries[0].is_folder());
            assert!(entries[1].is_folder());
            assert_eq!(
                entries[2],
                DirectoryEntry::File {
                    name: "notes.txt".to_string()
                }
            );
        }
        Listing::File(_) => unreachable!(),
    }
}

#[tokio::test]
async fn test_list_date_folder() {
    let (lister, _temp) = setup_storage().await;

    let listing = lister
        .list(&RequestedPath::parse("family/040124/"))
        .await
        .unwrap();
    assert_eq!(names(&listing), vec!["scan.pdf", "voice.m4a"]);
}

#[tokio::test]
async fn test_list_empty_folder() {
    let (lister, _temp) = setup_storage().await;

    let listing = lister
        .list(&RequestedPath::parse("family/123123"))
        .await
        .unwrap();
    assert_eq!(listing, Listing::Directory(vec![]));
}

#[tokio::test]
async fn test_list_file() {
    let (lister, temp) = setup_storage().await;

    let listing = lister
        .list(&RequestedPath::parse("family/040124/scan.pdf"))
        .await
        .unwrap();

    let expected = temp
        .path()
        .join("family/040124/scan.pdf")
        .canonicalize()
        .unwrap();
    assert_eq!(listing, Listing::File(expected));
}

#[tokio::test]
async fn test_list_missing_path() {
    let (lister, _temp) = setup_storage().await;

    for raw in ["family/999999", "family/040124/missing.pdf", "nobody"] {
        let result = lister.list(&RequestedPath::parse(raw)).await;
        assert!(matches!(result, Err(ListError::NotFound)), "{}", raw);
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_list_follows_symlinks_inside_directory() {
    let (lister, temp) = setup_storage().await;
    std::os::unix::fs::symlink(
        temp.path().join("family/040124"),
        temp.path().join("family/latest"),
    )
    .unwrap();

    let listing = lister.list(&RequestedPath::parse("family")).await.unwrap();
    assert_eq!(names(&listing), vec!["123123", "040124", "latest", "notes.txt"]);

    let listing = lister
        .list(&RequestedPath::parse("family/latest"))
        .await
        .unwrap();
    assert_eq!(names(&listing), vec!["scan.pdf", "voice.m4a"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_list_skips_dangling_symlinks() {
    let (lister, temp) = setup_storage().await;
    std::os::unix::fs::symlink(
        temp.path().join("family/gone.pdf"),
        temp.path().join("family/040124/broken.pdf"),
    )
    .unwrap();

    let listing = lister
        .list(&RequestedPath::parse("family/040124"))
        .await
        .unwrap();
    assert_eq!(names(&listing), vec!["scan.pdf", "voice.m4a"]);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_list_skips_names_that_cannot_be_linked() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let (lister, temp) = setup_storage().await;
    let folder = temp.path().join("family/040124");
    std::fs::write(folder.join("back\\slash.txt"), b"x").unwrap();
    std::fs::write(folder.join(OsStr::from_bytes(b"bad\xff.txt")), b"x").unwrap();

    let listing = lister
        .list(&RequestedPath::parse("family/040124"))
        .await
        .unwrap();
    assert_eq!(names(&listing), vec!["scan.pdf", "voice.m4a"]);
}
