//! Display shaping for directory listings.
//!
//! Turns resolved entries into the labels, icons and links a listing
//! page shows. Markup lives with the HTTP server's templates; nothing
//! here produces HTML.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use url::Url;

use crate::lister::DirectoryEntry;
use crate::verify::LETTERS_PREFIX;

static HREF_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").expect("static base url is valid"));

/// Interpret a folder name as an `MMDDYY` date in the 2000s.
///
/// Returns `None` unless the name is exactly six ASCII digits that
/// form a real calendar date.
pub fn parse_date_folder(name: &str) -> Option<NaiveDate> {
    if name.len() != 6 || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let month: u32 = name[0..2].parse().ok()?;
    let day: u32 = name[2..4].parse().ok()?;
    let year: i32 = name[4..6].parse().ok()?;

    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Long form label for a date folder ("April 1st, 2024"); any other
/// name comes back unchanged.
pub fn format_date_folder(name: &str) -> String {
    match parse_date_folder(name) {
        Some(date) => format!(
            "{} {}, {}",
            date.format("%B"),
            ordinal(date.day()),
            date.year()
        ),
        None => name.to_string(),
    }
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileIcon {
    Folder,
    Document,
    Audio,
    Image,
    Video,
    Attachment,
}

impl FileIcon {
    /// Pick an icon from the text after the last `.` in `name`
    pub fn for_file_name(name: &str) -> Self {
        let extension = name.rsplit('.').next().unwrap_or_default().to_lowercase();
        match extension.as_str() {
            "txt" | "pdf" | "doc" | "docx" => FileIcon::Document,
            "mp3" | "m4a" | "wav" => FileIcon::Audio,
            "jpg" | "jpeg" | "png" | "gif" => FileIcon::Image,
            "mp4" | "mov" => FileIcon::Video,
            _ => FileIcon::Attachment,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            FileIcon::Folder => "📁",
            FileIcon::Document => "📄",
            FileIcon::Audio => "🎵",
            FileIcon::Image => "🖼️",
            FileIcon::Video => "🎬",
            FileIcon::Attachment => "📎",
        }
    }
}

/// Absolute, percent-encoded browsing link for a path under `/letters`
pub fn letters_href<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = HREF_BASE.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear()
            .push(LETTERS_PREFIX.trim_start_matches('/'))
            .extend(segments);
    }
    url.path().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackLink {
    pub href: String,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub href: String,
    pub label: String,
    pub icon: FileIcon,
    /// Files open in a new tab, folders navigate in place
    pub opens_in_new_tab: bool,
}

/// Everything a listing page needs, minus the markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingView {
    pub heading: String,
    pub description: &'static str,
    pub back: BackLink,
    pub entries: Vec<RenderedEntry>,
    pub empty_message: &'static str,
}

impl ListingView {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shape a listing of `directory/subpath` for display.
pub fn render(directory: &str, subpath: &[String], entries: &[DirectoryEntry]) -> ListingView {
    let is_root = subpath.is_empty();

    let rendered = entries
        .iter()
        .map(|entry| {
            let href = letters_href(
                std::iter::once(directory)
                    .chain(subpath.iter().map(String::as_str))
                    .chain(std::iter::once(entry.name())),
            );
            match entry {
                DirectoryEntry::Folder { name } => RenderedEntry {
                    href,
                    label: format_date_folder(name),
                    icon: FileIcon::Folder,
                    opens_in_new_tab: false,
                },
                DirectoryEntry::File { name } => RenderedEntry {
                    href,
                    label: name.clone(),
                    icon: FileIcon::for_file_name(name),
                    opens_in_new_tab: true,
                },
            }
        })
        .collect();

    let back = match subpath {
        [] => BackLink {
            href: "/".to_string(),
            label: "← back",
        },
        [_] => BackLink {
            href: letters_href([directory]),
            label: "← back to all dates",
        },
        [parents @ .., _] => BackLink {
            href: letters_href(
                std::iter::once(directory).chain(parents.iter().map(String::as_str)),
            ),
            label: "← back",
        },
    };

    let heading = match subpath.first() {
        None => format!("letters for {}", directory),
        Some(date_folder) => format!("letters from {}", format_date_folder(date_folder)),
    };

    ListingView {
        heading,
        description: if is_root {
            "your collection of letters, scans, and recordings"
        } else {
            "files from this date"
        },
        back,
        entries: rendered,
        empty_message: if is_root {
            "No dates yet."
        } else {
            "No files yet."
        },
    }
}
