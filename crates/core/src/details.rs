//! File and directory details returned by lookups.

use crate::version::compare_versions;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::OffsetDateTime;

/// Details of a stored resource.
///
/// Directory listings distinguish full directory details (with children)
/// from the lightweight entries nested inside another listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileDetails {
    File(DocumentInfo),
    Directory(DirectoryInfo),
    SimpleDirectory(SimpleDirectoryInfo),
}

/// A single stored file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub name: String,
    /// MIME type guessed from the file extension.
    pub content_type: String,
    pub content_length: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
}

/// A directory with its immediate children.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectoryInfo {
    pub name: String,
    pub files: Vec<FileDetails>,
}

/// A directory entry nested inside another listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimpleDirectoryInfo {
    pub name: String,
}

impl FileDetails {
    pub fn name(&self) -> &str {
        match self {
            Self::File(info) => &info.name,
            Self::Directory(info) => &info.name,
            Self::SimpleDirectory(info) => &info.name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_) | Self::SimpleDirectory(_))
    }
}

impl DocumentInfo {
    /// Build document details for a file name, guessing the content type
    /// from its extension.
    pub fn new(name: &str, content_length: u64, last_modified: OffsetDateTime) -> Self {
        Self {
            name: name.to_string(),
            content_type: mime_guess::from_path(name)
                .first_or_octet_stream()
                .to_string(),
            content_length,
            last_modified,
        }
    }
}

impl DirectoryInfo {
    /// Build a directory listing with entries in canonical order:
    /// directories first, then version-aware by name.
    pub fn new(name: &str, mut files: Vec<FileDetails>) -> Self {
        files.sort_by(compare_file_details);
        Self {
            name: name.to_string(),
            files,
        }
    }
}

/// Canonical listing order: directories before files, then version-aware
/// name comparison.
pub fn compare_file_details(a: &FileDetails, b: &FileDetails) -> Ordering {
    match (a.is_directory(), b.is_directory()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_versions(a.name(), b.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> FileDetails {
        FileDetails::File(DocumentInfo::new(name, 0, OffsetDateTime::UNIX_EPOCH))
    }

    fn dir(name: &str) -> FileDetails {
        FileDetails::SimpleDirectory(SimpleDirectoryInfo {
            name: name.to_string(),
        })
    }

    #[test]
    fn listing_sorts_directories_first_then_by_version() {
        let listing = DirectoryInfo::new(
            "app",
            vec![doc("maven-metadata.xml"), dir("1.0.10"), dir("1.0.2")],
        );

        let names: Vec<&str> = listing.files.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["1.0.2", "1.0.10", "maven-metadata.xml"]);
    }

    #[test]
    fn document_info_guesses_content_type() {
        let info = DocumentInfo::new("app-1.0.0.jar", 10, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(info.content_type, "application/java-archive");

        let fallback = DocumentInfo::new("app-1.0.0.unknownext", 10, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(fallback.content_type, "application/octet-stream");
    }

    #[test]
    fn details_serialize_with_type_tag() {
        let json = serde_json::to_value(dir("1.0.0")).unwrap();
        assert_eq!(json["type"], "SIMPLE_DIRECTORY");
        assert_eq!(json["name"], "1.0.0");
    }
}
