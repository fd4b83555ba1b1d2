//! Normalized hierarchical storage paths.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A normalized, slash-separated path identifying a resource within a
/// repository's storage space.
///
/// Construction is the only place validation happens: a `Location` never
/// contains `.`/`..` segments, backslashes, or empty segments, and can
/// therefore be joined onto a storage root without escaping it.
/// Normalization is deterministic, so the same logical path always produces
/// the same `Location`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    /// The root location (empty path).
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parse and normalize a raw path.
    ///
    /// Duplicate and surrounding slashes are collapsed; traversal segments
    /// are rejected rather than resolved.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.contains('\\') {
            return Err(Error::InvalidLocation(format!(
                "backslashes not allowed: {raw}"
            )));
        }
        if raw.contains('\0') {
            return Err(Error::InvalidLocation("NUL byte in path".to_string()));
        }

        let mut segments = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" => continue,
                "." | ".." => {
                    return Err(Error::InvalidLocation(format!(
                        "traversal segment not allowed: {raw}"
                    )));
                }
                other => segments.push(other),
            }
        }

        Ok(Self(segments.join("/")))
    }

    /// Whether this is the root (empty) location.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Append a relative path. The appended part goes through the same
    /// normalization as `parse`.
    pub fn join(&self, child: &str) -> Result<Self> {
        let child = Self::parse(child)?;
        if self.is_root() {
            return Ok(child);
        }
        if child.is_root() {
            return Ok(self.clone());
        }
        Ok(Self(format!("{}/{}", self.0, child.0)))
    }

    /// Parent location, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Final path segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        })
    }

    /// Extension of the final segment (without the dot), if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        name.rfind('.').map(|idx| &name[idx + 1..])
    }

    /// Resolve this location under a filesystem root.
    ///
    /// Safe by construction: segments were validated at parse time.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.segments() {
            path.push(segment);
        }
        path
    }

    /// Whether this location starts with the given prefix on a segment
    /// boundary. Every location starts with the root.
    pub fn starts_with(&self, prefix: &Location) -> bool {
        if prefix.is_root() {
            return true;
        }
        self.0 == prefix.0
            || (self.0.len() > prefix.0.len()
                && self.0.starts_with(&prefix.0)
                && self.0.as_bytes()[prefix.0.len()] == b'/')
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Location {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_slashes() {
        let location = Location::parse("/com//example/app/").unwrap();
        assert_eq!(location.as_str(), "com/example/app");
        // Same logical path, same Location.
        assert_eq!(location, Location::parse("com/example/app").unwrap());
    }

    #[test]
    fn parse_rejects_traversal() {
        assert!(Location::parse("../escape").is_err());
        assert!(Location::parse("foo/../bar").is_err());
        assert!(Location::parse("foo/./bar").is_err());
        assert!(Location::parse("foo\\bar").is_err());
    }

    #[test]
    fn join_and_parent() {
        let gav = Location::parse("com/example/app/1.0.0").unwrap();
        let file = gav.join("app-1.0.0.jar").unwrap();
        assert_eq!(file.as_str(), "com/example/app/1.0.0/app-1.0.0.jar");
        assert_eq!(file.parent().unwrap(), gav);
        assert_eq!(file.file_name(), Some("app-1.0.0.jar"));
        assert_eq!(file.extension(), Some("jar"));
    }

    #[test]
    fn join_rejects_traversal() {
        let base = Location::parse("releases").unwrap();
        assert!(base.join("../private").is_err());
    }

    #[test]
    fn root_behaviour() {
        let root = Location::root();
        assert!(root.is_root());
        assert!(root.parent().is_none());
        assert!(root.file_name().is_none());
        assert_eq!(root.join("a/b").unwrap().as_str(), "a/b");
    }

    #[test]
    fn starts_with_segment_boundary() {
        let a = Location::parse("com/example/app").unwrap();
        let prefix = Location::parse("com/example").unwrap();
        let not_prefix = Location::parse("com/exam").unwrap();
        assert!(a.starts_with(&prefix));
        assert!(!a.starts_with(&not_prefix));
        assert!(a.starts_with(&Location::root()));
    }

    #[test]
    fn to_path_stays_under_root() {
        let location = Location::parse("g/a/1.0/a-1.0.jar").unwrap();
        let path = location.to_path(Path::new("/srv/repo"));
        assert_eq!(path, PathBuf::from("/srv/repo/g/a/1.0/a-1.0.jar"));
    }
}
