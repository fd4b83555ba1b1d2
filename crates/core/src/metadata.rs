//! Maven metadata model and XML codec.
//!
//! Mirrors the `maven-metadata.xml` document: a `<metadata>` root with GAV
//! coordinates and a `<versioning>` block carrying release/latest pointers,
//! the version list, and snapshot descriptors.

use crate::error::{Error, Result};
use crate::version::compare_versions;
use serde::{Deserialize, Serialize};

/// Canonical metadata file name at the GAV directory level.
pub const METADATA_FILE: &str = "maven-metadata.xml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "metadata", rename_all = "camelCase")]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    /// Present for snapshot metadata only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioning: Option<Versioning>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Versioning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Versions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_versions: Option<SnapshotVersions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Wrapper for the `<versions>` element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Versions {
    #[serde(rename = "version", default)]
    pub versions: Vec<String>,
}

/// Wrapper for the `<snapshotVersions>` element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotVersions {
    #[serde(rename = "snapshotVersion", default)]
    pub snapshot_versions: Vec<SnapshotVersion>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_copy: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl Metadata {
    /// Serialize to `maven-metadata.xml` content.
    pub fn to_xml(&self) -> Result<String> {
        let body = quick_xml::se::to_string(self)
            .map_err(|e| Error::MetadataCodec(format!("serialize failed: {e}")))?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}"))
    }

    /// Parse from `maven-metadata.xml` content.
    pub fn from_xml(content: &str) -> Result<Self> {
        quick_xml::de::from_str(content)
            .map_err(|e| Error::MetadataCodec(format!("parse failed: {e}")))
    }

    /// Version list, in document order.
    pub fn versions(&self) -> &[String] {
        self.versioning
            .as_ref()
            .and_then(|v| v.versions.as_ref())
            .map(|v| v.versions.as_slice())
            .unwrap_or_default()
    }

    /// Snapshot version entries, in document order.
    pub fn snapshot_versions(&self) -> &[SnapshotVersion] {
        self.versioning
            .as_ref()
            .and_then(|v| v.snapshot_versions.as_ref())
            .map(|v| v.snapshot_versions.as_slice())
            .unwrap_or_default()
    }

    /// Sort the version and snapshot-version lists ascending with the
    /// version-aware comparator, and refresh the `latest` pointer unless
    /// explicitly pinned.
    pub fn normalized(mut self) -> Self {
        if let Some(versioning) = self.versioning.as_mut() {
            if let Some(versions) = versioning.versions.as_mut() {
                versions
                    .versions
                    .sort_by(|a, b| compare_versions(a, b));
                if versioning.latest.is_none() {
                    versioning.latest = versions.versions.last().cloned();
                }
            }
            if let Some(snapshots) = versioning.snapshot_versions.as_mut() {
                snapshots.snapshot_versions.sort_by(|a, b| {
                    compare_versions(
                        a.value.as_deref().unwrap_or_default(),
                        b.value.as_deref().unwrap_or_default(),
                    )
                });
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Metadata {
        Metadata {
            group_id: Some("com.example".to_string()),
            artifact_id: Some("app".to_string()),
            version: None,
            versioning: Some(Versioning {
                release: Some("1.0.2".to_string()),
                latest: None,
                versions: Some(Versions {
                    versions: vec![
                        "1.0.2".to_string(),
                        "1.0.0".to_string(),
                        "1.0.1".to_string(),
                    ],
                }),
                snapshot: None,
                snapshot_versions: None,
                last_updated: Some("20240101000000".to_string()),
            }),
        }
    }

    #[test]
    fn xml_roundtrip() {
        let metadata = sample().normalized();
        let xml = metadata.to_xml().unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<groupId>com.example</groupId>"));
        assert!(xml.contains("<version>1.0.0</version>"));

        let parsed = Metadata::from_xml(&xml).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn normalized_sorts_versions_and_sets_latest() {
        let metadata = sample().normalized();
        assert_eq!(metadata.versions(), &["1.0.0", "1.0.1", "1.0.2"]);
        assert_eq!(
            metadata.versioning.as_ref().unwrap().latest.as_deref(),
            Some("1.0.2")
        );
    }

    #[test]
    fn normalized_keeps_pinned_latest() {
        let mut metadata = sample();
        metadata.versioning.as_mut().unwrap().latest = Some("1.0.1".to_string());
        let metadata = metadata.normalized();
        assert_eq!(
            metadata.versioning.as_ref().unwrap().latest.as_deref(),
            Some("1.0.1")
        );
    }

    #[test]
    fn parses_snapshot_manifest() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>com.example</groupId>
  <artifactId>app</artifactId>
  <version>1.0.0-SNAPSHOT</version>
  <versioning>
    <snapshot>
      <timestamp>20240102.030405</timestamp>
      <buildNumber>3</buildNumber>
    </snapshot>
    <snapshotVersions>
      <snapshotVersion>
        <extension>jar</extension>
        <value>1.0.0-20240102.030405-3</value>
      </snapshotVersion>
      <snapshotVersion>
        <classifier>sources</classifier>
        <extension>jar</extension>
        <value>1.0.0-20240102.030405-3</value>
      </snapshotVersion>
    </snapshotVersions>
  </versioning>
</metadata>"#;

        let metadata = Metadata::from_xml(xml).unwrap();
        assert_eq!(metadata.version.as_deref(), Some("1.0.0-SNAPSHOT"));
        assert_eq!(metadata.snapshot_versions().len(), 2);
        let snapshot = metadata
            .versioning
            .as_ref()
            .unwrap()
            .snapshot
            .as_ref()
            .unwrap();
        assert_eq!(snapshot.build_number, Some(3));
    }

    #[test]
    fn empty_metadata_has_no_versions() {
        let metadata = Metadata::default();
        assert!(metadata.versions().is_empty());
        assert!(metadata.snapshot_versions().is_empty());
    }
}
