//! Schema Registry
//!
//! Collects the three MEDS schemas under stable names and writes them to disk
//! as JSON, optionally with a `checksums.sha256` manifest.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_schema::{DataType, SchemaRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checksum::Checksum;
use crate::config::{MedsConfig, OutputFormat};
use crate::descriptor::describe_schema;
use crate::error::{Result, SchemaError};
use crate::label::label_schema;
use crate::metadata::dataset_metadata_schema;
use crate::patient::patient_schema;

/// Name of the checksum manifest written next to exported schemas
pub const CHECKSUMS_FILE: &str = "checksums.sha256";

pub const PATIENT: &str = "patient";
pub const LABEL: &str = "label";
pub const DATASET_METADATA: &str = "dataset_metadata";

/// How a schema is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Arrow schema, exported through [`describe_schema`]
    Columnar,
    /// JSON Schema document
    JsonSchema,
}

impl SchemaKind {
    /// Get the file extension for this schema kind
    pub fn extension(&self) -> &'static str {
        match self {
            SchemaKind::Columnar => "arrow.json",
            SchemaKind::JsonSchema => "schema.json",
        }
    }
}

/// A named schema rendered as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    pub kind: SchemaKind,
    pub content: Value,
    pub checksum: Checksum,
}

impl SchemaEntry {
    pub fn new(name: impl Into<String>, kind: SchemaKind, content: Value) -> Self {
        let checksum = Checksum::from_json(&content);
        Self {
            name: name.into(),
            kind,
            content,
            checksum,
        }
    }

    /// Get the filename for this schema
    pub fn filename(&self) -> String {
        format!("{}.{}", self.name, self.kind.extension())
    }

    /// Verify the checksum matches the content
    pub fn verify_checksum(&self) -> bool {
        self.checksum.verify_json(&self.content)
    }
}

/// The MEDS schemas for one choice of per-measurement metadata type
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    patient: SchemaRef,
    label: SchemaRef,
    dataset_metadata: Value,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(DataType::Null)
    }
}

impl SchemaRegistry {
    pub fn new(per_event_metadata: DataType) -> Self {
        Self {
            patient: Arc::new(patient_schema(per_event_metadata)),
            label: Arc::new(label_schema()),
            dataset_metadata: dataset_metadata_schema(),
        }
    }

    pub fn from_config(config: &MedsConfig) -> Self {
        Self::new(config.patient.per_event_metadata.clone())
    }

    pub fn patient_schema(&self) -> SchemaRef {
        Arc::clone(&self.patient)
    }

    pub fn label_schema(&self) -> SchemaRef {
        Arc::clone(&self.label)
    }

    pub fn dataset_metadata_schema(&self) -> &Value {
        &self.dataset_metadata
    }

    /// All schemas, in export order
    pub fn entries(&self) -> Vec<SchemaEntry> {
        vec![
            SchemaEntry::new(PATIENT, SchemaKind::Columnar, describe_schema(&self.patient)),
            SchemaEntry::new(LABEL, SchemaKind::Columnar, describe_schema(&self.label)),
            SchemaEntry::new(
                DATASET_METADATA,
                SchemaKind::JsonSchema,
                self.dataset_metadata.clone(),
            ),
        ]
    }

    /// Get a schema by name
    pub fn get(&self, name: &str) -> Option<SchemaEntry> {
        self.entries().into_iter().find(|e| e.name == name)
    }

    /// Write every schema into `dir`, returning the paths written
    pub fn export_to(
        &self,
        dir: impl AsRef<Path>,
        format: OutputFormat,
        include_checksums: bool,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        let mut manifest = String::new();

        for entry in self.entries() {
            let path = dir.join(entry.filename());
            fs::write(&path, format.to_json(&entry.content)?)?;
            tracing::info!(schema = %entry.name, path = %path.display(), "exported schema");

            manifest.push_str(&format!("{}  {}\n", entry.checksum, entry.filename()));
            written.push(path);
        }

        if include_checksums {
            let path = dir.join(CHECKSUMS_FILE);
            fs::write(&path, manifest)?;
            written.push(path);
        }

        Ok(written)
    }
}

/// Check an export directory against its checksum manifest.
///
/// The manifest must list exactly the files [`SchemaRegistry::entries`]
/// produces. Fails with [`SchemaError::ChecksumMismatch`] on the first file
/// whose content no longer matches.
pub fn check_export(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    let manifest_path = dir.join(CHECKSUMS_FILE);
    if !manifest_path.exists() {
        return Err(SchemaError::MissingFile(manifest_path));
    }

    let expected_files: Vec<String> = SchemaRegistry::default()
        .entries()
        .iter()
        .map(SchemaEntry::filename)
        .collect();

    let mut listed: HashMap<String, String> = HashMap::new();
    for line in fs::read_to_string(&manifest_path)?.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (checksum, filename) = line.split_once("  ").ok_or_else(|| {
            SchemaError::InvalidFormat(format!("bad line in {}: {}", CHECKSUMS_FILE, line))
        })?;
        if !expected_files.iter().any(|f| f == filename) {
            return Err(SchemaError::InvalidFormat(format!(
                "unexpected file in {}: {}",
                CHECKSUMS_FILE, filename
            )));
        }
        listed.insert(filename.to_string(), checksum.to_string());
    }

    for filename in &expected_files {
        let path = dir.join(filename);
        let expected = listed
            .get(filename)
            .ok_or_else(|| SchemaError::InvalidFormat(format!(
                "{} is not listed in {}",
                filename, CHECKSUMS_FILE
            )))?;
        if !path.exists() {
            return Err(SchemaError::MissingFile(path));
        }

        let content: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        let actual = Checksum::from_json(&content);
        if actual.as_str() != expected.as_str() {
            return Err(SchemaError::ChecksumMismatch {
                name: filename.clone(),
                expected: expected.clone(),
                actual: actual.to_string(),
            });
        }
        tracing::debug!(file = %filename, "checksum ok");
    }

    Ok(())
}

/// Like [`check_export`], but reports a mismatch as `Ok(false)`
pub fn verify_export(dir: impl AsRef<Path>) -> Result<bool> {
    match check_export(dir) {
        Ok(()) => Ok(true),
        Err(SchemaError::ChecksumMismatch { name, expected, actual }) => {
            tracing::warn!(%name, %expected, %actual, "checksum mismatch");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries() {
        let registry = SchemaRegistry::default();
        let names: Vec<String> = registry.entries().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec![PATIENT, LABEL, DATASET_METADATA]);

        let metadata = registry.get(DATASET_METADATA).unwrap();
        assert_eq!(metadata.kind, SchemaKind::JsonSchema);
        assert_eq!(metadata.filename(), "dataset_metadata.schema.json");
        assert!(metadata.verify_checksum());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_metadata_type_changes_patient_checksum_only() {
        let plain = SchemaRegistry::default();
        let custom = SchemaRegistry::new(DataType::Utf8);

        assert_ne!(
            plain.get(PATIENT).unwrap().checksum,
            custom.get(PATIENT).unwrap().checksum
        );
        assert_eq!(
            plain.get(LABEL).unwrap().checksum,
            custom.get(LABEL).unwrap().checksum
        );
    }

    fn exported() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        SchemaRegistry::default()
            .export_to(dir.path(), OutputFormat::Compact, true)
            .unwrap();
        dir
    }

    fn rewrite_manifest(dir: &Path, edit: impl Fn(&str) -> Option<String>) {
        let path = dir.join(CHECKSUMS_FILE);
        let manifest: String = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .filter_map(|line| edit(line))
            .map(|line| line + "\n")
            .collect();
        fs::write(path, manifest).unwrap();
    }

    #[test]
    fn test_removed_schema_fails_check() {
        let dir = exported();
        fs::remove_file(dir.path().join("patient.arrow.json")).unwrap();
        rewrite_manifest(dir.path(), |line| {
            (!line.ends_with("patient.arrow.json")).then(|| line.to_string())
        });

        assert!(matches!(check_export(dir.path()), Err(SchemaError::InvalidFormat(_))));
        assert!(verify_export(dir.path()).is_err());
    }

    #[test]
    fn test_empty_manifest_fails_check() {
        let dir = exported();
        rewrite_manifest(dir.path(), |_| None);
        assert!(check_export(dir.path()).is_err());
    }

    #[test]
    fn test_paths_outside_export_are_rejected() {
        let dir = exported();
        rewrite_manifest(dir.path(), |line| {
            Some(line.replace("label.arrow.json", "../label.arrow.json"))
        });

        match check_export(dir.path()) {
            Err(SchemaError::InvalidFormat(message)) => {
                assert!(message.contains("../label.arrow.json"), "{}", message)
            }
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_schema_file_with_manifest_line() {
        let dir = exported();
        fs::remove_file(dir.path().join("label.arrow.json")).unwrap();
        assert!(matches!(check_export(dir.path()), Err(SchemaError::MissingFile(_))));
    }

    #[test]
    fn test_from_config() {
        let mut config = MedsConfig::default();
        config.patient.per_event_metadata = DataType::Int64;
        let registry = SchemaRegistry::from_config(&config);
        assert_eq!(registry.patient_schema().as_ref(), &patient_schema(DataType::Int64));
    }
}
