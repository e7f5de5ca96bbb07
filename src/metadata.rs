//! Dataset metadata schema
//!
//! Provenance and code descriptions for a whole dataset, stored as a single
//! JSON document named [`METADATA_FILE_NAME`] at the dataset root.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::{Draft, JSONSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::OutputFormat;
use crate::error::{Result, SchemaError};

/// File name of the metadata document within a dataset folder
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// JSON Schema for a single code description
pub fn code_metadata_entry_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "description": {"type": "string"},
            "parent_codes": {"type": "array", "items": {"type": "string"}}
        }
    })
}

/// JSON Schema for the code description map, keyed by code
pub fn code_metadata_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": code_metadata_entry_schema()
    })
}

/// JSON Schema for `metadata.json`. Every property is optional.
pub fn dataset_metadata_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "dataset_name": {"type": "string"},
            "dataset_version": {"type": "string"},
            "etl_name": {"type": "string"},
            "etl_version": {"type": "string"},
            "code_metadata": code_metadata_schema()
        }
    })
}

/// Description of a single code and its ancestors in the code hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMetadataEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_codes: Vec<String>,
}

impl CodeMetadataEntry {
    pub fn new(description: impl Into<String>, parent_codes: Vec<String>) -> Self {
        Self {
            description: description.into(),
            parent_codes,
        }
    }
}

/// Code descriptions keyed by code. Keys need not appear in the patient data.
pub type CodeMetadata = BTreeMap<String, CodeMetadataEntry>;

/// Contents of `metadata.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etl_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etl_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_metadata: Option<CodeMetadata>,
}

impl DatasetMetadata {
    /// Path of the metadata document inside `dataset_root`
    pub fn path_in(dataset_root: impl AsRef<Path>) -> PathBuf {
        dataset_root.as_ref().join(METADATA_FILE_NAME)
    }

    /// Read, validate and parse `metadata.json` from a dataset folder
    pub fn load(dataset_root: impl AsRef<Path>) -> Result<Self> {
        let path = Self::path_in(dataset_root);
        if !path.exists() {
            return Err(SchemaError::MissingFile(path));
        }

        tracing::debug!(path = %path.display(), "loading dataset metadata");
        let document: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        MetadataValidator::new()?.validate(&document)?;
        Ok(serde_json::from_value(document)?)
    }

    /// Write `metadata.json` into a dataset folder, returning its path
    pub fn save(&self, dataset_root: impl AsRef<Path>, format: OutputFormat) -> Result<PathBuf> {
        let path = Self::path_in(dataset_root);
        fs::write(&path, format.to_json(self)?)?;
        tracing::info!(path = %path.display(), "wrote dataset metadata");
        Ok(path)
    }

    /// Description of `code`, if the dataset provides one
    pub fn code_entry(&self, code: &str) -> Option<&CodeMetadataEntry> {
        self.code_metadata.as_ref()?.get(code)
    }
}

/// Compiled validator for dataset metadata documents
pub struct MetadataValidator {
    compiled: JSONSchema,
}

impl MetadataValidator {
    pub fn new() -> Result<Self> {
        let schema = dataset_metadata_schema();
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| SchemaError::InvalidFormat(e.to_string()))?;
        Ok(Self { compiled })
    }

    pub fn is_valid(&self, document: &Value) -> bool {
        self.compiled.is_valid(document)
    }

    /// Validate a document, collecting every violation
    pub fn validate(&self, document: &Value) -> Result<()> {
        let errors: Vec<String> = match self.compiled.validate(document) {
            Ok(()) => return Ok(()),
            Err(errors) => errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    let path = if path.is_empty() { "/".to_string() } else { path };
                    format!("{}: {}", path, e)
                })
                .collect(),
        };

        tracing::warn!(count = errors.len(), "dataset metadata failed validation");
        Err(SchemaError::Validation {
            document: METADATA_FILE_NAME.to_string(),
            errors,
        })
    }
}
