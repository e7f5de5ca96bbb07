//! Configuration for the MEDS tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (meds.toml)
//! - Environment variables (MEDS__*)
//!
//! ## Example config file (meds.toml):
//! ```toml
//! [export]
//! output_dir = "schemas"
//! output_format = "pretty"
//! include_checksums = true
//!
//! [patient]
//! # A bare type name, or the JSON form for parameterized types:
//! # per_event_metadata = '{"Timestamp":["Microsecond",null]}'
//! per_event_metadata = "Null"
//!
//! [dataset]
//! root = "/data/mimic-meds"
//! ```

use std::path::PathBuf;

use arrow_schema::DataType;
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedsConfig {
    /// Schema export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Patient schema settings
    #[serde(default)]
    pub patient: PatientConfig,

    /// Dataset settings
    #[serde(default)]
    pub dataset: DatasetConfig,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory schemas are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Write a checksums.sha256 file next to the schemas
    #[serde(default = "default_true")]
    pub include_checksums: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    /// Serialize `value` in this format
    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

/// Patient schema configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientConfig {
    /// Arrow type of the per-measurement `metadata` column
    #[serde(default = "default_metadata_type", with = "data_type_string")]
    pub per_event_metadata: DataType,
}

/// Dataset configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Default dataset root for validation commands
    #[serde(default)]
    pub root: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_true() -> bool {
    true
}

fn default_metadata_type() -> DataType {
    DataType::Null
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            output_format: OutputFormat::Pretty,
            include_checksums: true,
        }
    }
}

impl Default for PatientConfig {
    fn default() -> Self {
        Self {
            per_event_metadata: default_metadata_type(),
        }
    }
}

impl MedsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["meds.toml", ".meds.toml", "config/meds.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("org", "meds", "meds") {
            let xdg_config = config_dir.config_dir().join("meds.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("MEDS")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &str) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| SchemaError::InvalidFormat(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Parse an Arrow type from either a bare variant name (`Utf8`, `Int64`) or
/// the full JSON serde form (`{"Timestamp": ["Microsecond", null]}`).
pub fn parse_data_type(input: &str) -> Result<DataType> {
    let input = input.trim();
    serde_json::from_str::<DataType>(input)
        .or_else(|_| serde_json::from_value(serde_json::Value::String(input.to_string())))
        .map_err(|_| SchemaError::InvalidFormat(format!("unrecognised Arrow type: {}", input)))
}

/// Render an Arrow type in the form [`parse_data_type`] accepts: the bare
/// variant name for unit types, compact JSON otherwise.
pub fn format_data_type(data_type: &DataType) -> Result<String> {
    Ok(match serde_json::to_value(data_type)? {
        serde_json::Value::String(name) => name,
        other => other.to_string(),
    })
}

/// Stores `DataType` as a string. TOML has no null, so the derived serde
/// form cannot hold types such as `Timestamp(Microsecond, None)`.
mod data_type_string {
    use arrow_schema::DataType;
    use serde::{de, ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data_type: &DataType, serializer: S) -> Result<S::Ok, S::Error> {
        let text = super::format_data_type(data_type).map_err(<S::Error as ser::Error>::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DataType, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_data_type(&text).map_err(<D::Error as de::Error>::custom)
    }
}
