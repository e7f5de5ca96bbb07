//! Medical Event Data Standard (MEDS) Schemas
//!
//! Declarative schemas for exchanging medical event records between ETL
//! pipelines and modelling code.
//!
//! ## Components
//!
//! - **Patient data**: an Arrow schema for per-patient event streams, with a
//!   pluggable column type for per-measurement metadata
//! - **Labels**: an Arrow schema for prediction targets
//! - **Dataset metadata**: a JSON Schema for the `metadata.json` document that
//!   sits at the root of every dataset
//! - **Typed mirrors**: serde structs matching each schema
//!
//! ## Dataset Layout
//!
//! ```text
//! dataset/
//! ├── metadata.json      # DatasetMetadata
//! ├── patients/          # tables following patient_schema()
//! └── labels/            # tables following label_schema()
//! ```

pub mod checksum;
pub mod codes;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod label;
pub mod metadata;
pub mod patient;
pub mod registry;

pub use checksum::Checksum;
pub use codes::{is_birth_code, is_death_code, BirthCode, BIRTH_CODE, DEATH_CODE};
pub use config::{MedsConfig, OutputFormat};
pub use descriptor::describe_schema;
pub use error::{Result, SchemaError};
pub use label::{label_schema, Label};
pub use metadata::{
    dataset_metadata_schema, CodeMetadata, CodeMetadataEntry, DatasetMetadata,
    MetadataValidator, METADATA_FILE_NAME,
};
pub use patient::{default_patient_schema, patient_schema, Event, Measurement, Patient};
pub use registry::{check_export, verify_export, SchemaEntry, SchemaKind, SchemaRegistry, CHECKSUMS_FILE};
