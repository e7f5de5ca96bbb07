//! End-to-end tests for the MEDS schemas
//!
//! Exercises the public API the way an ETL or modelling pipeline would:
//! building schemas, parsing records, and round-tripping dataset folders.

use std::fs;
use std::path::{Path, PathBuf};

use arrow_schema::{DataType, Field, Fields};
use meds_schema::{
    check_export, default_patient_schema, is_birth_code, label_schema, patient_schema,
    verify_export, DatasetMetadata, MetadataValidator, OutputFormat, Patient, SchemaError,
    SchemaRegistry, CHECKSUMS_FILE, METADATA_FILE_NAME,
};
use rstest::rstest;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn load_json(name: &str) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(fixture(name)).unwrap()).unwrap()
}

// =============================================================================
// Patient records
// =============================================================================

#[test]
fn test_patient_with_birth_event() {
    let schema = default_patient_schema();
    let document = load_json("patient_42.json");

    let mut schema_fields: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let mut document_fields: Vec<&str> =
        document.as_object().unwrap().keys().map(String::as_str).collect();
    schema_fields.sort_unstable();
    document_fields.sort_unstable();
    assert_eq!(document_fields, schema_fields);

    let patient: Patient = serde_json::from_value(document).unwrap();

    assert_eq!(patient.patient_id, 42);
    assert!(patient.static_measurements.is_empty());
    assert!(is_birth_code(&patient.events[0].measurements[0].code));
    assert!(patient.events[0].measurements[0].is_birth());
    assert!(patient.check_event_order().is_ok());

    let lab = &patient.events[1].measurements[0];
    assert_eq!(lab.numeric_value, Some(1.1));
    assert_eq!(lab.metadata.as_ref().unwrap()["unit"], "mg/dL");
}

#[test]
fn test_reversed_events_are_detected() {
    let mut patient: Patient = serde_json::from_value(load_json("patient_42.json")).unwrap();
    patient.events.reverse();

    assert!(matches!(
        patient.check_event_order(),
        Err(SchemaError::UnorderedEvents { patient_id: 42, index: 1 })
    ));
}

#[test]
fn test_metadata_shape_is_embedded_everywhere() {
    let metadata_type = DataType::Struct(Fields::from(vec![Field::new(
        "unit",
        DataType::Utf8,
        true,
    )]));
    let with_metadata = patient_schema(metadata_type);
    let without = default_patient_schema();

    assert_eq!(with_metadata.fields().len(), without.fields().len());
    assert_ne!(
        with_metadata.field_with_name("static_measurements").unwrap(),
        without.field_with_name("static_measurements").unwrap()
    );
    assert_ne!(
        with_metadata.field_with_name("events").unwrap(),
        without.field_with_name("events").unwrap()
    );
    assert_eq!(
        with_metadata.field_with_name("patient_id").unwrap(),
        without.field_with_name("patient_id").unwrap()
    );
}

#[test]
fn test_label_schema_has_three_fields() {
    let names: Vec<String> = label_schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(names, vec!["patient_id", "prediction_time", "boolean_value"]);
}

// =============================================================================
// Dataset metadata
// =============================================================================

#[rstest]
#[case("metadata_name_only.json")]
#[case("metadata_full.json")]
#[case("metadata_empty.json")]
fn test_valid_metadata_documents(#[case] name: &str) {
    let validator = MetadataValidator::new().unwrap();
    let document = load_json(name);
    assert!(validator.validate(&document).is_ok(), "{} should be valid", name);

    let parsed: DatasetMetadata = serde_json::from_value(document).unwrap();
    assert_eq!(
        serde_json::to_value(&parsed).unwrap(),
        load_json(name),
        "{} should survive a typed round trip",
        name
    );
}

#[rstest]
#[case("metadata_bad_version.json")]
#[case("metadata_bad_parents.json")]
#[case("metadata_not_object.json")]
fn test_invalid_metadata_documents(#[case] name: &str) {
    let validator = MetadataValidator::new().unwrap();
    match validator.validate(&load_json(name)) {
        Err(SchemaError::Validation { document, errors }) => {
            assert_eq!(document, METADATA_FILE_NAME);
            assert!(!errors.is_empty());
        }
        other => panic!("{} should be invalid, got {:?}", name, other),
    }
}

#[test]
fn test_metadata_file_round_trip() {
    let dataset = tempfile::tempdir().unwrap();
    fs::copy(fixture("metadata_full.json"), dataset.path().join(METADATA_FILE_NAME)).unwrap();

    let metadata = DatasetMetadata::load(dataset.path()).unwrap();
    assert_eq!(metadata.dataset_name.as_deref(), Some("MIMIC-IV"));
    assert_eq!(metadata.code_metadata.as_ref().unwrap().len(), 3);
    assert_eq!(
        metadata.code_entry("ICD10CM/E11.9").unwrap().parent_codes,
        vec!["ICD10CM/E11".to_string()]
    );

    let copy = tempfile::tempdir().unwrap();
    let path = metadata.save(copy.path(), OutputFormat::Compact).unwrap();
    assert_eq!(path, copy.path().join("metadata.json"));
    assert_eq!(DatasetMetadata::load(copy.path()).unwrap(), metadata);
}

#[test]
fn test_invalid_metadata_file_is_rejected() {
    let dataset = tempfile::tempdir().unwrap();
    fs::copy(fixture("metadata_bad_version.json"), dataset.path().join(METADATA_FILE_NAME)).unwrap();

    assert!(matches!(
        DatasetMetadata::load(dataset.path()),
        Err(SchemaError::Validation { .. })
    ));
}

#[test]
fn test_missing_metadata_file() {
    let dataset = tempfile::tempdir().unwrap();
    match DatasetMetadata::load(dataset.path()) {
        Err(SchemaError::MissingFile(path)) => {
            assert_eq!(path, dataset.path().join(METADATA_FILE_NAME));
        }
        other => panic!("Expected MissingFile, got {:?}", other),
    }
}

// =============================================================================
// Export
// =============================================================================

#[rstest]
#[case(OutputFormat::Pretty)]
#[case(OutputFormat::Compact)]
fn test_export_and_verify(#[case] format: OutputFormat) {
    let dir = tempfile::tempdir().unwrap();
    let written = SchemaRegistry::new(DataType::Utf8)
        .export_to(dir.path(), format, true)
        .unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "patient.arrow.json",
            "label.arrow.json",
            "dataset_metadata.schema.json",
            CHECKSUMS_FILE,
        ]
    );
    assert!(verify_export(dir.path()).unwrap());

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("dataset_metadata.schema.json")).unwrap())
            .unwrap();
    assert_eq!(&exported, SchemaRegistry::default().dataset_metadata_schema());
}

#[test]
fn test_tampered_export_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    SchemaRegistry::default()
        .export_to(dir.path(), OutputFormat::Pretty, true)
        .unwrap();

    fs::write(dir.path().join("label.arrow.json"), r#"{"fields": []}"#).unwrap();

    assert!(!verify_export(dir.path()).unwrap());
    match check_export(dir.path()) {
        Err(SchemaError::ChecksumMismatch { name, .. }) => assert_eq!(name, "label.arrow.json"),
        other => panic!("Expected ChecksumMismatch, got {:?}", other),
    }
}

#[test]
fn test_export_without_checksums() {
    let dir = tempfile::tempdir().unwrap();
    let written = SchemaRegistry::default()
        .export_to(dir.path(), OutputFormat::Pretty, false)
        .unwrap();

    assert_eq!(written.len(), 3);
    assert!(matches!(
        verify_export(dir.path()),
        Err(SchemaError::MissingFile(_))
    ));
}
