//! Patient event stream schema
//!
//! A patient is a list of static measurements plus a time-ordered list of
//! events, each event bundling the measurements recorded at that time.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Fields, Schema, TimeUnit};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::codes::{is_birth_code, is_death_code};
use crate::error::{Result, SchemaError};

/// Arrow type used for every timestamp in the standard
pub fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, None)
}

/// List of `item`, matching the element naming Arrow writers use by default
fn list_of(item: DataType) -> DataType {
    DataType::List(Arc::new(Field::new("item", item, true)))
}

/// Arrow struct type for a single measurement
pub fn measurement_type(per_event_metadata: DataType) -> DataType {
    DataType::Struct(Fields::from(vec![
        Field::new("code", DataType::Utf8, false),
        Field::new("text_value", DataType::Utf8, true),
        Field::new("numeric_value", DataType::Float32, true),
        Field::new("datetime_value", timestamp_type(), true),
        Field::new("metadata", per_event_metadata, true),
    ]))
}

/// Arrow struct type for a single event
pub fn event_type(per_event_metadata: DataType) -> DataType {
    DataType::Struct(Fields::from(vec![
        Field::new("time", timestamp_type(), false),
        Field::new("measurements", list_of(measurement_type(per_event_metadata)), false),
    ]))
}

/// Build the patient schema with `per_event_metadata` as the column type of
/// each measurement's `metadata` field.
///
/// `events` must be sorted by `time` within each patient. The schema cannot
/// express that, so it is left to producers (see [`Patient::check_event_order`]).
///
/// `patient_id`, `static_measurements`, `events`, `time`, `measurements` and
/// `code` are declared non-nullable. Writers that mark every column nullable
/// (the pyarrow reference schema does) produce files whose schema differs
/// from this one only in those flags, so compare field names and types rather
/// than whole `Schema`s when reading them.
pub fn patient_schema(per_event_metadata: DataType) -> Schema {
    tracing::debug!(metadata = %per_event_metadata, "building patient schema");

    let measurement = measurement_type(per_event_metadata.clone());
    Schema::new(vec![
        Field::new("patient_id", DataType::Int64, false),
        Field::new("static_measurements", list_of(measurement), false),
        Field::new("events", list_of(event_type(per_event_metadata)), false),
    ])
}

/// Patient schema without per-measurement metadata (`metadata` is always null)
pub fn default_patient_schema() -> Schema {
    patient_schema(DataType::Null)
}

/// One recorded clinical fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_value: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Measurement {
    /// Create a measurement carrying only a code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text_value: None,
            numeric_value: None,
            datetime_value: None,
            metadata: None,
        }
    }

    pub fn with_text_value(mut self, value: impl Into<String>) -> Self {
        self.text_value = Some(value.into());
        self
    }

    pub fn with_numeric_value(mut self, value: f32) -> Self {
        self.numeric_value = Some(value);
        self
    }

    pub fn with_datetime_value(mut self, value: NaiveDateTime) -> Self {
        self.datetime_value = Some(value);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether this measurement records a birth
    pub fn is_birth(&self) -> bool {
        is_birth_code(&self.code)
    }

    /// Whether this measurement records a death
    pub fn is_death(&self) -> bool {
        is_death_code(&self.code)
    }
}

/// Measurements recorded at the same point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: NaiveDateTime,
    pub measurements: Vec<Measurement>,
}

impl Event {
    pub fn new(time: NaiveDateTime, measurements: Vec<Measurement>) -> Self {
        Self { time, measurements }
    }
}

/// All records for a single patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: i64,
    pub static_measurements: Vec<Measurement>,
    pub events: Vec<Event>,
}

impl Patient {
    /// Create a patient with no measurements
    pub fn new(patient_id: i64) -> Self {
        Self {
            patient_id,
            static_measurements: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Whether `events` is sorted by time (equal times are allowed)
    pub fn is_time_ordered(&self) -> bool {
        self.first_unordered_event().is_none()
    }

    /// Fail on the first event that is earlier than its predecessor
    pub fn check_event_order(&self) -> Result<()> {
        match self.first_unordered_event() {
            Some(index) => Err(SchemaError::UnorderedEvents {
                patient_id: self.patient_id,
                index,
            }),
            None => Ok(()),
        }
    }

    fn first_unordered_event(&self) -> Option<usize> {
        self.events
            .windows(2)
            .position(|pair| pair[1].time < pair[0].time)
            .map(|i| i + 1)
    }

    /// Every measurement, static ones first, then events in order
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        self.static_measurements
            .iter()
            .chain(self.events.iter().flat_map(|e| e.measurements.iter()))
    }

    /// Time of the first event containing a birth measurement
    pub fn birth_time(&self) -> Option<NaiveDateTime> {
        self.events
            .iter()
            .find(|e| e.measurements.iter().any(Measurement::is_birth))
            .map(|e| e.time)
    }
}
