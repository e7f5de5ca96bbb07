//! Label schema for prediction tasks

use arrow_schema::{DataType, Field, Schema};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::patient::timestamp_type;

/// Arrow schema for labels: one row per (patient, prediction time)
///
/// All three columns are non-nullable, unlike the pyarrow reference schema
/// where every column is nullable. Files written from that schema match this
/// one on names and types but not on nullability.
pub fn label_schema() -> Schema {
    Schema::new(vec![
        Field::new("patient_id", DataType::Int64, false),
        Field::new("prediction_time", timestamp_type(), false),
        Field::new("boolean_value", DataType::Boolean, false),
    ])
}

/// A prediction target for one patient at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// References [`crate::Patient::patient_id`]
    pub patient_id: i64,
    pub prediction_time: NaiveDateTime,
    pub boolean_value: bool,
}
