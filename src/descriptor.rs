//! Language-agnostic JSON descriptors for Arrow schemas
//!
//! Consumers without an Arrow implementation read the exported `*.arrow.json`
//! files, so the rendering below only uses plain JSON.
//!
//! ```text
//! {"fields": [{"name": "patient_id", "type": "int64", "nullable": false}, ...]}
//! ```

use arrow_schema::{DataType, Field, Schema, TimeUnit};
use serde_json::{json, Value};

/// Render a full schema
pub fn describe_schema(schema: &Schema) -> Value {
    json!({
        "fields": schema.fields().iter().map(|f| describe_field(f)).collect::<Vec<_>>()
    })
}

/// Render a single field
pub fn describe_field(field: &Field) -> Value {
    json!({
        "name": field.name(),
        "type": describe_type(field.data_type()),
        "nullable": field.is_nullable(),
    })
}

/// Render a column type.
///
/// Types outside the lowercase vocabulary below are rendered as
/// `{"arrow": "<Arrow display name>"}`.
pub fn describe_type(data_type: &DataType) -> Value {
    match data_type {
        DataType::Null => json!("null"),
        DataType::Boolean => json!("boolean"),
        DataType::Int32 => json!("int32"),
        DataType::Int64 => json!("int64"),
        DataType::Float32 => json!("float32"),
        DataType::Float64 => json!("float64"),
        DataType::Utf8 => json!("string"),
        DataType::LargeUtf8 => json!("large_string"),
        DataType::Timestamp(unit, tz) => json!({
            "timestamp": {
                "unit": time_unit_name(unit),
                "timezone": tz.as_deref(),
            }
        }),
        DataType::List(item) => json!({
            "list": describe_field(item)
        }),
        DataType::LargeList(item) => json!({
            "large_list": describe_field(item)
        }),
        DataType::Struct(fields) => json!({
            "struct": fields.iter().map(|f| describe_field(f)).collect::<Vec<_>>()
        }),
        other => json!({"arrow": other.to_string()}),
    }
}

fn time_unit_name(unit: &TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "s",
        TimeUnit::Millisecond => "ms",
        TimeUnit::Microsecond => "us",
        TimeUnit::Nanosecond => "ns",
    }
}
