//! Projection engine: tree-to-record transformation.
//!
//! Populates a schema-described record from a JSON object, either by direct
//! field-name matching or through a lookup built from type rules. Scalars
//! are coerced to the declared field types; nested objects recurse until
//! the depth budget is exhausted.
//!
//! The engine is stateless and depth-bounded; one schema and lookup can be
//! reused across any number of source nodes.

use std::collections::HashMap;

use offerflow_core::{FieldDescriptor, FieldType, ProjectedRecord, RecordSchema};
use serde_json::Value;
use tracing::warn;

use crate::error::{MappingError, Result};
use crate::rule::{MappingRule, MappingRuleSet};

/// Build the tag-to-field lookup from a type-based rule set.
///
/// Keys are semantic tags as they appear in source objects; values are
/// destination field names. Any name/array rule in the set is a usage error.
pub fn type_lookup(rules: &MappingRuleSet) -> Result<HashMap<String, String>> {
    let mut lookup = HashMap::with_capacity(rules.len());
    for rule in rules.iter() {
        match rule {
            MappingRule::Type {
                source_tag,
                dest_field,
            } => {
                lookup.insert(source_tag.clone(), dest_field.clone());
            }
            _ => return Err(MappingError::MixedRuleKinds),
        }
    }
    Ok(lookup)
}

/// Project one JSON object into a record described by `schema`.
///
/// With a lookup, source fields absent from it are skipped; without one, the
/// JSON field name is used as the destination field name directly. Unknown
/// destination fields are skipped with a warning. Array values abort the
/// record. Nested objects recurse at `depth - 1` and stop silently once the
/// depth budget is exhausted.
pub fn project_record(
    schema: &RecordSchema,
    node: &Value,
    lookup: Option<&HashMap<String, String>>,
    depth: usize,
) -> Result<ProjectedRecord> {
    let Some(object) = node.as_object() else {
        return Err(MappingError::InvalidValueType {
            field: schema.type_name.clone(),
            value: node.to_string(),
        });
    };

    let mut record = ProjectedRecord::new_default(schema);
    for (name, value) in object {
        if value.is_array() {
            return Err(MappingError::ArrayFieldNotSupported);
        }

        let dest = match lookup {
            Some(map) => match map.get(name.as_str()) {
                Some(dest_field) => dest_field.as_str(),
                None => continue,
            },
            None => name.as_str(),
        };

        let Some(descriptor) = schema.field(dest) else {
            warn!(
                field = %dest,
                record_type = %schema.type_name,
                "unknown destination field, skipping"
            );
            continue;
        };

        if value.is_null() {
            record.set(dest, Value::Null);
            continue;
        }

        if value.is_object() {
            match &descriptor.field_type {
                FieldType::Record { schema: nested } => {
                    if depth == 0 {
                        continue;
                    }
                    let nested_record = project_record(nested, value, lookup, depth - 1)?;
                    record.set(dest, nested_record.to_value());
                }
                _ => {
                    return Err(MappingError::InvalidValueType {
                        field: descriptor.name.clone(),
                        value: value.to_string(),
                    });
                }
            }
            continue;
        }

        record.set(dest, coerce_scalar(descriptor, value)?);
    }

    Ok(record)
}

/// Project a batch of elements, one outcome per element.
///
/// A failing element aborts only itself; siblings are unaffected.
pub fn project_batch(
    schema: &RecordSchema,
    elements: &[Value],
    lookup: Option<&HashMap<String, String>>,
    depth: usize,
) -> Vec<Result<ProjectedRecord>> {
    elements
        .iter()
        .map(|element| project_record(schema, element, lookup, depth))
        .collect()
}

/// Coerce a scalar JSON value to a field's declared type.
fn coerce_scalar(descriptor: &FieldDescriptor, value: &Value) -> Result<Value> {
    coerce_field(&descriptor.field_type, &descriptor.name, value)
}

/// Shared scalar coercion, also used by structural deserialization.
pub(crate) fn coerce_field(field_type: &FieldType, field_name: &str, value: &Value) -> Result<Value> {
    let invalid = || MappingError::InvalidValueType {
        field: field_name.to_string(),
        value: value.to_string(),
    };

    match field_type {
        FieldType::Bool => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) => s.trim().parse::<bool>().map(Value::Bool).map_err(|_| invalid()),
            _ => Err(invalid()),
        },
        FieldType::Int8 => coerce_signed(value, i8::MIN as i64, i8::MAX as i64).ok_or_else(invalid),
        FieldType::Int16 => {
            coerce_signed(value, i16::MIN as i64, i16::MAX as i64).ok_or_else(invalid)
        }
        FieldType::Int32 => {
            coerce_signed(value, i32::MIN as i64, i32::MAX as i64).ok_or_else(invalid)
        }
        FieldType::Int64 => coerce_signed(value, i64::MIN, i64::MAX).ok_or_else(invalid),
        FieldType::UInt8 => coerce_unsigned(value, u8::MAX as u64).ok_or_else(invalid),
        FieldType::UInt16 => coerce_unsigned(value, u16::MAX as u64).ok_or_else(invalid),
        FieldType::UInt32 => coerce_unsigned(value, u32::MAX as u64).ok_or_else(invalid),
        FieldType::UInt64 => coerce_unsigned(value, u64::MAX).ok_or_else(invalid),
        FieldType::Float32 | FieldType::Float64 => scalar_f64(value)
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        FieldType::Text => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Bool(_) | Value::Number(_) => Ok(Value::String(value.to_string())),
            _ => Err(invalid()),
        },
        FieldType::EpochMillis => {
            let millis = scalar_i64(value).ok_or_else(invalid)?;
            // Range check through chrono; out-of-range epochs are data errors.
            chrono::DateTime::from_timestamp_millis(millis)
                .map(|_| Value::from(millis))
                .ok_or_else(invalid)
        }
        FieldType::DateTime => {
            let text = value.as_str().ok_or_else(invalid)?;
            if parse_datetime(text) {
                Ok(Value::String(text.to_string()))
            } else {
                Err(invalid())
            }
        }
        FieldType::Record { .. } | FieldType::List { .. } => Err(invalid()),
        FieldType::Opaque { .. } => Err(MappingError::UnspecifiedValueType(
            field_name.to_string(),
        )),
    }
}

fn scalar_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_signed(value: &Value, min: i64, max: i64) -> Option<Value> {
    let n = scalar_i64(value)?;
    (min..=max).contains(&n).then(|| Value::from(n))
}

fn coerce_unsigned(value: &Value, max: u64) -> Option<Value> {
    let n = scalar_u64(value)?;
    (n <= max).then(|| Value::from(n))
}

/// Accept RFC 3339 or a naive ISO-8601-like date/time.
fn parse_datetime(text: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(text).is_ok()
        || chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}
