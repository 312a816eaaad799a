//! Structural deserialization of JSON objects into schema-described records.
//!
//! Used on two paths: the no-rules fallback (direct one-to-one array
//! deserialization) and the conversion of remap-engine output into target
//! records. Unlike the projection engine, this converter accepts
//! array-valued fields, since remap rules can legitimately construct lists.

use offerflow_core::{FieldType, ProjectedRecord, RecordSchema};
use serde_json::Value;
use tracing::warn;

use crate::error::{MappingError, Result};
use crate::project::coerce_field;

/// Convert a JSON object into a record by direct field-name matching.
///
/// Unknown source fields are skipped with a warning; declared fields absent
/// from the source keep their defaults. Nested records and lists recurse
/// within the depth budget; once it is exhausted the remaining subtree is
/// left at its default.
pub fn deserialize_record(
    schema: &RecordSchema,
    node: &Value,
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
        let Some(descriptor) = schema.field(name) else {
            warn!(
                field = %name,
                record_type = %schema.type_name,
                "source field not declared in schema, skipping"
            );
            continue;
        };

        if value.is_null() {
            record.set(name, Value::Null);
            continue;
        }
        record.set(
            name,
            deserialize_value(&descriptor.field_type, &descriptor.name, value, depth)?,
        );
    }
    Ok(record)
}

fn deserialize_value(
    field_type: &FieldType,
    field_name: &str,
    value: &Value,
    depth: usize,
) -> Result<Value> {
    match (field_type, value) {
        (FieldType::Record { schema }, Value::Object(_)) => {
            if depth == 0 {
                return Ok(field_type.default_value());
            }
            Ok(deserialize_record(schema, value, depth - 1)?.to_value())
        }
        (FieldType::List { element }, Value::Array(items)) => {
            if depth == 0 {
                return Ok(field_type.default_value());
            }
            let mut converted = Vec::with_capacity(items.len());
            for item in items {
                converted.push(deserialize_value(element, field_name, item, depth - 1)?);
            }
            Ok(Value::Array(converted))
        }
        (FieldType::Record { .. }, _) | (FieldType::List { .. }, _) => {
            Err(MappingError::InvalidValueType {
                field: field_name.to_string(),
                value: value.to_string(),
            })
        }
        _ => coerce_field(field_type, field_name, value),
    }
}
