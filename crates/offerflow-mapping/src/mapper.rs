//! Top-level mapping dispatch.
//!
//! [`RecordMapper`] merges explicit rules with schema-inferred ones and
//! routes the input through the right engine:
//!
//! - empty effective set: direct one-to-one array deserialization;
//! - name-based set: remap, then structural deserialization of each
//!   constructed object;
//! - type-based set: projection with the tag lookup over each element.

use offerflow_core::{ProjectedRecord, RecordSchema};
use serde_json::Value;
use tracing::debug;

use crate::deserialize::deserialize_record;
use crate::error::{MappingError, Result};
use crate::project::{project_record, type_lookup};
use crate::remap::remap;
use crate::rule::{MappingRule, MappingRuleSet};

/// Default recursion budget for remapping and projection.
pub const DEFAULT_MAX_MAPPING_DEPTH: usize = 10;

/// Per-record mapping outcome. An `Err` element means "could not be
/// mapped", never "valid empty record".
pub type RecordOutcome = std::result::Result<ProjectedRecord, MappingError>;

/// Maps provider response trees into consumer record shapes.
#[derive(Debug, Clone)]
pub struct RecordMapper {
    max_depth: usize,
}

impl RecordMapper {
    /// Mapper with the default depth budget.
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_MAPPING_DEPTH,
        }
    }

    /// Mapper with an explicit depth budget.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Map a parsed JSON tree into records, one outcome per element.
    ///
    /// Usage errors (mixed rule kinds, non-array input where required)
    /// fail the whole call; data errors fail only the affected record.
    pub fn map_records(
        &self,
        node: &Value,
        schema: &RecordSchema,
        explicit_rules: &MappingRuleSet,
    ) -> Result<Vec<RecordOutcome>> {
        let effective = MappingRuleSet::merged(schema, explicit_rules);

        if effective.is_empty() {
            return self.map_direct(node, schema);
        }

        match effective.first() {
            Some(MappingRule::Name { .. }) | Some(MappingRule::Array { .. }) => {
                let constructed = remap(node, &effective, self.max_depth)?;
                Ok(constructed
                    .iter()
                    .map(|element| deserialize_record(schema, element, self.max_depth))
                    .collect())
            }
            _ => {
                let lookup = type_lookup(&effective)?;
                let elements: Vec<&Value> = match node {
                    Value::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                Ok(elements
                    .into_iter()
                    .map(|element| project_record(schema, element, Some(&lookup), self.max_depth))
                    .collect())
            }
        }
    }

    /// Map a raw JSON text into records.
    pub fn map_json(
        &self,
        text: &str,
        schema: &RecordSchema,
        explicit_rules: &MappingRuleSet,
    ) -> Result<Vec<RecordOutcome>> {
        let node: Value = serde_json::from_str(text)?;
        self.map_records(&node, schema, explicit_rules)
    }

    /// No-rules fallback: direct one-to-one deserialization of a top-level
    /// array. A structurally unmappable element yields an empty list rather
    /// than an error.
    fn map_direct(&self, node: &Value, schema: &RecordSchema) -> Result<Vec<RecordOutcome>> {
        let Value::Array(items) = node else {
            return Err(MappingError::NonArrayResult);
        };

        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            match deserialize_record(schema, item, self.max_depth) {
                Ok(record) => outcomes.push(Ok(record)),
                Err(err) => {
                    debug!(error = %err, "direct deserialization failed, returning empty batch");
                    return Ok(Vec::new());
                }
            }
        }
        Ok(outcomes)
    }
}

impl Default for RecordMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offerflow_core::FieldType;
    use serde_json::json;

    fn geo_schema() -> RecordSchema {
        let geo = RecordSchema::builder("Geo")
            .field("latitude", FieldType::Float64)
            .field("longitude", FieldType::Float64)
            .build()
            .unwrap();
        RecordSchema::builder("Spot")
            .field(
                "geos",
                FieldType::List {
                    element: Box::new(FieldType::Record { schema: geo }),
                },
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_name_based_end_to_end() {
        // Array("geos","geos",[Name("latitude","latitude"), Name("longitude","longitude")])
        // over {"geos":[{"latitude":1.1,"longitude":2.2}]}.
        let rules = MappingRuleSet::new(vec![MappingRule::Array {
            source_path: "geos".to_string(),
            dest_path: "geos".to_string(),
            subrules: MappingRuleSet::new(vec![
                MappingRule::Name {
                    source_path: "latitude".to_string(),
                    dest_path: "latitude".to_string(),
                },
                MappingRule::Name {
                    source_path: "longitude".to_string(),
                    dest_path: "longitude".to_string(),
                },
            ])
            .unwrap(),
        }])
        .unwrap();

        let node = json!({ "geos": [{ "latitude": 1.1, "longitude": 2.2 }] });
        let outcomes = RecordMapper::new()
            .map_records(&node, &geo_schema(), &rules)
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        let record = outcomes[0].as_ref().unwrap();
        assert_eq!(
            record.get("geos"),
            Some(&json!([{ "latitude": 1.1, "longitude": 2.2 }]))
        );
    }

    #[test]
    fn test_empty_rules_direct_fallback() {
        let schema = RecordSchema::builder("Reading")
            .field("value", FieldType::Float64)
            .build()
            .unwrap();
        let mapper = RecordMapper::new();

        let outcomes = mapper
            .map_records(&json!([{ "value": 1.0 }, { "value": 2.0 }]), &schema, &MappingRuleSet::empty())
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.is_ok()));
    }

    #[test]
    fn test_direct_fallback_requires_array() {
        let schema = RecordSchema::builder("Reading")
            .field("value", FieldType::Float64)
            .build()
            .unwrap();
        let err = RecordMapper::new()
            .map_records(&json!({ "value": 1.0 }), &schema, &MappingRuleSet::empty())
            .unwrap_err();
        assert_eq!(err.to_string(), "non-array results not supported");
    }

    #[test]
    fn test_direct_fallback_returns_empty_on_structural_failure() {
        let schema = RecordSchema::builder("Reading")
            .field("value", FieldType::Float64)
            .build()
            .unwrap();
        // Second element is not an object.
        let outcomes = RecordMapper::new()
            .map_records(&json!([{ "value": 1.0 }, 42]), &schema, &MappingRuleSet::empty())
            .unwrap();
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_type_based_dispatch_uses_lookup() {
        let schema = RecordSchema::builder("Air")
            .tagged_field("temp", FieldType::Float64, "schema:airTemperature")
            .build()
            .unwrap();

        // No explicit rules; the schema tag alone drives the mapping.
        let node = json!([{ "schema:airTemperature": 19.5 }]);
        let outcomes = RecordMapper::new()
            .map_records(&node, &schema, &MappingRuleSet::empty())
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].as_ref().unwrap().get("temp"), Some(&json!(19.5)));
    }

    #[test]
    fn test_mixed_rules_raise_engine_specific_errors() {
        let schema = RecordSchema::builder("T")
            .field("a", FieldType::Text)
            .build()
            .unwrap();

        // Name rule first: remap engine detects the stray type rule.
        let name_first = MappingRuleSet::new(vec![
            MappingRule::Name {
                source_path: "a".to_string(),
                dest_path: "a".to_string(),
            },
            MappingRule::Type {
                source_tag: "schema:a".to_string(),
                dest_field: "a".to_string(),
            },
        ])
        .unwrap();
        let err = RecordMapper::new()
            .map_records(&json!({}), &schema, &name_first)
            .unwrap_err();
        assert_eq!(err.to_string(), "only name-based mapping is supported");

        // Type rule first: the projection lookup detects the stray name rule.
        let type_first = MappingRuleSet::new(vec![
            MappingRule::Type {
                source_tag: "schema:a".to_string(),
                dest_field: "a".to_string(),
            },
            MappingRule::Name {
                source_path: "a".to_string(),
                dest_path: "a".to_string(),
            },
        ])
        .unwrap();
        let err = RecordMapper::new()
            .map_records(&json!({}), &schema, &type_first)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "name mapping cannot be combined with type mapping"
        );
    }

    #[test]
    fn test_map_json_parses_text() {
        let schema = RecordSchema::builder("Reading")
            .field("value", FieldType::Float64)
            .build()
            .unwrap();
        let outcomes = RecordMapper::new()
            .map_json(r#"[{"value": 3.5}]"#, &schema, &MappingRuleSet::empty())
            .unwrap();
        assert_eq!(outcomes[0].as_ref().unwrap().get("value"), Some(&json!(3.5)));
    }
}
