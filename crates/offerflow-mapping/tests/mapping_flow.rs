//! End-to-end mapping flows: provider response trees into consumer records.

use offerflow_core::{FieldType, RecordSchema};
use offerflow_mapping::{MappingRule, MappingRuleSet, RecordMapper};
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn parking_schema() -> RecordSchema {
    let geo = RecordSchema::builder("Geo")
        .field("latitude", FieldType::Float64)
        .field("longitude", FieldType::Float64)
        .build()
        .expect("geo schema");
    RecordSchema::builder("ParkingSpot")
        .field("status", FieldType::Text)
        .field("vacant", FieldType::Bool)
        .field(
            "geos",
            FieldType::List {
                element: Box::new(FieldType::Record { schema: geo }),
            },
        )
        .build()
        .expect("parking schema")
}

fn geo_rules() -> MappingRuleSet {
    MappingRuleSet::new(vec![
        MappingRule::Array {
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
            .expect("subrules"),
        },
        MappingRule::Name {
            source_path: "state.label".to_string(),
            dest_path: "status".to_string(),
        },
    ])
    .expect("rules")
}

#[test]
fn name_based_mapping_over_provider_response() {
    init_tracing();
    let response = json!([
        {
            "state": { "label": "free" },
            "geos": [{ "latitude": 1.1, "longitude": 2.2 }]
        },
        {
            "state": { "label": "occupied" },
            "geos": [
                { "latitude": 3.3, "longitude": 4.4 },
                { "latitude": 5.5, "longitude": 6.6 }
            ]
        }
    ]);

    let outcomes = RecordMapper::new()
        .map_records(&response, &parking_schema(), &geo_rules())
        .expect("mapping succeeds");

    assert_eq!(outcomes.len(), 2);

    let first = outcomes[0].as_ref().expect("first record");
    assert_eq!(first.get("status"), Some(&json!("free")));
    assert_eq!(
        first.get("geos"),
        Some(&json!([{ "latitude": 1.1, "longitude": 2.2 }]))
    );

    let second = outcomes[1].as_ref().expect("second record");
    assert_eq!(second.get("status"), Some(&json!("occupied")));
    assert_eq!(second.get("geos").and_then(|g| g.as_array()).map(Vec::len), Some(2));
}

#[test]
fn type_based_mapping_from_semantic_tags() {
    init_tracing();
    let schema = RecordSchema::builder("AirQuality")
        .tagged_field("temperature", FieldType::Float64, "schema:airTemperature")
        .tagged_field("humidity", FieldType::Float64, "schema:humidity")
        .field("station", FieldType::Text)
        .build()
        .expect("schema");

    let response = json!([
        { "schema:airTemperature": 21.0, "schema:humidity": 45.5, "schema:pressure": 1013.0 }
    ]);

    let outcomes = RecordMapper::new()
        .map_records(&response, &schema, &MappingRuleSet::empty())
        .expect("mapping succeeds");

    let record = outcomes[0].as_ref().expect("record");
    assert_eq!(record.get("temperature"), Some(&json!(21.0)));
    assert_eq!(record.get("humidity"), Some(&json!(45.5)));
    // Untagged field keeps its default; unlisted source field is skipped.
    assert_eq!(record.get("station"), Some(&json!("")));
}

#[test]
fn mapped_records_serialize_as_plain_objects() {
    init_tracing();
    let response = json!([{ "state": { "label": "free" }, "geos": [] }]);
    let outcomes = RecordMapper::new()
        .map_records(&response, &parking_schema(), &geo_rules())
        .expect("mapping succeeds");

    let record = outcomes[0].as_ref().expect("record");
    let text = serde_json::to_string(record).expect("serializes");
    let reparsed: serde_json::Value = serde_json::from_str(&text).expect("parses");
    assert!(reparsed.is_object());
    assert_eq!(reparsed["status"], json!("free"));
}
