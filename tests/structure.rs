mod common;

use common::text_field;
use schema_detect::{
    config::{EnumMode, EnumOptions},
    mapping::FieldStatsMap,
    model::{FieldStatistics, ValueKind},
    structure::{Axis, detect_enum_fields, detect_id_fields, looks_like_coordinate, looks_like_id},
};
use serde_json::json;

fn stats_map(fields: Vec<FieldStatistics>) -> FieldStatsMap {
    fields
        .into_iter()
        .map(|stats| (stats.path.clone(), stats))
        .collect()
}

fn integer_field(path: &str, occurrences: usize, unique: usize) -> FieldStatistics {
    let mut stats = FieldStatistics::new(path);
    stats.occurrences = occurrences;
    stats.unique_values = unique;
    stats.type_distribution.insert(ValueKind::Integer, occurrences);
    stats
}

#[test]
fn enum_threshold_by_count() {
    let fields = stats_map(vec![text_field("status", 100, 30)]);
    let options = EnumOptions::new(50.0, EnumMode::Count).expect("valid options");
    assert!(detect_enum_fields(&fields, &options).contains("status"));
}

#[test]
fn enum_threshold_by_percentage() {
    let fields = stats_map(vec![text_field("status", 100, 30)]);
    let options = EnumOptions::new(10.0, EnumMode::Percentage).expect("valid options");
    assert!(detect_enum_fields(&fields, &options).is_empty());
    let generous = EnumOptions::new(30.0, EnumMode::Percentage).expect("valid options");
    assert!(detect_enum_fields(&fields, &generous).contains("status"));
}

#[test]
fn enum_requires_repetition_and_variety() {
    let fields = stats_map(vec![
        text_field("constant", 100, 1),
        text_field("all_distinct", 40, 40),
        integer_field("rating", 100, 5),
    ]);
    assert!(detect_enum_fields(&fields, &EnumOptions::default()).is_empty());
}

#[test]
fn id_by_name_and_uniqueness() {
    let fields = stats_map(vec![
        integer_field("id", 100, 100),
        text_field("category", 100, 5),
        integer_field("venue_id", 100, 7),
        text_field("slug", 50, 50),
    ]);
    let ids = detect_id_fields(&fields);
    assert!(ids.contains("id"));
    assert!(ids.contains("venue_id"));
    assert!(ids.contains("slug"));
    assert!(!ids.contains("category"));
}

#[test]
fn nested_id_uses_leaf_name() {
    let fields = stats_map(vec![integer_field("organizer.external_key", 10, 3)]);
    assert!(detect_id_fields(&fields).contains("organizer.external_key"));
}

#[test]
fn single_observation_is_not_an_id() {
    let fields = stats_map(vec![text_field("headline", 1, 1)]);
    assert!(detect_id_fields(&fields).is_empty());
}

#[test]
fn id_value_shapes() {
    assert!(looks_like_id(&json!("550e8400-e29b-41d4-a716-446655440000")));
    assert!(looks_like_id(&json!("507f1f77bcf86cd799439011")));
    assert!(looks_like_id(&json!("AB12CD34")));
    assert!(looks_like_id(&json!(12_345_678)));
    assert!(!looks_like_id(&json!("short")));
    assert!(!looks_like_id(&json!(42)));
    assert!(!looks_like_id(&json!(true)));
}

#[test]
fn coordinate_value_shapes() {
    assert!(looks_like_coordinate(&json!(52.52), Axis::Lat));
    assert!(looks_like_coordinate(&json!("-74.006"), Axis::Lng));
    assert!(!looks_like_coordinate(&json!(120.0), Axis::Lat));
    assert!(looks_like_coordinate(&json!(120.0), Axis::Lng));
    assert!(!looks_like_coordinate(&json!("north"), Axis::Lat));
}
