mod common;

use common::{numeric_field, text_field, text_field_with_samples};
use schema_detect::{
    geo::{
        detect_geo_fields, disambiguate_coordinate_order, find_combined_coordinate_field,
        is_valid_coordinate_field,
    },
    language::Language,
    mapping::FieldStatsMap,
    model::{CoordinateFormat, FieldStatistics, GeoMappingType},
    patterns::{LATITUDE_BOUNDS, LONGITUDE_BOUNDS},
};
use serde_json::json;

fn stats_map(fields: Vec<FieldStatistics>) -> FieldStatsMap {
    fields
        .into_iter()
        .map(|stats| (stats.path.clone(), stats))
        .collect()
}

#[test]
fn separate_columns_average_their_confidence() {
    let fields = stats_map(vec![
        numeric_field("latitude", 40.0, 53.0),
        numeric_field("lng", -74.0, 13.5),
    ]);
    let geo = detect_geo_fields(&fields).expect("geo mapping");
    assert_eq!(geo.kind, GeoMappingType::Separate);
    let lat = geo.latitude.as_ref().expect("latitude");
    let lng = geo.longitude.as_ref().expect("longitude");
    assert_eq!(lat.path, "latitude");
    assert_eq!(lng.path, "lng");
    assert!((geo.confidence - (lat.confidence + lng.confidence) / 2.0).abs() < 1e-9);
    assert!(geo.combined.is_none());
}

#[test]
fn out_of_bounds_latitude_is_rejected() {
    let fields = stats_map(vec![
        numeric_field("lat", 0.0, 120.0),
        numeric_field("lon", -10.0, 10.0),
    ]);
    let geo = detect_geo_fields(&fields).expect("longitude alone still maps");
    assert!(geo.latitude.is_none());
    assert_eq!(geo.longitude.as_ref().map(|m| m.path.as_str()), Some("lon"));
}

#[test]
fn combined_column_reports_lat_lng_order() {
    let fields = stats_map(vec![text_field_with_samples(
        "coordinates",
        &["52.52,13.405", "48.8566,2.3522", "40.7128,-74.006"],
    )]);
    let geo = detect_geo_fields(&fields).expect("geo mapping");
    assert_eq!(geo.kind, GeoMappingType::Combined);
    let combined = geo.combined.expect("combined");
    assert_eq!(combined.path, "coordinates");
    assert_eq!(combined.format, CoordinateFormat::LatLng);
    assert!(geo.confidence > 0.0 && geo.confidence <= 1.0);
}

#[test]
fn combined_column_detects_lng_lat_order() {
    let fields = stats_map(vec![text_field_with_samples(
        "coords",
        &["13.405,52.52", "-74.006,40.7128", "151.2093,-33.8688"],
    )]);
    let combined = find_combined_coordinate_field(&fields).expect("combined");
    assert_eq!(combined.format, CoordinateFormat::LngLat);
}

#[test]
fn combined_column_needs_seventy_percent_valid_pairs() {
    let fields = stats_map(vec![text_field_with_samples(
        "location_coordinates",
        &["52.52,13.405", "somewhere", "unknown", "48.85,2.35"],
    )]);
    assert!(find_combined_coordinate_field(&fields).is_none());
    assert!(detect_geo_fields(&fields).is_none());
}

#[test]
fn order_vote_ignores_blank_samples_and_caps_at_ten() {
    let mut samples = vec![json!(""), json!(null)];
    samples.extend((0..12).map(|idx| json!(format!("{}.5,{}.25", 40 + idx, 100 + idx))));
    let order = disambiguate_coordinate_order(&samples).expect("valid order");
    assert_eq!(order.format, CoordinateFormat::LatLng);
    assert_eq!(order.lat_first, 10);
    assert_eq!(order.valid_ratio, 1.0);
}

#[test]
fn bracketed_and_array_pairs_parse() {
    let order = disambiguate_coordinate_order(&[
        json!("[52.52, 13.405]"),
        json!([48.8566, 2.3522]),
        json!("(40.7128,-74.006)"),
    ])
    .expect("valid order");
    assert_eq!(order.valid_ratio, 1.0);
}

#[test]
fn single_axis_is_halved_and_drops_address() {
    let fields = stats_map(vec![
        numeric_field("latitude", 10.0, 20.0),
        text_field("address", 10, 10),
    ]);
    let geo = detect_geo_fields(&fields).expect("geo mapping");
    let lat = geo.latitude.as_ref().expect("latitude");
    assert!(geo.confidence <= lat.confidence * 0.5 + 1e-9);
    assert!(geo.location_field.is_none());
    assert!(geo.longitude.is_none());
}

#[test]
fn address_only_scales_confidence() {
    let fields = stats_map(vec![text_field("address", 10, 10)]);
    let geo = detect_geo_fields(&fields).expect("geo mapping");
    let location = geo.location_field.as_ref().expect("location field");
    assert_eq!(location.path, "address");
    assert_eq!(geo.kind, GeoMappingType::Separate);
    assert!((geo.confidence - location.confidence * 0.3).abs() < 1e-9);
}

#[test]
fn nothing_geographic_yields_none() {
    let fields = stats_map(vec![text_field("title", 10, 10)]);
    assert!(detect_geo_fields(&fields).is_none());
}

#[test]
fn textual_coordinates_validate_from_samples() {
    let valid = text_field_with_samples("lat", &["52.5", "48.1", "40.7", "-33.9"]);
    assert!(is_valid_coordinate_field(&valid, LATITUDE_BOUNDS));
    let mostly_invalid = text_field_with_samples("lat", &["52.5", "n/a", "unknown", "999"]);
    assert!(!is_valid_coordinate_field(&mostly_invalid, LATITUDE_BOUNDS));
    let longitude_range = text_field_with_samples("lon", &["170.5", "-175.0", "12.0"]);
    assert!(is_valid_coordinate_field(&longitude_range, LONGITUDE_BOUNDS));
    assert!(!is_valid_coordinate_field(&longitude_range, LATITUDE_BOUNDS));
}

#[test]
fn address_patterns_follow_language() {
    let fields = stats_map(vec![text_field("adresse", 10, 10)]);
    let geo = schema_detect::geo::detect_geo_fields_for_language(&fields, Language::German)
        .expect("german address");
    assert_eq!(
        geo.location_field.map(|m| m.path),
        Some("adresse".to_string())
    );
}

#[test]
fn combined_column_keeps_address_fallback() {
    let fields = stats_map(vec![
        text_field_with_samples("coordinates", &["52.52,13.405", "48.8566,2.3522"]),
        text_field("address", 10, 10),
    ]);
    let geo = detect_geo_fields(&fields).expect("geo mapping");
    assert_eq!(geo.kind, GeoMappingType::Combined);
    assert_eq!(
        geo.combined.as_ref().map(|c| c.path.as_str()),
        Some("coordinates")
    );
    assert_eq!(
        geo.location_field.as_ref().map(|m| m.path.as_str()),
        Some("address")
    );
}

#[test]
fn longitude_only_is_halved() {
    let fields = stats_map(vec![numeric_field("longitude", -10.0, 30.0)]);
    let geo = detect_geo_fields(&fields).expect("geo mapping");
    assert_eq!(geo.kind, GeoMappingType::Separate);
    assert!(geo.latitude.is_none());
    let lng = geo.longitude.as_ref().expect("longitude");
    assert_eq!(lng.path, "longitude");
    assert!((geo.confidence - lng.confidence * 0.5).abs() < 1e-9);
}
