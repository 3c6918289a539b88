//! Identifier and enumeration column detection.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::{
    config::{EnumMode, EnumOptions},
    mapping::FieldStatsMap,
    model::{FieldStatistics, ValueKind},
    patterns::{LATITUDE_BOUNDS, LONGITUDE_BOUNDS},
};

const ID_NAME_PATTERNS: &[&str] = &[r"^id$", r"_id$", r"^uuid$", r"^guid$", r"^key$", r"_key$"];
const NUMERIC_ID_FLOOR: f64 = 1_000_000.0;

static ID_NAMES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ID_NAME_PATTERNS
        .iter()
        .map(|pattern| Regex::new(&format!("(?i){pattern}")).expect("Invalid regex: id name"))
        .collect()
});

static UUID_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("Invalid regex: UUID")
});
static OBJECT_ID_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9a-f]{24}$").expect("Invalid regex: ObjectId"));
static ALPHANUMERIC_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{8,}$").expect("Invalid regex: alphanumeric id"));

fn has_id_name(stats: &FieldStatistics) -> bool {
    let name = stats.leaf_name();
    ID_NAMES.iter().any(|pattern| pattern.is_match(name))
}

/// Every value distinct, more than one observation, and scalar typed.
fn has_id_characteristics(stats: &FieldStatistics) -> bool {
    stats.unique_values == stats.occurrences
        && stats.occurrences > 1
        && (stats.has_type(ValueKind::String)
            || stats.has_type(ValueKind::Number)
            || stats.has_type(ValueKind::Integer))
}

pub fn detect_id_fields(field_stats: &FieldStatsMap) -> BTreeSet<String> {
    field_stats
        .iter()
        .filter(|(_, stats)| has_id_name(stats) || has_id_characteristics(stats))
        .map(|(path, _)| path.clone())
        .collect()
}

fn is_enum_field(stats: &FieldStatistics, options: &EnumOptions) -> bool {
    if !stats.has_type(ValueKind::String) || stats.unique_samples.is_empty() {
        return false;
    }
    let within_threshold = match options.mode {
        EnumMode::Count => stats.unique_values as f64 <= options.threshold,
        EnumMode::Percentage => {
            stats.occurrences > 0
                && stats.unique_values as f64 / stats.occurrences as f64
                    <= options.threshold / 100.0
        }
    };
    within_threshold && stats.unique_values > 1 && stats.unique_values < stats.occurrences
}

pub fn detect_enum_fields(field_stats: &FieldStatsMap, options: &EnumOptions) -> BTreeSet<String> {
    field_stats
        .iter()
        .filter(|(_, stats)| is_enum_field(stats, options))
        .map(|(path, _)| path.clone())
        .collect()
}

/// Heuristic for a single value: UUID, ObjectId, long token, or large number.
pub fn looks_like_id(value: &Value) -> bool {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            UUID_VALUE.is_match(trimmed)
                || OBJECT_ID_VALUE.is_match(trimmed)
                || ALPHANUMERIC_VALUE.is_match(trimmed)
        }
        Value::Number(number) => number.as_f64().is_some_and(|n| n > NUMERIC_ID_FLOOR),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Lat,
    Lng,
}

pub fn looks_like_coordinate(value: &Value, axis: Axis) -> bool {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    let bounds = match axis {
        Axis::Lat => LATITUDE_BOUNDS,
        Axis::Lng => LONGITUDE_BOUNDS,
    };
    parsed.is_some_and(|n| bounds.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_by_name_or_shape() {
        let mut named = FieldStatistics::new("user_ID");
        named.occurrences = 10;
        named.unique_values = 3;
        let mut unique = FieldStatistics::new("code");
        unique.occurrences = 5;
        unique.unique_values = 5;
        unique.type_distribution.insert(ValueKind::String, 5);
        let mut single = FieldStatistics::new("singleton");
        single.occurrences = 1;
        single.unique_values = 1;
        single.type_distribution.insert(ValueKind::String, 1);

        let fields: FieldStatsMap = [named, unique, single]
            .into_iter()
            .map(|s| (s.path.clone(), s))
            .collect();
        let ids = detect_id_fields(&fields);
        assert!(ids.contains("user_ID"));
        assert!(ids.contains("code"));
        assert!(!ids.contains("singleton"));
    }

    #[test]
    fn id_name_requires_suffix_boundary() {
        let stats = FieldStatistics::new("valid");
        assert!(!has_id_name(&stats));
        assert!(has_id_name(&FieldStatistics::new("api_key")));
    }

    #[test]
    fn looks_like_id_variants() {
        assert!(looks_like_id(&json!("550e8400-e29b-41d4-a716-446655440000")));
        assert!(looks_like_id(&json!("507f1f77bcf86cd799439011")));
        assert!(looks_like_id(&json!("ORD20240517")));
        assert!(looks_like_id(&json!(12_345_678)));
        assert!(!looks_like_id(&json!(42)));
        assert!(!looks_like_id(&json!("Berlin")));
        assert!(!looks_like_id(&json!(true)));
    }

    #[test]
    fn coordinate_axis_bounds() {
        assert!(looks_like_coordinate(&json!(89.9), Axis::Lat));
        assert!(!looks_like_coordinate(&json!(120.0), Axis::Lat));
        assert!(looks_like_coordinate(&json!("-179.5"), Axis::Lng));
        assert!(!looks_like_coordinate(&json!("north"), Axis::Lng));
    }
}
