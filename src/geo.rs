//! Coordinate column resolution.
//!
//! Latitude/longitude can arrive as two numeric or textual columns, or as one
//! combined `"a,b"` column whose axis order has to be inferred from the values.
//! A free-text address column is tracked alongside as a geocoding fallback.

use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::{
    language::Language,
    mapping::{self, FieldStatsMap},
    model::{
        CombinedCoordinate, CoordinateFormat, FieldMapping, FieldStatistics, GeoFieldMapping,
        GeoMappingType, ValueKind,
    },
    patterns::{
        self, COMBINED_PATTERNS, CoordinateBounds, FieldRole, LATITUDE_BOUNDS, LATITUDE_PATTERNS,
        LONGITUDE_BOUNDS, LONGITUDE_PATTERNS,
    },
};

/// Maximum number of samples inspected per column.
pub const MAX_COORDINATE_SAMPLES: usize = 10;
/// Share of inspected samples that must be valid.
pub const MIN_VALID_RATIO: f64 = 0.7;

const SINGLE_AXIS_FACTOR: f64 = 0.5;
const LOCATION_ONLY_FACTOR: f64 = 0.3;

fn sample_as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|parsed| parsed.is_finite())
}

/// Checks that a column's values fit `bounds`, from numeric stats or samples.
pub fn is_valid_coordinate_field(stats: &FieldStatistics, bounds: CoordinateBounds) -> bool {
    if stats.is_numeric()
        && let Some(numeric) = &stats.numeric_stats
    {
        return numeric.min >= bounds.min && numeric.max <= bounds.max;
    }
    if !stats.has_type(ValueKind::String) && !stats.is_numeric() {
        return false;
    }
    let inspected: Vec<&Value> = stats
        .unique_samples
        .iter()
        .take(MAX_COORDINATE_SAMPLES)
        .collect();
    if inspected.is_empty() {
        return false;
    }
    let valid = inspected
        .iter()
        .filter_map(|value| sample_as_f64(value))
        .filter(|parsed| bounds.contains(*parsed))
        .count();
    valid as f64 / inspected.len() as f64 >= MIN_VALID_RATIO
}

/// Highest-confidence column matching `patterns` whose values fit `bounds`.
pub fn find_coordinate_field(
    field_stats: &FieldStatsMap,
    patterns: &[Regex],
    bounds: CoordinateBounds,
) -> Option<FieldMapping> {
    let mut best: Option<FieldMapping> = None;
    for (path, stats) in field_stats {
        let Some(index) = patterns::first_match(patterns, stats.leaf_name()) else {
            continue;
        };
        if !is_valid_coordinate_field(stats, bounds) {
            continue;
        }
        let confidence = patterns::pattern_confidence(index, patterns.len());
        if best
            .as_ref()
            .is_none_or(|current| confidence > current.confidence)
        {
            best = Some(FieldMapping::new(path.clone(), confidence));
        }
    }
    best
}

/// Outcome of inspecting the values of a combined coordinate column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateOrder {
    pub format: CoordinateFormat,
    /// Share of inspected samples that parsed as an in-bounds pair.
    pub valid_ratio: f64,
    pub lat_first: usize,
    pub lng_first: usize,
}

fn parse_pair(value: &Value) -> Option<(f64, f64)> {
    let raw = match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(","),
        _ => return None,
    };
    let trimmed = raw
        .trim()
        .trim_matches(|ch: char| matches!(ch, '[' | ']' | '(' | ')'));
    let mut parts = trimmed.split(',');
    let first = parts.next()?.trim().parse::<f64>().ok()?;
    let second = parts.next()?.trim().parse::<f64>().ok()?;
    if parts.next().is_some() || !first.is_finite() || !second.is_finite() {
        return None;
    }
    Some((first, second))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Votes on axis order over at most ten non-empty samples.
///
/// Returns `None` when fewer than 70% of them are valid two-number pairs. Ties
/// resolve to `lat,lng`.
pub fn disambiguate_coordinate_order(samples: &[Value]) -> Option<CoordinateOrder> {
    let inspected: Vec<&Value> = samples
        .iter()
        .filter(|value| !is_blank(value))
        .take(MAX_COORDINATE_SAMPLES)
        .collect();
    if inspected.is_empty() {
        return None;
    }

    let mut lat_first = 0usize;
    let mut lng_first = 0usize;
    let mut valid = 0usize;
    for value in &inspected {
        let Some((a, b)) = parse_pair(value) else {
            continue;
        };
        let as_lat_lng = LATITUDE_BOUNDS.contains(a) && LONGITUDE_BOUNDS.contains(b);
        let as_lng_lat = LONGITUDE_BOUNDS.contains(a) && LATITUDE_BOUNDS.contains(b);
        if as_lat_lng {
            lat_first += 1;
        }
        if as_lng_lat {
            lng_first += 1;
        }
        if as_lat_lng || as_lng_lat {
            valid += 1;
        }
    }

    let valid_ratio = valid as f64 / inspected.len() as f64;
    if valid_ratio < MIN_VALID_RATIO {
        return None;
    }
    let format = if lat_first >= lng_first {
        CoordinateFormat::LatLng
    } else {
        CoordinateFormat::LngLat
    };
    Some(CoordinateOrder {
        format,
        valid_ratio,
        lat_first,
        lng_first,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedMatch {
    pub path: String,
    pub format: CoordinateFormat,
    pub confidence: f64,
}

/// First combined-coordinate column (by pattern specificity) whose samples validate.
pub fn find_combined_coordinate_field(field_stats: &FieldStatsMap) -> Option<CombinedMatch> {
    let mut candidates: Vec<(usize, &FieldStatistics)> = field_stats
        .values()
        .filter_map(|stats| {
            patterns::first_match(&COMBINED_PATTERNS, stats.leaf_name()).map(|idx| (idx, stats))
        })
        .collect();
    candidates.sort_by_key(|(idx, _)| *idx);

    candidates.into_iter().find_map(|(_, stats)| {
        disambiguate_coordinate_order(&stats.unique_samples).map(|order| CombinedMatch {
            path: stats.path.clone(),
            format: order.format,
            confidence: order.valid_ratio.clamp(0.0, 1.0),
        })
    })
}

/// Address-like text column usable for geocoding.
pub fn find_location_field(field_stats: &FieldStatsMap, language: Language) -> Option<FieldMapping> {
    mapping::find_field_by_pattern(
        field_stats,
        patterns::role_patterns(FieldRole::Address, language),
        mapping::is_text_field,
    )
}

/// Geo mapping using English address patterns.
pub fn detect_geo_fields(field_stats: &FieldStatsMap) -> Option<GeoFieldMapping> {
    detect_geo_fields_for_language(field_stats, Language::English)
}

/// Walks the decision ladder: both axes, combined column, one axis, address only.
pub fn detect_geo_fields_for_language(
    field_stats: &FieldStatsMap,
    language: Language,
) -> Option<GeoFieldMapping> {
    let latitude = find_coordinate_field(field_stats, &LATITUDE_PATTERNS, LATITUDE_BOUNDS);
    let longitude = find_coordinate_field(field_stats, &LONGITUDE_PATTERNS, LONGITUDE_BOUNDS);
    let location_field = find_location_field(field_stats, language);

    let separate = |latitude, longitude, location_field, confidence: f64| GeoFieldMapping {
        kind: GeoMappingType::Separate,
        confidence: confidence.clamp(0.0, 1.0),
        latitude,
        longitude,
        combined: None,
        location_field,
    };

    match (latitude, longitude) {
        (Some(lat), Some(lng)) => {
            let confidence = (lat.confidence + lng.confidence) / 2.0;
            debug!("Geo: separate columns {} / {}", lat.path, lng.path);
            return Some(separate(Some(lat), Some(lng), location_field, confidence));
        }
        (latitude, longitude) => {
            if let Some(combined) = find_combined_coordinate_field(field_stats) {
                debug!(
                    "Geo: combined column {} ({})",
                    combined.path,
                    combined.format.as_str()
                );
                return Some(GeoFieldMapping {
                    kind: GeoMappingType::Combined,
                    confidence: combined.confidence,
                    latitude: None,
                    longitude: None,
                    combined: Some(CombinedCoordinate {
                        path: combined.path,
                        format: combined.format,
                    }),
                    location_field,
                });
            }
            if let Some(lat) = latitude {
                debug!("Geo: latitude only ({})", lat.path);
                let confidence = lat.confidence * SINGLE_AXIS_FACTOR;
                return Some(separate(Some(lat), None, None, confidence));
            }
            if let Some(lng) = longitude {
                debug!("Geo: longitude only ({})", lng.path);
                let confidence = lng.confidence * SINGLE_AXIS_FACTOR;
                return Some(separate(None, Some(lng), None, confidence));
            }
        }
    }

    location_field.map(|location| {
        debug!("Geo: address only ({})", location.path);
        let confidence = location.confidence * LOCATION_ONLY_FACTOR;
        separate(None, None, Some(location), confidence)
    })
}
