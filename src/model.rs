//! Data model shared by every detector.
//!
//! [`FieldStatistics`] and [`DetectionContext`] are inputs built by an upstream
//! schema builder (see [`crate::profile`]); [`DetectionResult`] and its parts are
//! the outputs handed to a mapping UI. Everything serializes to camelCase JSON.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One sample row, keyed by column name.
pub type SampleRow = Map<String, Value>;

/// Observed JSON-ish type of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Object,
    Array,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
            ValueKind::Null => "null",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        }
    }
}

/// Recognized textual format of a string cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueFormat {
    Date,
    DateTime,
    Time,
    Email,
    Url,
    Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub is_integer: bool,
}

/// Statistics for a single column path. Read-only for detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStatistics {
    pub path: String,
    pub occurrences: usize,
    pub occurrence_percent: f64,
    pub null_count: usize,
    pub unique_values: usize,
    #[serde(default)]
    pub unique_samples: Vec<Value>,
    #[serde(default)]
    pub type_distribution: BTreeMap<ValueKind, usize>,
    #[serde(default)]
    pub formats: BTreeMap<ValueFormat, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_stats: Option<NumericStats>,
    #[serde(default)]
    pub is_enum_candidate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub depth: usize,
}

impl FieldStatistics {
    /// Empty statistics for `path`; callers fill in the counters they know.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let depth = path.matches('.').count();
        Self {
            path,
            occurrences: 0,
            occurrence_percent: 0.0,
            null_count: 0,
            unique_values: 0,
            unique_samples: Vec::new(),
            type_distribution: BTreeMap::new(),
            formats: BTreeMap::new(),
            numeric_stats: None,
            is_enum_candidate: false,
            first_seen: None,
            last_seen: None,
            depth,
        }
    }

    /// Last segment of a dotted path (`address.city` -> `city`).
    pub fn leaf_name(&self) -> &str {
        leaf_name(&self.path)
    }

    pub fn type_count(&self, kind: ValueKind) -> usize {
        self.type_distribution.get(&kind).copied().unwrap_or(0)
    }

    pub fn has_type(&self, kind: ValueKind) -> bool {
        self.type_count(kind) > 0
    }

    pub fn format_count(&self, format: ValueFormat) -> usize {
        self.formats.get(&format).copied().unwrap_or(0)
    }

    pub fn has_format(&self, format: ValueFormat) -> bool {
        self.format_count(format) > 0
    }

    /// Share of typed observations that were strings.
    pub fn string_share(&self) -> f64 {
        let total: usize = self.type_distribution.values().sum();
        if total == 0 {
            0.0
        } else {
            self.type_count(ValueKind::String) as f64 / total as f64
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.has_type(ValueKind::Number) || self.has_type(ValueKind::Integer)
    }
}

pub fn leaf_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Host-enforced settings attached to a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorConfig {
    pub enabled: bool,
    pub priority: i32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: 0,
        }
    }
}

/// Everything a detector may look at. Built fresh per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionContext {
    pub field_stats: BTreeMap<String, FieldStatistics>,
    #[serde(default)]
    pub sample_data: Vec<SampleRow>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub config: DetectorConfig,
}

impl DetectionContext {
    pub fn new(
        field_stats: impl IntoIterator<Item = FieldStatistics>,
        sample_data: Vec<SampleRow>,
        headers: Vec<String>,
    ) -> Self {
        Self {
            field_stats: field_stats
                .into_iter()
                .map(|stats| (stats.path.clone(), stats))
                .collect(),
            sample_data,
            headers,
            config: DetectorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageResult {
    pub code: String,
    pub name: String,
    pub confidence: f64,
    pub is_reliable: bool,
}

impl Default for LanguageResult {
    fn default() -> Self {
        Self {
            code: "eng".to_string(),
            name: "English".to_string(),
            confidence: 0.0,
            is_reliable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub path: String,
    pub confidence: f64,
}

impl FieldMapping {
    pub fn new(path: impl Into<String>, confidence: f64) -> Self {
        Self {
            path: path.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoMappingType {
    Separate,
    Combined,
}

/// Axis order inside a combined coordinate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateFormat {
    #[serde(rename = "lat,lng")]
    LatLng,
    #[serde(rename = "lng,lat")]
    LngLat,
}

impl CoordinateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateFormat::LatLng => "lat,lng",
            CoordinateFormat::LngLat => "lng,lat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedCoordinate {
    pub path: String,
    pub format: CoordinateFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFieldMapping {
    #[serde(rename = "type")]
    pub kind: GeoMappingType,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<FieldMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<FieldMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined: Option<CombinedCoordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_field: Option<FieldMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMappings {
    pub title: Option<FieldMapping>,
    pub description: Option<FieldMapping>,
    pub timestamp: Option<FieldMapping>,
    pub location_name: Option<FieldMapping>,
    pub geo: Option<GeoFieldMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternResult {
    pub id_fields: BTreeSet<String>,
    pub enum_fields: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub language: LanguageResult,
    pub field_mappings: FieldMappings,
    pub patterns: PatternResult,
}

impl DetectionResult {
    /// Result returned when no detector is registered at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every confidence carried by this result, for invariant checks and reports.
    pub fn confidences(&self) -> Vec<f64> {
        let mappings = &self.field_mappings;
        let mut values = vec![self.language.confidence];
        values.extend(
            [
                &mappings.title,
                &mappings.description,
                &mappings.timestamp,
                &mappings.location_name,
            ]
            .into_iter()
            .flatten()
            .map(|mapping| mapping.confidence),
        );
        if let Some(geo) = &mappings.geo {
            values.push(geo.confidence);
            values.extend(
                [&geo.latitude, &geo.longitude, &geo.location_field]
                    .into_iter()
                    .flatten()
                    .map(|mapping| mapping.confidence),
            );
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_serializes_all_keys() {
        let json = serde_json::to_value(DetectionResult::empty()).expect("serialize");
        assert_eq!(json["language"]["code"], "eng");
        assert_eq!(json["language"]["isReliable"], false);
        let mappings = json["fieldMappings"].as_object().expect("mappings object");
        for key in ["title", "description", "timestamp", "locationName", "geo"] {
            assert!(mappings[key].is_null(), "{key} should be null");
        }
        assert_eq!(json["patterns"]["idFields"], serde_json::json!([]));
        assert_eq!(json["patterns"]["enumFields"], serde_json::json!([]));
    }

    #[test]
    fn geo_mapping_uses_wire_names() {
        let geo = GeoFieldMapping {
            kind: GeoMappingType::Combined,
            confidence: 0.9,
            latitude: None,
            longitude: None,
            combined: Some(CombinedCoordinate {
                path: "coordinates".to_string(),
                format: CoordinateFormat::LngLat,
            }),
            location_field: None,
        };
        let json = serde_json::to_value(&geo).expect("serialize");
        assert_eq!(json["type"], "combined");
        assert_eq!(json["combined"]["format"], "lng,lat");
        assert!(json.get("latitude").is_none());
    }

    #[test]
    fn leaf_name_takes_last_segment() {
        let stats = FieldStatistics::new("venue.address.city");
        assert_eq!(stats.leaf_name(), "city");
        assert_eq!(stats.depth, 2);
        assert_eq!(leaf_name("title"), "title");
    }

    #[test]
    fn field_mapping_clamps_confidence() {
        assert_eq!(FieldMapping::new("x", 1.7).confidence, 1.0);
        assert_eq!(FieldMapping::new("x", -0.2).confidence, 0.0);
    }
}
