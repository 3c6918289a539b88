//! Field statistics builder.
//!
//! Turns parsed records into the [`FieldStatistics`] map a detector consumes.
//! Tabular rows are first typed cell by cell ([`type_cell`]) so that numbers
//! and booleans are profiled as such; JSON records are taken as they are and
//! nested objects are flattened into dotted paths.

use std::{
    collections::{BTreeMap, HashSet},
    sync::LazyLock,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::{
    config::DetectionOptions,
    model::{
        DetectionContext, FieldStatistics, NumericStats, SampleRow, ValueFormat, ValueKind,
    },
};

/// Distinct values kept per column in `unique_samples`.
pub const MAX_UNIQUE_SAMPLES: usize = 20;
const ENUM_HINT_MAX_UNIQUE: usize = 50;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex: email"));
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?|ftp)://[^\s]+$").expect("Invalid regex: url"));

/// Converts a raw tabular cell into a typed JSON value.
pub fn type_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Value::Number(integer.into());
    }
    if trimmed.chars().any(|ch| ch.is_ascii_digit())
        && let Ok(float) = trimmed.parse::<f64>()
        && let Some(number) = Number::from_f64(float)
    {
        return Value::Number(number);
    }
    Value::String(raw.to_string())
}

pub fn value_kind(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Bool(_) => ValueKind::Boolean,
        Value::Number(number) if number.is_i64() || number.is_u64() => ValueKind::Integer,
        Value::Number(_) => ValueKind::Number,
        Value::String(_) => ValueKind::String,
        Value::Array(_) => ValueKind::Array,
        Value::Object(_) => ValueKind::Object,
    }
}

/// Recognized textual format of a string value, most specific first.
pub fn detect_format(value: &str) -> Option<ValueFormat> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if DateTime::parse_from_rfc3339(trimmed).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).is_ok())
    {
        return Some(ValueFormat::DateTime);
    }
    if DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(trimmed, fmt).is_ok())
    {
        return Some(ValueFormat::Date);
    }
    if TIME_FORMATS
        .iter()
        .any(|fmt| NaiveTime::parse_from_str(trimmed, fmt).is_ok())
    {
        return Some(ValueFormat::Time);
    }
    if EMAIL.is_match(trimmed) {
        return Some(ValueFormat::Email);
    }
    if URL.is_match(trimmed) {
        return Some(ValueFormat::Url);
    }
    let guid = trimmed.trim_matches(|c: char| matches!(c, '{' | '}'));
    if Uuid::parse_str(guid).is_ok() {
        return Some(ValueFormat::Uuid);
    }
    None
}

#[derive(Debug, Clone, Copy)]
struct NumericAccumulator {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
    all_integer: bool,
}

impl NumericAccumulator {
    fn new(value: f64, is_integer: bool) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
            count: 1,
            all_integer: is_integer,
        }
    }

    fn ingest(&mut self, value: f64, is_integer: bool) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
        self.all_integer &= is_integer;
    }

    fn finish(&self) -> NumericStats {
        NumericStats {
            min: self.min,
            max: self.max,
            avg: self.sum / self.count as f64,
            is_integer: self.all_integer,
        }
    }
}

#[derive(Debug)]
struct FieldAccumulator {
    path: String,
    occurrences: usize,
    null_count: usize,
    distinct: HashSet<String>,
    samples: Vec<Value>,
    types: BTreeMap<ValueKind, usize>,
    formats: BTreeMap<ValueFormat, usize>,
    numeric: Option<NumericAccumulator>,
}

impl FieldAccumulator {
    fn new(path: String) -> Self {
        Self {
            path,
            occurrences: 0,
            null_count: 0,
            distinct: HashSet::new(),
            samples: Vec::new(),
            types: BTreeMap::new(),
            formats: BTreeMap::new(),
            numeric: None,
        }
    }

    fn ingest(&mut self, value: &Value) {
        self.occurrences += 1;
        let kind = value_kind(value);
        *self.types.entry(kind).or_insert(0) += 1;
        match value {
            Value::Null => {
                self.null_count += 1;
                return;
            }
            Value::Object(_) | Value::Array(_) => return,
            Value::String(text) => {
                if let Some(format) = detect_format(text) {
                    *self.formats.entry(format).or_insert(0) += 1;
                }
            }
            Value::Number(number) => {
                if let Some(parsed) = number.as_f64() {
                    let is_integer = kind == ValueKind::Integer;
                    match &mut self.numeric {
                        Some(acc) => acc.ingest(parsed, is_integer),
                        None => self.numeric = Some(NumericAccumulator::new(parsed, is_integer)),
                    }
                }
            }
            Value::Bool(_) => {}
        }
        let key = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        if self.distinct.insert(key) && self.samples.len() < MAX_UNIQUE_SAMPLES {
            self.samples.push(value.clone());
        }
    }

    fn finish(self, total_records: usize, seen_at: DateTime<Utc>) -> FieldStatistics {
        let unique_values = self.distinct.len();
        let is_enum_candidate = self.types.contains_key(&ValueKind::String)
            && unique_values > 1
            && unique_values <= ENUM_HINT_MAX_UNIQUE
            && unique_values < self.occurrences;
        let present = self.occurrences - self.null_count;
        let occurrence_percent = if total_records == 0 {
            0.0
        } else {
            present as f64 / total_records as f64 * 100.0
        };
        let mut stats = FieldStatistics::new(self.path);
        stats.occurrences = self.occurrences;
        stats.occurrence_percent = occurrence_percent;
        stats.null_count = self.null_count;
        stats.unique_values = unique_values;
        stats.unique_samples = self.samples;
        stats.type_distribution = self.types;
        stats.formats = self.formats;
        stats.numeric_stats = self.numeric.map(|acc| acc.finish());
        stats.is_enum_candidate = is_enum_candidate;
        stats.first_seen = Some(seen_at);
        stats.last_seen = Some(seen_at);
        stats
    }
}

fn walk_record(
    prefix: Option<&str>,
    record: &Map<String, Value>,
    fields: &mut BTreeMap<String, FieldAccumulator>,
) {
    for (key, value) in record {
        let path = match prefix {
            Some(parent) => format!("{parent}.{key}"),
            None => key.clone(),
        };
        fields
            .entry(path.clone())
            .or_insert_with(|| FieldAccumulator::new(path.clone()))
            .ingest(value);
        if let Value::Object(nested) = value {
            walk_record(Some(&path), nested, fields);
        }
    }
}

/// Statistics for every (possibly nested) path across `records`.
pub fn profile_records(records: &[SampleRow]) -> BTreeMap<String, FieldStatistics> {
    let mut fields = BTreeMap::new();
    for record in records {
        walk_record(None, record, &mut fields);
    }
    let seen_at = Utc::now();
    fields
        .into_iter()
        .map(|(path, acc)| (path, acc.finish(records.len(), seen_at)))
        .collect()
}

/// Typed records for tabular rows; short rows are padded with nulls.
pub fn rows_to_records(headers: &[String], rows: &[Vec<String>]) -> Vec<SampleRow> {
    rows.iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let value = row.get(idx).map(|cell| type_cell(cell)).unwrap_or(Value::Null);
                    (header.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// Builds a detection context from already-typed records.
pub fn build_context_from_records(
    headers: Vec<String>,
    records: Vec<SampleRow>,
    options: &DetectionOptions,
) -> DetectionContext {
    let field_stats = profile_records(&records);
    let mut sample_data = records;
    sample_data.truncate(options.sample_rows);
    DetectionContext {
        field_stats,
        sample_data,
        headers,
        config: Default::default(),
    }
}

/// Builds a detection context from tabular rows.
pub fn build_context(
    headers: &[String],
    rows: &[Vec<String>],
    options: &DetectionOptions,
) -> DetectionContext {
    let records = rows_to_records(headers, rows);
    build_context_from_records(headers.to_vec(), records, options)
}
