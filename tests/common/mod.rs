#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use schema_detect::model::{
    DetectionContext, FieldStatistics, NumericStats, SampleRow, ValueFormat, ValueKind,
};
use serde_json::Value;
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// String column seen `occurrences` times with `unique` distinct values.
pub fn text_field(path: &str, occurrences: usize, unique: usize) -> FieldStatistics {
    let mut stats = FieldStatistics::new(path);
    stats.occurrences = occurrences;
    stats.occurrence_percent = 100.0;
    stats.unique_values = unique;
    stats.unique_samples = (0..unique.min(20))
        .map(|idx| Value::String(format!("{path} value {idx}")))
        .collect();
    stats.type_distribution.insert(ValueKind::String, occurrences);
    stats
}

/// String column whose samples are exactly `samples`.
pub fn text_field_with_samples(path: &str, samples: &[&str]) -> FieldStatistics {
    let mut stats = FieldStatistics::new(path);
    stats.occurrences = samples.len();
    stats.occurrence_percent = 100.0;
    stats.unique_values = samples.len();
    stats.unique_samples = samples
        .iter()
        .map(|sample| Value::String(sample.to_string()))
        .collect();
    stats
        .type_distribution
        .insert(ValueKind::String, samples.len());
    stats
}

pub fn numeric_field(path: &str, min: f64, max: f64) -> FieldStatistics {
    let mut stats = FieldStatistics::new(path);
    stats.occurrences = 10;
    stats.occurrence_percent = 100.0;
    stats.unique_values = 10;
    stats.type_distribution.insert(ValueKind::Number, 10);
    stats.numeric_stats = Some(NumericStats {
        min,
        max,
        avg: (min + max) / 2.0,
        is_integer: false,
    });
    stats
}

pub fn date_field(path: &str) -> FieldStatistics {
    let mut stats = text_field(path, 10, 10);
    stats.formats.insert(ValueFormat::Date, 10);
    stats
}

/// Context with no sample rows, so language detection falls back to English.
pub fn context(fields: Vec<FieldStatistics>) -> DetectionContext {
    DetectionContext::new(fields, Vec::new(), Vec::new())
}

pub fn row(value: Value) -> SampleRow {
    value.as_object().cloned().expect("object row")
}
