//! Detection options and their YAML representation.
//!
//! ```yaml
//! enum_threshold: 25
//! enum_mode: percentage
//! sample_rows: 500
//! ```

use std::{fmt, fs, path::Path, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ENUM_THRESHOLD: f64 = 50.0;
pub const DEFAULT_SAMPLE_ROWS: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown enum mode '{0}' (expected 'count' or 'percentage')")]
    InvalidEnumMode(String),
    #[error("enum threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f64),
    #[error("percentage enum threshold must be at most 100, got {0}")]
    PercentageOutOfRange(f64),
    #[error("reading options file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing options file {path}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// How `enum_threshold` is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnumMode {
    /// Absolute number of distinct values.
    #[default]
    Count,
    /// Distinct values as a percentage of occurrences.
    Percentage,
}

impl FromStr for EnumMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(EnumMode::Count),
            "percentage" | "percent" | "pct" => Ok(EnumMode::Percentage),
            other => Err(ConfigError::InvalidEnumMode(other.to_string())),
        }
    }
}

impl fmt::Display for EnumMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumMode::Count => f.write_str("count"),
            EnumMode::Percentage => f.write_str("percentage"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumOptions {
    pub threshold: f64,
    pub mode: EnumMode,
}

impl Default for EnumOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ENUM_THRESHOLD,
            mode: EnumMode::Count,
        }
    }
}

impl EnumOptions {
    pub fn new(threshold: f64, mode: EnumMode) -> Result<Self, ConfigError> {
        let options = Self { threshold, mode };
        options.ensure_valid()?;
        Ok(options)
    }

    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.mode == EnumMode::Percentage && self.threshold > 100.0 {
            return Err(ConfigError::PercentageOutOfRange(self.threshold));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionOptions {
    pub enum_threshold: f64,
    pub enum_mode: EnumMode,
    /// Rows kept as `sampleData` for language detection.
    pub sample_rows: usize,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            enum_threshold: DEFAULT_ENUM_THRESHOLD,
            enum_mode: EnumMode::default(),
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}

impl DetectionOptions {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let options = Self::from_yaml_str(&raw).map_err(|err| match err {
            ConfigError::Yaml { source, .. } => ConfigError::Yaml {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        Ok(options)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let options: DetectionOptions =
            serde_yaml::from_str(raw).map_err(|source| ConfigError::Yaml {
                path: "<inline>".to_string(),
                source,
            })?;
        options.enum_options()?;
        Ok(options)
    }

    pub fn enum_options(&self) -> Result<EnumOptions, ConfigError> {
        EnumOptions::new(self.enum_threshold, self.enum_mode)
    }
}
