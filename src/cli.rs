use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::EnumMode;

#[derive(Debug, Parser)]
#[command(author, version, about = "Detect field mappings in tabular datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect semantic field mappings, coordinates, id and enum columns
    Detect(DetectArgs),
    /// Print the per-column statistics the detectors work from
    Profile(ProfileArgs),
    /// Identify the language of a dataset's headers and text values
    Language(InputArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV/TSV file, JSON array file, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to read (0 reads the whole file)
    #[arg(long, default_value_t = 1000)]
    pub limit: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Rows kept as sample data for language detection
    #[arg(long = "sample-rows")]
    pub sample_rows: Option<usize>,
    /// YAML file with detection options
    #[arg(long)]
    pub options: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Detector to use; falls back to the default detector
    #[arg(short = 'd', long = "detector")]
    pub detector: Option<String>,
    /// Maximum distinct values for an enum column
    #[arg(long = "enum-threshold")]
    pub enum_threshold: Option<f64>,
    /// Interpret the enum threshold as a count or a percentage
    #[arg(long = "enum-mode", value_enum)]
    pub enum_mode: Option<EnumMode>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" => Ok(b'\t'),
        "comma" => Ok(b','),
        "semicolon" => Ok(b';'),
        "pipe" => Ok(b'|'),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) if ch.is_ascii() => Ok(ch as u8),
                _ => Err(format!("Delimiter must be a single ASCII character, got '{other}'")),
            }
        }
    }
}
