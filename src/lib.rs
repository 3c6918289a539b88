pub mod cli;
pub mod config;
pub mod detector;
pub mod geo;
pub mod io_utils;
pub mod language;
pub mod mapping;
pub mod model;
pub mod patterns;
pub mod profile;
pub mod report;
pub mod structure;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, DetectArgs, InputArgs, OutputFormat, ProfileArgs},
    config::DetectionOptions,
    detector::DetectionService,
    model::DetectionContext,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("schema_detect", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Detect(args) => handle_detect(&args),
        Commands::Profile(args) => handle_profile(&args),
        Commands::Language(args) => handle_language(&args),
    }
}

fn handle_detect(args: &DetectArgs) -> Result<()> {
    let mut options = load_options(&args.input)?;
    if let Some(threshold) = args.enum_threshold {
        options.enum_threshold = threshold;
    }
    if let Some(mode) = args.enum_mode {
        options.enum_mode = mode;
    }
    let enum_options = options
        .enum_options()
        .context("Validating enum detection options")?;
    debug!("Enum detection: threshold {} ({})", enum_options.threshold, enum_options.mode);

    let context = load_context(&args.input, &options)?;
    let service = DetectionService::with_default(enum_options);
    let result = service.detect(args.detector.as_deref(), &context);
    info!(
        "Detected language '{}' and {} id / {} enum field(s) across {} column(s)",
        result.language.code,
        result.patterns.id_fields.len(),
        result.patterns.enum_fields.len(),
        context.field_stats.len()
    );

    match args.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Serializing detection result")?
        ),
        OutputFormat::Table => print!("{}", report::render_detection(&result)),
    }
    Ok(())
}

fn handle_profile(args: &ProfileArgs) -> Result<()> {
    let options = load_options(&args.input)?;
    let context = load_context(&args.input, &options)?;
    info!("Profiled {} column path(s)", context.field_stats.len());
    match args.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&context.field_stats)
                .context("Serializing field statistics")?
        ),
        OutputFormat::Table => print!("{}", report::render_profile(&context.field_stats)),
    }
    Ok(())
}

fn handle_language(args: &InputArgs) -> Result<()> {
    let options = load_options(args)?;
    let context = load_context(args, &options)?;
    let result = language::detect_language(&context.sample_data, &context.headers);
    info!(
        "Language '{}' with confidence {:.2}",
        result.code, result.confidence
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&result).context("Serializing language result")?
    );
    Ok(())
}

fn load_options(args: &InputArgs) -> Result<DetectionOptions> {
    let mut options = match &args.options {
        Some(path) => DetectionOptions::load(path)
            .with_context(|| format!("Loading detection options from {path:?}"))?,
        None => DetectionOptions::default(),
    };
    if let Some(sample_rows) = args.sample_rows {
        options.sample_rows = sample_rows;
    }
    Ok(options)
}

fn load_context(args: &InputArgs, options: &DetectionOptions) -> Result<DetectionContext> {
    let path: &Path = &args.input;
    if io_utils::is_json(path) {
        info!("Reading JSON records from '{}'", path.display());
        let (headers, records) = io_utils::read_json_records(path, args.limit)
            .with_context(|| format!("Loading records from {path:?}"))?;
        return Ok(profile::build_context_from_records(headers, records, options));
    }

    let delimiter = io_utils::resolve_input_delimiter(path, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Reading '{}' with delimiter '{}' and encoding {}",
        path.display(),
        printable_delimiter(delimiter),
        encoding.name()
    );
    let table = io_utils::read_table(path, delimiter, encoding, args.limit)
        .with_context(|| format!("Loading rows from {path:?}"))?;
    debug!("Read {} row(s) with headers {:?}", table.rows.len(), table.headers);
    Ok(profile::build_context(&table.headers, &table.rows, options))
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
