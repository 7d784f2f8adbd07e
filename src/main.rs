//! Command-line front end: arranges a model JSON file.

use std::{fs, io, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};
use thiserror::Error;

use erdarrange::error::LayoutError;
use erdarrange::ir::ModelIR;
use erdarrange::layout::{LayoutConfig, LayoutEngine};

/// Arrange the tables of a data model diagram
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input model JSON file
    input: String,

    /// Output file for the positions JSON (default: stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Minimum vertical gap between tables, overriding the configuration
    #[arg(long)]
    table_gap: Option<f64>,

    /// Parameter grid columns, overriding the configuration
    #[arg(long)]
    grid_columns: Option<usize>,

    /// Classify tables with tied fact/dimension scores as dimensions
    #[arg(long)]
    ties_to_dimension: bool,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },

    #[error("invalid configuration {path}: {source}")]
    Config {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid model: {0}")]
    Model(#[from] serde_json::Error),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

fn load_config(path: Option<&str>) -> Result<LayoutConfig, CliError> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };

    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })?;
    let config = toml::from_str(&text).map_err(|source| CliError::Config {
        path: path.to_string(),
        source,
    })?;
    debug!(path; "Loaded configuration");
    Ok(config)
}

fn run(args: &Args) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(gap) = args.table_gap {
        config = config.with_table_gap(gap);
    }
    if let Some(columns) = args.grid_columns {
        config = config.with_grid_columns(columns);
    }
    if args.ties_to_dimension {
        config = config.with_tie_breaks_to_fact(false);
    }

    let input = fs::read_to_string(&args.input).map_err(|source| CliError::Read {
        path: args.input.clone(),
        source,
    })?;
    let model: ModelIR = serde_json::from_str(&input)?;

    let result = LayoutEngine::new(config).layout(&model)?;
    for diagnostic in &result.diagnostics {
        if diagnostic.is_warning() {
            warn!("{diagnostic}");
        } else {
            debug!("{diagnostic}");
        }
    }

    let output = result.output();
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };

    match &args.output {
        Some(path) => fs::write(path, json).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?,
        None => println!("{json}"),
    }

    info!(positions_len = output.positions.len(); "Positions written");
    Ok(())
}

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(args:?; "Parsed arguments");

    if let Err(err) = run(&args) {
        error!("{err}");
        process::exit(1);
    }
}
