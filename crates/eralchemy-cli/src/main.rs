mod config;
mod input;
mod logging;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use eralchemy::{
    all_to_intermediary, render_intermediary, Error as CoreError, GraphvizCommand,
    IntrospectOptions, Mode, RenderOptions,
};
use thiserror::Error;

use config::{load_config, FileConfig, Overrides, Settings};
use input::{load_input, LoadedInput};
use logging::{init_logging, LogFormat};

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid schema snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "eralchemy",
    version,
    about = "Generate entity relation diagrams from databases, schema snapshots or ER markup"
)]
struct Cli {
    /// Connection URL, `.er` markup file or `.json` schema snapshot.
    #[arg(short, long, value_name = "INPUT")]
    input: String,
    /// Output file; its extension picks the format in auto mode.
    #[arg(short, long, value_name = "OUTPUT")]
    output: PathBuf,
    /// Output mode: auto, er, dot or graph.
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<Mode>,
    /// Only render these tables.
    #[arg(long, value_name = "TABLE", num_args = 1..)]
    include_tables: Vec<String>,
    /// Never render these tables.
    #[arg(long, value_name = "TABLE", num_args = 1..)]
    exclude_tables: Vec<String>,
    /// Database schema(s) to introspect.
    #[arg(short, long = "schema", value_name = "SCHEMA")]
    schemas: Vec<String>,
    /// Include views when introspecting a database.
    #[arg(long, overrides_with = "no_include_views")]
    include_views: bool,
    /// Leave views out even when the config file includes them.
    #[arg(long, overrides_with = "include_views")]
    no_include_views: bool,
    /// TOML file with default settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn parse_mode(value: &str) -> Result<Mode, String> {
    value.parse::<Mode>().map_err(|err| err.to_string())
}

/// `Some` only when one of an `--x` / `--no-x` pair was given; the last one wins.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format, "info").map_err(CliError::Logging)?;

    run(cli).await.inspect_err(|err| {
        tracing::error!(event = "run_failed", error = %err);
    })
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        input,
        output,
        mode,
        include_tables,
        exclude_tables,
        schemas,
        include_views,
        no_include_views,
        config,
        log_format: _,
    } = cli;

    let file_config = match &config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::merge(
        file_config,
        Overrides {
            mode,
            include_tables,
            exclude_tables,
            schemas,
            include_views: flag_pair(include_views, no_include_views),
        },
    );

    tracing::info!(event = "run_started", output = %output.display(), mode = %settings.mode);
    let timer = Instant::now();

    let options = RenderOptions {
        introspect: IntrospectOptions {
            include_views: settings.include_views,
            schemas: if settings.schemas.is_empty() {
                None
            } else {
                Some(settings.schemas.clone())
            },
            ..IntrospectOptions::default()
        },
        include_tables: settings.include_tables,
        exclude_tables: settings.exclude_tables,
    };

    let intermediary = match load_input(&input)? {
        LoadedInput::Markup(intermediary) => intermediary,
        LoadedInput::Schema(schema_input) => {
            all_to_intermediary(schema_input, &options.introspect).await?
        }
    };

    let engine = GraphvizCommand::new(settings.graphviz_program);
    render_intermediary(intermediary, &output, settings.mode, &options, &engine)?;

    tracing::info!(
        event = "run_finished",
        status = "success",
        duration_ms = timer.elapsed().as_millis()
    );
    Ok(())
}
