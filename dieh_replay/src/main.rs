//! # DIEH Replay Binary
//!
//! Loads a DIEH threshold configuration and replays an I/O completion
//! trace through the engine, printing one JSON object per step.
//!
//! # Usage
//!
//! ```bash
//! # Replay a trace file with the system configuration
//! dieh_replay --trace media_burst.jsonl
//!
//! # Custom configuration, trace on stdin, verbose logging
//! dieh_replay --config bench/dieh.toml -v < media_burst.jsonl
//!
//! # JSON logs on stderr
//! dieh_replay --trace media_burst.jsonl --json
//! ```

use clap::Parser;
use dieh_common::config::LogLevel;
use dieh_common::consts::DEFAULT_CONFIG_PATH;
use dieh_engine::config::load_config;
use dieh_replay::replayer::Replayer;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, reload};

/// Handle used to swap the log filter once the config file is loaded.
type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// DIEH Replay - drive error handling decisions for a recorded trace
#[derive(Parser, Debug)]
#[command(name = "dieh_replay")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Replays I/O completion traces through the DIEH engine")]
#[command(long_about = None)]
struct Args {
    /// Path to the DIEH configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Trace file (JSON lines). Reads stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    trace: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("replay failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let filter = setup_tracing(&args);

    info!("DIEH Replay v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;
    filter.reload(log_filter(&args, config.shared.log_level))?;
    info!(service = %config.shared.service_name, "configuration applied");

    let mut replayer = Replayer::new(config.dieh);
    let stdout = io::stdout().lock();
    let summary = match &args.trace {
        Some(path) => replayer.replay(BufReader::new(File::open(path)?), stdout)?,
        None => replayer.replay(io::stdin().lock(), stdout)?,
    };

    info!(
        steps = summary.steps,
        errors = summary.errors,
        actions = ?summary.actions,
        "replay complete"
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
///
/// Logs go to stderr; stdout carries the replay output. The filter starts
/// at `info` and is replaced by [`log_filter`] once the config is loaded.
fn setup_tracing(args: &Args) -> FilterHandle {
    let (filter, handle) = reload::Layer::new(log_filter(args, LogLevel::Info));
    let registry = tracing_subscriber::registry().with(filter);
    let fmt = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    if args.json {
        registry.with(fmt.json()).init();
    } else {
        registry.with(fmt).init();
    }
    handle
}

/// `RUST_LOG` wins, then `--verbose`, then the configured level.
fn log_filter(args: &Args, configured: LogLevel) -> EnvFilter {
    let level = if args.verbose { LogLevel::Debug } else { configured };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_directive()))
}
