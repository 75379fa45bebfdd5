//! Cyclesim daemon entry point.
//!
//! Loads a TOML program document, builds the engine, and drives it
//! either against the wall clock or as a fast batch generator run.

mod diagnostics;
mod signals;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cyclesim_config::schema::{ClockModeDoc, ProgramDocument};
use cyclesim_config::build_engine;
use cyclesim_runtime::{InstanceRegistry, LoggingPublisher, NullSink};
use std::path::PathBuf;
use tracing::info;

use crate::diagnostics::DiagnosticsState;

/// Command-line arguments for the cyclesim daemon.
#[derive(Parser, Debug)]
#[command(
    name = "cyclesim-daemon",
    about = "Runs a cyclesim program document against the wall clock or as a batch",
    version,
    long_about = None
)]
struct Args {
    /// Path to a TOML program document.
    #[arg(long, short = 'c', value_name = "FILE")]
    config: PathBuf,

    /// Maximum number of cycles to run (unbounded if omitted, realtime
    /// mode only; generator mode defaults to 100 when omitted). Mutually
    /// exclusive with `--duration`.
    #[arg(long, conflicts_with = "duration")]
    max_cycles: Option<u64>,

    /// Wall-clock run length for realtime mode, e.g. `30s`, `5m`, `1h`;
    /// converted to a cycle count via the document's `cycle_time`.
    #[arg(long, value_parser = humantime::parse_duration)]
    duration: Option<std::time::Duration>,

    /// Override the document's `[clock].mode` setting.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

/// CLI-facing mirror of [`ClockModeDoc`], named for `clap::ValueEnum`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Pace cycles against wall-clock time.
    Realtime,
    /// Run as fast as possible, collecting one snapshot per cycle.
    Generator,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting cyclesim daemon");

    let mut doc = ProgramDocument::from_path(&args.config)
        .with_context(|| format!("failed to load program document from {}", args.config.display()))?;
    if let Some(mode) = args.mode {
        doc.clock.mode = match mode {
            ModeArg::Realtime => ClockModeDoc::Realtime,
            ModeArg::Generator => ClockModeDoc::Generator,
        };
    }

    info!(
        cycle_time = doc.clock.cycle_time,
        mode = ?doc.clock.mode,
        items = doc.program.len(),
        "program document loaded"
    );

    let mut engine = build_engine(
        &doc,
        InstanceRegistry::new(),
        Some(Box::new(LoggingPublisher)),
        Some(Box::new(NullSink)),
    )
    .context("failed to build the engine from the program document")?;

    let max_cycles_from_duration = args.duration.map(|d| {
        (d.as_secs_f64() / doc.clock.cycle_time).ceil() as u64
    });

    match doc.clock.mode {
        ClockModeDoc::Realtime => {
            let cancel = signals::install_cancel_handler().context("failed to install the interrupt handler")?;
            engine
                .run_realtime(args.max_cycles.or(max_cycles_from_duration), &cancel)
                .context("realtime run failed")?;
            info!("realtime run stopped");
        }
        ClockModeDoc::Generator => {
            let cycles = args.max_cycles.unwrap_or(100);
            let snapshots = engine.run_generator(cycles).context("generator run failed")?;
            let mut diagnostics = DiagnosticsState::new();
            for snapshot in &snapshots {
                diagnostics.observe(snapshot);
            }
            info!(
                cycles = diagnostics.cycle_count(),
                overruns = diagnostics.overrun_count(),
                overrun_rate = diagnostics.overrun_rate(),
                "generator run complete"
            );
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = format!("cyclesim_daemon={level},cyclesim_runtime={level},cyclesim_config={level}");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .init();
}
