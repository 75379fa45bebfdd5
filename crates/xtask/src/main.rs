//! Development automation for the cyclesim workspace.
//!
//! A single `validate-config` task: parse a TOML program document, build
//! the engine from it (resolving every instance type and lag
//! requirement), and report the outcome without running a single cycle.

use clap::{Parser, Subcommand};
use cyclesim_config::schema::ProgramDocument;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "xtask", about = "Project automation tasks", version)]
struct Args {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Parse and resolve a program document without running it.
    ValidateConfig {
        /// Path to a TOML program document.
        #[arg(long, short = 'c', value_name = "FILE")]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();
    match args.task {
        Task::ValidateConfig { config } => validate_config(&config),
    }
}

fn validate_config(path: &PathBuf) -> ExitCode {
    let doc = match ProgramDocument::from_path(path) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("failed to parse {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };

    match cyclesim_config::build_engine(&doc, cyclesim_runtime::InstanceRegistry::new(), None, None) {
        Ok(_engine) => {
            println!(
                "{} is valid: {} program item(s), cycle_time={}, mode={:?}",
                path.display(),
                doc.program.len(),
                doc.clock.cycle_time,
                doc.clock.mode,
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} failed to resolve: {e}", path.display());
            ExitCode::FAILURE
        }
    }
}
