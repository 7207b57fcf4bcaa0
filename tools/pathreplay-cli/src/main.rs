//! pathreplay CLI: record, replay and inspect pointer traces.
//!
//! Usage:
//!   pathreplay record [OPTIONS]     Sample the pointer into a trace
//!   pathreplay play [PATH]          Replay a trace on this display
//!   pathreplay info <PATH>          Show trace information
//!   pathreplay check                Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pathreplay_common::config::AppConfig;
use pathreplay_platform_core::CoordinateSpace;

mod commands;

#[derive(Parser)]
#[command(
    name = "pathreplay",
    about = "Record a pointer trajectory and replay it on any display",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample the pointer on a fixed period and write a trace
    Record {
        /// Capture window in milliseconds
        #[arg(long)]
        duration_ms: Option<u64>,

        /// Sampling period in milliseconds
        #[arg(long)]
        period_ms: Option<u64>,

        /// Space positions are written in: unit, logical or physical
        #[arg(long)]
        space: Option<CoordinateSpace>,

        /// Trace file to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cross-check every sample with the vision estimator
        #[arg(long)]
        estimate: bool,

        /// Dump annotated estimator frames into this directory
        #[arg(long)]
        debug_frames: Option<PathBuf>,
    },

    /// Replay a trace on the current display
    Play {
        /// Trace file (defaults to the configured output)
        path: Option<PathBuf>,

        /// Space of a header-less legacy trace
        #[arg(long)]
        assume_space: Option<CoordinateSpace>,
    },

    /// Show trace information
    Info {
        /// Trace file
        path: PathBuf,

        /// Space of a header-less legacy trace
        #[arg(long)]
        assume_space: Option<CoordinateSpace>,
    },

    /// Check system capabilities
    Check {
        /// Write the effective configuration to the config file
        #[arg(long)]
        write_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    pathreplay_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Record {
            duration_ms,
            period_ms,
            space,
            output,
            estimate,
            debug_frames,
        } => {
            commands::record::run(
                &config,
                commands::record::RecordArgs {
                    duration_ms,
                    period_ms,
                    space,
                    output,
                    estimate,
                    debug_frames,
                },
            )
            .await
        }
        Commands::Play { path, assume_space } => {
            let path = path.unwrap_or_else(|| config.recording.output.clone());
            commands::play::run(&config, path, assume_space).await
        }
        Commands::Info { path, assume_space } => commands::info::run(path, assume_space),
        Commands::Check { write_config } => commands::check::run(&config, write_config),
    }
}
