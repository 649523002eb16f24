// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Countdown photo booth with 2x2 grid composition")]
#[command(version = photobooth::constants::app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a single countdown photo
    Single {
        /// Image file to use as the frame source (default: test pattern)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory (default: ~/Pictures/photobooth)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Countdown start value in seconds
        #[arg(short, long)]
        countdown: Option<u32>,
    },

    /// Capture four shots and compose them into a 2x2 grid photo
    Grid {
        /// Image file to use as the frame source (default: test pattern)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory (default: ~/Pictures/photobooth)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Countdown start value in seconds
        #[arg(short, long)]
        countdown: Option<u32>,

        /// Grid canvas resolution (sd or hd)
        #[arg(short, long)]
        resolution: Option<String>,
    },

    /// Run the interactive booth loop
    Run {
        /// Image file to use as the frame source (default: test pattern)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory (default: ~/Pictures/photobooth)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Single {
            source,
            output,
            countdown,
        }) => cli::take_single(source, output, countdown),
        Some(Commands::Grid {
            source,
            output,
            countdown,
            resolution,
        }) => cli::take_grid(source, output, countdown, resolution),
        Some(Commands::Run { source, output }) => cli::run_booth(source, output),
        None => cli::run_booth(None, None),
    }
}
