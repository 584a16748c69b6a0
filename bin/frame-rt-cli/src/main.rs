// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # frame-rt
//!
//! Command-line interface for the frame-rt classification pipeline.
//!
//! ## Usage
//! ```bash
//! # Run synthetic frames through a model
//! frame-rt run --model ./models/rps-linear.json --frames 10
//!
//! # Inspect a program's methods and memory plan
//! frame-rt inspect --model ./models/rps-linear.json
//!
//! # Print the effective configuration as TOML
//! frame-rt config
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "frame-rt",
    about = "Arena-backed per-frame image classification runtime",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON lines instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run synthetic frames through the pipeline with an in-memory display.
    Run {
        /// Path to the program manifest (JSON).
        #[arg(short, long)]
        model: std::path::PathBuf,

        /// Number of frames to process.
        #[arg(short, long, default_value_t = 1)]
        frames: usize,
    },

    /// Inspect a program: methods, inputs and memory plan.
    Inspect {
        /// Path to the program manifest (JSON).
        #[arg(short, long)]
        model: std::path::PathBuf,
    },

    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { model, frames } => commands::run::execute(&config, model, frames, cli.json),
        Commands::Inspect { model } => commands::inspect::execute(&config, model, cli.json),
        Commands::Config => commands::config::execute(&config),
    }
}
