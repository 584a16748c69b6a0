// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared setup.

pub mod config;
pub mod inspect;
pub mod run;

use anyhow::Context;
use runtime::RuntimeConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads the configuration file if one was given, else the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    let config = match path {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("loading config '{}'", path.display()))?,
        None => RuntimeConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Reads and parses a program manifest, returning it with its byte length.
pub fn load_program(path: &Path) -> anyhow::Result<(model_program::ManifestProgram, usize)> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read model '{}'", path.display()))?;
    let program = model_program::ManifestProgram::from_bytes(&bytes)
        .with_context(|| format!("failed to load model from '{}'", path.display()))?;
    Ok((program, bytes.len()))
}
