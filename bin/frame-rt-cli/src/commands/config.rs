// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `frame-rt config` command: print the effective configuration.

use runtime::{ModelVariant, RuntimeConfig};

pub fn execute(config: &RuntimeConfig) -> anyhow::Result<()> {
    println!("# model variant (build-time): {}", ModelVariant::BUILD);
    print!("{}", config.to_toml()?);
    Ok(())
}
