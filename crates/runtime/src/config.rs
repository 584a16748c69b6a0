// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! method_pool = "60M"
//! scratch_pool = "2M"
//! image_width = 224
//! image_height = 224
//! display_width = 224
//! display_height = 224
//! flip_horizontal = false
//! flip_vertical = false
//! swap_rb = false
//! cpu_freq_hz = 400000000
//! bundle_io = false
//!
//! [normalization]
//! mean = [0.485, 0.456, 0.406]
//! std = [0.229, 0.224, 0.225]
//! ```
//!
//! The label table is not configurable at runtime; it is fixed per build
//! (see [`crate::ModelVariant::BUILD`]).

use crate::RuntimeError;
use memory_manager::PoolSize;
use std::path::Path;
use tensor_core::{ImageDims, Normalization, RGB_CHANNELS};

/// Configuration for the frame pipeline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Method arena pool size (human-readable, e.g. `"60M"`).
    pub method_pool: String,
    /// Scratch arena pool size.
    pub scratch_pool: String,
    /// Width of the ML input frame.
    pub image_width: usize,
    /// Height of the ML input frame.
    pub image_height: usize,
    /// Width of the display framebuffer.
    pub display_width: usize,
    /// Height of the display framebuffer.
    pub display_height: usize,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Swap red and blue when copying to the display.
    pub swap_rb: bool,
    /// Core clock used to convert profiler cycles to milliseconds.
    pub cpu_freq_hz: u32,
    /// Compare outputs against expected outputs bundled with the program.
    pub bundle_io: bool,
    /// Per-channel standardisation constants.
    pub normalization: Normalization,
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| RuntimeError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the method and scratch pool sizes.
    pub fn parse_pools(&self) -> Result<(PoolSize, PoolSize), RuntimeError> {
        let method = PoolSize::parse(&self.method_pool)
            .map_err(|e| RuntimeError::Config(format!("invalid method_pool: {e}")))?;
        let scratch = PoolSize::parse(&self.scratch_pool)
            .map_err(|e| RuntimeError::Config(format!("invalid scratch_pool: {e}")))?;
        Ok((method, scratch))
    }

    /// Geometry of the ML input frame.
    pub fn image_dims(&self) -> ImageDims {
        ImageDims::new(self.image_width, self.image_height)
    }

    /// Bytes in one RGB888 input frame.
    pub fn frame_len(&self) -> usize {
        self.image_dims().values()
    }

    /// Elements in the normalised input tensor.
    pub fn tensor_len(&self) -> usize {
        self.image_dims().values()
    }

    /// Bytes in one RGB888 display frame.
    pub fn display_len(&self) -> usize {
        self.display_width * self.display_height * RGB_CHANNELS
    }

    /// Checks that the configuration describes a runnable pipeline.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        let (method, _) = self.parse_pools()?;
        if method.as_bytes() == 0 {
            return Err(RuntimeError::Config("method_pool must not be empty".into()));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(RuntimeError::Config("image dimensions must be non-zero".into()));
        }
        if self.display_width < self.image_width || self.display_height < self.image_height {
            return Err(RuntimeError::Config(format!(
                "display {}x{} is smaller than image {}x{}",
                self.display_width, self.display_height, self.image_width, self.image_height
            )));
        }
        if self.cpu_freq_hz == 0 {
            return Err(RuntimeError::Config("cpu_freq_hz must be non-zero".into()));
        }
        self.normalization
            .validate()
            .map_err(|e| RuntimeError::Config(e.to_string()))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            method_pool: "60M".to_string(),
            scratch_pool: "2M".to_string(),
            image_width: 224,
            image_height: 224,
            display_width: 224,
            display_height: 224,
            flip_horizontal: false,
            flip_vertical: false,
            swap_rb: false,
            cpu_freq_hz: crate::profiler::CPU_FREQ_HZ,
            bundle_io: false,
            normalization: Normalization::IMAGENET,
        }
    }
}
