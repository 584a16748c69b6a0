// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RGB888 HWC frame → normalised f32 CHW tensor.

use crate::TensorError;

/// Number of colour channels in an RGB888 frame.
pub const RGB_CHANNELS: usize = 3;

/// Width and height of an RGB888 image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageDims {
    pub width: usize,
    pub height: usize,
}

impl ImageDims {
    /// Creates image dimensions.
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of pixels.
    pub const fn pixels(&self) -> usize {
        self.width * self.height
    }

    /// Number of channel values (`W × H × 3`), i.e. bytes of an RGB888 frame
    /// or elements of the staged tensor.
    pub const fn values(&self) -> usize {
        self.pixels() * RGB_CHANNELS
    }

    /// CHW index of channel `c`, row `h`, column `w`.
    pub const fn chw_index(&self, c: usize, h: usize, w: usize) -> usize {
        c * self.height * self.width + h * self.width + w
    }

    /// HWC index of channel `c`, row `h`, column `w`.
    pub const fn hwc_index(&self, c: usize, h: usize, w: usize) -> usize {
        (h * self.width + w) * RGB_CHANNELS + c
    }
}

/// Per-channel standardisation constants.
///
/// These must match the constants the model was trained with; the defaults
/// are the ImageNet statistics.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Normalization {
    pub mean: [f32; RGB_CHANNELS],
    pub std: [f32; RGB_CHANNELS],
}

impl Normalization {
    /// ImageNet mean/std, RGB order.
    pub const IMAGENET: Normalization = Normalization {
        mean: [0.485, 0.456, 0.406],
        std: [0.229, 0.224, 0.225],
    };

    /// Rejects zero, negative or non-finite standard deviations.
    pub fn validate(&self) -> Result<(), TensorError> {
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(TensorError::InvalidNormalization("mean must be finite"));
        }
        if self.std.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(TensorError::InvalidNormalization(
                "std must be finite and positive",
            ));
        }
        Ok(())
    }

    /// Normalises one 8-bit channel value.
    #[inline]
    pub fn apply(&self, channel: usize, value: u8) -> f32 {
        let x = value as f32 / 255.0;
        (x - self.mean[channel]) / self.std[channel]
    }

    /// The `(min, max)` a channel can take, reached at values 0 and 255.
    pub fn bounds(&self, channel: usize) -> (f32, f32) {
        (self.apply(channel, 0), self.apply(channel, 255))
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self::IMAGENET
    }
}

/// Converts an RGB888 HWC frame into a normalised CHW tensor.
///
/// For every channel value: `x = v / 255`, then `(x - mean[c]) / std[c]`,
/// written to `out[c*H*W + h*W + w]`. Single precision throughout.
///
/// # Errors
/// Returns [`TensorError::BufferSizeMismatch`] if `frame` or `out` does not
/// hold exactly `W × H × 3` values. Nothing is written in that case.
pub fn normalize_hwc_to_chw(
    frame: &[u8],
    dims: ImageDims,
    norm: &Normalization,
    out: &mut [f32],
) -> Result<(), TensorError> {
    let expected = dims.values();
    if frame.len() != expected {
        return Err(TensorError::BufferSizeMismatch {
            op: "normalize_hwc_to_chw",
            expected,
            actual: frame.len(),
        });
    }
    if out.len() != expected {
        return Err(TensorError::BufferSizeMismatch {
            op: "normalize_hwc_to_chw",
            expected,
            actual: out.len(),
        });
    }

    let plane = dims.pixels();
    for (pixel, rgb) in frame.chunks_exact(RGB_CHANNELS).enumerate() {
        for (c, &value) in rgb.iter().enumerate() {
            out[c * plane + pixel] = norm.apply(c, value);
        }
    }

    Ok(())
}
