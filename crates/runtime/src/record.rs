// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The fixed-layout result record written to the caller's output buffer.
//!
//! ```text
//!   offset  0 ┌──────────────────────────────┐
//!             │ label: [u8; 100], NUL-padded │
//!   offset 100├──────────────────────────────┤
//!             │ confidence: f32, little-end. │
//!   offset 104└──────────────────────────────┘
//! ```

use crate::decoder::{ClassificationResult, Label};

/// Bytes reserved for the label, including at least one NUL.
pub const RECORD_LABEL_LEN: usize = 100;

/// Total record size.
pub const RECORD_SIZE: usize = RECORD_LABEL_LEN + std::mem::size_of::<f32>();

/// A classification result in its wire layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputRecord {
    pub label: [u8; RECORD_LABEL_LEN],
    pub confidence: f32,
}

impl OutputRecord {
    /// Builds the record for a result.
    pub fn from_result(result: &ClassificationResult) -> Self {
        let mut label = [0u8; RECORD_LABEL_LEN];
        let bytes = result.label.as_bytes();
        label[..bytes.len()].copy_from_slice(bytes);
        Self {
            label,
            confidence: result.confidence,
        }
    }

    /// Serialises the record.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[..RECORD_LABEL_LEN].copy_from_slice(&self.label);
        out[RECORD_LABEL_LEN..].copy_from_slice(&self.confidence.to_le_bytes());
        out
    }

    /// Parses a record; `None` if `bytes` is too short.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes = bytes.get(..RECORD_SIZE)?;
        let mut label = [0u8; RECORD_LABEL_LEN];
        label.copy_from_slice(&bytes[..RECORD_LABEL_LEN]);
        let mut confidence = [0u8; 4];
        confidence.copy_from_slice(&bytes[RECORD_LABEL_LEN..]);
        Some(Self {
            label,
            confidence: f32::from_le_bytes(confidence),
        })
    }

    /// The label up to its first NUL. Invalid UTF-8 is cut at the last
    /// valid character.
    pub fn label(&self) -> Label {
        let end = self
            .label
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(RECORD_LABEL_LEN);
        let raw = &self.label[..end];
        let text = match std::str::from_utf8(raw) {
            Ok(s) => s,
            Err(e) => std::str::from_utf8(&raw[..e.valid_up_to()]).unwrap_or_default(),
        };
        Label::truncated(text)
    }
}

/// Writes the record for `result` into `out` if it fits.
///
/// Returns `false`, leaving `out` untouched, when `out` is shorter than
/// [`RECORD_SIZE`].
pub fn write_record(result: &ClassificationResult, out: &mut [u8]) -> bool {
    match out.get_mut(..RECORD_SIZE) {
        Some(dst) => {
            dst.copy_from_slice(&OutputRecord::from_result(result).to_bytes());
            true
        }
        None => false,
    }
}
