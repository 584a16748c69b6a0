// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arena statistics for the memory report.

/// Cumulative statistics about one arena.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ArenaStats {
    /// Number of successful allocations since construction.
    pub total_allocations: u64,
    /// Number of allocation requests that did not fit.
    pub oom_count: u64,
    /// Number of resets.
    pub resets: u64,
    /// Bytes lost to alignment padding since construction.
    pub padding_bytes: u64,
    /// High-water mark of `used`, across resets.
    pub peak_used_bytes: usize,
}

impl ArenaStats {
    pub(crate) fn record_allocation(&mut self, padding: usize, used_after: usize) {
        self.total_allocations += 1;
        self.padding_bytes += padding as u64;
        if used_after > self.peak_used_bytes {
            self.peak_used_bytes = used_after;
        }
    }

    pub(crate) fn record_oom(&mut self) {
        self.oom_count += 1;
    }

    pub(crate) fn record_reset(&mut self) {
        self.resets += 1;
    }

    /// Returns a one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} allocations, {} OOMs, {} resets, peak {} bytes, {} bytes padding",
            self.total_allocations,
            self.oom_count,
            self.resets,
            self.peak_used_bytes,
            self.padding_bytes,
        )
    }
}
