// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for arena memory management.

/// Errors that can occur during arena allocation and span access.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The requested allocation does not fit in the remaining arena space.
    #[error("out of memory: requested {requested_bytes} bytes, but only {available_bytes} available (capacity: {capacity_bytes})")]
    OutOfMemory {
        requested_bytes: usize,
        available_bytes: usize,
        capacity_bytes: usize,
    },

    /// The requested alignment is zero or not a power of two.
    #[error("invalid alignment {alignment}: must be a non-zero power of two")]
    InvalidAlignment { alignment: usize },

    /// A span handed out before the last arena reset was dereferenced.
    #[error("stale span: issued in generation {span_generation}, arena is at {arena_generation}")]
    StaleSpan {
        span_generation: u32,
        arena_generation: u32,
    },

    /// A span reaches past the allocated region of the arena.
    #[error("span {offset}..{end} lies outside the allocated region (used: {used})")]
    SpanOutOfBounds {
        offset: usize,
        end: usize,
        used: usize,
    },

    /// Two spans were expected to have the same length.
    #[error("span length mismatch: source {source_len} bytes, destination {dest_len} bytes")]
    LengthMismatch { source_len: usize, dest_len: usize },

    /// The bytes of a span cannot be reinterpreted as the requested element type.
    #[error("span cannot be viewed as {target}: {detail:?}")]
    Cast {
        target: &'static str,
        detail: bytemuck::PodCastError,
    },

    /// A fixed-capacity span table is full.
    #[error("span table is full (capacity: {capacity})")]
    TooManySpans { capacity: usize },

    /// A pool-size string could not be parsed.
    #[error("invalid pool size '{0}'")]
    InvalidSize(String),
}
