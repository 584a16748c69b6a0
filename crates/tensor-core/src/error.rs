// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

/// Errors that can occur during tensor operations.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// A buffer length does not match what the shape or image geometry requires.
    #[error("buffer size mismatch in {op}: expected {expected} elements, got {actual}")]
    BufferSizeMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A shape has more dimensions than [`crate::MAX_RANK`].
    #[error("rank {rank} exceeds the maximum of {max}")]
    RankTooLarge { rank: usize, max: usize },

    /// The input to a reduction is empty.
    #[error("empty input for {op}")]
    Empty { op: &'static str },

    /// Normalisation parameters are unusable (e.g. a zero standard deviation).
    #[error("invalid normalisation parameters: {0}")]
    InvalidNormalization(&'static str),
}
