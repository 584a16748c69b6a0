// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the video output path.

/// Errors reported by a video output driver or the framebuffer blit.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StreamError {
    /// An operation was attempted before `initialize`.
    #[error("video stream not initialised")]
    NotInitialized,

    /// The buffer configuration passed to `set_buf` is unusable.
    #[error("invalid stream buffer: {len} bytes with block size {block_size}")]
    InvalidBuffer { len: usize, block_size: usize },

    /// `release_block` was called without a block held.
    #[error("no output block is held")]
    NoBlockHeld,

    /// A frame buffer is smaller than its declared geometry.
    #[error("{which} frame too small: need {needed} bytes, have {actual}")]
    FrameTooSmall {
        which: &'static str,
        needed: usize,
        actual: usize,
    },

    /// The driver returned a raw failure code.
    #[error("video driver error (code {code})")]
    Driver { code: i32 },
}
