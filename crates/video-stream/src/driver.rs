// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The video output driver interface.
//!
//! Mirrors a block-based streaming driver: the application waits until the
//! previous frame has been scanned out, takes the single output block,
//! fills it, hands it back and restarts single-shot streaming.
//!
//! ```text
//!   status().active == false ──► get_block() ──► fill ──► release_block() ──► start(Single)
//!            ▲                                                                   │
//!            └───────────────────────── frame scanned out ◄──────────────────────┘
//! ```

use crate::StreamError;

/// Event raised when a frame has been scanned out.
pub const EVENT_FRAME_COMPLETE: u32 = 1 << 0;

/// Callback invoked by the driver with an event bitmask.
pub type EventCallback = fn(u32);

/// Streaming mode passed to [`VideoOut::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Output one block, then stop.
    Single,
    /// Output blocks until stopped.
    Continuous,
}

/// Driver status flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamStatus {
    /// A block is currently being output.
    pub active: bool,
}

/// A video output driver.
pub trait VideoOut {
    /// Initialises the driver and registers the event callback.
    fn initialize(&mut self, callback: EventCallback) -> Result<(), StreamError>;

    /// Configures the output buffer: `len` bytes, split into blocks of
    /// `block_size` bytes.
    fn set_buf(&mut self, len: usize, block_size: usize) -> Result<(), StreamError>;

    /// Reads the current status flags.
    fn status(&mut self) -> StreamStatus;

    /// Takes the next free output block, if any.
    fn get_block(&mut self) -> Option<&mut [u8]>;

    /// Returns the block taken with [`VideoOut::get_block`] for output.
    fn release_block(&mut self) -> Result<(), StreamError>;

    /// Starts streaming released blocks.
    fn start(&mut self, mode: StreamMode) -> Result<(), StreamError>;
}
