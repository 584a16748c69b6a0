// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! An in-memory video output driver for host runs and tests.
//!
//! Holds one output block in a `Vec<u8>`. After each `start` the stream
//! reports `active` for a configurable number of status polls before the
//! frame counts as scanned out, so callers that busy-wait on the status
//! can be observed. Failures of each driver call can be injected.

use crate::{EventCallback, StreamError, StreamMode, StreamStatus, VideoOut, EVENT_FRAME_COMPLETE};

/// Driver failure code used for injected failures.
const INJECTED_FAILURE: i32 = -1;

/// In-memory [`VideoOut`] implementation.
#[derive(Debug)]
pub struct MemoryVideoOut {
    buffer: Vec<u8>,
    block_size: usize,
    initialized: bool,
    callback: Option<EventCallback>,
    block_held: bool,
    busy_polls: usize,
    busy_remaining: usize,
    status_polls: usize,
    frames_released: usize,
    starts: usize,
    last_mode: Option<StreamMode>,
    fail_initialize: bool,
    withhold_block: bool,
    fail_release: bool,
    fail_start: bool,
}

impl MemoryVideoOut {
    /// Creates a driver with `len` bytes of output memory.
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0; len],
            block_size: 0,
            initialized: false,
            callback: None,
            block_held: false,
            busy_polls: 0,
            busy_remaining: 0,
            status_polls: 0,
            frames_released: 0,
            starts: 0,
            last_mode: None,
            fail_initialize: false,
            withhold_block: false,
            fail_release: false,
            fail_start: false,
        }
    }

    /// Reports `active` for `polls` status reads after every `start`.
    pub fn with_busy_polls(mut self, polls: usize) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Makes `initialize` fail.
    pub fn fail_initialize(mut self, fail: bool) -> Self {
        self.fail_initialize = fail;
        self
    }

    /// Makes `get_block` return `None`.
    pub fn withhold_block(&mut self, withhold: bool) {
        self.withhold_block = withhold;
    }

    /// Makes `release_block` fail (the block is still returned).
    pub fn fail_release(&mut self, fail: bool) {
        self.fail_release = fail;
    }

    /// Makes `start` fail.
    pub fn fail_start(&mut self, fail: bool) {
        self.fail_start = fail;
    }

    /// Puts the stream into the active state as if a frame were in flight.
    pub fn begin_frame(&mut self) {
        self.busy_remaining = self.busy_polls;
    }

    /// Contents of the output block.
    pub fn block(&self) -> &[u8] {
        &self.buffer[..self.block_size]
    }

    /// Total number of `status` reads.
    pub fn status_polls(&self) -> usize {
        self.status_polls
    }

    /// Number of blocks returned with `release_block`.
    pub fn frames_released(&self) -> usize {
        self.frames_released
    }

    /// Number of successful `start` calls.
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// Mode of the most recent successful `start`.
    pub fn last_mode(&self) -> Option<StreamMode> {
        self.last_mode
    }

    /// Whether a block is currently taken.
    pub fn block_held(&self) -> bool {
        self.block_held
    }
}

impl VideoOut for MemoryVideoOut {
    fn initialize(&mut self, callback: EventCallback) -> Result<(), StreamError> {
        if self.fail_initialize {
            return Err(StreamError::Driver {
                code: INJECTED_FAILURE,
            });
        }
        self.callback = Some(callback);
        self.initialized = true;
        Ok(())
    }

    fn set_buf(&mut self, len: usize, block_size: usize) -> Result<(), StreamError> {
        if !self.initialized {
            return Err(StreamError::NotInitialized);
        }
        if block_size == 0 || len > self.buffer.len() || block_size > len || len % block_size != 0 {
            return Err(StreamError::InvalidBuffer { len, block_size });
        }
        self.block_size = block_size;
        tracing::debug!(len, block_size, "video output buffer configured");
        Ok(())
    }

    fn status(&mut self) -> StreamStatus {
        self.status_polls += 1;
        if self.busy_remaining == 0 {
            return StreamStatus { active: false };
        }
        self.busy_remaining -= 1;
        if self.busy_remaining == 0 {
            if let Some(callback) = self.callback {
                callback(EVENT_FRAME_COMPLETE);
            }
        }
        StreamStatus { active: true }
    }

    fn get_block(&mut self) -> Option<&mut [u8]> {
        if !self.initialized || self.block_size == 0 || self.withhold_block || self.block_held {
            return None;
        }
        self.block_held = true;
        Some(&mut self.buffer[..self.block_size])
    }

    fn release_block(&mut self) -> Result<(), StreamError> {
        if !self.block_held {
            return Err(StreamError::NoBlockHeld);
        }
        self.block_held = false;
        if self.fail_release {
            return Err(StreamError::Driver {
                code: INJECTED_FAILURE,
            });
        }
        self.frames_released += 1;
        Ok(())
    }

    fn start(&mut self, mode: StreamMode) -> Result<(), StreamError> {
        if !self.initialized {
            return Err(StreamError::NotInitialized);
        }
        if self.fail_start {
            return Err(StreamError::Driver {
                code: INJECTED_FAILURE,
            });
        }
        self.starts += 1;
        self.last_mode = Some(mode);
        self.busy_remaining = self.busy_polls;
        Ok(())
    }
}
