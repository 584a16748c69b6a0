// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # video-stream
//!
//! The display side of the frame pipeline.
//!
//! - [`VideoOut`]: a block-based video output driver (initialise, configure
//!   the buffer, poll status, take and release the output block, start).
//! - [`copy_to_framebuffer`]: RGB888 blit with centring, flips and R/B swap.
//! - [`MemoryVideoOut`]: an in-memory driver with configurable busy time and
//!   injectable failures, for host runs and tests.

mod driver;
mod error;
mod framebuffer;
mod memory;

pub use driver::{EventCallback, StreamMode, StreamStatus, VideoOut, EVENT_FRAME_COMPLETE};
pub use error::StreamError;
pub use framebuffer::{copy_to_framebuffer, Blit, RGB888_BYTES};
pub use memory::MemoryVideoOut;
