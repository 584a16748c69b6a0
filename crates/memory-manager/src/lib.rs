// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memory-manager
//!
//! Heapless memory primitives for the frame pipeline on a single MCU core.
//!
//! # Key Components
//!
//! - [`Arena`]: a bump allocator over a fixed, caller-owned pool. No
//!   per-allocation free; only a full [`Arena::reset`].
//! - [`ArenaSpan`]: a generation-tagged handle to an allocated range. Spans
//!   issued before a reset can no longer be dereferenced.
//! - [`StaticPool`]: a 16-byte aligned byte array to back an arena.
//! - [`SpanTable`]: a fixed-capacity list of spans (planned buffers).
//! - [`Slot`]: in-place storage for one object, replacing placement `new`.
//! - [`PoolSize`]: human-readable sizes (`"60M"`) for configuration.
//! - [`ArenaStats`]: peak usage, OOM and reset counters.
//!
//! # Ownership Model
//!
//! ```text
//!  StaticPool<N>  ──&mut [u8]──►  Arena<'b>
//!                                   │ allocate(size, align)
//!                                   ▼
//!                                ArenaSpan { offset, len, generation }
//!                                   │ bytes_mut(span)
//!                                   ▼
//!                                &mut [u8]   (borrow of the arena)
//! ```
//!
//! The pool outlives the arena (`'b`); spans are `Copy` handles and every
//! dereference re-borrows the arena, so the borrow checker sees a single
//! owner of the memory at all times.
//!
//! # Example
//! ```
//! use memory_manager::{Arena, StaticPool};
//!
//! let mut pool = StaticPool::<4096>::new();
//! let mut scratch = Arena::new(pool.as_mut_slice());
//!
//! let tmp = scratch.allocate(1024, 16).unwrap();
//! scratch.bytes_mut(tmp).unwrap().fill(0xAA);
//! assert_eq!(scratch.used_size(), 1024);
//!
//! scratch.reset();
//! assert_eq!(scratch.used_size(), 0);
//! ```

mod arena;
mod error;
mod pool;
mod size;
mod slot;
mod span;
mod stats;

pub use arena::Arena;
pub use error::MemoryError;
pub use pool::{StaticPool, POOL_ALIGNMENT};
pub use size::PoolSize;
pub use slot::Slot;
pub use span::{ArenaSpan, SpanTable};
pub use stats::ArenaStats;
