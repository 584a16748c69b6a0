// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bump-pointer arena over a fixed, caller-owned byte pool.
//!
//! The [`Arena`] is the only allocator on the frame path. It:
//!
//! 1. Carves contiguous, alignment-satisfying sub-ranges out of a borrowed
//!    buffer by advancing a single offset.
//! 2. Never frees individual allocations. The only way to reclaim memory is
//!    [`Arena::reset`], which invalidates every span issued so far.
//! 3. Tracks usage statistics for the memory report.
//!
//! # Spans, not references
//! Allocations are returned as [`ArenaSpan`] handles instead of `&mut [u8]`.
//! The arena stays freely borrowable (the executor, the runner and the
//! staging code all touch it in turn) and every access re-checks that the
//! span belongs to the current generation. A span from before a reset is
//! rejected with [`MemoryError::StaleSpan`] instead of aliasing new data.
//!
//! # Alignment
//! Alignment is computed against the absolute address of the cursor, so a
//! 16-byte request is 16-byte aligned in memory regardless of where the pool
//! itself starts. Backing the arena with a [`StaticPool`](crate::StaticPool)
//! makes the padding deterministic.

use crate::{ArenaSpan, ArenaStats, MemoryError};

/// A fixed-capacity bump allocator.
///
/// # Example
/// ```
/// use memory_manager::{Arena, StaticPool};
///
/// let mut pool = StaticPool::<1024>::new();
/// let mut arena = Arena::new(pool.as_mut_slice());
///
/// let a = arena.allocate(100, 16).unwrap();
/// let b = arena.allocate(64, 16).unwrap();
/// assert_eq!(a.offset(), 0);
/// assert_eq!(b.offset(), 112); // 100 rounded up to the next 16-byte boundary
/// assert_eq!(arena.used_size(), 176);
///
/// arena.reset();
/// assert_eq!(arena.used_size(), 0);
/// assert!(arena.bytes(a).is_err()); // stale after reset
/// ```
pub struct Arena<'b> {
    buf: &'b mut [u8],
    used: usize,
    generation: u32,
    stats: ArenaStats,
}

impl<'b> Arena<'b> {
    /// Creates an empty arena over `buf`. The buffer contents are left as-is.
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self {
            buf,
            used: 0,
            generation: 0,
            stats: ArenaStats::default(),
        }
    }

    /// Allocates `size` bytes aligned to `alignment`.
    ///
    /// Returns `Err(OutOfMemory)` if `used + padding + size` would exceed the
    /// capacity. A failed request leaves the arena untouched. Memory is not
    /// zeroed.
    pub fn allocate(&mut self, size: usize, alignment: usize) -> Result<ArenaSpan, MemoryError> {
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(MemoryError::InvalidAlignment { alignment });
        }

        let cursor = (self.buf.as_ptr() as usize).wrapping_add(self.used);
        let padding = cursor.wrapping_neg() & (alignment - 1);

        let end = self
            .used
            .checked_add(padding)
            .and_then(|start| start.checked_add(size));

        let end = match end {
            Some(end) if end <= self.buf.len() => end,
            _ => {
                tracing::debug!(
                    size,
                    alignment,
                    used = self.used,
                    capacity = self.buf.len(),
                    "arena allocation failed"
                );
                self.stats.record_oom();
                return Err(MemoryError::OutOfMemory {
                    requested_bytes: size,
                    available_bytes: self.free_size(),
                    capacity_bytes: self.capacity(),
                });
            }
        };

        let offset = self.used + padding;
        self.used = end;
        self.stats.record_allocation(padding, self.used);

        Ok(ArenaSpan::new(offset, size, self.generation))
    }

    /// Allocates room for `count` values of `f32`, 16-byte aligned.
    pub fn allocate_f32(&mut self, count: usize) -> Result<ArenaSpan, MemoryError> {
        let size = count
            .checked_mul(std::mem::size_of::<f32>())
            .ok_or(MemoryError::OutOfMemory {
                requested_bytes: usize::MAX,
                available_bytes: self.free_size(),
                capacity_bytes: self.capacity(),
            })?;
        self.allocate(size, 16)
    }

    /// Marks every allocation as released. Contents are not zeroed; spans
    /// issued before the reset become stale.
    pub fn reset(&mut self) {
        self.used = 0;
        self.generation = self.generation.wrapping_add(1);
        self.stats.record_reset();
    }

    /// Returns the number of bytes handed out, including alignment padding.
    pub fn used_size(&self) -> usize {
        self.used
    }

    /// Returns the total size of the backing pool.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the number of bytes not yet handed out.
    pub fn free_size(&self) -> usize {
        self.buf.len() - self.used
    }

    /// Returns how many times the arena has been reset.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns a snapshot of allocation statistics.
    pub fn stats(&self) -> ArenaStats {
        self.stats.clone()
    }

    /// Returns the bytes covered by `span`.
    pub fn bytes(&self, span: ArenaSpan) -> Result<&[u8], MemoryError> {
        let range = self.check(span)?;
        Ok(&self.buf[range])
    }

    /// Returns the bytes covered by `span`, mutably.
    pub fn bytes_mut(&mut self, span: ArenaSpan) -> Result<&mut [u8], MemoryError> {
        let range = self.check(span)?;
        Ok(&mut self.buf[range])
    }

    /// Views `span` as a slice of `f32`.
    pub fn f32_slice(&self, span: ArenaSpan) -> Result<&[f32], MemoryError> {
        bytemuck::try_cast_slice(self.bytes(span)?).map_err(|detail| MemoryError::Cast {
            target: "f32",
            detail,
        })
    }

    /// Views `span` as a mutable slice of `f32`.
    pub fn f32_slice_mut(&mut self, span: ArenaSpan) -> Result<&mut [f32], MemoryError> {
        bytemuck::try_cast_slice_mut(self.bytes_mut(span)?).map_err(|detail| MemoryError::Cast {
            target: "f32",
            detail,
        })
    }

    /// Copies the contents of `src` into `dst`. Both spans must be live and
    /// exactly the same length.
    pub fn copy_span(&mut self, src: ArenaSpan, dst: ArenaSpan) -> Result<(), MemoryError> {
        if src.len() != dst.len() {
            return Err(MemoryError::LengthMismatch {
                source_len: src.len(),
                dest_len: dst.len(),
            });
        }
        let from = self.check(src)?;
        let to = self.check(dst)?;
        self.buf.copy_within(from, to.start);
        Ok(())
    }

    fn check(&self, span: ArenaSpan) -> Result<std::ops::Range<usize>, MemoryError> {
        if span.generation() != self.generation {
            return Err(MemoryError::StaleSpan {
                span_generation: span.generation(),
                arena_generation: self.generation,
            });
        }
        let end = span.end();
        if end > self.used {
            return Err(MemoryError::SpanOutOfBounds {
                offset: span.offset(),
                end,
                used: self.used,
            });
        }
        Ok(span.offset()..end)
    }
}

impl std::fmt::Debug for Arena<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("used", &self.used)
            .field("free", &self.free_size())
            .field("generation", &self.generation)
            .finish()
    }
}
