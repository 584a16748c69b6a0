// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Span handles and fixed-capacity span tables.

use crate::MemoryError;

/// A handle to a contiguous sub-range of an [`Arena`](crate::Arena).
///
/// Spans are plain `Copy` values. They carry the arena generation they were
/// issued in, so dereferencing one after a reset fails instead of aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaSpan {
    offset: usize,
    len: usize,
    generation: u32,
}

impl ArenaSpan {
    /// An empty span, used as filler in fixed tables.
    pub const EMPTY: ArenaSpan = ArenaSpan {
        offset: 0,
        len: 0,
        generation: 0,
    };

    pub(crate) fn new(offset: usize, len: usize, generation: u32) -> Self {
        Self {
            offset,
            len,
            generation,
        }
    }

    /// Byte offset from the start of the pool.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for a zero-length span.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// The arena generation this span was issued in.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// A fixed-capacity, insertion-ordered list of spans.
///
/// Used for the planned activation buffers of a loaded method: the number of
/// buffers is only known once the memory plan is read, but the storage must
/// exist before that.
#[derive(Debug, Clone)]
pub struct SpanTable<const N: usize> {
    spans: [ArenaSpan; N],
    len: usize,
}

impl<const N: usize> SpanTable<N> {
    /// Creates an empty table.
    pub const fn new() -> Self {
        Self {
            spans: [ArenaSpan::EMPTY; N],
            len: 0,
        }
    }

    /// Appends a span. Fails with `TooManySpans` when the table is full.
    pub fn push(&mut self, span: ArenaSpan) -> Result<usize, MemoryError> {
        if self.len == N {
            return Err(MemoryError::TooManySpans { capacity: N });
        }
        self.spans[self.len] = span;
        self.len += 1;
        Ok(self.len - 1)
    }

    /// Returns the span at `index`.
    pub fn get(&self, index: usize) -> Option<ArenaSpan> {
        self.as_slice().get(index).copied()
    }

    /// Returns the populated part of the table.
    pub fn as_slice(&self) -> &[ArenaSpan] {
        &self.spans[..self.len]
    }

    /// Number of spans stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no span has been pushed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of spans.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Sum of the lengths of all stored spans (padding excluded).
    pub fn total_bytes(&self) -> usize {
        self.as_slice().iter().map(ArenaSpan::len).sum()
    }
}

impl<const N: usize> Default for SpanTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
