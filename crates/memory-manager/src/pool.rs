// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Statically sized, over-aligned backing storage for arenas.

/// Alignment guaranteed for the first byte of every [`StaticPool`].
pub const POOL_ALIGNMENT: usize = 16;

/// A fixed byte array aligned to [`POOL_ALIGNMENT`].
///
/// On the target this is declared as a `static` placed in a dedicated memory
/// section; on the host it can live on the stack or in a test fixture. The
/// 16-byte alignment matches the DMA requirement of the NPU and makes arena
/// padding independent of where the pool lands.
#[repr(C, align(16))]
pub struct StaticPool<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> StaticPool<N> {
    /// Creates a zero-filled pool.
    pub const fn new() -> Self {
        Self { bytes: [0; N] }
    }

    /// Pool size in bytes.
    pub const fn len(&self) -> usize {
        N
    }

    /// Returns `true` for a zero-sized pool.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Borrows the pool as a byte slice, typically to build an [`Arena`](crate::Arena).
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl<const N: usize> Default for StaticPool<N> {
    fn default() -> Self {
        Self::new()
    }
}
