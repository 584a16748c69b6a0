// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fixed-capacity tensor shapes.

use crate::{DType, TensorError};
use std::fmt;

/// Maximum number of dimensions a [`Shape`] can describe.
pub const MAX_RANK: usize = 4;

/// The dimensions of a tensor, stored inline (no heap).
///
/// # Examples
/// ```
/// use tensor_core::{DType, Shape};
/// let s = Shape::nchw(1, 3, 224, 224);
/// assert_eq!(s.rank(), 4);
/// assert_eq!(s.size_bytes(DType::F32), 602_112);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: [usize; MAX_RANK],
    rank: usize,
}

impl Shape {
    /// Creates a shape from a dimension slice.
    pub fn new(dims: &[usize]) -> Result<Self, TensorError> {
        if dims.len() > MAX_RANK {
            return Err(TensorError::RankTooLarge {
                rank: dims.len(),
                max: MAX_RANK,
            });
        }
        let mut stored = [0usize; MAX_RANK];
        stored[..dims.len()].copy_from_slice(dims);
        Ok(Self {
            dims: stored,
            rank: dims.len(),
        })
    }

    /// Creates a 1-D shape.
    pub const fn vector(len: usize) -> Self {
        Self {
            dims: [len, 0, 0, 0],
            rank: 1,
        }
    }

    /// Creates a 2-D shape, e.g. `[batch, classes]` for a logit output.
    pub const fn matrix(rows: usize, cols: usize) -> Self {
        Self {
            dims: [rows, cols, 0, 0],
            rank: 2,
        }
    }

    /// Creates a 4-D `[N, C, H, W]` shape.
    pub const fn nchw(n: usize, c: usize, h: usize, w: usize) -> Self {
        Self {
            dims: [n, c, h, w],
            rank: 4,
        }
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims[..self.rank]
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims().get(index).copied()
    }

    /// Returns the total number of elements (1 for a rank-0 shape).
    pub fn num_elements(&self) -> usize {
        self.dims().iter().product()
    }

    /// Computes the memory footprint in bytes for `dtype`.
    pub fn size_bytes(&self, dtype: DType) -> usize {
        self.num_elements() * dtype.size_bytes()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

impl serde::Serialize for Shape {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.dims())
    }
}

impl<'de> serde::Deserialize<'de> for Shape {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dims = Vec::<usize>::deserialize(deserializer)?;
        Shape::new(&dims).map_err(serde::de::Error::custom)
    }
}
