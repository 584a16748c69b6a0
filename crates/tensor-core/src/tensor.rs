// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor metadata as declared by a loaded method.

use crate::{DType, Shape};

/// Static description of one tensor slot: its element type and shape.
///
/// The runner compares `nbytes()` against the buffer it is about to bind so
/// that a geometry mismatch is caught before the executor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TensorInfo {
    /// Element type.
    pub dtype: DType,
    /// Dimensions.
    pub shape: Shape,
}

impl TensorInfo {
    /// Creates tensor metadata.
    pub fn new(dtype: DType, shape: Shape) -> Self {
        Self { dtype, shape }
    }

    /// Number of elements.
    pub fn numel(&self) -> usize {
        self.shape.num_elements()
    }

    /// Size of the tensor data in bytes.
    pub fn nbytes(&self) -> usize {
        self.shape.size_bytes(self.dtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nbytes() {
        let info = TensorInfo::new(DType::F32, Shape::nchw(1, 3, 224, 224));
        assert_eq!(info.numel(), 150_528);
        assert_eq!(info.nbytes(), 602_112);
    }
}
