// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Frame staging and classification math.
//!
//! All operations write into caller-provided buffers and never allocate.

mod normalize_op;
mod softmax_op;

pub use normalize_op::{normalize_hwc_to_chw, ImageDims, Normalization, RGB_CHANNELS};
pub use softmax_op::{argmax, softmax};
