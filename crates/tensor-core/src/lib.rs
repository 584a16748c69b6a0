// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Tensor metadata and the numeric kernels of the frame pipeline.
//!
//! This crate provides:
//! - [`DType`], [`Shape`] and [`TensorInfo`]: the description of a model's
//!   input and output slots, stored inline.
//! - [`normalize_hwc_to_chw`]: RGB888 HWC frame to normalised CHW `f32`.
//! - [`softmax`] and [`argmax`]: logit decoding.
//!
//! # Design Goals
//! - Every operation writes into a caller-owned buffer; nothing allocates.
//! - Single precision throughout, matching the embedded FPU.
//! - Clean error types via `thiserror`.

mod dtype;
mod error;
mod ops;
mod shape;
mod tensor;

pub use dtype::DType;
pub use error::TensorError;
pub use ops::{argmax, normalize_hwc_to_chw, softmax, ImageDims, Normalization, RGB_CHANNELS};
pub use shape::{Shape, MAX_RANK};
pub use tensor::TensorInfo;
