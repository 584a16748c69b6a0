// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-program
//!
//! The boundary between the frame runner and the model executor.
//!
//! - [`Program`]: a parsed model container. Enumerates, describes and
//!   loads methods.
//! - [`MethodMeta`]: declared inputs and the memory plan (planned buffer
//!   sizes) of one method.
//! - [`MemoryManager`]: the method arena, planned buffers and scratch arena
//!   handed to the executor.
//! - [`Method`]: a loaded method with its inputs, execution and outputs.
//! - [`ModelOutput`]: a tagged output value; only float tensors carry data.
//! - [`ManifestProgram`]: a host reference program read from JSON, used by
//!   tests and the CLI.
//!
//! Executor failures carry a raw status code ([`ProgramError::status`]) so
//! the runner can report it verbatim.

mod error;
mod manifest;
mod program;

pub use error::{status, ProgramError};
pub use manifest::{
    InputManifest, LinearHead, ManifestMethod, ManifestProgram, MethodManifest, OutputManifest,
    ProgramManifest,
};
pub use program::{InputSlot, MemoryManager, Method, MethodMeta, ModelOutput, Program, Tag};
