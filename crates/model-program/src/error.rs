// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model programs and the executor interface.

use memory_manager::MemoryError;

/// Raw executor status codes, as reported across the executor boundary.
pub mod status {
    /// Success.
    pub const OK: u32 = 0x00;
    /// An internal executor error.
    pub const INTERNAL: u32 = 0x01;
    /// An argument was out of range or malformed.
    pub const INVALID_ARGUMENT: u32 = 0x12;
    /// A value had the wrong type (e.g. a tensor was expected).
    pub const INVALID_TYPE: u32 = 0x13;
    /// A named entity (method) does not exist.
    pub const NOT_FOUND: u32 = 0x20;
    /// A memory pool could not satisfy an allocation.
    pub const MEMORY_ALLOCATION_FAILED: u32 = 0x21;
    /// The program container is malformed.
    pub const INVALID_PROGRAM: u32 = 0x23;
}

/// Errors reported by a [`crate::Program`] or [`crate::Method`].
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// The program file could not be read.
    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),

    /// The program container could not be parsed.
    #[error("failed to parse program: {0}")]
    Parse(#[from] serde_json::Error),

    /// The program parsed but is internally inconsistent.
    #[error("invalid program: {0}")]
    InvalidProgram(String),

    /// No method with this name exists in the program.
    #[error("method not found: {name}")]
    MethodNotFound { name: String },

    /// An input or output index is out of range.
    #[error("{what} index {index} out of range (have {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// The slot at `index` does not hold a tensor.
    #[error("input {index} is not a tensor")]
    NotATensor { index: usize },

    /// An arena operation failed while loading or executing.
    #[error("executor memory error: {0}")]
    Memory(#[from] MemoryError),

    /// The method failed while executing.
    #[error("execution failed (status 0x{status:02x}): {detail}")]
    Execution { status: u32, detail: String },
}

impl ProgramError {
    /// The raw executor status code for this error.
    pub fn status(&self) -> u32 {
        match self {
            ProgramError::Io(_) => status::INTERNAL,
            ProgramError::Parse(_) | ProgramError::InvalidProgram(_) => status::INVALID_PROGRAM,
            ProgramError::MethodNotFound { .. } => status::NOT_FOUND,
            ProgramError::IndexOutOfRange { .. } => status::INVALID_ARGUMENT,
            ProgramError::NotATensor { .. } => status::INVALID_TYPE,
            ProgramError::Memory(_) => status::MEMORY_ALLOCATION_FAILED,
            ProgramError::Execution { status, .. } => *status,
        }
    }
}
