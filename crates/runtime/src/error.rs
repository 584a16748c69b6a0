// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the runner and the frame pipeline.

/// Errors that can occur while starting up or processing a frame.
///
/// Startup errors ([`RuntimeError::is_fatal`]) stop the application from
/// reaching frame execution. Every other variant fails the current frame
/// only; the runner context stays ready for the next one.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The video output driver could not be set up.
    #[error("failed to initialise {stage}: {source}")]
    Initialization {
        stage: &'static str,
        #[source]
        source: video_stream::StreamError,
    },

    /// The program has no usable method or its metadata cannot be read.
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// The executor refused to load the method.
    #[error("loading of method '{method}' failed with status 0x{status:02x}")]
    MethodLoad { method: String, status: u32 },

    /// The method arena cannot hold a startup buffer.
    #[error(
        "could not allocate buffer {buffer_index}: {requested} bytes requested, {available} available"
    )]
    OutOfMemory {
        buffer_index: usize,
        requested: usize,
        available: usize,
    },

    /// A frame or tensor has the wrong size.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The executor returned a failure while running the method.
    #[error("inference failed with status 0x{status:02x}")]
    Inference { status: u32 },

    /// The output driver restarted before a block could be taken.
    #[error("video output driver busy")]
    DriverBusy,

    /// The output driver has no free block.
    #[error("failed to get video output frame")]
    NoOutputBlock,

    /// The annotated frame could not be copied to the output block.
    #[error("display copy failed: {0}")]
    Display(#[from] video_stream::StreamError),

    /// No float output could be decoded into a class.
    #[error("model produced no decodable classification")]
    NoClassification,

    /// An arena operation failed.
    #[error("memory error: {0}")]
    Memory(#[from] memory_manager::MemoryError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RuntimeError {
    /// Returns `true` for errors that prevent the pipeline from starting.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RuntimeError::Initialization { .. }
                | RuntimeError::ModelLoad(_)
                | RuntimeError::MethodLoad { .. }
                | RuntimeError::OutOfMemory { .. }
                | RuntimeError::Config(_)
        )
    }
}

/// Projects a pipeline result onto the C-style status convention:
/// `0` on success, `-1` on any error.
pub fn status_code<T>(result: &Result<T, RuntimeError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => -1,
    }
}
