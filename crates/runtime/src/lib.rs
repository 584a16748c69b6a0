// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The arena-backed runner and the per-frame classification pipeline.
//!
//! The runtime takes:
//! - A `Program` from `model-program` (the model container and its executor).
//! - Two fixed byte pools for the method and scratch arenas from `memory-manager`.
//! - A `VideoOut` driver from `video-stream`.
//!
//! And runs each camera frame through preprocess, inference, decode, overlay
//! and display, without allocating after start-up.
//!
//! # Type-State Runner
//! The runner context enforces a type-safe lifecycle:
//! ```text
//! RunnerContext<Uninitialized> ──initialize──► RunnerContext<Ready>
//!                                   │
//!                                   └── Err: context consumed (terminal)
//! ```
//! Frames can only be processed on a ready context, checked at compile time.
//!
//! # Build variants
//! The label table is fixed at build time by the `variant-vehicle`,
//! `variant-banana` and `variant-tool` features; without any of them the
//! build classifies rock-paper-scissors. The `time-profiling` feature
//! compiles in per-stage cycle counting.

mod config;
mod context;
mod decoder;
mod error;
mod overlay;
mod pipeline;
mod profiler;
mod record;
mod text;

pub use config::RuntimeConfig;
pub use context::{
    ContextState, MemoryReport, Outputs, Ready, ReadyContext, RunInfo, RunnerContext,
    Uninitialized, BUFFER_ALIGNMENT, MAX_PLANNED_BUFFERS, VERIFY_TOLERANCE,
};
pub use decoder::{
    class_color, decode, ClassificationResult, Label, ModelVariant, COLOR_RESET, LABEL_CAPACITY,
    MAX_LOGITS, UNKNOWN_LABEL,
};
pub use error::{status_code, RuntimeError};
pub use overlay::{draw_label, draw_text, glyph, overlay_text, OverlayText, TEXT_COLOR};
pub use pipeline::FramePipeline;
pub use profiler::{
    cycles_to_ms, CycleCounter, FrameTimings, Profiler, StdCycleCounter, CPU_FREQ_HZ,
};
pub use record::{write_record, OutputRecord, RECORD_LABEL_LEN, RECORD_SIZE};
pub use text::FixedStr;
