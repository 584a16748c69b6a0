// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: end-to-end frame pipeline.
//!
//! These tests drive real frames through `FramePipeline` with a
//! `ManifestProgram` executor and the in-memory video driver, proving that
//! the arena, program, stream and runtime crates compose correctly and that
//! per-frame failures leave the pipeline usable.

use memory_manager::{Arena, ArenaSpan};
use model_program::{
    status, ManifestMethod, ManifestProgram, MemoryManager, Method, MethodMeta, ModelOutput,
    Program, ProgramError,
};
use runtime::{
    status_code, FramePipeline, ModelVariant, OutputRecord, RuntimeConfig, RuntimeError,
    StdCycleCounter, RECORD_SIZE, TEXT_COLOR,
};
use std::cell::Cell;
use std::rc::Rc;
use video_stream::{
    EventCallback, MemoryVideoOut, StreamError, StreamMode, StreamStatus, VideoOut,
};

// ── Helpers ────────────────────────────────────────────────────

const POOL_BYTES: usize = 2 << 20;

/// A zero-weight linear head: the logits are exactly the bias.
fn manifest(shape: &str, bundled: bool) -> String {
    let bundled = if bundled {
        r#", "bundled_output": [2.0, 1.0, 0.1, -1.0]"#
    } else {
        ""
    };
    format!(
        r#"{{
            "name": "rps-linear",
            "methods": [
                {{
                    "name": "forward",
                    "inputs": [ {{ "tag": "tensor", "dtype": "f32", "shape": {shape} }} ],
                    "planned_buffers": [16],
                    "head": {{
                        "weights": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]],
                        "bias": [2.0, 1.0, 0.1, -1.0]
                    }}{bundled}
                }}
            ]
        }}"#
    )
}

fn rps_program() -> ManifestProgram {
    ManifestProgram::from_json(&manifest("[1, 3, 224, 224]", false)).unwrap()
}

fn config() -> RuntimeConfig {
    RuntimeConfig {
        method_pool: "2M".into(),
        scratch_pool: "64K".into(),
        ..RuntimeConfig::default()
    }
}

fn driver(config: &RuntimeConfig) -> MemoryVideoOut {
    MemoryVideoOut::new(config.display_len())
}

fn pipeline<'b, 'p, P: Program>(
    config: &RuntimeConfig,
    method_pool: &'b mut [u8],
    scratch_pool: &'b mut [u8],
    program: &'p P,
    driver: MemoryVideoOut,
) -> Result<FramePipeline<'b, 'p, P, MemoryVideoOut>, RuntimeError> {
    FramePipeline::init(
        config,
        method_pool,
        scratch_pool,
        program,
        1024,
        driver,
        StdCycleCounter::default(),
    )
    .map(|p| p.with_variant(ModelVariant::RockPaperScissors))
}

/// Wraps a manifest program to observe and fail executions.
struct Instrumented {
    inner: ManifestProgram,
    executes: Rc<Cell<usize>>,
    fail: Rc<Cell<bool>>,
}

impl Instrumented {
    fn new(inner: ManifestProgram) -> Self {
        Self {
            inner,
            executes: Rc::new(Cell::new(0)),
            fail: Rc::new(Cell::new(false)),
        }
    }
}

struct InstrumentedMethod {
    inner: ManifestMethod,
    executes: Rc<Cell<usize>>,
    fail: Rc<Cell<bool>>,
}

impl Program for Instrumented {
    type Method = InstrumentedMethod;

    fn num_methods(&self) -> usize {
        self.inner.num_methods()
    }

    fn method_name(&self, index: usize) -> Result<&str, ProgramError> {
        self.inner.method_name(index)
    }

    fn method_meta(&self, name: &str) -> Result<MethodMeta<'_>, ProgramError> {
        self.inner.method_meta(name)
    }

    fn load_method(
        &self,
        name: &str,
        memory: &mut MemoryManager<'_, '_>,
    ) -> Result<InstrumentedMethod, ProgramError> {
        Ok(InstrumentedMethod {
            inner: self.inner.load_method(name, memory)?,
            executes: Rc::clone(&self.executes),
            fail: Rc::clone(&self.fail),
        })
    }
}

impl Method for InstrumentedMethod {
    fn num_inputs(&self) -> usize {
        self.inner.num_inputs()
    }

    fn input_span(&self, index: usize) -> Result<ArenaSpan, ProgramError> {
        self.inner.input_span(index)
    }

    fn execute(&mut self, memory: &mut MemoryManager<'_, '_>) -> Result<(), ProgramError> {
        self.executes.set(self.executes.get() + 1);
        if self.fail.get() {
            // Leave temporaries behind to check they are released.
            memory.temp.allocate(256, 16)?;
            return Err(ProgramError::Execution {
                status: status::INTERNAL,
                detail: "injected failure".into(),
            });
        }
        self.inner.execute(memory)
    }

    fn num_outputs(&self) -> usize {
        self.inner.num_outputs()
    }

    fn output<'a>(
        &self,
        index: usize,
        method_arena: &'a Arena<'_>,
    ) -> Result<ModelOutput<'a>, ProgramError> {
        self.inner.output(index, method_arena)
    }
}

/// Never hands out a block; idle on the first status read, active after.
#[derive(Default)]
struct BlockStarvedDriver {
    status_polls: usize,
}

impl VideoOut for BlockStarvedDriver {
    fn initialize(&mut self, _callback: EventCallback) -> Result<(), StreamError> {
        Ok(())
    }

    fn set_buf(&mut self, _len: usize, _block_size: usize) -> Result<(), StreamError> {
        Ok(())
    }

    fn status(&mut self) -> StreamStatus {
        self.status_polls += 1;
        StreamStatus {
            active: self.status_polls > 1,
        }
    }

    fn get_block(&mut self) -> Option<&mut [u8]> {
        None
    }

    fn release_block(&mut self) -> Result<(), StreamError> {
        Err(StreamError::NoBlockHeld)
    }

    fn start(&mut self, _mode: StreamMode) -> Result<(), StreamError> {
        Ok(())
    }
}

// ── End to end ─────────────────────────────────────────────────

#[test]
fn test_end_to_end_zero_frame_classifies_paper() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .unwrap();

    let mut frame = vec![0u8; config.frame_len()];
    let mut output = vec![0xAAu8; 256];
    let result = pipeline.execute(&mut frame, &mut output);
    assert_eq!(status_code(&result), 0);
    let result = result.unwrap();

    assert_eq!(result.label.as_str(), "PAPER");
    assert_eq!(result.class_index, 0);
    assert!(result.is_known());
    assert!((result.confidence - 63.81).abs() < 0.05, "{}", result.confidence);
    assert_eq!(result.confidence_percent(), 63);

    let record = OutputRecord::from_result(&result);
    assert_eq!(&output[..RECORD_SIZE], &record.to_bytes());
    assert!(output[RECORD_SIZE..].iter().all(|&b| b == 0));
    assert_eq!(OutputRecord::from_bytes(&output).unwrap().label(), "PAPER");

    // The overlay was drawn into the frame and the frame was shown.
    assert!(frame.chunks_exact(3).any(|px| px == TEXT_COLOR));
    let driver = pipeline.driver();
    assert_eq!(driver.frames_released(), 1);
    assert_eq!(driver.starts(), 1);
    assert_eq!(driver.last_mode(), Some(StreamMode::Single));
    assert!(!driver.block_held());
    assert_eq!(driver.block(), &frame[..]);
    assert_eq!(pipeline.frames_processed(), 1);
    assert_eq!(pipeline.context().scratch().used_size(), 0);
}

#[test]
fn test_repeated_frames_give_the_same_result() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .unwrap();

    let before = pipeline.memory_report();
    let mut output = [0u8; RECORD_SIZE];
    for _ in 0..3 {
        let mut frame = vec![0u8; config.frame_len()];
        let result = pipeline.execute(&mut frame, &mut output).unwrap();
        assert_eq!(result.label.as_str(), "PAPER");
    }
    assert_eq!(pipeline.frames_processed(), 3);
    assert_eq!(pipeline.driver().frames_released(), 3);
    // The method arena does not grow per frame.
    assert_eq!(pipeline.memory_report(), before);
}

// ── Per-frame failures ─────────────────────────────────────────

#[test]
fn test_declared_input_size_mismatch_skips_executor() {
    let config = config();
    let program = Instrumented::new(
        ManifestProgram::from_json(&manifest("[1, 3, 112, 112]", false)).unwrap(),
    );
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .unwrap();

    let mut frame = vec![0u8; config.frame_len()];
    let mut output = [0u8; RECORD_SIZE];
    let err = pipeline.execute(&mut frame, &mut output).unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidArgument(_)));
    assert!(!err.is_fatal());
    assert_eq!(program.executes.get(), 0);
    assert_eq!(pipeline.driver().frames_released(), 0);
}

#[test]
fn test_failed_inference_resets_scratch_and_recovers() {
    let config = config();
    let program = Instrumented::new(rps_program());
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .unwrap();
    let scratch_after_init = pipeline.context().scratch().used_size();

    program.fail.set(true);
    let mut frame = vec![0u8; config.frame_len()];
    let mut output = [0u8; RECORD_SIZE];
    let err = pipeline.execute(&mut frame, &mut output).unwrap_err();
    match &err {
        RuntimeError::Inference { status: code } => assert_eq!(*code, status::INTERNAL),
        other => panic!("expected an inference error, got {other:?}"),
    }
    assert_eq!(status_code::<()>(&Err(err)), -1);
    assert_eq!(scratch_after_init, 0);
    assert_eq!(pipeline.context().scratch().used_size(), 0);
    assert!(output.iter().all(|&b| b == 0));

    program.fail.set(false);
    let mut frame = vec![0u8; config.frame_len()];
    let result = pipeline.execute(&mut frame, &mut output).unwrap();
    assert_eq!(result.label.as_str(), "PAPER");
    assert_eq!(program.executes.get(), 2);
}

#[test]
fn test_wrong_frame_length_is_rejected() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .unwrap();

    let mut frame = vec![0u8; config.frame_len() - 3];
    let mut output = [0u8; RECORD_SIZE];
    let err = pipeline.execute(&mut frame, &mut output).unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidArgument(_)));
    assert_eq!(pipeline.frames_processed(), 0);
}

#[test]
fn test_missing_output_block_fails_the_frame_only() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .unwrap();

    let mut output = [0u8; RECORD_SIZE];
    pipeline.driver_mut().withhold_block(true);
    let mut frame = vec![0u8; config.frame_len()];
    let err = pipeline.execute(&mut frame, &mut output).unwrap_err();
    assert!(matches!(err, RuntimeError::NoOutputBlock));
    assert!(!err.is_fatal());

    pipeline.driver_mut().withhold_block(false);
    let mut frame = vec![0u8; config.frame_len()];
    assert!(pipeline.execute(&mut frame, &mut output).is_ok());
    assert_eq!(pipeline.driver().frames_released(), 1);
}

#[test]
fn test_missing_block_while_streaming_is_driver_busy() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = FramePipeline::init(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        1024,
        BlockStarvedDriver::default(),
        StdCycleCounter::default(),
    )
    .unwrap();

    let mut frame = vec![0u8; config.frame_len()];
    let mut output = [0u8; RECORD_SIZE];
    let err = pipeline.execute(&mut frame, &mut output).unwrap_err();
    assert!(matches!(err, RuntimeError::DriverBusy));
    assert!(!err.is_fatal());
    // One idle poll ends the wait, one more classifies the missing block.
    assert_eq!(pipeline.driver().status_polls, 2);
    assert_eq!(pipeline.frames_processed(), 0);
}

#[test]
fn test_display_waits_for_previous_frame() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config).with_busy_polls(3),
    )
    .unwrap();

    let mut output = [0u8; RECORD_SIZE];
    let mut frame = vec![0u8; config.frame_len()];
    pipeline.execute(&mut frame, &mut output).unwrap();
    // Nothing was streaming yet: a single idle poll.
    assert_eq!(pipeline.driver().status_polls(), 1);

    let mut frame = vec![0u8; config.frame_len()];
    pipeline.execute(&mut frame, &mut output).unwrap();
    // Three busy polls while the first frame scans out, then one idle poll.
    assert_eq!(pipeline.driver().status_polls(), 5);
    assert_eq!(pipeline.driver().starts(), 2);
}

#[test]
fn test_release_and_start_failures_are_not_fatal() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .unwrap();

    pipeline.driver_mut().fail_release(true);
    pipeline.driver_mut().fail_start(true);
    let mut frame = vec![0u8; config.frame_len()];
    let mut output = [0u8; RECORD_SIZE];
    let result = pipeline.execute(&mut frame, &mut output).unwrap();
    assert_eq!(result.label.as_str(), "PAPER");

    let driver = pipeline.driver();
    assert_eq!(driver.frames_released(), 0);
    assert_eq!(driver.starts(), 0);
    assert!(!driver.block_held());
    assert_eq!(pipeline.frames_processed(), 1);
}

#[test]
fn test_short_output_buffer_skips_record() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .unwrap();

    let mut frame = vec![0u8; config.frame_len()];
    let mut output = [0xFFu8; RECORD_SIZE - 1];
    let result = pipeline.execute(&mut frame, &mut output).unwrap();
    assert_eq!(result.label.as_str(), "PAPER");
    assert!(output.iter().all(|&b| b == 0));
}

// ── Start-up failures ──────────────────────────────────────────

#[test]
fn test_program_without_methods_is_fatal() {
    let config = config();
    let program = ManifestProgram::from_json(r#"{ "name": "empty", "methods": [] }"#).unwrap();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let err = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .err()
    .unwrap();
    assert!(matches!(err, RuntimeError::ModelLoad(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_method_arena_too_small_for_staging() {
    // Room for the planned buffer and the method input, not for staging.
    let config = RuntimeConfig {
        method_pool: "700K".into(),
        ..config()
    };
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let err = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .err()
    .unwrap();
    match err {
        RuntimeError::OutOfMemory {
            buffer_index,
            requested,
            ..
        } => {
            assert_eq!(buffer_index, 1);
            assert_eq!(requested, 224 * 224 * 3 * 4);
        }
        other => panic!("expected out of memory, got {other:?}"),
    }
}

#[test]
fn test_undersized_pool_is_a_config_error() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; 1 << 20];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let err = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .err()
    .unwrap();
    assert!(matches!(err, RuntimeError::Config(_)));
}

#[test]
fn test_driver_initialize_failure() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let err = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config).fail_initialize(true),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        RuntimeError::Initialization {
            stage: "video output",
            ..
        }
    ));
    assert!(err.is_fatal());
}

// ── Reporting ──────────────────────────────────────────────────

#[test]
fn test_bundled_output_verification() {
    let config = RuntimeConfig {
        bundle_io: true,
        ..config()
    };
    let program = ManifestProgram::from_json(&manifest("[1, 3, 224, 224]", true)).unwrap();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let mut pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .unwrap();

    let mut frame = vec![0u8; config.frame_len()];
    let mut output = [0u8; RECORD_SIZE];
    pipeline.execute(&mut frame, &mut output).unwrap();
    assert!(pipeline.context().info().bundle_io);
    assert!(pipeline.context().verify_result());
}

#[test]
fn test_memory_report_after_init() {
    let config = config();
    let program = rps_program();
    let mut method_pool = vec![0u8; POOL_BYTES];
    let mut scratch_pool = vec![0u8; 64 << 10];
    let pipeline = pipeline(
        &config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        driver(&config),
    )
    .unwrap();

    let input_bytes = 224 * 224 * 3 * 4;
    let report = pipeline.memory_report();
    assert_eq!(report.program_size, 1024);
    assert_eq!(report.method_capacity, POOL_BYTES);
    assert_eq!(report.input, input_bytes);
    assert_eq!(report.loaded, input_bytes);
    assert!(report.planned >= 16 && report.planned < 32);
    assert_eq!(report.executor, 0);
    assert_eq!(report.scratch_capacity, 64 << 10);
    assert_eq!(
        report.method_used + report.method_free,
        report.method_capacity
    );

    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["input"], input_bytes);
}
