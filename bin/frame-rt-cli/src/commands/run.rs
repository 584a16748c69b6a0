// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `frame-rt run` command: push synthetic frames through the pipeline.
//!
//! ```text
//! RunnerContext<Uninitialized> → initialize → <Ready> → FramePipeline::execute × N
//! ```
//!
//! Frames are generated, not captured, and the display is the in-memory
//! driver, so the command runs anywhere.

use runtime::{
    class_color, FramePipeline, RuntimeConfig, StdCycleCounter, COLOR_RESET, RECORD_SIZE,
};
use std::path::PathBuf;
use video_stream::MemoryVideoOut;

pub fn execute(
    config: &RuntimeConfig,
    model: PathBuf,
    frames: usize,
    json: bool,
) -> anyhow::Result<()> {
    let (program, program_size) = super::load_program(&model)?;

    let (method_size, scratch_size) = config.parse_pools()?;
    let mut method_pool = vec![0u8; method_size.as_bytes()];
    let mut scratch_pool = vec![0u8; scratch_size.as_bytes()];

    let mut pipeline = FramePipeline::init(
        config,
        &mut method_pool,
        &mut scratch_pool,
        &program,
        program_size,
        MemoryVideoOut::new(config.display_len()),
        StdCycleCounter::new(config.cpu_freq_hz),
    )?;

    if !json {
        println!("╔══════════════════════════════════════════════════════╗");
        println!("║             frame-rt · Frame Pipeline               ║");
        println!("╚══════════════════════════════════════════════════════╝");
        println!();
        println!("  Model:    {} ({})", program.name(), model.display());
        println!("  Variant:  {}", pipeline.variant());
        println!("  Frames:   {frames} of {}x{}", config.image_width, config.image_height);
        println!();
        for line in pipeline.memory_report().summary().lines() {
            println!("  {line}");
        }
        println!();
    }

    let mut output = [0u8; RECORD_SIZE];
    let mut failed = 0usize;
    for i in 0..frames {
        let mut frame = synthetic_frame(config, i);
        match pipeline.execute(&mut frame, &mut output) {
            Ok(result) if json => println!(
                "{}",
                serde_json::json!({
                    "frame": i,
                    "label": result.label.as_str(),
                    "class_index": result.class_index,
                    "confidence": result.confidence,
                    "timings": pipeline.last_timings(),
                })
            ),
            Ok(result) => println!(
                "  [{i:>4}] {}{:<12}{COLOR_RESET} {:6.2} %",
                class_color(result.class_index),
                result.label.as_str(),
                result.confidence,
            ),
            Err(e) => {
                failed += 1;
                if json {
                    println!("{}", serde_json::json!({ "frame": i, "error": e.to_string() }));
                } else {
                    println!("  [{i:>4}] failed: {e}");
                }
            }
        }
    }

    if !json {
        println!();
        println!(
            "  Processed {} / {frames} frames ({failed} failed)",
            pipeline.frames_processed()
        );
        if runtime::FrameTimings::default() != pipeline.last_timings() {
            println!(
                "  Last frame: {}",
                pipeline.last_timings().summary(config.cpu_freq_hz)
            );
        }
    }
    tracing::info!(frames = pipeline.frames_processed(), failed, "run complete");

    Ok(())
}

/// A moving diagonal gradient, different for every frame index.
fn synthetic_frame(config: &RuntimeConfig, index: usize) -> Vec<u8> {
    let (w, h) = (config.image_width, config.image_height);
    let mut frame = vec![0u8; config.frame_len()];
    for y in 0..h {
        for x in 0..w {
            let o = (y * w + x) * 3;
            let t = x + y + index * 17;
            frame[o] = (t % 256) as u8;
            frame[o + 1] = ((t * 3) % 256) as u8;
            frame[o + 2] = (255 - (t % 256)) as u8;
        }
    }
    frame
}
