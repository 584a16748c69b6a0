// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `frame-rt inspect` command: display a program's methods and memory plan.
//!
//! Prints every method's input slots and planned buffers, plus an estimate
//! of the method arena the runner needs for the configured frame geometry.

use model_program::{InputSlot, Program};
use runtime::{RuntimeConfig, BUFFER_ALIGNMENT};
use std::path::PathBuf;

pub fn execute(config: &RuntimeConfig, model: PathBuf, json: bool) -> anyhow::Result<()> {
    let (program, program_size) = super::load_program(&model)?;

    if json {
        let methods = (0..program.num_methods())
            .map(|i| -> anyhow::Result<serde_json::Value> {
                let name = program.method_name(i)?;
                let meta = program.method_meta(name)?;
                let planned: Vec<usize> = (0..meta.num_planned_buffers())
                    .map(|b| meta.planned_buffer_size(b))
                    .collect::<Result<_, _>>()?;
                Ok(serde_json::json!({
                    "name": name,
                    "inputs": meta.inputs().iter().map(|s| s.tag().to_string()).collect::<Vec<_>>(),
                    "planned_buffers": planned,
                    "estimated_method_arena": estimate_arena(config, &meta),
                }))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let doc = serde_json::json!({
            "name": program.name(),
            "program_size": program_size,
            "methods": methods,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             frame-rt · Program Inspector            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Summary ────────────────────────────────────────────────
    println!("  Program: {}", program.name());
    println!("  Size:    {program_size} bytes");
    println!("  Methods: {}", program.num_methods());
    println!();

    for i in 0..program.num_methods() {
        let name = program.method_name(i)?;
        let meta = program.method_meta(name)?;

        // ── Inputs ─────────────────────────────────────────────
        println!("  Method {i}: {name}{}", if i == 0 { "  (runs)" } else { "" });
        println!("   {:<4} {:<8} {:<6} {:<20} {:>10}", "Idx", "Tag", "DType", "Shape", "Bytes");
        println!("   {}", "-".repeat(52));
        for (idx, slot) in meta.inputs().iter().enumerate() {
            match slot {
                InputSlot::Tensor(info) => println!(
                    "   {:<4} {:<8} {:<6} {:<20} {:>10}",
                    idx,
                    slot.tag().to_string(),
                    info.dtype.to_string(),
                    info.shape.to_string(),
                    info.nbytes(),
                ),
                InputSlot::Other(tag) => {
                    println!("   {:<4} {:<8} {:<6} {:<20} {:>10}", idx, tag.to_string(), "-", "-", "-")
                }
            }
        }

        // ── Memory Plan ────────────────────────────────────────
        println!("   Planned buffers:");
        for b in 0..meta.num_planned_buffers() {
            println!("    [{b}] {} bytes", meta.planned_buffer_size(b)?);
        }
        println!("   Planned total:      {} bytes", meta.planned_bytes());
        println!(
            "   Est. method arena:  {} bytes for {}x{} frames (configured: {})",
            estimate_arena(config, &meta),
            config.image_width,
            config.image_height,
            config.method_pool,
        );
        println!();
    }

    Ok(())
}

/// Planned buffers, tensor inputs and the staging tensor, each padded to
/// the buffer alignment.
fn estimate_arena(config: &RuntimeConfig, meta: &model_program::MethodMeta<'_>) -> usize {
    let pad = |n: usize| n.div_ceil(BUFFER_ALIGNMENT) * BUFFER_ALIGNMENT;
    let planned: usize = (0..meta.num_planned_buffers())
        .filter_map(|b| meta.planned_buffer_size(b).ok())
        .map(pad)
        .sum();
    let inputs: usize = meta
        .inputs()
        .iter()
        .filter_map(|slot| match slot {
            InputSlot::Tensor(info) => Some(pad(info.nbytes())),
            InputSlot::Other(_) => None,
        })
        .sum();
    planned + inputs + pad(config.tensor_len() * std::mem::size_of::<f32>())
}
