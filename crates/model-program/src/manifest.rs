// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Host reference program described by a JSON manifest.
//!
//! Each method is a synthetic linear classification head over the
//! per-channel means of its first tensor input:
//!
//! ```text
//!   logits[k] = bias[k] + Σ_c weights[k][c] · mean(input[c, ..])
//! ```
//!
//! The channel means are computed in the scratch arena and the logits are
//! written into planned buffer 0, so a load/execute cycle exercises every
//! memory region the runner provides.
//!
//! # Format
//! ```json
//! {
//!   "name": "rps-linear",
//!   "methods": [
//!     {
//!       "name": "forward",
//!       "inputs": [ { "tag": "tensor", "dtype": "f32", "shape": [1, 3, 224, 224] } ],
//!       "planned_buffers": [64],
//!       "head": {
//!         "weights": [[0, 0, 0], [0, 0, 0], [0, 0, 0], [0, 0, 0]],
//!         "bias": [2.0, 1.0, 0.1, -1.0]
//!       },
//!       "extra_outputs": [ { "tag": "int" } ],
//!       "bundled_output": [2.0, 1.0, 0.1, -1.0]
//!     }
//!   ]
//! }
//! ```

use crate::{InputSlot, MemoryManager, Method, MethodMeta, ModelOutput, Program, ProgramError, Tag};
use memory_manager::{Arena, ArenaSpan};
use std::path::Path;
use tensor_core::{DType, Shape, TensorInfo};

/// Alignment of every tensor the reference program allocates.
const TENSOR_ALIGNMENT: usize = 16;

/// Top-level program manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProgramManifest {
    /// Human-readable program name.
    pub name: String,
    /// Methods in declaration order; method 0 is the one the runner loads.
    #[serde(default)]
    pub methods: Vec<MethodManifest>,
}

/// One method entry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MethodManifest {
    pub name: String,
    pub inputs: Vec<InputManifest>,
    /// Byte sizes of the memory-planned buffers.
    #[serde(default)]
    pub planned_buffers: Vec<usize>,
    pub head: LinearHead,
    /// Non-float outputs reported after the logits.
    #[serde(default)]
    pub extra_outputs: Vec<OutputManifest>,
    /// Expected logits, for on-device verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundled_output: Option<Vec<f32>>,
}

/// One declared input.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InputManifest {
    #[serde(default)]
    pub tag: Tag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtype: Option<DType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
}

/// One declared non-logit output.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OutputManifest {
    pub tag: Tag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtype: Option<DType>,
}

/// Linear classification head: one weight row per class, one column per
/// input channel.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LinearHead {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl LinearHead {
    /// Number of output classes.
    pub fn num_classes(&self) -> usize {
        self.bias.len()
    }

    /// Number of input channels.
    pub fn channels(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }
}

/// A method with its manifest entries resolved into executor types.
#[derive(Debug, Clone)]
struct ResolvedMethod {
    manifest: MethodManifest,
    inputs: Vec<InputSlot>,
    outputs: Vec<ModelOutput<'static>>,
    /// Index of the tensor input the head reads.
    source: usize,
}

/// A [`Program`] backed by a [`ProgramManifest`].
#[derive(Debug, Clone)]
pub struct ManifestProgram {
    name: String,
    methods: Vec<ResolvedMethod>,
}

impl ManifestProgram {
    /// Validates a manifest and builds the program.
    pub fn new(manifest: ProgramManifest) -> Result<Self, ProgramError> {
        let mut methods: Vec<ResolvedMethod> = Vec::with_capacity(manifest.methods.len());
        for method in manifest.methods {
            if methods.iter().any(|m| m.manifest.name == method.name) {
                return Err(ProgramError::InvalidProgram(format!(
                    "duplicate method name '{}'",
                    method.name
                )));
            }
            methods.push(resolve_method(method)?);
        }

        tracing::debug!(program = %manifest.name, methods = methods.len(), "program parsed");
        Ok(Self {
            name: manifest.name,
            methods,
        })
    }

    /// Parses a program from its JSON container bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProgramError> {
        Self::new(serde_json::from_slice(bytes)?)
    }

    /// Parses a program from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Loads a program from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ProgramError> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    /// Program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, name: &str) -> Result<&ResolvedMethod, ProgramError> {
        self.methods
            .iter()
            .find(|m| m.manifest.name == name)
            .ok_or_else(|| ProgramError::MethodNotFound { name: name.into() })
    }
}

fn resolve_method(manifest: MethodManifest) -> Result<ResolvedMethod, ProgramError> {
    let invalid = |detail: String| {
        ProgramError::InvalidProgram(format!("method '{}': {detail}", manifest.name))
    };

    let mut inputs = Vec::with_capacity(manifest.inputs.len());
    for (i, input) in manifest.inputs.iter().enumerate() {
        let slot = match input.tag {
            Tag::Tensor => match (input.dtype, input.shape) {
                (Some(dtype), Some(shape)) => InputSlot::Tensor(TensorInfo::new(dtype, shape)),
                _ => return Err(invalid(format!("tensor input {i} needs dtype and shape"))),
            },
            tag => InputSlot::Other(tag),
        };
        inputs.push(slot);
    }

    let (source, info) = inputs
        .iter()
        .enumerate()
        .find_map(|(i, slot)| match slot {
            InputSlot::Tensor(info) => Some((i, *info)),
            InputSlot::Other(_) => None,
        })
        .ok_or_else(|| invalid("no tensor input".into()))?;

    let head = &manifest.head;
    let classes = head.num_classes();
    let channels = head.channels();
    if classes == 0 {
        return Err(invalid("head has no classes".into()));
    }
    if head.weights.len() != classes || head.weights.iter().any(|row| row.len() != channels) {
        return Err(invalid(format!(
            "head weights must be {classes} rows of equal length"
        )));
    }
    if channels == 0 {
        return Err(invalid("head has no input channels".into()));
    }
    if info.dtype != DType::F32 {
        return Err(invalid(format!("input {source} must be f32, got {}", info.dtype)));
    }
    if info.numel() == 0 || info.numel() % channels != 0 {
        return Err(invalid(format!(
            "input {source} of shape {} does not split into {channels} channels",
            info.shape
        )));
    }

    let logits_bytes = classes * DType::F32.size_bytes();
    match manifest.planned_buffers.first() {
        Some(&size) if size >= logits_bytes && size % DType::F32.size_bytes() == 0 => {}
        _ => {
            return Err(invalid(format!(
                "planned buffer 0 must hold {logits_bytes} bytes of logits"
            )))
        }
    }

    if let Some(expected) = &manifest.bundled_output {
        if expected.len() != classes {
            return Err(invalid(format!(
                "bundled output has {} values, head has {classes} classes",
                expected.len()
            )));
        }
    }

    let mut outputs = Vec::with_capacity(manifest.extra_outputs.len());
    for (i, out) in manifest.extra_outputs.iter().enumerate() {
        let output = match (out.tag, out.dtype) {
            (Tag::Tensor, Some(dtype)) => ModelOutput::OtherTensor { dtype },
            (Tag::Tensor, None) => {
                return Err(invalid(format!("tensor output {} needs a dtype", i + 1)))
            }
            (tag, _) => ModelOutput::NonTensor { tag },
        };
        outputs.push(output);
    }

    Ok(ResolvedMethod {
        manifest,
        inputs,
        outputs,
        source,
    })
}

impl Program for ManifestProgram {
    type Method = ManifestMethod;

    fn num_methods(&self) -> usize {
        self.methods.len()
    }

    fn method_name(&self, index: usize) -> Result<&str, ProgramError> {
        self.methods
            .get(index)
            .map(|m| m.manifest.name.as_str())
            .ok_or(ProgramError::IndexOutOfRange {
                what: "method",
                index,
                len: self.methods.len(),
            })
    }

    fn method_meta(&self, name: &str) -> Result<MethodMeta<'_>, ProgramError> {
        let method = self.find(name)?;
        Ok(MethodMeta::new(
            &method.manifest.name,
            &method.inputs,
            &method.manifest.planned_buffers,
        ))
    }

    fn load_method(
        &self,
        name: &str,
        memory: &mut MemoryManager<'_, '_>,
    ) -> Result<ManifestMethod, ProgramError> {
        let method = self.find(name)?;
        let planned = &method.manifest.planned_buffers;

        if memory.planned.len() != planned.len() {
            return Err(ProgramError::InvalidProgram(format!(
                "method '{name}' plans {} buffers, runner provided {}",
                planned.len(),
                memory.planned.len()
            )));
        }
        for (i, (span, &size)) in memory.planned.iter().zip(planned).enumerate() {
            if span.len() < size {
                return Err(ProgramError::InvalidProgram(format!(
                    "planned buffer {i} is {} bytes, method needs {size}",
                    span.len()
                )));
            }
        }

        let mut input_spans = Vec::with_capacity(method.inputs.len());
        for slot in &method.inputs {
            let span = match slot {
                InputSlot::Tensor(info) => {
                    Some(memory.method.allocate(info.nbytes(), TENSOR_ALIGNMENT)?)
                }
                InputSlot::Other(_) => None,
            };
            input_spans.push(span);
        }

        tracing::debug!(
            method = name,
            inputs = input_spans.len(),
            planned = planned.len(),
            "method loaded"
        );

        Ok(ManifestMethod {
            inputs: input_spans,
            source: method.source,
            head: method.manifest.head.clone(),
            logits: memory.planned[0],
            extra_outputs: method.outputs.clone(),
        })
    }

    fn bundled_output(&self, name: &str, index: usize) -> Option<&[f32]> {
        if index != 0 {
            return None;
        }
        self.find(name).ok()?.manifest.bundled_output.as_deref()
    }
}

/// A method of a [`ManifestProgram`], loaded into the method arena.
#[derive(Debug)]
pub struct ManifestMethod {
    inputs: Vec<Option<ArenaSpan>>,
    source: usize,
    head: LinearHead,
    logits: ArenaSpan,
    extra_outputs: Vec<ModelOutput<'static>>,
}

impl Method for ManifestMethod {
    fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    fn input_span(&self, index: usize) -> Result<ArenaSpan, ProgramError> {
        match self.inputs.get(index) {
            Some(Some(span)) => Ok(*span),
            Some(None) => Err(ProgramError::NotATensor { index }),
            None => Err(ProgramError::IndexOutOfRange {
                what: "input",
                index,
                len: self.inputs.len(),
            }),
        }
    }

    fn execute(&mut self, memory: &mut MemoryManager<'_, '_>) -> Result<(), ProgramError> {
        let source = self.input_span(self.source)?;
        let channels = self.head.channels();
        let classes = self.head.num_classes();

        let means_span = memory.temp.allocate_f32(channels)?;
        let input = memory.method.f32_slice(source)?;
        let plane = input.len() / channels;
        let means = memory.temp.f32_slice_mut(means_span)?;
        for (c, mean) in means.iter_mut().enumerate() {
            let sum: f32 = input[c * plane..(c + 1) * plane].iter().sum();
            *mean = sum / plane as f32;
        }

        let means = memory.temp.f32_slice(means_span)?;
        let logits = memory.method.f32_slice_mut(self.logits)?;
        for (k, logit) in logits.iter_mut().take(classes).enumerate() {
            let dot: f32 = self.head.weights[k]
                .iter()
                .zip(means)
                .map(|(w, m)| w * m)
                .sum();
            *logit = self.head.bias[k] + dot;
        }

        Ok(())
    }

    fn num_outputs(&self) -> usize {
        1 + self.extra_outputs.len()
    }

    fn output<'a>(
        &self,
        index: usize,
        method_arena: &'a Arena<'_>,
    ) -> Result<ModelOutput<'a>, ProgramError> {
        if index == 0 {
            let logits = method_arena.f32_slice(self.logits)?;
            return Ok(ModelOutput::FloatTensor(&logits[..self.head.num_classes()]));
        }
        self.extra_outputs
            .get(index - 1)
            .copied()
            .ok_or(ProgramError::IndexOutOfRange {
                what: "output",
                index,
                len: self.num_outputs(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_manager::StaticPool;

    const MANIFEST: &str = r#"{
        "name": "rps-linear",
        "methods": [
            {
                "name": "forward",
                "inputs": [
                    { "tag": "tensor", "dtype": "f32", "shape": [1, 3, 2, 2] },
                    { "tag": "int" }
                ],
                "planned_buffers": [32, 16],
                "head": {
                    "weights": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]],
                    "bias": [2.0, 1.0, 0.1, -1.0]
                },
                "extra_outputs": [ { "tag": "tensor", "dtype": "i8" }, { "tag": "bool" } ],
                "bundled_output": [2.0, 1.0, 0.1, -1.0]
            }
        ]
    }"#;

    fn allocate_planned(program: &ManifestProgram, arena: &mut Arena<'_>) -> Vec<ArenaSpan> {
        let meta = program.method_meta("forward").unwrap();
        (0..meta.num_planned_buffers())
            .map(|i| {
                arena
                    .allocate(meta.planned_buffer_size(i).unwrap(), 16)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_parse_and_meta() {
        let program = ManifestProgram::from_json(MANIFEST).unwrap();
        assert_eq!(program.name(), "rps-linear");
        assert_eq!(program.num_methods(), 1);
        assert_eq!(program.method_name(0).unwrap(), "forward");
        assert!(program.method_name(1).is_err());

        let meta = program.method_meta("forward").unwrap();
        assert_eq!(meta.num_inputs(), 2);
        assert_eq!(meta.input(1).unwrap(), InputSlot::Other(Tag::Int));
        match meta.input(0).unwrap() {
            InputSlot::Tensor(info) => assert_eq!(info.nbytes(), 48),
            other => panic!("expected a tensor input, got {other:?}"),
        }
        assert_eq!(meta.planned_bytes(), 48);
        assert!(matches!(
            program.method_meta("missing"),
            Err(ProgramError::MethodNotFound { .. })
        ));
    }

    #[test]
    fn test_load_execute_outputs() {
        let program = ManifestProgram::from_json(MANIFEST).unwrap();
        let mut method_pool = StaticPool::<1024>::new();
        let mut temp_pool = StaticPool::<256>::new();
        let mut method_arena = Arena::new(method_pool.as_mut_slice());
        let mut temp_arena = Arena::new(temp_pool.as_mut_slice());

        let planned = allocate_planned(&program, &mut method_arena);
        let mut memory = MemoryManager::new(&mut method_arena, &planned, &mut temp_arena);
        let mut method = program.load_method("forward", &mut memory).unwrap();

        assert!(matches!(method.input_span(1), Err(ProgramError::NotATensor { index: 1 })));
        let input = method.input_span(0).unwrap();
        assert_eq!(input.len(), 48);

        // Channel planes of constant 0.5, 1.0 and -2.0.
        let values = memory.method.f32_slice_mut(input).unwrap();
        values[0..4].fill(0.5);
        values[4..8].fill(1.0);
        values[8..12].fill(-2.0);

        method.execute(&mut memory).unwrap();
        assert_eq!(memory.temp.used_size(), 12);

        assert_eq!(method.num_outputs(), 3);
        match method.output(0, &method_arena).unwrap() {
            ModelOutput::FloatTensor(logits) => {
                assert_eq!(logits.len(), 4);
                assert!((logits[0] - 2.5).abs() < 1e-6);
                assert!((logits[1] - 2.0).abs() < 1e-6);
                assert!((logits[2] + 1.9).abs() < 1e-6);
                assert!((logits[3] + 1.0).abs() < 1e-6);
            }
            other => panic!("expected float logits, got {other:?}"),
        }
        assert_eq!(
            method.output(1, &method_arena).unwrap(),
            ModelOutput::OtherTensor { dtype: DType::I8 }
        );
        assert_eq!(
            method.output(2, &method_arena).unwrap(),
            ModelOutput::NonTensor { tag: Tag::Bool }
        );
        assert!(method.output(3, &method_arena).is_err());
    }

    #[test]
    fn test_execute_fails_after_scratch_exhausted() {
        let program = ManifestProgram::from_json(MANIFEST).unwrap();
        let mut method_pool = StaticPool::<1024>::new();
        let mut temp_pool = StaticPool::<16>::new();
        let mut method_arena = Arena::new(method_pool.as_mut_slice());
        let mut temp_arena = Arena::new(temp_pool.as_mut_slice());

        let planned = allocate_planned(&program, &mut method_arena);
        let mut memory = MemoryManager::new(&mut method_arena, &planned, &mut temp_arena);
        let mut method = program.load_method("forward", &mut memory).unwrap();

        method.execute(&mut memory).unwrap();
        let err = method.execute(&mut memory).unwrap_err();
        assert_eq!(err.status(), crate::status::MEMORY_ALLOCATION_FAILED);

        memory.temp.reset();
        method.execute(&mut memory).unwrap();
    }

    #[test]
    fn test_load_rejects_missing_planned_buffers() {
        let program = ManifestProgram::from_json(MANIFEST).unwrap();
        let mut method_pool = StaticPool::<1024>::new();
        let mut temp_pool = StaticPool::<64>::new();
        let mut method_arena = Arena::new(method_pool.as_mut_slice());
        let mut temp_arena = Arena::new(temp_pool.as_mut_slice());

        let mut memory = MemoryManager::new(&mut method_arena, &[], &mut temp_arena);
        assert!(matches!(
            program.load_method("forward", &mut memory),
            Err(ProgramError::InvalidProgram(_))
        ));
    }

    #[test]
    fn test_bundled_output() {
        let program = ManifestProgram::from_json(MANIFEST).unwrap();
        assert_eq!(
            program.bundled_output("forward", 0),
            Some(&[2.0, 1.0, 0.1, -1.0][..])
        );
        assert_eq!(program.bundled_output("forward", 1), None);
        assert_eq!(program.bundled_output("missing", 0), None);
    }

    #[test]
    fn test_validation_errors() {
        let bad_head = MANIFEST.replace("[0.0, 0.0, 0.0]]", "[0.0, 0.0]]");
        assert!(ManifestProgram::from_json(&bad_head).is_err());

        let small_plan = MANIFEST.replace("[32, 16]", "[8, 16]");
        assert!(ManifestProgram::from_json(&small_plan).is_err());

        let untyped = MANIFEST.replace(r#""dtype": "f32", "#, "");
        assert!(ManifestProgram::from_json(&untyped).is_err());

        let empty = r#"{ "name": "empty", "methods": [] }"#;
        let program = ManifestProgram::from_json(empty).unwrap();
        assert_eq!(program.num_methods(), 0);

        assert!(matches!(
            ManifestProgram::from_bytes(b"not json"),
            Err(ProgramError::Parse(_))
        ));
    }
}
