// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The executor interface: programs, methods and the memory they run in.
//!
//! ```text
//!   Program ──method_meta(name)──► MethodMeta { inputs, planned_buffers }
//!      │
//!      └──load_method(name, &mut MemoryManager)──► Method
//!                                                    │ input_span(i)
//!                                                    │ execute(&mut MemoryManager)
//!                                                    ▼
//!                                                  output(i, &Arena) ──► ModelOutput
//! ```
//!
//! A method never owns memory. Everything it keeps lives in the method
//! arena or in the planned buffers the runner allocated for it, and every
//! access goes through the arena handed back to it.

use crate::ProgramError;
use memory_manager::{Arena, ArenaSpan};
use tensor_core::{DType, TensorInfo};

/// Kind of value held by an input or output slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// A dense tensor.
    #[default]
    Tensor,
    /// A scalar integer.
    Int,
    /// A scalar double.
    Double,
    /// A scalar boolean.
    Bool,
    /// A string.
    String,
    /// An empty value.
    None,
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tag::Tensor => "tensor",
            Tag::Int => "int",
            Tag::Double => "double",
            Tag::Bool => "bool",
            Tag::String => "string",
            Tag::None => "none",
        };
        f.write_str(s)
    }
}

/// One declared input of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    /// A tensor input with its declared type and shape.
    Tensor(TensorInfo),
    /// A non-tensor input; the runner does not bind these.
    Other(Tag),
}

impl InputSlot {
    /// Returns the slot's tag.
    pub fn tag(&self) -> Tag {
        match self {
            InputSlot::Tensor(_) => Tag::Tensor,
            InputSlot::Other(tag) => *tag,
        }
    }
}

/// Static metadata of a method, borrowed from its program.
#[derive(Debug, Clone, Copy)]
pub struct MethodMeta<'p> {
    name: &'p str,
    inputs: &'p [InputSlot],
    planned_buffers: &'p [usize],
}

impl<'p> MethodMeta<'p> {
    /// Creates method metadata.
    pub fn new(name: &'p str, inputs: &'p [InputSlot], planned_buffers: &'p [usize]) -> Self {
        Self {
            name,
            inputs,
            planned_buffers,
        }
    }

    /// Method name.
    pub fn name(&self) -> &'p str {
        self.name
    }

    /// Number of declared inputs.
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Declared inputs in order.
    pub fn inputs(&self) -> &'p [InputSlot] {
        self.inputs
    }

    /// Declared input at `index`.
    pub fn input(&self, index: usize) -> Result<InputSlot, ProgramError> {
        self.inputs
            .get(index)
            .copied()
            .ok_or(ProgramError::IndexOutOfRange {
                what: "input",
                index,
                len: self.inputs.len(),
            })
    }

    /// Number of memory-planned buffers the method needs.
    pub fn num_planned_buffers(&self) -> usize {
        self.planned_buffers.len()
    }

    /// Byte size of planned buffer `index`.
    pub fn planned_buffer_size(&self, index: usize) -> Result<usize, ProgramError> {
        self.planned_buffers
            .get(index)
            .copied()
            .ok_or(ProgramError::IndexOutOfRange {
                what: "planned buffer",
                index,
                len: self.planned_buffers.len(),
            })
    }

    /// Sum of all planned buffer sizes.
    pub fn planned_bytes(&self) -> usize {
        self.planned_buffers.iter().sum()
    }
}

/// Memory handed to the executor for loading and running a method.
pub struct MemoryManager<'m, 'b> {
    /// Long-lived arena for method state and input/output tensors.
    pub method: &'m mut Arena<'b>,
    /// Planned buffers, allocated by the runner according to [`MethodMeta`].
    pub planned: &'m [ArenaSpan],
    /// Scratch arena for temporaries; reset by the runner after each run.
    pub temp: &'m mut Arena<'b>,
}

impl<'m, 'b> MemoryManager<'m, 'b> {
    /// Bundles the three memory regions.
    pub fn new(
        method: &'m mut Arena<'b>,
        planned: &'m [ArenaSpan],
        temp: &'m mut Arena<'b>,
    ) -> Self {
        Self {
            method,
            planned,
            temp,
        }
    }
}

/// A value produced by a method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelOutput<'a> {
    /// A float tensor, borrowed from the method arena.
    FloatTensor(&'a [f32]),
    /// A tensor of another element type.
    OtherTensor { dtype: DType },
    /// A non-tensor value.
    NonTensor { tag: Tag },
}

/// A method loaded into the method arena.
pub trait Method {
    /// Number of inputs.
    fn num_inputs(&self) -> usize;

    /// The method-arena span that receives tensor input `index`.
    fn input_span(&self, index: usize) -> Result<ArenaSpan, ProgramError>;

    /// Runs the method over its bound inputs.
    fn execute(&mut self, memory: &mut MemoryManager<'_, '_>) -> Result<(), ProgramError>;

    /// Number of outputs.
    fn num_outputs(&self) -> usize;

    /// Output `index`, borrowed from the method arena.
    fn output<'a>(
        &self,
        index: usize,
        method_arena: &'a Arena<'_>,
    ) -> Result<ModelOutput<'a>, ProgramError>;
}

/// A parsed model container.
pub trait Program {
    /// The loaded-method type.
    type Method: Method;

    /// Number of methods in the program.
    fn num_methods(&self) -> usize;

    /// Name of method `index`.
    fn method_name(&self, index: usize) -> Result<&str, ProgramError>;

    /// Static metadata of the named method.
    fn method_meta(&self, name: &str) -> Result<MethodMeta<'_>, ProgramError>;

    /// Loads the named method into `memory`.
    fn load_method(
        &self,
        name: &str,
        memory: &mut MemoryManager<'_, '_>,
    ) -> Result<Self::Method, ProgramError>;

    /// Expected output `index` of the named method, when bundled with the
    /// program for on-device verification.
    fn bundled_output(&self, name: &str, index: usize) -> Option<&[f32]> {
        let _ = (name, index);
        None
    }
}
