// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The runner context with a type-state enforced lifecycle.
//!
//! ```text
//! RunnerContext<Uninitialized>
//!     │  .initialize(program, program_size, input_len)
//!     ▼
//! RunnerContext<Ready>  ──► preprocess / run_inference / outputs (per frame)
//! ```
//!
//! `initialize` consumes the uninitialised context. On failure the context
//! is gone, so there is no way to run inference against a runner that did
//! not come up, and no way to initialise twice.
//!
//! # Method arena layout after initialisation
//! ```text
//!  0 ┌────────────────────┐
//!    │ planned buffer 0   │  16-byte aligned
//!    │ ...                │
//!    ├────────────────────┤
//!    │ method state       │  allocated by the executor in load_method
//!    ├────────────────────┤
//!    │ staging tensor     │  normalised CHW f32 input
//!    ├────────────────────┤ ◄─ executor_base
//!    │ free               │
//!    └────────────────────┘
//! ```

use crate::profiler::{CycleCounter, Profiler};
use crate::RuntimeError;
use memory_manager::{Arena, ArenaSpan, MemoryError, Slot, SpanTable};
use model_program::{InputSlot, MemoryManager, Method, ModelOutput, Program};
use tensor_core::{normalize_hwc_to_chw, ImageDims, Normalization};

/// Most planned buffers a method may request.
pub const MAX_PLANNED_BUFFERS: usize = 8;

/// Alignment of planned buffers and the staging tensor.
pub const BUFFER_ALIGNMENT: usize = 16;

/// Tolerance for comparing outputs against bundled expectations.
pub const VERIFY_TOLERANCE: f32 = 1e-3;

// ── Type-state markers ─────────────────────────────────────────

/// Context created; nothing loaded.
pub struct Uninitialized<'b> {
    scratch_pool: &'b mut [u8],
    bundle_io: bool,
}

/// Method loaded; frames can be processed.
pub struct Ready<'b, 'p, P: Program> {
    program: &'p P,
    method_name: &'p str,
    method: Slot<P::Method>,
    scratch: Arena<'b>,
    planned: SpanTable<MAX_PLANNED_BUFFERS>,
    staging: ArenaSpan,
    info: RunInfo,
}

/// Marker trait for context states.
pub trait ContextState {}
impl ContextState for Uninitialized<'_> {}
impl<P: Program> ContextState for Ready<'_, '_, P> {}

/// A context that has finished initialisation.
pub type ReadyContext<'b, 'p, P> = RunnerContext<'b, Ready<'b, 'p, P>>;

// ── Bookkeeping ────────────────────────────────────────────────

/// Sizes recorded while initialising.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunInfo {
    /// Bytes of method arena taken by planned buffers, padding included.
    pub planned_buffer_size: usize,
    /// Bytes of method arena the executor allocated while loading.
    pub method_loaded_size: usize,
    /// Bytes of the staging tensor.
    pub input_size: usize,
    /// Method arena offset where per-run executor allocations begin.
    pub executor_base: usize,
    /// Size of the program container.
    pub program_size: usize,
    /// Whether outputs are checked against bundled expectations.
    pub bundle_io: bool,
}

/// Memory usage snapshot of a ready context.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MemoryReport {
    pub program_size: usize,
    pub program_loaded_size: usize,
    pub method_used: usize,
    pub method_capacity: usize,
    pub method_free: usize,
    pub method_used_percent: usize,
    pub planned: usize,
    pub loaded: usize,
    pub input: usize,
    /// Method arena bytes allocated after initialisation.
    pub executor: usize,
    pub scratch_capacity: usize,
}

impl MemoryReport {
    /// Multi-line summary suitable for logging or CLI display.
    pub fn summary(&self) -> String {
        let mut s = format!(
            "program size:      {} bytes\n\
             program loaded:    {} bytes\n",
            self.program_size, self.program_loaded_size
        );
        if self.method_capacity != 0 {
            s.push_str(&format!(
                "method arena used: {} / {}  free: {} ( used: {} % )\n\
                 method planned:    {} bytes\n\
                 method loaded:     {} bytes\n\
                 method input:      {} bytes\n\
                 method executor:   {} bytes\n",
                self.method_used,
                self.method_capacity,
                self.method_free,
                self.method_used_percent,
                self.planned,
                self.loaded,
                self.input,
                self.executor,
            ));
        }
        if self.scratch_capacity != 0 {
            s.push_str(&format!("scratch arena:     {} bytes\n", self.scratch_capacity));
        }
        s
    }
}

// ── Context ────────────────────────────────────────────────────

/// Owns the method arena and, once ready, everything the loaded method
/// needs to run.
///
/// # Example
/// ```no_run
/// use model_program::ManifestProgram;
/// use runtime::RunnerContext;
///
/// # fn example(program: &ManifestProgram) -> Result<(), runtime::RuntimeError> {
/// let mut method_pool = vec![0u8; 4 << 20];
/// let mut scratch_pool = vec![0u8; 64 << 10];
/// let ctx = RunnerContext::new(&mut method_pool, &mut scratch_pool)
///     .initialize(program, 1024, 224 * 224 * 3)?;
/// println!("{}", ctx.memory_report().summary());
/// # Ok(())
/// # }
/// ```
pub struct RunnerContext<'b, S: ContextState> {
    method_arena: Arena<'b>,
    state: S,
}

impl<'b> RunnerContext<'b, Uninitialized<'b>> {
    /// Creates a context over the two memory pools.
    pub fn new(method_pool: &'b mut [u8], scratch_pool: &'b mut [u8]) -> Self {
        Self {
            method_arena: Arena::new(method_pool),
            state: Uninitialized {
                scratch_pool,
                bundle_io: false,
            },
        }
    }

    /// Enables verification against bundled outputs.
    pub fn with_bundle_io(mut self, enabled: bool) -> Self {
        self.state.bundle_io = enabled;
        self
    }

    /// Loads method 0 of `program` and carves the staging tensor of
    /// `input_len` floats.
    ///
    /// Steps:
    /// 1. Pick method 0.
    /// 2. Read its memory plan.
    /// 3. Allocate every planned buffer from the method arena.
    /// 4. Construct the scratch arena.
    /// 5. Load the method.
    /// 6. Allocate the staging tensor.
    pub fn initialize<'p, P: Program>(
        self,
        program: &'p P,
        program_size: usize,
        input_len: usize,
    ) -> Result<ReadyContext<'b, 'p, P>, RuntimeError> {
        let RunnerContext {
            mut method_arena,
            state: Uninitialized {
                scratch_pool,
                bundle_io,
            },
        } = self;

        tracing::info!("model buffer loaded, has {} methods", program.num_methods());
        if program.num_methods() == 0 {
            return Err(RuntimeError::ModelLoad("program has no methods".into()));
        }
        let method_name = program
            .method_name(0)
            .map_err(|e| RuntimeError::ModelLoad(format!("cannot read method name: {e}")))?;
        tracing::info!("running method {method_name}");

        let meta = program.method_meta(method_name).map_err(|e| {
            RuntimeError::ModelLoad(format!("failed to get method_meta for {method_name}: {e}"))
        })?;

        tracing::info!(
            "setup method arena, size: {} bytes",
            method_arena.capacity()
        );
        let num_planned = meta.num_planned_buffers();
        if num_planned > MAX_PLANNED_BUFFERS {
            return Err(RuntimeError::ModelLoad(format!(
                "method plans {num_planned} buffers, at most {MAX_PLANNED_BUFFERS} supported"
            )));
        }

        let planned_base = method_arena.used_size();
        let mut planned = SpanTable::<MAX_PLANNED_BUFFERS>::new();
        for id in 0..num_planned {
            let size = meta
                .planned_buffer_size(id)
                .map_err(|e| RuntimeError::ModelLoad(e.to_string()))?;
            tracing::info!("setting up planned buffer {id}, size {size}");
            let span = allocate_startup(&mut method_arena, id, size)?;
            planned.push(span)?;
        }
        let planned_buffer_size = method_arena.used_size() - planned_base;

        let mut scratch = Arena::new(scratch_pool);
        tracing::info!("setup scratch arena, size: {} bytes", scratch.capacity());

        let loaded_base = method_arena.used_size();
        let method = {
            let mut memory = MemoryManager::new(&mut method_arena, planned.as_slice(), &mut scratch);
            program.load_method(method_name, &mut memory)
        }
        .map_err(|e| {
            tracing::error!(
                "loading of method {method_name} failed with status 0x{:x}",
                e.status()
            );
            RuntimeError::MethodLoad {
                method: method_name.to_string(),
                status: e.status(),
            }
        })?;
        let method_loaded_size = method_arena.used_size() - loaded_base;
        tracing::info!("method '{method_name}' loaded");

        let staging = match method_arena.allocate_f32(input_len) {
            Ok(span) => span,
            Err(MemoryError::OutOfMemory {
                requested_bytes,
                available_bytes,
                ..
            }) => {
                return Err(RuntimeError::OutOfMemory {
                    buffer_index: num_planned,
                    requested: requested_bytes,
                    available: available_bytes,
                })
            }
            Err(e) => return Err(e.into()),
        };

        let mut slot = Slot::new();
        slot.emplace(method);

        let info = RunInfo {
            planned_buffer_size,
            method_loaded_size,
            input_size: staging.len(),
            executor_base: method_arena.used_size(),
            program_size,
            bundle_io,
        };
        tracing::info!("model initialized, ready for inference");

        Ok(RunnerContext {
            method_arena,
            state: Ready {
                program,
                method_name,
                method: slot,
                scratch,
                planned,
                staging,
                info,
            },
        })
    }
}

fn allocate_startup(
    arena: &mut Arena<'_>,
    buffer_index: usize,
    size: usize,
) -> Result<ArenaSpan, RuntimeError> {
    arena
        .allocate(size, BUFFER_ALIGNMENT)
        .map_err(|e| match e {
            MemoryError::OutOfMemory {
                available_bytes, ..
            } => {
                tracing::error!(
                    "could not allocate memory for planned buffer {buffer_index} size {size}"
                );
                RuntimeError::OutOfMemory {
                    buffer_index,
                    requested: size,
                    available: available_bytes,
                }
            }
            other => other.into(),
        })
}

impl<'b, 'p, P: Program> RunnerContext<'b, Ready<'b, 'p, P>> {
    /// Name of the loaded method.
    pub fn method_name(&self) -> &'p str {
        self.state.method_name
    }

    /// Sizes recorded at initialisation.
    pub fn info(&self) -> RunInfo {
        self.state.info
    }

    /// The method arena.
    pub fn method_arena(&self) -> &Arena<'b> {
        &self.method_arena
    }

    /// The scratch arena.
    pub fn scratch(&self) -> &Arena<'b> {
        &self.state.scratch
    }

    /// Planned buffers handed to the executor.
    pub fn planned_buffers(&self) -> &[ArenaSpan] {
        self.state.planned.as_slice()
    }

    /// The normalised input tensor from the last preprocess.
    pub fn staging(&self) -> Result<&[f32], RuntimeError> {
        Ok(self.method_arena.f32_slice(self.state.staging)?)
    }

    /// Converts an RGB888 HWC frame into the staging tensor.
    ///
    /// # Errors
    /// [`RuntimeError::InvalidArgument`] if the frame does not match `dims`
    /// or `dims` does not match the staging tensor.
    pub fn preprocess(
        &mut self,
        frame: &[u8],
        dims: ImageDims,
        norm: &Normalization,
    ) -> Result<(), RuntimeError> {
        if frame.len() != dims.values() {
            return Err(RuntimeError::InvalidArgument(format!(
                "input frame is {} bytes, expected {} for {}x{} RGB888",
                frame.len(),
                dims.values(),
                dims.width,
                dims.height
            )));
        }
        let staging = self.method_arena.f32_slice_mut(self.state.staging)?;
        normalize_hwc_to_chw(frame, dims, norm, staging)
            .map_err(|e| RuntimeError::InvalidArgument(e.to_string()))
    }

    /// Binds the staging tensor to the method inputs and executes it.
    ///
    /// The scratch arena is reset afterwards whether or not binding or
    /// execution succeeded. Returns the cycles spent in `execute`.
    ///
    /// # Errors
    /// [`RuntimeError::InvalidArgument`] if a tensor input's declared size
    /// differs from the staging tensor (the method is not run), and
    /// [`RuntimeError::Inference`] if the executor fails.
    pub fn run_inference<C: CycleCounter>(
        &mut self,
        profiler: &Profiler<C>,
    ) -> Result<u32, RuntimeError> {
        let result = self.bind_and_execute(profiler);
        self.state.scratch.reset();
        result
    }

    fn bind_and_execute<C: CycleCounter>(
        &mut self,
        profiler: &Profiler<C>,
    ) -> Result<u32, RuntimeError> {
        let method_name = self.state.method_name;
        let meta = self
            .state
            .program
            .method_meta(method_name)
            .map_err(|e| RuntimeError::Inference { status: e.status() })?;
        let method = self
            .state
            .method
            .get_mut()
            .ok_or_else(|| RuntimeError::ModelLoad(format!("method {method_name} not loaded")))?;

        let staging = self.state.staging;
        for (i, slot) in meta.inputs().iter().enumerate() {
            let info = match slot {
                InputSlot::Tensor(info) => info,
                InputSlot::Other(tag) => {
                    tracing::warn!("skipping non-tensor input {i} ({tag})");
                    continue;
                }
            };
            if staging.len() != info.nbytes() {
                tracing::error!(
                    "input size ({}) and tensor size ({}) mismatch",
                    staging.len(),
                    info.nbytes()
                );
                return Err(RuntimeError::InvalidArgument(format!(
                    "input {i}: staging tensor is {} bytes, method expects {}",
                    staging.len(),
                    info.nbytes()
                )));
            }
            let target = method
                .input_span(i)
                .map_err(|e| RuntimeError::Inference { status: e.status() })?;
            self.method_arena.copy_span(staging, target)?;
        }

        let start = profiler.start();
        let mut memory = MemoryManager::new(
            &mut self.method_arena,
            self.state.planned.as_slice(),
            &mut self.state.scratch,
        );
        method.execute(&mut memory).map_err(|e| {
            tracing::error!(
                "execution of method {method_name} failed with status 0x{:x}: {e}",
                e.status()
            );
            RuntimeError::Inference { status: e.status() }
        })?;
        let cycles = profiler.stop(start);

        tracing::debug!(
            scratch_used = self.state.scratch.used_size(),
            "method {method_name} executed"
        );
        Ok(cycles)
    }

    /// The method outputs, borrowed from the method arena. Outputs that
    /// cannot be read are skipped with a warning.
    pub fn outputs(&self) -> Outputs<'_, 'b, P::Method> {
        let method = self.state.method.get();
        Outputs {
            method,
            arena: &self.method_arena,
            next: 0,
            count: method.map_or(0, |m| m.num_outputs()),
        }
    }

    /// Memory usage snapshot.
    pub fn memory_report(&self) -> MemoryReport {
        let arena = &self.method_arena;
        let info = &self.state.info;
        let capacity = arena.capacity();
        MemoryReport {
            program_size: info.program_size,
            program_loaded_size: info.program_size,
            method_used: arena.used_size(),
            method_capacity: capacity,
            method_free: arena.free_size(),
            method_used_percent: (100 * arena.used_size()).checked_div(capacity).unwrap_or(0),
            planned: info.planned_buffer_size,
            loaded: info.method_loaded_size,
            input: info.input_size,
            executor: arena.used_size().saturating_sub(info.executor_base),
            scratch_capacity: self.state.scratch.capacity(),
        }
    }

    /// Checks the first float output against the program's bundled
    /// expectation.
    ///
    /// Without bundle IO there is nothing to compare and the result is
    /// `true`. With it, a missing expectation or any element differing by
    /// more than [`VERIFY_TOLERANCE`] gives `false`.
    pub fn verify_result(&self) -> bool {
        if !self.state.info.bundle_io {
            return true;
        }
        let Some(expected) = self.state.program.bundled_output(self.state.method_name, 0) else {
            tracing::warn!("bundle IO enabled but the program has no expected output");
            return false;
        };
        let actual = self.outputs().find_map(|o| match o {
            ModelOutput::FloatTensor(values) => Some(values),
            _ => None,
        });
        let Some(actual) = actual else {
            return false;
        };

        let ok = actual.len() == expected.len()
            && actual
                .iter()
                .zip(expected)
                .all(|(a, e)| (a - e).abs() <= VERIFY_TOLERANCE);
        if !ok {
            tracing::warn!("output does not match the bundled expectation");
        }
        ok
    }
}

/// Iterator over the readable outputs of a loaded method.
pub struct Outputs<'a, 'b, M> {
    method: Option<&'a M>,
    arena: &'a Arena<'b>,
    next: usize,
    count: usize,
}

impl<'a, M: Method> Iterator for Outputs<'a, '_, M> {
    type Item = ModelOutput<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let method = self.method?;
        while self.next < self.count {
            let i = self.next;
            self.next += 1;
            match method.output(i, self.arena) {
                Ok(output) => return Some(output),
                Err(e) => tracing::warn!("cannot read output {i}: {e}"),
            }
        }
        None
    }
}

impl<S: ContextState> std::fmt::Debug for RunnerContext<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerContext")
            .field("state", &std::any::type_name::<S>())
            .field("method_arena", &self.method_arena)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_manager::StaticPool;
    use model_program::{status, ManifestProgram};
    use tensor_core::DType;

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

    const DIMS: ImageDims = ImageDims::new(2, 2);
    const INPUT_LEN: usize = 12;
    const IDENTITY: Normalization = Normalization {
        mean: [0.0; 3],
        std: [1.0; 3],
    };

    fn program() -> ManifestProgram {
        ManifestProgram::from_json(MANIFEST).unwrap()
    }

    fn red_frame() -> Vec<u8> {
        let mut frame = vec![0u8; DIMS.values()];
        for px in frame.chunks_exact_mut(3) {
            px[0] = 255;
        }
        frame
    }

    fn first_float<'a>(mut outputs: impl Iterator<Item = ModelOutput<'a>>) -> Option<&'a [f32]> {
        outputs.find_map(|o| match o {
            ModelOutput::FloatTensor(v) => Some(v),
            _ => None,
        })
    }

    #[test]
    fn test_initialize_records_sizes() {
        let program = program();
        let mut method_pool = StaticPool::<1024>::new();
        let mut scratch_pool = StaticPool::<64>::new();
        let ctx = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .initialize(&program, 777, INPUT_LEN)
            .unwrap();

        assert_eq!(ctx.method_name(), "forward");
        let info = ctx.info();
        assert_eq!(info.planned_buffer_size, 48);
        assert_eq!(info.method_loaded_size, 48);
        assert_eq!(info.input_size, 48);
        assert_eq!(info.executor_base, 144);
        assert_eq!(info.program_size, 777);
        assert!(!info.bundle_io);
        assert_eq!(ctx.planned_buffers().len(), 2);

        let report = ctx.memory_report();
        assert_eq!(report.method_used, 144);
        assert_eq!(report.method_free, 1024 - 144);
        assert_eq!(report.method_used_percent, 14);
        assert_eq!(report.executor, 0);
        assert_eq!(report.scratch_capacity, 64);
        assert!(report.summary().contains("method planned:    48 bytes"));
    }

    #[test]
    fn test_inference_produces_logits_and_resets_scratch() {
        let program = program();
        let mut method_pool = StaticPool::<1024>::new();
        let mut scratch_pool = StaticPool::<64>::new();
        let mut ctx = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .initialize(&program, 0, INPUT_LEN)
            .unwrap();

        ctx.preprocess(&red_frame(), DIMS, &IDENTITY).unwrap();
        assert_eq!(&ctx.staging().unwrap()[..4], &[1.0; 4]);

        ctx.run_inference(&Profiler::new(crate::StdCycleCounter::default(), 1))
            .unwrap();
        assert_eq!(ctx.scratch().used_size(), 0);

        let outputs: Vec<_> = ctx.outputs().collect();
        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0], ModelOutput::FloatTensor(&[3.0, 1.0, 0.1, -1.0]));
        assert_eq!(outputs[1], ModelOutput::OtherTensor { dtype: DType::I8 });
    }

    #[test]
    fn test_preprocess_rejects_wrong_frame_length() {
        let program = program();
        let mut method_pool = StaticPool::<1024>::new();
        let mut scratch_pool = StaticPool::<64>::new();
        let mut ctx = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .initialize(&program, 0, INPUT_LEN)
            .unwrap();

        let err = ctx.preprocess(&[0u8; 11], DIMS, &IDENTITY).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument(_)));
    }

    #[test]
    fn test_staging_size_mismatch_skips_execute() {
        let program = program();
        let mut method_pool = StaticPool::<1024>::new();
        let mut scratch_pool = StaticPool::<64>::new();
        let dims = ImageDims::new(4, 2);
        let mut ctx = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .initialize(&program, 0, dims.values())
            .unwrap();

        ctx.preprocess(&vec![255u8; dims.values()], dims, &IDENTITY)
            .unwrap();
        let err = ctx
            .run_inference(&Profiler::new(crate::StdCycleCounter::default(), 1))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument(_)));
        assert_eq!(ctx.scratch().used_size(), 0);
    }

    #[test]
    fn test_failed_execute_still_resets_scratch() {
        let program = program();
        let mut method_pool = StaticPool::<1024>::new();
        // Too small for the three channel means.
        let mut scratch_pool = StaticPool::<8>::new();
        let mut ctx = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .initialize(&program, 0, INPUT_LEN)
            .unwrap();

        ctx.preprocess(&red_frame(), DIMS, &IDENTITY).unwrap();
        let err = ctx
            .run_inference(&Profiler::new(crate::StdCycleCounter::default(), 1))
            .unwrap_err();
        match err {
            RuntimeError::Inference { status: code } => {
                assert_eq!(code, status::MEMORY_ALLOCATION_FAILED)
            }
            other => panic!("expected an inference error, got {other:?}"),
        }
        assert_eq!(ctx.scratch().used_size(), 0);
    }

    #[test]
    fn test_planned_buffer_out_of_memory() {
        let program = program();
        let mut method_pool = StaticPool::<40>::new();
        let mut scratch_pool = StaticPool::<64>::new();
        let err = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .initialize(&program, 0, INPUT_LEN)
            .unwrap_err();
        match err {
            RuntimeError::OutOfMemory {
                buffer_index,
                requested,
                available,
            } => {
                assert_eq!(buffer_index, 1);
                assert_eq!(requested, 16);
                assert_eq!(available, 8);
            }
            other => panic!("expected out of memory, got {other:?}"),
        }
    }

    #[test]
    fn test_staging_out_of_memory_reports_next_index() {
        let program = program();
        let mut method_pool = StaticPool::<128>::new();
        let mut scratch_pool = StaticPool::<64>::new();
        let err = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .initialize(&program, 0, INPUT_LEN)
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::OutOfMemory {
                buffer_index: 2,
                requested: 48,
                available: 32,
            }
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_staging_size_overflow_is_out_of_memory() {
        let program = program();
        let mut method_pool = StaticPool::<1024>::new();
        let mut scratch_pool = StaticPool::<64>::new();
        let err = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .initialize(&program, 0, usize::MAX / 2)
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::OutOfMemory {
                buffer_index: 2,
                requested: usize::MAX,
                available: 928,
            }
        ));
    }

    #[test]
    fn test_method_load_failure_carries_status() {
        // Load needs 48 more bytes for the input tensor after the planned buffers.
        let program = program();
        let mut method_pool = StaticPool::<64>::new();
        let mut scratch_pool = StaticPool::<64>::new();
        let err = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .initialize(&program, 0, INPUT_LEN)
            .unwrap_err();
        match err {
            RuntimeError::MethodLoad { method, status: code } => {
                assert_eq!(method, "forward");
                assert_eq!(code, status::MEMORY_ALLOCATION_FAILED);
            }
            other => panic!("expected a method load error, got {other:?}"),
        }
    }

    #[test]
    fn test_program_without_methods() {
        let program = ManifestProgram::from_json(r#"{ "name": "empty", "methods": [] }"#).unwrap();
        let mut method_pool = StaticPool::<64>::new();
        let mut scratch_pool = StaticPool::<64>::new();
        let err = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .initialize(&program, 0, INPUT_LEN)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ModelLoad(_)));
    }

    #[test]
    fn test_verify_result_against_bundled_output() {
        let program = program();
        let mut method_pool = StaticPool::<1024>::new();
        let mut scratch_pool = StaticPool::<64>::new();
        let mut ctx = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice())
            .with_bundle_io(true)
            .initialize(&program, 0, INPUT_LEN)
            .unwrap();
        let profiler = Profiler::new(crate::StdCycleCounter::default(), 1);

        ctx.preprocess(&[0u8; 12], DIMS, &IDENTITY).unwrap();
        ctx.run_inference(&profiler).unwrap();
        assert!(ctx.verify_result());
        assert_eq!(first_float(ctx.outputs()).unwrap(), &[2.0, 1.0, 0.1, -1.0]);

        ctx.preprocess(&red_frame(), DIMS, &IDENTITY).unwrap();
        ctx.run_inference(&profiler).unwrap();
        assert!(!ctx.verify_result());
    }

    #[test]
    fn test_debug_shows_state() {
        let mut method_pool = StaticPool::<16>::new();
        let mut scratch_pool = StaticPool::<16>::new();
        let ctx = RunnerContext::new(method_pool.as_mut_slice(), scratch_pool.as_mut_slice());
        assert!(format!("{ctx:?}").contains("Uninitialized"));
    }
}
