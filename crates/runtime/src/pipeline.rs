// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-frame orchestration.
//!
//! ```text
//! input frame ──► Preprocess ──► Infer ──► Postprocess ──► DisplayWait ──► DisplaySubmit
//!                 (staging)     (method)   (decode, record,  (busy-poll)    (blit, release,
//!                                           overlay)                          restart)
//! ```
//!
//! A failing stage aborts the rest of its frame only. The context stays
//! ready and the next [`FramePipeline::execute`] starts over at Preprocess.

use crate::context::{MemoryReport, ReadyContext, RunnerContext};
use crate::decoder::{decode, ClassificationResult, ModelVariant};
use crate::overlay::{draw_label, overlay_text};
use crate::profiler::{
    CycleCounter, FrameTimings, Profiler, StdCycleCounter, ENABLED as PROFILING_ENABLED,
};
use crate::record::write_record;
use crate::{RuntimeConfig, RuntimeError};
use model_program::Program;
use tensor_core::{ImageDims, Normalization};
use video_stream::{copy_to_framebuffer, Blit, StreamMode, VideoOut, EVENT_FRAME_COMPLETE};

/// The frame pipeline: a ready runner context plus the video output.
pub struct FramePipeline<'b, 'p, P, V, C = StdCycleCounter>
where
    P: Program,
    V: VideoOut,
    C: CycleCounter,
{
    ctx: ReadyContext<'b, 'p, P>,
    driver: V,
    dims: ImageDims,
    normalization: Normalization,
    blit: Blit,
    variant: ModelVariant,
    profiler: Profiler<C>,
    last_timings: FrameTimings,
    load_cycles: u32,
    frames: u64,
}

impl<'b, 'p, P, V, C> FramePipeline<'b, 'p, P, V, C>
where
    P: Program,
    V: VideoOut,
    C: CycleCounter,
{
    /// Brings up the video output and the runner context.
    ///
    /// The pools must be at least as large as the configured pool sizes and
    /// are truncated to them. `program_size` is the byte length of the
    /// program container, reported in the memory summary.
    ///
    /// # Errors
    /// Every error returned here is fatal: `Config` for a bad configuration
    /// or undersized pools, `Initialization` when the video output cannot be
    /// set up, and whatever [`RunnerContext::initialize`] reports.
    pub fn init(
        config: &RuntimeConfig,
        method_pool: &'b mut [u8],
        scratch_pool: &'b mut [u8],
        program: &'p P,
        program_size: usize,
        mut driver: V,
        counter: C,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        let (method_size, scratch_size) = config.parse_pools()?;
        let method_pool = fit_pool("method", method_pool, method_size.as_bytes())?;
        let scratch_pool = fit_pool("scratch", scratch_pool, scratch_size.as_bytes())?;

        let display_len = config.display_len();
        driver
            .initialize(on_video_event)
            .map_err(|source| RuntimeError::Initialization {
                stage: "video output",
                source,
            })?;
        driver
            .set_buf(display_len, display_len)
            .map_err(|source| RuntimeError::Initialization {
                stage: "video buffer",
                source,
            })?;
        tracing::info!(
            "video output ready, {}x{} display",
            config.display_width,
            config.display_height
        );

        let profiler = Profiler::new(counter, config.cpu_freq_hz);
        let start = profiler.start();
        let ctx = RunnerContext::new(method_pool, scratch_pool)
            .with_bundle_io(config.bundle_io)
            .initialize(program, program_size, config.tensor_len())?;
        let load_cycles = profiler.stop(start);
        if PROFILING_ENABLED {
            tracing::info!("model load time {:.3} ms", profiler.to_ms(load_cycles));
        }
        tracing::info!("\n{}", ctx.memory_report().summary());

        let blit = Blit::centered(
            config.image_width,
            config.image_height,
            config.display_width,
            config.display_height,
        )
        .with_orientation(config.flip_horizontal, config.flip_vertical, config.swap_rb);

        Ok(Self {
            ctx,
            driver,
            dims: config.image_dims(),
            normalization: config.normalization,
            blit,
            variant: ModelVariant::BUILD,
            profiler,
            last_timings: FrameTimings::default(),
            load_cycles,
            frames: 0,
        })
    }

    /// Decodes with `variant` instead of [`ModelVariant::BUILD`].
    pub fn with_variant(mut self, variant: ModelVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Runs one frame.
    ///
    /// `input` is the RGB888 HWC camera frame; the label overlay is drawn
    /// into it before it is shown. `output` is zeroed, then receives the
    /// classification record if it is large enough to hold one.
    pub fn execute(
        &mut self,
        input: &mut [u8],
        output: &mut [u8],
    ) -> Result<ClassificationResult, RuntimeError> {
        output.fill(0);
        match self.run_frame(input, output) {
            Ok(result) => {
                self.frames += 1;
                Ok(result)
            }
            Err(e) => {
                tracing::error!("frame failed: {e}");
                Err(e)
            }
        }
    }

    fn run_frame(
        &mut self,
        input: &mut [u8],
        output: &mut [u8],
    ) -> Result<ClassificationResult, RuntimeError> {
        let profiler = &self.profiler;
        let mut timings = FrameTimings::default();

        {
            let _stage = tracing::debug_span!("preprocess").entered();
            let start = profiler.start();
            self.ctx.preprocess(input, self.dims, &self.normalization)?;
            timings.preprocess = profiler.stop(start);
        }

        {
            let _stage = tracing::debug_span!("infer").entered();
            timings.inference = self.ctx.run_inference(profiler)?;
        }

        let result = {
            let _stage = tracing::debug_span!("postprocess").entered();
            let start = profiler.start();
            if !self.ctx.verify_result() {
                tracing::warn!("output verification failed");
            }
            let result = decode(self.ctx.outputs(), self.variant)?;
            if !write_record(&result, output) {
                tracing::debug!(
                    len = output.len(),
                    "output buffer too small for the result record, skipped"
                );
            }
            draw_label(
                input,
                self.dims.width,
                self.dims.height,
                overlay_text(&result).as_str(),
            );
            timings.postprocess = profiler.stop(start);
            result
        };

        {
            let _stage = tracing::debug_span!("display").entered();
            let start = profiler.start();
            while self.driver.status().active {
                std::hint::spin_loop();
            }
            submit_frame(&mut self.driver, input, &self.blit)?;
            timings.display = profiler.stop(start);
        }

        self.last_timings = timings;
        if PROFILING_ENABLED {
            tracing::info!("{}", timings.summary(profiler.freq_hz()));
        }
        Ok(result)
    }

    /// The runner context.
    pub fn context(&self) -> &ReadyContext<'b, 'p, P> {
        &self.ctx
    }

    /// The video output driver.
    pub fn driver(&self) -> &V {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut V {
        &mut self.driver
    }

    /// Stage timings of the last successful frame. All zero unless the
    /// `time-profiling` feature is enabled.
    pub fn last_timings(&self) -> FrameTimings {
        self.last_timings
    }

    /// Cycles spent initialising the runner context.
    pub fn load_cycles(&self) -> u32 {
        self.load_cycles
    }

    pub fn memory_report(&self) -> MemoryReport {
        self.ctx.memory_report()
    }

    /// Frames that completed every stage.
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }
}

fn fit_pool<'b>(
    name: &str,
    pool: &'b mut [u8],
    size: usize,
) -> Result<&'b mut [u8], RuntimeError> {
    if pool.len() < size {
        return Err(RuntimeError::Config(format!(
            "{name} pool is {} bytes, configuration asks for {size}",
            pool.len()
        )));
    }
    Ok(&mut pool[..size])
}

/// Copies `frame` into the driver's output block and restarts streaming.
///
/// Without a block the status is read once more: a stream that is active
/// again gives `DriverBusy`, an idle one `NoOutputBlock`.
fn submit_frame<V: VideoOut>(
    driver: &mut V,
    frame: &[u8],
    blit: &Blit,
) -> Result<(), RuntimeError> {
    let copied = driver
        .get_block()
        .map(|block| copy_to_framebuffer(frame, block, blit));
    let Some(copied) = copied else {
        return Err(if driver.status().active {
            RuntimeError::DriverBusy
        } else {
            RuntimeError::NoOutputBlock
        });
    };

    if let Err(e) = copied {
        if let Err(release) = driver.release_block() {
            tracing::warn!("failed to release output block: {release}");
        }
        return Err(e.into());
    }
    if let Err(e) = driver.release_block() {
        tracing::warn!("failed to release output block: {e}");
    }
    if let Err(e) = driver.start(StreamMode::Single) {
        tracing::warn!("failed to start video stream: {e}");
    }
    Ok(())
}

fn on_video_event(event: u32) {
    if event & EVENT_FRAME_COMPLETE != 0 {
        tracing::trace!("video frame complete");
    }
}
