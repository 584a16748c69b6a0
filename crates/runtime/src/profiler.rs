// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cycle-count stage profiling.
//!
//! Compiled in with the `time-profiling` feature. Without it,
//! [`Profiler::start`] and [`Profiler::stop`] never read the counter and
//! report zero cycles.

use std::time::Instant;

/// Default core clock of the target MCU.
pub const CPU_FREQ_HZ: u32 = 400_000_000;

/// Whether stage timing is compiled in.
pub const ENABLED: bool = cfg!(feature = "time-profiling");

/// A free-running 32-bit cycle counter.
pub trait CycleCounter {
    /// Current counter value. Wraps around.
    fn now(&self) -> u32;
}

/// Converts a cycle count to milliseconds at `freq_hz`.
pub fn cycles_to_ms(cycles: u32, freq_hz: u32) -> f32 {
    if freq_hz == 0 {
        return 0.0;
    }
    (cycles as f64 * 1000.0 / freq_hz as f64) as f32
}

/// Host cycle counter: wall-clock time since construction, scaled to a
/// nominal core clock.
#[derive(Debug, Clone, Copy)]
pub struct StdCycleCounter {
    origin: Instant,
    freq_hz: u32,
}

impl StdCycleCounter {
    /// Creates a counter ticking at `freq_hz`.
    pub fn new(freq_hz: u32) -> Self {
        Self {
            origin: Instant::now(),
            freq_hz,
        }
    }
}

impl Default for StdCycleCounter {
    fn default() -> Self {
        Self::new(CPU_FREQ_HZ)
    }
}

impl CycleCounter for StdCycleCounter {
    fn now(&self) -> u32 {
        let nanos = self.origin.elapsed().as_nanos();
        (nanos * self.freq_hz as u128 / 1_000_000_000) as u32
    }
}

/// Start/stop wrapper around a [`CycleCounter`].
#[derive(Debug, Clone)]
pub struct Profiler<C> {
    counter: C,
    freq_hz: u32,
}

impl<C: CycleCounter> Profiler<C> {
    pub fn new(counter: C, freq_hz: u32) -> Self {
        Self { counter, freq_hz }
    }

    /// Marks the start of a measured region.
    #[inline]
    pub fn start(&self) -> u32 {
        if ENABLED {
            self.counter.now()
        } else {
            0
        }
    }

    /// Cycles elapsed since `start`, wrap-safe.
    #[inline]
    pub fn stop(&self, start: u32) -> u32 {
        if ENABLED {
            self.counter.now().wrapping_sub(start)
        } else {
            0
        }
    }

    /// Converts cycles to milliseconds at this profiler's clock.
    pub fn to_ms(&self, cycles: u32) -> f32 {
        cycles_to_ms(cycles, self.freq_hz)
    }

    pub fn freq_hz(&self) -> u32 {
        self.freq_hz
    }
}

/// Per-stage cycle counts of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct FrameTimings {
    pub preprocess: u32,
    pub inference: u32,
    pub postprocess: u32,
    pub display: u32,
}

impl FrameTimings {
    /// Sum of all stages.
    pub fn total(&self) -> u32 {
        self.preprocess
            .wrapping_add(self.inference)
            .wrapping_add(self.postprocess)
            .wrapping_add(self.display)
    }

    /// One-line summary in milliseconds.
    ///
    /// # Example output
    /// ```text
    /// Pre 1.204 ms | Inference 12.830 ms | Post 0.310 ms | Display 0.522 ms
    /// ```
    pub fn summary(&self, freq_hz: u32) -> String {
        format!(
            "Pre {:.3} ms | Inference {:.3} ms | Post {:.3} ms | Display {:.3} ms",
            cycles_to_ms(self.preprocess, freq_hz),
            cycles_to_ms(self.inference, freq_hz),
            cycles_to_ms(self.postprocess, freq_hz),
            cycles_to_ms(self.display, freq_hz),
        )
    }
}
