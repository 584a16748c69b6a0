// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RGB888 blit from the ML frame into the display framebuffer.

use crate::StreamError;

/// Bytes per RGB888 pixel.
pub const RGB888_BYTES: usize = 3;

/// Geometry and orientation of one framebuffer copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blit {
    pub src_width: usize,
    pub src_height: usize,
    pub dst_width: usize,
    pub dst_height: usize,
    /// Column of the destination where source column 0 lands.
    pub x_offset: usize,
    /// Row of the destination where source row 0 lands.
    pub y_offset: usize,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Swap the red and blue channels.
    pub swap_rb: bool,
}

impl Blit {
    /// A copy that centres the source inside the destination.
    ///
    /// Offsets saturate at zero when the source is larger; the overhang is
    /// clipped by [`copy_to_framebuffer`].
    pub fn centered(src_width: usize, src_height: usize, dst_width: usize, dst_height: usize) -> Self {
        Self {
            src_width,
            src_height,
            dst_width,
            dst_height,
            x_offset: dst_width.saturating_sub(src_width) / 2,
            y_offset: dst_height.saturating_sub(src_height) / 2,
            flip_horizontal: false,
            flip_vertical: false,
            swap_rb: false,
        }
    }

    /// Sets the orientation flags.
    pub fn with_orientation(mut self, flip_horizontal: bool, flip_vertical: bool, swap_rb: bool) -> Self {
        self.flip_horizontal = flip_horizontal;
        self.flip_vertical = flip_vertical;
        self.swap_rb = swap_rb;
        self
    }

    fn src_len(&self) -> usize {
        self.src_width * self.src_height * RGB888_BYTES
    }

    fn dst_len(&self) -> usize {
        self.dst_width * self.dst_height * RGB888_BYTES
    }
}

/// Copies an RGB888 frame into a framebuffer.
///
/// Source pixel `(x, y)` lands at `(x_offset + x', y_offset + y')` where
/// `x'`/`y'` are mirrored when the matching flip is set. Pixels falling
/// outside the destination are dropped. Destination pixels not covered by
/// the source are left untouched.
pub fn copy_to_framebuffer(src: &[u8], dst: &mut [u8], blit: &Blit) -> Result<(), StreamError> {
    if src.len() < blit.src_len() {
        return Err(StreamError::FrameTooSmall {
            which: "source",
            needed: blit.src_len(),
            actual: src.len(),
        });
    }
    if dst.len() < blit.dst_len() {
        return Err(StreamError::FrameTooSmall {
            which: "destination",
            needed: blit.dst_len(),
            actual: dst.len(),
        });
    }

    for y in 0..blit.src_height {
        let sy = if blit.flip_vertical { blit.src_height - 1 - y } else { y };
        let dy = blit.y_offset + y;
        if dy >= blit.dst_height {
            break;
        }
        for x in 0..blit.src_width {
            let sx = if blit.flip_horizontal { blit.src_width - 1 - x } else { x };
            let dx = blit.x_offset + x;
            if dx >= blit.dst_width {
                break;
            }

            let s = (sy * blit.src_width + sx) * RGB888_BYTES;
            let d = (dy * blit.dst_width + dx) * RGB888_BYTES;
            let (r, g, b) = (src[s], src[s + 1], src[s + 2]);
            let (r, b) = if blit.swap_rb { (b, r) } else { (r, b) };
            dst[d] = r;
            dst[d + 1] = g;
            dst[d + 2] = b;
        }
    }

    Ok(())
}
