// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Label overlay: an 8×8 bitmap font drawn into an RGB888 frame.
//!
//! The label sits centred near the bottom edge:
//!
//! ```text
//!   ┌──────────────────────────┐
//!   │                          │
//!   │                          │
//!   │        PAPER-63          │ ◄─ y = height - 16 - 8
//!   │                          │ ◄─ 8 px margin
//!   └──────────────────────────┘
//! ```

use crate::decoder::ClassificationResult;
use crate::text::FixedStr;
use std::fmt::Write;
use tensor_core::RGB_CHANNELS;

pub const FONT_WIDTH: usize = 8;
pub const FONT_HEIGHT: usize = 8;
pub const FONT_SCALE: usize = 2;
pub const TEXT_BOTTOM_MARGIN: usize = 8;

/// Glyph colour, RGB.
pub const TEXT_COLOR: [u8; 3] = [0, 0, 255];

/// Largest overlay string, in bytes.
pub const OVERLAY_CAPACITY: usize = 99;

/// Overlay text (`"{label}-{confidence}"`).
pub type OverlayText = FixedStr<OVERLAY_CAPACITY>;

/// Characters at or above this code have no glyph.
const ASCII_CHAR_COUNT: usize = 128;

/// First character with an entry in [`GLYPHS`].
const FIRST_GLYPH: usize = b' ' as usize;

const BLANK: [u8; 8] = [0; 8];

/// Glyphs for `' '..='Z'`, one byte per row, MSB leftmost. Only the
/// characters labels and confidences need are drawn; the rest are blank.
#[rustfmt::skip]
const GLYPHS: [[u8; 8]; 59] = [
    BLANK, // ' '
    [0x18, 0x18, 0x18, 0x18, 0x18, 0x00, 0x18, 0x00], // '!'
    BLANK,
    BLANK,
    BLANK,
    [0x62, 0x66, 0x0C, 0x18, 0x30, 0x66, 0x46, 0x00], // '%'
    BLANK,
    BLANK,
    [0x0C, 0x18, 0x30, 0x30, 0x30, 0x18, 0x0C, 0x00], // '('
    [0x30, 0x18, 0x0C, 0x0C, 0x0C, 0x18, 0x30, 0x00], // ')'
    BLANK,
    BLANK,
    BLANK,
    [0x00, 0x00, 0x00, 0x7E, 0x00, 0x00, 0x00, 0x00], // '-'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00], // '.'
    BLANK,
    [0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x00], // '0'
    [0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00], // '1'
    [0x3C, 0x66, 0x06, 0x0C, 0x18, 0x30, 0x7E, 0x00], // '2'
    [0x3C, 0x66, 0x06, 0x1C, 0x06, 0x66, 0x3C, 0x00], // '3'
    [0x0C, 0x1C, 0x2C, 0x4C, 0x7E, 0x0C, 0x0C, 0x00], // '4'
    [0x7E, 0x60, 0x7C, 0x06, 0x06, 0x66, 0x3C, 0x00], // '5'
    [0x3C, 0x60, 0x60, 0x7C, 0x66, 0x66, 0x3C, 0x00], // '6'
    [0x7E, 0x06, 0x0C, 0x18, 0x30, 0x30, 0x30, 0x00], // '7'
    [0x3C, 0x66, 0x66, 0x3C, 0x66, 0x66, 0x3C, 0x00], // '8'
    [0x3C, 0x66, 0x66, 0x3E, 0x06, 0x0C, 0x38, 0x00], // '9'
    [0x00, 0x18, 0x18, 0x00, 0x18, 0x18, 0x00, 0x00], // ':'
    BLANK,
    BLANK,
    BLANK,
    BLANK,
    BLANK,
    BLANK,
    [0x18, 0x3C, 0x66, 0x66, 0x7E, 0x66, 0x66, 0x00], // 'A'
    [0x7C, 0x66, 0x66, 0x7C, 0x66, 0x66, 0x7C, 0x00], // 'B'
    [0x3C, 0x66, 0x60, 0x60, 0x60, 0x66, 0x3C, 0x00], // 'C'
    [0x78, 0x6C, 0x66, 0x66, 0x66, 0x6C, 0x78, 0x00], // 'D'
    [0x7E, 0x60, 0x60, 0x7C, 0x60, 0x60, 0x7E, 0x00], // 'E'
    [0x7E, 0x60, 0x60, 0x7C, 0x60, 0x60, 0x60, 0x00], // 'F'
    [0x3C, 0x66, 0x60, 0x6E, 0x66, 0x66, 0x3C, 0x00], // 'G'
    [0x66, 0x66, 0x66, 0x7E, 0x66, 0x66, 0x66, 0x00], // 'H'
    [0x7E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00], // 'I'
    [0x06, 0x06, 0x06, 0x06, 0x66, 0x66, 0x3C, 0x00], // 'J'
    [0x66, 0x6C, 0x78, 0x70, 0x78, 0x6C, 0x66, 0x00], // 'K'
    [0x60, 0x60, 0x60, 0x60, 0x60, 0x60, 0x7E, 0x00], // 'L'
    [0x63, 0x77, 0x7F, 0x6B, 0x63, 0x63, 0x63, 0x00], // 'M'
    [0x66, 0x76, 0x7E, 0x7E, 0x6E, 0x66, 0x66, 0x00], // 'N'
    [0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x00], // 'O'
    [0x7C, 0x66, 0x66, 0x7C, 0x60, 0x60, 0x60, 0x00], // 'P'
    [0x3C, 0x66, 0x66, 0x66, 0x6A, 0x6C, 0x36, 0x00], // 'Q'
    [0x7C, 0x66, 0x66, 0x7C, 0x6C, 0x66, 0x66, 0x00], // 'R'
    [0x3C, 0x66, 0x60, 0x3C, 0x06, 0x66, 0x3C, 0x00], // 'S'
    [0x7E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x00], // 'T'
    [0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x00], // 'U'
    [0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x18, 0x00], // 'V'
    [0x63, 0x63, 0x63, 0x6B, 0x7F, 0x77, 0x63, 0x00], // 'W'
    [0x66, 0x66, 0x3C, 0x18, 0x3C, 0x66, 0x66, 0x00], // 'X'
    [0x66, 0x66, 0x66, 0x3C, 0x18, 0x18, 0x18, 0x00], // 'Y'
    [0x7E, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x7E, 0x00], // 'Z'
];

/// Returns the glyph for byte `c`, or `None` if it is outside the font.
///
/// Control characters and characters past `'Z'` render blank.
pub fn glyph(c: u8) -> Option<&'static [u8; 8]> {
    let code = c as usize;
    if code >= ASCII_CHAR_COUNT {
        return None;
    }
    Some(
        code.checked_sub(FIRST_GLYPH)
            .and_then(|i| GLYPHS.get(i))
            .unwrap_or(&BLANK),
    )
}

/// Formats the overlay string for a result.
pub fn overlay_text(result: &ClassificationResult) -> OverlayText {
    let mut text = OverlayText::new();
    // Writing into a FixedStr truncates and never fails.
    let _ = write!(text, "{}-{}", result.label, result.confidence_percent());
    text
}

/// Draws one character with its top-left corner at `(x, y)`.
pub fn draw_char(frame: &mut [u8], width: usize, height: usize, x: usize, y: usize, c: u8, scale: usize) {
    let Some(rows) = glyph(c) else {
        return;
    };

    for (row, bits) in rows.iter().enumerate() {
        for col in 0..FONT_WIDTH {
            if bits & (0x80 >> col) == 0 {
                continue;
            }
            for sy in 0..scale {
                let py = y + row * scale + sy;
                if py >= height {
                    continue;
                }
                for sx in 0..scale {
                    let px = x + col * scale + sx;
                    if px >= width {
                        continue;
                    }
                    let offset = (py * width + px) * RGB_CHANNELS;
                    if let Some(pixel) = frame.get_mut(offset..offset + RGB_CHANNELS) {
                        pixel.copy_from_slice(&TEXT_COLOR);
                    }
                }
            }
        }
    }
}

/// Draws `text` starting at `(x, y)`, one cell per byte.
pub fn draw_text(frame: &mut [u8], width: usize, height: usize, text: &str, x: usize, y: usize, scale: usize) {
    let cell = FONT_WIDTH * scale;
    for (i, c) in text.bytes().enumerate() {
        draw_char(frame, width, height, x + i * cell, y, c, scale);
    }
}

/// Draws `text` centred horizontally near the bottom of the frame.
///
/// Text wider than the frame starts at column 0 and is clipped on the right.
pub fn draw_label(frame: &mut [u8], width: usize, height: usize, text: &str) {
    let text_width = text.len() * FONT_WIDTH * FONT_SCALE;
    let x = width.saturating_sub(text_width) / 2;
    let y = height.saturating_sub(FONT_HEIGHT * FONT_SCALE + TEXT_BOTTOM_MARGIN);
    draw_text(frame, width, height, text, x, y, FONT_SCALE);
}
