/*
    x1pcg
    Sharp X1 programmable character generator loader

    Copyright 2025 x1pcg contributors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    devices::x1::draw.rs

    Rendering of the X1 text screen to an RGB frame.

*/

use super::*;
use crate::vram::TextAttribute;

pub const SCREEN_BYTES_PER_PIXEL: usize = 3;
const CHAR_WIDTH: usize = 8;

/// Digital 8-colour palette, indexed by the colour number (bit 0 blue, bit 1 red, bit 2 green).
pub const PALETTE: [[u8; 3]; 8] = [
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0xFF],
    [0xFF, 0x00, 0x00],
    [0xFF, 0x00, 0xFF],
    [0x00, 0xFF, 0x00],
    [0x00, 0xFF, 0xFF],
    [0xFF, 0xFF, 0x00],
    [0xFF, 0xFF, 0xFF],
];

impl X1Video {
    /// Size in pixels of the visible text screen for the current CRTC setup.
    pub fn screen_size(&self) -> (u32, u32) {
        (
            self.columns() as u32 * CHAR_WIDTH as u32,
            self.display_rasters(),
        )
    }

    /// Render the visible screen as packed RGB.
    ///
    /// PCG cells are drawn from PCG RAM, with the attribute colour masking the planes. A
    /// double-width cell stretches its glyph over itself and the cell to its right. The
    /// character ROM is not emulated, so ROM text cells draw as their background.
    pub fn render_screen(&self) -> Vec<u8> {
        let (width, height) = self.screen_size();
        let mut frame = vec![0u8; width as usize * height as usize * SCREEN_BYTES_PER_PIXEL];
        let stride = width as usize * SCREEN_BYTES_PER_PIXEL;
        let columns = self.columns() as usize;
        let rasters = self.rasters_per_row() as usize;

        for row in 0..self.rows() as usize {
            let mut col = 0;
            while col < columns {
                let offset = row * columns + col;
                let attr = TextAttribute::from_byte(self.attr_at(offset));
                let code = self.text_at(offset);
                let span = if attr.double_width() { 2 } else { 1 };
                let glyph = self.pcg_glyph(code);

                for raster in 0..rasters {
                    let y = row * rasters + raster;
                    let line = glyph.lines[raster % GLYPH_LINES];
                    for x in 0..(CHAR_WIDTH * span).min((columns - col) * CHAR_WIDTH) {
                        let mut color = match attr.pcg() {
                            true => line.color(x / span) & attr.color(),
                            false => 0,
                        };
                        if attr.reverse() {
                            color ^= 0x07;
                        }
                        let px = y * stride + (col * CHAR_WIDTH + x) * SCREEN_BYTES_PER_PIXEL;
                        frame[px..px + SCREEN_BYTES_PER_PIXEL].copy_from_slice(&PALETTE[color as usize]);
                    }
                }
                col += span;
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bus::{OutputPort, ATTR_VRAM_BASE, TEXT_VRAM_BASE},
        vram::{ATTR_PCG, ATTR_PCG_WIDE},
    };

    fn pixel(frame: &[u8], width: u32, x: usize, y: usize) -> [u8; 3] {
        let i = (y * width as usize + x) * SCREEN_BYTES_PER_PIXEL;
        [frame[i], frame[i + 1], frame[i + 2]]
    }

    fn with_glyph(code: u8, line0: ScanLine) -> X1Video {
        let mut video = X1Video::default();
        for plane in Plane::ALL {
            video.pcg[code as usize][plane.index()][0] = line0.plane(plane);
        }
        video
    }

    #[test]
    fn blank_screen_is_black() {
        let video = X1Video::default();
        assert_eq!(video.screen_size(), (640, 200));
        assert!(video.render_screen().iter().all(|b| *b == 0));
    }

    #[test]
    fn pcg_cell_uses_plane_colors() {
        // Leftmost pixel blue, next red, next green, next white.
        let mut video = with_glyph(0x10, ScanLine::new(0b1001_0000, 0b0101_0000, 0b0011_0000));
        video.write_u8(ATTR_VRAM_BASE + 1, ATTR_PCG);
        video.write_u8(TEXT_VRAM_BASE + 1, 0x10);

        let frame = video.render_screen();
        assert_eq!(pixel(&frame, 640, 8, 0), PALETTE[1]);
        assert_eq!(pixel(&frame, 640, 9, 0), PALETTE[2]);
        assert_eq!(pixel(&frame, 640, 10, 0), PALETTE[4]);
        assert_eq!(pixel(&frame, 640, 11, 0), PALETTE[7]);
        assert_eq!(pixel(&frame, 640, 12, 0), PALETTE[0]);
        assert_eq!(pixel(&frame, 640, 8, 1), PALETTE[0]);
    }

    #[test]
    fn hidden_attribute_masks_planes() {
        let mut video = with_glyph(0, ScanLine::new(0xFF, 0xFF, 0xFF));
        video.write_u8(ATTR_VRAM_BASE, crate::vram::ATTR_HIDDEN_PCG);
        video.write_u8(TEXT_VRAM_BASE, 0);
        assert!(video.render_screen().iter().all(|b| *b == 0));
    }

    #[test]
    fn wide_cell_spans_two_columns() {
        let mut video = with_glyph(0x20, ScanLine::new(0x80, 0x80, 0x80));
        video.write_u8(ATTR_VRAM_BASE, ATTR_PCG_WIDE);
        video.write_u8(TEXT_VRAM_BASE, 0x20);
        video.write_u8(ATTR_VRAM_BASE + 1, ATTR_PCG_WIDE);
        video.write_u8(TEXT_VRAM_BASE + 1, 0x20);

        let frame = video.render_screen();
        assert_eq!(pixel(&frame, 640, 0, 0), PALETTE[7]);
        assert_eq!(pixel(&frame, 640, 1, 0), PALETTE[7]);
        assert_eq!(pixel(&frame, 640, 2, 0), PALETTE[0]);
        assert_eq!(pixel(&frame, 640, 8, 0), PALETTE[0]);
    }

    #[test]
    fn frame_follows_row_count() {
        let mut video = X1Video::default();
        crate::crtc::set_rows(&mut video, 18);
        assert_eq!(video.screen_size(), (640, 144));
        assert_eq!(video.render_screen().len(), 640 * 144 * 3);
    }
}
