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

    convert.rs

    Conversion of 8-colour images to PCG data.

*/

//! The image is a 16x16 grid of 8x8 tiles, read left to right, top to bottom, one tile per
//! character code. A pixel's plane bit is set when the matching 8-bit channel is above half
//! intensity. No dithering or resizing is done; prepare the source as 128x128, 8 colours.

use std::path::{Path, PathBuf};

use crate::{
    error::PcgError,
    glyph::{GlyphBitmap, Plane, BITMAP_SIZE, GLYPH_LINES, GLYPH_SIZE, PLANE_COUNT},
};

pub const IMAGE_WIDTH: u32 = 128;
pub const IMAGE_HEIGHT: u32 = 128;
const TILES_PER_ROW: usize = IMAGE_WIDTH as usize / 8;
const CHANNEL_THRESHOLD: u8 = 0x7F;

/// Build a glyph bitmap from packed pixel data with `channels` bytes per pixel, R G B first.
/// Extra channels such as alpha are ignored.
pub fn bitmap_from_pixels(width: u32, height: u32, pixels: &[u8], channels: usize) -> Result<GlyphBitmap, PcgError> {
    if width != IMAGE_WIDTH || height != IMAGE_HEIGHT {
        return Err(PcgError::ImageDimensions {
            width,
            height,
            expected_width: IMAGE_WIDTH,
            expected_height: IMAGE_HEIGHT,
        });
    }
    let expected = (width * height) as usize * channels;
    if channels < 3 || pixels.len() != expected {
        return Err(PcgError::PixelBuffer {
            expected,
            actual: pixels.len(),
        });
    }

    let stride = IMAGE_WIDTH as usize * channels;
    let mut data = vec![0u8; BITMAP_SIZE];
    for (code, glyph) in data.chunks_exact_mut(GLYPH_SIZE).enumerate() {
        let tile_x = (code % TILES_PER_ROW) * 8;
        let tile_y = (code / TILES_PER_ROW) * GLYPH_LINES;
        for (line, scan) in glyph.chunks_exact_mut(PLANE_COUNT).enumerate() {
            let row = &pixels[(tile_y + line) * stride..][..stride];
            for px in 0..8 {
                let pixel = &row[(tile_x + px) * channels..][..3];
                for plane in Plane::ALL {
                    if pixel[channel_of(plane)] > CHANNEL_THRESHOLD {
                        scan[plane.index()] |= 0x80 >> px;
                    }
                }
            }
        }
    }

    GlyphBitmap::from_bytes(&data)
}

/// Index of a plane's channel in an RGB pixel.
#[inline]
fn channel_of(plane: Plane) -> usize {
    match plane {
        Plane::Red => 0,
        Plane::Green => 1,
        Plane::Blue => 2,
    }
}

/// Output name for a converted image: a trailing `.png` (any case) becomes `.PCG`; any other
/// name gets `.PCG` appended.
pub fn pcg_file_name(path: &Path) -> PathBuf {
    let is_png = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if is_png {
        path.with_extension("PCG")
    }
    else {
        let mut name = path.as_os_str().to_owned();
        name.push(".PCG");
        PathBuf::from(name)
    }
}
