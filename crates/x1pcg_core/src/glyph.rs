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

    glyph.rs

    PCG glyph data model.

    PCG data is a flat blob of 6144 bytes:

      code 0x00, line 0, blue
      code 0x00, line 0, red
      code 0x00, line 0, green
      code 0x00, line 1, blue
       ...
      code 0x00, line 7, green
      code 0x01, line 0, blue
       ...
      code 0xFF, line 7, green

    It is transferred to the adapter in 32 batches of 8 glyphs.

*/

use std::{fmt, path::Path};

use strum_macros::{Display, EnumIter};

use crate::error::PcgError;

pub const PLANE_COUNT: usize = 3;
pub const GLYPH_LINES: usize = 8;
pub const GLYPH_SIZE: usize = GLYPH_LINES * PLANE_COUNT; // 24 bytes
pub const GLYPH_COUNT: usize = 256;
pub const BATCH_GLYPHS: usize = 8;
pub const BATCH_LINES: usize = BATCH_GLYPHS * GLYPH_LINES; // 64 lines
pub const BATCH_SIZE: usize = BATCH_GLYPHS * GLYPH_SIZE; // 192 bytes
pub const BATCH_COUNT: usize = GLYPH_COUNT / BATCH_GLYPHS; // 32 batches
pub const BITMAP_SIZE: usize = GLYPH_COUNT * GLYPH_SIZE; // 6144 bytes

/// One of the three 1bpp colour planes of a PCG glyph, in transfer order.
#[derive(Copy, Clone, Debug, Display, EnumIter, Hash, Eq, PartialEq)]
pub enum Plane {
    Blue,
    Red,
    Green,
}

impl Plane {
    pub const ALL: [Plane; PLANE_COUNT] = [Plane::Blue, Plane::Red, Plane::Green];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// High byte of the I/O port that writes this plane of PCG RAM.
    #[inline]
    pub fn port_base(self) -> u8 {
        match self {
            Plane::Blue => 0x15,
            Plane::Red => 0x16,
            Plane::Green => 0x17,
        }
    }

    /// Resolve a plane from the high byte of a PCG port address.
    pub fn from_port(port: u16) -> Option<Plane> {
        match (port >> 8) as u8 {
            0x15 => Some(Plane::Blue),
            0x16 => Some(Plane::Red),
            0x17 => Some(Plane::Green),
            _ => None,
        }
    }

    /// Bit this plane contributes to an X1 colour number (GRB order, blue is bit 0).
    #[inline]
    pub fn color_bit(self) -> u8 {
        match self {
            Plane::Blue => 0b001,
            Plane::Red => 0b010,
            Plane::Green => 0b100,
        }
    }
}

/// A single 8-pixel line of a glyph, one byte per plane. Bit 7 is the leftmost pixel.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct ScanLine {
    pub blue:  u8,
    pub red:   u8,
    pub green: u8,
}

impl ScanLine {
    pub fn new(blue: u8, red: u8, green: u8) -> Self {
        Self { blue, red, green }
    }

    #[inline]
    pub fn plane(&self, plane: Plane) -> u8 {
        match plane {
            Plane::Blue => self.blue,
            Plane::Red => self.red,
            Plane::Green => self.green,
        }
    }

    #[inline]
    pub fn set_plane(&mut self, plane: Plane, byte: u8) {
        match plane {
            Plane::Blue => self.blue = byte,
            Plane::Red => self.red = byte,
            Plane::Green => self.green = byte,
        }
    }

    /// X1 colour number (0-7) of pixel `x`, counting from the left.
    pub fn color(&self, x: usize) -> u8 {
        let mask = 0x80 >> (x & 0x07);
        Plane::ALL
            .iter()
            .filter(|p| self.plane(**p) & mask != 0)
            .fold(0, |acc, p| acc | p.color_bit())
    }

    pub fn to_bytes(&self) -> [u8; PLANE_COUNT] {
        [self.blue, self.red, self.green]
    }
}

impl From<[u8; PLANE_COUNT]> for ScanLine {
    fn from([blue, red, green]: [u8; PLANE_COUNT]) -> Self {
        Self { blue, red, green }
    }
}

/// An 8x8 glyph; line 0 is the top line.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct Glyph {
    pub lines: [ScanLine; GLYPH_LINES],
}

impl Glyph {
    pub fn from_bytes(bytes: &[u8]) -> Option<Glyph> {
        if bytes.len() != GLYPH_SIZE {
            return None;
        }
        let mut glyph = Glyph::default();
        for (line, chunk) in glyph.lines.iter_mut().zip(bytes.chunks_exact(PLANE_COUNT)) {
            *line = ScanLine::new(chunk[0], chunk[1], chunk[2]);
        }
        Some(glyph)
    }

    pub fn to_bytes(&self) -> [u8; GLYPH_SIZE] {
        let mut bytes = [0; GLYPH_SIZE];
        for (chunk, line) in bytes.chunks_exact_mut(PLANE_COUNT).zip(self.lines.iter()) {
            chunk.copy_from_slice(&line.to_bytes());
        }
        bytes
    }
}

impl fmt::Display for Glyph {
    /// Draws the glyph as 8 rows of colour numbers, '.' for black.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            for x in 0..8 {
                match line.color(x) {
                    0 => write!(f, ".")?,
                    c => write!(f, "{}", c)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A borrowed run of 8 consecutive glyphs: the unit of one timed transfer.
#[derive(Copy, Clone, Debug)]
pub struct GlyphBatch<'a> {
    bytes: &'a [u8],
}

impl<'a> GlyphBatch<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<GlyphBatch<'a>, PcgError> {
        if bytes.len() != BATCH_SIZE {
            return Err(PcgError::InvalidLength {
                expected: BATCH_SIZE,
                actual:   bytes.len(),
            });
        }
        Ok(GlyphBatch { bytes })
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The 64 lines of this batch in transfer order: glyph 0 lines 0-7, glyph 1 lines 0-7, ...
    pub fn lines(&self) -> impl Iterator<Item = ScanLine> + 'a {
        self.bytes
            .chunks_exact(PLANE_COUNT)
            .map(|c| ScanLine::new(c[0], c[1], c[2]))
    }

    pub fn glyph(&self, index: usize) -> Option<Glyph> {
        let start = index.checked_mul(GLYPH_SIZE)?;
        self.bytes.get(start..start.checked_add(GLYPH_SIZE)?).and_then(Glyph::from_bytes)
    }
}

/// The complete set of 256 glyph definitions. Immutable once loaded.
#[derive(Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    data: Box<[u8; BITMAP_SIZE]>,
}

impl fmt::Debug for GlyphBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphBitmap").field("len", &self.data.len()).finish()
    }
}

impl GlyphBitmap {
    /// Build a bitmap from raw PCG data. The data must be exactly [BITMAP_SIZE] bytes; shorter or
    /// longer input is rejected rather than padded or truncated.
    pub fn from_bytes(bytes: &[u8]) -> Result<GlyphBitmap, PcgError> {
        if bytes.len() != BITMAP_SIZE {
            return Err(PcgError::InvalidLength {
                expected: BITMAP_SIZE,
                actual:   bytes.len(),
            });
        }
        let mut data = Box::new([0u8; BITMAP_SIZE]);
        data.copy_from_slice(bytes);
        Ok(GlyphBitmap { data })
    }

    pub fn from_glyphs(glyphs: &[Glyph]) -> Result<GlyphBitmap, PcgError> {
        if glyphs.len() != GLYPH_COUNT {
            return Err(PcgError::InvalidLength {
                expected: BITMAP_SIZE,
                actual:   glyphs.len() * GLYPH_SIZE,
            });
        }
        let mut data = Box::new([0u8; BITMAP_SIZE]);
        for (chunk, glyph) in data.chunks_exact_mut(GLYPH_SIZE).zip(glyphs) {
            chunk.copy_from_slice(&glyph.to_bytes());
        }
        Ok(GlyphBitmap { data })
    }

    /// Load raw PCG data from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<GlyphBitmap, PcgError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| PcgError::from_io(path, e))?;
        log::debug!("Read {} bytes of PCG data from {}", bytes.len(), path.display());
        GlyphBitmap::from_bytes(&bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn glyph(&self, code: u8) -> Glyph {
        let start = code as usize * GLYPH_SIZE;
        let mut glyph = Glyph::default();
        for (line, chunk) in glyph
            .lines
            .iter_mut()
            .zip(self.data[start..start + GLYPH_SIZE].chunks_exact(PLANE_COUNT))
        {
            *line = ScanLine::new(chunk[0], chunk[1], chunk[2]);
        }
        glyph
    }

    /// Batch `index` (0-31), covering codes `index * 8 ..= index * 8 + 7`.
    pub fn batch(&self, index: usize) -> Option<GlyphBatch<'_>> {
        let start = index.checked_mul(BATCH_SIZE)?;
        self.data
            .get(start..start.checked_add(BATCH_SIZE)?)
            .map(|bytes| GlyphBatch { bytes })
    }

    /// All 32 batches in code order.
    pub fn batches(&self) -> impl Iterator<Item = GlyphBatch<'_>> {
        self.data.chunks_exact(BATCH_SIZE).map(|bytes| GlyphBatch { bytes })
    }
}
