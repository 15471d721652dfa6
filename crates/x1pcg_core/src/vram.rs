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

    vram.rs

    Text and attribute VRAM access.

*/

//! Each character cell of the X1 text screen is a pair of bytes at the same offset in the
//! attribute VRAM (0x2000) and the text VRAM (0x3000). Both are 2K; in 80-column mode a row is
//! 80 cells, so 25 full rows plus 48 cells of a 26th fit.

use modular_bitfield::{bitfield, prelude::*};

use crate::bus::{OutputPort, ATTR_VRAM_BASE, TEXT_VRAM_BASE, VRAM_SIZE};

pub const COLUMNS: u16 = 80;

/// White text, no PCG. What the console leaves behind.
pub const ATTR_NORMAL: u8 = 0x07;
/// PCG cell drawn in black: the cell exists for the CRTC but shows nothing.
pub const ATTR_HIDDEN_PCG: u8 = 0x20;
/// PCG cell, all planes enabled.
pub const ATTR_PCG: u8 = 0x27;
/// PCG cell, all planes enabled, horizontally doubled.
pub const ATTR_PCG_WIDE: u8 = 0xA7;

#[bitfield]
#[derive(Copy, Clone, Debug)]
pub struct TextAttribute {
    pub color: B3,
    pub reverse: bool,
    pub blink: bool,
    pub pcg: bool,
    pub double_height: bool,
    pub double_width: bool,
}

impl TextAttribute {
    #[inline]
    pub fn from_byte(byte: u8) -> Self {
        TextAttribute::from_bytes([byte])
    }
    #[inline]
    pub fn to_byte(self) -> u8 {
        self.into_bytes()[0]
    }
}

/// VRAM offset of the cell at `col`, `row`.
#[inline]
pub fn cell_offset(col: u16, row: u16) -> u16 {
    row * COLUMNS + col
}

/// Write a character code without touching its attribute.
#[inline]
pub fn put_char<P: OutputPort + ?Sized>(port: &mut P, offset: u16, code: u8) {
    port.write_u8(TEXT_VRAM_BASE + (offset & (VRAM_SIZE - 1)), code);
}

/// Write an attribute / character code pair.
#[inline]
pub fn put_cell<P: OutputPort + ?Sized>(port: &mut P, offset: u16, attr: u8, code: u8) {
    port.write_u8(ATTR_VRAM_BASE + (offset & (VRAM_SIZE - 1)), attr);
    put_char(port, offset, code);
}

/// Fill every cell from `offset` to the end of VRAM.
pub fn fill_from<P: OutputPort + ?Sized>(port: &mut P, offset: u16, attr: u8, code: u8) {
    log::trace!("Filling VRAM {:04X}-{:04X} with {:02X}:{:02X}", offset, VRAM_SIZE, attr, code);
    for cell in offset..VRAM_SIZE {
        put_cell(port, cell, attr, code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_constants_decode() {
        let hidden = TextAttribute::from_byte(ATTR_HIDDEN_PCG);
        assert!(hidden.pcg());
        assert_eq!(hidden.color(), 0);

        let pcg = TextAttribute::from_byte(ATTR_PCG);
        assert!(pcg.pcg());
        assert_eq!(pcg.color(), 7);
        assert!(!pcg.double_width());

        let wide = TextAttribute::from_byte(ATTR_PCG_WIDE);
        assert!(wide.pcg() && wide.double_width());
        assert!(!wide.double_height());

        let normal = TextAttribute::from_byte(ATTR_NORMAL);
        assert!(!normal.pcg());
        assert_eq!(normal.color(), 7);
    }

    #[test]
    fn attribute_builds_back_to_byte() {
        let attr = TextAttribute::new().with_color(7).with_pcg(true).with_double_width(true);
        assert_eq!(attr.to_byte(), ATTR_PCG_WIDE);
    }

    #[test]
    fn cell_offsets() {
        assert_eq!(cell_offset(0, 0), 0);
        assert_eq!(cell_offset(47, 25), 0x7FF);
    }
}
