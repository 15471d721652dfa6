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

    selector.rs

    Glyph slot selection through reserved text VRAM rows.

*/

//! PCG RAM has no address register. Which slot a plane write lands in is decided by the
//! character code the CRTC is fetching from text VRAM at that instant. Before each batch we
//! fill the eight reserved rows below the visible area with the codes of the eight target slots,
//! one code per row, so the hardware's own character decode steers the transfer.

use crate::{
    bus::{OutputPort, VRAM_SIZE},
    crtc::DEFINITION_ROWS,
    glyph::BATCH_GLYPHS,
    vram::{self, COLUMNS},
};

pub const RESERVED_ROWS: u16 = BATCH_GLYPHS as u16;

/// Something that can point the next transfer at the eight slots starting at `base_index`.
pub trait SlotSelector {
    fn select_slots(&mut self, base_index: u8);
}

/// The eight text rows used for slot selection.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ReservedRegion {
    first_row: u16,
    columns:   u16,
}

impl Default for ReservedRegion {
    fn default() -> Self {
        // 18 leaves room for 8 rows; the last one is cut to 48 columns by the end of VRAM.
        ReservedRegion {
            first_row: DEFINITION_ROWS as u16,
            columns:   48,
        }
    }
}

impl ReservedRegion {
    /// The region starting just below `visible_rows`. Returns None if there are no visible rows,
    /// since V-DISP is then never asserted, or if the eighth row would start past the end of
    /// text VRAM.
    pub fn below(visible_rows: u8) -> Option<ReservedRegion> {
        if visible_rows == 0 {
            return None;
        }
        let first_row = visible_rows as u16;
        let last_row_start = vram::cell_offset(0, first_row + RESERVED_ROWS - 1);
        if last_row_start >= VRAM_SIZE {
            return None;
        }
        Some(ReservedRegion {
            first_row,
            columns: COLUMNS.min(VRAM_SIZE - last_row_start),
        })
    }

    #[inline]
    pub fn first_row(&self) -> u16 {
        self.first_row
    }

    /// Usable width of every reserved row; all rows are cut to the width of the shortest.
    #[inline]
    pub fn columns(&self) -> u16 {
        self.columns
    }

    /// VRAM offset of the first reserved cell.
    #[inline]
    pub fn start_offset(&self) -> u16 {
        vram::cell_offset(0, self.first_row)
    }

    /// Row holding the code for glyph `k` of a batch.
    #[inline]
    pub fn row(&self, k: u16) -> u16 {
        self.first_row + k
    }
}

/// Writes slot codes into the reserved region of text VRAM.
#[derive(Copy, Clone, Debug, Default)]
pub struct VramSlotSelector {
    region: ReservedRegion,
}

impl VramSlotSelector {
    pub fn new(region: ReservedRegion) -> Self {
        Self { region }
    }

    pub fn region(&self) -> ReservedRegion {
        self.region
    }

    /// Fill reserved row `k` with code `base_index + k` for k in 0..8, wrapping at 256.
    pub fn write<P: OutputPort + ?Sized>(&self, port: &mut P, base_index: u8) {
        log::trace!("Selecting PCG slots {:02X}-{:02X}", base_index, base_index.wrapping_add(7));
        for col in 0..self.region.columns {
            for k in 0..RESERVED_ROWS {
                let code = base_index.wrapping_add(k as u8);
                vram::put_char(port, vram::cell_offset(col, self.region.row(k)), code);
            }
        }
    }
}
