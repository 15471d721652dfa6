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

    display.rs

    Scoped display mode for PCG definition.

*/

//! A [DisplayContext] owns the adapter for the duration of a PCG definition run. Creating one
//! shrinks the visible screen so the reserved rows are scanned only during vertical blank and
//! blanks those rows; dropping it puts the screen back. Restoration happens on every exit path,
//! including unwinding.
//!
//! The CRTC row count cannot be read back, so teardown restores the configured row count rather
//! than whatever was set before. The reserved rows are left as white spaces, since the console
//! driver does not clear rows it believes are off-screen.

use crate::{
    bus::{OutputPort, TextConsole},
    crtc::{self, DEFAULT_ROWS, DEFINITION_ROWS},
    error::PcgError,
    glyph::{GlyphBatch, GlyphBitmap},
    orchestrator,
    selector::{ReservedRegion, SlotSelector, VramSlotSelector},
    timing::LineTiming,
    transfer::{GlyphTransfer, TransferEngine},
    vram::{self, ATTR_HIDDEN_PCG, ATTR_NORMAL},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DisplayConfig {
    /// Row count restored on teardown.
    pub rows: u8,
    /// Row count during definition. The reserved region starts at this row.
    pub definition_rows: u8,
    pub timing: LineTiming,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            definition_rows: DEFINITION_ROWS,
            timing: LineTiming::default(),
        }
    }
}

pub struct DisplayContext<'a, M: OutputPort + TextConsole + ?Sized> {
    machine:  &'a mut M,
    rows:     u8,
    region:   ReservedRegion,
    selector: VramSlotSelector,
    engine:   TransferEngine,
}

impl<'a, M: OutputPort + TextConsole + ?Sized> DisplayContext<'a, M> {
    /// Enter definition mode on `machine`.
    pub fn begin(machine: &'a mut M, config: &DisplayConfig) -> Result<Self, PcgError> {
        let region = ReservedRegion::below(config.definition_rows).ok_or(PcgError::NoReservedRegion {
            rows: config.definition_rows,
        })?;

        log::debug!(
            "Entering PCG definition mode: {} rows visible, reserved rows {}-{} x {} columns",
            config.definition_rows,
            region.first_row(),
            region.row(7),
            region.columns()
        );
        crtc::set_rows(&mut *machine, config.definition_rows);
        vram::fill_from(&mut *machine, region.start_offset(), ATTR_HIDDEN_PCG, 0);

        Ok(DisplayContext {
            machine,
            rows: config.rows,
            region,
            selector: VramSlotSelector::new(region),
            engine: TransferEngine::new(config.timing),
        })
    }

    pub fn region(&self) -> ReservedRegion {
        self.region
    }

    /// Define all 256 glyphs.
    pub fn define_all(&mut self, bitmap: &GlyphBitmap) {
        orchestrator::define_all(self, bitmap);
    }

    /// Leave definition mode. Equivalent to dropping the context.
    pub fn end(self) {}
}

impl<M: OutputPort + TextConsole + ?Sized> SlotSelector for DisplayContext<'_, M> {
    fn select_slots(&mut self, base_index: u8) {
        self.selector.write(&mut *self.machine, base_index);
    }
}

impl<M: OutputPort + TextConsole + ?Sized> GlyphTransfer for DisplayContext<'_, M> {
    fn transfer(&mut self, batch: &GlyphBatch<'_>) {
        self.engine.transfer(&mut *self.machine, batch);
    }
}

impl<M: OutputPort + TextConsole + ?Sized> Drop for DisplayContext<'_, M> {
    fn drop(&mut self) {
        log::debug!("Leaving PCG definition mode: restoring {} rows", self.rows);
        vram::fill_from(&mut *self.machine, self.region.start_offset(), ATTR_NORMAL, b' ');
        crtc::set_rows(&mut *self.machine, self.rows);
        self.machine.clear_screen();
    }
}
