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

    preview.rs

    16x16 preview grid of all PCG slots.

*/

use strum_macros::Display;

use crate::{
    bus::{OutputPort, TextConsole},
    vram::{self, ATTR_PCG, ATTR_PCG_WIDE},
};

pub const PREVIEW_GRID: u16 = 16;
/// Console row the cursor is left on after drawing the grid.
pub const PREVIEW_CURSOR_ROW: u8 = 17;

#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum PreviewMode {
    #[strum(serialize = "normal")]
    Normal,
    #[strum(serialize = "wide")]
    Wide,
}

impl PreviewMode {
    fn attribute(self) -> u8 {
        match self {
            PreviewMode::Normal => ATTR_PCG,
            PreviewMode::Wide => ATTR_PCG_WIDE,
        }
    }

    /// Text cells used per glyph.
    pub fn cell_width(self) -> u16 {
        match self {
            PreviewMode::Normal => 1,
            PreviewMode::Wide => 2,
        }
    }
}

/// Draw codes 0..=255 as a 16x16 grid from the top-left of the screen, row-major, then park
/// the cursor below it.
pub fn render<M: OutputPort + TextConsole + ?Sized>(machine: &mut M, mode: PreviewMode) {
    log::debug!("Drawing {} PCG preview", mode);
    let attr = mode.attribute();
    let mut code: u8 = 0;
    for y in 0..PREVIEW_GRID {
        let mut offset = vram::cell_offset(0, y);
        for _ in 0..PREVIEW_GRID {
            for _ in 0..mode.cell_width() {
                vram::put_cell(machine, offset, attr, code);
                offset += 1;
            }
            code = code.wrapping_add(1);
        }
    }
    machine.locate(0, PREVIEW_CURSOR_ROW);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bus::{ATTR_VRAM_BASE, TEXT_VRAM_BASE, VRAM_SIZE},
        devices::recorder::{PortEvent, RecordingPort},
        vram::COLUMNS,
    };

    #[test]
    fn normal_grid_places_every_code_once() {
        let mut port = RecordingPort::new();
        render(&mut port, PreviewMode::Normal);

        let text = port.writes_in(TEXT_VRAM_BASE..TEXT_VRAM_BASE + VRAM_SIZE);
        assert_eq!(text.len(), 256);
        for (port_addr, code) in &text {
            let offset = port_addr - TEXT_VRAM_BASE;
            let (row, col) = (offset / COLUMNS, offset % COLUMNS);
            assert_eq!(*code as u16, row * 16 + col);
        }

        let attrs = port.writes_in(ATTR_VRAM_BASE..ATTR_VRAM_BASE + VRAM_SIZE);
        assert!(attrs.iter().all(|(_, a)| *a == ATTR_PCG));
        assert_eq!(port.events().last(), Some(&PortEvent::Locate(0, 17)));
    }

    #[test]
    fn wide_grid_doubles_each_cell() {
        let mut port = RecordingPort::new();
        render(&mut port, PreviewMode::Wide);

        let text = port.writes_in(TEXT_VRAM_BASE..TEXT_VRAM_BASE + VRAM_SIZE);
        assert_eq!(text.len(), 512);
        for pair in text.chunks_exact(2) {
            assert_eq!(pair[0].1, pair[1].1);
            assert_eq!(pair[0].0 + 1, pair[1].0);
        }
        // Row 1 starts at column 0 of the next screen row, 32 cells wide.
        assert_eq!(text[32], (TEXT_VRAM_BASE + COLUMNS, 16));

        let attrs = port.writes_in(ATTR_VRAM_BASE..ATTR_VRAM_BASE + VRAM_SIZE);
        assert!(attrs.iter().all(|(_, a)| *a == ATTR_PCG_WIDE));
    }

    #[test]
    fn preview_touches_no_pcg_ports() {
        let mut port = RecordingPort::new();
        render(&mut port, PreviewMode::Wide);
        assert!(port.pcg_writes().is_empty());
    }
}
