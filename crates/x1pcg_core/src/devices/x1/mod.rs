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

    devices::x1::mod.rs

    Emulation of the Sharp X1 text and PCG video adapter.

*/

//! A host-side model of the parts of the X1 video hardware the PCG loader touches: the HD46505
//! CRTC, the V-DISP status bit, both 2K VRAMs and PCG RAM.
//!
//! There is no real-time clock. The device keeps a CPU cycle counter that advances with every
//! I/O operation and every [OutputPort::spin](crate::bus::OutputPort::spin), and derives the
//! beam position from it. The CRTC counts rasters continuously, including through vertical
//! blank, so writes to a PCG plane port land in whichever slot the beam is addressing at that
//! cycle, exactly as on hardware.

mod draw;
mod io;

use crate::{
    bus::VRAM_SIZE,
    crtc::{CrtcRegister, CRTC_REGISTER_COUNT, DEFAULT_ROWS},
    glyph::{Glyph, Plane, ScanLine, GLYPH_COUNT, GLYPH_LINES, GLYPH_SIZE, PLANE_COUNT},
    timing::DEFAULT_LINE_CYCLES,
    vram::{ATTR_NORMAL, COLUMNS},
};

pub use draw::{PALETTE, SCREEN_BYTES_PER_PIXEL};

const VRAM_MASK: usize = VRAM_SIZE as usize - 1;

/// Register defaults for 80x25 text with 8-line characters.
const DEFAULT_REGISTERS: [u8; CRTC_REGISTER_COUNT] = [
    111,          // R0  horizontal total
    80,           // R1  horizontal displayed
    89,           // R2  hsync position
    0x38,         // R3  sync widths
    31,           // R4  vertical total
    6,            // R5  vertical total adjust
    DEFAULT_ROWS, // R6  vertical displayed
    28,           // R7  vsync position
    0,            // R8  interlace
    7,            // R9  max scanline address
    0, 0,         // R10-R11 cursor
    0, 0,         // R12-R13 start address
    0, 0,         // R14-R15 cursor address
    0, 0,         // R16-R17 light pen
];

/// Cursor position of the console, in text cells.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Cursor {
    pub col: u8,
    pub row: u8,
}

/// Where the CRTC is at a given cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BeamPosition {
    /// Raster counted from the top of the frame.
    pub raster: u32,
    /// Character row and line within the row.
    pub row: u32,
    pub line: u32,
    /// Character clock within the raster, 0 to R0.
    pub column: u32,
    pub vdisp: bool,
}

pub struct X1Video {
    crtc_select: u8,
    crtc_regs: [u8; CRTC_REGISTER_COUNT],

    attr_vram: Box<[u8; VRAM_SIZE as usize]>,
    text_vram: Box<[u8; VRAM_SIZE as usize]>,
    pcg: Box<[[[u8; GLYPH_LINES]; PLANE_COUNT]; GLYPH_COUNT]>,

    raster_cycles: u32,
    cycles: u64,
    interrupts: bool,
    cursor: Cursor,
    pcg_writes: u64,
}

impl Default for X1Video {
    fn default() -> Self {
        X1Video::new(DEFAULT_LINE_CYCLES)
    }
}

impl X1Video {
    /// Create an adapter whose CRTC advances one raster every `raster_cycles` CPU cycles.
    /// VRAM comes up as blank white text and PCG RAM as zeroes.
    pub fn new(raster_cycles: u32) -> Self {
        X1Video {
            crtc_select: 0,
            crtc_regs: DEFAULT_REGISTERS,
            attr_vram: Box::new([ATTR_NORMAL; VRAM_SIZE as usize]),
            text_vram: Box::new([b' '; VRAM_SIZE as usize]),
            pcg: Box::new([[[0; GLYPH_LINES]; PLANE_COUNT]; GLYPH_COUNT]),
            raster_cycles: raster_cycles.max(1),
            cycles: 0,
            interrupts: true,
            cursor: Cursor::default(),
            pcg_writes: 0,
        }
    }

    #[inline]
    pub fn register(&self, reg: CrtcRegister) -> u8 {
        self.crtc_regs[reg as usize]
    }

    /// Visible character rows (R6).
    #[inline]
    pub fn rows(&self) -> u8 {
        self.register(CrtcRegister::VerticalDisplayed)
    }

    /// Visible character columns (R1).
    #[inline]
    pub fn columns(&self) -> u8 {
        self.register(CrtcRegister::HorizontalDisplayed)
    }

    /// Rasters per character row (R9 + 1).
    #[inline]
    pub fn rasters_per_row(&self) -> u32 {
        self.register(CrtcRegister::MaximumScanlineAddress) as u32 + 1
    }

    /// Rasters per frame: (R4 + 1) character rows plus R5 adjust lines.
    pub fn total_rasters(&self) -> u32 {
        (self.register(CrtcRegister::VerticalTotal) as u32 + 1) * self.rasters_per_row()
            + self.register(CrtcRegister::VerticalTotalAdjust) as u32
    }

    /// Rasters in the vertical display period.
    pub fn display_rasters(&self) -> u32 {
        self.rows() as u32 * self.rasters_per_row()
    }

    #[inline]
    pub fn raster_cycles(&self) -> u32 {
        self.raster_cycles
    }

    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[inline]
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts
    }

    #[inline]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Number of PCG plane writes accepted since reset.
    #[inline]
    pub fn pcg_write_count(&self) -> u64 {
        self.pcg_writes
    }

    /// Beam position at the current cycle.
    pub fn beam(&self) -> BeamPosition {
        let total = self.total_rasters().max(1) as u64;
        let raster_cycles = self.raster_cycles as u64;
        let raster = ((self.cycles / raster_cycles) % total) as u32;
        let phase = self.cycles % raster_cycles;
        let clocks = self.register(CrtcRegister::HorizontalTotal) as u64 + 1;

        BeamPosition {
            raster,
            row: raster / self.rasters_per_row(),
            line: raster % self.rasters_per_row(),
            column: (phase * clocks / raster_cycles) as u32,
            vdisp: raster < self.display_rasters(),
        }
    }

    /// VRAM offset the CRTC is fetching at the current cycle. The 6845 memory address keeps
    /// counting through horizontal retrace and the rows below R6.
    pub fn beam_address(&self) -> usize {
        let beam = self.beam();
        let start = ((self.register(CrtcRegister::StartAddressH) as usize) << 8)
            | self.register(CrtcRegister::StartAddressL) as usize;
        (start + beam.row as usize * self.columns() as usize + beam.column as usize) & VRAM_MASK
    }

    #[inline]
    pub fn attr_at(&self, offset: usize) -> u8 {
        self.attr_vram[offset & VRAM_MASK]
    }

    #[inline]
    pub fn text_at(&self, offset: usize) -> u8 {
        self.text_vram[offset & VRAM_MASK]
    }

    /// The current contents of PCG slot `code`.
    pub fn pcg_glyph(&self, code: u8) -> Glyph {
        let slot = &self.pcg[code as usize];
        let mut glyph = Glyph::default();
        for (line, scan) in glyph.lines.iter_mut().enumerate() {
            *scan = ScanLine::new(
                slot[Plane::Blue.index()][line],
                slot[Plane::Red.index()][line],
                slot[Plane::Green.index()][line],
            );
        }
        glyph
    }

    /// Dump PCG RAM in the 6144-byte file layout.
    pub fn pcg_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(GLYPH_COUNT * GLYPH_SIZE);
        for code in 0..GLYPH_COUNT {
            bytes.extend_from_slice(&self.pcg_glyph(code as u8).to_bytes());
        }
        bytes
    }

    fn store_pcg(&mut self, plane: Plane, line: u8, data: u8) {
        let address = self.beam_address();
        let code = self.text_vram[address];
        log::trace!(
            "PCG {} write {:02X} -> slot {:02X} line {} (vram {:03X}, beam {:?})",
            plane,
            data,
            code,
            line,
            address,
            self.beam()
        );
        self.pcg[code as usize][plane.index()][(line as usize) % GLYPH_LINES] = data;
        self.pcg_writes += 1;
    }

    fn fill_visible(&mut self, attr: u8, code: u8) {
        let cells = (self.rows() as usize * COLUMNS as usize).min(VRAM_SIZE as usize);
        self.attr_vram[..cells].fill(attr);
        self.text_vram[..cells].fill(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bus::{OutputPort, TextConsole, PPI_PORT_B, STATUS_VDISP},
        display::{DisplayConfig, DisplayContext},
        glyph::{GlyphBitmap, BITMAP_SIZE},
        preview::{self, PreviewMode},
        timing::LineTiming,
        vram::{ATTR_PCG, ATTR_PCG_WIDE},
    };

    /// Every glyph line of every slot distinct, so misplaced data shows.
    fn pattern() -> GlyphBitmap {
        let data: Vec<u8> = (0..BITMAP_SIZE).map(|i| ((i / 3) ^ (i % 3) * 0x55) as u8).collect();
        GlyphBitmap::from_bytes(&data).unwrap()
    }

    fn define(video: &mut X1Video, bitmap: &GlyphBitmap, config: &DisplayConfig) {
        let mut ctx = DisplayContext::begin(video, config).unwrap();
        ctx.define_all(bitmap);
    }

    #[test]
    fn default_frame_geometry() {
        let video = X1Video::default();
        assert_eq!(video.total_rasters(), 262);
        assert_eq!(video.display_rasters(), 200);
        assert_eq!(video.rows(), 25);
        assert!(video.beam().vdisp);
    }

    #[test]
    fn vdisp_tracks_row_count() {
        let mut video = X1Video::default();
        crate::crtc::set_rows(&mut video, 18);
        assert_eq!(video.display_rasters(), 144);

        video.spin(144 * 250 - video.cycles() as u32 - 13);
        assert_eq!(video.read_u8(PPI_PORT_B) & STATUS_VDISP, STATUS_VDISP);
        video.spin(1);
        assert_eq!(video.read_u8(PPI_PORT_B) & STATUS_VDISP, 0);
    }

    #[test]
    fn pcg_write_follows_beam() {
        let mut video = X1Video::default();
        video.write_u8(0x3000 + 80 * 2 + 5, 0x42);
        // Row 2, line 3, character clock 5.
        let target = (2 * 8 + 3) * 250 + (5 * 250 + 111) / 112;
        let now = video.cycles();
        video.spin((target - now - 16) as u32);
        video.write_u8(0x1603, 0xA5);
        assert_eq!(video.pcg_glyph(0x42).lines[3].red, 0xA5);
        assert_eq!(video.pcg_write_count(), 1);
    }

    #[test]
    fn define_all_loads_every_slot() {
        let bitmap = pattern();
        let mut video = X1Video::default();
        define(&mut video, &bitmap, &DisplayConfig::default());
        assert_eq!(video.pcg_bytes(), bitmap.as_bytes());
        assert_eq!(video.rows(), 25);
        assert!(video.interrupts_enabled());
    }

    #[test]
    fn define_all_is_idempotent() {
        let bitmap = pattern();
        let mut video = X1Video::default();
        define(&mut video, &bitmap, &DisplayConfig::default());
        let once = video.pcg_bytes();
        define(&mut video, &bitmap, &DisplayConfig::default());
        assert_eq!(video.pcg_bytes(), once);
    }

    #[test]
    fn miscalibrated_line_budget_corrupts_slots() {
        let bitmap = pattern();
        let mut video = X1Video::default();
        let config = DisplayConfig {
            timing: LineTiming::calibrate(264),
            ..Default::default()
        };
        define(&mut video, &bitmap, &config);
        assert_ne!(video.pcg_bytes(), bitmap.as_bytes());
    }

    #[test]
    fn teardown_restores_screen() {
        let mut video = X1Video::default();
        {
            let ctx = DisplayContext::begin(&mut video, &DisplayConfig::default()).unwrap();
            ctx.end();
        }
        assert_eq!(video.rows(), 25);
        assert!((0..VRAM_SIZE as usize).all(|o| video.attr_at(o) == ATTR_NORMAL));
        assert!((0..VRAM_SIZE as usize).all(|o| video.text_at(o) == b' '));
        assert_eq!(video.cursor(), Cursor::default());
    }

    #[test]
    fn preview_grid_in_vram() {
        let mut video = X1Video::default();
        preview::render(&mut video, PreviewMode::Normal);
        assert_eq!(video.text_at(80 * 3 + 4), 3 * 16 + 4);
        assert_eq!(video.attr_at(80 * 15 + 15), ATTR_PCG);
        assert_eq!(video.attr_at(16), ATTR_NORMAL);
        assert_eq!(video.cursor(), Cursor { col: 0, row: 17 });

        preview::render(&mut video, PreviewMode::Wide);
        assert_eq!(video.text_at(31), 15);
        assert_eq!(video.attr_at(31), ATTR_PCG_WIDE);
    }

    #[test]
    fn clear_screen_homes_cursor() {
        let mut video = X1Video::default();
        video.locate(10, 5);
        video.write_u8(0x3000, b'A');
        video.clear_screen();
        assert_eq!(video.text_at(0), b' ');
        assert_eq!(video.cursor(), Cursor::default());
    }
}
