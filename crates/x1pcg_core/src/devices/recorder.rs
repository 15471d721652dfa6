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

    devices::recorder.rs

    A port that records every bus operation, with simple frame timing.

*/

use crate::{
    bus::{OutputPort, TextConsole, NO_IO_BYTE, PPI_PORT_B, STATUS_VDISP},
    glyph::Plane,
    timing::{IN_CYCLES, OUT_CYCLES},
};

/// Raster-level frame timing: a display period followed by vertical blank, starting at cycle 0.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FrameTiming {
    pub raster_cycles:   u32,
    pub display_rasters: u32,
    pub total_rasters:   u32,
}

impl Default for FrameTiming {
    /// 18 visible rows of 8 rasters out of 262, 250 cycles per raster.
    fn default() -> Self {
        Self {
            raster_cycles:   250,
            display_rasters: 18 * 8,
            total_rasters:   262,
        }
    }
}

impl FrameTiming {
    #[inline]
    pub fn frame_cycles(&self) -> u64 {
        self.raster_cycles as u64 * self.total_rasters as u64
    }

    #[inline]
    pub fn display_cycles(&self) -> u64 {
        self.raster_cycles as u64 * self.display_rasters as u64
    }

    /// Raster within the current frame.
    #[inline]
    pub fn raster(&self, cycle: u64) -> u32 {
        ((cycle % self.frame_cycles()) / self.raster_cycles as u64) as u32
    }

    /// Cycles elapsed since the start of the current raster.
    #[inline]
    pub fn raster_phase(&self, cycle: u64) -> u32 {
        (cycle % self.raster_cycles as u64) as u32
    }

    #[inline]
    pub fn in_blank(&self, cycle: u64) -> bool {
        self.raster(cycle) >= self.display_rasters
    }

    /// Raster counted from the start of vertical blank, or None during the display period.
    pub fn blank_raster(&self, cycle: u64) -> Option<u32> {
        self.raster(cycle).checked_sub(self.display_rasters)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PortEvent {
    Write { port: u16, data: u8, cycle: u64 },
    Read { port: u16, data: u8, cycle: u64 },
    Spin(u32),
    Interrupts(bool),
    ClearScreen,
    Locate(u8, u8),
}

/// Test double for [OutputPort] and [TextConsole]. Reads of the PPI return V-DISP according to
/// [FrameTiming]; every other read returns [NO_IO_BYTE]. Writes are recorded and otherwise
/// ignored.
#[derive(Clone, Debug)]
pub struct RecordingPort {
    frame:  FrameTiming,
    cycles: u64,
    interrupts: bool,
    events: Vec<PortEvent>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::with_frame(FrameTiming::default())
    }

    pub fn with_frame(frame: FrameTiming) -> Self {
        Self {
            frame,
            cycles: 0,
            interrupts: true,
            events: Vec::new(),
        }
    }

    pub fn frame(&self) -> FrameTiming {
        self.frame
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts
    }

    pub fn events(&self) -> &[PortEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Jump forward to the middle of the next vertical blank without recording anything.
    pub fn advance_to_blank(&mut self) {
        let frame_cycles = self.frame.frame_cycles();
        let frame_start = self.cycles - self.cycles % frame_cycles;
        let mut target = frame_start + self.frame.display_cycles() + self.frame.raster_cycles as u64 * 10;
        if target <= self.cycles {
            target += frame_cycles;
        }
        self.cycles = target;
    }

    /// All writes to PCG plane ports as (port, data, cycle), in order.
    pub fn pcg_writes(&self) -> Vec<(u16, u8, u64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PortEvent::Write { port, data, cycle } if Plane::from_port(*port).is_some() => {
                    Some((*port, *data, *cycle))
                }
                _ => None,
            })
            .collect()
    }

    /// All writes to the given port range as (port, data), in order.
    pub fn writes_in(&self, range: std::ops::Range<u16>) -> Vec<(u16, u8)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PortEvent::Write { port, data, .. } if range.contains(port) => Some((*port, *data)),
                _ => None,
            })
            .collect()
    }
}

impl OutputPort for RecordingPort {
    fn write_u8(&mut self, port: u16, data: u8) {
        self.cycles += OUT_CYCLES as u64;
        self.events.push(PortEvent::Write {
            port,
            data,
            cycle: self.cycles,
        });
    }

    fn read_u8(&mut self, port: u16) -> u8 {
        self.cycles += IN_CYCLES as u64;
        let data = match port {
            PPI_PORT_B if self.frame.in_blank(self.cycles) => 0,
            PPI_PORT_B => STATUS_VDISP,
            _ => NO_IO_BYTE,
        };
        self.events.push(PortEvent::Read {
            port,
            data,
            cycle: self.cycles,
        });
        data
    }

    fn spin(&mut self, cycles: u32) {
        self.cycles += cycles as u64;
        self.events.push(PortEvent::Spin(cycles));
    }

    fn set_interrupts(&mut self, enabled: bool) {
        self.interrupts = enabled;
        self.events.push(PortEvent::Interrupts(enabled));
    }
}

impl TextConsole for RecordingPort {
    fn clear_screen(&mut self) {
        self.events.push(PortEvent::ClearScreen);
    }

    fn locate(&mut self, col: u8, row: u8) {
        self.events.push(PortEvent::Locate(col, row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vdisp_follows_frame() {
        let mut port = RecordingPort::new();
        assert_eq!(port.read_u8(PPI_PORT_B) & STATUS_VDISP, STATUS_VDISP);
        port.advance_to_blank();
        assert_eq!(port.read_u8(PPI_PORT_B) & STATUS_VDISP, 0);
        assert_eq!(port.read_u8(0x1234), NO_IO_BYTE);
    }

    #[test]
    fn clearing_events_keeps_the_clock() {
        let mut port = RecordingPort::new();
        port.write_u8(crate::bus::TEXT_VRAM_BASE, 0x41);
        port.spin(100);
        let cycles = port.cycles();
        port.clear_events();
        assert!(port.events().is_empty());
        assert_eq!(port.cycles(), cycles);
    }

    #[test]
    fn frame_timing_helpers() {
        let frame = FrameTiming::default();
        assert_eq!(frame.frame_cycles(), 65_500);
        assert_eq!(frame.blank_raster(frame.display_cycles() - 1), None);
        assert_eq!(frame.blank_raster(frame.display_cycles()), Some(0));
        assert_eq!(frame.blank_raster(frame.display_cycles() + 250 * 3 + 5), Some(3));
        assert_eq!(frame.raster(frame.frame_cycles()), 0);
    }
}
