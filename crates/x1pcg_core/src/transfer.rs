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

    transfer.rs

    Timed PCG transfer engine.

*/

//! Streams one batch of 8 glyphs into PCG RAM during a single vertical blank.
//!
//! The adapter stores a PCG write into the slot whose character code the CRTC is addressing at
//! that moment. During vertical blank the CRTC keeps counting through the rows below the visible
//! area, one raster per 250 CPU cycles, eight rasters per row. If the reserved rows hold codes
//! `n..n+7` and we write one line of all three planes per raster starting at the top of vertical
//! blank, line `k` of the batch lands in glyph `n + k / 8`, scanline `k % 8`.
//!
//! Nothing on the adapter tells us when the next raster starts, so each line is paced purely by
//! cycle counting (see [crate::timing]). A wrong calibration silently smears data across the
//! wrong slots.

use crate::{
    bus::{pcg_port, CriticalSection, OutputPort, PPI_PORT_B, STATUS_VDISP},
    glyph::{GlyphBatch, Plane},
    timing::{LineTiming, JP_CYCLES, SYNC_EXIT_CYCLES},
};

/// Something that can move one batch of glyph data into the slots currently selected.
pub trait GlyphTransfer {
    fn transfer(&mut self, batch: &GlyphBatch<'_>);
}

#[derive(Copy, Clone, Debug, Default)]
pub struct TransferEngine {
    timing: LineTiming,
}

impl TransferEngine {
    pub fn new(timing: LineTiming) -> Self {
        Self { timing }
    }

    pub fn timing(&self) -> LineTiming {
        self.timing
    }

    /// Transfer `batch` to the PCG slots selected by the reserved rows of text VRAM.
    ///
    /// Interrupts are masked from the start of the sync wait until the last line is written.
    /// There is no timeout: if V-DISP never toggles this never returns.
    pub fn transfer<P: OutputPort + ?Sized>(&self, port: &mut P, batch: &GlyphBatch<'_>) {
        let mut port = CriticalSection::enter(port);

        wait_vertical_blank(&mut *port);
        port.spin(SYNC_EXIT_CYCLES);

        let spin = self.timing.spin_cycles();
        for (line, scan) in batch.lines().enumerate() {
            let line = line as u8;
            for plane in Plane::ALL {
                port.write_u8(pcg_port(plane, line), scan.plane(plane));
            }
            port.spin(spin);
        }
    }
}

/// Wait for the leading edge of vertical blank.
///
/// We first wait for V-DISP to be set so that a blanking period already in progress is not
/// mistaken for a fresh one, then wait for it to clear. Each poll costs an IN (charged by the
/// port) and a JP.
fn wait_vertical_blank<P: OutputPort + ?Sized>(port: &mut P) {
    loop {
        let vdisp = port.poll_status_bit(PPI_PORT_B, STATUS_VDISP);
        port.spin(JP_CYCLES);
        if vdisp {
            break;
        }
    }
    loop {
        let vdisp = port.poll_status_bit(PPI_PORT_B, STATUS_VDISP);
        port.spin(JP_CYCLES);
        if !vdisp {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bus::PCG_BLUE_PORT,
        devices::recorder::{PortEvent, RecordingPort},
        glyph::{GlyphBitmap, BATCH_LINES, BITMAP_SIZE},
        timing::OUT_CYCLES,
    };

    fn bitmap() -> GlyphBitmap {
        let data: Vec<u8> = (0..BITMAP_SIZE).map(|i| (i * 7 % 256) as u8).collect();
        GlyphBitmap::from_bytes(&data).unwrap()
    }

    #[test]
    fn every_line_emits_blue_red_green() {
        let bitmap = bitmap();
        let batch = bitmap.batch(5).unwrap();
        let mut port = RecordingPort::new();

        TransferEngine::default().transfer(&mut port, &batch);

        let writes = port.pcg_writes();
        assert_eq!(writes.len(), BATCH_LINES * 3);
        for (line, (triple, scan)) in writes.chunks_exact(3).zip(batch.lines()).enumerate() {
            for (i, plane) in Plane::ALL.iter().enumerate() {
                assert_eq!(triple[i].0, pcg_port(*plane, line as u8));
                assert_eq!(triple[i].1, scan.plane(*plane));
            }
        }
    }

    #[test]
    fn transfer_starts_at_leading_edge_of_blank() {
        let bitmap = bitmap();
        let mut port = RecordingPort::new();
        // Start in the middle of a blanking period: the engine must skip it.
        port.advance_to_blank();
        let blank_seen = port.cycles();

        TransferEngine::default().transfer(&mut port, &bitmap.batch(0).unwrap());

        let first = port
            .events()
            .iter()
            .find_map(|e| match e {
                PortEvent::Write { port: PCG_BLUE_PORT, cycle, .. } => Some(*cycle),
                _ => None,
            })
            .unwrap();
        let frame = port.frame();
        assert!(first > blank_seen + frame.display_cycles());
        assert!(frame.in_blank(first));
        // Sync detection plus the first OUTI completes well within the first raster.
        assert!(frame.raster_phase(first) < 64);
        assert_eq!(frame.blank_raster(first), Some(0));
    }

    #[test]
    fn lines_are_paced_one_raster_apart() {
        let bitmap = bitmap();
        let mut port = RecordingPort::new();
        TransferEngine::default().transfer(&mut port, &bitmap.batch(1).unwrap());

        let frame = port.frame();
        let blue: Vec<u64> = port
            .events()
            .iter()
            .filter_map(|e| match e {
                PortEvent::Write { port, cycle, .. } if Plane::from_port(*port) == Some(Plane::Blue) => Some(*cycle),
                _ => None,
            })
            .collect();
        assert_eq!(blue.len(), BATCH_LINES);
        for pair in blue.windows(2) {
            assert_eq!(pair[1] - pair[0], 250);
        }
        for (line, cycle) in blue.iter().enumerate() {
            assert_eq!(frame.blank_raster(*cycle), Some(line as u32));
        }
        // Green of the last line goes out two OUTIs after blue.
        let last_green = port.pcg_writes().last().map(|w| w.2).unwrap();
        assert_eq!(last_green - blue[BATCH_LINES - 1], 2 * OUT_CYCLES as u64);
    }

    #[test]
    fn slow_budget_stretches_line_spacing() {
        let bitmap = bitmap();
        let engine = TransferEngine::new(LineTiming::calibrate(264));
        assert_eq!(engine.timing().line_cycles(), 264);

        let mut port = RecordingPort::new();
        engine.transfer(&mut port, &bitmap.batch(4).unwrap());
        let writes = port.pcg_writes();
        assert_eq!(writes[3].2 - writes[0].2, 264);
    }

    #[test]
    fn interrupts_masked_for_whole_transfer() {
        let bitmap = bitmap();
        let mut port = RecordingPort::new();
        TransferEngine::default().transfer(&mut port, &bitmap.batch(2).unwrap());

        let events = port.events();
        assert_eq!(events.first(), Some(&PortEvent::Interrupts(false)));
        assert_eq!(events.last(), Some(&PortEvent::Interrupts(true)));
        let toggles = events.iter().filter(|e| matches!(e, PortEvent::Interrupts(_))).count();
        assert_eq!(toggles, 2);
    }
}
