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

    devices::x1::io.rs

    Port decoding for the emulated X1 video adapter.

*/

use super::*;
use crate::{
    bus::{
        OutputPort, TextConsole, ATTR_VRAM_BASE, CRTC_ADDRESS_PORT, CRTC_DATA_PORT, NO_IO_BYTE, PPI_PORT_B,
        STATUS_VDISP, TEXT_VRAM_BASE,
    },
    timing::{IN_CYCLES, OUT_CYCLES},
};

const CRTC_SELECT_MASK: u8 = 0x1F;

impl X1Video {
    /// Ports this device decodes. VRAM and PCG ports are ranges; only their first port is listed.
    pub fn port_list(&self) -> Vec<u16> {
        vec![
            CRTC_ADDRESS_PORT,
            CRTC_DATA_PORT,
            Plane::Blue.port_base() as u16 * 0x100,
            Plane::Red.port_base() as u16 * 0x100,
            Plane::Green.port_base() as u16 * 0x100,
            PPI_PORT_B,
            ATTR_VRAM_BASE,
            TEXT_VRAM_BASE,
        ]
    }

    fn handle_crtc_data_write(&mut self, data: u8) {
        match CrtcRegister::from_index(self.crtc_select) {
            Some(reg) => {
                log::trace!("CRTC register write: {} <- {}", reg, data);
                self.crtc_regs[reg as usize] = data;
            }
            None => {
                log::warn!("Write to invalid CRTC register: {:02X}", self.crtc_select);
            }
        }
    }

    fn handle_status_read(&self) -> u8 {
        if self.beam().vdisp {
            STATUS_VDISP
        }
        else {
            0
        }
    }
}

#[inline]
fn in_vram(port: u16, base: u16) -> bool {
    (base..base + VRAM_SIZE).contains(&port)
}

impl OutputPort for X1Video {
    fn write_u8(&mut self, port: u16, data: u8) {
        // The bus cycle completes at the end of the instruction.
        self.cycles += OUT_CYCLES as u64;

        if let Some(plane) = Plane::from_port(port) {
            self.store_pcg(plane, port as u8, data);
            return;
        }
        match port {
            CRTC_ADDRESS_PORT => self.crtc_select = data & CRTC_SELECT_MASK,
            CRTC_DATA_PORT => self.handle_crtc_data_write(data),
            p if in_vram(p, ATTR_VRAM_BASE) => self.attr_vram[(p - ATTR_VRAM_BASE) as usize] = data,
            p if in_vram(p, TEXT_VRAM_BASE) => self.text_vram[(p - TEXT_VRAM_BASE) as usize] = data,
            _ => {
                log::warn!("Write to unmapped port {:04X}: {:02X}", port, data);
            }
        }
    }

    fn read_u8(&mut self, port: u16) -> u8 {
        self.cycles += IN_CYCLES as u64;

        match port {
            PPI_PORT_B => self.handle_status_read(),
            p if in_vram(p, ATTR_VRAM_BASE) => self.attr_vram[(p - ATTR_VRAM_BASE) as usize],
            p if in_vram(p, TEXT_VRAM_BASE) => self.text_vram[(p - TEXT_VRAM_BASE) as usize],
            // CRTC registers are write-only.
            CRTC_ADDRESS_PORT | CRTC_DATA_PORT => NO_IO_BYTE,
            _ => {
                log::warn!("Read from unmapped port {:04X}", port);
                NO_IO_BYTE
            }
        }
    }

    fn spin(&mut self, cycles: u32) {
        self.cycles += cycles as u64;
    }

    fn set_interrupts(&mut self, enabled: bool) {
        self.interrupts = enabled;
    }
}

impl TextConsole for X1Video {
    fn clear_screen(&mut self) {
        self.fill_visible(ATTR_NORMAL, b' ');
        self.cursor = Cursor::default();
    }

    fn locate(&mut self, col: u8, row: u8) {
        self.cursor = Cursor {
            col: col.min(self.columns().saturating_sub(1)),
            row: row.min(self.rows().saturating_sub(1)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crtc_registers_are_write_only() {
        let mut video = X1Video::default();
        video.write_u8(CRTC_ADDRESS_PORT, CrtcRegister::VerticalDisplayed as u8);
        video.write_u8(CRTC_DATA_PORT, 18);
        assert_eq!(video.rows(), 18);
        assert_eq!(video.read_u8(CRTC_DATA_PORT), NO_IO_BYTE);
    }

    #[test]
    fn invalid_register_select_is_ignored() {
        let mut video = X1Video::default();
        video.write_u8(CRTC_ADDRESS_PORT, 0x12);
        video.write_u8(CRTC_DATA_PORT, 0x55);
        assert_eq!(video.crtc_regs, DEFAULT_REGISTERS);
    }

    #[test]
    fn vram_is_readable() {
        let mut video = X1Video::default();
        video.write_u8(ATTR_VRAM_BASE + 0x7FF, 0x27);
        video.write_u8(TEXT_VRAM_BASE + 0x7FF, 0x99);
        assert_eq!(video.read_u8(ATTR_VRAM_BASE + 0x7FF), 0x27);
        assert_eq!(video.read_u8(TEXT_VRAM_BASE + 0x7FF), 0x99);
        assert_eq!(video.read_u8(0x0100), NO_IO_BYTE);
    }

    #[test]
    fn listed_ports_are_decoded() {
        let mut video = X1Video::default();
        let ports = video.port_list();
        assert_eq!(ports.len(), 8);
        for port in ports {
            match port {
                CRTC_ADDRESS_PORT | CRTC_DATA_PORT | PPI_PORT_B => {}
                ATTR_VRAM_BASE | TEXT_VRAM_BASE => {
                    video.write_u8(port, 0x5A);
                    assert_eq!(video.read_u8(port), 0x5A);
                }
                p => assert!(Plane::from_port(p).is_some(), "port {:04X} is not a PCG plane", p),
            }
        }
    }

    #[test]
    fn io_charges_cycles() {
        let mut video = X1Video::default();
        video.write_u8(TEXT_VRAM_BASE, 0);
        video.read_u8(PPI_PORT_B);
        video.spin(100);
        assert_eq!(video.cycles(), (OUT_CYCLES + IN_CYCLES + 100) as u64);
    }

    #[test]
    fn locate_clamps_to_screen() {
        let mut video = X1Video::default();
        video.locate(200, 200);
        assert_eq!(video.cursor(), Cursor { col: 79, row: 24 });
    }
}
