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

    bus::mod.rs

    Hardware access traits and X1 I/O map.

*/

//! The X1 maps all of its video hardware into I/O space: CRTC registers, the system PPI, PCG
//! plane ports and both text and attribute VRAM are reached with 16-bit port addresses.
//! Everything in this crate that touches the adapter does so through [OutputPort], which also
//! carries the notion of elapsed CPU cycles so that timing-critical code can be paced and
//! emulated devices can follow the beam.

use std::ops::{Deref, DerefMut};

/// CRTC address (register select) port.
pub const CRTC_ADDRESS_PORT: u16 = 0x1800;
/// CRTC data port.
pub const CRTC_DATA_PORT: u16 = 0x1801;
/// PCG plane ports. The low byte selects the glyph line (bits 0-2).
pub const PCG_BLUE_PORT: u16 = 0x1500;
pub const PCG_RED_PORT: u16 = 0x1600;
pub const PCG_GREEN_PORT: u16 = 0x1700;
/// System PPI port B. Bit 7 is V-DISP.
pub const PPI_PORT_B: u16 = 0x1A01;
/// Set while the CRTC is in the vertical display period, clear during vertical blank.
pub const STATUS_VDISP: u8 = 0b1000_0000;
/// Attribute VRAM (2K).
pub const ATTR_VRAM_BASE: u16 = 0x2000;
/// Text VRAM (2K).
pub const TEXT_VRAM_BASE: u16 = 0x3000;
pub const VRAM_SIZE: u16 = 0x0800;

/// Value returned for reads from an unmapped port.
pub const NO_IO_BYTE: u8 = 0xFF;

/// Port-level access to the video hardware.
///
/// Implementors are expected to charge the cost of the I/O instruction itself to their cycle
/// count on each read or write. Anything else the caller spends, such as register shuffling or
/// a software delay loop, is charged explicitly through [OutputPort::spin].
pub trait OutputPort {
    /// Write a byte to an I/O port.
    fn write_u8(&mut self, port: u16, data: u8);

    /// Read a byte from an I/O port.
    fn read_u8(&mut self, port: u16) -> u8;

    /// Burn `cycles` CPU cycles without touching the bus.
    fn spin(&mut self, cycles: u32);

    /// Mask or unmask maskable interrupts.
    fn set_interrupts(&mut self, enabled: bool);

    /// Sample a single status bit of a port.
    fn poll_status_bit(&mut self, port: u16, mask: u8) -> bool {
        self.read_u8(port) & mask != 0
    }
}

/// The text console of the host environment: control sequences that a terminal driver would
/// interpret, such as ESC E (clear) and ESC Y (locate).
pub trait TextConsole {
    /// Clear the visible screen and home the cursor.
    fn clear_screen(&mut self);

    /// Move the cursor to `col`, `row`.
    fn locate(&mut self, col: u8, row: u8);
}

impl<T: OutputPort + ?Sized> OutputPort for &mut T {
    fn write_u8(&mut self, port: u16, data: u8) {
        (**self).write_u8(port, data)
    }
    fn read_u8(&mut self, port: u16) -> u8 {
        (**self).read_u8(port)
    }
    fn spin(&mut self, cycles: u32) {
        (**self).spin(cycles)
    }
    fn set_interrupts(&mut self, enabled: bool) {
        (**self).set_interrupts(enabled)
    }
}

/// Interrupts-disabled section around a port. Interrupts are masked on creation and unmasked
/// when the guard is dropped, on every exit path.
pub struct CriticalSection<'a, P: OutputPort + ?Sized> {
    port: &'a mut P,
}

impl<'a, P: OutputPort + ?Sized> CriticalSection<'a, P> {
    pub fn enter(port: &'a mut P) -> Self {
        port.set_interrupts(false);
        CriticalSection { port }
    }
}

impl<P: OutputPort + ?Sized> Drop for CriticalSection<'_, P> {
    fn drop(&mut self) {
        self.port.set_interrupts(true);
    }
}

impl<P: OutputPort + ?Sized> Deref for CriticalSection<'_, P> {
    type Target = P;
    #[inline]
    fn deref(&self) -> &P {
        self.port
    }
}

impl<P: OutputPort + ?Sized> DerefMut for CriticalSection<'_, P> {
    #[inline]
    fn deref_mut(&mut self) -> &mut P {
        self.port
    }
}

/// Build the port address for writing `line` of a PCG plane.
#[inline]
pub fn pcg_port(plane: crate::glyph::Plane, line: u8) -> u16 {
    (plane.port_base() as u16) << 8 | line as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::Plane;

    #[derive(Default)]
    struct MaskLog {
        log: Vec<bool>,
    }

    impl OutputPort for MaskLog {
        fn write_u8(&mut self, _port: u16, _data: u8) {}
        fn read_u8(&mut self, _port: u16) -> u8 {
            NO_IO_BYTE
        }
        fn spin(&mut self, _cycles: u32) {}
        fn set_interrupts(&mut self, enabled: bool) {
            self.log.push(enabled);
        }
    }

    #[test]
    fn critical_section_restores_interrupts() {
        let mut port = MaskLog::default();
        {
            let mut cs = CriticalSection::enter(&mut port);
            cs.write_u8(0x1500, 0);
        }
        assert_eq!(port.log, vec![false, true]);
    }

    #[test]
    fn critical_section_restores_interrupts_on_unwind() {
        let mut port = MaskLog::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _cs = CriticalSection::enter(&mut port);
            panic!("transfer aborted");
        }));
        assert!(result.is_err());
        assert_eq!(port.log, vec![false, true]);
    }

    #[test]
    fn pcg_port_encodes_plane_and_line() {
        assert_eq!(pcg_port(Plane::Blue, 0), 0x1500);
        assert_eq!(pcg_port(Plane::Red, 0x3F), 0x163F);
        assert_eq!(pcg_port(Plane::Green, 7), 0x1707);
    }
}
