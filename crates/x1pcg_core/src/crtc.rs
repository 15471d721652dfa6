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

    crtc.rs

    HD46505 CRTC register programming.

*/

use strum_macros::{Display, EnumIter};

use crate::bus::{OutputPort, CRTC_ADDRESS_PORT, CRTC_DATA_PORT};

pub const CRTC_REGISTER_COUNT: usize = 18;

/// Visible rows in normal 80x25 operation.
pub const DEFAULT_ROWS: u8 = 25;
/// Visible rows while PCG definition is in progress. Rows from here down are the reserved region.
pub const DEFINITION_ROWS: u8 = 18;

#[derive(Copy, Clone, Debug, Display, EnumIter, Eq, PartialEq)]
pub enum CrtcRegister {
    HorizontalTotal = 0,
    HorizontalDisplayed = 1,
    HorizontalSyncPosition = 2,
    SyncWidth = 3,
    VerticalTotal = 4,
    VerticalTotalAdjust = 5,
    VerticalDisplayed = 6,
    VerticalSync = 7,
    InterlaceMode = 8,
    MaximumScanlineAddress = 9,
    CursorStartLine = 10,
    CursorEndLine = 11,
    StartAddressH = 12,
    StartAddressL = 13,
    CursorAddressH = 14,
    CursorAddressL = 15,
    LightPenH = 16,
    LightPenL = 17,
}

impl CrtcRegister {
    pub fn from_index(index: u8) -> Option<CrtcRegister> {
        use CrtcRegister::*;
        Some(match index {
            0 => HorizontalTotal,
            1 => HorizontalDisplayed,
            2 => HorizontalSyncPosition,
            3 => SyncWidth,
            4 => VerticalTotal,
            5 => VerticalTotalAdjust,
            6 => VerticalDisplayed,
            7 => VerticalSync,
            8 => InterlaceMode,
            9 => MaximumScanlineAddress,
            10 => CursorStartLine,
            11 => CursorEndLine,
            12 => StartAddressH,
            13 => StartAddressL,
            14 => CursorAddressH,
            15 => CursorAddressL,
            16 => LightPenH,
            17 => LightPenL,
            _ => return None,
        })
    }
}

/// Select a CRTC register and write a value to it. CRTC registers are write-only.
pub fn write_register<P: OutputPort + ?Sized>(port: &mut P, reg: CrtcRegister, value: u8) {
    log::debug!("CRTC: {} <- {}", reg, value);
    port.write_u8(CRTC_ADDRESS_PORT, reg as u8);
    port.write_u8(CRTC_DATA_PORT, value);
}

/// Set the number of visible character rows.
pub fn set_rows<P: OutputPort + ?Sized>(port: &mut P, rows: u8) {
    write_register(port, CrtcRegister::VerticalDisplayed, rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn register_indices_round_trip() {
        for reg in CrtcRegister::iter() {
            assert_eq!(CrtcRegister::from_index(reg as u8), Some(reg));
        }
        assert_eq!(CrtcRegister::from_index(CRTC_REGISTER_COUNT as u8), None);
    }
}
