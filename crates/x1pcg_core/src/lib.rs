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

    lib.rs

    PCG definition core

*/

//! Core library for programming the programmable character generator (PCG)
//! of the Sharp X1 video adapter.
//!
//! The PCG holds 256 user-defined 8x8 glyphs, each in three colour planes.
//! The adapter has no direct addressing for PCG RAM; instead, a write to one
//! of the three plane ports lands in the slot whose character code the CRTC
//! is currently scanning. We exploit this by parking eight codes in rows that
//! are off-screen, then streaming a batch of eight glyphs during vertical
//! blank with cycle-counted pacing so each raster picks up the next line.
//!
//! The hardware is reached through the [bus::OutputPort] trait. The crate
//! ships an emulated adapter ([devices::x1::X1Video]) and a recording port
//! ([devices::recorder::RecordingPort]) so the protocol can be exercised off
//! hardware.

pub mod bus;
pub mod convert;
pub mod crtc;
pub mod devices;
pub mod display;
pub mod error;
pub mod glyph;
pub mod orchestrator;
pub mod preview;
pub mod selector;
pub mod timing;
pub mod transfer;
pub mod vram;

pub use crate::{
    display::DisplayContext,
    error::PcgError,
    glyph::{Glyph, GlyphBatch, GlyphBitmap, Plane, ScanLine},
    preview::PreviewMode,
};
