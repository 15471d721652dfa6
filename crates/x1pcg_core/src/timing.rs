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

    timing.rs

    Z80 cycle accounting for the timed PCG transfer.

*/

//! The transfer loop must take exactly as long as one raster so that each line of PCG data is
//! written while the CRTC is addressing the next raster of the reserved rows. The reference loop
//! looks like this (T-states in brackets):
//!
//! ```text
//!   outi          ; blue          [16]
//!   ld   b, d                     [ 4]
//!   outi          ; red           [16]
//!   ld   b, e                     [ 4]
//!   outi          ; green         [16]
//!   ld   b, 16h                   [ 7]
//!   ex   af, af'                  [ 4]
//!   ld   a, n                     [ 7]
//! dly:
//!   dec  a                        [ 4]
//!   jp   nz, dly                  [10]
//!   ex   af, af'                  [ 4]
//!   inc  c                        [ 4]
//!   dec  a                        [ 4]
//!   jp   nz, setp                 [10]
//! ```
//!
//! With n = 11 that is 250 cycles, one raster at 4MHz and 15.98kHz.

/// Cost of an OUTI, charged by the port on each write.
pub const OUT_CYCLES: u32 = 16;
/// Cost of IN r,(C), charged by the port on each read.
pub const IN_CYCLES: u32 = 12;
/// Conditional absolute jump (taken or not).
pub const JP_CYCLES: u32 = 10;
/// EXX + EX AF,AF' after the sync wait, before the first line.
pub const SYNC_EXIT_CYCLES: u32 = 8;
/// Per-line overhead outside the three OUTIs and the delay loop body.
pub const LINE_OVERHEAD_CYCLES: u32 = 4 + 4 + 7 + 4 + 7 + 4 + 4 + 4 + 10;
/// One iteration of the delay loop (DEC A / JP NZ).
pub const DELAY_ITERATION_CYCLES: u32 = 4 + JP_CYCLES;

/// Reference per-line budget.
pub const DEFAULT_LINE_CYCLES: u32 = 250;

const FIXED_LINE_CYCLES: u32 = 3 * OUT_CYCLES + LINE_OVERHEAD_CYCLES;

/// Calibrated pacing of one transfer line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LineTiming {
    /// Iterations of the software delay loop per line.
    pub delay_iterations: u32,
}

impl Default for LineTiming {
    fn default() -> Self {
        LineTiming::calibrate(DEFAULT_LINE_CYCLES)
    }
}

impl LineTiming {
    /// Choose the delay loop count that brings a line as close to `budget` cycles as possible
    /// without exceeding it. A line can never be shorter than its fixed cost, so budgets below
    /// that get no delay at all and run over.
    pub fn calibrate(budget: u32) -> LineTiming {
        let delay_iterations = budget.saturating_sub(FIXED_LINE_CYCLES) / DELAY_ITERATION_CYCLES;
        let timing = LineTiming { delay_iterations };
        if timing.line_cycles() != budget {
            log::warn!(
                "Line budget of {} cycles cannot be met exactly; using {} cycles per line",
                budget,
                timing.line_cycles()
            );
        }
        timing
    }

    /// Total cycles of one line, I/O included.
    #[inline]
    pub fn line_cycles(&self) -> u32 {
        FIXED_LINE_CYCLES + self.delay_iterations * DELAY_ITERATION_CYCLES
    }

    /// Cycles to burn after the three plane writes of a line.
    #[inline]
    pub fn spin_cycles(&self) -> u32 {
        self.line_cycles() - 3 * OUT_CYCLES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_budget_is_exact() {
        let timing = LineTiming::calibrate(250);
        assert_eq!(timing.delay_iterations, 11);
        assert_eq!(timing.line_cycles(), 250);
        assert_eq!(timing.spin_cycles(), 250 - 48);
    }

    #[test]
    fn calibration_fits_within_feasible_budgets() {
        for budget in 96..400 {
            let timing = LineTiming::calibrate(budget);
            assert!(timing.line_cycles() <= budget);
            assert!(budget - timing.line_cycles() < DELAY_ITERATION_CYCLES);
        }
    }

    #[test]
    fn tiny_budget_gets_no_delay() {
        let timing = LineTiming::calibrate(10);
        assert_eq!(timing.delay_iterations, 0);
        assert_eq!(timing.line_cycles(), FIXED_LINE_CYCLES);
        assert!(timing.line_cycles() > 10);
    }
}
