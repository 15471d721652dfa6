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

    orchestrator.rs

    Drives slot selection and timed transfer over the whole glyph set.

*/

use crate::{
    glyph::{GlyphBitmap, BATCH_GLYPHS},
    selector::SlotSelector,
    transfer::GlyphTransfer,
};

/// Define all 256 PCG glyphs from `bitmap`.
///
/// For each of the 32 batches the slots are selected first, then the batch is transferred;
/// the two are never interleaved with another batch.
pub fn define_all<T>(target: &mut T, bitmap: &GlyphBitmap)
where
    T: SlotSelector + GlyphTransfer + ?Sized,
{
    for (index, batch) in bitmap.batches().enumerate() {
        let base_index = (index * BATCH_GLYPHS) as u8;
        log::debug!("Defining PCG batch {:2} (codes {:02X}-{:02X})", index, base_index, base_index + 7);
        target.select_slots(base_index);
        target.transfer(&batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{GlyphBatch, BATCH_COUNT, BATCH_SIZE, BITMAP_SIZE};

    #[derive(Debug, PartialEq)]
    enum Call {
        Select(u8),
        Transfer(Vec<u8>),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl SlotSelector for Recorder {
        fn select_slots(&mut self, base_index: u8) {
            self.calls.push(Call::Select(base_index));
        }
    }

    impl GlyphTransfer for Recorder {
        fn transfer(&mut self, batch: &GlyphBatch<'_>) {
            self.calls.push(Call::Transfer(batch.as_bytes().to_vec()));
        }
    }

    fn bitmap() -> (Vec<u8>, GlyphBitmap) {
        let data: Vec<u8> = (0..BITMAP_SIZE).map(|i| (i / 3 % 256) as u8 ^ (i % 3) as u8).collect();
        let bitmap = GlyphBitmap::from_bytes(&data).unwrap();
        (data, bitmap)
    }

    #[test]
    fn selects_then_transfers_each_batch() {
        let (data, bitmap) = bitmap();
        let mut recorder = Recorder::default();
        define_all(&mut recorder, &bitmap);

        assert_eq!(recorder.calls.len(), BATCH_COUNT * 2);
        for (i, pair) in recorder.calls.chunks_exact(2).enumerate() {
            assert_eq!(pair[0], Call::Select((i * 8) as u8));
            assert_eq!(pair[1], Call::Transfer(data[i * BATCH_SIZE..(i + 1) * BATCH_SIZE].to_vec()));
        }
    }

    #[test]
    fn base_indices_cover_all_codes_once() {
        let (_, bitmap) = bitmap();
        let mut recorder = Recorder::default();
        define_all(&mut recorder, &bitmap);

        let bases: Vec<u8> = recorder
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Select(b) => Some(*b),
                _ => None,
            })
            .collect();
        let expected: Vec<u8> = (0..=248u8).step_by(8).collect();
        assert_eq!(bases, expected);
    }
}
