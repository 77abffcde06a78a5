//! Growable byte arena for the encoder's incremental drain loop.
//!
//! The engine writes into whatever free space it is offered and reports
//! when it needs more; the arena doubles its capacity on that signal while
//! preserving already-written bytes and the write cursor, then the caller
//! re-derives the free tail and retries.

use crate::error::CodecError;

/// Starting capacity of the arena. Deliberately tiny so the doubling path
/// is exercised on every realistic encode.
pub(crate) const INITIAL_CAPACITY: usize = 64;

/// Byte arena with (capacity, logical length, write cursor) semantics.
pub(crate) struct OutputSink {
    buf: Vec<u8>,
    cursor: usize,
}

impl OutputSink {
    pub(crate) fn new() -> Self {
        Self {
            buf: vec![0; INITIAL_CAPACITY],
            cursor: 0,
        }
    }

    /// Free space past the write cursor.
    pub(crate) fn spare(&mut self) -> &mut [u8] {
        let cursor = self.cursor;
        &mut self.buf[cursor..]
    }

    /// Record that the engine committed `written` more bytes.
    pub(crate) fn advance(&mut self, written: usize) {
        debug_assert!(self.cursor + written <= self.buf.len());
        self.cursor += written;
    }

    /// Double the capacity, keeping written bytes and the cursor intact.
    pub(crate) fn grow(&mut self) -> Result<(), CodecError> {
        let target = self
            .buf
            .len()
            .checked_mul(2)
            .ok_or_else(|| CodecError::Allocation("output buffer size overflow".into()))?;
        self.buf
            .try_reserve_exact(target - self.buf.len())
            .map_err(|_| CodecError::Allocation(format!("{target} output bytes")))?;
        self.buf.resize(target, 0);
        Ok(())
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Truncate to exactly the bytes written and release excess capacity.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        self.buf.truncate(self.cursor);
        self.buf.shrink_to_fit();
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_preserves_bytes_and_cursor_across_doublings() {
        let mut sink = OutputSink::new();
        let mut expected = Vec::new();
        // Fill the free tail and grow, three times. Capacity doubles
        // 64 -> 128 -> 256 -> 512 while the tails filled are 64, 64 and 128
        // bytes (each doubling only opens up capacity - cursor bytes).
        for round in 0u8..3 {
            let free = sink.spare();
            let n = free.len();
            for (i, byte) in free.iter_mut().enumerate() {
                *byte = round.wrapping_mul(31).wrapping_add(i as u8);
            }
            expected.extend((0..n).map(|i| round.wrapping_mul(31).wrapping_add(i as u8)));
            sink.advance(n);
            sink.grow().unwrap();
        }
        assert_eq!(sink.capacity(), INITIAL_CAPACITY * 8);
        assert_eq!(sink.cursor(), 64 + 64 + 128);
        let out = sink.finish();
        assert_eq!(out.len(), expected.len());
        assert_eq!(out, expected);
    }

    #[test]
    fn finish_truncates_to_cursor() {
        let mut sink = OutputSink::new();
        sink.spare()[..5].copy_from_slice(b"jxl!!");
        sink.advance(5);
        let out = sink.finish();
        assert_eq!(out, b"jxl!!");
    }

    #[test]
    fn partial_writes_accumulate() {
        let mut sink = OutputSink::new();
        sink.spare()[..3].copy_from_slice(b"abc");
        sink.advance(3);
        sink.spare()[..2].copy_from_slice(b"de");
        sink.advance(2);
        assert_eq!(sink.cursor(), 5);
        assert_eq!(sink.finish(), b"abcde");
    }

    #[test]
    fn empty_finish_is_empty() {
        assert!(OutputSink::new().finish().is_empty());
    }
}
