// Per-column staging of samples and their flush to the column's file region
use std::io::{Seek, SeekFrom, Write};

use tracing::trace;

use crate::error::Vb2Error;
use crate::probe::Probe;

/// Staging area for one column.
///
/// The buffer holds `threshold` bytes of nominal capacity plus `slack` bytes
/// (the largest accepted variable width). A sample is always copied before
/// the fill level is checked, so the slack absorbs the last sample of a page.
pub(crate) struct ColumnBuffer {
    data: Box<[u8]>,
    threshold: usize,
    fill: usize,
    /// File position the next flush writes to.
    write_cursor: u64,
}

impl ColumnBuffer {
    pub(crate) fn new(threshold: usize, slack: usize) -> Result<Self, Vb2Error> {
        let capacity = threshold.checked_add(slack).ok_or_else(|| {
            Vb2Error::InvalidArgument(format!(
                "column buffer of {} + {} bytes overflows",
                threshold, slack
            ))
        })?;
        Ok(ColumnBuffer {
            data: vec![0u8; capacity].into_boxed_slice(),
            threshold,
            fill: 0,
            write_cursor: 0,
        })
    }

    /// Copies one sample from `probe` behind the current fill level.
    ///
    /// Returns `true` when the buffer reached its nominal capacity and must be
    /// flushed before the next sample.
    pub(crate) fn push(&mut self, probe: &dyn Probe, width: usize) -> Result<bool, Vb2Error> {
        let end = self.fill + width;
        if end > self.data.len() {
            // only reachable when a previous flush of this buffer failed
            return Err(Vb2Error::PreconditionViolation(format!(
                "column buffer holds {} unflushed bytes after a failed write",
                self.fill
            )));
        }
        probe.read_into(&mut self.data[self.fill..end]);
        self.fill = end;
        Ok(self.is_full())
    }

    pub(crate) fn is_full(&self) -> bool {
        self.fill >= self.threshold
    }

    /// Writes the staged bytes at the write cursor and empties the buffer.
    /// Returns the number of bytes written.
    pub(crate) fn flush<W: Write + Seek>(&mut self, out: &mut W) -> Result<usize, Vb2Error> {
        if self.fill == 0 {
            return Ok(0);
        }
        out.seek(SeekFrom::Start(self.write_cursor))?;
        out.write_all(&self.data[..self.fill])?;
        let written = self.fill;
        trace!(bytes = written, at = self.write_cursor, "flushed column buffer");
        self.write_cursor += written as u64;
        self.fill = 0;
        Ok(written)
    }

    /// Drops any staged bytes and rewinds the write cursor to `offset`.
    pub(crate) fn reset(&mut self, offset: u64) {
        self.fill = 0;
        self.write_cursor = offset;
    }

    #[cfg(test)]
    pub(crate) fn fill(&self) -> usize {
        self.fill
    }

    #[cfg(test)]
    pub(crate) fn write_cursor(&self) -> u64 {
        self.write_cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Cursor;

    #[test]
    fn flushes_once_page_is_reached() -> Result<(), Vb2Error> {
        let value = Cell::new(0u32);
        let mut buffer = ColumnBuffer::new(8, 8)?;
        buffer.reset(4);
        let mut out = Cursor::new(vec![0u8; 16]);

        value.set(0xAABBCCDD);
        assert!(!buffer.push(&value, 4)?);
        value.set(0x11223344);
        assert!(buffer.push(&value, 4)?);
        assert_eq!(buffer.flush(&mut out)?, 8);

        assert_eq!(buffer.fill(), 0);
        assert_eq!(buffer.write_cursor(), 12);
        let bytes = out.into_inner();
        assert_eq!(&bytes[4..8], &0xAABBCCDDu32.to_le_bytes());
        assert_eq!(&bytes[8..12], &0x11223344u32.to_le_bytes());
        Ok(())
    }

    #[test]
    fn slack_absorbs_sample_crossing_the_page() -> Result<(), Vb2Error> {
        let value = Cell::new(1.0f64);
        let mut buffer = ColumnBuffer::new(12, 8)?;
        assert!(!buffer.push(&value, 8)?);
        // 16 bytes staged, past the 12-byte page but inside the slack
        assert!(buffer.push(&value, 8)?);
        assert_eq!(buffer.fill(), 16);
        Ok(())
    }

    #[test]
    fn empty_flush_does_not_touch_the_writer() -> Result<(), Vb2Error> {
        let mut buffer = ColumnBuffer::new(8, 8)?;
        buffer.reset(100);
        let mut out = Cursor::new(Vec::new());
        assert_eq!(buffer.flush(&mut out)?, 0);
        assert!(out.get_ref().is_empty());
        assert_eq!(buffer.write_cursor(), 100);
        Ok(())
    }

    #[test]
    fn overflowing_capacity_is_rejected() {
        assert!(matches!(
            ColumnBuffer::new(usize::MAX, 8),
            Err(Vb2Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn unflushed_full_buffer_refuses_more_samples() {
        let value = Cell::new(0u64);
        let mut buffer = ColumnBuffer::new(8, 8).unwrap();
        assert!(buffer.push(&value, 8).unwrap());
        assert!(buffer.push(&value, 8).unwrap());
        assert!(matches!(
            buffer.push(&value, 8),
            Err(Vb2Error::PreconditionViolation(_))
        ));
    }
}
