// Fixed read window over the byte source.
//
// The window slides forward as chunks are consumed: unconsumed bytes move
// to the front, then the rest is refilled from the source. Skipping a chunk
// may push the consumed offset past the buffered bytes; the next refill
// then seeks ahead instead of reading the skipped payload.

use crate::error::PngError;
use crate::header::be_u32;
use crate::source::{ByteSource, read_full};

/// Size of the file read window.
pub const FILE_BUF_SIZE: usize = 2048;

// a chunk header (length + marker) must always fit after a refill
const MIN_REFILL: usize = 8;

pub(crate) struct ChunkStream<'w, R> {
    src: R,
    buf: &'w mut [u8; FILE_BUF_SIZE],
    valid: usize,  // bytes held in buf
    pos: usize,    // consumed offset; may exceed valid after a skip
    file_pos: u64, // file offset of buf[valid]
    file_size: u64,
}

impl<'w, R: ByteSource> ChunkStream<'w, R> {
    pub(crate) fn new(src: R, buf: &'w mut [u8; FILE_BUF_SIZE], start: u64) -> Self {
        let file_size = src.size();
        Self {
            src,
            buf,
            valid: 0,
            pos: 0,
            file_pos: start,
            file_size,
        }
    }

    /// Buffered, unconsumed bytes.
    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.valid.saturating_sub(self.pos)
    }

    /// Slide unconsumed bytes down and top the window up from the source.
    /// At least `need` (and never fewer than 8) bytes must be available
    /// afterwards.
    pub(crate) fn refill(&mut self, need: usize) -> Result<(), PngError> {
        let need = need.max(MIN_REFILL);
        let left = if self.pos < self.valid {
            let left = self.valid - self.pos;
            self.buf.copy_within(self.pos..self.valid, 0);
            left
        } else {
            // skipped past the buffered data; jump over the gap
            self.file_pos += (self.pos - self.valid) as u64;
            0
        };

        self.src.seek(self.file_pos)?;
        let n = read_full(&mut self.src, &mut self.buf[left..])?;
        self.file_pos += n as u64;
        self.valid = left + n;
        self.pos = 0;

        if self.valid < need {
            log::warn!(
                "png: ran out of data at offset {} ({} of {} bytes)",
                self.file_pos,
                self.valid,
                need
            );
            return Err(PngError::DecodeError);
        }
        Ok(())
    }

    /// Consume a chunk's length and marker. Lengths that cannot be a real
    /// chunk, or that run past the end of the source, are rejected.
    pub(crate) fn chunk_header(&mut self) -> Result<(usize, [u8; 4]), PngError> {
        if self.remaining() < 8 {
            self.refill(8)?;
        }
        let p = self.pos;
        let len = be_u32(&self.buf[..], p);
        let marker = [
            self.buf[p + 4],
            self.buf[p + 5],
            self.buf[p + 6],
            self.buf[p + 7],
        ];
        self.pos += 8;

        let data_start = self.file_pos - self.valid as u64 + self.pos as u64;
        if len > i32::MAX as u32 || data_start + len as u64 > self.file_size {
            log::warn!(
                "png: chunk {:?} length {} overruns file",
                core::str::from_utf8(&marker).unwrap_or("????"),
                len
            );
            return Err(PngError::DecodeError);
        }
        Ok((len as usize, marker))
    }

    /// Up to `max` buffered bytes, without consuming them.
    #[inline]
    pub(crate) fn peek(&self, max: usize) -> &[u8] {
        let n = self.remaining().min(max);
        &self.buf[self.pos..self.pos + n]
    }

    /// Consume `n` bytes; `n` may run past the buffered data (skips).
    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        self.pos += n;
    }
}
