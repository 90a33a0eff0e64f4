//! Byte sources the decoder pulls file data from.
//!
//! The decoder only ever seeks to an absolute offset and then reads
//! forward; short reads are fine, a zero-length read means end of data.

use crate::error::PngError;

pub trait ByteSource {
    /// Read up to `buf.len()` bytes at the current position.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, PngError>;

    /// Move to an absolute offset. Offsets past the end are allowed and
    /// make the next read return 0.
    fn seek(&mut self, pos: u64) -> Result<(), PngError>;

    /// Total size in bytes; used to reject chunks that overrun the file.
    fn size(&self) -> u64;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, PngError> {
        (**self).read(buf)
    }

    fn seek(&mut self, pos: u64) -> Result<(), PngError> {
        (**self).seek(pos)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

/// Fill `buf` as far as the source allows; returns bytes read.
pub(crate) fn read_full<R: ByteSource>(src: &mut R, buf: &mut [u8]) -> Result<usize, PngError> {
    let mut total = 0usize;
    while total < buf.len() {
        let n = src.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

/// A PNG held entirely in memory.
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, PngError> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<(), PngError> {
        self.pos = usize::try_from(pos).unwrap_or(usize::MAX);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Adapts a read-at-offset closure (SD card, flash, ZIP stored entry)
/// covering `size` bytes starting at `base`.
pub struct ReadAtSource<F> {
    read_fn: F,
    base: u32,
    size: u32,
    pos: u32,
}

impl<F, E> ReadAtSource<F>
where
    F: FnMut(u32, &mut [u8]) -> Result<usize, E>,
{
    pub fn new(read_fn: F, base: u32, size: u32) -> Self {
        Self {
            read_fn,
            base,
            size,
            pos: 0,
        }
    }
}

impl<F, E> ByteSource for ReadAtSource<F>
where
    F: FnMut(u32, &mut [u8]) -> Result<usize, E>,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, PngError> {
        if self.pos >= self.size {
            return Ok(0);
        }
        let want = buf.len().min((self.size - self.pos) as usize);
        let n = (self.read_fn)(self.base + self.pos, &mut buf[..want])
            .map_err(|_| PngError::IoError)?;
        self.pos += n as u32;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<(), PngError> {
        self.pos = u32::try_from(pos).unwrap_or(u32::MAX);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size as u64
    }
}
