// Host file access for the decoder.
// FileSource wraps anything Read + Seek (a File, a Cursor in tests) and
// records its length up front so chunk lengths can be checked against it.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use smol_png::{ByteSource, PngError};

pub struct FileSource<R = File> {
    inner: R,
    size: u64,
}

impl FileSource<File> {
    pub fn open(path: &Path) -> io::Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> FileSource<R> {
    pub fn new(mut inner: R) -> io::Result<Self> {
        let size = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, size })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for FileSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, PngError> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("read: {}", e);
                    return Err(PngError::IoError);
                }
            }
        }
    }

    fn seek(&mut self, pos: u64) -> Result<(), PngError> {
        self.inner.seek(SeekFrom::Start(pos)).map_err(|e| {
            log::warn!("seek to {}: {}", pos, e);
            PngError::IoError
        })?;
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}
