//! Streaming decode session.
//!
//! A [`Decoder`] owns a byte source, a scanline sink and borrows a fixed
//! [`Workspace`] plus two caller-sized line buffers. `decode()` walks the
//! chunk stream, applies metadata chunks, pumps IDAT payloads through the
//! inflater one row at a time and hands every reconstructed row to the
//! sink. No allocation happens once the session is built.

use crate::error::PngError;
use crate::filter::unfilter_row;
use crate::header::{
    CHUNK_BKGD, CHUNK_IDAT, CHUNK_PLTE, CHUNK_TRNS, ColorType, ImageHeader, read_header,
};
use crate::inflate::{Inflater, Step, Workspace};
use crate::meta::{Background, Metadata, Palette};
use crate::source::ByteSource;
use crate::stream::{ChunkStream, FILE_BUF_SIZE};

/// One reconstructed row, as handed to a [`ScanlineSink`].
///
/// Borrowed views only; a sink must copy whatever it wants to keep.
pub struct Scanline<'a> {
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Bytes in `pixels`.
    pub pitch: usize,
    pub color_type: ColorType,
    /// Bits per channel.
    pub bit_depth: u8,
    /// Alpha channel, or a palette with tRNS alpha.
    pub has_alpha: bool,
    /// Transparency key in pixel byte layout (empty when unset).
    pub trans: &'a [u8],
    pub background: Option<Background>,
    pub palette: &'a Palette,
    /// Unfiltered row bytes, filter tag stripped.
    pub pixels: &'a [u8],
}

/// Receives rows in top-down order, exactly once each.
pub trait ScanlineSink {
    fn draw(&mut self, line: &Scanline<'_>) -> Result<(), PngError>;
}

impl<T: ScanlineSink + ?Sized> ScanlineSink for &mut T {
    fn draw(&mut self, line: &Scanline<'_>) -> Result<(), PngError> {
        (**self).draw(line)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Verify the zlib Adler-32 trailer.
    pub verify_checksum: bool,
    /// Fail on unknown filter tags instead of passing the row through.
    pub strict_filters: bool,
}

#[derive(Clone, Copy)]
enum ChunkState {
    AwaitMarker,
    Meta { marker: [u8; 4], len: usize },
    Idat { left: usize },
}

pub struct Decoder<'a, R, S> {
    src: R,
    sink: S,
    work: &'a mut Workspace,
    lines: Option<[&'a mut [u8]; 2]>,
    header: Option<ImageHeader>,
    meta: Metadata,
    options: DecodeOptions,
    last_error: Option<PngError>,
}

impl<'a, R: ByteSource, S: ScanlineSink> Decoder<'a, R, S> {
    pub fn new(src: R, work: &'a mut Workspace, sink: S) -> Self {
        Self {
            src,
            sink,
            work,
            lines: None,
            header: None,
            meta: Metadata::new(),
            options: DecodeOptions::default(),
            last_error: None,
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Supply the current/previous row buffers; each needs `line_len()` bytes.
    pub fn set_line_buffers(&mut self, a: &'a mut [u8], b: &'a mut [u8]) {
        self.lines = Some([a, b]);
    }

    /// Read the signature and IHDR.
    pub fn open(&mut self) -> Result<ImageHeader, PngError> {
        let result = self.read_header();
        self.last_error = result.err();
        result
    }

    fn read_header(&mut self) -> Result<ImageHeader, PngError> {
        let header = read_header(&mut self.src)?;
        self.meta.reset(&header);
        self.header = Some(header);
        log::debug!(
            "png: {}x{} depth {} {:?}, pitch {}",
            header.width,
            header.height,
            header.bit_depth,
            header.color_type,
            header.pitch
        );
        Ok(header)
    }

    #[inline]
    pub fn header(&self) -> Option<&ImageHeader> {
        self.header.as_ref()
    }

    /// Required size of each line buffer, once the header is known.
    #[inline]
    pub fn line_len(&self) -> Option<usize> {
        self.header.as_ref().map(ImageHeader::line_len)
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.meta.has_alpha
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.meta.palette
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    #[inline]
    pub fn last_error(&self) -> Option<PngError> {
        self.last_error
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Decode every row into the sink. May be called again to re-emit the
    /// image; each call starts over from the first chunk.
    pub fn decode(&mut self) -> Result<(), PngError> {
        let result = self.run();
        self.last_error = result.err();
        result
    }

    fn run(&mut self) -> Result<(), PngError> {
        let hdr = match self.header {
            Some(h) => h,
            None => self.read_header()?,
        };
        let line_len = hdr.line_len();
        let bpp = hdr.filter_bpp();

        let Some([a, b]) = self.lines.as_mut() else {
            return Err(PngError::NoBuffer);
        };
        if a.len() < line_len || b.len() < line_len {
            log::warn!("png: line buffers need {} bytes", line_len);
            return Err(PngError::NoBuffer);
        }
        let mut curr: &mut [u8] = &mut a[..line_len];
        let mut prev: &mut [u8] = &mut b[..line_len];
        prev.fill(0);

        self.meta.reset(&hdr);

        log::info!(
            "png: decoding {}x{} ({:?}, {} bit)",
            hdr.width,
            hdr.height,
            hdr.color_type,
            hdr.bit_depth
        );

        let Workspace {
            inflate,
            dict,
            file_buf,
        } = &mut *self.work;
        let mut stream = ChunkStream::new(&mut self.src, file_buf, 8);
        let mut inflater = Inflater::new(inflate, dict, self.options.verify_checksum);

        let mut state = ChunkState::AwaitMarker;
        let mut seen_idat = false;
        let mut warned_filter = false;
        let mut rows: u32 = 0;
        let mut fill: usize = 0; // bytes of the current row received so far

        while rows < hdr.height {
            match state {
                ChunkState::AwaitMarker => {
                    let (len, marker) = stream.chunk_header()?;
                    state = match marker {
                        CHUNK_IDAT => {
                            if !seen_idat {
                                self.meta.check_ready(&hdr)?;
                                seen_idat = true;
                            }
                            ChunkState::Idat { left: len }
                        }
                        CHUNK_PLTE | CHUNK_TRNS | CHUNK_BKGD if !seen_idat => {
                            ChunkState::Meta { marker, len }
                        }
                        _ => {
                            if matches!(marker, CHUNK_PLTE | CHUNK_TRNS | CHUNK_BKGD) {
                                log::warn!("png: {} after image data ignored", marker_str(&marker));
                            } else {
                                log::debug!("png: skip {} ({} bytes)", marker_str(&marker), len);
                            }
                            stream.advance(len + 4);
                            ChunkState::AwaitMarker
                        }
                    };
                }

                ChunkState::Meta { marker, len } => {
                    if stream.remaining() < len {
                        if len > FILE_BUF_SIZE {
                            log::warn!(
                                "png: {} of {} bytes exceeds read window",
                                marker_str(&marker),
                                len
                            );
                            return Err(PngError::DecodeError);
                        }
                        stream.refill(len)?;
                    }
                    log::debug!("png: {} ({} bytes)", marker_str(&marker), len);
                    self.meta.apply(marker, stream.peek(len), &hdr)?;
                    stream.advance(len + 4); // data + CRC
                    state = ChunkState::AwaitMarker;
                }

                ChunkState::Idat { left } => {
                    if left == 0 {
                        stream.advance(4); // CRC
                        state = ChunkState::AwaitMarker;
                        continue;
                    }
                    if stream.remaining() == 0 {
                        stream.refill(1)?;
                    }

                    let input = stream.peek(left);
                    let offered = input.len();
                    let (step, consumed, produced) = inflater.step(input)?;
                    stream.advance(consumed);
                    if step == Step::NeedsInput && consumed == 0 && produced == 0 && offered > 0 {
                        log::warn!("png: IDAT decompression stuck");
                        return Err(PngError::DecodeError);
                    }

                    // drain into the current row; a full row is defiltered,
                    // emitted and becomes the history for the next one
                    let (head, tail) = inflater.output(produced);
                    for mut run in [head, tail] {
                        while !run.is_empty() && rows < hdr.height {
                            let n = run.len().min(line_len - fill);
                            curr[fill..fill + n].copy_from_slice(&run[..n]);
                            fill += n;
                            run = &run[n..];
                            if fill < line_len {
                                continue;
                            }

                            let (tag, row) = curr.split_at_mut(1);
                            if !unfilter_row(tag[0], row, &prev[1..], bpp) {
                                if self.options.strict_filters {
                                    log::warn!("png: unknown filter {} on row {}", tag[0], rows);
                                    return Err(PngError::DecodeError);
                                }
                                if !warned_filter {
                                    log::warn!("png: unknown filter {} passed through", tag[0]);
                                    warned_filter = true;
                                }
                            }
                            emit_row(&mut self.sink, &hdr, &self.meta, rows, row)?;

                            core::mem::swap(&mut curr, &mut prev);
                            rows += 1;
                            fill = 0;
                        }
                    }

                    if step == Step::Done && rows < hdr.height {
                        log::warn!("png: stream ended after {} of {} rows", rows, hdr.height);
                        return Err(PngError::DecodeError);
                    }
                    state = ChunkState::Idat {
                        left: left - consumed,
                    };
                }
            }
        }

        log::debug!("png: {} rows decoded", rows);
        Ok(())
    }
}

fn emit_row<S: ScanlineSink>(
    sink: &mut S,
    hdr: &ImageHeader,
    meta: &Metadata,
    y: u32,
    pixels: &[u8],
) -> Result<(), PngError> {
    let line = Scanline {
        y,
        width: hdr.width,
        height: hdr.height,
        pitch: hdr.pitch,
        color_type: hdr.color_type,
        bit_depth: hdr.bit_depth,
        has_alpha: meta.has_alpha,
        trans: meta.trans(),
        background: meta.background,
        palette: &meta.palette,
        pixels,
    };
    sink.draw(&line)
}

#[inline]
fn marker_str(marker: &[u8; 4]) -> &str {
    core::str::from_utf8(marker).unwrap_or("????")
}
