// Uncompressed Windows BMP output as a scanline sink.
//
// Layout: 14-byte file header + 40-byte BITMAPINFOHEADER, palette as BGR0
// quads, then rows bottom-up, each padded to a multiple of 4 bytes. PNG rows
// arrive top-down, so every row is written at its own slot:
//   data_offset + (height - 1 - y) * stride
// The header and palette are written when row 0 arrives; by then all
// metadata chunks have been applied.

use std::io::{self, Seek, SeekFrom, Write};

use smol_png::{Converter, ImageHeader, OutputFormat, PngError, Rgb, Scanline, ScanlineSink};

pub const FILE_HEADER_LEN: usize = 14;
pub const INFO_HEADER_LEN: usize = 40;
pub const HEADER_LEN: usize = FILE_HEADER_LEN + INFO_HEADER_LEN;

/// Widest padded row the output may have.
pub const MAX_STRIDE: usize = 65534;

/// Padded output bytes per row.
#[inline]
pub fn stride(format: OutputFormat, width: u32) -> usize {
    (format.row_bytes(width) + 3) & !3
}

/// Padded BMP row size for an image.
pub fn output_stride(hdr: &ImageHeader) -> usize {
    stride(OutputFormat::for_image(hdr.color_type, hdr.bit_depth), hdr.width)
}

/// The 54 header bytes.
pub fn header_bytes(
    width: u32,
    height: u32,
    bits_per_pixel: u16,
    palette_entries: usize,
    stride: usize,
) -> Result<[u8; HEADER_LEN], PngError> {
    let data_offset = HEADER_LEN + 4 * palette_entries;
    let file_size = data_offset as u64 + height as u64 * stride as u64;
    let file_size = u32::try_from(file_size).map_err(|_| PngError::InvalidParameter)?;
    let w = i32::try_from(width).map_err(|_| PngError::InvalidParameter)?;
    let h = i32::try_from(height).map_err(|_| PngError::InvalidParameter)?;

    let mut hdr = [0u8; HEADER_LEN];
    hdr[0..2].copy_from_slice(b"BM");
    hdr[2..6].copy_from_slice(&file_size.to_le_bytes());
    // 6..10 reserved
    hdr[10..14].copy_from_slice(&(data_offset as u32).to_le_bytes());

    hdr[14..18].copy_from_slice(&(INFO_HEADER_LEN as u32).to_le_bytes());
    hdr[18..22].copy_from_slice(&w.to_le_bytes());
    hdr[22..26].copy_from_slice(&h.to_le_bytes()); // positive: bottom-up
    hdr[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    hdr[28..30].copy_from_slice(&bits_per_pixel.to_le_bytes());
    // 30..34 BI_RGB, 34..38 image size (may be 0 uncompressed),
    // 38..46 resolution left at 0
    hdr[46..50].copy_from_slice(&(palette_entries as u32).to_le_bytes());
    // 50..54 all colours important
    Ok(hdr)
}

pub struct BmpWriter<W> {
    out: W,
    conv: Converter,
    stride: usize,
    data_offset: u64,
    height: u32,
    line: Vec<u8>,
    rows: u32,
    io_error: Option<io::Error>,
}

impl<W: Write + Seek> BmpWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_background(out, None)
    }

    /// `background` replaces whatever the image itself specifies.
    pub fn with_background(out: W, background: Option<Rgb>) -> Self {
        Self {
            out,
            conv: Converter::with_background(background),
            stride: 0,
            data_offset: 0,
            height: 0,
            line: Vec::new(),
            rows: 0,
            io_error: None,
        }
    }

    /// Rows written by the last decode.
    #[inline]
    pub fn rows_written(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn converter(&self) -> &Converter {
        &self.conv
    }

    /// The underlying I/O failure behind the last `IoError`, if any.
    pub fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn begin(&mut self, line: &Scanline<'_>) -> Result<(), PngError> {
        self.conv.prepare(line);
        let format = self.conv.format();
        let stride = stride(format, line.width);
        if stride > MAX_STRIDE {
            log::warn!("bmp: output too wide ({} bytes per line)", stride);
            return Err(PngError::InvalidParameter);
        }

        let entries = self.conv.palette_len();
        let hdr = header_bytes(line.width, line.height, format.bits_per_pixel(), entries, stride)?;
        self.stride = stride;
        self.height = line.height;
        self.data_offset = (HEADER_LEN + 4 * entries) as u64;
        self.line.clear();
        self.line.resize(stride, 0);
        self.rows = 0;

        let palette = self.conv.palette();
        let written = self
            .out
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.out.write_all(&hdr))
            .and_then(|()| self.out.write_all(palette));
        self.io(written)?;

        log::info!(
            "bmp: {}x{}, {} bpp, {} palette entries, stride {}",
            line.width,
            line.height,
            format.bits_per_pixel(),
            entries,
            stride
        );
        Ok(())
    }

    fn io<T>(&mut self, r: io::Result<T>) -> Result<T, PngError> {
        r.map_err(|e| {
            log::warn!("bmp: write failed: {}", e);
            self.io_error = Some(e);
            PngError::IoError
        })
    }
}

impl<W: Write + Seek> ScanlineSink for BmpWriter<W> {
    fn draw(&mut self, line: &Scanline<'_>) -> Result<(), PngError> {
        if line.y == 0 {
            self.begin(line)?;
        } else if !self.conv.is_prepared() {
            return Err(PngError::InvalidParameter);
        }

        let n = self.conv.convert(line, &mut self.line);
        self.line[n..].fill(0);

        let slot = self.data_offset + (self.height - 1 - line.y) as u64 * self.stride as u64;
        let written = self
            .out
            .seek(SeekFrom::Start(slot))
            .and_then(|_| self.out.write_all(&self.line));
        self.io(written)?;
        self.rows += 1;
        Ok(())
    }
}
