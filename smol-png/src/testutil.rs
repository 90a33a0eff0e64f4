// Fixture builders shared by the unit tests.

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::convert::Converter;
use crate::decoder::{DecodeOptions, Decoder, Scanline, ScanlineSink};
use crate::error::PngError;
use crate::filter::filter_row;
use crate::header::{ColorType, HEADER_PROBE_LEN, ImageHeader, PNG_SIG};
use crate::inflate::Workspace;
use crate::source::SliceSource;

/// Signature + IHDR, exactly what the decoder probes first.
pub(crate) fn ihdr_probe(w: u32, h: u32, depth: u8, color: u8, interlace: u8) -> [u8; 33] {
    let mut p = [0u8; 33];
    p[..8].copy_from_slice(&PNG_SIG);
    p[8..12].copy_from_slice(&13u32.to_be_bytes());
    p[12..16].copy_from_slice(b"IHDR");
    p[16..20].copy_from_slice(&w.to_be_bytes());
    p[20..24].copy_from_slice(&h.to_be_bytes());
    p[24] = depth;
    p[25] = color;
    p[28] = interlace;
    p
}

/// One chunk with a zero CRC (never checked).
pub(crate) fn chunk(marker: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(payload.len() + 12);
    v.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    v.extend_from_slice(marker);
    v.extend_from_slice(payload);
    v.extend_from_slice(&[0; 4]);
    v
}

pub(crate) struct PngBuilder {
    width: u32,
    height: u32,
    depth: u8,
    color: u8,
    interlace: u8,
    pre: Vec<u8>,
    post: Vec<u8>,
    split: usize,
    filters: Vec<u8>,
}

impl PngBuilder {
    pub(crate) fn new(width: u32, height: u32, depth: u8, color: u8) -> Self {
        Self {
            width,
            height,
            depth,
            color,
            interlace: 0,
            pre: Vec::new(),
            post: Vec::new(),
            split: usize::MAX,
            filters: vec![0],
        }
    }

    pub(crate) fn interlaced(mut self) -> Self {
        self.interlace = 1;
        self
    }

    /// Chunk placed between IHDR and the first IDAT.
    pub(crate) fn chunk(mut self, marker: &[u8; 4], payload: &[u8]) -> Self {
        self.pre.extend(chunk(marker, payload));
        self
    }

    /// Chunk placed after the last IDAT.
    pub(crate) fn trailing(mut self, marker: &[u8; 4], payload: &[u8]) -> Self {
        self.post.extend(chunk(marker, payload));
        self
    }

    /// Split the zlib stream into IDAT chunks of at most `n` bytes.
    pub(crate) fn split(mut self, n: usize) -> Self {
        self.split = n.max(1);
        self
    }

    /// Filter tags used per row, cycled.
    pub(crate) fn filters(mut self, tags: &[u8]) -> Self {
        self.filters = tags.to_vec();
        self
    }

    pub(crate) fn row_len(&self) -> usize {
        let ch = ColorType::from_u8(self.color).map_or(1, ColorType::channels);
        (self.width as usize * ch * self.depth as usize).div_ceil(8)
    }

    fn bpp(&self) -> usize {
        let ch = ColorType::from_u8(self.color).map_or(1, ColorType::channels);
        (ch * self.depth as usize / 8).max(1)
    }

    /// Filter `rows` (raw, untagged) and wrap them into a full file.
    pub(crate) fn build(&self, rows: &[Vec<u8>]) -> Vec<u8> {
        let len = self.row_len();
        let bpp = self.bpp();
        let mut prev = vec![0u8; len];
        let mut data = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            let tag = self.filters[y % self.filters.len()];
            let mut out = vec![0u8; len];
            filter_row(tag, row, &prev, bpp, &mut out);
            data.push(tag);
            data.extend_from_slice(&out);
            prev.copy_from_slice(row);
        }
        self.build_stream(&data)
    }

    /// Wrap already filtered bytes (tags included).
    pub(crate) fn build_stream(&self, filtered: &[u8]) -> Vec<u8> {
        self.build_zlib(&compress_to_vec_zlib(filtered, 6))
    }

    /// Wrap a ready zlib stream.
    pub(crate) fn build_zlib(&self, z: &[u8]) -> Vec<u8> {
        let probe = ihdr_probe(self.width, self.height, self.depth, self.color, self.interlace);
        let mut file = probe.to_vec();
        file.extend_from_slice(&self.pre);
        for part in z.chunks(self.split.min(z.len().max(1))) {
            file.extend(chunk(b"IDAT", part));
        }
        file.extend_from_slice(&self.post);
        file.extend(chunk(b"IEND", &[]));
        file
    }
}

/// Rows of deterministic pseudo-random bytes.
pub(crate) fn noise_rows(height: u32, len: usize, seed: u32) -> Vec<Vec<u8>> {
    let mut s = seed.wrapping_mul(2_654_435_761).max(1);
    (0..height)
        .map(|_| {
            (0..len)
                .map(|_| {
                    s ^= s << 13;
                    s ^= s >> 17;
                    s ^= s << 5;
                    (s >> 24) as u8
                })
                .collect()
        })
        .collect()
}

/// Records everything it is handed, plus the converted output.
#[derive(Default)]
pub(crate) struct CollectSink {
    pub(crate) ys: Vec<u32>,
    pub(crate) rows: Vec<Vec<u8>>,
    pub(crate) converted: Vec<Vec<u8>>,
    pub(crate) conv: Converter,
    pub(crate) has_alpha: bool,
    pub(crate) trans: Vec<u8>,
    pub(crate) fail_at: Option<u32>,
}

impl ScanlineSink for CollectSink {
    fn draw(&mut self, line: &Scanline<'_>) -> Result<(), PngError> {
        if self.fail_at == Some(line.y) {
            return Err(PngError::IoError);
        }
        if line.y == 0 {
            self.conv.prepare(line);
            self.has_alpha = line.has_alpha;
            self.trans = line.trans.to_vec();
        }
        assert_eq!(line.pixels.len(), line.pitch);
        self.ys.push(line.y);
        self.rows.push(line.pixels.to_vec());
        let mut out = vec![0u8; self.conv.format().row_bytes(line.width)];
        let n = self.conv.convert(line, &mut out);
        out.truncate(n);
        self.converted.push(out);
        Ok(())
    }
}

/// Decode a whole in-memory file into a fresh `CollectSink`.
pub(crate) fn decode_all(png: &[u8], options: DecodeOptions) -> Result<CollectSink, PngError> {
    let line_len = ImageHeader::parse(&png[..png.len().min(HEADER_PROBE_LEN)])
        .map_or(1, |h| h.line_len());
    let mut a = vec![0u8; line_len];
    let mut b = vec![0u8; line_len];
    let mut ws = Workspace::boxed()?;
    let mut sink = CollectSink::default();
    let result = {
        let mut dec = Decoder::new(SliceSource::new(png), &mut *ws, &mut sink).with_options(options);
        dec.set_line_buffers(&mut a, &mut b);
        dec.decode()
    };
    result.map(|()| sink)
}
