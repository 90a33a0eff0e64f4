//! Signature and IHDR parsing, plus the chunk markers the decoder acts on.

use crate::error::PngError;
use crate::source::{ByteSource, read_full};

pub const PNG_SIG: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

pub const CHUNK_IHDR: [u8; 4] = *b"IHDR";
pub const CHUNK_PLTE: [u8; 4] = *b"PLTE";
pub const CHUNK_TRNS: [u8; 4] = *b"tRNS";
pub const CHUNK_BKGD: [u8; 4] = *b"bKGD";
pub const CHUNK_IDAT: [u8; 4] = *b"IDAT";

/// Rows must stay addressable with a 16-bit length.
pub const MAX_PITCH: usize = 65534;

/// Bytes needed to parse the header: signature, chunk header, IHDR body, CRC.
pub const HEADER_PROBE_LEN: usize = 8 + 8 + 13 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorType {
    Grayscale = 0,
    Truecolor = 2,
    Indexed = 3,
    GrayscaleAlpha = 4,
    TruecolorAlpha = 6,
}

impl ColorType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(ColorType::Grayscale),
            2 => Some(ColorType::Truecolor),
            3 => Some(ColorType::Indexed),
            4 => Some(ColorType::GrayscaleAlpha),
            6 => Some(ColorType::TruecolorAlpha),
            _ => None,
        }
    }

    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            ColorType::Grayscale | ColorType::Indexed => 1,
            ColorType::GrayscaleAlpha => 2,
            ColorType::Truecolor => 3,
            ColorType::TruecolorAlpha => 4,
        }
    }

    #[inline]
    pub const fn has_alpha_channel(self) -> bool {
        matches!(self, ColorType::GrayscaleAlpha | ColorType::TruecolorAlpha)
    }
}

/// Image geometry from IHDR; fixed for the whole decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: ColorType,
    /// Bytes per unfiltered scanline, without the filter tag.
    pub pitch: usize,
}

impl ImageHeader {
    /// Parse the signature and IHDR from the first bytes of the file.
    pub fn parse(s: &[u8]) -> Result<Self, PngError> {
        if s.len() < HEADER_PROBE_LEN || s[..8] != PNG_SIG {
            return Err(PngError::InvalidFile);
        }
        if be_u32(s, 8) < 13 || s[12..16] != CHUNK_IHDR {
            return Err(PngError::InvalidFile);
        }

        let width = be_u32(s, 16);
        let height = be_u32(s, 20);
        let bit_depth = s[24];
        let raw_color = s[25];

        // compression, filter method, interlace
        if s[26] != 0 || s[27] != 0 || s[28] != 0 {
            return Err(PngError::UnsupportedFeature);
        }
        if width == 0 || height == 0 {
            return Err(PngError::InvalidFile);
        }

        let color_type = ColorType::from_u8(raw_color).ok_or(PngError::InvalidFile)?;
        match (color_type, bit_depth) {
            (ColorType::Grayscale, 1 | 2 | 4 | 8 | 16) => {}
            (ColorType::Indexed, 1 | 2 | 4 | 8) => {}
            (ColorType::Truecolor, 8 | 16) => {}
            (ColorType::GrayscaleAlpha, 8 | 16) => {}
            (ColorType::TruecolorAlpha, 8 | 16) => {}
            _ => return Err(PngError::InvalidFile),
        }

        let bits = width as u64 * color_type.channels() as u64 * bit_depth as u64;
        let pitch = bits.div_ceil(8);
        if pitch >= MAX_PITCH as u64 {
            return Err(PngError::ImageTooLarge);
        }

        Ok(Self {
            width,
            height,
            bit_depth,
            color_type,
            pitch: pitch as usize,
        })
    }

    /// Back-reference distance for the Sub/Average/Paeth filters.
    #[inline]
    pub fn filter_bpp(&self) -> usize {
        if self.pitch <= self.width as usize {
            1
        } else {
            self.pitch / self.width as usize
        }
    }

    /// Line buffer size: filter tag plus pitch.
    #[inline]
    pub fn line_len(&self) -> usize {
        self.pitch + 1
    }

    /// 16-bit samples store the significant byte first.
    #[inline]
    pub fn is_wide(&self) -> bool {
        self.bit_depth > 8
    }
}

/// Read and validate the signature and IHDR at the start of `src`.
pub fn read_header<R: ByteSource>(src: &mut R) -> Result<ImageHeader, PngError> {
    let mut probe = [0u8; HEADER_PROBE_LEN];
    src.seek(0)?;
    let n = read_full(src, &mut probe)?;
    ImageHeader::parse(&probe[..n])
}

// big-endian u32 (PNG uses network byte order)
#[inline]
pub(crate) fn be_u32(d: &[u8], o: usize) -> u32 {
    u32::from_be_bytes([d[o], d[o + 1], d[o + 2], d[o + 3]])
}
