//! Ancillary state gathered from PLTE, tRNS and bKGD while scanning chunks.

use crate::error::PngError;
use crate::header::{CHUNK_BKGD, CHUNK_PLTE, CHUNK_TRNS, ColorType, ImageHeader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Parse `RRGGBB` (an optional leading `#` is accepted).
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let v = u32::from_str_radix(s, 16).ok()?;
        Some(Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
    }
}

/// Background as recorded by bKGD, in the image's own terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Palette index (indexed images).
    Index(u8),
    /// Gray sample; raw sample value for depths below 8.
    Gray(u8),
    Rgb(Rgb),
}

/// Up to 256 RGB entries plus per-entry alpha (opaque unless tRNS says
/// otherwise).
#[derive(Clone)]
pub struct Palette {
    rgb: [u8; 768],
    alpha: [u8; 256],
    len: u16,
}

impl Palette {
    pub const fn new() -> Self {
        Self {
            rgb: [0u8; 768],
            alpha: [0xFF; 256],
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed RGB triples, `3 * len()` bytes.
    #[inline]
    pub fn rgb_bytes(&self) -> &[u8] {
        &self.rgb[..self.len() * 3]
    }

    #[inline]
    pub fn rgb(&self, idx: usize) -> Rgb {
        Rgb::new(self.rgb[idx * 3], self.rgb[idx * 3 + 1], self.rgb[idx * 3 + 2])
    }

    #[inline]
    pub fn alpha(&self, idx: usize) -> u8 {
        self.alpha[idx]
    }

    fn clear(&mut self) {
        self.len = 0;
        self.alpha.fill(0xFF);
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything besides the header that affects how rows are interpreted.
#[derive(Clone)]
pub struct Metadata {
    pub palette: Palette,
    // transparency key in pixel byte layout: 1 or 3 bytes for 8-bit
    // samples, 2 or 6 for 16-bit; 0 when unset (or indexed)
    trans: [u8; 6],
    trans_len: u8,
    trans_seen: bool,
    pub background: Option<Background>,
    pub has_alpha: bool,
}

impl Metadata {
    pub const fn new() -> Self {
        Self {
            palette: Palette::new(),
            trans: [0u8; 6],
            trans_len: 0,
            trans_seen: false,
            background: None,
            has_alpha: false,
        }
    }

    /// Forget previous chunks and install the colour-type defaults.
    pub fn reset(&mut self, hdr: &ImageHeader) {
        self.palette.clear();
        self.trans_len = 0;
        self.trans_seen = false;
        self.has_alpha = hdr.color_type.has_alpha_channel();
        self.background = match hdr.color_type {
            ColorType::Truecolor | ColorType::TruecolorAlpha => Some(Background::Rgb(Rgb::gray(0x99))),
            ColorType::GrayscaleAlpha => Some(Background::Gray(0x99)),
            ColorType::Grayscale | ColorType::Indexed => None,
        };
    }

    /// Raw transparency key bytes, empty when none applies.
    #[inline]
    pub fn trans(&self) -> &[u8] {
        &self.trans[..self.trans_len as usize]
    }

    /// Apply one fully buffered PLTE, tRNS or bKGD payload.
    pub fn apply(&mut self, marker: [u8; 4], data: &[u8], hdr: &ImageHeader) -> Result<(), PngError> {
        match marker {
            CHUNK_PLTE => self.apply_plte(data),
            CHUNK_TRNS => self.apply_trns(data, hdr),
            CHUNK_BKGD => {
                self.apply_bkgd(data, hdr);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn apply_plte(&mut self, data: &[u8]) -> Result<(), PngError> {
        if data.len() > 768 || data.len() % 3 != 0 {
            return Err(PngError::InvalidFile);
        }
        if !self.palette.is_empty() {
            log::warn!("png: duplicate PLTE ignored");
            return Ok(());
        }
        self.palette.rgb[..data.len()].copy_from_slice(data);
        self.palette.len = (data.len() / 3) as u16;
        log::debug!("png: palette with {} entries", self.palette.len);
        Ok(())
    }

    fn apply_trns(&mut self, data: &[u8], hdr: &ImageHeader) -> Result<(), PngError> {
        if self.trans_seen {
            log::warn!("png: duplicate tRNS ignored");
            return Ok(());
        }
        // high byte first for 16-bit samples; 8-bit keys live in the low byte
        let wide = hdr.is_wide();
        match hdr.color_type {
            ColorType::Indexed => {
                if self.palette.is_empty() {
                    // alpha entries only mean something against a palette
                    log::warn!("png: tRNS before PLTE ignored");
                    return Ok(());
                }
                if data.len() > 256 {
                    return Err(PngError::InvalidFile);
                }
                self.palette.alpha[..data.len()].copy_from_slice(data);
                self.has_alpha = true;
            }
            ColorType::Grayscale => {
                if data.len() != 2 {
                    return Err(PngError::InvalidFile);
                }
                if wide {
                    self.trans[..2].copy_from_slice(data);
                    self.trans_len = 2;
                } else {
                    self.trans[0] = data[1];
                    self.trans_len = 1;
                }
            }
            ColorType::Truecolor => {
                if data.len() != 6 {
                    return Err(PngError::InvalidFile);
                }
                if wide {
                    self.trans.copy_from_slice(data);
                    self.trans_len = 6;
                } else {
                    self.trans[0] = data[1];
                    self.trans[1] = data[3];
                    self.trans[2] = data[5];
                    self.trans_len = 3;
                }
            }
            ColorType::GrayscaleAlpha | ColorType::TruecolorAlpha => {
                log::warn!("png: tRNS on an alpha colour type ignored");
                return Ok(());
            }
        }
        self.trans_seen = true;
        Ok(())
    }

    fn apply_bkgd(&mut self, data: &[u8], hdr: &ImageHeader) {
        let lo = if hdr.is_wide() { 0 } else { 1 };
        self.background = match hdr.color_type {
            ColorType::Indexed if !data.is_empty() => Some(Background::Index(data[0])),
            ColorType::Grayscale | ColorType::GrayscaleAlpha if data.len() >= 2 => {
                Some(Background::Gray(data[lo]))
            }
            ColorType::Truecolor | ColorType::TruecolorAlpha if data.len() >= 6 => Some(
                Background::Rgb(Rgb::new(data[lo], data[2 + lo], data[4 + lo])),
            ),
            _ => {
                log::warn!("png: short bKGD ({} bytes) ignored", data.len());
                return;
            }
        };
    }

    /// Checks that must pass before the first row is decoded.
    pub fn check_ready(&self, hdr: &ImageHeader) -> Result<(), PngError> {
        if hdr.color_type == ColorType::Indexed && self.palette.is_empty() {
            log::warn!("png: indexed image without PLTE");
            return Err(PngError::DecodeError);
        }
        Ok(())
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}
