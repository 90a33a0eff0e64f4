// Row conversion to a paletted / BGR output layout.
//
// Grayscale and indexed rows stay indexed: 1/2/4-bit samples become 4-bit
// indices (two per byte, high nibble first), 8/16-bit become one index per
// byte, and the palette carries the expanded gray ramp or the PLTE colours.
// Everything else becomes 24-bit BGR. Transparency keys and alpha are
// composited against one resolved background colour:
//   caller override > bKGD > 0x999999.
// For indexed images the alpha is folded into the palette once, so the
// per-row work is a plain copy.

use crate::decoder::Scanline;
use crate::header::ColorType;
use crate::meta::{Background, Palette, Rgb};

pub const DEFAULT_BACKGROUND: Rgb = Rgb::gray(0x99);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Two 4-bit palette indices per byte.
    Indexed4,
    /// One palette index per byte.
    Indexed8,
    /// Blue, green, red.
    Bgr24,
}

impl OutputFormat {
    pub fn for_image(color_type: ColorType, bit_depth: u8) -> Self {
        match color_type {
            ColorType::Grayscale | ColorType::Indexed if bit_depth < 8 => OutputFormat::Indexed4,
            ColorType::Grayscale | ColorType::Indexed => OutputFormat::Indexed8,
            _ => OutputFormat::Bgr24,
        }
    }

    #[inline]
    pub const fn bits_per_pixel(self) -> u16 {
        match self {
            OutputFormat::Indexed4 => 4,
            OutputFormat::Indexed8 => 8,
            OutputFormat::Bgr24 => 24,
        }
    }

    /// Unpadded output bytes for one row.
    #[inline]
    pub fn row_bytes(self, width: u32) -> usize {
        let w = width as usize;
        match self {
            OutputFormat::Indexed4 => (w + 1) / 2,
            OutputFormat::Indexed8 => w,
            OutputFormat::Bgr24 => w * 3,
        }
    }
}

/// Scale a 1/2/4-bit sample to 8 bits by repeating its bit pattern.
#[inline]
pub fn expand_bits(v: u8, bit_depth: u8) -> u8 {
    match bit_depth {
        1 => {
            if v & 1 != 0 {
                0xFF
            } else {
                0
            }
        }
        2 => (v & 0x03) * 0x55,
        4 => (v & 0x0F) * 0x11,
        _ => v,
    }
}

/// `(fg * a + bg * (255 - a)) >> 8`, exact at a = 0 and a = 255.
#[inline]
pub fn blend(fg: u8, bg: u8, alpha: u8) -> u8 {
    match alpha {
        255 => fg,
        0 => bg,
        a => ((fg as u16 * a as u16 + bg as u16 * (255 - a as u16)) >> 8) as u8,
    }
}

// raw 1/2/4-bit sample x from a packed row (MSB first)
#[inline]
fn unpack_sub_byte_raw(row: &[u8], x: usize, bit_depth: u8) -> u8 {
    let bpp = bit_depth as usize;
    let ppb = 8 / bpp; // pixels per byte
    let byte_idx = x / ppb;
    let bit_offset = (ppb - 1 - x % ppb) * bpp;
    let mask = (1u8 << bpp) - 1;
    (row[byte_idx] >> bit_offset) & mask
}

#[inline]
fn put_bgr(out: &mut [u8], x: usize, c: Rgb) {
    out[x * 3] = c.b;
    out[x * 3 + 1] = c.g;
    out[x * 3 + 2] = c.r;
}

pub struct Converter {
    override_bg: Option<Rgb>,
    format: OutputFormat,
    palette: [u8; 1024], // BGR0 quads
    palette_len: usize,
    bg: Rgb,
    key_gray: u8, // replaces 16-bit gray pixels matching the key
    prepared: bool,
}

impl Converter {
    pub const fn new() -> Self {
        Self::with_background(None)
    }

    pub const fn with_background(override_bg: Option<Rgb>) -> Self {
        Self {
            override_bg,
            format: OutputFormat::Bgr24,
            palette: [0u8; 1024],
            palette_len: 0,
            bg: DEFAULT_BACKGROUND,
            key_gray: 0x99,
            prepared: false,
        }
    }

    #[inline]
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    #[inline]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Output palette as BGR0 quads.
    #[inline]
    pub fn palette(&self) -> &[u8] {
        &self.palette[..self.palette_len * 4]
    }

    #[inline]
    pub fn palette_len(&self) -> usize {
        self.palette_len
    }

    /// Background used for keyed and translucent pixels.
    #[inline]
    pub fn background(&self) -> Rgb {
        self.bg
    }

    fn resolve_background(&self, bg: Option<Background>, palette: &Palette, bit_depth: u8) -> Rgb {
        if let Some(c) = self.override_bg {
            return c;
        }
        match bg {
            Some(Background::Rgb(c)) => c,
            Some(Background::Gray(v)) => Rgb::gray(expand_bits(v, bit_depth)),
            Some(Background::Index(i)) if (i as usize) < palette.len() => palette.rgb(i as usize),
            _ => DEFAULT_BACKGROUND,
        }
    }

    fn set_entry(&mut self, idx: usize, c: Rgb) {
        self.palette[idx * 4..idx * 4 + 4].copy_from_slice(&[c.b, c.g, c.r, 0]);
    }

    /// Build the output palette and resolve the background. Call once,
    /// with the first row; metadata is stable by then.
    pub fn prepare(&mut self, line: &Scanline<'_>) {
        let depth = line.bit_depth;
        self.format = OutputFormat::for_image(line.color_type, depth);
        self.bg = self.resolve_background(line.background, line.palette, depth);
        self.palette_len = 0;

        match line.color_type {
            ColorType::Grayscale => {
                let count = match depth {
                    1 => 2,
                    2 => 4,
                    4 => 16,
                    _ => 256,
                };
                for i in 0..count {
                    self.set_entry(i, Rgb::gray(expand_bits(i as u8, depth)));
                }
                self.palette_len = count;

                match line.trans.len() {
                    1 => {
                        let idx = line.trans[0] as usize;
                        if idx < count {
                            self.set_entry(idx, self.bg);
                        }
                    }
                    2 => {
                        // single gray byte stands in for the key colour
                        self.key_gray = match self.override_bg {
                            Some(c) => ((c.r as u16 + c.g as u16 + c.b as u16 + 1) / 3) as u8,
                            None => self.bg.r,
                        };
                    }
                    _ => {}
                }
            }
            ColorType::Indexed => {
                let count = line.palette.len();
                for i in 0..count {
                    self.set_entry(i, line.palette.rgb(i));
                }
                self.palette_len = count;

                if line.has_alpha {
                    let bg = self.bg;
                    for i in 0..count {
                        let a = line.palette.alpha(i);
                        if a == 255 {
                            continue;
                        }
                        let c = line.palette.rgb(i);
                        self.set_entry(
                            i,
                            Rgb::new(blend(c.r, bg.r, a), blend(c.g, bg.g, a), blend(c.b, bg.b, a)),
                        );
                    }
                }
            }
            _ => {}
        }

        self.prepared = true;
        log::debug!(
            "png: output {:?}, {} palette entries, background {:02x}{:02x}{:02x}",
            self.format,
            self.palette_len,
            self.bg.r,
            self.bg.g,
            self.bg.b
        );
    }

    /// Convert one row into `out` (at least `format().row_bytes(width)`
    /// bytes). Returns the bytes written.
    pub fn convert(&self, line: &Scanline<'_>, out: &mut [u8]) -> usize {
        let px = line.pixels;
        let w = line.width as usize;
        let depth = line.bit_depth;
        let bg = self.bg;

        match (line.color_type, depth) {
            (ColorType::Grayscale | ColorType::Indexed, 1 | 2) => {
                let n = OutputFormat::Indexed4.row_bytes(line.width);
                for (i, o) in out[..n].iter_mut().enumerate() {
                    let hi = unpack_sub_byte_raw(px, 2 * i, depth);
                    let lo = if 2 * i + 1 < w {
                        unpack_sub_byte_raw(px, 2 * i + 1, depth)
                    } else {
                        0
                    };
                    *o = (hi << 4) | lo;
                }
                n
            }
            (ColorType::Grayscale | ColorType::Indexed, 4 | 8) => {
                let n = line.pitch;
                out[..n].copy_from_slice(&px[..n]);
                n
            }
            (ColorType::Grayscale, _) => {
                // 16-bit: high byte, keyed pixels take the stand-in gray
                let keyed = line.trans.len() == 2;
                for x in 0..w {
                    let s = &px[x * 2..x * 2 + 2];
                    out[x] = if keyed && s == line.trans {
                        self.key_gray
                    } else {
                        s[0]
                    };
                }
                w
            }
            (ColorType::Truecolor, 8) => {
                let keyed = line.trans.len() == 3;
                for x in 0..w {
                    let s = &px[x * 3..x * 3 + 3];
                    let c = if keyed && s == line.trans {
                        bg
                    } else {
                        Rgb::new(s[0], s[1], s[2])
                    };
                    put_bgr(out, x, c);
                }
                w * 3
            }
            (ColorType::Truecolor, _) => {
                let keyed = line.trans.len() == 6;
                for x in 0..w {
                    let s = &px[x * 6..x * 6 + 6];
                    let c = if keyed && s == line.trans {
                        bg
                    } else {
                        Rgb::new(s[0], s[2], s[4])
                    };
                    put_bgr(out, x, c);
                }
                w * 3
            }
            (ColorType::GrayscaleAlpha, _) => {
                let step = if depth > 8 { 4 } else { 2 };
                for x in 0..w {
                    let v = px[x * step];
                    let a = px[x * step + step / 2];
                    put_bgr(
                        out,
                        x,
                        Rgb::new(blend(v, bg.r, a), blend(v, bg.g, a), blend(v, bg.b, a)),
                    );
                }
                w * 3
            }
            (ColorType::TruecolorAlpha, _) => {
                let ch = if depth > 8 { 2 } else { 1 };
                for x in 0..w {
                    let s = &px[x * ch * 4..];
                    let a = s[3 * ch];
                    put_bgr(
                        out,
                        x,
                        Rgb::new(
                            blend(s[0], bg.r, a),
                            blend(s[ch], bg.g, a),
                            blend(s[2 * ch], bg.b, a),
                        ),
                    );
                }
                w * 3
            }
            (ColorType::Indexed, _) => 0, // 16-bit indexed is rejected by the header parser
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{CHUNK_PLTE, CHUNK_TRNS, ImageHeader};
    use crate::meta::Metadata;
    use crate::testutil::ihdr_probe;

    fn line<'a>(
        color_type: ColorType,
        bit_depth: u8,
        width: u32,
        pixels: &'a [u8],
        palette: &'a Palette,
        trans: &'a [u8],
        background: Option<Background>,
    ) -> Scanline<'a> {
        Scanline {
            y: 0,
            width,
            height: 1,
            pitch: pixels.len(),
            color_type,
            bit_depth,
            has_alpha: color_type.has_alpha_channel(),
            trans,
            background,
            palette,
            pixels,
        }
    }

    #[test]
    fn expansion_tables() {
        assert_eq!(expand_bits(0, 1), 0x00);
        assert_eq!(expand_bits(1, 1), 0xFF);
        assert_eq!(
            [0, 1, 2, 3].map(|v| expand_bits(v, 2)),
            [0x00, 0x55, 0xAA, 0xFF]
        );
        assert_eq!(expand_bits(0x0A, 4), 0xAA);
        assert_eq!(expand_bits(0x0F, 4), 0xFF);
        assert_eq!(expand_bits(0x7B, 8), 0x7B);
    }

    #[test]
    fn blend_boundaries() {
        for fg in [0u8, 1, 77, 200, 255] {
            for bg in [0u8, 1, 99, 153, 255] {
                assert_eq!(blend(fg, bg, 255), fg);
                assert_eq!(blend(fg, bg, 0), bg);
                for a in [1u8, 64, 128, 200, 254] {
                    let out = blend(fg, bg, a);
                    let (lo, hi) = (fg.min(bg), fg.max(bg));
                    // the >> 8 divides by 256, so results may sit one below
                    assert!(out <= hi, "fg {} bg {} a {}", fg, bg, a);
                    assert!(out as u16 + 1 >= lo as u16, "fg {} bg {} a {}", fg, bg, a);
                }
            }
        }
    }

    #[test]
    fn one_bit_gray_repacks_to_nibbles() {
        let pal = Palette::new();
        // 4 pixels: 1,0,1,0
        let px = [0b1010_0000u8];
        let l = line(ColorType::Grayscale, 1, 4, &px, &pal, &[], None);
        let mut conv = Converter::new();
        conv.prepare(&l);
        assert_eq!(conv.format(), OutputFormat::Indexed4);
        assert_eq!(conv.palette(), &[0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0]);

        let mut out = [0u8; 4];
        let n = conv.convert(&l, &mut out);
        assert_eq!(&out[..n], &[0x10, 0x10]);

        // through the palette: 0xFF, 0x00, 0xFF, 0x00
        let gray: Vec<u8> = out[..n]
            .iter()
            .flat_map(|b| [b >> 4, b & 0x0F])
            .map(|i| conv.palette()[i as usize * 4])
            .collect();
        assert_eq!(gray, [0xFF, 0x00, 0xFF, 0x00]);
    }

    #[test]
    fn two_bit_gray_ramp_and_odd_width() {
        let pal = Palette::new();
        // 3 pixels: 3, 1, 2 (+ padding)
        let px = [0b11_01_10_00u8];
        let l = line(ColorType::Grayscale, 2, 3, &px, &pal, &[], None);
        let mut conv = Converter::new();
        conv.prepare(&l);
        assert_eq!(conv.palette_len(), 4);
        assert_eq!(conv.palette()[2 * 4], 0xAA);
        let mut out = [0u8; 2];
        assert_eq!(conv.convert(&l, &mut out), 2);
        assert_eq!(out, [0x31, 0x20]);
    }

    #[test]
    fn four_and_eight_bit_pass_through() {
        let pal = Palette::new();
        let px = [0x12u8, 0x34];
        let l = line(ColorType::Grayscale, 4, 4, &px, &pal, &[], None);
        let mut conv = Converter::new();
        conv.prepare(&l);
        assert_eq!(conv.palette_len(), 16);
        assert_eq!(conv.palette()[4 * 4], 0x44);
        let mut out = [0u8; 2];
        assert_eq!(conv.convert(&l, &mut out), 2);
        assert_eq!(out, px);

        let px = [5u8, 250, 17];
        let l = line(ColorType::Grayscale, 8, 3, &px, &pal, &[], None);
        conv.prepare(&l);
        assert_eq!(conv.format(), OutputFormat::Indexed8);
        assert_eq!(conv.palette_len(), 256);
        let mut out = [0u8; 3];
        assert_eq!(conv.convert(&l, &mut out), 3);
        assert_eq!(out, px);
    }

    #[test]
    fn gray_key_replaces_palette_entry() {
        let pal = Palette::new();
        let px = [0u8];
        let trans = [1u8];

        // bKGD gray 0 (raw 1-bit sample) -> expanded 0x00
        let l = line(
            ColorType::Grayscale,
            1,
            1,
            &px,
            &pal,
            &trans,
            Some(Background::Gray(0)),
        );
        let mut conv = Converter::new();
        conv.prepare(&l);
        assert_eq!(&conv.palette()[4..8], &[0, 0, 0, 0]);

        // no bKGD -> default gray
        let l = line(ColorType::Grayscale, 1, 1, &px, &pal, &trans, None);
        conv.prepare(&l);
        assert_eq!(&conv.palette()[4..8], &[0x99, 0x99, 0x99, 0]);

        // override wins, stored BGR
        let mut conv = Converter::with_background(Some(Rgb::new(1, 2, 3)));
        conv.prepare(&l);
        assert_eq!(&conv.palette()[4..8], &[3, 2, 1, 0]);
    }

    #[test]
    fn sixteen_bit_gray_key() {
        let pal = Palette::new();
        let px = [0x12u8, 0x34, 0x12, 0x35, 0xAB, 0xCD];
        let trans = [0x12u8, 0x34];
        let mut out = [0u8; 3];

        let l = line(ColorType::Grayscale, 16, 3, &px, &pal, &trans, None);
        let mut conv = Converter::new();
        conv.prepare(&l);
        assert_eq!(conv.convert(&l, &mut out), 3);
        assert_eq!(out, [0x99, 0x12, 0xAB]);

        let l = line(
            ColorType::Grayscale,
            16,
            3,
            &px,
            &pal,
            &trans,
            Some(Background::Gray(0x40)),
        );
        conv.prepare(&l);
        conv.convert(&l, &mut out);
        assert_eq!(out[0], 0x40);

        // override reduced to a third of its channel sum
        let mut conv = Converter::with_background(Some(Rgb::new(10, 20, 31)));
        conv.prepare(&l);
        conv.convert(&l, &mut out);
        assert_eq!(out[0], 20);
    }

    #[test]
    fn truecolor_reverses_channels_and_keys() {
        let pal = Palette::new();
        let px = [1u8, 2, 3, 10, 20, 30];
        let trans = [10u8, 20, 30];
        let l = line(
            ColorType::Truecolor,
            8,
            2,
            &px,
            &pal,
            &trans,
            Some(Background::Rgb(Rgb::new(0xA0, 0xB0, 0xC0))),
        );
        let mut conv = Converter::new();
        conv.prepare(&l);
        assert_eq!(conv.format(), OutputFormat::Bgr24);
        assert_eq!(conv.palette_len(), 0);
        let mut out = [0u8; 6];
        assert_eq!(conv.convert(&l, &mut out), 6);
        assert_eq!(out, [3, 2, 1, 0xC0, 0xB0, 0xA0]);
    }

    #[test]
    fn truecolor16_uses_high_bytes_and_full_key() {
        let pal = Palette::new();
        let px = [
            0x11, 0x01, 0x22, 0x02, 0x33, 0x03, //
            0x44, 0x00, 0x55, 0x00, 0x66, 0x00,
        ];
        // near-miss: high bytes match pixel 0 but low bytes differ
        let trans = [0x11u8, 0x01, 0x22, 0x02, 0x33, 0x04];
        let l = line(ColorType::Truecolor, 16, 2, &px, &pal, &trans, None);
        let mut conv = Converter::new();
        conv.prepare(&l);
        let mut out = [0u8; 6];
        conv.convert(&l, &mut out);
        assert_eq!(out, [0x33, 0x22, 0x11, 0x66, 0x55, 0x44]);

        let trans = [0x44u8, 0x00, 0x55, 0x00, 0x66, 0x00];
        let l = line(ColorType::Truecolor, 16, 2, &px, &pal, &trans, None);
        conv.prepare(&l);
        conv.convert(&l, &mut out);
        assert_eq!(&out[3..], &[0x99, 0x99, 0x99]);
    }

    #[test]
    fn rgba_composites_against_default() {
        let pal = Palette::new();
        let px = [200u8, 100, 50, 128];
        let l = line(
            ColorType::TruecolorAlpha,
            8,
            1,
            &px,
            &pal,
            &[],
            Some(Background::Rgb(DEFAULT_BACKGROUND)),
        );
        let mut conv = Converter::new();
        conv.prepare(&l);
        let mut out = [0u8; 3];
        conv.convert(&l, &mut out);
        let expect = |fg: u16| ((fg * 128 + 0x99 * 127) >> 8) as u8;
        assert_eq!(out, [expect(50), expect(100), expect(200)]);
        assert_eq!(out, [100, 125, 175]);
    }

    #[test]
    fn rgba16_and_gray_alpha_fast_paths() {
        let pal = Palette::new();
        let px = [
            0xF0, 0, 0xE0, 0, 0xD0, 0, 0xFF, 0xFF, //
            0x10, 0, 0x20, 0, 0x30, 0, 0x00, 0x00,
        ];
        let l = line(
            ColorType::TruecolorAlpha,
            16,
            2,
            &px,
            &pal,
            &[],
            Some(Background::Rgb(Rgb::new(1, 2, 3))),
        );
        let mut conv = Converter::new();
        conv.prepare(&l);
        let mut out = [0u8; 6];
        conv.convert(&l, &mut out);
        assert_eq!(out, [0xD0, 0xE0, 0xF0, 3, 2, 1]);

        let px = [0x80u8, 255, 0x80, 0];
        let l = line(
            ColorType::GrayscaleAlpha,
            8,
            2,
            &px,
            &pal,
            &[],
            Some(Background::Gray(0x20)),
        );
        conv.prepare(&l);
        conv.convert(&l, &mut out);
        assert_eq!(out, [0x80, 0x80, 0x80, 0x20, 0x20, 0x20]);

        let px = [0x80u8, 0x00, 0x40, 0x00];
        let l = line(ColorType::GrayscaleAlpha, 16, 1, &px, &pal, &[], None);
        conv.prepare(&l);
        let mut out = [0u8; 3];
        conv.convert(&l, &mut out);
        let v = blend(0x80, 0x99, 0x40);
        assert_eq!(out, [v, v, v]);
    }

    #[test]
    fn indexed_alpha_folds_into_palette() {
        let hdr = ImageHeader::parse(&ihdr_probe(3, 1, 8, 3, 0)).unwrap();
        let mut meta = Metadata::new();
        meta.reset(&hdr);
        meta.apply(CHUNK_PLTE, &[10, 20, 30, 40, 50, 60, 200, 0, 100], &hdr)
            .unwrap();
        meta.apply(CHUNK_TRNS, &[255, 128, 0], &hdr).unwrap();

        let px = [0u8, 1, 2];
        let mut l = line(ColorType::Indexed, 8, 3, &px, &meta.palette, &[], None);
        l.has_alpha = meta.has_alpha;
        let mut conv = Converter::new();
        conv.prepare(&l);
        assert_eq!(conv.format(), OutputFormat::Indexed8);
        assert_eq!(conv.palette_len(), 3);

        let pal = conv.palette();
        assert_eq!(&pal[0..4], &[30, 20, 10, 0]);
        assert_eq!(
            &pal[4..8],
            &[blend(60, 0x99, 128), blend(50, 0x99, 128), blend(40, 0x99, 128), 0]
        );
        // fully transparent entry shows the background
        assert_eq!(&pal[8..12], &[0x99, 0x99, 0x99, 0]);

        let mut out = [0u8; 3];
        assert_eq!(conv.convert(&l, &mut out), 3);
        assert_eq!(out, px);
    }

    #[test]
    fn indexed_background_looks_up_palette() {
        let hdr = ImageHeader::parse(&ihdr_probe(2, 1, 4, 3, 0)).unwrap();
        let mut meta = Metadata::new();
        meta.reset(&hdr);
        meta.apply(CHUNK_PLTE, &[1, 2, 3, 4, 5, 6], &hdr).unwrap();
        meta.apply(CHUNK_TRNS, &[0], &hdr).unwrap();

        let px = [0x01u8];
        let mut l = line(
            ColorType::Indexed,
            4,
            2,
            &px,
            &meta.palette,
            &[],
            Some(Background::Index(1)),
        );
        l.has_alpha = true;
        let mut conv = Converter::new();
        conv.prepare(&l);
        assert_eq!(conv.background(), Rgb::new(4, 5, 6));
        assert_eq!(&conv.palette()[0..4], &[6, 5, 4, 0]);

        // out-of-range index falls back to the default
        l.background = Some(Background::Index(9));
        conv.prepare(&l);
        assert_eq!(conv.background(), DEFAULT_BACKGROUND);
    }

    #[test]
    fn background_precedence() {
        let pal = Palette::new();
        let px = [0u8, 0];
        let bkgd = Some(Background::Gray(0x33));

        let l = line(ColorType::GrayscaleAlpha, 8, 1, &px, &pal, &[], bkgd);
        let conv_override = {
            let mut c = Converter::with_background(Some(Rgb::new(0x11, 0x22, 0x44)));
            c.prepare(&l);
            c
        };
        assert_eq!(conv_override.background(), Rgb::new(0x11, 0x22, 0x44));

        let mut c = Converter::new();
        c.prepare(&l);
        assert_eq!(c.background(), Rgb::gray(0x33));

        // what Metadata::reset installs when no bKGD was seen
        let l = line(
            ColorType::GrayscaleAlpha,
            8,
            1,
            &px,
            &pal,
            &[],
            Some(Background::Gray(0x99)),
        );
        c.prepare(&l);
        assert_eq!(c.background(), DEFAULT_BACKGROUND);
        let l = line(ColorType::GrayscaleAlpha, 8, 1, &px, &pal, &[], None);
        c.prepare(&l);
        assert_eq!(c.background(), DEFAULT_BACKGROUND);
    }
}
