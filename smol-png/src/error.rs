//! Decode error codes.
//!
//! The discriminants are stable and small so they can cross an FFI or
//! process-exit boundary unchanged.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PngError {
    /// Bad caller-supplied argument (e.g. an unusable output geometry).
    InvalidParameter = 1,
    /// Chunk accounting, truncated or corrupt compressed data, missing palette.
    DecodeError = 2,
    /// The byte source failed to read or seek.
    IoError = 3,
    /// Line buffers missing or too small for the image pitch.
    NoBuffer = 4,
    /// Interlacing or reserved header flags.
    UnsupportedFeature = 5,
    /// Not a PNG, malformed header or malformed metadata chunk.
    InvalidFile = 6,
    /// Pitch would not fit a 16-bit length.
    ImageTooLarge = 7,
}

impl PngError {
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PngError::InvalidParameter => "png: invalid parameter",
            PngError::DecodeError => "png: decode error",
            PngError::IoError => "png: i/o error",
            PngError::NoBuffer => "png: line buffers not supplied",
            PngError::UnsupportedFeature => "png: unsupported feature",
            PngError::InvalidFile => "png: invalid file",
            PngError::ImageTooLarge => "png: image too large",
        }
    }
}

impl fmt::Display for PngError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}
