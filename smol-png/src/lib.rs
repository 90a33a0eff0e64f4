// smol-png: minimal no_std streaming PNG decoder.
// error:   result codes shared by every stage
// header:  signature + IHDR validation, row geometry
// source:  random-access byte sources (slice, read-at callback)
// stream:  fixed 2KB chunk window over the source
// inflate: miniz_oxide wrapping-window glue, decode workspace
// filter:  per-row filter reconstruction
// meta:    PLTE / tRNS / bKGD state
// decoder: chunk walk, row assembly, scanline callback
// convert: rows to 4/8-bit indexed or BGR, transparency composited

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod convert;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod header;
pub mod inflate;
pub mod meta;
pub mod source;
mod stream;

#[cfg(test)]
mod testutil;

pub use convert::{Converter, OutputFormat};
pub use decoder::{DecodeOptions, Decoder, Scanline, ScanlineSink};
pub use error::PngError;
pub use header::{ColorType, ImageHeader, read_header};
pub use inflate::Workspace;
pub use meta::{Background, Palette, Rgb};
pub use source::{ByteSource, ReadAtSource, SliceSource};
pub use stream::FILE_BUF_SIZE;
