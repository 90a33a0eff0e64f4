// png2bmp: PNG to Windows BMP conversion on top of smol-png.
// source: std::io file adapter for the decoder's byte source
// bmp:    bottom-up BMP writer, driven row by row as a scanline sink
// logger: stderr log backend, level from PNG2BMP_LOG
// cli:    argument parsing and the conversion pipeline

pub mod bmp;
pub mod cli;
pub mod logger;
pub mod source;
