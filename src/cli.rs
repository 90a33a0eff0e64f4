// png2bmp command line: argument parsing and the decode -> BMP pipeline.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;
use smol_png::{DecodeOptions, Decoder, PngError, Rgb, Workspace, read_header};

use crate::bmp::{self, BmpWriter};
use crate::source::FileSource;

/// Convert a PNG image into an uncompressed Windows BMP.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "png2bmp", version)]
pub struct Args {
    /// PNG file to read
    pub input: PathBuf,

    /// BMP file to create
    pub output: PathBuf,

    /// Background for transparent pixels, replacing the image's own
    #[arg(short = 'b', value_name = "RRGGBB", value_parser = parse_hex)]
    pub background: Option<Rgb>,
}

fn parse_hex(s: &str) -> Result<Rgb, String> {
    Rgb::from_hex(s).ok_or_else(|| format!("'{}' is not a RRGGBB hex colour", s))
}

#[derive(Debug)]
pub enum Failure {
    /// `--help` / `--version` output; not an error.
    Help(String),
    Usage(String),
    Input(PathBuf, io::Error),
    Output(PathBuf, io::Error),
    /// Padded BMP row would exceed 16 bits.
    TooWide(usize),
    Png(PngError),
}

impl Failure {
    pub fn exit_code(&self) -> u8 {
        match self {
            Failure::Help(_) => 0,
            Failure::Usage(_) | Failure::Input(..) => 1,
            Failure::Output(..) => 2,
            Failure::TooWide(_) => 3,
            Failure::Png(_) => 4,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Help(text) | Failure::Usage(text) => f.write_str(text.trim_end()),
            Failure::Input(path, e) => write!(f, "open ({}): {}", path.display(), e),
            Failure::Output(path, e) => write!(f, "write ({}): {}", path.display(), e),
            Failure::TooWide(stride) => {
                write!(f, "BMP output too wide ({} bytes per line)", stride)
            }
            Failure::Png(e) => write!(f, "PNG error {}: {}", e.code(), e.as_str()),
        }
    }
}

impl From<PngError> for Failure {
    fn from(e: PngError) -> Self {
        Failure::Png(e)
    }
}

impl From<clap::Error> for Failure {
    fn from(e: clap::Error) -> Self {
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Failure::Help(e.to_string()),
            _ => Failure::Usage(e.to_string()),
        }
    }
}

/// Parse arguments, program name excluded.
pub fn parse_args<I>(args: I) -> Result<Args, Failure>
where
    I: IntoIterator<Item = String>,
{
    let argv = std::iter::once("png2bmp".to_string()).chain(args);
    Ok(Args::try_parse_from(argv)?)
}

/// Convert `args.input` into `args.output`. The output file is only
/// created once the PNG header has been validated.
pub fn run(args: &Args) -> Result<(), Failure> {
    let mut src =
        FileSource::open(&args.input).map_err(|e| Failure::Input(args.input.clone(), e))?;

    let hdr = read_header(&mut src)?;
    let stride = bmp::output_stride(&hdr);
    if stride > bmp::MAX_STRIDE {
        return Err(Failure::TooWide(stride));
    }
    let line_len = hdr.line_len();

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&args.output)
        .map_err(|e| Failure::Output(args.output.clone(), e))?;
    let sink = BmpWriter::with_background(BufWriter::new(file), args.background);

    let mut ws = Workspace::boxed()?;
    let mut a = vec![0u8; line_len];
    let mut b = vec![0u8; line_len];
    let mut dec = Decoder::new(src, &mut *ws, sink).with_options(DecodeOptions::default());
    dec.set_line_buffers(&mut a, &mut b);

    let result = dec.decode();
    let mut sink = dec.into_sink();
    match result {
        Ok(()) => {}
        Err(PngError::IoError) => {
            if let Some(e) = sink.take_io_error() {
                return Err(Failure::Output(args.output.clone(), e));
            }
            return Err(Failure::Png(PngError::IoError));
        }
        Err(e) => return Err(Failure::Png(e)),
    }

    sink.into_inner()
        .flush()
        .map_err(|e| Failure::Output(args.output.clone(), e))?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}
