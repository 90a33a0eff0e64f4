// zlib stream glue over miniz_oxide.
//
// Inflates into a 32KB circular dictionary (wrapping-mode output) and hands
// the produced span back to the caller, who copies it into line buffers.
// All state lives in the caller's Workspace; nothing here allocates.

use miniz_oxide::inflate::TINFLStatus;
use miniz_oxide::inflate::core::{DecompressorOxide, decompress, inflate_flags};

use crate::error::PngError;
use crate::stream::FILE_BUF_SIZE;

/// miniz_oxide LZ dictionary size; must be a power of two >= 32768
pub const DICT_SIZE: usize = 32_768;

/// Fixed work area for one decode session: decompressor state, the LZ
/// dictionary and the file read window (~45KB in total).
pub struct Workspace {
    pub(crate) inflate: DecompressorOxide,
    pub(crate) dict: [u8; DICT_SIZE],
    pub(crate) file_buf: [u8; FILE_BUF_SIZE],
}

impl Workspace {
    /// Build in place. Large; prefer `boxed()` or a `static` on small stacks.
    pub fn new() -> Self {
        Self {
            inflate: DecompressorOxide::new(),
            dict: [0u8; DICT_SIZE],
            file_buf: [0u8; FILE_BUF_SIZE],
        }
    }

    /// Heap-allocate a zeroed workspace without staging it on the stack.
    #[cfg(feature = "alloc")]
    pub fn boxed() -> Result<alloc::boxed::Box<Self>, PngError> {
        use alloc::boxed::Box;

        let layout = core::alloc::Layout::new::<Workspace>();
        // all-zero is a valid Workspace: plain byte arrays plus a
        // decompressor that is re-initialised before every decode
        let ptr = unsafe { alloc::alloc::alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(PngError::NoBuffer);
        }
        let mut ws = unsafe { Box::from_raw(ptr as *mut Workspace) };
        ws.inflate.init();
        Ok(ws)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one inflate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// All offered input was used; feed more.
    NeedsInput,
    /// The window filled up; drain and call again.
    MoreOutput,
    /// End of the zlib stream.
    Done,
}

pub(crate) struct Inflater<'w> {
    decomp: &'w mut DecompressorOxide,
    dict: &'w mut [u8; DICT_SIZE],
    dict_pos: usize, // cumulative output position
    flags: u32,
}

impl<'w> Inflater<'w> {
    pub(crate) fn new(
        decomp: &'w mut DecompressorOxide,
        dict: &'w mut [u8; DICT_SIZE],
        verify_checksum: bool,
    ) -> Self {
        decomp.init();
        let flags = inflate_flags::TINFL_FLAG_PARSE_ZLIB_HEADER
            | inflate_flags::TINFL_FLAG_HAS_MORE_INPUT
            | if verify_checksum {
                inflate_flags::TINFL_FLAG_COMPUTE_ADLER32
            } else {
                inflate_flags::TINFL_FLAG_IGNORE_ADLER32
            };
        Self {
            decomp,
            dict,
            dict_pos: 0,
            flags,
        }
    }

    /// Inflate from `input`; returns (status, consumed, produced). The
    /// produced bytes are read back with `output()`.
    pub(crate) fn step(&mut self, input: &[u8]) -> Result<(Step, usize, usize), PngError> {
        let write_pos = self.dict_pos & (DICT_SIZE - 1);
        let (status, consumed, produced) =
            decompress(&mut *self.decomp, input, &mut self.dict[..], write_pos, self.flags);
        self.dict_pos += produced;

        let step = match status {
            TINFLStatus::Done => Step::Done,
            TINFLStatus::NeedsMoreInput => Step::NeedsInput,
            TINFLStatus::HasMoreOutput => {
                if consumed == 0 && produced == 0 {
                    log::warn!("png: decompression stalled");
                    return Err(PngError::DecodeError);
                }
                Step::MoreOutput
            }
            other => {
                log::warn!("png: IDAT decompression error ({:?})", other);
                return Err(PngError::DecodeError);
            }
        };
        Ok((step, consumed, produced))
    }

    /// The last `produced` bytes, as at most two contiguous runs.
    pub(crate) fn output(&self, produced: usize) -> (&[u8], &[u8]) {
        let start = (self.dict_pos - produced) & (DICT_SIZE - 1);
        let first = produced.min(DICT_SIZE - start);
        (
            &self.dict[start..start + first],
            &self.dict[..produced - first],
        )
    }
}
