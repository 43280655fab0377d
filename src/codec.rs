//! Owned wrappers over the native LZ4 frame API.
//!
//! Each session owns its native context and frees it in `Drop`, so every exit
//! path of the streams (success, error return, panic) releases it exactly once.
//! Nothing outside this module touches `unsafe`.

use crate::error::{Error, Result};
use crate::options::{BlockSizeClass, FrameOptions};
use lz4::liblz4::{
    BlockChecksum, BlockMode, BlockSize, ContentChecksum, FrameType, LZ4FCompressionContext,
    LZ4FDecompressionContext, LZ4FErrorCode, LZ4FFrameInfo, LZ4FPreferences,
    LZ4F_compressBegin, LZ4F_compressBound, LZ4F_compressEnd, LZ4F_compressUpdate,
    LZ4F_createCompressionContext, LZ4F_createDecompressionContext, LZ4F_decompress,
    LZ4F_freeCompressionContext, LZ4F_freeDecompressionContext, LZ4F_getErrorName,
    LZ4F_getFrameInfo, LZ4F_isError, LZ4F_VERSION,
};
use std::ffi::CStr;
use std::ptr;

/// Size of the smallest legal frame header: magic, FLG, BD and header checksum.
pub const MIN_HEADER_SIZE: usize = 7;

/// Largest frame header the format allows (content size and dictionary id present).
pub const MAX_HEADER_SIZE: usize = 19;

const FLG_CONTENT_SIZE: u8 = 0x08;
const FLG_DICT_ID: u8 = 0x01;

/// Header length announced by the FLG byte of a probed header.
///
/// `probe` must hold at least `MIN_HEADER_SIZE` bytes. Skippable frames and
/// foreign magic numbers fall through to the minimal size and are left for
/// the codec to reject.
pub fn header_len(probe: &[u8]) -> usize {
    let flg = probe.get(4).copied().unwrap_or(0);
    let mut len = MIN_HEADER_SIZE;
    if flg & FLG_CONTENT_SIZE != 0 {
        len += 8;
    }
    if flg & FLG_DICT_ID != 0 {
        len += 4;
    }
    len
}

/// Converts a native return code into a byte count or a named codec error.
fn check(code: LZ4FErrorCode, op: &'static str) -> Result<usize> {
    // SAFETY: LZ4F_isError and LZ4F_getErrorName accept any code value and
    // return a pointer to a static, NUL-terminated string.
    unsafe {
        if LZ4F_isError(code) != 0 {
            let name = CStr::from_ptr(LZ4F_getErrorName(code))
                .to_string_lossy()
                .into_owned();
            log::error!("LZ4 frame error during {}: {}", op, name);
            return Err(Error::codec(op, name));
        }
    }
    Ok(code as usize)
}

/// Worst-case compressed output for `input_len` bytes under `prefs`,
/// including anything the session may still hold buffered and the end mark.
pub fn compress_bound(input_len: usize, prefs: &LZ4FPreferences) -> usize {
    // SAFETY: pure computation over a valid preferences pointer.
    unsafe { LZ4F_compressBound(input_len, prefs) }
}

/// A native compression context plus the preferences it was begun with.
pub struct CompressionSession {
    ctx: LZ4FCompressionContext,
    prefs: LZ4FPreferences,
}

impl CompressionSession {
    pub fn new(options: &FrameOptions) -> Result<Self> {
        let mut ctx = LZ4FCompressionContext(ptr::null_mut());
        // SAFETY: the native call initialises `ctx` or reports an error.
        let code = unsafe { LZ4F_createCompressionContext(&mut ctx, LZ4F_VERSION) };
        check(code, "create compression context")?;
        Ok(Self {
            ctx,
            prefs: options.preferences(),
        })
    }

    pub fn bound(&self, input_len: usize) -> usize {
        compress_bound(input_len, &self.prefs)
    }

    /// Writes the frame header into `dst`, returning its length.
    pub fn begin(&mut self, dst: &mut [u8]) -> Result<usize> {
        // SAFETY: `dst` is valid for `dst.len()` bytes and the context is live.
        let code =
            unsafe { LZ4F_compressBegin(self.ctx, dst.as_mut_ptr(), dst.len(), &self.prefs) };
        check(code, "compress begin")
    }

    /// Compresses `src` into `dst`. May return 0 while input is being buffered.
    pub fn update(&mut self, dst: &mut [u8], src: &[u8]) -> Result<usize> {
        // SAFETY: both slices are valid for their lengths; null options are allowed.
        let code = unsafe {
            LZ4F_compressUpdate(
                self.ctx,
                dst.as_mut_ptr(),
                dst.len(),
                src.as_ptr(),
                src.len(),
                ptr::null(),
            )
        };
        check(code, "compress update")
    }

    /// Flushes buffered input and writes the end mark (and content checksum).
    pub fn end(&mut self, dst: &mut [u8]) -> Result<usize> {
        // SAFETY: `dst` is valid for `dst.len()` bytes; null options are allowed.
        let code =
            unsafe { LZ4F_compressEnd(self.ctx, dst.as_mut_ptr(), dst.len(), ptr::null()) };
        check(code, "compress end")
    }
}

impl Drop for CompressionSession {
    fn drop(&mut self) {
        // SAFETY: the context was created in `new` and is freed only here.
        let code = unsafe { LZ4F_freeCompressionContext(self.ctx) };
        let _ = check(code, "free compression context");
    }
}

/// Metadata parsed from a frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub block_size: BlockSizeClass,
    pub linked_blocks: bool,
    pub content_checksum: bool,
    pub block_checksum: bool,
    /// Declared decoded size, when the header carries one.
    pub content_size: Option<u64>,
    /// Header bytes the codec consumed.
    pub header_len: usize,
}

/// Outcome of one native decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStep {
    pub produced: usize,
    pub consumed: usize,
    /// False once the frame's end mark (and checksum) has been decoded.
    pub more_expected: bool,
}

/// A native decompression context.
pub struct DecompressionSession {
    ctx: LZ4FDecompressionContext,
    header_parsed: bool,
}

impl DecompressionSession {
    pub fn new() -> Result<Self> {
        let mut ctx = LZ4FDecompressionContext(ptr::null_mut());
        // SAFETY: the native call initialises `ctx` or reports an error.
        let code = unsafe { LZ4F_createDecompressionContext(&mut ctx, LZ4F_VERSION) };
        check(code, "create decompression context")?;
        Ok(Self {
            ctx,
            header_parsed: false,
        })
    }

    /// Parses the frame header held in `header`.
    pub fn frame_info(&mut self, header: &[u8]) -> Result<FrameInfo> {
        let mut info = LZ4FFrameInfo {
            block_size_id: BlockSize::Default,
            block_mode: BlockMode::Linked,
            content_checksum_flag: ContentChecksum::NoChecksum,
            frame_type: FrameType::Frame,
            content_size: 0,
            dict_id: 0,
            block_checksum_flag: BlockChecksum::NoBlockChecksum,
        };
        let mut consumed = header.len();
        // SAFETY: `header` is valid for `consumed` bytes and `info` is writable.
        let code =
            unsafe { LZ4F_getFrameInfo(self.ctx, &mut info, header.as_ptr(), &mut consumed) };
        check(code, "get frame info")?;

        let block_size = BlockSizeClass::from_class(info.block_size_id.clone() as u32)?;
        self.header_parsed = true;
        Ok(FrameInfo {
            block_size,
            linked_blocks: matches!(info.block_mode, BlockMode::Linked),
            content_checksum: matches!(
                info.content_checksum_flag,
                ContentChecksum::ChecksumEnabled
            ),
            block_checksum: matches!(
                info.block_checksum_flag,
                BlockChecksum::BlockChecksumEnabled
            ),
            content_size: (info.content_size != 0).then_some(info.content_size),
            header_len: consumed,
        })
    }

    /// Decodes as much of `src` into `dst` as the codec accepts in one call.
    pub fn decompress(&mut self, dst: &mut [u8], src: &[u8]) -> Result<DecodeStep> {
        if !self.header_parsed {
            return Err(Error::codec("decompress", "frame header not parsed"));
        }
        let mut produced = dst.len();
        let mut consumed = src.len();
        // SAFETY: both slices are valid for the sizes passed in; the codec
        // writes back how much of each it actually used.
        let code = unsafe {
            LZ4F_decompress(
                self.ctx,
                dst.as_mut_ptr(),
                &mut produced,
                src.as_ptr(),
                &mut consumed,
                ptr::null(),
            )
        };
        let hint = check(code, "decompress")?;
        Ok(DecodeStep {
            produced,
            consumed,
            more_expected: hint != 0,
        })
    }
}

impl Drop for DecompressionSession {
    fn drop(&mut self) {
        // SAFETY: the context was created in `new` and is freed only here.
        let code = unsafe { LZ4F_freeDecompressionContext(self.ctx) };
        let _ = check(code, "free decompression context");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(payload: &[u8], options: &FrameOptions) -> Vec<u8> {
        let mut session = CompressionSession::new(options).unwrap();
        let mut scratch = vec![0u8; session.bound(payload.len()).max(MAX_HEADER_SIZE)];
        let mut out = Vec::new();
        let n = session.begin(&mut scratch).unwrap();
        out.extend_from_slice(&scratch[..n]);
        let n = session.update(&mut scratch, payload).unwrap();
        out.extend_from_slice(&scratch[..n]);
        let n = session.end(&mut scratch).unwrap();
        out.extend_from_slice(&scratch[..n]);
        out
    }

    #[test]
    fn test_default_header_is_minimal() {
        let mut session = CompressionSession::new(&FrameOptions::default()).unwrap();
        let mut scratch = vec![0u8; MAX_HEADER_SIZE];
        assert_eq!(session.begin(&mut scratch).unwrap(), MIN_HEADER_SIZE);
        assert_eq!(header_len(&scratch), MIN_HEADER_SIZE);
    }

    #[test]
    fn test_frame_info_reports_block_size() {
        let options = FrameOptions::default().with_block_size(BlockSizeClass::Max256KB);
        let framed = frame(b"block size probe", &options);

        let mut session = DecompressionSession::new().unwrap();
        let info = session.frame_info(&framed[..MIN_HEADER_SIZE]).unwrap();
        assert_eq!(info.block_size, BlockSizeClass::Max256KB);
        assert_eq!(info.header_len, MIN_HEADER_SIZE);
        assert!(info.linked_blocks);
        assert_eq!(info.content_size, None);
    }

    #[test]
    fn test_decompress_before_header_is_rejected() {
        let mut session = DecompressionSession::new().unwrap();
        let mut dst = [0u8; 16];
        assert!(matches!(
            session.decompress(&mut dst, b"abc"),
            Err(Error::Codec { .. })
        ));
    }

    #[test]
    fn test_bad_magic_is_codec_error() {
        let mut session = DecompressionSession::new().unwrap();
        let result = session.frame_info(b"not lz4");
        assert!(matches!(result, Err(Error::Codec { op: "get frame info", .. })));
    }

    #[test]
    fn test_header_len_reads_flags() {
        let mut probe = [0u8; MIN_HEADER_SIZE];
        assert_eq!(header_len(&probe), 7);
        probe[4] = FLG_CONTENT_SIZE;
        assert_eq!(header_len(&probe), 15);
        probe[4] = FLG_CONTENT_SIZE | FLG_DICT_ID;
        assert_eq!(header_len(&probe), MAX_HEADER_SIZE);
    }

    #[test]
    fn test_content_size_header_is_read_in_full() {
        use crate::reader::FrameInputStream;
        use crate::traits::GreedyStream;

        let payload: Vec<u8> = (0..5_000u32).map(|i| (i % 97) as u8).collect();
        let mut session = CompressionSession::new(&FrameOptions::default()).unwrap();
        session.prefs.frame_info.content_size = payload.len() as u64;

        let mut scratch = vec![0u8; session.bound(payload.len()).max(MAX_HEADER_SIZE)];
        let mut framed = Vec::new();
        let n = session.begin(&mut scratch).unwrap();
        framed.extend_from_slice(&scratch[..n]);
        let n = session.update(&mut scratch, &payload).unwrap();
        framed.extend_from_slice(&scratch[..n]);
        let n = session.end(&mut scratch).unwrap();
        framed.extend_from_slice(&scratch[..n]);

        assert_eq!(framed[4], 0x48);
        assert_eq!(header_len(&framed), 15);

        for buffer_size in [1, 3, 64, 65_536] {
            let options = FrameOptions::default().with_buffer_size(buffer_size);
            let mut reader = FrameInputStream::new(&framed[..], options).unwrap();
            let mut out = Vec::new();
            reader.read_all(&mut out).unwrap();

            let info = reader.frame_info().unwrap();
            assert_eq!(info.header_len, 15, "buffer size {buffer_size}");
            assert_eq!(info.content_size, Some(payload.len() as u64));
            assert!(reader.is_finished());
            assert_eq!(reader.bytes_read(), framed.len() as u64);
            assert_eq!(out, payload, "buffer size {buffer_size}");
        }
    }
}
