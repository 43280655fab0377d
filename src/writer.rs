//! A streaming LZ4 frame compressor over any `WriteableStream`.

use crate::codec::{CompressionSession, MAX_HEADER_SIZE};
use crate::error::{Error, Result};
use crate::options::FrameOptions;
use crate::traits::{ByteStream, WriteableStream};

/// A writer that compresses everything handed to `write` into a single LZ4
/// frame and forwards the framed bytes to a sink.
///
/// The frame header is emitted on the first `write` (or by `close` when
/// nothing was ever written). Compressed blocks follow as the codec produces
/// them, and `close` appends the end mark. Output reaches the sink in the
/// order the writes were issued.
///
/// ```rust
/// # use lz4stream::{FrameOutputStream, FrameOptions, MemoryStream, Result};
/// # fn main() -> Result<()> {
/// let mut sink = MemoryStream::new();
/// let mut writer = FrameOutputStream::new(&mut sink, FrameOptions::default())?;
/// let header = writer.write(b"the quick brown fox")?;
/// assert_eq!(header, 7);
/// writer.close()?;
/// # Ok(())
/// # }
/// ```
pub struct FrameOutputStream<W: WriteableStream> {
    sink: W,
    // None once the stream has been closed; dropping it frees the native context.
    session: Option<CompressionSession>,
    scratch: Vec<u8>,
    chunk_size: usize,
    header_written: bool,
    poisoned: bool,
    closed: bool,
    bytes_written: u64,
}

impl<W: WriteableStream> FrameOutputStream<W> {
    /// Creates a new `FrameOutputStream`.
    ///
    /// Allocates the codec session and a scratch buffer sized to the worst-case
    /// output of one `buffer_size` chunk. Fails if the native context cannot
    /// be created.
    pub fn new(sink: W, options: FrameOptions) -> Result<Self> {
        let session = CompressionSession::new(&options)?;
        let chunk_size = options.chunk_size();
        let capacity = session.bound(chunk_size).max(MAX_HEADER_SIZE);
        Ok(Self {
            sink,
            session: Some(session),
            scratch: vec![0u8; capacity],
            chunk_size,
            header_written: false,
            poisoned: false,
            closed: false,
            bytes_written: 0,
        })
    }

    /// Compresses `buffer` and forwards whatever the codec produced.
    ///
    /// Returns the number of framed bytes forwarded by this call: the header
    /// on the first call plus any compressed blocks. The codec buffers input
    /// until a block fills, so a small write can legitimately return just the
    /// header, or 0.
    ///
    /// A sink that accepts fewer bytes than offered yields `Error::ShortWrite`.
    /// If that happens to the header, the header is emitted again on the next
    /// call. A codec failure, or a sink failure on compressed block bytes,
    /// poisons the stream.
    pub fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        if self.closed || self.session.is_none() {
            return Err(Error::Closed);
        }
        if self.poisoned {
            return Err(Error::Poisoned);
        }
        let mut forwarded = 0;
        if !self.header_written {
            forwarded += self.write_header()?;
        }

        // Slices keep each update within the scratch buffer's bound.
        for chunk in buffer.chunks(self.chunk_size) {
            let session = self.session.as_mut().ok_or(Error::Closed)?;
            let compressed = match session.update(&mut self.scratch, chunk) {
                Ok(n) => n,
                Err(e) => {
                    self.poisoned = true;
                    return Err(e);
                }
            };
            if compressed > 0 {
                // The codec has moved past this block; losing it breaks the frame.
                if let Err(e) = forward(&mut self.sink, &self.scratch[..compressed]) {
                    log::error!("Unable to write LZ4 block: {}", e);
                    self.poisoned = true;
                    return Err(e);
                }
                self.bytes_written += compressed as u64;
                forwarded += compressed;
            }
        }
        Ok(forwarded)
    }

    fn write_header(&mut self) -> Result<usize> {
        let session = self.session.as_mut().ok_or(Error::Closed)?;
        let header_len = match session.begin(&mut self.scratch) {
            Ok(n) => n,
            Err(e) => {
                log::error!("Unable to generate LZ4 frame header");
                self.poisoned = true;
                return Err(e);
            }
        };
        if let Err(e) = forward(&mut self.sink, &self.scratch[..header_len]) {
            log::warn!("Unable to write LZ4 frame header: {}", e);
            return Err(e);
        }
        self.header_written = true;
        self.bytes_written += header_len as u64;
        Ok(header_len)
    }

    /// Finishes the frame: flushes buffered input and the end mark to the sink.
    ///
    /// The codec session and scratch buffer are released whether or not the
    /// flush succeeds. Only a successful flush marks the stream closed and
    /// counts the trailer. Closing twice is rejected with `Error::Closed`.
    ///
    /// Returns the number of bytes forwarded: the trailer, plus the header if
    /// no write ever emitted one.
    pub fn close(&mut self) -> Result<usize> {
        if self.closed || self.session.is_none() {
            return Err(Error::Closed);
        }
        let result = self.finish_frame();

        self.session = None;
        self.scratch = Vec::new();

        match result {
            Ok(forwarded) => {
                self.closed = true;
                Ok(forwarded)
            }
            Err(e) => {
                log::error!("Unable to write end of LZ4 frame: {}", e);
                Err(e)
            }
        }
    }

    fn finish_frame(&mut self) -> Result<usize> {
        if self.poisoned {
            return Err(Error::Poisoned);
        }
        // An empty stream still needs a header to be a valid frame.
        let mut forwarded = 0;
        if !self.header_written {
            forwarded += self.write_header()?;
        }
        let session = self.session.as_mut().ok_or(Error::Closed)?;
        let end = session.end(&mut self.scratch)?;
        forward(&mut self.sink, &self.scratch[..end])?;
        self.bytes_written += end as u64;
        Ok(forwarded + end)
    }

    /// Total framed bytes the sink has accepted: header, blocks and trailer.
    pub fn total_bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_header_written(&self) -> bool {
        self.header_written
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Consumes the writer, returning the underlying sink.
    ///
    /// Call `close` first; an unclosed frame is left without its end mark.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Hands `bytes` to `sink`, treating anything short of all of them as failure.
fn forward<W: WriteableStream>(sink: &mut W, bytes: &[u8]) -> Result<()> {
    let written = sink.write(bytes)?;
    if written != bytes.len() {
        return Err(Error::short_write(bytes.len(), written));
    }
    Ok(())
}

impl<W: WriteableStream> ByteStream for FrameOutputStream<W> {
    fn close(&mut self) -> Result<()> {
        FrameOutputStream::close(self).map(|_| ())
    }
}

/// As a sink, a `FrameOutputStream` reports the uncompressed bytes it took in,
/// so it can sit downstream of anything that drains into a `WriteableStream`.
impl<W: WriteableStream> WriteableStream for FrameOutputStream<W> {
    fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        FrameOutputStream::write(self, buffer)?;
        Ok(buffer.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MIN_HEADER_SIZE;
    use crate::memory::MemoryStream;
    use crate::traits::GreedyStream;

    /// Accepts `budget` bytes, then reports zero-length writes.
    struct StingySink {
        budget: usize,
        data: Vec<u8>,
    }

    impl ByteStream for StingySink {}

    impl WriteableStream for StingySink {
        fn write(&mut self, buffer: &[u8]) -> Result<usize> {
            let n = buffer.len().min(self.budget);
            self.budget -= n;
            self.data.extend_from_slice(&buffer[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_first_write_emits_header() {
        let mut sink = MemoryStream::new();
        let mut writer = FrameOutputStream::new(&mut sink, FrameOptions::default()).unwrap();

        let first = writer.write(b"the quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(first, MIN_HEADER_SIZE);
        assert!(writer.is_header_written());

        // Input is still buffered by the codec.
        assert_eq!(writer.write(b" again").unwrap(), 0);
        assert_eq!(writer.total_bytes_written(), MIN_HEADER_SIZE as u64);
    }

    #[test]
    fn test_total_matches_sink_after_close() {
        let mut sink = MemoryStream::new();
        let total = {
            let mut writer = FrameOutputStream::new(&mut sink, FrameOptions::default()).unwrap();
            writer.write(b"the quick brown fox jumps over the lazy dog").unwrap();
            writer.close().unwrap();
            assert!(writer.is_closed());
            writer.total_bytes_written()
        };
        assert_eq!(total, sink.len() as u64);
        assert_eq!(total, 58);
    }

    #[test]
    fn test_double_close_is_rejected() {
        let mut writer = FrameOutputStream::new(Vec::new(), FrameOptions::default()).unwrap();
        writer.write(b"payload").unwrap();
        writer.close().unwrap();
        assert!(matches!(writer.close(), Err(Error::Closed)));
        assert!(matches!(writer.write(b"more"), Err(Error::Closed)));
    }

    #[test]
    fn test_close_without_writes_emits_empty_frame() {
        let mut writer = FrameOutputStream::new(Vec::new(), FrameOptions::default()).unwrap();
        let trailer = writer.close().unwrap();
        // Header plus the 4-byte end mark.
        assert_eq!(trailer, MIN_HEADER_SIZE + 4);
        assert_eq!(writer.total_bytes_written(), 11);
        assert_eq!(writer.into_inner().len(), 11);
    }

    #[test]
    fn test_failed_header_write_is_retried() {
        let sink = StingySink {
            budget: 3,
            data: Vec::new(),
        };
        let mut writer = FrameOutputStream::new(sink, FrameOptions::default()).unwrap();

        match writer.write(b"data") {
            Err(Error::ShortWrite {
                expected: 7,
                written: 3,
            }) => {}
            other => panic!("expected ShortWrite, got {other:?}"),
        }
        assert!(!writer.is_header_written());
        assert_eq!(writer.total_bytes_written(), 0);

        // A retry attempts the header again.
        assert!(matches!(writer.write(b"data"), Err(Error::ShortWrite { .. })));
        assert!(!writer.is_header_written());
    }

    #[test]
    fn test_failed_trailer_releases_session() {
        let sink = StingySink {
            budget: MIN_HEADER_SIZE,
            data: Vec::new(),
        };
        let mut writer = FrameOutputStream::new(sink, FrameOptions::default()).unwrap();
        assert_eq!(writer.write(b"abc").unwrap(), MIN_HEADER_SIZE);

        assert!(matches!(writer.close(), Err(Error::ShortWrite { .. })));
        assert!(!writer.is_closed());
        assert_eq!(writer.total_bytes_written(), MIN_HEADER_SIZE as u64);
        // The session is gone; the stream cannot be reused or closed again.
        assert!(matches!(writer.close(), Err(Error::Closed)));
        assert_eq!(writer.into_inner().data.len(), MIN_HEADER_SIZE);
    }

    /// Accepts everything except the `fail_on`-th call, which gets a zero count.
    struct HiccupSink {
        calls: usize,
        fail_on: usize,
        data: Vec<u8>,
    }

    impl ByteStream for HiccupSink {}

    impl WriteableStream for HiccupSink {
        fn write(&mut self, buffer: &[u8]) -> Result<usize> {
            self.calls += 1;
            if self.calls == self.fail_on {
                return Ok(0);
            }
            self.data.extend_from_slice(buffer);
            Ok(buffer.len())
        }
    }

    #[test]
    fn test_lost_block_poisons_stream() {
        let sink = HiccupSink {
            calls: 0,
            fail_on: 2,
            data: Vec::new(),
        };
        let options = FrameOptions::default()
            .with_buffer_size(1024)
            .with_block_size(crate::options::BlockSizeClass::Max64KB);
        let mut writer = FrameOutputStream::new(sink, options).unwrap();
        let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();

        // Call 1 is the header, call 2 the first compressed block.
        match writer.write(&payload) {
            Err(Error::ShortWrite { written: 0, .. }) => {}
            other => panic!("expected ShortWrite, got {other:?}"),
        }
        assert!(writer.is_header_written());

        assert!(matches!(writer.write(&payload), Err(Error::Poisoned)));
        assert!(matches!(writer.close(), Err(Error::Poisoned)));
        assert!(!writer.is_closed());
        // Only the header ever reached the sink.
        assert_eq!(writer.into_inner().data.len(), MIN_HEADER_SIZE);
    }

    #[test]
    fn test_writes_larger_than_buffer_are_split() {
        let options = FrameOptions::default()
            .with_buffer_size(1024)
            .with_block_size(crate::options::BlockSizeClass::Max64KB);
        let mut writer = FrameOutputStream::new(Vec::new(), options).unwrap();
        let payload = vec![7u8; 300_000];
        let forwarded = writer.write(&payload).unwrap();
        // Several 64 KiB blocks must have been flushed already.
        assert!(forwarded > MIN_HEADER_SIZE);
        writer.close().unwrap();
    }

    #[test]
    fn test_drain_into_writer_as_sink() {
        let mut source = MemoryStream::from("drained straight into the compressor");
        let mut writer = FrameOutputStream::new(Vec::new(), FrameOptions::default()).unwrap();
        assert_eq!(source.read_all(&mut writer).unwrap(), 36);
        ByteStream::close(&mut writer).unwrap();
        assert!(writer.is_closed());
        assert_eq!(crate::buffer::decompress(&writer.into_inner()).unwrap(), source.as_slice());
    }
}
