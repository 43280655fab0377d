//! One-shot helpers for payloads that already sit in memory.

use crate::error::Result;
use crate::memory::MemoryStream;
use crate::options::FrameOptions;
use crate::reader::FrameInputStream;
use crate::traits::GreedyStream;
use crate::writer::FrameOutputStream;

/// Compresses `input` into a single LZ4 frame.
///
/// An empty input is returned as-is (empty) rather than as an empty frame, so
/// round-tripping nothing never touches the codec.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    compress_with(input, FrameOptions::default())
}

/// Like [`compress`], with explicit frame options.
pub fn compress_with(input: &[u8], options: FrameOptions) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut writer = FrameOutputStream::new(MemoryStream::new(), options)?;
    writer.write(input)?;
    writer.close()?;
    Ok(writer.into_inner().into_inner())
}

/// Decompresses a single LZ4 frame held in `input`.
///
/// An empty input decodes to an empty output without touching the codec.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = FrameInputStream::new(input, FrameOptions::default())?;
    let mut sink = MemoryStream::new();
    reader.read_all(&mut sink)?;
    reader.close()?;
    Ok(sink.into_inner())
}

/// Collects writes into one in-memory LZ4 frame.
///
/// ```rust
/// # use lz4stream::{BufferWriter, Result};
/// # fn main() -> Result<()> {
/// let mut writer = BufferWriter::new()?;
/// writer.write(b"hello")?;
/// writer.write(b"world")?;
/// let framed = writer.finish()?.expect("first finish yields the frame");
/// assert!(writer.finish()?.is_none());
/// assert_eq!(lz4stream::decompress(&framed)?, b"helloworld");
/// # Ok(())
/// # }
/// ```
pub struct BufferWriter {
    writer: FrameOutputStream<MemoryStream>,
}

impl BufferWriter {
    pub fn new() -> Result<Self> {
        Self::with_options(FrameOptions::default())
    }

    pub fn with_options(options: FrameOptions) -> Result<Self> {
        Ok(Self {
            writer: FrameOutputStream::new(MemoryStream::new(), options)?,
        })
    }

    /// Appends `input` to the frame. Empty slices are ignored.
    pub fn write(&mut self, input: &[u8]) -> Result<()> {
        if input.is_empty() {
            return Ok(());
        }
        self.writer.write(input)?;
        Ok(())
    }

    /// Closes the frame and returns it.
    ///
    /// Returns `Ok(None)` once the frame has already been handed out.
    pub fn finish(&mut self) -> Result<Option<Vec<u8>>> {
        if self.writer.is_closed() {
            return Ok(None);
        }
        self.writer.close()?;
        Ok(Some(self.writer.get_ref().as_slice().to_vec()))
    }

    pub fn is_finished(&self) -> bool {
        self.writer.is_closed()
    }
}
