//! A streaming LZ4 frame decompressor over any `ReadableStream`.

use crate::codec::{self, DecompressionSession, FrameInfo, MAX_HEADER_SIZE, MIN_HEADER_SIZE};
use crate::error::{Error, Result};
use crate::options::FrameOptions;
use crate::traits::{ByteStream, GreedyStream, ReadableStream, WriteableStream};
use std::ops::Range;

/// A reader that decodes one LZ4 frame pulled from a source.
///
/// The frame header is parsed lazily on the first pull. After that the reader
/// alternates between reading a raw chunk from the source and feeding the
/// unconsumed part of it to the codec, one decoded unit at a time. The raw
/// chunk and its consumption cursor live in the reader, so a chunk that
/// decodes into several units is resumed across calls rather than re-read.
///
/// Three ways to pull data out:
///
/// 1. **Processor API** (`process_all()`, `read_all()`): drain everything
/// 2. **Expert API** (`next_chunk()`, `chunks()`): one decoded unit per call,
///    borrowed from the internal block buffer
/// 3. **Stream API** (`ReadableStream::read`): copy into a caller buffer, so a
///    `FrameInputStream` can itself be the source of another stream
///
/// ```rust
/// # use lz4stream::{FrameInputStream, FrameOptions, GreedyStream, MemoryStream, Result};
/// # fn main() -> Result<()> {
/// let framed = lz4stream::compress(b"hello, frame")?;
/// let mut reader = FrameInputStream::new(&framed[..], FrameOptions::default())?;
/// let mut out = MemoryStream::new();
/// assert_eq!(reader.read_all(&mut out)?, 12);
/// assert_eq!(out.as_slice(), b"hello, frame");
/// # Ok(())
/// # }
/// ```
pub struct FrameInputStream<R: ReadableStream> {
    source: R,
    // Dropping the session frees the native context.
    session: Option<DecompressionSession>,
    info: Option<FrameInfo>,
    // Raw-read scratch and the unconsumed window of the current chunk.
    raw: Vec<u8>,
    cursor: Range<usize>,
    // Sized to the frame's block size once the header is parsed.
    decoded: Vec<u8>,
    // Decoded bytes not yet handed out through `ReadableStream::read`.
    pending: Range<usize>,
    finished: bool,
    poisoned: bool,
    closed: bool,
    bytes_read: u64,
    bytes_decoded: u64,
}

impl<R: ReadableStream> FrameInputStream<R> {
    /// Creates a new `FrameInputStream`.
    ///
    /// Only `options.buffer_size` matters here: it sizes each raw read from
    /// the source. Everything else comes from the frame header.
    pub fn new(source: R, options: FrameOptions) -> Result<Self> {
        let session = DecompressionSession::new()?;
        Ok(Self {
            source,
            session: Some(session),
            info: None,
            raw: vec![0u8; options.chunk_size()],
            cursor: 0..0,
            decoded: Vec::new(),
            pending: 0..0,
            finished: false,
            poisoned: false,
            closed: false,
            bytes_read: 0,
            bytes_decoded: 0,
        })
    }

    /// Returns the next decoded unit of the frame.
    ///
    /// # Returns
    /// * `Ok(Some(chunk))` - Decoded bytes, borrowed until the next call
    /// * `Ok(None)` - The frame is complete or the source is exhausted
    /// * `Err(e)` - A header, codec or source error
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        match self.advance()? {
            Some(range) => Ok(Some(&self.decoded[range])),
            None => Ok(None),
        }
    }

    /// Returns an iterator-like object for manual chunk processing.
    pub fn chunks(&mut self) -> Chunks<'_, R> {
        Chunks { reader: self }
    }

    /// Processes every remaining decoded unit with a closure.
    ///
    /// The closure gets zero-copy access to each unit and can stop the drain
    /// by returning an error.
    pub fn process_all<F>(&mut self, mut processor: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        while let Some(chunk) = self.next_chunk()? {
            processor(chunk)?;
        }
        Ok(())
    }

    /// Releases the codec session and both buffers.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        self.session = None;
        self.raw = Vec::new();
        self.decoded = Vec::new();
        self.cursor = 0..0;
        self.pending = 0..0;
        self.closed = true;
        Ok(())
    }

    /// Raw bytes pulled from the source so far, header included.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Decoded bytes produced so far.
    pub fn bytes_decoded(&self) -> u64 {
        self.bytes_decoded
    }

    /// True once the frame's end mark has been decoded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Header metadata, available after the first pull.
    pub fn frame_info(&self) -> Option<&FrameInfo> {
        self.info.as_ref()
    }

    /// Decoded block capacity negotiated by the header.
    pub fn block_size(&self) -> Option<usize> {
        self.info.as_ref().map(|info| info.block_size.bytes())
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Consumes the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Produces the next range of `decoded` to hand out, shared by every API.
    fn advance(&mut self) -> Result<Option<Range<usize>>> {
        if self.closed {
            return Err(Error::Closed);
        }
        if self.poisoned {
            return Err(Error::Poisoned);
        }
        if !self.pending.is_empty() {
            let range = self.pending.clone();
            self.pending = 0..0;
            return Ok(Some(range));
        }
        self.read_header()?;

        loop {
            if self.finished {
                return Ok(None);
            }
            if self.cursor.is_empty() && self.fill()? == 0 {
                log::warn!("Source exhausted before the LZ4 frame end mark");
                return Ok(None);
            }

            let session = self.session.as_mut().ok_or(Error::Closed)?;
            let step = match session.decompress(&mut self.decoded, &self.raw[self.cursor.clone()])
            {
                Ok(step) => step,
                Err(e) => {
                    self.poisoned = true;
                    return Err(e);
                }
            };
            self.cursor.start += step.consumed;

            if !step.more_expected {
                self.finished = true;
                if !self.cursor.is_empty() {
                    log::warn!(
                        "Ignoring {} bytes of trailing data after the LZ4 frame",
                        self.cursor.len()
                    );
                }
            }
            if step.produced > 0 {
                self.bytes_decoded += step.produced as u64;
                return Ok(Some(0..step.produced));
            }
        }
    }

    /// Reads one raw chunk into the scratch buffer and resets the cursor over it.
    fn fill(&mut self) -> Result<usize> {
        let capacity = self.raw.len();
        let n = self.source.read(&mut self.raw)?;
        if n > capacity {
            return Err(Error::InvalidRead { got: n, capacity });
        }
        self.bytes_read += n as u64;
        self.cursor = 0..n;
        Ok(n)
    }

    fn read_header(&mut self) -> Result<()> {
        if self.info.is_some() {
            return Ok(());
        }

        let mut header = [0u8; MAX_HEADER_SIZE];
        let got = read_full(&mut self.source, &mut header[..MIN_HEADER_SIZE])?;
        self.bytes_read += got as u64;
        if got < MIN_HEADER_SIZE {
            self.poisoned = true;
            return Err(Error::TruncatedHeader {
                got,
                needed: MIN_HEADER_SIZE,
            });
        }

        // Content size and dictionary id extend the minimal header.
        let len = codec::header_len(&header);
        if len > MIN_HEADER_SIZE {
            let more = read_full(&mut self.source, &mut header[MIN_HEADER_SIZE..len])?;
            self.bytes_read += more as u64;
            if MIN_HEADER_SIZE + more < len {
                self.poisoned = true;
                return Err(Error::TruncatedHeader {
                    got: MIN_HEADER_SIZE + more,
                    needed: len,
                });
            }
        }

        let session = self.session.as_mut().ok_or(Error::Closed)?;
        let info = match session.frame_info(&header[..len]) {
            Ok(info) => info,
            Err(e) => {
                log::error!("Error reading LZ4 frame header: {}", e);
                self.poisoned = true;
                return Err(e);
            }
        };

        // Anything the codec did not take as header belongs to the first block.
        let leftover = len - info.header_len.min(len);
        if leftover > 0 {
            self.raw[..leftover].copy_from_slice(&header[info.header_len..len]);
            self.cursor = 0..leftover;
        }

        self.decoded = vec![0u8; info.block_size.bytes()];
        self.info = Some(info);
        Ok(())
    }
}

/// Reads until `buffer` is full or the source is exhausted.
fn read_full<R: ReadableStream>(source: &mut R, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let capacity = buffer.len() - filled;
        let n = source.read(&mut buffer[filled..])?;
        if n > capacity {
            return Err(Error::InvalidRead { got: n, capacity });
        }
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

impl<R: ReadableStream> GreedyStream for FrameInputStream<R> {
    /// Decodes the rest of the frame straight into `sink`.
    ///
    /// Returns the decoded bytes transferred by this call. On error, what was
    /// already forwarded stays in the sink and `bytes_decoded` reports it.
    fn read_all(&mut self, sink: &mut dyn WriteableStream) -> Result<usize> {
        let mut total = 0;
        while let Some(range) = self.advance()? {
            let bytes = &self.decoded[range];
            let written = sink.write(bytes)?;
            if written != bytes.len() {
                return Err(Error::short_write(bytes.len(), written));
            }
            total += written;
        }
        Ok(total)
    }
}

impl<R: ReadableStream> ByteStream for FrameInputStream<R> {
    fn close(&mut self) -> Result<()> {
        FrameInputStream::close(self)
    }
}

impl<R: ReadableStream> ReadableStream for FrameInputStream<R> {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        if buffer.is_empty() {
            return Ok(0);
        }
        let range = match self.advance()? {
            Some(range) => range,
            None => return Ok(0),
        };
        let n = buffer.len().min(range.len());
        buffer[..n].copy_from_slice(&self.decoded[range.start..range.start + n]);
        self.pending = range.start + n..range.end;
        Ok(n)
    }
}

/// An iterator-like object for manual chunk processing.
///
/// Borrows the `FrameInputStream` mutably, so each chunk is only valid until
/// the next call.
pub struct Chunks<'a, R: ReadableStream> {
    reader: &'a mut FrameInputStream<R>,
}

impl<'a, R: ReadableStream> Chunks<'a, R> {
    /// Returns the next decoded unit.
    ///
    /// # Returns
    /// * `Ok(Some(chunk))` - A unit was decoded
    /// * `Ok(None)` - End of frame or source
    /// * `Err(e)` - An error occurred during decoding
    pub fn next(&mut self) -> Result<Option<&[u8]>> {
        self.reader.next_chunk()
    }
}
