//! An in-memory, growable byte stream.

use crate::error::{Error, Result};
use crate::traits::{ByteStream, GreedyStream, ReadableStream, WriteableStream};
use std::fmt;

/// A growable byte buffer that is both a source and a sink.
///
/// Writes append without bound. Reads consume forward from a single cursor
/// and never rewind. `read_all` is cursor-independent: it always hands the
/// sink the whole buffer from offset 0. Equality compares the bytes only.
#[derive(Clone, Default)]
pub struct MemoryStream {
    data: Vec<u8>,
    position: usize,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes held, independent of the read cursor.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read cursor.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes still available to `read`.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the stream, returning the underlying bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for MemoryStream {
    fn from(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }
}

impl From<&[u8]> for MemoryStream {
    fn from(data: &[u8]) -> Self {
        Self::from(data.to_vec())
    }
}

impl From<&str> for MemoryStream {
    fn from(s: &str) -> Self {
        Self::from(s.as_bytes())
    }
}

impl PartialEq for MemoryStream {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for MemoryStream {}

impl fmt::Debug for MemoryStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStream")
            .field("len", &self.data.len())
            .field("position", &self.position)
            .finish()
    }
}

impl fmt::Display for MemoryStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.data))
    }
}

impl ByteStream for MemoryStream {}

impl ReadableStream for MemoryStream {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let n = buffer.len().min(self.remaining());
        buffer[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }
}

impl WriteableStream for MemoryStream {
    fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        self.data.extend_from_slice(buffer);
        Ok(buffer.len())
    }
}

impl GreedyStream for MemoryStream {
    fn read_all(&mut self, sink: &mut dyn WriteableStream) -> Result<usize> {
        let written = sink.write(&self.data)?;
        if written != self.data.len() {
            return Err(Error::short_write(self.data.len(), written));
        }
        Ok(written)
    }
}
