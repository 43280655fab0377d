//! Bridges between `std::io` and the stream capability traits.
//!
//! `IoSource` and `IoSink` make any `Read`/`Write` (a `File`, a `TcpStream`,
//! a `Cursor`) usable as a frame engine endpoint.

use crate::error::{Error, Result};
use crate::traits::{ByteStream, ReadableStream, WriteableStream};
use std::io::{ErrorKind, Read, Write};

/// A readable stream backed by any `std::io::Read`.
pub struct IoSource<R: Read> {
    inner: R,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consumes the adapter, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteStream for IoSource<R> {}

impl<R: Read> ReadableStream for IoSource<R> {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        loop {
            match self.inner.read(buffer) {
                Ok(n) if n > buffer.len() => {
                    return Err(Error::InvalidRead {
                        got: n,
                        capacity: buffer.len(),
                    })
                }
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// A writeable stream backed by any `std::io::Write`.
///
/// Writes are all-or-error: a successful call always reports the full length.
/// `close` flushes the underlying writer.
pub struct IoSink<W: Write> {
    inner: W,
}

impl<W: Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consumes the adapter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteStream for IoSink<W> {
    fn close(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

impl<W: Write> WriteableStream for IoSink<W> {
    fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        self.inner.write_all(buffer)?;
        Ok(buffer.len())
    }
}
