//! Core stream capability traits for the lz4stream library.
//!
//! Every endpoint the frame engine talks to is described by one or more of
//! these small roles rather than by a concrete type. A file, a socket and an
//! in-memory buffer all plug into `FrameOutputStream` and `FrameInputStream`
//! the same way.

use crate::error::Result;

/// A resource that can be closed.
///
/// Closing is a no-op unless the implementation has something to release or
/// flush.
pub trait ByteStream {
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A pull source of bytes.
pub trait ReadableStream: ByteStream {
    /// Reads up to `buffer.len()` bytes into `buffer`.
    ///
    /// # Returns
    /// * `Ok(0)` - The source is exhausted
    /// * `Ok(n)` - `n` bytes were copied into the front of `buffer`
    /// * `Err(e)` - The source failed
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;
}

/// A push sink of bytes.
pub trait WriteableStream: ByteStream {
    /// Writes `buffer` to the sink and returns how many bytes it accepted.
    ///
    /// Callers in this crate treat any count below `buffer.len()` as a
    /// failed write.
    fn write(&mut self, buffer: &[u8]) -> Result<usize>;
}

/// A source that can hand over everything it holds in one call.
pub trait GreedyStream {
    /// Drains the source into `sink`, returning the number of bytes transferred.
    fn read_all(&mut self, sink: &mut dyn WriteableStream) -> Result<usize>;
}

/// A stream that is both readable and writeable.
pub trait BidirectionalStream: ReadableStream + WriteableStream {}

impl<T: ReadableStream + WriteableStream + ?Sized> BidirectionalStream for T {}

// Forwarding impls so streams can borrow their endpoints instead of owning them.

impl<T: ByteStream + ?Sized> ByteStream for &mut T {
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<T: ReadableStream + ?Sized> ReadableStream for &mut T {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        (**self).read(buffer)
    }
}

impl<T: WriteableStream + ?Sized> WriteableStream for &mut T {
    fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        (**self).write(buffer)
    }
}

impl<T: ByteStream + ?Sized> ByteStream for Box<T> {
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<T: ReadableStream + ?Sized> ReadableStream for Box<T> {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        (**self).read(buffer)
    }
}

impl<T: WriteableStream + ?Sized> WriteableStream for Box<T> {
    fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        (**self).write(buffer)
    }
}

// A growable vector is the simplest sink.
impl ByteStream for Vec<u8> {}

impl WriteableStream for Vec<u8> {
    fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        self.extend_from_slice(buffer);
        Ok(buffer.len())
    }
}

// A byte slice is the simplest source; reading advances the slice.
impl ByteStream for &[u8] {}

impl ReadableStream for &[u8] {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let n = buffer.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buffer[..n].copy_from_slice(head);
        *self = tail;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_advances() {
        let data = b"abcdef".to_vec();
        let mut source: &[u8] = &data;
        let mut buf = [0u8; 4];

        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(source.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_vec_sink_appends() {
        let mut sink: Vec<u8> = Vec::new();
        assert_eq!(WriteableStream::write(&mut sink, b"hello").unwrap(), 5);
        assert_eq!(WriteableStream::write(&mut sink, b"").unwrap(), 0);
        assert_eq!(WriteableStream::write(&mut sink, b"world").unwrap(), 5);
        assert_eq!(sink, b"helloworld");
    }

    #[test]
    fn test_borrowed_sink_forwards() {
        let mut sink: Vec<u8> = Vec::new();
        {
            let mut borrowed = &mut sink;
            WriteableStream::write(&mut borrowed, b"xyz").unwrap();
            ByteStream::close(&mut borrowed).unwrap();
        }
        assert_eq!(sink, b"xyz");
    }

    #[test]
    fn test_boxed_source_is_dyn_compatible() {
        let data = b"boxed".to_vec();
        let mut source: Box<dyn ReadableStream + '_> = Box::new(&data[..]);
        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"boxed");
    }
}
