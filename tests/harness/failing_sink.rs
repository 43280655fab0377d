use lz4stream::{ByteStream, Error, Result, WriteableStream};

/// A sink that accepts `fail_after` bytes, then fails in the configured way.
pub struct FailingSink {
    pub data: Vec<u8>,
    fail_after: usize,
    mode: SinkFault,
}

#[allow(dead_code)]
#[derive(Clone, Copy)]
pub enum SinkFault {
    /// Report a short count.
    Short,
    /// Raise an I/O error.
    BrokenPipe,
}

impl FailingSink {
    pub fn new(fail_after: usize, mode: SinkFault) -> Self {
        Self {
            data: Vec::new(),
            fail_after,
            mode,
        }
    }
}

impl ByteStream for FailingSink {}

impl WriteableStream for FailingSink {
    fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        let remaining = self.fail_after - self.data.len();
        if buffer.len() <= remaining {
            self.data.extend_from_slice(buffer);
            return Ok(buffer.len());
        }
        match self.mode {
            SinkFault::Short => {
                self.data.extend_from_slice(&buffer[..remaining]);
                Ok(remaining)
            }
            SinkFault::BrokenPipe => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Simulated I/O error",
            ))),
        }
    }
}
