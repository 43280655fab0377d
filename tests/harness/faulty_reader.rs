use lz4stream::{ByteStream, ReadableStream, Result};

pub struct FaultyReader<R: ReadableStream> {
    inner: R,
    mode: FaultMode,
    counter: usize,
}

#[allow(dead_code)]
pub enum FaultMode {
    OneByteChunks,
    ChunksOf(usize),
    PrematureEofAt(usize),
}

impl<R: ReadableStream> FaultyReader<R> {
    pub fn new(inner: R, mode: FaultMode) -> Self {
        Self {
            inner,
            mode,
            counter: 0,
        }
    }

    #[allow(dead_code)]
    pub fn reads(&self) -> usize {
        self.counter
    }
}

impl<R: ReadableStream> ByteStream for FaultyReader<R> {}

impl<R: ReadableStream> ReadableStream for FaultyReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.counter += 1;
        match self.mode {
            FaultMode::OneByteChunks => {
                let n = buf.len().min(1);
                self.inner.read(&mut buf[..n])
            }
            FaultMode::ChunksOf(size) => {
                let n = buf.len().min(size.max(1));
                self.inner.read(&mut buf[..n])
            }
            FaultMode::PrematureEofAt(n) if self.counter >= n => Ok(0),
            _ => self.inner.read(buf),
        }
    }
}
