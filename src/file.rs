//! Path-level glue: compress or decompress one file into another.

use crate::adapters::{IoSink, IoSource};
use crate::error::Result;
use crate::options::FrameOptions;
use crate::reader::FrameInputStream;
use crate::traits::{ByteStream, GreedyStream, ReadableStream};
use crate::writer::FrameOutputStream;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Compresses the file at `input` into a new LZ4 frame file at `output`.
///
/// Returns the number of framed bytes written.
pub fn compress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<u64> {
    compress_file_with(input, output, FrameOptions::default())
}

/// Like [`compress_file`], with explicit frame options.
pub fn compress_file_with(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: FrameOptions,
) -> Result<u64> {
    let mut source = IoSource::new(File::open(input)?);
    let sink = IoSink::new(BufWriter::new(File::create(output)?));
    let mut buffer = vec![0u8; options.chunk_size()];
    let mut writer = FrameOutputStream::new(sink, options)?;

    loop {
        let n = source.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        writer.write(&buffer[..n])?;
    }
    writer.close()?;

    let total = writer.total_bytes_written();
    writer.into_inner().close()?;
    Ok(total)
}

/// Decompresses the LZ4 frame file at `input` into `output`.
///
/// Returns the number of decoded bytes written.
pub fn decompress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<u64> {
    let options = FrameOptions::default();
    let source = IoSource::new(File::open(input)?);
    let mut sink = IoSink::new(BufWriter::new(File::create(output)?));
    let mut reader = FrameInputStream::new(source, options)?;

    let total = reader.read_all(&mut sink)?;
    reader.close()?;
    sink.close()?;
    Ok(total as u64)
}
