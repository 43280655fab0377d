//! # lz4stream (v0.1.0)
//!
//! Streaming LZ4 frame compression and decompression over composable byte streams.
//!
//! ## Overview
//!
//! `lz4stream` lets a caller push arbitrary-sized writes into a compressor, or pull
//! decoded bytes out of a decompressor, without holding the whole payload in memory.
//! The LZ4 frame structure (header, blocks, end mark) stays hidden behind two
//! stream types; the block codec itself is the native LZ4 library.
//!
//! ## Key Features
//!
//! * **Composable Endpoints**: Sources and sinks are small traits, implemented for
//!   memory buffers, `std::io` readers and writers, vectors and slices
//! * **Bounded Memory**: Fixed scratch buffers sized once from `FrameOptions`
//! * **Zero-Copy Reading**: Decoded units are borrowed straight from the block buffer
//! * **Resumable Decoding**: One raw read can yield many decoded units across calls
//! * **Explicit Errors**: Every codec, sink and source failure surfaces as `Error`
//!
//! ## Quick Start
//!
//! ```rust
//! use lz4stream::*;
//!
//! fn main() -> Result<()> {
//!     // Compress into an in-memory sink
//!     let mut sink = MemoryStream::new();
//!     let mut writer = FrameOutputStream::new(&mut sink, FrameOptions::default())?;
//!     writer.write(b"the quick brown fox ")?;
//!     writer.write(b"jumps over the lazy dog")?;
//!     writer.close()?;
//!     drop(writer);
//!
//!     // Decompress it again, one decoded unit at a time
//!     let mut reader = FrameInputStream::new(sink, FrameOptions::default())?;
//!     let mut decoded = Vec::new();
//!     reader.process_all(|chunk| {
//!         decoded.extend_from_slice(chunk);
//!         Ok(())
//!     })?;
//!     assert_eq!(decoded, b"the quick brown fox jumps over the lazy dog");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is built around four capability traits:
//!
//! * **`ReadableStream`**: pull bytes from a source
//! * **`WriteableStream`**: push bytes into a sink
//! * **`GreedyStream`**: drain a whole source into a sink in one call
//! * **`ByteStream`**: close a resource
//!
//! `FrameOutputStream` wraps any sink and `FrameInputStream` wraps any source, so
//! files, sockets and buffers all plug into the frame engine the same way.

pub mod adapters;
pub mod buffer;
pub mod codec;
pub mod error;
pub mod file;
pub mod memory;
pub mod options;
pub mod reader;
pub mod traits;
pub mod writer;

// Re-export the main public API for user convenience.
pub use adapters::{IoSink, IoSource};
pub use buffer::{compress, compress_with, decompress, BufferWriter};
pub use codec::{FrameInfo, MIN_HEADER_SIZE};
pub use error::{Error, Result};
pub use file::{compress_file, compress_file_with, decompress_file};
pub use memory::MemoryStream;
pub use options::{BlockMode, BlockSizeClass, FrameOptions, DEFAULT_BUFFER_SIZE};
pub use reader::{Chunks, FrameInputStream};
pub use traits::{BidirectionalStream, ByteStream, GreedyStream, ReadableStream, WriteableStream};
pub use writer::FrameOutputStream;
