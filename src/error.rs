use thiserror::Error;

/// Custom error types for the lz4stream library.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O errors from std::io operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The native LZ4 frame library reported an error code.
    #[error("LZ4 frame error during {op}: {name}")]
    Codec { op: &'static str, name: String },

    /// The frame header carries a block size class outside the known table.
    #[error("Unrecognized LZ4 block size class: {class}")]
    BlockFormat { class: u32 },

    /// A sink accepted fewer bytes than it was handed.
    #[error("Short write: sink accepted {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },

    /// The source ran dry before a complete frame header was available.
    #[error("Truncated frame header: got {got} of {needed} bytes")]
    TruncatedHeader { got: usize, needed: usize },

    /// A source reported more bytes than the buffer it was given can hold.
    #[error("Invalid read: source reported {got} bytes for a {capacity}-byte buffer")]
    InvalidRead { got: usize, capacity: usize },

    /// An earlier codec failure left the session in an unknown state.
    #[error("Stream is poisoned by an earlier codec failure")]
    Poisoned,

    /// The stream was already closed.
    #[error("Stream is closed")]
    Closed,
}

impl Error {
    /// Create a new `Codec` error for the named operation.
    pub fn codec(op: &'static str, name: impl Into<String>) -> Self {
        Self::Codec {
            op,
            name: name.into(),
        }
    }

    /// Create a new `ShortWrite` error with expected and accepted byte counts.
    pub fn short_write(expected: usize, written: usize) -> Self {
        Self::ShortWrite { expected, written }
    }
}

/// Result type alias for the library operations.
pub type Result<T> = std::result::Result<T, Error>;
