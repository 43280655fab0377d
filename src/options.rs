//! Frame configuration.
//!
//! `FrameOptions` is passed explicitly to every stream constructor; there is
//! no process-wide default beyond `FrameOptions::default()`.

use crate::error::{Error, Result};
use lz4::liblz4::{
    BlockChecksum, BlockMode as NativeBlockMode, BlockSize, ContentChecksum, FrameType,
    LZ4FFrameInfo, LZ4FPreferences,
};

/// Default size of the caller-side chunk fed to one native update call, and of
/// each raw read from a source.
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 16;

/// Maximum decoded size of one block, as coded in the frame descriptor.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockSizeClass {
    Max64KB,
    Max256KB,
    Max1MB,
    #[default]
    Max4MB,
}

impl BlockSizeClass {
    /// Resolves a raw class value from a parsed header.
    ///
    /// Class 0 is the codec's "default" marker and maps to 64 KiB.
    pub fn from_class(class: u32) -> Result<Self> {
        match class {
            0 | 4 => Ok(Self::Max64KB),
            5 => Ok(Self::Max256KB),
            6 => Ok(Self::Max1MB),
            7 => Ok(Self::Max4MB),
            _ => Err(Error::BlockFormat { class }),
        }
    }

    pub fn class(self) -> u32 {
        match self {
            Self::Max64KB => 4,
            Self::Max256KB => 5,
            Self::Max1MB => 6,
            Self::Max4MB => 7,
        }
    }

    /// Capacity a decoder needs for one decoded block.
    pub fn bytes(self) -> usize {
        match self {
            Self::Max64KB => 1 << 16,
            Self::Max256KB => 1 << 18,
            Self::Max1MB => 1 << 20,
            Self::Max4MB => 1 << 22,
        }
    }

    fn native(self) -> BlockSize {
        match self {
            Self::Max64KB => BlockSize::Max64KB,
            Self::Max256KB => BlockSize::Max256KB,
            Self::Max1MB => BlockSize::Max1MB,
            Self::Max4MB => BlockSize::Max4MB,
        }
    }
}

/// Whether blocks may reference data from earlier blocks.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
    #[default]
    Linked,
    Independent,
}

impl BlockMode {
    fn native(self) -> NativeBlockMode {
        match self {
            Self::Linked => NativeBlockMode::Linked,
            Self::Independent => NativeBlockMode::Independent,
        }
    }
}

/// Configuration shared by the frame streams.
///
/// The defaults (4 MiB linked blocks, no checksums, fast level) produce the
/// minimal 7-byte frame header.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOptions {
    /// Sizes the compressor's scratch buffer and every raw source read.
    pub buffer_size: usize,
    pub block_size: BlockSizeClass,
    pub block_mode: BlockMode,
    pub content_checksum: bool,
    pub block_checksum: bool,
    /// 0 selects the fast compressor; 3 and above select LZ4 HC.
    pub compression_level: u32,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            block_size: BlockSizeClass::default(),
            block_mode: BlockMode::default(),
            content_checksum: false,
            block_checksum: false,
            compression_level: 0,
        }
    }
}

impl FrameOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chunk size. Zero is bumped to one byte.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn with_block_size(mut self, block_size: BlockSizeClass) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_block_mode(mut self, block_mode: BlockMode) -> Self {
        self.block_mode = block_mode;
        self
    }

    pub fn with_content_checksum(mut self, enabled: bool) -> Self {
        self.content_checksum = enabled;
        self
    }

    pub fn with_block_checksum(mut self, enabled: bool) -> Self {
        self.block_checksum = enabled;
        self
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Chunk size actually used, never zero.
    pub(crate) fn chunk_size(&self) -> usize {
        self.buffer_size.max(1)
    }

    /// Builds the native preference block for a compression session.
    pub(crate) fn preferences(&self) -> LZ4FPreferences {
        LZ4FPreferences {
            frame_info: LZ4FFrameInfo {
                block_size_id: self.block_size.native(),
                block_mode: self.block_mode.native(),
                content_checksum_flag: if self.content_checksum {
                    ContentChecksum::ChecksumEnabled
                } else {
                    ContentChecksum::NoChecksum
                },
                frame_type: FrameType::Frame,
                content_size: 0,
                dict_id: 0,
                block_checksum_flag: if self.block_checksum {
                    BlockChecksum::BlockChecksumEnabled
                } else {
                    BlockChecksum::NoBlockChecksum
                },
            },
            compression_level: self.compression_level,
            auto_flush: 0,
            favor_dec_speed: 0,
            reserved: [0; 3],
        }
    }
}
