use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub type DecodeResult<T> = Result<T, DecodeError>;
pub type ImageResult<T> = Result<T, ImageError>;

/// Failure of a single structure decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("read of {width} bytes at offset 0x{offset:x} exceeds buffer length {len}")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("invalid image signature 0x{found:08x} at offset 0x{offset:x}")]
    InvalidSignature { offset: usize, found: u32 },

    #[error("unknown optional header magic 0x{magic:x} at offset 0x{offset:x}")]
    UnknownOptionalMagic { offset: usize, magic: u16 },

    #[error("unknown machine type 0x{code:x} at offset 0x{offset:x}")]
    UnknownMachineType { offset: usize, code: u16 },

    #[error("data directory count {count} at offset 0x{offset:x} exceeds 16")]
    DirectoryCountOverflow { offset: usize, count: u32 },

    #[error("invalid DOS magic 0x{found:04x}")]
    InvalidDosMagic { found: u16 },
}

impl DecodeError {
    /// Byte offset of the read that failed.
    pub fn offset(&self) -> usize {
        match *self {
            DecodeError::OutOfBounds { offset, .. }
            | DecodeError::InvalidSignature { offset, .. }
            | DecodeError::UnknownOptionalMagic { offset, .. }
            | DecodeError::UnknownMachineType { offset, .. }
            | DecodeError::DirectoryCountOverflow { offset, .. } => offset,
            DecodeError::InvalidDosMagic { .. } => 0,
        }
    }

    pub fn at(self, stage: Stage) -> ImageError {
        ImageError {
            stage,
            source: self,
        }
    }
}

/// Decode step of the image pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Dos,
    Coff,
    Optional,
    Section(usize),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Dos => write!(f, "DOS header"),
            Stage::Coff => write!(f, "COFF header"),
            Stage::Optional => write!(f, "optional header"),
            Stage::Section(index) => write!(f, "section header {index}"),
        }
    }
}

/// Failure of a whole-image decode: which stage broke, and why.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage} decode failed at offset 0x{:x}: {source}", .source.offset())]
pub struct ImageError {
    pub stage: Stage,
    #[source]
    pub source: DecodeError,
}

impl ImageError {
    pub fn offset(&self) -> usize {
        self.source.offset()
    }
}
