//! Decode failures.
//!
//! Every error aborts the current decode only; no partial image is ever
//! returned. Where the failure can be pinned down, the error carries a
//! [`Location`]: a byte offset into the source stream, or a pixel / row
//! coordinate (0-based) inside the raster.

use core::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::sniff::Format;

/// Where in the input an inconsistency was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    /// Byte offset from the start of the stream.
    Offset(u64),
    /// Pixel coordinate, 0-based.
    Pixel { row: u32, col: u32 },
    /// Scanline index, 0-based.
    Row(u32),
    Unknown,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Location::Offset(o) => write!(f, "byte {o}"),
            Location::Pixel { row, col } => write!(f, "row {row}, column {col}"),
            Location::Row(y) => write!(f, "row {y}"),
            Location::Unknown => f.write_str("unknown position"),
        }
    }
}

/// Coarse classification of a [`DecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedHeader,
    TruncatedStream,
    CorruptPixelData,
    UnsupportedFormat,
    UnknownFormat,
    Resource,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Bad magic, bad or missing header field, unsupported header setting.
    #[error("malformed header: {what} (at {at})")]
    MalformedHeader { what: &'static str, at: Location },

    /// End of stream before a declared length was consumed.
    #[error("truncated stream: {what} (at {at})")]
    TruncatedStream { what: &'static str, at: Location },

    /// Decompression failure, size mismatch, bad filter tag, bad index.
    #[error("corrupt pixel data: {what} (at {at})")]
    CorruptPixelData { what: &'static str, at: Location },

    /// Recognised magic with no decoder behind it.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(Format),

    #[error("unknown image format")]
    UnknownFormat,

    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read error: {0}")]
    Io(#[from] io::Error),

    #[error("out of memory reserving {bytes} bytes")]
    OutOfMemory { bytes: usize },
}

impl DecodeError {
    pub(crate) fn header(what: &'static str, at: Location) -> Self {
        DecodeError::MalformedHeader { what, at }
    }

    pub(crate) fn truncated(what: &'static str, at: Location) -> Self {
        DecodeError::TruncatedStream { what, at }
    }

    pub(crate) fn corrupt(what: &'static str, at: Location) -> Self {
        DecodeError::CorruptPixelData { what, at }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::MalformedHeader { .. } => ErrorKind::MalformedHeader,
            DecodeError::TruncatedStream { .. } => ErrorKind::TruncatedStream,
            DecodeError::CorruptPixelData { .. } => ErrorKind::CorruptPixelData,
            DecodeError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            DecodeError::UnknownFormat => ErrorKind::UnknownFormat,
            DecodeError::Open { .. } | DecodeError::Io(_) | DecodeError::OutOfMemory { .. } => {
                ErrorKind::Resource
            }
        }
    }

    /// Position attached to the error, if any.
    pub fn location(&self) -> Option<Location> {
        match self {
            DecodeError::MalformedHeader { at, .. }
            | DecodeError::TruncatedStream { at, .. }
            | DecodeError::CorruptPixelData { at, .. } => Some(*at),
            _ => None,
        }
    }
}

pub type Result<T> = core::result::Result<T, DecodeError>;
