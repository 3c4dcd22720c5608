//! Crate-specific error types for mmap-file.

use std::io;
use thiserror::Error;

/// Result alias for mmap-file operations.
pub type Result<T> = std::result::Result<T, MmapFileError>;

/// Error type covering filesystem, mapping, bounds, and lifecycle issues.
///
/// Variants that describe a partial transfer carry the number of bytes that
/// were actually moved; see [`MmapFileError::transferred`].
#[derive(Debug, Error)]
pub enum MmapFileError {
    /// Wrapper for `std::io::Error` (not-found, permission-denied, sharing violations, ...).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The handle has been closed.
    #[error("file is closed")]
    Closed,

    /// A write was attempted on a read-only handle.
    #[error("file is read-only")]
    ReadOnly,

    /// A raw whence value did not name a seek origin.
    #[error("invalid whence: {0}")]
    InvalidWhence(i32),

    /// A negative offset was supplied or computed.
    #[error("negative offset: {0}")]
    NegativeOffset(i64),

    /// A seek computation overflowed the offset range.
    #[error("offset too large")]
    OffsetTooLarge,

    /// A write did not fit inside the mapped region.
    #[error("write out of bounds: offset={offset}, len={len}, total={total}, written={written}")]
    OutOfBounds {
        /// Requested offset.
        offset: u64,
        /// Requested length.
        len: u64,
        /// Total size of the mapped region.
        total: u64,
        /// Bytes written before the end of the region was reached.
        written: usize,
    },

    /// End of the mapped region was reached before the buffer was filled.
    #[error("end of file after {read} bytes")]
    Eof {
        /// Bytes read before the end of the region.
        read: usize,
    },

    /// The requested or on-disk size cannot be mapped on this platform.
    #[error("file too large to map: size={size}, max={max}")]
    FileTooLarge {
        /// Size that was requested or found on disk.
        size: u64,
        /// Largest mappable size.
        max: u64,
    },

    /// The requested operation is not supported by a fixed-size mapping.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Error returned when the combination of open flags is invalid.
    #[error("invalid access mode: {0}")]
    InvalidMode(&'static str),

    /// The source passed to `read_from` failed.
    #[error("source failed after {read} bytes: {source}")]
    Source {
        /// Bytes copied into the region before the failure.
        read: u64,
        /// Underlying source error.
        #[source]
        source: io::Error,
    },

    /// The sink passed to `write_to` failed or stopped accepting bytes.
    #[error("sink failed after {written} bytes: {source}")]
    Sink {
        /// Bytes the sink accepted before the failure.
        written: u64,
        /// Underlying sink error.
        #[source]
        source: io::Error,
    },
}

impl MmapFileError {
    /// Number of bytes moved before the error was raised.
    ///
    /// Zero for errors that are detected before any transfer starts.
    #[must_use]
    pub fn transferred(&self) -> u64 {
        match self {
            Self::OutOfBounds { written, .. } => *written as u64,
            Self::Eof { read } => *read as u64,
            Self::Source { read, .. } => *read,
            Self::Sink { written, .. } => *written,
            _ => 0,
        }
    }

    /// Whether this is the end-of-stream sentinel rather than a hard failure.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof { .. })
    }
}

impl From<MmapFileError> for io::Error {
    fn from(err: MmapFileError) -> Self {
        let kind = match &err {
            MmapFileError::Io(e) => e.kind(),
            MmapFileError::Closed => io::ErrorKind::Other,
            MmapFileError::ReadOnly => io::ErrorKind::PermissionDenied,
            MmapFileError::InvalidWhence(_)
            | MmapFileError::NegativeOffset(_)
            | MmapFileError::OffsetTooLarge
            | MmapFileError::FileTooLarge { .. }
            | MmapFileError::InvalidMode(_) => io::ErrorKind::InvalidInput,
            MmapFileError::OutOfBounds { .. } => io::ErrorKind::WriteZero,
            MmapFileError::Eof { .. } => io::ErrorKind::UnexpectedEof,
            MmapFileError::Unsupported(_) => io::ErrorKind::Unsupported,
            MmapFileError::Source { source, .. } | MmapFileError::Sink { source, .. } => {
                source.kind()
            }
        };
        match err {
            MmapFileError::Io(e) => e,
            other => io::Error::new(kind, other),
        }
    }
}
