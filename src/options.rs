//! Open flags and the builder used to configure a [`MmapFile`].

use std::path::{Path, PathBuf};

use bitflags::bitflags;

use crate::errors::Result;
use crate::mmap::MmapFile;

/// Default permission bits for newly created files (subject to umask).
pub const DEFAULT_PERMISSIONS: u32 = 0o666;

/// Access mode for a mapped file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MmapMode {
    /// Read-only mapping.
    #[default]
    ReadOnly,
    /// Read-write mapping.
    ReadWrite,
}

bitflags! {
    /// Mode flags accepted by [`MmapFile::open_file`].
    ///
    /// The empty set ([`OpenFlags::READ_ONLY`]) opens for reading only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpenFlags: u32 {
        /// Open for reading and writing.
        const READ_WRITE = 1 << 0;
        /// Create the file if it does not exist; a new file is sized to the requested size.
        const CREATE = 1 << 1;
        /// Resize an existing file to the requested size.
        const TRUNCATE = 1 << 2;
        /// Append mode. Always rejected: a fixed-size mapping cannot grow.
        const APPEND = 1 << 3;
    }
}

impl OpenFlags {
    /// Open for reading only.
    pub const READ_ONLY: Self = Self::empty();

    /// Mapping mode implied by these flags.
    #[must_use]
    pub fn mode(self) -> MmapMode {
        if self.contains(Self::READ_WRITE) {
            MmapMode::ReadWrite
        } else {
            MmapMode::ReadOnly
        }
    }
}

impl From<MmapMode> for OpenFlags {
    fn from(mode: MmapMode) -> Self {
        match mode {
            MmapMode::ReadOnly => Self::READ_ONLY,
            MmapMode::ReadWrite => Self::READ_WRITE,
        }
    }
}

/// Builder for opening a [`MmapFile`] with explicit options.
///
/// # Examples
///
/// ```no_run
/// use mmap_file::{MmapFile, MmapMode};
///
/// let file = MmapFile::builder("data.bin")
///     .mode(MmapMode::ReadWrite)
///     .create(true)
///     .size(4096)
///     .open()?;
/// assert_eq!(file.len(), 4096);
/// # Ok::<(), mmap_file::MmapFileError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MmapFileBuilder {
    path: PathBuf,
    flags: OpenFlags,
    permissions: u32,
    size: u64,
}

impl MmapFileBuilder {
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            flags: OpenFlags::READ_ONLY,
            permissions: DEFAULT_PERMISSIONS,
            size: 0,
        }
    }

    /// Set the access mode.
    #[must_use]
    pub fn mode(mut self, mode: MmapMode) -> Self {
        self.flags.set(OpenFlags::READ_WRITE, mode == MmapMode::ReadWrite);
        self
    }

    /// Create the file if it is missing.
    #[must_use]
    pub fn create(mut self, yes: bool) -> Self {
        self.flags.set(OpenFlags::CREATE, yes);
        self
    }

    /// Resize an existing file to [`size`](Self::size).
    #[must_use]
    pub fn truncate(mut self, yes: bool) -> Self {
        self.flags.set(OpenFlags::TRUNCATE, yes);
        self
    }

    /// Request append mode. Opening will fail with `Unsupported`.
    #[must_use]
    pub fn append(mut self, yes: bool) -> Self {
        self.flags.set(OpenFlags::APPEND, yes);
        self
    }

    /// Permission bits used when the file is created (Unix only).
    #[must_use]
    pub fn permissions(mut self, perm: u32) -> Self {
        self.permissions = perm;
        self
    }

    /// Target size for created or truncated files.
    #[must_use]
    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Flags accumulated so far.
    #[must_use]
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// Open the file with the configured options.
    ///
    /// # Errors
    ///
    /// Returns errors from [`MmapFile::open_file`].
    pub fn open(self) -> Result<MmapFile> {
        MmapFile::open_file(self.path, self.flags, self.permissions, self.size)
    }
}
