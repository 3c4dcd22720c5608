//! High-level API for opening mapped files.
//!
//! Provides convenience functions that wrap [`MmapFile::open_file`].

use std::path::Path;

use crate::errors::{MmapFileError, Result};
use crate::mmap::MmapFile;
use crate::options::{MmapMode, OpenFlags, DEFAULT_PERMISSIONS};

/// Create (or resize) a file to `size` bytes and map it read-write.
///
/// # Errors
///
/// Returns `MmapFileError::InvalidMode` if size is zero.
/// Returns errors from `MmapFile::open_file`.
pub fn create_mmap<P: AsRef<Path>>(path: P, size: u64) -> Result<MmapFile> {
    if size == 0 {
        return Err(MmapFileError::InvalidMode("size must be greater than zero"));
    }
    MmapFile::open_file(
        path,
        OpenFlags::READ_WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
        DEFAULT_PERMISSIONS,
        size,
    )
}

/// Map an existing file at its current size in the requested mode.
///
/// # Errors
///
/// Returns errors from `MmapFile::open_file`.
pub fn load_mmap<P: AsRef<Path>>(path: P, mode: MmapMode) -> Result<MmapFile> {
    MmapFile::open_file(path, mode.into(), DEFAULT_PERMISSIONS, 0)
}

#[cfg(feature = "async")]
pub mod r#async {
    //! Async helpers (Tokio) that keep blocking open and sync calls off the async workers.
    use std::io;
    use std::path::Path;
    use std::sync::Arc;

    use tokio::fs as tfs;

    use crate::errors::{MmapFileError, Result};
    use crate::mmap::MmapFile;
    use crate::options::{MmapMode, OpenFlags};

    fn join_error(e: tokio::task::JoinError) -> io::Error {
        io::Error::other(e.to_string())
    }

    /// Run [`MmapFile::open_file`] on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns errors from `MmapFile::open_file`, or `MmapFileError::Io` if the task fails.
    pub async fn open_file_async<P: AsRef<Path>>(
        path: P,
        flags: OpenFlags,
        perm: u32,
        size: u64,
    ) -> Result<MmapFile> {
        let path = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || MmapFile::open_file(path, flags, perm, size))
            .await
            .map_err(join_error)?
    }

    /// Create a file with the specified size asynchronously, then map it read-write.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::InvalidMode` if size is zero.
    /// Returns errors from async file operations or mapping.
    pub async fn create_mmap_async<P: AsRef<Path>>(path: P, size: u64) -> Result<MmapFile> {
        if size == 0 {
            return Err(MmapFileError::InvalidMode("size must be greater than zero"));
        }
        let path_ref = path.as_ref();
        let file = tfs::OpenOptions::new()
            .create(true)
            .write(true)
            .read(true)
            .truncate(true)
            .open(path_ref)
            .await?;
        file.set_len(size).await?;
        drop(file);
        open_file_async(path_ref, MmapMode::ReadWrite.into(), 0, 0).await
    }

    /// Run [`MmapFile::sync`] on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns errors from `MmapFile::sync`, or `MmapFileError::Io` if the task fails.
    pub async fn sync_async(file: Arc<MmapFile>) -> Result<()> {
        tokio::task::spawn_blocking(move || file.sync())
            .await
            .map_err(join_error)?
    }
}
