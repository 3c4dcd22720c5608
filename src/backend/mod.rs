//! Platform mapping backends.
//!
//! Every backend implements [`MapRegion`]; exactly one is selected at build
//! time and exported as [`Region`]:
//!
//! - **Native** (Unix and Windows): a shared memmap2 mapping. On Unix the
//!   descriptor is released once mapped; on Windows the file handle is retained.
//! - **Fallback** (other targets, or the `buffered` feature): an owned heap
//!   buffer with explicit writeback on flush and unmap.

use std::fs::File;

use crate::errors::Result;

#[cfg(all(any(unix, windows), not(feature = "buffered")))]
mod native;

#[cfg(any(test, feature = "buffered", not(any(unix, windows))))]
mod buffered;

cfg_if::cfg_if! {
    if #[cfg(any(feature = "buffered", not(any(unix, windows))))] {
        pub(crate) type Region = buffered::BufferedRegion;
    } else {
        pub(crate) type Region = native::NativeRegion;
    }
}

/// Capability shared by all mapping backends.
///
/// A region is never empty: zero-length files are represented by the absence
/// of a region, since mapping zero bytes is invalid on most platforms.
pub(crate) trait MapRegion: Send + Sync + Sized {
    /// Short backend name used in log output.
    const NAME: &'static str;

    /// Establish a region of `len` bytes over `file`, taking ownership of the handle.
    fn map(file: File, len: usize, writable: bool) -> Result<Self>;

    /// Base address of the region. Valid for `len()` bytes until `unmap` or drop.
    fn as_ptr(&self) -> *mut u8;

    /// Region length in bytes.
    fn len(&self) -> usize;

    /// Make written bytes durable in the underlying file.
    fn flush(&self) -> Result<()>;

    /// Release the region, reporting any failure of the release itself.
    fn unmap(self) -> Result<()>;

    /// The retained native handle, if the backend keeps one.
    fn file(&self) -> Option<&File>;
}

/// Name of the mapping backend compiled into this build (`"posix"`, `"windows"` or `"buffered"`).
#[must_use]
pub fn backend_name() -> &'static str {
    <Region as MapRegion>::NAME
}
