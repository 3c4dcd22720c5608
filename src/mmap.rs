//! Memory-mapped file handle with bounds-checked positional access.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::ptr;

use log::debug;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

use crate::backend::{MapRegion, Region};
use crate::errors::{MmapFileError, Result};
use crate::options::{MmapFileBuilder, MmapMode, OpenFlags};
use crate::utils::{clamp_span, ensure_mappable, non_negative};

/// Zero-copy view of the whole mapped region.
///
/// Holds the handle's shared lock, so the region cannot be released while
/// the view is alive.
pub type MappedBytes<'a> = MappedRwLockReadGuard<'a, [u8]>;

/// Everything guarded by the handle's lock: closed flag, region, cursor.
pub(crate) struct State {
    pub(crate) closed: bool,
    pub(crate) region: Option<Region>,
    pub(crate) cursor: u64,
}

impl State {
    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(MmapFileError::Closed);
        }
        Ok(())
    }

    pub(crate) fn total(&self) -> u64 {
        self.region.as_ref().map_or(0, |r| r.len() as u64)
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        match &self.region {
            // SAFETY: the region is live for as long as &self is borrowed.
            Some(r) => unsafe { std::slice::from_raw_parts(r.as_ptr(), r.len()) },
            None => &[],
        }
    }

    /// Copy bytes out of the region starting at `offset`.
    ///
    /// A short or empty copy is reported as `Eof` carrying the count.
    pub(crate) fn copy_out(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let span = self.region.as_ref().and_then(|r| {
            clamp_span(offset, buf.len(), r.len() as u64).map(|span| (r, span))
        });
        let Some((region, (start, n))) = span else {
            return Err(MmapFileError::Eof { read: 0 });
        };
        // SAFETY: clamp_span keeps [start, start + n) inside the region and
        // `buf` is valid for n bytes. `ptr::copy` tolerates overlap.
        unsafe { ptr::copy(region.as_ptr().add(start), buf.as_mut_ptr(), n) };
        if n < buf.len() {
            return Err(MmapFileError::Eof { read: n });
        }
        Ok(n)
    }

    /// Copy bytes into the region starting at `offset`.
    ///
    /// Only the prefix that fits is written; the rest is reported as `OutOfBounds`.
    /// Callers must have checked that the handle is writable.
    pub(crate) fn copy_in(&self, data: &[u8], offset: u64) -> Result<usize> {
        let total = self.total();
        let out_of_bounds = |written| MmapFileError::OutOfBounds {
            offset,
            len: data.len() as u64,
            total,
            written,
        };
        let span = self.region.as_ref().and_then(|r| {
            clamp_span(offset, data.len(), total).map(|span| (r, span))
        });
        let Some((region, (start, n))) = span else {
            return Err(out_of_bounds(0));
        };
        // SAFETY: [start, start + n) lies inside a writable region. `data` may
        // be a view of the region itself (from `bytes()`), so the ranges can
        // overlap and `ptr::copy` is required. Concurrent writers to
        // overlapping ranges race per byte; callers partition ranges.
        unsafe { ptr::copy(data.as_ptr(), region.as_ptr().add(start), n) };
        if n < data.len() {
            return Err(out_of_bounds(n));
        }
        Ok(n)
    }
}

/// A file exposed through a fixed-size memory mapping.
///
/// Offers positional I/O ([`read_at`](Self::read_at), [`write_at`](Self::write_at)),
/// cursor I/O ([`read`](Self::read), [`write`](Self::write), [`seek`](Self::seek))
/// and explicit durability ([`sync`](Self::sync), [`close`](Self::close)).
///
/// All methods take `&self`; the handle is `Send + Sync` and can be shared
/// between threads. Positional calls run under a shared lock and may proceed
/// in parallel; cursor calls and `close` are serialized by an exclusive lock.
///
/// # Examples
///
/// ```no_run
/// use mmap_file::{MmapFile, OpenFlags};
///
/// let file = MmapFile::open_file(
///     "data.bin",
///     OpenFlags::READ_WRITE | OpenFlags::CREATE,
///     0o644,
///     100,
/// )?;
/// file.write_at(b"HELLO", 10)?;
///
/// let mut buf = [0u8; 5];
/// file.read_at(&mut buf, 10)?;
/// assert_eq!(&buf, b"HELLO");
///
/// file.sync()?;
/// file.close()?;
/// # Ok::<(), mmap_file::MmapFileError>(())
/// ```
pub struct MmapFile {
    pub(crate) name: PathBuf,
    pub(crate) mode: MmapMode,
    // Fixed at open; no resize exists
    pub(crate) len: u64,
    pub(crate) state: RwLock<State>,
}

impl std::fmt::Debug for MmapFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapFile")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("len", &self.len)
            .finish()
    }
}

impl MmapFile {
    /// Open an existing file and map it read-only at its current size.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Io` if the file cannot be opened or mapped.
    /// Returns `MmapFileError::FileTooLarge` if the file exceeds the addressable range.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_file(path, OpenFlags::READ_ONLY, 0, 0)
    }

    /// Start building a handle with explicit options.
    pub fn builder<P: AsRef<Path>>(path: P) -> MmapFileBuilder {
        MmapFileBuilder::new(path)
    }

    /// Open a file with the given flags, permission bits and target size, and map it.
    ///
    /// `size` is applied when `CREATE` finds an empty (new) file, or when
    /// `TRUNCATE` is set; otherwise the current on-disk size is used. A
    /// resulting size of zero yields a handle with an empty region.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Unsupported` if `APPEND` is requested.
    /// Returns `MmapFileError::InvalidMode` if `CREATE` or `TRUNCATE` is requested without `READ_WRITE`.
    /// Returns `MmapFileError::FileTooLarge` if the size cannot be mapped.
    /// Returns `MmapFileError::Io` for open, resize, or mapping failures.
    pub fn open_file<P: AsRef<Path>>(
        path: P,
        flags: OpenFlags,
        perm: u32,
        size: u64,
    ) -> Result<Self> {
        if flags.contains(OpenFlags::APPEND) {
            return Err(MmapFileError::Unsupported("append: a mapped file cannot grow"));
        }
        let mode = flags.mode();
        let writable = mode == MmapMode::ReadWrite;
        let create = flags.contains(OpenFlags::CREATE);
        let truncate = flags.contains(OpenFlags::TRUNCATE);
        if (create || truncate) && !writable {
            return Err(MmapFileError::InvalidMode(
                "create and truncate require read-write mode",
            ));
        }

        let path_ref = path.as_ref();
        let mut opts = OpenOptions::new();
        opts.read(true).write(writable).create(create);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(perm);
        }
        #[cfg(not(unix))]
        let _ = perm;
        let file = opts.open(path_ref)?;

        let mut len = file.metadata()?.len();
        if size > 0 && ((create && len == 0) || truncate) {
            ensure_mappable(size)?;
            file.set_len(size)?;
            len = size;
        }
        let map_len = ensure_mappable(len)?;

        let region = if map_len == 0 {
            None
        } else {
            Some(Region::map(file, map_len, writable)?)
        };
        debug!(
            "mapped {:?}: len={} mode={:?} backend={}",
            path_ref,
            len,
            mode,
            <Region as MapRegion>::NAME
        );

        Ok(Self {
            name: path_ref.to_path_buf(),
            mode,
            len,
            state: RwLock::new(State {
                closed: false,
                region,
                cursor: 0,
            }),
        })
    }

    /// Path as presented to the open call.
    #[must_use]
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// Access mode of the handle.
    #[must_use]
    pub fn mode(&self) -> MmapMode {
        self.mode
    }

    /// Whether the handle was opened read-write.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.mode == MmapMode::ReadWrite
    }

    /// Length of the mapped region, fixed at open time.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the mapped region is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if !self.is_writable() {
            return Err(MmapFileError::ReadOnly);
        }
        Ok(())
    }

    /// Read up to `buf.len()` bytes starting at `offset`, independent of the cursor.
    ///
    /// Returns `Eof` carrying the byte count when fewer than `buf.len()`
    /// bytes remain, including zero bytes at or past the end.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Closed` after close.
    /// Returns `MmapFileError::NegativeOffset` if `offset < 0`.
    /// Returns `MmapFileError::Eof` on a short read.
    pub fn read_at(&self, buf: &mut [u8], offset: i64) -> Result<usize> {
        let state = self.state.read();
        state.ensure_open()?;
        let offset = non_negative(offset)?;
        state.copy_out(buf, offset)
    }

    /// Write `data` starting at `offset`, independent of the cursor.
    ///
    /// Bytes that do not fit are dropped and reported through `OutOfBounds`
    /// with the number written. Overlapping concurrent writes race per byte.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Closed` after close.
    /// Returns `MmapFileError::ReadOnly` on a read-only handle.
    /// Returns `MmapFileError::NegativeOffset` if `offset < 0`.
    /// Returns `MmapFileError::OutOfBounds` if the write does not fit.
    pub fn write_at(&self, data: &[u8], offset: i64) -> Result<usize> {
        let state = self.state.read();
        state.ensure_open()?;
        self.ensure_writable()?;
        let offset = non_negative(offset)?;
        state.copy_in(data, offset)
    }

    /// Borrow the whole mapped region without copying.
    ///
    /// The view holds the shared lock: `close` blocks until it is dropped.
    /// Concurrent `write_at` calls may still change the bytes underneath it;
    /// callers coordinate that themselves.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Closed` after close.
    pub fn bytes(&self) -> Result<MappedBytes<'_>> {
        let state = self.state.read();
        state.ensure_open()?;
        Ok(RwLockReadGuard::map(state, State::as_slice))
    }
}
