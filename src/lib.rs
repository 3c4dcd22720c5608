//! # mmap-file: file-like I/O over a fixed-size memory mapping
//!
//! This crate exposes a mapped file through the operations of an ordinary file
//! handle (cursor reads and writes, seek, positional reads and writes, sync,
//! stat, close) without a system call per transfer.
//!
//! ## Features
//!
//! - **Bounds-checked**: no call ever touches memory outside the mapped region
//! - **Concurrent positional I/O**: `read_at`/`write_at` share one lock and run in parallel
//! - **Partial results**: every error that follows a transfer carries the byte count
//! - **Cross-platform**: POSIX `mmap`, Windows views via memmap2, and an in-memory fallback
//! - **Deterministic release**: idempotent `close`, and release on drop as a safety net
//!
//! ## Quick Start
//!
//! ```no_run
//! use mmap_file::{MmapFile, OpenFlags, Whence};
//!
//! // Create a 100-byte file and map it read-write
//! let file = MmapFile::open_file(
//!     "data.bin",
//!     OpenFlags::READ_WRITE | OpenFlags::CREATE,
//!     0o644,
//!     100,
//! )?;
//!
//! file.write_str("Hello, mmap!")?;
//! file.seek(0, Whence::Start)?;
//!
//! let mut buf = [0u8; 12];
//! file.read(&mut buf)?;
//! assert_eq!(&buf, b"Hello, mmap!");
//!
//! // Ensure data is persisted, then release the mapping
//! file.sync()?;
//! file.close()?;
//! # Ok::<(), mmap_file::MmapFileError>(())
//! ```
//!
//! ## Modules
//!
//! - [`errors`]: Error type and partial-transfer accounting
//! - [`utils`]: Size validation and range clamping
//! - [`options`]: Open flags, access modes and the builder
//! - [`mmap`]: Core `MmapFile` handle and positional I/O
//! - [`cursor`]: Cursor I/O, `Whence`, and `std::io` adapters
//! - [`flush`]: Sync, close and stat
//! - [`manager`]: High-level convenience functions
//!
//! ## Feature Flags
//!
//! - `async`: Tokio-based helpers in `manager::async`
//! - `buffered`: Use the in-memory fallback backend on every platform

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(missing_docs)]

mod backend;

pub mod cursor;
pub mod errors;
pub mod flush;
pub mod manager;
pub mod mmap;
pub mod options;
pub mod utils;

pub use backend::backend_name;
pub use cursor::Whence;
pub use errors::{MmapFileError, Result};
pub use manager::{create_mmap, load_mmap};
pub use mmap::{MappedBytes, MmapFile};
pub use options::{MmapFileBuilder, MmapMode, OpenFlags};
