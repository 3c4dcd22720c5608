//! In-memory fallback backend for targets without a native mapping primitive.
//!
//! The whole file is read into an owned buffer at map time. Writes stay in
//! process memory until `flush` or `unmap` writes the buffer back.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::ptr::NonNull;

use super::MapRegion;
use crate::errors::Result;

/// Heap buffer standing in for a mapping, plus the file it mirrors.
pub(crate) struct BufferedRegion {
    buf: NonNull<[u8]>,
    file: File,
    writable: bool,
}

// SAFETY: the buffer is uniquely owned by the region; concurrent access goes
// through raw pointers under the handle's lock discipline.
unsafe impl Send for BufferedRegion {}
unsafe impl Sync for BufferedRegion {}

impl BufferedRegion {
    fn contents(&self) -> &[u8] {
        // SAFETY: buf is a live allocation of len() bytes owned by self.
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.len()) }
    }

    fn write_back(&self) -> Result<()> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(self.contents())?;
        Ok(())
    }
}

impl MapRegion for BufferedRegion {
    const NAME: &'static str = "buffered";

    fn map(mut file: File, len: usize, writable: bool) -> Result<Self> {
        let mut data = vec![0u8; len];
        file.read_exact(&mut data)?;
        let buf = NonNull::from(Box::leak(data.into_boxed_slice()));
        Ok(Self {
            buf,
            file,
            writable,
        })
    }

    fn as_ptr(&self) -> *mut u8 {
        self.buf.as_ptr().cast::<u8>()
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn flush(&self) -> Result<()> {
        if !self.writable {
            return Ok(());
        }
        self.write_back()?;
        self.file.sync_all()?;
        Ok(())
    }

    fn unmap(self) -> Result<()> {
        let result = if self.writable { self.write_back() } else { Ok(()) };
        drop(self);
        result
    }

    fn file(&self) -> Option<&File> {
        Some(&self.file)
    }
}

impl Drop for BufferedRegion {
    fn drop(&mut self) {
        // SAFETY: buf came from Box::leak in map() and is released exactly once here.
        unsafe { drop(Box::from_raw(self.buf.as_ptr())) };
    }
}
