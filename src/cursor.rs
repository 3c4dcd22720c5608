//! Cursor-based streaming I/O and `std::io` adapters for [`MmapFile`].

use std::io::{self, Read, Seek, SeekFrom, Write};

use log::trace;

use crate::backend::MapRegion;
use crate::errors::{MmapFileError, Result};
use crate::mmap::MmapFile;
use crate::utils::non_negative;

/// Origin for [`MmapFile::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Relative to the start of the region.
    Start,
    /// Relative to the current cursor.
    Current,
    /// Relative to the end of the region.
    End,
}

impl TryFrom<i32> for Whence {
    type Error = MmapFileError;

    /// Map the conventional raw values 0, 1 and 2.
    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(Self::Start),
            1 => Ok(Self::Current),
            2 => Ok(Self::End),
            other => Err(MmapFileError::InvalidWhence(other)),
        }
    }
}

fn moved(result: &Result<usize>) -> u64 {
    match result {
        Ok(n) => *n as u64,
        Err(e) => e.transferred(),
    }
}

impl MmapFile {
    /// Read from the cursor and advance it by the bytes read.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Closed` after close.
    /// Returns `MmapFileError::Eof` on a short read; `Eof { read: 0 }` once the
    /// cursor is at or past the end.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.state.write();
        state.ensure_open()?;
        let result = state.copy_out(buf, state.cursor);
        state.cursor += moved(&result);
        result
    }

    /// Write at the cursor and advance it by the bytes written.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Closed` after close.
    /// Returns `MmapFileError::ReadOnly` on a read-only handle.
    /// Returns `MmapFileError::OutOfBounds` if the data does not fit; the
    /// fitting prefix is still written and the cursor advanced past it.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        let mut state = self.state.write();
        state.ensure_open()?;
        self.ensure_writable()?;
        let result = state.copy_in(data, state.cursor);
        state.cursor += moved(&result);
        result
    }

    /// Write the bytes of `s` at the cursor. See [`write`](Self::write).
    ///
    /// # Errors
    ///
    /// Same as [`write`](Self::write).
    pub fn write_str(&self, s: &str) -> Result<usize> {
        self.write(s.as_bytes())
    }

    /// Move the cursor to `delta` relative to `whence` and return the new position.
    ///
    /// Positions past the end are allowed: the next read reports `Eof` and the
    /// next write fails with `OutOfBounds`.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Closed` after close.
    /// Returns `MmapFileError::NegativeOffset` if the target is before the start.
    /// Returns `MmapFileError::OffsetTooLarge` if the target overflows.
    pub fn seek(&self, delta: i64, whence: Whence) -> Result<u64> {
        let mut state = self.state.write();
        state.ensure_open()?;
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => {
                i64::try_from(state.cursor).map_err(|_| MmapFileError::OffsetTooLarge)?
            }
            Whence::End => i64::try_from(self.len).map_err(|_| MmapFileError::OffsetTooLarge)?,
        };
        let target = base
            .checked_add(delta)
            .ok_or(MmapFileError::OffsetTooLarge)?;
        let target = non_negative(target)?;
        state.cursor = target;
        trace!("seek {:?} {delta} {:?} -> {target}", self.name, whence);
        Ok(target)
    }

    /// Copy from `source` into the region starting at the cursor, until the
    /// source is exhausted or the region is full. Returns the bytes copied.
    ///
    /// The exclusive lock is held for the whole call. When the region fills
    /// up, one more byte is probed from the source; if any data (or an error)
    /// comes back, the call fails with `OutOfBounds` carrying the count.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Closed` after close.
    /// Returns `MmapFileError::ReadOnly` on a read-only handle.
    /// Returns `MmapFileError::OutOfBounds` if the source holds more than fits.
    /// Returns `MmapFileError::Source` if the source fails before the region is full.
    #[allow(clippy::cast_possible_truncation)]
    pub fn read_from<R: Read + ?Sized>(&self, source: &mut R) -> Result<u64> {
        let mut state = self.state.write();
        state.ensure_open()?;
        self.ensure_writable()?;

        let start = state.cursor;
        let total = state.total();
        let base = state.region.as_ref().map(|r| r.as_ptr());
        let mut read = 0u64;

        if let Some(base) = base {
            while state.cursor < total {
                // cursor < total <= isize::MAX, so both casts are lossless
                let at = state.cursor as usize;
                let room = (total - state.cursor) as usize;
                // SAFETY: [at, at + room) is inside the region, which stays
                // mapped while the exclusive lock is held; no other borrow of
                // the region can exist under that lock.
                let dst = unsafe { std::slice::from_raw_parts_mut(base.add(at), room) };
                match source.read(dst) {
                    Ok(0) => return Ok(read),
                    Ok(n) => {
                        read += n as u64;
                        state.cursor += n as u64;
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(MmapFileError::Source { read, source: e }),
                }
            }
        }

        let mut probe = [0u8; 1];
        loop {
            match source.read(&mut probe) {
                Ok(0) => return Ok(read),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                _ => break,
            }
        }
        Err(MmapFileError::OutOfBounds {
            offset: start,
            len: read + 1,
            total,
            written: read as usize,
        })
    }

    /// Write the whole region to `sink`, independent of the cursor.
    ///
    /// Returns the number of bytes the sink accepted.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Closed` after close.
    /// Returns `MmapFileError::Sink` with the accepted count if the sink fails
    /// or stops accepting bytes.
    pub fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> Result<u64> {
        let state = self.state.read();
        state.ensure_open()?;
        let data = state.as_slice();
        let mut written = 0usize;
        while written < data.len() {
            match sink.write(&data[written..]) {
                Ok(0) => {
                    return Err(MmapFileError::Sink {
                        written: written as u64,
                        source: io::ErrorKind::WriteZero.into(),
                    })
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(MmapFileError::Sink {
                        written: written as u64,
                        source: e,
                    })
                }
            }
        }
        Ok(written as u64)
    }
}

impl Read for &MmapFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match MmapFile::read(*self, buf) {
            Ok(n) | Err(MmapFileError::Eof { read: n }) => Ok(n),
            Err(e) => Err(e.into()),
        }
    }
}

impl Write for &MmapFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match MmapFile::write(*self, buf) {
            Ok(n) => Ok(n),
            Err(MmapFileError::OutOfBounds { written, .. }) if written > 0 => Ok(written),
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        MmapFile::sync(*self).map_err(Into::into)
    }
}

impl Seek for &MmapFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (delta, whence) = match pos {
            SeekFrom::Start(n) => (
                i64::try_from(n).map_err(|_| MmapFileError::OffsetTooLarge)?,
                Whence::Start,
            ),
            SeekFrom::Current(d) => (d, Whence::Current),
            SeekFrom::End(d) => (d, Whence::End),
        };
        MmapFile::seek(*self, delta, whence).map_err(Into::into)
    }
}

impl Read for MmapFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(&mut &*self, buf)
    }
}

impl Write for MmapFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut &*self)
    }
}

impl Seek for MmapFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Seek::seek(&mut &*self, pos)
    }
}
