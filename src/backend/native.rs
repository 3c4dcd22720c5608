//! Native backend: a shared memmap2 mapping (`mmap(2)` on Unix, a file view on Windows).

use std::fs::File;

use memmap2::{MmapOptions, MmapRaw};

use super::MapRegion;
use crate::errors::Result;

/// Shared mapping of a file.
///
/// On Unix the descriptor is closed right after mapping; the kernel keeps the
/// mapping alive until it is dropped. On Windows the handle is retained for
/// stat and flush.
pub(crate) struct NativeRegion {
    map: MmapRaw,
    #[cfg(windows)]
    file: File,
}

impl MapRegion for NativeRegion {
    #[cfg(unix)]
    const NAME: &'static str = "posix";
    #[cfg(windows)]
    const NAME: &'static str = "windows";

    fn map(file: File, len: usize, writable: bool) -> Result<Self> {
        let mut opts = MmapOptions::new();
        opts.len(len);
        let map = if writable {
            opts.map_raw(&file)?
        } else {
            opts.map_raw_read_only(&file)?
        };
        #[cfg(unix)]
        drop(file);
        Ok(Self {
            map,
            #[cfg(windows)]
            file,
        })
    }

    fn as_ptr(&self) -> *mut u8 {
        self.map.as_mut_ptr()
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn flush(&self) -> Result<()> {
        self.map.flush()?;
        #[cfg(windows)]
        self.file.sync_all()?;
        Ok(())
    }

    fn unmap(self) -> Result<()> {
        // memmap2 unmaps on drop; on Windows the handle closes after the view.
        drop(self);
        Ok(())
    }

    #[cfg(windows)]
    fn file(&self) -> Option<&File> {
        Some(&self.file)
    }

    #[cfg(not(windows))]
    fn file(&self) -> Option<&File> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, OpenOptions};
    use std::ptr;
    use tempfile::tempdir;

    fn open_sized(path: &std::path::Path, len: u64) -> File {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .expect("open");
        file.set_len(len).expect("set_len");
        file
    }

    #[test]
    fn shared_writes_reach_the_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("native_shared.bin");
        let region = NativeRegion::map(open_sized(&path, 64), 64, true).expect("map");
        assert_eq!(region.len(), 64);
        assert_eq!(region.file().is_some(), cfg!(windows));

        // SAFETY: 4 bytes at offset 8 lie inside the 64-byte mapping.
        unsafe { ptr::copy_nonoverlapping(b"ping".as_ptr(), region.as_ptr().add(8), 4) };
        region.flush().expect("flush");
        region.unmap().expect("unmap");

        let on_disk = fs::read(&path).expect("read back");
        assert_eq!(&on_disk[8..12], b"ping");
    }

    #[test]
    fn read_only_mapping_sees_file_content() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("native_ro.bin");
        fs::write(&path, b"0123456789").expect("seed");
        let file = File::open(&path).expect("open ro");
        let region = NativeRegion::map(file, 10, false).expect("map");

        // SAFETY: the mapping is 10 bytes long and stays alive for the borrow.
        let view = unsafe { std::slice::from_raw_parts(region.as_ptr(), region.len()) };
        assert_eq!(view, b"0123456789");
    }

    #[test]
    fn read_only_file_cannot_be_mapped_writable() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("native_ro_rw.bin");
        fs::write(&path, b"0123456789").expect("seed");
        let file = File::open(&path).expect("open ro");

        assert!(NativeRegion::map(file, 10, true).is_err());
    }
}
