//! Durability and lifecycle: sync, close, stat and release on drop.

use std::fs::{self, Metadata};

use log::{debug, error};

use crate::backend::MapRegion;
use crate::errors::Result;
use crate::mmap::{MmapFile, State};

/// Mark the state closed and release its region.
///
/// Returns the release error, which for the buffered backend includes the
/// writeback of a writable buffer.
fn release(state: &mut State) -> Result<()> {
    state.closed = true;
    match state.region.take() {
        Some(region) => region.unmap(),
        None => Ok(()),
    }
}

impl MmapFile {
    /// Flush written bytes to the underlying file.
    ///
    /// No-op for read-only handles and empty regions. Native mappings flush
    /// dirty pages synchronously; the buffered backend rewrites its whole
    /// buffer to the file and syncs it.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Closed` after close.
    /// Returns `MmapFileError::Io` if the flush fails.
    pub fn sync(&self) -> Result<()> {
        let state = self.state.read();
        state.ensure_open()?;
        if !self.is_writable() {
            return Ok(());
        }
        let Some(region) = &state.region else {
            return Ok(());
        };
        region.flush()?;
        debug!("synced {} bytes of {:?}", region.len(), self.name);
        Ok(())
    }

    /// Release the mapping. Idempotent.
    ///
    /// The first call unmaps the region (writing the buffer back first on the
    /// buffered backend) and reports any failure of that release. Later calls
    /// return `Ok(())` without side effects. Waits for outstanding
    /// [`bytes`](Self::bytes) views and in-flight operations to finish.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Io` if releasing the region fails.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.write();
        if state.closed {
            return Ok(());
        }
        let result = release(&mut state);
        debug!("closed {:?}", self.name);
        result
    }

    /// Current on-disk metadata of the file.
    ///
    /// Uses the retained native handle when the backend keeps one, and
    /// re-stats by path otherwise.
    ///
    /// # Errors
    ///
    /// Returns `MmapFileError::Closed` after close.
    /// Returns `MmapFileError::Io` if the metadata query fails.
    pub fn stat(&self) -> Result<Metadata> {
        let state = self.state.read();
        state.ensure_open()?;
        if let Some(file) = state.region.as_ref().and_then(|r| r.file()) {
            return Ok(file.metadata()?);
        }
        Ok(fs::metadata(&self.name)?)
    }
}

impl Drop for MmapFile {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.closed {
            return;
        }
        #[cfg(debug_assertions)]
        log::warn!("{:?} dropped without close(); releasing mapping", self.name);
        if let Err(e) = release(state) {
            error!("failed to release {:?} on drop: {e}", self.name);
        }
    }
}
