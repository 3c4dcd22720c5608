//! Utility helpers for size validation and safe range calculations.

use crate::errors::{MmapFileError, Result};

/// Largest region size that can be mapped: slices may not exceed `isize::MAX` bytes.
pub const MAX_MAP_SIZE: u64 = isize::MAX as u64;

/// Validate that `size` fits the addressable range and convert it to `usize`.
///
/// # Errors
///
/// Returns `MmapFileError::FileTooLarge` if `size` exceeds [`MAX_MAP_SIZE`].
#[allow(clippy::cast_possible_truncation)]
pub fn ensure_mappable(size: u64) -> Result<usize> {
    if size > MAX_MAP_SIZE {
        return Err(MmapFileError::FileTooLarge {
            size,
            max: MAX_MAP_SIZE,
        });
    }
    // Bounded by isize::MAX above, so it fits usize
    Ok(size as usize)
}

/// Reject negative offsets.
///
/// # Errors
///
/// Returns `MmapFileError::NegativeOffset` if `offset < 0`.
#[allow(clippy::cast_sign_loss)]
pub fn non_negative(offset: i64) -> Result<u64> {
    if offset < 0 {
        return Err(MmapFileError::NegativeOffset(offset));
    }
    Ok(offset as u64)
}

/// Clamp a transfer of `want` bytes starting at `offset` to a region of `total` bytes.
///
/// Returns the start index and the number of bytes that fit, or `None` when
/// `offset` is at or past the end of the region.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn clamp_span(offset: u64, want: usize, total: u64) -> Option<(usize, usize)> {
    if offset >= total {
        return None;
    }
    // total fits usize because every region was validated by ensure_mappable
    let available = (total - offset) as usize;
    Some((offset as usize, want.min(available)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mappable_limits() {
        assert_eq!(ensure_mappable(0).expect("zero"), 0);
        assert_eq!(ensure_mappable(4096).expect("page"), 4096);
        assert!(matches!(
            ensure_mappable(u64::MAX),
            Err(MmapFileError::FileTooLarge { size: u64::MAX, .. })
        ));
    }

    #[test]
    fn negative_offsets_rejected() {
        assert_eq!(non_negative(0).expect("zero"), 0);
        assert_eq!(non_negative(42).expect("positive"), 42);
        assert!(matches!(
            non_negative(-1),
            Err(MmapFileError::NegativeOffset(-1))
        ));
    }

    #[test]
    fn clamp_span_edges() {
        assert_eq!(clamp_span(0, 10, 100), Some((0, 10)));
        assert_eq!(clamp_span(95, 10, 100), Some((95, 5)));
        assert_eq!(clamp_span(99, 0, 100), Some((99, 0)));
        assert_eq!(clamp_span(100, 1, 100), None);
        assert_eq!(clamp_span(0, 1, 0), None);
    }
}
