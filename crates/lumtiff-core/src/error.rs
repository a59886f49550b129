//! Error types for lumtiff-core operations.
//!
//! # Overview
//!
//! The [`CoreError`] enum covers the failure modes of the in-memory image
//! containers:
//! - Buffer allocation for large frames
//! - Construction from caller-supplied planes or pixel buffers
//!
//! # Usage
//!
//! ```rust
//! use lumtiff_core::{CoreError, Frame};
//!
//! let err = Frame::from_planes(2, 2, vec![0.0; 4], vec![0.0; 4], vec![0.0; 3]).unwrap_err();
//! assert!(matches!(err, CoreError::PlaneLength { .. }));
//! ```

use thiserror::Error;

/// Result type alias using [`CoreError`] as the error type.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while building image containers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Memory allocation failed.
    ///
    /// Returned when the system cannot reserve the requested buffer. This
    /// typically happens with very large images.
    #[error("failed to allocate {requested} bytes")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
    },

    /// Invalid image dimensions.
    ///
    /// Returned when width or height is zero, or when the pixel count
    /// overflows `usize`.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// A plane or pixel buffer has the wrong number of elements.
    #[error("{what} has {actual} elements, expected {expected}")]
    PlaneLength {
        /// Which buffer was wrong
        what: &'static str,
        /// Expected element count
        expected: usize,
        /// Actual element count
        actual: usize,
    },
}

/// Number of pixels in a `width` x `height` image, rejecting empty or
/// overflowing sizes.
pub(crate) fn pixel_count(width: u32, height: u32) -> CoreResult<usize> {
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(CoreError::InvalidDimensions { width, height })
}

/// Allocates a zero-filled vector without aborting on allocation failure.
pub(crate) fn try_zeroed<T: Copy + Default>(len: usize) -> CoreResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| CoreError::AllocationFailed {
            requested: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    buf.resize(len, T::default());
    Ok(buf)
}
