//! ICC error types.

use thiserror::Error;

/// Result type for ICC operations.
pub type IccResult<T> = Result<T, IccError>;

/// Errors that can occur during ICC operations.
#[derive(Debug, Error)]
pub enum IccError {
    /// Failed to create profile.
    #[error("failed to create profile: {0}")]
    CreateFailed(String),

    /// Failed to create transform.
    #[error("failed to create transform: {0}")]
    TransformFailed(String),

    /// Invalid profile data.
    #[error("invalid profile data: {0}")]
    InvalidProfile(String),

    /// Profile color space mismatch.
    #[error("color space mismatch: expected {expected}, got {actual}")]
    ColorSpaceMismatch {
        /// Expected color space.
        expected: String,
        /// Actual color space.
        actual: String,
    },

    /// Pixel buffer handed to a transform is too short.
    #[error("{what} buffer holds {actual} bytes, transform needs {expected}")]
    BufferTooSmall {
        /// Which side of the transform
        what: &'static str,
        /// Bytes needed
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// The pair of pixel layouts has no transform kernel.
    #[error("unsupported pixel layout pair: {input:?} -> {output:?}")]
    UnsupportedLayout {
        /// Input layout
        input: crate::PixelLayout,
        /// Output layout
        output: crate::PixelLayout,
    },
}
