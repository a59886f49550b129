//! Error types for TIFF reading and writing.
//!
//! Classification and open failures abort construction of a reader;
//! scanline and strip failures abort the running operation. Transform
//! construction failures never show up here, the resolver recovers from
//! them by decoding without color management.

use lumtiff_core::CoreError;
use lumtiff_icc::IccError;
use std::io;
use thiserror::Error;

/// TIFF codec error.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Photometric interpretation other than RGB, Separated or LogLuv.
    #[error("unsupported photometric interpretation: {0}")]
    UnsupportedPhotometric(u16),

    /// Compression the codec cannot handle for this kind of data.
    #[error("unsupported compression: {0}")]
    UnsupportedCompression(String),

    /// Planar configuration other than contiguous.
    #[error("unsupported planar configuration: {0}")]
    UnsupportedPlanarConfig(u16),

    /// Bits per sample other than 8, 16 or 32-bit float.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    /// Wrong number of color samples per pixel.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannelCount(u16),

    /// Extra samples or sample formats the codec does not handle.
    #[error("unsupported sample layout: {0}")]
    UnsupportedSampleLayout(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A working buffer could not be allocated.
    #[error("out of memory allocating {0} bytes")]
    OutOfMemory(usize),

    /// The operation was called in a state it does not support.
    #[error("invalid precondition: {0}")]
    InvalidPrecondition(String),

    /// Zero-sized or overflowing image dimensions.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// A required tag is absent.
    #[error("missing required tag: {0}")]
    MissingTag(&'static str),

    /// Corrupt container structure.
    #[error("malformed TIFF: {0}")]
    Malformed(String),

    /// Valid TIFF feature the codec does not implement (tiles, BigTIFF).
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Color management failure that cannot be recovered locally.
    #[error("color management: {0}")]
    Icc(#[from] IccError),
}

/// Result type for TIFF codec operations.
pub type FormatResult<T> = Result<T, FormatError>;

impl From<CoreError> for FormatError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AllocationFailed { requested } => FormatError::OutOfMemory(requested),
            CoreError::InvalidDimensions { width, height } => {
                FormatError::InvalidDimensions { width, height }
            }
            other @ CoreError::PlaneLength { .. } => {
                FormatError::InvalidPrecondition(other.to_string())
            }
        }
    }
}

/// Allocates an empty byte buffer with room for `capacity` bytes,
/// reporting failure instead of aborting.
pub(crate) fn reserved_bytes(capacity: usize) -> FormatResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| FormatError::OutOfMemory(capacity))?;
    Ok(buf)
}

/// Allocates a zeroed byte buffer, reporting failure instead of aborting.
pub(crate) fn zeroed_bytes(len: usize) -> FormatResult<Vec<u8>> {
    let mut buf = reserved_bytes(len)?;
    buf.resize(len, 0);
    Ok(buf)
}
