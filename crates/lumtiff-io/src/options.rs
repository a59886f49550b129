//! Reader and writer options.

use crate::container::{Compression, Endian};

/// Options for reading HDR TIFFs.
///
/// # Example
///
/// ```rust
/// use lumtiff_io::ReadOptions;
///
/// let options = ReadOptions {
///     color_management: false,
///     ..Default::default()
/// };
/// assert!(options.colorimetric_fallback);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Convert integer pixels through the embedded profile. Default: true.
    pub color_management: bool,
    /// Without an ICC profile, build one from WhitePoint,
    /// PrimaryChromaticities and TransferFunction. Default: true.
    pub colorimetric_fallback: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            color_management: true,
            colorimetric_fallback: true,
        }
    }
}

/// Compression for float, 8-bit and 16-bit output.
///
/// LogLuv output always uses SGILOG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteCompression {
    /// Uncompressed strips.
    None,
    /// LZW.
    Lzw,
    /// zlib Deflate.
    #[default]
    Deflate,
    /// PackBits.
    PackBits,
}

impl WriteCompression {
    /// Container compression scheme.
    pub fn scheme(self) -> Compression {
        match self {
            Self::None => Compression::None,
            Self::Lzw => Compression::Lzw,
            Self::Deflate => Compression::Deflate,
            Self::PackBits => Compression::PackBits,
        }
    }
}

/// Options for writing HDR TIFFs.
///
/// # Example
///
/// ```rust
/// use lumtiff_io::{WriteCompression, WriteOptions};
///
/// let options = WriteOptions::default()
///     .with_compression(WriteCompression::Lzw)
///     .with_predictor(true);
/// assert_eq!(options.software.as_deref(), Some("lumtiff"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Strip compression. Default: Deflate.
    pub compression: WriteCompression,
    /// Horizontal differencing for 8 and 16-bit output. Default: off.
    pub predictor: bool,
    /// File byte order. Default: little-endian.
    pub endian: Endian,
    /// Software tag. Default: `"lumtiff"`.
    pub software: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: WriteCompression::default(),
            predictor: false,
            endian: Endian::Little,
            software: Some("lumtiff".to_string()),
        }
    }
}

impl WriteOptions {
    /// Sets the strip compression.
    pub fn with_compression(mut self, compression: WriteCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Enables or disables the horizontal predictor.
    pub fn with_predictor(mut self, predictor: bool) -> Self {
        self.predictor = predictor;
        self
    }

    /// Sets the file byte order.
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Sets or clears the Software tag.
    pub fn with_software(mut self, software: Option<String>) -> Self {
        self.software = software;
        self
    }
}
