//! # lumtiff-io
//!
//! HDR TIFF reading and writing.
//!
//! The codec reads RGB (8, 16 and 32-bit float), CMYK and SGI LogLuv TIFFs
//! into linear float frames and writes float, LogLuv, 8-bit and 16-bit
//! TIFFs. Integer data with an embedded ICC profile, or with colorimetric
//! tags, is converted to sRGB through a [`lumtiff_icc::ColorEngine`].
//!
//! # Architecture
//!
//! ```text
//! read:  TiffDecoder -> classify -> resolve -> decode -> Frame
//! write: Frame / Rgba8Image / Rgb16Pixels -> encode -> TiffEncoder
//! ```
//!
//! - [`container`] - baseline TIFF directories, strips and codecs
//! - [`format`] - [`classify`] derives a [`PixelFormat`] from the tags
//! - [`resolve`] - builds the optional color transform
//! - [`decode`] / [`encode`] - scanline and strip loops over the seams
//!   [`ScanlineSource`] and [`StripSink`]
//! - [`HdrReader`] / [`HdrWriter`] - file-level entry points
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lumtiff_io::{read, write_logluv};
//!
//! let frame = read("input.tif")?;
//! write_logluv("output.tif", &frame)?;
//! # Ok::<(), lumtiff_io::FormatError>(())
//! ```
//!
//! # Supported Files
//!
//! | Photometric | Read | Write | Bit Depths | Compression |
//! |-------------|------|-------|------------|-------------|
//! | RGB | Yes | Yes | 8, 16, 32f | None, LZW, Deflate, PackBits |
//! | CMYK | Yes | No | 8, 16, 32f | None, LZW, Deflate, PackBits |
//! | LogLuv | Yes | Yes | 32 | SGILOG, SGILOG24 (read only) |
//!
//! Strips only, contiguous planes only, first image only.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod container;
pub mod decode;
pub mod encode;
pub mod error;
pub mod format;
pub mod options;
pub mod reader;
pub mod resolve;
pub mod writer;

pub use container::{ScanlineSource, StripSink};
pub use encode::{EncodeParams, StripSource};
pub use error::{FormatError, FormatResult};
pub use format::{ColorSpace, PixelFormat, SampleKind, classify};
pub use options::{ReadOptions, WriteCompression, WriteOptions};
pub use reader::{HdrReader, read, read_rgba8};
pub use resolve::EmbeddedProfile;
pub use writer::{HdrWriter, write_float, write_logluv, write_rgb16, write_rgb16_planes, write_rgba8};
