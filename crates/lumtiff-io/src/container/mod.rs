//! Baseline TIFF container: directories, strips and strip codecs.
//!
//! The codec layers above only see two seams:
//!
//! - [`ScanlineSource`], something that hands out decoded rows
//! - [`StripSink`], something that accepts tags and uncompressed strips
//!
//! [`TiffDecoder`] and [`TiffEncoder`] implement them for real files; tests
//! implement them in memory.

mod compression;
mod decoder;
mod encoder;
mod ifd;
pub mod logluv;
pub mod tags;
mod uv_rows;

pub use decoder::{LogLuvFormat, TiffDecoder};
pub use encoder::TiffEncoder;
pub use ifd::{Directory, Endian, Value};
pub use tags::Compression;

use crate::error::FormatResult;

/// Row-by-row access to decoded pixel data.
pub trait ScanlineSource {
    /// Image width and height.
    fn dimensions(&self) -> (u32, u32);

    /// Bytes in one decoded scanline.
    fn scanline_size(&self) -> usize;

    /// Decodes `row` into the front of `buf`.
    fn read_scanline(&mut self, row: u32, buf: &mut [u8]) -> FormatResult<()>;
}

/// Strip-by-strip output of pixel data.
pub trait StripSink {
    /// Tags of the image being written.
    fn directory_mut(&mut self) -> &mut Directory;

    /// Uncompressed bytes of a full strip, derived from the current tags.
    fn strip_size(&self) -> FormatResult<usize>;

    /// Number of strips, derived from the current tags.
    fn strip_count(&self) -> FormatResult<u32>;

    /// Encodes and writes one strip.
    fn write_encoded_strip(&mut self, strip: u32, data: &[u8]) -> FormatResult<()>;
}
