//! HDR TIFF writer.
//!
//! # Example
//!
//! ```rust,no_run
//! use lumtiff_core::{Frame, NoProgress};
//! use lumtiff_icc::LcmsEngine;
//! use lumtiff_io::{HdrWriter, StripSource, WriteCompression, WriteOptions};
//!
//! let frame = Frame::filled(64, 32, [0.18, 0.18, 0.18])?;
//! let options = WriteOptions::default().with_compression(WriteCompression::Lzw);
//! HdrWriter::create_with_options("grey.tif", options)?
//!     .write(StripSource::FloatRgb(&frame), &LcmsEngine, &mut NoProgress)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::container::TiffEncoder;
use crate::encode::{EncodeParams, StripSource, encode};
use crate::error::FormatResult;
use crate::options::WriteOptions;
use crate::resolve::reference_icc;
use lumtiff_core::{Frame, NoProgress, Progress, Rgb16Pixels, Rgba8Image};
use lumtiff_icc::{ColorEngine, LcmsEngine};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

/// Writer for float, LogLuv, 8-bit and 16-bit TIFFs.
#[derive(Debug)]
pub struct HdrWriter<W: Write + Seek> {
    encoder: TiffEncoder<W>,
    options: WriteOptions,
}

impl HdrWriter<BufWriter<File>> {
    /// Creates a file with default options.
    pub fn create<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        Self::create_with_options(path, WriteOptions::default())
    }

    /// Creates a file with custom options.
    pub fn create_with_options<P: AsRef<Path>>(path: P, options: WriteOptions) -> FormatResult<Self> {
        let file = File::create(path.as_ref())?;
        Self::with_options(BufWriter::new(file), options)
    }
}

impl<W: Write + Seek> HdrWriter<W> {
    /// Writes to any seekable sink with default options.
    pub fn new(writer: W) -> FormatResult<Self> {
        Self::with_options(writer, WriteOptions::default())
    }

    /// Writes to any seekable sink.
    pub fn with_options(writer: W, options: WriteOptions) -> FormatResult<Self> {
        Ok(Self {
            encoder: TiffEncoder::with_endian(writer, options.endian)?,
            options,
        })
    }

    /// Encodes `source` and finishes the file, returning the sink.
    ///
    /// 8-bit and interleaved 16-bit sources embed the engine's reference
    /// profile.
    pub fn write<E: ColorEngine>(
        mut self,
        source: StripSource<'_>,
        engine: &E,
        progress: &mut dyn Progress,
    ) -> FormatResult<W> {
        let icc = if source.embeds_profile() {
            Some(reference_icc(engine)?)
        } else {
            None
        };
        let params = EncodeParams {
            compression: self.options.compression.scheme(),
            predictor: self.options.predictor,
            icc_profile: icc.as_deref(),
            software: self.options.software.as_deref(),
        };
        encode(&mut self.encoder, &source, &params, progress)?;
        self.encoder.finish()
    }
}

fn write_source<P: AsRef<Path>>(path: P, source: StripSource<'_>) -> FormatResult<()> {
    HdrWriter::create(path)?.write(source, &LcmsEngine, &mut NoProgress)?;
    Ok(())
}

/// Writes linear float RGB with 32-bit samples.
pub fn write_float<P: AsRef<Path>>(path: P, frame: &Frame) -> FormatResult<()> {
    write_source(path, StripSource::FloatRgb(frame))
}

/// Writes CIE XYZ as SGI LogLuv.
pub fn write_logluv<P: AsRef<Path>>(path: P, frame: &Frame) -> FormatResult<()> {
    write_source(path, StripSource::LogLuv(frame))
}

/// Writes 8-bit RGBA with an embedded sRGB profile.
pub fn write_rgba8<P: AsRef<Path>>(path: P, image: &Rgba8Image) -> FormatResult<()> {
    write_source(path, StripSource::Rgba8(image))
}

/// Writes interleaved 16-bit RGB with an embedded sRGB profile.
pub fn write_rgb16<P: AsRef<Path>>(path: P, pixels: &Rgb16Pixels) -> FormatResult<()> {
    write_source(path, StripSource::Rgb16Pixels(pixels))
}

/// Writes float planes narrowed to 16-bit RGB.
pub fn write_rgb16_planes<P: AsRef<Path>>(path: P, frame: &Frame) -> FormatResult<()> {
    write_source(path, StripSource::Rgb16Planes(frame))
}
