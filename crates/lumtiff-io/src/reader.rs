//! HDR TIFF reader.
//!
//! [`HdrReader`] opens a file, classifies its pixels and looks up its color
//! description once. Each read call then resolves a color transform,
//! decodes every scanline and drops the transform again.
//!
//! # Example
//!
//! ```rust,no_run
//! use lumtiff_core::NoProgress;
//! use lumtiff_icc::LcmsEngine;
//! use lumtiff_io::HdrReader;
//!
//! let mut reader = HdrReader::open("scan.tif")?;
//! println!("{:?} {:?}", reader.format().color_space(), reader.format().sample_kind());
//! let frame = reader.read_frame(&LcmsEngine, &mut NoProgress)?;
//! println!("{}x{}", frame.width(), frame.height());
//! # Ok::<(), lumtiff_io::FormatError>(())
//! ```

use crate::container::{Directory, LogLuvFormat, TiffDecoder};
use crate::decode::{decode, decode_rgba8};
use crate::error::FormatResult;
use crate::format::{ColorSpace, PixelFormat, classify};
use crate::options::ReadOptions;
use crate::resolve::{EmbeddedProfile, embedded_profile, resolve};
use lumtiff_core::{Frame, NoProgress, Progress, Rgba8Image};
use lumtiff_icc::{ColorEngine, LcmsEngine, PixelTransform};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::debug;

/// Reader for RGB, CMYK and LogLuv TIFFs.
#[derive(Debug)]
pub struct HdrReader<R> {
    decoder: TiffDecoder<R>,
    format: PixelFormat,
    embedded: Option<EmbeddedProfile>,
    options: ReadOptions,
}

impl HdrReader<BufReader<File>> {
    /// Opens a file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        Self::open_with_options(path, ReadOptions::default())
    }

    /// Opens a file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ReadOptions) -> FormatResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::with_options(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> HdrReader<R> {
    /// Reads from any seekable source with default options.
    pub fn new(reader: R) -> FormatResult<Self> {
        Self::with_options(reader, ReadOptions::default())
    }

    /// Reads from any seekable source.
    ///
    /// # Errors
    ///
    /// Container and classification errors; no reader is built for a file
    /// the decoder cannot handle.
    pub fn with_options(reader: R, options: ReadOptions) -> FormatResult<Self> {
        let mut decoder = TiffDecoder::new(reader)?;
        let format = classify(decoder.directory())?;
        if format.color_space() == ColorSpace::LogLuv {
            decoder.set_logluv_format(LogLuvFormat::Float);
        }
        let embedded = embedded_profile(decoder.directory(), &options);
        debug!(
            bits = format.sample_kind().bytes() * 8,
            samples = format.samples_per_pixel(),
            profile = embedded.is_some(),
            "opened HDR TIFF"
        );
        Ok(Self {
            decoder,
            format,
            embedded,
            options,
        })
    }

    /// Pixel format of the image.
    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    /// Candela per square metre of a sample value of 1.
    pub fn stonits(&self) -> f64 {
        self.format.stonits()
    }

    /// Embedded ICC profile or colorimetric description.
    pub fn embedded_profile(&self) -> Option<&EmbeddedProfile> {
        self.embedded.as_ref()
    }

    /// Tags of the image.
    pub fn directory(&self) -> &Directory {
        self.decoder.directory()
    }

    fn transform<E: ColorEngine>(&self, engine: &E) -> Option<E::Transform> {
        if !self.options.color_management {
            return None;
        }
        resolve(engine, self.embedded.as_ref(), &self.format)
    }

    /// Decodes the image into a linear float frame.
    pub fn read_frame<E: ColorEngine>(&mut self, engine: &E, progress: &mut dyn Progress) -> FormatResult<Frame> {
        let transform = self.transform(engine);
        decode(
            &mut self.decoder,
            &self.format,
            transform.as_ref().map(|t| t as &dyn PixelTransform),
            progress,
        )
    }

    /// Decodes an 8-bit image into RGBA8 pixels for display.
    pub fn read_rgba8<E: ColorEngine>(&mut self, engine: &E, progress: &mut dyn Progress) -> FormatResult<Rgba8Image> {
        let transform = self.transform(engine);
        decode_rgba8(
            &mut self.decoder,
            &self.format,
            transform.as_ref().map(|t| t as &dyn PixelTransform),
            progress,
        )
    }
}

/// Reads a TIFF into a linear float frame, color managed with Little CMS.
///
/// # Example
///
/// ```rust,no_run
/// let frame = lumtiff_io::read("render.tif")?;
/// # Ok::<(), lumtiff_io::FormatError>(())
/// ```
pub fn read<P: AsRef<Path>>(path: P) -> FormatResult<Frame> {
    HdrReader::open(path)?.read_frame(&LcmsEngine, &mut NoProgress)
}

/// Reads an 8-bit TIFF into display-ready RGBA8 pixels.
pub fn read_rgba8<P: AsRef<Path>>(path: P) -> FormatResult<Rgba8Image> {
    HdrReader::open(path)?.read_rgba8(&LcmsEngine, &mut NoProgress)
}
