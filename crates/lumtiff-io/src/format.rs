//! Pixel format classification.
//!
//! [`classify`] looks at the tags of a directory and decides how its pixels
//! are laid out. Everything the decoder does afterwards is keyed on the
//! resulting [`PixelFormat`].
//!
//! | Photometric | Bits | Samples | Result |
//! |-------------|------|---------|--------|
//! | RGB (2) | 8 / 16 / 32f | 3, or 4 with one extra sample | Rgb, Byte / Word / Float |
//! | Separated (5) | 8 / 16 / 32f | 4 | Cmyk, Byte / Word / Float |
//! | LogLuv (32845) | any | any | LogLuv, Float (SGILOG / SGILOG24 only) |

use crate::container::tags::{photometric, planar, sample_format, tag};
use crate::container::{Compression, Directory};
use crate::error::{FormatError, FormatResult};
use tracing::debug;

/// Color model of the stored samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Red, green, blue and an optional alpha.
    Rgb,
    /// Cyan, magenta, yellow and black inks.
    Cmyk,
    /// SGI LogLuv, decoded to CIE XYZ.
    LogLuv,
}

/// Width and type of one decoded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    /// 8-bit unsigned integer.
    Byte,
    /// 16-bit unsigned integer.
    Word,
    /// 32-bit IEEE float.
    Float,
}

impl SampleKind {
    /// Bytes per decoded sample.
    pub fn bytes(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Float => 4,
        }
    }
}

/// How the pixels of a TIFF are laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelFormat {
    color_space: ColorSpace,
    sample_kind: SampleKind,
    samples_per_pixel: u16,
    has_alpha: bool,
    width: u32,
    height: u32,
    compression: Compression,
    stonits: f64,
}

impl PixelFormat {
    /// Color model.
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Sample width and type.
    pub fn sample_kind(&self) -> SampleKind {
        self.sample_kind
    }

    /// Samples per pixel in a decoded scanline.
    pub fn samples_per_pixel(&self) -> u16 {
        self.samples_per_pixel
    }

    /// Whether an RGB image carries one alpha sample.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Image width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Strip compression.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Candela per square metre of a sample value of 1 (STONITS tag, default 1).
    pub fn stonits(&self) -> f64 {
        self.stonits
    }
}

/// Sample kind for integer or float samples of the given depth.
fn sample_kind(dir: &Directory) -> FormatResult<SampleKind> {
    let bits = dir.u16_vec(tag::BITS_PER_SAMPLE).unwrap_or_else(|| vec![1]);
    let depth = bits.first().copied().unwrap_or(1);
    if bits.iter().any(|&b| b != depth) {
        return Err(FormatError::UnsupportedSampleLayout(format!("mixed bits per sample {bits:?}")));
    }
    let format = dir.u16(tag::SAMPLE_FORMAT);

    match (depth, format) {
        (8, None | Some(sample_format::UINT)) => Ok(SampleKind::Byte),
        (16, None | Some(sample_format::UINT)) => Ok(SampleKind::Word),
        (32, None | Some(sample_format::IEEE_FP)) => Ok(SampleKind::Float),
        (8 | 16, Some(f)) => Err(FormatError::UnsupportedSampleLayout(format!(
            "{depth}-bit samples with sample format {f}"
        ))),
        (d, _) => Err(FormatError::UnsupportedBitDepth(d)),
    }
}

/// Derives the pixel format of a directory.
///
/// Checks run in a fixed order: dimensions, planar configuration,
/// photometric interpretation, then the rules of the color model.
///
/// # Errors
///
/// - [`FormatError::InvalidDimensions`] / [`FormatError::MissingTag`] for
///   absent or zero sizes
/// - [`FormatError::UnsupportedPlanarConfig`] for separate planes
/// - [`FormatError::UnsupportedPhotometric`] for anything but RGB, CMYK and
///   LogLuv
/// - [`FormatError::UnsupportedCompression`] for LogLuv without an SGILOG codec
/// - channel count, bit depth and sample layout errors per color model
pub fn classify(dir: &Directory) -> FormatResult<PixelFormat> {
    let width = dir.u32(tag::IMAGE_WIDTH).ok_or(FormatError::MissingTag("ImageWidth"))?;
    let height = dir.u32(tag::IMAGE_LENGTH).ok_or(FormatError::MissingTag("ImageLength"))?;
    if width == 0 || height == 0 {
        return Err(FormatError::InvalidDimensions { width, height });
    }

    let planar = dir.u16(tag::PLANAR_CONFIG).unwrap_or(planar::CONTIG);
    if planar != planar::CONTIG {
        return Err(FormatError::UnsupportedPlanarConfig(planar));
    }

    let photometric = dir
        .u16(tag::PHOTOMETRIC)
        .ok_or(FormatError::MissingTag("PhotometricInterpretation"))?;
    let compression = Compression::from_code(dir.u16(tag::COMPRESSION).unwrap_or(1));
    let stonits = dir.f64(tag::STONITS).unwrap_or(1.0);
    let spp = dir.u16(tag::SAMPLES_PER_PIXEL).unwrap_or(1);

    let (color_space, sample_kind, samples_per_pixel, has_alpha) = match photometric {
        photometric::LOGLUV => {
            if !compression.is_logluv() {
                return Err(FormatError::UnsupportedCompression(format!(
                    "{compression:?} with LogLuv photometric"
                )));
            }
            debug!(?compression, "photometric type: LogLuv");
            (ColorSpace::LogLuv, SampleKind::Float, 3, false)
        }
        photometric::RGB => {
            let extra = dir.get(tag::EXTRA_SAMPLES).map_or(0, |v| v.count());
            if extra > 1 {
                return Err(FormatError::UnsupportedSampleLayout(format!(
                    "{extra} extra samples"
                )));
            }
            if spp as usize != 3 + extra {
                return Err(FormatError::UnsupportedChannelCount(spp));
            }
            let kind = sample_kind(dir)?;
            debug!(?kind, alpha = extra == 1, "photometric type: RGB");
            (ColorSpace::Rgb, kind, spp, extra == 1)
        }
        photometric::SEPARATED => {
            if spp != 4 {
                return Err(FormatError::UnsupportedChannelCount(spp));
            }
            let kind = sample_kind(dir)?;
            debug!(?kind, "photometric type: CMYK");
            (ColorSpace::Cmyk, kind, spp, false)
        }
        other => return Err(FormatError::UnsupportedPhotometric(other)),
    };

    Ok(PixelFormat {
        color_space,
        sample_kind,
        samples_per_pixel,
        has_alpha,
        width,
        height,
        compression,
        stonits,
    })
}
