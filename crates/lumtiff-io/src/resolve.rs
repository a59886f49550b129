//! Color transform resolution.
//!
//! Integer RGB and CMYK images are converted to the engine's sRGB reference
//! one scanline at a time. The transform is built from an embedded ICC
//! profile or, for colorimetric TIFFs, from a profile synthesized out of the
//! WhitePoint, PrimaryChromaticities and TransferFunction tags.
//!
//! Nothing here fails hard. A missing or unusable profile simply means the
//! decoder runs without color management.

use crate::container::Directory;
use crate::container::tags::tag;
use crate::error::FormatResult;
use crate::format::{ColorSpace, PixelFormat, SampleKind};
use crate::options::ReadOptions;
use lumtiff_icc::{ColorEngine, Colorimetry, Intent, PixelLayout};
use tracing::{debug, warn};

/// Color description found in a TIFF directory.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddedProfile {
    /// Raw ICC profile from tag 34675.
    Icc(Vec<u8>),
    /// Chromaticities and transfer curves of a colorimetric TIFF.
    Colorimetric(Colorimetry),
}

/// Extracts the color description of a directory.
///
/// The ICC tag wins. Without one, and with
/// [`ReadOptions::colorimetric_fallback`] set, WhitePoint plus
/// PrimaryChromaticities describe an RGB device; TransferFunction is
/// optional.
pub fn embedded_profile(dir: &Directory, options: &ReadOptions) -> Option<EmbeddedProfile> {
    if let Some(icc) = dir.bytes(tag::ICC_PROFILE).filter(|b| !b.is_empty()) {
        debug!(bytes = icc.len(), "embedded ICC profile found");
        return Some(EmbeddedProfile::Icc(icc.to_vec()));
    }
    if !options.colorimetric_fallback {
        debug!("no embedded ICC profile");
        return None;
    }
    let colorimetry = colorimetry(dir)?;
    debug!(white = ?colorimetry.white_point, curves = colorimetry.transfer.is_some(), "colorimetric tags found");
    Some(EmbeddedProfile::Colorimetric(colorimetry))
}

fn colorimetry(dir: &Directory) -> Option<Colorimetry> {
    let white = dir.f64_vec(tag::WHITE_POINT)?;
    let prim = dir.f64_vec(tag::PRIMARY_CHROMATICITIES)?;
    if white.len() < 2 || prim.len() < 6 {
        return None;
    }

    let transfer = dir.u16_vec(tag::TRANSFER_FUNCTION).and_then(|curve| {
        let len = curve.len();
        if len >= 2 && len % 3 == 0 && (len / 3).is_power_of_two() {
            let n = len / 3;
            Some([curve[..n].to_vec(), curve[n..2 * n].to_vec(), curve[2 * n..].to_vec()])
        } else if len >= 2 && len.is_power_of_two() {
            Some([curve.clone(), curve.clone(), curve])
        } else {
            None
        }
    });

    Some(Colorimetry {
        white_point: [white[0], white[1]],
        primaries: [[prim[0], prim[1]], [prim[2], prim[3]], [prim[4], prim[5]]],
        transfer,
    })
}

/// Input and output layouts of the transform for a pixel format.
///
/// Returns `None` for float and LogLuv data, which is never color managed.
pub fn transform_layouts(format: &PixelFormat) -> Option<(PixelLayout, PixelLayout)> {
    match (format.color_space(), format.sample_kind()) {
        (ColorSpace::Rgb, SampleKind::Word) if format.has_alpha() => Some((PixelLayout::Rgba16, PixelLayout::Rgba16)),
        (ColorSpace::Rgb, SampleKind::Word) => Some((PixelLayout::Rgb16, PixelLayout::Rgb16)),
        (ColorSpace::Rgb, SampleKind::Byte) if format.has_alpha() => Some((PixelLayout::Rgba8, PixelLayout::Rgba8)),
        (ColorSpace::Rgb, SampleKind::Byte) => Some((PixelLayout::Rgb8, PixelLayout::Rgba8)),
        (ColorSpace::Cmyk, SampleKind::Word) => Some((PixelLayout::Cmyk16, PixelLayout::Rgba16)),
        (ColorSpace::Cmyk, SampleKind::Byte) => Some((PixelLayout::Cmyk8, PixelLayout::Rgba8)),
        (ColorSpace::Rgb | ColorSpace::Cmyk, SampleKind::Float) => None,
        (ColorSpace::LogLuv, _) => None,
    }
}

/// Builds the transform from the embedded color description to the
/// engine's reference profile.
///
/// Returns `None` when there is nothing to convert, when the profile does
/// not parse, or when the engine cannot build the transform.
pub fn resolve<E: ColorEngine>(
    engine: &E,
    embedded: Option<&EmbeddedProfile>,
    format: &PixelFormat,
) -> Option<E::Transform> {
    let (input_layout, output_layout) = transform_layouts(format)?;
    let embedded = embedded?;

    let opened = match embedded {
        EmbeddedProfile::Icc(bytes) => engine.open_profile(bytes),
        EmbeddedProfile::Colorimetric(c) if format.color_space() == ColorSpace::Rgb => engine.colorimetric_profile(c),
        EmbeddedProfile::Colorimetric(_) => {
            debug!("colorimetric tags ignored for CMYK data");
            return None;
        }
    };
    let profile = match opened {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "embedded profile unusable, decoding without color management");
            return None;
        }
    };

    let reference = engine.reference_profile();
    match engine.create_transform(&profile, input_layout, &reference, output_layout, Intent::Perceptual) {
        Ok(t) => {
            debug!(?input_layout, ?output_layout, "color transform created");
            Some(t)
        }
        Err(e) => {
            warn!(error = %e, "failed to create color transform");
            None
        }
    }
}

/// Serialized reference profile embedded by the 8 and 16-bit writers.
pub fn reference_icc<E: ColorEngine>(engine: &E) -> FormatResult<Vec<u8>> {
    Ok(engine.serialize(&engine.reference_profile())?)
}
