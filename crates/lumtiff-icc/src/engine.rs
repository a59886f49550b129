//! Color-management seam used by the codec.
//!
//! The decoder and encoder never talk to lcms2 directly. They ask a
//! [`ColorEngine`] for profiles and transforms and run the resulting
//! [`PixelTransform`] over packed scanlines. [`LcmsEngine`] is the
//! production engine; [`crate::fake::FakeEngine`] is a deterministic
//! stand-in for tests.

use crate::{Colorimetry, IccError, IccResult, Intent, PixelLayout, Profile, Transform};
use tracing::debug;

/// A conversion over packed scanline pixels.
pub trait PixelTransform {
    /// Layout of the input buffer.
    fn input_layout(&self) -> PixelLayout;

    /// Layout of the output buffer.
    fn output_layout(&self) -> PixelLayout;

    /// Converts `pixel_count` pixels from `input` into `output`.
    ///
    /// # Errors
    ///
    /// [`IccError::BufferTooSmall`] if either buffer is shorter than
    /// `pixel_count` pixels of its layout.
    fn apply(&self, input: &[u8], output: &mut [u8], pixel_count: usize) -> IccResult<()>;
}

/// Factory for profiles and transforms.
pub trait ColorEngine {
    /// Parsed profile handle.
    type Profile;
    /// Transform produced by [`ColorEngine::create_transform`].
    type Transform: PixelTransform;

    /// Parses an embedded ICC profile.
    fn open_profile(&self, icc: &[u8]) -> IccResult<Self::Profile>;

    /// Synthesizes an RGB profile from colorimetric TIFF tags.
    fn colorimetric_profile(&self, colorimetry: &Colorimetry) -> IccResult<Self::Profile>;

    /// The sRGB reference profile decoded pixels are converted to.
    fn reference_profile(&self) -> Self::Profile;

    /// Builds a transform between two profiles.
    fn create_transform(
        &self,
        input: &Self::Profile,
        input_layout: PixelLayout,
        output: &Self::Profile,
        output_layout: PixelLayout,
        intent: Intent,
    ) -> IccResult<Self::Transform>;

    /// Serializes a profile to ICC bytes.
    fn serialize(&self, profile: &Self::Profile) -> IccResult<Vec<u8>>;
}

/// Validates buffer sizes for `pixel_count` pixels and returns the exact
/// input and output byte lengths.
pub(crate) fn checked_lengths<T: PixelTransform + ?Sized>(
    transform: &T,
    input: &[u8],
    output: &[u8],
    pixel_count: usize,
) -> IccResult<(usize, usize)> {
    let src_len = pixel_count.saturating_mul(transform.input_layout().bytes_per_pixel());
    let dst_len = pixel_count.saturating_mul(transform.output_layout().bytes_per_pixel());
    if input.len() < src_len {
        return Err(IccError::BufferTooSmall {
            what: "input",
            expected: src_len,
            actual: input.len(),
        });
    }
    if output.len() < dst_len {
        return Err(IccError::BufferTooSmall {
            what: "output",
            expected: dst_len,
            actual: output.len(),
        });
    }
    Ok((src_len, dst_len))
}

/// [`ColorEngine`] backed by Little CMS 2.
#[derive(Debug, Clone, Copy, Default)]
pub struct LcmsEngine;

impl ColorEngine for LcmsEngine {
    type Profile = Profile;
    type Transform = Transform;

    fn open_profile(&self, icc: &[u8]) -> IccResult<Profile> {
        let profile = Profile::from_icc(icc)?;
        debug!(description = %profile.description(), space = ?profile.space(), "opened ICC profile");
        Ok(profile)
    }

    fn colorimetric_profile(&self, colorimetry: &Colorimetry) -> IccResult<Profile> {
        Profile::from_colorimetry(colorimetry)
    }

    fn reference_profile(&self) -> Profile {
        Profile::srgb()
    }

    fn create_transform(
        &self,
        input: &Profile,
        input_layout: PixelLayout,
        output: &Profile,
        output_layout: PixelLayout,
        intent: Intent,
    ) -> IccResult<Transform> {
        Transform::new(input, input_layout, output, output_layout, intent)
    }

    fn serialize(&self, profile: &Profile) -> IccResult<Vec<u8>> {
        profile.to_icc()
    }
}
