//! Deterministic [`ColorEngine`] for tests.
//!
//! A fake profile is any blob of at least 128 bytes with the `acsp`
//! signature at offset 36; bytes 16..20 name its color space (`"RGB "` or
//! `"CMYK"`), just like a real ICC header. Transforms do simple integer
//! arithmetic so tests can predict every output sample:
//!
//! - RGB input is copied (or has red and blue swapped).
//! - CMYK input becomes `max - C`, `max - M`, `max - Y`; K is ignored.
//! - Output alpha is the input alpha, or `max` when the input has none.

use crate::{Colorimetry, ColorEngine, IccError, IccResult, Intent, PixelLayout, PixelTransform, ProfileSpace};

const HEADER_LEN: usize = 128;

/// Parsed fake profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeProfile {
    /// Device color space from the header.
    pub space: ProfileSpace,
}

/// What the fake transforms do to RGB samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeMode {
    /// Pass samples through.
    Identity,
    /// Exchange the first and third sample.
    SwapRedBlue,
    /// Refuse to build any transform.
    Refuse,
}

/// Fake color engine.
#[derive(Debug, Clone, Copy)]
pub struct FakeEngine {
    mode: FakeMode,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::identity()
    }
}

impl FakeEngine {
    /// Engine whose transforms pass RGB through.
    pub fn identity() -> Self {
        Self { mode: FakeMode::Identity }
    }

    /// Engine whose transforms swap red and blue.
    pub fn swap_red_blue() -> Self {
        Self { mode: FakeMode::SwapRedBlue }
    }

    /// Engine that parses profiles but fails every transform.
    pub fn refusing() -> Self {
        Self { mode: FakeMode::Refuse }
    }

    /// Builds a minimal profile blob this engine accepts.
    pub fn profile_bytes(space: ProfileSpace) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&(HEADER_LEN as u32).to_be_bytes());
        let sig: &[u8; 4] = match space {
            ProfileSpace::Rgb => b"RGB ",
            ProfileSpace::Cmyk => b"CMYK",
            ProfileSpace::Other => b"GRAY",
        };
        bytes[16..20].copy_from_slice(sig);
        bytes[36..40].copy_from_slice(b"acsp");
        bytes
    }
}

impl ColorEngine for FakeEngine {
    type Profile = FakeProfile;
    type Transform = FakeTransform;

    fn open_profile(&self, icc: &[u8]) -> IccResult<FakeProfile> {
        if icc.len() < HEADER_LEN || &icc[36..40] != b"acsp" {
            return Err(IccError::InvalidProfile("missing acsp signature".into()));
        }
        let space = match &icc[16..20] {
            b"RGB " => ProfileSpace::Rgb,
            b"CMYK" => ProfileSpace::Cmyk,
            _ => ProfileSpace::Other,
        };
        Ok(FakeProfile { space })
    }

    fn colorimetric_profile(&self, colorimetry: &Colorimetry) -> IccResult<FakeProfile> {
        if colorimetry.white_point[1] <= 0.0 {
            return Err(IccError::CreateFailed("degenerate white point".into()));
        }
        Ok(FakeProfile { space: ProfileSpace::Rgb })
    }

    fn reference_profile(&self) -> FakeProfile {
        FakeProfile { space: ProfileSpace::Rgb }
    }

    fn create_transform(
        &self,
        input: &FakeProfile,
        input_layout: PixelLayout,
        output: &FakeProfile,
        output_layout: PixelLayout,
        _intent: Intent,
    ) -> IccResult<FakeTransform> {
        if self.mode == FakeMode::Refuse {
            return Err(IccError::TransformFailed("fake engine refuses transforms".into()));
        }
        check_space(input.space, input_layout)?;
        check_space(output.space, output_layout)?;
        if output_layout.is_cmyk() {
            return Err(IccError::UnsupportedLayout { input: input_layout, output: output_layout });
        }
        Ok(FakeTransform {
            mode: self.mode,
            input: input_layout,
            output: output_layout,
        })
    }

    fn serialize(&self, profile: &FakeProfile) -> IccResult<Vec<u8>> {
        Ok(Self::profile_bytes(profile.space))
    }
}

fn check_space(space: ProfileSpace, layout: PixelLayout) -> IccResult<()> {
    let expected = if layout.is_cmyk() { ProfileSpace::Cmyk } else { ProfileSpace::Rgb };
    if space == expected {
        Ok(())
    } else {
        Err(IccError::ColorSpaceMismatch {
            expected: format!("{expected:?}"),
            actual: format!("{space:?}"),
        })
    }
}

/// Transform built by [`FakeEngine`].
#[derive(Debug, Clone, Copy)]
pub struct FakeTransform {
    mode: FakeMode,
    input: PixelLayout,
    output: PixelLayout,
}

fn read_sample(buf: &[u8], index: usize, wide: bool) -> u32 {
    if wide {
        u16::from_ne_bytes([buf[index * 2], buf[index * 2 + 1]]) as u32
    } else {
        buf[index] as u32
    }
}

fn write_sample(buf: &mut [u8], index: usize, wide: bool, value: u32) {
    if wide {
        buf[index * 2..index * 2 + 2].copy_from_slice(&(value as u16).to_ne_bytes());
    } else {
        buf[index] = value as u8;
    }
}

impl PixelTransform for FakeTransform {
    fn input_layout(&self) -> PixelLayout {
        self.input
    }

    fn output_layout(&self) -> PixelLayout {
        self.output
    }

    fn apply(&self, input: &[u8], output: &mut [u8], pixel_count: usize) -> IccResult<()> {
        crate::engine::checked_lengths(self, input, output, pixel_count)?;
        let in_wide = self.input.sample_bytes() == 2;
        let out_wide = self.output.sample_bytes() == 2;
        let in_max = self.input.max_value();
        let out_max = self.output.max_value();
        let (in_ch, out_ch) = (self.input.channels(), self.output.channels());

        for px in 0..pixel_count {
            let src = px * in_ch;
            let mut rgb = [0u32; 3];
            for (c, v) in rgb.iter_mut().enumerate() {
                let s = read_sample(input, src + c, in_wide);
                *v = if self.input.is_cmyk() { in_max - s } else { s };
            }
            if self.mode == FakeMode::SwapRedBlue {
                rgb.swap(0, 2);
            }
            let alpha = if self.input.has_alpha() {
                read_sample(input, src + 3, in_wide)
            } else {
                in_max
            };

            let dst = px * out_ch;
            for (c, v) in rgb.iter().enumerate() {
                write_sample(output, dst + c, out_wide, rescale(*v, in_max, out_max));
            }
            if out_ch == 4 {
                write_sample(output, dst + 3, out_wide, rescale(alpha, in_max, out_max));
            }
        }
        Ok(())
    }
}

fn rescale(value: u32, from_max: u32, to_max: u32) -> u32 {
    if from_max == to_max {
        value
    } else {
        (value * to_max + from_max / 2) / from_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_header_is_recognized() {
        let engine = FakeEngine::identity();
        let rgb = engine.open_profile(&FakeEngine::profile_bytes(ProfileSpace::Rgb)).unwrap();
        assert_eq!(rgb.space, ProfileSpace::Rgb);
        assert!(engine.open_profile(&[0u8; 64]).is_err());
    }

    #[test]
    fn cmyk_inverts_inks_and_ignores_black() {
        let engine = FakeEngine::identity();
        let cmyk = FakeProfile { space: ProfileSpace::Cmyk };
        let srgb = engine.reference_profile();
        let t = engine
            .create_transform(&cmyk, PixelLayout::Cmyk8, &srgb, PixelLayout::Rgba8, Intent::Perceptual)
            .unwrap();
        let mut out = [0u8; 4];
        t.apply(&[255, 0, 55, 255], &mut out, 1).unwrap();
        assert_eq!(out, [0, 255, 200, 255]);
    }

    #[test]
    fn swap_mode_and_alpha_passthrough() {
        let engine = FakeEngine::swap_red_blue();
        let srgb = engine.reference_profile();
        let t = engine
            .create_transform(&srgb, PixelLayout::Rgba8, &srgb, PixelLayout::Rgba8, Intent::Perceptual)
            .unwrap();
        let mut out = [0u8; 4];
        t.apply(&[1, 2, 3, 4], &mut out, 1).unwrap();
        assert_eq!(out, [3, 2, 1, 4]);
    }

    #[test]
    fn space_mismatch_and_refusal() {
        let engine = FakeEngine::identity();
        let cmyk = FakeProfile { space: ProfileSpace::Cmyk };
        let srgb = engine.reference_profile();
        assert!(engine
            .create_transform(&cmyk, PixelLayout::Rgb8, &srgb, PixelLayout::Rgba8, Intent::Perceptual)
            .is_err());
        assert!(FakeEngine::refusing()
            .create_transform(&srgb, PixelLayout::Rgb8, &srgb, PixelLayout::Rgba8, Intent::Perceptual)
            .is_err());
    }

    #[test]
    fn sixteen_bit_samples_are_native_endian() {
        let engine = FakeEngine::identity();
        let srgb = engine.reference_profile();
        let t = engine
            .create_transform(&srgb, PixelLayout::Rgb16, &srgb, PixelLayout::Rgb16, Intent::Perceptual)
            .unwrap();
        let input: Vec<u8> = [1000u16, 2000, 3000].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let mut out = vec![0u8; 6];
        t.apply(&input, &mut out, 1).unwrap();
        assert_eq!(out, input);
    }
}
