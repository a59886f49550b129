//! Scanline transforms backed by Little CMS.

use crate::{IccError, IccResult, Intent, PixelLayout, PixelTransform, Profile};
use lcms2::{Flags, Transform as LcmsTransform};

/// Untyped view of an lcms2 transform over packed byte pixels.
trait Kernel {
    fn run(&self, input: &[u8], output: &mut [u8]);
}

/// Each pixel is a `[u8; N]` of exactly `bytes_per_pixel` bytes, so lcms2
/// sees one element per pixel whatever the sample width.
impl<const I: usize, const O: usize> Kernel for LcmsTransform<[u8; I], [u8; O]> {
    fn run(&self, input: &[u8], output: &mut [u8]) {
        let src: &[[u8; I]] = bytemuck::cast_slice(input);
        let dst: &mut [[u8; O]] = bytemuck::cast_slice_mut(output);
        self.transform_pixels(src, dst);
    }
}

fn kernel<const I: usize, const O: usize>(
    source: &Profile,
    input: PixelLayout,
    dest: &Profile,
    output: PixelLayout,
    intent: Intent,
) -> IccResult<Box<dyn Kernel>> {
    // lcms2 refuses COPY_ALPHA unless both sides carry the extra channel.
    let flags = if input.has_alpha() && output.has_alpha() {
        Flags::COPY_ALPHA
    } else {
        Flags::default()
    };
    let inner: LcmsTransform<[u8; I], [u8; O]> = LcmsTransform::new_flags(
        &source.inner,
        input.lcms_format(),
        &dest.inner,
        output.lcms_format(),
        intent.into(),
        flags,
    )
    .map_err(|e| IccError::TransformFailed(e.to_string()))?;
    Ok(Box::new(inner))
}

/// A color transform between two ICC profiles over packed scanlines.
///
/// # Example
///
/// ```rust
/// use lumtiff_icc::{Intent, PixelLayout, PixelTransform, Profile, Transform};
///
/// let srgb = Profile::srgb();
/// let t = Transform::new(&srgb, PixelLayout::Rgb8, &srgb, PixelLayout::Rgba8, Intent::Perceptual).unwrap();
///
/// let input = [10u8, 20, 30, 200, 100, 50];
/// let mut output = [0u8; 8];
/// t.apply(&input, &mut output, 2).unwrap();
/// ```
pub struct Transform {
    kernel: Box<dyn Kernel>,
    input: PixelLayout,
    output: PixelLayout,
}

impl Transform {
    /// Creates a transform from `source` pixels in `input` layout to `dest`
    /// pixels in `output` layout.
    ///
    /// Fails when lcms2 refuses the pair, e.g. a CMYK profile with an RGB
    /// input layout.
    pub fn new(
        source: &Profile,
        input: PixelLayout,
        dest: &Profile,
        output: PixelLayout,
        intent: Intent,
    ) -> IccResult<Self> {
        let kernel = match (input.bytes_per_pixel(), output.bytes_per_pixel()) {
            (3, 3) => kernel::<3, 3>(source, input, dest, output, intent)?,
            (3, 4) => kernel::<3, 4>(source, input, dest, output, intent)?,
            (4, 4) => kernel::<4, 4>(source, input, dest, output, intent)?,
            (4, 3) => kernel::<4, 3>(source, input, dest, output, intent)?,
            (6, 6) => kernel::<6, 6>(source, input, dest, output, intent)?,
            (6, 8) => kernel::<6, 8>(source, input, dest, output, intent)?,
            (8, 8) => kernel::<8, 8>(source, input, dest, output, intent)?,
            (8, 6) => kernel::<8, 6>(source, input, dest, output, intent)?,
            _ => return Err(IccError::UnsupportedLayout { input, output }),
        };
        Ok(Self { kernel, input, output })
    }
}

impl PixelTransform for Transform {
    fn input_layout(&self) -> PixelLayout {
        self.input
    }

    fn output_layout(&self) -> PixelLayout {
        self.output
    }

    fn apply(&self, input: &[u8], output: &mut [u8], pixel_count: usize) -> IccResult<()> {
        let (src_len, dst_len) = crate::engine::checked_lengths(self, input, output, pixel_count)?;
        self.kernel.run(&input[..src_len], &mut output[..dst_len]);
        Ok(())
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("input", &self.input)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn srgb_identity(input: PixelLayout, output: PixelLayout) -> Transform {
        let srgb = Profile::srgb();
        Transform::new(&srgb, input, &srgb, output, Intent::Perceptual).unwrap()
    }

    #[test]
    fn srgb_to_srgb_is_near_identity() {
        let t = srgb_identity(PixelLayout::Rgb8, PixelLayout::Rgba8);
        let input = [0u8, 128, 255];
        let mut output = [0u8; 4];
        t.apply(&input, &mut output, 1).unwrap();
        for c in 0..3 {
            assert!((output[c] as i32 - input[c] as i32).abs() <= 1, "{output:?}");
        }
    }

    #[test]
    fn sixteen_bit_kernel() {
        let t = srgb_identity(PixelLayout::Rgb16, PixelLayout::Rgb16);
        let samples = [0u16, 32768, 65535];
        let input: Vec<u8> = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        let mut output = vec![0u8; 6];
        t.apply(&input, &mut output, 1).unwrap();
        let back: Vec<u16> = output.chunks_exact(2).map(|b| u16::from_ne_bytes([b[0], b[1]])).collect();
        for (a, b) in samples.iter().zip(&back) {
            assert!((*a as i32 - *b as i32).abs() <= 64, "{back:?}");
        }
    }

    #[test]
    fn cmyk_layout_on_rgb_profile_fails() {
        let srgb = Profile::srgb();
        assert!(Transform::new(&srgb, PixelLayout::Cmyk8, &srgb, PixelLayout::Rgba8, Intent::Perceptual).is_err());
    }

    #[test]
    fn short_buffers_are_reported() {
        let t = srgb_identity(PixelLayout::Rgb8, PixelLayout::Rgb8);
        let mut output = [0u8; 3];
        let err = t.apply(&[0u8; 3], &mut output, 2).unwrap_err();
        assert!(matches!(err, IccError::BufferTooSmall { what: "input", .. }));
    }
}
