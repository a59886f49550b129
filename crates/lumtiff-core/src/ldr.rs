//! Interleaved integer pixel buffers.
//!
//! These are the discrete images that sit next to the float [`Frame`]:
//! [`Rgba8Image`] is the display/preview representation (and the source of
//! 8-bit TIFF output), [`Rgb16Pixels`] is a raw interleaved 16-bit buffer
//! handed to the 16-bit writer by tone-mapping code.

use crate::Frame;
use crate::error::{CoreError, CoreResult, pixel_count, try_zeroed};

/// Display gamma used when quantizing linear frames to 8 bits.
pub const DISPLAY_GAMMA: f32 = 2.2;

/// Interleaved 8-bit RGBA image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rgba8Image {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Rgba8Image {
    /// Creates an opaque black image.
    pub fn new(width: u32, height: u32) -> CoreResult<Self> {
        let len = pixel_count(width, height)?;
        let mut pixels: Vec<[u8; 4]> = try_zeroed(len)?;
        pixels.fill([0, 0, 0, 0xFF]);
        Ok(Self { width, height, pixels })
    }

    /// Wraps an existing pixel vector.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> CoreResult<Self> {
        let len = pixel_count(width, height)?;
        if pixels.len() != len {
            return Err(CoreError::PlaneLength {
                what: "RGBA8 pixel buffer",
                expected: len,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// Quantizes a linear frame for display.
    ///
    /// Each sample is clamped to `[0, 1]`, encoded with `x^(1/2.2)` and
    /// rounded to the nearest 8-bit code. Alpha is opaque.
    pub fn from_linear(frame: &Frame) -> CoreResult<Self> {
        let mut image = Self::new(frame.width(), frame.height())?;
        let (x, y, z) = frame.xyz();
        for (i, px) in image.pixels.iter_mut().enumerate() {
            *px = [encode_gamma8(x[i]), encode_gamma8(y[i]), encode_gamma8(z[i]), 0xFF];
        }
        Ok(image)
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels, row-major.
    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Pixel at `(col, row)`.
    pub fn pixel(&self, col: u32, row: u32) -> [u8; 4] {
        self.pixels[row as usize * self.width as usize + col as usize]
    }

    /// One row of pixels.
    pub fn row(&self, row: u32) -> &[[u8; 4]] {
        let w = self.width as usize;
        &self.pixels[row as usize * w..(row as usize + 1) * w]
    }

    /// One mutable row of pixels.
    pub fn row_mut(&mut self, row: u32) -> &mut [[u8; 4]] {
        let w = self.width as usize;
        &mut self.pixels[row as usize * w..(row as usize + 1) * w]
    }
}

/// Gamma-encodes a linear value to an 8-bit code: `round(255 * x^(1/2.2))`.
#[inline]
pub fn encode_gamma8(linear: f32) -> u8 {
    let v = linear.clamp(0.0, 1.0).powf(1.0 / DISPLAY_GAMMA);
    (v * 255.0).round() as u8
}

/// Interleaved 16-bit RGB samples, three per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rgb16Pixels {
    width: u32,
    height: u32,
    samples: Vec<u16>,
}

impl Rgb16Pixels {
    /// Wraps an interleaved sample vector of `width * height * 3` values.
    pub fn new(width: u32, height: u32, samples: Vec<u16>) -> CoreResult<Self> {
        let len = pixel_count(width, height)?
            .checked_mul(3)
            .ok_or(CoreError::InvalidDimensions { width, height })?;
        if samples.len() != len {
            return Err(CoreError::PlaneLength {
                what: "RGB16 sample buffer",
                expected: len,
                actual: samples.len(),
            });
        }
        Ok(Self { width, height, samples })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All samples.
    #[inline]
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// The `width * 3` samples of one row.
    pub fn row(&self, row: u32) -> &[u16] {
        let w = self.width as usize * 3;
        &self.samples[row as usize * w..(row as usize + 1) * w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_quantization_inverts_display_decode() {
        for code in 0..=255u8 {
            let linear = (code as f32 / 255.0).powf(DISPLAY_GAMMA);
            assert_eq!(encode_gamma8(linear), code);
        }
    }

    #[test]
    fn from_linear_clamps_hdr_values() {
        let frame = Frame::from_planes(2, 1, vec![4.0, -1.0], vec![1.0, 0.0], vec![0.0, 0.5]).unwrap();
        let image = Rgba8Image::from_linear(&frame).unwrap();
        assert_eq!(image.pixel(0, 0), [255, 255, 0, 255]);
        assert_eq!(image.pixel(1, 0)[0], 0);
        assert_eq!(image.pixel(1, 0)[2], encode_gamma8(0.5));
    }

    #[test]
    fn rgb16_length_is_validated() {
        assert!(Rgb16Pixels::new(2, 2, vec![0; 12]).is_ok());
        assert!(matches!(
            Rgb16Pixels::new(2, 2, vec![0; 11]),
            Err(CoreError::PlaneLength { expected: 12, actual: 11, .. })
        ));
    }
}
