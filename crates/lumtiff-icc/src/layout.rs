//! Packed pixel layouts understood by transforms.

/// Interleaved integer pixel layout of a scanline.
///
/// 16-bit layouts hold native-endian samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// 3 x 8-bit RGB.
    Rgb8,
    /// 4 x 8-bit RGBA.
    Rgba8,
    /// 3 x 16-bit RGB.
    Rgb16,
    /// 4 x 16-bit RGBA.
    Rgba16,
    /// 4 x 8-bit CMYK.
    Cmyk8,
    /// 4 x 16-bit CMYK.
    Cmyk16,
}

impl PixelLayout {
    /// Samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb8 | Self::Rgb16 => 3,
            Self::Rgba8 | Self::Rgba16 | Self::Cmyk8 | Self::Cmyk16 => 4,
        }
    }

    /// Bytes per sample.
    pub fn sample_bytes(self) -> usize {
        match self {
            Self::Rgb8 | Self::Rgba8 | Self::Cmyk8 => 1,
            Self::Rgb16 | Self::Rgba16 | Self::Cmyk16 => 2,
        }
    }

    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        self.channels() * self.sample_bytes()
    }

    /// Largest sample value.
    pub fn max_value(self) -> u32 {
        if self.sample_bytes() == 1 { 0xFF } else { 0xFFFF }
    }

    /// Whether the layout carries ink values.
    pub fn is_cmyk(self) -> bool {
        matches!(self, Self::Cmyk8 | Self::Cmyk16)
    }

    /// Whether the fourth RGB sample is alpha.
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba8 | Self::Rgba16)
    }

    pub(crate) fn lcms_format(self) -> lcms2::PixelFormat {
        match self {
            Self::Rgb8 => lcms2::PixelFormat::RGB_8,
            Self::Rgba8 => lcms2::PixelFormat::RGBA_8,
            Self::Rgb16 => lcms2::PixelFormat::RGB_16,
            Self::Rgba16 => lcms2::PixelFormat::RGBA_16,
            Self::Cmyk8 => lcms2::PixelFormat::CMYK_8,
            Self::Cmyk16 => lcms2::PixelFormat::CMYK_16,
        }
    }
}
