//! TIFF tag numbers and enumerated tag values.

/// Tag numbers.
pub mod tag {
    /// Image width in pixels.
    pub const IMAGE_WIDTH: u16 = 256;
    /// Image height in pixels.
    pub const IMAGE_LENGTH: u16 = 257;
    /// Bits per sample, one value per sample.
    pub const BITS_PER_SAMPLE: u16 = 258;
    /// Compression scheme.
    pub const COMPRESSION: u16 = 259;
    /// Photometric interpretation.
    pub const PHOTOMETRIC: u16 = 262;
    /// Byte offset of each strip.
    pub const STRIP_OFFSETS: u16 = 273;
    /// Samples per pixel.
    pub const SAMPLES_PER_PIXEL: u16 = 277;
    /// Rows in each strip.
    pub const ROWS_PER_STRIP: u16 = 278;
    /// Compressed size of each strip.
    pub const STRIP_BYTE_COUNTS: u16 = 279;
    /// Contiguous or separate planes.
    pub const PLANAR_CONFIG: u16 = 284;
    /// Transfer function table(s).
    pub const TRANSFER_FUNCTION: u16 = 301;
    /// Software that wrote the file.
    pub const SOFTWARE: u16 = 305;
    /// Differencing predictor.
    pub const PREDICTOR: u16 = 317;
    /// CIE xy white point.
    pub const WHITE_POINT: u16 = 318;
    /// CIE xy of the red, green and blue primaries.
    pub const PRIMARY_CHROMATICITIES: u16 = 319;
    /// Tile width; its presence marks a tiled file.
    pub const TILE_WIDTH: u16 = 322;
    /// Tile offsets.
    pub const TILE_OFFSETS: u16 = 324;
    /// Meaning of samples beyond the color channels.
    pub const EXTRA_SAMPLES: u16 = 338;
    /// Integer, signed or floating-point samples.
    pub const SAMPLE_FORMAT: u16 = 339;
    /// Embedded ICC profile.
    pub const ICC_PROFILE: u16 = 34675;
    /// Scene luminance in candela per square metre for a sample value of 1.
    pub const STONITS: u16 = 37439;
}

/// PhotometricInterpretation values.
pub mod photometric {
    /// RGB.
    pub const RGB: u16 = 2;
    /// Separated (CMYK inks).
    pub const SEPARATED: u16 = 5;
    /// SGI LogLuv.
    pub const LOGLUV: u16 = 32845;
}

/// PlanarConfiguration values.
pub mod planar {
    /// Samples of a pixel stored together.
    pub const CONTIG: u16 = 1;
    /// One plane per sample.
    pub const SEPARATE: u16 = 2;
}

/// SampleFormat values.
pub mod sample_format {
    /// Unsigned integer.
    pub const UINT: u16 = 1;
    /// Two's complement integer.
    pub const INT: u16 = 2;
    /// IEEE floating point.
    pub const IEEE_FP: u16 = 3;
}

/// ExtraSamples values.
pub mod extra_samples {
    /// Unspecified data.
    pub const UNSPECIFIED: u16 = 0;
    /// Associated (premultiplied) alpha.
    pub const ASSOC_ALPHA: u16 = 1;
    /// Unassociated alpha.
    pub const UNASSOC_ALPHA: u16 = 2;
}

/// Predictor values.
pub mod predictor {
    /// No prediction.
    pub const NONE: u16 = 1;
    /// Horizontal differencing.
    pub const HORIZONTAL: u16 = 2;
    /// Floating-point byte-plane differencing.
    pub const FLOATING_POINT: u16 = 3;
}

/// Strip compression scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    /// No compression (1).
    #[default]
    None,
    /// LZW (5).
    Lzw,
    /// zlib Deflate (8, or the legacy 32946).
    Deflate,
    /// Macintosh PackBits (32773).
    PackBits,
    /// SGI LogLuv run-length encoded 32-bit (34676).
    SgiLog,
    /// SGI LogLuv 24-bit (34677).
    SgiLog24,
    /// Any other scheme.
    Other(u16),
}

impl Compression {
    /// Maps a Compression tag value.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::None,
            5 => Self::Lzw,
            8 | 32946 => Self::Deflate,
            32773 => Self::PackBits,
            34676 => Self::SgiLog,
            34677 => Self::SgiLog24,
            other => Self::Other(other),
        }
    }

    /// Tag value written for this scheme.
    pub fn code(self) -> u16 {
        match self {
            Self::None => 1,
            Self::Lzw => 5,
            Self::Deflate => 8,
            Self::PackBits => 32773,
            Self::SgiLog => 34676,
            Self::SgiLog24 => 34677,
            Self::Other(code) => code,
        }
    }

    /// Whether this is one of the LogLuv codecs.
    pub fn is_logluv(self) -> bool {
        matches!(self, Self::SgiLog | Self::SgiLog24)
    }
}
