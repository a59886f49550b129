//! Strip encoding of in-memory images.
//!
//! Every image is written one row per strip. The packed row goes to a
//! [`StripSink`], which compresses it and converts samples to the file's
//! byte order.
//!
//! | Source | Photometric | Samples | Extra tags |
//! |--------|-------------|---------|------------|
//! | [`StripSource::FloatRgb`] | RGB | 3 x f32 | SampleFormat = float |
//! | [`StripSource::LogLuv`] | LogLuv | XYZ, SGILOG | STONITS = 1 |
//! | [`StripSource::Rgba8`] | RGB | 4 x u8 | ExtraSamples = associated alpha, ICC |
//! | [`StripSource::Rgb16Pixels`] | RGB | 3 x u16 | ICC |
//! | [`StripSource::Rgb16Planes`] | RGB | 3 x u16 | |

use crate::container::tags::{Compression, extra_samples, photometric, planar, predictor, sample_format, tag};
use crate::container::{StripSink, Value};
use crate::error::{FormatError, FormatResult, zeroed_bytes};
use lumtiff_core::{Frame, Progress, Rgb16Pixels, Rgba8Image};
use tracing::{debug, error};

/// Image handed to [`encode`], together with the encoding to use.
#[derive(Debug, Clone, Copy)]
pub enum StripSource<'a> {
    /// Linear float RGB, written as 32-bit IEEE samples.
    FloatRgb(&'a Frame),
    /// CIE XYZ, written as SGI LogLuv32.
    LogLuv(&'a Frame),
    /// Display-referred 8-bit RGBA.
    Rgba8(&'a Rgba8Image),
    /// Interleaved 16-bit RGB.
    Rgb16Pixels(&'a Rgb16Pixels),
    /// Float planes narrowed to 16-bit RGB.
    Rgb16Planes(&'a Frame),
}

impl StripSource<'_> {
    /// Image width and height.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::FloatRgb(f) | Self::LogLuv(f) | Self::Rgb16Planes(f) => (f.width(), f.height()),
            Self::Rgba8(img) => (img.width(), img.height()),
            Self::Rgb16Pixels(px) => (px.width(), px.height()),
        }
    }

    /// Whether the writer embeds the reference ICC profile for this source.
    pub fn embeds_profile(&self) -> bool {
        matches!(self, Self::Rgba8(_) | Self::Rgb16Pixels(_))
    }

    fn bits_per_sample(&self) -> u16 {
        match self {
            Self::FloatRgb(_) | Self::LogLuv(_) => 32,
            Self::Rgba8(_) => 8,
            Self::Rgb16Pixels(_) | Self::Rgb16Planes(_) => 16,
        }
    }

    fn samples_per_pixel(&self) -> u16 {
        match self {
            Self::Rgba8(_) => 4,
            _ => 3,
        }
    }

    /// Packs `row` into `out` as native-endian samples.
    fn pack_row(&self, row: u32, out: &mut [u8]) {
        match self {
            Self::FloatRgb(f) | Self::LogLuv(f) => {
                let (x, y, z) = f.row(row);
                for (i, px) in out.chunks_exact_mut(12).enumerate() {
                    px[0..4].copy_from_slice(&x[i].to_ne_bytes());
                    px[4..8].copy_from_slice(&y[i].to_ne_bytes());
                    px[8..12].copy_from_slice(&z[i].to_ne_bytes());
                }
            }
            Self::Rgba8(img) => {
                for (dst, src) in out.chunks_exact_mut(4).zip(img.row(row)) {
                    dst.copy_from_slice(src);
                }
            }
            Self::Rgb16Pixels(px) => {
                for (dst, v) in out.chunks_exact_mut(2).zip(px.row(row)) {
                    dst.copy_from_slice(&v.to_ne_bytes());
                }
            }
            Self::Rgb16Planes(f) => {
                let (x, y, z) = f.row(row);
                for (i, px) in out.chunks_exact_mut(6).enumerate() {
                    // `as` truncates toward zero and saturates, NaN becomes 0
                    px[0..2].copy_from_slice(&(x[i] as u16).to_ne_bytes());
                    px[2..4].copy_from_slice(&(y[i] as u16).to_ne_bytes());
                    px[4..6].copy_from_slice(&(z[i] as u16).to_ne_bytes());
                }
            }
        }
    }
}

/// Tag choices for one [`encode`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeParams<'a> {
    /// Compression of non-LogLuv strips.
    pub compression: Compression,
    /// Horizontal differencing for 8 and 16-bit samples.
    pub predictor: bool,
    /// ICC profile for sources that embed one.
    pub icc_profile: Option<&'a [u8]>,
    /// Software tag.
    pub software: Option<&'a str>,
}

/// Fills the sink's directory for `source`.
fn set_tags<K: StripSink + ?Sized>(sink: &mut K, source: &StripSource<'_>, params: &EncodeParams<'_>) {
    let (width, height) = source.dimensions();
    let spp = source.samples_per_pixel();
    let bits = source.bits_per_sample();
    let logluv = matches!(source, StripSource::LogLuv(_));
    let compression = if logluv { Compression::SgiLog } else { params.compression };

    let dir = sink.directory_mut();
    dir.insert(tag::IMAGE_WIDTH, Value::Long(vec![width]));
    dir.insert(tag::IMAGE_LENGTH, Value::Long(vec![height]));
    dir.insert(tag::BITS_PER_SAMPLE, Value::Short(vec![bits; spp as usize]));
    dir.insert(tag::COMPRESSION, Value::Short(vec![compression.code()]));
    let photo = if logluv { photometric::LOGLUV } else { photometric::RGB };
    dir.insert(tag::PHOTOMETRIC, Value::Short(vec![photo]));
    dir.insert(tag::SAMPLES_PER_PIXEL, Value::Short(vec![spp]));
    dir.insert(tag::ROWS_PER_STRIP, Value::Long(vec![1]));
    dir.insert(tag::PLANAR_CONFIG, Value::Short(vec![planar::CONTIG]));

    if bits == 32 {
        dir.insert(tag::SAMPLE_FORMAT, Value::Short(vec![sample_format::IEEE_FP; spp as usize]));
    } else if params.predictor {
        dir.insert(tag::PREDICTOR, Value::Short(vec![predictor::HORIZONTAL]));
    }
    if logluv {
        dir.insert(tag::STONITS, Value::Double(vec![1.0]));
    }
    if matches!(source, StripSource::Rgba8(_)) {
        dir.insert(tag::EXTRA_SAMPLES, Value::Short(vec![extra_samples::ASSOC_ALPHA]));
    }
    if let Some(software) = params.software {
        dir.insert(tag::SOFTWARE, Value::Ascii(software.to_string()));
    }
    if source.embeds_profile() {
        if let Some(icc) = params.icc_profile {
            dir.insert(tag::ICC_PROFILE, Value::Undefined(icc.to_vec()));
        }
    }
}

/// Writes `source` to `sink`, one row per strip.
///
/// Tags, including the ICC profile, are set before the first strip goes
/// out. Progress gets the strip count as maximum and the number of written
/// strips after each strip.
///
/// # Errors
///
/// - [`FormatError::InvalidDimensions`] for an empty image
/// - [`FormatError::OutOfMemory`] if the strip buffer cannot be allocated
/// - the sink's error for the first strip that fails to write
pub fn encode<K: StripSink + ?Sized>(
    sink: &mut K,
    source: &StripSource<'_>,
    params: &EncodeParams<'_>,
    progress: &mut dyn Progress,
) -> FormatResult<()> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(FormatError::InvalidDimensions { width, height });
    }
    set_tags(sink, source, params);

    let strip_size = sink.strip_size()?;
    let strips = sink.strip_count()?;
    let row_bytes = width as usize * source.samples_per_pixel() as usize * source.bits_per_sample() as usize / 8;
    if strip_size != row_bytes {
        return Err(FormatError::InvalidPrecondition(format!(
            "sink expects {strip_size}-byte strips, rows pack to {row_bytes}"
        )));
    }
    let mut buf = zeroed_bytes(strip_size)?;
    debug!(width, height, strips, strip_size, "writing strips");

    progress.set_maximum(strips);
    for strip in 0..strips {
        source.pack_row(strip, &mut buf);
        if let Err(e) = sink.write_encoded_strip(strip, &buf) {
            error!(strip, error = %e, "failed to write strip");
            return Err(e);
        }
        progress.step(strip + 1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Directory;
    use lumtiff_core::{NoProgress, ProgressEvent};

    /// Sink that keeps strips in memory.
    #[derive(Default)]
    struct MemSink {
        dir: Directory,
        strips: Vec<(u32, Vec<u8>)>,
        fail_at: Option<u32>,
    }

    impl StripSink for MemSink {
        fn directory_mut(&mut self) -> &mut Directory {
            &mut self.dir
        }

        fn strip_size(&self) -> FormatResult<usize> {
            let width = self.dir.u32(tag::IMAGE_WIDTH).unwrap_or(0) as usize;
            let spp = self.dir.u32(tag::SAMPLES_PER_PIXEL).unwrap_or(1) as usize;
            let bits = self.dir.u32(tag::BITS_PER_SAMPLE).unwrap_or(8) as usize;
            Ok(width * spp * bits / 8)
        }

        fn strip_count(&self) -> FormatResult<u32> {
            Ok(self.dir.u32(tag::IMAGE_LENGTH).unwrap_or(0))
        }

        fn write_encoded_strip(&mut self, strip: u32, data: &[u8]) -> FormatResult<()> {
            if self.fail_at == Some(strip) {
                return Err(std::io::Error::other("disk full").into());
            }
            self.strips.push((strip, data.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn rgba8_tags_and_strips() {
        let img = Rgba8Image::from_pixels(2, 3, vec![[1, 2, 3, 4]; 6]).unwrap();
        let icc = [9u8; 16];
        let params = EncodeParams {
            icc_profile: Some(&icc),
            software: Some("test"),
            ..Default::default()
        };
        let mut sink = MemSink::default();
        encode(&mut sink, &StripSource::Rgba8(&img), &params, &mut NoProgress).unwrap();

        assert_eq!(sink.strips.len(), 3);
        assert_eq!(sink.strips[2], (2, vec![1, 2, 3, 4, 1, 2, 3, 4]));
        assert_eq!(sink.dir.bytes(tag::ICC_PROFILE), Some(&icc[..]));
        assert_eq!(sink.dir.u16_vec(tag::EXTRA_SAMPLES), Some(vec![extra_samples::ASSOC_ALPHA]));
        assert_eq!(sink.dir.u16_vec(tag::BITS_PER_SAMPLE), Some(vec![8; 4]));
        assert_eq!(sink.dir.u32(tag::ROWS_PER_STRIP), Some(1));
        assert_eq!(sink.dir.ascii(tag::SOFTWARE), Some("test"));
    }

    #[test]
    fn float_source_skips_profile_and_predictor() {
        let frame = Frame::filled(2, 1, [0.5, 1.5, -2.0]).unwrap();
        let icc = [1u8; 4];
        let params = EncodeParams {
            icc_profile: Some(&icc),
            predictor: true,
            ..Default::default()
        };
        let mut sink = MemSink::default();
        encode(&mut sink, &StripSource::FloatRgb(&frame), &params, &mut NoProgress).unwrap();
        assert!(!sink.dir.contains(tag::ICC_PROFILE));
        assert!(!sink.dir.contains(tag::PREDICTOR));
        assert_eq!(sink.dir.u16_vec(tag::SAMPLE_FORMAT), Some(vec![sample_format::IEEE_FP; 3]));
        let first = f32::from_ne_bytes(sink.strips[0].1[4..8].try_into().unwrap());
        assert_eq!(first, 1.5);
    }

    #[test]
    fn logluv_tags() {
        let frame = Frame::filled(1, 1, [0.9505, 1.0, 1.089]).unwrap();
        let params = EncodeParams {
            compression: Compression::Lzw,
            ..Default::default()
        };
        let mut sink = MemSink::default();
        encode(&mut sink, &StripSource::LogLuv(&frame), &params, &mut NoProgress).unwrap();
        assert_eq!(sink.dir.u16(tag::COMPRESSION), Some(Compression::SgiLog.code()));
        assert_eq!(sink.dir.u16(tag::PHOTOMETRIC), Some(photometric::LOGLUV));
        assert_eq!(sink.dir.f64(tag::STONITS), Some(1.0));
    }

    #[test]
    fn planes_narrow_by_truncation() {
        let frame = Frame::from_planes(4, 1, vec![1.9, -5.0, 70000.0, f32::NAN], vec![0.0; 4], vec![65535.0; 4]).unwrap();
        let mut sink = MemSink::default();
        encode(&mut sink, &StripSource::Rgb16Planes(&frame), &EncodeParams::default(), &mut NoProgress).unwrap();
        let row = &sink.strips[0].1;
        let red: Vec<u16> = (0..4).map(|i| u16::from_ne_bytes([row[i * 6], row[i * 6 + 1]])).collect();
        assert_eq!(red, vec![1, 0, 65535, 0]);
        assert!(!sink.dir.contains(tag::ICC_PROFILE));
    }

    #[test]
    fn rgb16_pixels_keep_order() {
        let px = Rgb16Pixels::new(2, 1, vec![1, 2, 3, 400, 500, 600]).unwrap();
        let mut sink = MemSink::default();
        encode(&mut sink, &StripSource::Rgb16Pixels(&px), &EncodeParams::default(), &mut NoProgress).unwrap();
        let row = &sink.strips[0].1;
        assert_eq!(u16::from_ne_bytes([row[6], row[7]]), 400);
    }

    #[test]
    fn write_failure_aborts_with_io_error() {
        let frame = Frame::filled(1, 3, [0.0; 3]).unwrap();
        let mut sink = MemSink {
            fail_at: Some(1),
            ..Default::default()
        };
        let mut events = Vec::new();
        let mut progress = |e: ProgressEvent| events.push(e);
        let err = encode(&mut sink, &StripSource::FloatRgb(&frame), &EncodeParams::default(), &mut progress).unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
        assert_eq!(sink.strips.len(), 1);
        assert_eq!(events, vec![ProgressEvent::Maximum(3), ProgressEvent::Step(1)]);
    }
}
