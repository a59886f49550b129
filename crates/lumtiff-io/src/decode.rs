//! Scanline decoding into linear float frames.
//!
//! Rows are pulled from a [`ScanlineSource`] top to bottom. Each row goes
//! through at most one of two conversions before its samples are unpacked:
//!
//! 1. the color transform, written into a second buffer that then becomes
//!    the active one
//! 2. otherwise, for CMYK, an arithmetic ink-to-RGB conversion in place
//!
//! Unpacking then reads samples 0, 1 and 2 of every pixel:
//!
//! | Kind | Sample value |
//! |------|--------------|
//! | Float (and LogLuv XYZ) | copied verbatim |
//! | Word | `v as f32`, no normalization |
//! | Byte | `(v / 255)^2.2` through a lookup table |

use crate::container::ScanlineSource;
use crate::error::{FormatError, FormatResult, zeroed_bytes};
use crate::format::{ColorSpace, PixelFormat, SampleKind};
use crate::resolve::transform_layouts;
use lumtiff_core::{DISPLAY_GAMMA, Frame, Progress, Rgba8Image};
use lumtiff_icc::PixelTransform;
use tracing::{debug, trace};

/// Which scanline buffer holds the samples to unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveBuffer {
    /// Raw scanline, possibly converted in place.
    Primary,
    /// Output of the color transform.
    Secondary,
}

/// Per-row working buffers, allocated once per decode.
struct ScanlineBuffers {
    primary: Vec<u8>,
    secondary: Vec<u8>,
    active: ActiveBuffer,
}

impl ScanlineBuffers {
    fn new(scanline_size: usize, transform: Option<&dyn PixelTransform>, width: usize) -> FormatResult<Self> {
        let secondary = match transform {
            Some(t) => zeroed_bytes(width * t.output_layout().bytes_per_pixel())?,
            None => Vec::new(),
        };
        Ok(Self {
            primary: zeroed_bytes(scanline_size)?,
            secondary,
            active: ActiveBuffer::Primary,
        })
    }

    fn active(&self) -> &[u8] {
        match self.active {
            ActiveBuffer::Primary => &self.primary,
            ActiveBuffer::Secondary => &self.secondary,
        }
    }

    /// Reads `row` and applies the transform or the CMYK fallback.
    fn load<S: ScanlineSource + ?Sized>(
        &mut self,
        source: &mut S,
        row: u32,
        format: &PixelFormat,
        transform: Option<&dyn PixelTransform>,
    ) -> FormatResult<()> {
        source.read_scanline(row, &mut self.primary)?;
        let width = format.width() as usize;
        self.active = match transform {
            Some(t) => {
                t.apply(&self.primary, &mut self.secondary, width)?;
                ActiveBuffer::Secondary
            }
            None => {
                if format.color_space() == ColorSpace::Cmyk {
                    cmyk_to_rgb(&mut self.primary, format.sample_kind(), width);
                }
                ActiveBuffer::Primary
            }
        };
        Ok(())
    }
}

/// Converts CMYK pixels to RGB plus opaque alpha, in place.
///
/// `channel = (max - ink) * (max - K) / max` in integer arithmetic. Float
/// samples are left untouched.
fn cmyk_to_rgb(buf: &mut [u8], kind: SampleKind, width: usize) {
    match kind {
        SampleKind::Byte => {
            for px in buf[..width * 4].chunks_exact_mut(4) {
                let k = 255 - px[3] as u32;
                for s in &mut px[..3] {
                    *s = ((255 - *s as u32) * k / 255) as u8;
                }
                px[3] = 255;
            }
        }
        SampleKind::Word => {
            for px in buf[..width * 8].chunks_exact_mut(8) {
                let get = |px: &[u8], i: usize| u16::from_ne_bytes([px[i * 2], px[i * 2 + 1]]) as u32;
                let k = 65535 - get(px, 3);
                for c in 0..3 {
                    let v = (65535 - get(px, c)) * k / 65535;
                    px[c * 2..c * 2 + 2].copy_from_slice(&(v as u16).to_ne_bytes());
                }
                px[6..8].copy_from_slice(&u16::MAX.to_ne_bytes());
            }
        }
        SampleKind::Float => {}
    }
}

fn gamma_table() -> [f32; 256] {
    let mut lut = [0.0f32; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = (i as f32 / 255.0).powf(DISPLAY_GAMMA);
    }
    lut
}

/// Unpacks the first three samples of each pixel into the float planes.
fn unpack_row(
    buf: &[u8],
    kind: SampleKind,
    stride: usize,
    lut: &[f32; 256],
    out: (&mut [f32], &mut [f32], &mut [f32]),
) {
    let (x, y, z) = out;
    for (i, ((x, y), z)) in x.iter_mut().zip(y.iter_mut()).zip(z.iter_mut()).enumerate() {
        let base = i * stride;
        let v = match kind {
            SampleKind::Byte => [lut[buf[base] as usize], lut[buf[base + 1] as usize], lut[buf[base + 2] as usize]],
            SampleKind::Word => {
                let w = |s: usize| u16::from_ne_bytes([buf[s * 2], buf[s * 2 + 1]]) as f32;
                [w(base), w(base + 1), w(base + 2)]
            }
            SampleKind::Float => {
                let f = |s: usize| f32::from_ne_bytes([buf[s * 4], buf[s * 4 + 1], buf[s * 4 + 2], buf[s * 4 + 3]]);
                [f(base), f(base + 1), f(base + 2)]
            }
        };
        *x = v[0];
        *y = v[1];
        *z = v[2];
    }
}

/// Checks that the source and transform agree with the pixel format.
fn check_inputs<S: ScanlineSource + ?Sized>(
    source: &S,
    format: &PixelFormat,
    transform: Option<&dyn PixelTransform>,
) -> FormatResult<()> {
    let (width, height) = source.dimensions();
    if (width, height) != (format.width(), format.height()) {
        return Err(FormatError::InvalidPrecondition(format!(
            "source is {width}x{height}, format describes {}x{}",
            format.width(),
            format.height()
        )));
    }
    let needed = width as usize * format.samples_per_pixel() as usize * format.sample_kind().bytes();
    if source.scanline_size() < needed {
        return Err(FormatError::InvalidPrecondition(format!(
            "scanline holds {} bytes, pixel format needs {needed}",
            source.scanline_size()
        )));
    }
    if let Some(t) = transform {
        let layouts = (t.input_layout(), t.output_layout());
        if transform_layouts(format) != Some(layouts) {
            return Err(FormatError::InvalidPrecondition(format!(
                "transform {:?} -> {:?} does not fit {:?} {:?} data",
                layouts.0,
                layouts.1,
                format.color_space(),
                format.sample_kind()
            )));
        }
    }
    Ok(())
}

/// Decodes every scanline of `source` into a linear float frame.
///
/// `transform` must be the one [`crate::resolve::resolve`] built for
/// `format`, or `None`. Progress gets the height as maximum and the number
/// of finished rows after each row.
///
/// # Errors
///
/// - [`FormatError::InvalidPrecondition`] if the source, format and
///   transform disagree; nothing is read in that case
/// - [`FormatError::OutOfMemory`] if the frame or buffers cannot be allocated
/// - the first error of the source; no partial frame is returned
pub fn decode<S: ScanlineSource + ?Sized>(
    source: &mut S,
    format: &PixelFormat,
    transform: Option<&dyn PixelTransform>,
    progress: &mut dyn Progress,
) -> FormatResult<Frame> {
    check_inputs(source, format, transform)?;
    let (width, height) = (format.width(), format.height());
    let scanline_size = source.scanline_size();
    debug!(scanline_size, width, height, transformed = transform.is_some(), "decoding scanlines");

    let mut frame = Frame::new(width, height)?;
    let mut buffers = ScanlineBuffers::new(scanline_size, transform, width as usize)?;
    let stride = transform.map_or(format.samples_per_pixel() as usize, |t| t.output_layout().channels());
    let kind = format.sample_kind();
    let lut = gamma_table();

    progress.set_maximum(height);
    for row in 0..height {
        buffers.load(source, row, format, transform)?;
        let start = row as usize * width as usize;
        let end = start + width as usize;
        let (x, y, z) = frame.xyz_mut();
        unpack_row(buffers.active(), kind, stride, &lut, (&mut x[start..end], &mut y[start..end], &mut z[start..end]));
        trace!(row, "scanline decoded");
        progress.step(row + 1);
    }
    Ok(frame)
}

/// Decodes an 8-bit image into display-ready RGBA8 pixels.
///
/// Samples stay gamma-encoded. Alpha comes from the image only when it has
/// an alpha channel; otherwise every pixel is opaque.
///
/// # Errors
///
/// [`FormatError::InvalidPrecondition`] unless the format is 8-bit, plus
/// everything [`decode`] can return.
pub fn decode_rgba8<S: ScanlineSource + ?Sized>(
    source: &mut S,
    format: &PixelFormat,
    transform: Option<&dyn PixelTransform>,
    progress: &mut dyn Progress,
) -> FormatResult<Rgba8Image> {
    if format.sample_kind() != SampleKind::Byte {
        return Err(FormatError::InvalidPrecondition(format!(
            "RGBA8 preview needs 8-bit samples, image has {:?}",
            format.sample_kind()
        )));
    }
    check_inputs(source, format, transform)?;
    let (width, height) = (format.width(), format.height());

    let mut image = Rgba8Image::new(width, height)?;
    let mut buffers = ScanlineBuffers::new(source.scanline_size(), transform, width as usize)?;
    let stride = transform.map_or(format.samples_per_pixel() as usize, |t| t.output_layout().channels());
    let keep_alpha = format.has_alpha();

    progress.set_maximum(height);
    for row in 0..height {
        buffers.load(source, row, format, transform)?;
        let buf = buffers.active();
        for (i, px) in image.row_mut(row).iter_mut().enumerate() {
            let s = &buf[i * stride..];
            let alpha = if keep_alpha { s[3] } else { 255 };
            *px = [s[0], s[1], s[2], alpha];
        }
        progress.step(row + 1);
    }
    Ok(image)
}
