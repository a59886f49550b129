//! Strip-based TIFF reader.
//!
//! [`TiffDecoder`] parses the header and first directory, then hands out
//! decoded scanlines on demand. Samples come back in native byte order with
//! any horizontal predictor undone. LogLuv strips are expanded either to
//! three native `f32` XYZ values per pixel or to raw 32-bit codes.
//!
//! Only the strip holding the requested row is kept in memory.

use super::compression::decompress;
use super::ifd::{Directory, Endian};
use super::logluv;
use super::tags::{Compression, predictor, tag};
use super::ScanlineSource;
use crate::error::{FormatError, FormatResult, zeroed_bytes};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

/// Classic TIFF magic number.
const MAGIC: u16 = 42;
/// BigTIFF magic number.
const MAGIC_BIG: u16 = 43;

/// Output encoding of LogLuv scanlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLuvFormat {
    /// Three `f32` CIE XYZ values per pixel.
    #[default]
    Float,
    /// One `u32` packed LogLuv code per pixel, with 24 significant bits
    /// for SGILOG24.
    Raw,
}

#[derive(Debug, Clone)]
struct StripLayout {
    width: u32,
    height: u32,
    rows_per_strip: u32,
    samples_per_pixel: usize,
    bits_per_sample: usize,
    compression: Compression,
    predictor: u16,
    offsets: Vec<u32>,
    byte_counts: Vec<u32>,
}

impl StripLayout {
    fn from_directory(dir: &Directory) -> FormatResult<Self> {
        if dir.contains(tag::TILE_WIDTH) || dir.contains(tag::TILE_OFFSETS) {
            return Err(FormatError::UnsupportedFeature("tiled TIFF".into()));
        }
        let width = dir.u32(tag::IMAGE_WIDTH).ok_or(FormatError::MissingTag("ImageWidth"))?;
        let height = dir.u32(tag::IMAGE_LENGTH).ok_or(FormatError::MissingTag("ImageLength"))?;
        let offsets = dir
            .u32_vec(tag::STRIP_OFFSETS)
            .ok_or(FormatError::MissingTag("StripOffsets"))?;
        let byte_counts = dir
            .u32_vec(tag::STRIP_BYTE_COUNTS)
            .ok_or(FormatError::MissingTag("StripByteCounts"))?;
        if offsets.len() != byte_counts.len() {
            return Err(FormatError::Malformed(format!(
                "{} strip offsets but {} byte counts",
                offsets.len(),
                byte_counts.len()
            )));
        }

        let rows_per_strip = dir.u32(tag::ROWS_PER_STRIP).unwrap_or(height).clamp(1, height.max(1));
        Ok(Self {
            width,
            height,
            rows_per_strip,
            samples_per_pixel: dir.u32(tag::SAMPLES_PER_PIXEL).unwrap_or(1) as usize,
            bits_per_sample: dir.u32(tag::BITS_PER_SAMPLE).unwrap_or(1) as usize,
            compression: Compression::from_code(dir.u16(tag::COMPRESSION).unwrap_or(1)),
            predictor: dir.u16(tag::PREDICTOR).unwrap_or(predictor::NONE),
            offsets,
            byte_counts,
        })
    }

    fn rows_in_strip(&self, strip: usize) -> usize {
        let first = strip as u64 * self.rows_per_strip as u64;
        (self.height as u64 - first).min(self.rows_per_strip as u64) as usize
    }
}

/// Reads decoded scanlines from a strip-organized TIFF.
pub struct TiffDecoder<R> {
    reader: R,
    endian: Endian,
    directory: Directory,
    layout: StripLayout,
    logluv: LogLuvFormat,
    cached: Option<(usize, Vec<u8>)>,
}

impl TiffDecoder<BufReader<File>> {
    /// Opens a TIFF file.
    pub fn open<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> TiffDecoder<R> {
    /// Parses the header and first directory.
    pub fn new(mut reader: R) -> FormatResult<Self> {
        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;
        let endian = match &header[0..2] {
            b"II" => Endian::Little,
            b"MM" => Endian::Big,
            _ => return Err(FormatError::Malformed("not a TIFF byte-order marker".into())),
        };
        match endian.read_u16(&header[2..4]) {
            MAGIC => {}
            MAGIC_BIG => return Err(FormatError::UnsupportedFeature("BigTIFF".into())),
            other => return Err(FormatError::Malformed(format!("bad TIFF magic {other}"))),
        }
        let ifd_offset = endian.read_u32(&header[4..8]);
        let directory = Directory::read(&mut reader, ifd_offset as u64, endian)?;
        let layout = StripLayout::from_directory(&directory)?;

        debug!(
            ?endian,
            width = layout.width,
            height = layout.height,
            strips = layout.offsets.len(),
            compression = ?layout.compression,
            "opened TIFF"
        );

        Ok(Self {
            reader,
            endian,
            directory,
            layout,
            logluv: LogLuvFormat::default(),
            cached: None,
        })
    }

    /// Byte order of the file.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Parsed first directory.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Image width and height.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.layout.width, self.layout.height)
    }

    /// Number of strips.
    pub fn strip_count(&self) -> usize {
        self.layout.offsets.len()
    }

    /// Selects how LogLuv scanlines are delivered.
    pub fn set_logluv_format(&mut self, format: LogLuvFormat) {
        if self.logluv != format {
            self.logluv = format;
            self.cached = None;
        }
    }

    /// Bytes in one decoded scanline.
    pub fn scanline_size(&self) -> usize {
        let l = &self.layout;
        let width = l.width as usize;
        if l.compression.is_logluv() {
            return match self.logluv {
                LogLuvFormat::Float => width * 3 * 4,
                LogLuvFormat::Raw => width * 4,
            };
        }
        width
            .saturating_mul(l.samples_per_pixel)
            .saturating_mul(l.bits_per_sample)
            .div_ceil(8)
    }

    /// Decodes `row` into the front of `buf`.
    pub fn read_scanline(&mut self, row: u32, buf: &mut [u8]) -> FormatResult<()> {
        if row >= self.layout.height {
            return Err(FormatError::InvalidPrecondition(format!(
                "row {row} outside image of height {}",
                self.layout.height
            )));
        }
        let size = self.scanline_size();
        if buf.len() < size {
            return Err(FormatError::InvalidPrecondition(format!(
                "scanline buffer holds {} bytes, need {size}",
                buf.len()
            )));
        }

        let strip = (row / self.layout.rows_per_strip) as usize;
        if self.cached.as_ref().map(|(s, _)| *s) != Some(strip) {
            let data = self.decode_strip(strip)?;
            self.cached = Some((strip, data));
        }
        if let Some((_, data)) = &self.cached {
            let start = (row % self.layout.rows_per_strip) as usize * size;
            buf[..size].copy_from_slice(&data[start..start + size]);
        }
        Ok(())
    }

    fn read_raw_strip(&mut self, strip: usize) -> FormatResult<Vec<u8>> {
        let (Some(&offset), Some(&count)) = (self.layout.offsets.get(strip), self.layout.byte_counts.get(strip))
        else {
            return Err(FormatError::Malformed(format!("strip {strip} missing from strip table")));
        };
        self.reader.seek(SeekFrom::Start(offset as u64))?;
        let mut raw = Vec::new();
        self.reader.by_ref().take(count as u64).read_to_end(&mut raw)?;
        if raw.len() != count as usize {
            return Err(FormatError::Malformed(format!(
                "strip {strip} truncated: {} of {count} bytes",
                raw.len()
            )));
        }
        Ok(raw)
    }

    fn decode_strip(&mut self, strip: usize) -> FormatResult<Vec<u8>> {
        let rows = self.layout.rows_in_strip(strip);
        let size = self.scanline_size();
        let expected = rows
            .checked_mul(size)
            .ok_or_else(|| FormatError::Malformed(format!("strip {strip}: {rows} rows of {size} bytes overflow")))?;
        let raw = self.read_raw_strip(strip)?;
        trace!(strip, rows, compressed = raw.len(), "decoding strip");

        match self.layout.compression {
            Compression::SgiLog => self.decode_logluv32(&raw, rows, expected),
            Compression::SgiLog24 => self.decode_logluv24(&raw, rows, expected),
            compression => {
                let mut data = decompress(compression, &raw, expected)?;
                if data.len() < expected {
                    return Err(FormatError::Malformed(format!(
                        "strip {strip} decodes to {} bytes, expected {expected}",
                        data.len()
                    )));
                }
                data.truncate(expected);
                let sample_bytes = self.layout.bits_per_sample / 8;
                if self.layout.bits_per_sample % 8 == 0 {
                    self.endian.swap_samples(&mut data, sample_bytes);
                }
                self.undo_predictor(&mut data, size)?;
                Ok(data)
            }
        }
    }

    fn undo_predictor(&self, data: &mut [u8], row_bytes: usize) -> FormatResult<()> {
        let spp = self.layout.samples_per_pixel;
        match (self.layout.predictor, self.layout.bits_per_sample) {
            (predictor::NONE, _) => Ok(()),
            (predictor::HORIZONTAL, 8) => {
                for row in data.chunks_exact_mut(row_bytes) {
                    for i in spp..row.len() {
                        row[i] = row[i].wrapping_add(row[i - spp]);
                    }
                }
                Ok(())
            }
            (predictor::HORIZONTAL, 16) => {
                for row in data.chunks_exact_mut(row_bytes) {
                    let samples = row.len() / 2;
                    for i in spp..samples {
                        let prev = u16::from_ne_bytes([row[(i - spp) * 2], row[(i - spp) * 2 + 1]]);
                        let cur = u16::from_ne_bytes([row[i * 2], row[i * 2 + 1]]);
                        row[i * 2..i * 2 + 2].copy_from_slice(&cur.wrapping_add(prev).to_ne_bytes());
                    }
                }
                Ok(())
            }
            (p, bits) => Err(FormatError::UnsupportedFeature(format!(
                "predictor {p} with {bits}-bit samples"
            ))),
        }
    }

    fn decode_logluv32(&self, raw: &[u8], rows: usize, expected: usize) -> FormatResult<Vec<u8>> {
        let width = self.layout.width as usize;
        let mut out = zeroed_bytes(expected)?;
        let mut codes = vec![0u32; width];
        let mut pos = 0;
        let mut cursor = 0;
        for _ in 0..rows {
            pos += logluv::decode_row(&raw[pos..], &mut codes)?;
            for &code in &codes {
                cursor += self.emit_logluv(code, logluv::luv32_to_xyz, &mut out[cursor..]);
            }
        }
        Ok(out)
    }

    fn decode_logluv24(&self, raw: &[u8], rows: usize, expected: usize) -> FormatResult<Vec<u8>> {
        let needed = rows.saturating_mul(self.layout.width as usize * 3);
        if raw.len() < needed {
            return Err(FormatError::Malformed(format!(
                "SGILOG24 strip holds {} bytes, expected {needed}",
                raw.len()
            )));
        }
        let mut out = zeroed_bytes(expected)?;
        let mut cursor = 0;
        for px in raw[..needed].chunks_exact(3) {
            cursor += self.emit_logluv(logluv::read_luv24(px), logluv::luv24_to_xyz, &mut out[cursor..]);
        }
        Ok(out)
    }

    /// Writes one LogLuv pixel in the selected output format.
    fn emit_logluv(&self, code: u32, to_xyz: fn(u32) -> [f32; 3], out: &mut [u8]) -> usize {
        match self.logluv {
            LogLuvFormat::Raw => {
                out[..4].copy_from_slice(&code.to_ne_bytes());
                4
            }
            LogLuvFormat::Float => {
                for (c, v) in to_xyz(code).iter().enumerate() {
                    out[c * 4..c * 4 + 4].copy_from_slice(&v.to_ne_bytes());
                }
                12
            }
        }
    }
}

impl<R: Read + Seek> ScanlineSource for TiffDecoder<R> {
    fn dimensions(&self) -> (u32, u32) {
        TiffDecoder::dimensions(self)
    }

    fn scanline_size(&self) -> usize {
        TiffDecoder::scanline_size(self)
    }

    fn read_scanline(&mut self, row: u32, buf: &mut [u8]) -> FormatResult<()> {
        TiffDecoder::read_scanline(self, row, buf)
    }
}

impl<R> std::fmt::Debug for TiffDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiffDecoder")
            .field("endian", &self.endian)
            .field("layout", &self.layout)
            .field("logluv", &self.logluv)
            .finish_non_exhaustive()
    }
}
