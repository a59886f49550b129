//! Strip-based TIFF writer.
//!
//! The header goes out immediately with a placeholder directory offset.
//! Strips are appended as they arrive and the directory is written last by
//! [`TiffEncoder::finish`], which then patches the header.
//!
//! Strip data is handed over uncompressed, with samples in native byte
//! order. For SGILOG the input is three native `f32` CIE XYZ values per
//! pixel.

use super::compression::compress;
use super::ifd::{Directory, Endian, Value, to_offset};
use super::logluv;
use super::tags::{Compression, predictor, tag};
use super::StripSink;
use crate::error::{FormatError, FormatResult};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Strip geometry derived from the directory tags.
#[derive(Debug, Clone, Copy)]
struct Geometry {
    width: usize,
    height: u32,
    rows_per_strip: u32,
    samples_per_pixel: usize,
    bits_per_sample: usize,
    compression: Compression,
    predictor: u16,
}

impl Geometry {
    fn from_directory(dir: &Directory) -> FormatResult<Self> {
        let width = dir.u32(tag::IMAGE_WIDTH).ok_or(FormatError::MissingTag("ImageWidth"))?;
        let height = dir.u32(tag::IMAGE_LENGTH).ok_or(FormatError::MissingTag("ImageLength"))?;
        if width == 0 || height == 0 {
            return Err(FormatError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width: width as usize,
            height,
            rows_per_strip: dir.u32(tag::ROWS_PER_STRIP).unwrap_or(height).clamp(1, height),
            samples_per_pixel: dir.u32(tag::SAMPLES_PER_PIXEL).unwrap_or(1) as usize,
            bits_per_sample: dir.u32(tag::BITS_PER_SAMPLE).unwrap_or(1) as usize,
            compression: Compression::from_code(dir.u16(tag::COMPRESSION).unwrap_or(1)),
            predictor: dir.u16(tag::PREDICTOR).unwrap_or(predictor::NONE),
        })
    }

    /// Bytes of one uncompressed input row.
    fn row_bytes(&self) -> FormatResult<usize> {
        match self.compression {
            Compression::SgiLog => Ok(self.width * 3 * 4),
            Compression::SgiLog24 => Err(FormatError::UnsupportedCompression("SGILOG24 for writing".into())),
            _ => Ok((self.width * self.samples_per_pixel * self.bits_per_sample).div_ceil(8)),
        }
    }

    fn strip_count(&self) -> u32 {
        self.height.div_ceil(self.rows_per_strip)
    }

    fn rows_in_strip(&self, strip: u32) -> usize {
        let first = strip * self.rows_per_strip;
        (self.height - first).min(self.rows_per_strip) as usize
    }
}

/// Writes a single-image, strip-organized TIFF.
pub struct TiffEncoder<W: Write + Seek> {
    writer: W,
    endian: Endian,
    directory: Directory,
    strips: Vec<Option<(u32, u32)>>,
}

impl TiffEncoder<BufWriter<File>> {
    /// Creates a little-endian TIFF file.
    pub fn create<P: AsRef<Path>>(path: P) -> FormatResult<Self> {
        let file = File::create(path.as_ref())?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write + Seek> TiffEncoder<W> {
    /// Starts a little-endian TIFF.
    pub fn new(writer: W) -> FormatResult<Self> {
        Self::with_endian(writer, Endian::Little)
    }

    /// Starts a TIFF in the given byte order.
    pub fn with_endian(mut writer: W, endian: Endian) -> FormatResult<Self> {
        let mut header = [0u8; 8];
        header[0..2].copy_from_slice(&endian.marker());
        endian.write_u16(&mut header[2..4], 42);
        writer.write_all(&header)?;
        Ok(Self {
            writer,
            endian,
            directory: Directory::new(),
            strips: Vec::new(),
        })
    }

    /// Directory that will be written by [`TiffEncoder::finish`].
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Mutable access to the pending directory.
    ///
    /// Strip offsets and byte counts are filled in by the encoder.
    pub fn directory_mut(&mut self) -> &mut Directory {
        &mut self.directory
    }

    /// Uncompressed bytes of a full strip.
    pub fn strip_size(&self) -> FormatResult<usize> {
        let g = Geometry::from_directory(&self.directory)?;
        Ok(g.row_bytes()? * g.rows_per_strip as usize)
    }

    /// Number of strips the image is split into.
    pub fn strip_count(&self) -> FormatResult<u32> {
        Ok(Geometry::from_directory(&self.directory)?.strip_count())
    }

    /// Encodes and appends one strip.
    ///
    /// `data` must hold exactly the rows of that strip; the last strip may
    /// be shorter than the others.
    pub fn write_encoded_strip(&mut self, strip: u32, data: &[u8]) -> FormatResult<()> {
        let g = Geometry::from_directory(&self.directory)?;
        let count = g.strip_count();
        if strip >= count {
            return Err(FormatError::InvalidPrecondition(format!(
                "strip {strip} out of range, image has {count}"
            )));
        }
        let row_bytes = g.row_bytes()?;
        let expected = g.rows_in_strip(strip) * row_bytes;
        if data.len() != expected {
            return Err(FormatError::InvalidPrecondition(format!(
                "strip {strip} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        if self.strips.len() != count as usize {
            self.strips.resize(count as usize, None);
        }
        if self.strips[strip as usize].is_some() {
            return Err(FormatError::InvalidPrecondition(format!("strip {strip} written twice")));
        }

        let encoded = match g.compression {
            Compression::SgiLog => encode_logluv(data, g.width, row_bytes),
            compression => {
                let mut buf = data.to_vec();
                apply_predictor(&mut buf, &g, row_bytes)?;
                if g.bits_per_sample % 8 == 0 {
                    self.endian.swap_samples(&mut buf, g.bits_per_sample / 8);
                }
                compress(compression, &buf)?
            }
        };

        let pos = self.writer.seek(SeekFrom::End(0))?;
        let offset = to_offset(pos)?;
        to_offset(pos + encoded.len() as u64)?;
        self.writer.write_all(&encoded)?;
        self.strips[strip as usize] = Some((offset, encoded.len() as u32));
        Ok(())
    }

    /// Writes the directory, patches the header and returns the writer.
    pub fn finish(mut self) -> FormatResult<W> {
        let count = self.strip_count()? as usize;
        let mut offsets = Vec::with_capacity(count);
        let mut byte_counts = Vec::with_capacity(count);
        for i in 0..count {
            let Some(Some((offset, len))) = self.strips.get(i).copied() else {
                return Err(FormatError::InvalidPrecondition(format!("strip {i} was never written")));
            };
            offsets.push(offset);
            byte_counts.push(len);
        }
        self.directory.insert(tag::STRIP_OFFSETS, Value::Long(offsets));
        self.directory.insert(tag::STRIP_BYTE_COUNTS, Value::Long(byte_counts));

        let ifd_offset = self.directory.write(&mut self.writer, self.endian)?;
        let mut patch = [0u8; 4];
        self.endian.write_u32(&mut patch, ifd_offset);
        self.writer.seek(SeekFrom::Start(4))?;
        self.writer.write_all(&patch)?;
        self.writer.seek(SeekFrom::End(0))?;
        self.writer.flush()?;

        debug!(strips = count, entries = self.directory.len(), ifd_offset, "finished TIFF");
        Ok(self.writer)
    }
}

/// Horizontal differencing, the inverse of the decoder's accumulation.
fn apply_predictor(data: &mut [u8], g: &Geometry, row_bytes: usize) -> FormatResult<()> {
    let spp = g.samples_per_pixel;
    match (g.predictor, g.bits_per_sample) {
        (predictor::NONE, _) => Ok(()),
        (predictor::HORIZONTAL, 8) => {
            for row in data.chunks_exact_mut(row_bytes) {
                for i in (spp..row.len()).rev() {
                    row[i] = row[i].wrapping_sub(row[i - spp]);
                }
            }
            Ok(())
        }
        (predictor::HORIZONTAL, 16) => {
            for row in data.chunks_exact_mut(row_bytes) {
                for i in (spp..row.len() / 2).rev() {
                    let prev = u16::from_ne_bytes([row[(i - spp) * 2], row[(i - spp) * 2 + 1]]);
                    let cur = u16::from_ne_bytes([row[i * 2], row[i * 2 + 1]]);
                    row[i * 2..i * 2 + 2].copy_from_slice(&cur.wrapping_sub(prev).to_ne_bytes());
                }
            }
            Ok(())
        }
        (p, bits) => Err(FormatError::UnsupportedFeature(format!(
            "predictor {p} with {bits}-bit samples"
        ))),
    }
}

/// Converts rows of native `f32` XYZ triples to run-length encoded LogLuv32.
fn encode_logluv(data: &[u8], width: usize, row_bytes: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut codes = Vec::with_capacity(width);
    for row in data.chunks_exact(row_bytes) {
        codes.clear();
        codes.extend(row.chunks_exact(12).map(|px| {
            let f = |i: usize| f32::from_ne_bytes([px[i], px[i + 1], px[i + 2], px[i + 3]]);
            logluv::luv32_from_xyz([f(0), f(4), f(8)])
        }));
        logluv::encode_row(&codes, &mut out);
    }
    out
}

impl<W: Write + Seek> StripSink for TiffEncoder<W> {
    fn directory_mut(&mut self) -> &mut Directory {
        TiffEncoder::directory_mut(self)
    }

    fn strip_size(&self) -> FormatResult<usize> {
        TiffEncoder::strip_size(self)
    }

    fn strip_count(&self) -> FormatResult<u32> {
        TiffEncoder::strip_count(self)
    }

    fn write_encoded_strip(&mut self, strip: u32, data: &[u8]) -> FormatResult<()> {
        TiffEncoder::write_encoded_strip(self, strip, data)
    }
}

impl<W: Write + Seek> std::fmt::Debug for TiffEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiffEncoder")
            .field("endian", &self.endian)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}
