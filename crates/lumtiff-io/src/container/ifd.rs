//! Image File Directory parsing and serialization.
//!
//! An IFD is a list of 12-byte entries `(tag, type, count, value-or-offset)`.
//! Values of four bytes or less are stored inline; larger ones live
//! elsewhere in the file. [`Directory`] holds the decoded entries keyed by
//! tag, so the rest of the codec never deals with field types or offsets.

use crate::error::{FormatError, FormatResult};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::debug;

/// Bytes per IFD entry.
const ENTRY_LEN: usize = 12;

/// Byte order of a TIFF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// `II`, Intel order.
    #[default]
    Little,
    /// `MM`, Motorola order.
    Big,
}

impl Endian {
    /// Byte order of the running machine.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") { Self::Big } else { Self::Little }
    }

    /// Header marker bytes.
    pub fn marker(self) -> [u8; 2] {
        match self {
            Self::Little => *b"II",
            Self::Big => *b"MM",
        }
    }

    /// Reads a `u16` from the start of `buf`.
    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Self::Little => LittleEndian::read_u16(buf),
            Self::Big => BigEndian::read_u16(buf),
        }
    }

    /// Reads a `u32` from the start of `buf`.
    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Self::Little => LittleEndian::read_u32(buf),
            Self::Big => BigEndian::read_u32(buf),
        }
    }

    /// Writes a `u16` to the start of `buf`.
    pub fn write_u16(self, buf: &mut [u8], value: u16) {
        match self {
            Self::Little => LittleEndian::write_u16(buf, value),
            Self::Big => BigEndian::write_u16(buf, value),
        }
    }

    /// Writes a `u32` to the start of `buf`.
    pub fn write_u32(self, buf: &mut [u8], value: u32) {
        match self {
            Self::Little => LittleEndian::write_u32(buf, value),
            Self::Big => BigEndian::write_u32(buf, value),
        }
    }

    /// Converts packed samples between this order and native order.
    ///
    /// The conversion is its own inverse, so it serves both directions.
    pub fn swap_samples(self, buf: &mut [u8], sample_bytes: usize) {
        if self == Self::native() || sample_bytes < 2 {
            return;
        }
        for sample in buf.chunks_exact_mut(sample_bytes) {
            sample.reverse();
        }
    }
}

/// A decoded tag value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// BYTE (1).
    Byte(Vec<u8>),
    /// ASCII (2), without the trailing NUL.
    Ascii(String),
    /// SHORT (3).
    Short(Vec<u16>),
    /// LONG (4).
    Long(Vec<u32>),
    /// RATIONAL (5), numerator and denominator.
    Rational(Vec<[u32; 2]>),
    /// SBYTE (6).
    SByte(Vec<i8>),
    /// UNDEFINED (7).
    Undefined(Vec<u8>),
    /// SSHORT (8).
    SShort(Vec<i16>),
    /// SLONG (9).
    SLong(Vec<i32>),
    /// SRATIONAL (10).
    SRational(Vec<[i32; 2]>),
    /// FLOAT (11).
    Float(Vec<f32>),
    /// DOUBLE (12).
    Double(Vec<f64>),
}

/// Size in bytes of one element of a field type, `None` for unknown types.
fn type_size(field_type: u16) -> Option<usize> {
    match field_type {
        1 | 2 | 6 | 7 => Some(1),
        3 | 8 => Some(2),
        4 | 9 | 11 => Some(4),
        5 | 10 | 12 => Some(8),
        _ => None,
    }
}

impl Value {
    /// Field type code.
    pub fn field_type(&self) -> u16 {
        match self {
            Self::Byte(_) => 1,
            Self::Ascii(_) => 2,
            Self::Short(_) => 3,
            Self::Long(_) => 4,
            Self::Rational(_) => 5,
            Self::SByte(_) => 6,
            Self::Undefined(_) => 7,
            Self::SShort(_) => 8,
            Self::SLong(_) => 9,
            Self::SRational(_) => 10,
            Self::Float(_) => 11,
            Self::Double(_) => 12,
        }
    }

    /// Number of elements as stored in the entry's count field.
    pub fn count(&self) -> usize {
        match self {
            Self::Byte(v) | Self::Undefined(v) => v.len(),
            Self::Ascii(s) => s.len() + 1,
            Self::Short(v) => v.len(),
            Self::Long(v) => v.len(),
            Self::Rational(v) => v.len(),
            Self::SByte(v) => v.len(),
            Self::SShort(v) => v.len(),
            Self::SLong(v) => v.len(),
            Self::SRational(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    /// Unsigned integer elements, widened to `u32`.
    pub fn as_u32s(&self) -> Option<Vec<u32>> {
        match self {
            Self::Byte(v) => Some(v.iter().map(|&x| x as u32).collect()),
            Self::Short(v) => Some(v.iter().map(|&x| x as u32).collect()),
            Self::Long(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Numeric elements converted to `f64`.
    ///
    /// Rationals with a zero denominator read as 0.
    pub fn as_f64s(&self) -> Option<Vec<f64>> {
        let ratio = |n: f64, d: f64| if d == 0.0 { 0.0 } else { n / d };
        match self {
            Self::Byte(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::Short(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::Long(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::SByte(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::SShort(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::SLong(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::Rational(v) => Some(v.iter().map(|&[n, d]| ratio(n as f64, d as f64)).collect()),
            Self::SRational(v) => Some(v.iter().map(|&[n, d]| ratio(n as f64, d as f64)).collect()),
            Self::Float(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Self::Double(v) => Some(v.clone()),
            Self::Ascii(_) | Self::Undefined(_) => None,
        }
    }

    /// Raw bytes of BYTE and UNDEFINED values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Byte(v) | Self::Undefined(v) => Some(v),
            _ => None,
        }
    }

    /// Text of an ASCII value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Ascii(s) => Some(s),
            _ => None,
        }
    }

    fn parse<B: ByteOrder>(field_type: u16, count: usize, data: &[u8]) -> Option<Self> {
        fn pairs<T: Copy>(flat: Vec<T>) -> Vec<[T; 2]> {
            flat.chunks_exact(2).map(|p| [p[0], p[1]]).collect()
        }
        let value = match field_type {
            1 => Self::Byte(data.to_vec()),
            2 => {
                let text = data.split(|&b| b == 0).next().unwrap_or_default();
                Self::Ascii(String::from_utf8_lossy(text).into_owned())
            }
            3 => {
                let mut v = vec![0u16; count];
                B::read_u16_into(data, &mut v);
                Self::Short(v)
            }
            4 => {
                let mut v = vec![0u32; count];
                B::read_u32_into(data, &mut v);
                Self::Long(v)
            }
            5 => {
                let mut v = vec![0u32; count * 2];
                B::read_u32_into(data, &mut v);
                Self::Rational(pairs(v))
            }
            6 => Self::SByte(data.iter().map(|&b| b as i8).collect()),
            7 => Self::Undefined(data.to_vec()),
            8 => {
                let mut v = vec![0i16; count];
                B::read_i16_into(data, &mut v);
                Self::SShort(v)
            }
            9 => {
                let mut v = vec![0i32; count];
                B::read_i32_into(data, &mut v);
                Self::SLong(v)
            }
            10 => {
                let mut v = vec![0i32; count * 2];
                B::read_i32_into(data, &mut v);
                Self::SRational(pairs(v))
            }
            11 => {
                let mut v = vec![0f32; count];
                B::read_f32_into(data, &mut v);
                Self::Float(v)
            }
            12 => {
                let mut v = vec![0f64; count];
                B::read_f64_into(data, &mut v);
                Self::Double(v)
            }
            _ => return None,
        };
        Some(value)
    }

    fn encode<B: ByteOrder>(&self) -> Vec<u8> {
        fn flat<T: Copy>(pairs: &[[T; 2]]) -> Vec<T> {
            pairs.iter().flat_map(|p| [p[0], p[1]]).collect()
        }
        let size = self.count() * type_size(self.field_type()).unwrap_or(1);
        let mut out = vec![0u8; size];
        match self {
            Self::Byte(v) | Self::Undefined(v) => out.copy_from_slice(v),
            Self::Ascii(s) => out[..s.len()].copy_from_slice(s.as_bytes()),
            Self::Short(v) => B::write_u16_into(v, &mut out),
            Self::Long(v) => B::write_u32_into(v, &mut out),
            Self::Rational(v) => B::write_u32_into(&flat(v), &mut out),
            Self::SByte(v) => {
                for (o, &b) in out.iter_mut().zip(v) {
                    *o = b as u8;
                }
            }
            Self::SShort(v) => B::write_i16_into(v, &mut out),
            Self::SLong(v) => B::write_i32_into(v, &mut out),
            Self::SRational(v) => B::write_i32_into(&flat(v), &mut out),
            Self::Float(v) => B::write_f32_into(v, &mut out),
            Self::Double(v) => B::write_f64_into(v, &mut out),
        }
        out
    }

    fn encode_in(&self, endian: Endian) -> Vec<u8> {
        match endian {
            Endian::Little => self.encode::<LittleEndian>(),
            Endian::Big => self.encode::<BigEndian>(),
        }
    }
}

/// Tag to value map of one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    entries: BTreeMap<u16, Value>,
}

impl Directory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a tag, returning the previous value.
    pub fn insert(&mut self, tag: u16, value: Value) -> Option<Value> {
        self.entries.insert(tag, value)
    }

    /// Removes a tag.
    pub fn remove(&mut self, tag: u16) -> Option<Value> {
        self.entries.remove(&tag)
    }

    /// Returns the value of a tag.
    pub fn get(&self, tag: u16) -> Option<&Value> {
        self.entries.get(&tag)
    }

    /// Whether a tag is present.
    pub fn contains(&self, tag: u16) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Iterates entries in ascending tag order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Value)> {
        self.entries.iter().map(|(&t, v)| (t, v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First element of an unsigned integer tag.
    pub fn u32(&self, tag: u16) -> Option<u32> {
        self.get(tag)?.as_u32s()?.first().copied()
    }

    /// First element of an unsigned integer tag, if it fits in `u16`.
    pub fn u16(&self, tag: u16) -> Option<u16> {
        self.u32(tag).and_then(|v| u16::try_from(v).ok())
    }

    /// All elements of an unsigned integer tag.
    pub fn u32_vec(&self, tag: u16) -> Option<Vec<u32>> {
        self.get(tag)?.as_u32s()
    }

    /// All elements of an unsigned integer tag that fit in `u16`.
    pub fn u16_vec(&self, tag: u16) -> Option<Vec<u16>> {
        self.u32_vec(tag)?
            .into_iter()
            .map(|v| u16::try_from(v).ok())
            .collect()
    }

    /// First element of a numeric tag as `f64`.
    pub fn f64(&self, tag: u16) -> Option<f64> {
        self.get(tag)?.as_f64s()?.first().copied()
    }

    /// All elements of a numeric tag as `f64`.
    pub fn f64_vec(&self, tag: u16) -> Option<Vec<f64>> {
        self.get(tag)?.as_f64s()
    }

    /// Raw bytes of a BYTE or UNDEFINED tag.
    pub fn bytes(&self, tag: u16) -> Option<&[u8]> {
        self.get(tag)?.as_bytes()
    }

    /// Text of an ASCII tag.
    pub fn ascii(&self, tag: u16) -> Option<&str> {
        self.get(tag)?.as_str()
    }

    /// Reads the directory at `offset`.
    ///
    /// Entries with unknown field types are skipped.
    pub fn read<R: Read + Seek>(reader: &mut R, offset: u64, endian: Endian) -> FormatResult<Self> {
        reader.seek(SeekFrom::Start(offset))?;
        let mut count_buf = [0u8; 2];
        reader.read_exact(&mut count_buf)?;
        let count = endian.read_u16(&count_buf) as usize;
        if count == 0 {
            return Err(FormatError::Malformed("directory has no entries".into()));
        }

        let mut table = vec![0u8; count * ENTRY_LEN];
        reader.read_exact(&mut table)?;

        let mut entries = BTreeMap::new();
        for raw in table.chunks_exact(ENTRY_LEN) {
            let tag = endian.read_u16(&raw[0..2]);
            let field_type = endian.read_u16(&raw[2..4]);
            let n = endian.read_u32(&raw[4..8]) as usize;

            let Some(elem) = type_size(field_type) else {
                debug!(tag, field_type, "skipping entry with unknown field type");
                continue;
            };
            let size = n
                .checked_mul(elem)
                .ok_or_else(|| FormatError::Malformed(format!("tag {tag} count overflows")))?;

            let data = if size <= 4 {
                raw[8..8 + size].to_vec()
            } else {
                let at = endian.read_u32(&raw[8..12]) as u64;
                reader.seek(SeekFrom::Start(at))?;
                // take() keeps a bogus count from reserving more than the file holds
                let mut data = Vec::new();
                reader.by_ref().take(size as u64).read_to_end(&mut data)?;
                if data.len() != size {
                    return Err(FormatError::Malformed(format!(
                        "tag {tag} value truncated: {} of {size} bytes",
                        data.len()
                    )));
                }
                data
            };

            let value = match endian {
                Endian::Little => Value::parse::<LittleEndian>(field_type, n, &data),
                Endian::Big => Value::parse::<BigEndian>(field_type, n, &data),
            };
            if let Some(value) = value {
                entries.insert(tag, value);
            }
        }

        Ok(Self { entries })
    }

    /// Writes the directory at the current (word-aligned) end of `writer`,
    /// followed by its out-of-line values, and returns its offset.
    pub fn write<W: Write + Seek>(&self, writer: &mut W, endian: Endian) -> FormatResult<u32> {
        let mut pos = writer.seek(SeekFrom::End(0))?;
        if pos % 2 == 1 {
            writer.write_all(&[0])?;
            pos += 1;
        }
        let ifd_offset = to_offset(pos)?;
        let count = u16::try_from(self.entries.len())
            .map_err(|_| FormatError::Malformed("too many directory entries".into()))?;

        let table_len = 2 + self.entries.len() * ENTRY_LEN + 4;
        let mut table = vec![0u8; table_len];
        let mut extra: Vec<u8> = Vec::new();
        let extra_base = pos + table_len as u64;

        endian.write_u16(&mut table[0..2], count);
        for (i, (&tag, value)) in self.entries.iter().enumerate() {
            let entry = &mut table[2 + i * ENTRY_LEN..2 + (i + 1) * ENTRY_LEN];
            let count = u32::try_from(value.count())
                .map_err(|_| FormatError::Malformed(format!("tag {tag} has too many values")))?;
            endian.write_u16(&mut entry[0..2], tag);
            endian.write_u16(&mut entry[2..4], value.field_type());
            endian.write_u32(&mut entry[4..8], count);

            let data = value.encode_in(endian);
            if data.len() <= 4 {
                entry[8..8 + data.len()].copy_from_slice(&data);
            } else {
                if extra.len() % 2 == 1 {
                    extra.push(0);
                }
                let at = to_offset(extra_base + extra.len() as u64)?;
                endian.write_u32(&mut entry[8..12], at);
                extra.extend_from_slice(&data);
            }
        }
        // next-IFD offset stays zero: single image

        writer.write_all(&table)?;
        writer.write_all(&extra)?;
        Ok(ifd_offset)
    }
}

/// Narrows a file position to a classic TIFF offset.
pub(crate) fn to_offset(pos: u64) -> FormatResult<u32> {
    u32::try_from(pos).map_err(|_| FormatError::UnsupportedFeature("files over 4 GiB (BigTIFF)".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_directory() -> Directory {
        let mut dir = Directory::new();
        dir.insert(256, Value::Short(vec![640]));
        dir.insert(258, Value::Short(vec![16, 16, 16]));
        dir.insert(273, Value::Long(vec![8, 1000, 2000]));
        dir.insert(305, Value::Ascii("lumtiff".into()));
        dir.insert(318, Value::Rational(vec![[3127, 10000], [3290, 10000]]));
        dir.insert(34675, Value::Undefined(vec![7; 20]));
        dir.insert(37439, Value::Double(vec![179.0]));
        dir
    }

    #[test]
    fn directory_survives_both_byte_orders() {
        for endian in [Endian::Little, Endian::Big] {
            let dir = sample_directory();
            let mut cursor = Cursor::new(vec![0u8; 8]);
            let offset = dir.write(&mut cursor, endian).unwrap();
            assert_eq!(offset, 8);

            let back = Directory::read(&mut cursor, offset as u64, endian).unwrap();
            assert_eq!(back, dir);
        }
    }

    #[test]
    fn typed_accessors() {
        let dir = sample_directory();
        assert_eq!(dir.u32(256), Some(640));
        assert_eq!(dir.u16_vec(258), Some(vec![16, 16, 16]));
        assert_eq!(dir.u32_vec(273).map(|v| v.len()), Some(3));
        assert_eq!(dir.ascii(305), Some("lumtiff"));
        assert_eq!(dir.bytes(34675).map(|b| b.len()), Some(20));
        let wp = dir.f64_vec(318).unwrap();
        assert!((wp[0] - 0.3127).abs() < 1e-12);
        assert_eq!(dir.f64(37439), Some(179.0));
        assert_eq!(dir.u32(999), None);
    }

    #[test]
    fn truncated_value_is_malformed() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&273u16.to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        bytes.extend_from_slice(&1000u32.to_le_bytes());
        bytes.extend_from_slice(&18u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let err = Directory::read(&mut Cursor::new(bytes), 0, Endian::Little).unwrap_err();
        assert!(matches!(err, FormatError::Malformed(_)));
    }

    #[test]
    fn swap_samples_reverses_foreign_order() {
        let foreign = if Endian::native() == Endian::Little { Endian::Big } else { Endian::Little };
        let mut buf = [1u8, 2, 3, 4];
        foreign.swap_samples(&mut buf, 2);
        assert_eq!(buf, [2, 1, 4, 3]);
        Endian::native().swap_samples(&mut buf, 2);
        assert_eq!(buf, [2, 1, 4, 3]);
    }
}
