//! Generic strip codecs: none, LZW, Deflate and PackBits.
//!
//! LogLuv lives in its own module since it also converts pixel encodings.

use super::tags::Compression;
use crate::error::{FormatError, FormatResult, reserved_bytes};
use std::io::{Read, Write};

/// Decompresses one strip.
///
/// `expected` is the decoded size of the strip and only sizes the output
/// buffer; short results are left for the caller to judge.
pub(crate) fn decompress(compression: Compression, data: &[u8], expected: usize) -> FormatResult<Vec<u8>> {
    match compression {
        Compression::None => Ok(data.to_vec()),
        Compression::Deflate => {
            let mut decoder = flate2::read::ZlibDecoder::new(data);
            let mut out = reserved_bytes(expected)?;
            decoder
                .read_to_end(&mut out)
                .map_err(|e| FormatError::Malformed(format!("deflate stream: {e}")))?;
            Ok(out)
        }
        Compression::Lzw => {
            let mut decoder = weezl::decode::Decoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8);
            decoder
                .decode(data)
                .map_err(|e| FormatError::Malformed(format!("LZW stream: {e}")))
        }
        Compression::PackBits => unpack_bits(data, expected),
        other => Err(FormatError::UnsupportedCompression(format!("{other:?}"))),
    }
}

/// Compresses one strip.
pub(crate) fn compress(compression: Compression, data: &[u8]) -> FormatResult<Vec<u8>> {
    match compression {
        Compression::None => Ok(data.to_vec()),
        Compression::Deflate => {
            let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            Ok(encoder.finish()?)
        }
        Compression::Lzw => {
            let mut encoder = weezl::encode::Encoder::with_tiff_size_switch(weezl::BitOrder::Msb, 8);
            encoder
                .encode(data)
                .map_err(|e| FormatError::Malformed(format!("LZW encoder: {e}")))
        }
        Compression::PackBits => Ok(pack_bits(data)),
        other => Err(FormatError::UnsupportedCompression(format!("{other:?} for writing"))),
    }
}

/// PackBits decoder. Stops at `limit` bytes or when input runs out.
fn unpack_bits(data: &[u8], limit: usize) -> FormatResult<Vec<u8>> {
    let mut out = reserved_bytes(limit)?;
    let mut i = 0;
    while i < data.len() && out.len() < limit {
        let n = data[i] as i8;
        i += 1;
        match n {
            0..=127 => {
                let len = (n as usize + 1).min(data.len() - i);
                out.extend_from_slice(&data[i..i + len]);
                i += len;
            }
            -127..=-1 => {
                let Some(&b) = data.get(i) else { break };
                i += 1;
                out.resize(out.len() + (1 - n as isize) as usize, b);
            }
            // -128 is a no-op
            _ => {}
        }
    }
    out.truncate(limit);
    Ok(out)
}

/// PackBits encoder: runs of 2..=128 equal bytes, literals of up to 128.
fn pack_bits(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 128 + 1);
    let mut i = 0;
    while i < data.len() {
        let mut run = 1;
        while i + run < data.len() && run < 128 && data[i + run] == data[i] {
            run += 1;
        }
        if run >= 2 {
            out.push((257 - run) as u8);
            out.push(data[i]);
            i += run;
            continue;
        }

        let start = i;
        i += 1;
        while i < data.len() && i - start < 128 {
            if i + 1 < data.len() && data[i] == data[i + 1] {
                break;
            }
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&data[start..i]);
    }
    out
}
