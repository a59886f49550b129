//! SGI LogLuv pixel encoding.
//!
//! A LogLuv32 pixel packs a signed 16-bit log luminance and two 8-bit CIE
//! u'v' chromaticity indices:
//!
//! ```text
//! bit 31      16 15      8 7       0
//!     | sign+Le  |   u'e   |   v'e  |
//! ```
//!
//! `Le` encodes `log2(Y)` in 1/256 steps with an offset of 64, giving a
//! range of about 5.4e-20 to 1.8e19 at 0.27% relative precision.
//!
//! SGILOG (34676) strips hold, per row, the four byte planes of the packed
//! pixels (most significant first), each run-length encoded. SGILOG24
//! (34677) stores raw big-endian 24-bit codes without run-length coding:
//!
//! ```text
//! bit 23    14 13           0
//!     |  Le   |  uv square  |
//! ```
//!
//! where `Le` is a 10-bit log luminance in 1/64 steps and the low 14 bits
//! index a square of the u'v' plane (see `uv_rows`).

use super::uv_rows::{UV_CODES, UV_ROWS, UV_SQUARE, UV_V_START};
use crate::error::{FormatError, FormatResult};
use std::f64::consts::LN_2;

/// Scale between u'v' and their 8-bit indices.
const UV_SCALE: f64 = 410.0;
/// Neutral u' used for black and degenerate pixels.
const U_NEUTRAL: f64 = 4.0 / 19.0;
/// Neutral v' used for black and degenerate pixels.
const V_NEUTRAL: f64 = 9.0 / 19.0;
/// Shortest run worth encoding as a run.
const MIN_RUN: usize = 4;
/// Longest run one code can express.
const MAX_RUN: usize = 127 + 2;
/// Longest literal one code can express.
const MAX_LITERAL: usize = 127;

/// Decodes a 16-bit log luminance.
pub fn log_l16_to_y(p: u16) -> f64 {
    let le = p & 0x7fff;
    if le == 0 {
        return 0.0;
    }
    let y = (LN_2 / 256.0 * (le as f64 + 0.5) - LN_2 * 64.0).exp();
    if p & 0x8000 == 0 { y } else { -y }
}

/// Decodes a 10-bit log luminance.
pub fn log_l10_to_y(p: u16) -> f64 {
    if p == 0 {
        return 0.0;
    }
    (LN_2 / 64.0 * (p as f64 + 0.5) - LN_2 * 12.0).exp()
}

/// Encodes luminance as a 16-bit log value, truncating.
pub fn log_l16_from_y(y: f64) -> u16 {
    if y >= 1.8371976e19 {
        0x7fff
    } else if y <= -1.8371976e19 {
        0xffff
    } else if y > 5.4136769e-20 {
        (256.0 * (y.log2() + 64.0)) as u16
    } else if y < -5.4136769e-20 {
        0x8000 | (256.0 * ((-y).log2() + 64.0)) as u16
    } else {
        0
    }
}

fn uv_index(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else {
        ((UV_SCALE * value) as u32).min(255)
    }
}

/// Packs CIE XYZ into a LogLuv32 code.
pub fn luv32_from_xyz(xyz: [f32; 3]) -> u32 {
    let [x, y, z] = xyz.map(f64::from);
    let le = log_l16_from_y(y) as u32;
    let s = x + 15.0 * y + 3.0 * z;
    let (u, v) = if le == 0 || s <= 0.0 {
        (U_NEUTRAL, V_NEUTRAL)
    } else {
        (4.0 * x / s, 9.0 * y / s)
    };
    le << 16 | uv_index(u) << 8 | uv_index(v)
}

/// Unpacks a LogLuv32 code to CIE XYZ. Non-positive luminance gives black.
pub fn luv32_to_xyz(p: u32) -> [f32; 3] {
    let l = log_l16_to_y((p >> 16) as u16);
    if l <= 0.0 {
        return [0.0; 3];
    }
    let u = (((p >> 8) & 0xff) as f64 + 0.5) / UV_SCALE;
    let v = ((p & 0xff) as f64 + 0.5) / UV_SCALE;
    uv_to_xyz(u, v, l)
}

/// Centre of the u'v' square with the given 14-bit code.
///
/// Returns `None` for codes past the last square.
pub fn uv_decode(code: u32) -> Option<(f64, f64)> {
    if code >= UV_CODES {
        return None;
    }
    // last row whose first code is not past `code`
    let row = UV_ROWS.partition_point(|&(_, _, first)| first as u32 <= code) - 1;
    let (u_start, _, first) = UV_ROWS[row];
    let u = u_start as f64 + ((code - first as u32) as f64 + 0.5) * UV_SQUARE;
    let v = UV_V_START + (row as f64 + 0.5) * UV_SQUARE;
    Some((u, v))
}

/// Unpacks a SGILOG24 code to CIE XYZ. Zero luminance gives black and an
/// out-of-range chroma code decodes as neutral.
pub fn luv24_to_xyz(p: u32) -> [f32; 3] {
    let l = log_l10_to_y(((p >> 14) & 0x3ff) as u16);
    if l <= 0.0 {
        return [0.0; 3];
    }
    let (u, v) = uv_decode(p & 0x3fff).unwrap_or((U_NEUTRAL, V_NEUTRAL));
    uv_to_xyz(u, v, l)
}

fn uv_to_xyz(u: f64, v: f64, l: f64) -> [f32; 3] {
    let s = 1.0 / (6.0 * u - 16.0 * v + 12.0);
    let x = 9.0 * u * s;
    let y = 4.0 * v * s;
    [(x / y * l) as f32, l as f32, ((1.0 - x - y) / y * l) as f32]
}

/// Decodes one run-length encoded row of `out.len()` pixels.
///
/// Returns the number of input bytes consumed.
pub(crate) fn decode_row(input: &[u8], out: &mut [u32]) -> FormatResult<usize> {
    out.fill(0);
    let width = out.len();
    let mut pos = 0;
    let short = || FormatError::Malformed("LogLuv row ends early".into());

    for shift in [24u32, 16, 8, 0] {
        let mut i = 0;
        while i < width {
            let code = *input.get(pos).ok_or_else(short)?;
            pos += 1;
            if code >= 128 {
                let count = code as usize - 126;
                let value = *input.get(pos).ok_or_else(short)? as u32;
                pos += 1;
                let end = (i + count).min(width);
                for px in &mut out[i..end] {
                    *px |= value << shift;
                }
                i = end;
            } else {
                let count = code as usize;
                let bytes = input.get(pos..pos + count).ok_or_else(short)?;
                pos += count;
                let end = (i + count).min(width);
                for (px, &b) in out[i..end].iter_mut().zip(bytes) {
                    *px |= (b as u32) << shift;
                }
                i = end;
            }
        }
    }
    Ok(pos)
}

/// Run-length encodes one row of packed pixels, appending to `out`.
pub(crate) fn encode_row(pixels: &[u32], out: &mut Vec<u8>) {
    let mut plane = Vec::with_capacity(pixels.len());
    for shift in [24u32, 16, 8, 0] {
        plane.clear();
        plane.extend(pixels.iter().map(|&p| (p >> shift) as u8));
        encode_plane(&plane, out);
    }
}

fn run_length(bytes: &[u8], start: usize) -> usize {
    let b = bytes[start];
    bytes[start..]
        .iter()
        .take(MAX_RUN)
        .take_while(|&&x| x == b)
        .count()
}

fn encode_plane(bytes: &[u8], out: &mut Vec<u8>) {
    let n = bytes.len();
    let mut i = 0;
    while i < n {
        // next run long enough to pay for itself
        let mut beg = i;
        let mut run = 0;
        while beg < n {
            run = run_length(bytes, beg);
            if run >= MIN_RUN {
                break;
            }
            beg += run;
        }

        // a short run filling the whole gap is still cheaper as a run
        let gap = beg - i;
        if gap > 1 && gap < MIN_RUN && bytes[i..beg].iter().all(|&b| b == bytes[i]) {
            out.push((126 + gap) as u8);
            out.push(bytes[i]);
            i = beg;
        }

        while i < beg {
            let len = (beg - i).min(MAX_LITERAL);
            out.push(len as u8);
            out.extend_from_slice(&bytes[i..i + len]);
            i += len;
        }

        if beg < n && run >= MIN_RUN {
            out.push((126 + run) as u8);
            out.push(bytes[beg]);
            i = beg + run;
        }
    }
}

/// Unpacks a raw SGILOG24 code (three big-endian bytes).
pub(crate) fn read_luv24(bytes: &[u8]) -> u32 {
    (bytes[0] as u32) << 16 | (bytes[1] as u32) << 8 | bytes[2] as u32
}
