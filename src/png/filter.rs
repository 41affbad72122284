//! Per-scanline filtering, and its reversal.
//!
//! PNG filter method 0 (the only one defined as of PNG 1.2) defines five basic filter types,
//! applied over 1-pixel-high scanlines running left to right, top to bottom:
//!
//!   0. None
//!   1. Sub
//!   2. Up
//!   3. Average
//!   4. Paeth
//!
//! Each filtered scanline is prefixed with a single byte identifying which of the five was used.
//! Unsigned arithmetic modulo 256 is used throughout, so every input and output fits in a byte.

use crate::error::DecodeError;
use crate::png::header::ImageHeader;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterType {
    None,
    Sub,
    Up,
    Average,
    Paeth,
}

impl TryFrom<u8> for FilterType {
    type Error = DecodeError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(FilterType::None),
            1 => Ok(FilterType::Sub),
            2 => Ok(FilterType::Up),
            3 => Ok(FilterType::Average),
            4 => Ok(FilterType::Paeth),
            other => Err(DecodeError::InvalidFilter(other)),
        }
    }
}

/// `bpp` (sample stride): the byte distance between two adjacent pixels within a scanline.
/// Rounds up to 1 so a neighbour lookup never divides by zero.
///
/// Examples:
/// - Truecolor, bit depth 16 => stride is 6 (three samples, two bytes per sample).
/// - Truecolor-alpha, bit depth 8 => stride is 4.
pub fn sample_stride(n_channels: u8, bit_depth: u8) -> usize {
    let bits = n_channels as usize * bit_depth as usize;
    std::cmp::max(1, bits / 8)
}

/// The Paeth predictor: picks whichever of the left (`a`), up (`b`) or upper-left (`c`) neighbour
/// is closest to `a + b - c`, breaking ties in favor of `a`, then `b`, then `c`.
fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let (a, b, c) = (a as i32, b as i32, c as i32);
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}

/// Reverses one filtered scanline in place against its already-reconstructed predecessor
/// (all zero for the first row). `filtered` must not include the leading filter-type byte.
pub fn reverse_scanline(filtered: &[u8], prior: &[u8], stride: usize, filter: FilterType) -> Vec<u8> {
    let mut out = vec![0u8; filtered.len()];

    for i in 0..filtered.len() {
        let x = filtered[i];
        let a = if i >= stride { out[i - stride] } else { 0 };
        let b = if i < prior.len() { prior[i] } else { 0 };
        let c = if i >= stride && i - stride < prior.len() {
            prior[i - stride]
        } else {
            0
        };

        out[i] = match filter {
            FilterType::None => x,
            FilterType::Sub => x.wrapping_add(a),
            FilterType::Up => x.wrapping_add(b),
            FilterType::Average => {
                let avg = ((a as u16 + b as u16) / 2) as u8;
                x.wrapping_add(avg)
            }
            FilterType::Paeth => x.wrapping_add(paeth_predictor(a, b, c)),
        };
    }

    out
}

/// The forward counterpart of `reverse_scanline`, used only by tests to establish the
/// round-trip property (the crate is a decoder; it never needs to encode for real).
#[cfg(test)]
fn forward_scanline(raw: &[u8], prior: &[u8], stride: usize, filter: FilterType) -> Vec<u8> {
    let mut out = vec![0u8; raw.len()];

    for i in 0..raw.len() {
        let x = raw[i];
        let a = if i >= stride { raw[i - stride] } else { 0 };
        let b = if i < prior.len() { prior[i] } else { 0 };
        let c = if i >= stride && i - stride < prior.len() {
            prior[i - stride]
        } else {
            0
        };

        out[i] = match filter {
            FilterType::None => x,
            FilterType::Sub => x.wrapping_sub(a),
            FilterType::Up => x.wrapping_sub(b),
            FilterType::Average => {
                let avg = ((a as u16 + b as u16) / 2) as u8;
                x.wrapping_sub(avg)
            }
            FilterType::Paeth => x.wrapping_sub(paeth_predictor(a, b, c)),
        };
    }

    out
}

/// Reconstructs the full raw pixel buffer from a decompressed IDAT stream: `height` records of
/// one filter-type byte followed by `scanline_bytes` of filtered data.
pub fn reverse_stream(decompressed: &[u8], header: &ImageHeader) -> Result<Vec<u8>, DecodeError> {
    let scanline_bytes = header.scanline_bytes();
    let stride = sample_stride(header.n_channels, header.bit_depth);
    let record_len = 1 + scanline_bytes;

    if decompressed.len() < header.height as usize * record_len {
        return Err(DecodeError::TruncatedImage);
    }

    let mut out = Vec::with_capacity(header.height as usize * scanline_bytes);
    let mut prior = vec![0u8; scanline_bytes];

    for row in 0..header.height as usize {
        let record_start = row * record_len;
        let filter = FilterType::try_from(decompressed[record_start])?;
        let filtered = &decompressed[record_start + 1..record_start + record_len];

        let reconstructed = reverse_scanline(filtered, &prior, stride, filter);
        out.extend_from_slice(&reconstructed);
        prior = reconstructed;
    }

    Ok(out)
}
