//! Pixel-buffer transforms: grayscale, monochrome thresholding, ASCII-art projection, rotation
//! and scaling. All side-effect-free (they return a fresh `Pixmap`) except where noted.

use crate::error::DecodeError;
use crate::pixmap::{Pixmap, Rgba};

/// Ramp used by ASCII projection, darkest to brightest.
pub const ASCII_RAMP: [u8; 10] = [
    b' ', b'.', b':', b'-', b'=', b'+', b'*', b'#', b'%', b'@',
];

fn clamp_idx(idx: i64) -> usize {
    idx.clamp(0, (ASCII_RAMP.len() - 1) as i64) as usize
}

impl Pixmap {
    /// `L = 0.30 R + 0.59 G + 0.11 B`, written into `(0, 0, 0, 255 - L)`: black text against an
    /// alpha channel carrying the luminance. The source may be RGB or RGBA; the result is always
    /// four-channel RGBA, 8-bit.
    pub fn to_grayscale(&self) -> Pixmap {
        let mut data = Vec::with_capacity(self.width() as usize * self.height() as usize * 4);

        for (_, px) in self.pixels() {
            let luma =
                0.30 * px.r as f64 + 0.59 * px.g as f64 + 0.11 * px.b as f64;
            let luma = luma.round().clamp(0.0, 255.0) as u8;
            data.extend_from_slice(&[0, 0, 0, 255u8.saturating_sub(luma)]);
        }

        Pixmap::from_raw(self.width(), self.height(), 4, 8, data)
    }

    fn perceptual_luma01(&self, px: Rgba) -> f64 {
        if self.n_channels() >= 4 {
            px.a as f64 / 255.0 + 0.193
        } else {
            0.2126 * (px.r as f64 / 255.0)
                + 0.7152 * (px.g as f64 / 255.0)
                + 0.0722 * (px.b as f64 / 255.0)
        }
    }

    /// Replaces each pixel with pure black or pure white according to `luma_threshold` (in
    /// `[0, 1]`), using the same perceptual luma rule as ASCII projection. Always returns RGBA.
    pub fn to_monochrome(&self, luma_threshold: f64) -> Result<Pixmap, DecodeError> {
        if !(0.0..=1.0).contains(&luma_threshold) {
            return Err(DecodeError::InvalidArgument(
                "luma_threshold must be within [0, 1]",
            ));
        }

        let mut data = Vec::with_capacity(self.width() as usize * self.height() as usize * 4);
        for (_, px) in self.pixels() {
            let luma = self.perceptual_luma01(px);
            if luma < luma_threshold {
                data.extend_from_slice(&[0, 0, 0, 255]);
            } else {
                data.extend_from_slice(&[255, 255, 255, 255]);
            }
        }

        Ok(Pixmap::from_raw(self.width(), self.height(), 4, 8, data))
    }

    /// One ASCII ramp character per pixel. 3-channel sources use the Rec. 709 luma coefficients;
    /// 4-channel sources treat alpha as an already-computed inverse luminance (the output of
    /// `to_grayscale`) and invert the ramp index accordingly.
    pub fn to_ascii_chars(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.width() as usize * self.height() as usize);

        for (_, px) in self.pixels() {
            let idx = if self.n_channels() >= 4 {
                let luma = px.a as f64 / 255.0 + 0.193;
                let ramp_idx = (luma * 10.0).round() as i64 - 1;
                clamp_idx(10 - ramp_idx)
            } else {
                let luma = 0.2126 * (px.r as f64 / 255.0)
                    + 0.7152 * (px.g as f64 / 255.0)
                    + 0.0722 * (px.b as f64 / 255.0);
                clamp_idx((luma * 10.0).round() as i64 - 1)
            };
            data.push(ASCII_RAMP[idx]);
        }

        data
    }

    /// `(r, c) -> (c, height - 1 - r)`: a fresh pixmap with width and height swapped.
    pub fn rotate_cw(&self) -> Pixmap {
        let (w, h) = (self.width(), self.height());
        let pixel_size = self.pixel_size();
        let mut data = vec![0u8; self.data().len()];

        for row in 0..h {
            for col in 0..w {
                let dst_row = col;
                let dst_col = h - 1 - row;
                let src = self.pixel_bytes(row, col);
                let dst_start = (dst_row as usize * h as usize + dst_col as usize) * pixel_size;
                data[dst_start..dst_start + pixel_size].copy_from_slice(src);
            }
        }

        Pixmap::from_raw(h, w, self.n_channels(), self.bit_depth(), data)
    }

    /// `(r, c) -> (width - 1 - c, r)`.
    pub fn rotate_ccw(&self) -> Pixmap {
        let (w, h) = (self.width(), self.height());
        let pixel_size = self.pixel_size();
        let mut data = vec![0u8; self.data().len()];

        for row in 0..h {
            for col in 0..w {
                let dst_row = w - 1 - col;
                let dst_col = row;
                let src = self.pixel_bytes(row, col);
                let dst_start = (dst_row as usize * h as usize + dst_col as usize) * pixel_size;
                data[dst_start..dst_start + pixel_size].copy_from_slice(src);
            }
        }

        Pixmap::from_raw(h, w, self.n_channels(), self.bit_depth(), data)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScaleMethod {
    Nearest,
    Bilinear,
    Bicubic,
}

impl Pixmap {
    /// Scales to `(new_width, new_height)`. Always promotes to RGBA, 8-bit, since nearest
    /// sampling goes through `sample_norm` which already promotes every pixel that way. Width
    /// and height are resampled independently from evenly spaced normalized positions; only
    /// `ScaleMethod::Nearest` is implemented, matching the spec's v1 scope.
    pub fn scale(
        &self,
        new_width: u32,
        new_height: u32,
        method: ScaleMethod,
    ) -> Result<Pixmap, DecodeError> {
        if new_width == 0 || new_height == 0 {
            return Err(DecodeError::InvalidArgument(
                "scale target dimensions must be non-zero",
            ));
        }
        if method != ScaleMethod::Nearest {
            return Err(DecodeError::Unimplemented(
                "bilinear/bicubic scaling is not implemented in v1",
            ));
        }

        let mut data = Vec::with_capacity(new_width as usize * new_height as usize * 4);

        for row in 0..new_height {
            let y = if new_height > 1 {
                row as f64 / (new_height - 1) as f64
            } else {
                0.0
            };
            for col in 0..new_width {
                let x = if new_width > 1 {
                    col as f64 / (new_width - 1) as f64
                } else {
                    0.0
                };
                let px = self.sample_norm(x, y);
                data.extend_from_slice(&[px.r, px.g, px.b, px.a]);
            }
        }

        Ok(Pixmap::from_raw(new_width, new_height, 4, 8, data))
    }
}
