//! File sinks: binary PPM (`P6`) and plain-text ASCII art.

use crate::error::DecodeError;
use crate::pixmap::{Pixmap, Rgb};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

impl Pixmap {
    /// Writes a binary PPM (`P6`): header `"P6\n<width> <height>\n<maxval>\n"` followed by
    /// `width * height` RGB triples in row-major order. RGBA sources are blended against `bg`
    /// first (§4.7.4). `maxval = 2^bit_depth - 1`; for a 16-bit source this means two
    /// big-endian bytes per channel, matching the real PPM binary format rather than truncating
    /// to 8 bits.
    pub fn to_ppm(&self, path: impl AsRef<Path>, bg: Rgb) -> Result<(), DecodeError> {
        let maxval: u32 = (1u32 << self.bit_depth()) - 1;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "P6\n{} {}\n{}\n", self.width(), self.height(), maxval)?;

        for (_, px) in self.pixels() {
            let rgb = if self.n_channels() >= 4 {
                Pixmap::blend(px.to_rgb(), bg, px.a)
            } else {
                px.to_rgb()
            };

            if self.bit_depth() <= 8 {
                writer.write_all(&[rgb.r, rgb.g, rgb.b])?;
            } else {
                // Widen each 8-bit-reduced channel back out to the full sample width so the
                // file's declared maxval matches its byte layout.
                let wide = |c: u8| (c as u16) << 8;
                for c in [rgb.r, rgb.g, rgb.b] {
                    writer.write_all(&wide(c).to_be_bytes())?;
                }
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Writes the ASCII-art projection (§4.7.7) to `path`: `height` lines of `width` characters,
    /// each newline-terminated, no trailing blank line.
    pub fn to_ascii(&self, path: impl AsRef<Path>) -> Result<(), DecodeError> {
        let chars = self.to_ascii_chars();
        let width = self.width() as usize;

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        for row in chars.chunks(width) {
            writer.write_all(row)?;
            writer.write_all(b"\n")?;
        }

        writer.flush()?;
        Ok(())
    }
}
