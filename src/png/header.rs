//! IHDR parsing and validation.
//!
//! | PNG image type        | Color type | Allowed bit depths | Interpretation                                                |
//! |:-----------------------|:-----------|:--------------------|:---------------------------------------------------------------|
//! | Greyscale              | 0          | 1, 2, 4, 8, 16       | Each pixel is a greyscale sample                                |
//! | Truecolour             | 2          | 8, 16                | Each pixel is an R,G,B triple                                   |
//! | Indexed-colour         | 3          | 1, 2, 4, 8           | Each pixel is a palette index; a PLTE chunk shall appear.       |
//! | Greyscale with alpha   | 4          | 8, 16                | Each pixel is a greyscale sample followed by an alpha sample.   |
//! | Truecolour with alpha  | 6          | 8, 16                | Each pixel is an R,G,B triple followed by an alpha sample.      |
//!
//! Only Truecolour and Truecolour-with-alpha are supported end to end; the rest are deliberate
//! non-goals and surface `DecodeError::UnsupportedColorType`.

use crate::error::DecodeError;

pub const IHDR_PAYLOAD_LEN: usize = 13;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorType {
    Greyscale = 0,
    Truecolor = 2,
    Palette = 3,
    GreyscaleAlpha = 4,
    TruecolorAlpha = 6,
}

impl ColorType {
    fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            0 => Ok(ColorType::Greyscale),
            2 => Ok(ColorType::Truecolor),
            3 => Ok(ColorType::Palette),
            4 => Ok(ColorType::GreyscaleAlpha),
            6 => Ok(ColorType::TruecolorAlpha),
            other => Err(DecodeError::InvalidHeader {
                field: "color_type",
                value: other as u32,
            }),
        }
    }

    fn allowed_bit_depths(self) -> &'static [u8] {
        match self {
            ColorType::Greyscale => &[1, 2, 4, 8, 16],
            ColorType::Truecolor => &[8, 16],
            ColorType::Palette => &[1, 2, 4, 8],
            ColorType::GreyscaleAlpha => &[8, 16],
            ColorType::TruecolorAlpha => &[8, 16],
        }
    }

    pub fn n_channels(self) -> Option<u8> {
        match self {
            ColorType::Greyscale => Some(1),
            ColorType::Truecolor => Some(3),
            ColorType::Palette => None,
            ColorType::GreyscaleAlpha => Some(2),
            ColorType::TruecolorAlpha => Some(4),
        }
    }
}

/// A parsed and validated IHDR payload.
#[derive(Debug, Copy, Clone)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: ColorType,
    pub compression_method: u8,
    pub filter_method: u8,
    pub interlace_method: u8,
    pub n_channels: u8,
}

const MAX_DIMENSION: u32 = (1u32 << 31) - 1;

impl ImageHeader {
    /// Parses and validates the 13-byte IHDR payload. Rejects palette, greyscale and
    /// greyscale-alpha color types, interlacing, and anything other than the DEFLATE
    /// compression/filter method bytes, all per the decoder's supported subset of PNG 1.2.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != IHDR_PAYLOAD_LEN {
            return Err(DecodeError::InvalidHeader {
                field: "length",
                value: data.len() as u32,
            });
        }

        let width = u32::from_be_bytes(data[0..4].try_into().unwrap());
        let height = u32::from_be_bytes(data[4..8].try_into().unwrap());
        let bit_depth = data[8];
        let color_type = ColorType::from_byte(data[9])?;
        let compression_method = data[10];
        let filter_method = data[11];
        let interlace_method = data[12];

        if width == 0 || width > MAX_DIMENSION {
            return Err(DecodeError::InvalidHeader {
                field: "width",
                value: width,
            });
        }
        if height == 0 || height > MAX_DIMENSION {
            return Err(DecodeError::InvalidHeader {
                field: "height",
                value: height,
            });
        }

        if !color_type.allowed_bit_depths().contains(&bit_depth) {
            return Err(DecodeError::InvalidHeader {
                field: "bit_depth",
                value: bit_depth as u32,
            });
        }

        if compression_method != 0 {
            return Err(DecodeError::InvalidHeader {
                field: "compression_method",
                value: compression_method as u32,
            });
        }
        if filter_method != 0 {
            return Err(DecodeError::InvalidHeader {
                field: "filter_method",
                value: filter_method as u32,
            });
        }
        if interlace_method > 1 {
            return Err(DecodeError::InvalidHeader {
                field: "interlace_method",
                value: interlace_method as u32,
            });
        }
        if interlace_method == 1 {
            return Err(DecodeError::UnsupportedFeature("Adam7 interlacing"));
        }

        let n_channels = match color_type.n_channels() {
            Some(n) => n,
            None => {
                return Err(DecodeError::UnsupportedColorType(color_type as u8));
            }
        };
        if matches!(color_type, ColorType::Greyscale | ColorType::GreyscaleAlpha) {
            return Err(DecodeError::UnsupportedColorType(color_type as u8));
        }

        Ok(Self {
            width,
            height,
            bit_depth,
            color_type,
            compression_method,
            filter_method,
            interlace_method,
            n_channels,
        })
    }

    /// `(n_channels * width * bit_depth + 7) / 8`: bytes in one reconstructed scanline,
    /// excluding the leading filter-type byte.
    pub fn scanline_bytes(&self) -> usize {
        let bits = self.n_channels as usize * self.width as usize * self.bit_depth as usize;
        (bits + 7) / 8
    }
}
