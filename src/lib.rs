//! A PNG decoder and pixmap processing kernel.
//!
//! `png::open` + `png::parse` take a file on disk through chunk framing, DEFLATE decompression
//! and scanline-filter reversal to produce a [`Pixmap`], which [`pixmap::transform`] and
//! [`pixmap::io`] then sample, composite, rotate, scale and write back out as PPM or ASCII art.

pub mod error;
pub mod inflate;
pub mod pixmap;
pub mod png;

pub use error::DecodeError;
pub use pixmap::transform::ScaleMethod;
pub use pixmap::{Pixmap, Rgb, Rgba};
pub use png::{close, open, parse, Decoder, PngHandle};
