//! Error taxonomy for the decode pipeline and the pixmap transforms.
//!
//! Every fallible operation in the crate returns `Result<_, DecodeError>`, so
//! callers deal with one error type across the whole public surface rather
//! than a family of per-module errors.

use thiserror::Error;

/// Everything that can go wrong opening, parsing or transforming a PNG.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("allocation failed ({context})")]
    Alloc { context: &'static str },

    #[error("not a PNG file (bad signature)")]
    NotPng,

    #[error("chunk ordering violation: {0}")]
    ChunkOrdering(String),

    #[error("image truncated before IDAT/IEND was reached")]
    TruncatedImage,

    #[error("invalid IHDR field `{field}`: {value}")]
    InvalidHeader { field: &'static str, value: u32 },

    #[error("unsupported color type: {0}")]
    UnsupportedColorType(u8),

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),

    #[error("compression method byte is not DEFLATE")]
    InvalidCompression,

    #[error("DEFLATE stream error: {0}")]
    InflateError(String),

    #[error("invalid scanline filter type byte: {0}")]
    InvalidFilter(u8),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("operation not implemented: {0}")]
    Unimplemented(&'static str),

    #[error("chunk CRC mismatch for `{chunk_type}`: stored {stored:#010x}, computed {computed:#010x}")]
    ChunkCrcMismatch {
        chunk_type: String,
        stored: u32,
        computed: u32,
    },
}
