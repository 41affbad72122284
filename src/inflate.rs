//! Thin wrapper around `miniz_oxide`'s streaming DEFLATE decoder.
//!
//! PNG's IDAT stream is a zlib container (RFC 1950) wrapping raw DEFLATE (RFC 1951), so the
//! decoder is configured for `DataFormat::Zlib`. Input is fed in a loop, draining consumed bytes
//! and growing the output accumulator, until `miniz_oxide` reports `MZStatus::StreamEnd` or an
//! error, the same `InflateState`/`MZFlush`/`MZStatus` streaming loop shape used elsewhere in the
//! retrieval pack for decoding a zlib stream (see DESIGN.md).

use crate::error::DecodeError;
use miniz_oxide::inflate::stream::InflateState;
use miniz_oxide::{DataFormat, MZFlush, MZStatus};

const OUTPUT_CHUNK: usize = 32 * 1024;

/// Inflates a complete zlib-wrapped DEFLATE stream (the concatenation of every IDAT payload) into
/// a single decompressed buffer.
pub fn inflate_zlib(mut input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::TruncatedImage);
    }
    if input[0] & 0x0F != 8 {
        return Err(DecodeError::InvalidCompression);
    }

    let mut state = InflateState::new_boxed(DataFormat::Zlib);
    let mut output = Vec::new();
    let mut scratch = vec![0u8; OUTPUT_CHUNK];

    loop {
        let result = miniz_oxide::inflate::stream::inflate(
            &mut state,
            input,
            &mut scratch,
            MZFlush::None,
        );

        output.extend_from_slice(&scratch[..result.bytes_written]);
        input = &input[result.bytes_consumed..];

        match result.status {
            Ok(MZStatus::Ok) => {
                if result.bytes_consumed == 0 && result.bytes_written == 0 {
                    return Err(DecodeError::InflateError(
                        "inflate made no progress".to_string(),
                    ));
                }
                continue;
            }
            Ok(MZStatus::StreamEnd) => return Ok(output),
            Ok(MZStatus::NeedDict) => {
                return Err(DecodeError::InflateError(
                    "unexpected preset dictionary requirement".to_string(),
                ))
            }
            Err(err) => return Err(DecodeError::InflateError(format!("{:?}", err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_deflate_compression_byte() {
        let err = inflate_zlib(&[0x00, 0x00]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidCompression));
    }

    #[test]
    fn rejects_empty_input() {
        let err = inflate_zlib(&[]).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedImage));
    }

    #[test]
    fn round_trips_a_small_zlib_stream() {
        // zlib-wrapped "hello, png" compressed with miniz_oxide's own encoder, used here only to
        // exercise the streaming loop end to end.
        let original = b"hello, png".repeat(50);
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&original, 6);
        let decompressed = inflate_zlib(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }
}
