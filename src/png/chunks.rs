//! Each chunk has the following structure:
//!
//! - length of the data section: u32
//! - chunk type code: 4 bytes ASCII (not endian-flipped)
//! - chunk data section
//! - cyclic redundancy check: u32
//!
//! Note that the length and CRC (u32) are stored in Big-Endian.

use crate::error::DecodeError;
use crate::png::byte_reader::ByteReader;
use crate::png::crc::Crc;
use std::io::Read;

/// The ChunkType consists in four bytes whose values are between 65-90 and 97-122 decimal, so
/// uppercase and lowercase ASCII letters. They are treated as integers, not chars.
///
/// - 1st byte: 0: critical, 1: optional (ancillary)
/// - 2nd byte: 0: public special-purpose code, 1: private unregistered code
/// - 3rd byte: 0: using current version of PNG
/// - 4th byte: 0: not safe to copy, 1: safe to copy
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChunkType(pub [u8; 4]);

pub const IHDR: ChunkType = ChunkType(*b"IHDR");
pub const PLTE: ChunkType = ChunkType(*b"PLTE");
pub const IDAT: ChunkType = ChunkType(*b"IDAT");
pub const IEND: ChunkType = ChunkType(*b"IEND");

impl ChunkType {
    pub fn from_slice(data: &[u8]) -> Result<Self, DecodeError> {
        let bytes: [u8; 4] = data
            .try_into()
            .map_err(|_| DecodeError::InvalidArgument("chunk type must be 4 bytes"))?;
        Ok(Self(bytes))
    }

    /// The ASCII code, e.g. `"IDAT"`. Falls back to a lossy rendering for malformed types so
    /// error messages never panic on non-UTF8 bytes.
    pub fn code(&self) -> String {
        std::str::from_utf8(&self.0)
            .map(str::to_owned)
            .unwrap_or_else(|_| format!("{:?}", self.0))
    }

    pub fn is_critical(&self) -> bool {
        self.0[0] & (1 << 5) == 0
    }

    pub fn is_public(&self) -> bool {
        self.0[1] & (1 << 5) == 0
    }

    pub fn is_safe_to_copy(&self) -> bool {
        self.0[3] & (1 << 5) != 0
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code())
    }
}

/// A decoded PNG chunk. `length` mirrors `data.len()`; both are kept (rather than deriving one
/// from the other) because `length` is itself a field read straight off the wire and the
/// invariant `length == data.len()` is exactly what the reader below establishes.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub length: u32,
    pub chunk_type: ChunkType,
    pub data: Vec<u8>,
    pub crc: u32,
}

impl Chunk {
    /// The CRC covers `type` followed by `data`, not `length`.
    pub fn computed_crc(&self, crc: &Crc) -> u32 {
        let mut buf = Vec::with_capacity(4 + self.data.len());
        buf.extend_from_slice(&self.chunk_type.0);
        buf.extend_from_slice(&self.data);
        crc.calculate(&buf)
    }
}

/// Reads one PNG chunk at a time off of an underlying byte stream, following the IHDR/IDAT/IEND
/// framing: `length`, `type`, `data`, `crc`. Does not itself verify CRCs — that is the caller's
/// choice (see `Decoder::strict_crc`).
pub struct ChunkReader<R> {
    reader: ByteReader<R>,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: ByteReader::new(reader),
        }
    }

    /// Reads the next chunk. The returned `bool` is true exactly when the chunk read was `IEND`.
    pub fn read_next(&mut self) -> Result<(Chunk, bool), DecodeError> {
        let length = self.reader.read_u32_be()?;
        let type_bytes = self.reader.read_exact_n(4)?;
        let chunk_type = ChunkType::from_slice(&type_bytes)?;
        let data = if length == 0 {
            Vec::new()
        } else {
            self.reader.read_exact_n(length as usize)?
        };
        let crc = self.reader.read_u32_be()?;

        let terminal = chunk_type == IEND;
        Ok((
            Chunk {
                length,
                chunk_type,
                data,
                crc,
            },
            terminal,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_chunk(chunk_type: ChunkType, data: &[u8]) -> Vec<u8> {
        let crc = Crc::new();
        let mut payload = Vec::new();
        payload.extend_from_slice(&chunk_type.0);
        payload.extend_from_slice(data);
        let checksum = crc.calculate(&payload);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(&checksum.to_be_bytes());
        bytes
    }

    #[test]
    fn reads_length_type_data_crc_in_order() {
        let bytes = encode_chunk(IDAT, &[1, 2, 3, 4]);
        let mut reader = ChunkReader::new(Cursor::new(bytes));
        let (chunk, terminal) = reader.read_next().unwrap();

        assert_eq!(chunk.length, 4);
        assert_eq!(chunk.chunk_type, IDAT);
        assert_eq!(chunk.data, vec![1, 2, 3, 4]);
        assert!(!terminal);
    }

    #[test]
    fn iend_is_reported_terminal() {
        let bytes = encode_chunk(IEND, &[]);
        let mut reader = ChunkReader::new(Cursor::new(bytes));
        let (chunk, terminal) = reader.read_next().unwrap();

        assert_eq!(chunk.chunk_type, IEND);
        assert_eq!(chunk.data.len(), 0);
        assert!(terminal);
    }

    #[test]
    fn short_read_is_an_io_error() {
        let mut reader = ChunkReader::new(Cursor::new(vec![0, 0, 0, 10, b'I', b'D', b'A', b'T']));
        assert!(matches!(reader.read_next(), Err(DecodeError::Io(_))));
    }

    #[test]
    fn crc_covers_type_and_data_not_length() {
        let chunk = Chunk {
            length: 4,
            chunk_type: IDAT,
            data: vec![1, 2, 3, 4],
            crc: 0,
        };
        let crc = Crc::new();
        let bytes = encode_chunk(IDAT, &[1, 2, 3, 4]);
        let stored_crc = u32::from_be_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
        assert_eq!(chunk.computed_crc(&crc), stored_crc);
    }

    #[test]
    fn chunk_type_classification_bits() {
        assert!(IHDR.is_critical());
        assert!(IHDR.is_public());

        let ancillary_private = ChunkType(*b"tEXt");
        assert!(!ancillary_private.is_critical());
    }
}
