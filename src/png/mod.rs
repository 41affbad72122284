//! Drives the pipeline: magic -> IHDR -> ancillary skip -> IDAT collect -> inflate ->
//! reconstruct -> pixmap.
//!
//! The official spec: <http://libpng.org/pub/png/spec/1.2/PNG-Structure.html>

pub mod byte_reader;
pub mod chunks;
pub mod crc;
pub mod filter;
pub mod header;

use crate::error::DecodeError;
use crate::inflate;
use crate::pixmap::Pixmap;
use chunks::{Chunk, ChunkReader, IDAT, IEND, PLTE};
use crc::Crc;
use header::ImageHeader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// A PNG consists of a signature (that every PNG must have) followed by a series of chunks.
pub const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Owns the file-level resources for one decode: the path and the file's size in bytes. The
/// actual byte stream is re-opened and read positionally by `Decoder::parse`, mirroring the
/// spec's 1:1 open/close lifecycle without needing to keep a `File` (and its OS-level handle)
/// alive across the whole call.
pub struct PngHandle {
    path: PathBuf,
    file_len: u64,
}

impl PngHandle {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref().to_path_buf();
        let file_len = std::fs::metadata(&path)?.len();
        log::debug!("opened {:?} ({} bytes)", path, file_len);
        Ok(Self { path, file_len })
    }

    pub fn len(&self) -> u64 {
        self.file_len
    }

    pub fn is_empty(&self) -> bool {
        self.file_len == 0
    }

    /// Releases the handle. A no-op beyond logging: the underlying resources (the path buffer)
    /// are released by `Drop` regardless, but an explicit `close` keeps the open/close pairing
    /// from the spec visible in the API.
    pub fn close(self) -> Result<(), DecodeError> {
        log::debug!("closed {:?}", self.path);
        Ok(())
    }
}

/// Drives a PNG file through the decode pipeline. `strict_crc` defaults to `false` (v1's lenient
/// default, per the spec's open question §7.1); `Decoder::with_strict_crc` opts into verifying
/// every chunk's CRC-32 against `crc::Crc`.
pub struct Decoder {
    strict_crc: bool,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self { strict_crc: false }
    }

    pub fn with_strict_crc() -> Self {
        Self { strict_crc: true }
    }

    pub fn parse(&self, handle: &PngHandle) -> Result<Pixmap, DecodeError> {
        let file = File::open(&handle.path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if magic != SIGNATURE {
            return Err(DecodeError::NotPng);
        }

        let crc_table = Crc::new();
        let mut chunks = ChunkReader::new(reader);

        let (ihdr_chunk, terminal) = chunks.read_next()?;
        if terminal || ihdr_chunk.chunk_type != chunks::IHDR {
            return Err(DecodeError::ChunkOrdering(
                "IHDR must be the first chunk".to_string(),
            ));
        }
        self.verify_crc(&ihdr_chunk, &crc_table)?;
        let header = ImageHeader::parse(&ihdr_chunk.data)?;
        log::info!(
            "IHDR: {}x{}, bit_depth={}, n_channels={}",
            header.width, header.height, header.bit_depth, header.n_channels
        );

        let mut idat = Vec::new();
        let mut seen_idat = false;
        let mut past_idat_run = false;
        let mut saw_iend = false;

        loop {
            let (chunk, terminal) = chunks.read_next()?;
            self.verify_crc(&chunk, &crc_table)?;

            match chunk.chunk_type {
                IDAT => {
                    if past_idat_run {
                        return Err(DecodeError::ChunkOrdering(
                            "IDAT chunks must be consecutive".to_string(),
                        ));
                    }
                    log::trace!("collected IDAT chunk ({} bytes)", chunk.data.len());
                    idat.extend_from_slice(&chunk.data);
                    seen_idat = true;
                }
                PLTE => {
                    // Color type Palette would already have failed at IHDR parse time; a PLTE
                    // chunk alongside Truecolor is a legal (if ignored) suggested palette. It is
                    // still just another non-IDAT chunk for ordering purposes.
                    if seen_idat {
                        past_idat_run = true;
                    }
                    log::trace!("ignoring PLTE chunk");
                }
                other => {
                    if seen_idat {
                        past_idat_run = true;
                    }
                    if other != IEND {
                        log::trace!("skipping ancillary chunk {}", other);
                    }
                }
            }

            if terminal {
                saw_iend = true;
                break;
            }
        }

        if !seen_idat || !saw_iend {
            return Err(DecodeError::TruncatedImage);
        }

        log::debug!("collected {} bytes of compressed IDAT", idat.len());
        let decompressed = inflate::inflate_zlib(&idat)?;
        log::debug!("inflated to {} bytes", decompressed.len());

        let raw = filter::reverse_stream(&decompressed, &header)?;
        log::info!("reconstructed {} pixel bytes", raw.len());

        Ok(Pixmap::from_raw(
            header.width,
            header.height,
            header.n_channels,
            header.bit_depth,
            raw,
        ))
    }

    fn verify_crc(&self, chunk: &Chunk, crc: &Crc) -> Result<(), DecodeError> {
        if !self.strict_crc {
            return Ok(());
        }

        let computed = chunk.computed_crc(crc);
        if computed != chunk.crc {
            return Err(DecodeError::ChunkCrcMismatch {
                chunk_type: chunk.chunk_type.code(),
                stored: chunk.crc,
                computed,
            });
        }
        Ok(())
    }
}

/// `open(path) -> PngHandle`, per the spec's library surface.
pub fn open(path: impl AsRef<Path>) -> Result<PngHandle, DecodeError> {
    PngHandle::open(path)
}

/// `parse(handle) -> Pixmap`, decoding with the lenient (non-strict-CRC) default.
pub fn parse(handle: &PngHandle) -> Result<Pixmap, DecodeError> {
    Decoder::new().parse(handle)
}

/// `close(handle) -> Ok`.
pub fn close(handle: PngHandle) -> Result<(), DecodeError> {
    handle.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::chunks::{IDAT as IDAT_TYPE, IEND as IEND_TYPE, IHDR as IHDR_TYPE};
    use std::io::Write;

    fn write_chunk(out: &mut Vec<u8>, chunk_type: chunks::ChunkType, data: &[u8], crc_table: &Crc) {
        let mut payload = Vec::new();
        payload.extend_from_slice(&chunk_type.0);
        payload.extend_from_slice(data);
        let crc = crc_table.calculate(&payload);

        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&crc.to_be_bytes());
    }

    fn ihdr_payload(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 2, 0, 0, 0]); // 8-bit truecolor, no interlace
        data
    }

    fn write_minimal_png(path: &Path) {
        let crc_table = Crc::new();
        let mut bytes = SIGNATURE.to_vec();
        write_chunk(&mut bytes, IHDR_TYPE, &ihdr_payload(2, 2), &crc_table);

        // Two filter-None scanlines of 6 bytes each, zlib-wrapped.
        let mut raw_stream = Vec::new();
        raw_stream.push(0);
        raw_stream.extend_from_slice(&[0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00]);
        raw_stream.push(0);
        raw_stream.extend_from_slice(&[0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]);
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw_stream, 6);

        write_chunk(&mut bytes, IDAT_TYPE, &compressed, &crc_table);
        write_chunk(&mut bytes, IEND_TYPE, &[], &crc_table);

        let mut file = File::create(path).unwrap();
        file.write_all(&bytes).unwrap();
    }

    #[test]
    fn magic_mismatch_is_rejected() {
        let dir = std::env::temp_dir();
        let path = dir.join("scanline_test_not_a_png.png");
        std::fs::write(&path, [0u8; 8]).unwrap();

        let handle = PngHandle::open(&path).unwrap();
        let result = Decoder::new().parse(&handle);
        assert!(matches!(result, Err(DecodeError::NotPng)));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn minimal_truecolor_decodes_end_to_end() {
        let dir = std::env::temp_dir();
        let path = dir.join("scanline_test_minimal.png");
        write_minimal_png(&path);

        let handle = PngHandle::open(&path).unwrap();
        let pixmap = parse(&handle).unwrap();
        handle.close().unwrap();

        assert_eq!(pixmap.width(), 2);
        assert_eq!(pixmap.height(), 2);
        assert_eq!(
            pixmap.data(),
            &[0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn iend_before_any_idat_is_truncated() {
        let crc_table = Crc::new();
        let mut bytes = SIGNATURE.to_vec();
        write_chunk(&mut bytes, IHDR_TYPE, &ihdr_payload(1, 1), &crc_table);
        write_chunk(&mut bytes, IEND_TYPE, &[], &crc_table);

        let dir = std::env::temp_dir();
        let path = dir.join("scanline_test_no_idat.png");
        std::fs::write(&path, &bytes).unwrap();

        let handle = PngHandle::open(&path).unwrap();
        let result = Decoder::new().parse(&handle);
        assert!(matches!(result, Err(DecodeError::TruncatedImage)));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn non_ihdr_first_chunk_is_ordering_error() {
        let crc_table = Crc::new();
        let mut bytes = SIGNATURE.to_vec();
        write_chunk(&mut bytes, IEND_TYPE, &[], &crc_table);

        let dir = std::env::temp_dir();
        let path = dir.join("scanline_test_bad_order.png");
        std::fs::write(&path, &bytes).unwrap();

        let handle = PngHandle::open(&path).unwrap();
        let result = Decoder::new().parse(&handle);
        assert!(matches!(result, Err(DecodeError::ChunkOrdering(_))));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn split_idat_run_is_an_ordering_error() {
        let crc_table = Crc::new();
        let mut bytes = SIGNATURE.to_vec();
        write_chunk(&mut bytes, IHDR_TYPE, &ihdr_payload(1, 1), &crc_table);
        write_chunk(&mut bytes, IDAT_TYPE, &[0, 0, 0, 1], &crc_table);
        write_chunk(&mut bytes, chunks::ChunkType(*b"tEXt"), b"hi", &crc_table);
        write_chunk(&mut bytes, IDAT_TYPE, &[0, 0, 0, 1], &crc_table);
        write_chunk(&mut bytes, IEND_TYPE, &[], &crc_table);

        let dir = std::env::temp_dir();
        let path = dir.join("scanline_test_split_idat.png");
        std::fs::write(&path, &bytes).unwrap();

        let handle = PngHandle::open(&path).unwrap();
        let result = Decoder::new().parse(&handle);
        assert!(matches!(result, Err(DecodeError::ChunkOrdering(_))));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn plte_splitting_an_idat_run_is_an_ordering_error() {
        // PLTE is not a distinguished state in the ordering machine: it's just another
        // non-IDAT chunk, so it must trip `past_idat_run` exactly like `tEXt` does above.
        let crc_table = Crc::new();
        let mut bytes = SIGNATURE.to_vec();
        write_chunk(&mut bytes, IHDR_TYPE, &ihdr_payload(1, 1), &crc_table);
        write_chunk(&mut bytes, IDAT_TYPE, &[0, 0, 0, 1], &crc_table);
        write_chunk(&mut bytes, chunks::ChunkType(*b"PLTE"), b"\0\0\0", &crc_table);
        write_chunk(&mut bytes, IDAT_TYPE, &[0, 0, 0, 1], &crc_table);
        write_chunk(&mut bytes, IEND_TYPE, &[], &crc_table);

        let dir = std::env::temp_dir();
        let path = dir.join("scanline_test_plte_split_idat.png");
        std::fs::write(&path, &bytes).unwrap();

        let handle = PngHandle::open(&path).unwrap();
        let result = Decoder::new().parse(&handle);
        assert!(matches!(result, Err(DecodeError::ChunkOrdering(_))));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn strict_crc_catches_corrupted_chunk() {
        let crc_table = Crc::new();
        let mut bytes = SIGNATURE.to_vec();
        write_chunk(&mut bytes, IHDR_TYPE, &ihdr_payload(1, 1), &crc_table);
        // Corrupt the CRC of the IHDR chunk we just wrote (last 4 bytes of the chunk record).
        let len = bytes.len();
        bytes[len - 1] ^= 0xFF;
        write_chunk(&mut bytes, IEND_TYPE, &[], &crc_table);

        let dir = std::env::temp_dir();
        let path = dir.join("scanline_test_bad_crc.png");
        std::fs::write(&path, &bytes).unwrap();

        let handle = PngHandle::open(&path).unwrap();
        let result = Decoder::with_strict_crc().parse(&handle);
        assert!(matches!(result, Err(DecodeError::ChunkCrcMismatch { .. })));

        std::fs::remove_file(&path).ok();
    }
}
