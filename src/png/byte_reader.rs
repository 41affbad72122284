//! Thin big-endian primitive reader over anything implementing `std::io::Read`.
//!
//! Every multi-byte PNG primitive except the chunk type code is big-endian; this wrapper keeps
//! that detail in one place instead of scattering `from_be_bytes` calls through the chunk and
//! header parsers.

use crate::error::DecodeError;
use std::io::Read;

pub struct ByteReader<R> {
    inner: R,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads exactly `n` bytes or fails with `DecodeError::Io` on a short read.
    pub fn read_exact_n(&mut self, n: usize) -> Result<Vec<u8>, DecodeError> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u32_be(&mut self) -> Result<u32, DecodeError> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
