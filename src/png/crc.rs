//! A Cyclic redundancy check (CRC) is an error-detecting code. Blocks of data entering these
//! systems get a short check value attached, based on the remainder of a polynomial division of
//! their contents.
//!
//! On the PNG's case, the CRC used is CRC-32, whose polynomial is:
//!
//! x^32 + x^26 + x^23 + x^22 + x^16 + x^12 + x^11 + x^10 + x^8 + x^7 + x^5 + x^4 + x^2 + x + 1
//!
//! Thus the coefficients are (1 - 32, ignoring 32): 1110 1101 1011 1000 1000 0110 0100 0000
//! which is exactly EDB88320 in hex.
//!
//! A practical algorithm for the CRC-32 variant is the table method, which memoizes (one entry
//! per possible byte value, 256 total) a calculation that would otherwise have to be repeated bit
//! by bit for every byte of the message.
//!
//! Source (modified): https://en.wikipedia.org/wiki/Cyclic_redundancy_check
//!
//! Translated from the C code available here:
//! http://libpng.org/pub/png/spec/1.2/PNG-CRCAppendix.html

const CRC_MASK: u32 = 0xEDB88320;
const CRC_TABLE_SZ: usize = u8::MAX as usize + 1;

#[derive(Debug, Clone)]
pub struct Crc([u32; CRC_TABLE_SZ]);

impl Crc {
    pub fn new() -> Self {
        let mut table = [0; CRC_TABLE_SZ];

        for (i, table_byte) in table.iter_mut().enumerate() {
            let mut byte = i as u32;
            for _ in 0..8 {
                if (byte & 1) == 1 {
                    byte = CRC_MASK ^ (byte >> 1);
                } else {
                    byte >>= 1;
                }
            }

            *table_byte = byte;
        }

        Crc(table)
    }

    /// Returns the CRC-32 of `buffer` (for a chunk, this is `type` followed by `data`).
    pub fn calculate(&self, buffer: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFF_u32;

        for byte in buffer {
            let index = crc as u8 ^ byte;
            crc = (crc >> 8) ^ self.0[index as usize];
        }

        // Invert the bits (1's complement)
        crc ^ 0xFFFF_FFFF_u32
    }
}

impl Default for Crc {
    fn default() -> Self {
        Self::new()
    }
}
