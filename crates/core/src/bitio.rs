//! MSB-first bit ordering helpers.
//!
//! The symmetric channel works on individual bits. Both directions use the
//! same convention: bit 7 of byte 0 comes first, bit 0 of the last byte comes
//! last. `from_bits(&to_bits(x)) == x` for every byte slice.
//!
//! # Example
//! ```
//! use arq_sim_core::bitio::{from_bits, to_bits};
//!
//! let bits = to_bits(&[0b1011_0010]);
//! assert_eq!(bits, vec![1, 0, 1, 1, 0, 0, 1, 0]);
//! assert_eq!(from_bits(&bits), vec![0b1011_0010]);
//! ```

/// Writes bits MSB-first into a byte buffer.
///
/// # Invariants
/// - `bit_count` is always < 8
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    /// Completed bytes
    bytes: Vec<u8>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one bit. Any non-zero value counts as 1.
    pub fn write_bit(&mut self, bit: u8) {
        if bit != 0 {
            self.bit_buffer |= 0x80 >> self.bit_count;
        }
        self.bit_count += 1;

        if self.bit_count == 8 {
            self.bytes.push(self.bit_buffer);
            self.bit_buffer = 0;
            self.bit_count = 0;
        }
    }

    /// Finish writing and return the output bytes.
    ///
    /// A trailing partial byte is padded with zeros.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.bytes.push(self.bit_buffer);
        }
        self.bytes
    }

    /// Total number of bits written (including partial byte).
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + usize::from(self.bit_count)
    }
}

/// Reads bits MSB-first from a byte buffer.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Current bit position (0 = MSB of first byte)
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
        }
    }

    /// Read a single bit, or `None` at the end of the buffer.
    pub fn read_bit(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.bit_position / 8)?;
        let shift = 7 - (self.bit_position % 8);
        self.bit_position += 1;
        Some((byte >> shift) & 1)
    }

    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.bit_position
    }
}

impl Iterator for BitReader<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.read_bit()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bits_remaining();
        (remaining, Some(remaining))
    }
}

/// Split bytes into a sequence of 0/1 values, MSB first.
pub fn to_bits(bytes: &[u8]) -> Vec<u8> {
    BitReader::new(bytes).collect()
}

/// Join a sequence of 0/1 values back into bytes, MSB first.
///
/// A bit count that isn't a multiple of 8 is zero-padded at the end.
pub fn from_bits(bits: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    for &bit in bits {
        writer.write_bit(bit);
    }
    writer.finish()
}
