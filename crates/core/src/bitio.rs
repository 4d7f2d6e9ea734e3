//! Bit-level I/O for writing and reading Huffman code streams.
//!
//! Both `BitWriter` and `BitReader` operate MSB-first (most significant bit
//! first), which is standard for Huffman encoding.
//!
//! # Padding Rules
//!
//! - `BitWriter::finish` pads the final partial byte with trailing zeros and
//!   reports how many padding bits it added: `(8 - bits % 8) % 8`, so an
//!   already byte-aligned stream reports 0, never 8.
//! - `BitReader` carries an explicit bit limit, so padding bits at the tail
//!   of the buffer can be excluded up front instead of being decoded as data.
//!
//! # Example
//! ```
//! use huffpack_core::bitio::{BitWriter, BitReader};
//!
//! let mut writer = BitWriter::new();
//! writer.push_bit(true);
//! writer.push_bit(false);
//! writer.push_bit(true);
//! let (bytes, padding) = writer.finish();
//! assert_eq!(bytes, vec![0b1010_0000]);
//! assert_eq!(padding, 5);
//!
//! let mut reader = BitReader::with_limit(&bytes, 3);
//! assert_eq!(reader.read_bit(), Some(true));
//! assert_eq!(reader.read_bit(), Some(false));
//! assert_eq!(reader.read_bit(), Some(true));
//! assert_eq!(reader.read_bit(), None);
//! ```

/// Writes bits MSB-first into a byte buffer.
///
/// # Invariants
/// - `bit_buffer` holds up to 7 bits (never a full byte)
/// - `bit_count` is always < 8
#[derive(Debug, Clone)]
pub struct BitWriter {
    /// Completed bytes
    bytes: Vec<u8>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
}

impl BitWriter {
    /// Create a new BitWriter with empty output.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            bit_buffer: 0,
            bit_count: 0,
        }
    }

    /// Append a single bit.
    pub fn push_bit(&mut self, bit: bool) {
        if bit {
            self.bit_buffer |= 1 << (7 - self.bit_count);
        }
        self.bit_count += 1;

        if self.bit_count == 8 {
            self.bytes.push(self.bit_buffer);
            self.bit_buffer = 0;
            self.bit_count = 0;
        }
    }

    /// Append all 8 bits of a byte, MSB-first.
    pub fn push_byte(&mut self, value: u8) {
        for shift in (0..8).rev() {
            self.push_bit((value >> shift) & 1 == 1);
        }
    }

    /// Total number of bits written so far (including the partial byte).
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }

    /// Finish writing and return `(bytes, padding)`.
    ///
    /// The final partial byte, if any, is padded with trailing zero bits.
    /// `padding` is the number of zero bits appended, always in `0..=7`:
    /// a byte-aligned stream reports 0.
    pub fn finish(mut self) -> (Vec<u8>, u8) {
        let padding = if self.bit_count == 0 {
            0
        } else {
            8 - self.bit_count
        };
        if self.bit_count > 0 {
            // bit_buffer's unused low bits are already zero
            self.bytes.push(self.bit_buffer);
        }
        (self.bytes, padding)
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads bits MSB-first from a byte buffer, up to an explicit bit limit.
///
/// # Invariants
/// - `position <= limit <= data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source data
    data: &'a [u8],
    /// Current bit position (0 = MSB of first byte)
    position: usize,
    /// First bit position past the readable region
    limit: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader over every bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            limit: data.len() * 8,
        }
    }

    /// Create a reader over the first `limit_bits` bits of `data`.
    ///
    /// The limit is clamped to the buffer length; a caller that trusts its
    /// limit should validate it against the buffer first.
    pub fn with_limit(data: &'a [u8], limit_bits: usize) -> Self {
        Self {
            data,
            position: 0,
            limit: limit_bits.min(data.len() * 8),
        }
    }

    /// Read the next bit, or `None` if the limit has been reached.
    pub fn read_bit(&mut self) -> Option<bool> {
        if self.position >= self.limit {
            return None;
        }
        let byte = self.data[self.position / 8];
        let bit = (byte >> (7 - self.position % 8)) & 1 == 1;
        self.position += 1;
        Some(bit)
    }

    /// Read the next 8 bits as a byte, or `None` if fewer than 8 remain.
    pub fn read_byte(&mut self) -> Option<u8> {
        if self.bits_remaining() < 8 {
            return None;
        }
        let mut value = 0u8;
        for _ in 0..8 {
            value = (value << 1) | self.read_bit()? as u8;
        }
        Some(value)
    }

    /// Number of readable bits left.
    pub fn bits_remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Current bit position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// True once every readable bit has been consumed.
    pub fn is_empty(&self) -> bool {
        self.position >= self.limit
    }
}
