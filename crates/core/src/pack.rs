//! Bit packing and unpacking of code streams.
//!
//! `pack` concatenates each input byte's code, MSB-first, and zero-pads the
//! result to a byte boundary. `unpack` reverses it by walking the stored
//! tree bit by bit.
//!
//! # Padding
//!
//! `padding` counts the zero bits appended at the tail, always in `0..=7`.
//! Zero means the code stream was already byte-aligned and unpacking must
//! strip nothing; it is never represented as 8.

use crate::bitio::{BitReader, BitWriter};
use crate::codes::CodeTable;
use crate::error::{Error, Result};
use crate::tree::TreeNode;

/// A packed code stream plus its tail-padding bit count.
///
/// # Invariants
/// - `padding` is in `0..=7`
/// - `8 * bytes.len() - padding as usize` equals the summed code lengths
///   of the packed input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPayload {
    /// Packed code bits, zero-padded to a byte boundary.
    pub bytes: Vec<u8>,
    /// Zero bits appended to reach the boundary (0..=7).
    pub padding: u8,
}

impl PackedPayload {
    /// Number of meaningful bits (excluding padding).
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 - self.padding as usize
    }
}

/// Encode `data` into a packed code stream using `table`.
///
/// Codes are appended in input order; the tail is zero-padded to a byte
/// boundary and the pad width recorded.
///
/// # Errors
/// - `Error::EmptyInput` if `data` is empty
/// - `Error::CorruptStream` if a byte of `data` has no code in `table`
///   (the table was derived from different data)
pub fn pack(data: &[u8], table: &CodeTable) -> Result<PackedPayload> {
    if data.is_empty() {
        return Err(Error::EmptyInput {
            reason: "no bytes to pack",
        });
    }

    let mut writer = BitWriter::new();
    for &byte in data {
        let code = table.code(byte).ok_or_else(|| {
            Error::corrupt_stream(format!("symbol {byte:#04x} has no code in the supplied table"))
        })?;
        for bit in code.bits() {
            writer.push_bit(bit);
        }
    }

    let (bytes, padding) = writer.finish();
    Ok(PackedPayload { bytes, padding })
}

/// Decode a packed code stream against the tree that produced it.
///
/// Bits are consumed MSB-first with the trailing `padding` bits excluded.
/// The walk starts at the root, descends left on `0` and right on `1`, and
/// on reaching a leaf emits its symbol and resets to the root before the
/// next bit. For the degenerate single-symbol tree every `0` bit emits one
/// symbol.
///
/// # Errors
/// `Error::CorruptStream` if:
/// - `padding` is out of range for the payload
/// - the bit sequence ends mid-code (walk not at the root when bits run out)
/// - a `1` bit is consumed at a node lacking a right child
/// - the supplied tree is a bare leaf (cannot drive a walk)
pub fn unpack(payload: &PackedPayload, root: &TreeNode) -> Result<Vec<u8>> {
    if payload.padding > 7 {
        return Err(Error::corrupt_stream(format!(
            "padding {} out of range 0..=7",
            payload.padding
        )));
    }
    if payload.padding as usize > payload.bytes.len() * 8 {
        return Err(Error::corrupt_stream(
            "padding exceeds the payload bit length",
        ));
    }
    if root.is_leaf() {
        return Err(Error::corrupt_stream("decoding tree root is a bare leaf"));
    }

    let mut reader = BitReader::with_limit(&payload.bytes, payload.bit_len());
    let mut output = Vec::new();
    let mut node = root;

    while let Some(bit) = reader.read_bit() {
        node = match node {
            TreeNode::Internal { left, right } => {
                if bit {
                    right.as_deref().ok_or_else(|| {
                        Error::corrupt_stream(format!(
                            "bit 1 at a node with no right child (bit position {})",
                            reader.position() - 1
                        ))
                    })?
                } else {
                    left
                }
            }
            // Unreachable: the walk resets to the (non-leaf) root after
            // every emission.
            TreeNode::Leaf(_) => {
                return Err(Error::corrupt_stream("walk restarted at a leaf"));
            }
        };

        if let TreeNode::Leaf(symbol) = node {
            output.push(*symbol);
            node = root;
        }
    }

    if !std::ptr::eq(node, root) {
        return Err(Error::corrupt_stream("bit sequence ends mid-code"));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freq::FrequencyTable;
    use crate::tree;

    fn codec_for(data: &[u8]) -> (TreeNode, CodeTable) {
        let freqs = FrequencyTable::from_bytes(data).unwrap();
        let root = tree::build(&freqs).unwrap();
        let table = CodeTable::from_tree(&root).unwrap();
        (root, table)
    }

    #[test]
    fn test_pack_aaab() {
        // b->0, a->1: bits 1110, padded to 11100000
        let (_, table) = codec_for(b"aaab");
        let packed = pack(b"aaab", &table).unwrap();

        assert_eq!(packed.bytes, vec![0xE0]);
        assert_eq!(packed.padding, 4);
        assert_eq!(packed.bit_len(), 4);
    }

    #[test]
    fn test_pack_single_symbol() {
        // z->0: bits 0000, padded to 00000000
        let (_, table) = codec_for(b"zzzz");
        let packed = pack(b"zzzz", &table).unwrap();

        assert_eq!(packed.bytes, vec![0x00]);
        assert_eq!(packed.padding, 4);
    }

    #[test]
    fn test_byte_aligned_input_has_zero_padding() {
        // Eight 1-bit codes fill the byte exactly
        let (_, table) = codec_for(b"aaabaaab");
        let packed = pack(b"aaabaaab", &table).unwrap();

        assert_eq!(packed.bytes, vec![0b1110_1110]);
        assert_eq!(packed.padding, 0);
    }

    #[test]
    fn test_round_trip() {
        let data = b"compression round trip with mixed symbol frequencies!";
        let (root, table) = codec_for(data);

        let packed = pack(data, &table).unwrap();
        let unpacked = unpack(&packed, &root).unwrap();

        assert_eq!(unpacked, data);
    }

    #[test]
    fn test_round_trip_single_symbol() {
        let (root, table) = codec_for(b"zzzz");
        let packed = pack(b"zzzz", &table).unwrap();
        assert_eq!(unpack(&packed, &root).unwrap(), b"zzzz");
    }

    #[test]
    fn test_zero_padding_strips_nothing() {
        let data = b"aaabaaab";
        let (root, table) = codec_for(data);
        let packed = pack(data, &table).unwrap();

        assert_eq!(packed.padding, 0);
        assert_eq!(unpack(&packed, &root).unwrap(), data);
    }

    #[test]
    fn test_empty_input_rejected() {
        let (_, table) = codec_for(b"ab");
        let result = pack(b"", &table);
        assert!(matches!(result, Err(Error::EmptyInput { .. })));
    }

    #[test]
    fn test_symbol_without_code_rejected() {
        let (_, table) = codec_for(b"ab");
        let result = pack(b"abc", &table);
        assert!(matches!(result, Err(Error::CorruptStream { .. })));
    }

    #[test]
    fn test_mid_code_end_rejected() {
        // Three symbols deep enough that truncation lands mid-code
        let data = b"aaaaaaabbbc";
        let (root, table) = codec_for(data);
        let packed = pack(data, &table).unwrap();

        // Claim more meaningful bits than the codes fill
        let truncated = PackedPayload {
            bytes: packed.bytes.clone(),
            padding: 0,
        };
        let result = unpack(&truncated, &root);
        assert!(matches!(result, Err(Error::CorruptStream { .. })));
    }

    #[test]
    fn test_one_bit_into_missing_right_child() {
        let (root, _) = codec_for(b"zzzz");
        // Degenerate tree has no right child; a 1 bit cannot decode
        let payload = PackedPayload {
            bytes: vec![0b1000_0000],
            padding: 7,
        };
        let result = unpack(&payload, &root);
        assert!(matches!(result, Err(Error::CorruptStream { .. })));
    }

    #[test]
    fn test_out_of_range_padding_rejected() {
        let (root, _) = codec_for(b"ab");
        let payload = PackedPayload {
            bytes: vec![0xFF],
            padding: 8,
        };
        let result = unpack(&payload, &root);
        assert!(matches!(result, Err(Error::CorruptStream { .. })));
    }

    #[test]
    fn test_bare_leaf_tree_rejected() {
        let payload = PackedPayload {
            bytes: vec![0x00],
            padding: 0,
        };
        let result = unpack(&payload, &TreeNode::Leaf(b'x'));
        assert!(matches!(result, Err(Error::CorruptStream { .. })));
    }

    #[test]
    fn test_bit_accounting_invariant() {
        let data = b"invariant: packed bits equal summed code lengths";
        let (_, table) = codec_for(data);
        let packed = pack(data, &table).unwrap();

        let code_bits: usize = data.iter().map(|&b| table.code(b).unwrap().len()).sum();
        assert_eq!(packed.bit_len(), code_bits);
        assert!(packed.padding <= 7);
    }
}
