//! Huffman tree construction and its wire encoding.
//!
//! The tree is built bottom-up from a frequency table with a min-priority
//! queue: repeatedly merge the two lowest-weight nodes until one remains.
//! Ties are broken by insertion order (leaves enter in ascending symbol
//! order, merged nodes take the next sequence number), so equal-frequency
//! inputs always produce the same tree shape across runs. That matters
//! because the tree itself is persisted in the archive and drives decoding.
//!
//! # Single-symbol inputs
//!
//! A one-symbol alphabet would naturally produce a bare leaf as root, giving
//! the symbol a zero-length code. Instead the builder emits one internal
//! node with the sole leaf as its left child and no right child, so the
//! symbol still gets the 1-bit code `0`. This degenerate shape is the only
//! place a one-child internal node is legal, and it must round-trip through
//! the wire encoding.
//!
//! # Wire Format
//!
//! The tree is persisted as an explicit, versioned binary encoding, never as
//! a dump of the in-memory graph:
//!
//! ```text
//! +------------------+
//! | version (1 byte) |  currently 1
//! +------------------+
//! | length (2 bytes) |  u16 big-endian, bytes of bitstream that follow
//! +------------------+
//! | bitstream        |  degenerate flag bit, then:
//! |                  |    flag=1: 8 symbol bits (single-symbol tree)
//! |                  |    flag=0: preorder traversal, one tag bit per node
//! |                  |            (1 = leaf, followed by 8 symbol bits;
//! |                  |             0 = internal, followed by left subtree
//! |                  |             then right subtree)
//! +------------------+
//! ```
//!
//! The preorder stream is self-terminating (every internal node has exactly
//! two children), so trailing bits in the last byte are ignored as padding.

use crate::bitio::{BitReader, BitWriter};
use crate::error::{Error, Result};
use crate::freq::{FrequencyTable, ALPHABET_SIZE};
use std::collections::BinaryHeap;

/// Current tree wire-format version.
pub const TREE_FORMAT_VERSION: u8 = 1;

/// Bytes of the tree section preceding the bitstream (version + length).
const TREE_SECTION_PREFIX: usize = 3;

/// A node of the Huffman tree.
///
/// Ownership is exclusive and hierarchical: children are owned boxes,
/// destroyed with their parent, and no node appears twice. `right` is
/// optional only to admit the degenerate single-symbol root; everywhere
/// else an internal node has exactly two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// Terminal node holding one byte symbol.
    Leaf(u8),
    /// Interior node; `right` is `None` only at a degenerate root.
    Internal {
        left: Box<TreeNode>,
        right: Option<Box<TreeNode>>,
    },
}

/// Heap entry carrying the transient construction weight.
///
/// Weight is not part of the node's persisted identity; it exists only
/// while the heap is alive.
struct HeapEntry {
    weight: u64,
    /// Insertion order, the deterministic tie-break.
    seq: u32,
    node: TreeNode,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    /// Reversed comparison so `BinaryHeap` (a max-heap) pops the lowest
    /// `(weight, seq)` first.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (other.weight, other.seq).cmp(&(self.weight, self.seq))
    }
}

impl TreeNode {
    /// True for `Leaf` nodes.
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }

    /// Number of leaves, via an iterative walk.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                TreeNode::Leaf(_) => count += 1,
                TreeNode::Internal { left, right } => {
                    stack.push(left);
                    if let Some(right) = right {
                        stack.push(right);
                    }
                }
            }
        }
        count
    }

    /// Serialize this tree into its wire form (version, length, bitstream).
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` if the tree is malformed: a bare leaf
    /// as root, or a one-child internal node anywhere but a degenerate root.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = BitWriter::new();

        match self {
            TreeNode::Leaf(_) => {
                return Err(Error::invalid_format("tree root cannot be a bare leaf"));
            }
            // Degenerate single-symbol shape
            TreeNode::Internal { left, right: None } => match left.as_ref() {
                TreeNode::Leaf(symbol) => {
                    writer.push_bit(true);
                    writer.push_byte(*symbol);
                }
                TreeNode::Internal { .. } => {
                    return Err(Error::invalid_format(
                        "one-child internal node outside the degenerate root",
                    ));
                }
            },
            TreeNode::Internal { .. } => {
                writer.push_bit(false);

                // Preorder, left before right, with an explicit stack
                let mut stack = vec![self];
                while let Some(node) = stack.pop() {
                    match node {
                        TreeNode::Leaf(symbol) => {
                            writer.push_bit(true);
                            writer.push_byte(*symbol);
                        }
                        TreeNode::Internal { left, right } => {
                            let right = right.as_ref().ok_or_else(|| {
                                Error::invalid_format(
                                    "one-child internal node outside the degenerate root",
                                )
                            })?;
                            writer.push_bit(false);
                            stack.push(right);
                            stack.push(left);
                        }
                    }
                }
            }
        }

        let (bits, _padding) = writer.finish();

        let mut section = Vec::with_capacity(TREE_SECTION_PREFIX + bits.len());
        section.push(TREE_FORMAT_VERSION);
        section.extend_from_slice(&(bits.len() as u16).to_be_bytes());
        section.extend_from_slice(&bits);
        Ok(section)
    }

    /// Parse a tree section from the start of `input`.
    ///
    /// Returns the tree and the number of bytes consumed, so a header parser
    /// can continue past the section.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` for an unknown version, truncated
    /// section, truncated bitstream, over-deep tree, or a bare-leaf root
    /// (a single-symbol tree must use the degenerate flag).
    pub fn decode(input: &[u8]) -> Result<(TreeNode, usize)> {
        if input.len() < TREE_SECTION_PREFIX {
            return Err(Error::invalid_format("tree section truncated"));
        }

        let version = input[0];
        if version != TREE_FORMAT_VERSION {
            return Err(Error::invalid_format(format!(
                "unsupported tree format version {version}"
            )));
        }

        let length = u16::from_be_bytes([input[1], input[2]]) as usize;
        let consumed = TREE_SECTION_PREFIX + length;
        if input.len() < consumed {
            return Err(Error::invalid_format(format!(
                "tree bitstream truncated: declared {length} bytes, {} present",
                input.len() - TREE_SECTION_PREFIX
            )));
        }

        let mut reader = BitReader::new(&input[TREE_SECTION_PREFIX..consumed]);
        let tree = decode_bitstream(&mut reader)?;
        Ok((tree, consumed))
    }
}

/// Decode the tag/symbol bitstream, iteratively with an explicit stack.
fn decode_bitstream(reader: &mut BitReader<'_>) -> Result<TreeNode> {
    let truncated = || Error::invalid_format("tree bitstream ends mid-node");

    let degenerate = reader.read_bit().ok_or_else(truncated)?;
    if degenerate {
        let symbol = reader.read_byte().ok_or_else(truncated)?;
        return Ok(TreeNode::Internal {
            left: Box::new(TreeNode::Leaf(symbol)),
            right: None,
        });
    }

    // Each stack entry is a pending internal node: `None` while its left
    // subtree is being decoded, `Some(left)` while its right subtree is.
    let mut pending: Vec<Option<TreeNode>> = Vec::new();
    let mut leaves = 0usize;

    loop {
        let is_leaf = reader.read_bit().ok_or_else(truncated)?;

        let mut node = if is_leaf {
            leaves += 1;
            if leaves > ALPHABET_SIZE {
                return Err(Error::invalid_format("tree has more than 256 leaves"));
            }
            TreeNode::Leaf(reader.read_byte().ok_or_else(truncated)?)
        } else {
            // Depth over 256 cannot arise from a 256-symbol alphabet
            if pending.len() >= ALPHABET_SIZE {
                return Err(Error::invalid_format("tree deeper than alphabet admits"));
            }
            pending.push(None);
            continue;
        };

        // Attach the completed subtree upward until a node still waits
        // for its right child.
        loop {
            match pending.last() {
                None => {
                    // The root itself completed
                    if node.is_leaf() {
                        return Err(Error::invalid_format(
                            "tree root cannot be a bare leaf; single-symbol trees use the degenerate flag",
                        ));
                    }
                    return Ok(node);
                }
                Some(None) => {
                    if let Some(slot) = pending.last_mut() {
                        *slot = Some(node);
                    }
                    break;
                }
                Some(Some(_)) => {
                    let left = pending.pop().flatten().ok_or_else(|| {
                        Error::invalid_format("tree decoder state corrupted")
                    })?;
                    node = TreeNode::Internal {
                        left: Box::new(left),
                        right: Some(Box::new(node)),
                    };
                }
            }
        }
    }
}

/// Build the Huffman tree for a nonempty frequency table.
///
/// # Algorithm
/// Load every present symbol as a leaf into a min-priority queue keyed on
/// `(frequency, insertion order)`, then repeatedly merge the two lowest
/// entries under a new internal node (lower entry on the left) until one
/// remains. O(k log k) for k distinct symbols.
///
/// # Errors
/// Returns `Error::EmptyInput` if the table has no symbols; this cannot
/// happen for a table built by `FrequencyTable::from_bytes`.
pub fn build(table: &FrequencyTable) -> Result<TreeNode> {
    let mut heap = BinaryHeap::new();
    let mut seq = 0u32;

    for (symbol, weight) in table.symbols() {
        heap.push(HeapEntry {
            weight,
            seq,
            node: TreeNode::Leaf(symbol),
        });
        seq += 1;
    }

    if heap.is_empty() {
        return Err(Error::EmptyInput {
            reason: "frequency table has no symbols",
        });
    }

    // Single-symbol special case: one internal node with a lone left child,
    // so the symbol still receives a 1-bit code.
    if heap.len() == 1 {
        let sole = match heap.pop() {
            Some(entry) => entry.node,
            None => unreachable!("heap length was checked"),
        };
        return Ok(TreeNode::Internal {
            left: Box::new(sole),
            right: None,
        });
    }

    while heap.len() > 1 {
        let (lo, hi) = match (heap.pop(), heap.pop()) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => unreachable!("heap length was checked"),
        };
        heap.push(HeapEntry {
            weight: lo.weight + hi.weight,
            seq,
            node: TreeNode::Internal {
                left: Box::new(lo.node),
                right: Some(Box::new(hi.node)),
            },
        });
        seq += 1;
    }

    match heap.pop() {
        Some(entry) => Ok(entry.node),
        None => unreachable!("merge loop leaves exactly one node"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_for(data: &[u8]) -> TreeNode {
        let table = FrequencyTable::from_bytes(data).unwrap();
        build(&table).unwrap()
    }

    #[test]
    fn test_two_symbol_tree_shape() {
        // a:3, b:1 -> b takes the left (0) branch
        let tree = tree_for(b"aaab");

        match &tree {
            TreeNode::Internal { left, right } => {
                assert_eq!(**left, TreeNode::Leaf(b'b'));
                assert_eq!(*right.as_deref().unwrap(), TreeNode::Leaf(b'a'));
            }
            _ => panic!("expected internal root"),
        }
    }

    #[test]
    fn test_single_symbol_degenerate_shape() {
        let tree = tree_for(b"zzzz");

        match &tree {
            TreeNode::Internal { left, right } => {
                assert_eq!(**left, TreeNode::Leaf(b'z'));
                assert!(right.is_none());
            }
            _ => panic!("expected degenerate internal root"),
        }
    }

    #[test]
    fn test_equal_frequencies_are_deterministic() {
        // Four equal-weight symbols merge in insertion order:
        // (a,b) then (c,d), then the two merges.
        let tree = tree_for(b"dcba");

        let leaf = |s: u8| Box::new(TreeNode::Leaf(s));
        let expected = TreeNode::Internal {
            left: Box::new(TreeNode::Internal {
                left: leaf(b'a'),
                right: Some(leaf(b'b')),
            }),
            right: Some(Box::new(TreeNode::Internal {
                left: leaf(b'c'),
                right: Some(leaf(b'd')),
            })),
        };
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_same_input_same_tree() {
        let a = tree_for(b"mississippi river basin");
        let b = tree_for(b"mississippi river basin");
        assert_eq!(a, b);
    }

    #[test]
    fn test_leaf_count_matches_distinct_symbols() {
        let data = b"abracadabra";
        let table = FrequencyTable::from_bytes(data).unwrap();
        let tree = build(&table).unwrap();
        assert_eq!(tree.leaf_count(), table.distinct());
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let tree = tree_for(b"the rain in spain stays mainly in the plain");

        let encoded = tree.encode().unwrap();
        let (decoded, consumed) = TreeNode::decode(&encoded).unwrap();

        assert_eq!(consumed, encoded.len());
        assert_eq!(decoded, tree);
    }

    #[test]
    fn test_degenerate_round_trip() {
        let tree = tree_for(b"zzzz");

        let encoded = tree.encode().unwrap();
        let (decoded, _) = TreeNode::decode(&encoded).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn test_full_alphabet_round_trip() {
        let data: Vec<u8> = (0..=255).collect();
        let tree = tree_for(&data);

        let encoded = tree.encode().unwrap();
        let (decoded, _) = TreeNode::decode(&encoded).unwrap();
        assert_eq!(decoded, tree);
        assert_eq!(decoded.leaf_count(), 256);
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let mut encoded = tree_for(b"ab").encode().unwrap();
        encoded[0] = 9;

        let result = TreeNode::decode(&encoded);
        assert!(matches!(result, Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_decode_rejects_truncated_bitstream() {
        let encoded = tree_for(b"abcdefgh").encode().unwrap();
        // Keep the declared length but drop bitstream bytes
        let result = TreeNode::decode(&encoded[..encoded.len() - 2]);
        assert!(matches!(result, Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_decode_rejects_bare_leaf_root() {
        // flag=0 then a lone leaf: 0 1 01000001 padded
        let section = [TREE_FORMAT_VERSION, 0, 2, 0b0101_0000, 0b0100_0000];
        let result = TreeNode::decode(&section);
        assert!(matches!(result, Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_encode_rejects_bare_leaf_root() {
        let result = TreeNode::Leaf(b'x').encode();
        assert!(matches!(result, Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_encode_rejects_interior_one_child_node() {
        let tree = TreeNode::Internal {
            left: Box::new(TreeNode::Internal {
                left: Box::new(TreeNode::Leaf(b'a')),
                right: None,
            }),
            right: Some(Box::new(TreeNode::Leaf(b'b'))),
        };
        let result = tree.encode();
        assert!(matches!(result, Err(Error::InvalidFormat { .. })));
    }
}
