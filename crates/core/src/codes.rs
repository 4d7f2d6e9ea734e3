//! Code table derivation: symbol -> bitstring, from a Huffman tree.
//!
//! Codes are assigned by a root-to-leaf walk, `0` for the left child and
//! `1` for the right. Prefix-freedom falls out of the tree shape: codes
//! correspond to leaves, so no code can be an ancestor (prefix) of another.
//!
//! The walk is iterative with an explicit stack. Alphabet size bounds the
//! depth to 255, but the implementation does not lean on host call-stack
//! limits.

use crate::error::{Error, Result};
use crate::freq::ALPHABET_SIZE;
use crate::tree::TreeNode;

/// Longest code a 256-symbol alphabet can produce.
pub const MAX_CODE_BITS: usize = 255;

/// One symbol's code: an ordered bit sequence, packed MSB-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    packed: Vec<u8>,
    len: usize,
}

impl Code {
    fn new() -> Self {
        Self {
            packed: Vec::new(),
            len: 0,
        }
    }

    fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.packed.push(0);
        }
        if bit {
            self.packed[self.len / 8] |= 1 << (7 - self.len % 8);
        }
        self.len += 1;
    }

    /// Number of bits in this code. Never zero for a derived table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True only for the transient empty path during derivation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the bits, most significant first.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| (self.packed[i / 8] >> (7 - i % 8)) & 1 == 1)
    }

    /// True if `self` is a proper or improper prefix of `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.len > other.len {
            return false;
        }
        self.bits().zip(other.bits()).all(|(a, b)| a == b)
    }
}

/// Mapping from symbol to code, derived from one tree.
///
/// Derived at encode time and discarded after; decoding walks the tree
/// directly and never needs the table.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: [Option<Code>; 256],
}

impl CodeTable {
    /// Derive the table by an iterative depth-first walk from `root`.
    ///
    /// A leaf reached with an empty accumulated path (a bare-leaf root,
    /// which construction never produces) is assigned the 1-bit code `0`
    /// rather than an empty code.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` if the tree assigns two codes to one
    /// symbol or is deeper than a 256-symbol alphabet admits; both can only
    /// arise from a hand-built or hostile tree.
    pub fn from_tree(root: &TreeNode) -> Result<Self> {
        let mut codes: [Option<Code>; 256] = std::array::from_fn(|_| None);

        let mut stack: Vec<(&TreeNode, Code)> = vec![(root, Code::new())];
        while let Some((node, path)) = stack.pop() {
            match node {
                TreeNode::Leaf(symbol) => {
                    let code = if path.is_empty() {
                        // No symbol may have a zero-length code
                        let mut bit = Code::new();
                        bit.push(false);
                        bit
                    } else {
                        path
                    };
                    let slot = &mut codes[*symbol as usize];
                    if slot.is_some() {
                        return Err(Error::invalid_format(format!(
                            "tree assigns two codes to symbol {symbol:#04x}"
                        )));
                    }
                    *slot = Some(code);
                }
                TreeNode::Internal { left, right } => {
                    if path.len() >= MAX_CODE_BITS {
                        return Err(Error::invalid_format(
                            "code length exceeds the 255-bit alphabet bound",
                        ));
                    }
                    if let Some(right) = right {
                        let mut right_path = path.clone();
                        right_path.push(true);
                        stack.push((right, right_path));
                    }
                    let mut left_path = path;
                    left_path.push(false);
                    stack.push((left, left_path));
                }
            }
        }

        Ok(Self { codes })
    }

    /// Code for one symbol, if the tree contained it.
    pub fn code(&self, symbol: u8) -> Option<&Code> {
        self.codes[symbol as usize].as_ref()
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    /// True if no symbol has a code.
    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(|c| c.is_none())
    }

    /// Iterate over `(symbol, code)` pairs in ascending symbol order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, &Code)> {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|c| (symbol as u8, c)))
    }
}

// Keeps `ALPHABET_SIZE` the single source of truth for the array length.
const _: () = assert!(ALPHABET_SIZE == 256);
