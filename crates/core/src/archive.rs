//! Archive container serialization and parsing.
//!
//! An archive packages one compressed payload with everything needed to
//! reverse the compression: the Huffman tree, the file boundary list, the
//! padding bit count, and the payload size. It is written whole at compress
//! time, read whole at decompress time, and never mutated in place.
//!
//! # Archive Format
//!
//! All multi-byte integers are big-endian.
//!
//! ```text
//! +---------------------+
//! | header_length (4)   |  u32, bytes of header that follow
//! +---------------------+
//! | header:             |
//! |   tree section      |  versioned preorder encoding (see tree module)
//! |   file_count (4)    |  u32
//! |   per file:         |
//! |     id_len (2)      |  u16
//! |     id (id_len)     |  UTF-8 identifier
//! |     offset (8)      |  u64 within the combined payload
//! |     size (8)        |  u64
//! |   padding (1)       |  u8, 0..=7
//! |   payload_size (8)  |  u64
//! +---------------------+
//! | payload             |  packed code bits (payload_size bytes)
//! +---------------------+
//! ```
//!
//! # Failure Modes
//!
//! - `IncompleteData`: the length prefix, header region, or payload region
//!   is shorter than declared
//! - `InvalidFormat`: the header region parses inconsistently (bad tree
//!   section, non-UTF-8 identifier, padding out of range, fields running
//!   past the declared header, or trailing bytes inside it)

use crate::assemble::FileBoundary;
use crate::error::{Error, Result};
use crate::pack::PackedPayload;
use crate::tree::TreeNode;

/// Width of the header length prefix.
const LENGTH_FIELD_SIZE: usize = 4;

/// Smallest possible per-file record (empty identifier).
const MIN_BOUNDARY_RECORD: usize = 2 + 8 + 8;

/// A fully parsed archive: the only durable artifact of compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Huffman tree the payload was encoded with.
    pub tree: TreeNode,
    /// Ordered member boundaries within the decoded payload.
    pub boundaries: Vec<FileBoundary>,
    /// Packed payload bits plus tail padding.
    pub payload: PackedPayload,
}

impl Archive {
    /// Serialize into the wire format above.
    ///
    /// # Errors
    /// `Error::InvalidFormat` if the tree is malformed or an identifier
    /// exceeds the u16 length field.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut header = self.tree.encode()?;

        header.extend_from_slice(&(self.boundaries.len() as u32).to_be_bytes());
        for boundary in &self.boundaries {
            let id = boundary.id.as_bytes();
            if id.len() > u16::MAX as usize {
                return Err(Error::invalid_format(format!(
                    "identifier of {} bytes exceeds the 2-byte length field",
                    id.len()
                )));
            }
            header.extend_from_slice(&(id.len() as u16).to_be_bytes());
            header.extend_from_slice(id);
            header.extend_from_slice(&boundary.offset.to_be_bytes());
            header.extend_from_slice(&boundary.size.to_be_bytes());
        }

        header.push(self.payload.padding);
        header.extend_from_slice(&(self.payload.bytes.len() as u64).to_be_bytes());

        let mut out =
            Vec::with_capacity(LENGTH_FIELD_SIZE + header.len() + self.payload.bytes.len());
        out.extend_from_slice(&(header.len() as u32).to_be_bytes());
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.payload.bytes);
        Ok(out)
    }

    /// Parse an archive from `bytes`.
    ///
    /// Reads the length field, exactly that many header bytes, then exactly
    /// `payload_size` payload bytes. Bytes past the payload are ignored.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LENGTH_FIELD_SIZE {
            return Err(Error::IncompleteData {
                section: "header length field",
                declared: LENGTH_FIELD_SIZE,
                available: bytes.len(),
            });
        }

        let header_len =
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let header_end = LENGTH_FIELD_SIZE + header_len;
        if bytes.len() < header_end {
            return Err(Error::IncompleteData {
                section: "header",
                declared: header_len,
                available: bytes.len() - LENGTH_FIELD_SIZE,
            });
        }

        let header = &bytes[LENGTH_FIELD_SIZE..header_end];
        let mut reader = HeaderReader::new(header);

        let tree = reader.read_tree()?;
        let file_count = reader.read_u32()? as usize;

        // A nonsensical count cannot fit in the remaining header
        if file_count.saturating_mul(MIN_BOUNDARY_RECORD) > reader.remaining() {
            return Err(Error::invalid_format(format!(
                "file count {file_count} cannot fit in a {header_len}-byte header"
            )));
        }

        let mut boundaries = Vec::with_capacity(file_count);
        for _ in 0..file_count {
            let id_len = reader.read_u16()? as usize;
            let id = String::from_utf8(reader.take(id_len)?.to_vec())
                .map_err(|_| Error::invalid_format("identifier is not valid UTF-8"))?;
            let offset = reader.read_u64()?;
            let size = reader.read_u64()?;
            boundaries.push(FileBoundary { id, offset, size });
        }

        let padding = reader.read_u8()?;
        if padding > 7 {
            return Err(Error::invalid_format(format!(
                "padding {padding} out of range 0..=7"
            )));
        }

        let payload_size = reader.read_u64()? as usize;
        if !reader.is_empty() {
            return Err(Error::invalid_format(format!(
                "{} trailing bytes inside the declared header",
                reader.remaining()
            )));
        }

        let available = bytes.len() - header_end;
        if payload_size > available {
            return Err(Error::IncompleteData {
                section: "payload",
                declared: payload_size,
                available,
            });
        }

        let payload = PackedPayload {
            bytes: bytes[header_end..header_end + payload_size].to_vec(),
            padding,
        };

        Ok(Self {
            tree,
            boundaries,
            payload,
        })
    }
}

/// Sequential reader over the declared header region.
///
/// Any read past the region means the header does not parse, which is an
/// `InvalidFormat` (the region itself was present in full).
struct HeaderReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> HeaderReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::invalid_format(format!(
                "header field of {n} bytes runs past the declared header"
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn read_tree(&mut self) -> Result<TreeNode> {
        let (tree, consumed) = TreeNode::decode(&self.buf[self.pos..])?;
        self.pos += consumed;
        Ok(tree)
    }
}
