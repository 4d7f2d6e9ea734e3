//! huffpack-core: Huffman codec and multi-file archive container engine.
//!
//! This library compresses one or more named byte buffers with a Huffman
//! prefix code and packages them into a single self-describing archive that
//! can later be split back into byte-identical originals.
//!
//! # Architecture
//!
//! The pipeline is built from small modules with clear boundaries:
//! - `freq`: symbol frequency analysis
//! - `tree`: deterministic Huffman tree construction and its wire encoding
//! - `codes`: symbol -> bitstring code table derivation
//! - `bitio`: MSB-first bit reading/writing with padding accounting
//! - `pack`: packing codes into a padded payload and unpacking via tree walk
//! - `assemble`: multi-file concatenation and boundary bookkeeping
//! - `archive`: the length-prefixed container format
//!
//! Compression flows freq -> tree -> codes -> pack, wrapped by archive;
//! decompression reverses it: archive -> pack (tree walk) -> assemble.
//!
//! # Design Principles
//!
//! - **No panics**: every failure is a structured [`Error`]
//! - **Deterministic**: equal inputs always produce byte-identical archives
//! - **Self-contained**: each archive carries everything decoding needs;
//!   no state is shared between invocations
//! - **In-memory**: the whole input is one buffer; chunked or streaming
//!   processing is out of scope
//!
//! The core does no file I/O. Obtaining input bytes and persisting outputs
//! belong to the collaborator layer (the `huffpack` CLI crate).

pub mod archive;
pub mod assemble;
pub mod bitio;
pub mod codes;
pub mod error;
pub mod freq;
pub mod pack;
pub mod tree;

pub use archive::Archive;
pub use assemble::FileBoundary;
pub use error::{Error, Result};

use codes::CodeTable;
use freq::FrequencyTable;

/// Compress named inputs into archive bytes.
///
/// Inputs are concatenated in order; boundaries record where each member
/// lives so [`decompress`] can split them back out under their original
/// identifiers. Identifiers must be unique.
///
/// # Errors
/// - `Error::EmptyInput` if `inputs` is empty or every buffer is empty
/// - `Error::InvalidFormat` if two inputs share an identifier
pub fn compress(inputs: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let (payload, boundaries) = assemble::combine(inputs)?;

    let freqs = FrequencyTable::from_bytes(&payload)?;
    let root = tree::build(&freqs)?;
    let table = CodeTable::from_tree(&root)?;
    let packed = pack::pack(&payload, &table)?;

    let archive = Archive {
        tree: root,
        boundaries,
        payload: packed,
    };
    archive.serialize()
}

/// Decompress archive bytes back into `(identifier, bytes)` members,
/// in their original order.
///
/// Validation happens before any member is produced: a malformed or
/// truncated archive yields an error and no partial output.
///
/// # Errors
/// - `Error::InvalidFormat` / `Error::IncompleteData` for a bad container
/// - `Error::CorruptStream` if the payload does not decode against the
///   stored tree or the boundaries do not partition it
pub fn decompress(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let archive = Archive::deserialize(bytes)?;
    let payload = pack::unpack(&archive.payload, &archive.tree)?;
    assemble::split(&payload, &archive.boundaries)
}

/// Size accounting for one compression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStats {
    /// Total bytes across all inputs.
    pub input_bytes: u64,
    /// Bytes of the produced archive (header + payload).
    pub archive_bytes: u64,
}

impl CompressionStats {
    /// Space saved as a percentage of the input; negative when the archive
    /// is larger than the input (small or incompressible data).
    pub fn saved_percent(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.archive_bytes as f64 / self.input_bytes as f64) * 100.0
    }
}
