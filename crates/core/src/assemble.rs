//! Multi-file payload assembly.
//!
//! Compression concatenates every input buffer into one payload and records
//! a boundary per input. Decompression slices the decoded payload back into
//! the original members using those boundaries.
//!
//! Boundaries are an ordered list keyed by a caller-supplied identifier,
//! never a name-keyed map: two inputs sharing a basename from different
//! directories must not silently overwrite each other's record.

use crate::error::{Error, Result};
use std::collections::HashSet;

/// Location of one original file inside the combined payload.
///
/// # Invariants
/// Across an archive's boundary list: offsets are contiguous in input order,
/// non-overlapping, and the sizes sum to the payload length. Identifiers are
/// unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBoundary {
    /// Unique identifier (typically the path the caller supplied).
    pub id: String,
    /// Byte offset of this member within the combined payload.
    pub offset: u64,
    /// Size of this member in bytes.
    pub size: u64,
}

/// Concatenate input buffers in order into one payload, recording a
/// boundary per input.
///
/// Zero-length members are allowed among nonempty ones and round-trip as
/// empty files.
///
/// # Errors
/// - `Error::EmptyInput` if the list is empty or every buffer is empty
/// - `Error::InvalidFormat` if two inputs share an identifier
pub fn combine(inputs: &[(String, Vec<u8>)]) -> Result<(Vec<u8>, Vec<FileBoundary>)> {
    if inputs.is_empty() {
        return Err(Error::EmptyInput {
            reason: "no files to compress",
        });
    }

    let mut seen = HashSet::new();
    for (id, _) in inputs {
        if !seen.insert(id.as_str()) {
            return Err(Error::invalid_format(format!(
                "duplicate input identifier {id:?}"
            )));
        }
    }

    let total: usize = inputs.iter().map(|(_, data)| data.len()).sum();
    if total == 0 {
        return Err(Error::EmptyInput {
            reason: "every input buffer is empty",
        });
    }

    let mut payload = Vec::with_capacity(total);
    let mut boundaries = Vec::with_capacity(inputs.len());

    for (id, data) in inputs {
        boundaries.push(FileBoundary {
            id: id.clone(),
            offset: payload.len() as u64,
            size: data.len() as u64,
        });
        payload.extend_from_slice(data);
    }

    Ok((payload, boundaries))
}

/// Slice the decoded payload back into `(identifier, bytes)` members,
/// in recorded order.
///
/// # Errors
/// `Error::CorruptStream` if the boundaries do not partition the payload
/// exactly: a gap or overlap between records, a member extending past the
/// payload, or leftover bytes after the last member.
pub fn split(payload: &[u8], boundaries: &[FileBoundary]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut members = Vec::with_capacity(boundaries.len());
    let mut cursor = 0u64;

    for boundary in boundaries {
        if boundary.offset != cursor {
            return Err(Error::corrupt_stream(format!(
                "boundary {:?} starts at {} but previous member ends at {}",
                boundary.id, boundary.offset, cursor
            )));
        }

        let end = boundary.offset.checked_add(boundary.size).ok_or_else(|| {
            Error::corrupt_stream(format!("boundary {:?} overflows", boundary.id))
        })?;
        if end > payload.len() as u64 {
            return Err(Error::corrupt_stream(format!(
                "boundary {:?} extends to {} past payload length {}",
                boundary.id,
                end,
                payload.len()
            )));
        }

        let bytes = payload[boundary.offset as usize..end as usize].to_vec();
        members.push((boundary.id.clone(), bytes));
        cursor = end;
    }

    if cursor != payload.len() as u64 {
        return Err(Error::corrupt_stream(format!(
            "boundaries cover {} of {} payload bytes",
            cursor,
            payload.len()
        )));
    }

    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: &str, data: &[u8]) -> (String, Vec<u8>) {
        (id.to_string(), data.to_vec())
    }

    #[test]
    fn test_combine_two_files() {
        let inputs = vec![input("a.txt", b"AB"), input("b.txt", b"CD")];
        let (payload, boundaries) = combine(&inputs).unwrap();

        assert_eq!(payload, b"ABCD");
        assert_eq!(
            boundaries,
            vec![
                FileBoundary {
                    id: "a.txt".to_string(),
                    offset: 0,
                    size: 2,
                },
                FileBoundary {
                    id: "b.txt".to_string(),
                    offset: 2,
                    size: 2,
                },
            ]
        );
    }

    #[test]
    fn test_combine_split_round_trip() {
        let inputs = vec![
            input("one", b"first file"),
            input("two", b""),
            input("three", b"third"),
        ];
        let (payload, boundaries) = combine(&inputs).unwrap();
        let members = split(&payload, &boundaries).unwrap();

        assert_eq!(members, inputs);
    }

    #[test]
    fn test_empty_list_rejected() {
        let result = combine(&[]);
        assert!(matches!(result, Err(Error::EmptyInput { .. })));
    }

    #[test]
    fn test_all_empty_buffers_rejected() {
        let inputs = vec![input("a", b""), input("b", b"")];
        let result = combine(&inputs);
        assert!(matches!(result, Err(Error::EmptyInput { .. })));
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        // Basename collisions must not silently overwrite a boundary
        let inputs = vec![input("x.txt", b"one"), input("x.txt", b"two")];
        let result = combine(&inputs);
        assert!(matches!(result, Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_same_basename_different_dirs_allowed() {
        let inputs = vec![input("a/x.txt", b"one"), input("b/x.txt", b"two")];
        let (payload, boundaries) = combine(&inputs).unwrap();
        let members = split(&payload, &boundaries).unwrap();
        assert_eq!(members, inputs);
    }

    #[test]
    fn test_split_gap_rejected() {
        let boundaries = vec![
            FileBoundary {
                id: "a".to_string(),
                offset: 0,
                size: 1,
            },
            FileBoundary {
                id: "b".to_string(),
                offset: 2,
                size: 2,
            },
        ];
        let result = split(b"ABCD", &boundaries);
        assert!(matches!(result, Err(Error::CorruptStream { .. })));
    }

    #[test]
    fn test_split_overlap_rejected() {
        let boundaries = vec![
            FileBoundary {
                id: "a".to_string(),
                offset: 0,
                size: 3,
            },
            FileBoundary {
                id: "b".to_string(),
                offset: 2,
                size: 2,
            },
        ];
        let result = split(b"ABCD", &boundaries);
        assert!(matches!(result, Err(Error::CorruptStream { .. })));
    }

    #[test]
    fn test_split_total_mismatch_rejected() {
        let boundaries = vec![FileBoundary {
            id: "a".to_string(),
            offset: 0,
            size: 2,
        }];
        let result = split(b"ABCD", &boundaries);
        assert!(matches!(result, Err(Error::CorruptStream { .. })));
    }

    #[test]
    fn test_split_past_payload_rejected() {
        let boundaries = vec![FileBoundary {
            id: "a".to_string(),
            offset: 0,
            size: 10,
        }];
        let result = split(b"ABCD", &boundaries);
        assert!(matches!(result, Err(Error::CorruptStream { .. })));
    }
}
