//! Symbol frequency analysis.
//!
//! A `FrequencyTable` counts how often each byte value occurs in an input
//! buffer. It is the first stage of compression and lives only for the
//! duration of one compress call; the tree built from it is what gets
//! persisted.

use crate::error::{Error, Result};

/// Number of distinct byte symbols.
pub const ALPHABET_SIZE: usize = 256;

/// Occurrence counts for every byte value in one input buffer.
///
/// # Invariants
/// - `total()` equals the length of the buffer the table was built from
/// - at least one count is nonzero (empty input is rejected at build time)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    /// Count symbol occurrences in `data` with a single linear pass.
    ///
    /// # Errors
    /// Returns `Error::EmptyInput` if `data` is empty: compression on empty
    /// input is rejected, not silently turned into an empty archive.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::EmptyInput {
                reason: "no bytes to analyze",
            });
        }

        let mut counts = [0u64; ALPHABET_SIZE];
        for &byte in data {
            counts[byte as usize] += 1;
        }

        Ok(Self { counts })
    }

    /// Occurrence count for one symbol.
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts (equals the analyzed buffer's length).
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of distinct symbols present.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Iterate over `(symbol, count)` pairs with nonzero counts,
    /// in ascending symbol order.
    pub fn symbols(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_match_input() {
        let table = FrequencyTable::from_bytes(b"aaab").unwrap();

        assert_eq!(table.count(b'a'), 3);
        assert_eq!(table.count(b'b'), 1);
        assert_eq!(table.count(b'c'), 0);
        assert_eq!(table.distinct(), 2);
    }

    #[test]
    fn test_total_equals_input_length() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let table = FrequencyTable::from_bytes(data).unwrap();
        assert_eq!(table.total(), data.len() as u64);
    }

    #[test]
    fn test_empty_input_rejected() {
        let result = FrequencyTable::from_bytes(b"");
        assert!(matches!(result, Err(Error::EmptyInput { .. })));
    }

    #[test]
    fn test_symbols_ascending_order() {
        let table = FrequencyTable::from_bytes(b"cba").unwrap();
        let symbols: Vec<_> = table.symbols().collect();
        assert_eq!(symbols, vec![(b'a', 1), (b'b', 1), (b'c', 1)]);
    }

    #[test]
    fn test_full_alphabet() {
        let data: Vec<u8> = (0..=255).collect();
        let table = FrequencyTable::from_bytes(&data).unwrap();
        assert_eq!(table.distinct(), 256);
        assert_eq!(table.total(), 256);
    }
}
