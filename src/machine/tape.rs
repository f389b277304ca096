//! Sparse tape memory
//!
//! The tape is a mapping from signed cell address to cell value rather
//! than a fixed array, so it supports unbounded and (when enabled)
//! negative addressing without large static allocation. Unset addresses
//! implicitly hold zero.

use rustc_hash::FxHashMap;
use std::ops::Range;

/// Sparse tape: signed address → cell value, defaulting to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    cells: FxHashMap<i64, i64>,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value at `address`; addresses never written read as zero.
    pub fn get(&self, address: i64) -> i64 {
        self.cells.get(&address).copied().unwrap_or(0)
    }

    pub fn set(&mut self, address: i64, value: i64) {
        self.cells.insert(address, value);
    }

    /// Zero every touched address. The address set is kept resident so a
    /// reset tape re-runs without rehashing its working set.
    pub fn reset(&mut self) {
        for value in self.cells.values_mut() {
            *value = 0;
        }
    }

    /// Number of addresses that have ever been written.
    pub fn touched_count(&self) -> usize {
        self.cells.len()
    }

    /// Sum of the values stored in `range`, for the diagnostic state
    /// fingerprint. Cost is proportional to the touched set, not the
    /// range.
    pub fn window_sum(&self, range: Range<i64>) -> i64 {
        self.cells
            .iter()
            .filter(|(address, _)| range.contains(address))
            .map(|(_, value)| value)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_addresses_read_zero() {
        let tape = Tape::new();
        assert_eq!(tape.get(0), 0);
        assert_eq!(tape.get(-5), 0);
        assert_eq!(tape.get(1_000_000), 0);
    }

    #[test]
    fn test_set_get_negative_addresses() {
        let mut tape = Tape::new();
        tape.set(-3, 7);
        tape.set(4, 9);

        assert_eq!(tape.get(-3), 7);
        assert_eq!(tape.get(4), 9);
    }

    #[test]
    fn test_reset_zeroes_without_shrinking() {
        let mut tape = Tape::new();
        tape.set(0, 1);
        tape.set(9, 2);
        tape.reset();

        assert_eq!(tape.get(0), 0);
        assert_eq!(tape.get(9), 0);
        assert_eq!(tape.touched_count(), 2);
    }

    #[test]
    fn test_window_sum_is_bounded() {
        let mut tape = Tape::new();
        tape.set(0, 3);
        tape.set(500, 4);
        tape.set(1000, 100);
        tape.set(-1, 100);

        assert_eq!(tape.window_sum(0..1000), 7);
    }
}
