pub mod gap_affine;

pub use gap_affine::{state_deltas, Delta, DeltaVec, GapTransitions};

use crate::errors::MsaError;

/// Symbol used for gaps, both in cost tables and in aligned output
pub const GAP_SYMBOL: u8 = b'-';

const DEFAULT_LINEAR_GAP_COST: f64 = 2.0;
const DEFAULT_AFFINE_GAP_COST: f64 = 8.0;

/// Cost of aligning two symbols for which the table has no entry
const UNLISTED_COST: f64 = 255.0;

const NUM_SYMBOLS: usize = 256;

/// A single `symbol symbol cost` line of a substitution table. `b` equal to [`GAP_SYMBOL`]
/// denotes the linear gap cost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostEntry {
    pub a: u8,
    pub b: u8,
    pub cost: f64,
}

impl CostEntry {
    pub fn new(a: u8, b: u8, cost: f64) -> Self {
        Self { a, b, cost }
    }

    fn is_gap_entry(&self) -> bool {
        self.b == GAP_SYMBOL || self.a == GAP_SYMBOL
    }
}

/// Substitution costs plus the linear, affine and terminal gap costs.
///
/// The substitution table is symmetric and case-insensitive. All costs are non-negative after
/// construction: when a table contains negative entries, every cost is shifted such that the
/// optimal alignments under the substitution/linear gap part are preserved.
#[derive(Clone, Debug)]
pub struct CostModel {
    substitution: Box<[f64]>,
    alphabet: [bool; NUM_SYMBOLS],
    linear_gap: f64,
    affine_gap: f64,
    terminal_gap: f64,
    penalize_terminal_gaps: bool,
}

impl CostModel {
    /// Build a cost model from parsed table entries. `affine_gap` is the gap-open cost given by
    /// the table's reserved gap line, if present.
    pub fn from_entries(entries: &[CostEntry], affine_gap: Option<f64>) -> Result<Self, MsaError> {
        let mut linear_gap: Option<f64> = None;
        for entry in entries.iter().filter(|e| e.is_gap_entry()) {
            match linear_gap {
                None => linear_gap = Some(entry.cost),
                Some(first) if first != entry.cost =>
                    return Err(MsaError::InconsistentLinearGapCost(first, entry.cost)),
                Some(_) => (),
            }
        }

        let min_cost = entries.iter()
            .map(|e| e.cost)
            .fold(f64::INFINITY, f64::min);
        let shift = if min_cost < 0.0 { min_cost } else { 0.0 };

        let mut substitution = vec![UNLISTED_COST; NUM_SYMBOLS * NUM_SYMBOLS].into_boxed_slice();
        let mut alphabet = [false; NUM_SYMBOLS];
        for entry in entries.iter().filter(|e| !e.is_gap_entry()) {
            let cost = entry.cost - 2.0 * shift;
            for a in case_variants(entry.a) {
                alphabet[a as usize] = true;
                for b in case_variants(entry.b) {
                    alphabet[b as usize] = true;
                    substitution[a as usize * NUM_SYMBOLS + b as usize] = cost;
                    substitution[b as usize * NUM_SYMBOLS + a as usize] = cost;
                }
            }
        }

        let linear_gap = linear_gap.unwrap_or(DEFAULT_LINEAR_GAP_COST) - shift;
        let affine_gap = affine_gap.unwrap_or(DEFAULT_AFFINE_GAP_COST) - shift;

        for gap_cost in [linear_gap, affine_gap] {
            if gap_cost < 0.0 {
                return Err(MsaError::NegativeGapCost(gap_cost));
            }
        }

        Ok(Self {
            substitution,
            alphabet,
            linear_gap,
            affine_gap,
            terminal_gap: affine_gap,
            penalize_terminal_gaps: true,
        })
    }

    /// Cost model with zero-cost matches and a single mismatch cost for all pairs of distinct
    /// symbols in `alphabet`.
    pub fn uniform(alphabet: &[u8], mismatch: f64, linear_gap: f64, affine_gap: f64) -> Result<Self, MsaError> {
        let mut entries = Vec::with_capacity(alphabet.len() * alphabet.len() + alphabet.len());
        for (i, &a) in alphabet.iter().enumerate() {
            for &b in &alphabet[i..] {
                let cost = if a.eq_ignore_ascii_case(&b) { 0.0 } else { mismatch };
                entries.push(CostEntry::new(a, b, cost));
            }

            entries.push(CostEntry::new(a, GAP_SYMBOL, linear_gap));
        }

        Self::from_entries(&entries, Some(affine_gap))
    }

    /// Set whether gaps at the start or end of a sequence are charged the gap-open cost.
    pub fn with_terminal_gaps(mut self, penalize: bool) -> Self {
        self.penalize_terminal_gaps = penalize;
        self.terminal_gap = if penalize { self.affine_gap } else { 0.0 };
        self
    }

    #[inline(always)]
    pub fn substitution(&self, a: u8, b: u8) -> f64 {
        self.substitution[a as usize * NUM_SYMBOLS + b as usize]
    }

    #[inline(always)]
    pub fn linear_gap(&self) -> f64 {
        self.linear_gap
    }

    #[inline(always)]
    pub fn affine_gap(&self) -> f64 {
        self.affine_gap
    }

    #[inline(always)]
    pub fn terminal_gap(&self) -> f64 {
        self.terminal_gap
    }

    #[inline(always)]
    pub fn penalizes_terminal_gaps(&self) -> bool {
        self.penalize_terminal_gaps
    }

    /// Whether the substitution table has entries for the given symbol
    pub fn contains_symbol(&self, symbol: u8) -> bool {
        self.alphabet[symbol as usize]
    }

    /// Largest substitution cost between any two symbols in the table
    pub fn max_substitution(&self) -> f64 {
        let symbols: Vec<usize> = (0..NUM_SYMBOLS).filter(|&s| self.alphabet[s]).collect();

        symbols.iter()
            .flat_map(|&a| symbols.iter().map(move |&b| (a, b)))
            .map(|(a, b)| self.substitution[a * NUM_SYMBOLS + b])
            .fold(0.0, f64::max)
    }
}

fn case_variants(symbol: u8) -> impl Iterator<Item=u8> {
    let upper = symbol.to_ascii_uppercase();
    let lower = symbol.to_ascii_lowercase();

    std::iter::once(upper).chain((lower != upper).then_some(lower))
}


#[cfg(test)]
mod tests {
    use super::{CostEntry, CostModel, GAP_SYMBOL, UNLISTED_COST};
    use crate::errors::MsaError;

    #[test]
    fn test_uniform_costs() {
        let costs = CostModel::uniform(b"ACGT", 1.0, 1.0, 2.0).unwrap();

        assert_eq!(costs.substitution(b'A', b'A'), 0.0);
        assert_eq!(costs.substitution(b'A', b'C'), 1.0);
        assert_eq!(costs.substitution(b'C', b'A'), 1.0);
        assert_eq!(costs.substitution(b'a', b'C'), 1.0);
        assert_eq!(costs.substitution(b'g', b'g'), 0.0);
        assert_eq!(costs.substitution(b'A', b'N'), UNLISTED_COST);
        assert_eq!(costs.linear_gap(), 1.0);
        assert_eq!(costs.affine_gap(), 2.0);
        assert_eq!(costs.terminal_gap(), 2.0);
        assert!(costs.contains_symbol(b't'));
        assert!(!costs.contains_symbol(b'N'));
    }

    #[test]
    fn test_terminal_gaps() {
        let costs = CostModel::uniform(b"ACGT", 1.0, 1.0, 2.0).unwrap()
            .with_terminal_gaps(false);

        assert!(!costs.penalizes_terminal_gaps());
        assert_eq!(costs.terminal_gap(), 0.0);
        assert_eq!(costs.affine_gap(), 2.0);
    }

    #[test]
    fn test_defaults_and_shift() {
        let entries = vec![
            CostEntry::new(b'A', b'A', -2.0),
            CostEntry::new(b'A', b'C', 1.0),
            CostEntry::new(b'C', b'C', -1.0),
        ];

        let costs = CostModel::from_entries(&entries, None).unwrap();
        assert_eq!(costs.substitution(b'A', b'A'), 2.0);
        assert_eq!(costs.substitution(b'C', b'A'), 5.0);
        assert_eq!(costs.substitution(b'C', b'C'), 3.0);
        assert_eq!(costs.linear_gap(), 4.0);
        assert_eq!(costs.affine_gap(), 10.0);
        assert_eq!(costs.max_substitution(), 5.0);
    }

    #[test]
    fn test_inconsistent_linear_gap() {
        let entries = vec![
            CostEntry::new(b'A', b'A', 0.0),
            CostEntry::new(b'A', GAP_SYMBOL, 2.0),
            CostEntry::new(b'C', GAP_SYMBOL, 3.0),
        ];

        match CostModel::from_entries(&entries, Some(4.0)) {
            Err(MsaError::InconsistentLinearGapCost(first, other)) => {
                assert_eq!(first, 2.0);
                assert_eq!(other, 3.0);
            },
            other => panic!("Unexpected result: {other:?}")
        }
    }

    #[test]
    fn test_negative_affine_cost() {
        let entries = vec![CostEntry::new(b'A', b'A', 0.0)];
        assert!(matches!(CostModel::from_entries(&entries, Some(-1.0)), Err(MsaError::NegativeGapCost(_))));
    }
}
