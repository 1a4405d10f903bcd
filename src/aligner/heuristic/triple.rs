use tracing::debug;

use crate::aligner::heuristic::table::{SuffixTable, TableCost};
use crate::aligner::heuristic::{AstarHeuristic, RootQuery};
use crate::aligner::scoring::{CostModel, Delta, GapTransitions};
use crate::sequences::SequenceSet;

/// Sum of the optimal three-way alignment costs over disjoint groups of three sequences.
///
/// Groups are formed from consecutive sequences, `{0, 1, 2}` and `{3, 4, 5}`. Sequences that do
/// not fill a complete group are not bounded by this heuristic.
pub struct TripleHeuristic<V> {
    tables: Vec<SuffixTable<V, 3>>,
    initial: f64,
}

impl<V> TripleHeuristic<V>
where
    V: TableCost,
{
    pub fn new(seqs: &SequenceSet, costs: &CostModel, transitions: &GapTransitions) -> Self {
        Self::with_groups(seqs, costs, transitions, consecutive_groups(seqs.num_sequences()))
    }

    /// Triple tables for the given groups of sequence indices only
    pub fn with_groups<I>(seqs: &SequenceSet, costs: &CostModel, transitions: &GapTransitions, groups: I) -> Self
    where
        I: IntoIterator<Item=[usize; 3]>,
    {
        let tables: Vec<_> = groups.into_iter()
            .map(|group| {
                let table = SuffixTable::build(seqs, costs, transitions, group);
                debug!(seqs = ?group, cells = table.num_cells(), "Built triple table");

                table
            })
            .collect();

        let mut heuristic = Self { tables, initial: 0.0 };
        let root = RootQuery::new(seqs, costs);
        heuristic.initial = heuristic.estimate(&root.pos, &root.deltas);

        heuristic
    }

    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }
}

impl<V> AstarHeuristic for TripleHeuristic<V>
where
    V: TableCost,
{
    fn initial_estimate(&self) -> f64 {
        self.initial
    }

    #[inline]
    fn estimate(&self, pos: &[usize], deltas: &[Delta]) -> f64 {
        self.tables.iter()
            .map(|table| table.estimate(pos, deltas).to_cost())
            .sum()
    }
}

/// Groups `{0, 1, 2}, {3, 4, 5}, ...` of complete triples
pub fn consecutive_groups(num_seqs: usize) -> impl Iterator<Item=[usize; 3]> {
    (0..num_seqs / 3).map(|g| [3 * g, 3 * g + 1, 3 * g + 2])
}
