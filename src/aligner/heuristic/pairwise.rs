use itertools::Itertools;
use tracing::debug;

use crate::aligner::heuristic::table::SuffixTable;
use crate::aligner::heuristic::{AstarHeuristic, RootQuery};
use crate::aligner::scoring::{CostModel, Delta, GapTransitions};
use crate::sequences::SequenceSet;

/// Sum of the optimal pairwise alignment costs over pairs of sequences.
pub struct PairwiseHeuristic {
    tables: Vec<SuffixTable<f64, 2>>,
    initial: f64,
}

impl PairwiseHeuristic {
    /// Pairwise tables for every pair of sequences
    pub fn new(seqs: &SequenceSet, costs: &CostModel, transitions: &GapTransitions) -> Self {
        let pairs = (0..seqs.num_sequences())
            .tuple_combinations()
            .map(|(a, b)| [a, b]);

        Self::with_pairs(seqs, costs, transitions, pairs)
    }

    /// Pairwise tables for the given pairs of sequence indices only
    pub fn with_pairs<I>(seqs: &SequenceSet, costs: &CostModel, transitions: &GapTransitions, pairs: I) -> Self
    where
        I: IntoIterator<Item=[usize; 2]>,
    {
        let tables: Vec<_> = pairs.into_iter()
            .map(|pair| {
                let table = SuffixTable::build(seqs, costs, transitions, pair);
                debug!(seqs = ?pair, cells = table.num_cells(), "Built pairwise table");

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

impl AstarHeuristic for PairwiseHeuristic {
    fn initial_estimate(&self) -> f64 {
        self.initial
    }

    #[inline]
    fn estimate(&self, pos: &[usize], deltas: &[Delta]) -> f64 {
        self.tables.iter()
            .map(|table| table.estimate(pos, deltas))
            .sum()
    }
}
