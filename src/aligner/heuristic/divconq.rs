use itertools::Itertools;

use crate::aligner::heuristic::pairwise::PairwiseHeuristic;
use crate::aligner::heuristic::table::TableCost;
use crate::aligner::heuristic::triple::{consecutive_groups, TripleHeuristic};
use crate::aligner::heuristic::AstarHeuristic;
use crate::aligner::scoring::{CostModel, Delta, GapTransitions};
use crate::sequences::SequenceSet;

/// Decomposition of the sequences into groups of three, bounded with triple tables, plus a
/// pairwise table for every pair of sequences that does not share a group.
///
/// Every pair of sequences is covered exactly once, so the sum of the components stays a lower
/// bound. With fewer than three sequences this is the pairwise heuristic.
pub struct DivConqHeuristic<V> {
    triples: TripleHeuristic<V>,
    pairs: PairwiseHeuristic,
}

impl<V> DivConqHeuristic<V>
where
    V: TableCost,
{
    pub fn new(seqs: &SequenceSet, costs: &CostModel, transitions: &GapTransitions) -> Self {
        let num_seqs = seqs.num_sequences();
        let num_grouped = 3 * (num_seqs / 3);
        let group_of = |seq: usize| if seq < num_grouped { Some(seq / 3) } else { None };

        let triples = TripleHeuristic::with_groups(seqs, costs, transitions, consecutive_groups(num_seqs));

        let cross_pairs = (0..num_seqs)
            .tuple_combinations()
            .filter(|&(a, b)| group_of(a).is_none() || group_of(a) != group_of(b))
            .map(|(a, b)| [a, b]);
        let pairs = PairwiseHeuristic::with_pairs(seqs, costs, transitions, cross_pairs);

        Self { triples, pairs }
    }

    pub fn num_triple_tables(&self) -> usize {
        self.triples.num_tables()
    }

    pub fn num_pair_tables(&self) -> usize {
        self.pairs.num_tables()
    }
}

impl<V> AstarHeuristic for DivConqHeuristic<V>
where
    V: TableCost,
{
    fn initial_estimate(&self) -> f64 {
        self.triples.initial_estimate() + self.pairs.initial_estimate()
    }

    #[inline]
    fn estimate(&self, pos: &[usize], deltas: &[Delta]) -> f64 {
        self.triples.estimate(pos, deltas) + self.pairs.estimate(pos, deltas)
    }
}
