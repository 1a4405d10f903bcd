pub mod astar;
pub mod config;
pub mod heuristic;
pub mod operators;
pub mod projection;
pub mod queue;
pub mod scoring;
pub mod state;
pub mod successors;

#[cfg(test)]
pub(crate) mod reference;

use tracing::info;

use crate::aligner::astar::{AstarSearch, PathStep, SearchStats};
use crate::aligner::config::AlignmentConfig;
use crate::aligner::heuristic::{AstarHeuristic, Heuristic, Weighted};
use crate::aligner::scoring::{CostModel, GapTransitions, GAP_SYMBOL};
use crate::errors::MsaError;
use crate::sequences::SequenceSet;

/// An optimal alignment of all sequences in a [`SequenceSet`].
#[derive(Clone, Debug)]
pub struct AlignmentResult {
    /// Total sum-of-pairs cost with affine gaps
    pub cost: f64,

    /// Sequence names, in the order of the sequence set (descending length)
    pub names: Vec<String>,

    /// One aligned row per sequence, gaps written as [`GAP_SYMBOL`]
    pub rows: Vec<Vec<u8>>,

    /// The lattice states on the optimal path, from the start to the end of all sequences
    pub path: Vec<PathStep>,

    pub stats: SearchStats,
}

impl AlignmentResult {
    /// Number of alignment columns
    pub fn num_columns(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }
}

pub struct MsaAligner {
    config: AlignmentConfig,
}

impl MsaAligner {
    pub fn new(config: AlignmentConfig) -> Result<Self, MsaError> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    pub fn align(&self, seqs: &SequenceSet, costs: &CostModel) -> Result<AlignmentResult, MsaError> {
        seqs.validate_alphabet(costs)?;

        let costs = costs.clone()
            .with_terminal_gaps(self.config.penalize_terminal_gaps);

        if costs.max_substitution() > 2.0 * costs.linear_gap() {
            info!("Substitution costs exceed twice the linear gap cost, stopping at the first goal may be suboptimal");
        }

        let transitions = GapTransitions::new(&costs);
        let heuristic = Weighted::new(
            Heuristic::build(self.config.heuristic, seqs, &costs, &transitions),
            self.config.weight
        );

        info!(num_seqs = seqs.num_sequences(), total_residues = seqs.total_residues(),
            initial_estimate = heuristic.initial_estimate(), "Starting search");

        let mut search: AstarSearch<_> = AstarSearch::new(seqs, &costs, &heuristic);
        let result = search.run()?;

        let rows = aligned_rows(seqs, &result.path);

        Ok(AlignmentResult {
            cost: result.cost,
            names: seqs.names().map(String::from).collect(),
            rows,
            path: result.path,
            stats: result.stats,
        })
    }
}

/// Convert a lattice path into aligned rows. Each move is a column, sequences that did not advance
/// get a gap.
fn aligned_rows(seqs: &SequenceSet, path: &[PathStep]) -> Vec<Vec<u8>> {
    (0..seqs.num_sequences())
        .map(|i| {
            let seq = seqs.sequence(i);
            path.windows(2)
                .map(|step| {
                    if step[1].pos[i] > step[0].pos[i] {
                        seq[step[0].pos[i]]
                    } else {
                        GAP_SYMBOL
                    }
                })
                .collect()
        })
        .collect()
}
