pub mod table;
pub mod pairwise;
pub mod triple;
pub mod divconq;

pub use divconq::DivConqHeuristic;
pub use pairwise::PairwiseHeuristic;
pub use triple::TripleHeuristic;

use std::time::Instant;

use tracing::info;

use crate::aligner::config::HeuristicKind;
use crate::aligner::scoring::{state_deltas, CostModel, Delta, DeltaVec, GapTransitions};
use crate::aligner::state::{GapState, LatticePosition};
use crate::sequences::SequenceSet;

/// Lower bound on the remaining alignment cost from a lattice state.
///
/// Implementations must be admissible and consistent: for each move from `s` to `s'` with cost
/// `c`, `estimate(s) <= c + estimate(s')`, and the estimate at the end of all sequences is 0.
pub trait AstarHeuristic {
    /// Estimate at the start of all sequences
    fn initial_estimate(&self) -> f64;

    /// Estimate at `pos`, where `deltas` describes for each sequence how it took part in the
    /// move into `pos`.
    fn estimate(&self, pos: &[usize], deltas: &[Delta]) -> f64;
}

/// A* heuristic that always returns 0, such that
/// A* reduces to standard Dijkstra's algorithm.
#[derive(Default)]
pub struct Dijkstra;

impl AstarHeuristic for Dijkstra {
    fn initial_estimate(&self) -> f64 {
        0.0
    }

    fn estimate(&self, _: &[usize], _: &[Delta]) -> f64 {
        0.0
    }
}

/// The start of the lattice, reached by a virtual move in which all sequences advanced.
pub(crate) struct RootQuery {
    pub pos: LatticePosition,
    pub deltas: DeltaVec,
}

impl RootQuery {
    pub fn new(seqs: &SequenceSet, costs: &CostModel) -> Self {
        let num_seqs = seqs.num_sequences();
        let pos: LatticePosition = std::iter::repeat(0).take(num_seqs).collect();
        let deltas = state_deltas(&pos, seqs.lengths(), GapState::all(num_seqs), costs.penalizes_terminal_gaps());

        Self { pos, deltas }
    }
}

/// The available heuristics, selected at construction time.
pub enum Heuristic {
    Dijkstra(Dijkstra),
    Pairwise(PairwiseHeuristic),
    Triple(TripleHeuristic<f64>),
    TripleInt(TripleHeuristic<i32>),
    DivConq(DivConqHeuristic<f64>),
    DivConqInt(DivConqHeuristic<i32>),
}

impl Heuristic {
    pub fn build(kind: HeuristicKind, seqs: &SequenceSet, costs: &CostModel, transitions: &GapTransitions) -> Self {
        let start = Instant::now();

        let heuristic = match kind {
            HeuristicKind::Dijkstra => Self::Dijkstra(Dijkstra),
            HeuristicKind::Pairwise => Self::Pairwise(PairwiseHeuristic::new(seqs, costs, transitions)),
            HeuristicKind::Triple => Self::Triple(TripleHeuristic::new(seqs, costs, transitions)),
            HeuristicKind::TripleInt => Self::TripleInt(TripleHeuristic::new(seqs, costs, transitions)),
            HeuristicKind::DivConq => Self::DivConq(DivConqHeuristic::new(seqs, costs, transitions)),
            HeuristicKind::DivConqInt => Self::DivConqInt(DivConqHeuristic::new(seqs, costs, transitions)),
        };

        info!(heuristic = %kind, initial_estimate = heuristic.initial_estimate(),
            elapsed_ms = start.elapsed().as_millis() as u64, "Heuristic tables built");

        heuristic
    }
}

impl AstarHeuristic for Heuristic {
    fn initial_estimate(&self) -> f64 {
        match self {
            Self::Dijkstra(h) => h.initial_estimate(),
            Self::Pairwise(h) => h.initial_estimate(),
            Self::Triple(h) => h.initial_estimate(),
            Self::TripleInt(h) => h.initial_estimate(),
            Self::DivConq(h) => h.initial_estimate(),
            Self::DivConqInt(h) => h.initial_estimate(),
        }
    }

    #[inline]
    fn estimate(&self, pos: &[usize], deltas: &[Delta]) -> f64 {
        match self {
            Self::Dijkstra(h) => h.estimate(pos, deltas),
            Self::Pairwise(h) => h.estimate(pos, deltas),
            Self::Triple(h) => h.estimate(pos, deltas),
            Self::TripleInt(h) => h.estimate(pos, deltas),
            Self::DivConq(h) => h.estimate(pos, deltas),
            Self::DivConqInt(h) => h.estimate(pos, deltas),
        }
    }
}

/// Multiplies every estimate of the inner heuristic. Weights above 1 make the search faster,
/// but the resulting alignment is no longer guaranteed to be optimal.
pub struct Weighted<H> {
    inner: H,
    weight: f64,
}

impl<H> Weighted<H> {
    pub fn new(inner: H, weight: f64) -> Self {
        Self { inner, weight }
    }
}

impl<H> AstarHeuristic for Weighted<H>
where
    H: AstarHeuristic,
{
    fn initial_estimate(&self) -> f64 {
        self.weight * self.inner.initial_estimate()
    }

    #[inline]
    fn estimate(&self, pos: &[usize], deltas: &[Delta]) -> f64 {
        self.weight * self.inner.estimate(pos, deltas)
    }
}
