use smallvec::SmallVec;

use crate::aligner::heuristic::AstarHeuristic;
use crate::aligner::operators::OperatorTable;
use crate::aligner::scoring::{state_deltas, CostModel, GapTransitions};
use crate::aligner::state::{pack_position, GapState, LatticePosition};
use crate::sequences::SequenceSet;

/// Maximum number of sequence pairs
const MAX_PAIRS: usize = 15;

/// A candidate child of an expanded lattice state
#[derive(Clone, Debug, PartialEq)]
pub struct Successor {
    pub g: f64,
    pub h: f64,
    pub f: f64,
    pub packed: u64,
    pub gap_state: GapState,
}

/// Generates the children of a lattice state by walking the operator table in Gray-code order.
///
/// Only one coordinate changes per step, and the substitution costs of the previous subset are
/// reused when the step adds a sequence to it.
pub struct SuccessorGenerator<'a, H> {
    seqs: &'a SequenceSet,
    costs: &'a CostModel,
    heuristic: &'a H,
    operators: OperatorTable,
    transitions: GapTransitions,
    pairs: SmallVec<[(usize, usize); MAX_PAIRS]>,
}

impl<'a, H> SuccessorGenerator<'a, H>
where
    H: AstarHeuristic,
{
    pub fn new(seqs: &'a SequenceSet, costs: &'a CostModel, heuristic: &'a H) -> Self {
        let num_seqs = seqs.num_sequences();
        let pairs = (1..num_seqs)
            .flat_map(|i| (0..i).map(move |j| (i, j)))
            .collect();

        Self {
            seqs,
            costs,
            heuristic,
            operators: OperatorTable::new(num_seqs, costs.linear_gap()),
            transitions: GapTransitions::new(costs),
            pairs,
        }
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    pub fn heuristic(&self) -> &H {
        self.heuristic
    }

    /// Substitution cost of aligning the residues consumed by the last move of `a` and `b`.
    #[inline(always)]
    fn substitution(&self, pos: &[usize], a: usize, b: usize) -> f64 {
        self.costs.substitution(self.seqs.sequence(a)[pos[a] - 1], self.seqs.sequence(b)[pos[b] - 1])
    }

    /// Write the children of the lattice state `(base, gap_state)` with path cost `g` to `out`.
    ///
    /// Returns the index into `out` of a child at the end of all sequences with a zero
    /// estimate, if one was found. Generation stops at such a child.
    pub fn expand(&self, base: &[usize], gap_state: GapState, g: f64, out: &mut Vec<Successor>) -> Option<usize> {
        out.clear();

        let lengths = self.seqs.lengths();
        let penalize = self.costs.penalizes_terminal_gaps();

        // Gap-open costs of all four moves of each pair, given the incoming deltas
        let incoming = state_deltas(base, lengths, gap_state, penalize);
        let pair_moves: SmallVec<[[[f64; 2]; 2]; MAX_PAIRS]> = self.pairs.iter()
            .map(|&(i, j)| *self.transitions.moves(incoming[i], incoming[j]))
            .collect();

        let mut pos: LatticePosition = base.iter().copied().collect();
        let mut off_edge = 0usize;
        let mut reuse = true;
        let mut prev_substitution = 0.0;

        for op in self.operators.iter() {
            let t = op.toggled;
            if op.increments {
                if pos[t] == lengths[t] {
                    off_edge += 1;
                }
                pos[t] += 1;
            } else {
                pos[t] -= 1;
                if pos[t] == lengths[t] {
                    off_edge -= 1;
                }
            }

            if off_edge > 0 {
                reuse = false;
                continue;
            }

            let substitution = if reuse && op.increments {
                prev_substitution + op.others.iter()
                    .map(|&o| self.substitution(&pos, t, o))
                    .sum::<f64>()
            } else {
                reuse = true;
                let mut total = 0.0;
                for (n, &a) in op.members.iter().enumerate() {
                    for &b in &op.members[..n] {
                        total += self.substitution(&pos, a, b);
                    }
                }

                total
            };
            prev_substitution = substitution;

            let gap_open: f64 = self.pairs.iter()
                .zip(&pair_moves)
                .map(|(&(i, j), moves)| moves[op.gap_state.advanced(i) as usize][op.gap_state.advanced(j) as usize])
                .sum();

            let edge_cost = substitution + op.gap_cost + gap_open;
            debug_assert!(edge_cost >= 0.0, "Negative edge cost {edge_cost}");

            let outgoing = state_deltas(&pos, lengths, op.gap_state, penalize);
            let h = self.heuristic.estimate(&pos, &outgoing);
            assert!(h >= 0.0, "Negative heuristic estimate {h} at {pos:?}");

            let child_g = g + edge_cost;
            out.push(Successor {
                g: child_g,
                h,
                f: child_g + h,
                packed: pack_position(&pos),
                gap_state: op.gap_state,
            });

            if h == 0.0 && pos.as_slice() == lengths {
                return Some(out.len() - 1);
            }
        }

        None
    }
}
