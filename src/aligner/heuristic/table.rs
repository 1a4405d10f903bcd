use std::fmt;
use std::ops::{Add, Sub};

use itertools::Itertools;
use num::Zero;
use smallvec::SmallVec;

use crate::aligner::scoring::{CostModel, Delta, GapTransitions};
use crate::sequences::SequenceSet;

/// Numeric type stored in a heuristic table.
pub trait TableCost: Copy + PartialOrd + Add<Output=Self> + Sub<Output=Self> + Zero + fmt::Debug {
    fn from_cost(cost: f64) -> Self;
    fn to_cost(self) -> f64;

    /// Value of a move that leaves the lattice
    fn unreachable() -> Self;
}

impl TableCost for f64 {
    #[inline(always)]
    fn from_cost(cost: f64) -> Self {
        cost
    }

    #[inline(always)]
    fn to_cost(self) -> f64 {
        self
    }

    fn unreachable() -> Self {
        f64::INFINITY
    }
}

/// Integer costs are truncated, which keeps the table a lower bound for non-negative costs.
impl TableCost for i32 {
    #[inline(always)]
    fn from_cost(cost: f64) -> Self {
        cost.trunc() as i32
    }

    #[inline(always)]
    fn to_cost(self) -> f64 {
        self as f64
    }

    fn unreachable() -> Self {
        i32::MAX / 2
    }
}

#[inline(always)]
fn advances(mv: usize, seq: usize) -> bool {
    mv & (1 << seq) != 0
}

/// Exact suffix DP over the projection of the lattice onto `N` sequences.
///
/// Each cell stores, for every non-empty move out of the cell, the optimal cost to reach the
/// end of all `N` sequences when starting with that move. The gap-open term of the first move
/// is charged at its worst case over all incoming gap states. A query subtracts the difference
/// between the worst case and the actual incoming gap state, and takes the minimum over all
/// moves.
///
/// Memory use is the product of the `(len + 1)` of each sequence times `2^N - 1` values, which
/// limits triple tables to moderate sequence lengths.
pub struct SuffixTable<V, const N: usize> {
    members: [usize; N],
    strides: [usize; N],
    values: Vec<V>,
    corrections: Vec<V>,
}

impl<V, const N: usize> SuffixTable<V, N>
where
    V: TableCost,
{
    const NUM_MOVES: usize = (1 << N) - 1;

    /// Number of distinct incoming delta combinations
    const NUM_DELTA_CODES: usize = 3usize.pow(N as u32);

    /// Build the table for the sequences with the given indices in `seqs`.
    pub fn build(seqs: &SequenceSet, costs: &CostModel, transitions: &GapTransitions, members: [usize; N]) -> Self {
        let residues: [&[u8]; N] = members.map(|s| seqs.sequence(s));
        let lengths: [usize; N] = residues.map(|r| r.len());
        let penalize = costs.penalizes_terminal_gaps();

        let mut strides = [1usize; N];
        for t in (0..N.saturating_sub(1)).rev() {
            strides[t] = strides[t + 1] * (lengths[t + 1] + 1);
        }

        let num_cells = strides[0] * (lengths[0] + 1);
        let moves = Self::NUM_MOVES;
        let pairs: SmallVec<[(usize, usize); 3]> = (0..N).tuple_combinations().collect();

        let corrections = Self::build_corrections(transitions, &pairs);

        // Linear gap cost and worst-case gap-open of each move
        let gap_part: Vec<V> = (1..=moves)
            .map(|mv| pairs.iter()
                .filter(|&&(a, b)| advances(mv, a) != advances(mv, b))
                .fold(V::zero(), |acc, _| acc + V::from_cost(costs.linear_gap())
                    + V::from_cost(transitions.worst(true, false))))
            .collect();

        let mut values = vec![V::unreachable(); num_cells * moves];
        values[(num_cells - 1) * moves + moves - 1] = V::zero();

        let mut coords = lengths;
        for cell in (0..num_cells - 1).rev() {
            // Odometer decrement to the coordinates of `cell`
            for t in (0..N).rev() {
                if coords[t] > 0 {
                    coords[t] -= 1;
                    break;
                }

                coords[t] = lengths[t];
            }

            for mv in 1..=moves {
                if (0..N).any(|t| advances(mv, t) && coords[t] == lengths[t]) {
                    continue;
                }

                let mut next = cell;
                let mut next_code = 0;
                let mut pow = 1;
                for t in 0..N {
                    let advanced = advances(mv, t);
                    if advanced {
                        next += strides[t];
                    }

                    let next_pos = coords[t] + advanced as usize;
                    next_code += Delta::at(next_pos, lengths[t], advanced, penalize).index() * pow;
                    pow *= Delta::NUM_VALUES;
                }

                let mut cost = gap_part[mv - 1];
                for &(a, b) in &pairs {
                    if advances(mv, a) && advances(mv, b) {
                        cost = cost + V::from_cost(costs.substitution(residues[a][coords[a]], residues[b][coords[b]]));
                    }
                }

                let remaining = Self::min_corrected(
                    &values[next * moves..(next + 1) * moves],
                    &corrections[next_code * moves..(next_code + 1) * moves]
                );

                values[cell * moves + mv - 1] = cost + remaining;
            }
        }

        Self { members, strides, values, corrections }
    }

    /// For every incoming delta combination and move, the amount by which the worst-case
    /// gap-open exceeds the actual one.
    fn build_corrections(transitions: &GapTransitions, pairs: &[(usize, usize)]) -> Vec<V> {
        let moves = Self::NUM_MOVES;
        let all_deltas = [Delta::Idle, Delta::Advanced, Delta::Boundary];

        let mut corrections = Vec::with_capacity(Self::NUM_DELTA_CODES * moves);
        for code in 0..Self::NUM_DELTA_CODES {
            let mut deltas = [Delta::Idle; N];
            let mut rest = code;
            for delta in deltas.iter_mut() {
                *delta = all_deltas[rest % Delta::NUM_VALUES];
                rest /= Delta::NUM_VALUES;
            }

            for mv in 1..=moves {
                let correction = pairs.iter()
                    .fold(V::zero(), |acc, &(a, b)| {
                        let (move_a, move_b) = (advances(mv, a), advances(mv, b));
                        let worst = V::from_cost(transitions.worst(move_a, move_b));
                        let actual = V::from_cost(transitions.cost(deltas[a], deltas[b], move_a, move_b));

                        acc + (worst - actual)
                    });

                corrections.push(correction);
            }
        }

        corrections
    }

    #[inline]
    fn min_corrected(values: &[V], corrections: &[V]) -> V {
        let mut best = V::unreachable();
        for (&value, &correction) in values.iter().zip(corrections) {
            let corrected = value - correction;
            if corrected < best {
                best = corrected;
            }
        }

        best
    }

    /// Lower bound on the cost to finish the projected sequences from `pos`, where `deltas`
    /// describes the move into `pos`. Both are indexed by global sequence index.
    #[inline]
    pub fn estimate(&self, pos: &[usize], deltas: &[Delta]) -> V {
        let moves = Self::NUM_MOVES;
        let mut cell = 0;
        let mut code = 0;
        let mut pow = 1;
        for t in 0..N {
            let seq = self.members[t];
            cell += pos[seq] * self.strides[t];
            code += deltas[seq].index() * pow;
            pow *= Delta::NUM_VALUES;
        }

        Self::min_corrected(
            &self.values[cell * moves..(cell + 1) * moves],
            &self.corrections[code * moves..(code + 1) * moves]
        )
    }

    pub fn num_cells(&self) -> usize {
        self.values.len() / Self::NUM_MOVES
    }
}
