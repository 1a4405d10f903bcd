use smallvec::SmallVec;

use crate::aligner::scoring::CostModel;
use crate::aligner::state::GapState;
use crate::sequences::MAX_SEQUENCES;

pub type DeltaVec = SmallVec<[Delta; MAX_SEQUENCES]>;

/// Deltas of all sequences at `pos`, reached by a move that advanced the sequences in
/// `gap_state`.
#[inline]
pub fn state_deltas(pos: &[usize], lengths: &[usize], gap_state: GapState, penalize_terminal_gaps: bool) -> DeltaVec {
    pos.iter()
        .zip(lengths)
        .enumerate()
        .map(|(i, (&p, &len))| Delta::at(p, len, gap_state.advanced(i), penalize_terminal_gaps))
        .collect()
}

/// How a sequence took part in the move that led into a lattice position. Used to price the
/// gap-open term of the next move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Delta {
    /// The sequence did not advance
    Idle = 0,

    /// The sequence advanced
    Advanced = 1,

    /// The sequence sits at its start or end while terminal gaps are free
    Boundary = 2,
}

impl Delta {
    pub const NUM_VALUES: usize = 3;

    /// Determine the delta of a sequence at position `pos` of a sequence with length `len`.
    #[inline]
    pub fn at(pos: usize, len: usize, advanced: bool, penalize_terminal_gaps: bool) -> Self {
        if !penalize_terminal_gaps && (pos == 0 || pos == len) {
            Self::Boundary
        } else if advanced {
            Self::Advanced
        } else {
            Self::Idle
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Affine gap-open costs for a pair of sequences, indexed by the deltas of the incoming move and
/// whether each sequence advances on the next move.
///
/// A gap-open is charged when exactly one of the two sequences advances and the previous move
/// either had neither advancing, both advancing, or the other one advancing. Continuing a run
/// in the same direction is free.
#[derive(Clone, Debug)]
pub struct GapTransitions {
    costs: [[[[f64; 2]; 2]; Delta::NUM_VALUES]; Delta::NUM_VALUES],
    affine_gap: f64,
}

impl GapTransitions {
    pub fn new(costs: &CostModel) -> Self {
        let af = costs.affine_gap();
        let tm = costs.terminal_gap();
        let mut table = [[[[0.0; 2]; 2]; Delta::NUM_VALUES]; Delta::NUM_VALUES];

        // (-,-) -> (-,x) and (x,-)
        table[0][0][0][1] = af;
        table[0][0][1][0] = af;

        // (-,x) -> (x,-)
        table[0][1][1][0] = af;

        // (x,-) -> (-,x)
        table[1][0][0][1] = af;

        // (x,x) -> (-,x) and (x,-)
        table[1][1][0][1] = af;
        table[1][1][1][0] = af;

        let boundary = Delta::Boundary.index();
        for other in 0..Delta::NUM_VALUES {
            for (prev_i, prev_j) in [(boundary, other), (other, boundary)] {
                table[prev_i][prev_j][0][1] = tm;
                table[prev_i][prev_j][1][0] = tm;
            }
        }

        Self { costs: table, affine_gap: af }
    }

    /// Gap-open cost for a pair of sequences `(i, j)`.
    #[inline(always)]
    pub fn cost(&self, prev_i: Delta, prev_j: Delta, move_i: bool, move_j: bool) -> f64 {
        self.costs[prev_i.index()][prev_j.index()][move_i as usize][move_j as usize]
    }

    /// All four move costs for the given incoming deltas
    #[inline(always)]
    pub fn moves(&self, prev_i: Delta, prev_j: Delta) -> &[[f64; 2]; 2] {
        &self.costs[prev_i.index()][prev_j.index()]
    }

    /// The highest gap-open cost any incoming delta combination incurs for the given move.
    #[inline(always)]
    pub fn worst(&self, move_i: bool, move_j: bool) -> f64 {
        if move_i != move_j { self.affine_gap } else { 0.0 }
    }
}
