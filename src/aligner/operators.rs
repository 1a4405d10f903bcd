use std::fmt::{Display, Formatter};

use smallvec::SmallVec;

use crate::aligner::state::GapState;
use crate::sequences::MAX_SEQUENCES;

/// Reflected binary Gray code of `n`
#[inline(always)]
pub fn gray_code(n: usize) -> usize {
    n ^ (n >> 1)
}

/// One step in the Gray-code walk over all non-empty subsets of sequences.
#[derive(Clone, Debug)]
pub struct Operator {
    /// The sequence whose coordinate changes in this step
    pub toggled: usize,

    /// Whether the toggled coordinate advances (true) or is reset (false)
    pub increments: bool,

    /// The subset of advancing sequences after this step
    pub gap_state: GapState,

    /// Advancing sequences, ascending
    pub members: SmallVec<[usize; MAX_SEQUENCES]>,

    /// Advancing sequences other than the toggled one
    pub others: SmallVec<[usize; MAX_SEQUENCES]>,

    /// Linear gap cost of this move, `(k - |subset|) * |subset| * linear_gap`
    pub gap_cost: f64,
}

/// All `2^k - 1` moves out of a lattice position, ordered such that consecutive moves differ in
/// exactly one sequence.
#[derive(Clone, Debug)]
pub struct OperatorTable {
    num_seqs: usize,
    operators: Vec<Operator>,
}

impl OperatorTable {
    pub fn new(num_seqs: usize, linear_gap: f64) -> Self {
        assert!(num_seqs >= 1 && num_seqs <= MAX_SEQUENCES, "Invalid number of sequences {num_seqs}");

        let num_ops = (1usize << num_seqs) - 1;
        let operators = (0..num_ops)
            .map(|step| {
                let prev = gray_code(step);
                let curr = gray_code(step + 1);
                let changed = prev ^ curr;

                let toggled = changed.trailing_zeros() as usize;
                let gap_state = GapState::new(curr as u8);
                let members: SmallVec<[usize; MAX_SEQUENCES]> = gap_state.members().collect();
                let others = members.iter()
                    .copied()
                    .filter(|&m| m != toggled)
                    .collect();

                let num_members = members.len();
                let gap_cost = ((num_seqs - num_members) * num_members) as f64 * linear_gap;

                Operator {
                    toggled,
                    increments: curr & changed != 0,
                    gap_state,
                    members,
                    others,
                    gap_cost,
                }
            })
            .collect();

        Self { num_seqs, operators }
    }

    pub fn num_seqs(&self) -> usize {
        self.num_seqs
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<&Operator> {
        self.operators.get(step)
    }

    pub fn iter(&self) -> impl Iterator<Item=&Operator> + '_ {
        self.operators.iter()
    }
}

impl Display for OperatorTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "step\ttoggle\tdir\tsubset\tgap_cost")?;
        for (step, op) in self.operators.iter().enumerate() {
            let subset: String = (0..self.num_seqs).rev()
                .map(|i| if op.gap_state.advanced(i) { '1' } else { '0' })
                .collect();

            writeln!(f, "{}\t{}\t{}\t{}\t{}", step + 1, op.toggled,
                if op.increments { '+' } else { '-' }, subset, op.gap_cost)?;
        }

        Ok(())
    }
}
