//! Exhaustive dynamic programming over the full lattice, used to validate heuristics and the
//! search on small instances.

use rustc_hash::FxHashMap;

use crate::aligner::scoring::{CostEntry, CostModel, Delta, GapTransitions, GAP_SYMBOL};
use crate::aligner::state::{pack_position, GapState, LatticePosition};
use crate::sequences::SequenceSet;

pub type StateKey = (u64, GapState);

pub struct Exhaustive<'a> {
    seqs: &'a SequenceSet,
    costs: &'a CostModel,
    transitions: GapTransitions,
}

impl<'a> Exhaustive<'a> {
    pub fn new(seqs: &'a SequenceSet, costs: &'a CostModel) -> Self {
        Self { seqs, costs, transitions: GapTransitions::new(costs) }
    }

    /// Cost of advancing the sequences in `mv` from `pos`, summed pair by pair. Returns `None`
    /// if the move leaves the lattice.
    pub fn edge_cost(&self, pos: &[usize], gap_state: GapState, mv: GapState) -> Option<(LatticePosition, f64)> {
        let lengths = self.seqs.lengths();
        let num_seqs = lengths.len();
        let penalize = self.costs.penalizes_terminal_gaps();

        if (0..num_seqs).any(|i| mv.advanced(i) && pos[i] == lengths[i]) {
            return None;
        }

        let mut cost = 0.0;
        for i in 0..num_seqs {
            for j in 0..i {
                let (move_i, move_j) = (mv.advanced(i), mv.advanced(j));
                if move_i && move_j {
                    cost += self.costs.substitution(self.seqs.sequence(i)[pos[i]], self.seqs.sequence(j)[pos[j]]);
                } else if move_i != move_j {
                    cost += self.costs.linear_gap();
                }

                let delta_i = Delta::at(pos[i], lengths[i], gap_state.advanced(i), penalize);
                let delta_j = Delta::at(pos[j], lengths[j], gap_state.advanced(j), penalize);
                cost += self.transitions.cost(delta_i, delta_j, move_i, move_j);
            }
        }

        let next = pos.iter()
            .enumerate()
            .map(|(i, &p)| p + mv.advanced(i) as usize)
            .collect();

        Some((next, cost))
    }

    /// Every lattice position, ordered by ascending sum of coordinates
    pub fn positions(&self) -> Vec<LatticePosition> {
        let lengths = self.seqs.lengths();
        let mut positions = Vec::new();
        let mut curr: LatticePosition = lengths.iter().map(|_| 0).collect();

        loop {
            positions.push(curr.clone());

            let mut t = 0;
            while t < lengths.len() && curr[t] == lengths[t] {
                curr[t] = 0;
                t += 1;
            }

            if t == lengths.len() {
                break;
            }

            curr[t] += 1;
        }

        positions.sort_by_key(|p| p.iter().sum::<usize>());
        positions
    }

    fn gap_states(&self) -> impl Iterator<Item=GapState> {
        (1..GapState::num_states(self.seqs.num_sequences())).map(|bits| GapState::new(bits as u8))
    }

    /// Optimal cost to reach the end of all sequences from every `(position, gap state)`
    pub fn cost_to_go(&self) -> FxHashMap<StateKey, f64> {
        let lengths = self.seqs.lengths();
        let mut remaining: FxHashMap<StateKey, f64> = FxHashMap::default();

        for pos in self.positions().into_iter().rev() {
            let packed = pack_position(&pos);
            for gap_state in self.gap_states() {
                let best = if pos.as_slice() == lengths {
                    0.0
                } else {
                    self.gap_states()
                        .filter_map(|mv| self.edge_cost(&pos, gap_state, mv)
                            .map(|(next, cost)| cost + remaining[&(pack_position(&next), mv)]))
                        .fold(f64::INFINITY, f64::min)
                };

                remaining.insert((packed, gap_state), best);
            }
        }

        remaining
    }

    /// Optimal cost to reach every `(position, gap state)` from the root
    pub fn forward_costs(&self) -> FxHashMap<StateKey, f64> {
        let num_seqs = self.seqs.num_sequences();
        let mut reached: FxHashMap<StateKey, f64> = FxHashMap::default();
        reached.insert((0, GapState::all(num_seqs)), 0.0);

        for pos in self.positions() {
            let packed = pack_position(&pos);
            for gap_state in self.gap_states() {
                let Some(&g) = reached.get(&(packed, gap_state)) else {
                    continue;
                };

                for mv in self.gap_states() {
                    if let Some((next, cost)) = self.edge_cost(&pos, gap_state, mv) {
                        let entry = reached.entry((pack_position(&next), mv)).or_insert(f64::INFINITY);
                        *entry = entry.min(g + cost);
                    }
                }
            }
        }

        reached
    }

    pub fn optimal_cost(&self) -> f64 {
        let num_seqs = self.seqs.num_sequences();
        self.cost_to_go()[&(0, GapState::all(num_seqs))]
    }
}

/// A non-uniform substitution table in which no substitution costs more than two linear gaps
pub fn varied_costs() -> CostModel {
    let entries = vec![
        CostEntry::new(b'A', b'A', 0.0),
        CostEntry::new(b'C', b'C', 0.0),
        CostEntry::new(b'G', b'G', 0.5),
        CostEntry::new(b'T', b'T', 0.0),
        CostEntry::new(b'A', b'C', 2.0),
        CostEntry::new(b'A', b'G', 1.0),
        CostEntry::new(b'A', b'T', 3.0),
        CostEntry::new(b'C', b'G', 2.5),
        CostEntry::new(b'C', b'T', 1.0),
        CostEntry::new(b'G', b'T', 2.0),
        CostEntry::new(b'A', GAP_SYMBOL, 1.5),
        CostEntry::new(b'C', GAP_SYMBOL, 1.5),
    ];

    CostModel::from_entries(&entries, Some(3.0)).unwrap()
}
