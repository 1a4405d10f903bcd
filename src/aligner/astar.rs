use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info, span, Level};

use crate::aligner::heuristic::AstarHeuristic;
use crate::aligner::queue::{OpenList, QueuedNode};
use crate::aligner::scoring::CostModel;
use crate::aligner::state::{pack_position, unpack_position, GapState, LatticePosition, SearchNode, SearchTree, TreeIndexType};
use crate::aligner::successors::{Successor, SuccessorGenerator};
use crate::errors::MsaError;
use crate::sequences::SequenceSet;

const PROGRESS_INTERVAL: usize = 1_000_000;

/// Counters collected during the search
#[derive(Clone, Debug, Default, Serialize)]
pub struct SearchStats {
    /// Number of nodes popped from the open list and expanded
    pub expanded: usize,

    /// Number of distinct lattice states added to the search tree
    pub generated: usize,

    /// Number of children that reached an already known lattice state
    pub duplicates: usize,

    /// Number of already expanded nodes that were improved and queued again
    pub reopened: usize,

    /// Largest size of the open list
    pub max_open: usize,

    pub initial_h: f64,

    /// Number of moves on the optimal path
    pub solution_length: usize,
}

/// A node on the reconstructed path
#[derive(Clone, Debug)]
pub struct PathStep {
    pub pos: LatticePosition,
    pub gap_state: GapState,
    pub g: f64,
}

pub struct AstarResult {
    pub cost: f64,
    pub path: Vec<PathStep>,
    pub stats: SearchStats,
}

/// A* search over the alignment lattice.
///
/// Nodes live in an append-only search tree. Each `(position, gap state)` maps to exactly one
/// tree node through the closed map of its gap state, and each tree node has at most one entry in
/// the open list. When a cheaper path to a known state is found, the node is updated in place and
/// either moved within the open list or queued again.
pub struct AstarSearch<'a, H, Ix = u32>
where
    Ix: TreeIndexType,
{
    generator: SuccessorGenerator<'a, H>,
    num_seqs: usize,
    goal_packed: u64,

    tree: SearchTree<Ix>,
    open: OpenList<Ix>,
    closed: Vec<FxHashMap<u64, Ix>>,
    best_goal: Option<Ix>,
    stats: SearchStats,
}

impl<'a, H, Ix> AstarSearch<'a, H, Ix>
where
    H: AstarHeuristic,
    Ix: TreeIndexType + Ord,
{
    pub fn new(seqs: &'a SequenceSet, costs: &'a CostModel, heuristic: &'a H) -> Self {
        let num_seqs = seqs.num_sequences();

        Self {
            generator: SuccessorGenerator::new(seqs, costs, heuristic),
            num_seqs,
            goal_packed: pack_position(seqs.lengths()),
            tree: SearchTree::new(),
            open: OpenList::new(),
            closed: (0..GapState::num_states(num_seqs)).map(|_| FxHashMap::default()).collect(),
            best_goal: None,
            stats: SearchStats::default(),
        }
    }

    pub fn run(&mut self) -> Result<AstarResult, MsaError> {
        let span = span!(Level::INFO, "astar_search", num_seqs = self.num_seqs);
        let _enter = span.enter();

        let root_state = GapState::all(self.num_seqs);
        let root_h = self.generator.heuristic().initial_estimate();
        let root = self.tree.add_node(SearchNode::new_root(0, root_state));
        self.closed[root_state.index()].insert(0, root);
        self.open.push(QueuedNode::new(root_h, 0.0, root));

        self.stats.initial_h = root_h;
        self.stats.generated = 1;

        let mut children: Vec<Successor> = Vec::with_capacity(self.generator.operators().len());
        while let Some(item) = self.open.pop() {
            let node = self.tree.get_node(item.node);
            if self.best_goal == Some(item.node) || node.packed == self.goal_packed {
                self.best_goal = Some(item.node);
                let cost = node.g;
                let path = self.reconstruct_path(item.node);
                self.stats.solution_length = path.len() - 1;

                info!(cost, expanded = self.stats.expanded, generated = self.stats.generated,
                    duplicates = self.stats.duplicates, reopened = self.stats.reopened, "Goal confirmed");

                return Ok(AstarResult { cost, path, stats: self.stats.clone() });
            }

            self.stats.expanded += 1;
            if self.stats.expanded % PROGRESS_INTERVAL == 0 {
                debug!(expanded = self.stats.expanded, open = self.open.len(), f = item.f, "Search progress");
            }

            let pos = unpack_position(node.packed, self.num_seqs);
            let goal = self.generator.expand(&pos, node.gap_state, node.g, &mut children);

            for (i, child) in children.iter().enumerate() {
                let child_ix = self.merge(item.node, child);

                if goal == Some(i) {
                    self.update_best_goal(child_ix);
                }
            }

            self.stats.max_open = self.stats.max_open.max(self.open.len());
        }

        Err(MsaError::SearchExhausted)
    }

    /// Merge a generated child into the search tree, returning the tree node that now
    /// represents its lattice state.
    fn merge(&mut self, parent: Ix, child: &Successor) -> Ix {
        let closed = &mut self.closed[child.gap_state.index()];
        let existing = closed.get(&child.packed).copied();

        match existing {
            None => {
                let ix = self.tree.add_node(SearchNode::new(child.g, child.packed, child.gap_state, parent));
                closed.insert(child.packed, ix);
                self.open.push(QueuedNode::new(child.f, child.g, ix));
                self.stats.generated += 1;

                ix
            },
            Some(ix) => {
                self.stats.duplicates += 1;

                let node = self.tree.get_node_mut(ix);
                if node.g <= child.g {
                    return ix;
                }

                node.g = child.g;
                node.parent = Some(parent);

                let item = QueuedNode::new(child.f, child.g, ix);
                if !self.open.update(item) {
                    self.open.push(item);
                    self.stats.reopened += 1;
                }

                ix
            }
        }
    }

    fn update_best_goal(&mut self, candidate: Ix) {
        let improves = match self.best_goal {
            None => true,
            Some(best) => self.tree.get_node(candidate).g < self.tree.get_node(best).g,
        };

        if improves {
            self.best_goal = Some(candidate);
        }
    }

    fn reconstruct_path(&self, goal: Ix) -> Vec<PathStep> {
        self.tree.path_to(goal)
            .into_iter()
            .map(|ix| {
                let node = self.tree.get_node(ix);
                PathStep {
                    pos: unpack_position(node.packed, self.num_seqs),
                    gap_state: node.gap_state,
                    g: node.g,
                }
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::AstarSearch;
    use crate::aligner::heuristic::{AstarHeuristic, Dijkstra, DivConqHeuristic, PairwiseHeuristic, TripleHeuristic, Weighted};
    use crate::aligner::reference::{varied_costs, Exhaustive};
    use crate::aligner::scoring::{CostModel, Delta, GapTransitions};
    use crate::aligner::state::unpack_position;
    use crate::sequences::SequenceSet;

    const EPS: f64 = 1e-9;

    fn uniform(penalize: bool) -> CostModel {
        CostModel::uniform(b"ACGT", 1.0, 1.0, 2.0).unwrap()
            .with_terminal_gaps(penalize)
    }

    fn search_cost<H: AstarHeuristic>(seqs: &SequenceSet, costs: &CostModel, heuristic: &H) -> f64 {
        let mut search: AstarSearch<H> = AstarSearch::new(seqs, costs, heuristic);
        search.run().unwrap().cost
    }

    fn check_all_heuristics(seqs: &SequenceSet, costs: &CostModel) {
        let transitions = GapTransitions::new(costs);
        let optimal = Exhaustive::new(seqs, costs).optimal_cost();

        let cost = search_cost(seqs, costs, &Dijkstra);
        assert!((cost - optimal).abs() < EPS, "Dijkstra: {cost} vs {optimal}");

        let pairwise = PairwiseHeuristic::new(seqs, costs, &transitions);
        let cost = search_cost(seqs, costs, &pairwise);
        assert!((cost - optimal).abs() < EPS, "Pairwise: {cost} vs {optimal}");

        let triple: TripleHeuristic<f64> = TripleHeuristic::new(seqs, costs, &transitions);
        let cost = search_cost(seqs, costs, &triple);
        assert!((cost - optimal).abs() < EPS, "Triple: {cost} vs {optimal}");

        let triple_int: TripleHeuristic<i32> = TripleHeuristic::new(seqs, costs, &transitions);
        let cost = search_cost(seqs, costs, &triple_int);
        assert!((cost - optimal).abs() < EPS, "TripleInt: {cost} vs {optimal}");

        let divconq: DivConqHeuristic<f64> = DivConqHeuristic::new(seqs, costs, &transitions);
        let cost = search_cost(seqs, costs, &divconq);
        assert!((cost - optimal).abs() < EPS, "DivConq: {cost} vs {optimal}");
    }

    #[test]
    fn test_two_sequences() {
        let seqs = SequenceSet::new(vec![("a", "ACGT"), ("b", "AGT")]).unwrap();

        let penalized = uniform(true);
        assert_eq!(search_cost(&seqs, &penalized, &Dijkstra), 3.0);
        check_all_heuristics(&seqs, &penalized);

        let free = uniform(false);
        assert_eq!(search_cost(&seqs, &free, &Dijkstra), 2.0);
        check_all_heuristics(&seqs, &free);
    }

    #[test]
    fn test_three_sequences() {
        let seqs = SequenceSet::new(vec![("a", "ACGTA"), ("b", "AGTT"), ("c", "CGA")]).unwrap();
        for penalize in [true, false] {
            check_all_heuristics(&seqs, &uniform(penalize));
            check_all_heuristics(&seqs, &varied_costs().with_terminal_gaps(penalize));
        }
    }

    #[test]
    fn test_four_sequences() {
        let seqs = SequenceSet::new(vec![("a", "GATC"), ("b", "GTC"), ("c", "ATTC"), ("d", "GAC")]).unwrap();
        check_all_heuristics(&seqs, &uniform(true));
        check_all_heuristics(&seqs, &varied_costs().with_terminal_gaps(false));
    }

    #[test]
    fn test_single_sequence() {
        let costs = uniform(true);
        let seqs = SequenceSet::new(vec![("a", "ACGT")]).unwrap();
        let heuristic = Dijkstra;

        let mut search: AstarSearch<Dijkstra> = AstarSearch::new(&seqs, &costs, &heuristic);
        let result = search.run().unwrap();

        assert_eq!(result.cost, 0.0);
        assert_eq!(result.path.len(), 5);
        assert_eq!(result.stats.solution_length, 4);
        assert_eq!(result.path.last().map(|step| step.pos[0]), Some(4));
    }

    #[test]
    fn test_path_monotonic() {
        let costs = varied_costs();
        let transitions = GapTransitions::new(&costs);
        let seqs = SequenceSet::new(vec![("a", "ACGTAC"), ("b", "AGTTC"), ("c", "CGAT")]).unwrap();
        let heuristic = PairwiseHeuristic::new(&seqs, &costs, &transitions);

        let mut search: AstarSearch<PairwiseHeuristic> = AstarSearch::new(&seqs, &costs, &heuristic);
        let result = search.run().unwrap();

        let first = &result.path[0];
        assert!(first.pos.iter().all(|&p| p == 0));
        assert_eq!(first.g, 0.0);
        assert_eq!(result.path.last().map(|step| step.pos.as_slice()), Some(seqs.lengths()));
        assert!((result.path.last().unwrap().g - result.cost).abs() < EPS);

        let exhaustive = Exhaustive::new(&seqs, &costs);
        for step in result.path.windows(2) {
            assert!(step[1].g >= step[0].g);

            // Every step advances exactly the sequences of its gap state
            for i in 0..seqs.num_sequences() {
                let advanced = step[1].pos[i] - step[0].pos[i];
                assert_eq!(advanced == 1, step[1].gap_state.advanced(i));
                assert!(advanced <= 1);
            }

            let (_, edge) = exhaustive.edge_cost(&step[0].pos, step[0].gap_state, step[1].gap_state).unwrap();
            assert!(edge >= 0.0);
            assert!((step[1].g - step[0].g - edge).abs() < EPS);
        }

        assert!((result.cost - exhaustive.optimal_cost()).abs() < EPS);
        assert_eq!(result.stats.initial_h, heuristic.initial_estimate());
    }

    #[test]
    fn test_duplicate_merging() {
        let costs = uniform(true);
        let seqs = SequenceSet::new(vec![("a", "ACGTA"), ("b", "AGTT"), ("c", "CGTA")]).unwrap();
        let heuristic = Dijkstra;

        let mut search: AstarSearch<Dijkstra> = AstarSearch::new(&seqs, &costs, &heuristic);
        let result = search.run().unwrap();
        assert!(result.stats.duplicates > 0);

        // Every tree node is reachable through exactly one closed map entry with matching key
        let mut seen = vec![0usize; search.tree.num_nodes()];
        for (state, closed) in search.closed.iter().enumerate() {
            for (&packed, &ix) in closed.iter() {
                let node = search.tree.get_node(ix);
                assert_eq!(node.packed, packed);
                assert_eq!(node.gap_state.index(), state);
                seen[ix as usize] += 1;
            }
        }
        assert!(seen.iter().all(|&count| count == 1));

        // The node kept for a state is never worse than any child generated for it by an
        // expanded node
        let forward = Exhaustive::new(&seqs, &costs).forward_costs();
        let mut children = Vec::new();
        for ix in search.tree.node_indices() {
            let node = search.tree.get_node(ix);
            assert!(node.g + EPS >= forward[&(node.packed, node.gap_state)]);

            if search.open.contains(ix) || search.best_goal == Some(ix) {
                continue;
            }

            let pos = unpack_position(node.packed, seqs.num_sequences());
            search.generator.expand(&pos, node.gap_state, node.g, &mut children);
            for child in &children {
                let kept = search.closed[child.gap_state.index()][&child.packed];
                assert!(search.tree.get_node(kept).g <= child.g + EPS);
            }
        }
    }

    #[test]
    fn test_weighted_search() {
        let costs = uniform(true);
        let transitions = GapTransitions::new(&costs);
        let seqs = SequenceSet::new(vec![("a", "ACGTAC"), ("b", "AGTTC"), ("c", "CGAT")]).unwrap();
        let optimal = Exhaustive::new(&seqs, &costs).optimal_cost();

        let weighted = Weighted::new(PairwiseHeuristic::new(&seqs, &costs, &transitions), 2.0);
        let cost = search_cost(&seqs, &costs, &weighted);

        assert!(cost + EPS >= optimal);
        assert!(cost <= 2.0 * optimal + EPS);
    }

    /// Admissible but inconsistent: only every third anti-diagonal gets the pairwise estimate
    struct EveryThirdDiagonal(PairwiseHeuristic);

    impl AstarHeuristic for EveryThirdDiagonal {
        fn initial_estimate(&self) -> f64 {
            self.0.initial_estimate()
        }

        fn estimate(&self, pos: &[usize], deltas: &[Delta]) -> f64 {
            if pos.iter().sum::<usize>() % 3 == 0 {
                self.0.estimate(pos, deltas)
            } else {
                0.0
            }
        }
    }

    #[test]
    fn test_reopening() {
        let instances = [
            (vec![("a", "ACGTAC"), ("b", "AGTTC"), ("c", "CGAT")], varied_costs()),
            (vec![("a", "ACGTAC"), ("b", "AGTTC"), ("c", "CGAT")], varied_costs().with_terminal_gaps(false)),
            (vec![("a", "GATC"), ("b", "GTC"), ("c", "ATTC"), ("d", "GAC")], uniform(true)),
        ];

        let mut reopened = 0;
        for (records, costs) in instances {
            let seqs = SequenceSet::new(records).unwrap();
            let transitions = GapTransitions::new(&costs);
            let heuristic = EveryThirdDiagonal(PairwiseHeuristic::new(&seqs, &costs, &transitions));

            let mut search: AstarSearch<EveryThirdDiagonal> = AstarSearch::new(&seqs, &costs, &heuristic);
            let result = search.run().unwrap();

            let optimal = Exhaustive::new(&seqs, &costs).optimal_cost();
            assert!((result.cost - optimal).abs() < EPS, "{} vs {optimal}", result.cost);
            assert!((result.path.last().unwrap().g - result.cost).abs() < EPS);

            reopened += result.stats.reopened;
        }

        assert!(reopened > 0);
    }
}
