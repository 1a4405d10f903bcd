use core::fmt;
use std::hash::Hash;

use num::{FromPrimitive, Unsigned};
use smallvec::SmallVec;

use crate::sequences::MAX_SEQUENCES;

/// Number of bits used per sequence when packing a lattice position into a single word
pub const POSITION_BITS: u32 = 10;
const POSITION_MASK: u64 = (1 << POSITION_BITS) - 1;

/// How far the alignment has progressed into each sequence
pub type LatticePosition = SmallVec<[usize; MAX_SEQUENCES]>;

/// Pack a lattice position into a single word, the first sequence in the most significant bits.
#[inline]
pub fn pack_position(pos: &[usize]) -> u64 {
    pos.iter().fold(0, |word, &p| {
        debug_assert!((p as u64) <= POSITION_MASK);
        (word << POSITION_BITS) | p as u64
    })
}

pub fn unpack_position(word: u64, num_seqs: usize) -> LatticePosition {
    (0..num_seqs).rev()
        .map(|i| ((word >> (i as u32 * POSITION_BITS)) & POSITION_MASK) as usize)
        .collect()
}

/// Bitmask of the sequences that advanced on the move into a lattice position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct GapState(u8);

impl GapState {
    #[inline(always)]
    pub fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// Gap state where all `num_seqs` sequences advanced, used for the root of the search.
    pub fn all(num_seqs: usize) -> Self {
        Self(((1u16 << num_seqs) - 1) as u8)
    }

    /// Number of distinct gap states for the given number of sequences
    pub fn num_states(num_seqs: usize) -> usize {
        1 << num_seqs
    }

    #[inline(always)]
    pub fn advanced(&self, seq: usize) -> bool {
        self.0 & (1 << seq) != 0
    }

    #[inline(always)]
    pub fn bits(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// The advancing sequences, ascending
    pub fn members(&self) -> impl Iterator<Item=usize> + '_ {
        (0..u8::BITS as usize).filter(|&i| self.advanced(i))
    }
}

/// Allow for various index types to refer to the search tree nodes
pub trait TreeIndexType: Copy + Unsigned + FromPrimitive + Hash + fmt::Debug + Default + Eq {
    fn new(value: usize) -> Self;
    fn index(&self) -> usize;
}

impl TreeIndexType for usize {
    #[inline(always)]
    fn new(value: usize) -> Self {
        value
    }

    fn index(&self) -> usize {
        *self
    }
}

impl TreeIndexType for u32 {
    #[inline(always)]
    fn new(value: usize) -> Self {
        value as u32
    }

    #[inline(always)]
    fn index(&self) -> usize {
        *self as usize
    }
}

/// The search tree, storing every node generated during the A* search.
///
/// We use the "arena pattern" to define ownership: the tree owns all nodes, and parent links are
/// indices into the arena. Nodes are never removed, only updated in place when a cheaper path to
/// the same lattice state is found.
pub struct SearchTree<Ix = u32>
where
    Ix: TreeIndexType,
{
    nodes: Vec<SearchNode<Ix>>,
}

impl<Ix> SearchTree<Ix>
where
    Ix: TreeIndexType,
{
    pub fn new() -> Self {
        Self {
            nodes: Vec::default(),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_indices(&self) -> impl Iterator<Item=Ix> + '_ {
        (0..self.nodes.len()).map(|ix| Ix::new(ix))
    }

    #[inline(always)]
    pub fn get_node(&self, ix: Ix) -> &SearchNode<Ix> {
        &self.nodes[ix.index()]
    }

    #[inline(always)]
    pub fn get_node_mut(&mut self, ix: Ix) -> &mut SearchNode<Ix> {
        &mut self.nodes[ix.index()]
    }

    pub fn add_node(&mut self, node: SearchNode<Ix>) -> Ix {
        self.nodes.push(node);

        Ix::new(self.nodes.len() - 1)
    }

    /// Walk the parent links from `ix` back to the root, returning the node indices in
    /// root-to-`ix` order.
    pub fn path_to(&self, ix: Ix) -> Vec<Ix> {
        let mut path = vec![ix];
        let mut curr = ix;
        while let Some(parent) = self.get_node(curr).parent {
            path.push(parent);
            curr = parent;
        }

        path.reverse();
        path
    }
}

impl<Ix> Default for SearchTree<Ix>
where
    Ix: TreeIndexType,
{
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct SearchNode<Ix>
where
    Ix: TreeIndexType,
{
    /// Cost of the best known path from the root
    pub g: f64,

    /// The packed lattice position
    pub packed: u64,

    pub gap_state: GapState,
    pub parent: Option<Ix>,
}

impl<Ix> SearchNode<Ix>
where
    Ix: TreeIndexType,
{
    pub fn new_root(packed: u64, gap_state: GapState) -> Self {
        Self { g: 0.0, packed, gap_state, parent: None }
    }

    pub fn new(g: f64, packed: u64, gap_state: GapState, parent: Ix) -> Self {
        Self { g, packed, gap_state, parent: Some(parent) }
    }
}
