use std::cmp::Ordering;

use nonmax::NonMaxU32;

use crate::aligner::state::TreeIndexType;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueuedNode<Ix> {
    pub f: f64,
    pub g: f64,
    pub node: Ix,
}

impl<Ix> QueuedNode<Ix>
where
    Ix: TreeIndexType + Ord,
{
    pub fn new(f: f64, g: f64, node: Ix) -> Self {
        Self { f, g, node }
    }

    /// Expansion order: lowest `f` first, ties broken by highest `g`, then by node index such
    /// that the order is total.
    #[inline]
    fn priority_cmp(&self, other: &Self) -> Ordering {
        self.f.total_cmp(&other.f)
            .then_with(|| other.g.total_cmp(&self.g))
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Binary min-heap of search tree nodes supporting in-place priority updates.
///
/// Each search tree node has at most one entry in the queue. The heap position of each node is
/// tracked such that an improved node can be moved to its new place instead of being inserted a
/// second time.
#[derive(Default)]
pub struct OpenList<Ix> {
    heap: Vec<QueuedNode<Ix>>,
    slots: Vec<Option<NonMaxU32>>,
}

impl<Ix> OpenList<Ix>
where
    Ix: TreeIndexType + Ord,
{
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            slots: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: Ix) -> bool {
        self.slot(node).is_some()
    }

    #[inline]
    fn slot(&self, node: Ix) -> Option<usize> {
        self.slots.get(node.index())
            .copied()
            .flatten()
            .map(|slot| slot.get() as usize)
    }

    fn set_slot(&mut self, node: Ix, slot: Option<usize>) {
        let ix = node.index();
        if ix >= self.slots.len() {
            self.slots.resize(ix + 1, None);
        }

        self.slots[ix] = slot.map(|s| NonMaxU32::new(s as u32)
            .unwrap_or_else(|| panic!("Open list too large!")));
    }

    /// Insert a node, or update its priority if it is already queued.
    pub fn push(&mut self, item: QueuedNode<Ix>) {
        if let Some(slot) = self.slot(item.node) {
            self.heap[slot] = item;
            self.restore(slot);
            return;
        }

        let slot = self.heap.len();
        self.heap.push(item);
        self.set_slot(item.node, Some(slot));
        self.sift_up(slot);
    }

    /// Update the priority of a queued node. Returns false if the node is not in the queue.
    pub fn update(&mut self, item: QueuedNode<Ix>) -> bool {
        match self.slot(item.node) {
            Some(slot) => {
                self.heap[slot] = item;
                self.restore(slot);
                true
            },
            None => false
        }
    }

    pub fn pop(&mut self) -> Option<QueuedNode<Ix>> {
        if self.heap.is_empty() {
            return None;
        }

        let top = self.heap.swap_remove(0);
        self.set_slot(top.node, None);

        if !self.heap.is_empty() {
            let moved = self.heap[0].node;
            self.set_slot(moved, Some(0));
            self.sift_down(0);
        }

        Some(top)
    }

    pub fn peek(&self) -> Option<&QueuedNode<Ix>> {
        self.heap.first()
    }

    fn restore(&mut self, slot: usize) {
        let slot = self.sift_up(slot);
        self.sift_down(slot);
    }

    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.heap[slot].priority_cmp(&self.heap[parent]) != Ordering::Less {
                break;
            }

            self.swap(slot, parent);
            slot = parent;
        }

        slot
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < self.heap.len() && self.heap[left].priority_cmp(&self.heap[smallest]) == Ordering::Less {
                smallest = left;
            }

            if right < self.heap.len() && self.heap[right].priority_cmp(&self.heap[smallest]) == Ordering::Less {
                smallest = right;
            }

            if smallest == slot {
                break;
            }

            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.set_slot(self.heap[a].node, Some(a));
        self.set_slot(self.heap[b].node, Some(b));
    }
}
