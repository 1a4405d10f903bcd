use crate::sequences::SequenceSet;

/// Maps lattice positions onto a coarser abstract space, based on the progress in the two longest
/// sequences.
///
/// With abstraction level 2, a position is mapped to the row-major index of its coordinates in the
/// longest and second longest sequence, optionally reduced modulo `modulus`. Any other level maps
/// a position to its coordinate in the longest sequence.
#[derive(Clone, Debug)]
pub struct LatticeProjection {
    longest: usize,
    second: Option<usize>,
    cols: usize,
    modulus: usize,
    size: usize,
    two_dimensional: bool,
}

impl LatticeProjection {
    pub fn new(abstraction: usize, modulus: usize, seqs: &SequenceSet) -> Self {
        let (longest, longest_len) = seqs.longest();
        let second = seqs.second_longest();

        let rows = longest_len + 1;
        let cols = second.map_or(1, |(_, len)| len + 1);
        let two_dimensional = abstraction == 2;

        let size = if two_dimensional {
            if modulus > 0 { modulus } else { rows * cols }
        } else {
            rows
        };

        Self {
            longest,
            second: second.map(|(ix, _)| ix),
            cols,
            modulus,
            size,
            two_dimensional,
        }
    }

    /// Abstract state id of a lattice position, in `0..size()`
    pub fn project(&self, pos: &[usize]) -> usize {
        if !self.two_dimensional {
            return pos[self.longest];
        }

        let y = self.second.map_or(0, |s| pos[s]);
        let id = pos[self.longest] * self.cols + y;

        if self.modulus > 0 { id % self.modulus } else { id }
    }

    /// Number of distinct abstract states
    pub fn size(&self) -> usize {
        self.size
    }
}
