use smallvec::SmallVec;

use crate::aligner::scoring::{CostModel, GAP_SYMBOL};
use crate::errors::MsaError;

/// Maximum number of sequences aligned at once
pub const MAX_SEQUENCES: usize = 6;

/// Maximum number of residues per sequence, such that a position fits in 10 bits
pub const MAX_SEQUENCE_LENGTH: usize = 1023;

#[derive(Clone, Debug)]
struct NamedSequence {
    name: String,
    residues: Vec<u8>,
}

/// The sequences to align, sorted by descending length.
#[derive(Clone, Debug)]
pub struct SequenceSet {
    sequences: Vec<NamedSequence>,
    lengths: SmallVec<[usize; MAX_SEQUENCES]>,
}

impl SequenceSet {
    /// Build a sequence set from `(name, residues)` records.
    ///
    /// Gap placeholders in the residues are removed, so previously aligned records can be used
    /// as input. Sorting by length is stable, ties keep their input order.
    pub fn new<I, N, S>(records: I) -> Result<Self, MsaError>
    where
        I: IntoIterator<Item=(N, S)>,
        N: Into<String>,
        S: AsRef<[u8]>,
    {
        let mut sequences: Vec<NamedSequence> = records.into_iter()
            .map(|(name, residues)| NamedSequence {
                name: name.into(),
                residues: residues.as_ref().iter()
                    .copied()
                    .filter(|&r| r != GAP_SYMBOL && r != b'.' && !r.is_ascii_whitespace())
                    .collect(),
            })
            .collect();

        if sequences.is_empty() {
            return Err(MsaError::NoSequences);
        }

        if sequences.len() > MAX_SEQUENCES {
            return Err(MsaError::TooManySequences(sequences.len(), MAX_SEQUENCES));
        }

        for seq in &sequences {
            if seq.residues.is_empty() {
                return Err(MsaError::EmptySequence(seq.name.clone()));
            }

            if seq.residues.len() > MAX_SEQUENCE_LENGTH {
                return Err(MsaError::SequenceTooLong(seq.name.clone(), seq.residues.len(), MAX_SEQUENCE_LENGTH));
            }
        }

        sequences.sort_by(|a, b| b.residues.len().cmp(&a.residues.len()));
        let lengths = sequences.iter().map(|s| s.residues.len()).collect();

        Ok(Self { sequences, lengths })
    }

    /// Check that every residue has an entry in the substitution table.
    pub fn validate_alphabet(&self, costs: &CostModel) -> Result<(), MsaError> {
        for seq in &self.sequences {
            if let Some(&residue) = seq.residues.iter().find(|&&r| !costs.contains_symbol(r)) {
                return Err(MsaError::UnknownResidue(seq.name.clone(), residue as char));
            }
        }

        Ok(())
    }

    #[inline]
    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    #[inline]
    pub fn sequence(&self, index: usize) -> &[u8] {
        &self.sequences[index].residues
    }

    #[inline]
    pub fn name(&self, index: usize) -> &str {
        &self.sequences[index].name
    }

    #[inline]
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn names(&self) -> impl Iterator<Item=&str> + '_ {
        self.sequences.iter().map(|s| s.name.as_str())
    }

    /// Index and length of the longest sequence
    pub fn longest(&self) -> (usize, usize) {
        (0, self.lengths[0])
    }

    /// Index and length of the second longest sequence, if there is more than one
    pub fn second_longest(&self) -> Option<(usize, usize)> {
        self.lengths.get(1).map(|&len| (1, len))
    }

    /// Total number of residues over all sequences
    pub fn total_residues(&self) -> usize {
        self.lengths.iter().sum()
    }
}
