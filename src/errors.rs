use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

#[derive(Debug)]
pub enum MsaError {
    /// The input did not contain any sequences
    NoSequences,

    /// More sequences than the lattice can hold (found, maximum)
    TooManySequences(usize, usize),

    /// A sequence exceeds the maximum supported length (name, length, maximum)
    SequenceTooLong(String, usize, usize),

    /// A sequence without any residues
    EmptySequence(String),

    /// A residue that is not part of the substitution table (sequence name, residue)
    UnknownResidue(String, char),

    /// A cost table line that could not be parsed (line number, line)
    MalformedCostEntry(usize, String),

    /// The cost table lists differing costs for aligning a residue against a gap
    InconsistentLinearGapCost(f64, f64),

    /// Gap costs must be non-negative after normalization
    NegativeGapCost(f64),

    /// Invalid search configuration
    InvalidConfig(String),

    /// The open list ran empty before a goal was confirmed
    SearchExhausted,

    /// Error variant when we couldn't read from a file
    FileReadError { source: io::Error },

    /// Error variant when we could not serialize alignment statistics
    SerializationError { source: serde_json::Error },

    /// Other IO errors
    IOError(io::Error),
}

impl Error for MsaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            Self::FileReadError { ref source } => Some(source),
            Self::SerializationError { ref source } => Some(source),
            Self::IOError(ref source) => Some(source),
            _ => None
        }
    }
}

impl From<io::Error> for MsaError {
    fn from(value: io::Error) -> Self {
        Self::IOError(value)
    }
}

impl From<serde_json::Error> for MsaError {
    fn from(value: serde_json::Error) -> Self {
        Self::SerializationError {
            source: value
        }
    }
}


impl Display for MsaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::NoSequences =>
                write!(f, "No sequences found in the input!"),
            Self::TooManySequences(found, max) =>
                write!(f, "Found {found} sequences, but at most {max} can be aligned at once!"),
            Self::SequenceTooLong(ref name, len, max) =>
                write!(f, "Sequence '{name}' has length {len}, the maximum supported length is {max}!"),
            Self::EmptySequence(ref name) =>
                write!(f, "Sequence '{name}' does not contain any residues!"),
            Self::UnknownResidue(ref name, residue) =>
                write!(f, "Sequence '{name}' contains residue '{residue}' which is not in the substitution table!"),
            Self::MalformedCostEntry(line_no, ref line) =>
                write!(f, "Could not parse cost table line {line_no}: '{line}'"),
            Self::InconsistentLinearGapCost(first, other) =>
                write!(f, "Gap cost must be linear (found both {first} and {other})!"),
            Self::NegativeGapCost(cost) =>
                write!(f, "Gap costs must be non-negative, got {cost}!"),
            Self::InvalidConfig(ref msg) =>
                write!(f, "Invalid alignment configuration: {msg}"),
            Self::SearchExhausted =>
                write!(f, "The search space was exhausted without reaching the end of all sequences!"),
            Self::FileReadError { source: _ } =>
                write!(f, "Could not read from file!"),
            Self::SerializationError { source: _ } =>
                write!(f, "Could not serialize the alignment statistics!"),
            Self::IOError(ref err) =>
                err.fmt(f),
        }
    }
}
