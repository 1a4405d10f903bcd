use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta::{self as fasta, record::{Definition, Sequence}, Record};

use crate::aligner::AlignmentResult;
use crate::errors::MsaError;
use crate::sequences::SequenceSet;

/// Open a possibly gzipped file for buffered reading.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, MsaError> {
    let is_gzipped = path
        .file_name()
        .map(|v| v.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false);

    let file = File::open(path)
        .map_err(|source| MsaError::FileReadError { source })?;

    // Check if we have a gzipped file
    let reader_inner: Box<dyn BufRead> = if is_gzipped {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(reader_inner)
}

/// Load the sequences to align from a FASTA file.
pub fn load_sequences(path: impl AsRef<Path>) -> Result<SequenceSet, MsaError> {
    read_sequences(open_input(path.as_ref())?)
}

pub fn read_sequences<R: BufRead>(reader_inner: R) -> Result<SequenceSet, MsaError> {
    let mut reader = fasta::io::Reader::new(reader_inner);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let name = String::from_utf8_lossy(record.name()).into_owned();
        let residues: &[u8] = record.sequence().as_ref();

        records.push((name, residues.to_vec()));
    }

    SequenceSet::new(records)
}

/// Write the aligned rows as FASTA records.
pub fn alignment_to_fasta<W: Write>(alignment: &AlignmentResult, output: W) -> Result<(), MsaError> {
    let mut writer = fasta::io::Writer::new(output);

    for (name, row) in alignment.names.iter().zip(&alignment.rows) {
        let header = Definition::new(name.as_str(), None);
        let seq = Sequence::from_iter(row.iter().copied());
        let record = Record::new(header, seq);

        writer.write_record(&record)?;
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{alignment_to_fasta, read_sequences};
    use crate::aligner::config::AlignmentConfig;
    use crate::aligner::scoring::CostModel;
    use crate::aligner::MsaAligner;
    use crate::errors::MsaError;

    #[test]
    fn test_read_sequences() {
        let input = b">seq1 first\nACG\nT\n>seq2\nA-GT\n";
        let seqs = read_sequences(Cursor::new(&input[..])).unwrap();

        assert_eq!(seqs.num_sequences(), 2);
        assert_eq!(seqs.name(0), "seq1");
        assert_eq!(seqs.sequence(0), b"ACGT");
        assert_eq!(seqs.sequence(1), b"AGT");
    }

    #[test]
    fn test_read_empty() {
        let seqs = read_sequences(Cursor::new(&b""[..]));
        assert!(matches!(seqs, Err(MsaError::NoSequences)));
    }

    #[test]
    fn test_fasta_output() {
        let seqs = read_sequences(Cursor::new(&b">x\nACGT\n>y\nAGT\n"[..])).unwrap();
        let costs = CostModel::uniform(b"ACGT", 1.0, 1.0, 2.0).unwrap();
        let result = MsaAligner::new(AlignmentConfig::default()).unwrap()
            .align(&seqs, &costs)
            .unwrap();

        let mut output = Vec::new();
        alignment_to_fasta(&result, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), ">x\nACGT\n>y\nA-GT\n");
    }
}
