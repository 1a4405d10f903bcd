use std::io::BufRead;
use std::path::Path;

use crate::aligner::scoring::{CostEntry, CostModel, GAP_SYMBOL};
use crate::errors::MsaError;
use crate::io::fasta::open_input;

/// The contents of a substitution table file
#[derive(Clone, Debug, Default)]
pub struct CostTable {
    pub entries: Vec<CostEntry>,

    /// Gap-open cost, given by the line starting with the gap symbol
    pub affine_gap: Option<f64>,
}

impl CostTable {
    pub fn into_cost_model(self) -> Result<CostModel, MsaError> {
        CostModel::from_entries(&self.entries, self.affine_gap)
    }
}

/// Parse a substitution table.
///
/// Each line holds `symbol symbol cost`. A line `- cost` gives the gap-open cost, and lines pairing
/// a symbol with `-` give the linear gap cost. Empty lines and lines starting with `#` are
/// skipped.
pub fn parse_cost_table<R: BufRead>(reader: R) -> Result<CostTable, MsaError> {
    let mut table = CostTable::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let malformed = || MsaError::MalformedCostEntry(line_no + 1, line.clone());
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let first = fields[0].as_bytes()[0].to_ascii_uppercase();

        if first == GAP_SYMBOL {
            if fields.len() != 2 {
                return Err(malformed());
            }

            let cost = fields[1].parse::<f64>().map_err(|_| malformed())?;
            table.affine_gap = Some(cost);
            continue;
        }

        if fields.len() != 3 {
            return Err(malformed());
        }

        let second = fields[1].as_bytes()[0].to_ascii_uppercase();
        let cost = fields[2].parse::<f64>().map_err(|_| malformed())?;

        table.entries.push(CostEntry::new(first, second, cost));
    }

    Ok(table)
}

pub fn load_cost_model(path: impl AsRef<Path>) -> Result<CostModel, MsaError> {
    parse_cost_table(open_input(path.as_ref())?)?
        .into_cost_model()
}
