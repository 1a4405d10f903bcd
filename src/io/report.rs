use std::io::Write;

use serde::Serialize;

use crate::aligner::astar::SearchStats;
use crate::aligner::config::AlignmentConfig;
use crate::aligner::AlignmentResult;
use crate::errors::MsaError;

const MSF_BLOCK_WIDTH: usize = 50;
const MSF_GROUP_WIDTH: usize = 10;

/// Write the alignment in MSF-style blocks of 50 columns, each row split into groups of ten.
pub fn alignment_to_msf<W: Write>(alignment: &AlignmentResult, mut output: W) -> Result<(), MsaError> {
    let name_width = alignment.names.iter()
        .map(|name| name.len())
        .max()
        .unwrap_or(0);

    writeln!(output, "//")?;

    for block_start in (0..alignment.num_columns()).step_by(MSF_BLOCK_WIDTH) {
        writeln!(output)?;

        for (name, row) in alignment.names.iter().zip(&alignment.rows) {
            let block_end = (block_start + MSF_BLOCK_WIDTH).min(row.len());
            let groups: Vec<String> = row[block_start..block_end]
                .chunks(MSF_GROUP_WIDTH)
                .map(|group| String::from_utf8_lossy(group).into_owned())
                .collect();

            writeln!(output, "{name:<name_width$}\t{}", groups.join(" "))?;
        }
    }

    Ok(())
}

/// Write one aligned row per line, without names.
pub fn alignment_to_plain<W: Write>(alignment: &AlignmentResult, mut output: W) -> Result<(), MsaError> {
    for row in &alignment.rows {
        output.write_all(row)?;
        writeln!(output)?;
    }

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct AlignmentReport<'a> {
    pub config: &'a AlignmentConfig,
    pub cost: f64,
    pub num_sequences: usize,
    pub num_columns: usize,
    pub names: &'a [String],
    pub stats: &'a SearchStats,
}

impl<'a> AlignmentReport<'a> {
    pub fn new(config: &'a AlignmentConfig, alignment: &'a AlignmentResult) -> Self {
        Self {
            config,
            cost: alignment.cost,
            num_sequences: alignment.rows.len(),
            num_columns: alignment.num_columns(),
            names: &alignment.names,
            stats: &alignment.stats,
        }
    }
}

/// Write the search configuration, alignment cost and search counters as JSON.
pub fn write_report_json<W: Write>(report: &AlignmentReport, output: W) -> Result<(), MsaError> {
    serde_json::to_writer_pretty(output, report)?;

    Ok(())
}
