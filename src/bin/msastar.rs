use std::fs;
use std::fs::File;
use std::io::{self, stdout, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use tracing::{info, span, Level};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use msastar::aligner::config::{AlignmentConfig, HeuristicKind};
use msastar::aligner::projection::LatticeProjection;
use msastar::aligner::scoring::CostModel;
use msastar::aligner::MsaAligner;
use msastar::io::fasta::alignment_to_fasta;
use msastar::io::report::{alignment_to_msf, alignment_to_plain, write_report_json, AlignmentReport};
use msastar::io::{load_cost_model, load_sequences};
use msastar::sequences::SequenceSet;

trait Output: Write + IsTerminal {}
impl<T> Output for T where T: Write + IsTerminal {}

/// The various output formats supported by msastar
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputType {
    /// Aligned sequences in FASTA format
    Fasta,

    /// MSF-style blocks of 50 columns
    Msf,

    /// One aligned row per line
    Plain,
}

/// Lower bound used to guide the A* search
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum HeuristicArg {
    /// No lower bound, plain Dijkstra search
    Dijkstra,

    /// Sum of pairwise alignment costs
    Pairwise,

    /// Three-way alignment costs of consecutive groups of three sequences
    Triple,

    /// Three-way tables with integer costs
    TripleInt,

    /// Three-way tables for each group of three, pairwise tables for the remaining pairs
    DivConq,

    /// Divide and conquer with integer three-way tables
    DivConqInt,
}

impl From<HeuristicArg> for HeuristicKind {
    fn from(value: HeuristicArg) -> Self {
        match value {
            HeuristicArg::Dijkstra => HeuristicKind::Dijkstra,
            HeuristicArg::Pairwise => HeuristicKind::Pairwise,
            HeuristicArg::Triple => HeuristicKind::Triple,
            HeuristicArg::TripleInt => HeuristicKind::TripleInt,
            HeuristicArg::DivConq => HeuristicKind::DivConq,
            HeuristicArg::DivConqInt => HeuristicKind::DivConqInt,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct CliArgs {
    /// Set verbosity level. Use multiple times to increase the verbosity level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<CliSubcommand>,
}

#[derive(Subcommand, Debug)]
enum CliSubcommand {
    /// Compute an optimal multiple sequence alignment
    Align(AlignArgs),

    /// Print sequence set statistics
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// Sequences to align in FASTA format (at most 6, optionally gzipped).
    #[clap(help_heading = "Inputs")]
    sequences: PathBuf,

    /// Substitution cost table. If not given, a uniform cost scheme is built from the
    /// mismatch and gap costs below.
    #[arg(short = 'c', long)]
    #[clap(help_heading = "Inputs")]
    costs: Option<PathBuf>,

    /// Output filename. If not given, defaults to stdout
    #[arg(short, long)]
    #[clap(help_heading = "Outputs")]
    output: Option<PathBuf>,

    /// Output file type.
    #[arg(value_enum, short = 'O', long, default_value = "fasta")]
    #[clap(help_heading = "Outputs")]
    output_type: OutputType,

    /// Write search statistics as JSON to the given file
    #[arg(short, long)]
    #[clap(help_heading = "Outputs")]
    stats: Option<PathBuf>,

    /// Heuristic used to guide the search
    #[arg(value_enum, short = 'H', long, default_value = "pairwise")]
    #[clap(help_heading = "Search configuration")]
    heuristic: HeuristicArg,

    /// Multiply each heuristic estimate by this factor. Values above 1 give up the
    /// optimality guarantee in exchange for a faster search.
    #[arg(short, long, default_value = "1.0")]
    #[clap(help_heading = "Search configuration")]
    weight: f64,

    /// Do not charge the gap-open cost for gaps at the start or end of a sequence
    #[arg(short = 'q', long)]
    #[clap(help_heading = "Alignment configuration")]
    free_terminal_gaps: bool,

    /// Cost of aligning two different residues
    #[arg(short = 'n', long, default_value = "1")]
    #[clap(help_heading = "Alignment configuration")]
    cost_mismatch: f64,

    /// Cost of aligning a residue against a gap
    #[arg(short = 'e', long, default_value = "1")]
    #[clap(help_heading = "Alignment configuration")]
    cost_gap_extend: f64,

    /// Additional cost for opening a gap
    #[arg(short = 'g', long, default_value = "2")]
    #[clap(help_heading = "Alignment configuration")]
    cost_gap_open: f64,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Sequences in FASTA format
    sequences: PathBuf,
}

/// Build our tracing subscriber with stderr logging.
fn init_logging(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(filter_layer);

    Registry::default().with(stderr_log).init();

    Ok(())
}

fn uniform_costs(seqs: &SequenceSet, align_args: &AlignArgs) -> Result<CostModel> {
    let alphabet: Vec<u8> = (0..seqs.num_sequences())
        .flat_map(|i| seqs.sequence(i).iter().map(|c| c.to_ascii_uppercase()))
        .sorted_unstable()
        .dedup()
        .collect();

    let costs = CostModel::uniform(
        &alphabet,
        align_args.cost_mismatch,
        align_args.cost_gap_extend,
        align_args.cost_gap_open
    )?;

    Ok(costs)
}

fn create_output(path: Option<&PathBuf>) -> Result<Box<dyn Output>> {
    let writer: Box<dyn Output> = if let Some(path) = path {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?
        }

        let file = File::create(path)
            .with_context(|| format!("Could not create output file {}", path.display()))?;
        Box::new(file) as Box<dyn Output>
    } else {
        Box::new(stdout()) as Box<dyn Output>
    };

    Ok(writer)
}

fn align_subcommand(align_args: &AlignArgs) -> Result<()> {
    let span = span!(Level::INFO, "align_subcommand");
    let _enter = span.enter();

    let seqs = load_sequences(&align_args.sequences)
        .with_context(|| format!("Could not load sequences from {}", align_args.sequences.display()))?;

    let costs = if let Some(path) = &align_args.costs {
        load_cost_model(path)
            .with_context(|| format!("Could not load cost table from {}", path.display()))?
    } else {
        uniform_costs(&seqs, align_args)?
    };

    let config = AlignmentConfig::new(align_args.heuristic.into())
        .with_weight(align_args.weight)
        .with_terminal_gaps(!align_args.free_terminal_gaps);

    let aligner = MsaAligner::new(config)?;
    let alignment = aligner.align(&seqs, &costs)?;

    info!(cost = alignment.cost, columns = alignment.num_columns(),
        expanded = alignment.stats.expanded, "Alignment done");

    let mut writer = create_output(align_args.output.as_ref())?;
    match align_args.output_type {
        OutputType::Fasta => alignment_to_fasta(&alignment, &mut writer)?,
        OutputType::Msf => alignment_to_msf(&alignment, &mut writer)?,
        OutputType::Plain => alignment_to_plain(&alignment, &mut writer)?,
    }

    if let Some(path) = &align_args.stats {
        let file = File::create(path)
            .with_context(|| format!("Could not create statistics file {}", path.display()))?;
        write_report_json(&AlignmentReport::new(aligner.config(), &alignment), file)?;
    }

    Ok(())
}

fn stats_subcommand(stats_args: &StatsArgs) -> Result<()> {
    let seqs = load_sequences(&stats_args.sequences)
        .with_context(|| format!("Could not load sequences from {}", stats_args.sequences.display()))?;

    println!("num_sequences: {}", seqs.num_sequences());
    println!("total_residues: {}", seqs.total_residues());

    for (name, len) in seqs.names().zip(seqs.lengths()) {
        println!("length\t{name}\t{len}");
    }

    let (longest, longest_len) = seqs.longest();
    println!("longest: {} ({longest_len})", seqs.name(longest));

    if let Some((second, second_len)) = seqs.second_longest() {
        println!("second_longest: {} ({second_len})", seqs.name(second));
    }

    let projection = LatticeProjection::new(2, 0, &seqs);
    println!("projected_states: {}", projection.size());

    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose)?;

    match &args.command {
        Some(CliSubcommand::Align(v)) => align_subcommand(v)?,
        Some(CliSubcommand::Stats(v)) => stats_subcommand(v)?,
        None => return Err(anyhow!("No subcommand given.")),
    };

    Ok(())
}
