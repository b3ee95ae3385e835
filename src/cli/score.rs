//! Score command - per-position k-mer count scores for a reference.
//!
//! Every window of length k is looked up in a count table and written as a
//! raw or binned mean, a quantized character, a run-length pair, or a single
//! per-contig average.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{debug, info};

use crate::cli::open_output;
use crate::core::provider::{KmerCountIndex, SequenceProvider};
use crate::core::region::GenomicRegion;
use crate::core::types::ScoreMode;
use crate::encoding::encoder::{EncoderConfig, KmerScoreEncoder};
use crate::encoding::writer::ScoreWriter;
use crate::parsing::kmer_table::KmerCountTable;
use crate::parsing::reference::ReferenceSet;
use crate::utils::validation::validate_score_flags;

/// Arguments for the score command
#[derive(Args)]
pub struct ScoreArgs {
    /// K-mer count table (see `table build`)
    #[arg(short = 'i', long = "table", required = true)]
    pub table: PathBuf,

    /// Reference FASTA (plain or gzip compressed)
    #[arg(short = 'f', long = "fasta", required = true)]
    pub fasta: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only score this region: chr or chr:begin-end (1-based, inclusive)
    #[arg(short, long)]
    pub region: Option<GenomicRegion>,

    /// Number of consecutive windows averaged into each value
    #[arg(long, default_value = "1")]
    pub bin: usize,

    /// Write quantized score characters instead of raw counts
    #[arg(long)]
    pub ascii: bool,

    /// Run-length encode the quantized scores (requires --bin 1)
    #[arg(long)]
    pub rle: bool,

    /// Write a single average per contig
    #[arg(long)]
    pub contig: bool,
}

/// Execute the score command
///
/// # Errors
///
/// Returns an error if the flags are inconsistent, an input cannot be read,
/// or the output cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ScoreArgs) -> anyhow::Result<()> {
    // Reject bad flag combinations before touching any file
    validate_score_flags(args.bin, args.rle, args.contig)?;
    let mode = ScoreMode::from_flags(args.ascii, args.rle, args.contig);

    let table = KmerCountTable::open(&args.table)
        .with_context(|| format!("Failed to open k-mer table {}", args.table.display()))?;
    let k = table.kmer_length();
    debug!(k, canonical = table.is_canonical(), "K-mer table");

    let reference = ReferenceSet::load(&args.fasta, args.region.as_ref().map(|r| r.contig.as_str()))
        .with_context(|| format!("Failed to load reference {}", args.fasta.display()))?;

    let config = EncoderConfig::default()
        .with_mode(mode)
        .with_bin_size(args.bin)
        .with_canonical(table.is_canonical());
    let encoder = KmerScoreEncoder::new(&reference, &table, k, config)?;

    let regions: Vec<GenomicRegion> = match &args.region {
        Some(region) => vec![region.clone()],
        None => reference
            .contigs()
            .iter()
            .map(|c| GenomicRegion::whole(c.name.clone()))
            .collect(),
    };

    let mut writer = ScoreWriter::new(open_output(args.output.as_deref())?);
    for region in &regions {
        let Some(scan) = encoder.scan(region)? else {
            continue;
        };
        let contig = scan.contig().to_string();
        let windows = scan.window_count();
        let written = writer
            .write_contig(&contig, mode, scan)
            .context("Failed to write scores")?;
        info!(contig = %contig, windows, written, "Scored contig");
    }
    writer.flush().context("Failed to write scores")?;

    Ok(())
}
