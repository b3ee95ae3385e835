//! Command-line interface for kmer-coverage.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **score**: Write per-position k-mer count scores for a reference
//! - **coverage**: Estimate sequencing coverage from uniquely mappable segments
//! - **table**: Build or inspect k-mer count tables
//!
//! ## Usage
//!
//! ```text
//! # Build a count table from a Jellyfish dump
//! kmer-coverage table build counts.txt -o counts.kct --canonical
//!
//! # Quantized annotation of a whole reference
//! kmer-coverage score -i counts.kct -f ref.fa --ascii -o annotation.fa
//!
//! # Run-length scores over a region
//! kmer-coverage score -i counts.kct -f ref.fa -r chr1:1,000,000-2,000,000 --rle
//!
//! # Coverage estimate as JSON
//! kmer-coverage coverage --bam sample.bam --annotation annotation.fa --format json
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

pub mod coverage;
pub mod score;
pub mod table;

#[derive(Parser)]
#[command(name = "kmer-coverage")]
#[command(version)]
#[command(about = "K-mer count scores and coverage estimation from unique segments")]
#[command(
    long_about = "kmer-coverage scores every reference position by how often its k-mer occurs, and uses long runs of unique k-mers to estimate sequencing coverage from a BAM file.\n\nIt provides:\n- Raw, binned, quantized and run-length score streams\n- Per-chromosome and genome-wide coverage estimates\n- Memory-mapped k-mer count tables built from Jellyfish dumps"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for reports
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write k-mer count scores for each reference position
    Score(score::ScoreArgs),

    /// Estimate sequencing coverage from an annotation and a BAM file
    Coverage(coverage::CoverageArgs),

    /// Build or inspect k-mer count tables
    Table(table::TableArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Buffered writer to `path`, or to stdout when no path is given
///
/// # Errors
///
/// Returns an error if the output file cannot be created.
pub fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
