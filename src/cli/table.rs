use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};

use crate::cli::{open_output, OutputFormat};
use crate::parsing::kmer_table::{KmerCountTable, TableBuilder, TableInfo};

#[derive(Args)]
pub struct TableArgs {
    #[command(subcommand)]
    pub command: TableCommands,
}

#[derive(Subcommand)]
pub enum TableCommands {
    /// Build a count table from a Jellyfish text dump
    Build {
        /// Dump file (`KMER COUNT` columns or `>COUNT` / `KMER` records)
        #[arg(required = true)]
        dump: PathBuf,

        /// Output table path
        #[arg(short, long, required = true)]
        output: PathBuf,

        /// Merge each k-mer with its reverse complement
        #[arg(long)]
        canonical: bool,
    },

    /// Show the header and size of a count table
    Info {
        /// Table path
        #[arg(required = true)]
        table: PathBuf,
    },
}

/// Execute a table subcommand
///
/// # Errors
///
/// Returns an error if the dump or table cannot be read or written.
pub fn run(args: TableArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        TableCommands::Build {
            dump,
            output,
            canonical,
        } => {
            let info = build(&dump, &output, canonical)?;
            print_info(&info, format)
        }
        TableCommands::Info { table } => {
            let opened = KmerCountTable::open(&table)
                .with_context(|| format!("Failed to open k-mer table {}", table.display()))?;
            print_info(&opened.info(&table), format)
        }
    }
}

fn build(dump: &Path, output: &Path, canonical: bool) -> anyhow::Result<TableInfo> {
    let reader = File::open(dump)
        .map(BufReader::new)
        .with_context(|| format!("Failed to open dump {}", dump.display()))?;

    let mut builder = TableBuilder::new(canonical);
    builder
        .read_dump(reader)
        .with_context(|| format!("Failed to parse dump {}", dump.display()))?;
    if builder.skipped() > 0 {
        tracing::warn!(
            skipped = builder.skipped(),
            "Skipped k-mers containing bases other than A, C, G, T"
        );
    }

    builder
        .write(output)
        .with_context(|| format!("Failed to write table {}", output.display()))
}

fn print_info(info: &TableInfo, format: OutputFormat) -> anyhow::Result<()> {
    let mut out = open_output(None)?;
    match format {
        OutputFormat::Text => {
            writeln!(out, "Table:       {}", info.path.display())?;
            writeln!(out, "Kind:        {}", info.kind)?;
            writeln!(out, "K-mer size:  {} ({} bits)", info.kmer_length, info.key_length)?;
            writeln!(out, "Canonical:   {}", if info.canonical { "yes" } else { "no" })?;
            writeln!(out, "Entries:     {}", info.entries)?;
            writeln!(out, "Total count: {}", info.total_count)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, info)?;
            writeln!(out)?;
        }
        OutputFormat::Tsv => {
            writeln!(out, "path\tkind\tk\tcanonical\tentries\ttotal_count")?;
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                info.path.display(),
                info.kind,
                info.kmer_length,
                info.canonical,
                info.entries,
                info.total_count
            )?;
        }
    }
    out.flush()?;
    Ok(())
}
