//! Coverage command - estimate sequencing coverage from unique segments.
//!
//! The annotation produced by `score --ascii` marks unique k-mers with `"`;
//! long runs of them are segments where every read maps unambiguously, so
//! matched bases per segment base approximate depth.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::cli::{open_output, OutputFormat};
use crate::core::contig::ChromosomeSet;
use crate::coverage::estimator::CoverageEstimator;
use crate::coverage::report::CoverageReport;
use crate::coverage::segments::SegmentSearch;
use crate::parsing::annotation::Annotation;
use crate::parsing::bam::BamAlignments;
use crate::utils::validation::ConfigError;

/// Arguments for the coverage command
#[derive(Args)]
pub struct CoverageArgs {
    /// Indexed BAM file (`<bam>.bai` or `<stem>.bai` must exist)
    #[arg(long, required = true)]
    pub bam: PathBuf,

    /// Annotation FASTA of quantized k-mer scores (from `score --ascii`)
    #[arg(long, required = true)]
    pub annotation: PathBuf,

    /// Chromosomes averaged into the genome coverage (bare names)
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17,18,19,20,21,22"
    )]
    pub autosomes: Vec<String>,

    /// Chromosomes reported but excluded from the genome coverage
    #[arg(long, value_delimiter = ',', default_value = "X,Y")]
    pub allosomes: Vec<String>,

    /// Segment length threshold before the first halving
    #[arg(long, default_value = "20000")]
    pub initial_region_size: usize,

    /// Stop relaxing the threshold once it is no longer above this size
    #[arg(long, default_value = "2000")]
    pub region_size_floor: usize,

    /// Segments wanted per chromosome before relaxing stops
    #[arg(long, default_value = "10")]
    pub min_segments: usize,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the coverage command
///
/// # Errors
///
/// Returns an error if the parameters are invalid, an input cannot be read,
/// or the report cannot be written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: CoverageArgs, format: OutputFormat) -> anyhow::Result<()> {
    let search = SegmentSearch::default()
        .with_initial_region_size(args.initial_region_size)
        .with_region_size_floor(args.region_size_floor)
        .with_min_segments(args.min_segments);
    search.validate()?;

    let chromosomes = ChromosomeSet::new(
        args.autosomes.iter().filter(|s| !s.is_empty()).cloned(),
        args.allosomes.iter().filter(|s| !s.is_empty()).cloned(),
    );
    if chromosomes.is_empty() {
        return Err(ConfigError::NoChromosomes.into());
    }

    let mut alignments = BamAlignments::open(&args.bam)
        .with_context(|| format!("Failed to open alignments {}", args.bam.display()))?;
    let annotation = Annotation::open(&args.annotation)
        .with_context(|| format!("Failed to open annotation {}", args.annotation.display()))?;

    let targets: Vec<&str> = chromosomes.names().collect();
    let annotation_naming = annotation.naming(&targets);

    let mut estimator =
        CoverageEstimator::new(&mut alignments, &chromosomes, search, annotation_naming);
    info!(
        annotation = %annotation_naming,
        alignments = %estimator.alignment_naming(),
        chromosomes = chromosomes.len(),
        "Estimating coverage"
    );

    for record in annotation
        .records()
        .with_context(|| format!("Failed to read annotation {}", args.annotation.display()))?
    {
        let record = record.context("Failed to read annotation record")?;
        estimator
            .add_record(&record.name, &record.sequence)
            .with_context(|| format!("Failed to query alignments for {}", record.name))?;
    }

    let report = CoverageReport::new(estimator.finish());
    if report.genome_coverage.is_none() {
        warn!("No autosome produced a coverage estimate");
    }

    let mut out = open_output(args.output.as_deref())?;
    let written = match format {
        OutputFormat::Text => report.write_text(&mut out),
        OutputFormat::Json => report.write_json(&mut out),
        OutputFormat::Tsv => report.write_tsv(&mut out),
    };
    written
        .and_then(|()| out.flush())
        .context("Failed to write coverage report")?;

    Ok(())
}
