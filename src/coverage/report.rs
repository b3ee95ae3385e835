//! Coverage report rendering (text, JSON, TSV).

use std::io::{self, Write};

use serde::Serialize;

use crate::core::contig::ChromosomeClass;
use crate::coverage::estimator::{genome_coverage, ChromosomeCoverage, ChromosomeEstimate};

/// Per-chromosome estimates and the genome-wide summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub chromosomes: Vec<ChromosomeEstimate>,
    /// Mean over autosomes with an estimate
    pub genome_coverage: Option<f64>,
    /// `genome_coverage` rounded to the nearest integer
    pub rounded_coverage: Option<u64>,
}

impl CoverageReport {
    #[must_use]
    pub fn new(chromosomes: Vec<ChromosomeEstimate>) -> Self {
        let genome = genome_coverage(&chromosomes);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = genome.map(|c| c.round() as u64);
        Self {
            chromosomes,
            genome_coverage: genome,
            rounded_coverage: rounded,
        }
    }

    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for estimate in &self.chromosomes {
            let class = match estimate.class {
                ChromosomeClass::Autosome => "",
                ChromosomeClass::Allosome => " (allosome, excluded)",
            };
            match &estimate.outcome {
                ChromosomeCoverage::Estimated {
                    coverage,
                    segments,
                    threshold,
                } => writeln!(
                    out,
                    "{}: {coverage:.2}x from {segments} segments > {threshold} bp{class}",
                    estimate.chromosome
                )?,
                ChromosomeCoverage::NoSegments { threshold } => writeln!(
                    out,
                    "{}: no data (no segments > {threshold} bp){class}",
                    estimate.chromosome
                )?,
                ChromosomeCoverage::MissingAnnotation => writeln!(
                    out,
                    "{}: no data (missing from annotation){class}",
                    estimate.chromosome
                )?,
                ChromosomeCoverage::MissingAlignments => writeln!(
                    out,
                    "{}: no data (missing from alignments){class}",
                    estimate.chromosome
                )?,
            }
        }

        writeln!(out)?;
        match (self.genome_coverage, self.rounded_coverage) {
            (Some(coverage), Some(rounded)) => {
                writeln!(out, "Genome coverage: {coverage:.2}x (rounded {rounded}x)")
            }
            _ => writeln!(out, "Genome coverage: no autosome has data"),
        }
    }

    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_json<W: Write>(&self, out: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)
    }

    /// One row per chromosome, then a `genome` row
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_tsv<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "chromosome\tclass\tstatus\tcoverage\tsegments\tthreshold")?;
        for estimate in &self.chromosomes {
            let class = match estimate.class {
                ChromosomeClass::Autosome => "autosome",
                ChromosomeClass::Allosome => "allosome",
            };
            let (status, coverage, segments, threshold) = match &estimate.outcome {
                ChromosomeCoverage::Estimated {
                    coverage,
                    segments,
                    threshold,
                } => (
                    "estimated",
                    format!("{coverage:.4}"),
                    segments.to_string(),
                    threshold.to_string(),
                ),
                ChromosomeCoverage::NoSegments { threshold } => (
                    "no_segments",
                    String::new(),
                    "0".to_string(),
                    threshold.to_string(),
                ),
                ChromosomeCoverage::MissingAnnotation => {
                    ("missing_annotation", String::new(), String::new(), String::new())
                }
                ChromosomeCoverage::MissingAlignments => {
                    ("missing_alignments", String::new(), String::new(), String::new())
                }
            };
            writeln!(
                out,
                "{}\t{class}\t{status}\t{coverage}\t{segments}\t{threshold}",
                estimate.chromosome
            )?;
        }

        let genome = self
            .genome_coverage
            .map(|c| format!("{c:.4}"))
            .unwrap_or_default();
        let rounded = self
            .rounded_coverage
            .map(|c| c.to_string())
            .unwrap_or_default();
        writeln!(out, "genome\tautosomes\trounded={rounded}\t{genome}\t\t")
    }
}
