//! Per-chromosome and genome-wide coverage from unique segments.
//!
//! For each chromosome the annotation is searched for long sentinel runs
//! (see [`SegmentSearch`]); every alignment overlapping a segment contributes
//! its matched bases, and the segment's depth is the matched-base total over
//! the segment length. A chromosome's coverage is the mean segment depth and
//! the genome's is the mean over autosomes.

use std::collections::{HashMap, HashSet};
use std::io;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::contig::{ChromosomeClass, ChromosomeSet};
use crate::core::provider::AlignmentProvider;
use crate::core::region::GenomicRegion;
use crate::core::types::NamingConvention;
use crate::coverage::segments::{Segment, SegmentSearch};

/// Outcome of estimating one chromosome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChromosomeCoverage {
    Estimated {
        coverage: f64,
        segments: usize,
        threshold: usize,
    },
    /// The search reached its floor without a single qualifying segment
    NoSegments { threshold: usize },
    /// The annotation has no record for this chromosome
    MissingAnnotation,
    /// The alignment header has no reference for this chromosome
    MissingAlignments,
}

impl ChromosomeCoverage {
    #[must_use]
    pub fn coverage(&self) -> Option<f64> {
        match self {
            Self::Estimated { coverage, .. } => Some(*coverage),
            _ => None,
        }
    }
}

/// A chromosome together with its estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChromosomeEstimate {
    pub chromosome: String,
    pub class: ChromosomeClass,
    #[serde(flatten)]
    pub outcome: ChromosomeCoverage,
}

/// Matched bases of mapped alignments overlapping `segment`, divided by its
/// length.
///
/// # Errors
///
/// Returns any error raised while querying or decoding alignments.
pub fn segment_depth<A>(alignments: &mut A, contig: &str, segment: Segment) -> io::Result<f64>
where
    A: AlignmentProvider + ?Sized,
{
    if segment.is_empty() {
        return Ok(0.0);
    }

    let region = GenomicRegion::new(contig, segment.start, segment.end);
    let mut matched = 0u64;
    let mut reads = 0u64;
    for read in alignments.query(&region)? {
        let read = read?;
        if !read.mapped {
            continue;
        }
        matched += read.matched_bases();
        reads += 1;
    }

    debug!(
        contig,
        start = segment.start,
        end = segment.end,
        reads,
        matched,
        "Segment depth"
    );

    #[allow(clippy::cast_precision_loss)]
    Ok(matched as f64 / segment.len() as f64)
}

/// Estimate coverage of one chromosome from its annotation.
///
/// `contig` is the chromosome's name in the alignment file.
///
/// # Errors
///
/// Returns any error raised while querying alignments.
pub fn estimate_chromosome_coverage<A>(
    annotation: &[u8],
    contig: &str,
    alignments: &mut A,
    search: &SegmentSearch,
) -> io::Result<ChromosomeCoverage>
where
    A: AlignmentProvider + ?Sized,
{
    let selection = search.run(annotation);
    if selection.segments.is_empty() {
        return Ok(ChromosomeCoverage::NoSegments {
            threshold: selection.threshold,
        });
    }

    let mut total = 0.0;
    for &segment in &selection.segments {
        total += segment_depth(alignments, contig, segment)?;
    }

    #[allow(clippy::cast_precision_loss)]
    let coverage = total / selection.segments.len() as f64;
    Ok(ChromosomeCoverage::Estimated {
        coverage,
        segments: selection.segments.len(),
        threshold: selection.threshold,
    })
}

/// Mean coverage over autosomes with an estimate; `None` if there are none
#[must_use]
pub fn genome_coverage(estimates: &[ChromosomeEstimate]) -> Option<f64> {
    let autosomal: Vec<f64> = estimates
        .iter()
        .filter(|e| e.class == ChromosomeClass::Autosome)
        .filter_map(|e| e.outcome.coverage())
        .collect();

    if autosomal.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    Some(autosomal.iter().sum::<f64>() / autosomal.len() as f64)
}

/// Drives estimation over an annotation streamed one record at a time.
///
/// Records are matched to the chromosome set by their bare name, so the
/// annotation and the alignments may use different naming conventions.
pub struct CoverageEstimator<'a, A: ?Sized> {
    alignments: &'a mut A,
    chromosomes: &'a ChromosomeSet,
    search: SegmentSearch,
    annotation_naming: NamingConvention,
    alignment_naming: NamingConvention,
    references: HashSet<String>,
    classes: HashMap<String, ChromosomeClass>,
    results: HashMap<String, ChromosomeCoverage>,
}

impl<'a, A> CoverageEstimator<'a, A>
where
    A: AlignmentProvider + ?Sized,
{
    /// Create an estimator, probing the alignment naming convention from the
    /// provider's reference names.
    pub fn new(
        alignments: &'a mut A,
        chromosomes: &'a ChromosomeSet,
        search: SegmentSearch,
        annotation_naming: NamingConvention,
    ) -> Self {
        let targets: Vec<&str> = chromosomes.names().collect();
        let reference_names = alignments.reference_names();
        let alignment_naming =
            NamingConvention::probe(reference_names.iter().map(String::as_str), &targets);
        debug!(%annotation_naming, %alignment_naming, "Resolved naming conventions");

        let classes = chromosomes
            .iter()
            .map(|(name, class)| (name.to_string(), class))
            .collect();

        Self {
            alignments,
            chromosomes,
            search,
            annotation_naming,
            alignment_naming,
            references: reference_names.into_iter().collect(),
            classes,
            results: HashMap::new(),
        }
    }

    #[must_use]
    pub fn alignment_naming(&self) -> NamingConvention {
        self.alignment_naming
    }

    /// Estimate one annotation record; records outside the chromosome set are
    /// ignored and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns any error raised while querying alignments.
    pub fn add_record(
        &mut self,
        name: &str,
        annotation: &[u8],
    ) -> io::Result<Option<&ChromosomeCoverage>> {
        let bare = self.annotation_naming.strip(name);
        if !self.classes.contains_key(bare) {
            debug!(record = name, "Skipping annotation record outside chromosome set");
            return Ok(None);
        }

        let contig = self.alignment_naming.apply(bare);
        let outcome = if self.references.contains(contig.as_str()) {
            estimate_chromosome_coverage(annotation, &contig, &mut *self.alignments, &self.search)?
        } else {
            warn!(chromosome = bare, contig = %contig, "Chromosome missing from alignment header");
            ChromosomeCoverage::MissingAlignments
        };

        match &outcome {
            ChromosomeCoverage::Estimated {
                coverage,
                segments,
                threshold,
            } => info!(chromosome = bare, coverage, segments, threshold, "Estimated coverage"),
            ChromosomeCoverage::NoSegments { threshold } => warn!(
                chromosome = bare,
                threshold, "No qualifying segments; chromosome has no estimate"
            ),
            ChromosomeCoverage::MissingAnnotation | ChromosomeCoverage::MissingAlignments => {}
        }

        let bare = bare.to_string();
        self.results.insert(bare.clone(), outcome);
        Ok(self.results.get(&bare))
    }

    /// Estimates in chromosome set order; chromosomes never seen in the
    /// annotation are reported as missing.
    #[must_use]
    pub fn finish(mut self) -> Vec<ChromosomeEstimate> {
        self.chromosomes
            .iter()
            .map(|(name, class)| {
                let outcome = self.results.remove(name).unwrap_or_else(|| {
                    warn!(chromosome = name, "Chromosome missing from annotation");
                    ChromosomeCoverage::MissingAnnotation
                });
                ChromosomeEstimate {
                    chromosome: name.to_string(),
                    class,
                    outcome,
                }
            })
            .collect()
    }
}
