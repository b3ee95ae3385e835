//! # kmer-coverage
//!
//! A library for k-mer count scoring of reference genomes and for estimating
//! sequencing coverage from uniquely mappable segments.
//!
//! Every reference position is scored by how often the k-mer starting there
//! occurs in a count table. Positions whose k-mer is unique form long runs in
//! the quantized score stream; reads aligned inside those runs map
//! unambiguously, so their matched bases give a clean depth estimate.
//!
//! ## Features
//!
//! - **Score streams**: raw or binned means, quantized characters, run-length
//!   pairs, or one average per contig
//! - **Adaptive segments**: the unique-run length threshold relaxes until
//!   enough segments are found on each chromosome
//! - **Naming conventions**: `chr`-prefixed and bare names are resolved
//!   independently for the annotation and the alignments
//! - **Count tables**: memory-mapped, built from Jellyfish text dumps
//!
//! ## Example
//!
//! ```rust,no_run
//! use kmer_coverage::{ChromosomeSet, CoverageEstimator, CoverageReport, NamingConvention, SegmentSearch};
//! use kmer_coverage::parsing::annotation::Annotation;
//! use kmer_coverage::parsing::bam::BamAlignments;
//! use std::path::Path;
//!
//! let mut alignments = BamAlignments::open(Path::new("sample.bam")).unwrap();
//! let annotation = Annotation::open(Path::new("annotation.fa")).unwrap();
//! let chromosomes = ChromosomeSet::default();
//!
//! let mut estimator = CoverageEstimator::new(
//!     &mut alignments,
//!     &chromosomes,
//!     SegmentSearch::default(),
//!     NamingConvention::Bare,
//! );
//! for record in annotation.records().unwrap() {
//!     let record = record.unwrap();
//!     estimator.add_record(&record.name, &record.sequence).unwrap();
//! }
//!
//! let report = CoverageReport::new(estimator.finish());
//! println!("{:?}", report.rounded_coverage);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Quantization, k-mer packing, regions and provider traits
//! - [`encoding`]: K-mer score encoder, run-length records and text output
//! - [`coverage`]: Segment search, coverage estimation and reports
//! - [`parsing`]: FASTA, FAI, BAM and k-mer count table access
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod coverage;
pub mod encoding;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::contig::{ChromosomeSet, Contig};
pub use core::provider::{AlignmentProvider, KmerCountIndex, SequenceProvider};
pub use core::region::GenomicRegion;
pub use core::types::*;
pub use coverage::estimator::{ChromosomeCoverage, CoverageEstimator};
pub use coverage::report::CoverageReport;
pub use coverage::segments::SegmentSearch;
pub use encoding::encoder::{EncoderConfig, KmerScoreEncoder};
