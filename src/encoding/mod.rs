//! K-mer score streams over a reference.
//!
//! [`encoder::KmerScoreEncoder`] slides a window of length k along each
//! contig, looks every window up in a [`KmerCountIndex`](crate::core::provider::KmerCountIndex)
//! and emits a lazy [`encoder::ContigScan`] in one of the [`ScoreMode`](crate::core::types::ScoreMode)
//! shapes. [`writer::ScoreWriter`] renders those streams as text; [`rle`]
//! holds the run-length records shared with the coverage estimator.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kmer_coverage::core::region::GenomicRegion;
//! use kmer_coverage::core::types::ScoreMode;
//! use kmer_coverage::encoding::encoder::{EncoderConfig, KmerScoreEncoder};
//! use kmer_coverage::encoding::writer::ScoreWriter;
//! use kmer_coverage::parsing::kmer_table::KmerCountTable;
//! use kmer_coverage::parsing::reference::ReferenceSet;
//! use kmer_coverage::core::provider::KmerCountIndex;
//! use std::path::Path;
//!
//! let table = KmerCountTable::open(Path::new("counts.kct")).unwrap();
//! let reference = ReferenceSet::load(Path::new("ref.fa"), None).unwrap();
//! let config = EncoderConfig::default().with_mode(ScoreMode::AsciiBinned);
//! let encoder = KmerScoreEncoder::new(&reference, &table, table.kmer_length(), config).unwrap();
//!
//! let mut writer = ScoreWriter::new(std::io::stdout().lock());
//! if let Some(scan) = encoder.scan(&GenomicRegion::whole("chr1")).unwrap() {
//!     writer.write_contig("chr1", scan.mode(), scan).unwrap();
//! }
//! ```

pub mod encoder;
pub mod rle;
pub mod writer;
