//! Readers and writers for the files the tool consumes.
//!
//! - **FASTA** (plain or gzip/bgzip): reference sequences and score annotations
//! - **FASTA index (.fai)**: annotation record names without a full pass
//! - **BAM + BAI**: alignments queried by region
//! - **K-mer count tables**: memory-mapped exact counts, built from Jellyfish dumps
//!
//! ## Example
//!
//! ```rust,no_run
//! use kmer_coverage::core::provider::KmerCountIndex;
//! use kmer_coverage::parsing::kmer_table::KmerCountTable;
//! use std::path::Path;
//!
//! let table = KmerCountTable::open(Path::new("counts.kct")).unwrap();
//! println!("k = {}, ACGT seen {} times", table.kmer_length(), table.count(b"ACGT"));
//! ```

pub mod annotation;
pub mod bam;
pub mod fai;
pub mod fasta;
pub mod kmer_table;
pub mod reference;
