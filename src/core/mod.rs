//! Core data types and the pure scoring primitives.
//!
//! - [`quantize`]: count → printable score character
//! - [`kmer`]: 2-bit packing and canonicalization of k-mers
//! - [`region`]: `chr:begin-end` region strings
//! - [`contig`]: contigs and the chromosome sets coverage is reported over
//! - [`provider`]: traits for reference bases, k-mer counts and alignments
//! - [`types`]: naming conventions and score stream modes
//!
//! ## Chromosome Naming
//!
//! | Source | Chromosome 1 | Sex chromosomes |
//! |--------|--------------|-----------------|
//! | UCSC   | chr1         | chrX, chrY      |
//! | NCBI   | 1            | X, Y            |
//!
//! Chromosome lists are always given bare; each input file is probed once for
//! its [`types::NamingConvention`] and names are translated explicitly.

pub mod contig;
pub mod kmer;
pub mod provider;
pub mod quantize;
pub mod region;
pub mod types;
