//! Interfaces to the data sources the scoring and coverage algorithms consume.
//!
//! Concrete implementations live in [`crate::parsing`]; tests substitute
//! in-memory versions.

use std::io;

use crate::core::contig::Contig;
use crate::core::region::GenomicRegion;

/// Reference bases addressable by contig name
pub trait SequenceProvider {
    /// Contigs in file order
    fn contigs(&self) -> &[Contig];

    /// Length of a contig, if present
    fn contig_length(&self, name: &str) -> Option<u64> {
        self.contigs()
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.length)
    }

    /// Bases `[offset, offset + length)` of a contig.
    ///
    /// Returns `None` when the contig is unknown or the range runs past its end.
    fn subsequence(&self, name: &str, offset: u64, length: usize) -> Option<&[u8]>;
}

/// Exact-match k-mer count lookup
pub trait KmerCountIndex {
    /// Key length in bits (two per base)
    fn key_length(&self) -> u32;

    /// k-mer length in bases
    fn kmer_length(&self) -> usize {
        (self.key_length() / 2) as usize
    }

    /// Whether counts were accumulated over canonical k-mers
    fn is_canonical(&self) -> bool;

    /// Observed count of `kmer`; zero when absent
    fn count(&self, kmer: &[u8]) -> u64;
}

/// CIGAR operation kinds, mirroring the SAM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarKind {
    Match,
    Insertion,
    Deletion,
    Skip,
    SoftClip,
    HardClip,
    Pad,
    SequenceMatch,
    SequenceMismatch,
}

impl CigarKind {
    /// Operations that consume read and reference bases in lockstep
    #[must_use]
    pub fn is_aligned_match(self) -> bool {
        matches!(
            self,
            Self::Match | Self::SequenceMatch | Self::SequenceMismatch
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarOp {
    pub kind: CigarKind,
    pub len: usize,
}

impl CigarOp {
    #[must_use]
    pub fn new(kind: CigarKind, len: usize) -> Self {
        Self { kind, len }
    }
}

/// The parts of an alignment record needed for depth estimation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRead {
    pub mapped: bool,
    pub cigar: Vec<CigarOp>,
}

impl AlignedRead {
    /// Bases aligned as match, sequence match or sequence mismatch
    #[must_use]
    pub fn matched_bases(&self) -> u64 {
        self.cigar
            .iter()
            .filter(|op| op.kind.is_aligned_match())
            .map(|op| op.len as u64)
            .sum()
    }
}

/// Alignment records queryable by region
pub trait AlignmentProvider {
    /// Names of the reference sequences the alignments are placed on
    fn reference_names(&self) -> Vec<String>;

    /// Alignments overlapping `region`, lazily
    ///
    /// # Errors
    ///
    /// Returns an error if the region cannot be resolved or the index cannot
    /// be queried; individual records may also fail to decode.
    fn query<'a>(
        &'a mut self,
        region: &GenomicRegion,
    ) -> io::Result<Box<dyn Iterator<Item = io::Result<AlignedRead>> + 'a>>;
}
