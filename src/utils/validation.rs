//! Centralized validation of user-supplied configuration.
//!
//! Everything here runs before any file is opened, so a bad flag combination
//! never produces partial output.

use crate::core::kmer::MAX_KMER_LENGTH;

/// Configuration validation error types
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("--bin should not be smaller than 1 (got {0})")]
    BinTooSmall(usize),
    #[error("--rle only works with --bin 1 (got --bin {0})")]
    RunLengthWithBinning(usize),
    #[error("--rle cannot be combined with --contig")]
    RunLengthWithContigAverage,
    #[error("k-mer length must be between 1 and {MAX_KMER_LENGTH} (got {0})")]
    InvalidKmerLength(usize),
    #[error("Segment size floor ({floor}) must be smaller than the initial segment size ({initial})")]
    InvalidSegmentSizes { initial: usize, floor: usize },
    #[error("At least one segment must be required per chromosome")]
    ZeroMinSegments,
    #[error("At least one chromosome must be given")]
    NoChromosomes,
}

/// Validate the binning and run-length encoding flags of the `score` command.
///
/// Binning and run-length encoding are mutually exclusive, and a per-contig
/// average has no runs to encode.
///
/// # Errors
///
/// Returns `ConfigError::BinTooSmall` for a zero bin,
/// `ConfigError::RunLengthWithBinning` when `rle` is combined with `bin > 1`,
/// or `ConfigError::RunLengthWithContigAverage` when `rle` is combined with a
/// per-contig average.
pub fn validate_score_flags(bin: usize, rle: bool, contig: bool) -> Result<(), ConfigError> {
    if bin < 1 {
        return Err(ConfigError::BinTooSmall(bin));
    }
    if rle && bin > 1 {
        return Err(ConfigError::RunLengthWithBinning(bin));
    }
    if rle && contig {
        return Err(ConfigError::RunLengthWithContigAverage);
    }
    Ok(())
}

/// Validate a k-mer length against what a packed table can hold.
///
/// # Errors
///
/// Returns `ConfigError::InvalidKmerLength` if `k` is zero or too long.
pub fn validate_kmer_length(k: usize) -> Result<(), ConfigError> {
    if k == 0 || k > MAX_KMER_LENGTH {
        return Err(ConfigError::InvalidKmerLength(k));
    }
    Ok(())
}

/// Validate the adaptive segment search parameters.
///
/// # Errors
///
/// Returns `ConfigError::InvalidSegmentSizes` if the floor is not below the
/// initial size, or `ConfigError::ZeroMinSegments` if no segments are required.
pub fn validate_segment_search(
    initial: usize,
    floor: usize,
    min_segments: usize,
) -> Result<(), ConfigError> {
    if floor >= initial {
        return Err(ConfigError::InvalidSegmentSizes { initial, floor });
    }
    if min_segments == 0 {
        return Err(ConfigError::ZeroMinSegments);
    }
    Ok(())
}
