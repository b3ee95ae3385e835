use thiserror::Error;
use tracing::{debug, warn};

use crate::core::kmer::canonicalize;
use crate::core::provider::{KmerCountIndex, SequenceProvider};
use crate::core::quantize::{quantize, quantize_mean};
use crate::core::region::GenomicRegion;
use crate::core::types::ScoreMode;
use crate::encoding::rle::RleRecord;
use crate::utils::validation::{validate_kmer_length, ConfigError};

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Contig '{0}' not found in reference")]
    UnknownContig(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration for score stream encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    pub mode: ScoreMode,

    /// Number of windows averaged into one emitted value
    pub bin_size: usize,

    /// Canonicalize k-mers before lookup
    pub canonical: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            mode: ScoreMode::RawBinned,
            bin_size: 1,
            canonical: false,
        }
    }
}

impl EncoderConfig {
    #[must_use]
    pub fn with_mode(mut self, mode: ScoreMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_bin_size(mut self, bin_size: usize) -> Self {
        self.bin_size = bin_size;
        self
    }

    #[must_use]
    pub fn with_canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }

    /// Check the configuration before any scan starts
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::BinTooSmall` for a zero bin size and
    /// `ConfigError::RunLengthWithBinning` for run-length mode with bins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bin_size < 1 {
            return Err(ConfigError::BinTooSmall(self.bin_size));
        }
        if self.mode == ScoreMode::RunLength && self.bin_size > 1 {
            return Err(ConfigError::RunLengthWithBinning(self.bin_size));
        }
        Ok(())
    }
}

/// One value of a score stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Emission {
    /// Mean count of a bin
    Raw(f64),
    /// Quantized mean count of a bin
    Ascii(u8),
    /// A maximal run of one quantized count
    Run(RleRecord),
    /// Mean count over the whole contig
    Average(f64),
    /// Quantized mean count over the whole contig
    AverageAscii(u8),
}

/// Turns reference k-mers into score streams.
///
/// The k-mer length is fixed at construction and threaded through every
/// lookup; it normally comes from [`KmerCountIndex::kmer_length`].
pub struct KmerScoreEncoder<'a, S: ?Sized, I: ?Sized> {
    reference: &'a S,
    index: &'a I,
    k: usize,
    config: EncoderConfig,
}

impl<'a, S, I> KmerScoreEncoder<'a, S, I>
where
    S: SequenceProvider + ?Sized,
    I: KmerCountIndex + ?Sized,
{
    /// Create an encoder, validating `config` and `k`
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::Config` if the configuration is invalid.
    pub fn new(
        reference: &'a S,
        index: &'a I,
        k: usize,
        config: EncoderConfig,
    ) -> Result<Self, EncodeError> {
        config.validate()?;
        validate_kmer_length(k)?;
        Ok(Self {
            reference,
            index,
            k,
            config,
        })
    }

    /// Start scanning a region.
    ///
    /// When the region has an explicit end the scan is extended by `k` bases
    /// (clamped to the contig) so that every base in the region starts a
    /// window. Returns `Ok(None)` when the span is shorter than `k`; the
    /// contig is skipped and the caller moves on.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::UnknownContig` if the contig is not in the
    /// reference.
    pub fn scan(&self, region: &GenomicRegion) -> Result<Option<ContigScan<'a, S, I>>, EncodeError> {
        let length = self
            .reference
            .contig_length(&region.contig)
            .ok_or_else(|| EncodeError::UnknownContig(region.contig.clone()))?;

        let k = self.k as u64;
        let (begin, end) = region.bounds(length, k);

        if end.saturating_sub(begin) < k {
            warn!(
                contig = %region.contig,
                begin,
                end,
                k,
                "Region is shorter than the k-mer length, skipping"
            );
            return Ok(None);
        }

        debug!(contig = %region.contig, begin, end, "Scanning contig");

        Ok(Some(ContigScan {
            contig: region.contig.clone(),
            reference: self.reference,
            index: self.index,
            k: self.k,
            config: self.config,
            begin,
            next: begin,
            stop: end - k,
            sum: 0,
            windows: 0,
            run: None,
            scratch: Vec::with_capacity(self.k),
            finished: false,
        }))
    }
}

/// Lazy score stream over one contig.
///
/// Only the current bin or run is held in memory.
pub struct ContigScan<'a, S: ?Sized, I: ?Sized> {
    contig: String,
    reference: &'a S,
    index: &'a I,
    k: usize,
    config: EncoderConfig,
    begin: u64,
    next: u64,
    /// Exclusive bound on window start positions
    stop: u64,
    /// Wide enough that saturated counts cannot overflow
    sum: u128,
    windows: u64,
    run: Option<RleRecord>,
    scratch: Vec<u8>,
    finished: bool,
}

impl<S, I> ContigScan<'_, S, I>
where
    S: SequenceProvider + ?Sized,
    I: KmerCountIndex + ?Sized,
{
    #[must_use]
    pub fn contig(&self) -> &str {
        &self.contig
    }

    #[must_use]
    pub fn mode(&self) -> ScoreMode {
        self.config.mode
    }

    /// Number of k-mer windows in the scan
    #[must_use]
    pub fn window_count(&self) -> u64 {
        self.stop - self.begin
    }

    fn count_at(&mut self, pos: u64) -> u64 {
        let reference = self.reference;
        let index = self.index;
        let Some(kmer) = reference.subsequence(&self.contig, pos, self.k) else {
            return 0;
        };
        if self.config.canonical {
            index.count(canonicalize(kmer, &mut self.scratch))
        } else {
            index.count(kmer)
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn take_mean(&mut self) -> f64 {
        let mean = self.sum as f64 / self.windows as f64;
        self.sum = 0;
        self.windows = 0;
        mean
    }

    fn flush_bin(&mut self) -> Emission {
        let mean = self.take_mean();
        match self.config.mode {
            ScoreMode::AsciiBinned => Emission::Ascii(quantize_mean(mean)),
            _ => Emission::Raw(mean),
        }
    }

    fn finish(&mut self) -> Option<Emission> {
        match self.config.mode {
            ScoreMode::RunLength => self.run.take().map(Emission::Run),
            _ if self.windows == 0 => None,
            ScoreMode::ContigAverage => Some(Emission::Average(self.take_mean())),
            ScoreMode::ContigAverageAscii => {
                Some(Emission::AverageAscii(quantize_mean(self.take_mean())))
            }
            ScoreMode::RawBinned | ScoreMode::AsciiBinned => Some(self.flush_bin()),
        }
    }
}

impl<S, I> Iterator for ContigScan<'_, S, I>
where
    S: SequenceProvider + ?Sized,
    I: KmerCountIndex + ?Sized,
{
    type Item = Emission;

    fn next(&mut self) -> Option<Emission> {
        while self.next < self.stop {
            let pos = self.next;
            self.next += 1;
            let count = self.count_at(pos);

            match self.config.mode {
                ScoreMode::RunLength => {
                    let symbol = quantize(count);
                    match self.run.as_mut() {
                        Some(run) if run.symbol == symbol => run.length += 1,
                        _ => {
                            if let Some(done) = self.run.replace(RleRecord::new(symbol, 1)) {
                                return Some(Emission::Run(done));
                            }
                        }
                    }
                }
                ScoreMode::ContigAverage | ScoreMode::ContigAverageAscii => {
                    self.sum += u128::from(count);
                    self.windows += 1;
                }
                ScoreMode::RawBinned | ScoreMode::AsciiBinned => {
                    self.sum += u128::from(count);
                    self.windows += 1;
                    if (pos - self.begin + 1) % self.config.bin_size as u64 == 0 {
                        return Some(self.flush_bin());
                    }
                }
            }
        }

        if self.finished {
            return None;
        }
        self.finished = true;
        self.finish()
    }
}
