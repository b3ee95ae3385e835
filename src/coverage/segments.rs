//! Informative segment discovery in an annotation stream.
//!
//! An annotation holds one score character per reference base; long runs of
//! [`UNIQUE_KMER_CHAR`] mark stretches where every k-mer occurs exactly once,
//! so reads placed there are unambiguous.

use serde::Serialize;
use tracing::debug;

use crate::core::quantize::UNIQUE_KMER_CHAR;
use crate::encoding::rle;
use crate::utils::validation::{validate_segment_search, ConfigError};

/// A maximal sentinel run, 0-based half-open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
}

impl Segment {
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Parameters of the adaptive segment length search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSearch {
    pub initial_region_size: usize,
    pub region_size_floor: usize,
    pub min_segments: usize,
}

impl Default for SegmentSearch {
    fn default() -> Self {
        Self {
            initial_region_size: 20_000,
            region_size_floor: 2_000,
            min_segments: 10,
        }
    }
}

impl SegmentSearch {
    #[must_use]
    pub fn with_initial_region_size(mut self, size: usize) -> Self {
        self.initial_region_size = size;
        self
    }

    #[must_use]
    pub fn with_region_size_floor(mut self, size: usize) -> Self {
        self.region_size_floor = size;
        self
    }

    #[must_use]
    pub fn with_min_segments(mut self, count: usize) -> Self {
        self.min_segments = count;
        self
    }

    /// # Errors
    ///
    /// Returns a `ConfigError` if the floor is not below the initial size or
    /// no segments are required.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_segment_search(
            self.initial_region_size,
            self.region_size_floor,
            self.min_segments,
        )
    }

    /// Find segments, relaxing the length threshold until enough are found.
    ///
    /// The threshold is halved before every scan, so the first scan already
    /// uses half of `initial_region_size`. Scanning stops once
    /// `min_segments` segments are found or the threshold is no longer above
    /// `region_size_floor`.
    #[must_use]
    pub fn run(&self, annotation: &[u8]) -> SegmentSelection {
        let mut threshold = self.initial_region_size;
        let mut segments = Vec::new();
        let mut scans = 0;

        while segments.len() < self.min_segments && threshold > self.region_size_floor {
            threshold >>= 1;
            segments = find_segments(annotation, threshold);
            scans += 1;
            debug!(threshold, found = segments.len(), "Segment scan");
        }

        SegmentSelection {
            segments,
            threshold,
            scans,
        }
    }
}

/// Result of the adaptive search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSelection {
    pub segments: Vec<Segment>,
    /// Threshold of the last scan
    pub threshold: usize,
    pub scans: usize,
}

/// Sentinel runs strictly longer than `min_region_size`
#[must_use]
pub fn find_segments(annotation: &[u8], min_region_size: usize) -> Vec<Segment> {
    rle::runs(annotation)
        .filter(|(_, run)| run.symbol == UNIQUE_KMER_CHAR && run.length > min_region_size as u64)
        .map(|(start, run)| Segment {
            start: start as u64,
            end: start as u64 + run.length,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(runs: &[(u8, usize)]) -> Vec<u8> {
        runs.iter()
            .flat_map(|&(symbol, len)| std::iter::repeat_n(symbol, len))
            .collect()
    }

    #[test]
    fn test_find_segments_strictly_longer() {
        let ann = annotation(&[(b'"', 10), (b'!', 3), (b'"', 11), (b'#', 2), (b'"', 12)]);
        let segments = find_segments(&ann, 10);
        assert_eq!(
            segments,
            vec![Segment { start: 13, end: 24 }, Segment { start: 26, end: 38 }]
        );
        assert_eq!(segments[0].len(), 11);
    }

    #[test]
    fn test_non_sentinel_runs_ignored() {
        let ann = annotation(&[(b'#', 100), (b'!', 100)]);
        assert!(find_segments(&ann, 1).is_empty());
    }

    #[test]
    fn test_first_scan_satisfies() {
        let mut runs = Vec::new();
        for _ in 0..12 {
            runs.push((b'"', 25_000));
            runs.push((b'#', 10));
        }
        let ann = annotation(&runs);

        let selection = SegmentSearch::default().run(&ann);
        assert_eq!(selection.segments.len(), 12);
        assert_eq!(selection.threshold, 10_000);
        assert_eq!(selection.scans, 1);
    }

    #[test]
    fn test_threshold_relaxes_to_floor() {
        // 3000-base runs qualify only once the threshold reaches 2500
        let mut runs = Vec::new();
        for _ in 0..10 {
            runs.push((b'"', 3_000));
            runs.push((b'!', 1));
        }
        let ann = annotation(&runs);

        let selection = SegmentSearch::default().run(&ann);
        assert_eq!(selection.segments.len(), 10);
        assert_eq!(selection.threshold, 2_500);
        assert_eq!(selection.scans, 3);
    }

    #[test]
    fn test_exhausted_search() {
        let ann = annotation(&[(b'"', 1_000), (b'!', 1)]);
        let selection = SegmentSearch::default().run(&ann);
        assert!(selection.segments.is_empty());
        assert_eq!(selection.threshold, 1_250);
        assert_eq!(selection.scans, 4);
    }

    #[test]
    fn test_partial_result_kept_at_floor() {
        let ann = annotation(&[(b'"', 1_500), (b'!', 1), (b'"', 6_000)]);
        let selection = SegmentSearch::default().run(&ann);
        assert_eq!(selection.segments.len(), 2);
        assert_eq!(selection.threshold, 1_250);
    }
}
