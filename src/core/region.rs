//! Genomic region strings (`chr` or `chr:begin-end`, 1-based inclusive).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegionError {
    #[error("Empty region")]
    Empty,

    #[error("Invalid region '{0}': expected chr or chr:begin-end")]
    InvalidFormat(String),

    #[error("Invalid coordinate '{coordinate}' in region '{region}'")]
    InvalidCoordinate { region: String, coordinate: String },

    #[error("Invalid region '{0}': begin must be >= 1 and <= end")]
    InvalidInterval(String),
}

/// A region on a named contig.
///
/// Coordinates are stored 0-based half-open; `None` bounds mean the whole
/// contig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicRegion {
    pub contig: String,
    /// 0-based inclusive start
    pub start: u64,
    /// 0-based exclusive end
    pub end: Option<u64>,
}

impl GenomicRegion {
    /// Whole-contig region
    pub fn whole(contig: impl Into<String>) -> Self {
        Self {
            contig: contig.into(),
            start: 0,
            end: None,
        }
    }

    /// Region from 0-based half-open coordinates
    pub fn new(contig: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            contig: contig.into(),
            start,
            end: Some(end),
        }
    }

    /// Clamp the region to a contig of `length` bases, returning `(start, end)`
    /// as 0-based half-open coordinates. An explicit end is first extended by
    /// `extend` bases.
    #[must_use]
    pub fn bounds(&self, length: u64, extend: u64) -> (u64, u64) {
        let end = self
            .end
            .map_or(length, |end| end.saturating_add(extend).min(length));
        (self.start.min(end), end)
    }
}

fn parse_coordinate(region: &str, raw: &str) -> Result<u64, RegionError> {
    raw.replace(',', "")
        .parse::<u64>()
        .map_err(|_| RegionError::InvalidCoordinate {
            region: region.to_string(),
            coordinate: raw.to_string(),
        })
}

impl FromStr for GenomicRegion {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RegionError::Empty);
        }

        let Some((contig, interval)) = s.rsplit_once(':') else {
            return Ok(Self::whole(s));
        };
        if contig.is_empty() {
            return Err(RegionError::InvalidFormat(s.to_string()));
        }

        let (begin, end) = interval
            .split_once('-')
            .ok_or_else(|| RegionError::InvalidFormat(s.to_string()))?;
        let begin = parse_coordinate(s, begin)?;
        let end = parse_coordinate(s, end)?;
        if begin == 0 || begin > end {
            return Err(RegionError::InvalidInterval(s.to_string()));
        }

        Ok(Self::new(contig, begin - 1, end))
    }
}

impl fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}:{}-{}", self.contig, self.start + 1, end),
            None => write!(f, "{}", self.contig),
        }
    }
}
