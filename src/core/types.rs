use serde::{Deserialize, Serialize};

/// Naming convention used for chromosomes in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// NCBI/Ensembl style: 1, 2, ..., X, Y
    Bare,
    /// UCSC style: chr1, chr2, ..., chrX, chrY
    ChrPrefixed,
}

impl NamingConvention {
    const PREFIX: &'static str = "chr";

    /// Resolve the convention of a set of contig names against the bare
    /// chromosome names we intend to look up.
    ///
    /// The convention is `ChrPrefixed` only when some target is absent under
    /// its bare name but present with a `chr` prefix; otherwise `Bare`.
    pub fn probe<'a, I, T>(names: I, targets: &[T]) -> Self
    where
        I: IntoIterator<Item = &'a str>,
        T: AsRef<str>,
    {
        let names: std::collections::HashSet<&str> = names.into_iter().collect();
        let mut bare_hits = 0usize;
        let mut prefixed_hits = 0usize;

        for target in targets {
            let target = target.as_ref();
            if names.contains(target) {
                bare_hits += 1;
            } else if names.contains(format!("{}{target}", Self::PREFIX).as_str()) {
                prefixed_hits += 1;
            }
        }

        if prefixed_hits > bare_hits {
            Self::ChrPrefixed
        } else {
            Self::Bare
        }
    }

    /// Name of a bare chromosome under this convention
    #[must_use]
    pub fn apply(self, bare: &str) -> String {
        match self {
            Self::Bare => bare.to_string(),
            Self::ChrPrefixed if bare.starts_with(Self::PREFIX) => bare.to_string(),
            Self::ChrPrefixed => format!("{}{bare}", Self::PREFIX),
        }
    }

    /// Bare chromosome name for a name written under this convention
    #[must_use]
    pub fn strip<'a>(self, name: &'a str) -> &'a str {
        match self {
            Self::Bare => name,
            Self::ChrPrefixed => name.strip_prefix(Self::PREFIX).unwrap_or(name),
        }
    }
}

impl std::fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bare => write!(f, "bare"),
            Self::ChrPrefixed => write!(f, "chr-prefixed"),
        }
    }
}

/// Shape of the score stream emitted for each contig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// Mean count per bin
    #[default]
    RawBinned,
    /// Quantized mean count per bin
    AsciiBinned,
    /// Run-length encoded quantized counts (bin size 1 only)
    RunLength,
    /// One mean count per contig
    ContigAverage,
    /// One quantized mean count per contig
    ContigAverageAscii,
}

impl ScoreMode {
    /// Select a mode from the command-line flags of the `score` command
    #[must_use]
    pub fn from_flags(ascii: bool, rle: bool, contig: bool) -> Self {
        match (contig, rle, ascii) {
            (true, _, false) => Self::ContigAverage,
            (true, _, true) => Self::ContigAverageAscii,
            (false, true, _) => Self::RunLength,
            (false, false, true) => Self::AsciiBinned,
            (false, false, false) => Self::RawBinned,
        }
    }

    #[must_use]
    pub fn is_contig_average(self) -> bool {
        matches!(self, Self::ContigAverage | Self::ContigAverageAscii)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_naming_convention() {
        let targets = ["1", "2", "X"];
        assert_eq!(
            NamingConvention::probe(["chr1", "chr2", "chrX", "chrM"], &targets),
            NamingConvention::ChrPrefixed
        );
        assert_eq!(
            NamingConvention::probe(["1", "2", "X", "MT"], &targets),
            NamingConvention::Bare
        );
        // Nothing matches either way: stay bare
        assert_eq!(
            NamingConvention::probe(["scaffold_1"], &targets),
            NamingConvention::Bare
        );
    }

    #[test]
    fn test_apply_and_strip() {
        assert_eq!(NamingConvention::Bare.apply("1"), "1");
        assert_eq!(NamingConvention::ChrPrefixed.apply("1"), "chr1");
        assert_eq!(NamingConvention::ChrPrefixed.apply("chrX"), "chrX");
        assert_eq!(NamingConvention::ChrPrefixed.strip("chr22"), "22");
        assert_eq!(NamingConvention::Bare.strip("chr22"), "chr22");
    }

    #[test]
    fn test_score_mode_from_flags() {
        assert_eq!(ScoreMode::from_flags(false, false, false), ScoreMode::RawBinned);
        assert_eq!(ScoreMode::from_flags(true, false, false), ScoreMode::AsciiBinned);
        assert_eq!(ScoreMode::from_flags(false, true, false), ScoreMode::RunLength);
        assert_eq!(ScoreMode::from_flags(true, true, false), ScoreMode::RunLength);
        assert_eq!(ScoreMode::from_flags(false, false, true), ScoreMode::ContigAverage);
        assert_eq!(
            ScoreMode::from_flags(true, false, true),
            ScoreMode::ContigAverageAscii
        );
    }
}
