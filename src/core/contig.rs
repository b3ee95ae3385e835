use serde::{Deserialize, Serialize};

/// A single contig/sequence in a reference or annotation FASTA
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contig {
    /// Sequence name (first word of the FASTA definition line)
    pub name: String,

    /// Sequence length in bases
    pub length: u64,
}

impl Contig {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

/// Human autosomes under the bare naming convention
pub const HUMAN_AUTOSOMES: [&str; 22] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22",
];

/// Human sex chromosomes under the bare naming convention
pub const HUMAN_ALLOSOMES: [&str; 2] = ["X", "Y"];

/// Whether a chromosome contributes to the genome-wide coverage mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChromosomeClass {
    Autosome,
    Allosome,
}

/// The ordered set of chromosomes a coverage estimate is computed over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeSet {
    pub autosomes: Vec<String>,
    pub allosomes: Vec<String>,
}

impl Default for ChromosomeSet {
    fn default() -> Self {
        Self::new(HUMAN_AUTOSOMES, HUMAN_ALLOSOMES)
    }
}

impl ChromosomeSet {
    pub fn new<A, S>(
        autosomes: impl IntoIterator<Item = A>,
        allosomes: impl IntoIterator<Item = S>,
    ) -> Self
    where
        A: Into<String>,
        S: Into<String>,
    {
        Self {
            autosomes: autosomes.into_iter().map(Into::into).collect(),
            allosomes: allosomes.into_iter().map(Into::into).collect(),
        }
    }

    /// Autosomes first, then allosomes, each tagged with its class
    pub fn iter(&self) -> impl Iterator<Item = (&str, ChromosomeClass)> {
        self.autosomes
            .iter()
            .map(|c| (c.as_str(), ChromosomeClass::Autosome))
            .chain(
                self.allosomes
                    .iter()
                    .map(|c| (c.as_str(), ChromosomeClass::Allosome)),
            )
    }

    /// All chromosome names in reporting order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(name, _)| name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.autosomes.len() + self.allosomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
