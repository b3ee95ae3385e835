//! In-memory reference sequences for k-mer scanning.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::core::contig::Contig;
use crate::core::provider::SequenceProvider;
use crate::parsing::fasta::{FastaRecords, ReferenceError};

/// Reference contigs loaded from a FASTA file
#[derive(Debug, Default)]
pub struct ReferenceSet {
    contigs: Vec<Contig>,
    sequences: HashMap<String, Vec<u8>>,
}

impl ReferenceSet {
    /// Load every contig of `path`, or only `contig` when given.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::Open`/`Record` on I/O or parse failure,
    /// `ReferenceError::ContigNotFound` if the requested contig is absent, or
    /// `ReferenceError::Empty` if the file has no sequences.
    pub fn load(path: &Path, contig: Option<&str>) -> Result<Self, ReferenceError> {
        let mut set = Self::default();

        for record in FastaRecords::open(path)? {
            let record = record?;
            if contig.is_some_and(|wanted| wanted != record.name) {
                continue;
            }

            debug!(contig = %record.name, length = record.sequence.len(), "Loaded contig");
            set.insert(record.name, record.sequence);

            // Only one record can match
            if contig.is_some() {
                break;
            }
        }

        match contig {
            Some(wanted) if set.contigs.is_empty() => Err(ReferenceError::ContigNotFound {
                path: path.to_path_buf(),
                contig: wanted.to_string(),
            }),
            None if set.contigs.is_empty() => Err(ReferenceError::Empty(path.to_path_buf())),
            _ => Ok(set),
        }
    }

    /// Add a contig; a repeated name replaces the earlier sequence.
    pub fn insert(&mut self, name: impl Into<String>, sequence: Vec<u8>) {
        let name = name.into();
        let contig = Contig::new(name.clone(), sequence.len() as u64);
        if let Some(existing) = self.contigs.iter_mut().find(|c| c.name == name) {
            *existing = contig;
        } else {
            self.contigs.push(contig);
        }
        self.sequences.insert(name, sequence);
    }
}

impl SequenceProvider for ReferenceSet {
    fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    fn subsequence(&self, name: &str, offset: u64, length: usize) -> Option<&[u8]> {
        let sequence = self.sequences.get(name)?;
        let start = usize::try_from(offset).ok()?;
        sequence.get(start..start.checked_add(length)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fasta(content: &[u8]) -> NamedTempFile {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(content).unwrap();
        temp.flush().unwrap();
        temp
    }

    #[test]
    fn test_load_whole_file() {
        let temp = fasta(b">1\nACGTAC\n>2\nGG\nTT\n");
        let set = ReferenceSet::load(temp.path(), None).unwrap();

        assert_eq!(set.contigs(), &[Contig::new("1", 6), Contig::new("2", 4)]);
        assert_eq!(set.subsequence("1", 2, 3), Some(&b"GTA"[..]));
        assert_eq!(set.subsequence("2", 0, 4), Some(&b"GGTT"[..]));
        assert_eq!(set.subsequence("2", 2, 3), None);
        assert_eq!(set.subsequence("3", 0, 1), None);
        assert_eq!(set.contig_length("1"), Some(6));
    }

    #[test]
    fn test_load_single_contig() {
        let temp = fasta(b">1\nACGT\n>2\nGGGG\n>3\nTTTT\n");
        let set = ReferenceSet::load(temp.path(), Some("2")).unwrap();
        assert_eq!(set.contigs(), &[Contig::new("2", 4)]);
        assert!(set.subsequence("1", 0, 1).is_none());
    }

    #[test]
    fn test_missing_contig() {
        let temp = fasta(b">1\nACGT\n");
        assert!(matches!(
            ReferenceSet::load(temp.path(), Some("chr9")),
            Err(ReferenceError::ContigNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_fasta() {
        let temp = fasta(b"");
        assert!(matches!(
            ReferenceSet::load(temp.path(), None),
            Err(ReferenceError::Empty(_))
        ));
    }
}
