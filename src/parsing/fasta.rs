//! FASTA access using noodles.
//!
//! Opens plain or gzip/bgzip compressed FASTA files and exposes their records
//! as a stream, so a whole genome never has to be held at once unless the
//! caller asks for it. Files ending in `.gz` or `.bgz` are decompressed.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to open FASTA {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to parse FASTA record in {path}: {source}")]
    Record { path: PathBuf, source: io::Error },

    #[error("Failed to read FASTA index {path}: {source}")]
    Index { path: PathBuf, source: io::Error },

    #[error("No sequences found in {0}")]
    Empty(PathBuf),

    #[error("Contig '{contig}' not found in {path}")]
    ContigNotFound { path: PathBuf, contig: String },
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// A single FASTA record with an owned sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

/// Streaming FASTA reader over a plain or compressed file
pub struct FastaRecords {
    path: PathBuf,
    reader: fasta::io::Reader<Box<dyn BufRead>>,
}

impl FastaRecords {
    /// Open `path`, decompressing `.gz`/`.bgz` files transparently.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::Open` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, ReferenceError> {
        let file = File::open(path).map_err(|source| ReferenceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // bgzip output is a series of gzip members
        let inner: Box<dyn BufRead> = if is_gzipped(path) {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(Self {
            path: path.to_path_buf(),
            reader: fasta::io::Reader::new(inner),
        })
    }
}

impl Iterator for FastaRecords {
    type Item = Result<SequenceRecord, ReferenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut definition = String::new();
        match self.reader.read_definition(&mut definition) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(source) => {
                return Some(Err(ReferenceError::Record {
                    path: self.path.clone(),
                    source,
                }))
            }
        }

        let mut sequence = Vec::new();
        if let Err(source) = self.reader.read_sequence(&mut sequence) {
            return Some(Err(ReferenceError::Record {
                path: self.path.clone(),
                source,
            }));
        }

        // Name is the first word of the definition line
        let name = definition
            .trim_start_matches('>')
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        Some(Ok(SequenceRecord { name, sequence }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_stream_records() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b">chr1 description\nACGTACGT\nACGT\n>chr2\nGGGG\n")
            .unwrap();
        temp.flush().unwrap();

        let records: Vec<_> = FastaRecords::open(temp.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "chr1");
        assert_eq!(records[0].sequence, b"ACGTACGTACGT");
        assert_eq!(records[1].name, "chr2");
        assert_eq!(records[1].sequence, b"GGGG");
    }

    #[test]
    fn test_gzipped_records() {
        let mut temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        {
            let mut encoder = GzEncoder::new(temp.as_file_mut(), Compression::default());
            encoder.write_all(b">1\nAC\nGT\n").unwrap();
            encoder.finish().unwrap();
        }

        let records: Vec<_> = FastaRecords::open(temp.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, b"ACGT");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FastaRecords::open(Path::new("/nonexistent/ref.fa")),
            Err(ReferenceError::Open { .. })
        ));
    }
}
