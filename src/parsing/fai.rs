//! FASTA index (.fai) access using noodles.
//!
//! An index next to an annotation FASTA gives its record names without a
//! streaming pass over the sequences.
//! Format: `name\tlength\toffset\tline_bases\tline_width`

use std::ffi::OsString;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use noodles::fasta;

use crate::core::contig::Contig;
use crate::parsing::fasta::ReferenceError;

/// Path of the index that accompanies `fasta` (`<fasta>.fai`)
#[must_use]
pub fn fai_path(fasta: &Path) -> PathBuf {
    let mut path = OsString::from(fasta);
    path.push(".fai");
    PathBuf::from(path)
}

/// Read contig names and lengths from a FASTA index
///
/// # Errors
///
/// Returns `ReferenceError::Index` if the file cannot be read or parsed, or
/// `ReferenceError::Empty` if it lists no contigs.
pub fn read_fai(path: &Path) -> Result<Vec<Contig>, ReferenceError> {
    let index_error = |source| ReferenceError::Index {
        path: path.to_path_buf(),
        source,
    };

    let reader = std::fs::File::open(path)
        .map(BufReader::new)
        .map_err(index_error)?;
    let index = fasta::fai::io::Reader::new(reader)
        .read_index()
        .map_err(index_error)?;

    let contigs: Vec<Contig> = index
        .as_ref()
        .iter()
        .map(|record| Contig::new(String::from_utf8_lossy(record.name()), record.length()))
        .collect();

    if contigs.is_empty() {
        return Err(ReferenceError::Empty(path.to_path_buf()));
    }
    Ok(contigs)
}

/// Contigs of `fasta` from its `.fai` index, if one exists
///
/// # Errors
///
/// Returns an error only when an index exists but cannot be read.
pub fn indexed_contigs(fasta: &Path) -> Result<Option<Vec<Contig>>, ReferenceError> {
    let index = fai_path(fasta);
    if !index.is_file() {
        return Ok(None);
    }
    read_fai(&index).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_fai_path() {
        assert_eq!(
            fai_path(Path::new("/data/annotation.fa")),
            PathBuf::from("/data/annotation.fa.fai")
        );
    }

    #[test]
    fn test_read_fai() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ref.fa.fai");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"chr1\t248956422\t112\t70\t71\nchrM\t16569\t3099922541\t70\t71\n")
            .unwrap();

        let contigs = read_fai(&path).unwrap();
        assert_eq!(contigs.len(), 2);
        assert_eq!(contigs[0], Contig::new("chr1", 248_956_422));
        assert_eq!(contigs[1], Contig::new("chrM", 16569));
    }

    #[test]
    fn test_indexed_contigs_absent() {
        let dir = TempDir::new().unwrap();
        let fasta = dir.path().join("ann.fa");
        assert!(indexed_contigs(&fasta).unwrap().is_none());
    }

    #[test]
    fn test_empty_fai() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.fa.fai");
        std::fs::write(&path, b"").unwrap();
        assert!(read_fai(&path).is_err());
    }
}
