//! Annotation FASTA access for the coverage estimator.
//!
//! An annotation is a FASTA whose sequence characters are quantized k-mer
//! scores, one per reference base. Records are streamed one chromosome at a
//! time.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::types::NamingConvention;
use crate::parsing::fai::indexed_contigs;
use crate::parsing::fasta::{FastaRecords, ReferenceError, SequenceRecord};

/// Annotation file with its record names resolved up front
pub struct Annotation {
    path: PathBuf,
    names: Vec<String>,
}

impl Annotation {
    /// Resolve record names from `<path>.fai` if present, otherwise by a
    /// streaming pass over the file.
    ///
    /// # Errors
    ///
    /// Returns a `ReferenceError` if the index or the FASTA cannot be read.
    pub fn open(path: &Path) -> Result<Self, ReferenceError> {
        let names = if let Some(contigs) = indexed_contigs(path)? {
            debug!(path = %path.display(), "Annotation names from FASTA index");
            contigs.into_iter().map(|c| c.name).collect()
        } else {
            debug!(path = %path.display(), "Annotation names from a streaming pass");
            FastaRecords::open(path)?
                .map(|record| record.map(|r| r.name))
                .collect::<Result<Vec<_>, _>>()?
        };

        if names.is_empty() {
            return Err(ReferenceError::Empty(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            names,
        })
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Naming convention of the record names relative to `targets`
    #[must_use]
    pub fn naming<T: AsRef<str>>(&self, targets: &[T]) -> NamingConvention {
        NamingConvention::probe(self.names.iter().map(String::as_str), targets)
    }

    /// Stream the records.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::Open` if the file cannot be reopened.
    pub fn records(
        &self,
    ) -> Result<impl Iterator<Item = Result<SequenceRecord, ReferenceError>>, ReferenceError> {
        FastaRecords::open(&self.path)
    }
}
