//! Memory-mapped k-mer count tables.
//!
//! A table is a 20-byte header followed by `(k-mer, count)` entries sorted by
//! packed k-mer, all little endian:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | magic `KMCT` |
//! | 4 | 1 | format version (1) |
//! | 5 | 1 | kind (0 = direct counts, 1 = bloom counter) |
//! | 6 | 1 | canonical flag |
//! | 7 | 1 | reserved |
//! | 8 | 4 | key length in bits (two per base) |
//! | 12 | 8 | number of entries |
//! | 20 | 16 per entry | packed k-mer `u64`, count `u64` |
//!
//! Tables are built from Jellyfish text dumps (`jellyfish dump -c` columns or
//! the default `>count` / `KMER` layout) with [`TableBuilder`].

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::kmer::{canonical_code, pack, MAX_KMER_LENGTH};
use crate::core::provider::KmerCountIndex;

pub const MAGIC: [u8; 4] = *b"KMCT";
pub const FORMAT_VERSION: u8 = 1;
const HEADER_LEN: usize = 20;
const ENTRY_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Corrupt k-mer count table {path}: {reason}")]
    CorruptDatabase { path: PathBuf, reason: String },

    #[error("Unsupported k-mer count table kind in {path}: {kind}; only direct-count tables can be queried")]
    UnsupportedDatabaseKind { path: PathBuf, kind: TableKind },

    #[error("Unsupported k-mer count table version {0}")]
    UnsupportedVersion(u8),

    #[error("Invalid key length {0}: must be a non-zero even number of bits up to 64")]
    InvalidKeyLength(u32),

    #[error("Invalid dump line {line}: {reason}")]
    InvalidDump { line: usize, reason: String },

    #[error("Dump line {line} has a {found}-mer but earlier k-mers have length {expected}")]
    MixedKmerLengths {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Dump contains no k-mers")]
    EmptyDump,
}

/// How counts are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Exact per-k-mer counts
    Direct,
    /// Probabilistic counts; not queryable here
    Bloom,
}

impl TableKind {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Direct),
            1 => Some(Self::Bloom),
            _ => None,
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Direct => 0,
            Self::Bloom => 1,
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Bloom => write!(f, "bloom"),
        }
    }
}

/// Decoded table header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableHeader {
    pub kind: TableKind,
    pub canonical: bool,
    pub key_length: u32,
    pub entries: u64,
}

impl TableHeader {
    fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4] = FORMAT_VERSION;
        buf[5] = self.kind.to_byte();
        buf[6] = u8::from(self.canonical);
        buf[8..12].copy_from_slice(&self.key_length.to_le_bytes());
        buf[12..20].copy_from_slice(&self.entries.to_le_bytes());
        buf
    }

    fn decode(path: &Path, data: &[u8]) -> Result<Self, TableError> {
        let corrupt = |reason: &str| TableError::CorruptDatabase {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if data.len() < HEADER_LEN {
            return Err(corrupt("file is shorter than the header"));
        }
        if data[0..4] != MAGIC {
            return Err(corrupt("bad magic number"));
        }
        if data[4] != FORMAT_VERSION {
            return Err(TableError::UnsupportedVersion(data[4]));
        }
        let kind = TableKind::from_byte(data[5]).ok_or_else(|| corrupt("unknown table kind"))?;
        let key_length = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);
        let mut entries = [0u8; 8];
        entries.copy_from_slice(&data[12..20]);

        Ok(Self {
            kind,
            canonical: data[6] != 0,
            key_length,
            entries: u64::from_le_bytes(entries),
        })
    }
}

fn validate_key_length(key_length: u32) -> Result<(), TableError> {
    if key_length == 0 || key_length % 2 != 0 || key_length as usize > 2 * MAX_KMER_LENGTH {
        return Err(TableError::InvalidKeyLength(key_length));
    }
    Ok(())
}

/// A read-only, memory-mapped direct-count table
pub struct KmerCountTable {
    mmap: Mmap,
    header: TableHeader,
}

impl KmerCountTable {
    /// Open and validate a table.
    ///
    /// # Errors
    ///
    /// Returns `TableError::Io` if the file cannot be opened or mapped,
    /// `TableError::CorruptDatabase` for a bad header or a size that does not
    /// match the entry count, `TableError::UnsupportedDatabaseKind` for bloom
    /// tables, or `TableError::InvalidKeyLength` for odd or zero key lengths.
    pub fn open(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path)?;
        // SAFETY: the table is opened read-only and never modified while mapped
        let mmap = unsafe { Mmap::map(&file)? };

        let header = TableHeader::decode(path, &mmap)?;
        if header.kind != TableKind::Direct {
            return Err(TableError::UnsupportedDatabaseKind {
                path: path.to_path_buf(),
                kind: header.kind,
            });
        }
        validate_key_length(header.key_length)?;

        let expected = usize::try_from(header.entries)
            .ok()
            .and_then(|n| n.checked_mul(ENTRY_LEN))
            .and_then(|n| n.checked_add(HEADER_LEN));
        if expected != Some(mmap.len()) {
            return Err(TableError::CorruptDatabase {
                path: path.to_path_buf(),
                reason: format!(
                    "header declares {} entries but file holds {} bytes",
                    header.entries,
                    mmap.len()
                ),
            });
        }

        debug!(
            path = %path.display(),
            entries = header.entries,
            key_length = header.key_length,
            canonical = header.canonical,
            "Opened k-mer count table"
        );

        Ok(Self { mmap, header })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        (self.mmap.len() - HEADER_LEN) / ENTRY_LEN
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, index: usize) -> (u64, u64) {
        let offset = HEADER_LEN + index * ENTRY_LEN;
        let mut key = [0u8; 8];
        let mut count = [0u8; 8];
        key.copy_from_slice(&self.mmap[offset..offset + 8]);
        count.copy_from_slice(&self.mmap[offset + 8..offset + ENTRY_LEN]);
        (u64::from_le_bytes(key), u64::from_le_bytes(count))
    }

    /// Count stored for a packed k-mer
    #[must_use]
    pub fn lookup(&self, code: u64) -> u64 {
        let (mut lo, mut hi) = (0usize, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let (key, count) = self.entry(mid);
            match key.cmp(&code) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return count,
            }
        }
        0
    }

    /// Entries in k-mer order
    pub fn entries(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        (0..self.len()).map(|i| self.entry(i))
    }

    /// Summary for display
    #[must_use]
    pub fn info(&self, path: &Path) -> TableInfo {
        TableInfo {
            path: path.to_path_buf(),
            kind: self.header.kind,
            canonical: self.header.canonical,
            key_length: self.header.key_length,
            kmer_length: self.kmer_length(),
            entries: self.header.entries,
            total_count: self
                .entries()
                .fold(0u64, |acc, (_, count)| acc.saturating_add(count)),
        }
    }
}

impl KmerCountIndex for KmerCountTable {
    fn key_length(&self) -> u32 {
        self.header.key_length
    }

    fn is_canonical(&self) -> bool {
        self.header.canonical
    }

    fn count(&self, kmer: &[u8]) -> u64 {
        if kmer.len() != self.kmer_length() {
            return 0;
        }
        pack(kmer).map_or(0, |code| self.lookup(code))
    }
}

/// Table metadata as reported by `table info` and `table build`
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub path: PathBuf,
    pub kind: TableKind,
    pub canonical: bool,
    pub key_length: u32,
    pub kmer_length: usize,
    pub entries: u64,
    pub total_count: u64,
}

/// Accumulates k-mer counts and writes a direct-count table
#[derive(Debug, Default)]
pub struct TableBuilder {
    canonical: bool,
    kmer_length: Option<usize>,
    counts: BTreeMap<u64, u64>,
    skipped: u64,
}

impl TableBuilder {
    /// `canonical` merges each k-mer with its reverse complement
    #[must_use]
    pub fn new(canonical: bool) -> Self {
        Self {
            canonical,
            ..Self::default()
        }
    }

    /// K-mers dropped for containing a non-ACGT base
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Add `count` observations of `kmer`; `line` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns `TableError::InvalidDump` for an empty or over-long k-mer, or
    /// `TableError::MixedKmerLengths` if its length differs from earlier ones.
    pub fn add(&mut self, kmer: &[u8], count: u64, line: usize) -> Result<(), TableError> {
        if kmer.is_empty() || kmer.len() > MAX_KMER_LENGTH {
            return Err(TableError::InvalidDump {
                line,
                reason: format!(
                    "k-mer length {} is outside 1..={MAX_KMER_LENGTH}",
                    kmer.len()
                ),
            });
        }
        match self.kmer_length {
            Some(expected) if expected != kmer.len() => {
                return Err(TableError::MixedKmerLengths {
                    line,
                    expected,
                    found: kmer.len(),
                });
            }
            Some(_) => {}
            None => self.kmer_length = Some(kmer.len()),
        }

        let Some(code) = pack(kmer) else {
            self.skipped += 1;
            return Ok(());
        };
        let key = if self.canonical {
            canonical_code(code, kmer.len())
        } else {
            code
        };
        let slot = self.counts.entry(key).or_insert(0);
        *slot = slot.saturating_add(count);
        Ok(())
    }

    /// Read a Jellyfish text dump, in either column or FASTA layout.
    ///
    /// # Errors
    ///
    /// Returns `TableError::Io` on read failure or `TableError::InvalidDump`
    /// for malformed lines.
    pub fn read_dump<R: BufRead>(&mut self, reader: R) -> Result<(), TableError> {
        let mut pending: Option<u64> = None;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let number = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(count) = line.strip_prefix('>') {
                pending = Some(parse_count(count, number)?);
                continue;
            }

            if let Some(count) = pending.take() {
                self.add(line.as_bytes(), count, number)?;
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(kmer), Some(count), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(TableError::InvalidDump {
                    line: number,
                    reason: "expected 'KMER COUNT' or a '>COUNT' header".to_string(),
                });
            };
            self.add(kmer.as_bytes(), parse_count(count, number)?, number)?;
        }

        if pending.is_some() {
            return Err(TableError::InvalidDump {
                line: 0,
                reason: "dump ends with a count header and no k-mer".to_string(),
            });
        }
        Ok(())
    }

    /// Write the table to `path` through a temporary file in the same
    /// directory, so readers never see a partial table.
    ///
    /// # Errors
    ///
    /// Returns `TableError::EmptyDump` if nothing was added, or
    /// `TableError::Io` if the file cannot be written or renamed.
    pub fn write(self, path: &Path) -> Result<TableInfo, TableError> {
        let Some(kmer_length) = self.kmer_length else {
            return Err(TableError::EmptyDump);
        };

        let header = TableHeader {
            kind: TableKind::Direct,
            canonical: self.canonical,
            key_length: u32::try_from(kmer_length * 2)
                .map_err(|_| TableError::InvalidKeyLength(u32::MAX))?,
            entries: self.counts.len() as u64,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = tempfile::NamedTempFile::new_in(dir)?;
        let mut writer = BufWriter::new(temp);
        writer.write_all(&header.encode())?;
        let mut total_count = 0u64;
        for (&key, &count) in &self.counts {
            writer.write_all(&key.to_le_bytes())?;
            writer.write_all(&count.to_le_bytes())?;
            total_count = total_count.saturating_add(count);
        }
        let temp = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        info!(
            path = %path.display(),
            entries = header.entries,
            kmer_length,
            canonical = self.canonical,
            skipped = self.skipped,
            "Wrote k-mer count table"
        );

        Ok(TableInfo {
            path: path.to_path_buf(),
            kind: header.kind,
            canonical: header.canonical,
            key_length: header.key_length,
            kmer_length,
            entries: header.entries,
            total_count,
        })
    }
}

fn parse_count(raw: &str, line: usize) -> Result<u64, TableError> {
    raw.trim().parse().map_err(|_| TableError::InvalidDump {
        line,
        reason: format!("invalid count '{raw}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn build(dump: &str, canonical: bool) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counts.kct");
        let mut builder = TableBuilder::new(canonical);
        builder.read_dump(dump.as_bytes()).unwrap();
        builder.write(&path).unwrap();
        (dir, path)
    }

    #[test]
    fn test_column_dump_lookup() {
        let (_dir, path) = build("ACG 3\nTTT 7\nAAA 1\nCCN 9\n", false);
        let table = KmerCountTable::open(&path).unwrap();

        assert_eq!(table.kmer_length(), 3);
        assert_eq!(table.key_length(), 6);
        assert!(!table.is_canonical());
        assert_eq!(table.len(), 3);
        assert_eq!(table.count(b"ACG"), 3);
        assert_eq!(table.count(b"acg"), 3);
        assert_eq!(table.count(b"TTT"), 7);
        assert_eq!(table.count(b"AAA"), 1);
        assert_eq!(table.count(b"GGG"), 0);
        assert_eq!(table.count(b"CCN"), 0);
        assert_eq!(table.count(b"ACGT"), 0);
    }

    #[test]
    fn test_fasta_dump_layout() {
        let (_dir, path) = build(">12\nACGT\n>1\nGGGG\n", false);
        let table = KmerCountTable::open(&path).unwrap();
        assert_eq!(table.kmer_length(), 4);
        assert_eq!(table.count(b"ACGT"), 12);
        assert_eq!(table.count(b"GGGG"), 1);
    }

    #[test]
    fn test_canonical_merge() {
        // AAC and GTT are reverse complements
        let (_dir, path) = build("AAC 2\nGTT 5\n", true);
        let table = KmerCountTable::open(&path).unwrap();
        assert!(table.is_canonical());
        assert_eq!(table.len(), 1);
        assert_eq!(table.count(b"AAC"), 7);

        let info = table.info(&path);
        assert_eq!(info.entries, 1);
        assert_eq!(info.total_count, 7);
    }

    #[test]
    fn test_entries_sorted() {
        let (_dir, path) = build("TTT 1\nAAA 2\nCAT 3\nGCA 4\n", false);
        let table = KmerCountTable::open(&path).unwrap();
        let keys: Vec<u64> = table.entries().map(|(key, _)| key).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_mixed_lengths_rejected() {
        let mut builder = TableBuilder::new(false);
        let err = builder.read_dump("ACG 1\nACGT 1\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TableError::MixedKmerLengths {
                line: 2,
                expected: 3,
                found: 4
            }
        ));
    }

    #[test]
    fn test_malformed_dump() {
        let mut builder = TableBuilder::new(false);
        assert!(matches!(
            builder.read_dump("ACG\n".as_bytes()),
            Err(TableError::InvalidDump { line: 1, .. })
        ));
        let mut builder = TableBuilder::new(false);
        assert!(matches!(
            builder.read_dump("ACG x\n".as_bytes()),
            Err(TableError::InvalidDump { line: 1, .. })
        ));
    }

    #[test]
    fn test_empty_dump() {
        let dir = TempDir::new().unwrap();
        let builder = TableBuilder::new(false);
        assert!(matches!(
            builder.write(&dir.path().join("empty.kct")),
            Err(TableError::EmptyDump)
        ));
    }

    #[test]
    fn test_bad_magic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.kct");
        std::fs::write(&path, b"NOPE\x01\x00\x00\x00\x06\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00")
            .unwrap();
        assert!(matches!(
            KmerCountTable::open(&path),
            Err(TableError::CorruptDatabase { .. })
        ));
    }

    #[test]
    fn test_truncated_table() {
        let (_dir, path) = build("ACG 3\nTTT 7\n", false);
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();
        assert!(matches!(
            KmerCountTable::open(&path),
            Err(TableError::CorruptDatabase { .. })
        ));
    }

    fn raw_table(kind: u8, key_length: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&[FORMAT_VERSION, kind, 0, 0]);
        bytes.extend_from_slice(&key_length.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes
    }

    #[test]
    fn test_bloom_table_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bloom.kct");
        std::fs::write(&path, raw_table(1, 62)).unwrap();
        assert!(matches!(
            KmerCountTable::open(&path),
            Err(TableError::UnsupportedDatabaseKind {
                kind: TableKind::Bloom,
                ..
            })
        ));
    }

    #[test]
    fn test_key_length_validation() {
        let dir = TempDir::new().unwrap();
        for key_length in [0, 7, 66] {
            let path = dir.path().join(format!("k{key_length}.kct"));
            std::fs::write(&path, raw_table(0, key_length)).unwrap();
            assert!(matches!(
                KmerCountTable::open(&path),
                Err(TableError::InvalidKeyLength(k)) if k == key_length
            ));
        }
    }
}
