//! Indexed BAM access using noodles.
//!
//! Regions are resolved through the BAI binning index; the returned chunks are
//! read sequentially and records not overlapping the region are dropped.

use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use noodles::core::region::Interval;
use noodles::core::Position;
use noodles::csi::binning_index::index::reference_sequence::bin::Chunk;
use noodles::csi::BinningIndex;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::Record as _;
use noodles::{bam, bgzf, csi, sam};
use thiserror::Error;
use tracing::debug;

use crate::core::provider::{AlignedRead, AlignmentProvider, CigarKind, CigarOp};
use crate::core::region::GenomicRegion;

#[derive(Error, Debug)]
pub enum AlignmentError {
    #[error("Failed to open BAM {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to read BAM header from {path}: {source}")]
    Header { path: PathBuf, source: io::Error },

    #[error("No BAM index found for {bam}; looked for {}", candidates.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    IndexMissing {
        bam: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("Failed to read BAM index {path}: {source}")]
    Index { path: PathBuf, source: io::Error },
}

/// Index locations tried for `bam`: `<bam>.bai`, then `<stem>.bai`
#[must_use]
pub fn index_candidates(bam: &Path) -> Vec<PathBuf> {
    let mut appended = OsString::from(bam);
    appended.push(".bai");
    vec![PathBuf::from(appended), bam.with_extension("bai")]
}

/// A BAM file opened together with its index
pub struct BamAlignments {
    reader: bam::io::Reader<bgzf::io::Reader<File>>,
    header: sam::Header,
    index: bam::bai::Index,
    record: bam::Record,
}

impl BamAlignments {
    /// Open `path` and its BAI index.
    ///
    /// # Errors
    ///
    /// Returns `AlignmentError::IndexMissing` if no index exists, or an
    /// open/header/index error if a file cannot be read.
    pub fn open(path: &Path) -> Result<Self, AlignmentError> {
        let candidates = index_candidates(path);
        let Some(index_path) = candidates.iter().find(|p| p.is_file()).cloned() else {
            return Err(AlignmentError::IndexMissing {
                bam: path.to_path_buf(),
                candidates,
            });
        };

        let file = File::open(path).map_err(|source| AlignmentError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = bam::io::Reader::new(file);
        let header = reader.read_header().map_err(|source| AlignmentError::Header {
            path: path.to_path_buf(),
            source,
        })?;
        let index = bam::bai::read(&index_path).map_err(|source| AlignmentError::Index {
            path: index_path.clone(),
            source,
        })?;

        debug!(
            bam = %path.display(),
            index = %index_path.display(),
            references = header.reference_sequences().len(),
            "Opened indexed BAM"
        );

        Ok(Self {
            reader,
            header,
            index,
            record: bam::Record::default(),
        })
    }
}

fn convert_kind(kind: Kind) -> CigarKind {
    match kind {
        Kind::Match => CigarKind::Match,
        Kind::Insertion => CigarKind::Insertion,
        Kind::Deletion => CigarKind::Deletion,
        Kind::Skip => CigarKind::Skip,
        Kind::SoftClip => CigarKind::SoftClip,
        Kind::HardClip => CigarKind::HardClip,
        Kind::Pad => CigarKind::Pad,
        Kind::SequenceMatch => CigarKind::SequenceMatch,
        Kind::SequenceMismatch => CigarKind::SequenceMismatch,
    }
}

fn to_aligned_read(record: &bam::Record) -> io::Result<AlignedRead> {
    let cigar = record
        .cigar()
        .iter()
        .map(|op| op.map(|op| CigarOp::new(convert_kind(op.kind()), op.len())))
        .collect::<io::Result<Vec<_>>>()?;
    Ok(AlignedRead {
        mapped: !record.flags().is_unmapped(),
        cigar,
    })
}

/// Records from the index chunks of one region, filtered to the region
struct RegionRecords<'a, R> {
    reader: bam::io::Reader<csi::io::Query<'a, R>>,
    record: &'a mut bam::Record,
    reference_sequence_id: usize,
    interval: Interval,
}

impl<R> RegionRecords<'_, R>
where
    R: bgzf::io::BufRead + bgzf::io::Seek,
{
    fn overlaps(&self) -> io::Result<bool> {
        match (
            self.record.reference_sequence_id().transpose()?,
            self.record.alignment_start().transpose()?,
            self.record.alignment_end().transpose()?,
        ) {
            (Some(id), Some(start), Some(end)) => Ok(id == self.reference_sequence_id
                && self.interval.intersects((start..=end).into())),
            _ => Ok(false),
        }
    }

    fn read_next(&mut self) -> io::Result<Option<AlignedRead>> {
        loop {
            if self.reader.read_record(self.record)? == 0 {
                return Ok(None);
            }
            if self.overlaps()? {
                return to_aligned_read(self.record).map(Some);
            }
        }
    }
}

impl<R> Iterator for RegionRecords<'_, R>
where
    R: bgzf::io::BufRead + bgzf::io::Seek,
{
    type Item = io::Result<AlignedRead>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

fn invalid_input(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

impl AlignmentProvider for BamAlignments {
    fn reference_names(&self) -> Vec<String> {
        self.header
            .reference_sequences()
            .keys()
            .map(ToString::to_string)
            .collect()
    }

    fn query<'a>(
        &'a mut self,
        region: &GenomicRegion,
    ) -> io::Result<Box<dyn Iterator<Item = io::Result<AlignedRead>> + 'a>> {
        let reference_sequence_id = self
            .header
            .reference_sequences()
            .get_index_of(region.contig.as_bytes())
            .ok_or_else(|| {
                invalid_input(format!("Contig '{}' not in BAM header", region.contig))
            })?;

        // 0-based half-open to 1-based closed
        let start = usize::try_from(region.start + 1)
            .ok()
            .and_then(|p| Position::try_from(p).ok())
            .ok_or_else(|| invalid_input(format!("Invalid start in region {region}")))?;
        let interval = match region.end {
            Some(end) => {
                let end = usize::try_from(end)
                    .ok()
                    .and_then(|p| Position::try_from(p).ok())
                    .ok_or_else(|| invalid_input(format!("Invalid end in region {region}")))?;
                Interval::from(start..=end)
            }
            None => Interval::from(start..),
        };

        let chunks: Vec<Chunk> = self.index.query(reference_sequence_id, interval)?;
        Ok(Box::new(RegionRecords {
            reader: bam::io::Reader::from(csi::io::Query::new(self.reader.get_mut(), chunks)),
            record: &mut self.record,
            reference_sequence_id,
            interval,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::estimator::segment_depth;
    use crate::coverage::segments::Segment;
    use noodles::sam::alignment::io::Write as _;
    use noodles::sam::alignment::record::cigar::Op;
    use noodles::sam::alignment::record::Flags;
    use noodles::sam::alignment::RecordBuf;
    use noodles::sam::header::record::value::map::header::{sort_order, tag};
    use noodles::sam::header::record::value::map::{self, ReferenceSequence};
    use noodles::sam::header::record::value::Map;
    use std::num::NonZeroUsize;
    use tempfile::TempDir;

    /// A read as `(reference id, 1-based start, matched length, unmapped)`
    type Placed = (usize, usize, usize, bool);

    /// Write a coordinate-sorted BAM over contigs `1` and `2` plus its index
    fn write_indexed_bam(dir: &Path, reads: &[Placed]) -> PathBuf {
        let path = dir.join("reads.bam");
        let header = sam::Header::builder()
            .set_header(
                Map::<map::Header>::builder()
                    .insert(tag::SORT_ORDER, sort_order::COORDINATE)
                    .build()
                    .unwrap(),
            )
            .add_reference_sequence(
                "1",
                Map::<ReferenceSequence>::new(NonZeroUsize::new(1000).unwrap()),
            )
            .add_reference_sequence(
                "2",
                Map::<ReferenceSequence>::new(NonZeroUsize::new(1000).unwrap()),
            )
            .build();

        let mut writer = bam::io::Writer::new(File::create(&path).unwrap());
        writer.write_header(&header).unwrap();
        for &(id, start, len, unmapped) in reads {
            let flags = if unmapped {
                Flags::UNMAPPED
            } else {
                Flags::default()
            };
            let record = RecordBuf::builder()
                .set_flags(flags)
                .set_reference_sequence_id(id)
                .set_alignment_start(Position::try_from(start).unwrap())
                .set_cigar([Op::new(Kind::Match, len)].into_iter().collect())
                .build();
            writer.write_alignment_record(&header, &record).unwrap();
        }
        writer.try_finish().unwrap();
        drop(writer);

        let index = bam::fs::index(&path).unwrap();
        bam::bai::write(index_candidates(&path)[0].clone(), &index).unwrap();
        path
    }

    #[test]
    fn test_index_candidates() {
        let candidates = index_candidates(Path::new("/data/sample.bam"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/data/sample.bam.bai"),
                PathBuf::from("/data/sample.bai")
            ]
        );
    }

    #[test]
    fn test_missing_index() {
        let dir = TempDir::new().unwrap();
        let bam = dir.path().join("reads.bam");
        std::fs::write(&bam, b"").unwrap();

        match BamAlignments::open(&bam) {
            Err(AlignmentError::IndexMissing { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
            }
            Err(other) => panic!("expected IndexMissing, got {other}"),
            Ok(_) => panic!("expected IndexMissing"),
        }
    }

    #[test]
    fn test_region_query_depth() {
        let dir = TempDir::new().unwrap();
        // 50M at 1-based 101 covers 0-based [100, 150)
        let bam = write_indexed_bam(
            dir.path(),
            &[(0, 101, 50, false), (0, 101, 50, true), (1, 101, 50, false)],
        );
        let mut alignments = BamAlignments::open(&bam).unwrap();
        assert_eq!(alignments.reference_names(), vec!["1", "2"]);

        let depth = |alignments: &mut BamAlignments, start, end| {
            segment_depth(alignments, "1", Segment { start, end }).unwrap()
        };
        assert!((depth(&mut alignments, 100, 150) - 1.0).abs() < f64::EPSILON);
        assert!(depth(&mut alignments, 150, 1000).abs() < f64::EPSILON);
        assert!(depth(&mut alignments, 0, 100).abs() < f64::EPSILON);
        // one base of overlap still counts the whole read
        assert!((depth(&mut alignments, 149, 150) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_region_query_reads() {
        let dir = TempDir::new().unwrap();
        let bam = write_indexed_bam(dir.path(), &[(0, 101, 50, false), (0, 101, 50, true)]);
        let mut alignments = BamAlignments::open(&bam).unwrap();

        let reads: Vec<AlignedRead> = alignments
            .query(&GenomicRegion::new("1", 0, 1000))
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(reads.len(), 2);
        assert!(reads[0].mapped);
        assert!(!reads[1].mapped);
        assert_eq!(reads[0].matched_bases(), 50);

        let none = alignments
            .query(&GenomicRegion::new("2", 0, 1000))
            .unwrap()
            .count();
        assert_eq!(none, 0);

        assert!(alignments
            .query(&GenomicRegion::new("Y", 0, 10))
            .is_err());
    }

    #[test]
    fn test_convert_kind() {
        assert_eq!(convert_kind(Kind::Match), CigarKind::Match);
        assert_eq!(convert_kind(Kind::SequenceMismatch), CigarKind::SequenceMismatch);
        assert_eq!(convert_kind(Kind::Skip), CigarKind::Skip);
        assert!(!convert_kind(Kind::Deletion).is_aligned_match());
    }
}
