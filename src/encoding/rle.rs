//! Run-length encoding of score streams.

use serde::{Deserialize, Serialize};

/// A maximal run of one score character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RleRecord {
    pub symbol: u8,
    pub length: u64,
}

impl RleRecord {
    #[must_use]
    pub fn new(symbol: u8, length: u64) -> Self {
        Self { symbol, length }
    }
}

/// Iterator over the maximal runs of a byte stream, with their start offsets
pub struct Runs<'a> {
    stream: &'a [u8],
    pos: usize,
}

impl Iterator for Runs<'_> {
    type Item = (usize, RleRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let &symbol = self.stream.get(start)?;
        let length = self.stream[start..]
            .iter()
            .take_while(|&&b| b == symbol)
            .count();
        self.pos += length;
        Some((start, RleRecord::new(symbol, length as u64)))
    }
}

/// Runs of `stream` in order, each with the offset of its first byte
#[must_use]
pub fn runs(stream: &[u8]) -> Runs<'_> {
    Runs { stream, pos: 0 }
}

/// Run-length encode a score stream
#[must_use]
pub fn encode(stream: &[u8]) -> Vec<RleRecord> {
    runs(stream).map(|(_, record)| record).collect()
}

/// Expand run-length records back into the score stream
#[must_use]
pub fn expand(records: &[RleRecord]) -> Vec<u8> {
    let mut stream = Vec::new();
    for record in records {
        #[allow(clippy::cast_possible_truncation)]
        stream.extend(std::iter::repeat_n(record.symbol, record.length as usize));
    }
    stream
}
