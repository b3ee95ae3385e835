//! Nucleotide k-mer helpers: 2-bit packing and canonicalization.

/// Longest k-mer that fits a packed `u64`
pub const MAX_KMER_LENGTH: usize = 32;

/// 2-bit code of a nucleotide (A=0, C=1, G=2, T=3), case-insensitive.
#[inline]
#[must_use]
pub fn base_code(base: u8) -> Option<u64> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Pack a k-mer into a `u64`, first base in the most significant bits.
///
/// Returns `None` for k-mers longer than [`MAX_KMER_LENGTH`] or containing a
/// base other than A, C, G or T.
#[must_use]
pub fn pack(kmer: &[u8]) -> Option<u64> {
    if kmer.len() > MAX_KMER_LENGTH {
        return None;
    }
    kmer.iter()
        .try_fold(0u64, |acc, &base| base_code(base).map(|code| (acc << 2) | code))
}

#[inline]
fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'a' => b't',
        b'C' => b'G',
        b'c' => b'g',
        b'G' => b'C',
        b'g' => b'c',
        b'T' => b'A',
        b't' => b'a',
        other => other,
    }
}

/// Write the reverse complement of `kmer` into `out`.
pub fn reverse_complement_into(kmer: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.extend(kmer.iter().rev().map(|&b| complement(b)));
}

/// Pick the canonical representative of a k-mer.
///
/// The canonical form is the lexicographically smaller (case-insensitive) of
/// the k-mer and its reverse complement. `scratch` holds the reverse
/// complement when it wins.
pub fn canonicalize<'a>(kmer: &'a [u8], scratch: &'a mut Vec<u8>) -> &'a [u8] {
    reverse_complement_into(kmer, scratch);
    let forward = kmer.iter().map(u8::to_ascii_uppercase);
    let reverse = scratch.iter().map(u8::to_ascii_uppercase);
    if reverse.lt(forward) {
        scratch
    } else {
        kmer
    }
}

/// Canonical form of a packed k-mer of length `k`.
#[must_use]
pub fn canonical_code(code: u64, k: usize) -> u64 {
    let mut rc = 0u64;
    let mut fwd = code;
    for _ in 0..k {
        rc = (rc << 2) | (3 - (fwd & 0b11));
        fwd >>= 2;
    }
    code.min(rc)
}
