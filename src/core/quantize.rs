//! Count-to-score quantization.
//!
//! A count is reduced to the number of bits needed to represent it, clamped to
//! 92 and shifted into the printable ASCII range `[33, 125]`. Every power-of-two
//! range `[2^(s-1), 2^s - 1]` shares a single character, so the mapping is
//! monotone but lossy.

/// Offset added to a score to make it printable (`!`)
pub const SCORE_OFFSET: u8 = 33;

/// Largest score kept before clamping
pub const MAX_SCORE: u8 = 92;

/// Character used for a k-mer observed exactly once (`"`)
pub const UNIQUE_KMER_CHAR: u8 = SCORE_OFFSET + 1;

/// Number of bits needed to represent `count`; zero for zero.
#[inline]
#[must_use]
pub fn bit_length(count: u64) -> u32 {
    u64::BITS - count.leading_zeros()
}

/// Quantize a k-mer count into a printable score character.
///
/// # Examples
///
/// ```
/// use kmer_coverage::core::quantize::quantize;
///
/// assert_eq!(quantize(0), b'!');
/// assert_eq!(quantize(1), b'"');
/// assert_eq!(quantize(3), b'#');
/// ```
#[inline]
#[must_use]
pub fn quantize(count: u64) -> u8 {
    // bit_length is at most 64, so the clamp never triggers for u64 input
    #[allow(clippy::cast_possible_truncation)]
    let score = bit_length(count).min(u32::from(MAX_SCORE)) as u8;
    score + SCORE_OFFSET
}

/// Quantize a mean count, rounding half away from zero first.
#[must_use]
pub fn quantize_mean(mean: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = mean.round().max(0.0) as u64;
    quantize(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_small_counts() {
        assert_eq!(quantize(0), 33);
        assert_eq!(quantize(1), 34);
        assert_eq!(quantize(2), 35);
        assert_eq!(quantize(3), 35);
        for count in 4..=7 {
            assert_eq!(quantize(count), 36, "count {count}");
        }
        assert_eq!(quantize(8), 37);
    }

    #[test]
    fn test_quantize_power_of_two_boundaries() {
        for bits in 1..64u32 {
            let low = 1u64 << (bits - 1);
            let high = (1u64 << bits) - 1;
            #[allow(clippy::cast_possible_truncation)]
            let expected = bits as u8 + SCORE_OFFSET;
            assert_eq!(quantize(low), expected, "2^{}", bits - 1);
            assert_eq!(quantize(high), expected, "2^{bits} - 1");
        }
    }

    #[test]
    fn test_quantize_monotone_and_bounded() {
        let mut previous = quantize(0);
        for count in (0..10_000u64).chain([u64::MAX / 2, u64::MAX - 1, u64::MAX]) {
            let q = quantize(count);
            assert!(q >= previous, "quantize decreased at {count}");
            assert!(q <= 125);
            previous = q;
        }
        assert_eq!(quantize(u64::MAX), 64 + SCORE_OFFSET);
    }

    #[test]
    fn test_quantize_mean_rounds() {
        assert_eq!(quantize_mean(0.4), 33);
        assert_eq!(quantize_mean(0.5), 34);
        assert_eq!(quantize_mean(3.0), 35);
        assert_eq!(quantize_mean(3.5), 36);
    }

    #[test]
    fn test_unique_kmer_char() {
        assert_eq!(UNIQUE_KMER_CHAR, b'"');
        assert_eq!(quantize(1), UNIQUE_KMER_CHAR);
    }
}
