//! Text rendering of score streams.
//!
//! | Mode | Layout |
//! |------|--------|
//! | raw binned | `>contig` then one mean per line |
//! | ASCII binned | `>contig` then one unbroken line of score characters |
//! | run-length | `>contig` then `character<TAB>run_length` per line |
//! | contig average | `contig<TAB>mean` (or its score character) |

use std::io::{self, Write};

use crate::core::types::ScoreMode;
use crate::encoding::encoder::Emission;

/// Writes score streams to any sink (stdout, a file, a buffer)
pub struct ScoreWriter<W: Write> {
    inner: W,
}

impl<W: Write> ScoreWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write one contig's score stream, returning the number of emissions.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_contig<E>(&mut self, contig: &str, mode: ScoreMode, emissions: E) -> io::Result<u64>
    where
        E: IntoIterator<Item = Emission>,
    {
        if !mode.is_contig_average() {
            writeln!(self.inner, ">{contig}")?;
        }

        let mut written = 0u64;
        for emission in emissions {
            match emission {
                Emission::Raw(mean) => writeln!(self.inner, "{mean}")?,
                Emission::Ascii(symbol) => self.inner.write_all(&[symbol])?,
                Emission::Run(run) => {
                    writeln!(self.inner, "{}\t{}", char::from(run.symbol), run.length)?;
                }
                Emission::Average(mean) => writeln!(self.inner, "{contig}\t{mean}")?,
                Emission::AverageAscii(symbol) => {
                    writeln!(self.inner, "{contig}\t{}", char::from(symbol))?;
                }
            }
            written += 1;
        }

        if mode == ScoreMode::AsciiBinned {
            writeln!(self.inner)?;
        }

        Ok(written)
    }

    /// Flush the sink
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::rle::RleRecord;

    fn render(contig: &str, mode: ScoreMode, emissions: Vec<Emission>) -> String {
        let mut writer = ScoreWriter::new(Vec::new());
        writer.write_contig(contig, mode, emissions).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_raw_layout() {
        let out = render(
            "chr1",
            ScoreMode::RawBinned,
            vec![Emission::Raw(3.0), Emission::Raw(2.5)],
        );
        assert_eq!(out, ">chr1\n3\n2.5\n");
    }

    #[test]
    fn test_ascii_layout() {
        let out = render(
            "chr1",
            ScoreMode::AsciiBinned,
            vec![Emission::Ascii(b'"'), Emission::Ascii(b'"'), Emission::Ascii(b'#')],
        );
        assert_eq!(out, ">chr1\n\"\"#\n");
    }

    #[test]
    fn test_run_length_layout() {
        let out = render(
            "2",
            ScoreMode::RunLength,
            vec![
                Emission::Run(RleRecord::new(b'"', 40)),
                Emission::Run(RleRecord::new(b'!', 2)),
            ],
        );
        assert_eq!(out, ">2\n\"\t40\n!\t2\n");
    }

    #[test]
    fn test_contig_average_layout() {
        assert_eq!(
            render("chrM", ScoreMode::ContigAverage, vec![Emission::Average(12.25)]),
            "chrM\t12.25\n"
        );
        assert_eq!(
            render(
                "chrM",
                ScoreMode::ContigAverageAscii,
                vec![Emission::AverageAscii(b'#')]
            ),
            "chrM\t#\n"
        );
    }

    #[test]
    fn test_empty_stream_still_has_header() {
        assert_eq!(render("3", ScoreMode::RawBinned, vec![]), ">3\n");
        assert_eq!(render("3", ScoreMode::AsciiBinned, vec![]), ">3\n\n");
        assert_eq!(render("3", ScoreMode::ContigAverage, vec![]), "");
    }
}
