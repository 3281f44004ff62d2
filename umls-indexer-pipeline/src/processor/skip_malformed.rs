//! Skip-and-retry over a projected line stream.

use std::iter::FusedIterator;

use tracing::warn;

use crate::errors::{PipelineError, RecordError};
use crate::source::RawLine;

/// Fallible projection of one raw line.
pub trait TryProject {
    type Output;

    /// Project `line`, or explain why it cannot be projected.
    fn try_project(&mut self, line: &RawLine) -> Result<Self::Output, RecordError>;
}

/// Iterator adapter that projects raw lines and drops the ones that fail.
///
/// A line that fails projection is logged and skipped, and the next line is
/// pulled in the same call. Source errors are passed through untouched.
pub struct SkipMalformed<I, P> {
    lines: I,
    projector: P,
    skipped: u64,
}

impl<I, P> SkipMalformed<I, P>
where
    I: Iterator<Item = Result<RawLine, PipelineError>>,
    P: TryProject,
{
    pub fn new(lines: I, projector: P) -> Self {
        Self {
            lines,
            projector,
            skipped: 0,
        }
    }

    /// Number of lines dropped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }

    pub fn lines(&self) -> &I {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut I {
        &mut self.lines
    }
}

impl<I, P> Iterator for SkipMalformed<I, P>
where
    I: Iterator<Item = Result<RawLine, PipelineError>>,
    P: TryProject,
{
    type Item = Result<P::Output, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };

            match self.projector.try_project(&line) {
                Ok(output) => return Some(Ok(output)),
                Err(e) => {
                    self.skipped += 1;
                    warn!(
                        line = line.line_number(),
                        raw = %line,
                        error = %e,
                        "Skipping malformed record"
                    );
                }
            }
        }
    }
}

impl<I, P> FusedIterator for SkipMalformed<I, P>
where
    I: FusedIterator<Item = Result<RawLine, PipelineError>>,
    P: TryProject,
{
}

/// Extension for wrapping a raw line iterator in `SkipMalformed`.
pub trait SkipMalformedExt: Iterator<Item = Result<RawLine, PipelineError>> + Sized {
    fn skip_malformed<P: TryProject>(self, projector: P) -> SkipMalformed<Self, P> {
        SkipMalformed::new(self, projector)
    }
}

impl<I> SkipMalformedExt for I where I: Iterator<Item = Result<RawLine, PipelineError>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::ConceptProcessor;
    use umls_indexer_shared::IndexTarget;

    const VALID_1: &str = "C1|ENG|P|L1|PF|S1|Y|A1|||||||Heart|0|N|256";
    const EMPTY_AUI: &str = "C2|ENG|P|L2|PF|S2|Y||||||||Lung|0|N|256";
    const BAD_SRL: &str = "C3|ENG|P|L3|PF|S3|Y|A3|||||||Liver|zero|N|256";
    const VALID_2: &str = "C4|ENG|P|L4|PF|S4|Y|A4|||||||Kidney|0|N|256";

    fn lines(texts: &[&str]) -> Vec<Result<RawLine, PipelineError>> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Ok(RawLine::new(i as u64 + 1, *text)))
            .collect()
    }

    fn processor() -> ConceptProcessor {
        ConceptProcessor::new(IndexTarget::new("umls"))
    }

    #[test]
    fn test_malformed_record_is_skipped_in_order() {
        let mut stream = lines(&[VALID_1, EMPTY_AUI, VALID_2])
            .into_iter()
            .skip_malformed(processor());

        let ids: Vec<String> = stream.by_ref().map(|doc| doc.unwrap().id).collect();

        assert_eq!(ids, vec!["A1", "A4"]);
        assert_eq!(stream.skipped(), 1);
    }

    #[test]
    fn test_decode_failure_is_skipped() {
        let mut stream = lines(&[BAD_SRL, VALID_1]).into_iter().skip_malformed(processor());

        assert_eq!(stream.next().unwrap().unwrap().id, "A1");
        assert!(stream.next().is_none());
        assert_eq!(stream.skipped(), 1);
    }

    #[test]
    fn test_id_matches_aui() {
        let docs: Vec<_> = lines(&[VALID_1, VALID_2])
            .into_iter()
            .skip_malformed(processor())
            .map(Result::unwrap)
            .collect();

        for doc in docs {
            assert_eq!(doc.id, doc.source.aui);
        }
    }

    #[test]
    fn test_source_errors_pass_through() {
        let mut input = lines(&[EMPTY_AUI]);
        input.push(Err(PipelineError::io(
            "MRCONSO.RRF",
            std::io::Error::new(std::io::ErrorKind::Other, "disk gone"),
        )));
        input.extend(lines(&[VALID_1]));

        let mut stream = input.into_iter().skip_malformed(processor());

        assert!(matches!(stream.next(), Some(Err(PipelineError::SourceError { .. }))));
        assert_eq!(stream.next().unwrap().unwrap().id, "A1");
        assert_eq!(stream.skipped(), 1);
    }

    #[test]
    fn test_all_malformed_ends_stream() {
        let mut stream = lines(&[EMPTY_AUI, BAD_SRL]).into_iter().skip_malformed(processor());

        assert!(stream.next().is_none());
        assert_eq!(stream.skipped(), 2);
    }
}
