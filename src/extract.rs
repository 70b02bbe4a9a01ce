// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Extract file records from candidate lines.
//!
//! Each candidate produced by the [`reassemble`](crate::reassemble) pass is
//! matched against the row grammar of the upload tool:
//!
//! ```text
//! <marker> <identifier> <size> [<unit>] <fee> [<currency>] <content-type>  <path>
//! ```
//!
//! The content type must look like a MIME type (`type/subtype`, optionally
//! followed by `; parameter` pairs) and is separated from the path by a run of
//! two or more spaces, the tool's column separator. Tabs count as column
//! separators too. A record is all-or-nothing: a candidate either yields
//! every field or it is rejected and counted as skipped.

use crate::{
    reassemble::CandidateLine,
    record::{FileRecord, IdentifierRule, RecordSet},
};

use regex::Regex;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::{debug, instrument};

/// Turn candidate lines into file records.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    row: Regex,
    identifier: IdentifierRule,
}

impl RecordExtractor {
    /// Construct new record extractor for a row marker.
    ///
    /// # Errors
    ///
    /// - Return [`regex::Error`] if the row grammar cannot be compiled.
    pub fn new(row_marker: &str, identifier: IdentifierRule) -> Result<Self, regex::Error> {
        let row = Regex::new(&format!(
            concat!(
                r"^\s*{marker}\s+",
                r"(?P<id>\S+)\s+",
                r"(?P<size>\d+(?:\.\d+)?(?:\s*[A-Za-z]+)?)\s+",
                r"(?P<fee>\d+(?:\.\d+)?(?:\s+[A-Za-z]+)?)\s+",
                r"(?P<type>[\w.+-]+/[\w.+-]+(?:;\s?[^\s;]+)*)\s{{2,}}",
                r"(?P<path>\S(?:.*\S)?)\s*$",
            ),
            marker = regex::escape(row_marker),
        ))?;

        Ok(Self { row, identifier })
    }

    /// Extract record from one candidate line.
    ///
    /// # Errors
    ///
    /// - Return [`Rejection::NoMatch`] if line does not follow the row grammar.
    /// - Return [`Rejection::InvalidIdentifier`] if identifier is malformed.
    /// - Return [`Rejection::EmptyField`] if any field captured empty.
    pub fn extract(&self, line: &str) -> Result<FileRecord, Rejection> {
        // INVARIANT: A tab always separates columns.
        let line = line.replace('\t', "  ");
        let captures = self.row.captures(&line).ok_or(Rejection::NoMatch)?;
        let field = |name: &'static str| {
            captures
                .name(name)
                .map(|m| m.as_str().trim())
                .filter(|value| !value.is_empty())
                .ok_or(Rejection::EmptyField(name))
        };

        let identifier = field("id")?;
        if !self.identifier.matches(identifier) {
            return Err(Rejection::InvalidIdentifier(identifier.to_string()));
        }

        Ok(FileRecord::new(
            identifier,
            field("size")?,
            field("type")?,
            field("path")?,
        ))
    }

    /// Extract every record out of candidate lines.
    ///
    /// Lines that fail extraction are skipped and reported, never fatal.
    #[instrument(skip(self, candidates), level = "debug")]
    pub fn extract_all<'c>(
        &self,
        candidates: impl IntoIterator<Item = &'c CandidateLine>,
    ) -> Extraction {
        let mut extraction = Extraction::default();

        for candidate in candidates {
            match self.extract(&candidate.text) {
                Ok(record) => {
                    if let Some(old) = extraction.records.insert(record) {
                        debug!("{:?} listed again, later listing wins", old.path);
                        extraction.superseded.push(old);
                    }
                }
                Err(reason) => {
                    debug!("skipping line {}: {reason}", candidate.line_number);
                    extraction.skipped.push(SkippedLine {
                        line_number: candidate.line_number,
                        text: candidate.text.clone(),
                        reason,
                    });
                }
            }
        }

        extraction
    }
}

/// Outcome of extracting a batch of candidate lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Recovered records, unique by path.
    pub records: RecordSet,

    /// Candidates that did not yield a record.
    pub skipped: Vec<SkippedLine>,

    /// Records replaced by a later listing of the same path.
    pub superseded: Vec<FileRecord>,
}

/// Candidate line that did not yield a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub text: String,
    pub reason: Rejection,
}

/// Why a candidate line did not yield a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Line does not follow the row grammar.
    NoMatch,

    /// Identifier does not match the identifier rule.
    InvalidIdentifier(String),

    /// Field captured as empty.
    EmptyField(&'static str),
}

impl Display for Rejection {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NoMatch => fmt.write_str("line does not look like a file row"),
            Self::InvalidIdentifier(token) => write!(fmt, "malformed identifier {token:?}"),
            Self::EmptyField(name) => write!(fmt, "empty {name} field"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    const ID: &str = "bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkpGttDt_U";

    fn extractor() -> RecordExtractor {
        RecordExtractor::new("*", IdentifierRule::default()).unwrap()
    }

    #[test]
    fn extract_well_formed_row() {
        let line = format!("* {ID}  14.96 kB  0.000012 AR  text/html  index.html");

        let result = extractor().extract(&line);
        let expect = FileRecord::new(ID, "14.96 kB", "text/html", "index.html");
        assert_eq!(result, Ok(expect));
    }

    #[test_case("14.96kB", "14.96kB"; "unit glued to number")]
    #[test_case("512", "512"; "no unit")]
    #[test_case("3 KiB", "3 KiB"; "unit outside table")]
    #[test]
    fn extract_size_variants(size: &str, expect: &str) {
        let line = format!("* {ID} {size} 0.000001 AR text/plain  notes/a.txt");

        let result = extractor().extract(&line).map(|record| record.size_text);
        assert_eq!(result, Ok(expect.to_string()));
    }

    #[test]
    fn content_type_keeps_single_spaces() {
        let line = format!("* {ID} 1.2 kB 0.000001 AR text/html; charset=utf-8  docs/my page.html  ");

        let result = extractor().extract(&line).unwrap();
        assert_eq!(result.content_type, "text/html; charset=utf-8");
        assert_eq!(result.path, "docs/my page.html");
    }

    #[test]
    fn fee_without_currency() {
        let line = format!("* {ID} 900 B 0.000001 application/javascript  prescript.js");

        let result = extractor().extract(&line).unwrap();
        assert_eq!(result.content_type, "application/javascript");
        assert_eq!(result.path, "prescript.js");
    }

    #[test_case("* bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkp 1 kB 0.1 AR text/html  a.html"; "short identifier")]
    #[test]
    fn reject_malformed_identifier(line: &str) {
        let result = extractor().extract(line);
        assert_eq!(
            result,
            Err(Rejection::InvalidIdentifier(
                "bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkp".into()
            ))
        );
    }

    #[test_case("* bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkpGttDt_U  1 kB  0.000001 AR  application/vnd.openxmlformats-officedocument.wordprocessingml.document report.docx"; "type overflowing into path")]
    #[test_case("* bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkpGttDt_U  1 kB  0.000001 AR  binary  blob.bin"; "type without subtype")]
    #[test_case(""; "empty line")]
    #[test_case("*"; "bare marker")]
    #[test_case("* bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkpGttDt_U 1 kB 0.1 AR text/html"; "missing path")]
    #[test_case("* bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkpGttDt_U 1 kB 0.1 AR text/html a.html"; "single space before path")]
    #[test_case("- bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkpGttDt_U 1 kB 0.1 AR text/html  a.html"; "foreign marker")]
    #[test]
    fn reject_non_rows(line: &str) {
        assert_eq!(extractor().extract(line), Err(Rejection::NoMatch));
    }

    #[test_case("* {ID}\t1 kB\t0.1 AR\ttext/html\tindex.html"; "tabs everywhere")]
    #[test_case("* {ID} 1 kB 0.1 AR text/html\tindex.html"; "tab before path")]
    #[test_case("*\t{ID}\t1 kB 0.1 AR text/html  index.html"; "tab after marker")]
    #[test]
    fn tabs_separate_columns(template: &str) {
        let line = template.replace("{ID}", ID);

        let result = extractor().extract(&line);
        let expect = FileRecord::new(ID, "1 kB", "text/html", "index.html");
        assert_eq!(result, Ok(expect));
    }

    #[test]
    fn extract_all_counts_skips_and_supersedes() {
        let candidates = vec![
            CandidateLine {
                line_number: 3,
                text: format!("* {ID} 1 kB 0.1 AR text/html  index.html"),
            },
            CandidateLine {
                line_number: 4,
                text: "* broken 1 kB 0.1 AR text/html  broken.html".into(),
            },
            CandidateLine {
                line_number: 5,
                text: format!("* {ID} 2 kB 0.1 AR text/html  index.html"),
            },
        ];

        let result = extractor().extract_all(&candidates);
        assert_eq!(result.records.len(), 1);
        assert_eq!(
            result.records.get("index.html").map(|r| r.size_text.as_str()),
            Some("2 kB")
        );
        assert_eq!(result.superseded.len(), 1);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].line_number, 4);
        assert_eq!(
            result.skipped[0].reason,
            Rejection::InvalidIdentifier("broken".into())
        );
    }
}
