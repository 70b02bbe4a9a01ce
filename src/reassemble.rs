// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Reassemble wrapped file rows.
//!
//! The upload tool prints its file list as a table whose rows all start with
//! a row marker. When the terminal is too narrow, a row can be wrapped so that
//! the marker sits on one line while the identifier and the rest of the row
//! land on the next one, or the identifier can lose its marker altogether.
//! The reassembler restores exactly one marker + row line per file before any
//! field-level parsing happens.
//!
//! # Scan States
//!
//! Scanning starts __outside__ the file list. A line holding every column
//! header token moves the scan __inside__ the file list, and a line holding a
//! summary marker moves it back outside. Only lines inside the file list can
//! become candidates, so banners and progress chatter before or after the
//! table never reach the extractor.

use crate::{config::ScanLayout, record::IdentifierRule};

use std::iter::Peekable;
use tracing::{debug, instrument, trace};

/// Line that may hold a complete file row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLine {
    /// 1-based number of the first physical line the candidate came from.
    pub line_number: usize,

    /// Reassembled row text.
    pub text: String,
}

impl CandidateLine {
    fn new(line_number: usize, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    InFileSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Row,
    BareContinuation,
    Header,
    Summary,
    TruncatedRow,
    Other,
}

/// Restore one candidate line per file row.
#[derive(Debug, Clone, Copy)]
pub struct LineReassembler<'a> {
    layout: &'a ScanLayout,
    identifier: &'a IdentifierRule,
}

impl<'a> LineReassembler<'a> {
    /// Construct new line reassembler.
    pub fn new(layout: &'a ScanLayout, identifier: &'a IdentifierRule) -> Self {
        Self { layout, identifier }
    }

    /// Scan raw tool output lines into candidate record lines.
    ///
    /// Candidates keep the order in which their content was first seen.
    #[instrument(skip(self, lines), level = "debug")]
    pub fn reassemble<'l>(
        &self,
        lines: impl IntoIterator<Item = &'l str>,
    ) -> Vec<CandidateLine> {
        let mut lines = lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| (index + 1, line))
            .peekable();
        let mut section = Section::Outside;
        let mut candidates = Vec::new();

        while let Some((line_number, line)) = lines.next() {
            section = self.step(section, line_number, line, &mut lines, &mut candidates);
        }

        if section == Section::InFileSection {
            debug!("tool output ended inside the file list");
        }

        candidates
    }

    fn step<'l, I>(
        &self,
        section: Section,
        line_number: usize,
        line: &'l str,
        rest: &mut Peekable<I>,
        candidates: &mut Vec<CandidateLine>,
    ) -> Section
    where
        I: Iterator<Item = (usize, &'l str)>,
    {
        match (section, self.classify(line)) {
            (Section::Outside, LineKind::Header) => {
                debug!("file list starts at line {line_number}");
                Section::InFileSection
            }
            (Section::Outside, _) => Section::Outside,
            (Section::InFileSection, LineKind::Blank | LineKind::Header) => {
                Section::InFileSection
            }
            (Section::InFileSection, LineKind::Summary) => {
                debug!("file list ends at line {line_number}");
                Section::Outside
            }
            (Section::InFileSection, LineKind::Row) => {
                candidates.push(CandidateLine::new(line_number, line.trim()));
                Section::InFileSection
            }
            (Section::InFileSection, LineKind::TruncatedRow) => {
                // INVARIANT: Blank lines never affect the scan, so skip them
                //   before looking for the continuation.
                while rest.next_if(|(_, next)| next.trim().is_empty()).is_some() {}

                // INVARIANT: Only a bare identifier line may complete a truncated row.
                let continuation =
                    rest.next_if(|(_, next)| self.identifier.leading(next).is_some());
                let text = match continuation {
                    Some((_, next)) => {
                        trace!("joined truncated row at line {line_number} with next line");
                        format!("{} {}", line.trim(), next.trim())
                    }
                    None => line.trim().to_string(),
                };
                candidates.push(CandidateLine::new(line_number, text));
                Section::InFileSection
            }
            (Section::InFileSection, LineKind::BareContinuation) => {
                trace!("restored row marker on line {line_number}");
                candidates.push(CandidateLine::new(
                    line_number,
                    format!("{} {}", self.layout.row_marker, line.trim()),
                ));
                Section::InFileSection
            }
            (Section::InFileSection, LineKind::Other) => {
                debug!("dropping unrecognized line {line_number} in file list");
                Section::InFileSection
            }
        }
    }

    // INVARIANT: Row shapes, whole or truncated, are checked before header and
    //   summary markers so a path containing "Summary" cannot close the file list.
    fn classify(&self, line: &str) -> LineKind {
        if line.trim().is_empty() {
            return LineKind::Blank;
        }

        let marked = self.layout.has_row_marker(line);
        if marked && self.identifier.contains_in(line) {
            return LineKind::Row;
        }

        if !marked && self.identifier.leading(line).is_some() {
            return LineKind::BareContinuation;
        }

        if marked {
            return LineKind::TruncatedRow;
        }

        if self.layout.is_header(line) {
            return LineKind::Header;
        }

        if self.layout.is_summary(line) {
            return LineKind::Summary;
        }

        LineKind::Other
    }
}
