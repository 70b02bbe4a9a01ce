// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Uploaded file records.
//!
//! A __record__ is the metadata of one uploaded file as reported by the
//! external upload tool: its content identifier, the human-readable size the
//! tool printed, the MIME type, and the relative path it was uploaded under.
//! Records only live for the duration of one reconciliation run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One uploaded file as reported by the upload tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Content identifier of the stored file.
    pub identifier: String,

    /// Size string exactly as the tool printed it, e.g., "14.96 kB".
    pub size_text: String,

    /// MIME type as reported.
    pub content_type: String,

    /// Relative POSIX-style path the file was uploaded under.
    pub path: String,
}

impl FileRecord {
    /// Construct new file record.
    pub fn new(
        identifier: impl Into<String>,
        size_text: impl Into<String>,
        content_type: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            size_text: size_text.into(),
            content_type: content_type.into(),
            path: path.into(),
        }
    }
}

/// Shape of a valid content identifier.
///
/// The storage backend addresses content with fixed-length tokens drawn from
/// ASCII alphanumerics plus a small set of symbols. Length and symbol set are
/// configurable so other backends can be targeted without code changes.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentifierRule {
    /// Minimum token length in characters.
    pub min_length: usize,

    /// Maximum token length in characters.
    pub max_length: usize,

    /// Symbols allowed in addition to ASCII alphanumerics.
    pub symbols: String,
}

impl Default for IdentifierRule {
    fn default() -> Self {
        Self {
            min_length: 43,
            max_length: 43,
            symbols: "-_".into(),
        }
    }
}

impl IdentifierRule {
    /// Check if token is a well-formed identifier.
    pub fn matches(&self, token: &str) -> bool {
        let length = token.chars().count();
        (self.min_length..=self.max_length).contains(&length)
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || self.symbols.contains(c))
    }

    /// Get the first whitespace separated token of line if it is an identifier.
    pub fn leading<'l>(&self, line: &'l str) -> Option<&'l str> {
        line.split_whitespace()
            .next()
            .filter(|token| self.matches(token))
    }

    /// Check if any whitespace separated token of line is an identifier.
    pub fn contains_in(&self, line: &str) -> bool {
        line.split_whitespace().any(|token| self.matches(token))
    }
}

/// Ordered collection of records with unique paths.
///
/// # Invariant
///
/// - No two records share a path.
/// - A record inserted under an existing path replaces the old one in place,
///   so ordering follows first sighting while content follows last sighting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<FileRecord>,
    positions: HashMap<String, usize>,
}

impl RecordSet {
    /// Construct new empty record set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert record, returning the record it superseded if any.
    pub fn insert(&mut self, record: FileRecord) -> Option<FileRecord> {
        match self.positions.get(&record.path) {
            Some(&position) => Some(std::mem::replace(&mut self.records[position], record)),
            None => {
                self.positions
                    .insert(record.path.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.positions.get(path).map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[FileRecord] {
        self.records.as_slice()
    }

    pub fn into_vec(self) -> Vec<FileRecord> {
        self.records
    }
}

impl FromIterator<FileRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut set = RecordSet::new();
        for record in iter {
            set.insert(record);
        }

        set
    }
}
