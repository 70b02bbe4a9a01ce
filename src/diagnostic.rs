// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Non-fatal reconciliation diagnostics.
//!
//! Problems found while reading tool output never abort a run. They are
//! collected as diagnostics and handed back next to the successful result so
//! callers can decide how loudly to report them.

use crate::extract::Rejection;

use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::{debug, warn};

/// Issue found during reconciliation that did not stop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Candidate line in the file list did not yield a record.
    MalformedLine {
        line_number: usize,
        text: String,
        reason: Rejection,
    },

    /// Record size could not be converted to bytes, so it counts as zero.
    UnparseableSize { path: String, size_text: String },

    /// Path was listed more than once, the earlier listing was dropped.
    SupersededRecord { path: String, identifier: String },

    /// No records were recovered, so there is nothing to publish.
    EmptyInput,
}

impl Diagnostic {
    /// Emit diagnostic through the tracing subscriber.
    pub fn log(&self) {
        match self {
            Self::SupersededRecord { .. } => debug!("{self}"),
            _ => warn!("{self}"),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MalformedLine {
                line_number,
                text,
                reason,
            } => write!(fmt, "skipped line {line_number} ({reason}): {text:?}"),
            Self::UnparseableSize { path, size_text } => {
                write!(fmt, "cannot read size {size_text:?} of {path:?}, counting zero bytes")
            }
            Self::SupersededRecord { path, identifier } => {
                write!(fmt, "{path:?} listed again, dropped earlier identifier {identifier}")
            }
            Self::EmptyInput => fmt.write_str("no file records found, nothing to publish"),
        }
    }
}
