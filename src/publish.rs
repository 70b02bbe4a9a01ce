// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Find the published manifest identifier.
//!
//! After uploading, the tool prints a gateway link to the published manifest,
//! e.g., `https://arweave.net/<identifier>`. The identifier in that link is
//! what the publish confirmation shows next to the manifest itself.
//!
//! Some tool versions only print the bare transaction identifier. When no
//! gateway link is present, the last token shaped like an identifier that is
//! not one of the uploaded files is taken instead.

use crate::record::{FileRecord, IdentifierRule};

use regex::Regex;
use tracing::trace;

/// Locate the published manifest identifier in tool output.
#[derive(Debug, Clone)]
pub struct PublishedIdFinder {
    link: Option<Regex>,
    token: Regex,
    identifier: IdentifierRule,
}

impl PublishedIdFinder {
    /// Construct new finder for a set of gateway hosts.
    ///
    /// # Errors
    ///
    /// - Return [`regex::Error`] if link or token patterns cannot be compiled.
    pub fn new(identifier: IdentifierRule, gateways: &[String]) -> Result<Self, regex::Error> {
        let class = format!("[A-Za-z0-9{}]+", regex::escape(&identifier.symbols));
        let token = Regex::new(&class)?;

        // INVARIANT: No gateways means no link can ever match.
        let link = if gateways.is_empty() {
            None
        } else {
            let hosts = gateways
                .iter()
                .map(|gateway| regex::escape(gateway))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(
                r"https?://(?:www\.)?(?:{hosts})/(?P<id>{class})"
            ))?)
        };

        Ok(Self {
            link,
            token,
            identifier,
        })
    }

    /// Find identifier of the published manifest.
    ///
    /// The last gateway link whose identifier passes the identifier rule wins.
    /// Without one, fall back to the last bare identifier that does not belong
    /// to any of the given records.
    pub fn find(&self, raw: &str, records: &[FileRecord]) -> Option<String> {
        self.find_link(raw)
            .or_else(|| self.find_bare(raw, records))
            .map(str::to_string)
    }

    fn find_link<'r>(&self, raw: &'r str) -> Option<&'r str> {
        self.link
            .as_ref()?
            .captures_iter(raw)
            .filter_map(|captures| captures.name("id"))
            .map(|id| id.as_str())
            .filter(|id| self.identifier.matches(id))
            .last()
    }

    fn find_bare<'r>(&self, raw: &'r str, records: &[FileRecord]) -> Option<&'r str> {
        let found = self
            .token
            .find_iter(raw)
            .map(|token| token.as_str())
            .filter(|token| self.identifier.matches(token))
            .filter(|token| token.chars().any(|c| c.is_ascii_alphanumeric()))
            .filter(|token| !records.iter().any(|record| record.identifier == *token))
            .last();

        if let Some(token) = found {
            trace!("no gateway link, using bare identifier {token:?}");
        }

        found
    }
}
