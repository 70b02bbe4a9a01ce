// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use indoc::formatdoc;

pub(crate) const INDEX_ID: &str = "bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkpGttDt_U";
pub(crate) const ABOUT_ID: &str = "Xz9-kq2Lm4Np7Rs0Tu3Vw6Yx8Za1Bc5De7Fg9Hi2Jk4";
pub(crate) const CSS_ID: &str = "q8LmN3pQ5rS7tU9vW1xY3zA5bC7dE9fG1hI3jK5lM7n";
pub(crate) const SCRIPT_ID: &str = "Z_0aB1cD2eF3gH4iJ5kL6mN7oP8qR9sT0uV1wX2yZ3a";
pub(crate) const MANIFEST_ID: &str = "mAn1fEsT-0123456789_abcdefghijklmnopqrstuvw";

/// Captured output of an upload tool run.
///
/// Builds transcripts shaped like the real tool's: banner, table header, one
/// row per file, summary block, and the gateway link of the manifest.
#[derive(Debug, Default, Clone)]
pub(crate) struct Transcript {
    rows: Vec<String>,
}

impl Transcript {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn row(
        mut self,
        id: &str,
        size: &str,
        content_type: &str,
        path: &str,
    ) -> Self {
        self.rows.push(format!(
            "* {id}  {size}  0.000001234 AR  {content_type}  {path}"
        ));
        self
    }

    /// Push a row with its marker and identifier on separate lines.
    pub(crate) fn wrapped_row(
        mut self,
        id: &str,
        size: &str,
        content_type: &str,
        path: &str,
    ) -> Self {
        self.rows.push("*".into());
        self.rows.push(format!(
            "{id}  {size}  0.000001234 AR  {content_type}  {path}"
        ));
        self
    }

    pub(crate) fn raw_line(mut self, line: impl Into<String>) -> Self {
        self.rows.push(line.into());
        self
    }

    pub(crate) fn render(&self) -> String {
        let rows = self.rows.join("\n");
        formatdoc! {"
            arkb v1.1.61
            Preparing files from ./public...
            Wallet loaded.

            ID                                           Size        Fee              Type                      Path
            {rows}

            Summary
            Index: index.html
            Number of files: {count}
            Total size: 30.47 kB
            Fees: 0.000004936 AR

            Deployed! Visit https://arweave.net/{MANIFEST_ID} to see your deployment.
        ", count = self.rows.len()}
    }
}
