// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Deployment manifest reconciliation pipeline.
//!
//! Turns the captured output of one upload tool run into a manifest and
//! preview statistics:
//!
//! ```text
//! raw text -> reassemble -> extract -> records -> { manifest, preview stats }
//! ```
//!
//! The pipeline is synchronous and holds no state between runs. Callers are
//! expected to buffer the tool's output until the process exits and then
//! reconcile the complete buffer once.

use crate::{
    config::ReconcilerConfig,
    diagnostic::Diagnostic,
    extract::RecordExtractor,
    manifest::{DeploymentManifest, ManifestBuilder, ManifestError},
    publish::PublishedIdFinder,
    reassemble::LineReassembler,
    record::FileRecord,
    summary::{summarize, PreviewStats},
};

use tracing::{info, instrument};

/// Reconcile upload tool output into deployment artifacts.
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: ReconcilerConfig,
    extractor: RecordExtractor,
    builder: ManifestBuilder,
    publish: PublishedIdFinder,
}

impl Reconciler {
    /// Construct new reconciler from configuration.
    ///
    /// # Errors
    ///
    /// - Return [`ReconcileError::Pattern`] if the configured row marker or
    ///   gateway hosts cannot be compiled into patterns.
    pub fn new(config: ReconcilerConfig) -> Result<Self> {
        let extractor =
            RecordExtractor::new(&config.scan.row_marker, config.identifier.clone())?;
        let builder = ManifestBuilder::new(config.manifest.index_path.clone());
        let publish = PublishedIdFinder::new(config.identifier.clone(), &config.scan.gateways)?;

        Ok(Self {
            config,
            extractor,
            builder,
            publish,
        })
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconcile captured tool output.
    ///
    /// Malformed rows, unreadable sizes, and repeated paths are reported as
    /// diagnostics on the result. Finding no records at all is not an error
    /// either: the result carries an empty manifest and
    /// [`Diagnostic::EmptyInput`].
    ///
    /// # Errors
    ///
    /// - Return [`ReconcileError::NoOutput`] if raw output is blank.
    /// - Return [`ReconcileError::Manifest`] if manifest construction breaks
    ///   its alias invariant.
    #[instrument(skip(self, raw), level = "debug")]
    pub fn reconcile(&self, raw: &str) -> Result<Reconciliation> {
        if raw.trim().is_empty() {
            return Err(ReconcileError::NoOutput);
        }

        let candidates = LineReassembler::new(&self.config.scan, &self.config.identifier)
            .reassemble(raw.lines());
        let extraction = self.extractor.extract_all(&candidates);

        let mut diagnostics = Vec::new();
        diagnostics.extend(extraction.skipped.into_iter().map(|skipped| {
            Diagnostic::MalformedLine {
                line_number: skipped.line_number,
                text: skipped.text,
                reason: skipped.reason,
            }
        }));
        diagnostics.extend(extraction.superseded.into_iter().map(|old| {
            Diagnostic::SupersededRecord {
                path: old.path,
                identifier: old.identifier,
            }
        }));

        let records = extraction.records.into_vec();
        let manifest = self.builder.build(&records)?;
        let (stats, size_diagnostics) = summarize(&records);
        diagnostics.extend(size_diagnostics);

        if records.is_empty() {
            diagnostics.push(Diagnostic::EmptyInput);
        }

        for diagnostic in &diagnostics {
            diagnostic.log();
        }

        let published_id = self.publish.find(raw, &records);

        info!(
            "recovered {} records ({}), {} manifest paths",
            stats.file_count,
            stats.total_bytes_human,
            manifest.paths.len()
        );

        Ok(Reconciliation {
            records,
            manifest,
            stats,
            diagnostics,
            published_id,
        })
    }
}

/// Artifacts of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Recovered records in order of first sighting, unique by path.
    pub records: Vec<FileRecord>,

    /// Manifest built from the records.
    pub manifest: DeploymentManifest,

    /// Preview statistics of the records.
    pub stats: PreviewStats,

    /// Everything that went wrong without stopping the run.
    pub diagnostics: Vec<Diagnostic>,

    /// Identifier of the published manifest if the tool printed its link.
    pub published_id: Option<String>,
}

impl Reconciliation {
    /// Nothing was recovered, so there is nothing to publish.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of candidate lines that failed extraction.
    pub fn skipped_lines(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| matches!(diagnostic, Diagnostic::MalformedLine { .. }))
            .count()
    }
}

/// Reconciliation error types.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Upload tool produced no output at all.
    #[error("upload tool produced no output")]
    NoOutput,

    /// Row grammar cannot be compiled from configuration.
    #[error("invalid row marker or gateway in configuration")]
    Pattern(#[from] regex::Error),

    /// Manifest construction failed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Friendly result alias :3
pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::formatdoc;
    use pretty_assertions::assert_eq;

    const INDEX_ID: &str = "bNbA3TEQVL60xlgCcqdz4ZPHFZ711cZ3hmkpGttDt_U";

    #[test]
    fn blank_output_is_an_error() {
        let reconciler = Reconciler::new(ReconcilerConfig::default()).unwrap();

        assert!(matches!(
            reconciler.reconcile(" \n\n"),
            Err(ReconcileError::NoOutput)
        ));
    }

    #[test]
    fn no_records_yields_empty_manifest() -> anyhow::Result<()> {
        let reconciler = Reconciler::new(ReconcilerConfig::default())?;

        let result = reconciler.reconcile("Error: wallet not found\n")?;
        assert!(result.is_empty());
        assert_eq!(result.manifest, DeploymentManifest::empty());
        assert_eq!(result.stats.file_count, 0);
        assert_eq!(result.stats.total_bytes_human, "0 B");
        assert_eq!(result.diagnostics, vec![Diagnostic::EmptyInput]);

        Ok(())
    }

    #[test]
    fn published_id_falls_back_to_bare_identifier() -> anyhow::Result<()> {
        let reconciler = Reconciler::new(ReconcilerConfig::default())?;
        let manifest_id = "mAn1fEsT-0123456789_abcdefghijklmnopqrstuvw";

        let raw = formatdoc! {"
            ID Size Fee Type Path
            * {INDEX_ID}  14.96 kB  0.000012 AR  text/html  index.html
            Summary
            Manifest TX: {manifest_id}
        "};

        let result = reconciler.reconcile(&raw)?;
        assert_eq!(result.published_id.as_deref(), Some(manifest_id));

        Ok(())
    }

    #[test]
    fn custom_row_marker_is_escaped() -> anyhow::Result<()> {
        let mut config = ReconcilerConfig::default();
        config.scan.row_marker = "|".into();
        let reconciler = Reconciler::new(config)?;

        let raw = formatdoc! {"
            ID Size Fee Type Path
            | {INDEX_ID}  14.96 kB  0.000012 AR  text/html  index.html
            Summary
        "};

        let result = reconciler.reconcile(&raw)?;
        assert_eq!(result.manifest.resolve("index.html"), Some(INDEX_ID));
        assert!(result.diagnostics.is_empty());

        Ok(())
    }
}
