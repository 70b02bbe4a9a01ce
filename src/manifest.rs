// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Content-addressed path manifest.
//!
//! A __manifest__ maps human-friendly paths to content identifiers so a
//! gateway can serve a whole site from one published document. Manifests are
//! built once per deployment from the recovered file records and never
//! change afterwards.
//!
//! # Clean URL Aliases
//!
//! Every HTML page other than the index also gets an alias without its
//! `.html` extension, so `about.html` can be reached as `about`. Aliases are
//! derived only after all canonical paths are settled, and a canonical path
//! always wins over an alias that would collide with it.
//!
//! # Document Layout
//!
//! ```json
//! {
//!   "manifest": "arweave/paths",
//!   "version": "0.2.0",
//!   "index": { "path": "index.html" },
//!   "paths": {
//!     "index.html": { "id": "<identifier>" }
//!   }
//! }
//! ```

use crate::record::FileRecord;

use serde::{Deserialize, Serialize};
use std::{
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
};
use tracing::{debug, instrument};

/// Manifest format name.
pub const MANIFEST_SCHEMA: &str = "arweave/paths";

/// Manifest format version.
pub const MANIFEST_VERSION: &str = "0.2.0";

const HTML_EXTENSION: &str = ".html";

/// Path to identifier mapping served by the storage gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    /// Manifest format name.
    #[serde(rename = "manifest")]
    pub schema_name: String,

    /// Manifest format version.
    #[serde(rename = "version")]
    pub schema_version: String,

    /// Default document, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<ManifestIndex>,

    /// Every servable path, aliases included.
    pub paths: BTreeMap<String, PathEntry>,
}

impl DeploymentManifest {
    /// Construct manifest with no paths and no index.
    pub fn empty() -> Self {
        Self {
            schema_name: MANIFEST_SCHEMA.into(),
            schema_version: MANIFEST_VERSION.into(),
            index: None,
            paths: BTreeMap::new(),
        }
    }

    pub fn index_path(&self) -> Option<&str> {
        self.index.as_ref().map(|index| index.path.as_str())
    }

    /// Look up identifier served for path.
    pub fn resolve(&self, path: &str) -> Option<&str> {
        self.paths.get(path).map(|entry| entry.id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Render manifest as pretty JSON document.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::Serialize`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
    }
}

impl FromStr for DeploymentManifest {
    type Err = ManifestError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(data).map_err(ManifestError::Deserialize)
    }
}

impl Display for DeploymentManifest {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.to_json_pretty()?.as_str())
    }
}

/// Default document of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIndex {
    pub path: String,
}

/// Identifier a path resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub id: String,
}

/// Build manifests from file records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestBuilder {
    index_path: String,
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new("index.html")
    }
}

impl ManifestBuilder {
    /// Construct new manifest builder with designated index path.
    pub fn new(index_path: impl Into<String>) -> Self {
        Self {
            index_path: index_path.into(),
        }
    }

    /// Build manifest from ordered file records.
    ///
    /// Runs in two passes. The canonical pass maps every record path to its
    /// identifier, later records overwriting earlier ones. The alias pass then
    /// adds a clean URL alias for each non-index HTML path unless a canonical
    /// path already owns that alias.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::InvalidState`] if an alias would overwrite
    ///   an existing alias entry.
    #[instrument(skip(self, records), level = "debug")]
    pub fn build<'r>(
        &self,
        records: impl IntoIterator<Item = &'r FileRecord>,
    ) -> Result<DeploymentManifest> {
        let mut manifest = DeploymentManifest::empty();

        // Canonical pass.
        for record in records {
            if record.path == self.index_path {
                manifest.index = Some(ManifestIndex {
                    path: self.index_path.clone(),
                });
            }

            manifest.paths.insert(
                record.path.clone(),
                PathEntry {
                    id: record.identifier.clone(),
                },
            );
        }

        // Alias pass.
        let pages = manifest
            .paths
            .iter()
            .filter(|(path, _)| manifest.index_path() != Some(path.as_str()))
            .filter_map(|(path, entry)| {
                path.strip_suffix(HTML_EXTENSION)
                    .filter(|alias| !alias.is_empty() && !alias.ends_with('/'))
                    .map(|alias| (alias.to_string(), entry.clone()))
            })
            .collect::<Vec<_>>();

        let mut aliases = BTreeSet::new();
        for (alias, entry) in pages {
            match manifest.paths.entry(alias) {
                Entry::Vacant(vacant) => {
                    aliases.insert(vacant.key().clone());
                    vacant.insert(entry);
                }
                // INVARIANT: An alias never replaces another alias.
                Entry::Occupied(occupied) if aliases.contains(occupied.key()) => {
                    return Err(ManifestError::InvalidState {
                        path: occupied.key().clone(),
                    });
                }
                // INVARIANT: Canonical paths always win over aliases.
                Entry::Occupied(occupied) => {
                    debug!("alias {:?} shadowed by canonical path", occupied.key());
                }
            }
        }

        Ok(manifest)
    }
}

/// Manifest error types.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Alias insertion would overwrite an existing entry.
    #[error("alias {path:?} would overwrite an existing manifest entry")]
    InvalidState { path: String },

    /// Failed to serialize manifest.
    #[error(transparent)]
    Serialize(serde_json::Error),

    /// Failed to deserialize manifest.
    #[error(transparent)]
    Deserialize(serde_json::Error),
}

impl From<ManifestError> for FmtError {
    fn from(_: ManifestError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
pub type Result<T, E = ManifestError> = std::result::Result<T, E>;
