// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout for the configuration file that weavemap uses to tune
//! how upload tool output is scanned, how identifiers are validated, and
//! where manifests are written. Every table is optional, so an empty file (or
//! no file at all) yields the defaults that match the upload tool's stock
//! output.

use crate::record::IdentifierRule;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::info;

/// Reconciler configuration layout.
///
/// # General Layout
///
/// The configuration is composed of four tables: `scan` describes the
/// section markers of the upload tool's output, `identifier` describes what
/// a valid content identifier looks like, `manifest` tunes manifest
/// construction, and `output` says where built manifests should land.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ReconcilerConfig {
    /// Markers used to find file rows in tool output.
    #[serde(default)]
    pub scan: ScanLayout,

    /// Shape of a valid content identifier.
    #[serde(default)]
    pub identifier: IdentifierRule,

    /// Manifest construction settings.
    #[serde(default)]
    pub manifest: ManifestSettings,

    /// Output location settings.
    #[serde(default)]
    pub output: OutputSettings,
}

impl ReconcilerConfig {
    /// Load configuration from file.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file content is not valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        read_to_string(path)
            .map_err(|err| ConfigError::Read {
                source: err,
                config_path: path.to_path_buf(),
            })?
            .parse()
    }

    /// Load configuration from file, or use defaults if file does not exist.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError`] if file exists but cannot be loaded.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no configuration at {:?}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load(path)
    }
}

impl FromStr for ReconcilerConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: ReconcilerConfig =
            toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on manifest output path.
        if let Some(manifest_path) = config.output.manifest_path.take() {
            config.output.manifest_path = Some(ManifestPath::new(
                shellexpand::full(manifest_path.to_string().as_str())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        Ok(config)
    }
}

impl Display for ReconcilerConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Section markers of the upload tool's output.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanLayout {
    /// Token that starts every file row.
    pub row_marker: String,

    /// Column names that must all appear on the file list header line.
    pub header_tokens: Vec<String>,

    /// Any one of these ends the file list.
    pub summary_markers: Vec<String>,

    /// Gateway hosts the tool prints links to.
    pub gateways: Vec<String>,
}

impl Default for ScanLayout {
    fn default() -> Self {
        Self {
            row_marker: "*".into(),
            header_tokens: vec!["ID".into(), "Size".into(), "Type".into(), "Path".into()],
            summary_markers: vec!["Summary".into(), "Total size:".into()],
            gateways: vec!["arweave.net".into()],
        }
    }
}

impl ScanLayout {
    /// Line carries every column header token.
    pub fn is_header(&self, line: &str) -> bool {
        !self.header_tokens.is_empty()
            && self
                .header_tokens
                .iter()
                .all(|token| line.contains(token.as_str()))
    }

    /// Line carries any summary marker.
    pub fn is_summary(&self, line: &str) -> bool {
        self.summary_markers
            .iter()
            .any(|marker| line.contains(marker.as_str()))
    }

    /// Line starts with the row marker, ignoring indentation.
    pub fn has_row_marker(&self, line: &str) -> bool {
        line.trim_start().starts_with(self.row_marker.as_str())
    }
}

/// Manifest construction settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManifestSettings {
    /// Path designated as the default document when present.
    pub index_path: String,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            index_path: "index.html".into(),
        }
    }
}

/// Output location settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct OutputSettings {
    /// Where to write built manifests instead of standard output.
    pub manifest_path: Option<ManifestPath>,
}

/// Path to write manifest documents to.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ManifestPath(PathBuf);

impl ManifestPath {
    /// Construct new manifest path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Treat manifest path as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.0.as_path()
    }
}

impl Display for ManifestPath {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_path().to_string_lossy().as_ref())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file cannot be read.
    #[error("failed to read configuration at {:?}", config_path.display())]
    Read {
        #[source]
        source: std::io::Error,
        config_path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("DEPLOY_ROOT", "/srv/deploy")])]
    fn deserialize_reconciler_config() -> anyhow::Result<()> {
        let result: ReconcilerConfig = r#"
            [scan]
            row_marker = ">"
            header_tokens = ["ID", "Path"]
            summary_markers = ["Done"]
            gateways = ["gateway.example"]

            [identifier]
            min_length = 40
            max_length = 44
            symbols = "-"

            [manifest]
            index_path = "home.html"

            [output]
            manifest_path = "$DEPLOY_ROOT/manifest.json"
        "#
        .parse()?;

        let expect = ReconcilerConfig {
            scan: ScanLayout {
                row_marker: ">".into(),
                header_tokens: vec!["ID".into(), "Path".into()],
                summary_markers: vec!["Done".into()],
                gateways: vec!["gateway.example".into()],
            },
            identifier: IdentifierRule {
                min_length: 40,
                max_length: 44,
                symbols: "-".into(),
            },
            manifest: ManifestSettings {
                index_path: "home.html".into(),
            },
            output: OutputSettings {
                manifest_path: Some(ManifestPath::new("/srv/deploy/manifest.json")),
            },
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_partial_config_uses_defaults() -> anyhow::Result<()> {
        let result: ReconcilerConfig = r#"
            [identifier]
            max_length = 64
        "#
        .parse()?;

        let expect = ReconcilerConfig {
            identifier: IdentifierRule {
                max_length: 64,
                ..IdentifierRule::default()
            },
            ..ReconcilerConfig::default()
        };

        assert_eq!(result, expect);
        assert_eq!("".parse::<ReconcilerConfig>()?, ReconcilerConfig::default());

        Ok(())
    }

    #[test]
    fn serialized_config_parses_back() -> anyhow::Result<()> {
        let config = ReconcilerConfig {
            manifest: ManifestSettings {
                index_path: "main.html".into(),
            },
            output: OutputSettings {
                manifest_path: Some(ManifestPath::new("/tmp/manifest.json")),
            },
            ..ReconcilerConfig::default()
        };

        let result: ReconcilerConfig = config.to_string().parse()?;
        assert_eq!(result, config);

        Ok(())
    }

    #[test]
    fn scan_layout_markers() {
        let layout = ScanLayout::default();

        assert!(layout.is_header("ID    Size    Fee    Type    Path"));
        assert!(layout.is_header("Path Type Size ID"));
        assert!(!layout.is_header("ID    Size    Fee"));
        assert!(layout.is_summary("Summary"));
        assert!(layout.is_summary("Total size: 30.47 kB"));
        assert!(!layout.is_summary("Number of files: 4"));
        assert!(layout.has_row_marker("   * abc"));
        assert!(!layout.has_row_marker("abc *"));
    }
}
