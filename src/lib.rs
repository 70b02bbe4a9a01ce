// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Deployment manifest reconciliation.
//!
//! The batch upload tool reports what it stored as a wrapped, multi-section
//! text table. Weavemap recovers a faithful record of every uploaded file from
//! that text, builds the content-addressed path manifest a gateway serves the
//! deployment from, and derives preview statistics for the same files.
//!
//! # Pipeline
//!
//! 1. [`reassemble`] restores one row line per file out of wrapped output.
//! 2. [`extract`] parses each row line into a [`FileRecord`].
//! 3. [`manifest`] builds the [`DeploymentManifest`] with clean URL aliases.
//! 4. [`summary`] derives [`PreviewStats`].
//!
//! [`Reconciler`] runs all of them over one captured output buffer.

pub mod config;
pub mod diagnostic;
pub mod extract;
pub mod manifest;
pub mod path;
pub mod publish;
pub mod reassemble;
pub mod reconcile;
pub mod record;
pub mod summary;

pub use config::ReconcilerConfig;
pub use diagnostic::Diagnostic;
pub use manifest::{DeploymentManifest, ManifestBuilder};
pub use reconcile::{Reconciler, Reconciliation};
pub use record::{FileRecord, IdentifierRule};
pub use summary::PreviewStats;
