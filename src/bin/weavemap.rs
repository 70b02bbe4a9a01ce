// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use weavemap::{config::ReconcilerConfig, path::default_config_path, Reconciler, Reconciliation};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  weavemap [options] <command> [tool_output]",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let reconciler = Reconciler::new(load_config(self.config)?)?;
        match self.command {
            Command::Manifest(opts) => run_manifest(&reconciler, opts),
            Command::Preview(opts) => run_preview(&reconciler, opts),
            Command::Records(opts) => run_records(&reconciler, opts),
            Command::PublishedId(opts) => run_published_id(&reconciler, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Build path manifest from upload tool output.
    #[command(override_usage = "weavemap manifest [options] [tool_output]")]
    Manifest(ManifestOptions),

    /// Show file count and total size of upload tool output.
    #[command(override_usage = "weavemap preview [options] [tool_output]")]
    Preview(PreviewOptions),

    /// List file records recovered from upload tool output.
    #[command(override_usage = "weavemap records [options] [tool_output]")]
    Records(InputOptions),

    /// Show identifier of the published manifest.
    #[command(override_usage = "weavemap published-id [options] [tool_output]")]
    PublishedId(InputOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InputOptions {
    /// Captured upload tool output, "-" or nothing for standard input.
    #[arg(value_name = "tool_output")]
    pub input: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ManifestOptions {
    /// Captured upload tool output, "-" or nothing for standard input.
    #[arg(value_name = "tool_output")]
    pub input: Option<PathBuf>,

    /// Write manifest to file instead of standard output.
    #[arg(short, long, value_name = "path")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PreviewOptions {
    /// Captured upload tool output, "-" or nothing for standard input.
    #[arg(value_name = "tool_output")]
    pub input: Option<PathBuf>,

    /// Print statistics as JSON.
    #[arg(short, long)]
    pub json: bool,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn load_config(path: Option<PathBuf>) -> Result<ReconcilerConfig> {
    let config = match path {
        Some(path) => ReconcilerConfig::load(path)?,
        None => ReconcilerConfig::load_or_default(default_config_path()?)?,
    };

    Ok(config)
}

fn reconcile_input(reconciler: &Reconciler, input: Option<&Path>) -> Result<Reconciliation> {
    let raw = match input {
        Some(path) if path != Path::new("-") => read_to_string(path)
            .with_context(|| format!("failed to read tool output at {:?}", path.display()))?,
        _ => std::io::read_to_string(std::io::stdin())
            .context("failed to read tool output from standard input")?,
    };

    Ok(reconciler.reconcile(&raw)?)
}

fn run_manifest(reconciler: &Reconciler, opts: ManifestOptions) -> Result<()> {
    let reconciliation = reconcile_input(reconciler, opts.input.as_deref())?;
    let document = reconciliation.manifest.to_json_pretty()?;

    let output = opts.output.or_else(|| {
        reconciler
            .config()
            .output
            .manifest_path
            .as_ref()
            .map(|path| path.as_path().to_path_buf())
    });

    match output {
        Some(path) => {
            // INVARIANT: Create parent directories of output path if needed.
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                mkdirp::mkdirp(parent)
                    .with_context(|| format!("failed to create {:?}", parent.display()))?;
            }

            write(&path, format!("{document}\n"))
                .with_context(|| format!("failed to write manifest to {:?}", path.display()))?;
            info!(
                "wrote manifest with {} paths to {:?}",
                reconciliation.manifest.paths.len(),
                path.display()
            );
        }
        None => println!("{document}"),
    }

    Ok(())
}

fn run_preview(reconciler: &Reconciler, opts: PreviewOptions) -> Result<()> {
    let reconciliation = reconcile_input(reconciler, opts.input.as_deref())?;
    let stats = &reconciliation.stats;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("files: {}", stats.file_count);
    println!(
        "total size: {} ({} bytes)",
        stats.total_bytes_human, stats.total_bytes
    );
    if let Some(index) = reconciliation.manifest.index_path() {
        println!("index: {index}");
    }
    if reconciliation.skipped_lines() > 0 {
        println!("skipped lines: {}", reconciliation.skipped_lines());
    }

    Ok(())
}

fn run_records(reconciler: &Reconciler, opts: InputOptions) -> Result<()> {
    let reconciliation = reconcile_input(reconciler, opts.input.as_deref())?;
    for record in &reconciliation.records {
        println!(
            "{}\t{}\t{}\t{}",
            record.identifier, record.size_text, record.content_type, record.path
        );
    }

    Ok(())
}

fn run_published_id(reconciler: &Reconciler, opts: InputOptions) -> Result<()> {
    let reconciliation = reconcile_input(reconciler, opts.input.as_deref())?;
    match reconciliation.published_id {
        Some(id) => println!("{id}"),
        None => bail!("no published manifest link found in tool output"),
    }

    Ok(())
}
