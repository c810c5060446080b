//! # Scene Import CLI
//!
//! Rebuilds a JSON design document on an in-memory canvas and prints the
//! import report.
//!
//! ## Usage
//!
//! ```bash
//! scene-import design.json --pretty
//! scene-import design.json --tree --font "SF Pro Display:Semibold"
//! SCENE_IMPORT_BATCH_SIZE=50 scene-import export.json
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use scene_core::{FontName, MemoryCanvas};
use scene_import::{ImportConfig, ImportProgress, Importer, BATCH_SIZE_ENV, DEFAULT_BATCH_SIZE};
use serde_json::{json, Value};
use tokio::sync::mpsc;

/// Command-line arguments for scene-import.
#[derive(Debug, Clone, Parser)]
#[command(name = "scene-import")]
#[command(about = "Rebuild a JSON design document as a live scene graph")]
#[command(version)]
pub struct CliArgs {
    /// JSON document to import
    pub input: PathBuf,

    /// Top-level records imported concurrently per batch
    #[arg(long, env = BATCH_SIZE_ENV, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Extra font the canvas provides, as FAMILY:STYLE (repeatable)
    #[arg(long = "font", value_parser = parse_font)]
    pub fonts: Vec<FontName>,

    /// Font text lands on when nothing better is available, as FAMILY:STYLE
    #[arg(long, value_parser = parse_font)]
    pub default_font: Option<FontName>,

    /// Include the resulting node tree in the output
    #[arg(long)]
    pub tree: bool,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
}

/// Parse `FAMILY:STYLE`; a bare family means its regular style.
///
/// # Errors
///
/// Returns an error message when the family is empty.
pub fn parse_font(value: &str) -> Result<FontName, String> {
    let (family, style) = value.rsplit_once(':').unwrap_or((value, "Regular"));
    let family = family.trim();
    let style = style.trim();
    if family.is_empty() {
        return Err(format!("invalid font '{value}', expected FAMILY:STYLE"));
    }
    Ok(FontName::new(
        family,
        if style.is_empty() { "Regular" } else { style },
    ))
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Document to import.
    pub input: PathBuf,
    /// Fonts registered on the canvas on top of the built-in families.
    pub extra_fonts: Vec<FontName>,
    /// Import tunables.
    pub import: ImportConfig,
    /// Include the node tree in the output.
    pub include_tree: bool,
    /// Pretty-print the output.
    pub pretty: bool,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        let mut import = ImportConfig::default().with_batch_size(args.batch_size);
        if let Some(font) = args.default_font {
            import = import.with_default_font(font);
        }
        Self {
            input: args.input,
            extra_fonts: args.fonts,
            import,
            include_tree: args.tree,
            pretty: args.pretty,
        }
    }
}

/// Import the configured document and build the output value.
///
/// The output is the import report, or `{"report", "tree"}` when the tree
/// is requested.
///
/// # Errors
///
/// Returns an error if the input cannot be read or holds no importable
/// document.
pub async fn run(config: &CliConfig) -> anyhow::Result<Value> {
    let json = tokio::fs::read_to_string(&config.input)
        .await
        .with_context(|| format!("Failed to read {}", config.input.display()))?;

    let mut fonts = config.extra_fonts.clone();
    fonts.push(config.import.default_font.clone());
    let canvas = Arc::new(MemoryCanvas::new().with_fonts(fonts));

    let (tx, mut rx) = mpsc::unbounded_channel::<ImportProgress>();
    let logger = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            tracing::info!(
                current = progress.current,
                total = progress.total,
                "{}",
                progress.message
            );
        }
    });

    let importer = Importer::new(canvas.clone())
        .with_config(config.import.clone())
        .with_progress(tx);
    let result = importer.import_json(&json, None).await;
    drop(importer);
    if let Err(e) = logger.await {
        tracing::warn!(error = %e, "Progress logger stopped");
    }

    let report = result.with_context(|| format!("Failed to import {}", config.input.display()))?;
    tracing::info!(
        roots = report.roots.len(),
        created = report.summary.created,
        issues = report.summary.issues.len(),
        "Imported {}",
        config.input.display()
    );

    let report = serde_json::to_value(&report)?;
    Ok(if config.include_tree {
        json!({ "report": report, "tree": canvas.to_tree_json() })
    } else {
        report
    })
}

/// Render the output value as text.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(value: &Value, pretty: bool) -> anyhow::Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}
