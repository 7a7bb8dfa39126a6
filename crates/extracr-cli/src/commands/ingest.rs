//! Ingest command - recognize images and store their text and fields.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use extracr_core::models::config::IngestConfig;
use extracr_core::{DocumentParser, ImagePreprocessor, IngestPipeline, PureOcrEngine, SqliteStore};

use super::load_config;

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Image files or directories (searched recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Database file (overrides config)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Model directory (overrides config)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Don't print parsed fields
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: IngestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(database) = &args.database {
        config.store.database_path = database.clone();
    }
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }

    // Store and models are needed by every item, so failures here are fatal
    let store = SqliteStore::open(&config.store.database_path)?;
    let engine = PureOcrEngine::from_config(config.ocr.clone())
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;

    let files = collect_inputs(&args.inputs, &config.ingest)?;
    if files.is_empty() {
        println!("{} No images found to process.", style("ℹ").blue());
        return Ok(());
    }

    println!(
        "{} Found {} images to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images")?
            .progress_chars("=>-"),
    );

    let preprocessor = ImagePreprocessor::from_config(&config.preprocess);
    let parser = DocumentParser::from_config(&config.balance_sheet)?;
    let mut pipeline = IngestPipeline::new(preprocessor, engine, store).with_parser(parser);

    let quiet = args.quiet;
    let report = pipeline.ingest_batch(&files, |path, result| {
        match result {
            Ok(doc) => pb.suspend(|| {
                println!(
                    "{} Saved OCR (id={}) for: {}",
                    style("✓").green(),
                    doc.id,
                    path.display()
                );
                if !quiet && !doc.fields.is_empty() {
                    println!("     Parsed fields:");
                    match serde_json::to_string_pretty(&doc.fields) {
                        Ok(json) => println!("{}", json),
                        Err(e) => debug!("Could not render fields: {}", e),
                    }
                }
            }),
            Err(e) => pb.suspend(|| {
                eprintln!("{} {}", style("⚠").yellow(), e);
            }),
        }
        pb.inc(1);
    });

    pb.finish_and_clear();

    println!();
    println!(
        "{} Processed {} images in {:?}",
        style("✓").green(),
        report.total(),
        start.elapsed()
    );
    println!(
        "   {} stored, {} failed",
        style(report.ingested.len()).green(),
        style(report.failed.len()).red()
    );

    if !report.failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for error in &report.failed {
            println!("  - {}: {}", error.path().display(), error);
        }
    }

    Ok(())
}

/// Expand directories into the image files beneath them; plain file arguments
/// are kept as given.
fn collect_inputs(inputs: &[PathBuf], ingest: &IngestConfig) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = glob(&directory_pattern(input))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file() && ingest.accepts(p))
                .collect();
            found.sort();
            debug!("Found {} images under {}", found.len(), input.display());
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    Ok(files)
}

fn directory_pattern(dir: &Path) -> String {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    format!("{}/**/*", escaped.trim_end_matches('/'))
}
