//! OCR command - recognize text in screenshots and stage it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use rescue_core::models::config::RescueConfig;
use rescue_core::{
    Attempt, FunctionsClient, ImagePayload, IntakeSession, MemoryReportStore, OcrText, ReportStore,
};

/// Arguments for the ocr command.
#[derive(Args)]
pub struct OcrArgs {
    /// Image files or glob patterns
    #[arg(required = true)]
    patterns: Vec<String>,

    /// Skip images that fail instead of stopping
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: OcrArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::config::load(config_path)?;
    let files = expand_patterns(&args.patterns)?;

    let session = intake_session(&config, Arc::new(MemoryReportStore::new()))?;
    let recognized = attach_images(&session, &files, args.continue_on_error).await?;

    if recognized == 0 {
        eprintln!("{} No text found in any image", style("⚠").yellow());
        return Ok(());
    }

    println!("{}", session.staged_text());

    Ok(())
}

/// Build an intake session against the configured backend.
pub fn intake_session(
    config: &RescueConfig,
    store: Arc<dyn ReportStore>,
) -> anyhow::Result<IntakeSession> {
    let client = Arc::new(FunctionsClient::from_config(&config.service)?);

    Ok(IntakeSession::new(client.clone(), client, store)
        .with_limits(config.intake.image_limits())
        .with_defaults(config.intake.report_defaults()))
}

/// Expand glob patterns into existing files, in order, without duplicates.
pub fn expand_patterns(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let before = files.len();
        for path in glob(pattern)?.filter_map(|r| r.ok()) {
            if path.is_file() && !files.contains(&path) {
                files.push(path);
            }
        }
        if files.len() == before {
            anyhow::bail!("No matching files found for pattern: {}", pattern);
        }
    }

    Ok(files)
}

/// OCR each file into the session's staged text. Returns how many images
/// contributed text.
pub async fn attach_images(
    session: &IntakeSession,
    files: &[PathBuf],
    continue_on_error: bool,
) -> anyhow::Result<usize> {
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images")?
            .progress_chars("=>-"),
    );

    let mut recognized = 0;
    for path in files {
        match attach_one(session, path).await {
            Ok(true) => recognized += 1,
            Ok(false) => debug!("No text in {}", path.display()),
            Err(e) if continue_on_error => {
                warn!("Skipping {}: {}", path.display(), e);
                pb.println(format!("{} {}: {}", style("⚠").yellow(), path.display(), e));
            }
            Err(e) => {
                pb.abandon();
                anyhow::bail!("{}: {}", path.display(), e);
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(recognized)
}

async fn attach_one(session: &IntakeSession, path: &Path) -> anyhow::Result<bool> {
    let extension = path.extension().and_then(|ext| ext.to_str());
    let image = ImagePayload::sniff_or_extension(fs::read(path)?, extension)?;
    debug!("{} is {} ({} bytes)", path.display(), image.mime_type(), image.len());

    match session.attach_image(image).await? {
        Attempt::Ran(OcrText::Text(_)) => Ok(true),
        Attempt::Ran(OcrText::NoText) => Ok(false),
        Attempt::AlreadyRunning => anyhow::bail!("another OCR call is already running"),
    }
}
