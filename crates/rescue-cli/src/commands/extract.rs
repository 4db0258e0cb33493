//! Extract command - full intake: OCR, extraction, routing and storage.

use std::fs;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use rescue_core::{
    Attempt, IntakeSession, MemoryReportStore, Report, ReportCandidate, ReportStore,
    RestReportStore, SubmitOutcome,
};

use super::ocr::{attach_images, expand_patterns, intake_session};
use super::output::{emit, format_candidates, format_report, spinner, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Message text
    #[arg(short, long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the message from a file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Screenshots to OCR and append (files or glob patterns)
    #[arg(short, long = "image")]
    images: Vec<String>,

    /// Which report to store when several are found (1-based)
    #[arg(long)]
    pick: Option<usize>,

    /// Extract without writing to the report table
    #[arg(long)]
    dry_run: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    let store: Arc<dyn ReportStore> = if args.dry_run {
        info!("Dry run: reports are kept in memory");
        Arc::new(MemoryReportStore::new())
    } else {
        Arc::new(RestReportStore::from_config(&config.service, &config.store)?)
    };
    let session = intake_session(&config, store)?;

    session.stage_text(&read_message(&args)?);

    if !args.images.is_empty() {
        let files = expand_patterns(&args.images)?;
        attach_images(&session, &files, false).await?;
    }

    let pb = spinner("Extracting reports...")?;
    let outcome = session.submit().await;
    pb.finish_and_clear();

    let report = match outcome? {
        Attempt::Ran(SubmitOutcome::Created(report)) => report,
        Attempt::Ran(SubmitOutcome::NothingExtracted) => {
            eprintln!("{} No report found in the message", style("⚠").yellow());
            return Ok(());
        }
        Attempt::Ran(SubmitOutcome::ChooseCandidate(candidates)) => {
            choose(&session, &candidates, args.pick).await?
        }
        Attempt::AlreadyRunning => anyhow::bail!("an extraction is already running"),
    };

    eprintln!(
        "{} {} report {}",
        style("✓").green(),
        if args.dry_run { "Extracted" } else { "Created" },
        report.id
    );

    emit(&format_report(&report, args.format)?, args.output.as_deref())?;

    debug!("Total time: {:?}", start.elapsed());

    Ok(())
}

fn read_message(args: &ExtractArgs) -> anyhow::Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        return Ok(fs::read_to_string(path)?);
    }

    let stdin = std::io::stdin();
    if args.images.is_empty() && !stdin.is_terminal() {
        let mut buf = String::new();
        stdin.lock().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    Ok(String::new())
}

async fn choose(
    session: &IntakeSession,
    candidates: &[ReportCandidate],
    pick: Option<usize>,
) -> anyhow::Result<Report> {
    let Some(pick) = pick else {
        eprintln!(
            "{} Found {} reports:\n{}",
            style("ℹ").blue(),
            candidates.len(),
            format_candidates(candidates)
        );
        anyhow::bail!("Several reports found. Re-run with --pick <N> to store one.");
    };

    if pick == 0 {
        anyhow::bail!("--pick is 1-based");
    }

    match session.finalize_candidate(pick - 1).await? {
        Attempt::Ran(report) => Ok(report),
        Attempt::AlreadyRunning => anyhow::bail!("a save is already running"),
    }
}
