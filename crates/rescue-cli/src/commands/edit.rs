//! Edit command - change fields of a stored report.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::debug;

use rescue_core::models::report::HelpCategory;
use rescue_core::{Attempt, EditSession, ReportDraft, RestReportStore};

use super::output::{emit, format_report, spinner, OutputFormat};

/// Arguments for the edit command.
#[derive(Args)]
pub struct EditArgs {
    /// Report id
    id: String,

    /// Field assignment, e.g. --set phone="081 234 5678, 02 123 4567"
    #[arg(short, long = "set", value_name = "FIELD=VALUE")]
    assignments: Vec<String>,

    /// Flip a help category on or off (e.g. boat, food)
    #[arg(long = "toggle-category", value_name = "TAG")]
    toggles: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: EditArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    if args.assignments.is_empty() && args.toggles.is_empty() {
        anyhow::bail!(
            "Nothing to change. Use --set FIELD=VALUE (fields: {}) or --toggle-category TAG.",
            ReportDraft::FIELDS.join(", ")
        );
    }

    let edits = parse_assignments(&args.assignments)?;
    let toggles = parse_toggles(&args.toggles)?;

    let config = super::config::load(config_path)?;
    let store = Arc::new(RestReportStore::from_config(&config.service, &config.store)?);
    let session = EditSession::open(store, &args.id).await?;

    session.edit(|draft| -> anyhow::Result<()> {
        for (field, value) in &edits {
            debug!("Setting {} = {:?}", field, value);
            draft.set_field(field, value)?;
        }
        for category in &toggles {
            let selected = draft.toggle_category(*category);
            debug!("{} {}", if selected { "Selected" } else { "Cleared" }, category);
        }
        Ok(())
    })?;

    let pb = spinner("Saving report...")?;
    let saved = session.save().await;
    pb.finish_and_clear();

    let report = match saved? {
        Attempt::Ran(report) => report,
        Attempt::AlreadyRunning => anyhow::bail!("a save is already running"),
    };

    eprintln!("{} Updated report {}", style("✓").green(), report.id);
    emit(&format_report(&report, args.format)?, args.output.as_deref())
}

fn parse_assignments(assignments: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    assignments
        .iter()
        .map(|a| {
            let (field, value) = a
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Expected FIELD=VALUE, got: {}", a))?;
            let field = field.trim();
            if !ReportDraft::FIELDS.contains(&field) {
                anyhow::bail!("Unknown field: {}", field);
            }
            Ok((field.to_string(), value.to_string()))
        })
        .collect()
}

fn parse_toggles(tags: &[String]) -> anyhow::Result<Vec<HelpCategory>> {
    tags.iter()
        .map(|t| {
            HelpCategory::parse(t).ok_or_else(|| {
                let known: Vec<&str> = HelpCategory::ALL.iter().map(|c| c.as_str()).collect();
                anyhow::anyhow!("Unknown help category: {} (known: {})", t, known.join(", "))
            })
        })
        .collect()
}
