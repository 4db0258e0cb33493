//! Show command - print one stored report.

use std::path::PathBuf;

use clap::Args;

use rescue_core::{ReportStore, RestReportStore};

use super::output::{emit, format_report, OutputFormat};

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Report id
    id: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: ShowArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::config::load(config_path)?;
    let store = RestReportStore::from_config(&config.service, &config.store)?;

    let report = store.get(&args.id).await?;
    emit(&format_report(&report, args.format)?, args.output.as_deref())
}
