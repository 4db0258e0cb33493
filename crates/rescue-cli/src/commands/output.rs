//! Report rendering shared by the extract, edit and show commands.

use std::fs;
use std::path::Path;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use rescue_core::{Report, ReportCandidate};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

/// Print to stdout or write to `output`.
pub fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub fn format_report(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_csv(report: &Report) -> anyhow::Result<String> {
    let f = &report.fields;
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "name",
        "lastname",
        "reporter_name",
        "address",
        "phone",
        "number_of_adults",
        "number_of_children",
        "number_of_infants",
        "number_of_seniors",
        "number_of_patients",
        "health_condition",
        "help_needed",
        "help_categories",
        "additional_info",
        "urgency_level",
        "status",
        "location_lat",
        "location_long",
        "map_link",
        "created_at",
        "updated_at",
    ])?;

    let categories: Vec<&str> = f.help_categories.tags().collect();
    let coordinate = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();

    wtr.write_record([
        report.id.clone(),
        f.name.clone(),
        f.lastname.clone(),
        f.reporter_name.clone(),
        f.address.clone(),
        f.phone.join(", "),
        f.number_of_adults.to_string(),
        f.number_of_children.to_string(),
        f.number_of_infants.to_string(),
        f.number_of_seniors.to_string(),
        f.number_of_patients.to_string(),
        f.health_condition.clone(),
        f.help_needed.clone(),
        categories.join(", "),
        f.additional_info.clone(),
        f.urgency_level.to_string(),
        f.status.clone(),
        coordinate(f.location_lat),
        coordinate(f.location_long),
        f.map_link.clone(),
        report.created_at.to_rfc3339(),
        report.updated_at.to_rfc3339(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &Report) -> String {
    let f = &report.fields;
    let mut output = String::new();

    output.push_str(&format!("Report: {}\n", report.id));
    output.push_str(&format!(
        "Created: {}  Updated: {}\n",
        report.created_at.format("%Y-%m-%d %H:%M"),
        report.updated_at.format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!("Status: {}  Urgency: {}/5\n", f.status, f.urgency_level));
    output.push('\n');

    let full_name = [f.name.as_str(), f.lastname.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    output.push_str(&format!("Name: {}\n", full_name));
    if !f.reporter_name.is_empty() {
        output.push_str(&format!("Reported by: {}\n", f.reporter_name));
    }
    if !f.phone.is_empty() {
        output.push_str(&format!("Phone: {}\n", f.phone.join(", ")));
    }
    if !f.address.is_empty() {
        output.push_str(&format!("Address: {}\n", f.address));
    }
    if let (Some(lat), Some(long)) = (f.location_lat, f.location_long) {
        output.push_str(&format!("Location: {}, {}\n", lat, long));
    }
    if !f.map_link.is_empty() {
        output.push_str(&format!("Map: {}\n", f.map_link));
    }
    output.push('\n');

    output.push_str(&format!("People: {}\n", f.total_people()));
    output.push_str(&format!(
        "  adults {}, children {}, infants {}, seniors {}, patients {}\n",
        f.number_of_adults,
        f.number_of_children,
        f.number_of_infants,
        f.number_of_seniors,
        f.number_of_patients
    ));
    if !f.health_condition.is_empty() {
        output.push_str(&format!("Health: {}\n", f.health_condition));
    }

    if !f.help_categories.is_empty() {
        let categories: Vec<&str> = f.help_categories.tags().collect();
        output.push_str(&format!("Needs: {}\n", categories.join(", ")));
    }
    if !f.help_needed.is_empty() {
        output.push_str(&format!("Help needed: {}\n", f.help_needed));
    }
    if !f.additional_info.is_empty() {
        output.push_str(&format!("Notes: {}\n", f.additional_info));
    }

    output
}

/// One line per candidate, numbered from 1.
pub fn format_candidates(candidates: &[ReportCandidate]) -> String {
    let mut output = String::new();
    for (i, c) in candidates.iter().enumerate() {
        let name = c.name.as_deref().unwrap_or("-");
        let address = c.address.as_deref().unwrap_or("-");
        output.push_str(&format!("  {}. {} | {} | {}\n", i + 1, name, c.phone.join(", "), address));
    }
    output
}
