//! Report merge/edit pipeline.
//!
//! Turns extraction candidates and edit-form drafts into store-ready
//! payloads. Everything here is pure: no I/O, no failure modes beyond
//! rejecting unknown form fields.

pub mod coerce;
mod draft;

pub use draft::ReportDraft;

use tracing::debug;

use crate::models::report::{
    HelpCategories, HelpCategory, NewReport, ReportCandidate, ReportFields, DEFAULT_STATUS,
    PLACEHOLDER_DASH, UNSPECIFIED_NAME,
};
use crate::text::split_phones;

/// Values applied to fields the candidate does not carry.
#[derive(Debug, Clone)]
pub struct ReportDefaults {
    /// Lifecycle label for new reports.
    pub status: String,
}

impl Default for ReportDefaults {
    fn default() -> Self {
        Self {
            status: DEFAULT_STATUS.to_string(),
        }
    }
}

/// Build the insert payload for a freshly extracted candidate.
pub fn report_from_candidate(
    candidate: &ReportCandidate,
    raw_message: &str,
    defaults: &ReportDefaults,
) -> NewReport {
    let (help_categories, unknown_tags) = split_categories(&candidate.help_categories);

    let mut help_needed = candidate.help_needed.clone().unwrap_or_default();
    if !unknown_tags.is_empty() {
        debug!("Moving unknown help tags to help_needed: {:?}", unknown_tags);
        help_needed = join_nonempty(&help_needed, &unknown_tags.join(", "));
    }

    let fields = ReportFields {
        name: resolve_name(candidate.name.as_deref()),
        lastname: candidate.lastname.clone().unwrap_or_default(),
        reporter_name: candidate.reporter_name.clone().unwrap_or_default(),
        address: candidate.address.clone().unwrap_or_default(),
        phone: candidate
            .phone
            .iter()
            .flat_map(|p| split_phones(p))
            .collect(),
        number_of_adults: candidate.number_of_adults.unwrap_or(0),
        number_of_children: candidate.number_of_children.unwrap_or(0),
        number_of_infants: candidate.number_of_infants.unwrap_or(0),
        number_of_seniors: candidate.number_of_seniors.unwrap_or(0),
        number_of_patients: candidate.number_of_patients.unwrap_or(0),
        health_condition: candidate.health_condition.clone().unwrap_or_default(),
        help_needed,
        help_categories,
        additional_info: candidate.additional_info.clone().unwrap_or_default(),
        urgency_level: candidate.urgency_level.unwrap_or_default(),
        status: defaults.status.clone(),
        location_lat: candidate.location_lat,
        location_long: candidate.location_long,
        map_link: candidate.map_link.clone().unwrap_or_default(),
    };

    NewReport {
        raw_message: raw_message.to_string(),
        fields,
    }
}

/// Substitute the unspecified-name sentinel for absent, blank or dash names.
pub fn resolve_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        None | Some("") | Some(PLACEHOLDER_DASH) => UNSPECIFIED_NAME.to_string(),
        Some(_) => name.unwrap_or_default().to_string(),
    }
}

/// Separate known category tags from free-form ones.
fn split_categories(tags: &[String]) -> (HelpCategories, Vec<String>) {
    let mut known = HelpCategories::new();
    let mut unknown: Vec<String> = Vec::new();

    for tag in tags {
        match HelpCategory::parse(tag) {
            Some(category) => {
                known.insert(category);
            }
            None => {
                let tag = tag.trim().to_string();
                if !tag.is_empty() && !unknown.contains(&tag) {
                    unknown.push(tag);
                }
            }
        }
    }

    (known, unknown)
}

fn join_nonempty(head: &str, tail: &str) -> String {
    if head.trim().is_empty() {
        tail.to_string()
    } else {
        format!("{}, {}", head, tail)
    }
}
