//! Edit-form state for an existing report.

use serde::{Deserialize, Serialize};

use super::coerce::{count_or_zero, parse_coordinate};
use super::resolve_name;
use crate::error::IntakeError;
use crate::models::report::{HelpCategories, HelpCategory, Report, ReportUpdate, UrgencyLevel};
use crate::text::split_phones;

/// The edit dialog's view of a report: everything as the user types it.
///
/// Phones are one comma-separated string, counts and coordinates are text.
/// [`ReportDraft::to_update`] applies the merge rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDraft {
    pub name: String,
    pub lastname: String,
    pub reporter_name: String,
    pub address: String,
    pub phone: String,
    pub number_of_adults: String,
    pub number_of_children: String,
    pub number_of_infants: String,
    pub number_of_seniors: String,
    pub number_of_patients: String,
    pub health_condition: String,
    pub help_needed: String,
    pub help_categories: HelpCategories,
    pub additional_info: String,
    pub urgency_level: UrgencyLevel,
    pub status: String,
    pub location_lat: String,
    pub location_long: String,
    pub map_link: String,
}

impl ReportDraft {
    /// Field names accepted by [`ReportDraft::set_field`].
    pub const FIELDS: [&'static str; 19] = [
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
    ];

    /// Prefill the form from a stored report.
    pub fn from_report(report: &Report) -> Self {
        let f = &report.fields;
        Self {
            name: f.name.clone(),
            lastname: f.lastname.clone(),
            reporter_name: f.reporter_name.clone(),
            address: f.address.clone(),
            phone: f.phone.join(", "),
            number_of_adults: f.number_of_adults.to_string(),
            number_of_children: f.number_of_children.to_string(),
            number_of_infants: f.number_of_infants.to_string(),
            number_of_seniors: f.number_of_seniors.to_string(),
            number_of_patients: f.number_of_patients.to_string(),
            health_condition: f.health_condition.clone(),
            help_needed: f.help_needed.clone(),
            help_categories: f.help_categories.clone(),
            additional_info: f.additional_info.clone(),
            urgency_level: f.urgency_level,
            status: f.status.clone(),
            location_lat: f.location_lat.map(|v| v.to_string()).unwrap_or_default(),
            location_long: f.location_long.map(|v| v.to_string()).unwrap_or_default(),
            map_link: f.map_link.clone(),
        }
    }

    /// Flip a help category on or off. Returns `true` if it is now selected.
    pub fn toggle_category(&mut self, category: HelpCategory) -> bool {
        self.help_categories.toggle(category)
    }

    /// Set one form field by its wire name.
    ///
    /// `help_categories` takes a comma-separated tag list and replaces the
    /// selection. `urgency_level` must be one of the selectable levels.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), IntakeError> {
        let invalid = || IntakeError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        };

        match field {
            "name" => self.name = value.to_string(),
            "lastname" => self.lastname = value.to_string(),
            "reporter_name" => self.reporter_name = value.to_string(),
            "address" => self.address = value.to_string(),
            "phone" => self.phone = value.to_string(),
            "number_of_adults" => self.number_of_adults = value.to_string(),
            "number_of_children" => self.number_of_children = value.to_string(),
            "number_of_infants" => self.number_of_infants = value.to_string(),
            "number_of_seniors" => self.number_of_seniors = value.to_string(),
            "number_of_patients" => self.number_of_patients = value.to_string(),
            "health_condition" => self.health_condition = value.to_string(),
            "help_needed" => self.help_needed = value.to_string(),
            "additional_info" => self.additional_info = value.to_string(),
            "status" => self.status = value.to_string(),
            "location_lat" => self.location_lat = value.to_string(),
            "location_long" => self.location_long = value.to_string(),
            "map_link" => self.map_link = value.to_string(),
            "urgency_level" => {
                self.urgency_level = value
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(UrgencyLevel::new)
                    .ok_or_else(invalid)?;
            }
            "help_categories" => {
                let selected = value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|tag| HelpCategory::parse(tag).ok_or_else(invalid))
                    .collect::<Result<Vec<_>, _>>()?;
                self.help_categories.set_selected(selected);
            }
            _ => return Err(IntakeError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    /// Apply the merge rules and produce the update payload.
    pub fn to_update(&self) -> ReportUpdate {
        ReportUpdate {
            name: resolve_name(Some(&self.name)),
            lastname: self.lastname.clone(),
            reporter_name: self.reporter_name.clone(),
            address: self.address.clone(),
            phone: split_phones(&self.phone),
            number_of_adults: count_or_zero(&self.number_of_adults),
            number_of_children: count_or_zero(&self.number_of_children),
            number_of_infants: count_or_zero(&self.number_of_infants),
            number_of_seniors: count_or_zero(&self.number_of_seniors),
            number_of_patients: count_or_zero(&self.number_of_patients),
            health_condition: self.health_condition.clone(),
            help_needed: self.help_needed.clone(),
            help_categories: self.help_categories.clone(),
            additional_info: self.additional_info.clone(),
            urgency_level: self.urgency_level,
            status: self.status.clone(),
            location_lat: parse_coordinate(&self.location_lat),
            location_long: parse_coordinate(&self.location_long),
            map_link: self.map_link.clone(),
        }
    }
}
