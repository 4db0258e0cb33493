//! Report data models: extraction candidates and stored records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stored in `name` when the post does not identify the victim.
pub const UNSPECIFIED_NAME: &str = "ไม่ระบุชื่อ";

/// Placeholder the extraction service and the edit form use for "no value".
pub const PLACEHOLDER_DASH: &str = "-";

/// Lifecycle label given to freshly created reports.
pub const DEFAULT_STATUS: &str = "pending";

/// A structured, possibly incomplete report returned by the extraction service.
///
/// Every field may be absent. Counts, coordinates and urgency are decoded
/// leniently: numbers and numeric strings are accepted, anything else decodes
/// as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportCandidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Raw phone strings as extracted.
    #[serde(deserialize_with = "lenient::string_list", skip_serializing_if = "Vec::is_empty")]
    pub phone: Vec<String>,

    #[serde(deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub number_of_adults: Option<u32>,

    #[serde(deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub number_of_children: Option<u32>,

    #[serde(deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub number_of_infants: Option<u32>,

    #[serde(deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub number_of_seniors: Option<u32>,

    #[serde(deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub number_of_patients: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_condition: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_needed: Option<String>,

    /// Category tags as extracted; unknown tags are kept here and moved to
    /// `help_needed` by the merge pipeline.
    #[serde(deserialize_with = "lenient::string_list", skip_serializing_if = "Vec::is_empty")]
    pub help_categories: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,

    #[serde(deserialize_with = "lenient::urgency", skip_serializing_if = "Option::is_none")]
    pub urgency_level: Option<UrgencyLevel>,

    #[serde(deserialize_with = "lenient::coordinate", skip_serializing_if = "Option::is_none")]
    pub location_lat: Option<f64>,

    #[serde(deserialize_with = "lenient::coordinate", skip_serializing_if = "Option::is_none")]
    pub location_long: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_link: Option<String>,
}

/// The editable field set of a report.
///
/// Shared by stored reports, insert payloads and update payloads. Text fields
/// use the empty string for "unset".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFields {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub lastname: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub reporter_name: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub address: String,

    /// Formatted phone numbers.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub phone: Vec<String>,

    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub number_of_adults: u32,

    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub number_of_children: u32,

    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub number_of_infants: u32,

    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub number_of_seniors: u32,

    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub number_of_patients: u32,

    #[serde(default, deserialize_with = "lenient::text")]
    pub health_condition: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub help_needed: String,

    #[serde(default)]
    pub help_categories: HelpCategories,

    #[serde(default, deserialize_with = "lenient::text")]
    pub additional_info: String,

    #[serde(default)]
    pub urgency_level: UrgencyLevel,

    #[serde(default = "default_status", deserialize_with = "lenient::status")]
    pub status: String,

    /// Latitude; explicit null is preserved on the wire.
    #[serde(default, deserialize_with = "lenient::coordinate")]
    pub location_lat: Option<f64>,

    #[serde(default, deserialize_with = "lenient::coordinate")]
    pub location_long: Option<f64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub map_link: String,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl Default for ReportFields {
    fn default() -> Self {
        Self {
            name: UNSPECIFIED_NAME.to_string(),
            lastname: String::new(),
            reporter_name: String::new(),
            address: String::new(),
            phone: Vec::new(),
            number_of_adults: 0,
            number_of_children: 0,
            number_of_infants: 0,
            number_of_seniors: 0,
            number_of_patients: 0,
            health_condition: String::new(),
            help_needed: String::new(),
            help_categories: HelpCategories::new(),
            additional_info: String::new(),
            urgency_level: UrgencyLevel::default(),
            status: default_status(),
            location_lat: None,
            location_long: None,
            map_link: String::new(),
        }
    }
}

impl ReportFields {
    /// Total number of people covered by the report.
    pub fn total_people(&self) -> u32 {
        [
            self.number_of_adults,
            self.number_of_children,
            self.number_of_infants,
            self.number_of_seniors,
            self.number_of_patients,
        ]
        .iter()
        .fold(0u32, |acc, n| acc.saturating_add(*n))
    }
}

/// Update payload: every editable field, nothing the server owns.
///
/// `raw_message` is deliberately absent so edits cannot touch it.
pub type ReportUpdate = ReportFields;

/// Insert payload for a report created from a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    /// The original pasted/OCR text, written once.
    pub raw_message: String,

    #[serde(flatten)]
    pub fields: ReportFields,
}

/// A stored report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub raw_message: String,

    #[serde(flatten)]
    pub fields: ReportFields,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Urgency on the closed five-level scale (1 = lowest, 5 = most urgent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UrgencyLevel(u8);

impl UrgencyLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Create a level, rejecting values outside 1..=5.
    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    /// Create a level, clamping into 1..=5.
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    /// Numeric value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// All five selectable levels in ascending order.
    pub fn all() -> [Self; 5] {
        [Self(1), Self(2), Self(3), Self(4), Self(5)]
    }
}

impl Default for UrgencyLevel {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for UrgencyLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for UrgencyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(crate::report::coerce::urgency_from_value(&value).unwrap_or_default())
    }
}

/// Kinds of help a report can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelpCategory {
    /// Drinking water.
    Water,
    Food,
    Electricity,
    /// Temporary shelter.
    Shelter,
    /// Medical attention on site.
    Medical,
    /// Prescription or chronic-condition medicine.
    Medicine,
    /// Evacuation out of the affected area.
    Evacuation,
    /// Boat transport.
    Boat,
    Clothing,
    /// Formula, diapers and similar.
    BabySupplies,
    ElderlyCare,
    PetRescue,
}

impl HelpCategory {
    /// Every category in display order.
    pub const ALL: [HelpCategory; 12] = [
        HelpCategory::Water,
        HelpCategory::Food,
        HelpCategory::Electricity,
        HelpCategory::Shelter,
        HelpCategory::Medical,
        HelpCategory::Medicine,
        HelpCategory::Evacuation,
        HelpCategory::Boat,
        HelpCategory::Clothing,
        HelpCategory::BabySupplies,
        HelpCategory::ElderlyCare,
        HelpCategory::PetRescue,
    ];

    /// Wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            HelpCategory::Water => "water",
            HelpCategory::Food => "food",
            HelpCategory::Electricity => "electricity",
            HelpCategory::Shelter => "shelter",
            HelpCategory::Medical => "medical",
            HelpCategory::Medicine => "medicine",
            HelpCategory::Evacuation => "evacuation",
            HelpCategory::Boat => "boat",
            HelpCategory::Clothing => "clothing",
            HelpCategory::BabySupplies => "baby_supplies",
            HelpCategory::ElderlyCare => "elderly_care",
            HelpCategory::PetRescue => "pet_rescue",
        }
    }

    /// Parse a tag. Case, surrounding whitespace, and `-`/space separators
    /// are tolerated.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|c| c.as_str() == tag)
    }
}

impl fmt::Display for HelpCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An insertion-ordered set of help categories.
///
/// Tags outside the known vocabulary are carried along untouched so that
/// editing a stored row never drops them. They are not selectable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpCategories {
    selected: Vec<HelpCategory>,
    unrecognized: Vec<String>,
}

impl HelpCategories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category if absent. Returns `true` if it was added.
    pub fn insert(&mut self, category: HelpCategory) -> bool {
        if self.contains(category) {
            return false;
        }
        self.selected.push(category);
        true
    }

    /// Remove a category. Returns `true` if it was present.
    pub fn remove(&mut self, category: HelpCategory) -> bool {
        let before = self.selected.len();
        self.selected.retain(|c| *c != category);
        self.selected.len() != before
    }

    /// Flip membership. Returns `true` if the category is now present.
    pub fn toggle(&mut self, category: HelpCategory) -> bool {
        if self.remove(category) {
            false
        } else {
            self.selected.push(category);
            true
        }
    }

    /// Replace the selected categories. Unrecognized tags stay.
    pub fn set_selected<I: IntoIterator<Item = HelpCategory>>(&mut self, categories: I) {
        self.selected.clear();
        for category in categories {
            self.insert(category);
        }
    }

    pub fn contains(&self, category: HelpCategory) -> bool {
        self.selected.contains(&category)
    }

    /// Selected known categories.
    pub fn iter(&self) -> impl Iterator<Item = HelpCategory> + '_ {
        self.selected.iter().copied()
    }

    /// Tags that were read from a row but are not known categories.
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    /// Every tag as written to the table: known ones first.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.selected
            .iter()
            .map(|c| c.as_str())
            .chain(self.unrecognized.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.selected.len() + self.unrecognized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.unrecognized.is_empty()
    }
}

impl FromIterator<HelpCategory> for HelpCategories {
    fn from_iter<I: IntoIterator<Item = HelpCategory>>(iter: I) -> Self {
        let mut set = HelpCategories::new();
        set.set_selected(iter);
        set
    }
}

impl Serialize for HelpCategories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tags())
    }
}

impl<'de> Deserialize<'de> for HelpCategories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut set = HelpCategories::new();
        for tag in lenient::string_list(deserializer)? {
            match HelpCategory::parse(&tag) {
                Some(category) => {
                    set.insert(category);
                }
                None if !set.unrecognized.contains(&tag) => {
                    tracing::debug!("Keeping unrecognized help category tag: {}", tag);
                    set.unrecognized.push(tag);
                }
                None => {}
            }
        }
        Ok(set)
    }
}

/// Deserializers that accept whatever shape the service or the table sends.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::UrgencyLevel;
    use crate::report::coerce;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
    }

    /// Null or blank status falls back to the default.
    pub fn status<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(d)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(super::default_status))
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!("invalid report id: {}", other))),
        }
    }

    /// A list of strings, or one comma-separated string.
    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let items = match Value::deserialize(d)? {
            Value::String(s) => s.split(',').map(str::to_string).collect(),
            Value::Array(values) => values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(coerce::count_from_value(&Value::deserialize(d)?))
    }

    pub fn count_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(count(d)?.unwrap_or(0))
    }

    pub fn coordinate<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(coerce::coordinate_from_value(&Value::deserialize(d)?))
    }

    pub fn urgency<'de, D: Deserializer<'de>>(d: D) -> Result<Option<UrgencyLevel>, D::Error> {
        Ok(coerce::urgency_from_value(&Value::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_candidate_lenient_decoding() {
        let candidate: ReportCandidate = serde_json::from_value(json!({
            "name": "สมชาย",
            "phone": "081-111-1111, 0822222222",
            "number_of_adults": "abc",
            "number_of_children": "2",
            "number_of_infants": 1,
            "location_lat": "13.75",
            "location_long": null,
            "urgency_level": "4",
            "help_categories": ["food", "boat"]
        }))
        .unwrap();

        assert_eq!(candidate.name.as_deref(), Some("สมชาย"));
        assert_eq!(candidate.phone, vec!["081-111-1111", "0822222222"]);
        assert_eq!(candidate.number_of_adults, None);
        assert_eq!(candidate.number_of_children, Some(2));
        assert_eq!(candidate.number_of_infants, Some(1));
        assert_eq!(candidate.number_of_seniors, None);
        assert_eq!(candidate.location_lat, Some(13.75));
        assert_eq!(candidate.location_long, None);
        assert_eq!(candidate.urgency_level, UrgencyLevel::new(4));
        assert_eq!(candidate.help_categories, vec!["food", "boat"]);
    }

    #[test]
    fn test_candidate_empty_object() {
        let candidate: ReportCandidate = serde_json::from_str("{}").unwrap();
        assert_eq!(candidate, ReportCandidate::default());
    }

    #[test]
    fn test_urgency_bounds() {
        assert_eq!(UrgencyLevel::new(0), None);
        assert_eq!(UrgencyLevel::new(6), None);
        assert_eq!(UrgencyLevel::new(3).map(UrgencyLevel::get), Some(3));
        assert_eq!(UrgencyLevel::clamped(-4).get(), 1);
        assert_eq!(UrgencyLevel::clamped(99).get(), 5);
        assert_eq!(UrgencyLevel::all().len(), 5);
    }

    #[test]
    fn test_help_category_parse() {
        assert_eq!(HelpCategory::parse("food"), Some(HelpCategory::Food));
        assert_eq!(HelpCategory::parse(" Baby-Supplies "), Some(HelpCategory::BabySupplies));
        assert_eq!(HelpCategory::parse("elderly care"), Some(HelpCategory::ElderlyCare));
        assert_eq!(HelpCategory::parse("karaoke"), None);
    }

    #[test]
    fn test_help_categories_toggle_set() {
        let mut set = HelpCategories::new();
        assert!(set.insert(HelpCategory::Water));
        assert!(!set.insert(HelpCategory::Water));
        assert!(set.toggle(HelpCategory::Food));
        assert!(!set.toggle(HelpCategory::Water));
        assert!(!set.remove(HelpCategory::Water));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![HelpCategory::Food]);
    }

    #[test]
    fn test_help_categories_dedup_on_decode() {
        let set: HelpCategories =
            serde_json::from_value(json!(["food", "water", "food"])).unwrap();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![HelpCategory::Food, HelpCategory::Water]
        );
        assert_eq!(serde_json::to_value(&set).unwrap(), json!(["food", "water"]));
    }

    #[test]
    fn test_help_categories_keep_unrecognized_tags() {
        let mut set: HelpCategories =
            serde_json::from_value(json!(["generator", "food", "generator", "water"])).unwrap();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![HelpCategory::Food, HelpCategory::Water]
        );
        assert_eq!(set.unrecognized(), ["generator".to_string()]);
        assert_eq!(set.len(), 3);

        set.toggle(HelpCategory::Food);
        set.set_selected([HelpCategory::Boat]);
        assert_eq!(serde_json::to_value(&set).unwrap(), json!(["boat", "generator"]));
    }

    #[test]
    fn test_report_decodes_table_row() {
        let report: Report = serde_json::from_value(json!({
            "id": 42,
            "raw_message": "ช่วยด้วย",
            "name": null,
            "phone": ["081-234-5678"],
            "number_of_adults": 3,
            "urgency_level": 5,
            "status": "pending",
            "help_categories": ["evacuation"],
            "location_lat": 13.7,
            "location_long": 100.5,
            "created_at": "2025-11-27T10:00:00.123456+00:00",
            "updated_at": "2025-11-27T10:05:00+00:00"
        }))
        .unwrap();

        assert_eq!(report.id, "42");
        assert_eq!(report.fields.name, "");
        assert_eq!(report.fields.number_of_adults, 3);
        assert_eq!(report.fields.urgency_level.get(), 5);
        assert!(report.fields.help_categories.contains(HelpCategory::Evacuation));
        assert!(report.updated_at > report.created_at);
    }

    #[test]
    fn test_null_status_is_pending() {
        let fields: ReportFields = serde_json::from_value(json!({ "status": null })).unwrap();
        assert_eq!(fields.status, DEFAULT_STATUS);

        let fields: ReportFields = serde_json::from_value(json!({ "status": "  " })).unwrap();
        assert_eq!(fields.status, DEFAULT_STATUS);

        let fields: ReportFields = serde_json::from_value(json!({})).unwrap();
        assert_eq!(fields.status, DEFAULT_STATUS);

        let fields: ReportFields = serde_json::from_value(json!({ "status": "rescued" })).unwrap();
        assert_eq!(fields.status, "rescued");
    }

    #[test]
    fn test_update_payload_has_no_raw_message() {
        let value = serde_json::to_value(ReportUpdate::default()).unwrap();
        assert!(value.get("raw_message").is_none());
        assert!(value.get("id").is_none());
        assert_eq!(value["location_lat"], serde_json::Value::Null);
        assert_eq!(value["name"], json!(UNSPECIFIED_NAME));
    }

    #[test]
    fn test_total_people() {
        let fields = ReportFields {
            number_of_adults: 2,
            number_of_children: 1,
            number_of_seniors: 1,
            ..ReportFields::default()
        };
        assert_eq!(fields.total_people(), 4);
    }
}
