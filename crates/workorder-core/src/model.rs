use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical header field names, in renderer order.
pub const CANONICAL_FIELDS: &[&str] = &[
    "RO Number",
    "Owner",
    "Year",
    "Exterior Color",
    "Make",
    "Model",
    "Mileage In",
    "Vehicle In",
    "Vehicle Out",
    "Estimator",
    "Body Style",
    "Insurance",
    "VIN",
    "Job Number",
];

/// The header box as the renderer lays it out: each row is
/// (label, label) for a Label | Value | Label | Value grid.
pub const HEADER_LAYOUT: &[(&str, &str)] = &[
    ("RO Number", "Owner"),
    ("Year", "Exterior Color"),
    ("Make", "Vehicle In"),
    ("Model", "Vehicle Out"),
    ("Mileage In", "Estimator"),
    ("Body Style", "Insurance"),
    ("VIN", "Job Number"),
];

/// Ordered vehicle/RO/owner metadata. The first value stored for a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderRecord(IndexMap<String, String>);

impl HeaderRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key` unless the key is already present.
    /// Returns whether the value was stored.
    pub fn insert_first(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value.into());
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    /// Value for display: missing keys render as empty.
    pub fn display_value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for HeaderRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut record = HeaderRecord::new();
        for (k, v) in iter {
            record.insert_first(k, v);
        }
        record
    }
}

/// Which header strategy produced the header record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStrategy {
    TableGrid,
    BoldRun,
    Regex,
}

impl fmt::Display for HeaderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderStrategy::TableGrid => write!(f, "table grid"),
            HeaderStrategy::BoldRun => write!(f, "bold run"),
            HeaderStrategy::Regex => write!(f, "regex"),
        }
    }
}

/// One row of the repair table: a section heading or a repair operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_number: u32,
    pub quantity: Option<u32>,
    pub operation: String,
    pub description: String,
    pub hours: Option<Decimal>,
    #[serde(default)]
    pub plain_english: String,
    #[serde(default)]
    pub spanish: String,
}

impl LineItem {
    pub fn section(line_number: u32, description: impl Into<String>) -> Self {
        LineItem {
            line_number,
            quantity: None,
            operation: String::new(),
            description: description.into(),
            hours: None,
            plain_english: String::new(),
            spanish: String::new(),
        }
    }

    pub fn is_section_heading(&self) -> bool {
        is_section_heading(&self.operation, &self.description)
    }
}

/// A row is a section heading iff it has no operation and its description
/// is upper-case. Shared by parsing, phrasing and output.
pub fn is_section_heading(operation: &str, description: &str) -> bool {
    operation.trim().is_empty() && is_upper(description)
}

/// True when the text has at least one cased character and no lower-case
/// ones.
pub fn is_upper(s: &str) -> bool {
    s.chars().any(|c| c.is_uppercase()) && !s.chars().any(|c| c.is_lowercase())
}

/// A table line that matched neither row grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line_text: String,
    pub reason: String,
}

/// Everything recovered from one work order document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub header: HeaderRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_strategy: Option<HeaderStrategy>,
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_first_insert_wins() {
        let mut h = HeaderRecord::new();
        assert!(h.insert_first("Owner", "Jane Doe"));
        assert!(!h.insert_first("Owner", "Someone Else"));
        assert_eq!(h.get("Owner"), Some("Jane Doe"));
        assert_eq!(h.display_value("VIN"), "");
    }

    #[test]
    fn test_header_preserves_insertion_order() {
        let h: HeaderRecord = vec![
            ("Year".to_string(), "2020".to_string()),
            ("RO Number".to_string(), "1001".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(h.keys().collect::<Vec<_>>(), vec!["Year", "RO Number"]);
        assert_eq!(
            serde_json::to_string(&h).unwrap(),
            r#"{"Year":"2020","RO Number":"1001"}"#
        );
    }

    #[test]
    fn test_is_upper() {
        assert!(is_upper("PILLARS, ROCKER & FLOOR"));
        assert!(is_upper("B-PILLAR 2"));
        assert!(!is_upper("LT Door Shell"));
        assert!(!is_upper("123"));
        assert!(!is_upper(""));
    }

    #[test]
    fn test_section_heading_predicate() {
        assert!(LineItem::section(3, "FRONT DOOR").is_section_heading());
        assert!(!is_section_heading("Repair", "FRONT DOOR"));
        assert!(!is_section_heading("", "Front Door"));
    }

    #[test]
    fn test_layout_covers_canonical_fields() {
        let mut laid_out: Vec<&str> = HEADER_LAYOUT.iter().flat_map(|(a, b)| [*a, *b]).collect();
        laid_out.sort();
        let mut canonical = CANONICAL_FIELDS.to_vec();
        canonical.sort();
        assert_eq!(laid_out, canonical);
    }
}
