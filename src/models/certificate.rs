//! Flat field map produced by extraction and consumed by evaluation/rendering.
//!
//! A field that could not be located is absent from the map. There is no
//! null variant on purpose: omission is the only "not found" signal.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{CoverageKind, FieldKind};

/// One extracted value.
///
/// Untagged so a stored map reads back naturally from JSON; `Date` comes
/// before `Text` so ISO date strings round-trip as dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Boolean(_) => FieldKind::Boolean,
            Self::Number(_) => FieldKind::Number,
            Self::Date(_) => FieldKind::Date,
            Self::Text(_) => FieldKind::String,
            Self::List(_) => FieldKind::Array,
            Self::Map(_) => FieldKind::Object,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.format("%m/%d/%Y")),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(", ")),
            Self::Map(map) => {
                let joined = map
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                f.write_str(&joined)
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Ordered field-name → value map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.get(field).and_then(FieldValue::as_date)
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(FieldValue::as_bool)
    }

    pub fn list(&self, field: &str) -> Option<&[String]> {
        self.get(field).and_then(FieldValue::as_list)
    }

    /// True when any field for the given coverage exists.
    pub fn has_coverage(&self, kind: CoverageKind) -> bool {
        self.0
            .keys()
            .any(|k| matches!(CoverageKind::from_prefix(k), Some((found, _)) if found == kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn extend(&mut self, other: FieldMap) {
        self.0.extend(other.0);
    }
}

impl FromIterator<(String, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Insurer letter (A–F) → carrier name, parsed from "INSURER X:" lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsurerMap(BTreeMap<char, String>);

impl InsurerMap {
    pub fn insert(&mut self, letter: char, name: impl Into<String>) {
        self.0.insert(letter.to_ascii_uppercase(), name.into());
    }

    pub fn get(&self, letter: char) -> Option<&str> {
        self.0.get(&letter.to_ascii_uppercase()).map(String::as_str)
    }

    pub fn contains(&self, letter: char) -> bool {
        self.0.contains_key(&letter.to_ascii_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field-map view: `{"A": "Carrier", ...}`.
    pub fn to_field_value(&self) -> FieldValue {
        FieldValue::Map(self.0.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    /// Rebuild from a stored `insurers` map field.
    pub fn from_field_value(value: &FieldValue) -> Self {
        let mut map = Self::default();
        if let FieldValue::Map(entries) = value {
            for (k, v) in entries {
                if let Some(letter) = k.chars().next() {
                    map.insert(letter, v.clone());
                }
            }
        }
        map
    }
}

/// Output of one extraction call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedCertificate {
    pub fields: FieldMap,
    pub insurers: InsurerMap,
    /// Insurer letter assigned to each coverage row that had one.
    pub coverage_insurers: BTreeMap<CoverageKind, char>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_map_typed_accessors() {
        let mut map = FieldMap::new();
        map.insert("gl_each_occurrence", 1_000_000.0);
        map.insert("named_insured", "ABC Plumbing Corp");
        map.insert("waiver_of_subrogation", false);

        assert_eq!(map.number("gl_each_occurrence"), Some(1_000_000.0));
        assert_eq!(map.text("named_insured"), Some("ABC Plumbing Corp"));
        assert_eq!(map.flag("waiver_of_subrogation"), Some(false));
        assert_eq!(map.text("gl_each_occurrence"), None);
        assert!(!map.contains("gl_policy_number"));
    }

    #[test]
    fn has_coverage_checks_prefix_only() {
        let mut map = FieldMap::new();
        map.insert("umbrella_each_occurrence", 5_000_000.0);
        assert!(map.has_coverage(CoverageKind::Umbrella));
        assert!(!map.has_coverage(CoverageKind::Auto));
    }

    #[test]
    fn json_round_trip_keeps_dates() {
        let mut map = FieldMap::new();
        map.insert("gl_expiration_date", NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
        map.insert("additional_insureds", vec!["Owner LLC".to_string()]);
        let json = serde_json::to_string(&map).unwrap();
        let back: FieldMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn insurer_map_field_value_round_trip() {
        let mut insurers = InsurerMap::default();
        insurers.insert('a', "National Liability Insurance Co.");
        insurers.insert('B', "State Fund");
        let value = insurers.to_field_value();
        let back = InsurerMap::from_field_value(&value);
        assert_eq!(back.get('A'), Some("National Liability Insurance Co."));
        assert_eq!(back, insurers);
    }

    #[test]
    fn display_formats_dates_us_style() {
        let d = FieldValue::Date(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
        assert_eq!(d.to_string(), "03/05/2026");
    }
}
