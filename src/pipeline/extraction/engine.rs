//! Schema-driven field extraction over certificate text.
//!
//! Output is partial: a field the engine cannot locate is omitted, never
//! filled with a placeholder. The engine itself cannot fail.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::blocks::{certificate_date, extract_block, labeled_value, split_list, BlockValue, BLOCK_FIELDS};
use super::carriers::{parse_insurers, resolve_letter};
use super::endorsements::{extract_endorsement, ENDORSEMENTS};
use super::limits::{extract_limit_named, parse_amount};
use super::policy::{parse_date, policy_dates, policy_number};
use super::schema::FieldSchema;
use super::sections::Sections;
use crate::config::EngineConfig;
use crate::models::{CoverageKind, ExtractedCertificate, FieldKind, FieldMap, FieldValue, InsurerMap};

/// Extract the requested fields with default windows.
pub fn extract_fields(text: &str, schema: &FieldSchema) -> FieldMap {
    extract_fields_with(text, schema, &EngineConfig::default())
}

pub fn extract_fields_with(text: &str, schema: &FieldSchema, config: &EngineConfig) -> FieldMap {
    extract_certificate_with(text, schema, config).fields
}

/// Extract fields plus the insurer map and per-coverage letters.
pub fn extract_certificate(text: &str, schema: &FieldSchema) -> ExtractedCertificate {
    extract_certificate_with(text, schema, &EngineConfig::default())
}

pub fn extract_certificate_with(
    text: &str,
    schema: &FieldSchema,
    config: &EngineConfig,
) -> ExtractedCertificate {
    let sections = Sections::locate(text, config.block_window_chars);
    let insurers = parse_insurers(text);
    let coverage_insurers: BTreeMap<CoverageKind, char> = sections
        .iter()
        .filter_map(|s| resolve_letter(s, &insurers).map(|letter| (s.kind, letter)))
        .collect();

    let lookup = Lookup {
        text,
        config,
        sections: &sections,
        insurers: &insurers,
        letters: &coverage_insurers,
    };

    let mut fields = FieldMap::new();
    for (name, kind) in schema.iter() {
        match lookup.find(name).and_then(|value| coerce(value, kind)) {
            Some(value) => fields.insert(name, value),
            None => debug!(field = name, "Field not found"),
        }
    }

    info!(
        requested = schema.len(),
        found = fields.len(),
        coverages = sections.iter().count(),
        insurers = insurers.len(),
        "Field extraction complete"
    );

    ExtractedCertificate {
        fields,
        insurers,
        coverage_insurers,
    }
}

struct Lookup<'a> {
    text: &'a str,
    config: &'a EngineConfig,
    sections: &'a Sections<'a>,
    insurers: &'a InsurerMap,
    letters: &'a BTreeMap<CoverageKind, char>,
}

impl Lookup<'_> {
    fn find(&self, name: &str) -> Option<FieldValue> {
        if name == "insurers" {
            return (!self.insurers.is_empty()).then(|| self.insurers.to_field_value());
        }
        if name == "certificate_date" {
            return certificate_date(self.text).map(FieldValue::Date);
        }
        if BLOCK_FIELDS.iter().any(|b| b.field == name) {
            return extract_block(self.text, name, self.config.block_max_lines).map(|v| match v {
                BlockValue::Text(s) => FieldValue::Text(s),
                BlockValue::List(items) => FieldValue::List(items),
            });
        }
        if ENDORSEMENTS.iter().any(|e| e.field == name) {
            return extract_endorsement(self.text, name, self.config.negation_lookback_chars)
                .map(FieldValue::Boolean);
        }
        if let Some(amount) = extract_limit_named(self.text, name, self.sections) {
            return Some(FieldValue::Number(amount));
        }
        if let Some(value) = self.coverage_term(name) {
            return Some(value);
        }
        labeled_value(self.text, name).map(FieldValue::Text)
    }

    fn coverage_term(&self, name: &str) -> Option<FieldValue> {
        let (kind, suffix) = CoverageKind::from_prefix(name)?;
        let section = self.sections.get(kind)?;
        match suffix {
            "policy_number" => policy_number(section.block).map(FieldValue::Text),
            "effective_date" => policy_dates(section.block).0.map(FieldValue::Date),
            "expiration_date" => policy_dates(section.block).1.map(FieldValue::Date),
            "insurer_letter" => self.letters.get(&kind).map(|c| FieldValue::Text(c.to_string())),
            "insurer" => self
                .letters
                .get(&kind)
                .and_then(|c| self.insurers.get(*c))
                .map(|n| FieldValue::Text(n.to_string())),
            _ => None,
        }
    }
}

/// Convert a located value to the kind the schema asked for. A value that
/// cannot be converted counts as not found.
pub fn coerce(value: FieldValue, kind: FieldKind) -> Option<FieldValue> {
    match (kind, value) {
        (FieldKind::String, FieldValue::Text(s)) => Some(FieldValue::Text(s)),
        (FieldKind::String, other) => Some(FieldValue::Text(other.to_string())),

        (FieldKind::Number, FieldValue::Number(n)) => Some(FieldValue::Number(n)),
        (FieldKind::Number, FieldValue::Text(s)) => parse_amount(&s).map(FieldValue::Number),

        (FieldKind::Date, FieldValue::Date(d)) => Some(FieldValue::Date(d)),
        (FieldKind::Date, FieldValue::Text(s)) => parse_date(&s).map(FieldValue::Date),

        (FieldKind::Boolean, FieldValue::Boolean(b)) => Some(FieldValue::Boolean(b)),
        (FieldKind::Boolean, FieldValue::Text(s)) => parse_flag(&s).map(FieldValue::Boolean),

        (FieldKind::Array, FieldValue::List(items)) => Some(FieldValue::List(items)),
        (FieldKind::Array, FieldValue::Text(s)) => {
            let items = split_list(&s);
            (!items.is_empty()).then_some(FieldValue::List(items))
        }
        (FieldKind::Array, FieldValue::Map(_)) => None,
        (FieldKind::Array, other) => Some(FieldValue::List(vec![other.to_string()])),

        (FieldKind::Object, FieldValue::Map(m)) => Some(FieldValue::Map(m)),

        _ => None,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "x" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}
