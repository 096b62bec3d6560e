use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{CoverageKind, FieldKind, LIMIT_FIELDS};

/// Requested fields and the kind each value should be coerced to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSchema(BTreeMap<String, FieldKind>);

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, kind: FieldKind) -> Self {
        self.insert(field, kind);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, kind: FieldKind) {
        self.0.insert(field.into(), kind);
    }

    pub fn kind(&self, field: &str) -> Option<FieldKind> {
        self.0.get(field).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every field of the ACORD 25 certificate catalog.
    pub fn certificate() -> Self {
        let mut schema = Self::new()
            .with("named_insured", FieldKind::String)
            .with("insured_address", FieldKind::String)
            .with("producer", FieldKind::String)
            .with("certificate_holder", FieldKind::String)
            .with("description_of_operations", FieldKind::String)
            .with("additional_insureds", FieldKind::Array)
            .with("insurers", FieldKind::Object)
            .with("certificate_date", FieldKind::Date)
            .with("additional_insured", FieldKind::Boolean)
            .with("waiver_of_subrogation", FieldKind::Boolean)
            .with("primary_non_contributory", FieldKind::Boolean);

        for kind in CoverageKind::ALL {
            let p = kind.prefix();
            schema.insert(format!("{p}_policy_number"), FieldKind::String);
            schema.insert(format!("{p}_effective_date"), FieldKind::Date);
            schema.insert(format!("{p}_expiration_date"), FieldKind::Date);
            schema.insert(format!("{p}_insurer_letter"), FieldKind::String);
            schema.insert(format!("{p}_insurer"), FieldKind::String);
        }
        for limit in LIMIT_FIELDS {
            schema.insert(limit.field, FieldKind::Number);
        }
        schema
    }
}

impl FromIterator<(String, FieldKind)> for FieldSchema {
    fn from_iter<I: IntoIterator<Item = (String, FieldKind)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
