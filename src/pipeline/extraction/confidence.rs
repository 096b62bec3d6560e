use super::schema::FieldSchema;
use super::types::ExtractionMethod;
use crate::models::{CoverageKind, FieldMap};

/// Confidence thresholds used by the strategy chain and reviewers
pub mod thresholds {
    /// Below this: extraction likely failed. Show strong warning.
    pub const VERY_LOW: f32 = 0.30;

    /// Below this: significant uncertainty. Flag all extracted fields.
    pub const LOW: f32 = 0.50;

    /// Below this: some uncertainty. Route to human review.
    pub const MODERATE: f32 = 0.70;

    /// Above this: high confidence. No special flagging.
    pub const HIGH: f32 = 0.85;

    /// Above this: very high confidence. Supplied by a trusted strategy.
    pub const VERY_HIGH: f32 = 0.95;
}

/// Ceiling for each method before coverage of the schema is applied.
pub fn method_base(method: ExtractionMethod) -> f32 {
    match method {
        ExtractionMethod::External => thresholds::VERY_HIGH,
        ExtractionMethod::Heuristic => thresholds::HIGH,
        ExtractionMethod::RawText => thresholds::VERY_LOW,
    }
}

/// Fields every certificate prints regardless of the coverages it lists.
const CORE_FIELDS: [&str; 3] = ["named_insured", "certificate_holder", "insurers"];

/// Fields every listed coverage row prints.
const CORE_COVERAGE_FIELDS: [&str; 3] = ["policy_number", "effective_date", "expiration_date"];

/// Catalog fields a complete certificate may leave blank.
const OPTIONAL_FIELDS: [&str; 8] = [
    "insured_address",
    "producer",
    "description_of_operations",
    "additional_insureds",
    "certificate_date",
    "additional_insured",
    "waiver_of_subrogation",
    "primary_non_contributory",
];

/// Whether a requested field is one a clean certificate must yield.
/// Coverage fields count only for coverages the certificate lists; general
/// liability is always listed. Fields outside the catalog always count.
fn is_expected(name: &str, fields: &FieldMap) -> bool {
    if CORE_FIELDS.contains(&name) {
        return true;
    }
    if OPTIONAL_FIELDS.contains(&name) {
        return false;
    }
    match CoverageKind::from_prefix(name) {
        Some((kind, suffix)) => {
            (kind == CoverageKind::General || fields.has_coverage(kind))
                && CORE_COVERAGE_FIELDS.contains(&suffix)
        }
        None => true,
    }
}

/// Method base scaled by the share of expected fields that were found.
///
/// Limits, flags and coverages the certificate does not list are optional
/// and do not lower the score. When the schema asks for no expected field
/// at all, every requested field counts. An empty schema counts as fully
/// covered so a caller asking for nothing is not punished.
pub fn compute_field_confidence(
    fields: &FieldMap,
    schema: &FieldSchema,
    method: ExtractionMethod,
) -> f32 {
    let base = method_base(method);
    if method == ExtractionMethod::RawText || schema.is_empty() {
        return base;
    }

    let mut expected: Vec<&str> = schema.names().filter(|n| is_expected(n, fields)).collect();
    if expected.is_empty() {
        expected = schema.names().collect();
    }
    let found = expected.iter().filter(|name| fields.contains(name)).count();
    base * found as f32 / expected.len() as f32
}

/// True when a result should not be trusted without a human look.
pub fn needs_review(confidence: f32) -> bool {
    confidence < thresholds::MODERATE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldKind, FieldValue};

    fn make_schema(names: &[&str]) -> FieldSchema {
        names.iter().map(|n| (n.to_string(), FieldKind::String)).collect()
    }

    #[test]
    fn full_coverage_keeps_method_base() {
        let schema = make_schema(&["named_insured", "gl_policy_number"]);
        let mut fields = FieldMap::new();
        fields.insert("named_insured", "ABC Plumbing Corp");
        fields.insert("gl_policy_number", "GL-2024-001234");

        let conf = compute_field_confidence(&fields, &schema, ExtractionMethod::Heuristic);
        assert!((conf - thresholds::HIGH).abs() < f32::EPSILON);
        assert!(!needs_review(conf));
    }

    #[test]
    fn partial_coverage_scales_down() {
        let schema = make_schema(&["a", "b", "c", "d"]);
        let mut fields = FieldMap::new();
        fields.insert("a", "x");

        let conf = compute_field_confidence(&fields, &schema, ExtractionMethod::Heuristic);
        assert!((conf - thresholds::HIGH / 4.0).abs() < 1e-6);
        assert!(needs_review(conf));
    }

    fn make_gl_wc_fields() -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("named_insured", "ABC Plumbing Corp");
        fields.insert("certificate_holder", "Main Street Contractors");
        fields.insert("insurers", FieldValue::Map(Default::default()));
        for p in ["gl", "wc"] {
            fields.insert(format!("{p}_policy_number"), "P-123456");
            fields.insert(format!("{p}_effective_date"), "01/01/2026");
            fields.insert(format!("{p}_expiration_date"), "01/01/2027");
        }
        fields.insert("gl_each_occurrence", 1_000_000.0);
        fields
    }

    #[test]
    fn clean_gl_and_wc_certificate_is_not_flagged() {
        let fields = make_gl_wc_fields();
        let conf = compute_field_confidence(&fields, &FieldSchema::certificate(), ExtractionMethod::Heuristic);
        assert!((conf - thresholds::HIGH).abs() < 1e-6);
        assert!(!needs_review(conf));
    }

    #[test]
    fn missing_core_field_of_listed_coverage_lowers_score() {
        let mut fields = make_gl_wc_fields();
        fields.remove("wc_policy_number");
        fields.remove("wc_expiration_date");
        let conf = compute_field_confidence(&fields, &FieldSchema::certificate(), ExtractionMethod::Heuristic);
        assert!(conf < thresholds::HIGH);
    }

    #[test]
    fn certificate_without_coverage_rows_needs_review() {
        let mut fields = FieldMap::new();
        fields.insert("named_insured", "ABC Plumbing Corp");
        let conf = compute_field_confidence(&fields, &FieldSchema::certificate(), ExtractionMethod::Heuristic);
        assert!(needs_review(conf));
    }

    #[test]
    fn raw_text_always_needs_review() {
        let schema = make_schema(&["a"]);
        let mut fields = FieldMap::new();
        fields.insert("a", "x");
        let conf = compute_field_confidence(&fields, &schema, ExtractionMethod::RawText);
        assert!(needs_review(conf));
    }

    #[test]
    fn thresholds_are_ordered() {
        assert!(thresholds::VERY_LOW < thresholds::LOW);
        assert!(thresholds::LOW < thresholds::MODERATE);
        assert!(thresholds::MODERATE < thresholds::HIGH);
        assert!(thresholds::HIGH < thresholds::VERY_HIGH);
    }
}
