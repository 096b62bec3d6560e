//! Ordered extraction strategies.
//!
//! Strategies run in order and the first non-empty result wins. The chain
//! records which method produced the fields and how far to trust them, so
//! callers can route weak results to a human.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::confidence::{compute_field_confidence, needs_review};
use super::engine::extract_fields_with;
use super::schema::FieldSchema;
use super::types::ExtractionMethod;
use super::window::forward;
use crate::config::EngineConfig;
use crate::models::{FieldMap, FieldValue};

// ═══════════════════════════════════════════════════════════
// Trait
// ═══════════════════════════════════════════════════════════

/// One way of turning certificate text into fields.
///
/// `None` or an empty map means "nothing found, try the next strategy".
/// A model-backed extractor plugs in by implementing this and going first.
pub trait FieldStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn method(&self) -> ExtractionMethod;

    fn extract(&self, text: &str, schema: &FieldSchema) -> Option<FieldMap>;
}

// ═══════════════════════════════════════════════════════════
// Built-in strategies
// ═══════════════════════════════════════════════════════════

/// Label-anchored engine over the requested schema.
#[derive(Debug, Clone, Default)]
pub struct HeuristicStrategy {
    pub config: EngineConfig,
}

impl FieldStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Heuristic
    }

    fn extract(&self, text: &str, schema: &FieldSchema) -> Option<FieldMap> {
        let fields = extract_fields_with(text, schema, &self.config);
        (!fields.is_empty()).then_some(fields)
    }
}

static POLICY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[A-Z]{2,5}-?[A-Z0-9]*\d{4,}[A-Z0-9-]*\b").unwrap());

static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s?[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]{2})?|\$\s?[0-9]+(?:\.[0-9]{2})?").unwrap());

static DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{2}/\d{2}/\d{4}\b").unwrap());

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)*\.[A-Za-z]{2,}").unwrap());

/// Document-wide grab of anything that looks like a policy number, amount,
/// date or e-mail, plus bounded raw text for a reviewer.
#[derive(Debug, Clone, Default)]
pub struct RawTextStrategy {
    pub config: EngineConfig,
}

impl FieldStrategy for RawTextStrategy {
    fn name(&self) -> &'static str {
        "raw_text"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::RawText
    }

    fn extract(&self, text: &str, _schema: &FieldSchema) -> Option<FieldMap> {
        if text.trim().is_empty() {
            return None;
        }

        let mut fields = FieldMap::new();
        fields.insert("raw_text", forward(text, 0, self.config.raw_text_limit));
        for (field, re) in [
            ("policy_numbers", &*POLICY_NUMBER),
            ("coverage_amounts", &*AMOUNT),
            ("dates", &*DATE),
            ("contact_emails", &*EMAIL),
        ] {
            let found = unique_matches(re, text);
            if !found.is_empty() {
                fields.insert(field, FieldValue::List(found));
            }
        }
        Some(fields)
    }
}

/// Distinct matches in order of first appearance.
fn unique_matches(re: &Regex, text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in re.find_iter(text) {
        let s = m.as_str().to_string();
        if !seen.contains(&s) {
            seen.push(s);
        }
    }
    seen
}

// ═══════════════════════════════════════════════════════════
// Chain
// ═══════════════════════════════════════════════════════════

/// Result of running the chain on one document.
#[derive(Debug, Clone, Serialize)]
pub struct ChainOutcome {
    pub fields: FieldMap,
    pub method: ExtractionMethod,
    pub strategy: &'static str,
    pub confidence: f32,
    pub needs_review: bool,
}

pub struct ExtractionChain {
    strategies: Vec<Box<dyn FieldStrategy>>,
}

impl Default for ExtractionChain {
    /// Heuristic engine, then raw-text fallback.
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl ExtractionChain {
    pub fn empty() -> Self {
        Self { strategies: Vec::new() }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::empty()
            .then(HeuristicStrategy { config: config.clone() })
            .then(RawTextStrategy { config })
    }

    /// Append a strategy at the end of the chain.
    pub fn then(mut self, strategy: impl FieldStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Insert a strategy ahead of every existing one.
    pub fn prepend(mut self, strategy: impl FieldStrategy + 'static) -> Self {
        self.strategies.insert(0, Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies in order; `None` when every strategy came back empty.
    pub fn run(&self, text: &str, schema: &FieldSchema) -> Option<ChainOutcome> {
        for strategy in &self.strategies {
            let Some(fields) = strategy.extract(text, schema).filter(|f| !f.is_empty()) else {
                debug!(strategy = strategy.name(), "Strategy found nothing");
                continue;
            };

            let method = strategy.method();
            let confidence = compute_field_confidence(&fields, schema, method);
            let needs_review = needs_review(confidence);
            info!(
                strategy = strategy.name(),
                method = ?method,
                fields = fields.len(),
                confidence,
                needs_review,
                "Extraction chain resolved"
            );
            return Some(ChainOutcome {
                fields,
                method,
                strategy: strategy.name(),
                confidence,
                needs_review,
            });
        }

        warn!(strategies = self.strategies.len(), "No strategy produced fields");
        None
    }
}
