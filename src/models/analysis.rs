//! Compliance evaluation results.
//!
//! `PolicyAnalysis` keeps its deficiency list private. Every mutation goes
//! through a method that recounts severities and recomputes the status, so
//! the counts can never drift from the list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::certificate::FieldValue;
use super::enums::{AnalysisStatus, DeficiencyCategory, Severity};
use super::exclusion::ConflictRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deficiency {
    pub id: Uuid,
    pub severity: Severity,
    pub category: DeficiencyCategory,
    pub field: String,
    pub title: String,
    pub description: String,
    pub current_value: Option<FieldValue>,
    pub required_value: Option<FieldValue>,
}

impl Deficiency {
    pub fn new(
        severity: Severity,
        category: DeficiencyCategory,
        field: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            category,
            field: field.into(),
            title: title.into(),
            description: description.into(),
            current_value: None,
            required_value: None,
        }
    }

    pub fn with_values(mut self, current: Option<FieldValue>, required: Option<FieldValue>) -> Self {
        self.current_value = current;
        self.required_value = required;
        self
    }
}

impl From<&ConflictRecord> for Deficiency {
    fn from(conflict: &ConflictRecord) -> Self {
        Deficiency::new(
            conflict.severity,
            DeficiencyCategory::Exclusion,
            conflict.exclusion.exclusion_type.as_str(),
            conflict.title.clone(),
            conflict.reason.clone(),
        )
        .with_values(Some(FieldValue::Text(conflict.exclusion.matched_line.clone())), None)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn tally(deficiencies: &[Deficiency]) -> Self {
        let mut counts = Self::default();
        for d in deficiencies {
            match d.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// One evaluation pass over one certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyAnalysis {
    analyzed_at: DateTime<Utc>,
    severity_counts: SeverityCounts,
    status: AnalysisStatus,
    deficiencies: Vec<Deficiency>,
    tier: Option<String>,
    /// Requirement records skipped as invalid, by insurance_type.
    skipped_requirements: Vec<String>,
}

impl PolicyAnalysis {
    pub fn new(analyzed_at: DateTime<Utc>, tier: Option<String>) -> Self {
        Self {
            analyzed_at,
            severity_counts: SeverityCounts::default(),
            status: AnalysisStatus::Approved,
            deficiencies: Vec::new(),
            tier,
            skipped_requirements: Vec::new(),
        }
    }

    pub fn push(&mut self, deficiency: Deficiency) {
        self.deficiencies.push(deficiency);
        self.recount();
    }

    pub fn extend<I: IntoIterator<Item = Deficiency>>(&mut self, deficiencies: I) {
        self.deficiencies.extend(deficiencies);
        self.recount();
    }

    /// Append exclusion conflicts after the evaluator's own findings.
    pub fn add_conflicts(&mut self, conflicts: &[ConflictRecord]) {
        self.extend(conflicts.iter().map(Deficiency::from));
    }

    pub(crate) fn note_skipped(&mut self, insurance_type: &str) {
        self.skipped_requirements.push(insurance_type.to_string());
    }

    fn recount(&mut self) {
        self.severity_counts = SeverityCounts::tally(&self.deficiencies);
        self.status = if self.deficiencies.is_empty() {
            AnalysisStatus::Approved
        } else {
            AnalysisStatus::Deficient
        };
    }

    pub fn analyzed_at(&self) -> DateTime<Utc> {
        self.analyzed_at
    }

    pub fn status(&self) -> AnalysisStatus {
        self.status
    }

    pub fn severity_counts(&self) -> SeverityCounts {
        self.severity_counts
    }

    pub fn deficiencies(&self) -> &[Deficiency] {
        &self.deficiencies
    }

    pub fn tier(&self) -> Option<&str> {
        self.tier.as_deref()
    }

    pub fn skipped_requirements(&self) -> &[String] {
        &self.skipped_requirements
    }

    pub fn is_approved(&self) -> bool {
        self.status == AnalysisStatus::Approved
    }

    /// Deficiencies sorted critical-first, stable within a severity.
    pub fn ranked(&self) -> Vec<&Deficiency> {
        let mut ranked: Vec<&Deficiency> = self.deficiencies.iter().collect();
        ranked.sort_by_key(|d| d.severity);
        ranked
    }
}
