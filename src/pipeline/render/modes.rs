//! What goes on the form: the caller's fields, shaped by the render mode.

use chrono::{Months, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::models::{
    limit_field, CoverageKind, FieldMap, FieldValue, InsurerMap, ProjectContext, RequirementRecord,
};
use crate::pipeline::extraction::{coerce, FieldSchema};

// ═══════════════════════════════════════════
// Placeholders
// ═══════════════════════════════════════════

pub const PLACEHOLDER_PRODUCER: &str = "ABC Insurance Brokers LLC\n123 Insurance Plaza\nNew York, NY 10005";
pub const PLACEHOLDER_CONTACT: &str = "Contact Name";
pub const PLACEHOLDER_PHONE: &str = "(555) 123-4567";
pub const PLACEHOLDER_INSURED: &str = "Subcontractor Name";
pub const PLACEHOLDER_INSURED_ADDRESS: &str = "456 Builder Avenue\nBrooklyn, NY 11201";
pub const PLACEHOLDER_HOLDER: &str = "General Contractor";
pub const PLACEHOLDER_POLICY: &str = "N/A";
pub const PLACEHOLDER_DATE: &str = "MM/DD/YYYY";

/// Carriers a sample certificate lists when the caller supplies none.
const SAMPLE_INSURERS: [(char, &str); 3] = [
    ('A', "National Liability Insurance Co."),
    ('B', "State Workers Compensation Fund"),
    ('C', "American Auto Insurance Company"),
];

fn sample_letter(kind: CoverageKind) -> char {
    match kind {
        CoverageKind::General | CoverageKind::Umbrella => 'A',
        CoverageKind::WorkersComp => 'B',
        CoverageKind::Auto => 'C',
    }
}

/// Project fields carried alongside the certificate fields.
pub const PROJECT_NAME: &str = "project_name";
pub const PROJECT_ADDRESS: &str = "project_address";

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenderMode<'a> {
    /// Placeholder broker and insured identity, the program's minimums as
    /// limits, real project data.
    Sample {
        requirements: &'a [RequirementRecord],
        project: &'a ProjectContext,
    },
    /// A previously extracted certificate re-issued for a new project.
    Reuse { project: &'a ProjectContext },
}

impl RenderMode<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sample { .. } => "sample",
            Self::Reuse { .. } => "reuse",
        }
    }

    pub fn project(&self) -> &ProjectContext {
        match self {
            Self::Sample { project, .. } | Self::Reuse { project } => project,
        }
    }
}

/// Field map the form is drawn from.
pub fn prepare_fields(fields: &FieldMap, mode: &RenderMode<'_>, today: NaiveDate) -> FieldMap {
    let mut out = normalize(fields);
    match mode {
        RenderMode::Sample { requirements, project } => {
            apply_requirements(&mut out, requirements);
            fill_sample_identity(&mut out, project);
            fill_sample_terms(&mut out, today);
            apply_project(&mut out, project);
        }
        RenderMode::Reuse { project } => {
            // The previous project's additional insureds do not carry over.
            out.remove("additional_insureds");
            apply_project(&mut out, project);
        }
    }
    debug!(mode = mode.name(), fields = out.len(), "Render fields prepared");
    out
}

/// Stored maps may carry dates and amounts as text; coerce every known
/// field to its catalog kind and drop what does not convert.
fn normalize(fields: &FieldMap) -> FieldMap {
    let schema = FieldSchema::certificate();
    fields
        .iter()
        .filter_map(|(name, value)| match schema.kind(name) {
            Some(kind) => coerce(value.clone(), kind).map(|v| (name.clone(), v)),
            None => Some((name.clone(), value.clone())),
        })
        .collect()
}

/// Highest minimum per limit field; endorsement demands become flags.
fn apply_requirements(out: &mut FieldMap, requirements: &[RequirementRecord]) {
    for req in requirements {
        for (field, amount) in &req.minimums {
            if limit_field(field).is_none() {
                continue;
            }
            let current = out.number(field).unwrap_or(0.0);
            if *amount > current {
                out.insert(field.clone(), *amount);
            }
        }
        if req.additional_insured_required {
            out.insert("additional_insured", true);
        }
        if req.waiver_required {
            out.insert("waiver_of_subrogation", true);
        }
    }
}

fn fill_sample_identity(out: &mut FieldMap, project: &ProjectContext) {
    set_default(out, "producer", PLACEHOLDER_PRODUCER);
    match project.subcontractor_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => out.insert("named_insured", name),
        _ => set_default(out, "named_insured", PLACEHOLDER_INSURED),
    }
    set_default(out, "insured_address", PLACEHOLDER_INSURED_ADDRESS);

    if !out.contains("description_of_operations") {
        let project_name = project.project_name.as_deref().unwrap_or("the project");
        let sub = out.text("named_insured").unwrap_or(PLACEHOLDER_INSURED).to_string();
        out.insert(
            "description_of_operations",
            format!("Work performed for {project_name} by {sub}."),
        );
    }
}

/// Policy period of one year from today and sample carriers, for every
/// row that will be drawn.
fn fill_sample_terms(out: &mut FieldMap, today: NaiveDate) {
    let expires = today.checked_add_months(Months::new(12)).unwrap_or(today);

    let mut insurers = out
        .get("insurers")
        .map(InsurerMap::from_field_value)
        .unwrap_or_default();
    let listed_by_caller = !insurers.is_empty();
    if !listed_by_caller {
        for (letter, name) in SAMPLE_INSURERS {
            insurers.insert(letter, name);
        }
        out.insert("insurers", insurers.to_field_value());
    }

    for kind in CoverageKind::ALL {
        if !row_drawn(out, kind) {
            continue;
        }
        let p = kind.prefix();
        set_default_value(out, &format!("{p}_effective_date"), FieldValue::Date(today));
        set_default_value(out, &format!("{p}_expiration_date"), FieldValue::Date(expires));
        if !listed_by_caller {
            set_default(out, &format!("{p}_insurer_letter"), &sample_letter(kind).to_string());
        }
    }
}

fn apply_project(out: &mut FieldMap, project: &ProjectContext) {
    if let Some(holder) = project.certificate_holder() {
        out.insert("certificate_holder", holder);
    }
    if let Some(name) = non_blank(project.project_name.as_deref()) {
        out.insert(PROJECT_NAME, name);
    }
    if let Some(address) = non_blank(project.project_address.as_deref()) {
        out.insert(PROJECT_ADDRESS, address);
    }
    if !project.additional_insureds.is_empty() {
        out.insert("additional_insureds", project.additional_insureds.clone());
    }
}

/// General liability and workers compensation are always on the form;
/// auto and umbrella only with data.
pub fn row_drawn(fields: &FieldMap, kind: CoverageKind) -> bool {
    match kind {
        CoverageKind::General | CoverageKind::WorkersComp => true,
        CoverageKind::Auto | CoverageKind::Umbrella => fields.has_coverage(kind),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn set_default(out: &mut FieldMap, field: &str, value: &str) {
    set_default_value(out, field, FieldValue::Text(value.to_string()));
}

fn set_default_value(out: &mut FieldMap, field: &str, value: FieldValue) {
    if !out.contains(field) {
        out.insert(field, value);
    }
}
