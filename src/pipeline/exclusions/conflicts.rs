use tracing::{debug, info};

use crate::models::{
    ConflictRecord, ExclusionRecord, ExclusionType, InsuranceType, ProjectContext,
    RequirementRecord, Severity,
};

/// Cross-check scanned exclusions against project attributes and the
/// resolved requirements.
///
/// | exclusion              | collides with                                   | severity |
/// |------------------------|-------------------------------------------------|----------|
/// | residential            | residential/habitational project type           | critical |
/// | labor law              | project in New York                             | high     |
/// | professional liability | a professional liability requirement            | high     |
/// | pollution              | pollution/environmental requirement or note     | high     |
pub fn compare_exclusions(
    exclusions: &[ExclusionRecord],
    requirements: &[RequirementRecord],
    project: &ProjectContext,
) -> Vec<ConflictRecord> {
    let mut conflicts = Vec::new();

    for exclusion in exclusions {
        let conflict = match exclusion.exclusion_type {
            ExclusionType::Residential if project.is_residential() => Some(conflict(
                exclusion,
                Severity::Critical,
                "Residential Exclusion Conflicts With Project Type",
                format!(
                    "Policy excludes residential work but the project is {}",
                    project.project_type.as_deref().unwrap_or("residential")
                ),
                None,
            )),
            ExclusionType::LaborLaw if project.is_new_york() => Some(conflict(
                exclusion,
                Severity::High,
                "New York Labor Law Exclusion",
                "Policy excludes New York Labor Law claims on a New York project".to_string(),
                None,
            )),
            ExclusionType::ProfessionalLiability => requirements
                .iter()
                .find(|r| is_professional(r))
                .map(|r| {
                    conflict(
                        exclusion,
                        Severity::High,
                        "Professional Liability Exclusion Conflicts With Requirement",
                        "Program requires professional liability but the policy excludes professional services"
                            .to_string(),
                        Some(r.insurance_type.clone()),
                    )
                }),
            ExclusionType::Pollution => {
                let requirement = requirements.iter().find(|r| is_pollution(r));
                if requirement.is_some() || project.mentions_pollution() {
                    Some(conflict(
                        exclusion,
                        Severity::High,
                        "Pollution Exclusion Conflicts With Project Exposure",
                        "Policy excludes pollution but the project carries pollution or environmental exposure"
                            .to_string(),
                        requirement.map(|r| r.insurance_type.clone()),
                    ))
                } else {
                    None
                }
            }
            _ => None,
        };

        match conflict {
            Some(c) => conflicts.push(c),
            None => debug!(exclusion = %exclusion.exclusion_type, line = exclusion.line_number, "Exclusion has no conflict"),
        }
    }

    info!(
        exclusions = exclusions.len(),
        conflicts = conflicts.len(),
        "Exclusion comparison complete"
    );
    conflicts
}

fn conflict(
    exclusion: &ExclusionRecord,
    severity: Severity,
    title: &str,
    reason: String,
    requirement: Option<String>,
) -> ConflictRecord {
    ConflictRecord {
        exclusion: exclusion.clone(),
        severity,
        title: title.to_string(),
        reason,
        requirement,
    }
}

fn is_professional(req: &RequirementRecord) -> bool {
    req.parsed_type().ok() == Some(InsuranceType::ProfessionalLiability)
        || req.insurance_type.to_lowercase().contains("professional")
}

fn is_pollution(req: &RequirementRecord) -> bool {
    if req.parsed_type().ok() == Some(InsuranceType::PollutionLiability) {
        return true;
    }
    let mentions = |s: &str| {
        let s = s.to_lowercase();
        s.contains("pollution") || s.contains("environmental")
    };
    mentions(&req.insurance_type) || req.notes.as_deref().is_some_and(mentions)
}
