use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::ExclusionType;

/// A compiled exclusion family.
pub struct ExclusionPattern {
    pub regex: Regex,
    pub exclusion_type: ExclusionType,
    pub description: &'static str,
}

/// Words that turn a subject into an exclusion.
const CUE: &str = r"(?:exclu\w*|not\s+covered|no\s+coverage|does\s+not\s+apply)";

/// Subject and cue on the same line, either order, at most 60 chars apart.
fn family(subject: &str, exclusion_type: ExclusionType, description: &'static str) -> ExclusionPattern {
    let regex_str = format!(
        r"(?i)(?:\b(?:{subject})\b[^\n]{{0,60}}\b{CUE}|\b{CUE}[^\n]{{0,60}}\b(?:{subject})\b)"
    );
    ExclusionPattern {
        regex: Regex::new(&regex_str).expect("Invalid exclusion regex pattern"),
        exclusion_type,
        description,
    }
}

/// Statements that an exclusion is absent: "not excluded", "no exclusion",
/// "<...> exclusion does not apply", "exclusion not applicable".
static NEGATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bnot\s+(?:be(?:ing)?\s+)?exclu\w*|\bno\s+exclusions?\b|\bexclu\w*(?:\s+[\w/&-]+){0,3}?\s+(?:does|do|shall|will)\s+not\s+apply|\bexclu\w*(?:\s+(?:is|are))?\s+not\s+applicable",
    )
    .expect("Invalid negated exclusion pattern")
});

/// The line with every negated exclusion statement blanked out, so only
/// affirmative exclusions are left for the families to match.
pub fn without_negations(line: &str) -> Cow<'_, str> {
    NEGATED.replace_all(line, " ")
}

/// Every exclusion family the scanner knows.
pub static EXCLUSION_PATTERNS: LazyLock<Vec<ExclusionPattern>> = LazyLock::new(|| {
    vec![
        family(
            r"residential|habitational|condominiums?|townho(?:mes?|uses?)|single[-\s]family|apartments?",
            ExclusionType::Residential,
            "Residential/habitational construction exclusion",
        ),
        family(
            r"labor\s+law|scaffold\s+law|(?:section|sections|§)\s*24[01](?:\s*(?:/|and|&)\s*24[01])?",
            ExclusionType::LaborLaw,
            "New York Labor Law (240/241) exclusion",
        ),
        family(r"asbestos", ExclusionType::Asbestos, "Asbestos exclusion"),
        family(r"lead(?:[-\s]based)?(?:\s+paint)?", ExclusionType::Lead, "Lead exclusion"),
        family(r"mold|molds|fungi|fungus|mildew", ExclusionType::Mold, "Mold/fungi exclusion"),
        family(r"silica|silicosis", ExclusionType::Silica, "Silica exclusion"),
        family(
            r"pollution|pollutants?|contaminants?|environmental",
            ExclusionType::Pollution,
            "Pollution exclusion",
        ),
        family(
            r"professional\s+(?:liability|services?|errors)|errors\s+(?:and|&)\s+omissions|design\s+services",
            ExclusionType::ProfessionalLiability,
            "Professional services exclusion",
        ),
        family(
            r"cyber|data\s+breach|electronic\s+data|network\s+security",
            ExclusionType::Cyber,
            "Cyber/electronic data exclusion",
        ),
        family(
            r"EIFS|exterior\s+insulation(?:\s+(?:and|&)\s+finish)?",
            ExclusionType::Eifs,
            "Exterior insulation and finish systems exclusion",
        ),
        family(r"action[-\s]over", ExclusionType::ActionOver, "Action-over exclusion"),
        family(
            r"wrap[-\s]?up|OCIP|CCIP|consolidated\s+insurance\s+program",
            ExclusionType::WrapUp,
            "Wrap-up/consolidated program exclusion",
        ),
    ]
});
