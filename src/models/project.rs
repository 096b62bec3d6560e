use serde::{Deserialize, Serialize};

/// Project attributes the evaluator, scanner and renderer compare against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectContext {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub project_address: Option<String>,
    /// Free text such as "Residential High-Rise".
    #[serde(default)]
    pub project_type: Option<String>,
    /// Two-letter code or full state name.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub gc_name: Option<String>,
    #[serde(default)]
    pub gc_address: Option<String>,
    #[serde(default)]
    pub subcontractor_name: Option<String>,
    #[serde(default)]
    pub additional_insureds: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl ProjectContext {
    pub fn is_new_york(&self) -> bool {
        self.state
            .as_deref()
            .map(|s| {
                let s = s.trim();
                s.eq_ignore_ascii_case("NY") || s.eq_ignore_ascii_case("New York")
            })
            .unwrap_or(false)
    }

    pub fn is_residential(&self) -> bool {
        self.project_type
            .as_deref()
            .map(|t| {
                let t = t.to_lowercase();
                t.contains("residential") || t.contains("habitational")
            })
            .unwrap_or(false)
    }

    /// Notes mention pollution or environmental exposure.
    pub fn mentions_pollution(&self) -> bool {
        self.notes.iter().any(|n| {
            let n = n.to_lowercase();
            n.contains("pollution") || n.contains("environmental")
        })
    }

    /// Certificate-holder block text: GC name plus address when known.
    pub fn certificate_holder(&self) -> Option<String> {
        let name = self.gc_name.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }
        Some(match self.gc_address.as_deref().map(str::trim) {
            Some(addr) if !addr.is_empty() => format!("{name}\n{addr}"),
            _ => name.to_string(),
        })
    }
}
