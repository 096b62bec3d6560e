use serde::{Deserialize, Serialize};

use super::enums::{ExclusionType, Severity};

/// An exclusionary clause found on one line of certificate/policy text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRecord {
    pub exclusion_type: ExclusionType,
    pub matched_line: String,
    /// Two lines before through three lines after, newline-joined.
    pub context: String,
    /// 1-based.
    pub line_number: usize,
}

/// An exclusion that collides with project attributes or requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub exclusion: ExclusionRecord,
    pub severity: Severity,
    pub title: String,
    pub reason: String,
    /// Program/insurance type of the requirement involved, when one was.
    pub requirement: Option<String>,
}
