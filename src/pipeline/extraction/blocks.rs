//! Free-text blocks: producer, insured, certificate holder, description of
//! operations, additional insureds.
//!
//! A block starts at a line-leading label and runs until the next known
//! label or the line cap.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::policy::dates_in;
use super::sections::label_starts;
use super::window::forward;

/// How a block's lines become a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockShape {
    /// First line only.
    FirstLine,
    /// Every line after the first.
    Rest,
    /// All lines, newline-joined.
    Paragraph,
    /// Split on newline, comma, semicolon or pipe.
    List,
}

/// A free-text field and the label that opens it.
pub struct BlockField {
    pub field: &'static str,
    label: &'static LazyLock<Regex>,
    pub shape: BlockShape,
}

static PRODUCER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^PRODUCER\b\s*:?").unwrap());

static INSURED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^INSURED\b\s*:?").unwrap());

static HOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^CERTIFICATE\s+HOLDER\b\s*:?").unwrap());

static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^DESCRIPTION\s+OF\s+OPERATIONS(?:\s*/\s*LOCATIONS)?(?:\s*/\s*VEHICLES)?(?:\s*\([^)]*\))?\s*:?",
    )
    .unwrap()
});

static ADDITIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^ADDITIONAL\s+INSUREDS?(?:\s*\(S\))?\s*:").unwrap()
});

/// Line-leading labels that close any open block.
static STOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:INSURERS?(?:\s*\(S\))?\s+AFFORDING|INSURER\s+[A-F]\b|COVERAGES\b|CANCELLATION\b|AUTHORIZED\s+REPRESENTATIVE|INSR\.?\s+LTR|IMPORTANT\b|DATE\b|CONTACT\b|PHONE\b|E-?MAIL\b|FAX\b|NAIC\b|THIS\s+IS\s+TO\s+CERTIFY|ACORD\b|CERTIFICATE\s+OF\s+LIABILITY|\[X\])",
    )
    .unwrap()
});

/// Words that make a label the subject of a sentence, as in "Certificate
/// holder is included as additional insured".
static PROSE_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:is|are|was|were|and|or|as|shall|will|must|may|has|have|named|to|of|in|for|with|under|per)\b")
        .unwrap()
});

static CERTIFICATE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bDATE\s*\(MM/DD/YYYY\)").unwrap());

pub static BLOCK_FIELDS: [BlockField; 6] = [
    BlockField { field: "producer", label: &PRODUCER, shape: BlockShape::Paragraph },
    BlockField { field: "named_insured", label: &INSURED, shape: BlockShape::FirstLine },
    BlockField { field: "insured_address", label: &INSURED, shape: BlockShape::Rest },
    BlockField { field: "certificate_holder", label: &HOLDER, shape: BlockShape::Paragraph },
    BlockField { field: "description_of_operations", label: &DESCRIPTION, shape: BlockShape::Paragraph },
    BlockField { field: "additional_insureds", label: &ADDITIONAL, shape: BlockShape::List },
];

/// A shaped block value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockValue {
    Text(String),
    List(Vec<String>),
}

/// Text following `label` when `line` opens with it as a field label.
/// A label followed by prose is a sentence about that party, unless a
/// colon marks it as a label.
fn label_remainder<'a>(label: &Regex, line: &'a str) -> Option<&'a str> {
    let m = label.find(line)?;
    let after = &line[m.end()..];
    let has_colon = m.as_str().ends_with(':') || after.trim_start().starts_with(':');
    let rest = after.trim_start().trim_start_matches(':').trim();
    (has_colon || !PROSE_CONTINUATION.is_match(rest)).then_some(rest)
}

fn is_any_label(line: &str) -> bool {
    STOP.is_match(line)
        || [&PRODUCER, &INSURED, &HOLDER, &DESCRIPTION, &ADDITIONAL]
            .iter()
            .any(|re| label_remainder(re, line).is_some())
        || label_starts(line).next().is_some()
}

/// Lines of the first block opened by `label`, whitespace-normalized.
pub fn read_block(text: &str, label: &Regex, max_lines: usize) -> Option<Vec<String>> {
    let mut lines = text.lines().map(str::trim);
    let remainder = lines.by_ref().find_map(|line| label_remainder(label, line))?;

    let mut collected = Vec::new();
    if !remainder.is_empty() {
        collected.push(normalize_line(remainder));
    }
    for line in lines {
        if collected.len() >= max_lines {
            break;
        }
        if line.is_empty() {
            continue;
        }
        if is_any_label(line) {
            break;
        }
        collected.push(normalize_line(line));
    }

    (!collected.is_empty()).then_some(collected)
}

fn normalize_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Apply a block shape to its lines.
pub fn shape_block(lines: &[String], shape: BlockShape) -> Option<BlockValue> {
    match shape {
        BlockShape::FirstLine => lines.first().cloned().map(BlockValue::Text),
        BlockShape::Rest => {
            let rest = lines.get(1..).unwrap_or_default();
            (!rest.is_empty()).then(|| BlockValue::Text(rest.join("\n")))
        }
        BlockShape::Paragraph => (!lines.is_empty()).then(|| BlockValue::Text(lines.join("\n"))),
        BlockShape::List => {
            let items = split_list(&lines.join("\n"));
            (!items.is_empty()).then_some(BlockValue::List(items))
        }
    }
}

/// Trimmed, non-empty items separated by newline, comma, semicolon or pipe.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(['\n', ',', ';', '|'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract one named block field.
pub fn extract_block(text: &str, field: &str, max_lines: usize) -> Option<BlockValue> {
    let spec = BLOCK_FIELDS.iter().find(|b| b.field == field)?;
    let lines = read_block(text, spec.label, max_lines)?;
    shape_block(&lines, spec.shape)
}

/// Date printed under the "DATE (MM/DD/YYYY)" header box.
pub fn certificate_date(text: &str) -> Option<NaiveDate> {
    let m = CERTIFICATE_DATE.find(text)?;
    dates_in(forward(text, m.end(), 80)).into_iter().next()
}

/// Generic `LABEL: value` line lookup for fields the engine has no
/// dedicated rule for. The label is the field name upper-cased with
/// underscores as spaces.
pub fn labeled_value(text: &str, field: &str) -> Option<String> {
    let label = field.replace('_', " ").to_uppercase();
    let pattern = format!(r"(?im)^[ \t]*{}[ \t]*[:#][ \t]*(.+?)[ \t]*$", regex::escape(&label));
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}
