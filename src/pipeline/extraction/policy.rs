//! Policy numbers and policy dates inside one coverage block.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4}-\d{2}-\d{2}(?:T[0-9:.]+Z?)?|\d{1,2}/\d{1,2}/\d{2,4})\b").unwrap()
});

/// Minimum length of a policy-number candidate.
const MIN_POLICY_LEN: usize = 5;

/// Parse the date formats found on certificates: `MM/DD/YYYY`, `MM/DD/YY`,
/// `YYYY-MM-DD`, and ISO timestamps (date part only).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split('T').next().unwrap_or(raw);
    if date_part.contains('-') {
        return NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
    }
    // chrono's %Y reads "26" as year 26, so pick the format by year width.
    let fmt = match date_part.rsplit('/').next()?.len() {
        2 => "%m/%d/%y",
        4 => "%m/%d/%Y",
        _ => return None,
    };
    NaiveDate::parse_from_str(date_part, fmt).ok()
}

/// Every parseable date in the block, in order of appearance.
pub fn dates_in(block: &str) -> Vec<NaiveDate> {
    DATE.find_iter(block)
        .filter_map(|m| parse_date(m.as_str()))
        .collect()
}

/// `(effective, expiration)`: first and second date in the block.
pub fn policy_dates(block: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let mut dates = dates_in(block).into_iter();
    (dates.next(), dates.next())
}

/// First token in the block that looks like a policy number.
pub fn policy_number(block: &str) -> Option<String> {
    block
        .split_whitespace()
        .filter(|raw| !raw.starts_with('$') && !raw.contains(','))
        .map(clean_token)
        .find(|token| is_policy_number(token))
        .map(str::to_string)
}

fn clean_token(raw: &str) -> &str {
    raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '/')
        .trim_start_matches('#')
        .trim_matches('-')
}

fn is_policy_number(token: &str) -> bool {
    if token.chars().count() < MIN_POLICY_LEN {
        return false;
    }
    if !token.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    if parse_date(token).is_some() || DATE.is_match(token) {
        return false;
    }
    let letters = token.chars().filter(|c| c.is_alphabetic()).count();
    letters * 2 <= token.chars().count()
}
