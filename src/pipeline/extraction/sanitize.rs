/// Punctuation ACORD forms rely on, plus the typographic quotes and dashes
/// PDF text layers emit.
const KEPT_PUNCTUATION: &str = ".,;:-/()[]+=%#@&$|'\"!?*_\u{2013}\u{2014}\u{2018}\u{2019}\u{201C}\u{201D}\u{00A9}";

fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c == ' ' || c == '\n' || KEPT_PUNCTUATION.contains(c)
}

/// Clean decoded certificate text before field extraction: unified line
/// endings, tabs and non-breaking spaces as spaces, control characters
/// dropped, lines trimmed and blank lines removed.
pub fn sanitize_extracted_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let kept: String = unified
        .chars()
        .map(|c| match c {
            '\t' | '\u{00A0}' => ' ',
            other => other,
        })
        .filter(|c| is_kept(*c))
        .collect();

    kept.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_null_bytes() {
        let raw = "INSURED\x00 ABC Plumbing";
        let clean = sanitize_extracted_text(raw);
        assert!(!clean.contains('\x00'));
        assert!(clean.contains("ABC Plumbing"));
    }

    #[test]
    fn preserves_dollar_amounts_and_dates() {
        let raw = "EACH OCCURRENCE $1,000,000\t01/01/2026";
        let clean = sanitize_extracted_text(raw);
        assert_eq!(clean, "EACH OCCURRENCE $1,000,000 01/01/2026");
    }

    #[test]
    fn normalizes_carriage_returns() {
        let raw = "PRODUCER\r\nAcme Brokers\rNew York";
        assert_eq!(sanitize_extracted_text(raw), "PRODUCER\nAcme Brokers\nNew York");
    }

    #[test]
    fn collapses_blank_lines() {
        let raw = "Line one\n\n\n\nLine two\n\n\nLine three";
        let clean = sanitize_extracted_text(raw);
        assert_eq!(clean, "Line one\nLine two\nLine three");
    }

    #[test]
    fn keeps_acord_punctuation() {
        let raw = "PERSONAL & ADV INJURY | E.L. DISEASE - EA EMPLOYEE | POLICY #";
        assert_eq!(sanitize_extracted_text(raw), raw);
    }

    #[test]
    fn empty_input_returns_empty() {
        assert_eq!(sanitize_extracted_text(""), "");
    }
}
