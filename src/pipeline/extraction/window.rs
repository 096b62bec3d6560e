//! Byte-offset helpers that keep every slice on a char boundary.

/// Largest char boundary `<= idx`.
pub fn floor_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Smallest char boundary `>= idx`.
pub fn ceil_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// `[start, start + len)` clamped to the text and to char boundaries.
pub fn forward(text: &str, start: usize, len: usize) -> &str {
    let start = floor_boundary(text, start);
    let end = floor_boundary(text, start.saturating_add(len));
    &text[start..end]
}

/// The `len` bytes ending at `end`, clamped to char boundaries.
pub fn behind(text: &str, end: usize, len: usize) -> &str {
    let end = floor_boundary(text, end);
    let start = ceil_boundary(text, end.saturating_sub(len));
    &text[start..end]
}

/// Byte range of the line containing `idx`, excluding the newline.
pub fn line_bounds(text: &str, idx: usize) -> (usize, usize) {
    let idx = floor_boundary(text, idx);
    let start = text[..idx].rfind('\n').map(|p| p + 1).unwrap_or(0);
    let end = text[idx..].find('\n').map(|p| idx + p).unwrap_or(text.len());
    (start, end)
}

/// Collapse runs of spaces inside each line, trim, and drop blank lines.
pub fn normalize_block(text: &str) -> String {
    text.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
