//! Positioned drawing primitives for one certificate page.
//!
//! The layout is pure data. `pdf.rs` paints it; `to_text` reads it back in
//! draw order, the same order a PDF text extractor sees.

use serde::Serialize;

use super::geometry::{MARGIN, PAGE_HEIGHT, PAGE_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    /// Baseline.
    pub y: f32,
    pub size: f32,
    pub font: Font,
}

/// Stroked box; `y` is the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxOutline {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rule {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateLayout {
    pub title: String,
    pub width: f32,
    pub height: f32,
    runs: Vec<TextRun>,
    boxes: Vec<BoxOutline>,
    rules: Vec<Rule>,
}

impl CertificateLayout {
    /// Empty letter page.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            runs: Vec::new(),
            boxes: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Blank text is skipped.
    pub fn text(&mut self, x: f32, y: f32, size: f32, font: Font, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        self.runs.push(TextRun { text, x, y, size, font });
    }

    pub fn outline(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.boxes.push(BoxOutline { x, y, width, height });
    }

    pub fn rule(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.rules.push(Rule { x1, y1, x2, y2 });
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn boxes(&self) -> &[BoxOutline] {
        &self.boxes
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Lowest baseline drawn, if any.
    pub fn lowest_baseline(&self) -> Option<f32> {
        self.runs.iter().map(|r| r.y).reduce(f32::min)
    }

    /// Every run inside the page margins.
    pub fn fits_page(&self) -> bool {
        self.runs
            .iter()
            .all(|r| r.x >= MARGIN && r.x < self.width - MARGIN && r.y >= MARGIN && r.y <= self.height - MARGIN)
    }

    /// Text layer in draw order. Consecutive runs sharing a baseline are
    /// joined with a space; every other run starts a new line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mut baseline: Option<f32> = None;
        for run in &self.runs {
            match baseline {
                Some(y) if (y - run.y).abs() < 0.01 => out.push(' '),
                Some(_) => out.push('\n'),
                None => {}
            }
            out.push_str(&run.text);
            baseline = Some(run.y);
        }
        out
    }
}

/// Running vertical position. Conditional content moves the cursor; nothing
/// below the header is placed at a hard-coded Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    y: f32,
}

impl Cursor {
    pub fn at(y: f32) -> Self {
        Self { y }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    /// Current baseline, then move down by `step`.
    pub fn take(&mut self, step: f32) -> f32 {
        let y = self.y;
        self.y -= step;
        y
    }

    pub fn skip(&mut self, step: f32) {
        self.y -= step;
    }

    /// Lower of two cursors, for side-by-side columns.
    pub fn lowest(self, other: Cursor) -> Cursor {
        if other.y < self.y {
            other
        } else {
            self
        }
    }
}

/// Greedy word wrap on character count.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
