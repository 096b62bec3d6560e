use serde::{Deserialize, Serialize};

use super::format::FileCategory;
use super::ExtractionError;

/// How the field map was produced; drives the confidence base.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Caller-supplied strategy (e.g. a model-backed extractor).
    External,
    /// Label-anchored windowed heuristics.
    Heuristic,
    /// Document-wide loose pattern grab plus raw text for review.
    RawText,
}

/// How the text itself was obtained from the document bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMethod {
    PdfDirect,
    PlainTextRead,
}

/// Decoded text of one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedText {
    pub method: DecodeMethod,
    pub category: FileCategory,
    pub pages: Vec<String>,
    pub full_text: String,
}

impl DecodedText {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// True when the document decoded but carries no text at all
    /// (typically a scanned PDF without a text layer).
    pub fn is_blank(&self) -> bool {
        self.full_text.trim().is_empty()
    }
}

/// Bytes → text collaborator. Implementations fail only for unreadable or
/// undecodable documents.
pub trait DocumentDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedText, ExtractionError>;
}
