//! Certificate text → structured fields.
//!
//! Two halves: the document decoder (bytes → text, the only place that can
//! fail with an infrastructure error) and the field engine (text → partial
//! field map, which never fails; a missing field is simply absent).

pub mod types;
pub mod confidence;
pub mod sanitize;
pub mod format;
pub mod pdfium;
pub mod text_only;
pub mod window;
pub mod sections;
pub mod policy;
pub mod limits;
pub mod carriers;
pub mod endorsements;
pub mod blocks;
pub mod schema;
pub mod engine;
pub mod strategy;

pub use types::*;
pub use confidence::*;
pub use sanitize::*;
pub use engine::*;
pub use schema::*;
pub use strategy::*;
pub use text_only::PlainTextExtractor;

use thiserror::Error;

/// Infrastructure failures while turning document bytes into text.
///
/// "No data extracted" is never one of these; the engine reports it by
/// returning an empty map.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Text encoding error: {0}")]
    EncodingError(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("PDF is password protected")]
    PdfEncrypted,

    #[error("PDFium library unavailable: {0}")]
    PdfiumUnavailable(String),

    #[error("Document contains no pages")]
    EmptyDocument,

    #[error("Document exceeds maximum size ({0} bytes)")]
    TooLarge(u64),

    #[error("Unsupported format for extraction: {0}")]
    UnsupportedFormat(String),
}
