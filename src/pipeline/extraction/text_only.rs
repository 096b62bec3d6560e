//! Text-only decoding, no OCR.
//!
//! Handles two document categories:
//! - `PlainText`: UTF-8 read
//! - `Pdf`: PDFium native text layer (no rendering)
//!
//! Images need an OCR collaborator and are rejected with
//! `ExtractionError::UnsupportedFormat`.

use super::format::{detect_format, FileCategory, MAX_DOCUMENT_SIZE};
use super::pdfium::extract_text_layer;
use super::sanitize::sanitize_extracted_text;
use super::types::{DecodeMethod, DecodedText, DocumentDecoder};
use super::ExtractionError;

/// Default decoder for certificates delivered as text or digital PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl DocumentDecoder for PlainTextExtractor {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedText, ExtractionError> {
        let format = detect_format(bytes);
        tracing::info!(
            category = format.category.as_str(),
            size = format.size_bytes,
            "PlainTextExtractor: starting text-only extraction"
        );

        if format.size_bytes > MAX_DOCUMENT_SIZE {
            return Err(ExtractionError::TooLarge(format.size_bytes));
        }

        let (method, raw_pages) = match format.category {
            FileCategory::PlainText => {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|e| ExtractionError::EncodingError(e.to_string()))?;
                (DecodeMethod::PlainTextRead, vec![text])
            }
            FileCategory::Pdf => (DecodeMethod::PdfDirect, extract_text_layer(bytes)?),
            FileCategory::Image | FileCategory::Unsupported => {
                return Err(ExtractionError::UnsupportedFormat(format.mime_type));
            }
        };

        let pages: Vec<String> = raw_pages.iter().map(|p| sanitize_extracted_text(p)).collect();
        let full_text = pages.join("\n");

        tracing::info!(
            method = ?method,
            pages = pages.len(),
            text_length = full_text.len(),
            "PlainTextExtractor: extraction complete"
        );

        Ok(DecodedText {
            method,
            category: format.category,
            pages,
            full_text,
        })
    }
}
