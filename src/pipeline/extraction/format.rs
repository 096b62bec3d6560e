use serde::{Deserialize, Serialize};

/// Broad document categories the decoder distinguishes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Pdf,
    Image,
    PlainText,
    Unsupported,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }

    /// Images carry no text layer; they need an OCR collaborator.
    pub fn needs_ocr(&self) -> bool {
        matches!(self, Self::Image)
    }
}

/// Result of format detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDetection {
    pub mime_type: String,
    pub category: FileCategory,
    pub size_bytes: u64,
}

/// Certificates are one page; anything past this is not a certificate.
pub const MAX_DOCUMENT_SIZE: u64 = 25 * 1024 * 1024;

/// Detect format from magic bytes (NOT file extensions).
pub fn detect_format(bytes: &[u8]) -> FormatDetection {
    let size_bytes = bytes.len() as u64;
    let header = &bytes[..bytes.len().min(8)];

    let (mime_type, category) = match header {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => ("application/pdf", FileCategory::Pdf),
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => ("image/jpeg", FileCategory::Image),
        // PNG: starts with 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => ("image/png", FileCategory::Image),
        // TIFF: little-endian (49 49 2A 00) or big-endian (4D 4D 00 2A)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => {
            ("image/tiff", FileCategory::Image)
        }
        _ if is_likely_text(bytes) => ("text/plain", FileCategory::PlainText),
        _ => ("application/octet-stream", FileCategory::Unsupported),
    };

    FormatDetection {
        mime_type: mime_type.to_string(),
        category,
        size_bytes,
    }
}

/// Valid UTF-8 in the first 4KB and at least 80% printable.
fn is_likely_text(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    let sample = &bytes[..bytes.len().min(4096)];
    let text = match std::str::from_utf8(sample) {
        Ok(t) => t,
        // A multi-byte char cut at the sample edge is still text.
        Err(e) if e.valid_up_to() > 0 && e.error_len().is_none() => {
            match std::str::from_utf8(&sample[..e.valid_up_to()]) {
                Ok(t) => t,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    let total = text.chars().count().max(1);
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    printable as f64 / total as f64 > 0.80
}
