//! ACORD 25 certificate rendering.
//!
//! `layout_certificate` is pure and produces positioned text, boxes and
//! rules; `render_certificate` paints that layout to PDF bytes.

pub mod geometry;
pub mod layout;
pub mod modes;
pub mod form;
pub mod pdf;

pub use layout::{CertificateLayout, Cursor, Font, TextRun};
pub use modes::{prepare_fields, RenderMode};
pub use form::{layout_certificate, layout_certificate_at};
pub use pdf::{render_certificate, render_certificate_at};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF save error: {0}")]
    Save(String),

    #[error("PDF buffer error: {0}")]
    Buffer(String),
}
