//! Paint a `CertificateLayout` with `printpdf`.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Line, Mm, PdfDocument, Point};
use tracing::info;

use super::form::layout_certificate_at;
use super::geometry::pt_to_mm;
use super::layout::{CertificateLayout, Font};
use super::modes::RenderMode;
use super::RenderError;
use crate::models::FieldMap;

/// Render the certificate as PDF bytes, dated today.
pub fn render_certificate(fields: &FieldMap, mode: &RenderMode<'_>) -> Result<Vec<u8>, RenderError> {
    render_certificate_at(fields, mode, chrono::Utc::now().date_naive())
}

pub fn render_certificate_at(
    fields: &FieldMap,
    mode: &RenderMode<'_>,
    today: chrono::NaiveDate,
) -> Result<Vec<u8>, RenderError> {
    let layout = layout_certificate_at(fields, mode, today);
    let bytes = paint(&layout)?;
    info!(mode = mode.name(), bytes = bytes.len(), "Certificate rendered");
    Ok(bytes)
}

fn mm(pt: f32) -> Mm {
    Mm(pt_to_mm(pt))
}

fn point(x: f32, y: f32) -> (Point, bool) {
    (Point::new(mm(x), mm(y)), false)
}

/// Draw every run, box and rule of the layout onto a single page.
pub fn paint(layout: &CertificateLayout) -> Result<Vec<u8>, RenderError> {
    let (doc, page1, layer1) =
        PdfDocument::new(&layout.title, mm(layout.width), mm(layout.height), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Font(e.to_string()))?;

    for run in layout.runs() {
        let font = match run.font {
            Font::Regular => &regular,
            Font::Bold => &bold,
        };
        layer.use_text(run.text.as_str(), run.size, mm(run.x), mm(run.y), font);
    }

    layer.set_outline_thickness(0.5);
    for b in layout.boxes() {
        layer.add_line(Line {
            points: vec![
                point(b.x, b.y),
                point(b.x + b.width, b.y),
                point(b.x + b.width, b.y + b.height),
                point(b.x, b.y + b.height),
            ],
            is_closed: true,
        });
    }
    for r in layout.rules() {
        layer.add_line(Line {
            points: vec![point(r.x1, r.y1), point(r.x2, r.y2)],
            is_closed: false,
        });
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(|e| RenderError::Save(e.to_string()))?;
    buf.into_inner().map_err(|e| RenderError::Buffer(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectContext;

    #[test]
    fn renders_a_pdf_document() {
        let project = ProjectContext::default();
        let bytes = render_certificate_at(
            &FieldMap::new(),
            &RenderMode::Reuse { project: &project },
            chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn sample_mode_renders() {
        let project = ProjectContext {
            project_name: Some("Hudson Yards Tower B".into()),
            ..Default::default()
        };
        let bytes = render_certificate(&FieldMap::new(), &RenderMode::Sample { requirements: &[], project: &project })
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
