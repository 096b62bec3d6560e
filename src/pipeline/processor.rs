//! Certificate processing orchestrator.
//!
//! Single entry point that drives one certificate through the pipeline:
//! decode → extract → resolve requirements → evaluate → scan exclusions →
//! (optional) re-render for the project → store.
//!
//! Decoder and sink are trait objects so the orchestrator stays testable
//! without PDFium or a filesystem.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    AnalysisStatus, ConflictRecord, ExclusionRecord, FieldMap, PolicyAnalysis, ProjectContext,
    SeverityCounts,
};
use crate::pipeline::compliance::evaluate_compliance;
use crate::pipeline::exclusions::{compare_exclusions, scan_exclusions_with};
use crate::pipeline::extraction::format::FileCategory;
use crate::pipeline::extraction::{
    sanitize_extracted_text, DecodeMethod, DecodedText, DocumentDecoder, ExtractionChain,
    ExtractionError, FieldSchema, PlainTextExtractor,
};
use crate::pipeline::render::{render_certificate, RenderError, RenderMode};
use crate::pipeline::requirements::{resolve_requirements, RequirementCatalog};
use crate::pipeline::sink::{ResultSink, SinkError};
use crate::config::EngineConfig;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Failed to store result: {0}")]
    Sink(#[from] SinkError),
}

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// What the certificate is checked against.
#[derive(Debug, Clone, Default)]
pub struct ProcessingRequest {
    pub program_id: String,
    /// Subcontractor trades; empty selects all trades.
    pub trades: Vec<String>,
    pub project: ProjectContext,
}

/// Summary of one processed certificate.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingOutcome {
    pub document_id: Uuid,
    /// Populated only if some strategy extracted at least one field.
    pub extraction: Option<ExtractionSummary>,
    pub tier: Option<String>,
    pub requirements_applied: usize,
    pub status: AnalysisStatus,
    pub severity_counts: SeverityCounts,
    pub exclusions_found: usize,
    pub conflicts_found: usize,
    pub analysis_location: Option<String>,
    pub render_location: Option<String>,
}

/// Extraction stage summary.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionSummary {
    pub method: String,
    pub strategy: String,
    pub confidence: f32,
    pub needs_review: bool,
    pub fields_found: usize,
    pub page_count: usize,
    pub text_length: usize,
}

/// Full output: the summary plus everything the stages produced.
pub struct ProcessingOutput {
    pub outcome: ProcessingOutcome,
    pub fields: FieldMap,
    pub analysis: PolicyAnalysis,
    pub exclusions: Vec<ExclusionRecord>,
    pub conflicts: Vec<ConflictRecord>,
    /// Certificate re-issued for the request's project, when enabled.
    pub rendered: Option<Vec<u8>>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct CertificateProcessor {
    decoder: Box<dyn DocumentDecoder + Send + Sync>,
    chain: ExtractionChain,
    schema: FieldSchema,
    catalog: RequirementCatalog,
    config: EngineConfig,
    sink: Option<Box<dyn ResultSink + Send + Sync>>,
    render_reuse: bool,
}

impl CertificateProcessor {
    pub fn new(decoder: Box<dyn DocumentDecoder + Send + Sync>, catalog: RequirementCatalog) -> Self {
        Self {
            decoder,
            chain: ExtractionChain::default(),
            schema: FieldSchema::certificate(),
            catalog,
            config: EngineConfig::default(),
            sink: None,
            render_reuse: false,
        }
    }

    /// Engine windows for both the default chain and the exclusion scan.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.chain = ExtractionChain::with_config(config.clone());
        self.config = config;
        self
    }

    pub fn with_chain(mut self, chain: ExtractionChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn ResultSink + Send + Sync>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Also render the extracted certificate re-issued for the request's project.
    pub fn rendering_reuse(mut self, enabled: bool) -> Self {
        self.render_reuse = enabled;
        self
    }

    /// Full pipeline from document bytes.
    pub fn process(
        &self,
        bytes: &[u8],
        request: &ProcessingRequest,
    ) -> Result<ProcessingOutput, ProcessingError> {
        let decoded = self.decoder.decode(bytes)?;
        if decoded.is_blank() {
            tracing::warn!(
                pages = decoded.page_count(),
                "Document decoded without text, evaluating an empty certificate"
            );
        }
        self.process_decoded(&decoded, request)
    }

    /// Same as `process` for text that is already decoded. Empty text is
    /// evaluated as a certificate with no fields.
    pub fn process_text(
        &self,
        text: &str,
        request: &ProcessingRequest,
    ) -> Result<ProcessingOutput, ProcessingError> {
        let text = sanitize_extracted_text(text);
        let decoded = DecodedText {
            method: DecodeMethod::PlainTextRead,
            category: FileCategory::PlainText,
            pages: vec![text.clone()],
            full_text: text,
        };
        self.process_decoded(&decoded, request)
    }

    fn process_decoded(
        &self,
        decoded: &DecodedText,
        request: &ProcessingRequest,
    ) -> Result<ProcessingOutput, ProcessingError> {
        let document_id = Uuid::new_v4();
        let text = decoded.full_text.as_str();

        // Step 1: Extract
        let (fields, extraction) = match self.chain.run(text, &self.schema) {
            Some(outcome) => {
                let summary = ExtractionSummary {
                    method: format!("{:?}", outcome.method),
                    strategy: outcome.strategy.to_string(),
                    confidence: outcome.confidence,
                    needs_review: outcome.needs_review,
                    fields_found: outcome.fields.len(),
                    page_count: decoded.page_count(),
                    text_length: text.len(),
                };
                (outcome.fields, Some(summary))
            }
            None => {
                tracing::warn!(%document_id, "No strategy extracted any field");
                (FieldMap::new(), None)
            }
        };

        // Step 2: Requirements for this subcontractor
        let program = self.catalog.for_program(&request.program_id);
        let resolved = resolve_requirements(&request.trades, &program);
        tracing::info!(
            %document_id,
            program_id = %request.program_id,
            catalog = program.len(),
            applied = resolved.requirements.len(),
            tier = ?resolved.tier,
            "Requirements resolved"
        );

        // Step 3: Compliance and exclusions
        let mut analysis = evaluate_compliance(&fields, &resolved.requirements, &request.project);
        let exclusions = scan_exclusions_with(text, &self.config);
        let conflicts = compare_exclusions(&exclusions, &resolved.requirements, &request.project);
        analysis.add_conflicts(&conflicts);
        tracing::info!(
            %document_id,
            status = analysis.status().as_str(),
            deficiencies = analysis.deficiencies().len(),
            exclusions = exclusions.len(),
            conflicts = conflicts.len(),
            "Certificate evaluated"
        );

        // Step 4: Optional re-issue for the project
        let rendered = if self.render_reuse {
            Some(render_certificate(&fields, &RenderMode::Reuse { project: &request.project })?)
        } else {
            None
        };

        // Step 5: Store
        let (analysis_location, render_location) = match &self.sink {
            Some(sink) => {
                let analysis_location = sink.store_analysis(document_id, &analysis)?;
                let render_location = rendered
                    .as_deref()
                    .map(|bytes| sink.store_rendered(document_id, bytes))
                    .transpose()?;
                (Some(analysis_location), render_location)
            }
            None => (None, None),
        };

        Ok(ProcessingOutput {
            outcome: ProcessingOutcome {
                document_id,
                extraction,
                tier: analysis.tier().map(str::to_string),
                requirements_applied: resolved.requirements.len(),
                status: analysis.status(),
                severity_counts: analysis.severity_counts(),
                exclusions_found: exclusions.len(),
                conflicts_found: conflicts.len(),
                analysis_location,
                render_location,
            },
            fields,
            analysis,
            exclusions,
            conflicts,
            rendered,
        })
    }
}

/// Processor with the text-only decoder and the default chain.
pub fn build_processor(catalog: RequirementCatalog) -> CertificateProcessor {
    CertificateProcessor::new(Box::new(PlainTextExtractor), catalog)
        .with_config(EngineConfig::from_env())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::{InsuranceType, RequirementRecord, Severity};
    use crate::pipeline::render::layout_certificate_at;
    use crate::pipeline::sink::FileSink;

    fn make_fields() -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("named_insured", "ABC Plumbing Corp");
        fields.insert("gl_policy_number", "GL-2024-001234");
        fields.insert("gl_effective_date", NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        fields.insert("gl_expiration_date", NaiveDate::from_ymd_opt(2031, 1, 1).unwrap());
        fields.insert("gl_each_occurrence", 1_000_000.0);
        fields.insert("gl_general_aggregate", 2_000_000.0);
        fields.insert("wc_policy_number", "WC-2024-555");
        fields.insert("wc_expiration_date", NaiveDate::from_ymd_opt(2031, 1, 1).unwrap());
        fields
    }

    /// Certificate text as the form renderer lays it out.
    fn make_certificate_text() -> String {
        let project = ProjectContext::default();
        layout_certificate_at(
            &make_fields(),
            &RenderMode::Reuse { project: &project },
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        )
        .to_text()
    }

    fn make_catalog() -> RequirementCatalog {
        RequirementCatalog::new(vec![
            RequirementRecord::new("p1", InsuranceType::GeneralLiability)
                .with_minimum("gl_each_occurrence", 2_000_000.0),
            RequirementRecord::new("p2", InsuranceType::AutoLiability)
                .with_minimum("auto_combined_single_limit", 1_000_000.0),
        ])
    }

    fn make_request() -> ProcessingRequest {
        ProcessingRequest {
            program_id: "p1".into(),
            trades: vec!["Plumbing".into()],
            project: ProjectContext {
                project_name: Some("Hudson Yards Tower B".into()),
                gc_name: Some("Main Street Contractors".into()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn processes_text_certificate_end_to_end() {
        let processor = build_processor(make_catalog());
        let output = processor.process_text(&make_certificate_text(), &make_request()).unwrap();

        let extraction = output.outcome.extraction.as_ref().unwrap();
        assert_eq!(extraction.strategy, "heuristic");
        assert!(extraction.fields_found > 0);
        assert_eq!(output.fields.text("gl_policy_number"), Some("GL-2024-001234"));

        assert_eq!(output.outcome.requirements_applied, 1);
        assert_ne!(output.outcome.status, AnalysisStatus::Approved);
        let shortfall = output
            .analysis
            .deficiencies()
            .iter()
            .find(|d| d.field == "gl_each_occurrence")
            .unwrap();
        assert_eq!(shortfall.severity, Severity::High);
        assert!(output.rendered.is_none());
        assert!(output.outcome.analysis_location.is_none());
    }

    #[test]
    fn process_bytes_uses_decoder() {
        let processor = build_processor(make_catalog());
        let text = make_certificate_text();
        let output = processor.process(text.as_bytes(), &make_request()).unwrap();
        assert_eq!(output.outcome.extraction.unwrap().page_count, 1);
    }

    #[test]
    fn empty_text_still_evaluates() {
        let processor = build_processor(make_catalog());
        let output = processor.process_text("", &make_request()).unwrap();

        assert!(output.outcome.extraction.is_none());
        assert!(output.fields.is_empty());
        assert!(output.outcome.severity_counts.total() > 0);
    }

    #[test]
    fn exclusion_conflicts_join_the_analysis() {
        let processor = build_processor(make_catalog());
        let mut request = make_request();
        request.project.project_type = Some("Residential High-Rise".into());
        let text = format!("{}\nRESIDENTIAL EXCLUSION APPLIES", make_certificate_text());

        let output = processor.process_text(&text, &request).unwrap();
        assert_eq!(output.outcome.conflicts_found, 1);
        assert_eq!(output.conflicts[0].severity, Severity::Critical);
        assert!(output.outcome.severity_counts.critical >= 1);
        assert_eq!(output.outcome.status, AnalysisStatus::Deficient);
    }

    #[test]
    fn unsupported_bytes_fail_extraction() {
        let processor = build_processor(make_catalog());
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let result = processor.process(&png, &make_request());
        assert!(matches!(result, Err(ProcessingError::Extraction(_))));
    }

    #[test]
    fn renders_and_stores_through_sink() {
        let dir = tempfile::tempdir().unwrap();
        let processor = build_processor(make_catalog())
            .with_sink(Box::new(FileSink::new(dir.path())))
            .rendering_reuse(true);

        let output = processor.process_text(&make_certificate_text(), &make_request()).unwrap();

        let rendered = output.rendered.as_ref().unwrap();
        assert!(rendered.starts_with(b"%PDF"));
        let analysis_path = output.outcome.analysis_location.as_ref().unwrap();
        let render_path = output.outcome.render_location.as_ref().unwrap();
        assert!(std::path::Path::new(analysis_path).exists());
        assert_eq!(&std::fs::read(render_path).unwrap(), rendered);
    }

    #[test]
    fn outcome_serializes_for_callers() {
        let processor = build_processor(make_catalog());
        let output = processor.process_text(&make_certificate_text(), &make_request()).unwrap();
        let json = serde_json::to_value(&output.outcome).unwrap();
        assert_eq!(json["requirements_applied"], 1);
        assert!(json["extraction"]["confidence"].is_number());
    }
}
