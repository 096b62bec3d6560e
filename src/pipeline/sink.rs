//! Where analyses and rendered certificates go once the pipeline is done.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::models::PolicyAnalysis;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence collaborator. Returns a location the caller can hand back
/// to whoever asked for the result.
pub trait ResultSink {
    fn store_analysis(&self, document_id: Uuid, analysis: &PolicyAnalysis) -> Result<String, SinkError>;

    fn store_rendered(&self, document_id: Uuid, pdf_bytes: &[u8]) -> Result<String, SinkError>;
}

/// Writes `analysis-<id>.json` and `coi-<id>-<millis>.pdf` into one directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.coiguard/renders/`.
    pub fn default_location() -> Self {
        Self::new(config::renders_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, filename: &str, bytes: &[u8]) -> Result<String, SinkError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "Result stored");
        Ok(path.display().to_string())
    }
}

impl ResultSink for FileSink {
    fn store_analysis(&self, document_id: Uuid, analysis: &PolicyAnalysis) -> Result<String, SinkError> {
        let json = serde_json::to_vec_pretty(analysis)?;
        self.write(&format!("analysis-{document_id}.json"), &json)
    }

    fn store_rendered(&self, document_id: Uuid, pdf_bytes: &[u8]) -> Result<String, SinkError> {
        let millis = Utc::now().timestamp_millis();
        self.write(&format!("coi-{document_id}-{millis}.pdf"), pdf_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_analysis_json() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("out"));
        let id = Uuid::new_v4();
        let analysis = PolicyAnalysis::new(Utc::now(), Some("a".into()));

        let location = sink.store_analysis(id, &analysis).unwrap();
        assert!(location.ends_with(&format!("analysis-{id}.json")));

        let stored: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&location).unwrap()).unwrap();
        assert_eq!(stored["status"], "approved");
        assert_eq!(stored["tier"], "a");
    }

    #[test]
    fn rendered_file_named_after_document() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        let id = Uuid::new_v4();

        let location = sink.store_rendered(id, b"%PDF-1.3 test").unwrap();
        let name = Path::new(&location).file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(&format!("coi-{id}-")));
        assert!(name.ends_with(".pdf"));
        assert_eq!(std::fs::read(&location).unwrap(), b"%PDF-1.3 test");
    }

    #[test]
    fn default_location_is_renders_dir() {
        assert_eq!(FileSink::default_location().dir(), config::renders_dir().as_path());
    }
}
