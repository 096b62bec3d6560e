pub mod resolver;
pub mod program_parser;

pub use resolver::*;
pub use program_parser::*;

use std::path::Path;

use thiserror::Error;

use crate::models::{InvalidEnum, RequirementRecord};

/// A requirement record that cannot be evaluated. Logged and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequirementError {
    #[error("Unknown insurance type: {0}")]
    UnknownInsuranceType(String),
}

impl From<InvalidEnum> for RequirementError {
    fn from(e: InvalidEnum) -> Self {
        Self::UnknownInsuranceType(e.value)
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed requirement catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// A program's requirement list, loaded once and never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequirementCatalog {
    records: Vec<RequirementRecord>,
}

impl RequirementCatalog {
    pub fn new(records: Vec<RequirementRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of requirement records.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<RequirementRecord> = serde_json::from_str(json)?;
        tracing::info!(records = records.len(), "Requirement catalog loaded");
        Ok(Self { records })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn records(&self) -> &[RequirementRecord] {
        &self.records
    }

    /// Records belonging to one program.
    pub fn for_program(&self, program_id: &str) -> Vec<RequirementRecord> {
        self.records
            .iter()
            .filter(|r| r.program_id == program_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
