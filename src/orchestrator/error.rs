use crate::analyzer::AnalysisError;
use crate::api::FetchError;
use crate::cache::{ArtifactError, CacheError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSide {
    Policy,
    Target,
}

impl fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSide::Policy => f.write_str("policy"),
            DocumentSide::Target => f.write_str("webpage"),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid {side} URL: {source}")]
    FetchFailure { side: DocumentSide, source: FetchError },
    #[error("{0}")]
    AnalysisFailure(#[from] AnalysisError),
    #[error("{0}")]
    PersistenceFailure(#[from] PersistenceError),
}

#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to save findings: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("Failed to register findings: {0}")]
    Registration(#[from] CacheError),
}

impl PipelineError {
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::InvalidInput(_) | PipelineError::FetchFailure { .. } => 400,
            PipelineError::AnalysisFailure(_) | PipelineError::PersistenceFailure(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "INVALID_INPUT",
            PipelineError::FetchFailure { .. } => "FETCH_FAILURE",
            PipelineError::AnalysisFailure(_) => "ANALYSIS_FAILURE",
            PipelineError::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
        }
    }
}
