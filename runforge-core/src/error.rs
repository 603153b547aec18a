//! Error types for the runforge-core crate.

use thiserror::Error;

/// Top-level error type for run assembly.
///
/// Fold-level training and prediction failures inside the benchmark executor
/// are deliberately not represented here: they are captured into the run
/// record's error-message field and the pipeline still returns `Ok`.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported task type: {0}")]
    UnsupportedTask(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl RunError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unsupported_task(msg: impl Into<String>) -> Self {
        Self::UnsupportedTask(msg.into())
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }
}
