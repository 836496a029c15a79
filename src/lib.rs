//! DeepPlan - a local planning assistant with a self-repairing quality gate.
//!
//! This library provides the core functionality for the `dp` CLI tool:
//! the plan document and its migration, the quality rubric, the replan
//! routine that fills structural gaps, and the file-backed plan store.

pub mod cli;
pub mod commands;
pub mod config;
pub mod journal;
pub mod models;
pub mod quality;
pub mod storage;


/// Library-level error type for DeepPlan operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures of the state directory or its files.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Json(_) | Error::Storage(_))
    }
}

/// Result type alias for DeepPlan operations.
pub type Result<T> = std::result::Result<T, Error>;
