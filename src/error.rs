use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::Method;

#[derive(Debug, Error, Diagnostic)]
pub enum PocketError {
    #[error("no boundary found in response content-type")]
    MissingBoundary,

    #[error("unexpected response format from prediction service: {0}")]
    UnexpectedFormat(String),

    #[error("invalid protein id: {0}")]
    InvalidProteinId(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid pocket selection: {0}")]
    InvalidSelection(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("prediction service request failed: {0}")]
    UpstreamHttp(String),

    #[error("prediction service error: {message} (status {status})")]
    UpstreamStatus { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("CSV export failed: {0}")]
    Export(String),
}

/// Non-fatal: the affected field falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeWarning {
    #[error("{method} row {row}: {reason}")]
    RowParse {
        method: Method,
        row: usize,
        reason: String,
    },

    #[error("residue {token} not found in structure")]
    StructureLookupMiss { token: String },
}
