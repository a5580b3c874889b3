//! Error types for the project registry, indexing pipeline, and search router.
//!
//! Structured errors using thiserror so callers can pattern-match instead of
//! string-matching, with actionable messages where recovery is possible.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the project registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("project '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("project '{name}' is not registered. Add it with 'trawl add {name} <path>'")]
    ProjectNotFound { name: String },

    #[error("cannot canonicalize project path '{path}': {source}")]
    InvalidPath {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("registry database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to create registry directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors raised while parsing source files.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to initialize {language} parser: {reason}")]
    ParserInit { language: String, reason: String },

    #[error("failed to parse '{path}'")]
    Unparseable { path: PathBuf },
}

/// Errors raised by the semantic indexing pipeline.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("no .java source files found under '{root}'")]
    NoSourceFiles { root: PathBuf },

    #[error("an indexing run for project '{name}' is already in progress")]
    IndexInProgress { name: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Vector(#[from] crate::vector::VectorError),
}

/// Errors raised by the search router and its backends.
///
/// Backend failure detail is captured here as data; no backend-specific error
/// type crosses the router boundary.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("project '{name}' is not registered")]
    ProjectNotFound { name: String },

    #[error(
        "no semantic index for project '{name}'. Run 'trawl index {name}' before searching semantically"
    )]
    CollectionNotFound { name: String },

    #[error(
        "no structural index at '{path}'. Run 'trawl index-scip' for the project before searching structurally"
    )]
    StructuralIndexMissing { path: PathBuf },

    #[error("failed to load structural index '{path}': {reason}")]
    StructuralIndexLoad { path: PathBuf, reason: String },

    #[error("'{tool}' not found on PATH. Install it and retry")]
    BackendUnavailable { tool: String },

    #[error("{tool} failed (exit code {code:?}): {stderr}")]
    BackendProcessFailure {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{backend} search timed out after {seconds}s")]
    Timeout { backend: &'static str, seconds: u64 },

    #[error(transparent)]
    Vector(#[from] crate::vector::VectorError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RegistryError> for SearchError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ProjectNotFound { name } => SearchError::ProjectNotFound { name },
            other => SearchError::Internal(other.to_string()),
        }
    }
}

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type alias for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for indexing operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Result type alias for search operations
pub type QueryResult<T> = Result<T, SearchError>;
