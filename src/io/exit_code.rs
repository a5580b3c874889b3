//! Exit codes for CLI operations following Unix conventions.
//!
//! - `0`: success - operation completed, results found (or no results is acceptable)
//! - `1`: general error - unspecified failure
//! - `2`: blocking error - critical failure that should halt automation
//! - `3-125`: specific recoverable errors
//! - `126-255`: reserved by shell

use crate::error::{IndexError, RegistryError, SearchError};
use crate::vector::VectorError;

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Critical error that should halt automation (code 2)
    BlockingError = 2,

    /// Entity not found but command executed successfully (code 3)
    NotFound = 3,

    /// Failed to parse files (code 4)
    ParseError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// A required external tool is missing (code 7)
    ToolMissing = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    pub fn from_registry_error(error: &RegistryError) -> Self {
        match error {
            RegistryError::ProjectNotFound { .. } => ExitCode::NotFound,
            RegistryError::DuplicateName { .. } => ExitCode::GeneralError,
            RegistryError::InvalidPath { .. } | RegistryError::CreateDir { .. } => ExitCode::IoError,
            RegistryError::Database(_) => ExitCode::BlockingError,
        }
    }

    pub fn from_index_error(error: &IndexError) -> Self {
        match error {
            IndexError::Registry(e) => Self::from_registry_error(e),
            IndexError::NoSourceFiles { .. } => ExitCode::NotFound,
            IndexError::IndexInProgress { .. } => ExitCode::BlockingError,
            IndexError::Parse(_) => ExitCode::ParseError,
            IndexError::Vector(VectorError::UnknownModel { .. }) => ExitCode::ConfigError,
            IndexError::Vector(_) => ExitCode::GeneralError,
        }
    }

    pub fn from_search_error(error: &SearchError) -> Self {
        match error {
            SearchError::ProjectNotFound { .. }
            | SearchError::CollectionNotFound { .. }
            | SearchError::StructuralIndexMissing { .. } => ExitCode::NotFound,
            SearchError::BackendUnavailable { .. } => ExitCode::ToolMissing,
            SearchError::Vector(VectorError::UnknownModel { .. }) => ExitCode::ConfigError,
            _ => ExitCode::GeneralError,
        }
    }
}
