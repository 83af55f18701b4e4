//! Error types for the smsgen generation pipeline.
//!
//! - [`SourceError`] - reading an input file (contacts, templates, DNC)
//! - [`GenerateError`] - fatal problems that abort a generation run
//! - [`OutputError`] - writing or splitting the generated message file
//! - [`RunError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading an input file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid CSV content.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl SourceError {
    /// Classify an IO error for `path`, keeping "not found" distinct.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound(path)
        } else {
            SourceError::Io { path, source }
        }
    }
}

// =============================================================================
// Generation Errors
// =============================================================================

/// A column role the contacts table must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Phone,
    Name,
    Address,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredField::Phone => write!(f, "phone fields (phone_1, phone_2, phone_3)"),
            RequiredField::Name => write!(f, "'first_name'"),
            RequiredField::Address => write!(f, "'associated_property_address_line_1'"),
        }
    }
}

/// Fatal errors for a generation run. Nothing is written when one occurs.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The template source produced no templates.
    #[error("No templates loaded: the template file is empty")]
    MissingTemplates,

    /// A required column is absent from the contacts header row.
    #[error("Required field {which} not found in contacts CSV")]
    MissingRequiredField { which: RequiredField },

    /// Contacts or templates file does not exist.
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Contacts or templates file could not be read.
    #[error("Source error: {0}")]
    Source(SourceError),
}

impl From<SourceError> for GenerateError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound(path) => GenerateError::SourceNotFound(path),
            other => GenerateError::Source(other),
        }
    }
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while writing or splitting output files.
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error.
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("Output CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Messages-per-file value was not a positive integer.
    #[error("Invalid messages per file: '{0}' (expected a positive integer)")]
    InvalidSplitCount(String),
}

// =============================================================================
// Run Errors (top-level)
// =============================================================================

/// Top-level run errors returned by [`crate::pipeline::run`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl RunError {
    /// True when the run failed because of the caller's inputs
    /// rather than the local filesystem.
    pub fn is_input_problem(&self) -> bool {
        matches!(
            self,
            RunError::Generate(
                GenerateError::MissingTemplates
                    | GenerateError::MissingRequiredField { .. }
                    | GenerateError::SourceNotFound(_)
                    | GenerateError::Source(SourceError::Csv(_))
            )
        )
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Generation run failed.
    #[error("{0}")]
    Run(#[from] RunError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type SourceResult<T> = Result<T, SourceError>;

pub type GenerateResult<T> = Result<T, GenerateError>;

pub type OutputResult<T> = Result<T, OutputError>;

pub type RunResult<T> = Result<T, RunError>;

pub type ServerResult<T> = Result<T, ServerError>;
