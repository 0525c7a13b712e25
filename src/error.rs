//! Error types for snapshot ingestion.

use thiserror::Error;

/// Errors for records that are structurally unusable.
///
/// Malformed dates, times and frequencies are deliberately NOT errors: they
/// degrade to "no match" / "no link" downstream so one bad field never hides
/// the rest of a poster.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IngestError {
    #[error("record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("record is not a JSON object")]
    NotAnObject,
}

/// Result type alias for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;
