use thiserror::Error;

/// Errors surfaced by the rollmill pipeline.
///
/// The core transforms recover locally (a bad document or field is
/// dropped and the batch continues), so these appear at the
/// acquisition and rendering edges, or when a filter expression fails
/// to compile.
#[derive(Debug, Error)]
pub enum RollError {
    /// A document that could not be parsed as JSON. The batch
    /// continues without it.
    #[error("malformed JSON document: {0}")]
    Parse(#[from] serde_json::Error),

    /// An operation needed a container and found something else.
    #[error("{operation} expects {expected}, found {found}")]
    StructuralType {
        operation: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// A filter expression that could not be compiled.
    #[error("bad filter clause `{clause}`: {reason}")]
    FilterSyntax { clause: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RollError>;
