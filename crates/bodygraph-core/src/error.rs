//! Error types for bodygraph-core

use thiserror::Error;

/// Contract violations raised while building an activation set or looking
/// up the fixed topology. The resolver and projector never produce these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid gate: {0} (expected 1-64)")]
    InvalidGate(i64),

    #[error("invalid line: {0} (expected 1-6)")]
    InvalidLine(i64),

    #[error("unknown {kind} code: {code}")]
    UnknownCode { kind: &'static str, code: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn unknown(kind: &'static str, code: impl ToString) -> Self {
        Self::UnknownCode {
            kind,
            code: code.to_string(),
        }
    }

    /// True for errors that point at malformed activation data rather than
    /// a bad registry lookup.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidGate(_) | Self::InvalidLine(_))
    }
}
