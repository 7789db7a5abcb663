//! Error types for the keyward protocol library.
//!
//! Grammar failures carry enough context for the caller to render the
//! matching usage line back to the user.

use crate::command::CommandName;
use thiserror::Error;

/// Convenience type alias for Results using [`ParseError`].
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Errors produced while parsing command arguments or gateway payloads.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A required positional argument is absent.
    #[error("missing argument for {command}")]
    MissingArgument {
        /// The command whose arguments were incomplete.
        command: CommandName,
    },

    /// A timeout length did not match `<n>m`, `<n>minute` or `<n>minutes`.
    #[error("invalid timeout duration: {0}")]
    InvalidTimeout(String),

    /// A numeric argument could not be parsed.
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    /// A gateway payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ParseError {
    /// Static error code for log labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingArgument { .. } => "missing_argument",
            Self::InvalidTimeout(_) => "invalid_timeout",
            Self::InvalidNumber(_) => "invalid_number",
            Self::Decode(_) => "decode",
        }
    }
}
