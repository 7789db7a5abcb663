//! Unified error handling for keyward.
//!
//! This module provides the error hierarchy for the bot, with automatic
//! conversions, user-facing reply text, and log labeling.

use keyward_proto::{CommandName, ParseError};
use thiserror::Error;

// ============================================================================
// Store Errors (durable key list)
// ============================================================================

/// Errors reading or writing the durable key store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Ledger Errors (key lifecycle)
// ============================================================================

/// Errors returned by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The key already has an entry (expired or not).
    #[error("key already redeemed: {0}")]
    AlreadyRedeemed(String),

    /// The duration expression is not `L`, `<n>hr` or `<n>day`.
    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),

    /// The store could not be written; the in-memory ledger is unchanged.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl LedgerError {
    /// Static error code for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyRedeemed(_) => "already_redeemed",
            Self::InvalidDuration(_) => "invalid_duration",
            Self::Persistence(_) => "persistence_failure",
        }
    }
}

// ============================================================================
// Platform Errors (external chat platform)
// ============================================================================

/// Errors talking to the chat platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("platform returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PlatformError {
    /// Static error code for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Api { .. } => "api",
            Self::NotFound(_) => "not_found",
            Self::Decode(_) => "decode",
        }
    }
}

// ============================================================================
// Gateway Errors (event stream)
// ============================================================================

/// Errors that end a gateway session.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("malformed frame: {0}")]
    Frame(#[from] ParseError),

    #[error("expected {expected}, got {got}")]
    Handshake { expected: &'static str, got: String },

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

impl GatewayError {
    /// Static error code for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::WebSocket(_) => "websocket",
            Self::Frame(_) => "frame",
            Self::Handshake { .. } => "handshake",
            Self::Timeout(_) => "timeout",
        }
    }
}

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("permission denied for {0}")]
    PermissionDenied(CommandName),

    #[error("bad arguments: {0}")]
    Parse(#[from] ParseError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => "permission_denied",
            Self::Parse(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Platform(e) => e.error_code(),
            Self::Internal(_) => "internal_error",
        }
    }

    /// Convert to a user-visible reply.
    ///
    /// Returns `None` for errors that don't warrant a reply (the reply path
    /// itself failed, or the failure is internal).
    pub fn to_reply(&self) -> Option<String> {
        let text = match self {
            Self::PermissionDenied(name) => permission_denied_text(*name).to_string(),
            Self::Parse(ParseError::MissingArgument { command }) => {
                format!("❌ {}", command.usage())
            }
            Self::Parse(ParseError::InvalidTimeout(_)) => {
                "❌ Invalid format. Use 10m for 10 minutes.".to_string()
            }
            Self::Parse(ParseError::InvalidNumber(_)) => {
                "❌ Specify a number between **1 and 100**.".to_string()
            }
            Self::Ledger(LedgerError::Persistence(_)) => {
                "❌ Failed to save the key list. Please try again later.".to_string()
            }
            Self::Ledger(LedgerError::AlreadyRedeemed(_)) => {
                "❌ This key has already been redeemed.".to_string()
            }
            Self::Ledger(LedgerError::InvalidDuration(_)) => {
                "❌ Invalid time format. Use something like `24hr`, `7day`, or `L` for Lifetime."
                    .to_string()
            }

            // These errors don't get user-visible replies
            Self::Parse(_) => return None,
            Self::Platform(_) => return None,
            Self::Internal(_) => return None,
        };
        Some(text)
    }
}

/// Reply for a caller lacking the permission `name` requires.
fn permission_denied_text(name: CommandName) -> &'static str {
    match name {
        CommandName::Nuke => "❌ You do not have permission to nuke channels.",
        CommandName::Purge => "❌ You need **Manage Messages** permission.",
        CommandName::Timeout | CommandName::Untimeout => "❌ You need Timeout permissions.",
        CommandName::Kick => "❌ You need **Kick Members** permission.",
        CommandName::Ban | CommandName::Unban => "❌ You need **Ban Members** permission.",
        CommandName::Download => "❌ You need the **Buyer** role to access the download link.",
        _ => "❌ You need Administrator permissions.",
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
