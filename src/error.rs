//! Error types for the WorkClock kiosk.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the kiosk can observe: configuration problems, backend
//! rejections, transport failures and local validation.

use thiserror::Error;

/// Banner text used when the backend could not be reached at all.
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error";

/// The main error type for the kiosk.
///
/// # Example
///
/// ```
/// use workclock_kiosk::error::KioskError;
///
/// let error = KioskError::Backend {
///     status: 400,
///     message: "Invalid PIN for approval.".to_string(),
/// };
/// assert_eq!(error.user_message(), "Invalid PIN for approval.");
/// ```
#[derive(Debug, Error)]
pub enum KioskError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value was out of range or otherwise unusable.
    #[error("Invalid configuration field '{field}': {message}")]
    InvalidConfig {
        /// The offending field, dotted from the file root.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The request never produced an HTTP response.
    #[error("Transport error: {message}")]
    Transport {
        /// The underlying client error.
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("Backend rejected request with status {status}: {message}")]
    Backend {
        /// The HTTP status code.
        status: u16,
        /// The server-supplied `error` text, or an operation fallback.
        message: String,
    },

    /// The backend answered with a success status but an unusable body.
    #[error("Unexpected response from server: {message}")]
    UnexpectedResponse {
        /// What was wrong with the body.
        message: String,
    },

    /// Input was rejected locally before any network call.
    #[error("Validation error: {message}")]
    Validation {
        /// The message shown to the user.
        message: String,
    },

    /// The kiosk runtime task has stopped and no longer accepts events.
    #[error("Kiosk runtime is not running")]
    RuntimeClosed,
}

impl KioskError {
    /// Returns the text to show on the kiosk banner for this error.
    pub fn user_message(&self) -> String {
        match self {
            KioskError::Backend { message, .. } | KioskError::Validation { message } => {
                message.clone()
            }
            KioskError::Transport { .. } => CONNECTION_ERROR_MESSAGE.to_string(),
            KioskError::UnexpectedResponse { .. } => "Unexpected response from server".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for KioskError {
    fn from(error: reqwest::Error) -> Self {
        KioskError::Transport {
            message: error.to_string(),
        }
    }
}

/// A type alias for Results that return KioskError.
pub type KioskResult<T> = Result<T, KioskError>;
