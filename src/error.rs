//! Error types for Pawfect
//!
//! This module defines the error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Pawfect operations
///
/// Covers the user-visible failure classes of the client: authentication,
/// the three conversation operations, the session gate, and the ambient
/// configuration and I/O failures underneath them.
#[derive(Error, Debug)]
pub enum PawfectError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid credentials or a rejected registration
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// No session is stored; the user has to log in first
    #[error("Not signed in. Run `pawfect login` first")]
    NotAuthenticated,

    /// Input rejected locally before any request was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Sending a chat message failed; the optimistic append was rolled back
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Loading a conversation failed; the transcript is untouched
    #[error("Load failed: {0}")]
    LoadFailed(String),

    /// Deleting a conversation failed; the summary list is untouched
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    /// Persisted session state could not be read or written
    #[error("Session storage error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl PawfectError {
    /// Short notice shown to the user for this failure.
    ///
    /// Operation failures use fixed wording; the underlying cause stays in
    /// the log.
    pub fn notice(&self) -> String {
        match self {
            PawfectError::SendFailed(_) => "Something went wrong. Please try again.".to_string(),
            PawfectError::LoadFailed(_) => "Failed to load conversation".to_string(),
            PawfectError::DeleteFailed(_) => "Failed to delete".to_string(),
            PawfectError::Authentication(msg) | PawfectError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for Pawfect operations
///
/// Uses `anyhow::Error` so callers can attach context while the typed
/// `PawfectError` stays reachable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;
