//! Error types for the ChronoChat core
//!
//! This module contains the error types used throughout the chat client,
//! including name validation errors, session lifecycle errors, and the main
//! ChronoChatError type that unifies them all.

// ----------------------------------------------------------------------------
// Unified Error Type
// ----------------------------------------------------------------------------

/// Core error type for the ChronoChat client
#[derive(Debug, thiserror::Error)]
pub enum ChronoChatError {
    #[error("Invalid name '{uri}': {reason}")]
    InvalidName { uri: String, reason: String },

    #[error("Malformed chat payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("Session is already initialized")]
    AlreadyInitialized,

    #[error("Session is not initialized")]
    NotInitialized,

    #[error("Substrate subscription failed: {reason}")]
    Subscribe { reason: String },

    #[error("Channel error: {reason}")]
    Channel { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChronoChatError {
    /// Convenience constructor for name validation failures
    pub fn invalid_name(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for closed or rejected channels
    pub fn channel(reason: impl Into<String>) -> Self {
        Self::Channel {
            reason: reason.into(),
        }
    }
}

pub type ChronoChatResult<T> = core::result::Result<T, ChronoChatError>;
