//! Error types for the weather lookup

use thiserror::Error;

/// Message shown to clients for faults that have no classification.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Erro inesperado.";

/// Classified failure of a weather lookup.
///
/// The first three variants carry a message that is safe to show to the
/// caller. `Internal` wraps the underlying fault and is never shown verbatim.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Empty input, or the geocoder has no match for the name
    #[error("City not found: {0}")]
    CityNotFound(String),

    /// An upstream answered 200 with a body that cannot be used
    #[error("Invalid upstream response: {0}")]
    UpstreamInvalidResponse(String),

    /// Transport failure or non-200 status from an upstream
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Anything else that went wrong while orchestrating
    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl LookupError {
    pub fn city_not_found<S: Into<String>>(message: S) -> Self {
        Self::CityNotFound(message.into())
    }

    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::UpstreamInvalidResponse(message.into())
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable(message.into())
    }

    /// Get the message that may be returned to the client
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LookupError::CityNotFound(message)
            | LookupError::UpstreamInvalidResponse(message)
            | LookupError::UpstreamUnavailable(message) => message.clone(),
            LookupError::Internal(_) => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }
}
