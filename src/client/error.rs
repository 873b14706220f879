//! Error types for the GitHub client

use compact_str::CompactString;
use thiserror::Error;

use crate::dispatcher::DispatchError;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Everything that can end a poll cycle early.
///
/// A non-200 API response is not in here: it is a normal
/// [`CycleOutcome`](super::processor::CycleOutcome).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode {
        endpoint: CompactString,
        message: CompactString,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Consumer(#[from] DispatchError),

    #[error("A poll cycle is already in flight")]
    CycleInFlight,

    #[error("Invalid {field}: {message}")]
    ConfigValidation { field: CompactString, message: CompactString },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: CompactString },
}

impl ClientError {
    pub fn decode(
        endpoint: impl Into<CompactString>,
        message: impl Into<CompactString>,
        source: serde_json::Error,
    ) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
            source,
        }
    }

    pub fn config_validation(
        field: impl Into<CompactString>,
        message: impl Into<CompactString>,
    ) -> Self {
        Self::ConfigValidation { field: field.into(), message: message.into() }
    }

    pub fn invalid_url(url: impl Into<CompactString>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Transport faults, as opposed to problems with what came back
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Http(_) | ClientError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_http_and_timeout_are_transport_faults() {
        assert!(ClientError::Timeout.is_transport());
        assert!(!ClientError::CycleInFlight.is_transport());
        assert!(!ClientError::invalid_url("nope").is_transport());
        assert!(!ClientError::config_validation("username", "must not be empty").is_transport());
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = ClientError::config_validation("polling.interval", "must be greater than zero");
        assert_eq!(err.to_string(), "Invalid polling.interval: must be greater than zero");
    }
}
