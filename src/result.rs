use std::path::PathBuf;

use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, PulseError>;

/// Failures while starting up, before or around the poll loop
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("No configuration file at {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Could not read configuration from {path}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },

    #[error("Could not write configuration to {path}")]
    ConfigSave {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },

    #[error("Failed to initialize logging")]
    Logging(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl PulseError {
    pub fn config_load(path: impl Into<PathBuf>, source: confy::ConfyError) -> Self {
        Self::ConfigLoad { path: path.into(), source }
    }

    pub fn config_save(path: impl Into<PathBuf>, source: confy::ConfyError) -> Self {
        Self::ConfigSave { path: path.into(), source }
    }

    /// Rejected settings, as opposed to a file that could not be read or written
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, PulseError::Client(ClientError::ConfigValidation { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_validation_error_keeps_its_message() {
        let err = PulseError::from(ClientError::config_validation("username", "must not be empty"));

        assert!(err.is_invalid_config());
        assert_eq!(err.to_string(), "Invalid username: must not be empty");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = PulseError::ConfigFileNotFound { path: PathBuf::from("/tmp/repo-pulse.toml") };

        assert!(!err.is_invalid_config());
        assert_eq!(err.to_string(), "No configuration file at /tmp/repo-pulse.toml");
    }
}
