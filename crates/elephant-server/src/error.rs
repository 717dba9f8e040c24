//! Server error types.

use std::fmt;

use crate::config::ConfigError;

/// Errors that can occur while running the server.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error
    Config(ConfigError),

    /// Signal handling or other OS error
    Io(std::io::Error),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {}", err),
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Internal(_) => None,
        }
    }
}

impl From<ConfigError> for ServerError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn config_error_is_source() {
        let err = ServerError::from(ConfigError::Zero { field: "max_data_points" });

        assert_eq!(
            err.to_string(),
            "configuration error: max_data_points must be greater than zero"
        );
        assert!(err.source().is_some());
    }
}
