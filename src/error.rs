//! Error types and handling for the community locator

use thiserror::Error;

/// Main error type for the community locator
#[derive(Error, Debug)]
pub enum LocatorError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Community data backend errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Malformed community data
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl LocatorError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Whether the failure came from the community data backend
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Parse { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LocatorError::Config { .. } => {
                "Configuration error. Please check your config file and data source settings."
                    .to_string()
            }
            LocatorError::Api { .. } => {
                "Unable to load communities. Please check your connection to the data backend."
                    .to_string()
            }
            LocatorError::Parse { .. } => {
                "Community data could not be read. The data source returned an unexpected format."
                    .to_string()
            }
            LocatorError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for LocatorError {
    fn from(err: serde_json::Error) -> Self {
        LocatorError::parse(err.to_string())
    }
}
