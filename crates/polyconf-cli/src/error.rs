//! Error types for polyconf-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from polyconf-core
    #[error(transparent)]
    Core(#[from] polyconf_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Failed to render output
    #[error("Failed to render output: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_displays_message() {
        let err = CliError::user("Invalid override 'x'");
        assert_eq!(err.to_string(), "Invalid override 'x'");
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err = CliError::from(polyconf_core::Error::UnknownPlugin {
            name: "nope".to_string(),
        });
        assert!(err.to_string().contains("nope"));
    }
}
