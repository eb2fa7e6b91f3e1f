//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration rejected after command-line overrides
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// State source could not be opened
    #[error("Failed to open state source '{source_id}': {message}")]
    SourceSetup { source_id: String, message: String },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn source_setup(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceSetup {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}

/// Fail with [`CliError::ConfigNotFound`] unless `path` exists
pub fn ensure_config_exists(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::config_not_found(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_reported_with_path() {
        let err = ensure_config_exists(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration file not found: /definitely/not/here.toml"
        );
    }
}
