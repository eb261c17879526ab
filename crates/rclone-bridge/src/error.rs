//! Error types for the rclone orchestration library.

use thiserror::Error;

/// Main error type for transfer orchestration.
///
/// Every variant is raised synchronously before a subprocess is spawned;
/// subprocess failures (non-zero exit, timeout) are reported through
/// [`ProcessResult`](crate::process::ProcessResult) instead.
#[derive(Error, Debug)]
pub enum RcloneError {
    /// Source or target disk was not set before a terminal operation.
    #[error("{side} disk is required")]
    MissingDisk { side: &'static str },

    /// A disk configuration names a different driver than the provider
    /// asked to handle it.
    #[error("Driver mismatch: expected '{expected}', got '{actual}'")]
    DriverMismatch { expected: String, actual: String },

    /// A provider-specific required field is absent or empty.
    #[error("Missing required field '{field}' for {driver} provider")]
    MissingField { driver: String, field: String },

    /// A configuration field is present but its value has the wrong shape.
    #[error("Invalid value for field '{field}': got '{value}', expected {expected}")]
    InvalidFieldValue {
        field: String,
        value: String,
        expected: String,
    },

    /// A transfer option is outside its allowed bounds or not an integer.
    #[error("Invalid value for option '{option}': got {value}, expected {expected}")]
    InvalidOptionValue {
        option: String,
        value: String,
        expected: String,
    },

    /// No provider is registered for the requested driver.
    #[error("No provider registered for driver: {0}")]
    ProviderNotFound(String),

    /// The rclone binary could not be located.
    #[error("rclone binary not found. Install rclone or set binary_path in the configuration.")]
    BinaryNotFound,

    /// Credential obscuring failed; never ignored since the external tool
    /// would silently authenticate with a garbage password otherwise.
    #[error("Failed to encode credential: {0}")]
    CredentialEncoding(String),

    /// Configuration error (invalid YAML shape, bad defaults, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (binary probing, subprocess spawn)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RcloneError {
    /// Create a DriverMismatch error.
    pub fn driver_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        RcloneError::DriverMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a MissingField error.
    pub fn missing_field(driver: impl Into<String>, field: impl Into<String>) -> Self {
        RcloneError::MissingField {
            driver: driver.into(),
            field: field.into(),
        }
    }

    /// Create an InvalidFieldValue error.
    pub fn invalid_field(
        field: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        RcloneError::InvalidFieldValue {
            field: field.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Create an InvalidOptionValue error.
    pub fn invalid_option(
        option: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        RcloneError::InvalidOptionValue {
            option: option.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Format the error with its full source chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            RcloneError::MissingDisk { .. }
            | RcloneError::DriverMismatch { .. }
            | RcloneError::MissingField { .. }
            | RcloneError::InvalidFieldValue { .. }
            | RcloneError::InvalidOptionValue { .. }
            | RcloneError::ProviderNotFound(_)
            | RcloneError::Config(_)
            | RcloneError::Yaml(_) => 2,
            RcloneError::BinaryNotFound => 127,
            _ => 1,
        }
    }
}

/// Result type alias for orchestration operations.
pub type Result<T> = std::result::Result<T, RcloneError>;
