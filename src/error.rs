//! Error types for the extract-and-load library.

use thiserror::Error;

/// Main error type for extract-and-load operations.
///
/// Platform and connection errors are fatal for a whole run; extract, load
/// and schema-mismatch errors are local to one descriptor and are captured
/// into its transfer outcome instead of aborting the batch.
#[derive(Error, Debug)]
pub enum EtlError {
    /// Configuration error (invalid YAML, missing fields, empty statements).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The platform identifier is outside the known set.
    #[error("Unsupported database platform: {0}")]
    UnsupportedPlatform(String),

    /// Establishing or releasing a database connection failed.
    #[error("Connection to {platform} failed: {message}")]
    Connection { platform: String, message: String },

    /// An extract statement failed against the source.
    #[error("Extract failed: {0}")]
    Extract(String),

    /// A load statement failed against the warehouse.
    #[error("Load failed: {0}")]
    Load(String),

    /// The load statement's placeholder count does not match the extracted
    /// row shape. Detected eagerly, before the first load call.
    #[error("Load statement expects {expected} parameters but extracted rows have {actual} columns")]
    SchemaMismatch { expected: usize, actual: usize },

    /// IO error (file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl EtlError {
    /// Create a Connection error with the platform it occurred on.
    pub fn connection(platform: impl Into<String>, message: impl ToString) -> Self {
        EtlError::Connection {
            platform: platform.into(),
            message: message.to_string(),
        }
    }

    /// Create an Extract error.
    pub fn extract(message: impl ToString) -> Self {
        EtlError::Extract(message.to_string())
    }

    /// Create a Load error.
    pub fn load(message: impl ToString) -> Self {
        EtlError::Load(message.to_string())
    }
}

/// Result type alias for extract-and-load operations.
pub type Result<T> = std::result::Result<T, EtlError>;
