//! Error types for Kiln

use thiserror::Error;

/// The main error type for Kiln operations
#[derive(Debug, Error)]
pub enum KilnError {
    #[error("Application is not initialized")]
    NotInitialized,

    #[error("Application is already initialized")]
    AlreadyInitialized,

    #[error("Application has not been started")]
    NotStarted,

    #[error("Application is already started")]
    AlreadyStarted,

    #[error("Application has been destroyed")]
    Destroyed,

    #[error("No placeholder declared for dependency slot: {0}")]
    MissingPlaceholder(String),

    #[error("Duplicate dependency slot: {0}")]
    DuplicateSlot(String),

    #[error("Unknown placeholder kind: {0}")]
    UnknownPlaceholder(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Asset load failed: {0}")]
    AssetLoadFailed(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("System error in {system}: {message}")]
    SystemError { system: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

impl KilnError {
    /// True for errors caused by calling lifecycle operations out of order
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(
            self,
            KilnError::NotInitialized
                | KilnError::AlreadyInitialized
                | KilnError::NotStarted
                | KilnError::AlreadyStarted
                | KilnError::Destroyed
        )
    }
}

/// Result type alias for Kiln operations
pub type Result<T> = std::result::Result<T, KilnError>;

impl From<toml::de::Error> for KilnError {
    fn from(err: toml::de::Error) -> Self {
        KilnError::TomlParseError(err.to_string())
    }
}
