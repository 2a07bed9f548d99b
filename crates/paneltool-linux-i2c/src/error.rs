//! Error types for Linux i2c-dev operations

use thiserror::Error;

/// Linux i2c-dev specific errors
#[derive(Debug, Error)]
pub enum LinuxI2cError {
    /// Failed to open the device node
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Device node exists but access was denied
    #[error("Failed to open {path}: permission denied (are you root?)")]
    PermissionDenied { path: String },

    /// Failed to query adapter functionality
    #[error("Cannot query adapter functionality: {0}")]
    FuncsQueryFailed(#[source] std::io::Error),

    /// Adapter does not support plain I2C transactions
    #[error("I2C adapter {path} does not support true I2C (SMBus-only adapter?)")]
    NotI2cCapable { path: String },

    /// Combined I2C_RDWR transaction failed
    #[error("I2C transaction failed: {0}")]
    TransferFailed(#[source] std::io::Error),
}

/// Result type for Linux i2c-dev operations
pub type Result<T> = std::result::Result<T, LinuxI2cError>;
