//! Error types for paneltool-core
//!
//! One taxonomy for the whole run: every stage fails the enclosing
//! operation immediately, nothing is retried or resumed.

use crate::config::TconKind;
use thiserror::Error;

/// Why a panel identity was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    /// The EDID header magic did not match.
    CorruptedDescriptor,
    /// The EDID vendor signature is not a supported vendor.
    UnsupportedVendor,
    /// No display-name descriptor was found in the EDID.
    MissingPanelName,
}

impl core::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CorruptedDescriptor => write!(f, "corrupted EDID data"),
            Self::UnsupportedVendor => write!(f, "panel vendor is not Sharp"),
            Self::MissingPanelName => write!(f, "panel metadata missing"),
        }
    }
}

/// Core error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The bus device cannot be opened or lacks a required capability.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// A submitted bus transaction failed.
    #[error("cannot perform I2C device {addr:02x} read of {offset:04x}:{len:04x}")]
    TransactionFailed {
        /// 7-bit bus address of the target.
        addr: u8,
        /// Device offset the transaction addressed.
        offset: u16,
        /// Total number of bytes requested.
        len: usize,
    },

    /// The panel's EDID was missing, corrupt, or names an unsupported
    /// panel.
    #[error("{0}")]
    IdentityRejected(IdentityError),

    /// No configuration file exists for the identified panel.
    #[error("cannot open configuration {path}: {source}")]
    ConfigNotFound {
        /// Path that was tried.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file failed to parse.
    #[error("cannot parse config at \"{context}\"...")]
    ConfigMalformed {
        /// Up to 63 bytes of input surrounding the failure, for the
        /// operator; carries no semantic value.
        context: String,
    },

    /// A section name, key, or value exceeded the fixed field bound.
    #[error("configuration {field} longer than {limit} characters")]
    FieldTooLong {
        /// Which lexical field overflowed.
        field: &'static str,
        /// Usable capacity of that field.
        limit: usize,
    },

    /// The configuration selects an access flow with no implemented
    /// transfer algorithm.
    #[error("unsupported TCON access flow {0}")]
    UnsupportedAccessFlow(TconKind),

    /// The access flow is implemented, but only for a known-good image
    /// size; the configured size has no verified transaction shape.
    #[error("no verified {kind} read transaction for a {size}-byte image")]
    UnverifiedImageSize {
        /// The implemented access flow that was requested.
        kind: TconKind,
        /// The configured image size.
        size: usize,
    },

    /// The destination file cannot be opened or fully written.
    #[error("cannot write {path}: {source}")]
    PersistenceFailed {
        /// Destination path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using the core error.
pub type Result<T> = std::result::Result<T, Error>;
