//! Unified error types for odpack.
//!
//! This module provides a single error type covering package assembly,
//! password hashing, key derivation and entry encryption.
use thiserror::Error;

/// Main error type for odpack operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error while writing to the underlying sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested password digest is not available
    #[error("Unsupported digest: {0}")]
    UnsupportedDigest(String),

    /// The cipher transform could not be set up for the given key/IV
    #[error("Cipher initialization failed: {0}")]
    CipherInitializationFailed(String),

    /// The password was empty
    #[error("Password must not be empty")]
    EmptyPassword,

    /// Encryption parameters rejected at open time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The secure random source failed
    #[error("Random source error: {0}")]
    RandomSource(String),

    /// Invalid package layout (reserved or duplicate entry, bad manifest)
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// XML error
    #[error("XML error: {0}")]
    XmlError(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// The writer was already closed
    #[error("Writer is closed")]
    WriterClosed,

    /// A previous entry failed mid-write; the archive cannot be completed
    #[error("Archive aborted after a failed entry write")]
    ArchiveAborted,
}

/// Result type for odpack operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error comes from the runtime environment rather than
    /// from the data or the caller (digest or cipher unavailable).
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedDigest(_) | Error::CipherInitializationFailed(_)
        )
    }
}
