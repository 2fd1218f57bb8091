//! Error types for the blog API

use std::io;

use thiserror::Error;

/// Result type alias for the blog API
pub type Result<T> = std::result::Result<T, Error>;

/// Blog API errors
///
/// Client certificate denials are *not* errors; they are reported through
/// [`crate::mtls::VerificationOutcome`].
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (also covers trust anchor and key material loading)
    #[error("Configuration error: {0}")]
    Config(String),

    /// TLS setup error
    #[error("TLS error: {0}")]
    Tls(String),

    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(u64),

    /// Payload failed validation
    #[error("Validation failed: {0:?}")]
    Validation(crate::posts::ValidationErrors),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is a startup-time fault that must stop the process.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Tls(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_and_tls_errors_are_fatal() {
        assert!(Error::Config("bad ca".into()).is_fatal());
        assert!(Error::Tls("no key".into()).is_fatal());
        assert!(!Error::NotFound(7).is_fatal());
    }

    #[test]
    fn display_includes_context() {
        let msg = Error::Config("Cannot read 'ca.pem'".into()).to_string();
        assert_eq!(msg, "Configuration error: Cannot read 'ca.pem'");
        assert_eq!(Error::NotFound(42).to_string(), "Post not found: 42");
    }

    #[test]
    fn io_errors_convert_and_are_not_fatal() {
        let err: Error = io::Error::new(io::ErrorKind::AddrInUse, "port taken").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_fatal());
    }
}
