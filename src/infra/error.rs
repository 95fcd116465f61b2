//! Error types for CMS encryption operations.
//!
//! Every stage of the run maps its failure onto one variant; messages carry
//! the stage that failed and, for native failures, the OpenSSL error text.

use thiserror::Error;

/// Result type for CMS encryption operations
pub type CmsResult<T> = Result<T, CmsError>;

/// Comprehensive error types for CMS encryption operations
#[derive(Error, Debug, miette::Diagnostic)]
pub enum CmsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid PEM format: {0}")]
    FormatError(String),

    #[error("Certificate parsing error: {0}")]
    ParseError(String),

    #[error("CMS initialization failed: {0}")]
    CryptoInitError(String),

    #[error("Certificate load error: {0}")]
    CertificateLoadError(String),

    #[error("Recipient error: {0}")]
    RecipientError(String),

    #[error("CMS finalization failed: {0}")]
    FinalizationError(String),

    #[error("CMS encoding failed: {0}")]
    EncodingError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<std::io::Error> for CmsError {
    fn from(error: std::io::Error) -> Self {
        CmsError::IoError(error.to_string())
    }
}

impl From<der::Error> for CmsError {
    fn from(error: der::Error) -> Self {
        CmsError::ParseError(error.to_string())
    }
}
