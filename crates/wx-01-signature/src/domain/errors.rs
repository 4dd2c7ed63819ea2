//! # Signature Errors

use shared_types::ConfigurationError;
use thiserror::Error;

/// Reasons a webhook call is not accepted.
///
/// Messages deliberately carry no detail about which part failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// A required query parameter is missing
    #[error("missing query parameter: {0}")]
    MissingParameter(&'static str),

    /// The signature does not match
    #[error("signature verification failed")]
    Mismatch,

    /// Request encryption mode disagrees with configuration
    #[error(transparent)]
    ModeMismatch(#[from] ConfigurationError),
}

impl SignatureError {
    /// True for deployment misconfiguration rather than a foreign request
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ModeMismatch(_))
    }
}
