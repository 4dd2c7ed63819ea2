//! # Envelope Errors

use shared_crypto::CryptoError;
use shared_types::ConfigurationError;
use thiserror::Error;

/// Errors raised while opening or sealing an envelope.
///
/// All of them are local to one request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Envelope signature or receiver id did not match
    ///
    /// Carries no detail on purpose.
    #[error("envelope integrity check failed")]
    Integrity,

    /// Payload could not be decoded or decrypted
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Body is not well-formed XML, or a required field is missing
    #[error("parse error: {0}")]
    Parse(String),

    /// Reply could not be encrypted
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Reply content cannot be rendered
    #[error("invalid reply: {0}")]
    InvalidReply(String),

    /// Codec constructed with an unusable configuration
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl From<CryptoError> for EnvelopeError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::EncryptionFailed(msg) => EnvelopeError::Encryption(msg),
            other => EnvelopeError::Decryption(other.to_string()),
        }
    }
}
