//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed (bad block alignment or cipher failure)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Padding bytes are not valid PKCS#7
    #[error("Invalid padding")]
    InvalidPadding,

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Key material is not valid base64
    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(String),
}
