//! Configuration errors.

use thiserror::Error;

/// Deployment misconfiguration.
///
/// Never retried. Raised at construction time, or per request when the
/// platform's encryption mode disagrees with the configured one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A required field is empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Safe mode is enabled but no EncodingAESKey was supplied
    #[error("safe mode requires an EncodingAESKey")]
    MissingEncodingKey,

    /// EncodingAESKey has the wrong shape
    #[error("invalid EncodingAESKey: {0}")]
    InvalidEncodingKey(String),

    /// Request carries no encryption parameters but safe mode is configured
    #[error("request is in plaintext mode but safe mode is configured; set safe_mode = false")]
    PlaintextRequestInSafeMode,

    /// Request carries encryption parameters but safe mode is off
    #[error("request is in safe mode but plaintext mode is configured; set safe_mode = true")]
    SafeRequestInPlaintextMode,
}
