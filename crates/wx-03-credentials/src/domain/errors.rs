//! # Refresh Errors

use thiserror::Error;

/// Platform error codes meaning the presented access token is no longer
/// accepted: invalid credential, invalid token, token expired.
pub const STALE_TOKEN_CODES: [i64; 3] = [40001, 40014, 42001];

/// True if `code` says the access token should be thrown away.
pub fn is_stale_token_code(code: i64) -> bool {
    STALE_TOKEN_CODES.contains(&code)
}

/// Why a credential could not be issued.
///
/// Cloned to every caller waiting on the same refresh.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// Request never got a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("issuer returned HTTP {0}")]
    Status(u16),

    /// Response body is not the expected shape
    #[error("malformed issuer response: {0}")]
    Malformed(String),

    /// Platform answered with a non-zero error code
    #[error("platform error {code}: {message}")]
    Platform { code: i64, message: String },
}
