//! Management call errors.

use thiserror::Error;
use wx_03_credentials::RefreshError;

/// Failure of an outbound management call.
#[derive(Debug, Error)]
pub enum ManagementError {
    /// No access token could be obtained
    #[error("credential refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// Platform answered with a non-zero error code
    #[error("platform error {code}: {message}")]
    Upstream { code: i64, message: String },

    /// Request failed before a usable response arrived
    #[error("transport error: {0}")]
    Transport(String),

    /// Media type outside image/voice/video/thumb
    #[error("unsupported media type '{0}', expected one of image, voice, video, thumb")]
    UnsupportedMediaType(String),

    /// Local file could not be read
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body is not the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ManagementError {
    /// Platform error code, if the platform rejected the call.
    pub fn upstream_code(&self) -> Option<i64> {
        match self {
            ManagementError::Upstream { code, .. } => Some(*code),
            _ => None,
        }
    }
}
