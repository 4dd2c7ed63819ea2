//! Gateway error types.

use axum::http::StatusCode;
use wx_02_envelope::EnvelopeError;

/// Gateway-level errors (startup and serving)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server stopped with an error
    #[error("server error: {0}")]
    Server(String),
}

impl From<crate::domain::config::ConfigError> for GatewayError {
    fn from(e: crate::domain::config::ConfigError) -> Self {
        GatewayError::Config(e.to_string())
    }
}

impl From<EnvelopeError> for GatewayError {
    fn from(e: EnvelopeError) -> Self {
        GatewayError::Config(e.to_string())
    }
}

/// Failure while processing one authenticated POST.
///
/// Local to the request; mapped to a non-200 response.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Body larger than the configured limit
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Body not received within the read budget
    #[error("timed out reading request body")]
    BodyTimeout,

    /// Body stream failed before it was complete
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// Envelope could not be opened
    #[error(transparent)]
    Decode(EnvelopeError),

    /// Application handler failed
    #[error("handler failed: {0}")]
    Handler(#[source] anyhow::Error),

    /// Application handler exceeded its budget
    #[error("handler timed out")]
    HandlerTimeout,

    /// Reply could not be rendered or sealed
    #[error("reply encoding failed: {0}")]
    Encode(EnvelopeError),
}

impl ProcessError {
    /// HTTP status sent for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProcessError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProcessError::BodyTimeout => StatusCode::REQUEST_TIMEOUT,
            ProcessError::BodyRead(_) => StatusCode::BAD_REQUEST,
            ProcessError::Decode(EnvelopeError::Integrity) => StatusCode::UNAUTHORIZED,
            ProcessError::Decode(EnvelopeError::Configuration(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProcessError::Decode(_) => StatusCode::BAD_REQUEST,
            ProcessError::Handler(_) | ProcessError::HandlerTimeout | ProcessError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
