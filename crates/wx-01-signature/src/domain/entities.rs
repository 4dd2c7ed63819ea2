//! # Webhook Entities

use serde::Deserialize;

/// Query parameters the platform attaches to every webhook call.
///
/// All fields are optional on the wire; empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookQuery {
    /// Request signature over token, timestamp and nonce
    pub signature: Option<String>,
    /// Unix timestamp chosen by the platform
    pub timestamp: Option<String>,
    /// Random nonce chosen by the platform
    pub nonce: Option<String>,
    /// Echo string (verification handshake only)
    pub echostr: Option<String>,
    /// `aes` when the body is encrypted
    pub encrypt_type: Option<String>,
    /// Envelope signature (safe mode only)
    pub msg_signature: Option<String>,
}

impl WebhookQuery {
    /// Request signature, if non-empty
    pub fn signature(&self) -> Option<&str> {
        non_empty(&self.signature)
    }

    /// Timestamp, if non-empty
    pub fn timestamp(&self) -> Option<&str> {
        non_empty(&self.timestamp)
    }

    /// Nonce, if non-empty
    pub fn nonce(&self) -> Option<&str> {
        non_empty(&self.nonce)
    }

    /// Echo string, if non-empty
    pub fn echostr(&self) -> Option<&str> {
        non_empty(&self.echostr)
    }

    /// Encryption type, if non-empty
    pub fn encrypt_type(&self) -> Option<&str> {
        non_empty(&self.encrypt_type)
    }

    /// Envelope signature, if non-empty
    pub fn msg_signature(&self) -> Option<&str> {
        non_empty(&self.msg_signature)
    }

    /// True when neither encryption parameter is present
    pub fn is_plaintext(&self) -> bool {
        self.encrypt_type().is_none() && self.msg_signature().is_none()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
