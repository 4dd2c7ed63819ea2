//! Account configuration.
//!
//! One [`AccountConfig`] exists per platform account for the lifetime of the
//! process. It is validated when constructed (including when deserialized),
//! so holders never see an inconsistent configuration.

use crate::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a platform EncodingAESKey (base64 of 32 bytes, without `=`).
pub const ENCODING_AES_KEY_LEN: usize = 43;

/// The two short-lived credentials maintained for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Bearer credential required by every management call
    AccessToken,
    /// Browser-side capability ticket (issued using an access token)
    CapabilityTicket,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessToken => f.write_str("access_token"),
            Self::CapabilityTicket => f.write_str("capability_ticket"),
        }
    }
}

/// Raw, unvalidated shape used for deserialization.
#[derive(Deserialize)]
struct RawAccountConfig {
    app_id: String,
    app_secret: String,
    token: String,
    #[serde(default)]
    safe_mode: bool,
    #[serde(default)]
    encoding_aes_key: Option<String>,
}

/// Immutable account configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAccountConfig")]
pub struct AccountConfig {
    app_id: String,
    app_secret: String,
    token: String,
    safe_mode: bool,
    encoding_aes_key: Option<String>,
}

impl AccountConfig {
    /// Build a validated account configuration.
    ///
    /// # Errors
    ///
    /// - `MissingField` if `app_id` or `token` is empty
    /// - `MissingEncodingKey` if `safe_mode` is set without a key
    /// - `InvalidEncodingKey` if a key is given but is not 43 characters
    pub fn new(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        token: impl Into<String>,
        safe_mode: bool,
        encoding_aes_key: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let app_id = app_id.into();
        let token = token.into();

        if app_id.is_empty() {
            return Err(ConfigurationError::MissingField("app_id"));
        }
        if token.is_empty() {
            return Err(ConfigurationError::MissingField("token"));
        }

        let encoding_aes_key = encoding_aes_key.filter(|k| !k.is_empty());
        if safe_mode && encoding_aes_key.is_none() {
            return Err(ConfigurationError::MissingEncodingKey);
        }
        if let Some(key) = &encoding_aes_key {
            if key.len() != ENCODING_AES_KEY_LEN {
                return Err(ConfigurationError::InvalidEncodingKey(format!(
                    "expected {} characters, got {}",
                    ENCODING_AES_KEY_LEN,
                    key.len()
                )));
            }
        }

        Ok(Self {
            app_id,
            app_secret: app_secret.into(),
            token,
            safe_mode,
            encoding_aes_key,
        })
    }

    /// Platform app id (also the receiver id inside encrypted payloads)
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// App secret used to obtain access tokens
    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }

    /// Shared token used for webhook signatures
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether message bodies are encrypted
    pub fn safe_mode(&self) -> bool {
        self.safe_mode
    }

    /// EncodingAESKey, present whenever safe mode is enabled
    pub fn encoding_aes_key(&self) -> Option<&str> {
        self.encoding_aes_key.as_deref()
    }
}

impl TryFrom<RawAccountConfig> for AccountConfig {
    type Error = ConfigurationError;

    fn try_from(raw: RawAccountConfig) -> Result<Self, Self::Error> {
        Self::new(
            raw.app_id,
            raw.app_secret,
            raw.token,
            raw.safe_mode,
            raw.encoding_aes_key,
        )
    }
}

// Secrets stay out of logs.
impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("token", &"<redacted>")
            .field("safe_mode", &self.safe_mode)
            .field(
                "encoding_aes_key",
                &self.encoding_aes_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
