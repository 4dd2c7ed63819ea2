//! # Credentials
//!
//! A credential is a value plus the instant it stops being served.
//!
//! ```text
//! expires_at = issued_at + ttl - margin
//! valid      <=> now < expires_at
//! ```

use std::time::Duration;

/// A credential as returned by the issuer, before it is timestamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    pub value: String,
    /// Lifetime the platform declared, in seconds
    pub ttl_secs: u64,
}

/// A cached credential.
///
/// Value and expiry always travel together.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    value: String,
    expires_at_ms: u64,
}

impl Credential {
    /// Create with an explicit expiry (milliseconds since the Unix epoch).
    pub fn new(value: impl Into<String>, expires_at_ms: u64) -> Self {
        Self {
            value: value.into(),
            expires_at_ms,
        }
    }

    /// Timestamp a freshly issued credential.
    ///
    /// The margin is subtracted so the credential is dropped slightly before
    /// the platform stops accepting it.
    pub fn issued(issued: IssuedCredential, now_ms: u64, margin: Duration) -> Self {
        let ttl_ms = issued.ttl_secs.saturating_mul(1000);
        let margin_ms = u64::try_from(margin.as_millis()).unwrap_or(u64::MAX);
        Self {
            value: issued.value,
            expires_at_ms: now_ms.saturating_add(ttl_ms).saturating_sub(margin_ms),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at_ms(&self) -> u64 {
        self.expires_at_ms
    }

    /// Whether the credential may be served at `now_ms`.
    pub fn is_valid_at(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at_ms
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"<redacted>")
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}
