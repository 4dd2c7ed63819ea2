//! # Outbound Ports (Driven Ports / SPI)
//!
//! What the cache needs from the outside world: somewhere to get new
//! credentials from, and a clock.

use crate::domain::credential::IssuedCredential;
use crate::domain::errors::RefreshError;
use async_trait::async_trait;

/// The platform's credential-issuing endpoints.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// Exchange the app id and secret for an access token.
    async fn issue_access_token(&self) -> Result<IssuedCredential, RefreshError>;

    /// Exchange a valid access token for a capability ticket.
    async fn issue_capability_ticket(
        &self,
        access_token: &str,
    ) -> Result<IssuedCredential, RefreshError>;
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// System time implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            // Clock before the epoch: everything reads as expired-or-valid
            // against 0 rather than panicking.
            .unwrap_or(0)
    }
}
