//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::RefreshError;
use async_trait::async_trait;
use shared_types::CredentialKind;

/// Credential API consumed by outbound call paths.
///
/// Callers receive copies of the current value and never hold the cache's
/// state.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// A currently valid access token, refreshing first if needed.
    async fn access_token(&self) -> Result<String, RefreshError>;

    /// A currently valid capability ticket, refreshing first if needed.
    ///
    /// May refresh the access token as well.
    async fn capability_ticket(&self) -> Result<String, RefreshError>;

    /// Drop the cached credential of `kind` so the next call refreshes.
    fn invalidate(&self, kind: CredentialKind);
}
