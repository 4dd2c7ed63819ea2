//! # Credential Cache Service
//!
//! Holds the access token and capability ticket for one account.
//!
//! ## State Machine (per credential)
//!
//! ```text
//! Empty/Expired --get--> Refreshing --ok-->  Valid
//!                                   --err--> Expired (old value kept, never served)
//! Valid --get--> Valid (no network call)
//! Valid --expiry or invalidate--> Expired/Empty
//! ```
//!
//! ## Single Flight
//!
//! While a refresh is in flight every caller for that credential awaits the
//! same shared future, so N concurrent callers cause exactly one issuer call
//! and all observe the same value or the same error. The slot lock is never
//! held across an await.

use crate::domain::credential::Credential;
use crate::domain::errors::RefreshError;
use crate::ports::inbound::CredentialProvider;
use crate::ports::outbound::{CredentialIssuer, TimeSource};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use shared_types::CredentialKind;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default safety margin subtracted from the platform TTL.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_secs(20);

type RefreshFuture = Shared<BoxFuture<'static, Result<Credential, RefreshError>>>;

#[derive(Default)]
struct Slot {
    credential: Option<Credential>,
    /// Refresh in progress, tagged with the generation that started it
    in_flight: Option<(u64, RefreshFuture)>,
    generation: u64,
}

struct Inner {
    issuer: Arc<dyn CredentialIssuer>,
    clock: Arc<dyn TimeSource>,
    expiry_margin: Duration,
    access_token: Mutex<Slot>,
    capability_ticket: Mutex<Slot>,
}

/// Lazily refreshed credential cache.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CredentialCache {
    inner: Arc<Inner>,
}

impl CredentialCache {
    pub fn new(
        issuer: Arc<dyn CredentialIssuer>,
        clock: Arc<dyn TimeSource>,
        expiry_margin: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                issuer,
                clock,
                expiry_margin,
                access_token: Mutex::new(Slot::default()),
                capability_ticket: Mutex::new(Slot::default()),
            }),
        }
    }

    /// Snapshot of the cached credential, valid or not.
    pub fn peek(&self, kind: CredentialKind) -> Option<Credential> {
        self.slot(kind).lock().credential.clone()
    }

    fn slot(&self, kind: CredentialKind) -> &Mutex<Slot> {
        match kind {
            CredentialKind::AccessToken => &self.inner.access_token,
            CredentialKind::CapabilityTicket => &self.inner.capability_ticket,
        }
    }

    async fn get(&self, kind: CredentialKind) -> Result<Credential, RefreshError> {
        let (generation, refresh) = {
            let mut slot = self.slot(kind).lock();
            let now = self.inner.clock.now_millis();

            if let Some(credential) = slot.credential.as_ref().filter(|c| c.is_valid_at(now)) {
                return Ok(credential.clone());
            }

            let joined = slot
                .in_flight
                .as_ref()
                .map(|(generation, refresh)| (*generation, refresh.clone()));
            match joined {
                Some(joined) => joined,
                None => {
                    slot.generation += 1;
                    let generation = slot.generation;
                    let refresh = self.refresh(kind).shared();
                    slot.in_flight = Some((generation, refresh.clone()));
                    debug!(credential = %kind, generation, "Starting credential refresh");
                    (generation, refresh)
                }
            }
        };

        let result = refresh.await;

        let mut slot = self.slot(kind).lock();
        if matches!(&slot.in_flight, Some((g, _)) if *g == generation) {
            slot.in_flight = None;
            match &result {
                Ok(credential) => {
                    info!(
                        credential = %kind,
                        expires_at_ms = credential.expires_at_ms(),
                        "Credential refreshed"
                    );
                    slot.credential = Some(credential.clone());
                }
                Err(e) => warn!(credential = %kind, error = %e, "Credential refresh failed"),
            }
        }
        result
    }

    fn refresh(&self, kind: CredentialKind) -> BoxFuture<'static, Result<Credential, RefreshError>> {
        let cache = self.clone();
        async move {
            let issued = match kind {
                CredentialKind::AccessToken => cache.inner.issuer.issue_access_token().await?,
                CredentialKind::CapabilityTicket => {
                    let access_token = cache.get(CredentialKind::AccessToken).await?;
                    cache
                        .inner
                        .issuer
                        .issue_capability_ticket(access_token.value())
                        .await?
                }
            };
            let now = cache.inner.clock.now_millis();
            Ok(Credential::issued(issued, now, cache.inner.expiry_margin))
        }
        .boxed()
    }
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("expiry_margin", &self.inner.expiry_margin)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialProvider for CredentialCache {
    async fn access_token(&self) -> Result<String, RefreshError> {
        self.get(CredentialKind::AccessToken)
            .await
            .map(Credential::into_value)
    }

    async fn capability_ticket(&self) -> Result<String, RefreshError> {
        self.get(CredentialKind::CapabilityTicket)
            .await
            .map(Credential::into_value)
    }

    fn invalidate(&self, kind: CredentialKind) {
        let mut slot = self.slot(kind).lock();
        if slot.credential.take().is_some() {
            debug!(credential = %kind, "Credential invalidated");
        }
    }
}
