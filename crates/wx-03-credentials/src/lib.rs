//! # Credential Cache Subsystem (WX-03)
//!
//! Maintains the two short-lived credentials every outbound platform call
//! depends on: the access token and the capability ticket.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Credential values, expiry arithmetic, errors
//! - **Ports Layer** (`ports/`): `CredentialProvider` (API) and
//!   `CredentialIssuer` / `TimeSource` (SPI)
//! - **Adapters Layer** (`adapters/`): HTTP issuer for the platform endpoints
//! - **Service Layer** (`service.rs`): The single-flight cache
//!
//! ## Guarantees
//!
//! - An expired credential is never served.
//! - Concurrent callers for an expired credential share one refresh.
//! - A failed refresh is reported to every waiting caller and leaves the
//!   credential expired; the next call retries. There is no retry loop.
//! - Capability tickets are issued with a valid access token, refreshing the
//!   token first when needed.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::http_issuer::{HttpCredentialIssuer, DEFAULT_API_BASE_URL};
pub use domain::credential::{Credential, IssuedCredential};
pub use domain::errors::{is_stale_token_code, RefreshError, STALE_TOKEN_CODES};
pub use ports::inbound::CredentialProvider;
pub use ports::outbound::{CredentialIssuer, SystemTimeSource, TimeSource};
pub use service::{CredentialCache, DEFAULT_EXPIRY_MARGIN};
