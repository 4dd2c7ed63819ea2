//! # Shared Types Crate
//!
//! Types shared by every gateway subsystem:
//!
//! - [`AccountConfig`]: the immutable per-account configuration (app id,
//!   app secret, shared token, safe-mode switch, EncodingAESKey).
//! - [`ConfigurationError`]: fatal, operator-facing misconfiguration.
//! - [`CredentialKind`]: the two short-lived credentials held for an account.

pub mod account;
pub mod errors;

pub use account::{AccountConfig, CredentialKind, ENCODING_AES_KEY_LEN};
pub use errors::ConfigurationError;
