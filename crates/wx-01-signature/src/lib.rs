//! # Signature Verification Subsystem (WX-01)
//!
//! Decides whether an inbound webhook call genuinely comes from the platform.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure signature logic, no I/O
//! - **Ports Layer** (`ports/`): The verification API consumed by the gateway
//! - **Service Layer** (`service.rs`): Binds the domain logic to one account
//!
//! ## Scheme
//!
//! `signature = sha1(sort([token, timestamp, nonce]).join(""))`. The envelope
//! variant adds the encrypted payload as a fourth part. The scheme is an
//! unkeyed hash, reproduced exactly for platform compatibility; comparison is
//! constant-time.
//!
//! ## Mode Consistency
//!
//! Before any signature comparison, the request's encryption parameters
//! (`encrypt_type`, `msg_signature`) must agree with the configured mode.
//! Disagreement is a deployment misconfiguration, reported as
//! [`shared_types::ConfigurationError`].

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::entities::WebhookQuery;
pub use domain::errors::SignatureError;
pub use domain::verification::{
    compute_envelope_signature, compute_signature, validate_mode_consistency, verify,
    verify_envelope,
};
pub use ports::inbound::SignatureVerificationApi;
pub use service::SignatureVerifier;
