//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::WebhookQuery;
use crate::domain::errors::SignatureError;

/// Signature verification API bound to one account.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait SignatureVerificationApi: Send + Sync {
    /// Verify `signature` against the account token, `timestamp` and `nonce`.
    fn verify(&self, timestamp: &str, nonce: &str, signature: &str) -> bool;

    /// Verify an envelope signature over `encrypted`.
    fn verify_envelope(
        &self,
        timestamp: &str,
        nonce: &str,
        encrypted: &str,
        msg_signature: &str,
    ) -> bool;

    /// Sign an outbound envelope.
    fn sign_envelope(&self, timestamp: &str, nonce: &str, encrypted: &str) -> String;

    /// Full inbound check: mode consistency first, then the signature.
    ///
    /// # Errors
    ///
    /// - `ModeMismatch` if the request's encryption parameters disagree with
    ///   the configured mode
    /// - `MissingParameter` if signature, timestamp or nonce is absent
    /// - `Mismatch` if the signature is wrong
    fn check_request(&self, query: &WebhookQuery) -> Result<(), SignatureError>;
}
