//! # Signature Verification
//!
//! Both signature flavors share one construction: sort the parts, join
//! them, SHA-1, lowercase hex.

use shared_crypto::{constant_time_compare, sorted_digest};
use shared_types::ConfigurationError;

/// Signature over `{token, timestamp, nonce}`.
pub fn compute_signature(token: &str, timestamp: &str, nonce: &str) -> String {
    sorted_digest(&[token, timestamp, nonce])
}

/// Signature over `{token, timestamp, nonce, encrypted}`.
pub fn compute_envelope_signature(
    token: &str,
    timestamp: &str,
    nonce: &str,
    encrypted: &str,
) -> String {
    sorted_digest(&[token, timestamp, nonce, encrypted])
}

/// Check a webhook signature.
pub fn verify(token: &str, timestamp: &str, nonce: &str, provided: &str) -> bool {
    constant_time_compare(&compute_signature(token, timestamp, nonce), provided)
}

/// Check an envelope signature over the encrypted payload.
pub fn verify_envelope(
    token: &str,
    timestamp: &str,
    nonce: &str,
    encrypted: &str,
    provided: &str,
) -> bool {
    constant_time_compare(
        &compute_envelope_signature(token, timestamp, nonce, encrypted),
        provided,
    )
}

/// Check that the request's encryption parameters match the configured mode.
///
/// Only a request that carries neither `encrypt_type` nor `msg_signature` is
/// plaintext, and only one that carries both is encrypted. A safe-mode request
/// with just one of them passes here and fails the envelope signature check.
///
/// # Errors
///
/// - `PlaintextRequestInSafeMode` when safe mode is on and both are missing
/// - `SafeRequestInPlaintextMode` when safe mode is off and both are present
pub fn validate_mode_consistency(
    safe_mode: bool,
    encrypt_type: Option<&str>,
    msg_signature: Option<&str>,
) -> Result<(), ConfigurationError> {
    let encrypt_type = encrypt_type.filter(|v| !v.is_empty());
    let msg_signature = msg_signature.filter(|v| !v.is_empty());

    if safe_mode && encrypt_type.is_none() && msg_signature.is_none() {
        return Err(ConfigurationError::PlaintextRequestInSafeMode);
    }
    if !safe_mode && encrypt_type.is_some() && msg_signature.is_some() {
        return Err(ConfigurationError::SafeRequestInPlaintextMode);
    }
    Ok(())
}
