//! # Signature Verification Service
//!
//! Binds the pure verification functions to one account's token and mode.

use crate::domain::entities::WebhookQuery;
use crate::domain::errors::SignatureError;
use crate::domain::verification;
use crate::ports::inbound::SignatureVerificationApi;
use shared_types::AccountConfig;
use tracing::debug;

/// Signature verifier for one account.
#[derive(Clone)]
pub struct SignatureVerifier {
    token: String,
    safe_mode: bool,
}

impl SignatureVerifier {
    /// Create a verifier for `account`.
    pub fn new(account: &AccountConfig) -> Self {
        Self {
            token: account.token().to_string(),
            safe_mode: account.safe_mode(),
        }
    }

    /// Whether this verifier expects encrypted requests
    pub fn safe_mode(&self) -> bool {
        self.safe_mode
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("safe_mode", &self.safe_mode)
            .finish_non_exhaustive()
    }
}

impl SignatureVerificationApi for SignatureVerifier {
    fn verify(&self, timestamp: &str, nonce: &str, signature: &str) -> bool {
        verification::verify(&self.token, timestamp, nonce, signature)
    }

    fn verify_envelope(
        &self,
        timestamp: &str,
        nonce: &str,
        encrypted: &str,
        msg_signature: &str,
    ) -> bool {
        verification::verify_envelope(&self.token, timestamp, nonce, encrypted, msg_signature)
    }

    fn sign_envelope(&self, timestamp: &str, nonce: &str, encrypted: &str) -> String {
        verification::compute_envelope_signature(&self.token, timestamp, nonce, encrypted)
    }

    fn check_request(&self, query: &WebhookQuery) -> Result<(), SignatureError> {
        verification::validate_mode_consistency(
            self.safe_mode,
            query.encrypt_type(),
            query.msg_signature(),
        )?;

        let signature = query
            .signature()
            .ok_or(SignatureError::MissingParameter("signature"))?;
        let timestamp = query
            .timestamp()
            .ok_or(SignatureError::MissingParameter("timestamp"))?;
        let nonce = query
            .nonce()
            .ok_or(SignatureError::MissingParameter("nonce"))?;

        if self.verify(timestamp, nonce, signature) {
            Ok(())
        } else {
            debug!(timestamp, "Webhook signature mismatch");
            Err(SignatureError::Mismatch)
        }
    }
}
