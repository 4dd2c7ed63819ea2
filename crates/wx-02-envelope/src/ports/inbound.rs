//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::EnvelopeError;
use crate::domain::message::StructuredMessage;

/// Envelope codec API bound to one account.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait EnvelopeCodecApi: Send + Sync {
    /// Whether bodies are encrypted.
    fn safe_mode(&self) -> bool;

    /// Decode an inbound body.
    ///
    /// In safe mode `msg_signature` is the envelope signature from the query
    /// string; it is ignored in plaintext mode.
    ///
    /// # Errors
    ///
    /// - `Integrity` if the envelope signature or receiver id does not match
    /// - `Decryption` if the payload cannot be decoded or decrypted
    /// - `Parse` if the envelope or the inner message is not valid XML
    fn decrypt(
        &self,
        msg_signature: Option<&str>,
        timestamp: &str,
        nonce: &str,
        body: &str,
    ) -> Result<StructuredMessage, EnvelopeError>;

    /// Encode an outbound reply body.
    ///
    /// # Errors
    ///
    /// Returns `Encryption` if the reply cannot be sealed.
    fn encrypt(&self, reply_xml: &str, timestamp: &str, nonce: &str)
        -> Result<String, EnvelopeError>;
}
