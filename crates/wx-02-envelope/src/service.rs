//! # Envelope Codec Service
//!
//! Binds signature checking, the cipher and message parsing to one account.

use crate::domain::errors::EnvelopeError;
use crate::domain::frame::{self, RANDOM_PREFIX_LEN};
use crate::domain::message::{parse_message, StructuredMessage};
use crate::domain::xml::{cdata, parse_document};
use crate::ports::inbound::EnvelopeCodecApi;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use shared_crypto::SecretKey;
use shared_types::{AccountConfig, ConfigurationError};
use tracing::{debug, warn};
use wx_01_signature::{SignatureVerificationApi, SignatureVerifier};

/// Envelope codec for one account.
#[derive(Clone)]
pub struct SecureEnvelopeCodec {
    verifier: SignatureVerifier,
    key: Option<SecretKey>,
    app_id: String,
}

impl SecureEnvelopeCodec {
    /// Create a codec for `account`.
    ///
    /// # Errors
    ///
    /// Returns `EnvelopeError::Configuration` if safe mode is enabled and the
    /// encoding key does not decode to a 256-bit key.
    pub fn new(account: &AccountConfig) -> Result<Self, EnvelopeError> {
        let key = if account.safe_mode() {
            let encoded = account
                .encoding_aes_key()
                .ok_or(ConfigurationError::MissingEncodingKey)?;
            let key = SecretKey::from_encoding_aes_key(encoded)
                .map_err(|e| ConfigurationError::InvalidEncodingKey(e.to_string()))?;
            Some(key)
        } else {
            None
        };

        Ok(Self {
            verifier: SignatureVerifier::new(account),
            key,
            app_id: account.app_id().to_string(),
        })
    }

    /// Verify and decrypt a safe-mode envelope, returning the inner XML.
    ///
    /// The envelope signature is checked before anything is decrypted.
    pub fn open(
        &self,
        msg_signature: Option<&str>,
        timestamp: &str,
        nonce: &str,
        body: &str,
    ) -> Result<String, EnvelopeError> {
        let key = self
            .key
            .as_ref()
            .ok_or(ConfigurationError::MissingEncodingKey)?;

        let (_, fields) = parse_document(body)?;
        let encrypted = fields
            .get("Encrypt")
            .and_then(|v| v.as_text())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| EnvelopeError::Parse("envelope has no Encrypt field".into()))?;

        let msg_signature = msg_signature.ok_or(EnvelopeError::Integrity)?;
        if !self
            .verifier
            .verify_envelope(timestamp, nonce, encrypted, msg_signature)
        {
            debug!("Envelope signature mismatch");
            return Err(EnvelopeError::Integrity);
        }

        let ciphertext = STANDARD
            .decode(encrypted.trim())
            .map_err(|e| EnvelopeError::Decryption(format!("payload is not base64: {}", e)))?;
        let plaintext = shared_crypto::decrypt(key, &ciphertext)?;

        let (message, app_id) = frame::open(&plaintext)?;
        if app_id != self.app_id.as_bytes() {
            warn!("Envelope addressed to a different app id");
            return Err(EnvelopeError::Integrity);
        }

        String::from_utf8(message.to_vec())
            .map_err(|e| EnvelopeError::Decryption(format!("message is not UTF-8: {}", e)))
    }

    /// Encrypt and sign `reply_xml` into an outbound envelope.
    pub fn seal(
        &self,
        reply_xml: &str,
        timestamp: &str,
        nonce: &str,
    ) -> Result<String, EnvelopeError> {
        let key = self
            .key
            .as_ref()
            .ok_or(ConfigurationError::MissingEncodingKey)?;

        let mut random = [0u8; RANDOM_PREFIX_LEN];
        rand::thread_rng().fill_bytes(&mut random);

        let framed = frame::seal(reply_xml.as_bytes(), &self.app_id, random)?;
        let encrypted = STANDARD.encode(shared_crypto::encrypt(key, &framed)?);
        let signature = self.verifier.sign_envelope(timestamp, nonce, &encrypted);

        Ok(format!(
            "<xml><Encrypt>{}</Encrypt><MsgSignature>{}</MsgSignature>\
             <TimeStamp>{}</TimeStamp><Nonce>{}</Nonce></xml>",
            cdata(&encrypted),
            cdata(&signature),
            quick_xml::escape::escape(timestamp),
            cdata(nonce),
        ))
    }
}

impl std::fmt::Debug for SecureEnvelopeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureEnvelopeCodec")
            .field("app_id", &self.app_id)
            .field("safe_mode", &self.key.is_some())
            .finish_non_exhaustive()
    }
}

impl EnvelopeCodecApi for SecureEnvelopeCodec {
    fn safe_mode(&self) -> bool {
        self.key.is_some()
    }

    fn decrypt(
        &self,
        msg_signature: Option<&str>,
        timestamp: &str,
        nonce: &str,
        body: &str,
    ) -> Result<StructuredMessage, EnvelopeError> {
        if self.key.is_none() {
            return parse_message(body);
        }
        let inner = self.open(msg_signature, timestamp, nonce, body)?;
        parse_message(&inner)
    }

    fn encrypt(
        &self,
        reply_xml: &str,
        timestamp: &str,
        nonce: &str,
    ) -> Result<String, EnvelopeError> {
        if self.key.is_none() {
            return Ok(reply_xml.to_string());
        }
        self.seal(reply_xml, timestamp, nonce)
    }
}
