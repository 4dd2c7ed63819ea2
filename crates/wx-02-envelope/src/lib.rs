//! # Secure Envelope Subsystem (WX-02)
//!
//! Turns inbound webhook bodies into [`StructuredMessage`]s and application
//! replies back into wire envelopes.
//!
//! ## Safe Mode
//!
//! ```text
//! inbound:  <xml><ToUserName/><Encrypt>base64(AES(frame))</Encrypt></xml>
//!           1. parse envelope, extract Encrypt
//!           2. verify msg_signature = sha1(sort[token, timestamp, nonce, Encrypt])
//!           3. AES-256-CBC decrypt, unframe, check app id
//!           4. parse inner XML
//!
//! frame:    random(16) | len(u32 BE) | message | app_id
//!
//! outbound: <xml><Encrypt/><MsgSignature/><TimeStamp/><Nonce/></xml>
//! ```
//!
//! The signature is checked before any decryption; a failed check is an
//! [`EnvelopeError::Integrity`] and never falls back to plaintext handling.
//!
//! ## Plaintext Mode
//!
//! Bodies are parsed directly and replies are written unchanged.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::errors::EnvelopeError;
pub use domain::message::{parse_message, MessageKind, StructuredMessage, XmlValue};
pub use domain::reply::{render_reply, Article, ReplyContent, MAX_NEWS_ARTICLES};
pub use ports::inbound::EnvelopeCodecApi;
pub use service::SecureEnvelopeCodec;
