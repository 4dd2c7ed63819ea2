//! The message pipeline, independent of the HTTP stack.
//!
//! ```text
//! authenticate:  mode consistency -> signature -> method branch
//!                GET  -> Echo(echostr)
//!                POST -> ReadBody
//!                else / mismatch -> PassThrough
//! process:       decrypt -> handler -> render reply -> encrypt
//! ```

use crate::domain::context::InboundRequestContext;
use crate::domain::error::{GatewayError, ProcessError};
use crate::ports::inbound::MessageHandler;
use crate::ports::outbound::TimeSource;
use axum::http::Method;
use shared_types::AccountConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use wx_01_signature::{SignatureError, SignatureVerificationApi, SignatureVerifier, WebhookQuery};
use wx_02_envelope::{render_reply, EnvelopeCodecApi, EnvelopeError, SecureEnvelopeCodec};

/// Body sent when the handler has nothing to say.
pub const NO_REPLY_BODY: &str = "success";

/// What the HTTP layer should do with a request after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// Not addressed to this gateway; hand to the next service untouched
    PassThrough,
    /// Verification handshake; answer with this string
    Echo(String),
    /// Authenticated message delivery; read the body and call `process`
    ReadBody,
}

/// Outcome of a processed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayReply {
    /// Reply envelope (XML, encrypted in safe mode)
    Xml(String),
    /// Handler chose not to reply
    NoReply,
}

/// Orchestrates verification, envelope codec and the application handler.
pub struct MessageGateway {
    verifier: SignatureVerifier,
    codec: SecureEnvelopeCodec,
    handler: Arc<dyn MessageHandler>,
    clock: Arc<dyn TimeSource>,
    handler_timeout: Duration,
}

impl MessageGateway {
    /// Build the pipeline for `account`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` if the safe-mode key is unusable.
    pub fn new(
        account: &AccountConfig,
        handler: Arc<dyn MessageHandler>,
        clock: Arc<dyn TimeSource>,
        handler_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            verifier: SignatureVerifier::new(account),
            codec: SecureEnvelopeCodec::new(account)?,
            handler,
            clock,
            handler_timeout,
        })
    }

    /// Decide how to treat a request from its method and query alone.
    pub fn authenticate(&self, method: &Method, query: &WebhookQuery) -> Authentication {
        if method != Method::GET && method != Method::POST {
            return Authentication::PassThrough;
        }

        // The verification handshake never carries encryption parameters,
        // even for safe-mode accounts.
        let result = if method == Method::GET && query.is_plaintext() {
            self.check_signature_only(query)
        } else {
            self.verifier.check_request(query)
        };

        match result {
            Ok(()) if method == Method::GET => {
                Authentication::Echo(query.echostr().unwrap_or_default().to_string())
            }
            Ok(()) => Authentication::ReadBody,
            Err(SignatureError::ModeMismatch(e)) => {
                error!(
                    error = %e,
                    safe_mode = self.verifier.safe_mode(),
                    "Webhook encryption mode does not match configuration"
                );
                Authentication::PassThrough
            }
            Err(e) => {
                debug!(error = %e, "Webhook request not authenticated");
                Authentication::PassThrough
            }
        }
    }

    fn check_signature_only(&self, query: &WebhookQuery) -> Result<(), SignatureError> {
        let signature = query
            .signature()
            .ok_or(SignatureError::MissingParameter("signature"))?;
        let timestamp = query
            .timestamp()
            .ok_or(SignatureError::MissingParameter("timestamp"))?;
        let nonce = query
            .nonce()
            .ok_or(SignatureError::MissingParameter("nonce"))?;

        if self.verifier.verify(timestamp, nonce, signature) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }

    /// Decode, dispatch and encode one authenticated POST.
    ///
    /// Steps run strictly in order; the handler only sees a fully decoded
    /// message and the reply is encoded only after the handler returns.
    pub async fn process(&self, ctx: &InboundRequestContext) -> Result<GatewayReply, ProcessError> {
        let timestamp = ctx.query.timestamp().unwrap_or_default();
        let nonce = ctx.query.nonce().unwrap_or_default();

        let body = ctx.raw_body.as_deref().unwrap_or_default();
        let body = std::str::from_utf8(body).map_err(|_| {
            ProcessError::Decode(EnvelopeError::Parse("body is not UTF-8".into()))
        })?;

        let message = self
            .codec
            .decrypt(ctx.query.msg_signature(), timestamp, nonce, body)
            .map_err(|e| {
                match &e {
                    EnvelopeError::Integrity => warn!("Envelope integrity check failed"),
                    other => warn!(error = %other, "Failed to decode message"),
                }
                ProcessError::Decode(e)
            })?;

        debug!(
            msg_type = message.msg_type().unwrap_or("unknown"),
            msg_id = message.msg_id().unwrap_or_default(),
            "Dispatching message"
        );

        let reply = match tokio::time::timeout(self.handler_timeout, self.handler.handle(&message))
            .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                error!(error = %e, "Message handler failed");
                return Err(ProcessError::Handler(e));
            }
            Err(_) => {
                error!(
                    timeout_ms = self.handler_timeout.as_millis() as u64,
                    "Message handler timed out"
                );
                return Err(ProcessError::HandlerTimeout);
            }
        };

        let Some(reply) = reply else {
            return Ok(GatewayReply::NoReply);
        };

        let xml = render_reply(&reply, &message, self.clock.now()).map_err(|e| {
            error!(error = %e, "Failed to render reply");
            ProcessError::Encode(e)
        })?;
        let sealed = self.codec.encrypt(&xml, timestamp, nonce).map_err(|e| {
            error!(error = %e, "Failed to encode reply");
            ProcessError::Encode(e)
        })?;

        Ok(GatewayReply::Xml(sealed))
    }
}

impl std::fmt::Debug for MessageGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageGateway")
            .field("codec", &self.codec)
            .field("handler_timeout", &self.handler_timeout)
            .finish_non_exhaustive()
    }
}
