//! Per-request input to the gateway pipeline.

use axum::body::Bytes;
use axum::http::Method;
use wx_01_signature::WebhookQuery;

/// One inbound webhook call.
///
/// Created by the HTTP layer and dropped when the response is written.
#[derive(Debug, Clone)]
pub struct InboundRequestContext {
    pub method: Method,
    pub query: WebhookQuery,
    /// Present only for POST, after the body has been read in full
    pub raw_body: Option<Bytes>,
}

impl InboundRequestContext {
    pub fn new(method: Method, query: WebhookQuery) -> Self {
        Self {
            method,
            query,
            raw_body: None,
        }
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.raw_body = Some(body);
        self
    }
}
