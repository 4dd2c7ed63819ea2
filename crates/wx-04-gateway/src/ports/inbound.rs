//! Inbound ports: the application hook the gateway dispatches to.

use async_trait::async_trait;
use wx_02_envelope::{ReplyContent, StructuredMessage};

/// Application-supplied message handler.
///
/// Called once per authenticated, decoded message. Returning `Ok(None)`
/// means "no reply"; the platform is answered with `success`.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: &StructuredMessage) -> anyhow::Result<Option<ReplyContent>>;
}

/// Adapter turning an async closure into a [`MessageHandler`].
pub struct HandlerFn<F>(pub F);

#[async_trait]
impl<F, Fut> MessageHandler for HandlerFn<F>
where
    F: Fn(StructuredMessage) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = anyhow::Result<Option<ReplyContent>>> + Send,
{
    async fn handle(&self, message: &StructuredMessage) -> anyhow::Result<Option<ReplyContent>> {
        (self.0)(message.clone()).await
    }
}
