//! Built-in message handler used when the binary runs on its own.

use async_trait::async_trait;
use tracing::debug;
use wx_02_envelope::{MessageKind, ReplyContent, StructuredMessage};
use wx_04_gateway::MessageHandler;

/// Greets new followers and echoes text messages back.
#[derive(Debug, Clone)]
pub struct AutoReplyHandler {
    welcome: String,
}

impl AutoReplyHandler {
    pub fn new(welcome: impl Into<String>) -> Self {
        Self {
            welcome: welcome.into(),
        }
    }
}

impl Default for AutoReplyHandler {
    fn default() -> Self {
        Self::new("Welcome!")
    }
}

#[async_trait]
impl MessageHandler for AutoReplyHandler {
    async fn handle(&self, message: &StructuredMessage) -> anyhow::Result<Option<ReplyContent>> {
        debug!(
            from = message.from_user_name().unwrap_or_default(),
            msg_type = message.msg_type().unwrap_or_default(),
            "Handling message"
        );

        let reply = match message.kind() {
            Some(MessageKind::Text) => message.content().map(ReplyContent::text),
            Some(MessageKind::Event(event)) if event == "subscribe" => {
                Some(ReplyContent::text(self.welcome.clone()))
            }
            _ => None,
        };
        Ok(reply)
    }
}
