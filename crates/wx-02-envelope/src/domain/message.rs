//! # Structured Messages
//!
//! Decoded form of an inbound user message or event.

use crate::domain::errors::EnvelopeError;
use crate::domain::xml::parse_document;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One field value from an XML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XmlValue {
    /// Leaf element text
    Text(String),
    /// Element with child elements
    Node(BTreeMap<String, XmlValue>),
    /// Repeated sibling elements sharing one name
    List(Vec<XmlValue>),
}

impl XmlValue {
    /// Text content, if this is a leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Classification of a message by its `MsgType` (and `Event`) fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Image,
    Voice,
    Video,
    ShortVideo,
    Location,
    Link,
    /// Event push; carries the `Event` field as sent
    Event(String),
    /// Any type this crate does not name
    Other(String),
}

/// An inbound message as a map from top-level element name to value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredMessage {
    fields: BTreeMap<String, XmlValue>,
}

impl StructuredMessage {
    /// Build from already parsed fields.
    pub fn from_fields(fields: BTreeMap<String, XmlValue>) -> Self {
        Self { fields }
    }

    /// Raw field lookup.
    pub fn get(&self, name: &str) -> Option<&XmlValue> {
        self.fields.get(name)
    }

    /// Leaf text of a field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(XmlValue::as_text)
    }

    /// All fields.
    pub fn fields(&self) -> &BTreeMap<String, XmlValue> {
        &self.fields
    }

    pub fn to_user_name(&self) -> Option<&str> {
        self.text("ToUserName")
    }

    pub fn from_user_name(&self) -> Option<&str> {
        self.text("FromUserName")
    }

    /// Seconds since the Unix epoch.
    pub fn create_time(&self) -> Option<u64> {
        self.text("CreateTime").and_then(|t| t.trim().parse().ok())
    }

    pub fn msg_type(&self) -> Option<&str> {
        self.text("MsgType")
    }

    pub fn msg_id(&self) -> Option<&str> {
        self.text("MsgId")
    }

    pub fn content(&self) -> Option<&str> {
        self.text("Content")
    }

    pub fn event(&self) -> Option<&str> {
        self.text("Event")
    }

    pub fn event_key(&self) -> Option<&str> {
        self.text("EventKey")
    }

    /// Classify the message.
    ///
    /// Returns `None` when `MsgType` is absent.
    pub fn kind(&self) -> Option<MessageKind> {
        let kind = match self.msg_type()? {
            "text" => MessageKind::Text,
            "image" => MessageKind::Image,
            "voice" => MessageKind::Voice,
            "video" => MessageKind::Video,
            "shortvideo" => MessageKind::ShortVideo,
            "location" => MessageKind::Location,
            "link" => MessageKind::Link,
            "event" => MessageKind::Event(self.event().unwrap_or_default().to_string()),
            other => MessageKind::Other(other.to_string()),
        };
        Some(kind)
    }
}

/// Parse an XML message body.
///
/// # Errors
///
/// Returns `EnvelopeError::Parse` if the body is not well-formed XML.
pub fn parse_message(xml: &str) -> Result<StructuredMessage, EnvelopeError> {
    let (_, fields) = parse_document(xml)?;
    Ok(StructuredMessage::from_fields(fields))
}
