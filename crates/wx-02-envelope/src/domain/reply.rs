//! # Reply Templates
//!
//! Renders application reply content into the passive-reply XML the platform
//! expects. Sender and recipient are swapped from the inbound message.

use crate::domain::errors::EnvelopeError;
use crate::domain::message::StructuredMessage;
use crate::domain::xml::cdata;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Upper bound on articles in one news reply.
pub const MAX_NEWS_ARTICLES: usize = 8;

/// One entry of a news reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pic_url: String,
    #[serde(default)]
    pub url: String,
}

/// What the application wants to send back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyContent {
    Text {
        content: String,
    },
    Image {
        media_id: String,
    },
    Voice {
        media_id: String,
    },
    Video {
        media_id: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        description: String,
    },
    Music {
        #[serde(default)]
        title: String,
        #[serde(default)]
        description: String,
        music_url: String,
        #[serde(default)]
        hq_music_url: String,
        thumb_media_id: String,
    },
    News {
        articles: Vec<Article>,
    },
    /// Hand the conversation to customer service, optionally to one agent.
    TransferCustomerService {
        #[serde(default)]
        kf_account: Option<String>,
    },
}

impl ReplyContent {
    /// Shorthand for a text reply.
    pub fn text(content: impl Into<String>) -> Self {
        ReplyContent::Text {
            content: content.into(),
        }
    }

    fn msg_type(&self) -> &'static str {
        match self {
            ReplyContent::Text { .. } => "text",
            ReplyContent::Image { .. } => "image",
            ReplyContent::Voice { .. } => "voice",
            ReplyContent::Video { .. } => "video",
            ReplyContent::Music { .. } => "music",
            ReplyContent::News { .. } => "news",
            ReplyContent::TransferCustomerService { .. } => "transfer_customer_service",
        }
    }
}

/// Render `reply` as an answer to `inbound`.
///
/// # Errors
///
/// Returns `EnvelopeError::InvalidReply` if the inbound message lacks
/// sender or recipient, or a news reply has no articles or too many.
pub fn render_reply(
    reply: &ReplyContent,
    inbound: &StructuredMessage,
    create_time: u64,
) -> Result<String, EnvelopeError> {
    let to_user = inbound
        .from_user_name()
        .ok_or_else(|| EnvelopeError::InvalidReply("inbound message has no FromUserName".into()))?;
    let from_user = inbound
        .to_user_name()
        .ok_or_else(|| EnvelopeError::InvalidReply("inbound message has no ToUserName".into()))?;

    let mut xml = String::with_capacity(256);
    xml.push_str("<xml>");
    push_field(&mut xml, "ToUserName", &cdata(to_user));
    push_field(&mut xml, "FromUserName", &cdata(from_user));
    push_field(&mut xml, "CreateTime", &create_time.to_string());
    push_field(&mut xml, "MsgType", &cdata(reply.msg_type()));

    match reply {
        ReplyContent::Text { content } => {
            push_field(&mut xml, "Content", &cdata(content));
        }
        ReplyContent::Image { media_id } => {
            push_field(&mut xml, "Image", &media_id_node(media_id));
        }
        ReplyContent::Voice { media_id } => {
            push_field(&mut xml, "Voice", &media_id_node(media_id));
        }
        ReplyContent::Video {
            media_id,
            title,
            description,
        } => {
            let mut inner = media_id_node(media_id);
            push_field(&mut inner, "Title", &cdata(title));
            push_field(&mut inner, "Description", &cdata(description));
            push_field(&mut xml, "Video", &inner);
        }
        ReplyContent::Music {
            title,
            description,
            music_url,
            hq_music_url,
            thumb_media_id,
        } => {
            let mut inner = String::new();
            push_field(&mut inner, "Title", &cdata(title));
            push_field(&mut inner, "Description", &cdata(description));
            push_field(&mut inner, "MusicUrl", &cdata(music_url));
            push_field(&mut inner, "HQMusicUrl", &cdata(hq_music_url));
            push_field(&mut inner, "ThumbMediaId", &cdata(thumb_media_id));
            push_field(&mut xml, "Music", &inner);
        }
        ReplyContent::News { articles } => {
            if articles.is_empty() {
                return Err(EnvelopeError::InvalidReply(
                    "news reply needs at least one article".into(),
                ));
            }
            if articles.len() > MAX_NEWS_ARTICLES {
                return Err(EnvelopeError::InvalidReply(format!(
                    "news reply has {} articles, limit is {}",
                    articles.len(),
                    MAX_NEWS_ARTICLES
                )));
            }
            push_field(&mut xml, "ArticleCount", &articles.len().to_string());
            let mut items = String::new();
            for article in articles {
                let mut item = String::new();
                push_field(&mut item, "Title", &cdata(&article.title));
                push_field(&mut item, "Description", &cdata(&article.description));
                push_field(&mut item, "PicUrl", &cdata(&article.pic_url));
                push_field(&mut item, "Url", &cdata(&article.url));
                push_field(&mut items, "item", &item);
            }
            push_field(&mut xml, "Articles", &items);
        }
        ReplyContent::TransferCustomerService { kf_account } => {
            if let Some(account) = kf_account.as_deref().filter(|a| !a.is_empty()) {
                let mut inner = String::new();
                push_field(&mut inner, "KfAccount", &cdata(account));
                push_field(&mut xml, "TransInfo", &inner);
            }
        }
    }

    xml.push_str("</xml>");
    Ok(xml)
}

fn push_field(out: &mut String, name: &str, inner: &str) {
    // Writing to a String cannot fail.
    let _ = write!(out, "<{name}>{inner}</{name}>");
}

fn media_id_node(media_id: &str) -> String {
    let mut inner = String::new();
    push_field(&mut inner, "MediaId", &cdata(media_id));
    inner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::{parse_message, XmlValue};

    fn inbound() -> StructuredMessage {
        parse_message(
            "<xml><ToUserName>gh_account</ToUserName><FromUserName>o_user</FromUserName>\
             <MsgType>text</MsgType><Content>hi</Content></xml>",
        )
        .unwrap()
    }

    #[test]
    fn test_text_reply_swaps_parties() {
        let xml = render_reply(&ReplyContent::text("hello"), &inbound(), 1700000000).unwrap();
        assert_eq!(
            xml,
            "<xml><ToUserName><![CDATA[o_user]]></ToUserName>\
             <FromUserName><![CDATA[gh_account]]></FromUserName>\
             <CreateTime>1700000000</CreateTime>\
             <MsgType><![CDATA[text]]></MsgType>\
             <Content><![CDATA[hello]]></Content></xml>"
        );
    }

    #[test]
    fn test_image_reply_parses_back() {
        let reply = ReplyContent::Image {
            media_id: "media-1".into(),
        };
        let xml = render_reply(&reply, &inbound(), 1).unwrap();
        let parsed = parse_message(&xml).unwrap();
        assert_eq!(parsed.msg_type(), Some("image"));
        match parsed.get("Image") {
            Some(XmlValue::Node(node)) => {
                assert_eq!(node["MediaId"], XmlValue::Text("media-1".into()))
            }
            other => panic!("expected Image node, got {other:?}"),
        }
    }

    #[test]
    fn test_news_reply() {
        let article = Article {
            title: "t".into(),
            description: "d".into(),
            pic_url: "http://p".into(),
            url: "http://u".into(),
        };
        let reply = ReplyContent::News {
            articles: vec![article.clone(), article],
        };
        let parsed = parse_message(&render_reply(&reply, &inbound(), 1).unwrap()).unwrap();
        assert_eq!(parsed.text("ArticleCount"), Some("2"));
        match parsed.get("Articles") {
            Some(XmlValue::Node(node)) => {
                assert!(matches!(&node["item"], XmlValue::List(items) if items.len() == 2))
            }
            other => panic!("expected Articles node, got {other:?}"),
        }
    }

    #[test]
    fn test_news_article_bounds() {
        let empty = ReplyContent::News { articles: vec![] };
        assert!(matches!(
            render_reply(&empty, &inbound(), 1),
            Err(EnvelopeError::InvalidReply(_))
        ));

        let article = Article {
            title: "t".into(),
            description: String::new(),
            pic_url: String::new(),
            url: String::new(),
        };
        let too_many = ReplyContent::News {
            articles: vec![article; MAX_NEWS_ARTICLES + 1],
        };
        assert!(matches!(
            render_reply(&too_many, &inbound(), 1),
            Err(EnvelopeError::InvalidReply(_))
        ));
    }

    #[test]
    fn test_transfer_customer_service() {
        let plain = ReplyContent::TransferCustomerService { kf_account: None };
        let xml = render_reply(&plain, &inbound(), 1).unwrap();
        assert!(xml.contains("<MsgType><![CDATA[transfer_customer_service]]></MsgType>"));
        assert!(!xml.contains("TransInfo"));

        let targeted = ReplyContent::TransferCustomerService {
            kf_account: Some("agent@test".into()),
        };
        let xml = render_reply(&targeted, &inbound(), 1).unwrap();
        assert!(xml.contains("<TransInfo><KfAccount><![CDATA[agent@test]]></KfAccount></TransInfo>"));
    }

    #[test]
    fn test_missing_parties() {
        let msg = parse_message("<xml><MsgType>text</MsgType></xml>").unwrap();
        assert!(matches!(
            render_reply(&ReplyContent::text("x"), &msg, 1),
            Err(EnvelopeError::InvalidReply(_))
        ));
    }

    #[test]
    fn test_reply_content_from_json() {
        let reply: ReplyContent =
            serde_json::from_str(r#"{"type":"video","media_id":"m","title":"t"}"#).unwrap();
        assert_eq!(
            reply,
            ReplyContent::Video {
                media_id: "m".into(),
                title: "t".into(),
                description: String::new(),
            }
        );
    }
}
