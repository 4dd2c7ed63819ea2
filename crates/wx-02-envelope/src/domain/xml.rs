//! # XML Tree
//!
//! The platform's payloads are flat-ish XML documents: one root element whose
//! children hold either text (often CDATA) or further elements. This module
//! turns such a document into nested field maps.

use crate::domain::errors::EnvelopeError;
use crate::domain::message::XmlValue;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;

/// One open element while walking the document.
struct Frame {
    name: String,
    text: String,
    children: BTreeMap<String, XmlValue>,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            children: BTreeMap::new(),
        }
    }

    fn into_value(self) -> (String, XmlValue) {
        let value = if self.children.is_empty() {
            XmlValue::Text(self.text)
        } else {
            XmlValue::Node(self.children)
        };
        (self.name, value)
    }
}

/// Insert `value` under `name`, turning repeated names into a list.
fn insert_child(children: &mut BTreeMap<String, XmlValue>, name: String, value: XmlValue) {
    match children.remove(&name) {
        None => {
            children.insert(name, value);
        }
        Some(XmlValue::List(mut items)) => {
            items.push(value);
            children.insert(name, XmlValue::List(items));
        }
        Some(existing) => {
            children.insert(name, XmlValue::List(vec![existing, value]));
        }
    }
}

fn element_name(raw: &[u8]) -> Result<String, EnvelopeError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| EnvelopeError::Parse(format!("element name is not UTF-8: {}", e)))
}

/// Parse `xml` and return the root element's name and children.
///
/// # Errors
///
/// Returns `EnvelopeError::Parse` for malformed XML, an empty document,
/// or more than one root element.
pub fn parse_document(xml: &str) -> Result<(String, BTreeMap<String, XmlValue>), EnvelopeError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, BTreeMap<String, XmlValue>)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            EnvelopeError::Parse(format!(
                "malformed XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(EnvelopeError::Parse("multiple root elements".into()));
                }
                stack.push(Frame::new(element_name(start.name().as_ref())?));
            }
            Event::Empty(empty) => {
                let name = element_name(empty.name().as_ref())?;
                match stack.last_mut() {
                    Some(parent) => {
                        insert_child(&mut parent.children, name, XmlValue::Text(String::new()))
                    }
                    None if root.is_none() => root = Some((name, BTreeMap::new())),
                    None => return Err(EnvelopeError::Parse("multiple root elements".into())),
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| EnvelopeError::Parse(format!("bad text content: {}", e)))?;
                    frame.text.push_str(&unescaped);
                }
            }
            Event::CData(cdata) => {
                if let Some(frame) = stack.last_mut() {
                    let content = String::from_utf8(cdata.into_inner().into_owned())
                        .map_err(|e| EnvelopeError::Parse(format!("CDATA is not UTF-8: {}", e)))?;
                    frame.text.push_str(&content);
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| EnvelopeError::Parse("unbalanced end tag".into()))?;
                let (name, value) = frame.into_value();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => {
                        let children = match value {
                            XmlValue::Node(children) => children,
                            _ => BTreeMap::new(),
                        };
                        root = Some((name, children));
                    }
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(EnvelopeError::Parse("unexpected end of document".into()));
    }
    root.ok_or_else(|| EnvelopeError::Parse("empty document".into()))
}

/// Wrap `text` in a CDATA section.
///
/// A literal `]]>` is split across two sections so it cannot close the
/// section early.
pub fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}
