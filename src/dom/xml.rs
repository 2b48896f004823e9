//! Build [`DomNode`] trees from XML element fragments.
//!
//! Elements with child elements become nodes; elements holding only text become fields named by
//! their local name. Attributes, comments and processing instructions carry no descriptor data and
//! are skipped.

use crate::dom::model::{DomNode, FieldValue};
use crate::foundation::error::{ImfError, ImfResult};
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;

struct Frame {
    node: DomNode,
    text: String,
    has_elements: bool,
}

impl Frame {
    fn new(local_name: String, namespace: String) -> Self {
        Self {
            node: DomNode::new(local_name, namespace),
            text: String::new(),
            has_elements: false,
        }
    }
}

/// Parse a single-rooted XML fragment into a normalized tree.
#[tracing::instrument(skip(xml), fields(len = xml.len()))]
pub fn dom_from_xml(xml: &str) -> ImfResult<DomNode> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<DomNode> = None;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| ImfError::xml(e.to_string()))?;
        match event {
            Event::Start(e) => {
                if root.is_some() {
                    return Err(ImfError::xml("fragment has more than one root element"));
                }
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.has_elements = true;
                }
                stack.push(Frame::new(name, namespace_of(&ns)));
            }
            Event::Empty(e) => {
                if root.is_some() {
                    return Err(ImfError::xml("fragment has more than one root element"));
                }
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match stack.last_mut() {
                    Some(parent) => {
                        parent.has_elements = true;
                        parent.node.add_field(name, FieldValue::text(""));
                    }
                    None => root = Some(DomNode::new(name, namespace_of(&ns))),
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| ImfError::xml("unbalanced end tag"))?;
                match stack.last_mut() {
                    Some(parent) if frame.has_elements => parent.node.add_child(frame.node),
                    Some(parent) => parent
                        .node
                        .add_field(frame.node.local_name(), FieldValue::parse(&frame.text)),
                    None => root = Some(frame.node),
                }
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| ImfError::xml(e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ImfError::xml("unexpected end of fragment"));
    }
    root.ok_or_else(|| ImfError::xml("fragment has no root element"))
}

fn namespace_of(ns: &ResolveResult<'_>) -> String {
    match ns {
        ResolveResult::Bound(n) => String::from_utf8_lossy(n.as_ref()).into_owned(),
        _ => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dom/xml.rs"]
mod tests;
