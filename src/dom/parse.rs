//! HTML parsing via `tl`.

use thiserror::Error;

use super::{Attrs, Document, Element, Node};
use crate::utils::html::unescape;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed html: {0}")]
    Html(String),

    #[error("document has no <body>")]
    MissingBody,
}

/// Parse a full page into a `Document`.
///
/// Nodes outside `<head>` and `<body>` are dropped. A page without `<html>`
/// is accepted as long as `<body>` appears at the top level.
pub(super) fn parse_document(html: &str) -> Result<Document, ParseError> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|e| ParseError::Html(format!("{e:?}")))?;
    let parser = dom.parser();

    let mut top: Vec<Element> = dom
        .children()
        .iter()
        .filter_map(|handle| convert(*handle, parser))
        .filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
        .collect();

    let (html_attrs, sections) = match top.iter().position(|el| el.name == "html") {
        Some(pos) => {
            let html = top.swap_remove(pos);
            let sections = html
                .children
                .into_iter()
                .filter_map(|node| match node {
                    Node::Element(el) => Some(el),
                    Node::Text(_) => None,
                })
                .collect();
            (html.attrs, sections)
        }
        None => (Attrs::new(), top),
    };

    let mut head = None;
    let mut body = None;
    for el in sections {
        match el.name.as_str() {
            "head" if head.is_none() => head = Some(el),
            "body" if body.is_none() => body = Some(el),
            _ => {}
        }
    }

    let body = body.ok_or(ParseError::MissingBody)?;
    let head = head.unwrap_or_else(|| Element::new("head"));
    Ok(Document::new(html_attrs, head, body))
}

/// Convert a tl node handle into our tree. Comments are dropped.
fn convert(handle: tl::NodeHandle, parser: &tl::Parser) -> Option<Node> {
    let node = handle.get(parser)?;

    match node {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_lowercase();

            let mut attrs = Attrs::new();
            for (key, value) in tag.attributes().iter() {
                let key: &str = key.as_ref();
                let value = value.map(|v| unescape(&v).into_owned()).unwrap_or_default();
                attrs.set(key.to_ascii_lowercase(), value);
            }

            let mut el = Element::with_attrs(name, attrs);
            for child in tag.children().top().iter() {
                if let Some(node) = convert(*child, parser) {
                    el.children.push(node);
                }
            }
            Some(Node::Element(el))
        }
        tl::Node::Raw(bytes) => Some(Node::Text(bytes.as_utf8_str().into_owned())),
        tl::Node::Comment(_) => None,
    }
}
