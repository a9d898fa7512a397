//! In-memory HTML document model.
//!
//! The live page the client patches, and the freshly fetched page it patches
//! from, are both a [`Document`]: the `<html>` attributes plus the `<head>`
//! and `<body>` element trees.
//!
//! # Modules
//!
//! - `attrs` - Ordered attribute list
//! - `parse` - HTML text to `Document` (via `tl`)
//! - `render` - `Document` back to HTML text
//! - `island` - Discovery of `data-island` components

mod attrs;
mod island;
mod parse;
mod render;

pub use attrs::Attrs;
pub use island::scan_islands;
pub use parse::ParseError;

use thiserror::Error;

use crate::reconcile::{LiveDocument, Root};
use crate::utils::html::{escape, is_valid_attr_name, unescape};

/// Errors raised by DOM mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("invalid attribute name `{0}`")]
    InvalidAttributeName(String),

    #[error("no stylesheet link at index {0}")]
    NoSuchStylesheet(usize),
}

// =============================================================================
// Nodes
// =============================================================================

/// A node in the element tree.
///
/// Text is kept as raw markup (entities still encoded) so that rendering
/// reproduces it byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_attrs(name, Attrs::new())
    }

    pub fn with_attrs(name: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            name: name.into(),
            attrs,
            children: Vec::new(),
        }
    }

    /// Direct child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Decoded text content of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(raw) => out.push_str(&unescape(raw)),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Depth-first search for the first descendant named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.child_elements()
            .find_map(|el| if el.name == name { Some(el) } else { el.find(name) })
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        for node in &mut self.children {
            let Node::Element(el) = node else { continue };
            if el.name == name {
                return Some(el);
            }
            if let Some(found) = el.find_mut(name) {
                return Some(found);
            }
        }
        None
    }

    fn is_stylesheet_link(&self) -> bool {
        self.name == "link"
            && self
                .attrs
                .get("rel")
                .is_some_and(|rel| rel.trim().eq_ignore_ascii_case("stylesheet"))
    }

    fn collect_stylesheets<'a>(&'a self, out: &mut Vec<&'a Element>) {
        for el in self.child_elements() {
            if el.is_stylesheet_link() {
                out.push(el);
            } else {
                el.collect_stylesheets(out);
            }
        }
    }

    fn collect_stylesheets_mut<'a>(&'a mut self, out: &mut Vec<&'a mut Element>) {
        for node in &mut self.children {
            if let Node::Element(el) = node {
                if el.is_stylesheet_link() {
                    out.push(el);
                } else {
                    el.collect_stylesheets_mut(out);
                }
            }
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// A parsed HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    html_attrs: Attrs,
    head: Element,
    body: Element,
}

impl Document {
    pub fn new(html_attrs: Attrs, head: Element, body: Element) -> Self {
        Self {
            html_attrs,
            head,
            body,
        }
    }

    /// Parse an HTML page. Fails if the page has no `<body>`.
    pub fn parse(html: &str) -> Result<Self, ParseError> {
        parse::parse_document(html)
    }

    pub fn html_attrs(&self) -> &Attrs {
        &self.html_attrs
    }

    pub fn head(&self) -> &Element {
        &self.head
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    fn root(&self, root: Root) -> &Attrs {
        match root {
            Root::Html => &self.html_attrs,
            Root::Body => &self.body.attrs,
        }
    }

    fn root_mut(&mut self, root: Root) -> &mut Attrs {
        match root {
            Root::Html => &mut self.html_attrs,
            Root::Body => &mut self.body.attrs,
        }
    }

    /// Document title: text of the first `<title>` in the head, with
    /// whitespace stripped and collapsed. Empty when there is none.
    pub fn title(&self) -> String {
        self.head
            .find("title")
            .map(|title| title.text().split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }

    /// Stylesheet `<link>` elements in document order (head, then body).
    pub fn stylesheets(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.head.collect_stylesheets(&mut out);
        self.body.collect_stylesheets(&mut out);
        out
    }

    fn stylesheets_mut(&mut self) -> Vec<&mut Element> {
        let mut out = Vec::new();
        self.head.collect_stylesheets_mut(&mut out);
        self.body.collect_stylesheets_mut(&mut out);
        out
    }
}

// =============================================================================
// LiveDocument
// =============================================================================

impl LiveDocument for Document {
    fn replace_body(&mut self, children: &[Node]) -> Result<(), DomError> {
        self.body.children = children.to_vec();
        Ok(())
    }

    fn root_attrs(&self, root: Root) -> Attrs {
        self.root(root).clone()
    }

    fn set_root_attr(&mut self, root: Root, name: &str, value: &str) -> Result<(), DomError> {
        if !is_valid_attr_name(name) {
            return Err(DomError::InvalidAttributeName(name.to_string()));
        }
        self.root_mut(root).set(name, value);
        Ok(())
    }

    fn remove_root_attr(&mut self, root: Root, name: &str) -> Result<(), DomError> {
        self.root_mut(root).remove(name);
        Ok(())
    }

    fn title(&self) -> String {
        Document::title(self)
    }

    fn set_title(&mut self, title: &str) -> Result<(), DomError> {
        let text = vec![Node::Text(escape(title).into_owned())];
        match self.head.find_mut("title") {
            Some(el) => el.children = text,
            None => {
                let mut el = Element::new("title");
                el.children = text;
                self.head.children.push(Node::Element(el));
            }
        }
        Ok(())
    }

    fn stylesheet_hrefs(&self) -> Vec<Option<String>> {
        self.stylesheets()
            .into_iter()
            .map(|link| link.attrs.get("href").map(str::to_string))
            .collect()
    }

    fn set_stylesheet_href(&mut self, index: usize, href: &str) -> Result<(), DomError> {
        let mut links = self.stylesheets_mut();
        let link = links
            .get_mut(index)
            .ok_or(DomError::NoSuchStylesheet(index))?;
        link.attrs.set("href", href);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en" class="theme-dark">
<head>
<title>  Getting
  Started </title>
<link rel="stylesheet" href="/static/app.css" />
<link rel="icon" href="/favicon.ico" />
</head>
<body class="docs">
<main><h1>Intro</h1><link rel="stylesheet" href="/static/extra.css" /></main>
</body>
</html>"#;

    #[test]
    fn test_title_collapses_whitespace() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(doc.title(), "Getting Started");
    }

    #[test]
    fn test_stylesheets_in_document_order() {
        let doc = Document::parse(PAGE).unwrap();
        let hrefs = doc.stylesheet_hrefs();
        assert_eq!(
            hrefs,
            vec![
                Some("/static/app.css".to_string()),
                Some("/static/extra.css".to_string())
            ]
        );
    }

    #[test]
    fn test_set_stylesheet_href_out_of_range() {
        let mut doc = Document::parse(PAGE).unwrap();
        assert_eq!(
            doc.set_stylesheet_href(5, "/x.css"),
            Err(DomError::NoSuchStylesheet(5))
        );
    }

    #[test]
    fn test_set_title_creates_missing_element() {
        let mut doc = Document::parse("<html><body><p>hi</p></body></html>").unwrap();
        assert_eq!(doc.title(), "");

        doc.set_title("Fish & Chips").unwrap();
        assert_eq!(doc.title(), "Fish & Chips");
        assert!(doc.render().contains("<title>Fish &amp; Chips</title>"));
    }

    #[test]
    fn test_set_title_replaces_existing() {
        let mut doc =
            Document::parse("<html><head><meta charset=\"utf-8\" /><title>Old</title></head><body></body></html>")
                .unwrap();

        doc.set_title("New").unwrap();
        assert_eq!(doc.title(), "New");
        assert_eq!(doc.render().matches("<title>").count(), 1);
    }

    #[test]
    fn test_set_root_attr_rejects_invalid_name() {
        let mut doc = Document::parse(PAGE).unwrap();
        let err = doc.set_root_attr(Root::Body, "bad name", "x").unwrap_err();
        assert_eq!(err, DomError::InvalidAttributeName("bad name".into()));
        assert_eq!(doc.body().attrs.get("class"), Some("docs"));
    }

    #[test]
    fn test_replace_body_keeps_body_attrs() {
        let mut doc = Document::parse(PAGE).unwrap();
        let fresh = Document::parse("<body class=\"x\"><p>new</p></body>").unwrap();

        doc.replace_body(&fresh.body().children).unwrap();

        assert_eq!(doc.body().text(), "new");
        assert_eq!(doc.body().attrs.get("class"), Some("docs"));
    }
}
