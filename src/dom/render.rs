//! Serialize a `Document` back to HTML.

use std::fmt::Write;

use super::{Attrs, Document, Element, Node};
use crate::utils::html::{escape_attr, is_void_element};

impl Document {
    /// Render the page as HTML text.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str("<!DOCTYPE html>\n<html");
        write_attrs(&mut out, self.html_attrs());
        out.push('>');
        write_element(&mut out, self.head());
        write_element(&mut out, self.body());
        out.push_str("</html>\n");
        out
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    write_attrs(out, &el.attrs);
    out.push('>');

    if is_void_element(&el.name) {
        return;
    }

    for child in &el.children {
        match child {
            Node::Element(child) => write_element(out, child),
            Node::Text(raw) => out.push_str(raw),
        }
    }

    let _ = write!(out, "</{}>", el.name);
}

fn write_attrs(out: &mut String, attrs: &Attrs) {
    for (name, value) in attrs.iter() {
        if value.is_empty() {
            let _ = write!(out, " {name}");
        } else {
            let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
        }
    }
}
