//! XHTML serialization of parsed fragments.

use std::borrow::Cow;

use html5ever::{Namespace, ns};
use quick_xml::escape::{escape, partial_escape};

use super::tree_sink::{Handle, NodeData, find_first_element, parse_html};

/// HTML elements that never have content and must be self-closed in XHTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Rewrite an HTML body fragment as well-formed XHTML.
///
/// Character references are decoded to characters, void elements are
/// self-closed, unclosed tags are closed, and comments are dropped. Elements
/// and attributes whose names are not valid XML are unwrapped or skipped.
pub fn fragment_to_xhtml(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let wrapped = format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>");
    let document = parse_html(&wrapped);
    let Some(body) = find_first_element(&document, "body") else {
        return String::new();
    };

    let mut out = String::with_capacity(html.len() + html.len() / 8);
    for child in body.children.borrow().iter() {
        write_node(&mut out, child, &ns!(html));
    }
    out
}

fn write_node(out: &mut String, node: &Handle, parent_ns: &Namespace) {
    match &node.data {
        NodeData::Text(contents) => {
            out.push_str(&partial_escape(xml_chars(&contents.borrow())));
        }
        NodeData::Element { name, attrs } => {
            let local: &str = name.local.as_ref();
            if !is_xml_name(local) {
                for child in node.children.borrow().iter() {
                    write_node(out, child, parent_ns);
                }
                return;
            }

            out.push('<');
            out.push_str(local);
            if name.ns != *parent_ns {
                let ns: &str = name.ns.as_ref();
                out.push_str(&format!(" xmlns=\"{}\"", escape(ns)));
                if name.ns != ns!(html) {
                    out.push_str(" xmlns:xlink=\"http://www.w3.org/1999/xlink\"");
                }
            }
            for attr in attrs.borrow().iter() {
                let attr_local: &str = attr.name.local.as_ref();
                if attr.name.ns == ns!(xmlns) || attr_local == "xmlns" || !is_xml_name(attr_local) {
                    continue;
                }
                let prefix = if attr.name.ns == ns!(xlink) {
                    "xlink:"
                } else if attr.name.ns == ns!(xml) {
                    "xml:"
                } else {
                    ""
                };
                out.push_str(&format!(
                    " {prefix}{attr_local}=\"{}\"",
                    escape(xml_chars(&attr.value))
                ));
            }

            if name.ns == ns!(html) && VOID_ELEMENTS.contains(&local) {
                out.push_str("/>");
                return;
            }

            out.push('>');
            for child in node.children.borrow().iter() {
                write_node(out, child, &name.ns);
            }
            out.push_str("</");
            out.push_str(local);
            out.push('>');
        }
        NodeData::Document
        | NodeData::Doctype
        | NodeData::Comment
        | NodeData::ProcessingInstruction => {}
    }
}

/// Whether `name` can be written as an unprefixed XML name.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Drop characters that XML 1.0 does not allow.
fn xml_chars(s: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
    }

    if s.chars().all(allowed) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|&c| allowed(c)).collect())
    }
}
