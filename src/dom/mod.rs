//! HTML fragment handling.
//!
//! Scraped chapter bodies are tag soup: unclosed paragraphs, `<br>`, named
//! entities. This module parses them with html5ever into a small DOM and writes
//! them back out as well-formed XHTML for the content documents.

mod tree_sink;
mod xhtml;

pub use tree_sink::{DomSink, Handle, Node, NodeData, parse_html};
pub use xhtml::fragment_to_xhtml;
