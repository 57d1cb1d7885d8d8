//! html5ever TreeSink implementation building a reference-counted DOM.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, QualName};

/// Reference to a node in the tree.
pub type Handle = Rc<Node>;

/// Node type in the DOM.
#[derive(Debug)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Document type declaration. Never serialized.
    Doctype,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: RefCell<Vec<Attribute>>,
    },
    /// Text content, with character references already decoded.
    Text(RefCell<String>),
    /// Comment. Kept for tree-building, dropped on output.
    Comment,
    /// Processing instruction. Dropped on output.
    ProcessingInstruction,
}

/// A node in the DOM.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: RefCell<Option<Weak<Node>>>,
    pub children: RefCell<Vec<Handle>>,
}

impl Node {
    fn new(data: NodeData) -> Handle {
        Rc::new(Node {
            data,
            parent: RefCell::new(None),
            children: RefCell::new(Vec::new()),
        })
    }

    /// Local name if this is an element.
    pub fn element_name(&self) -> Option<&QualName> {
        match &self.data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    fn parent_node(&self) -> Option<Handle> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }
}

/// Detach `target` from its parent, returning the parent and old index.
fn detach(target: &Handle) -> Option<(Handle, usize)> {
    let parent = target.parent_node()?;
    *target.parent.borrow_mut() = None;
    let mut children = parent.children.borrow_mut();
    let index = children.iter().position(|c| Rc::ptr_eq(c, target))?;
    children.remove(index);
    drop(children);
    Some((parent, index))
}

fn append_node(parent: &Handle, child: Handle) {
    detach(&child);
    *child.parent.borrow_mut() = Some(Rc::downgrade(parent));
    parent.children.borrow_mut().push(child);
}

fn insert_node(parent: &Handle, index: usize, child: Handle) {
    detach(&child);
    *child.parent.borrow_mut() = Some(Rc::downgrade(parent));
    parent.children.borrow_mut().insert(index, child);
}

/// Append text to `parent`, merging with a trailing text node.
fn append_text(parent: &Handle, text: &str) {
    if let Some(last) = parent.children.borrow().last()
        && let NodeData::Text(contents) = &last.data
    {
        contents.borrow_mut().push_str(text);
        return;
    }
    append_node(parent, Node::new(NodeData::Text(RefCell::new(text.to_string()))));
}

/// TreeSink implementation that builds an `Rc` DOM.
///
/// Handles are `Rc<Node>` and element names are never mutated, so
/// `elem_name` can borrow straight from the handle.
pub struct DomSink {
    document: Handle,
}

impl Default for DomSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DomSink {
    pub fn new() -> Self {
        Self {
            document: Node::new(NodeData::Document),
        }
    }
}

impl TreeSink for DomSink {
    type Handle = Handle;
    type Output = Handle;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        // Scraped HTML is rarely valid; recover like a browser.
    }

    fn get_document(&self) -> Self::Handle {
        self.document.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        target.element_name().unwrap_or(&EMPTY)
    }

    fn create_element(&self, name: QualName, attrs: Vec<Attribute>, _flags: ElementFlags) -> Self::Handle {
        Node::new(NodeData::Element {
            name,
            attrs: RefCell::new(attrs),
        })
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        Node::new(NodeData::Comment)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        Node::new(NodeData::ProcessingInstruction)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => append_node(parent, node),
            NodeOrText::AppendText(text) => append_text(parent, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if element.parent_node().is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(&self, _name: StrTendril, _public_id: StrTendril, _system_id: StrTendril) {
        append_node(&self.document, Node::new(NodeData::Doctype));
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        // Template contents live directly under the template element.
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let Some(parent) = sibling.parent_node() else {
            return;
        };
        let Some(index) = parent
            .children
            .borrow()
            .iter()
            .position(|c| Rc::ptr_eq(c, sibling))
        else {
            return;
        };

        match new_node {
            NodeOrText::AppendNode(node) => insert_node(&parent, index, node),
            NodeOrText::AppendText(text) => {
                if index > 0
                    && let NodeData::Text(contents) = &parent.children.borrow()[index - 1].data
                {
                    contents.borrow_mut().push_str(&text);
                    return;
                }
                let node = Node::new(NodeData::Text(RefCell::new(text.to_string())));
                insert_node(&parent, index, node);
            }
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        if let NodeData::Element { attrs: existing, .. } = &target.data {
            let mut existing = existing.borrow_mut();
            for attr in attrs {
                if !existing.iter().any(|a| a.name == attr.name) {
                    existing.push(attr);
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        detach(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children = std::mem::take(&mut *node.children.borrow_mut());
        for child in children {
            *child.parent.borrow_mut() = None;
            append_node(new_parent, child);
        }
    }
}

/// Parse a complete HTML document.
pub fn parse_html(html: &str) -> Handle {
    parse_document(DomSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
}

/// Find the first element with the given local name, depth first.
pub(crate) fn find_first_element(handle: &Handle, name: &str) -> Option<Handle> {
    if handle
        .element_name()
        .is_some_and(|qname| qname.local.as_ref() == name)
    {
        return Some(handle.clone());
    }

    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_first_element(child, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(handle: &Handle) -> String {
        match &handle.data {
            NodeData::Text(contents) => contents.borrow().clone(),
            _ => handle.children.borrow().iter().map(text_of).collect(),
        }
    }

    #[test]
    fn test_basic_parse() {
        let document = parse_html("<html><body><p>Hello</p></body></html>");
        let p = find_first_element(&document, "p").expect("should find p");
        assert_eq!(text_of(&p), "Hello");
        assert!(p.parent_node().is_some_and(|b| b.element_name().is_some_and(|n| n.local.as_ref() == "body")));
    }

    #[test]
    fn test_entities_are_decoded() {
        let document = parse_html("<body><p>a&nbsp;b &amp; c</p></body>");
        let p = find_first_element(&document, "p").unwrap();
        assert_eq!(text_of(&p), "a\u{a0}b & c");
    }

    #[test]
    fn test_unclosed_paragraphs_are_split() {
        let document = parse_html("<body><p>one<p>two</body>");
        let body = find_first_element(&document, "body").unwrap();
        let paragraphs = body
            .children
            .borrow()
            .iter()
            .filter(|c| c.element_name().is_some_and(|n| n.local.as_ref() == "p"))
            .count();
        assert_eq!(paragraphs, 2);
    }

    #[test]
    fn test_misnested_formatting_is_repaired() {
        // Adoption agency: the <b> is reopened inside the second paragraph.
        let document = parse_html("<body><p><b>bold</p><p>still</b></p></body>");
        let body = find_first_element(&document, "body").unwrap();
        assert_eq!(text_of(&body), "boldstill");
        assert!(find_first_element(&body, "b").is_some());
    }

    #[test]
    fn test_foster_parented_text() {
        // Text inside a table but outside a cell is moved before the table.
        let document = parse_html("<body><table>stray<tr><td>cell</td></tr></table></body>");
        let body = find_first_element(&document, "body").unwrap();
        let first = body.children.borrow()[0].clone();
        assert_eq!(text_of(&first), "stray");
    }
}
