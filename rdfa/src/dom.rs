//! The document tree boundary the RDFa walker evaluates over.
//!
//! The walker never parses markup itself. It consumes any tree exposing
//! these accessors: handles are cheap copyable ids, attribute mutation
//! exists only so XML-literal serialization can propagate namespace
//! declarations into the captured subtree.

use std::fmt::Write;

/// An abstract document tree.
pub trait Document {
    /// A cheap identifier for one node of the tree.
    type Handle: Copy + PartialEq;

    /// The document's root element.
    fn root(&self) -> Self::Handle;

    fn is_element(&self, node: Self::Handle) -> bool;

    fn is_text(&self, node: Self::Handle) -> bool;

    /// Whether `node` is the document's root element.
    fn is_root(&self, node: Self::Handle) -> bool;

    /// The tag name of an element node, lowercased.
    fn element_name(&self, node: Self::Handle) -> String;

    fn attribute(&self, node: Self::Handle, name: &str) -> Option<String>;

    fn has_attribute(&self, node: Self::Handle, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// All attributes of an element in document order.
    fn attributes(&self, node: Self::Handle) -> Vec<(String, String)>;

    /// Sets (or replaces) an attribute. Only used while serializing XML
    /// literals.
    fn set_attribute(&mut self, node: Self::Handle, name: &str, value: &str);

    fn children(&self, node: Self::Handle) -> Vec<Self::Handle>;

    fn has_children(&self, node: Self::Handle) -> bool {
        !self.children(node).is_empty()
    }

    /// The content of a text node, or the concatenated text content of an
    /// element's descendants.
    fn inner_text(&self, node: Self::Handle) -> String;

    /// The serialized markup of the element's children.
    fn inner_markup(&self, node: Self::Handle) -> String;
}

/// A minimal in-memory [`Document`] for tests and standalone use.
///
/// ```
/// use tern_rdfa::dom::{Document, SimpleTree};
///
/// let mut tree = SimpleTree::new("html");
/// let body = tree.append_element(tree.root(), "body");
/// tree.append_text(body, "hi");
/// assert_eq!("hi", tree.inner_text(body));
/// ```
pub struct SimpleTree {
    nodes: Vec<TreeNode>,
}

enum TreeNode {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<usize>,
    },
    Text(String),
}

impl SimpleTree {
    /// Builds a tree holding a single root element.
    pub fn new(root_name: &str) -> Self {
        Self {
            nodes: vec![TreeNode::Element {
                name: root_name.to_ascii_lowercase(),
                attributes: Vec::new(),
                children: Vec::new(),
            }],
        }
    }

    /// Appends a child element under `parent`, returning its handle.
    pub fn append_element(&mut self, parent: usize, name: &str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::Element {
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        });
        self.push_child(parent, id);
        id
    }

    /// Appends a text node under `parent`, returning its handle.
    pub fn append_text(&mut self, parent: usize, text: &str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::Text(text.to_owned()));
        self.push_child(parent, id);
        id
    }

    fn push_child(&mut self, parent: usize, child: usize) {
        if let TreeNode::Element { children, .. } = &mut self.nodes[parent] {
            children.push(child);
        }
    }

    fn write_markup(&self, node: usize, out: &mut String) {
        match &self.nodes[node] {
            TreeNode::Text(text) => out.push_str(text),
            TreeNode::Element {
                name,
                attributes,
                children,
            } => {
                let _ = write!(out, "<{}", name);
                for (attr, value) in attributes {
                    let _ = write!(out, " {}=\"{}\"", attr, escape_attribute(value));
                }
                if children.is_empty() {
                    out.push_str(" />");
                } else {
                    out.push('>');
                    for child in children {
                        self.write_markup(*child, out);
                    }
                    let _ = write!(out, "</{}>", name);
                }
            }
        }
    }
}

impl Document for SimpleTree {
    type Handle = usize;

    fn root(&self) -> usize {
        0
    }

    fn is_element(&self, node: usize) -> bool {
        matches!(self.nodes[node], TreeNode::Element { .. })
    }

    fn is_text(&self, node: usize) -> bool {
        matches!(self.nodes[node], TreeNode::Text(_))
    }

    fn is_root(&self, node: usize) -> bool {
        node == 0
    }

    fn element_name(&self, node: usize) -> String {
        match &self.nodes[node] {
            TreeNode::Element { name, .. } => name.clone(),
            TreeNode::Text(_) => String::new(),
        }
    }

    fn attribute(&self, node: usize, name: &str) -> Option<String> {
        match &self.nodes[node] {
            TreeNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(attr, _)| attr == name)
                .map(|(_, value)| value.clone()),
            TreeNode::Text(_) => None,
        }
    }

    fn attributes(&self, node: usize) -> Vec<(String, String)> {
        match &self.nodes[node] {
            TreeNode::Element { attributes, .. } => attributes.clone(),
            TreeNode::Text(_) => Vec::new(),
        }
    }

    fn set_attribute(&mut self, node: usize, name: &str, value: &str) {
        if let TreeNode::Element { attributes, .. } = &mut self.nodes[node] {
            match attributes.iter_mut().find(|(attr, _)| attr == name) {
                Some((_, existing)) => *existing = value.to_owned(),
                None => attributes.push((name.to_owned(), value.to_owned())),
            }
        }
    }

    fn children(&self, node: usize) -> Vec<usize> {
        match &self.nodes[node] {
            TreeNode::Element { children, .. } => children.clone(),
            TreeNode::Text(_) => Vec::new(),
        }
    }

    fn inner_text(&self, node: usize) -> String {
        match &self.nodes[node] {
            TreeNode::Text(text) => text.clone(),
            TreeNode::Element { children, .. } => {
                let mut out = String::new();
                for child in children {
                    out.push_str(&self.inner_text(*child));
                }
                out
            }
        }
    }

    fn inner_markup(&self, node: usize) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_markup(child, &mut out);
        }
        out
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_serialization() {
        let mut tree = SimpleTree::new("div");
        let span = tree.append_element(tree.root(), "span");
        tree.set_attribute(span, "class", "a\"b");
        tree.append_text(span, "text");
        tree.append_element(tree.root(), "br");
        assert_eq!(
            "<span class=\"a&quot;b\">text</span><br />",
            tree.inner_markup(tree.root())
        );
    }

    #[test]
    fn inner_text_concatenates_descendants() {
        let mut tree = SimpleTree::new("p");
        tree.append_text(tree.root(), "a");
        let b = tree.append_element(tree.root(), "b");
        tree.append_text(b, "c");
        tree.append_text(tree.root(), "d");
        assert_eq!("acd", tree.inner_text(tree.root()));
    }
}
