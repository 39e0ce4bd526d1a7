//! Arena-based XML document tree.
//!
//! This module implements the tree representation using arena allocation
//! with typed indices. All nodes live in a contiguous `Vec<NodeData>` owned
//! by the [`Document`], and are referenced by [`NodeId`], a newtype over
//! `NonZeroU32`.
//!
//! Parent links are plain arena indices, so the logically cyclic structure
//! (children point back at parents) involves no reference counting and no
//! ownership cycle: each element exclusively owns its children through the
//! arena, and the parent link is a non-owning back-reference. Dropping the
//! `Document` frees everything at once.
//!
//! The tree is built by the parser during a single pass and is immutable
//! afterwards: all mutation methods are crate-private.

mod json;
mod node;

pub use node::NodeKind;

use std::num::NonZeroU32;

use crate::error::ParseError;
use crate::parser::ParseOptions;

/// A typed index into the document's node arena.
///
/// `NodeId` is a newtype over `NonZeroU32`, meaning it can never be zero
/// and `Option<NodeId>` has the same size as `NodeId` (niche optimization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Creates a `NodeId` from a raw index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is 0.
    #[allow(clippy::expect_used, clippy::cast_possible_truncation)]
    fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new(index as u32).expect("NodeId index must be non-zero"))
    }

    /// Returns the raw index as a `usize` for indexing into the arena.
    fn as_index(self) -> usize {
        self.0.get() as usize
    }
}

/// Storage for a single node in the document arena.
///
/// Each node stores its kind (element, text, comment, etc.) and links to
/// parent, children, and siblings for tree navigation. Access individual
/// nodes via [`Document::node`].
#[derive(Debug, Clone)]
pub struct NodeData {
    /// What kind of node this is (element, text, comment, etc.) and its payload.
    pub kind: NodeKind,
    /// Parent node, if any. The document node has no parent.
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node (for O(1) append).
    pub last_child: Option<NodeId>,
    /// Next sibling.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling.
    pub prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// An XML attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name exactly as written (qualified names unsplit).
    pub name: String,
    /// The attribute value with references expanded, line endings
    /// normalized, and literal tab/LF/CR replaced by spaces.
    pub value: String,
}

/// An XML document.
///
/// The `Document` owns all nodes in an arena and provides methods for
/// tree navigation and the JSON projection. Construction happens only
/// through parsing.
///
/// # Examples
///
/// ```
/// use xylem::Document;
///
/// let doc = Document::parse_str("<root/>").unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(doc.node_name(root), Some("root"));
/// ```
#[derive(Debug)]
pub struct Document {
    /// The node arena. Index 0 is unused (placeholder for `NonZeroU32`).
    nodes: Vec<NodeData>,
    /// The document node id (not the root element).
    root: NodeId,
    /// XML version from the XML declaration (e.g., "1.0").
    pub version: Option<String>,
    /// Encoding from the XML declaration (always a spelling of UTF-8).
    pub encoding: Option<String>,
    /// Standalone flag from the XML declaration.
    pub standalone: Option<bool>,
}

impl Document {
    /// Creates a new empty document containing only the document node.
    pub(crate) fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        // Index 0: placeholder (NodeId uses NonZeroU32)
        nodes.push(NodeData::new(NodeKind::Document));
        // Index 1: the document node
        nodes.push(NodeData::new(NodeKind::Document));
        let root = NodeId::from_index(1);
        Self {
            nodes,
            root,
            version: None,
            encoding: None,
            standalone: None,
        }
    }

    /// Parses an XML string into a `Document` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the input is not well-formed XML.
    ///
    /// # Examples
    ///
    /// ```
    /// use xylem::Document;
    ///
    /// let doc = Document::parse_str("<root><child/></root>").unwrap();
    /// ```
    pub fn parse_str(input: &str) -> Result<Self, ParseError> {
        crate::parser::parse_str(input)
    }

    /// Parses an XML string into a `Document` with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the input is not well-formed XML.
    pub fn parse_str_with_options(
        input: &str,
        options: &ParseOptions,
    ) -> Result<Self, ParseError> {
        crate::parser::parse_str_with_options(input, options)
    }

    /// Returns the document node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the root element of the document.
    ///
    /// Every successfully parsed document has exactly one.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .find(|&id| matches!(self.node(id).kind, NodeKind::Element { .. }))
    }

    /// Returns `true` if `id` is the document's root element.
    #[must_use]
    pub fn is_root_element(&self, id: NodeId) -> bool {
        self.root_element() == Some(id)
    }

    /// Returns a reference to the [`NodeData`] for the given node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a valid node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    /// Returns a mutable reference to the `NodeData` for the given node.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    /// Returns the name of a node, if applicable.
    ///
    /// Elements have names and PIs have targets; text, comments, CDATA,
    /// and the document node return `None`.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { name, .. }
            | NodeKind::ProcessingInstruction { target: name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the text content of a text, CDATA, comment, or PI node.
    ///
    /// For element nodes, returns `None`; use
    /// [`text_content`](Document::text_content) to get the concatenated
    /// text of all descendant text nodes.
    #[must_use]
    pub fn node_text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text { content }
            | NodeKind::CData { content }
            | NodeKind::Comment { content }
            | NodeKind::ProcessingInstruction { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Returns the concatenated text of a node and all its descendants.
    ///
    /// Only `Text` and `CData` nodes contribute; comments and PIs do not.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &mut result);
        result
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text { content } | NodeKind::CData { content } => {
                buf.push_str(content);
            }
            _ => {
                for child in self.children(id) {
                    self.collect_text(child, buf);
                }
            }
        }
    }

    /// Returns the attributes of an element node, in document order.
    ///
    /// Returns an empty slice for non-element nodes.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.node(id).kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Returns the value of an attribute by name on an element node.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    // --- Navigation ---

    /// Returns the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Returns the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    /// Returns the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    /// Returns the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Returns the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Returns an iterator over the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.node(id).first_child,
        }
    }

    /// Returns an iterator over a node and its ancestors (walking up to
    /// the document node).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: Some(id),
        }
    }

    /// Returns an iterator over all descendants of a node (depth-first).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Returns the total number of nodes in the document.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1 // subtract placeholder at index 0
    }

    // --- Mutation (parser-only) ---

    /// Allocates a new node in the arena and returns its `NodeId`.
    pub(crate) fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(NodeData::new(kind));
        NodeId::from_index(index)
    }

    /// Appends a child node to the end of a parent's child list.
    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.node(child).parent.is_none(),
            "child already has a parent"
        );

        self.node_mut(child).parent = Some(parent);

        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
            self.node_mut(parent).last_child = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
            self.node_mut(parent).last_child = Some(child);
        }
    }

    /// Appends character data under `parent`, coalescing with a trailing
    /// `Text` sibling so no two adjacent children are both plain text.
    pub(crate) fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(last) = self.node(parent).last_child {
            if let NodeKind::Text { content } = &mut self.node_mut(last).kind {
                content.push_str(text);
                return;
            }
        }
        let id = self.create_node(NodeKind::Text {
            content: text.to_string(),
        });
        self.append_child(parent, id);
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over a node and its ancestors.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).parent;
        Some(current)
    }
}

/// Depth-first iterator over all descendants of a node.
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        // Try to go deeper first
        if let Some(child) = self.doc.first_child(current) {
            self.next = Some(child);
            return Some(current);
        }

        // Try next sibling
        if let Some(sibling) = self.doc.next_sibling(current) {
            self.next = Some(sibling);
            return Some(current);
        }

        // Walk up to find an ancestor with a next sibling
        let mut ancestor = self.doc.parent(current);
        while let Some(anc) = ancestor {
            if anc == self.root {
                self.next = None;
                return Some(current);
            }
            if let Some(sibling) = self.doc.next_sibling(anc) {
                self.next = Some(sibling);
                return Some(current);
            }
            ancestor = self.doc.parent(anc);
        }

        self.next = None;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(doc: &mut Document, s: &str) -> NodeId {
        doc.create_node(NodeKind::Text {
            content: s.to_string(),
        })
    }

    fn element(doc: &mut Document, name: &str) -> NodeId {
        doc.create_node(NodeKind::Element {
            name: name.to_string(),
            attributes: vec![],
        })
    }

    #[test]
    fn test_new_document_has_document_node() {
        let doc = Document::new();
        assert!(matches!(doc.node(doc.root()).kind, NodeKind::Document));
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_create_and_append_element() {
        let mut doc = Document::new();
        let root = doc.root();
        let elem = element(&mut doc, "div");
        doc.append_child(root, elem);

        assert_eq!(doc.first_child(root), Some(elem));
        assert_eq!(doc.last_child(root), Some(elem));
        assert_eq!(doc.parent(elem), Some(root));
        assert_eq!(doc.node_name(elem), Some("div"));
    }

    #[test]
    fn test_append_multiple_children() {
        let mut doc = Document::new();
        let root = doc.root();

        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        let c = element(&mut doc, "c");

        doc.append_child(root, a);
        doc.append_child(root, b);
        doc.append_child(root, c);

        assert_eq!(doc.first_child(root), Some(a));
        assert_eq!(doc.last_child(root), Some(c));
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.next_sibling(b), Some(c));
        assert_eq!(doc.next_sibling(c), None);
        assert_eq!(doc.prev_sibling(c), Some(b));
        assert_eq!(doc.prev_sibling(b), Some(a));
        assert_eq!(doc.prev_sibling(a), None);
    }

    #[test]
    fn test_children_iterator() {
        let mut doc = Document::new();
        let root = doc.root();

        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        doc.append_child(root, a);
        doc.append_child(root, b);

        let children: Vec<NodeId> = doc.children(root).collect();
        assert_eq!(children, vec![a, b]);
    }

    #[test]
    fn test_children_iterator_empty() {
        let doc = Document::new();
        let children: Vec<NodeId> = doc.children(doc.root()).collect();
        assert!(children.is_empty());
    }

    #[test]
    fn test_append_text_coalesces() {
        let mut doc = Document::new();
        let root = doc.root();
        let elem = element(&mut doc, "p");
        doc.append_child(root, elem);

        doc.append_text(elem, "Hello, ");
        doc.append_text(elem, "world");

        let children: Vec<NodeId> = doc.children(elem).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(doc.node_text(children[0]), Some("Hello, world"));
    }

    #[test]
    fn test_append_text_does_not_merge_across_elements() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = element(&mut doc, "p");
        doc.append_child(root, p);

        doc.append_text(p, "a");
        let b = element(&mut doc, "b");
        doc.append_child(p, b);
        doc.append_text(p, "c");

        let children: Vec<NodeId> = doc.children(p).collect();
        assert_eq!(children.len(), 3);
        assert_eq!(doc.node_text(children[0]), Some("a"));
        assert_eq!(doc.node_text(children[2]), Some("c"));
    }

    #[test]
    fn test_append_text_does_not_merge_into_cdata() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = element(&mut doc, "p");
        doc.append_child(root, p);

        let cd = doc.create_node(NodeKind::CData {
            content: "raw".to_string(),
        });
        doc.append_child(p, cd);
        doc.append_text(p, "tail");

        let children: Vec<NodeId> = doc.children(p).collect();
        assert_eq!(children.len(), 2);
        assert!(matches!(doc.node(children[0]).kind, NodeKind::CData { .. }));
        assert!(matches!(doc.node(children[1]).kind, NodeKind::Text { .. }));
    }

    #[test]
    fn test_ancestors_iterator() {
        let mut doc = Document::new();
        let root = doc.root();

        let parent = element(&mut doc, "parent");
        let child = element(&mut doc, "child");
        doc.append_child(root, parent);
        doc.append_child(parent, child);

        let ancestors: Vec<NodeId> = doc.ancestors(child).collect();
        assert_eq!(ancestors, vec![child, parent, root]);
    }

    #[test]
    fn test_descendants_iterator() {
        let mut doc = Document::new();
        let root = doc.root();

        let p = element(&mut doc, "p");
        let a = text(&mut doc, "hello ");
        let b = element(&mut doc, "b");
        let b_text = text(&mut doc, "world");

        doc.append_child(root, p);
        doc.append_child(p, a);
        doc.append_child(p, b);
        doc.append_child(b, b_text);

        let desc: Vec<NodeId> = doc.descendants(root).collect();
        assert_eq!(desc, vec![p, a, b, b_text]);
    }

    #[test]
    fn test_text_content_skips_comments() {
        let mut doc = Document::new();
        let root = doc.root();

        let p = element(&mut doc, "p");
        let t1 = text(&mut doc, "hello ");
        let comment = doc.create_node(NodeKind::Comment {
            content: "noise".to_string(),
        });
        let t2 = text(&mut doc, "world");

        doc.append_child(root, p);
        doc.append_child(p, t1);
        doc.append_child(p, comment);
        doc.append_child(p, t2);

        assert_eq!(doc.text_content(p), "hello world");
    }

    #[test]
    fn test_attributes() {
        let mut doc = Document::new();
        let root = doc.root();

        let elem = doc.create_node(NodeKind::Element {
            name: "div".to_string(),
            attributes: vec![
                Attribute {
                    name: "id".to_string(),
                    value: "main".to_string(),
                },
                Attribute {
                    name: "class".to_string(),
                    value: "container".to_string(),
                },
            ],
        });
        doc.append_child(root, elem);

        assert_eq!(doc.attribute(elem, "id"), Some("main"));
        assert_eq!(doc.attribute(elem, "class"), Some("container"));
        assert_eq!(doc.attribute(elem, "style"), None);
        assert_eq!(doc.attributes(elem).len(), 2);
        // Document order is preserved.
        assert_eq!(doc.attributes(elem)[0].name, "id");
    }

    #[test]
    fn test_root_element_and_is_root_element() {
        let mut doc = Document::new();
        let root = doc.root();

        assert_eq!(doc.root_element(), None);

        let comment = doc.create_node(NodeKind::Comment {
            content: "prolog".to_string(),
        });
        doc.append_child(root, comment);

        let elem = element(&mut doc, "root");
        doc.append_child(root, elem);
        let child = element(&mut doc, "child");
        doc.append_child(elem, child);

        assert_eq!(doc.root_element(), Some(elem));
        assert!(doc.is_root_element(elem));
        assert!(!doc.is_root_element(child));
        assert!(!doc.is_root_element(comment));
    }

    #[test]
    fn test_node_text() {
        let mut doc = Document::new();

        let t = text(&mut doc, "hello");
        assert_eq!(doc.node_text(t), Some("hello"));

        let comment = doc.create_node(NodeKind::Comment {
            content: "a comment".to_string(),
        });
        assert_eq!(doc.node_text(comment), Some("a comment"));

        let cdata = doc.create_node(NodeKind::CData {
            content: "cdata content".to_string(),
        });
        assert_eq!(doc.node_text(cdata), Some("cdata content"));

        let elem = element(&mut doc, "div");
        assert_eq!(doc.node_text(elem), None);
    }

    #[test]
    fn test_parent_child_symmetry() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        doc.append_child(root, a);
        doc.append_child(a, b);

        for id in doc.descendants(root) {
            let parent = doc.parent(id).unwrap();
            assert!(doc.children(parent).any(|c| c == id));
        }
    }
}
