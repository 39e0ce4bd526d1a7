//! Node type definitions.
//!
//! [`NodeKind`] is a closed tagged union of every node type the parser can
//! produce. Traversal code matches on it exhaustively; there is no open
//! polymorphism because the set of node kinds is fixed by the XML
//! specification.

use super::Attribute;

/// The kind of an XML node and its associated data.
///
/// This enum carries the payload for each node type. Navigation links
/// (parent, children, siblings) are stored in `NodeData`, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node; there is exactly one per [`super::Document`].
    Document,

    /// An element node, e.g., `<kittens fuzzy="yes">`.
    Element {
        /// The element name exactly as written. Qualified names are kept
        /// whole; colons are permitted but never split into prefixes.
        name: String,
        /// Attributes in document order. Names are unique per element.
        attributes: Vec<Attribute>,
    },

    /// A text node containing character data.
    ///
    /// References have been expanded and line endings normalized. CDATA
    /// sections also land here unless
    /// [`preserve_cdata`](crate::ParseOptions::preserve_cdata) is set.
    Text {
        /// The decoded text content.
        content: String,
    },

    /// A CDATA section, e.g., `<![CDATA[...]]>`.
    ///
    /// Only produced when
    /// [`preserve_cdata`](crate::ParseOptions::preserve_cdata) is set;
    /// never coalesced with neighboring text.
    CData {
        /// The CDATA content, verbatim.
        content: String,
    },

    /// A comment node, e.g., `<!-- ... -->`.
    Comment {
        /// The comment text (without the `<!--` and `-->` delimiters).
        /// Never contains `--` and never ends in `-`.
        content: String,
    },

    /// A processing instruction, e.g., `<?target data?>`.
    ProcessingInstruction {
        /// The PI target (e.g., `"xml-stylesheet"`). Never `xml` in any
        /// case combination; that spelling is reserved for the XML
        /// declaration, which is not emitted as a node.
        target: String,
        /// The PI data, possibly empty.
        content: String,
    },
}
