//! # xylem
//!
//! A non-validating, well-formedness-checking tree parser for XML 1.0
//! (Fifth Edition) documents in UTF-8. The parser consumes a complete
//! in-memory string and produces an arena-allocated [`Document`] tree, or
//! a [`ParseError`] locating the first offense down to line, column, and
//! a caret-annotated excerpt.
//!
//! The DOCTYPE declaration is recognized and discarded; only the five
//! predefined entities and numeric character references are expanded
//! (extendable via [`ParseOptions::entity_resolver`]). There is no
//! streaming, no external entity loading, and no mutation API: the tree
//! is immutable once built.
//!
//! ## Quick start
//!
//! ```
//! use xylem::Document;
//!
//! let doc = Document::parse_str(r#"<kittens fuzzy="yes">I like fuzzy kittens.</kittens>"#)
//!     .unwrap();
//! let root = doc.root_element().unwrap();
//! assert_eq!(doc.node_name(root), Some("kittens"));
//! assert_eq!(doc.attribute(root, "fuzzy"), Some("yes"));
//! assert_eq!(doc.text_content(root), "I like fuzzy kittens.");
//! ```
//!
//! Errors carry everything needed for a useful report:
//!
//! ```
//! use xylem::Document;
//!
//! let err = Document::parse_str("<foo><bar>baz</foo>").unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Missing end tag for element bar (line 1, column 14)\n\
//!      <foo><bar>baz</foo>\n             ^"
//! );
//! ```

pub mod chars;
pub mod error;
pub mod parser;
pub mod tree;

// Re-export the primary types at the crate root for convenience.
pub use error::ParseError;
pub use parser::{parse_str, parse_str_with_options, EntityResolver, ParseOptions};
pub use tree::{Attribute, Document, NodeId, NodeKind};
