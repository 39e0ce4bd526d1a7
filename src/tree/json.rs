//! JSON projection of the document tree.
//!
//! [`Document::to_json`] produces a plain-data view of the tree suitable
//! for serialization or structural comparison. Parent links are omitted,
//! which breaks the tree's only cycle; everything else is a deep copy.
//!
//! Key order is stable: `type` first, then the type-specific fields in
//! declaration order. Attribute objects keep document order. This relies
//! on `serde_json`'s `preserve_order` feature.

use serde_json::{json, Map, Value};

use super::{Document, NodeId, NodeKind};

impl Document {
    /// Returns the whole document as a plain JSON tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use xylem::Document;
    ///
    /// let doc = Document::parse_str(r#"<note lang="en">hi</note>"#).unwrap();
    /// let json = doc.to_json();
    /// assert_eq!(json["type"], "document");
    /// assert_eq!(json["children"][0]["name"], "note");
    /// assert_eq!(json["children"][0]["attributes"]["lang"], "en");
    /// ```
    #[must_use]
    pub fn to_json(&self) -> Value {
        self.node_json(self.root())
    }

    /// Returns a single node (and its subtree) as a plain JSON tree.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a valid node.
    #[must_use]
    pub fn node_json(&self, id: NodeId) -> Value {
        match &self.node(id).kind {
            NodeKind::Document => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("document"));
                map.insert("children".to_string(), self.children_json(id));
                Value::Object(map)
            }
            NodeKind::Element { name, attributes } => {
                let mut attrs = Map::new();
                for attr in attributes {
                    attrs.insert(attr.name.clone(), json!(attr.value));
                }
                let mut map = Map::new();
                map.insert("type".to_string(), json!("element"));
                map.insert("name".to_string(), json!(name));
                map.insert("attributes".to_string(), Value::Object(attrs));
                map.insert("children".to_string(), self.children_json(id));
                map.insert("isRootNode".to_string(), json!(self.is_root_element(id)));
                Value::Object(map)
            }
            NodeKind::Text { content } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("text"));
                map.insert("text".to_string(), json!(content));
                Value::Object(map)
            }
            NodeKind::CData { content } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("cdata"));
                map.insert("text".to_string(), json!(content));
                Value::Object(map)
            }
            NodeKind::Comment { content } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("comment"));
                map.insert("content".to_string(), json!(content));
                Value::Object(map)
            }
            NodeKind::ProcessingInstruction { target, content } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("processing-instruction"));
                map.insert("name".to_string(), json!(target));
                map.insert("content".to_string(), json!(content));
                Value::Object(map)
            }
        }
    }

    fn children_json(&self, id: NodeId) -> Value {
        Value::Array(self.children(id).map(|c| self.node_json(c)).collect())
    }
}
