//! Parse a document, walk the tree, and show a diagnostic.
//!
//! Run with: `cargo run --example dump`
#![allow(clippy::expect_used)]

use xylem::{Document, NodeId, NodeKind};

fn main() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<bookstore>
  <!-- a tiny inventory -->
  <book category="fiction">
    <title lang="en">The Great Gatsby</title>
    <price>10.99</price>
  </book>
  <book category="science">
    <title lang="en">A Brief History of Time</title>
    <price>14.99</price>
    <blurb><![CDATA[Hawking on space & time]]></blurb>
  </book>
</bookstore>"#;

    let doc = Document::parse_str(xml).expect("failed to parse XML");
    let root = doc.root_element().expect("no root element");

    println!("Root element: {}", doc.node_name(root).unwrap_or("?"));
    dump(&doc, root, 1);

    println!("\nJSON projection:");
    println!(
        "{}",
        serde_json::to_string_pretty(&doc.to_json()).expect("serialize projection")
    );

    // A malformed document produces a located, excerpt-carrying error.
    let broken = "<books>\n  <book><title>Dune</book>\n</books>";
    match Document::parse_str(broken) {
        Ok(_) => unreachable!("input is malformed"),
        Err(err) => println!("\nDiagnostic for malformed input:\n{err}"),
    }
}

fn dump(doc: &Document, id: NodeId, indent: usize) {
    let pad = "  ".repeat(indent);
    for child in doc.children(id) {
        match &doc.node(child).kind {
            NodeKind::Element { name, attributes } => {
                let attrs: Vec<String> = attributes
                    .iter()
                    .map(|a| format!("{}={:?}", a.name, a.value))
                    .collect();
                println!("{pad}<{name}> {}", attrs.join(" "));
                dump(doc, child, indent + 1);
            }
            NodeKind::Text { content } => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    println!("{pad}text: {trimmed:?}");
                }
            }
            NodeKind::CData { content } => println!("{pad}cdata: {content:?}"),
            NodeKind::Comment { content } => println!("{pad}comment: {content:?}"),
            NodeKind::ProcessingInstruction { target, content } => {
                println!("{pad}pi: <?{target} {content}?>");
            }
            NodeKind::Document => {}
        }
    }
}
