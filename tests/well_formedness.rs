//! End-to-end well-formedness behavior: representative documents, error
//! positions, option effects, and the structural invariants every parsed
//! tree upholds.

use xylem::{chars, Document, NodeKind, ParseOptions};

// ---------------------------------------------------------------------------
// Representative documents
// ---------------------------------------------------------------------------

#[test]
fn parses_element_with_attribute_and_text() {
    let doc = Document::parse_str(r#"<kittens fuzzy="yes">I like fuzzy kittens.</kittens>"#)
        .expect("well-formed");
    let root = doc.root_element().expect("root element");
    assert_eq!(doc.node_name(root), Some("kittens"));
    assert_eq!(doc.attribute(root, "fuzzy"), Some("yes"));

    let children: Vec<_> = doc.children(root).collect();
    assert_eq!(children.len(), 1);
    assert_eq!(doc.node_text(children[0]), Some("I like fuzzy kittens."));
}

#[test]
fn expands_all_predefined_entities() {
    let doc = Document::parse_str("<a>&lt;&amp;&gt;&apos;&quot;</a>").expect("well-formed");
    let root = doc.root_element().expect("root element");
    let children: Vec<_> = doc.children(root).collect();
    assert_eq!(children.len(), 1);
    assert_eq!(doc.node_text(children[0]), Some("<&>'\""));
}

#[test]
fn cdata_reads_as_plain_text_by_default() {
    let doc = Document::parse_str("<r><![CDATA[<x>&]]></r>").expect("well-formed");
    let root = doc.root_element().expect("root element");
    let children: Vec<_> = doc.children(root).collect();
    assert_eq!(children.len(), 1);
    assert!(matches!(doc.node(children[0]).kind, NodeKind::Text { .. }));
    assert_eq!(doc.node_text(children[0]), Some("<x>&"));
}

#[test]
fn accepts_xml_declaration_without_emitting_a_node() {
    let doc = Document::parse_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<r/>")
        .expect("well-formed");
    let children: Vec<_> = doc.children(doc.root()).collect();
    assert_eq!(children.len(), 1);
    assert_eq!(doc.node_name(children[0]), Some("r"));
    assert_eq!(doc.version.as_deref(), Some("1.0"));
}

#[test]
fn unknown_entities_survive_verbatim_when_ignored() {
    let options = ParseOptions::default().ignore_undefined_entities(true);
    let doc = Document::parse_str_with_options("<r>&unknown;</r>", &options).expect("tolerated");
    let root = doc.root_element().expect("root element");
    assert_eq!(doc.text_content(root), "&unknown;");
}

#[test]
fn complex_document_round_trips_through_navigation() {
    let input = "<?xml version=\"1.0\"?>\n\
                 <!DOCTYPE catalog>\n\
                 <catalog>\n\
                   <!-- two entries -->\n\
                   <book id=\"bk101\"><title>Rust &amp; XML</title></book>\n\
                   <book id=\"bk102\"><title><![CDATA[100 < 200]]></title></book>\n\
                   <?page break?>\n\
                 </catalog>";
    let doc = Document::parse_str(input).expect("well-formed");
    let catalog = doc.root_element().expect("root element");
    assert!(doc.is_root_element(catalog));

    let books: Vec<_> = doc
        .children(catalog)
        .filter(|&id| doc.node_name(id) == Some("book"))
        .collect();
    assert_eq!(books.len(), 2);
    assert_eq!(doc.attribute(books[0], "id"), Some("bk101"));
    assert_eq!(doc.text_content(books[0]), "Rust & XML");
    assert_eq!(doc.text_content(books[1]), "100 < 200");
}

// ---------------------------------------------------------------------------
// Error positions
// ---------------------------------------------------------------------------

#[test]
fn mismatched_end_tag_reports_the_end_tag_position() {
    let err = Document::parse_str("<foo><bar>baz</foo>").unwrap_err();
    assert!(err.message.starts_with("Missing end tag for element bar"));
    assert_eq!(err.line, 1);
    assert_eq!(err.column, 14);
    assert_eq!(err.pos, 13);
}

#[test]
fn duplicate_attribute_reports_the_second_occurrence() {
    let err = Document::parse_str("<r a=\"1\" a=\"2\"/>").unwrap_err();
    assert!(err.message.starts_with("Duplicate attribute a"));
    assert_eq!((err.line, err.column), (1, 10));
}

#[test]
fn stray_cdata_close_is_rejected() {
    let err = Document::parse_str("<r>]]></r>").unwrap_err();
    assert!(err.message.starts_with("']]>' is not allowed"));
    assert_eq!((err.line, err.column), (1, 4));
}

#[test]
fn error_positions_use_multiline_coordinates() {
    let err = Document::parse_str("<a>\n  <b>\n  </c>\n</a>").unwrap_err();
    assert!(err.message.starts_with("Missing end tag for element b"));
    assert_eq!(err.line, 3);
    assert_eq!(err.column, 3);
    // pos is a character offset: "<a>\n  <b>\n  " is 12 characters.
    assert_eq!(err.pos, 12);
}

#[test]
fn rendered_errors_carry_excerpt_and_caret() {
    let err = Document::parse_str("<a>\n  <b>\n  </c>\n</a>").unwrap_err();
    let rendered = err.to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("(line 3, column 3)"));
    assert_eq!(lines[1], "  </c>");
    assert_eq!(lines[2], "  ^");
}

#[test]
fn first_error_wins() {
    // Both the undefined entity and the mismatched end tag are wrong; the
    // entity comes first in the input.
    let err = Document::parse_str("<a>&nope;</b>").unwrap_err();
    assert!(err.message.starts_with("Undefined entity"));
}

// ---------------------------------------------------------------------------
// Invariants over parsed trees
// ---------------------------------------------------------------------------

const SAMPLE: &str = "<?xml version=\"1.0\"?>\n\
     <root a=\"1\" b=\"two\">\n\
       text <child>nested &amp; mixed</child> tail\n\
       <!-- note --><?pi data?><empty/>\n\
       <cd><![CDATA[raw]]>joined</cd>\n\
     </root>";

#[test]
fn invariant_single_root_element() {
    let doc = Document::parse_str(SAMPLE).expect("well-formed");
    let roots = doc
        .children(doc.root())
        .filter(|&id| matches!(doc.node(id).kind, NodeKind::Element { .. }))
        .count();
    assert_eq!(roots, 1);
}

#[test]
fn invariant_parent_child_symmetry() {
    let doc = Document::parse_str(SAMPLE).expect("well-formed");
    for id in doc.descendants(doc.root()) {
        let parent = doc.parent(id).expect("every descendant has a parent");
        assert!(
            doc.children(parent).any(|c| c == id),
            "parent does not list its child"
        );
    }
    for id in doc.descendants(doc.root()) {
        for child in doc.children(id) {
            assert_eq!(doc.parent(child), Some(id));
        }
    }
}

#[test]
fn invariant_no_adjacent_text_nodes() {
    let doc = Document::parse_str(SAMPLE).expect("well-formed");
    for id in doc.descendants(doc.root()) {
        let children: Vec<_> = doc.children(id).collect();
        for pair in children.windows(2) {
            let both_text = matches!(doc.node(pair[0]).kind, NodeKind::Text { .. })
                && matches!(doc.node(pair[1]).kind, NodeKind::Text { .. });
            assert!(!both_text, "adjacent text nodes were not coalesced");
        }
    }
}

#[test]
fn invariant_attribute_names_unique() {
    let doc = Document::parse_str(SAMPLE).expect("well-formed");
    for id in doc.descendants(doc.root()) {
        let attrs = doc.attributes(id);
        for (i, a) in attrs.iter().enumerate() {
            assert!(
                attrs[i + 1..].iter().all(|b| b.name != a.name),
                "duplicate attribute name survived parsing"
            );
        }
    }
}

#[test]
fn invariant_exposed_strings_are_valid_chars() {
    let input = "<r a=\"tab\there\">line1\r\nline2&#x10000;</r>";
    let doc = Document::parse_str(input).expect("well-formed");
    for id in doc.descendants(doc.root()) {
        if let Some(text) = doc.node_text(id) {
            assert!(text.chars().all(chars::is_char));
            assert!(!text.contains('\r'), "carriage returns must be normalized");
        }
        for attr in doc.attributes(id) {
            assert!(attr.value.chars().all(chars::is_char));
        }
    }
}

#[test]
fn invariant_line_ending_normalization_is_idempotent() {
    let crlf = "<r a=\"x\r\ny\">one\r\ntwo\rthree</r>";
    let lf = "<r a=\"x\ny\">one\ntwo\nthree</r>";
    let a = Document::parse_str(crlf).expect("well-formed");
    let b = Document::parse_str(lf).expect("well-formed");
    assert_eq!(a.to_json(), b.to_json());
}

#[test]
fn invariant_projection_is_deterministic() {
    let a = Document::parse_str(SAMPLE).expect("well-formed");
    let b = Document::parse_str(SAMPLE).expect("well-formed");
    assert_eq!(a.to_json(), b.to_json());
    assert_eq!(
        serde_json::to_string(&a.to_json()).unwrap(),
        serde_json::to_string(&b.to_json()).unwrap()
    );
}

#[test]
fn invariant_error_locality() {
    // For each prefix of a well-formed document, an error (if any) must
    // point at or before the first position past that prefix.
    let input = "<root><child a=\"1\">text</child></root>";
    for end in 1..input.len() {
        if !input.is_char_boundary(end) {
            continue;
        }
        let prefix = &input[..end];
        if let Err(err) = Document::parse_str(prefix) {
            assert!(
                err.pos <= prefix.chars().count(),
                "error at {} is past the end of a {}-char prefix",
                err.pos,
                prefix.chars().count()
            );
        }
    }
}
