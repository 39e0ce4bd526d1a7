//! Core XML 1.0 parser.
//!
//! A hand-rolled recursive descent parser for XML 1.0 (Fifth Edition).
//! See <https://www.w3.org/TR/xml/> for the specification.
//!
//! The parser is hand-rolled (not combinator-based): the grammar is small,
//! the tie-breaks between productions are all decided by short literal
//! lookahead, and precise error positions require fine-grained control
//! over when input is consumed.

use crate::chars;
use crate::error::ParseError;
use crate::tree::{Attribute, Document, NodeId, NodeKind};

use super::input::Scanner;
use super::ParseOptions;

/// The core XML parser.
pub(crate) struct XmlParser<'a> {
    /// Low-level input state (position, peek, advance, names, references).
    input: Scanner<'a>,
    /// The document being built.
    doc: Document,
    /// Parser options.
    options: ParseOptions,
}

impl<'a> XmlParser<'a> {
    pub fn new(input: &'a str, options: &ParseOptions) -> Self {
        Self {
            input: Scanner::new(input, options.max_depth),
            doc: Document::new(),
            options: options.clone(),
        }
    }

    /// Parses the entire document:
    /// `XMLDecl? Misc* (doctypedecl Misc*)? element Misc*` then end of
    /// input (XML 1.0 §2.1 `[1]`, §2.8 `[22]`).
    pub fn parse(mut self) -> Result<Document, ParseError> {
        // The XML declaration is recognized only at offset 0, and only
        // when '<?xml' is followed by whitespace; anything else spelled
        // '<?xml...' is an ordinary PI (whose reserved-target check then
        // rejects a literal 'xml').
        if self.input.looking_at(b"<?xml")
            && self
                .input
                .peek_at(5)
                .is_some_and(|b| chars::is_whitespace(b as char))
        {
            self.parse_xml_declaration()?;
        }

        self.parse_misc()?;

        if self.input.looking_at(b"<!DOCTYPE") {
            self.parse_doctype()?;
            self.parse_misc()?;
        }

        if self.input.at_end() {
            return Err(self.input.fatal("Missing root element"));
        }
        if self.input.peek() == Some(b'<')
            && !matches!(self.input.peek_at(1), Some(b'!' | b'?' | b'/'))
        {
            let document = self.doc.root();
            self.parse_element(document)?;
        } else {
            return Err(self.input.fatal("Expected element"));
        }

        self.parse_misc()?;

        if !self.input.at_end() {
            if self.input.peek() == Some(b'<')
                && !matches!(self.input.peek_at(1), Some(b'!' | b'?' | b'/'))
            {
                return Err(self.input.fatal("Multiple root elements"));
            }
            return Err(self.input.fatal("Unexpected content after document element"));
        }

        Ok(self.doc)
    }

    // --- XML declaration ---
    // See XML 1.0 §2.8: [23] XMLDecl

    fn parse_xml_declaration(&mut self) -> Result<(), ParseError> {
        self.input.expect_str(b"<?xml")?;
        self.input.skip_whitespace_required()?;

        // Pseudo-attributes are ordered strictly: version, then optional
        // encoding, then optional standalone. A repeated or out-of-order
        // pseudo-attribute fails at the '?>' expectation below.
        if !self.input.eat(b"version") {
            return Err(self.input.fatal("XML declaration must declare a version"));
        }
        self.parse_pseudo_eq()?;
        let version_pos = self.input.position();
        let version = self.input.parse_quoted_value()?;
        if !is_valid_version(&version) {
            return Err(self
                .input
                .fatal_at(version_pos, format!("Invalid XML version '{version}'")));
        }

        let mut had_ws = self.input.skip_whitespace();

        let mut encoding = None;
        if self.input.looking_at(b"encoding") {
            if !had_ws {
                return Err(self.input.fatal("Whitespace required before encoding"));
            }
            self.input.expect_str(b"encoding")?;
            self.parse_pseudo_eq()?;
            let encoding_pos = self.input.position();
            let enc = self.input.parse_quoted_value()?;
            // The input is already a decoded UTF-8 string, so the only
            // acceptable declared encodings are spellings of UTF-8.
            if !(enc.eq_ignore_ascii_case("UTF-8") || enc.eq_ignore_ascii_case("UTF8")) {
                return Err(self
                    .input
                    .fatal_at(encoding_pos, format!("Unsupported encoding '{enc}'")));
            }
            encoding = Some(enc);
            had_ws = self.input.skip_whitespace();
        }

        let mut standalone = None;
        if self.input.looking_at(b"standalone") {
            if !had_ws {
                return Err(self.input.fatal("Whitespace required before standalone"));
            }
            self.input.expect_str(b"standalone")?;
            self.parse_pseudo_eq()?;
            let standalone_pos = self.input.position();
            let value = self.input.parse_quoted_value()?;
            standalone = match value.as_str() {
                "yes" => Some(true),
                "no" => Some(false),
                _ => {
                    return Err(self
                        .input
                        .fatal_at(standalone_pos, "standalone must be 'yes' or 'no'"));
                }
            };
        }

        self.input.skip_whitespace();
        self.input.expect_str(b"?>")?;

        self.doc.version = Some(version);
        self.doc.encoding = encoding;
        self.doc.standalone = standalone;
        Ok(())
    }

    /// Parses the `Eq` production: `S? '=' S?`.
    fn parse_pseudo_eq(&mut self) -> Result<(), ParseError> {
        self.input.skip_whitespace();
        self.input.expect_byte(b'=')?;
        self.input.skip_whitespace();
        Ok(())
    }

    // --- Misc (comments, PIs, whitespace) ---
    // See XML 1.0 §2.8: [27] Misc

    fn parse_misc(&mut self) -> Result<(), ParseError> {
        let document = self.doc.root();
        loop {
            self.input.skip_whitespace();
            if self.input.looking_at(b"<!--") {
                self.parse_comment(document)?;
            } else if self.input.looking_at(b"<?") {
                self.parse_pi(document)?;
            } else {
                return Ok(());
            }
        }
    }

    // --- DOCTYPE declaration ---
    // See XML 1.0 §2.8: [28] doctypedecl
    //
    // The declaration is recognized and then consumed whole: external
    // identifiers, the bracketed internal subset (nested brackets
    // balanced; brackets inside quoted literals and comments ignored).
    // No DTD semantics take effect.

    fn parse_doctype(&mut self) -> Result<(), ParseError> {
        self.input.expect_str(b"<!DOCTYPE")?;
        self.input.skip_whitespace_required()?;
        self.input.parse_name()?;

        loop {
            if self.input.at_end() {
                return Err(self.input.fatal("Unclosed DOCTYPE declaration"));
            }
            if self.input.looking_at(b"<!--") {
                self.input.expect_str(b"<!--")?;
                self.input
                    .scan_until(b"-->", "Unclosed comment in DOCTYPE declaration")?;
                self.input.expect_str(b"-->")?;
            } else if matches!(self.input.peek(), Some(b'"' | b'\'')) {
                self.input.parse_quoted_value()?;
            } else if self.input.peek() == Some(b'[') {
                self.parse_internal_subset()?;
            } else if self.input.peek() == Some(b'>') {
                self.input.expect_byte(b'>')?;
                return Ok(());
            } else {
                self.input.next_char()?;
            }
        }
    }

    fn parse_internal_subset(&mut self) -> Result<(), ParseError> {
        self.input.expect_byte(b'[')?;
        let mut depth: u32 = 1;
        while depth > 0 {
            if self.input.at_end() {
                return Err(self
                    .input
                    .fatal("Unclosed internal subset in DOCTYPE declaration"));
            }
            if self.input.looking_at(b"<!--") {
                self.input.expect_str(b"<!--")?;
                self.input
                    .scan_until(b"-->", "Unclosed comment in DOCTYPE declaration")?;
                self.input.expect_str(b"-->")?;
            } else if matches!(self.input.peek(), Some(b'"' | b'\'')) {
                self.input.parse_quoted_value()?;
            } else if self.input.peek() == Some(b'[') {
                depth += 1;
                self.input.expect_byte(b'[')?;
            } else if self.input.peek() == Some(b']') {
                depth -= 1;
                self.input.expect_byte(b']')?;
            } else {
                self.input.next_char()?;
            }
        }
        Ok(())
    }

    // --- Elements ---
    // See XML 1.0 §3.1: [40] STag, [42] ETag, [44] EmptyElemTag

    fn parse_element(&mut self, parent: NodeId) -> Result<(), ParseError> {
        self.input.enter_depth()?;
        self.input.expect_byte(b'<')?;
        let name = self.input.parse_name()?;
        let mut attributes: Vec<Attribute> = Vec::new();

        loop {
            let had_ws = self.input.skip_whitespace();
            if self.input.at_end() {
                return Err(self
                    .input
                    .fatal(format!("Unclosed start tag for element {name}")));
            }
            if self.input.peek() == Some(b'>') || self.input.looking_at(b"/>") {
                break;
            }
            if !had_ws {
                return Err(self.input.fatal("Whitespace required before attribute"));
            }
            let attr_pos = self.input.position();
            let attr_name = self.input.parse_name()?;
            // WFC: Unique Att Spec (XML 1.0 §3.1), reported at the second
            // occurrence.
            if attributes.iter().any(|a| a.name == attr_name) {
                return Err(self
                    .input
                    .fatal_at(attr_pos, format!("Duplicate attribute {attr_name}")));
            }
            self.input.skip_whitespace();
            self.input.expect_byte(b'=')?;
            self.input.skip_whitespace();
            let value = self.input.parse_attribute_value(&self.options)?;
            attributes.push(Attribute {
                name: attr_name,
                value,
            });
        }

        let elem = self.doc.create_node(NodeKind::Element {
            name: name.clone(),
            attributes,
        });
        self.doc.append_child(parent, elem);

        // Empty-element tag <foo/>
        if self.input.eat(b"/>") {
            self.input.leave_depth();
            return Ok(());
        }

        self.input.expect_byte(b'>')?;

        self.parse_content(elem)?;

        if self.input.at_end() {
            return Err(self
                .input
                .fatal(format!("Missing end tag for element {name}")));
        }
        // End-tag Name must equal the start-tag Name byte for byte; the
        // error points at the '<' of the offending end tag.
        let end_pos = self.input.position();
        self.input.expect_str(b"</")?;
        let end_name = self.input.parse_name()?;
        if end_name != name {
            return Err(self
                .input
                .fatal_at(end_pos, format!("Missing end tag for element {name}")));
        }
        self.input.skip_whitespace();
        self.input.expect_byte(b'>')?;

        self.input.leave_depth();
        Ok(())
    }

    // --- Content ---
    // See XML 1.0 §3.1: [43] content

    fn parse_content(&mut self, parent: NodeId) -> Result<(), ParseError> {
        loop {
            if self.input.at_end() || self.input.looking_at(b"</") {
                return Ok(());
            }
            if self.input.looking_at(b"<![CDATA[") {
                self.parse_cdata(parent)?;
            } else if self.input.looking_at(b"<!--") {
                self.parse_comment(parent)?;
            } else if self.input.looking_at(b"<?") {
                self.parse_pi(parent)?;
            } else if self.input.peek() == Some(b'<') {
                self.parse_element(parent)?;
            } else {
                self.parse_char_data(parent)?;
            }
        }
    }

    // --- Character data ---
    // See XML 1.0 §2.4: [14] CharData

    fn parse_char_data(&mut self, parent: NodeId) -> Result<(), ParseError> {
        let mut text = String::new();
        loop {
            match self.input.peek() {
                None | Some(b'<') => break,
                Some(b'&') => {
                    let expansion = self.input.parse_reference(&self.options)?;
                    text.push_str(&expansion);
                }
                Some(b']') if self.input.looking_at(b"]]>") => {
                    return Err(self.input.fatal("']]>' is not allowed in character data"));
                }
                Some(_) => text.push(self.input.next_char()?),
            }
        }
        if !text.is_empty() {
            self.doc.append_text(parent, &text);
        }
        Ok(())
    }

    // --- CDATA sections ---
    // See XML 1.0 §2.7: [18] CDSect

    fn parse_cdata(&mut self, parent: NodeId) -> Result<(), ParseError> {
        self.input.expect_str(b"<![CDATA[")?;
        let content = self.input.scan_until(b"]]>", "Unclosed CDATA section")?;
        self.input.expect_str(b"]]>")?;

        if self.options.preserve_cdata {
            let id = self.doc.create_node(NodeKind::CData { content });
            self.doc.append_child(parent, id);
        } else if !content.is_empty() {
            self.doc.append_text(parent, &content);
        }
        Ok(())
    }

    // --- Comments ---
    // See XML 1.0 §2.5: [15] Comment

    fn parse_comment(&mut self, parent: NodeId) -> Result<(), ParseError> {
        self.input.expect_str(b"<!--")?;
        let mut content = String::new();
        loop {
            if self.input.looking_at(b"-->") {
                self.input.expect_str(b"-->")?;
                break;
            }
            // '--' anywhere else in the body is forbidden; this also
            // catches a body ending in '-' (which reads as '--->').
            if self.input.looking_at(b"--") {
                return Err(self.input.fatal("'--' is not allowed in a comment"));
            }
            if self.input.at_end() {
                return Err(self.input.fatal("Unclosed comment"));
            }
            content.push(self.input.next_char()?);
        }

        if self.options.preserve_comments {
            let id = self.doc.create_node(NodeKind::Comment { content });
            self.doc.append_child(parent, id);
        }
        Ok(())
    }

    // --- Processing instructions ---
    // See XML 1.0 §2.6: [16] PI

    fn parse_pi(&mut self, parent: NodeId) -> Result<(), ParseError> {
        self.input.expect_str(b"<?")?;
        let target_pos = self.input.position();
        let target = self.input.parse_name()?;

        // "xml" (in any case combination) is reserved for the XML
        // declaration, which is recognized separately at offset 0.
        if target.eq_ignore_ascii_case("xml") {
            return Err(self.input.fatal_at(
                target_pos,
                "Processing instruction target must not be 'xml'",
            ));
        }

        let content = if self.input.eat(b"?>") {
            String::new()
        } else {
            self.input.skip_whitespace_required()?;
            let content = self
                .input
                .scan_until(b"?>", "Unclosed processing instruction")?;
            self.input.expect_str(b"?>")?;
            content
        };

        let id = self.doc.create_node(NodeKind::ProcessingInstruction { target, content });
        self.doc.append_child(parent, id);
        Ok(())
    }
}

/// Validates an XML version number per XML 1.0 §2.8:
/// `VersionNum ::= '1.' [0-9]+`
fn is_valid_version(s: &str) -> bool {
    s.strip_prefix("1.")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}
