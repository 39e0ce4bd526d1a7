//! Low-level input handling for the XML parser.
//!
//! [`Scanner`] encapsulates the input string, position tracking (line,
//! column, byte and character offsets), and the parsing primitives the
//! grammar engine is built from: peeking, literal matching, predicate
//! runs, name parsing, and entity/character-reference resolution.
//!
//! Two invariants hold throughout:
//!
//! - line/column/offsets always describe the next *unconsumed* code point;
//! - errors are raised before the offending code point is consumed, so a
//!   [`ParseError`] points exactly at it.
//!
//! Line endings are normalized while scanning (XML 1.0 §2.11): `\r\n` and
//! a lone `\r` both count as one newline and yield a single `\n`.

use crate::chars;
use crate::error::{build_excerpt, ParseError};

use super::ParseOptions;

/// A snapshot of the scanner position.
///
/// Obtained via [`Scanner::position`] and used to attach an error to an
/// earlier location, e.g. the `<` of a mismatched end tag after its name
/// has already been read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Position {
    pos: usize,
    chars: usize,
    line: u32,
    column: u32,
}

/// Cursor over the input string with position bookkeeping.
pub(crate) struct Scanner<'a> {
    /// The input (always valid UTF-8; the scanner only stops on char
    /// boundaries).
    input: &'a str,
    /// Current byte offset.
    pos: usize,
    /// Current character offset (code points consumed).
    chars: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, counted in code points).
    column: u32,
    /// Current element nesting depth.
    depth: u32,
    /// Maximum allowed nesting depth.
    max_depth: u32,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner over `input`.
    pub fn new(input: &'a str, max_depth: u32) -> Self {
        Self {
            input,
            pos: 0,
            chars: 0,
            line: 1,
            column: 1,
            depth: 0,
            max_depth,
        }
    }

    // -- Position queries --

    /// Returns `true` if all input has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns a snapshot of the current position.
    pub fn position(&self) -> Position {
        Position {
            pos: self.pos,
            chars: self.chars,
            line: self.line,
            column: self.column,
        }
    }

    // -- Peek operations --

    /// Returns the byte at the current position without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Returns the byte at `current_position + offset` without consuming.
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    /// Returns the character at the current position without consuming it.
    pub fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns `true` if the remaining input starts with `s`.
    pub fn looking_at(&self, s: &[u8]) -> bool {
        self.input.as_bytes()[self.pos..].starts_with(s)
    }

    // -- Advance operations --

    /// Consumes one byte, updating line/column. `\n`, and `\r` not
    /// followed by `\n`, start a new line.
    fn bump(&mut self) {
        let bytes = self.input.as_bytes();
        let b = bytes[self.pos];
        self.pos += 1;
        self.chars += 1;
        if b == b'\n' || (b == b'\r' && bytes.get(self.pos) != Some(&b'\n')) {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Consumes `count` bytes of ASCII input.
    fn advance_ascii(&mut self, count: usize) {
        for _ in 0..count {
            self.bump();
        }
    }

    /// Consumes one non-newline character (possibly multi-byte).
    fn advance_char(&mut self, ch: char) {
        self.pos += ch.len_utf8();
        self.chars += 1;
        self.column += 1;
    }

    /// If the remaining input starts with `literal`, consumes it and
    /// returns `true`. The literal must be ASCII.
    pub fn eat(&mut self, literal: &[u8]) -> bool {
        if self.looking_at(literal) {
            self.advance_ascii(literal.len());
            true
        } else {
            false
        }
    }

    /// Consumes the expected byte, or fails without consuming anything.
    pub fn expect_byte(&mut self, expected: u8) -> Result<(), ParseError> {
        match self.peek() {
            Some(b) if b == expected => {
                self.bump();
                Ok(())
            }
            Some(_) => Err(self.fatal(format!("Expected '{}'", expected as char))),
            None => Err(self.fatal(format!(
                "Unexpected end of input, expected '{}'",
                expected as char
            ))),
        }
    }

    /// Consumes the expected ASCII literal, or fails without consuming.
    pub fn expect_str(&mut self, expected: &[u8]) -> Result<(), ParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            let literal = String::from_utf8_lossy(expected);
            if self.at_end() {
                Err(self.fatal(format!(
                    "Unexpected end of input, expected '{literal}'"
                )))
            } else {
                Err(self.fatal(format!("Expected '{literal}'")))
            }
        }
    }

    /// Consumes and returns the next character with line-ending
    /// normalization (`\r\n` and `\r` become `\n`) and validation against
    /// the `Char` production. Fails before consuming an invalid character.
    pub fn next_char(&mut self) -> Result<char, ParseError> {
        let Some(ch) = self.peek_char() else {
            return Err(self.fatal("Unexpected end of input"));
        };
        if ch == '\r' {
            self.bump();
            if self.peek() == Some(b'\n') {
                self.bump();
            }
            return Ok('\n');
        }
        if !chars::is_char(ch) {
            return Err(self.fatal(format!("Invalid character U+{:04X}", ch as u32)));
        }
        if ch.is_ascii() {
            self.bump();
        } else {
            self.advance_char(ch);
        }
        Ok(ch)
    }

    // -- Whitespace --

    /// Skips whitespace characters. Returns `true` if any were consumed.
    ///
    /// XML whitespace is ASCII, so the byte at the cursor is the whole
    /// code point whenever [`chars::is_whitespace`] accepts it.
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|b| chars::is_whitespace(b as char)) {
            self.bump();
        }
        self.pos > start
    }

    /// Skips whitespace, failing if none is found.
    pub fn skip_whitespace_required(&mut self) -> Result<(), ParseError> {
        if self.skip_whitespace() {
            Ok(())
        } else {
            Err(self.fatal("Whitespace required"))
        }
    }

    // -- Predicate runs --

    /// Consumes bytes while `pred` holds and returns the matched slice.
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if pred(b) {
                self.bump();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    /// Consumes characters up to but not including the next occurrence of
    /// `literal`, validating and normalizing them along the way. Fails
    /// with `on_eof` if the literal never occurs.
    pub fn scan_until(&mut self, literal: &[u8], on_eof: &str) -> Result<String, ParseError> {
        let mut out = String::new();
        while !self.looking_at(literal) {
            if self.at_end() {
                return Err(self.fatal(on_eof));
            }
            out.push(self.next_char()?);
        }
        Ok(out)
    }

    // -- Depth tracking --

    /// Increments the nesting depth, failing when the limit is exceeded.
    pub fn enter_depth(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.fatal(format!(
                "Maximum element nesting depth exceeded ({})",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Decrements the nesting depth (saturating at 0).
    pub fn leave_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -- Name parsing (XML 1.0 §2.3) --

    /// Parses an XML `Name` per production `[5]`: a `NameStartChar`
    /// followed by zero or more `NameChar`s.
    pub fn parse_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.peek_char() {
            None => return Err(self.fatal("Unexpected end of input, expected a name")),
            Some(c) if !chars::is_name_start_char(c) => {
                return Err(self.fatal(format!(
                    "Invalid name start character '{}'",
                    c.escape_default()
                )));
            }
            Some(c) => self.advance_char(c),
        }
        while let Some(c) = self.peek_char() {
            if chars::is_name_char(c) {
                self.advance_char(c);
            } else {
                break;
            }
        }
        Ok(self.input[start..self.pos].to_string())
    }

    // -- Reference parsing (XML 1.0 §4.1) --

    /// Parses an entity or character reference (`&...;`) and returns its
    /// expansion.
    ///
    /// The five predefined entities expand to their characters; decimal
    /// and hexadecimal character references expand to the referenced code
    /// point (which must satisfy the `Char` production). Any other name
    /// is offered to the
    /// [`entity_resolver`](ParseOptions::entity_resolver) hook, then
    /// preserved verbatim when
    /// [`ignore_undefined_entities`](ParseOptions::ignore_undefined_entities)
    /// is set, and otherwise fails. Expansion is single-pass: resolver
    /// output is never re-scanned.
    pub fn parse_reference(&mut self, options: &ParseOptions) -> Result<String, ParseError> {
        let start = self.position();
        self.expect_byte(b'&')?;

        if self.eat(b"#") {
            let value = if self.eat(b"x") {
                let hex = self.take_while(|b| b.is_ascii_hexdigit());
                if hex.is_empty() {
                    return Err(self.fatal_at(start, "Invalid character reference"));
                }
                u32::from_str_radix(hex, 16)
            } else {
                let dec = self.take_while(|b| b.is_ascii_digit());
                if dec.is_empty() {
                    return Err(self.fatal_at(start, "Invalid character reference"));
                }
                dec.parse::<u32>()
            };
            self.expect_byte(b';')?;

            let Ok(value) = value else {
                return Err(self.fatal_at(start, "Invalid character reference"));
            };
            match char::from_u32(value).filter(|&c| chars::is_char(c)) {
                Some(c) => Ok(c.to_string()),
                None => Err(self.fatal_at(
                    start,
                    format!("Invalid character reference U+{value:04X}"),
                )),
            }
        } else {
            let name = self.parse_name()?;
            self.expect_byte(b';')?;

            match name.as_str() {
                "amp" => Ok("&".to_string()),
                "lt" => Ok("<".to_string()),
                "gt" => Ok(">".to_string()),
                "apos" => Ok("'".to_string()),
                "quot" => Ok("\"".to_string()),
                _ => {
                    if let Some(resolver) = &options.entity_resolver {
                        if let Some(expansion) = resolver(&name) {
                            return Ok(expansion);
                        }
                    }
                    if options.ignore_undefined_entities {
                        Ok(format!("&{name};"))
                    } else {
                        Err(self.fatal_at(start, format!("Undefined entity &{name};")))
                    }
                }
            }
        }
    }

    // -- Attribute value parsing (XML 1.0 §3.3.3) --

    /// Parses a quoted attribute value with reference expansion and
    /// whitespace normalization: literal tab, LF, and CR (after the usual
    /// line-ending normalization) become spaces, while characters produced
    /// by references are kept as themselves.
    pub fn parse_attribute_value(&mut self, options: &ParseOptions) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.fatal("Attribute value must be quoted")),
            None => {
                return Err(self.fatal("Unexpected end of input, expected an attribute value"))
            }
        };
        self.advance_ascii(1);

        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.fatal("Unclosed attribute value")),
                Some(q) if q == quote => {
                    self.advance_ascii(1);
                    break;
                }
                Some(b'<') => {
                    return Err(self.fatal("'<' is not allowed in an attribute value"))
                }
                Some(b'&') => value.push_str(&self.parse_reference(options)?),
                Some(_) => {
                    let ch = self.next_char()?;
                    if ch == '\n' || ch == '\t' {
                        value.push(' ');
                    } else {
                        value.push(ch);
                    }
                }
            }
        }
        Ok(value)
    }

    /// Parses a quoted literal (single or double quotes, no reference
    /// expansion). Used for the XML declaration's pseudo-attributes.
    pub fn parse_quoted_value(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.fatal("Expected a quoted value")),
            None => return Err(self.fatal("Unexpected end of input, expected a quoted value")),
        };
        self.advance_ascii(1);
        let value = self.scan_until(&[quote], "Unclosed quoted value")?;
        self.advance_ascii(1);
        Ok(value)
    }

    // -- Error construction --

    /// Creates a fatal [`ParseError`] at the current position.
    pub fn fatal(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            line: self.line,
            column: self.column,
            pos: self.chars,
            excerpt: build_excerpt(self.input, self.pos, self.column),
        }
    }

    /// Creates a fatal [`ParseError`] at a previously saved position.
    pub fn fatal_at(&self, at: Position, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            line: at.line,
            column: at.column,
            pos: at.chars,
            excerpt: build_excerpt(self.input, at.pos, at.column),
        }
    }
}
