//! XML 1.0 parser entry points and options.
//!
//! A hand-rolled recursive descent parser conforming to the W3C XML 1.0
//! (Fifth Edition) specification, restricted to well-formedness: the
//! DOCTYPE declaration is recognized and discarded, and only the five
//! predefined entities and character references are expanded.
//!
//! Parsing is synchronous and single-pass. A parse invocation owns its
//! scanner and builder state for the duration of the call; nothing is
//! shared between invocations, so parses may run concurrently on
//! different threads.

pub(crate) mod input;
mod xml;

use std::sync::Arc;

use crate::error::ParseError;
use crate::tree::Document;

/// Default maximum element nesting depth.
const DEFAULT_MAX_DEPTH: u32 = 256;

/// A callback for resolving entity references beyond the five predefined
/// ones.
///
/// Called with the entity name (without `&` and `;`). Returning
/// `Some(replacement)` expands the reference to that string verbatim
/// (the replacement is not re-scanned); returning `None` falls back to
/// [`ParseOptions::ignore_undefined_entities`] or an error.
pub type EntityResolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Parse options controlling parser behavior.
///
/// Unknown concerns simply have no knob here; the options bag is a plain
/// struct with documented defaults. Use the builder methods to configure:
///
/// ```
/// use xylem::ParseOptions;
///
/// let opts = ParseOptions::default()
///     .preserve_cdata(true)
///     .ignore_undefined_entities(true);
/// ```
pub struct ParseOptions {
    /// If true, unknown `&name;` references are preserved verbatim in the
    /// output instead of raising an error. Default: `false`.
    pub ignore_undefined_entities: bool,
    /// If true, CDATA sections produce distinct
    /// [`CData`](crate::tree::NodeKind::CData) nodes that never coalesce
    /// with neighboring text. Default: `false` (CDATA becomes
    /// indistinguishable text).
    pub preserve_cdata: bool,
    /// If false, comment nodes are parsed and validated but not emitted.
    /// Default: `true`.
    pub preserve_comments: bool,
    /// Reserved. The DOCTYPE declaration is currently always discarded.
    /// Default: `false`.
    pub preserve_document_type: bool,
    /// Maximum element nesting depth. Default: 256.
    pub max_depth: u32,
    /// Optional callback consulted for entity references beyond the five
    /// predefined ones, before `ignore_undefined_entities` is applied.
    pub entity_resolver: Option<EntityResolver>,
}

impl Clone for ParseOptions {
    fn clone(&self) -> Self {
        Self {
            ignore_undefined_entities: self.ignore_undefined_entities,
            preserve_cdata: self.preserve_cdata,
            preserve_comments: self.preserve_comments,
            preserve_document_type: self.preserve_document_type,
            max_depth: self.max_depth,
            entity_resolver: self.entity_resolver.clone(),
        }
    }
}

impl std::fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseOptions")
            .field("ignore_undefined_entities", &self.ignore_undefined_entities)
            .field("preserve_cdata", &self.preserve_cdata)
            .field("preserve_comments", &self.preserve_comments)
            .field("preserve_document_type", &self.preserve_document_type)
            .field("max_depth", &self.max_depth)
            .field(
                "entity_resolver",
                &self.entity_resolver.as_ref().map(|_| "..."),
            )
            .finish()
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            ignore_undefined_entities: false,
            preserve_cdata: false,
            preserve_comments: true,
            preserve_document_type: false,
            max_depth: DEFAULT_MAX_DEPTH,
            entity_resolver: None,
        }
    }
}

impl ParseOptions {
    /// Enables or disables verbatim preservation of unknown entity
    /// references.
    #[must_use]
    pub fn ignore_undefined_entities(mut self, yes: bool) -> Self {
        self.ignore_undefined_entities = yes;
        self
    }

    /// Enables or disables distinct CDATA nodes.
    #[must_use]
    pub fn preserve_cdata(mut self, yes: bool) -> Self {
        self.preserve_cdata = yes;
        self
    }

    /// Enables or disables emission of comment nodes.
    #[must_use]
    pub fn preserve_comments(mut self, yes: bool) -> Self {
        self.preserve_comments = yes;
        self
    }

    /// Reserved knob for future DOCTYPE retention; currently has no
    /// effect.
    #[must_use]
    pub fn preserve_document_type(mut self, yes: bool) -> Self {
        self.preserve_document_type = yes;
        self
    }

    /// Sets the maximum element nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }

    /// Sets the entity resolver callback.
    ///
    /// The callback is consulted for every entity reference that is not
    /// one of the five predefined entities, before
    /// [`ignore_undefined_entities`](ParseOptions::ignore_undefined_entities)
    /// is applied.
    #[must_use]
    pub fn entity_resolver(
        mut self,
        resolver: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.entity_resolver = Some(Arc::new(resolver));
        self
    }
}

/// Parses an XML string with default options.
///
/// A leading U+FEFF byte order mark is accepted and discarded; reported
/// positions are relative to the input after BOM removal.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not well-formed XML.
pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    parse_str_with_options(input, &ParseOptions::default())
}

/// Parses an XML string with the given options.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not well-formed XML.
pub fn parse_str_with_options(input: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    xml::XmlParser::new(input, options).parse()
}
