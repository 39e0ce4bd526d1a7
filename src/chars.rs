//! XML 1.0 (Fifth Edition) character class membership.
//!
//! These predicates are the single authority for character class checks in
//! the crate; the scanner and grammar engine call into them rather than
//! re-stating the ranges. See <https://www.w3.org/TR/xml/> §2.2 and §2.3.

/// Returns `true` if `c` is a valid `Char` per XML 1.0 §2.2 `[2]`.
///
/// The XML 1.0 (Fifth Edition) `Char` production allows:
/// `#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
///
/// Surrogate halves can never appear in a Rust `char`, but the excluded
/// noncharacters `#xFFFE`/`#xFFFF` and the C0 controls (other than tab,
/// LF, and CR) can, and are rejected here.
#[must_use]
pub fn is_char(c: char) -> bool {
    matches!(c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x0001_0000..=0x0010_FFFF
    )
}

/// Returns `true` if `c` is whitespace per XML 1.0 §2.3 `[3]`:
/// space, tab, carriage return, or line feed.
#[must_use]
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Returns `true` if `c` is a valid `NameStartChar` per XML 1.0 §2.3 `[4]`.
#[must_use]
pub fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' |
        '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' |
        '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' |
        '\u{10000}'..='\u{EFFFF}'
    )
}

/// Returns `true` if `c` is a valid `NameChar` per XML 1.0 §2.3 `[4a]`.
#[must_use]
pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' |
            '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// Returns `true` if `c` is a `RestrictedChar`: a control character that
/// the `Char` production admits only via later editions' restricted set.
///
/// These are the C0 controls other than tab/LF/CR, plus `#x7F-#x84` and
/// `#x86-#x9F`. Documents produced by this parser never contain the C0
/// portion (those fail [`is_char`]); the DEL/C1 portion is legal but
/// discouraged, and callers that want to reject it can use this predicate.
#[must_use]
pub fn is_restricted_char(c: char) -> bool {
    matches!(c as u32,
        0x01..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F | 0x7F..=0x84 | 0x86..=0x9F
    )
}
