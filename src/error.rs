//! Parse errors with source location and excerpt rendering.
//!
//! Every failure surfaces as a single [`ParseError`] carrying the 1-based
//! line and column, the 0-based character offset, and a two-line excerpt:
//! the offending source line (windowed if long) and a caret line pointing
//! at the column. The first error aborts the parse; there is no recovery
//! mode and no partial tree.

use std::fmt;

/// A source line shorter than this is shown whole in the excerpt.
const EXCERPT_FULL_LINE: usize = 80;

/// Characters kept on each side of the caret when the line is windowed.
const EXCERPT_RADIUS: usize = 40;

/// The error type returned when parsing fails.
///
/// The `message` holds the bare description; [`fmt::Display`] renders the
/// full user-facing form:
///
/// ```text
/// Missing end tag for element bar (line 1, column 14)
/// <foo><bar>baz</foo>
///              ^
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable description of the failure.
    pub message: String,
    /// 1-based line number of the offending code point.
    pub line: u32,
    /// 1-based column number (counted in code points, not bytes).
    pub column: u32,
    /// 0-based character offset from the start of the input.
    pub pos: usize,
    /// The offending source line plus a caret line, newline-separated.
    pub excerpt: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {})\n{}",
            self.message, self.line, self.column, self.excerpt
        )
    }
}

impl std::error::Error for ParseError {}

/// Builds the two-line excerpt for an error at `byte_pos` / `column`.
///
/// The line containing the error is shown whole when it fits in
/// [`EXCERPT_FULL_LINE`] characters; otherwise a window of
/// [`EXCERPT_RADIUS`] characters on each side of the caret is shown, with
/// `...` marking truncation. The second line carries a `^` under the
/// column.
pub(crate) fn build_excerpt(input: &str, byte_pos: usize, column: u32) -> String {
    let line_start = input[..byte_pos]
        .rfind(['\n', '\r'])
        .map_or(0, |i| i + 1);
    let line_end = input[byte_pos..]
        .find(['\n', '\r'])
        .map_or(input.len(), |i| byte_pos + i);
    let line_text = &input[line_start..line_end];

    let col0 = column.saturating_sub(1) as usize;
    let chars: Vec<char> = line_text.chars().collect();

    let (shown, caret_at) = if chars.len() <= EXCERPT_FULL_LINE {
        (line_text.to_string(), col0)
    } else {
        let win_start = col0.saturating_sub(EXCERPT_RADIUS).min(chars.len());
        let win_end = (col0 + EXCERPT_RADIUS).min(chars.len());
        let mut shown = String::new();
        let mut caret_at = col0 - win_start;
        if win_start > 0 {
            shown.push_str("...");
            caret_at += 3;
        }
        shown.extend(&chars[win_start..win_end]);
        if win_end < chars.len() {
            shown.push_str("...");
        }
        (shown, caret_at)
    };

    let mut excerpt = shown;
    excerpt.push('\n');
    excerpt.extend(std::iter::repeat(' ').take(caret_at));
    excerpt.push('^');
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let err = ParseError {
            message: "Unexpected end of input".to_string(),
            line: 2,
            column: 7,
            pos: 14,
            excerpt: "<a><b></b>\n      ^".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected end of input (line 2, column 7)\n<a><b></b>\n      ^"
        );
    }

    #[test]
    fn test_excerpt_short_line() {
        let input = "<foo><bar>baz</foo>";
        let excerpt = build_excerpt(input, 13, 14);
        assert_eq!(excerpt, "<foo><bar>baz</foo>\n             ^");
    }

    #[test]
    fn test_excerpt_picks_the_error_line() {
        let input = "<a>\n  <b oops</b>\n</a>";
        // Error at the '<' of '</b>' on line 2, column 10.
        let byte_pos = input.find("</b>").unwrap();
        let excerpt = build_excerpt(input, byte_pos, 10);
        assert_eq!(excerpt, "  <b oops</b>\n         ^");
    }

    #[test]
    fn test_excerpt_truncates_long_line_both_sides() {
        let mut input = String::new();
        input.push_str(&"a".repeat(100));
        input.push('!');
        input.push_str(&"b".repeat(100));
        // Error at the '!', column 101.
        let excerpt = build_excerpt(&input, 100, 101);
        let mut lines = excerpt.lines();
        let shown = lines.next().unwrap();
        let caret = lines.next().unwrap();
        assert!(shown.starts_with("..."));
        assert!(shown.ends_with("..."));
        assert_eq!(shown.len(), 3 + 80 + 3);
        // 3 for the leading ellipsis + 40 chars before the caret.
        assert_eq!(caret, format!("{}^", " ".repeat(43)));
        assert_eq!(shown.chars().nth(43), Some('!'));
    }

    #[test]
    fn test_excerpt_truncates_only_the_far_side() {
        let mut input = String::from("short");
        input.push_str(&"x".repeat(100));
        let excerpt = build_excerpt(&input, 0, 1);
        let shown = excerpt.lines().next().unwrap();
        assert!(!shown.starts_with("..."));
        assert!(shown.ends_with("..."));
        assert_eq!(excerpt.lines().nth(1), Some("^"));
    }

    #[test]
    fn test_excerpt_caret_at_end_of_line() {
        let input = "<a";
        let excerpt = build_excerpt(input, 2, 3);
        assert_eq!(excerpt, "<a\n  ^");
    }

    #[test]
    fn test_error_trait_object() {
        let err = ParseError {
            message: "x".to_string(),
            line: 1,
            column: 1,
            pos: 0,
            excerpt: String::new(),
        };
        let _: &dyn std::error::Error = &err;
    }
}
