//! Text sanitising for text pulled out of PDFs.
//!
//! Extracted page text may contain C0 control characters (font encodings
//! that map glyphs to `\x01`, form feeds between text runs, NULs). XML 1.0
//! forbids those outright, and Word refuses to open a document containing
//! them, so they are removed before the text reaches [`super::docx`].
//! Layout is otherwise left as the extractor produced it.

use once_cell::sync::Lazy;
use regex::Regex;

static XML_ILLEGAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F\x{FFFE}\x{FFFF}]").unwrap());

static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

/// Clean extracted page text.
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Drop characters illegal in XML 1.0
/// 3. Trim trailing whitespace per line
/// 4. Trim leading and trailing blank lines
pub fn sanitise(input: &str) -> String {
    let s = input.replace("\r\n", "\n").replace('\r', "\n");
    let s = XML_ILLEGAL.replace_all(&s, "");
    let s = TRAILING_WS.replace_all(&s, "");
    s.trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_characters() {
        assert_eq!(sanitise("a\u{0}b\u{1}c\u{c}d"), "abcd");
    }

    #[test]
    fn keeps_tabs_and_newlines() {
        assert_eq!(sanitise("a\tb\nc"), "a\tb\nc");
    }

    #[test]
    fn normalises_line_endings_and_trailing_space() {
        assert_eq!(sanitise("one  \r\ntwo\rthree\t\n\n\n"), "one\ntwo\nthree");
    }

    #[test]
    fn leading_blank_lines_are_dropped() {
        assert_eq!(sanitise("\n\nTitle\n  indented"), "Title\n  indented");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(sanitise(""), "");
        assert_eq!(sanitise("\n\n"), "");
    }

    #[test]
    fn unicode_text_survives() {
        assert_eq!(sanitise("Größe – café"), "Größe – café");
    }
}
