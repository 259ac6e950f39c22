//! Quote-aware command tokenizer.

use std::sync::OnceLock;

use regex::Regex;

/// A quoted span (straight or typographic quotes) or a run of non-space.
const TOKEN_PATTERN: &str = r#""[^"]+"|“[^”]+”|\S+"#;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"))
}

/// Splits a message into tokens.
///
/// Whitespace separates tokens, except inside a double-quoted span, which
/// becomes a single token with its quotes kept. Embedded quotes cannot be
/// escaped.
pub fn tokenize(message: &str) -> Vec<String> {
    token_re()
        .find_iter(message)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Strips surrounding quote characters from a token.
pub fn trim_quotes(token: &str) -> &str {
    token.trim_matches(|c| matches!(c, '"' | '“' | '”'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_quoted_span() {
        assert_eq!(
            tokenize(r#"@bot append "My Title" section"#),
            vec!["@bot", "append", "\"My Title\"", "section"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  <@U1>\n  help  "), vec!["<@U1>", "help"]);
    }

    #[test]
    fn test_tokenize_typographic_quotes() {
        assert_eq!(
            tokenize("<@U1> “Meeting notes” q3"),
            vec!["<@U1>", "“Meeting notes”", "q3"]
        );
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        // No closing quote: falls back to whitespace splitting
        assert_eq!(tokenize(r#"<@U1> "open title"#), vec!["<@U1>", "\"open", "title"]);
    }

    #[test]
    fn test_trim_quotes() {
        assert_eq!(trim_quotes("\"My Title\""), "My Title");
        assert_eq!(trim_quotes("“Notes”"), "Notes");
        assert_eq!(trim_quotes("plain"), "plain");
    }
}
