//! Command-line tokenization.
//!
//! [`parse`] splits a raw line into tokens on unquoted whitespace; a
//! double-quoted run groups text and a doubled quote (`""`) inside it is a
//! literal quote. [`join`] is the inverse: tokens that need quoting are
//! re-emitted quoted with internal quotes doubled, clean tokens are emitted
//! bare, so redundant quotes do not survive a round trip.
//!
//! Prefix characters and name/value delimiters are not interpreted here;
//! that happens when an [`ArgumentList`](crate::args::ArgumentList) is built
//! from the tokens, driven by a [`TokenizerConfig`].

use crate::error::ShellError;

/// Prefix and delimiter conventions for named arguments.
///
/// A token starting with a prefix character (`/name` or `-name`) is a named
/// argument; the first delimiter character inside it separates the name from
/// its value (`/name=value`, `-f:path`). Both sets are non-empty by
/// construction.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    prefixes: Vec<char>,
    delimiters: Vec<char>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            prefixes: vec!['/', '-'],
            delimiters: vec!['=', ':'],
        }
    }
}

impl TokenizerConfig {
    pub fn prefixes(&self) -> &[char] {
        &self.prefixes
    }

    pub fn delimiters(&self) -> &[char] {
        &self.delimiters
    }

    /// Replace the prefix set. An empty set is rejected.
    pub fn set_prefixes(&mut self, prefixes: Vec<char>) -> Result<(), ShellError> {
        if prefixes.is_empty() {
            return Err(ShellError::InvalidInput(
                "prefix characters must not be empty".to_string(),
            ));
        }
        self.prefixes = prefixes;
        Ok(())
    }

    /// Replace the delimiter set. An empty set is rejected.
    pub fn set_delimiters(&mut self, delimiters: Vec<char>) -> Result<(), ShellError> {
        if delimiters.is_empty() {
            return Err(ShellError::InvalidInput(
                "delimiter characters must not be empty".to_string(),
            ));
        }
        self.delimiters = delimiters;
        Ok(())
    }

    pub fn is_prefix(&self, c: char) -> bool {
        self.prefixes.contains(&c)
    }

    /// Split a token into its name and optional value.
    ///
    /// Returns `None` when the token carries no prefix character or when the
    /// name would be empty after stripping, in which case the token is an
    /// unnamed value.
    pub fn split_named<'a>(&self, token: &'a str) -> Option<(&'a str, Option<&'a str>)> {
        let mut chars = token.chars();
        let first = chars.next()?;
        if !self.is_prefix(first) {
            return None;
        }
        let rest = chars.as_str();
        let (name, value) = match rest.find(|c| self.delimiters.contains(&c)) {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };
        if name.is_empty() {
            return None;
        }
        Some((name, value))
    }
}

/// Tokenize one command line.
///
/// Whitespace separates tokens outside quoted runs. Inside a quoted run a
/// doubled quote is a literal quote and the run ends at the next quote. An
/// unterminated quoted run is invalid input.
pub fn parse(line: &str) -> Result<Vec<String>, ShellError> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        if in_quotes {
            if c == '"' {
                if chars.get(pos + 1) == Some(&'"') {
                    current.push('"');
                    pos += 2;
                    continue;
                }
                in_quotes = false;
            } else {
                current.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
            in_token = true;
        } else if c.is_whitespace() {
            if in_token {
                tokens.push(std::mem::take(&mut current));
                in_token = false;
            }
        } else {
            current.push(c);
            in_token = true;
        }
        pos += 1;
    }

    if in_quotes {
        return Err(ShellError::InvalidInput(
            "unterminated quoted string".to_string(),
        ));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Quote a single token if it needs it.
///
/// Tokens containing whitespace or quote characters are wrapped in quotes
/// with internal quotes doubled; anything else passes through unchanged.
pub fn quote(token: &str) -> String {
    if token.is_empty() || token.contains(char::is_whitespace) || token.contains('"') {
        let mut out = String::with_capacity(token.len() + 2);
        out.push('"');
        for c in token.chars() {
            if c == '"' {
                out.push('"');
            }
            out.push(c);
        }
        out.push('"');
        out
    } else {
        token.to_string()
    }
}

/// Join tokens back into a single line, quoting where necessary.
///
/// `parse(&join(v))` reproduces `v` for any well-formed token vector.
pub fn join<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| quote(t.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(line: &str) -> Vec<String> {
        parse(line).unwrap()
    }

    #[test]
    fn test_parse_plain_tokens() {
        assert_eq!(parsed("a b c"), ["a", "b", "c"]);
        assert_eq!(parsed("  a   b\tc  "), ["a", "b", "c"]);
    }

    #[test]
    fn test_parse_quoted_runs() {
        assert_eq!(parsed(r#"a b "c c""#), ["a", "b", "c c"]);
        assert_eq!(parsed(r#"a b " c ""#), ["a", "b", " c "]);
        assert_eq!(parsed(r#"a "b""b" c"#), ["a", "b\"b", "c"]);
        assert_eq!(parsed(r#"a """b""" c"#), ["a", "\"b\"", "c"]);
    }

    #[test]
    fn test_parse_empty_quoted_token() {
        assert_eq!(parsed(r#"a "" b"#), ["a", "", "b"]);
    }

    #[test]
    fn test_parse_unterminated_quote_fails() {
        assert!(matches!(
            parse(r#"a "b c"#),
            Err(ShellError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_join_quotes_only_when_needed() {
        assert_eq!(join(&["a", "b", "c"]), "a b c");
        assert_eq!(join(&["a", "b", "c c"]), r#"a b "c c""#);
        assert_eq!(join(&["a", " c "]), r#"a " c ""#);
        assert_eq!(join(&["a", "b\"b"]), r#"a "b""b""#);
    }

    #[test]
    fn test_round_trip_canonical_forms() {
        for line in [
            "a b c",
            r#"a b "c c""#,
            r#"a b " c ""#,
            r#"a "b""b" c"#,
            r#"a """b""" c"#,
        ] {
            let tokens = parsed(line);
            assert_eq!(tokens.len(), 3, "line {:?}", line);
            assert_eq!(join(&tokens), line, "line {:?}", line);
            assert_eq!(parsed(&join(&tokens)), tokens, "line {:?}", line);
        }
    }

    #[test]
    fn test_redundant_quotes_do_not_survive() {
        assert_eq!(join(&parsed(r#"a "b" c"#)), "a b c");
    }

    #[test]
    fn test_config_rejects_empty_sets() {
        let mut cfg = TokenizerConfig::default();
        assert!(cfg.set_prefixes(Vec::new()).is_err());
        assert!(cfg.set_delimiters(Vec::new()).is_err());
        assert!(cfg.set_prefixes(vec!['+']).is_ok());
        assert!(cfg.is_prefix('+'));
        assert!(!cfg.is_prefix('/'));
    }

    #[test]
    fn test_split_named() {
        let cfg = TokenizerConfig::default();
        assert_eq!(cfg.split_named("/name=value"), Some(("name", Some("value"))));
        assert_eq!(cfg.split_named("-f:path"), Some(("f", Some("path"))));
        assert_eq!(cfg.split_named("/flag"), Some(("flag", None)));
        assert_eq!(cfg.split_named("/t:a:b"), Some(("t", Some("a:b"))));
        assert_eq!(cfg.split_named("plain"), None);
        assert_eq!(cfg.split_named("/"), None);
        assert_eq!(cfg.split_named("/=x"), None);
    }
}
