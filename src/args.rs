//! Keyed view over a token vector.
//!
//! An [`ArgumentList`] splits tokens into named items and ordered unnamed
//! values according to a [`TokenizerConfig`]. Repeated names accumulate their
//! values on a single [`Item`] under the first spelling seen.

use crate::tokens::TokenizerConfig;

/// Compare two names under the configured comparer.
///
/// Whitespace is significant; only letter case folds when the comparer is
/// case-insensitive.
pub fn names_eq(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// One named argument: a canonical name and the values bound to it, in order
/// of appearance. A bare `/name` token contributes the item with no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    name: String,
    values: Vec<String>,
}

impl Item {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first value, or `None` for a bare flag.
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(|s| s.as_str())
    }

    /// All values in order of appearance.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Structured view over a token stream: named items plus ordered unnamed
/// values.
#[derive(Debug, Clone, Default)]
pub struct ArgumentList {
    items: Vec<Item>,
    unnamed: Vec<String>,
    case_insensitive: bool,
}

impl ArgumentList {
    /// Build the list from tokens.
    ///
    /// A token starting with a prefix character becomes (part of) an item;
    /// the first delimiter inside it separates name and value. Tokens whose
    /// name would be empty after stripping fall through to the unnamed list.
    pub fn from_tokens<S: AsRef<str>>(
        tokens: &[S],
        config: &TokenizerConfig,
        case_insensitive: bool,
    ) -> Self {
        let mut list = ArgumentList {
            items: Vec::new(),
            unnamed: Vec::new(),
            case_insensitive,
        };
        for token in tokens {
            let token = token.as_ref();
            match config.split_named(token) {
                Some((name, value)) => list.push_named(name, value),
                None => list.unnamed.push(token.to_string()),
            }
        }
        list
    }

    fn push_named(&mut self, name: &str, value: Option<&str>) {
        let ci = self.case_insensitive;
        if let Some(item) = self.items.iter_mut().find(|i| names_eq(&i.name, name, ci)) {
            if let Some(v) = value {
                item.values.push(v.to_string());
            }
            return;
        }
        self.items.push(Item {
            name: name.to_string(),
            values: value.into_iter().map(str::to_string).collect(),
        });
    }

    /// Look up an item by its canonical name.
    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|i| names_eq(&i.name, name, self.case_insensitive))
    }

    /// Look up an item by any of several names (a display name plus aliases).
    pub fn lookup(&self, names: &[&str]) -> Option<&Item> {
        names.iter().find_map(|n| self.item(n))
    }

    /// First value of the named item, if any.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.item(name).and_then(Item::value)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn unnamed(&self) -> &[String] {
        &self.unnamed
    }
}

/// Remove the first token naming `name` from the vector.
///
/// Scans linearly for a prefixed token whose stripped name equals `name`
/// under the comparer, splices it out, and returns its value (`Some(None)`
/// when the token carried no delimiter). Returns `None` when nothing
/// matched; repeated calls remove successive occurrences.
pub fn remove_named(
    tokens: &mut Vec<String>,
    name: &str,
    config: &TokenizerConfig,
    case_insensitive: bool,
) -> Option<Option<String>> {
    for (idx, token) in tokens.iter().enumerate() {
        if let Some((n, value)) = config.split_named(token) {
            if names_eq(n, name, case_insensitive) {
                let value = value.map(str::to_string);
                tokens.remove(idx);
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(tokens: &[&str]) -> ArgumentList {
        ArgumentList::from_tokens(tokens, &TokenizerConfig::default(), true)
    }

    #[test]
    fn test_named_and_unnamed_split() {
        let args = list(&["one", "/a=1", "two", "-b:2", "/flag"]);
        assert_eq!(args.unnamed(), ["one", "two"]);
        assert_eq!(args.value("a"), Some("1"));
        assert_eq!(args.value("b"), Some("2"));
        let flag = args.item("flag").unwrap();
        assert_eq!(flag.value(), None);
        assert!(flag.values().is_empty());
    }

    #[test]
    fn test_repeated_names_accumulate() {
        let args = list(&["/t:a", "/t:b", "/T:c"]);
        let item = args.item("t").unwrap();
        assert_eq!(item.name(), "t");
        assert_eq!(item.values(), ["a", "b", "c"]);
        assert_eq!(item.value(), Some("a"));
    }

    #[test]
    fn test_case_sensitivity_is_configurable() {
        let args = ArgumentList::from_tokens(
            &["/Name=x"],
            &TokenizerConfig::default(),
            false,
        );
        assert!(args.item("name").is_none());
        assert_eq!(args.value("Name"), Some("x"));
    }

    #[test]
    fn test_empty_name_falls_through_to_unnamed() {
        let args = list(&["/", "/=x"]);
        assert_eq!(args.unnamed(), ["/", "/=x"]);
        assert!(args.items().is_empty());
    }

    #[test]
    fn test_lookup_tries_aliases_in_order() {
        let args = list(&["/alias=1"]);
        assert_eq!(args.lookup(&["name", "alias"]).unwrap().value(), Some("1"));
        assert!(args.lookup(&["name", "other"]).is_none());
    }

    #[test]
    fn test_remove_named_splices_first_match() {
        let cfg = TokenizerConfig::default();
        let mut tokens: Vec<String> = ["a", "/x=1", "b", "/x=2", "/y"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(remove_named(&mut tokens, "x", &cfg, true), Some(Some("1".into())));
        assert_eq!(tokens, ["a", "b", "/x=2", "/y"]);

        assert_eq!(remove_named(&mut tokens, "x", &cfg, true), Some(Some("2".into())));
        assert_eq!(remove_named(&mut tokens, "x", &cfg, true), None);

        assert_eq!(remove_named(&mut tokens, "y", &cfg, true), Some(None));
        assert_eq!(tokens, ["a", "b"]);
    }

    #[test]
    fn test_remove_named_whitespace_is_significant() {
        let cfg = TokenizerConfig::default();
        let mut tokens: Vec<String> = vec!["/four =1".to_string()];
        assert_eq!(remove_named(&mut tokens, "four", &cfg, true), None);
        assert_eq!(
            remove_named(&mut tokens, "four ", &cfg, true),
            Some(Some("1".into()))
        );
    }
}
