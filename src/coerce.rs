//! String-to-typed conversions used by argument binding and option writes.

use std::fmt;

/// Broad classification of an argument or option value, used by help
/// rendering and by the binder to decide flag semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Int,
    Float,
    Bool,
    Char,
    /// Repeatable named value collected into a list.
    List,
    /// The raw token vector of the invocation.
    Tokens,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Str => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Char => "char",
            ValueKind::List => "list",
            ValueKind::Tokens => "tokens",
        };
        f.write_str(s)
    }
}

/// Conversion from a single argument token to a typed value.
///
/// Conversions are locale-independent; failures return a short reason that
/// the dispatcher folds into an invalid-argument-value report naming the
/// parameter and the offending literal.
pub trait ArgParse: Sized {
    fn parse_arg(value: &str) -> Result<Self, String>;

    /// The kind reported for this type in listings.
    fn kind() -> ValueKind {
        ValueKind::Str
    }
}

impl ArgParse for String {
    fn parse_arg(value: &str) -> Result<Self, String> {
        Ok(value.to_string())
    }
}

impl ArgParse for char {
    fn parse_arg(value: &str) -> Result<Self, String> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err("expected a single character".to_string()),
        }
    }

    fn kind() -> ValueKind {
        ValueKind::Char
    }
}

impl ArgParse for bool {
    fn parse_arg(value: &str) -> Result<Self, String> {
        if value.eq_ignore_ascii_case("true")
            || value.eq_ignore_ascii_case("yes")
            || value == "1"
        {
            Ok(true)
        } else if value.eq_ignore_ascii_case("false")
            || value.eq_ignore_ascii_case("no")
            || value == "0"
        {
            Ok(false)
        } else {
            Err("expected true/false, yes/no or 1/0".to_string())
        }
    }

    fn kind() -> ValueKind {
        ValueKind::Bool
    }
}

macro_rules! impl_arg_parse_int {
    ($($t:ty),*) => {$(
        impl ArgParse for $t {
            fn parse_arg(value: &str) -> Result<Self, String> {
                value.trim().parse::<$t>().map_err(|e| e.to_string())
            }

            fn kind() -> ValueKind {
                ValueKind::Int
            }
        }
    )*};
}

impl_arg_parse_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_arg_parse_float {
    ($($t:ty),*) => {$(
        impl ArgParse for $t {
            fn parse_arg(value: &str) -> Result<Self, String> {
                value.trim().parse::<$t>().map_err(|e| e.to_string())
            }

            fn kind() -> ValueKind {
                ValueKind::Float
            }
        }
    )*};
}

impl_arg_parse_float!(f32, f64);

/// Absent or empty input becomes `None`; anything else converts as `T`.
impl<T: ArgParse> ArgParse for Option<T> {
    fn parse_arg(value: &str) -> Result<Self, String> {
        if value.is_empty() {
            Ok(None)
        } else {
            T::parse_arg(value).map(Some)
        }
    }

    fn kind() -> ValueKind {
        T::kind()
    }
}

/// Case-insensitive name lookup for enum-like types.
///
/// Implementors of [`ArgParse`] for unit enums typically delegate to this:
/// each candidate pairs the accepted spelling with the value it selects.
pub fn from_name<T: Clone>(value: &str, candidates: &[(&str, T)]) -> Result<T, String> {
    for (name, variant) in candidates {
        if value.eq_ignore_ascii_case(name) {
            return Ok(variant.clone());
        }
    }
    let names: Vec<&str> = candidates.iter().map(|(n, _)| *n).collect();
    Err(format!("expected one of: {}", names.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_accepts_all_spellings() {
        for s in ["true", "TRUE", "yes", "Yes", "1"] {
            assert_eq!(bool::parse_arg(s), Ok(true), "input {:?}", s);
        }
        for s in ["false", "False", "no", "NO", "0"] {
            assert_eq!(bool::parse_arg(s), Ok(false), "input {:?}", s);
        }
        assert!(bool::parse_arg("maybe").is_err());
    }

    #[test]
    fn test_int_parse() {
        assert_eq!(i64::parse_arg("42"), Ok(42));
        assert_eq!(i32::parse_arg(" -7 "), Ok(-7));
        assert!(i32::parse_arg("abc").is_err());
        assert!(u8::parse_arg("300").is_err());
    }

    #[test]
    fn test_float_parse() {
        assert_eq!(f64::parse_arg("2.5"), Ok(2.5));
        assert!(f64::parse_arg("two").is_err());
    }

    #[test]
    fn test_option_empty_is_none() {
        assert_eq!(Option::<i32>::parse_arg(""), Ok(None));
        assert_eq!(Option::<i32>::parse_arg("3"), Ok(Some(3)));
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Color {
        Red,
        Green,
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        let table = [("red", Color::Red), ("green", Color::Green)];
        assert_eq!(from_name("RED", &table), Ok(Color::Red));
        assert_eq!(from_name("Green", &table), Ok(Color::Green));
        assert!(from_name("blue", &table).is_err());
    }
}
