//! Macro expansion against option state.
//!
//! `$(Name)` substitutes the current value of the option named `Name`,
//! quoted like [`tokens::join`](crate::tokens::join) output when the value
//! contains whitespace or quotes. `$$` is a literal dollar. A `$(` with no
//! closing parenthesis passes through verbatim.

use crate::error::ShellError;
use crate::registry::Registry;
use crate::tokens;

pub(crate) fn expand(
    line: &str,
    registry: &Registry,
    case_insensitive: bool,
) -> Result<String, ShellError> {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '$' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match chars.get(i + 1) {
            Some('$') => {
                out.push('$');
                i += 2;
            }
            Some('(') => {
                let Some(close) = chars[i + 2..].iter().position(|&c| c == ')') else {
                    out.extend(&chars[i..]);
                    break;
                };
                let name: String = chars[i + 2..i + 2 + close].iter().collect();
                let option = registry
                    .find_option(&name, case_insensitive)
                    .ok_or_else(|| ShellError::UnknownOption(name.clone()))?;
                let value = option.value();
                if value.contains(char::is_whitespace) || value.contains('"') {
                    out.push_str(&tokens::quote(&value));
                } else {
                    out.push_str(&value);
                }
                i += 2 + close + 1;
            }
            _ => {
                out.push('$');
                i += 1;
            }
        }
    }
    Ok(out)
}
