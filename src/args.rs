//! Splitting raw argument text at top-level commas.

use crate::scanner::top_level_comma_index;

/// Split `arguments` into its first argument and the untouched remainder.
///
/// Returns `None` when there is no top-level comma, i.e. at most one
/// argument. Whether a single argument is acceptable is the caller's call.
pub fn split_first_arg(arguments: &str) -> Option<(&str, &str)> {
    let comma = top_level_comma_index(arguments)?;
    Some((arguments[..comma].trim(), arguments[comma + 1..].trim()))
}

/// All top-level arguments, trimmed.
///
/// Empty input yields no arguments and a trailing comma does not yield an
/// empty final argument.
pub fn split_args(arguments: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = arguments.trim();
    while !rest.is_empty() {
        match split_first_arg(rest) {
            Some((first, tail)) => {
                out.push(first);
                rest = tail;
            }
            None => {
                out.push(rest);
                break;
            }
        }
    }
    out
}
