//! Shared helpers for rewrite builders: precedence-safe wrapping, lodash
//! iteratee shorthands, and placeholder substitution.

use std::borrow::Cow;

use crate::classify::is_identifier;
use crate::locator::find_closing_paren;
use crate::regex_cache::{PatternKind, cached};
use crate::scanner::{Lexeme, ScannerState, is_escaped, needs_receiver_parens};

/// Placeholder names recognised in expression templates, in priority order.
pub const PLACEHOLDERS: &[&str] = &["value", "array", "collection", "object", "string", "number"];

/// `expr` ready to receive `.method(...)`, parenthesised when required.
pub fn receiver(expr: &str) -> Cow<'_, str> {
    let expr = expr.trim();
    if needs_receiver_parens(expr) {
        Cow::Owned(format!("({expr})"))
    } else {
        Cow::Borrowed(expr)
    }
}

/// `expr` ready to sit next to a binary operator.
///
/// Same rule as [`receiver`]: anything with a loose top-level operator is
/// wrapped, so `a + b` becomes `(a + b) * c` rather than `a + b * c`.
pub fn operand(expr: &str) -> Cow<'_, str> {
    receiver(expr)
}

/// `expr` ready to be called as `expr(args)`.
///
/// Arrow functions and function expressions are wrapped too.
pub fn callable(expr: &str) -> Cow<'_, str> {
    let expr = expr.trim();
    if expr.starts_with("function") || expr.starts_with("async") {
        return Cow::Owned(format!("({expr})"));
    }
    receiver(expr)
}

/// Inner text of a single quoted string literal without interpolation.
pub fn quoted_literal(text: &str) -> Option<&str> {
    let text = text.trim();
    let bytes = text.as_bytes();
    let quote = *bytes.first()?;
    if !matches!(quote, b'\'' | b'"' | b'`') || bytes.len() < 2 {
        return None;
    }

    // The literal must close exactly at the final byte.
    let last = bytes.len() - 1;
    if bytes[last] != quote || is_escaped(bytes, last) {
        return None;
    }
    let mut state = ScannerState::new();
    for i in 0..last {
        state.step(bytes, i);
        if !state.in_literal() {
            return None;
        }
    }
    let inner = &text[1..text.len() - 1];
    if quote == b'`' && inner.contains("${") {
        return None;
    }
    Some(inner)
}

/// Accessor suffix for a lodash property path: `a.b[0]` → `.a.b[0]`.
///
/// Segments that are not identifiers use bracket notation. Returns `None`
/// for paths this cannot express faithfully.
pub fn property_accessor(path: &str) -> Option<String> {
    if path.is_empty() || path.contains(['\\', '"', '\'', '`']) {
        return None;
    }

    let mut out = String::new();
    for segment in path.split('.') {
        let (name, indices) = match segment.find('[') {
            Some(open) => (&segment[..open], &segment[open..]),
            None => (segment, ""),
        };
        match name {
            "" if indices.is_empty() => return None,
            "" => {}
            _ if is_identifier(name) => {
                out.push('.');
                out.push_str(name);
            }
            _ if name.bytes().all(|b| b.is_ascii_digit()) => {
                out.push_str(&format!("[{name}]"));
            }
            _ => {
                if name.contains(['[', ']']) {
                    return None;
                }
                out.push_str(&format!("[\"{name}\"]"));
            }
        }
        out.push_str(&index_suffix(indices)?);
    }
    Some(out)
}

fn index_suffix(mut indices: &str) -> Option<String> {
    let mut out = String::new();
    while !indices.is_empty() {
        let rest = indices.strip_prefix('[')?;
        let close = rest.find(']')?;
        let index = &rest[..close];
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        out.push_str(&format!("[{index}]"));
        indices = &rest[close + 1..];
    }
    Some(out)
}

/// A lodash iteratee argument: a function expression, or a property path
/// shorthand given as a string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Iteratee<'a> {
    Function(&'a str),
    Path(String),
}

impl<'a> Iteratee<'a> {
    /// Parse an iteratee argument. Object and array shorthands (`matches`,
    /// `matchesProperty`) are not supported.
    pub fn parse(arg: &'a str) -> Option<Self> {
        let arg = arg.trim();
        if arg.is_empty() || arg.starts_with(['{', '[']) {
            return None;
        }
        if arg.starts_with(['\'', '"', '`']) {
            let path = quoted_literal(arg)?;
            return property_accessor(path).map(Self::Path);
        }
        Some(Self::Function(arg))
    }

    /// The iteratee applied to `var`: `fn(var)` or `var.path`.
    pub fn apply(&self, var: &str) -> String {
        match self {
            Self::Function(f) => format!("{}({var})", callable(f)),
            Self::Path(suffix) => format!("{var}{suffix}"),
        }
    }

    /// The iteratee as a standalone function expression.
    pub fn as_function(&self) -> Cow<'a, str> {
        match self {
            Self::Function(f) => Cow::Borrowed(*f),
            Self::Path(suffix) => Cow::Owned(format!("item => item{suffix}")),
        }
    }
}

/// First placeholder that appears as a whole word in code (not inside a
/// string literal and not as a property name).
pub fn find_placeholder(template: &str) -> Option<&'static str> {
    PLACEHOLDERS
        .iter()
        .copied()
        .find(|name| !placeholder_offsets(template, name).is_empty())
}

/// Replace every code occurrence of `placeholder` in `template`.
pub fn substitute_placeholder(template: &str, placeholder: &str, replacement: &str) -> String {
    let offsets = placeholder_offsets(template, placeholder);
    let mut out = String::with_capacity(template.len() + replacement.len() * offsets.len());
    let mut last = 0;
    for start in offsets {
        out.push_str(&template[last..start]);
        out.push_str(replacement);
        last = start + placeholder.len();
    }
    out.push_str(&template[last..]);
    out
}

fn placeholder_offsets(template: &str, placeholder: &str) -> Vec<usize> {
    let Some(re) = cached(PatternKind::Placeholder, placeholder) else {
        return Vec::new();
    };
    let literal = literal_mask(template);
    let bytes = template.as_bytes();
    re.find_iter(template)
        .map(|m| m.start())
        .filter(|&start| !literal[start])
        .filter(|&start| !is_property_name(bytes, start))
        .filter(|&start| bytes.get(start + placeholder.len()) != Some(&b'$'))
        .collect()
}

/// `obj.value` names a property; `...value` spreads the placeholder.
fn is_property_name(bytes: &[u8], start: usize) -> bool {
    match start.checked_sub(1).map(|i| bytes[i]) {
        Some(b'$') => true,
        Some(b'.') => !bytes[..start].ends_with(b"..."),
        _ => false,
    }
}

fn literal_mask(text: &str) -> Vec<bool> {
    let bytes = text.as_bytes();
    let mut state = ScannerState::new();
    (0..bytes.len())
        .map(|i| state.step(bytes, i) == Lexeme::Literal)
        .collect()
}

/// Number of code occurrences of `placeholder` in `template`.
pub fn count_placeholder(template: &str, placeholder: &str) -> usize {
    placeholder_offsets(template, placeholder).len()
}

/// Whether `name` appears as a whole word anywhere in `text`.
pub fn mentions(text: &str, name: &str) -> bool {
    cached(PatternKind::Placeholder, name).is_some_and(|re| {
        let bytes = text.as_bytes();
        re.find_iter(text).any(|m| {
            let before = m.start().checked_sub(1).map(|i| bytes[i]);
            before != Some(b'$') && bytes.get(m.end()) != Some(&b'$')
        })
    })
}

/// A binding name based on `preferred` that `context` does not mention, so
/// an introduced arrow parameter never shadows a user identifier.
pub fn fresh_binding(preferred: &str, context: &str) -> String {
    if !mentions(context, preferred) {
        return preferred.to_string();
    }
    (1..)
        .map(|n| format!("{preferred}{n}"))
        .find(|candidate| !mentions(context, candidate))
        .unwrap_or_else(|| preferred.to_string())
}

/// Whether evaluating `expr` twice is indistinguishable from evaluating it
/// once: identifiers, plain member chains, and literals.
pub fn is_stable(expr: &str) -> bool {
    let expr = expr.trim();
    if expr.is_empty() {
        return false;
    }
    if quoted_literal(expr).is_some() || is_numeric_literal(expr) {
        return true;
    }
    expr.replace("?.", ".").split('.').all(|segment| {
        let (name, indices) = match segment.find('[') {
            Some(open) => (&segment[..open], &segment[open..]),
            None => (segment, ""),
        };
        is_identifier(name) && index_suffix(indices).is_some()
    })
}

pub fn is_numeric_literal(expr: &str) -> bool {
    let digits = expr.strip_prefix('-').unwrap_or(expr);
    digits.starts_with(|c: char| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '_')
}

/// Words that cannot be binding names, including strict-mode ones.
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Elements of an array literal, or `None` if `expr` is not one.
pub fn array_literal_elements(expr: &str) -> Option<Vec<&str>> {
    let inner = expr.trim().strip_prefix('[')?.strip_suffix(']')?;
    let elements = crate::args::split_args(inner);
    (elements.iter().all(|e| !e.is_empty() && !e.starts_with("..."))).then_some(elements)
}

/// Whether a receiver is `arguments` or a DOM collection that lacks array
/// methods: a property access ending in one of the collection properties,
/// or a `querySelectorAll(...)` / `getElementsBy*(...)` call.
pub fn is_array_like(target: &str) -> bool {
    const COLLECTION_PROPERTIES: &[&str] = &["children", "childNodes", "classList", "style", "files"];
    const COLLECTION_METHODS: &[&str] = &[".querySelectorAll(", ".getElementsBy"];

    let target = target.trim();
    if target == "arguments" {
        return true;
    }
    if let Some((_, property)) = target.rsplit_once('.')
        && COLLECTION_PROPERTIES.contains(&property)
    {
        return true;
    }
    COLLECTION_METHODS.iter().any(|method| {
        target
            .rfind(method)
            .is_some_and(|at| find_closing_paren(target, at) == target.len())
    })
}
