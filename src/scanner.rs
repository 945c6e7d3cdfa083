//! Single-pass lexical scanner over JavaScript expression text.
//!
//! The scanner never produces tokens. It classifies each byte by lexical
//! context (plain code, string literal, template literal) while tracking the
//! nesting depth of `()`, `{}` and `[]`, and answers two narrow questions on
//! top of that: where the first top-level comma is, and whether an expression
//! must be parenthesised before `.method(...)` can be appended to it.
//!
//! Every delimiter the scanner reacts to is ASCII, so walking bytes is safe for
//! UTF-8 input and every index it reports lies on a char boundary.

/// Classification of a single byte by [`ScannerState::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme {
    /// Plain code outside any literal, nesting delimiters included.
    Code,
    /// Part of a string or template literal, including its quotes.
    Literal,
}

/// Transient state of one scan. Created fresh per scan and dropped after.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScannerState {
    pub paren_depth: i32,
    pub brace_depth: i32,
    pub bracket_depth: i32,
    /// Quote byte of the currently open string literal.
    pub string_quote: Option<u8>,
    pub in_template: bool,
    /// Depth of `${ ... }` interpolation inside the open template literal.
    pub template_depth: u32,
}

impl ScannerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_string(&self) -> bool {
        self.string_quote.is_some()
    }

    pub fn in_literal(&self) -> bool {
        self.in_string() || self.in_template
    }

    /// Outside every literal and every `()`, `{}` and `[]` pair.
    pub fn at_top_level(&self) -> bool {
        !self.in_literal()
            && self.paren_depth == 0
            && self.brace_depth == 0
            && self.bracket_depth == 0
    }

    /// Advance over `bytes[i]` and report how it was classified.
    ///
    /// Evaluation order matters: template literals first (a backtick inside a
    /// plain string is just a character), then string literals (a quote inside
    /// a template is just a character), then nesting counters, which only move
    /// outside both kinds of literal.
    pub fn step(&mut self, bytes: &[u8], i: usize) -> Lexeme {
        let b = bytes[i];

        if b == b'`' && !self.in_string() {
            if !self.in_template {
                self.in_template = true;
            } else if self.template_depth == 0 && !is_escaped(bytes, i) {
                self.in_template = false;
            }
            return Lexeme::Literal;
        }

        if self.in_template {
            match b {
                b'{' if self.template_depth > 0 || opens_interpolation(bytes, i) => {
                    self.template_depth += 1;
                }
                b'}' if self.template_depth > 0 => self.template_depth -= 1,
                _ => {}
            }
            return Lexeme::Literal;
        }

        if let Some(quote) = self.string_quote {
            if b == quote && !is_escaped(bytes, i) {
                self.string_quote = None;
            }
            return Lexeme::Literal;
        }

        match b {
            b'"' | b'\'' => {
                self.string_quote = Some(b);
                return Lexeme::Literal;
            }
            b'(' => self.paren_depth += 1,
            b')' => self.paren_depth -= 1,
            b'{' => self.brace_depth += 1,
            b'}' => self.brace_depth -= 1,
            b'[' => self.bracket_depth += 1,
            b']' => self.bracket_depth -= 1,
            _ => {}
        }
        Lexeme::Code
    }
}

/// A byte is escaped when an odd-length run of backslashes precedes it.
///
/// `"a\\"` therefore closes at its final quote while `"a\"` does not.
pub fn is_escaped(bytes: &[u8], i: usize) -> bool {
    let run = bytes[..i].iter().rev().take_while(|&&b| b == b'\\').count();
    run % 2 == 1
}

fn opens_interpolation(bytes: &[u8], i: usize) -> bool {
    i > 0 && bytes[i - 1] == b'$' && !is_escaped(bytes, i - 1)
}

/// Walk `text` and call `visit` for every code byte with the state after it.
///
/// Stops at the first `Some` returned by `visit`.
pub fn scan_code<T>(text: &str, mut visit: impl FnMut(usize, &ScannerState) -> Option<T>) -> Option<T> {
    let bytes = text.as_bytes();
    let mut state = ScannerState::new();
    for i in 0..bytes.len() {
        if state.step(bytes, i) == Lexeme::Code
            && let Some(found) = visit(i, &state)
        {
            return Some(found);
        }
    }
    None
}

/// Byte index of the first comma outside all nesting and all literals.
pub fn top_level_comma_index(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    scan_code(text, |i, state| {
        (bytes[i] == b',' && state.at_top_level()).then_some(i)
    })
}

/// Whether `expr` must be wrapped in parentheses before `.method(...)` is
/// appended to it.
///
/// True when some operator outside all nesting binds looser than member
/// access: logical and nullish operators, a ternary `?` (but not optional
/// chaining `?.`), assignment and arrows, every other binary operator, a
/// top-level comma, keyword operators such as `typeof` or `in`, and leading
/// unary operators. Bare integer literals (`5.toFixed()` does not parse) and
/// `new X` without an argument list also need wrapping.
pub fn needs_receiver_parens(expr: &str) -> bool {
    let expr = expr.trim();
    if expr.is_empty() {
        return false;
    }

    if expr.starts_with(['!', '~']) || is_integer_literal(expr) || is_bare_new(expr) {
        return true;
    }

    let bytes = expr.as_bytes();
    scan_code(expr, |i, state| {
        (state.at_top_level() && is_loose_operator_at(bytes, i)).then_some(())
    })
    .is_some()
}

fn is_loose_operator_at(bytes: &[u8], i: usize) -> bool {
    let next = bytes.get(i + 1).copied();
    match bytes[i] {
        b'|' | b'&' | b'^' | b'=' | b'<' | b'>' | b'+' | b'-' | b'*' | b'/' | b'%' | b',' => true,
        b'!' => next == Some(b'='),
        b'?' => is_ternary_or_nullish(bytes, i),
        b'a'..=b'z' => is_keyword_operator_at(bytes, i),
        _ => false,
    }
}

fn is_ternary_or_nullish(bytes: &[u8], i: usize) -> bool {
    match bytes.get(i + 1) {
        Some(b'?') => true,
        // `?.5` is a ternary followed by a decimal literal, not optional chaining.
        Some(b'.') => bytes.get(i + 2).is_some_and(u8::is_ascii_digit),
        _ => i == 0 || bytes[i - 1] != b'?',
    }
}

const KEYWORD_OPERATORS: &[&str] = &[
    "in",
    "instanceof",
    "typeof",
    "void",
    "await",
    "delete",
    "yield",
];

fn is_keyword_operator_at(bytes: &[u8], i: usize) -> bool {
    if i > 0 && (is_ident_byte(bytes[i - 1]) || bytes[i - 1] == b'.') {
        return false;
    }
    let word_end = bytes[i..]
        .iter()
        .position(|&b| !is_ident_byte(b))
        .map_or(bytes.len(), |len| i + len);
    KEYWORD_OPERATORS
        .iter()
        .any(|kw| kw.as_bytes() == &bytes[i..word_end])
}

pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_integer_literal(expr: &str) -> bool {
    let mut bytes = expr.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_digit())
        && bytes.all(|b| b.is_ascii_digit() || b == b'_')
}

fn is_bare_new(expr: &str) -> bool {
    expr.strip_prefix("new")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
        && !expr.ends_with(')')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_at_top_level() {
        assert_eq!(top_level_comma_index("users, u => u.active"), Some(5));
        assert_eq!(top_level_comma_index("a"), None);
        assert_eq!(top_level_comma_index(""), None);
        assert_eq!(top_level_comma_index("   "), None);
    }

    #[test]
    fn comma_skips_nesting() {
        assert_eq!(top_level_comma_index("f(a, b), c"), Some(7));
        assert_eq!(top_level_comma_index("{ a: 1, b: 2 }, c"), Some(14));
        assert_eq!(top_level_comma_index("[1, 2], c"), Some(6));
        assert_eq!(top_level_comma_index("f(a, [b, { c, d }])"), None);
    }

    #[test]
    fn comma_skips_strings() {
        assert_eq!(top_level_comma_index("'a,b', c"), Some(5));
        assert_eq!(top_level_comma_index(r#""a\",b", c"#), Some(7));
        assert_eq!(top_level_comma_index("\"(\", x"), Some(3));
    }

    #[test]
    fn comma_skips_template_literals() {
        assert_eq!(top_level_comma_index("`a,b`, c"), Some(5));
        assert_eq!(top_level_comma_index("`${f(a, b)}`, c"), Some(12));
        assert_eq!(top_level_comma_index("`${ { k: 1, j: 2 }.k }`, c"), Some(23));
        assert_eq!(top_level_comma_index("`\\`,`, c"), Some(5));
    }

    #[test]
    fn escaped_backslash_run_closes_string() {
        // "a\\" is a complete string: the final quote is not escaped.
        assert_eq!(top_level_comma_index(r#""a\\", b"#), Some(5));
        // "a\\\"" keeps going past the escaped quote.
        assert_eq!(top_level_comma_index(r#""a\\\",", b"#), Some(8));
    }

    #[test]
    fn escape_parity() {
        let bytes = br#"a\"b\\"c"#;
        assert!(is_escaped(bytes, 2));
        assert!(!is_escaped(bytes, 6));
    }

    #[test]
    fn receiver_parens_for_logical_operators() {
        assert!(needs_receiver_parens("data?.items || []"));
        assert!(needs_receiver_parens("a && b"));
        assert!(needs_receiver_parens("a ?? b"));
        assert!(needs_receiver_parens("cond ? a : b"));
        assert!(needs_receiver_parens("x = y"));
        assert!(needs_receiver_parens("x => x.id"));
    }

    #[test]
    fn receiver_parens_not_needed_for_member_chains() {
        assert!(!needs_receiver_parens("users"));
        assert!(!needs_receiver_parens("data?.items"));
        assert!(!needs_receiver_parens("a?.b?.[0]"));
        assert!(!needs_receiver_parens("getUsers(a || b)"));
        assert!(!needs_receiver_parens("obj.delete(key)"));
        assert!(!needs_receiver_parens("'a || b'"));
        assert!(!needs_receiver_parens("`${a || b}`"));
        assert!(!needs_receiver_parens("new Map()"));
        assert!(!needs_receiver_parens("[a, b || c]"));
        assert!(!needs_receiver_parens("{ a: b ?? c }"));
        assert!(!needs_receiver_parens("1.5"));
        assert!(!needs_receiver_parens(""));
        assert!(!needs_receiver_parens("   "));
    }

    #[test]
    fn receiver_parens_for_other_operators() {
        assert!(needs_receiver_parens("a + b"));
        assert!(needs_receiver_parens("a === b"));
        assert!(needs_receiver_parens("-1"));
        assert!(needs_receiver_parens("!ready"));
        assert!(needs_receiver_parens("typeof x"));
        assert!(needs_receiver_parens("key in obj"));
        assert!(needs_receiver_parens("await load()"));
        assert!(needs_receiver_parens("new Foo"));
        assert!(needs_receiver_parens("5"));
        assert!(needs_receiver_parens("c ?.5 : 1"));
    }

    #[test]
    fn parenthesised_expression_never_needs_more() {
        for expr in [
            "a || b",
            "cond ? a : b",
            "x => x",
            "!ready",
            "-1",
            "5",
            "new Foo",
            "a ?? b",
            "typeof x",
        ] {
            assert!(needs_receiver_parens(expr), "{expr}");
            let wrapped = format!("({expr})");
            assert!(!needs_receiver_parens(&wrapped), "{wrapped}");
        }
    }

    #[test]
    fn state_tracks_depths() {
        let text = "f({ a: [1";
        let bytes = text.as_bytes();
        let mut state = ScannerState::new();
        for i in 0..bytes.len() {
            state.step(bytes, i);
        }
        assert_eq!(state.paren_depth, 1);
        assert_eq!(state.brace_depth, 1);
        assert_eq!(state.bracket_depth, 1);
        assert!(!state.at_top_level());
    }
}
