//! Call-site boundaries inside raw source text.
//!
//! A [`CallSite`] is the unit every builder works on: byte offsets of a whole
//! call expression (callee included) plus the raw text between its outer
//! parentheses. Offsets are byte offsets into the exact source being edited.

use crate::scanner::{Lexeme, ScannerState, is_ident_byte};

/// A detected invocation of a tracked function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite<'src> {
    /// Full text of the file being edited.
    pub source: &'src str,
    /// Start of the call expression (first byte of the callee).
    pub start: usize,
    /// One past the closing parenthesis.
    pub end: usize,
    /// Trimmed text between the outer parentheses.
    pub arguments: &'src str,
}

impl<'src> CallSite<'src> {
    pub fn new(source: &'src str, start: usize, end: usize, arguments: &'src str) -> Self {
        Self {
            source,
            start,
            end,
            arguments: arguments.trim(),
        }
    }

    /// Locate the call expression whose callee starts at `start`.
    ///
    /// Returns `None` when no balanced argument list follows.
    pub fn locate(source: &'src str, start: usize) -> Option<Self> {
        let open = find_open_paren(source, start)?;
        let end = find_closing_paren(source, start);
        if end == start {
            return None;
        }
        let arguments = source.get(open + 1..end - 1)?;
        Some(Self::new(source, start, end, arguments))
    }

    /// Source text of the whole call, or `""` if the offsets are unusable.
    pub fn text(&self) -> &'src str {
        self.source.get(self.start..self.end).unwrap_or("")
    }
}

fn find_open_paren(text: &str, from: usize) -> Option<usize> {
    let bytes = text.get(from..)?.as_bytes();
    let mut state = ScannerState::new();
    (0..bytes.len())
        .find(|&i| state.step(bytes, i) == Lexeme::Code && bytes[i] == b'(')
        .map(|i| from + i)
}

/// Index just past the `)` matching the first `(` found at or after `from`.
///
/// Parentheses inside string and template literals are ignored. When no `(`
/// exists, or it never closes, `from` is returned unchanged.
pub fn find_closing_paren(text: &str, from: usize) -> usize {
    let Some(open) = find_open_paren(text, from) else {
        return from;
    };
    let bytes = &text.as_bytes()[open..];
    let mut state = ScannerState::new();
    for i in 0..bytes.len() {
        if state.step(bytes, i) == Lexeme::Code && bytes[i] == b')' && state.paren_depth == 0 {
            return open + i + 1;
        }
    }
    from
}

/// Replacement text after folding a preceding `!` into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Absorbed {
    pub start: usize,
    pub text: String,
    pub negated: bool,
}

/// Fold a `!` that directly precedes the call (whitespace allowed) into the
/// replacement: `!isEmpty(x)` must become `!(x.length === 0)`, never
/// `!x.length === 0`.
pub fn absorb_leading_negation(call: &CallSite<'_>, expr: &str) -> Absorbed {
    match negation_index(call.source, call.start) {
        Some(bang) => Absorbed {
            start: bang,
            text: format!("!({expr})"),
            negated: true,
        },
        None => Absorbed {
            start: call.start,
            text: expr.to_string(),
            negated: false,
        },
    }
}

fn negation_index(source: &str, start: usize) -> Option<usize> {
    let before = source.as_bytes().get(..start)?;
    let idx = before.iter().rposition(|b| !b.is_ascii_whitespace())?;
    (before[idx] == b'!').then_some(idx)
}

/// Whether an operator-shaped replacement can stand at the call's position
/// without enclosing parentheses.
///
/// The call must sit between boundaries that bind looser than any operator:
/// an argument slot, a statement, an assignment right-hand side, an arrow
/// body, a `return`, or a ternary branch.
pub fn context_allows_bare(call: &CallSite<'_>) -> bool {
    preceded_by_boundary(call.source, call.start) && followed_by_boundary(call.source, call.end)
}

fn preceded_by_boundary(source: &str, start: usize) -> bool {
    let Some(before) = source.get(..start) else {
        return true;
    };
    let bytes = before.trim_end().as_bytes();
    let Some(&last) = bytes.last() else {
        return true;
    };
    let prev = bytes.len().checked_sub(2).map(|i| bytes[i]);

    match last {
        b'(' | b',' | b';' | b'{' | b'[' | b':' => true,
        b'?' => prev != Some(b'?'),
        b'=' => !matches!(prev, Some(b'=' | b'!' | b'<' | b'>')),
        b'>' => prev == Some(b'='),
        _ if is_ident_byte(last) => {
            let word_start = bytes
                .iter()
                .rposition(|&b| !is_ident_byte(b))
                .map_or(0, |i| i + 1);
            matches!(&before.trim_end()[word_start..], "return" | "throw" | "case")
        }
        _ => false,
    }
}

fn followed_by_boundary(source: &str, end: usize) -> bool {
    let Some(after) = source.get(end..) else {
        return true;
    };
    let rest = after.trim_start();
    let Some(&first) = rest.as_bytes().first() else {
        return true;
    };
    if matches!(first, b')' | b',' | b';' | b'}' | b']' | b':') {
        return true;
    }

    // A line break followed by a new statement ends the expression.
    let skipped = &after[..after.len() - rest.len()];
    skipped.contains('\n') && (is_ident_byte(first) || first == b'}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_paren_simple() {
        let src = "map(users, u => u.active);";
        assert_eq!(find_closing_paren(src, 0), 25);
        assert_eq!(&src[..25], "map(users, u => u.active)");
    }

    #[test]
    fn closing_paren_nested_and_quoted() {
        let src = "f(g(a), \")\", `(${h()}`) + 1";
        let end = find_closing_paren(src, 0);
        assert_eq!(&src[..end], "f(g(a), \")\", `(${h()}`)");
    }

    #[test]
    fn closing_paren_without_open_is_noop() {
        assert_eq!(find_closing_paren("value", 0), 0);
        assert_eq!(find_closing_paren("x + y", 2), 2);
    }

    #[test]
    fn closing_paren_unbalanced_is_noop() {
        assert_eq!(find_closing_paren("f(a, (b)", 0), 0);
    }

    #[test]
    fn closing_paren_out_of_range_is_noop() {
        assert_eq!(find_closing_paren("f()", 10), 10);
    }

    #[test]
    fn locate_extracts_arguments() {
        let src = "const x = _.map( users , fn );";
        let call = CallSite::locate(src, 10).expect("call");
        assert_eq!(call.text(), "_.map( users , fn )");
        assert_eq!(call.arguments, "users , fn");
        assert_eq!(call.end, 29);
    }

    #[test]
    fn locate_without_call_is_none() {
        assert!(CallSite::locate("const x = y;", 10).is_none());
    }

    #[test]
    fn negation_absorbed_across_whitespace() {
        let src = "if (! isNull(x)) {}";
        let call = CallSite::locate(src, 6).expect("call");
        let absorbed = absorb_leading_negation(&call, "x === null");
        assert_eq!(absorbed.start, 4);
        assert_eq!(absorbed.text, "!(x === null)");
        assert!(absorbed.negated);
    }

    #[test]
    fn negation_not_absorbed_for_inequality() {
        let src = "a != isNull(x)";
        let call = CallSite::locate(src, 5).expect("call");
        let absorbed = absorb_leading_negation(&call, "x === null");
        assert_eq!(absorbed.start, 5);
        assert_eq!(absorbed.text, "x === null");
        assert!(!absorbed.negated);
    }

    #[test]
    fn bare_context_boundaries() {
        let isolated = [
            "add(a, b)",
            "const x = add(a, b);",
            "f(add(a, b), c)",
            "return add(a, b)\n",
            "x => add(a, b)",
            "[add(a, b)]",
            "c ? add(a, b) : d",
        ];
        for src in isolated {
            let start = src.find("add").expect("add");
            let call = CallSite::locate(src, start).expect("call");
            assert!(context_allows_bare(&call), "{src}");
        }

        let embedded = [
            "add(a, b) * 2",
            "2 * add(a, b)",
            "x === add(a, b)",
            "add(a, b).toFixed(2)",
            "await add(a, b)",
        ];
        for src in embedded {
            let start = src.find("add").expect("add");
            let call = CallSite::locate(src, start).expect("call");
            assert!(!context_allows_bare(&call), "{src}");
        }
    }
}
