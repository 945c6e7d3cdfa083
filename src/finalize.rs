//! Post-processing shared by every rewrite rule.

use crate::fix::FixResult;
use crate::locator::{CallSite, absorb_leading_negation, context_allows_bare};
use crate::scanner::needs_receiver_parens;

/// Turn a bare replacement expression into a [`FixResult`] for `call`.
///
/// A `!` directly before the call is folded in as `!(expr)`. Otherwise an
/// expression with a loose top-level operator is parenthesised unless the
/// call already sits in an isolated slot, and an object literal is
/// parenthesised where `{` would open a block. A result that would join the
/// previous line's expression gets a leading `;`.
pub fn finalize(call: &CallSite<'_>, expr: &str) -> FixResult {
    let absorbed = absorb_leading_negation(call, expr);
    let text = if absorbed.negated {
        absorbed.text
    } else if needs_receiver_parens(expr) && !context_allows_bare(call) {
        format!("({expr})")
    } else if expr.starts_with('{') && opens_block(call) {
        format!("({expr})")
    } else {
        absorbed.text
    };
    let text = if text.starts_with(['[', '(', '`'])
        && continues_previous_line(call.source, absorbed.start)
    {
        format!(";{text}")
    } else {
        text
    };
    FixResult::new(absorbed.start..call.end, text)
}

/// Keywords after which a new line cannot continue an expression.
const STATEMENT_KEYWORDS: &[&str] = &[
    "await", "case", "delete", "do", "else", "in", "instanceof", "new", "of", "return", "throw",
    "typeof", "void", "yield",
];

/// Whether `start` opens a line whose predecessor ends an expression with no
/// `;`, so a leading `[`, `(` or `` ` `` would continue it.
fn continues_previous_line(source: &str, start: usize) -> bool {
    let before = source.get(..start).unwrap_or("");
    let Some(newline) = before.rfind('\n') else {
        return false;
    };
    if !before[newline + 1..].chars().all(|c| c == ' ' || c == '\t') {
        return false;
    }
    let previous = before[..newline].trim_end();
    let Some(last) = previous.chars().next_back() else {
        return false;
    };
    let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    if is_word(last) {
        let word_start = previous
            .char_indices()
            .rev()
            .take_while(|&(_, c)| is_word(c))
            .last()
            .map_or(previous.len(), |(i, _)| i);
        return !STATEMENT_KEYWORDS.contains(&&previous[word_start..]);
    }
    match last {
        ')' => !closes_control_header(previous),
        ']' | '\'' | '"' | '`' => true,
        _ => false,
    }
}

/// `if (...)`, `while (...)`, `for (...)` or `with (...)` ending `line`.
fn closes_control_header(line: &str) -> bool {
    let mut depth = 0usize;
    for (i, c) in line.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    let head = line[..i].trim_end();
                    return ["if", "while", "for", "with"].iter().any(|kw| {
                        head.strip_suffix(kw).is_some_and(|rest| {
                            !rest.ends_with(|c: char| c.is_alphanumeric() || c == '_' || c == '$')
                        })
                    });
                }
            }
            _ => {}
        }
    }
    false
}

fn opens_block(call: &CallSite<'_>) -> bool {
    let before = call.source.get(..call.start).unwrap_or("").trim_end();
    before.is_empty() || before.ends_with("=>") || before.ends_with([';', '{', '}'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finalize_at(source: &str, callee: &str, expr: &str) -> String {
        let start = source.find(callee).expect("callee");
        let call = CallSite::locate(source, start).expect("call");
        let fix = finalize(&call, expr);
        fix.apply_to(source).expect("apply")
    }

    #[test]
    fn isolated_call_stays_bare() {
        assert_eq!(
            finalize_at("const x = isNull(v);", "isNull", "v === null"),
            "const x = v === null;"
        );
        assert_eq!(
            finalize_at("if (isNull(v)) {}", "isNull", "v === null"),
            "if (v === null) {}"
        );
    }

    #[test]
    fn negation_folded() {
        assert_eq!(
            finalize_at("if (!isEmpty(x)) {}", "isEmpty", "x.length === 0"),
            "if (!(x.length === 0)) {}"
        );
    }

    #[test]
    fn embedded_operator_expression_wrapped() {
        assert_eq!(
            finalize_at("const y = add(a, b) * 2;", "add", "a + b"),
            "const y = (a + b) * 2;"
        );
        assert_eq!(
            finalize_at("const s = sum(xs).toFixed(2);", "sum", "xs.reduce((s, n) => s + n, 0)"),
            "const s = xs.reduce((s, n) => s + n, 0).toFixed(2);"
        );
    }

    #[test]
    fn object_literal_after_arrow_wrapped() {
        assert_eq!(
            finalize_at("const f = () => stubObject();", "stubObject", "{}"),
            "const f = () => ({});"
        );
        assert_eq!(
            finalize_at("const o = stubObject();", "stubObject", "{}"),
            "const o = {};"
        );
    }

    #[test]
    fn statement_start_after_unterminated_line_gets_semicolon() {
        assert_eq!(
            finalize_at("const a = b\nuniq(ids).forEach(f)\n", "uniq", "[...new Set(ids)]"),
            "const a = b\n;[...new Set(ids)].forEach(f)\n"
        );
        assert_eq!(
            finalize_at("f(x)\n  add(a, b).toString()", "add", "(a + b)"),
            "f(x)\n  ;(a + b).toString()"
        );
    }

    #[test]
    fn terminated_or_open_line_needs_no_semicolon() {
        assert_eq!(
            finalize_at("const a = b;\nuniq(ids).forEach(f)", "uniq", "[...new Set(ids)]"),
            "const a = b;\n[...new Set(ids)].forEach(f)"
        );
        assert_eq!(
            finalize_at("const a =\n  uniq(ids)", "uniq", "[...new Set(ids)]"),
            "const a =\n  [...new Set(ids)]"
        );
        assert_eq!(
            finalize_at("if (x) {\nuniq(ids).forEach(f)", "uniq", "[...new Set(ids)]"),
            "if (x) {\n[...new Set(ids)].forEach(f)"
        );
        assert_eq!(
            finalize_at("else\nuniq(ids).forEach(f)", "uniq", "[...new Set(ids)]"),
            "else\n[...new Set(ids)].forEach(f)"
        );
        assert_eq!(
            finalize_at("if (ready(x))\n  uniq(ids).forEach(f)", "uniq", "[...new Set(ids)]"),
            "if (ready(x))\n  [...new Set(ids)].forEach(f)"
        );
        assert_eq!(
            finalize_at("const a = b\nhead(xs)", "head", "xs.at(0)"),
            "const a = b\nxs.at(0)"
        );
    }
}
