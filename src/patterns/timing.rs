//! Scheduling (`delay`, `defer`) and sequence generators (`times`, `range`).

use crate::args::{split_args, split_first_arg};
use crate::classify::{Generator, Idiom, Schedule};

use super::FixRequest;
use super::util::{callable, fresh_binding, is_numeric_literal, is_stable, operand};

// ============================================================================
// delay / defer
// ============================================================================

pub(super) fn build_schedule(req: &FixRequest<'_>) -> Option<String> {
    let Some(Idiom::Schedule(kind)) = req.idiom() else {
        return None;
    };
    let arguments = req.arguments();
    if arguments.is_empty() {
        return None;
    }
    let (func, rest) = split_first_arg(arguments).unwrap_or((arguments, ""));

    Some(match (kind, rest.is_empty()) {
        (_, true) => format!("setTimeout({func}, 0)"),
        // `delay(func, wait, ...args)` already has setTimeout's argument order.
        (Schedule::Delay, false) => format!("setTimeout({func}, {rest})"),
        (Schedule::Defer, false) => format!("setTimeout({func}, 0, {rest})"),
    })
}

// ============================================================================
// times / range / rangeRight
// ============================================================================

pub(super) fn build_generator(req: &FixRequest<'_>) -> Option<String> {
    let Some(Idiom::Generate(kind)) = req.idiom() else {
        return None;
    };
    let args = split_args(req.arguments());
    let hole = fresh_binding("_", req.arguments());
    let index = fresh_binding("i", req.arguments());

    match kind {
        Generator::Times => {
            let (count, body) = match args[..] {
                [count] => (count, index.clone()),
                [count, iteratee] => (count, format!("{}({index})", callable(iteratee))),
                _ => return None,
            };
            Some(format!(
                "Array.from({{ length: {count} }}, ({hole}, {index}) => {body})"
            ))
        }
        Generator::Range | Generator::RangeRight => {
            let (start, end) = match args[..] {
                [end] => (None, end),
                [start, end] => (Some(start), end),
                _ => return None,
            };
            if descends(start.unwrap_or("0"), end) {
                return None;
            }
            let length = match start {
                Some(start) if start != "0" => {
                    if !is_stable(start) {
                        return None;
                    }
                    format!("{} - {}", operand(end), operand(start))
                }
                _ => end.to_string(),
            };
            let value = match (kind, start) {
                (Generator::Range, Some(start)) if start != "0" => {
                    format!("{} + {index}", operand(start))
                }
                (Generator::Range, _) => index.clone(),
                _ => {
                    if !is_stable(end) {
                        return None;
                    }
                    format!("{} - 1 - {index}", operand(end))
                }
            };
            Some(format!(
                "Array.from({{ length: {length} }}, ({hole}, {index}) => {value})"
            ))
        }
    }
}

/// Literal bounds that lodash would walk downwards; `Array.from` would throw
/// on the negative length instead.
fn descends(start: &str, end: &str) -> bool {
    if !(is_numeric_literal(start) && is_numeric_literal(end)) {
        return false;
    }
    match (parse_number(start), parse_number(end)) {
        (Some(start), Some(end)) => end < start,
        _ => true,
    }
}

fn parse_number(literal: &str) -> Option<f64> {
    literal.replace('_', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use crate::classify::templates as t;
    use crate::locator::CallSite;
    use crate::patterns::build_replacement;

    fn rewrite(source: &str, template: &str, function: &str) -> Option<String> {
        let call = CallSite::locate(source, 0)?;
        build_replacement(&call, template, function).map(|fix| fix.text)
    }

    #[test]
    fn delay_keeps_argument_order() {
        assert_eq!(
            rewrite("delay(log, 100, 'x')", t::DELAY, "delay").as_deref(),
            Some("setTimeout(log, 100, 'x')")
        );
        assert_eq!(
            rewrite("delay(log)", t::DELAY, "delay").as_deref(),
            Some("setTimeout(log, 0)")
        );
        assert_eq!(rewrite("delay()", t::DELAY, "delay"), None);
    }

    #[test]
    fn defer_inserts_zero_wait() {
        assert_eq!(
            rewrite("defer(() => save(doc))", t::DEFER, "defer").as_deref(),
            Some("setTimeout(() => save(doc), 0)")
        );
        assert_eq!(
            rewrite("defer(log, 'a', 'b')", t::DEFER, "defer").as_deref(),
            Some("setTimeout(log, 0, 'a', 'b')")
        );
    }

    #[test]
    fn times_avoids_lodash_shadowing() {
        assert_eq!(
            rewrite("times(3)", t::TIMES, "times").as_deref(),
            Some("Array.from({ length: 3 }, (_, i) => i)")
        );
        assert_eq!(
            rewrite("times(3, () => _.random(9))", t::TIMES, "times").as_deref(),
            Some("Array.from({ length: 3 }, (_1, i) => (() => _.random(9))(i))")
        );
    }

    #[test]
    fn ranges() {
        assert_eq!(
            rewrite("range(5)", t::RANGE, "range").as_deref(),
            Some("Array.from({ length: 5 }, (_, i) => i)")
        );
        assert_eq!(
            rewrite("range(lo, hi)", t::RANGE, "range").as_deref(),
            Some("Array.from({ length: hi - lo }, (_, i) => lo + i)")
        );
        assert_eq!(
            rewrite("rangeRight(n)", t::RANGE_RIGHT, "rangeRight").as_deref(),
            Some("Array.from({ length: n }, (_, i) => n - 1 - i)")
        );
        assert_eq!(rewrite("range(5, 0)", t::RANGE, "range"), None);
        assert_eq!(rewrite("range(0, 10, 2)", t::RANGE, "range"), None);
    }
}
