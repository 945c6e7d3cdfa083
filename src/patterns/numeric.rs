//! Arithmetic, comparison, and aggregate rewrites.

use std::borrow::Cow;

use crate::args::split_args;
use crate::classify::Idiom;

use super::FixRequest;
use super::util::{is_numeric_literal, is_stable, operand, receiver};

pub(super) fn build_binary(req: &FixRequest<'_>) -> Option<String> {
    let Some(Idiom::Binary(op)) = req.idiom() else {
        return None;
    };
    match split_args(req.arguments()).as_slice() {
        [lhs, rhs] => Some(format!("{} {} {}", operand(lhs), op.symbol(), operand(rhs))),
        _ => None,
    }
}

/// `sum` and `mean` over a numeric array.
pub(super) fn build_aggregate(req: &FixRequest<'_>) -> Option<String> {
    let [array] = split_args(req.arguments())[..] else {
        return None;
    };
    let total = format!("{}.reduce((sum, n) => sum + n, 0)", receiver(array));
    match req.idiom()? {
        Idiom::Sum => Some(total),
        Idiom::Mean if is_stable(array) => {
            Some(format!("{total} / {}.length", receiver(array)))
        }
        _ => None,
    }
}

pub(super) fn build_clamp(req: &FixRequest<'_>) -> Option<String> {
    let [number, lower, upper] = split_args(req.arguments())[..] else {
        return None;
    };
    Some(format!("Math.min(Math.max({number}, {lower}), {upper})"))
}

pub(super) fn build_in_range(req: &FixRequest<'_>) -> Option<String> {
    let [number, start, end] = split_args(req.arguments())[..] else {
        return None;
    };
    if !is_stable(number) {
        return None;
    }
    let number = operand(number);
    Some(format!(
        "{number} >= {} && {number} < {}",
        operand(start),
        operand(end)
    ))
}

/// A float in `[lower, upper)`. A non-zero lower bound is read twice.
pub(super) fn build_random(req: &FixRequest<'_>) -> Option<String> {
    let (lower, upper) = match split_args(req.arguments())[..] {
        [upper] => ("0", upper),
        [lower, upper] => (lower, upper),
        _ => return None,
    };
    if lower == "0" {
        return Some(format!("Math.random() * {}", bound(upper)));
    }
    if !is_stable(lower) {
        return None;
    }
    let (lower, upper) = (bound(lower), bound(upper));
    Some(format!("Math.random() * ({upper} - {lower}) + {lower}"))
}

/// Unsigned number literals need no parentheses next to `*`, `-` or `+`.
fn bound(expr: &str) -> Cow<'_, str> {
    let expr = expr.trim();
    if is_numeric_literal(expr) && !expr.starts_with('-') {
        Cow::Borrowed(expr)
    } else {
        operand(expr)
    }
}
