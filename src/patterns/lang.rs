//! Stubs, type checks, coercions, and generic placeholder substitution.

use crate::args::split_args;
use crate::classify::{Idiom, Shape};

use super::FixRequest;
use super::util::{count_placeholder, is_stable, operand, substitute_placeholder};

pub(super) fn build_zero_arg_static(req: &FixRequest<'_>) -> Option<String> {
    let Shape::ZeroArgStatic { callee } = req.shape else {
        return None;
    };
    req.arguments().is_empty().then(|| format!("{callee}()"))
}

/// Literal stubs replace the whole call; any argument means the call was
/// not the plain stub.
pub(super) fn build_stub(req: &FixRequest<'_>) -> Option<String> {
    let Shape::Stub(literal) = req.shape else {
        return None;
    };
    req.arguments().is_empty().then(|| literal.to_string())
}

pub(super) fn build_instance_of(req: &FixRequest<'_>) -> Option<String> {
    let Some(Idiom::InstanceOf(ty)) = req.idiom() else {
        return None;
    };
    let [value] = split_args(req.arguments())[..] else {
        return None;
    };
    Some(format!("{} instanceof {ty}", operand(value)))
}

/// Substitute the single argument for the template's placeholder.
///
/// Templates that mention the placeholder more than once need a stable
/// argument; `isNil(load())` must not call `load` twice.
pub(super) fn build_substitution(req: &FixRequest<'_>) -> Option<String> {
    let placeholder = match req.idiom()? {
        Idiom::Template { placeholder } => placeholder?,
        Idiom::Coerce => "value",
        _ => return None,
    };
    let [argument] = split_args(req.arguments())[..] else {
        return None;
    };
    if count_placeholder(req.template, placeholder) > 1 && !is_stable(argument) {
        return None;
    }
    Some(substitute_placeholder(
        req.template.trim(),
        placeholder,
        &operand(argument),
    ))
}
