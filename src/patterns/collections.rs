//! Collection-shaped rewrites: grouping, sorting, key selection, slicing.

use crate::args::split_args;
use crate::classify::{Idiom, SliceKind, is_identifier};

use super::FixRequest;
use super::util::{
    Iteratee, array_literal_elements, fresh_binding, is_reserved_word, is_stable, operand,
    quoted_literal, receiver,
};

/// Exactly two top-level arguments.
fn two_args(arguments: &str) -> Option<(&str, &str)> {
    match split_args(arguments).as_slice() {
        [first, second] => Some((*first, *second)),
        _ => None,
    }
}

// ============================================================================
// groupBy / keyBy / countBy
// ============================================================================

pub(super) fn build_group_by(req: &FixRequest<'_>) -> Option<String> {
    let (collection, iteratee) = two_args(req.arguments())?;
    let iteratee = Iteratee::parse(iteratee)?;
    Some(format!(
        "Object.groupBy({collection}, {})",
        iteratee.as_function()
    ))
}

pub(super) fn build_key_by(req: &FixRequest<'_>) -> Option<String> {
    let (collection, iteratee) = two_args(req.arguments())?;
    let iteratee = Iteratee::parse(iteratee)?;
    let item = fresh_binding("item", req.arguments());
    Some(format!(
        "Object.fromEntries({}.map({item} => [{}, {item}]))",
        receiver(collection),
        iteratee.apply(&item)
    ))
}

pub(super) fn build_count_by(req: &FixRequest<'_>) -> Option<String> {
    let (collection, iteratee) = two_args(req.arguments())?;
    let iteratee = Iteratee::parse(iteratee)?;
    let args = req.arguments();
    let counts = fresh_binding("counts", args);
    let item = fresh_binding("item", args);
    let key = fresh_binding("key", args);
    Some(format!(
        "{}.reduce(({counts}, {item}) => {{ const {key} = {}; {counts}[{key}] = ({counts}[{key}] ?? 0) + 1; return {counts}; }}, {{}})",
        receiver(collection),
        iteratee.apply(&item)
    ))
}

// ============================================================================
// orderBy / sortBy / reject
// ============================================================================

/// Three-way comparator over `key`.
fn comparator(key: &Iteratee<'_>, descending: bool, context: &str) -> String {
    let a = fresh_binding("a", context);
    let b = fresh_binding("b", context);
    let (x, y) = (key.apply(&a), key.apply(&b));
    let (before, after) = if descending { ("1", "-1") } else { ("-1", "1") };
    format!("({a}, {b}) => {x} < {y} ? {before} : {x} > {y} ? {after} : 0")
}

/// A single sort key, possibly wrapped in a one-element array literal.
fn single_key(arg: &str) -> Option<Iteratee<'_>> {
    match array_literal_elements(arg) {
        Some(elements) => match elements.as_slice() {
            [only] => Iteratee::parse(*only),
            _ => None,
        },
        None => Iteratee::parse(arg),
    }
}

/// `'asc'` / `'desc'`, bare or in a one-element array.
fn sort_order(arg: &str) -> Option<bool> {
    let order = match array_literal_elements(arg) {
        Some(elements) => match elements.as_slice() {
            [only] => quoted_literal(*only)?,
            _ => return None,
        },
        None => quoted_literal(arg)?,
    };
    match order {
        "asc" => Some(false),
        "desc" => Some(true),
        _ => None,
    }
}

pub(super) fn build_order_by(req: &FixRequest<'_>) -> Option<String> {
    let args = split_args(req.arguments());
    let (collection, key, descending) = match args.as_slice() {
        [collection, key] => (*collection, single_key(key)?, false),
        [collection, key, order] => (*collection, single_key(key)?, sort_order(order)?),
        _ => return None,
    };
    Some(format!(
        "{}.toSorted({})",
        receiver(collection),
        comparator(&key, descending, req.arguments())
    ))
}

/// `sortBy` compares numerically: keys are subtracted, and elements without
/// a key use the default `toSorted()` order.
pub(super) fn build_sort_by(req: &FixRequest<'_>) -> Option<String> {
    let args = split_args(req.arguments());
    match args.as_slice() {
        [collection] => Some(format!("{}.toSorted()", receiver(collection))),
        [collection, key] => {
            let key = single_key(key)?;
            let a = fresh_binding("a", req.arguments());
            let b = fresh_binding("b", req.arguments());
            Some(format!(
                "{}.toSorted(({a}, {b}) => {} - {})",
                receiver(collection),
                key.apply(&a),
                key.apply(&b)
            ))
        }
        _ => None,
    }
}

pub(super) fn build_reject(req: &FixRequest<'_>) -> Option<String> {
    let (collection, predicate) = two_args(req.arguments())?;
    let predicate = Iteratee::parse(predicate)?;
    let item = fresh_binding("item", req.arguments());
    Some(format!(
        "{}.filter({item} => !{})",
        receiver(collection),
        predicate.apply(&item)
    ))
}

// ============================================================================
// omit / pick / has
// ============================================================================

/// Key names given as string arguments or string array literals.
fn literal_keys<'a>(keys: &[&'a str]) -> Option<Vec<&'a str>> {
    let mut out = Vec::new();
    for &key in keys {
        match array_literal_elements(key) {
            Some(elements) => {
                for element in elements {
                    out.push(quoted_literal(element)?);
                }
            }
            None => out.push(quoted_literal(key)?),
        }
    }
    Some(out)
}

/// `'a.b'` and `'a[0]'` name nested properties, not own keys.
fn is_deep_path(name: &str) -> bool {
    name.contains(['.', '['])
}

pub(super) fn build_omit(req: &FixRequest<'_>) -> Option<String> {
    let args = split_args(req.arguments());
    let (object, keys) = args.split_first()?;
    let keys = literal_keys(keys)?;
    if keys.is_empty()
        || !keys
            .iter()
            .all(|key| is_identifier(key) && !is_reserved_word(key))
    {
        return None;
    }
    let rest = fresh_binding("rest", &keys.join(" "));
    Some(format!(
        "(({{ {}, ...{rest} }}) => {rest})({object})",
        keys.join(", ")
    ))
}

pub(super) fn build_pick(req: &FixRequest<'_>) -> Option<String> {
    let args = split_args(req.arguments());
    let (object, keys) = args.split_first()?;
    if !is_stable(object) {
        return None;
    }
    let keys = match keys {
        [] => return None,
        [single] if array_literal_elements(single).is_some() || !single.starts_with(['\'', '"']) => {
            let elements = array_literal_elements(single).unwrap_or_default();
            if elements
                .iter()
                .any(|element| quoted_literal(element).is_some_and(is_deep_path))
            {
                return None;
            }
            receiver(single).into_owned()
        }
        _ => {
            let names = literal_keys(keys)?;
            if names
                .iter()
                .any(|name| name.contains(['\'', '\\']) || is_deep_path(name))
            {
                return None;
            }
            let quoted: Vec<String> = names.iter().map(|name| format!("'{name}'")).collect();
            format!("[{}]", quoted.join(", "))
        }
    };
    let key = fresh_binding("key", req.arguments());
    Some(format!(
        "Object.fromEntries({keys}.filter({key} => {key} in {object}).map({key} => [{key}, {object}[{key}]]))"
    ))
}

pub(super) fn build_has(req: &FixRequest<'_>) -> Option<String> {
    let (object, key) = two_args(req.arguments())?;
    if array_literal_elements(key).is_some() {
        return None;
    }
    if quoted_literal(key).is_some_and(is_deep_path) {
        return None;
    }
    Some(format!("Object.hasOwn({object}, {key})"))
}

// ============================================================================
// chunk / slice family
// ============================================================================

pub(super) fn build_chunk(req: &FixRequest<'_>) -> Option<String> {
    let (array, size) = two_args(req.arguments())?;
    if !is_stable(array) || !is_stable(size) {
        return None;
    }
    let array = receiver(array);
    let size = operand(size);
    let index = fresh_binding("i", req.arguments());
    let hole = fresh_binding("_", req.arguments());
    Some(format!(
        "Array.from({{ length: Math.ceil({array}.length / {size}) }}, ({hole}, {index}) => {array}.slice({index} * {size}, {index} * {size} + {size}))"
    ))
}

pub(super) fn build_slice(req: &FixRequest<'_>) -> Option<String> {
    let Some(Idiom::Slice(kind)) = req.idiom() else {
        return None;
    };
    let args = split_args(req.arguments());
    let (array, n) = match args.as_slice() {
        [array] => (*array, "1"),
        [array, n] => (*array, *n),
        _ => return None,
    };
    let array = receiver(array);
    let n = operand(n);

    // `-0` would flip the meaning of the right-hand variants.
    let zero = n == "0";
    Some(match kind {
        SliceKind::Drop => format!("{array}.slice({n})"),
        SliceKind::Take => format!("{array}.slice(0, {n})"),
        SliceKind::DropRight if zero => format!("{array}.slice()"),
        SliceKind::DropRight => format!("{array}.slice(0, -{n})"),
        SliceKind::TakeRight if zero => format!("{array}.slice(0, 0)"),
        SliceKind::TakeRight => format!("{array}.slice(-{n})"),
    })
}
