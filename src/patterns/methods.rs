//! Call-shaped rewrites: constructors, static and global functions, and
//! instance methods on the first argument.

use itertools::Itertools;

use crate::args::{split_args, split_first_arg};
use crate::classify::Shape;

use super::FixRequest;
use super::util::{Iteratee, is_array_like, receiver};

/// Methods whose first argument is a lodash iteratee and may be given as a
/// property-path string.
const ITERATEE_METHODS: &[&str] = &[
    "map",
    "filter",
    "find",
    "findIndex",
    "findLast",
    "findLastIndex",
    "some",
    "every",
    "flatMap",
];

/// Template parameter names that are values, not placeholders.
const LITERAL_WORDS: &[&str] = &["null", "undefined", "true", "false", "this"];

pub(super) fn build_constructor(req: &FixRequest<'_>) -> Option<String> {
    let Shape::Constructor(spec) = req.shape else {
        return None;
    };
    let args = split_args(req.arguments());
    let class = spec.class;
    if spec.merge_arguments {
        if args.is_empty() {
            return None;
        }
        let spread = args.iter().map(|arg| format!("...{arg}")).join(", ");
        return Some(format!("[...new {class}([{spread}])]"));
    }
    let [single] = args[..] else {
        return None;
    };
    Some(format!("[...new {class}({single})]"))
}

/// `Object.keys(obj)`, `structuredClone(value)`, or a parameterised
/// template such as `Math.max(...array)` with arguments mapped in order.
pub(super) fn build_function_call(req: &FixRequest<'_>) -> Option<String> {
    let (callee, params) = match req.shape {
        Shape::StaticCall { callee, params } | Shape::GlobalCall { callee, params } => {
            (callee, params)
        }
        _ => return None,
    };
    // A destructured `parseInt` is already the native call.
    if calls_itself(req, callee) {
        return None;
    }
    let arguments = req.arguments();
    let Some(params) = params else {
        return Some(format!("{callee}({arguments})"));
    };

    let params = split_args(params);
    let args = split_args(arguments);
    let slots = params.iter().filter(|p| placeholder_prefix(p).is_some()).count();
    if slots != args.len() {
        return None;
    }

    let mut args = args.into_iter();
    let mut rendered = Vec::with_capacity(params.len());
    for param in params {
        match placeholder_prefix(param) {
            Some(prefix) => rendered.push(format!("{prefix}{}", args.next()?)),
            None => rendered.push(param.to_string()),
        }
    }
    Some(format!("{callee}({})", rendered.join(", ")))
}

fn calls_itself(req: &FixRequest<'_>, callee: &str) -> bool {
    req.call
        .text()
        .split_once('(')
        .is_some_and(|(local, _)| local.trim() == callee)
}

/// `Some("...")` for a spread placeholder, `Some("")` for a plain one, and
/// `None` for a literal parameter.
fn placeholder_prefix(param: &str) -> Option<&'static str> {
    let (prefix, name) = match param.strip_prefix("...") {
        Some(name) => ("...", name),
        None => ("", param),
    };
    let is_placeholder = name.starts_with(|c: char| c.is_ascii_lowercase())
        && crate::classify::is_identifier(name)
        && !LITERAL_WORDS.contains(&name);
    is_placeholder.then_some(prefix)
}

pub(super) fn build_fixed_arg_method(req: &FixRequest<'_>) -> Option<String> {
    let Shape::FixedArgMethod {
        owner,
        method,
        args,
    } = req.shape
    else {
        return None;
    };
    let [target] = split_args(req.arguments())[..] else {
        return None;
    };
    Some(format!("{}.{method}({args})", method_target(Some(owner), target)))
}

/// Default rewrite: the first argument becomes the receiver.
pub(super) fn build_instance_method(req: &FixRequest<'_>) -> Option<String> {
    let Shape::InstanceMethod { owner, method } = req.shape else {
        return None;
    };
    let arguments = req.arguments();
    if arguments.is_empty() {
        return None;
    }
    let (target, rest) = split_first_arg(arguments).unwrap_or((arguments, ""));
    let rest = if ITERATEE_METHODS.contains(&method) {
        convert_iteratee(rest)?
    } else {
        rest.to_string()
    };
    Some(format!("{}.{method}({rest})", method_target(owner, target)))
}

/// Array-like receivers (`arguments`, DOM collections) get `Array.from`
/// first when the method is an `Array.prototype` method.
fn method_target(owner: Option<&str>, target: &str) -> String {
    if owner == Some("Array") && is_array_like(target) {
        format!("Array.from({target})")
    } else {
        receiver(target).into_owned()
    }
}

/// Rewrite a leading property-path iteratee as an arrow function.
fn convert_iteratee(rest: &str) -> Option<String> {
    if rest.is_empty() {
        return Some(String::new());
    }
    let (first, tail) = split_first_arg(rest).unwrap_or((rest, ""));
    let iteratee = Iteratee::parse(first)?;
    let first = iteratee.as_function();
    Some(if tail.is_empty() {
        first.into_owned()
    } else {
        format!("{first}, {tail}")
    })
}

#[cfg(test)]
mod tests {
    use crate::locator::CallSite;
    use crate::patterns::build_replacement;

    fn rewrite(source: &str, template: &str, function: &str) -> Option<String> {
        let call = CallSite::locate(source, 0)?;
        build_replacement(&call, template, function).map(|fix| fix.text)
    }

    #[test]
    fn constructors() {
        assert_eq!(
            rewrite("uniq(ids)", "Set", "uniq").as_deref(),
            Some("[...new Set(ids)]")
        );
        assert_eq!(
            rewrite("union(a, b)", "Set", "union").as_deref(),
            Some("[...new Set([...a, ...b])]")
        );
        assert_eq!(rewrite("uniq(a, b)", "Set", "uniq"), None);
    }

    #[test]
    fn static_and_global_calls() {
        assert_eq!(
            rewrite("keys(obj)", "Object.keys", "keys").as_deref(),
            Some("Object.keys(obj)")
        );
        assert_eq!(
            rewrite("cloneDeep(state)", "structuredClone", "cloneDeep").as_deref(),
            Some("structuredClone(state)")
        );
        assert_eq!(
            rewrite("max(nums)", "Math.max(...array)", "max").as_deref(),
            Some("Math.max(...nums)")
        );
        assert_eq!(
            rewrite("_.parseInt(s, 16)", "parseInt(string, radix)", "parseInt").as_deref(),
            Some("parseInt(s, 16)")
        );
        assert_eq!(
            rewrite("flattenDeep(xs, 1)", "Array.prototype.flat[Infinity]", "flattenDeep"),
            None
        );
        assert_eq!(rewrite("max(a, b)", "Math.max(...array)", "max"), None);
    }

    #[test]
    fn global_call_matching_local_callee_declined() {
        assert_eq!(
            rewrite("parseInt(s, 16)", "parseInt(string, radix)", "parseInt"),
            None
        );
        assert_eq!(rewrite("isFinite (n)", "isFinite", "isFinite"), None);
        assert_eq!(
            rewrite("toNumber(s)", "Number", "toNumber").as_deref(),
            Some("Number(s)")
        );
    }

    #[test]
    fn literal_template_parameters_kept() {
        assert_eq!(
            rewrite("toJson(obj)", "JSON.stringify(value, null, 2)", "toJson").as_deref(),
            Some("JSON.stringify(obj, null, 2)")
        );
    }

    #[test]
    fn fixed_arg_methods() {
        assert_eq!(
            rewrite("flattenDeep(xs)", "Array.prototype.flat[Infinity]", "flattenDeep").as_deref(),
            Some("xs.flat(Infinity)")
        );
        assert_eq!(
            rewrite("head(a || b)", "Array.prototype.at[0]", "head").as_deref(),
            Some("(a || b).at(0)")
        );
    }

    #[test]
    fn instance_methods() {
        assert_eq!(
            rewrite("map(users, u => u.id)", "Array.prototype.map", "map").as_deref(),
            Some("users.map(u => u.id)")
        );
        assert_eq!(
            rewrite("map(users, 'id')", "Array.prototype.map", "map").as_deref(),
            Some("users.map(item => item.id)")
        );
        assert_eq!(
            rewrite("filter(users, { active: true })", "Array.prototype.filter", "filter"),
            None
        );
        assert_eq!(
            rewrite("includes(list, x)", "Array.prototype.includes", "includes").as_deref(),
            Some("list.includes(x)")
        );
        assert_eq!(rewrite("map()", "Array.prototype.map", "map"), None);
    }

    #[test]
    fn array_like_receivers_converted() {
        assert_eq!(
            rewrite("map(arguments, f)", "Array.prototype.map", "map").as_deref(),
            Some("Array.from(arguments).map(f)")
        );
        assert_eq!(
            rewrite("trim(arguments)", "String.prototype.trim", "trim").as_deref(),
            Some("arguments.trim()")
        );
    }
}
