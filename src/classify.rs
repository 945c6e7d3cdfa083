//! Replacement-shape classification.
//!
//! Templates arrive as plain strings because the mapping table doubles as
//! human-readable documentation. They are inspected here exactly once and
//! turned into a [`Shape`]; builders only ever match on the enum.

use crate::patterns::util::find_placeholder;

/// Exact template strings recognised by structural rules.
pub mod templates {
    pub const NOW: &str = "Date.now";

    pub const GROUP_BY: &str = "Object.groupBy(collection, iteratee)";
    pub const KEY_BY: &str = "Object.fromEntries(collection.map(item => [iteratee(item), item]))";
    pub const COUNT_BY: &str = "collection.reduce((counts, item) => { counts[key] = (counts[key] ?? 0) + 1; return counts; }, {})";
    pub const ORDER_BY: &str = "collection.toSorted(compareFn)";
    pub const OMIT: &str = "(({ [key]: _, ...rest }) => rest)(object)";
    pub const PICK: &str =
        "Object.fromEntries(keys.filter(key => key in object).map(key => [key, object[key]]))";
    pub const CHUNK: &str = "Array.from({ length: Math.ceil(array.length / size) }, (_, i) => array.slice(i * size, i * size + size))";
    pub const HAS: &str = "Object.hasOwn(object, key)";

    pub const DROP: &str = "array.slice(n)";
    pub const TAKE: &str = "array.slice(0, n)";
    pub const DROP_RIGHT: &str = "array.slice(0, -n)";
    pub const TAKE_RIGHT: &str = "array.slice(-n)";

    pub const SUM: &str = "array.reduce((sum, n) => sum + n, 0)";
    pub const MEAN: &str = "array.reduce((sum, n) => sum + n, 0) / array.length";
    pub const CLAMP: &str = "Math.min(Math.max(number, lower), upper)";
    pub const IN_RANGE: &str = "number >= start && number < end";
    pub const RANDOM: &str = "Math.random() * (upper - lower) + lower";

    pub const CAPITALIZE: &str = "string.at(0).toUpperCase() + string.slice(1).toLowerCase()";
    pub const UPPER_FIRST: &str = "string.at(0).toUpperCase() + string.slice(1)";
    pub const LOWER_FIRST: &str = "string.at(0).toLowerCase() + string.slice(1)";

    pub const CAST_ARRAY: &str = "Array.isArray(value) ? value : [value]";
    pub const TO_FINITE: &str = "Number.isFinite(+value) ? +value : 0";
    pub const TO_INTEGER: &str = "Math.trunc(value) || 0";
    pub const TO_SAFE_INTEGER: &str = "Math.trunc(Math.min(Math.max(value, Number.MIN_SAFE_INTEGER), Number.MAX_SAFE_INTEGER)) || 0";

    pub const DELAY: &str = "setTimeout(func, wait)";
    pub const DEFER: &str = "setTimeout(func, 0)";

    pub const TIMES: &str = "Array.from({ length: n }, (_, i) => iteratee(i))";
    pub const RANGE: &str = "Array.from({ length: end - start }, (_, i) => start + i)";
    pub const RANGE_RIGHT: &str = "Array.from({ length: end - start }, (_, i) => end - 1 - i)";

    pub const IDENTITY: &str = "value";
    pub const CLONE: &str = "({ ...value })";
}

use templates as t;

const ZERO_ARG_STATICS: &[&str] = &[t::NOW];

const STUB_LITERALS: &[&str] = &["[]", "true", "false", "{}", "''", "\"\"", "undefined"];

const EXPRESSION_OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", ">=", "<=", " > ", " < ", " + ", " - ", " * ", " / ", " % ", "&&",
    "||", "??", "?.", " ? ", "=>", "typeof ", " instanceof ",
];

/// Idioms that carry no operator but are still inline expressions.
const EXPRESSION_IDIOMS: &[&str] = &[
    t::DROP,
    t::TAKE,
    t::DROP_RIGHT,
    t::TAKE_RIGHT,
    t::SUM,
    t::MEAN,
    t::CLAMP,
    t::IN_RANGE,
    t::RANDOM,
    t::CAPITALIZE,
    t::UPPER_FIRST,
    t::LOWER_FIRST,
    t::CAST_ARRAY,
    t::TO_FINITE,
    t::TO_INTEGER,
    t::TO_SAFE_INTEGER,
    t::DELAY,
    t::DEFER,
    t::TIMES,
    t::RANGE,
    t::RANGE_RIGHT,
    t::IDENTITY,
    t::CLONE,
];

const STATIC_NAMESPACES: &[&str] = &[
    "Object", "Math", "Array", "Number", "Date", "JSON", "Reflect", "Promise", "Proxy",
];

const INSTANCEOF_TYPES: &[&str] = &[
    "Date",
    "RegExp",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "Error",
    "Promise",
    "ArrayBuffer",
];

/// Lodash functions whose native form is a constructor call.
///
/// Deliberately a closed list: a capitalised template alone never implies
/// `new`.
#[derive(Debug, PartialEq, Eq)]
pub struct ConstructorSpec {
    pub function: &'static str,
    pub class: &'static str,
    /// Spread every argument into one array before construction (`union`).
    pub merge_arguments: bool,
}

const CONSTRUCTORS: &[ConstructorSpec] = &[
    ConstructorSpec {
        function: "uniq",
        class: "Set",
        merge_arguments: false,
    },
    ConstructorSpec {
        function: "union",
        class: "Set",
        merge_arguments: true,
    },
];

/// Builtins that throw when called without `new`.
const REQUIRES_NEW: &[&str] = &["Set", "Map", "WeakSet", "WeakMap", "Promise"];

/// Two-argument rewrites keyed by their exact template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DualParam {
    GroupBy,
    KeyBy,
    CountBy,
    OrderBy,
    Omit,
    Pick,
    Chunk,
    Has,
}

impl DualParam {
    pub fn from_template(template: &str) -> Option<Self> {
        Some(match template {
            t::GROUP_BY => Self::GroupBy,
            t::KEY_BY => Self::KeyBy,
            t::COUNT_BY => Self::CountBy,
            t::ORDER_BY => Self::OrderBy,
            t::OMIT => Self::Omit,
            t::PICK => Self::Pick,
            t::CHUNK => Self::Chunk,
            t::HAS => Self::Has,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceKind {
    Drop,
    Take,
    DropRight,
    TakeRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => Self::Add,
            "-" => Self::Subtract,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseTransform {
    Capitalize,
    UpperFirst,
    LowerFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Delay,
    Defer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    Times,
    Range,
    RangeRight,
}

/// Inline-expression templates, refined by which idiom they encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idiom<'t> {
    Slice(SliceKind),
    Binary(BinaryOp),
    Sum,
    Mean,
    Clamp,
    InRange,
    Random,
    Case(CaseTransform),
    InstanceOf(&'t str),
    /// Type-coercion templates: fixed text with every `value` substituted.
    Coerce,
    Schedule(Schedule),
    Generate(Generator),
    /// Any other expression; rewritten by placeholder substitution.
    Template { placeholder: Option<&'static str> },
}

impl<'t> Idiom<'t> {
    pub fn classify(template: &'t str) -> Self {
        match template {
            t::DROP => Self::Slice(SliceKind::Drop),
            t::TAKE => Self::Slice(SliceKind::Take),
            t::DROP_RIGHT => Self::Slice(SliceKind::DropRight),
            t::TAKE_RIGHT => Self::Slice(SliceKind::TakeRight),
            t::SUM => Self::Sum,
            t::MEAN => Self::Mean,
            t::CLAMP => Self::Clamp,
            t::IN_RANGE => Self::InRange,
            t::RANDOM => Self::Random,
            t::CAPITALIZE => Self::Case(CaseTransform::Capitalize),
            t::UPPER_FIRST => Self::Case(CaseTransform::UpperFirst),
            t::LOWER_FIRST => Self::Case(CaseTransform::LowerFirst),
            t::CAST_ARRAY | t::TO_FINITE | t::TO_INTEGER | t::TO_SAFE_INTEGER => Self::Coerce,
            t::DELAY => Self::Schedule(Schedule::Delay),
            t::DEFER => Self::Schedule(Schedule::Defer),
            t::TIMES => Self::Generate(Generator::Times),
            t::RANGE => Self::Generate(Generator::Range),
            t::RANGE_RIGHT => Self::Generate(Generator::RangeRight),
            _ => {
                if let Some(op) = binary_template(template) {
                    Self::Binary(op)
                } else if let Some(ty) = instanceof_template(template) {
                    Self::InstanceOf(ty)
                } else {
                    Self::Template {
                        placeholder: find_placeholder(template),
                    }
                }
            }
        }
    }
}

/// The classified form of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'t> {
    /// `Date.now` and friends: called with no arguments.
    ZeroArgStatic { callee: &'t str },
    DualParam(DualParam),
    /// Literal text that replaces the whole call.
    Stub(&'t str),
    Expression(Idiom<'t>),
    Constructor(&'static ConstructorSpec),
    /// `Object.keys`, or `Math.max(...array)` with a parameter list.
    StaticCall {
        callee: &'t str,
        params: Option<&'t str>,
    },
    /// `structuredClone`, `String`, or `parseInt(string, radix)`.
    GlobalCall {
        callee: &'t str,
        params: Option<&'t str>,
    },
    /// `Array.prototype.at[0]`: method with baked-in arguments.
    FixedArgMethod {
        owner: &'t str,
        method: &'t str,
        args: &'t str,
    },
    InstanceMethod {
        owner: Option<&'t str>,
        method: &'t str,
    },
    /// Matched a shape family but its encoding could not be parsed.
    Unsupported,
}

/// Classify `template`, applying shape precedence: zero-arg static, dual
/// parameter, stub, expression, constructor, static namespace, global
/// function, fixed-argument method, instance method.
pub fn classify<'t>(template: &'t str, function: &str) -> Shape<'t> {
    let template = template.trim();

    if is_zero_arg_static(template) {
        return Shape::ZeroArgStatic { callee: template };
    }
    if let Some(kind) = DualParam::from_template(template) {
        return Shape::DualParam(kind);
    }
    if is_stub_literal(template) {
        return Shape::Stub(template);
    }
    if is_expression_template(template) {
        return Shape::Expression(Idiom::classify(template));
    }
    if let Some(spec) = constructor_spec(template, function) {
        return Shape::Constructor(spec);
    }
    if requires_new(template) {
        return Shape::Unsupported;
    }
    if is_static_namespace_call(template) {
        return match parse_call_template(template) {
            Some((callee, params)) => Shape::StaticCall { callee, params },
            None => Shape::Unsupported,
        };
    }
    if let Some((callee, params)) = global_call_template(template) {
        return Shape::GlobalCall { callee, params };
    }
    if let Some((owner, method, args)) = fixed_arg_instance_method(template) {
        return Shape::FixedArgMethod {
            owner,
            method,
            args,
        };
    }
    match instance_method(template) {
        Some((owner, method)) => Shape::InstanceMethod { owner, method },
        None => Shape::Unsupported,
    }
}

pub fn is_zero_arg_static(template: &str) -> bool {
    ZERO_ARG_STATICS.contains(&template)
}

pub fn is_stub_literal(template: &str) -> bool {
    STUB_LITERALS.contains(&template)
}

/// Operators, keywords, a lowercase receiver followed by `.`, or a known idiom.
pub fn is_expression_template(template: &str) -> bool {
    EXPRESSION_OPERATORS.iter().any(|op| template.contains(op))
        || EXPRESSION_IDIOMS.contains(&template)
        || starts_with_lowercase_member_access(template)
}

fn starts_with_lowercase_member_access(template: &str) -> bool {
    template.split_once('.').is_some_and(|(head, _)| {
        head.starts_with(|c: char| c.is_ascii_lowercase()) && is_identifier(head)
    })
}

pub fn is_constructor_call(template: &str, function: &str) -> bool {
    constructor_spec(template, function).is_some()
}

fn constructor_spec(template: &str, function: &str) -> Option<&'static ConstructorSpec> {
    CONSTRUCTORS
        .iter()
        .find(|spec| spec.function == function && spec.class == template)
}

/// A constructor template for a function with no constructor rewrite.
fn requires_new(template: &str) -> bool {
    parse_call_template(template).is_some_and(|(callee, _)| REQUIRES_NEW.contains(&callee))
}

pub fn is_static_namespace_call(template: &str) -> bool {
    template
        .split_once('.')
        .is_some_and(|(ns, _)| STATIC_NAMESPACES.contains(&ns))
        && !template.contains(".prototype.")
}

pub fn is_fixed_arg_instance_method(template: &str) -> bool {
    fixed_arg_instance_method(template).is_some()
}

/// `Owner.prototype.method[args]` split into its parts.
fn fixed_arg_instance_method(template: &str) -> Option<(&str, &str, &str)> {
    let (owner, tail) = template.split_once(".prototype.")?;
    let (method, args) = tail.strip_suffix(']')?.split_once('[')?;
    (is_identifier(owner) && is_identifier(method)).then_some((owner, method, args.trim()))
}

/// Method name after `.prototype.`, or after the last `.` otherwise.
pub fn instance_method(template: &str) -> Option<(Option<&str>, &str)> {
    let (owner, method) = match template.split_once(".prototype.") {
        Some((owner, method)) => (Some(owner), method),
        None => match template.rsplit_once('.') {
            Some((_, method)) => (None, method),
            None => (None, template),
        },
    };
    is_identifier(method).then_some((owner, method))
}

/// `Callee` or `Callee(params)` where the callee is a dotted identifier path.
fn parse_call_template(template: &str) -> Option<(&str, Option<&str>)> {
    let Some(open) = template.find('(') else {
        return template
            .split('.')
            .all(is_identifier)
            .then_some((template, None));
    };
    let callee = &template[..open];
    let params = template[open + 1..].strip_suffix(')')?;
    let balanced = crate::locator::find_closing_paren(template, open) == template.len();
    (balanced && callee.split('.').all(is_identifier)).then_some((callee, Some(params.trim())))
}

fn global_call_template(template: &str) -> Option<(&str, Option<&str>)> {
    let (callee, params) = parse_call_template(template)?;
    (!callee.contains('.')).then_some((callee, params))
}

fn binary_template(template: &str) -> Option<BinaryOp> {
    let mut parts = template.split(' ');
    let (lhs, op, rhs) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || !is_placeholder_name(lhs) || !is_placeholder_name(rhs) {
        return None;
    }
    BinaryOp::from_symbol(op)
}

fn is_placeholder_name(word: &str) -> bool {
    word.starts_with(|c: char| c.is_ascii_lowercase()) && is_identifier(word)
}

fn instanceof_template(template: &str) -> Option<&str> {
    let ty = template.strip_prefix("value instanceof ")?;
    INSTANCEOF_TYPES.contains(&ty).then_some(ty)
}

pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_arg_static_wins() {
        assert_eq!(
            classify("Date.now", "now"),
            Shape::ZeroArgStatic { callee: "Date.now" }
        );
    }

    #[test]
    fn dual_param_by_exact_template() {
        assert_eq!(
            classify(t::GROUP_BY, "groupBy"),
            Shape::DualParam(DualParam::GroupBy)
        );
        assert_eq!(classify(t::HAS, "has"), Shape::DualParam(DualParam::Has));
    }

    #[test]
    fn stubs() {
        assert_eq!(classify("[]", "stubArray"), Shape::Stub("[]"));
        assert_eq!(classify("undefined", "noop"), Shape::Stub("undefined"));
    }

    #[test]
    fn expressions_refined_to_idioms() {
        assert_eq!(
            classify("value === null", "isNull"),
            Shape::Expression(Idiom::Template {
                placeholder: Some("value")
            })
        );
        assert_eq!(
            classify("array.slice(0, -n)", "dropRight"),
            Shape::Expression(Idiom::Slice(SliceKind::DropRight))
        );
        assert_eq!(
            classify("augend + addend", "add"),
            Shape::Expression(Idiom::Binary(BinaryOp::Add))
        );
        assert_eq!(
            classify("value >= other", "gte"),
            Shape::Expression(Idiom::Binary(BinaryOp::Gte))
        );
        assert_eq!(
            classify("value instanceof Date", "isDate"),
            Shape::Expression(Idiom::InstanceOf("Date"))
        );
        assert_eq!(classify(t::CLAMP, "clamp"), Shape::Expression(Idiom::Clamp));
    }

    #[test]
    fn optional_chaining_template_is_expression_not_static() {
        assert!(matches!(
            classify("Object?.keys", "keys"),
            Shape::Expression(_)
        ));
    }

    #[test]
    fn constructor_only_for_allow_list() {
        assert!(is_constructor_call("Set", "uniq"));
        assert!(!is_constructor_call("Set", "toSet"));
        assert_eq!(classify("Set", "toSet"), Shape::Unsupported);
        assert_eq!(classify("Map(entries)", "toMap"), Shape::Unsupported);
        assert_eq!(
            classify("String", "toString"),
            Shape::GlobalCall {
                callee: "String",
                params: None
            }
        );
    }

    #[test]
    fn static_namespace_calls() {
        assert!(is_static_namespace_call("Object.keys"));
        assert!(!is_static_namespace_call("Array.prototype.map"));
        assert!(!is_static_namespace_call("Lodash.keys"));
        assert_eq!(
            classify("Math.max(...array)", "max"),
            Shape::StaticCall {
                callee: "Math.max",
                params: Some("...array")
            }
        );
        assert_eq!(classify("Object.keys(x).length", "size"), Shape::Unsupported);
    }

    #[test]
    fn fixed_arg_method() {
        assert!(is_fixed_arg_instance_method("Array.prototype.at[0]"));
        assert_eq!(
            classify("Array.prototype.flat[Infinity]", "flattenDeep"),
            Shape::FixedArgMethod {
                owner: "Array",
                method: "flat",
                args: "Infinity"
            }
        );
    }

    #[test]
    fn default_instance_method() {
        assert_eq!(
            classify("Array.prototype.map", "map"),
            Shape::InstanceMethod {
                owner: Some("Array"),
                method: "map"
            }
        );
        assert_eq!(
            instance_method("String.trim"),
            Some((None, "trim"))
        );
    }
}
