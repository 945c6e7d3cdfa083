//! Ordered registry of rewrite rules.
//!
//! Each rule pairs a cheap `detect` predicate over the classified request with
//! a `build` function producing the bare replacement expression. The first
//! rule whose `detect` matches owns the request: if its `build` declines,
//! no later rule is consulted and the call is left untouched. Negation and
//! context parenthesisation are applied once, centrally, by
//! [`crate::finalize::finalize`].

pub(crate) mod util;

mod collections;
mod lang;
mod methods;
mod numeric;
mod strings;
mod timing;

use crate::classify::{DualParam, Idiom, Shape, classify};
use crate::finalize::finalize;
use crate::fix::FixResult;
use crate::locator::CallSite;

/// Everything a builder needs to know about one call.
#[derive(Debug, Clone, Copy)]
pub struct FixRequest<'a> {
    pub call: &'a CallSite<'a>,
    pub template: &'a str,
    /// Lodash function name, without namespace (`map`, not `_.map`).
    pub function: &'a str,
    pub shape: Shape<'a>,
}

impl<'a> FixRequest<'a> {
    pub fn new(call: &'a CallSite<'a>, template: &'a str, function: &'a str) -> Self {
        Self {
            call,
            template,
            function,
            shape: classify(template, function),
        }
    }

    pub fn arguments(&self) -> &'a str {
        self.call.arguments
    }

    fn idiom(&self) -> Option<Idiom<'a>> {
        match self.shape {
            Shape::Expression(idiom) => Some(idiom),
            _ => None,
        }
    }

    fn dual(&self) -> Option<DualParam> {
        match self.shape {
            Shape::DualParam(kind) => Some(kind),
            _ => None,
        }
    }

    fn instance_method(&self) -> Option<&'a str> {
        match self.shape {
            Shape::InstanceMethod { method, .. } => Some(method),
            _ => None,
        }
    }
}

/// A named detect/build pair.
pub struct PatternRule {
    pub name: &'static str,
    pub detect: fn(&FixRequest<'_>) -> bool,
    pub build: fn(&FixRequest<'_>) -> Option<String>,
}

impl std::fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRule").field("name", &self.name).finish()
    }
}

/// Rules in precedence order. Structural shapes come before the generic
/// method fallback so that, e.g., `groupBy` never degrades into
/// `collection.groupBy(...)`.
pub static PATTERNS: &[PatternRule] = &[
    PatternRule {
        name: "zero_arg_static",
        detect: |req| matches!(req.shape, Shape::ZeroArgStatic { .. }),
        build: lang::build_zero_arg_static,
    },
    PatternRule {
        name: "group_by",
        detect: |req| req.dual() == Some(DualParam::GroupBy),
        build: collections::build_group_by,
    },
    PatternRule {
        name: "key_by",
        detect: |req| req.dual() == Some(DualParam::KeyBy),
        build: collections::build_key_by,
    },
    PatternRule {
        name: "count_by",
        detect: |req| req.dual() == Some(DualParam::CountBy),
        build: collections::build_count_by,
    },
    PatternRule {
        name: "order_by",
        detect: |req| req.dual() == Some(DualParam::OrderBy),
        build: collections::build_order_by,
    },
    PatternRule {
        name: "omit",
        detect: |req| req.dual() == Some(DualParam::Omit),
        build: collections::build_omit,
    },
    PatternRule {
        name: "pick",
        detect: |req| req.dual() == Some(DualParam::Pick),
        build: collections::build_pick,
    },
    PatternRule {
        name: "chunk",
        detect: |req| req.dual() == Some(DualParam::Chunk),
        build: collections::build_chunk,
    },
    PatternRule {
        name: "has",
        detect: |req| req.dual() == Some(DualParam::Has),
        build: collections::build_has,
    },
    PatternRule {
        name: "stub",
        detect: |req| matches!(req.shape, Shape::Stub(_)),
        build: lang::build_stub,
    },
    PatternRule {
        name: "slice",
        detect: |req| matches!(req.idiom(), Some(Idiom::Slice(_))),
        build: collections::build_slice,
    },
    PatternRule {
        name: "binary_operator",
        detect: |req| matches!(req.idiom(), Some(Idiom::Binary(_))),
        build: numeric::build_binary,
    },
    PatternRule {
        name: "aggregate",
        detect: |req| matches!(req.idiom(), Some(Idiom::Sum | Idiom::Mean)),
        build: numeric::build_aggregate,
    },
    PatternRule {
        name: "clamp",
        detect: |req| req.idiom() == Some(Idiom::Clamp),
        build: numeric::build_clamp,
    },
    PatternRule {
        name: "in_range",
        detect: |req| req.idiom() == Some(Idiom::InRange),
        build: numeric::build_in_range,
    },
    PatternRule {
        name: "random",
        detect: |req| req.idiom() == Some(Idiom::Random),
        build: numeric::build_random,
    },
    PatternRule {
        name: "string_case",
        detect: |req| matches!(req.idiom(), Some(Idiom::Case(_))),
        build: strings::build_case,
    },
    PatternRule {
        name: "instance_of",
        detect: |req| matches!(req.idiom(), Some(Idiom::InstanceOf(_))),
        build: lang::build_instance_of,
    },
    PatternRule {
        name: "coercion",
        detect: |req| req.idiom() == Some(Idiom::Coerce),
        build: lang::build_substitution,
    },
    PatternRule {
        name: "scheduling",
        detect: |req| matches!(req.idiom(), Some(Idiom::Schedule(_))),
        build: timing::build_schedule,
    },
    PatternRule {
        name: "generator",
        detect: |req| matches!(req.idiom(), Some(Idiom::Generate(_))),
        build: timing::build_generator,
    },
    PatternRule {
        name: "value_substitution",
        detect: |req| matches!(req.idiom(), Some(Idiom::Template { .. })),
        build: lang::build_substitution,
    },
    PatternRule {
        name: "constructor",
        detect: |req| matches!(req.shape, Shape::Constructor(_)),
        build: methods::build_constructor,
    },
    PatternRule {
        name: "static_call",
        detect: |req| {
            matches!(
                req.shape,
                Shape::StaticCall { .. } | Shape::GlobalCall { .. }
            )
        },
        build: methods::build_function_call,
    },
    PatternRule {
        name: "fixed_arg_method",
        detect: |req| matches!(req.shape, Shape::FixedArgMethod { .. }),
        build: methods::build_fixed_arg_method,
    },
    PatternRule {
        name: "sort_by",
        detect: |req| req.instance_method() == Some("toSorted"),
        build: collections::build_sort_by,
    },
    PatternRule {
        name: "reject",
        detect: |req| req.function == "reject" && req.instance_method() == Some("filter"),
        build: collections::build_reject,
    },
    PatternRule {
        name: "instance_method",
        detect: |req| matches!(req.shape, Shape::InstanceMethod { .. }),
        build: methods::build_instance_method,
    },
];

/// The rule that owns `req`, if any.
pub fn matching_rule(req: &FixRequest<'_>) -> Option<&'static PatternRule> {
    PATTERNS.iter().find(|rule| (rule.detect)(req))
}

/// Dispatch `req` through the registry and finalise the result.
pub fn create_pattern_based_transform(req: &FixRequest<'_>) -> Option<FixResult> {
    let rule = matching_rule(req)?;
    let expr = (rule.build)(req);

    #[cfg(feature = "telemetry")]
    tracing::debug!(
        rule = rule.name,
        function = req.function,
        built = expr.is_some(),
        "dispatched rewrite"
    );

    Some(finalize(req.call, &expr?))
}

/// Replacement for `call`, rewriting lodash `function` into `template`.
///
/// Returns `None` when no rule can produce a faithful rewrite; the caller
/// should leave the source untouched.
pub fn build_replacement(call: &CallSite<'_>, template: &str, function: &str) -> Option<FixResult> {
    let req = FixRequest::new(call, template, function);
    create_pattern_based_transform(&req)
}
