//! Tests for rewrite generation and fix application.
//!
//! These tests verify that calls produce the expected native replacement and
//! that applying fixes through the engine yields the expected source.

use lodash_native::classify::templates as t;
use lodash_native::fixer::{MAX_ITERATIONS, apply_suggestions};
use lodash_native::mapping::Safety;
use lodash_native::{CallSite, build_replacement, create_default_engine};

/// Rewrite the call whose callee starts at the first occurrence of `callee`
/// and return the whole edited source.
fn rewrite_in(source: &str, callee: &str, template: &str, function: &str) -> Option<String> {
    let start = source.find(callee)?;
    let call = CallSite::locate(source, start)?;
    let fix = build_replacement(&call, template, function)?;
    Some(fix.apply_to(source).expect("fix should apply"))
}

/// Replacement text for a call that makes up the whole source.
fn rewrite(source: &str, template: &str, function: &str) -> Option<String> {
    let call = CallSite::locate(source, 0)?;
    build_replacement(&call, template, function).map(|fix| fix.text)
}

/// Lint and fix `source` to a fixed point at `max_safety`.
fn fix_all(source: &str, max_safety: Safety) -> (String, usize) {
    let engine = create_default_engine();
    let mut current = source.to_string();
    let mut applied = 0;
    for _ in 0..MAX_ITERATIONS {
        let diagnostics = engine.lint_source(&current);
        let outcome = apply_suggestions(&current, &diagnostics, max_safety).unwrap();
        if outcome.fixes_applied == 0 {
            break;
        }
        applied += outcome.fixes_applied;
        current = outcome.fixed_source;
    }
    (current, applied)
}

// ============================================================================
// Core scenarios
// ============================================================================

#[test]
fn map_moves_collection_to_receiver() {
    assert_eq!(
        rewrite("map(users, u => u.active)", "Array.prototype.map", "map").as_deref(),
        Some("users.map(u => u.active)")
    );
}

#[test]
fn negated_call_is_absorbed() {
    let source = "if (!isNull(x)) { go(); }";
    let start = source.find("isNull").unwrap();
    let call = CallSite::locate(source, start).unwrap();
    let fix = build_replacement(&call, "value === null", "isNull").unwrap();

    assert_eq!(fix.range.start, source.find('!').unwrap());
    assert_eq!(fix.text, "!(x === null)");
    assert_eq!(fix.apply_to(source).unwrap(), "if (!(x === null)) { go(); }");
}

#[test]
fn clamp_needs_all_bounds() {
    assert_eq!(
        rewrite("clamp(n, 0, 10)", t::CLAMP, "clamp").as_deref(),
        Some("Math.min(Math.max(n, 0), 10)")
    );
    assert_eq!(rewrite("clamp(n, 0)", t::CLAMP, "clamp"), None);
}

#[test]
fn drop_right_negates_count() {
    assert_eq!(
        rewrite("dropRight(list, 2)", t::DROP_RIGHT, "dropRight").as_deref(),
        Some("list.slice(0, -2)")
    );
}

#[test]
fn group_by_expands_string_path() {
    assert_eq!(
        rewrite("groupBy(items, \"category\")", t::GROUP_BY, "groupBy").as_deref(),
        Some("Object.groupBy(items, item => item.category)")
    );
}

#[test]
fn loose_receiver_is_parenthesised() {
    assert_eq!(
        rewrite("map(data?.items || [], fn)", "Array.prototype.map", "map").as_deref(),
        Some("(data?.items || []).map(fn)")
    );
}

// ============================================================================
// Families in context
// ============================================================================

#[test]
fn namespace_call_in_assignment() {
    assert_eq!(
        rewrite_in("const ids = _.map(users, 'id');", "_.map", "Array.prototype.map", "map")
            .as_deref(),
        Some("const ids = users.map(item => item.id);")
    );
}

#[test]
fn operator_result_wrapped_when_followed_by_member_access() {
    assert_eq!(
        rewrite_in(
            "const s = add(a, b).toFixed(2);",
            "add",
            "augend + addend",
            "add"
        )
        .as_deref(),
        Some("const s = (a + b).toFixed(2);")
    );
}

#[test]
fn operator_result_bare_in_argument_slot() {
    assert_eq!(
        rewrite_in("log(inRange(n, 0, 10));", "inRange", t::IN_RANGE, "inRange").as_deref(),
        Some("log(n >= 0 && n < 10);")
    );
}

#[test]
fn negation_applies_to_every_family() {
    let cases = [
        ("!isEmpty(list)", "Object.keys(value).length === 0", "isEmpty", "!(Object.keys(list).length === 0)"),
        ("!stubTrue()", "true", "stubTrue", "!(true)"),
        ("!isArray(x)", "Array.isArray", "isArray", "!(Array.isArray(x))"),
        ("!includes(xs, 1)", "Array.prototype.includes", "includes", "!(xs.includes(1))"),
        ("!has(o, 'k')", t::HAS, "has", "!(Object.hasOwn(o, 'k'))"),
        ("!gt(a, b)", "value > other", "gt", "!(a > b)"),
        ("!inRange(n, 1, 5)", t::IN_RANGE, "inRange", "!(n >= 1 && n < 5)"),
    ];
    for (source, template, function, expected) in cases {
        assert_eq!(
            rewrite_in(source, function, template, function).as_deref(),
            Some(expected),
            "{source}"
        );
    }
}

#[test]
fn object_literal_result_parenthesised_in_arrow_body() {
    assert_eq!(
        rewrite_in("const f = () => clone(base);", "clone", t::CLONE, "clone").as_deref(),
        Some("const f = () => ({ ...base });")
    );
}

#[test]
fn multiline_arguments_are_preserved() {
    let source = "const r = _.filter(\n  users,\n  u => u.age > 18\n);";
    assert_eq!(
        rewrite_in(source, "_.filter", "Array.prototype.filter", "filter").as_deref(),
        Some("const r = users.filter(u => u.age > 18);")
    );
}

#[test]
fn strings_inside_arguments_do_not_confuse_boundaries() {
    assert_eq!(
        rewrite("split(line, ',)')", "String.prototype.split", "split").as_deref(),
        Some("line.split(',)')")
    );
}

#[test]
fn declined_shapes_leave_source_alone() {
    assert_eq!(rewrite("filter(users, { active: true })", "Array.prototype.filter", "filter"), None);
    assert_eq!(rewrite("range(0, 10, 2)", t::RANGE, "range"), None);
    assert_eq!(rewrite("chunk(load(), 3)", t::CHUNK, "chunk"), None);
    assert_eq!(rewrite("omit(user, path)", t::OMIT, "omit"), None);
    assert_eq!(rewrite("omit(obj, 'default')", t::OMIT, "omit"), None);
    assert_eq!(rewrite("pick(obj, 'a.b')", t::PICK, "pick"), None);
}

#[test]
fn bracket_result_on_new_line_does_not_join_previous_statement() {
    assert_eq!(
        rewrite_in("const a = b\nuniq(ids).forEach(f)\n", "uniq", "Set", "uniq").as_deref(),
        Some("const a = b\n;[...new Set(ids)].forEach(f)\n")
    );
    assert_eq!(
        rewrite_in("const a = b;\nuniq(ids).forEach(f)\n", "uniq", "Set", "uniq").as_deref(),
        Some("const a = b;\n[...new Set(ids)].forEach(f)\n")
    );
}

// ============================================================================
// Engine + fixer
// ============================================================================

#[test]
fn safe_fixes_applied_to_fixed_point() {
    let source = r#"import _ from 'lodash';
import { head } from 'lodash';

const first = head(items);
const ok = !_.isNil(value);
const top = _.last(_.uniq(ids));
const groups = _.groupBy(items, 'kind');
"#;

    let (fixed, applied) = fix_all(source, Safety::Safe);
    assert_eq!(applied, 4);
    assert_eq!(
        fixed,
        r#"import _ from 'lodash';
import { head } from 'lodash';

const first = items.at(0);
const ok = !(value == null);
const top = [...new Set(ids)].at(-1);
const groups = _.groupBy(items, 'kind');
"#
    );
}

#[test]
fn caution_fixes_need_higher_safety() {
    let source = "import _ from 'lodash';\nconst groups = _.groupBy(items, 'kind');\n";

    let (unchanged, applied) = fix_all(source, Safety::Safe);
    assert_eq!(applied, 0);
    assert_eq!(unchanged, source);

    let (fixed, applied) = fix_all(source, Safety::Caution);
    assert_eq!(applied, 1);
    assert_eq!(
        fixed,
        "import _ from 'lodash';\nconst groups = Object.groupBy(items, item => item.kind);\n"
    );
}

#[test]
fn nested_lodash_calls_fixed_inside_out_over_passes() {
    let source = "import { map, filter } from 'lodash';\nconst names = map(filter(users, 'active'), 'name');\n";
    let (fixed, applied) = fix_all(source, Safety::Unsafe);
    assert_eq!(applied, 2);
    assert_eq!(
        fixed,
        "import { map, filter } from 'lodash';\nconst names = users.filter(item => item.active).map(item => item.name);\n"
    );
}

#[test]
fn destructured_global_converges_without_fixes() {
    let source = "import { parseInt } from 'lodash';\nconst n = parseInt(s, 16);\n";
    let (fixed, applied) = fix_all(source, Safety::Unsafe);
    assert_eq!(applied, 0);
    assert_eq!(fixed, source);
}

#[test]
fn semicolon_guard_applied_through_engine() {
    let source = "import { uniq } from 'lodash';\nconst a = b\nuniq(ids).forEach(f)\n";
    let (fixed, applied) = fix_all(source, Safety::Safe);
    assert_eq!(applied, 1);
    assert_eq!(
        fixed,
        "import { uniq } from 'lodash';\nconst a = b\n;[...new Set(ids)].forEach(f)\n"
    );
}
