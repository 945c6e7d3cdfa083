//! Lightweight lodash usage detection.
//!
//! Detection is lexical: import and `require` statements are matched with
//! regexes, then every binding they introduce is searched for as a call in
//! code (not in strings, templates, or comments). There is no scope analysis;
//! a local variable that shadows an imported binding is still reported.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::classify::is_identifier;
use crate::locator::CallSite;
use crate::regex_cache::{PatternKind, cached};
use crate::scanner::{Lexeme, ScannerState};

/// Root module names treated as lodash without configuration.
pub const DEFAULT_MODULES: &[&str] = &["lodash", "lodash-es"];

/// How a lodash function is invoked at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    /// `map(users, fn)`, after a named or per-function import.
    Destructured,
    /// `_.map(users, fn)`, through a default or namespace import.
    Namespace,
}

/// A local name introduced by an import of lodash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Binding {
    /// The whole library, e.g. `_` in `import _ from 'lodash'`.
    Namespace(String),
    /// One function under a local name, e.g. `f` in `{ filter as f }`.
    Function { function: String, local: String },
}

/// One call of a lodash function found in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage<'src> {
    /// Lodash function name, independent of the local alias.
    pub function: String,
    pub style: CallStyle,
    pub call: CallSite<'src>,
}

enum ModuleTarget {
    Library,
    Function(String),
}

/// Finds lodash bindings and their call sites in a source file.
#[derive(Debug, Clone)]
pub struct Detector {
    modules: Vec<String>,
    /// Lowercased function name to canonical spelling, for `lodash.groupby`.
    functions: HashMap<String, String>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

impl Detector {
    /// Detector for the default modules; `functions` resolves the
    /// lowercase per-method package names (`lodash.keyby` to `keyBy`).
    pub fn new<S: AsRef<str>>(functions: impl IntoIterator<Item = S>) -> Self {
        Self {
            modules: DEFAULT_MODULES.iter().map(|m| m.to_string()).collect(),
            functions: functions
                .into_iter()
                .map(|f| (f.as_ref().to_ascii_lowercase(), f.as_ref().to_string()))
                .collect(),
        }
    }

    /// Also treat `modules` as lodash roots (e.g. an internal re-export).
    #[must_use]
    pub fn with_modules(mut self, modules: impl IntoIterator<Item = String>) -> Self {
        for module in modules {
            if !self.modules.contains(&module) {
                self.modules.push(module);
            }
        }
        self
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Every lodash binding introduced by an `import` or `require` in code.
    pub fn bindings(&self, source: &str) -> Vec<Binding> {
        let mask = code_mask(source);
        let mut found = BTreeSet::new();

        for caps in ES_IMPORT.captures_iter(source) {
            let (Some(stmt), Some(clause), Some(module)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if !mask.get(stmt.start()).copied().unwrap_or(false) {
                continue;
            }
            let Some(target) = self.resolve_module(module.as_str()) else {
                continue;
            };
            parse_import_clause(clause.as_str(), &target, &mut found);
        }

        for caps in REQUIRE.captures_iter(source) {
            let (Some(stmt), Some(pattern), Some(module)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if !mask.get(stmt.start()).copied().unwrap_or(false) {
                continue;
            }
            let Some(target) = self.resolve_module(module.as_str()) else {
                continue;
            };
            parse_require_pattern(pattern.as_str(), &target, &mut found);
        }

        found.into_iter().collect()
    }

    /// Every call through a lodash binding, in source order.
    ///
    /// Nested calls are all reported; `map(filter(xs, f), g)` yields two usages.
    pub fn usages<'src>(&self, source: &'src str) -> Vec<Usage<'src>> {
        let mask = code_mask(source);
        let mut usages: Vec<Usage<'src>> = Vec::new();

        for binding in self.bindings(source) {
            match &binding {
                Binding::Namespace(ns) => {
                    let Some(re) = cached(PatternKind::NamespaceUsage, ns) else {
                        continue;
                    };
                    let mut at = 0;
                    while let Some(caps) = re.captures_at(source, at) {
                        let (Some(callee), Some(function)) = (caps.get(1), caps.get(2)) else {
                            break;
                        };
                        at = callee.end();
                        if !is_code(&mask, callee.start()) {
                            continue;
                        }
                        if let Some(call) = CallSite::locate(source, callee.start()) {
                            usages.push(Usage {
                                function: function.as_str().to_string(),
                                style: CallStyle::Namespace,
                                call,
                            });
                        }
                    }
                }
                Binding::Function { function, local } => {
                    let Some(re) = cached(PatternKind::FunctionUsage, local) else {
                        continue;
                    };
                    let mut at = 0;
                    while let Some(caps) = re.captures_at(source, at) {
                        let Some(callee) = caps.get(1) else {
                            break;
                        };
                        at = callee.end();
                        if !is_code(&mask, callee.start())
                            || is_declaration(&source[..callee.start()])
                        {
                            continue;
                        }
                        if let Some(call) = CallSite::locate(source, callee.start()) {
                            usages.push(Usage {
                                function: function.clone(),
                                style: CallStyle::Destructured,
                                call,
                            });
                        }
                    }
                }
            }
        }

        usages.sort_by_key(|u| (u.call.start, u.call.end));
        usages.dedup_by_key(|u| u.call.start);
        usages
    }

    fn resolve_module(&self, spec: &str) -> Option<ModuleTarget> {
        for module in &self.modules {
            if spec == module {
                return Some(ModuleTarget::Library);
            }
            let Some(rest) = spec
                .strip_prefix(module.as_str())
                .and_then(|r| r.strip_prefix('/'))
            else {
                continue;
            };
            if rest == "fp" || rest.starts_with("fp/") {
                return None;
            }
            let rest = rest.strip_suffix(".js").unwrap_or(rest);
            return is_identifier(rest).then(|| ModuleTarget::Function(rest.to_string()));
        }

        let rest = spec.strip_prefix("lodash.")?;
        if !is_identifier(rest) {
            return None;
        }
        let function = self
            .functions
            .get(&rest.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| rest.to_string());
        Some(ModuleTarget::Function(function))
    }
}

/// Raw text between the outer parentheses of `call_text`.
///
/// `call_text` is the whole call expression: `fn(...)` for
/// [`CallStyle::Destructured`] or `ns.fn(...)` for [`CallStyle::Namespace`].
pub fn extract_argument_text<'a>(
    call_text: &'a str,
    function: &str,
    style: CallStyle,
) -> Option<&'a str> {
    let kind = match style {
        CallStyle::Destructured => PatternKind::DestructuredCall,
        CallStyle::Namespace => PatternKind::NamespaceCall,
    };
    let re = cached(kind, function)?;
    let caps = re.captures(call_text.trim())?;
    caps.get(1).map(|m| m.as_str().trim())
}

static ES_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s+([^;'"]+?)\s+from\s*['"]([^'"\n]+)['"]"#).expect("import regex")
});

static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(?:const|let|var)\s+([\w$]+|\{[^}]*\})\s*=\s*require\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#,
    )
    .expect("require regex")
});

fn push_whole(local: &str, target: &ModuleTarget, out: &mut BTreeSet<Binding>) {
    if !is_identifier(local) {
        return;
    }
    out.insert(match target {
        ModuleTarget::Library => Binding::Namespace(local.to_string()),
        ModuleTarget::Function(function) => Binding::Function {
            function: function.clone(),
            local: local.to_string(),
        },
    });
}

fn push_member(imported: &str, local: &str, target: &ModuleTarget, out: &mut BTreeSet<Binding>) {
    if imported == "default" {
        push_whole(local, target, out);
        return;
    }
    if let ModuleTarget::Library = target
        && is_identifier(imported)
        && is_identifier(local)
    {
        out.insert(Binding::Function {
            function: imported.to_string(),
            local: local.to_string(),
        });
    }
}

/// `_`, `* as _`, `{ map, filter as f }`, or `_, { map }`.
fn parse_import_clause(clause: &str, target: &ModuleTarget, out: &mut BTreeSet<Binding>) {
    let clause = clause.trim();
    if clause.starts_with("type ") || clause.starts_with("type{") {
        return;
    }

    let (outside, named) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            format!("{} {}", &clause[..open], &clause[close + 1..]),
            Some(&clause[open + 1..close]),
        ),
        _ => (clause.to_string(), None),
    };

    for part in outside.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.strip_prefix('*') {
            Some(rest) => {
                if let Some(local) = rest.trim().strip_prefix("as") {
                    push_whole(local.trim(), target, out);
                }
            }
            None => push_whole(part, target, out),
        }
    }

    for entry in named.into_iter().flat_map(|n| n.split(',')) {
        let entry = entry.trim();
        if entry.is_empty() || entry.starts_with("type ") {
            continue;
        }
        let mut words = entry.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some(imported), None, None) => push_member(imported, imported, target, out),
            (Some(imported), Some("as"), Some(local)) => push_member(imported, local, target, out),
            _ => {}
        }
    }
}

/// `_` or `{ map, filter: f }`.
fn parse_require_pattern(pattern: &str, target: &ModuleTarget, out: &mut BTreeSet<Binding>) {
    let Some(inner) = pattern
        .strip_prefix('{')
        .and_then(|p| p.strip_suffix('}'))
    else {
        push_whole(pattern.trim(), target, out);
        return;
    };

    for entry in inner.split(',') {
        let entry = entry.split('=').next().unwrap_or("").trim();
        if entry.is_empty() {
            continue;
        }
        match entry.split_once(':') {
            Some((imported, local)) => push_member(imported.trim(), local.trim(), target, out),
            None => push_member(entry, entry, target, out),
        }
    }
}

fn is_code(mask: &[bool], i: usize) -> bool {
    mask.get(i).copied().unwrap_or(false)
}

/// `function map(` declares rather than calls.
fn is_declaration(before: &str) -> bool {
    let before = before.trim_end();
    before.ends_with("function") || before.ends_with("function*")
}

/// Per-byte flag: true for code outside string, template, and comment text.
fn code_mask(source: &str) -> Vec<bool> {
    let bytes = source.as_bytes();
    let mut mask = vec![false; bytes.len()];
    let mut state = ScannerState::new();
    let mut i = 0;
    while i < bytes.len() {
        if !state.in_literal() && bytes[i] == b'/' {
            match bytes.get(i + 1) {
                Some(b'/') => {
                    i = source[i..].find('\n').map_or(bytes.len(), |n| i + n);
                    continue;
                }
                Some(b'*') => {
                    i = source[i + 2..].find("*/").map_or(bytes.len(), |n| i + 2 + n + 2);
                    continue;
                }
                _ => {}
            }
        }
        if state.step(bytes, i) == Lexeme::Code {
            mask[i] = true;
        }
        i += 1;
    }
    mask
}
