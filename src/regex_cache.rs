//! Bounded cache of compiled per-function regexes.
//!
//! Usage detection and argument extraction build one regex per tracked
//! binding or function name.
//! Compiled patterns are kept up to [`CAPACITY`] entries; when full, the
//! oldest inserted entry is evicted. Lookups are pure: a cache hit returns
//! a regex equivalent to a fresh compile.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, OnceLock, PoisonError};

use regex::Regex;

pub const CAPACITY: usize = 100;

/// Which family of per-function regex is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// `fn(args)` as a whole expression, capturing the arguments.
    DestructuredCall,
    /// `ns.fn(args)` as a whole expression, capturing the arguments.
    NamespaceCall,
    /// Whole-word occurrence of a template placeholder.
    Placeholder,
    /// `ns.fn(` in code for namespace binding `ns`, capturing the callee
    /// and the function name.
    NamespaceUsage,
    /// Bare `fn(` in code for local binding `fn`, capturing the callee.
    FunctionUsage,
}

impl PatternKind {
    fn source(self, name: &str) -> String {
        let name = regex::escape(name);
        match self {
            Self::DestructuredCall => format!(r"(?s)^{name}\s*\((.*)\)$"),
            Self::NamespaceCall => format!(r"(?s)^[\w$]+\s*\.\s*{name}\s*\((.*)\)$"),
            Self::Placeholder => format!(r"\b{name}\b"),
            Self::NamespaceUsage => {
                format!(r"(?:^|[^\w$.])({name}\s*\.\s*([\w$]+))\s*\(")
            }
            Self::FunctionUsage => format!(r"(?:^|[^\w$.])({name})\s*\("),
        }
    }
}

pub struct RegexCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<(PatternKind, String), Regex>,
    order: VecDeque<(PatternKind, String)>,
}

impl RegexCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Compiled regex for `kind` specialised to `name`.
    ///
    /// `None` only if the pattern fails to compile, which escaping rules out
    /// for every identifier-like name.
    pub fn get(&self, kind: PatternKind, name: &str) -> Option<Regex> {
        let key = (kind, name.to_string());
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(re) = inner.entries.get(&key) {
            return Some(re.clone());
        }

        let re = Regex::new(&kind.source(name)).ok()?;
        if inner.entries.len() >= self.capacity
            && let Some(oldest) = inner.order.pop_front()
        {
            inner.entries.remove(&oldest);
        }
        inner.order.push_back(key.clone());
        inner.entries.insert(key, re.clone());
        Some(re)
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, kind: PatternKind, name: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .contains_key(&(kind, name.to_string()))
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.entries.clear();
        inner.order.clear();
    }
}

/// Process-wide cache shared by detection and substitution.
pub fn global() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(|| RegexCache::with_capacity(CAPACITY))
}

/// Shorthand for `global().get(kind, name)`.
pub fn cached(kind: PatternKind, name: &str) -> Option<Regex> {
    global().get(kind, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_matches_fresh_compile() {
        let cache = RegexCache::with_capacity(4);
        let first = cache.get(PatternKind::DestructuredCall, "map").expect("regex");
        let second = cache.get(PatternKind::DestructuredCall, "map").expect("regex");
        assert_eq!(first.as_str(), second.as_str());
        assert_eq!(cache.len(), 1);

        let caps = second.captures("map(users, fn)").expect("match");
        assert_eq!(&caps[1], "users, fn");
    }

    #[test]
    fn evicts_oldest_first() {
        let cache = RegexCache::with_capacity(2);
        cache.get(PatternKind::FunctionUsage, "a");
        cache.get(PatternKind::FunctionUsage, "b");
        cache.get(PatternKind::FunctionUsage, "c");
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(PatternKind::FunctionUsage, "a"));
        assert!(cache.contains(PatternKind::FunctionUsage, "b"));
        assert!(cache.contains(PatternKind::FunctionUsage, "c"));
    }

    #[test]
    fn kinds_are_separate_keys() {
        let cache = RegexCache::with_capacity(8);
        cache.get(PatternKind::FunctionUsage, "map");
        cache.get(PatternKind::NamespaceUsage, "map");
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn names_are_escaped() {
        let cache = RegexCache::with_capacity(4);
        let re = cache.get(PatternKind::FunctionUsage, "$fn").expect("regex");
        assert!(re.is_match(" $fn(1)"));
        assert!(!re.is_match(" xfn(1)"));
    }

    #[test]
    fn namespace_call_captures_arguments() {
        let re = cached(PatternKind::NamespaceCall, "isEmpty").expect("regex");
        let caps = re.captures("_.isEmpty(list)").expect("match");
        assert_eq!(&caps[1], "list");
    }

    #[test]
    fn namespace_usage_captures_function() {
        let re = cached(PatternKind::NamespaceUsage, "_").expect("regex");
        let caps = re.captures("const x = _.groupBy(a, b);").expect("match");
        assert_eq!(&caps[1], "_.groupBy");
        assert_eq!(&caps[2], "groupBy");
        assert!(!re.is_match("foo_.groupBy(a)"));
        assert!(!re.is_match("a._.groupBy(a)"));
    }

    #[test]
    fn function_usage_skips_member_calls() {
        let re = cached(PatternKind::FunctionUsage, "map").expect("regex");
        let caps = re.captures("x = map(a, f)").expect("match");
        assert_eq!(caps.get(1).map(|m| m.start()), Some(4));
        assert!(!re.is_match("list.map(f)"));
        assert!(!re.is_match("flatMap(f)"));
    }
}
