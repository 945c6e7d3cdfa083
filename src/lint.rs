use crate::diagnostics::{Diagnostic, Span, Suggestion};
use crate::level::LintLevel;
use crate::mapping::Category;
use anyhow::{Result, anyhow};
use std::collections::{HashMap, HashSet};
use std::ops::Range;

// ============================================================================
// Lint Descriptors
// ============================================================================

/// Static metadata describing a lint.
///
/// There is one lint per mapping [`Category`], so users can silence or deny
/// a whole family of lodash functions (`prefer_native_string`, ...) at once.
#[derive(Debug)]
pub struct LintDescriptor {
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
}

impl LintDescriptor {
    pub const fn new(name: &'static str, category: Category, description: &'static str) -> Self {
        Self {
            name,
            category,
            description,
        }
    }
}

pub static PREFER_NATIVE_ARRAY: LintDescriptor = LintDescriptor::new(
    "prefer_native_array",
    Category::Array,
    "Lodash array helper with a native Array method or spread equivalent",
);

pub static PREFER_NATIVE_COLLECTION: LintDescriptor = LintDescriptor::new(
    "prefer_native_collection",
    Category::Collection,
    "Lodash collection helper with a native Array/Object equivalent",
);

pub static PREFER_NATIVE_OBJECT: LintDescriptor = LintDescriptor::new(
    "prefer_native_object",
    Category::Object,
    "Lodash object helper with an Object.* or spread equivalent",
);

pub static PREFER_NATIVE_STRING: LintDescriptor = LintDescriptor::new(
    "prefer_native_string",
    Category::String,
    "Lodash string helper with a String.prototype equivalent",
);

pub static PREFER_NATIVE_LANG: LintDescriptor = LintDescriptor::new(
    "prefer_native_lang",
    Category::Lang,
    "Lodash type check or conversion with a native operator or builtin",
);

pub static PREFER_NATIVE_MATH: LintDescriptor = LintDescriptor::new(
    "prefer_native_math",
    Category::Math,
    "Lodash math helper with a Math.* or operator equivalent",
);

pub static PREFER_NATIVE_NUMBER: LintDescriptor = LintDescriptor::new(
    "prefer_native_number",
    Category::Number,
    "Lodash number helper with a Math.* or Number.* equivalent",
);

pub static PREFER_NATIVE_FUNCTION: LintDescriptor = LintDescriptor::new(
    "prefer_native_function",
    Category::Function,
    "Lodash function helper with a setTimeout or closure equivalent",
);

pub static PREFER_NATIVE_UTIL: LintDescriptor = LintDescriptor::new(
    "prefer_native_util",
    Category::Util,
    "Lodash utility with an inline native expression",
);

pub static PREFER_NATIVE_DATE: LintDescriptor = LintDescriptor::new(
    "prefer_native_date",
    Category::Date,
    "Lodash date helper with a Date equivalent",
);

/// Every built-in lint, in category order.
pub static ALL_LINTS: [&LintDescriptor; 10] = [
    &PREFER_NATIVE_ARRAY,
    &PREFER_NATIVE_COLLECTION,
    &PREFER_NATIVE_OBJECT,
    &PREFER_NATIVE_STRING,
    &PREFER_NATIVE_LANG,
    &PREFER_NATIVE_MATH,
    &PREFER_NATIVE_NUMBER,
    &PREFER_NATIVE_FUNCTION,
    &PREFER_NATIVE_UTIL,
    &PREFER_NATIVE_DATE,
];

pub fn descriptor_for(category: Category) -> &'static LintDescriptor {
    match category {
        Category::Array => &PREFER_NATIVE_ARRAY,
        Category::Collection => &PREFER_NATIVE_COLLECTION,
        Category::Object => &PREFER_NATIVE_OBJECT,
        Category::String => &PREFER_NATIVE_STRING,
        Category::Lang => &PREFER_NATIVE_LANG,
        Category::Math => &PREFER_NATIVE_MATH,
        Category::Number => &PREFER_NATIVE_NUMBER,
        Category::Function => &PREFER_NATIVE_FUNCTION,
        Category::Util => &PREFER_NATIVE_UTIL,
        Category::Date => &PREFER_NATIVE_DATE,
    }
}

pub fn find_descriptor(name: &str) -> Option<&'static LintDescriptor> {
    ALL_LINTS.iter().copied().find(|d| d.name == name)
}

pub fn all_known_lints() -> HashSet<&'static str> {
    ALL_LINTS.iter().map(|d| d.name).collect()
}

// ============================================================================
// Settings
// ============================================================================

/// Per-lint configuration derived from `lodash-native.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintSettings {
    levels: HashMap<String, LintLevel>,
}

impl LintSettings {
    #[must_use]
    pub fn with_config_levels(mut self, levels: HashMap<String, LintLevel>) -> Self {
        self.levels.extend(levels);
        self
    }

    #[must_use]
    pub fn disable(mut self, disabled: impl IntoIterator<Item = String>) -> Self {
        for name in disabled {
            self.levels.insert(name, LintLevel::Allow);
        }
        self
    }

    /// Configured level for `lint_name`; a category name (`string`) applies
    /// to its lint unless the lint itself is configured.
    pub fn level_for(&self, lint_name: &str) -> LintLevel {
        if let Some(&level) = self.levels.get(lint_name) {
            return level;
        }
        find_descriptor(lint_name)
            .and_then(|d| self.levels.get(d.category.as_str()))
            .copied()
            .unwrap_or_default()
    }

    /// Returns an error naming the first configured key that is neither a
    /// lint nor a category.
    pub fn validate(&self) -> Result<()> {
        let known = all_known_lints();
        let mut names: Vec<&String> = self.levels.keys().collect();
        names.sort();
        for name in names {
            let is_category = Category::ALL.iter().any(|c| c.as_str() == name);
            if !known.contains(name.as_str()) && !is_category {
                return Err(anyhow!("unknown lint: {name}"));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Context
// ============================================================================

/// Mutable context collecting diagnostics for one source file.
pub struct LintContext<'src> {
    source: &'src str,
    settings: LintSettings,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> LintContext<'src> {
    pub fn new(source: &'src str, settings: LintSettings) -> Self {
        Self {
            source,
            settings,
            diagnostics: Vec::new(),
        }
    }

    /// Report `function` used at `range`, unless its lint is allowed.
    pub fn report_with_suggestion(
        &mut self,
        lint: &'static LintDescriptor,
        function: &str,
        range: Range<usize>,
        message: impl Into<String>,
        help: Option<String>,
        suggestion: Option<Suggestion>,
    ) {
        self.report_diagnostic(Diagnostic {
            lint,
            level: LintLevel::default(),
            file: None,
            function: function.to_string(),
            span: Span::from_byte_range(self.source, range),
            message: message.into(),
            help,
            suggestion,
        });
    }

    /// Report an already-constructed diagnostic, replacing its level with the
    /// configured one.
    pub fn report_diagnostic(&mut self, mut diagnostic: Diagnostic) {
        let level = self.settings.level_for(diagnostic.lint.name);
        if !level.is_enabled() {
            return;
        }
        diagnostic.level = level;
        self.diagnostics.push(diagnostic);
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Set of lints enabled for a run.
#[derive(Debug, Clone)]
pub struct LintRegistry {
    lints: Vec<&'static LintDescriptor>,
}

impl Default for LintRegistry {
    fn default() -> Self {
        Self::default_rules()
    }
}

impl LintRegistry {
    #[must_use = "registry should be used to create an engine"]
    pub fn default_rules() -> Self {
        Self {
            lints: ALL_LINTS.to_vec(),
        }
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static LintDescriptor> + '_ {
        self.lints.iter().copied()
    }

    pub fn is_enabled(&self, lint: &LintDescriptor) -> bool {
        self.lints.iter().any(|d| d.name == lint.name)
    }

    /// Built-in lints narrowed by `only`, then with `skip` and `disabled` removed.
    ///
    /// # Errors
    ///
    /// Returns error if any lint name in `only`, `skip`, or `disabled` is unknown.
    pub fn default_rules_filtered(
        only: &[String],
        skip: &[String],
        disabled: &[String],
    ) -> Result<Self> {
        let known = all_known_lints();
        for n in only.iter().chain(skip.iter()).chain(disabled.iter()) {
            if !known.contains(n.as_str()) {
                return Err(anyhow!("unknown lint: {n}"));
            }
        }

        let only_set: Option<HashSet<&str>> = if only.is_empty() {
            None
        } else {
            Some(only.iter().map(String::as_str).collect())
        };
        let removed: HashSet<&str> = skip.iter().chain(disabled).map(String::as_str).collect();

        let lints = ALL_LINTS
            .iter()
            .copied()
            .filter(|d| only_set.as_ref().is_none_or(|only| only.contains(d.name)))
            .filter(|d| !removed.contains(d.name))
            .collect();
        Ok(Self { lints })
    }
}
