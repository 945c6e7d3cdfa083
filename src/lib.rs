//! Lodash to native JavaScript lint engine and autofixer.
//!
//! The crate exposes a `LintEngine` that finds lodash calls in JavaScript or
//! TypeScript source and, for each function with a native equivalent, reports
//! a diagnostic carrying a ready-to-apply rewrite. The rewrite engine itself
//! is available directly through [`build_replacement`].

pub mod args;
pub mod classify;
pub mod cli;
pub mod config;
pub mod detect;
pub mod diagnostics;
pub mod error;
pub mod finalize;
pub mod fix;
pub mod fixer;
pub mod level;
pub mod lint;
pub mod locator;
pub mod mapping;
pub mod patterns;
pub mod regex_cache;
pub mod scanner;
pub mod telemetry;

pub use crate::fix::FixResult;
pub use crate::locator::CallSite;
pub use crate::patterns::build_replacement;

use anyhow::Result;

use crate::config::NativeLintConfig;
use crate::detect::{Detector, Usage};
use crate::diagnostics::{Diagnostic, Suggestion};
use crate::lint::{LintContext, LintRegistry, LintSettings, descriptor_for};
use crate::mapping::{FunctionMapping, MappingTable, Safety};

/// Engine orchestrates linting by detecting lodash calls and rewriting them.
pub struct LintEngine {
    registry: LintRegistry,
    settings: LintSettings,
    mapping: MappingTable,
    detector: Detector,
}

impl LintEngine {
    /// Create a new engine with default lint settings and the built-in table.
    pub fn new(registry: LintRegistry) -> Self {
        Self::new_with_settings(registry, LintSettings::default())
    }

    /// Create a new engine with explicit lint settings (e.g. from config).
    pub fn new_with_settings(registry: LintRegistry, settings: LintSettings) -> Self {
        let mapping = MappingTable::builtin();
        let detector = Detector::new(mapping.iter().map(|m| m.function.as_str()));
        Self {
            registry,
            settings,
            mapping,
            detector,
        }
    }

    /// Build an engine from a loaded configuration plus CLI lint filters.
    ///
    /// # Errors
    ///
    /// Returns error for unknown lint names, unknown disabled functions, or
    /// invalid template overrides.
    pub fn from_config(config: &NativeLintConfig, only: &[String], skip: &[String]) -> Result<Self> {
        let settings = LintSettings::default()
            .with_config_levels(config.lints.levels.clone())
            .disable(config.lints.disabled.clone());
        settings.validate()?;
        let registry = LintRegistry::default_rules_filtered(only, skip, &config.lints.disabled)?;

        let mut mapping = MappingTable::builtin();
        mapping
            .apply_config(&config.functions)
            .map_err(|e| e.into_anyhow())?;

        Ok(Self::new_with_settings(registry, settings)
            .with_mapping(mapping)
            .with_modules(config.detect.modules.iter().cloned()))
    }

    /// Replace the function table.
    #[must_use]
    pub fn with_mapping(mut self, mapping: MappingTable) -> Self {
        let modules = self.detector.modules().to_vec();
        self.detector = Detector::new(mapping.iter().map(|m| m.function.as_str())).with_modules(modules);
        self.mapping = mapping;
        self
    }

    /// Treat extra module names as lodash.
    #[must_use]
    pub fn with_modules(mut self, modules: impl IntoIterator<Item = String>) -> Self {
        self.detector = self.detector.with_modules(modules);
        self
    }

    pub fn mapping(&self) -> &MappingTable {
        &self.mapping
    }

    pub fn settings(&self) -> &LintSettings {
        &self.settings
    }

    /// Lint a single in-memory source string and return diagnostics.
    pub fn lint_source(&self, source: &str) -> Vec<Diagnostic> {
        let mut ctx = LintContext::new(source, self.settings.clone());

        for usage in self.detector.usages(source) {
            let Some(mapping) = self.mapping.get(&usage.function) else {
                continue;
            };
            let lint = descriptor_for(mapping.category);
            if !self.registry.is_enabled(lint) {
                continue;
            }

            let suggestion = suggest(&usage, mapping);
            let help = help_for(mapping, suggestion.is_some());
            ctx.report_with_suggestion(
                lint,
                &mapping.function,
                usage.call.start..usage.call.end,
                format!(
                    "`{}` can be replaced with native `{}`",
                    mapping.function, mapping.template
                ),
                help,
                suggestion,
            );
        }

        ctx.into_diagnostics()
    }
}

fn suggest(usage: &Usage<'_>, mapping: &FunctionMapping) -> Option<Suggestion> {
    let Some(fix) = build_replacement(&usage.call, &mapping.template, &mapping.function) else {
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            function = mapping.function.as_str(),
            call = usage.call.text(),
            "no rewrite for call"
        );
        return None;
    };
    Some(Suggestion {
        message: format!("replace with `{}`", fix.text),
        fix,
        safety: mapping.safety,
    })
}

fn help_for(mapping: &FunctionMapping, has_fix: bool) -> Option<String> {
    match (mapping.safety, has_fix) {
        (Safety::Safe, true) => None,
        (Safety::Safe, false) => Some("no automatic rewrite for this call; rewrite by hand".into()),
        (safety, true) => Some(format!(
            "rewrite is {safety}: native behaviour differs from lodash on edge cases"
        )),
        (safety, false) => Some(format!(
            "no automatic rewrite for this call; native replacement is {safety}"
        )),
    }
}

/// Construct a `LintEngine` with all built-in lints enabled.
pub fn create_default_engine() -> LintEngine {
    LintEngine::new(LintRegistry::default_rules())
}
