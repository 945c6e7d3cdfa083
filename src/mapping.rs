//! Lodash function → native template table.
//!
//! Templates are plain strings in a small DSL that [`crate::classify`]
//! understands: `Type.prototype.method` for instance methods,
//! `Type.prototype.method[args]` for baked-in arguments, `Namespace.fn` or
//! `fn(params)` for static and global calls, literal stubs, and inline
//! expressions over a placeholder such as `value`.
//!
//! The engine only reads the template. Safety, category, and difficulty are
//! metadata for the lint layer and the CLI.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::templates as t;
use crate::config::FunctionsConfig;
use crate::error::{NativeLintError, NativeResult};

/// How closely the native replacement matches lodash semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Safety {
    /// Equivalent for every input lodash accepts.
    Safe,
    /// Equivalent for typical inputs; differs on edge cases such as `null`
    /// collections or objects passed where arrays are expected.
    Caution,
    /// Known behavioural differences; review every rewrite.
    Unsafe,
}

impl Safety {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Caution => "caution",
            Self::Unsafe => "unsafe",
        }
    }
}

impl fmt::Display for Safety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Array,
    Collection,
    Object,
    String,
    Lang,
    Math,
    Number,
    Function,
    Util,
    Date,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Array,
        Self::Collection,
        Self::Object,
        Self::String,
        Self::Lang,
        Self::Math,
        Self::Number,
        Self::Function,
        Self::Util,
        Self::Date,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Collection => "collection",
            Self::Object => "object",
            Self::String => "string",
            Self::Lang => "lang",
            Self::Math => "math",
            Self::Number => "number",
            Self::Function => "function",
            Self::Util => "util",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effort to review a rewrite by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionMapping {
    pub function: String,
    pub template: String,
    pub safety: Safety,
    pub category: Category,
    pub difficulty: Difficulty,
}

struct BuiltinMapping {
    function: &'static str,
    template: &'static str,
    safety: Safety,
    category: Category,
    difficulty: Difficulty,
}

macro_rules! builtin {
    ($($function:literal => $template:expr, $safety:ident, $category:ident, $difficulty:ident;)*) => {
        &[$(BuiltinMapping {
            function: $function,
            template: $template,
            safety: Safety::$safety,
            category: Category::$category,
            difficulty: Difficulty::$difficulty,
        },)*]
    };
}

static BUILTIN: &[BuiltinMapping] = builtin! {
    // Array
    "chunk" => t::CHUNK, Safe, Array, Medium;
    "compact" => "Array.prototype.filter[Boolean]", Safe, Array, Easy;
    "concat" => "Array.prototype.concat", Safe, Array, Easy;
    "drop" => t::DROP, Safe, Array, Easy;
    "dropRight" => t::DROP_RIGHT, Safe, Array, Easy;
    "fill" => "Array.prototype.fill", Caution, Array, Easy;
    "findIndex" => "Array.prototype.findIndex", Caution, Array, Easy;
    "findLastIndex" => "Array.prototype.findLastIndex", Caution, Array, Easy;
    "first" => "Array.prototype.at[0]", Safe, Array, Easy;
    "flatten" => "Array.prototype.flat", Safe, Array, Easy;
    "flattenDeep" => "Array.prototype.flat[Infinity]", Safe, Array, Easy;
    "flattenDepth" => "Array.prototype.flat", Safe, Array, Easy;
    "fromPairs" => "Object.fromEntries", Safe, Array, Easy;
    "head" => "Array.prototype.at[0]", Safe, Array, Easy;
    "indexOf" => "Array.prototype.indexOf", Safe, Array, Easy;
    "initial" => "Array.prototype.slice[0, -1]", Safe, Array, Easy;
    "join" => "Array.prototype.join", Safe, Array, Easy;
    "last" => "Array.prototype.at[-1]", Safe, Array, Easy;
    "lastIndexOf" => "Array.prototype.lastIndexOf", Safe, Array, Easy;
    "nth" => "Array.prototype.at", Safe, Array, Easy;
    "reverse" => "Array.prototype.reverse", Safe, Array, Easy;
    "slice" => "Array.prototype.slice", Safe, Array, Easy;
    "tail" => "Array.prototype.slice[1]", Safe, Array, Easy;
    "take" => t::TAKE, Safe, Array, Easy;
    "takeRight" => t::TAKE_RIGHT, Safe, Array, Easy;
    "union" => "Set", Safe, Array, Medium;
    "uniq" => "Set", Safe, Array, Easy;

    // Collection
    "countBy" => t::COUNT_BY, Caution, Collection, Hard;
    "each" => "Array.prototype.forEach", Caution, Collection, Easy;
    "every" => "Array.prototype.every", Caution, Collection, Easy;
    "filter" => "Array.prototype.filter", Caution, Collection, Easy;
    "find" => "Array.prototype.find", Caution, Collection, Easy;
    "findLast" => "Array.prototype.findLast", Caution, Collection, Easy;
    "flatMap" => "Array.prototype.flatMap", Caution, Collection, Easy;
    "forEach" => "Array.prototype.forEach", Caution, Collection, Easy;
    "groupBy" => t::GROUP_BY, Caution, Collection, Medium;
    "includes" => "Array.prototype.includes", Caution, Collection, Easy;
    "keyBy" => t::KEY_BY, Caution, Collection, Medium;
    "map" => "Array.prototype.map", Caution, Collection, Easy;
    "orderBy" => t::ORDER_BY, Caution, Collection, Hard;
    "reduce" => "Array.prototype.reduce", Caution, Collection, Easy;
    "reduceRight" => "Array.prototype.reduceRight", Caution, Collection, Easy;
    "reject" => "Array.prototype.filter", Caution, Collection, Medium;
    "size" => "value.length", Caution, Collection, Easy;
    "some" => "Array.prototype.some", Caution, Collection, Easy;
    "sortBy" => "Array.prototype.toSorted", Caution, Collection, Medium;

    // Object
    "assign" => "Object.assign", Safe, Object, Easy;
    "clone" => t::CLONE, Unsafe, Object, Medium;
    "cloneDeep" => "structuredClone", Caution, Object, Easy;
    "create" => "Object.create", Safe, Object, Easy;
    "entries" => "Object.entries", Safe, Object, Easy;
    "has" => t::HAS, Caution, Object, Easy;
    "keys" => "Object.keys", Safe, Object, Easy;
    "omit" => t::OMIT, Caution, Object, Medium;
    "pick" => t::PICK, Caution, Object, Medium;
    "toPairs" => "Object.entries", Safe, Object, Easy;
    "values" => "Object.values", Safe, Object, Easy;

    // String
    "capitalize" => t::CAPITALIZE, Caution, String, Easy;
    "endsWith" => "String.prototype.endsWith", Safe, String, Easy;
    "lowerFirst" => t::LOWER_FIRST, Caution, String, Easy;
    "padEnd" => "String.prototype.padEnd", Safe, String, Easy;
    "padStart" => "String.prototype.padStart", Safe, String, Easy;
    "parseInt" => "parseInt(string, radix)", Safe, String, Easy;
    "repeat" => "String.prototype.repeat", Caution, String, Easy;
    "replace" => "String.prototype.replace", Safe, String, Easy;
    "split" => "String.prototype.split", Caution, String, Easy;
    "startsWith" => "String.prototype.startsWith", Safe, String, Easy;
    "toLower" => "String.prototype.toLowerCase", Safe, String, Easy;
    "toUpper" => "String.prototype.toUpperCase", Safe, String, Easy;
    "trim" => "String.prototype.trim", Caution, String, Easy;
    "trimEnd" => "String.prototype.trimEnd", Caution, String, Easy;
    "trimStart" => "String.prototype.trimStart", Caution, String, Easy;
    "upperFirst" => t::UPPER_FIRST, Caution, String, Easy;

    // Lang
    "castArray" => t::CAST_ARRAY, Caution, Lang, Easy;
    "gt" => "value > other", Safe, Lang, Easy;
    "gte" => "value >= other", Safe, Lang, Easy;
    "isArray" => "Array.isArray", Safe, Lang, Easy;
    "isArrayBuffer" => "value instanceof ArrayBuffer", Safe, Lang, Easy;
    "isBoolean" => "typeof value === 'boolean'", Caution, Lang, Easy;
    "isDate" => "value instanceof Date", Safe, Lang, Easy;
    "isEmpty" => "Object.keys(value).length === 0", Caution, Lang, Medium;
    "isError" => "value instanceof Error", Caution, Lang, Easy;
    "isFinite" => "Number.isFinite", Safe, Lang, Easy;
    "isFunction" => "typeof value === 'function'", Safe, Lang, Easy;
    "isInteger" => "Number.isInteger", Safe, Lang, Easy;
    "isMap" => "value instanceof Map", Safe, Lang, Easy;
    "isNaN" => "Number.isNaN", Caution, Lang, Easy;
    "isNil" => "value == null", Safe, Lang, Easy;
    "isNull" => "value === null", Safe, Lang, Easy;
    "isNumber" => "typeof value === 'number'", Caution, Lang, Easy;
    "isRegExp" => "value instanceof RegExp", Safe, Lang, Easy;
    "isSafeInteger" => "Number.isSafeInteger", Safe, Lang, Easy;
    "isSet" => "value instanceof Set", Safe, Lang, Easy;
    "isString" => "typeof value === 'string'", Caution, Lang, Easy;
    "isSymbol" => "typeof value === 'symbol'", Caution, Lang, Easy;
    "isUndefined" => "value === undefined", Safe, Lang, Easy;
    "isWeakMap" => "value instanceof WeakMap", Safe, Lang, Easy;
    "isWeakSet" => "value instanceof WeakSet", Safe, Lang, Easy;
    "lt" => "value < other", Safe, Lang, Easy;
    "lte" => "value <= other", Safe, Lang, Easy;
    "toArray" => "Array.from", Caution, Lang, Easy;
    "toFinite" => t::TO_FINITE, Caution, Lang, Medium;
    "toInteger" => t::TO_INTEGER, Caution, Lang, Medium;
    "toNumber" => "Number", Caution, Lang, Easy;
    "toSafeInteger" => t::TO_SAFE_INTEGER, Caution, Lang, Medium;
    "toString" => "String", Unsafe, Lang, Easy;

    // Math
    "add" => "augend + addend", Caution, Math, Easy;
    "ceil" => "Math.ceil(number)", Safe, Math, Easy;
    "divide" => "dividend / divisor", Caution, Math, Easy;
    "floor" => "Math.floor(number)", Safe, Math, Easy;
    "max" => "Math.max(...array)", Caution, Math, Easy;
    "mean" => t::MEAN, Caution, Math, Medium;
    "min" => "Math.min(...array)", Caution, Math, Easy;
    "multiply" => "multiplier * multiplicand", Caution, Math, Easy;
    "round" => "Math.round(number)", Safe, Math, Easy;
    "subtract" => "minuend - subtrahend", Caution, Math, Easy;
    "sum" => t::SUM, Caution, Math, Medium;

    // Number
    "clamp" => t::CLAMP, Safe, Number, Easy;
    "inRange" => t::IN_RANGE, Caution, Number, Easy;
    "random" => t::RANDOM, Caution, Number, Medium;

    // Function
    "defer" => t::DEFER, Safe, Function, Easy;
    "delay" => t::DELAY, Safe, Function, Easy;

    // Util
    "identity" => t::IDENTITY, Safe, Util, Easy;
    "noop" => "undefined", Safe, Util, Easy;
    "range" => t::RANGE, Caution, Util, Medium;
    "rangeRight" => t::RANGE_RIGHT, Caution, Util, Medium;
    "stubArray" => "[]", Safe, Util, Easy;
    "stubFalse" => "false", Safe, Util, Easy;
    "stubObject" => "{}", Safe, Util, Easy;
    "stubString" => "''", Safe, Util, Easy;
    "stubTrue" => "true", Safe, Util, Easy;
    "times" => t::TIMES, Safe, Util, Easy;

    // Date
    "now" => t::NOW, Safe, Date, Easy;
};

/// Function name → mapping, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: BTreeMap<String, FunctionMapping>,
}

impl MappingTable {
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|b| {
                (
                    b.function.to_string(),
                    FunctionMapping {
                        function: b.function.to_string(),
                        template: b.template.to_string(),
                        safety: b.safety,
                        category: b.category,
                        difficulty: b.difficulty,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, function: &str) -> Option<&FunctionMapping> {
        self.entries.get(function)
    }

    pub fn contains(&self, function: &str) -> bool {
        self.entries.contains_key(function)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionMapping> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, mapping: FunctionMapping) {
        self.entries.insert(mapping.function.clone(), mapping);
    }

    pub fn remove(&mut self, function: &str) -> Option<FunctionMapping> {
        self.entries.remove(function)
    }

    /// Apply `[functions]` configuration: template overrides first, then
    /// removals.
    ///
    /// Overriding an unknown function adds it (defaulting to `caution`,
    /// `util`, `medium`); disabling an unknown function is an error, since
    /// it is almost certainly a typo.
    pub fn apply_config(&mut self, config: &FunctionsConfig) -> NativeResult<()> {
        for (function, over) in &config.templates {
            let template = over.template.trim();
            if template.is_empty() {
                return Err(NativeLintError::mapping(format!(
                    "empty template for function `{function}`"
                )));
            }
            let base = self.entries.get(function);
            let mapping = FunctionMapping {
                function: function.clone(),
                template: template.to_string(),
                safety: over
                    .safety
                    .or(base.map(|m| m.safety))
                    .unwrap_or(Safety::Caution),
                category: over
                    .category
                    .or(base.map(|m| m.category))
                    .unwrap_or(Category::Util),
                difficulty: over
                    .difficulty
                    .or(base.map(|m| m.difficulty))
                    .unwrap_or(Difficulty::Medium),
            };
            self.insert(mapping);
        }

        for function in &config.disabled {
            if self.remove(function).is_none() {
                return Err(NativeLintError::UnknownFunction(function.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Shape, classify};
    use crate::config::TemplateOverride;

    #[test]
    fn builtin_names_unique_and_sorted() {
        let table = MappingTable::builtin();
        assert_eq!(table.len(), BUILTIN.len());
        let names: Vec<_> = table.iter().map(|m| m.function.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn every_builtin_template_is_supported() {
        for mapping in MappingTable::builtin().iter() {
            assert_ne!(
                classify(&mapping.template, &mapping.function),
                Shape::Unsupported,
                "{}",
                mapping.function
            );
        }
    }

    #[test]
    fn safety_orders_from_safe_to_unsafe() {
        assert!(Safety::Safe < Safety::Caution);
        assert!(Safety::Caution < Safety::Unsafe);
    }

    #[test]
    fn config_overrides_and_disables() {
        let mut table = MappingTable::builtin();
        let mut config = FunctionsConfig::default();
        config.disabled.push("map".to_string());
        config.templates.insert(
            "keys".to_string(),
            TemplateOverride {
                template: "Reflect.ownKeys".to_string(),
                safety: Some(Safety::Unsafe),
                category: None,
                difficulty: None,
            },
        );
        table.apply_config(&config).unwrap();

        assert!(!table.contains("map"));
        let keys = table.get("keys").unwrap();
        assert_eq!(keys.template, "Reflect.ownKeys");
        assert_eq!(keys.safety, Safety::Unsafe);
        assert_eq!(keys.category, Category::Object);
    }

    #[test]
    fn disabling_unknown_function_errors() {
        let mut table = MappingTable::builtin();
        let config = FunctionsConfig {
            disabled: vec!["mapp".to_string()],
            ..FunctionsConfig::default()
        };
        let err = table.apply_config(&config).unwrap_err();
        assert_eq!(err.to_string(), "unknown function: mapp");
    }
}
