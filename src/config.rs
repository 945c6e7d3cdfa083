use crate::level::LintLevel;
use crate::mapping::{Category, Difficulty, Safety};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NativeLintConfig {
    #[serde(default)]
    pub lints: LintsConfig,

    #[serde(default)]
    pub fix: FixConfig,

    #[serde(default)]
    pub functions: FunctionsConfig,

    #[serde(default)]
    pub detect: DetectConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct LintsConfig {
    #[serde(default)]
    pub disabled: Vec<String>,

    #[serde(flatten)]
    pub levels: HashMap<String, LintLevel>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixConfig {
    /// Highest safety level applied by `--fix`.
    #[serde(default = "FixConfig::default_max_safety")]
    pub max_safety: Safety,
}

impl FixConfig {
    fn default_max_safety() -> Safety {
        Safety::Safe
    }
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            max_safety: Self::default_max_safety(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionsConfig {
    /// Lodash functions that should never be reported.
    #[serde(default)]
    pub disabled: Vec<String>,

    #[serde(default)]
    pub templates: BTreeMap<String, TemplateOverride>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateOverride {
    pub template: String,
    #[serde(default)]
    pub safety: Option<Safety>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectConfig {
    /// Extra module specifiers treated like `lodash` (e.g. an internal re-export).
    #[serde(default)]
    pub modules: Vec<String>,
}

pub const DEFAULT_CONFIG_FILE_NAME: &str = "lodash-native.toml";

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut cur = Some(start_dir);
    while let Some(dir) = cur {
        let candidate = dir.join(DEFAULT_CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        cur = dir.parent();
    }
    None
}

pub fn parse_config(raw: &str) -> Result<NativeLintConfig> {
    Ok(toml::from_str(raw)?)
}

pub fn load_config_file(path: &Path) -> Result<NativeLintConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let cfg = parse_config(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(cfg)
}

pub fn load_config(
    explicit_path: Option<&Path>,
    start_dir: &Path,
) -> Result<Option<(PathBuf, NativeLintConfig)>> {
    if let Some(p) = explicit_path {
        let cfg = load_config_file(p)?;
        return Ok(Some((p.to_path_buf(), cfg)));
    }

    let Some(p) = find_config_file(start_dir) else {
        return Ok(None);
    };
    let cfg = load_config_file(&p)?;
    Ok(Some((p, cfg)))
}
