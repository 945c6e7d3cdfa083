use lodash_native::LintEngine;
use lodash_native::config::{self, DEFAULT_CONFIG_FILE_NAME};
use lodash_native::level::LintLevel;
use lodash_native::mapping::Safety;
use std::fs;
use tempfile::TempDir;

const SOURCE: &str = "import _ from 'lodash';\nconst a = _.isNil(v);\nconst b = _.head(xs);\n";

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(DEFAULT_CONFIG_FILE_NAME);
    fs::write(&path, body).expect("write config");
    path
}

fn engine_for(body: &str) -> LintEngine {
    let cfg = config::parse_config(body).expect("config should parse");
    LintEngine::from_config(&cfg, &[], &[]).expect("engine")
}

#[test]
fn config_discovered_from_nested_directory() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[fix]\nmax_safety = \"caution\"\n");
    let nested = dir.path().join("src/components");
    fs::create_dir_all(&nested).unwrap();

    assert_eq!(config::find_config_file(&nested), Some(path.clone()));

    let (found, cfg) = config::load_config(None, &nested).unwrap().expect("config");
    assert_eq!(found, path);
    assert_eq!(cfg.fix.max_safety, Safety::Caution);
}

#[test]
fn explicit_path_wins_over_discovery() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "");
    let explicit = dir.path().join("strict.toml");
    fs::write(&explicit, "[lints]\narray = \"error\"\n").unwrap();

    let (found, cfg) = config::load_config(Some(&explicit), dir.path())
        .unwrap()
        .expect("config");
    assert_eq!(found, explicit);
    assert_eq!(cfg.lints.levels.get("array"), Some(&LintLevel::Error));
}

#[test]
fn missing_config_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let result = config::load_config(None, dir.path()).unwrap();
    // A config higher up the real filesystem would be found; the temp dir has none.
    if let Some((path, _)) = result {
        assert!(!path.starts_with(dir.path()));
    }
}

#[test]
fn defaults_when_sections_absent() {
    let cfg = config::parse_config("").unwrap();
    assert_eq!(cfg.fix.max_safety, Safety::Safe);
    assert!(cfg.lints.disabled.is_empty());
    assert!(cfg.functions.templates.is_empty());
    assert!(cfg.detect.modules.is_empty());
}

#[test]
fn config_can_promote_lint_to_error() {
    let engine = engine_for("[lints]\nprefer_native_lang = \"error\"\n");
    let diags = engine.lint_source(SOURCE);

    let levels: Vec<_> = diags.iter().map(|d| (d.function.as_str(), d.level)).collect();
    assert_eq!(levels, vec![("isNil", LintLevel::Error), ("head", LintLevel::Warn)]);
}

#[test]
fn config_can_disable_lint() {
    let engine = engine_for("[lints]\ndisabled = [\"prefer_native_array\"]\n");
    let diags = engine.lint_source(SOURCE);

    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].lint.name, "prefer_native_lang");
}

#[test]
fn allow_level_silences_lint() {
    let engine = engine_for("[lints]\nlang = \"allow\"\n");
    let diags = engine.lint_source(SOURCE);
    assert!(diags.iter().all(|d| d.function != "isNil"));
}

#[test]
fn template_override_changes_rewrite() {
    let engine = engine_for(
        r#"
[functions.templates.head]
template = "value.slice(0, 1)[0]"
safety = "caution"
"#,
    );
    let mapping = engine.mapping().get("head").unwrap();
    assert_eq!(mapping.template, "value.slice(0, 1)[0]");
    assert_eq!(mapping.safety, Safety::Caution);

    let diags = engine.lint_source(SOURCE);
    let head = diags.iter().find(|d| d.function == "head").unwrap();
    let suggestion = head.suggestion.as_ref().unwrap();
    assert_eq!(suggestion.fix.text, "xs.slice(0, 1)[0]");
    assert_eq!(suggestion.safety, Safety::Caution);
}

#[test]
fn disabled_functions_are_not_reported() {
    let engine = engine_for("[functions]\ndisabled = [\"head\"]\n");
    let diags = engine.lint_source(SOURCE);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].function, "isNil");
}

#[test]
fn unknown_keys_are_rejected() {
    let err = config::parse_config("[fix]\nmax_safty = \"safe\"\n").unwrap_err();
    assert!(err.to_string().contains("max_safty"), "{err}");

    let cfg = config::parse_config("[lints]\nprefer_native_arrays = \"error\"\n").unwrap();
    let err = LintEngine::from_config(&cfg, &[], &[]).err().expect("unknown lint");
    assert!(err.to_string().contains("prefer_native_arrays"), "{err}");

    let cfg = config::parse_config("[functions]\ndisabled = [\"notALodashFn\"]\n").unwrap();
    assert!(LintEngine::from_config(&cfg, &[], &[]).is_err());
}

#[test]
fn unreadable_config_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[lints\n");
    let err = config::load_config_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains(DEFAULT_CONFIG_FILE_NAME), "{err:#}");
}
