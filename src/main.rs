use clap::Parser;
use lodash_native::cli::{Args, Command, LintArgs, OutputFormat, RewriteArgs};
use lodash_native::config::{self, NativeLintConfig};
use lodash_native::diagnostics::Diagnostic;
use lodash_native::fixer::{self, FixerError, MAX_ITERATIONS};
use lodash_native::level::LintLevel;
use lodash_native::lint::descriptor_for;
use lodash_native::mapping::{MappingTable, Safety};
use lodash_native::{CallSite, LintEngine, build_replacement, instrument_block};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

/// Extensions treated as JavaScript or TypeScript sources.
const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

fn main() -> ExitCode {
    lodash_native::telemetry::init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Some(Command::ListFunctions { format }) => {
            list_functions(format)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Explain { function, config }) => {
            explain_function(&function, config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Rewrite(rewrite)) => rewrite_command(rewrite),
        Some(Command::Lint(lint)) => lint_command(lint),
        None => lint_command(args.lint),
    }
}

fn list_functions(format: OutputFormat) -> anyhow::Result<()> {
    let table = MappingTable::builtin();
    match format {
        OutputFormat::Json => {
            let all: Vec<_> = table.iter().collect();
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
        OutputFormat::Pretty | OutputFormat::Github => {
            for m in table.iter() {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    m.function,
                    m.category.as_str(),
                    m.safety.as_str(),
                    m.difficulty.as_str(),
                    m.template
                );
            }
        }
    }
    Ok(())
}

fn explain_function(function: &str, config_path: Option<&Path>) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let cfg = load_config(config_path, &cwd)?;
    let mut table = MappingTable::builtin();
    table
        .apply_config(&cfg.functions)
        .map_err(|e| e.into_anyhow())?;

    let Some(m) = table.get(function) else {
        anyhow::bail!("unknown function: {function}");
    };
    let lint = descriptor_for(m.category);

    println!("function: {}", m.function);
    println!("native: {}", m.template);
    println!("lint: {}", lint.name);
    println!("category: {}", m.category.as_str());
    println!("safety: {}", m.safety.as_str());
    println!("difficulty: {}", m.difficulty.as_str());
    println!("description: {}", lint.description);
    if m.safety > Safety::Safe {
        println!("fix: applied only with --unsafe-fixes or [fix] max_safety");
    } else {
        println!("fix: applied by --fix");
    }
    Ok(())
}

fn rewrite_command(args: RewriteArgs) -> anyhow::Result<ExitCode> {
    let text = args.call.trim();
    let start = text
        .strip_prefix('!')
        .map_or(0, |rest| text.len() - rest.trim_start().len());

    let Some(call) = CallSite::locate(text, start) else {
        anyhow::bail!("not a call expression: {text}");
    };
    let function = match args.function {
        Some(f) => f,
        None => infer_function(&text[start..call.end])?,
    };
    let template = match args.template {
        Some(t) => t,
        None => {
            let cwd = std::env::current_dir()?;
            let cfg = load_config(None, &cwd)?;
            let mut table = MappingTable::builtin();
            table
                .apply_config(&cfg.functions)
                .map_err(|e| e.into_anyhow())?;
            let Some(m) = table.get(&function) else {
                anyhow::bail!("unknown function: {function}");
            };
            m.template.clone()
        }
    };

    match build_replacement(&call, &template, &function) {
        Some(fix) => {
            let before = text.get(..fix.range.start).unwrap_or("");
            let after = text.get(fix.range.end..).unwrap_or("");
            println!("{before}{}{after}", fix.text);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("no native rewrite for `{text}` with template `{template}`");
            Ok(ExitCode::from(1))
        }
    }
}

/// `_.groupBy(...)` and `groupBy(...)` both name `groupBy`.
fn infer_function(call_text: &str) -> anyhow::Result<String> {
    let callee = call_text.split('(').next().unwrap_or("").trim();
    let name = callee.rsplit('.').next().unwrap_or("").trim();
    if name.is_empty() {
        anyhow::bail!("cannot infer the lodash function from `{call_text}`; pass --function");
    }
    Ok(name.to_string())
}

fn lint_command(args: LintArgs) -> anyhow::Result<ExitCode> {
    // Handle --fix mode
    if args.fix {
        return fix_command(args);
    }

    let start_dir = infer_start_dir(&args)?;
    let cfg = load_config(args.config.as_deref(), &start_dir)?;
    let engine = LintEngine::from_config(&cfg, &args.only, &args.skip)?;

    let diagnostics = instrument_block!("lint", {
        let mut all: Vec<Diagnostic> = Vec::new();
        if args.paths.is_empty() {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            all.extend(lint_text(&engine, &source, "stdin"));
        } else {
            for path in collect_source_files(&args.paths)? {
                let source = std::fs::read_to_string(&path)?;
                all.extend(lint_text(&engine, &source, &path.display().to_string()));
            }
        }
        Ok::<_, anyhow::Error>(all)
    })?;

    let has_error = diagnostics.iter().any(|d| d.level == LintLevel::Error);

    match args.format {
        OutputFormat::Json => {
            let mut out: Vec<JsonDiagnostic> = diagnostics.iter().map(JsonDiagnostic::from).collect();
            out.sort_by(|a, b| {
                (a.file.as_str(), a.row, a.column, a.lint.as_str())
                    .cmp(&(b.file.as_str(), b.row, b.column, b.lint.as_str()))
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Pretty => print_pretty(&diagnostics),
        OutputFormat::Github => print_github(&diagnostics, args.deny_warnings),
    }

    if has_error || (args.deny_warnings && !diagnostics.is_empty()) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn lint_text(engine: &LintEngine, source: &str, file: &str) -> Vec<Diagnostic> {
    let mut diagnostics = engine.lint_source(source);
    for diag in &mut diagnostics {
        diag.file = Some(file.to_string());
    }
    diagnostics
}

fn print_pretty(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        println!(
            "{}:{}:{}: {}: {}: {}",
            diag.file.as_deref().unwrap_or("<unknown>"),
            diag.span.start.row,
            diag.span.start.column,
            diag.level.as_str(),
            diag.lint.name,
            diag.message
        );
        if let Some(suggestion) = &diag.suggestion {
            println!("    fix ({}): {}", suggestion.safety, suggestion.fix.text);
        }
        if let Some(help) = &diag.help {
            println!("    help: {help}");
        }
    }
    println!("{} diagnostics", diagnostics.len());
}

fn print_github(diagnostics: &[Diagnostic], deny_warnings: bool) {
    for diag in diagnostics {
        let kind = if diag.level == LintLevel::Error
            || (deny_warnings && diag.level == LintLevel::Warn)
        {
            "error"
        } else {
            "warning"
        };
        let mut msg = diag.message.clone();
        if let Some(suggestion) = &diag.suggestion {
            msg.push_str(&format!("\nfix: {}", suggestion.fix.text));
        }
        println!(
            "::{} file={},line={},col={},endLine={},endColumn={},title={}::{}",
            kind,
            github_escape(diag.file.as_deref().unwrap_or("stdin")),
            diag.span.start.row,
            diag.span.start.column,
            diag.span.end.row,
            diag.span.end.column,
            diag.lint.name,
            github_escape(&msg)
        );
    }
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic {
    file: String,
    row: usize,
    column: usize,
    end_row: usize,
    end_column: usize,
    level: String,
    lint: String,
    function: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<JsonSuggestion>,
}

#[derive(Debug, Serialize)]
struct JsonSuggestion {
    start: usize,
    end: usize,
    replacement: String,
    safety: Safety,
}

impl From<&Diagnostic> for JsonDiagnostic {
    fn from(d: &Diagnostic) -> Self {
        Self {
            file: d.file.clone().unwrap_or_else(|| "stdin".to_string()),
            row: d.span.start.row,
            column: d.span.start.column,
            end_row: d.span.end.row,
            end_column: d.span.end.column,
            level: d.level.as_str().to_string(),
            lint: d.lint.name.to_string(),
            function: d.function.clone(),
            message: d.message.clone(),
            help: d.help.clone(),
            suggestion: d.suggestion.as_ref().map(|s| JsonSuggestion {
                start: s.fix.range.start,
                end: s.fix.range.end,
                replacement: s.fix.text.clone(),
                safety: s.safety,
            }),
        }
    }
}

/// Handle --fix mode: apply rewrites to files.
fn fix_command(args: LintArgs) -> anyhow::Result<ExitCode> {
    if args.paths.is_empty() {
        return Err(FixerError::StdinNotSupported.into());
    }

    let start_dir = infer_start_dir(&args)?;
    let cfg = load_config(args.config.as_deref(), &start_dir)?;
    let engine = LintEngine::from_config(&cfg, &args.only, &args.skip)?;
    let max_safety = if args.unsafe_fixes {
        Safety::Unsafe
    } else {
        cfg.fix.max_safety
    };

    let files = collect_source_files(&args.paths)?;
    let mut total_fixed = 0usize;
    let mut total_skipped = 0usize;
    let mut files_modified = 0usize;

    for path in &files {
        let original_source = std::fs::read_to_string(path)?;
        let mut current_source = original_source.clone();
        let mut file_fixes = 0usize;
        let mut iterations = 0usize;

        // Each pass applies outermost rewrites; nested calls surface on the next.
        loop {
            iterations += 1;
            if iterations > MAX_ITERATIONS {
                eprintln!(
                    "Warning: Max fix iterations ({}) reached for {}",
                    MAX_ITERATIONS,
                    path.display()
                );
                break;
            }

            let diagnostics = engine.lint_source(&current_source);
            let result = fixer::apply_suggestions(&current_source, &diagnostics, max_safety)?;

            if result.fixes_applied == 0 {
                total_skipped += result.fixes_skipped;
                break;
            }

            file_fixes += result.fixes_applied;
            current_source = result.fixed_source;
        }

        if file_fixes == 0 {
            continue;
        }
        if args.fix_dry_run {
            let diff = fixer::format_diff(&original_source, &current_source, path);
            if !diff.is_empty() {
                println!("{diff}");
            }
        } else {
            fixer::write_fixed(path, &original_source, &current_source, !args.no_backup)?;
            files_modified += 1;
        }
        total_fixed += file_fixes;
    }

    // Print summary
    if args.fix_dry_run {
        println!(
            "\n{} fix(es) would be applied to {} file(s)",
            total_fixed,
            files.len()
        );
    } else {
        println!(
            "Applied {} fix(es) to {} file(s)",
            total_fixed, files_modified
        );
    }
    if total_skipped > 0 {
        println!(
            "{} fix(es) skipped (use --unsafe-fixes to apply)",
            total_skipped
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(explicit: Option<&Path>, start_dir: &Path) -> anyhow::Result<NativeLintConfig> {
    Ok(config::load_config(explicit, start_dir)?
        .map(|(_path, cfg)| cfg)
        .unwrap_or_default())
}

fn github_escape(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn collect_source_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for path in paths {
        let meta = std::fs::metadata(path)?;
        if !meta.is_dir() {
            out.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && should_skip_dir(e.path())))
        {
            let entry = entry?;
            if entry.file_type().is_file() && is_source_file(entry.path()) {
                out.push(entry.into_path());
            }
        }
    }

    out.sort();
    out.dedup();
    Ok(out)
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
        && !path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".d.ts"))
}

fn should_skip_dir(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };

    matches!(name, "node_modules" | "dist" | "build" | ".git" | "coverage")
}

fn infer_start_dir(args: &LintArgs) -> anyhow::Result<PathBuf> {
    let base = match args.paths.first() {
        Some(p) => p.clone(),
        None => std::env::current_dir()?,
    };

    let base = if base.is_file() {
        base.parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        base
    };

    Ok(base)
}
