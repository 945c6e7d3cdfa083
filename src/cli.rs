use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// lodash-native CLI options.
#[derive(Debug, Parser)]
#[command(
    name = "lodash-native",
    version,
    about = "Find lodash calls with native JavaScript equivalents and rewrite them",
    args_conflicts_with_subcommands = true,
    subcommand_precedence_over_arg = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub lint: LintArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lint files or directories.
    Lint(LintArgs),

    /// List lodash functions with a native replacement.
    ListFunctions {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Explain the native replacement for a lodash function.
    Explain {
        /// Lodash function name (e.g. `groupBy`).
        function: String,

        /// Config file (defaults to discovering lodash-native.toml).
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the native replacement for a single call expression.
    Rewrite(RewriteArgs),
}

#[derive(Debug, Clone, ClapArgs)]
pub struct LintArgs {
    /// Files/directories to lint. Defaults to stdin when absent.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Only run these lints (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these lints (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Exit with code 1 if any diagnostics are emitted.
    #[arg(long)]
    pub deny_warnings: bool,

    /// Config file (defaults to discovering lodash-native.toml).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Apply rewrites in place.
    #[arg(long)]
    pub fix: bool,

    /// Print the rewrites as a diff instead of writing files.
    #[arg(long, requires = "fix")]
    pub fix_dry_run: bool,

    /// Also apply `caution` and `unsafe` rewrites.
    #[arg(long)]
    pub unsafe_fixes: bool,

    /// Do not keep `<file>.bak` copies when fixing.
    #[arg(long)]
    pub no_backup: bool,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct RewriteArgs {
    /// Call expression, e.g. `_.groupBy(items, 'category')`.
    #[arg(value_name = "CALL")]
    pub call: String,

    /// Lodash function name; inferred from the callee when absent.
    #[arg(long)]
    pub function: Option<String>,

    /// Native template; looked up in the function table when absent.
    #[arg(long)]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Github,
}
