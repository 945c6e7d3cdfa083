//! Auto-fix application module.
//!
//! This module picks the suggestions that may be applied at the configured
//! safety level and writes the result back to source files.

use crate::diagnostics::Diagnostic;
use crate::fix::{FixError, FixResult, apply_fixes};
use crate::mapping::Safety;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Upper bound on lint-and-fix passes over one file.
pub const MAX_ITERATIONS: usize = 10;

/// Result of one fix pass over a source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// The modified source code.
    pub fixed_source: String,
    /// Number of fixes applied.
    pub fixes_applied: usize,
    /// Suggestions above the allowed safety level.
    pub fixes_skipped: usize,
    /// Suggestions overlapping an applied fix; a later pass may apply them.
    pub fixes_deferred: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum FixerError {
    #[error("cannot apply fixes to stdin - please specify a file path")]
    StdinNotSupported,

    #[error(transparent)]
    Fix(#[from] FixError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Apply every suggestion at or below `max_safety` that does not overlap an
/// earlier-starting one.
///
/// Outer calls win over calls nested in their arguments. Builders copy
/// argument text verbatim, so the nested call survives the outer rewrite and
/// is fixed by the next pass.
pub fn apply_suggestions(
    source: &str,
    diagnostics: &[Diagnostic],
    max_safety: Safety,
) -> Result<FixOutcome, FixerError> {
    let mut candidates: Vec<&FixResult> = Vec::new();
    let mut skipped = 0;

    for diag in diagnostics {
        let Some(suggestion) = &diag.suggestion else {
            continue;
        };
        if suggestion.safety > max_safety {
            skipped += 1;
            continue;
        }
        // Replacing a span with its own text would never converge.
        if source.get(suggestion.fix.range.clone()) == Some(suggestion.fix.text.as_str()) {
            continue;
        }
        candidates.push(&suggestion.fix);
    }

    candidates.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then(b.range.end.cmp(&a.range.end))
    });

    let mut accepted: Vec<FixResult> = Vec::new();
    let mut deferred = 0;
    for fix in candidates {
        if accepted.last().is_some_and(|prev| prev.overlaps_with(fix)) {
            deferred += 1;
            continue;
        }
        accepted.push(fix.clone());
    }

    let fixed_source = apply_fixes(source, &accepted)?;
    Ok(FixOutcome {
        fixed_source,
        fixes_applied: accepted.len(),
        fixes_skipped: skipped,
        fixes_deferred: deferred,
    })
}

/// Write `fixed` to `path`, keeping the original as `<name>.<ext>.bak` when
/// `backup` is set.
pub fn write_fixed(path: &Path, original: &str, fixed: &str, backup: bool) -> Result<(), FixerError> {
    if backup {
        let backup_path = backup_path(path);
        std::fs::write(&backup_path, original).map_err(|source| FixerError::Write {
            path: backup_path,
            source,
        })?;
    }
    std::fs::write(path, fixed).map_err(|source| FixerError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn backup_path(path: &Path) -> PathBuf {
    path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ))
}

/// Generate a unified diff between original and fixed source.
///
/// Includes context lines (3 lines before and after each change) for better readability.
pub fn format_diff(original: &str, fixed: &str, path: &Path) -> String {
    format_diff_with_context(original, fixed, path, 3)
}

type LineChange<'a> = (usize, Option<&'a str>, Option<&'a str>);

/// Generate a unified diff with configurable context lines.
///
/// Lines are compared by index, which is exact for fixes that never add or
/// remove newlines outside the replaced call.
pub fn format_diff_with_context(
    original: &str,
    fixed: &str,
    path: &Path,
    context: usize,
) -> String {
    let orig_lines: Vec<&str> = original.lines().collect();
    let fixed_lines: Vec<&str> = fixed.lines().collect();
    let max_len = orig_lines.len().max(fixed_lines.len());

    let changes: Vec<LineChange<'_>> = (0..max_len)
        .filter_map(|i| {
            let orig = orig_lines.get(i).copied();
            let fix = fixed_lines.get(i).copied();
            (orig != fix).then_some((i, orig, fix))
        })
        .collect();

    if changes.is_empty() {
        return String::new();
    }

    // Group changes into hunks with context
    let mut hunks: Vec<(usize, usize, Vec<LineChange<'_>>)> = Vec::new();
    for change in changes {
        let start = change.0.saturating_sub(context);
        let end = (change.0 + context + 1).min(max_len);
        match hunks.last_mut() {
            Some((_, hunk_end, hunk_changes)) if start <= *hunk_end => {
                *hunk_end = end;
                hunk_changes.push(change);
            }
            _ => hunks.push((start, end, vec![change])),
        }
    }

    let path_str = path.display().to_string();
    let mut output = String::new();
    let _ = writeln!(output, "--- a/{path_str}");
    let _ = writeln!(output, "+++ b/{path_str}");

    for (hunk_start, hunk_end, hunk_changes) in hunks {
        let orig_size = hunk_end.min(orig_lines.len()).saturating_sub(hunk_start);
        let fixed_size = hunk_end.min(fixed_lines.len()).saturating_sub(hunk_start);
        let _ = writeln!(
            output,
            "@@ -{},{} +{},{} @@",
            hunk_start + 1,
            orig_size,
            hunk_start + 1,
            fixed_size
        );

        for line_idx in hunk_start..hunk_end {
            match hunk_changes.iter().find(|(i, _, _)| *i == line_idx) {
                Some((_, orig, fix)) => {
                    if let Some(orig) = orig {
                        let _ = writeln!(output, "-{orig}");
                    }
                    if let Some(fix) = fix {
                        let _ = writeln!(output, "+{fix}");
                    }
                }
                None => {
                    if let Some(line) = orig_lines.get(line_idx) {
                        let _ = writeln!(output, " {line}");
                    }
                }
            }
        }
    }

    output
}
