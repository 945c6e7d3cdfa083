use std::ops::Range;

use serde::Serialize;

use crate::fix::FixResult;
use crate::level::LintLevel;
use crate::lint::LintDescriptor;
use crate::mapping::Safety;

/// A single lodash usage that has a native replacement.
#[derive(Debug, Clone)]
#[must_use]
pub struct Diagnostic {
    pub lint: &'static LintDescriptor,
    pub level: LintLevel,
    pub file: Option<String>,
    /// Lodash function name (`map`, not `_.map`).
    pub function: String,
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
    pub suggestion: Option<Suggestion>,
}

/// Machine-applicable rewrite for a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub message: String,
    pub fix: FixResult,
    pub safety: Safety,
}

/// Span in a source file (1-based row/column positions, columns in chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    fn at(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Self {
            row: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl Span {
    /// Construct a `Span` from a byte range of `source`, converting to 1-based positions.
    #[must_use]
    pub fn from_byte_range(source: &str, range: Range<usize>) -> Self {
        Self {
            start: Position::at(source, range.start),
            end: Position::at(source, range.end),
        }
    }
}
