//! Replacement model and pure edit application.
//!
//! A [`FixResult`] replaces a byte range of the original source with new
//! text. Everything here works on strings and byte offsets; file I/O lives in
//! the fixer.
//!
//! ## Guarantees
//!
//! - Fixes are validated to be in bounds, on char boundaries, and
//!   non-overlapping before anything is applied
//! - Fixes are applied in descending start order so earlier offsets stay valid

use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixError {
    #[error("overlapping fixes at byte {0}")]
    OverlappingEdits(usize),

    #[error("fix range [{start}..{end}) exceeds source length {source_len}")]
    InvalidRange {
        start: usize,
        end: usize,
        source_len: usize,
    },

    #[error("fix start {start} is after fix end {end}")]
    InvertedRange { start: usize, end: usize },

    #[error("fix boundary {0} is not on a char boundary")]
    NotCharBoundary(usize),
}

/// Replace `range` of the original source with `text`.
///
/// `range.start` may precede the call itself when a leading `!` was folded
/// into the replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixResult {
    pub range: Range<usize>,
    pub text: String,
}

impl FixResult {
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn overlaps_with(&self, other: &FixResult) -> bool {
        self.range.start < other.range.end && other.range.start < self.range.end
    }

    /// Whether `other` lies entirely inside this fix's range.
    pub fn contains(&self, other: &FixResult) -> bool {
        self.range.start <= other.range.start && other.range.end <= self.range.end
    }

    pub fn validate(&self, source: &str) -> Result<(), FixError> {
        let Range { start, end } = self.range;
        if start > end {
            return Err(FixError::InvertedRange { start, end });
        }
        if end > source.len() {
            return Err(FixError::InvalidRange {
                start,
                end,
                source_len: source.len(),
            });
        }
        for boundary in [start, end] {
            if !source.is_char_boundary(boundary) {
                return Err(FixError::NotCharBoundary(boundary));
            }
        }
        Ok(())
    }

    /// Apply this single fix to `source`.
    pub fn apply_to(&self, source: &str) -> Result<String, FixError> {
        apply_fixes(source, std::slice::from_ref(self))
    }
}

/// Validate that `fixes` are individually valid and pairwise disjoint.
pub fn validate_fixes(fixes: &[FixResult], source: &str) -> Result<(), FixError> {
    for fix in fixes {
        fix.validate(source)?;
    }

    let mut sorted: Vec<&FixResult> = fixes.iter().collect();
    sorted.sort_by_key(|fix| (fix.range.start, fix.range.end));
    for pair in sorted.windows(2) {
        if pair[0].overlaps_with(pair[1]) {
            return Err(FixError::OverlappingEdits(pair[1].range.start));
        }
    }
    Ok(())
}

/// Apply non-overlapping fixes to `source`.
///
/// # Example
///
/// ```rust
/// use lodash_native::fix::{FixResult, apply_fixes};
///
/// let source = "const n = _.size(items);";
/// let fixes = vec![FixResult::new(10..23, "items.length")];
///
/// let result = apply_fixes(source, &fixes).unwrap();
/// assert_eq!(result, "const n = items.length;");
/// ```
pub fn apply_fixes(source: &str, fixes: &[FixResult]) -> Result<String, FixError> {
    if fixes.is_empty() {
        return Ok(source.to_string());
    }
    validate_fixes(fixes, source)?;

    let mut sorted = fixes.to_vec();
    sorted.sort_by(|a, b| b.range.start.cmp(&a.range.start));

    let mut result = source.to_string();
    for fix in sorted {
        result.replace_range(fix.range.clone(), &fix.text);
    }
    Ok(result)
}
