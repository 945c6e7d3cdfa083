use crate::args::split_args;
use crate::classify::{CaseTransform, Idiom};

use super::FixRequest;
use super::util::{is_stable, receiver};

/// First-letter case transforms. The string is read twice, so it must be
/// a stable expression. `at(0)` is `undefined` for an empty string.
pub(super) fn build_case(req: &FixRequest<'_>) -> Option<String> {
    let Some(Idiom::Case(transform)) = req.idiom() else {
        return None;
    };
    let [string] = split_args(req.arguments())[..] else {
        return None;
    };
    if !is_stable(string) {
        return None;
    }
    let s = receiver(string);
    Some(match transform {
        CaseTransform::Capitalize => {
            format!("{s}.at(0).toUpperCase() + {s}.slice(1).toLowerCase()")
        }
        CaseTransform::UpperFirst => format!("{s}.at(0).toUpperCase() + {s}.slice(1)"),
        CaseTransform::LowerFirst => format!("{s}.at(0).toLowerCase() + {s}.slice(1)"),
    })
}
