use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Result alias for errors emitted while building the function table.
pub type NativeResult<T> = Result<T, NativeLintError>;

/// Structured error type for everything outside the rewrite engine.
///
/// The engine itself never errors: a call it cannot rewrite yields `None`.
#[derive(Debug, Error)]
pub enum NativeLintError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("invalid mapping: {0}")]
    Mapping(String),
}

impl NativeLintError {
    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::Mapping(msg.into())
    }

    /// Convert to anyhow::Error for interop with anyhow-based code.
    pub fn into_anyhow(self) -> AnyhowError {
        AnyhowError::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyhow_conversion_keeps_message() {
        let err = NativeLintError::mapping("empty template for `head`").into_anyhow();
        assert_eq!(err.to_string(), "invalid mapping: empty template for `head`");

        let err = NativeLintError::UnknownFunction("notALodashFn".into()).into_anyhow();
        assert!(err.downcast_ref::<NativeLintError>().is_some());
        assert_eq!(err.to_string(), "unknown function: notALodashFn");
    }
}
