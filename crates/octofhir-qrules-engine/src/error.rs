//! Engine errors
//!
//! Most degraded inputs are handled permissively (malformed documents make
//! `import` a no-op, unresolved units drop to "no unit", label exhaustion
//! yields the empty-string sentinel); only operations with nothing sensible
//! to return surface an error.

use crate::translator::TranslationError;
use thiserror::Error;

/// Result type for session operations
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors surfaced by the rule session
#[derive(Debug, Error)]
pub enum RuleError {
    /// Export was called before a document was successfully imported
    #[error("no questionnaire loaded")]
    NothingLoaded,

    /// The external simple-syntax translator rejected the input; session
    /// state is unchanged
    #[error(transparent)]
    Translation(#[from] TranslationError),
}
