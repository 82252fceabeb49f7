//! Seam for the external simple-syntax ⇄ FHIRPath translator
//!
//! The engine never interprets simple-syntax text itself; it hands the text
//! and the names currently in scope to an implementation of this trait and
//! commits the result only on success.

use thiserror::Error;

/// Translates simple-syntax text into a FHIRPath expression
pub trait SimpleSyntaxTranslator {
    /// Translate `simple` given the variable names currently in scope.
    /// Implementations fail on malformed input.
    fn translate(&self, simple: &str, known_variables: &[String]) -> Result<String, TranslationError>;
}

/// Failure reported by the translator
#[derive(Debug, Clone, Error)]
#[error("cannot translate simple syntax: {message}")]
pub struct TranslationError {
    pub message: String,
}

impl TranslationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
