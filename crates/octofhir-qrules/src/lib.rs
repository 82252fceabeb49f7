//! Computed-value rule engine for FHIR Questionnaires
//!
//! This crate provides:
//! - Round-trip extraction of `variable` and final-expression extensions
//!   from a Questionnaire, order-preserving
//! - Classification of expression strings against the recognized
//!   structural templates (question reference, windowed observation query,
//!   simple-syntax form)
//! - Synthesis of total-score rules across scored sibling questions
//! - Faithful re-insertion of everything on export
//!
//! # Example
//!
//! ```ignore
//! use octofhir_qrules::{RuleSession, urls};
//!
//! let questionnaire = serde_json::from_str(&std::fs::read_to_string("phq9.json")?)?;
//!
//! let mut session = RuleSession::new();
//! session.import(urls::CALCULATED_EXPRESSION, questionnaire, "phq9-total");
//!
//! for variable in session.variables() {
//!     println!("{}: {}", variable.label, variable.expression);
//! }
//!
//! let exported = session.export(urls::CALCULATED_EXPRESSION, "%a + %b")?;
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_qrules_engine as engine;
pub use octofhir_qrules_expr as expr;
pub use octofhir_qrules_model as model;

// Convenience re-exports
pub use octofhir_qrules_engine::{
    ChangeEvent, RuleError, RuleResult, RuleSession, SimpleSyntaxTranslator, SyntaxType,
    TranslationError, UneditableVariable,
};
pub use octofhir_qrules_expr::{Question, Variable, VariableKind};
pub use octofhir_qrules_model::{Extension, Item, Questionnaire, urls};
