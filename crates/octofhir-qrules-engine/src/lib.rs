//! Stateful rule-editing session over FHIR Questionnaires
//!
//! This crate provides:
//! - [`RuleSession`]: import a Questionnaire, edit its variables and final
//!   expression, export a reconstructed document
//! - Extraction of variables, launch-context variables, and the final
//!   expression from a document
//! - The total-score synthesizer (generate, detect, remove, update)
//! - Synchronous change notifications
//! - The simple-syntax translator seam

pub mod error;
pub mod events;
pub mod extract;
pub mod score;
pub mod session;
pub mod translator;

pub use error::{RuleError, RuleResult};
pub use events::{ChangeEvent, SubscriptionId};
pub use session::{RuleSession, SyntaxType};
pub use translator::{SimpleSyntaxTranslator, TranslationError};

/// An externally supplied variable, shown but not editable
pub type UneditableVariable = octofhir_qrules_model::LaunchContext;
