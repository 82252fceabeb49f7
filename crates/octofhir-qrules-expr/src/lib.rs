//! Expression classification and synthesis
//!
//! This crate provides:
//! - The editor-facing variable model
//! - Classification of expression strings against the fixed set of
//!   structural templates (question reference, time-windowed observation
//!   query, tagged simple form, opaque fallback)
//! - The inverse template builders used on export and by the total-score
//!   feature
//! - The static unit conversion table
//! - The short variable-name allocator
//!
//! Anything that does not match a template is treated as an opaque
//! expression string; this is not a FHIRPath parser.

pub mod classify;
pub mod labels;
pub mod synthesis;
pub mod units;
pub mod variable;

pub use classify::*;
pub use labels::next_label;
pub use synthesis::*;
pub use variable::*;
