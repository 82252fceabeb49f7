//! FHIR Questionnaire wire model
//!
//! This crate provides:
//! - A lossless serde model for the Questionnaire subset the rule engine
//!   traverses (unknown keys and unrecognized extensions pass through)
//! - Extension entry classification (variable / launch context / other)
//! - Depth-first tree navigation keyed by `linkId`
//! - The extension URL and expression language constants

pub mod extension;
pub mod navigator;
pub mod questionnaire;
pub mod urls;

pub use extension::*;
pub use navigator::*;
pub use questionnaire::*;
