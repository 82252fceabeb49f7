//! Editor-facing variable model

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named sub-expression extracted from a variable entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Position in the source extension list at import time. Bookkeeping
    /// only: used to restore document order on export, never shown to the
    /// user, stripped from anything serialized.
    #[serde(skip)]
    pub original_index: Option<usize>,
    /// Short human-readable name
    pub label: String,
    /// The expression text, kept verbatim
    pub expression: String,
    /// Structural classification with its extracted parameters
    #[serde(flatten)]
    pub kind: VariableKind,
}

impl Variable {
    /// Create a variable without an original position (added this session;
    /// appended after all positioned entries on export)
    pub fn new(label: impl Into<String>, expression: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            original_index: None,
            label: label.into(),
            expression: expression.into(),
            kind,
        }
    }

    /// Same, carrying the source position
    pub fn at_index(
        index: Option<usize>,
        label: impl Into<String>,
        expression: impl Into<String>,
        kind: VariableKind,
    ) -> Self {
        Self {
            original_index: index,
            label: label.into(),
            expression: expression.into(),
            kind,
        }
    }
}

/// Structural classification of a variable expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VariableKind {
    /// Reference to the answer of a question, optionally unit-converted
    #[serde(rename_all = "camelCase")]
    Question {
        link_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// Opaque FHIRPath expression
    Expression,
    /// FHIRPath expression carrying a simple-syntax companion
    Simple { simple: String },
    /// Opaque x-fhir-query expression
    Query,
    /// Time-windowed observation query for the current patient
    #[serde(rename_all = "camelCase")]
    QueryObservation {
        codes: Vec<String>,
        time_interval: u32,
        time_interval_unit: String,
    },
}

impl VariableKind {
    /// Kinds that can only be edited through the advanced interface
    pub fn is_advanced(&self) -> bool {
        matches!(self, VariableKind::Expression | VariableKind::Query)
    }

    /// Kinds expressed in the templated query language rather than FHIRPath
    pub fn is_query_language(&self) -> bool {
        matches!(self, VariableKind::Query | VariableKind::QueryObservation { .. })
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariableKind::Question { .. } => "Question",
            VariableKind::Expression => "FHIRPath Expression",
            VariableKind::Simple { .. } => "Easy Path Expression",
            VariableKind::Query => "FHIR Query",
            VariableKind::QueryObservation { .. } => "FHIR Query (Observation)",
        };
        write!(f, "{name}")
    }
}

/// A row of the question registry built on import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub link_id: String,
    /// Question text, truncated for display
    pub text: String,
    /// Declared UCUM unit, when the item carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}
