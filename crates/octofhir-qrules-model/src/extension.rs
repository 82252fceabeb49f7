//! Extension entries and their classification
//!
//! Entries are kept in wire form so unrecognized ones pass through the
//! engine untouched and in relative order. Classification into the kinds
//! the engine interprets happens on demand through [`Extension::kind`].

use crate::urls;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A FHIR extension entry, tagged by URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_expression: Option<ExpressionValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_decimal: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_coding: Option<crate::questionnaire::Coding>,
    /// Nested extensions (launch-context sub-entries, simple-syntax companions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `valueExpression` payload of a variable or final-expression entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Nested markers (score-variable / score-expression tags)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Classification of an entry into the kinds the engine interprets
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind<'a> {
    /// A named variable entry with an expression payload
    Variable(&'a ExpressionValue),
    /// An externally supplied launch-context variable
    LaunchContext(LaunchContext),
    /// Anything else; preserved opaquely
    Other,
}

/// Flattened view of a launch-context entry
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchContext {
    pub name: String,
    /// All `type` sub-entry codes joined with `|`
    pub type_codes: String,
    pub description: Option<String>,
}

impl Extension {
    /// Create an entry with only a URL set
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Classify this entry. Entries that carry a recognized URL but not the
    /// expected shape (a launch context without a `name` sub-entry, a
    /// variable without a `valueExpression`) classify as [`EntryKind::Other`]
    /// and pass through untouched.
    pub fn kind(&self) -> EntryKind<'_> {
        if self.url == urls::VARIABLE {
            if let Some(value) = &self.value_expression {
                return EntryKind::Variable(value);
            }
        } else if self.url == urls::LAUNCH_CONTEXT {
            if let Some(context) = self.as_launch_context() {
                return EntryKind::LaunchContext(context);
            }
        }

        EntryKind::Other
    }

    /// Flatten a launch-context entry, `None` when the `name` sub-entry is
    /// missing
    pub fn as_launch_context(&self) -> Option<LaunchContext> {
        let nested = self.extension.as_deref()?;
        let name = nested
            .iter()
            .find(|entry| entry.url == "name")
            .and_then(|entry| entry.value_id.clone())?;
        let type_codes = nested
            .iter()
            .filter(|entry| entry.url == "type")
            .filter_map(|entry| entry.value_code.as_deref())
            .collect::<Vec<_>>()
            .join("|");
        let description = nested
            .iter()
            .find(|entry| entry.url == "description")
            .and_then(|entry| entry.value_string.clone());

        Some(LaunchContext {
            name,
            type_codes,
            description,
        })
    }

    /// The simple-syntax companion text, if this entry carries one in its
    /// nested extension list
    pub fn simple_syntax(&self) -> Option<&str> {
        self.extension
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|entry| entry.url == urls::SIMPLE_SYNTAX)
            .and_then(|entry| entry.value_string.as_deref())
    }

    /// Build a launch-context entry from its parts
    pub fn launch_context(name: &str, type_code: &str, description: &str) -> Self {
        Self {
            url: urls::LAUNCH_CONTEXT.to_string(),
            extension: Some(vec![
                Self {
                    url: "name".to_string(),
                    value_id: Some(name.to_string()),
                    ..Self::default()
                },
                Self {
                    url: "type".to_string(),
                    value_code: Some(type_code.to_string()),
                    ..Self::default()
                },
                Self {
                    url: "description".to_string(),
                    value_string: Some(description.to_string()),
                    ..Self::default()
                },
            ]),
            ..Self::default()
        }
    }

    /// Build a simple-syntax companion entry
    pub fn simple_syntax_companion(text: &str) -> Self {
        Self {
            url: urls::SIMPLE_SYNTAX.to_string(),
            value_string: Some(text.to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> Extension {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn classifies_variable_entries() {
        let extension = entry(json!({
            "url": "http://hl7.org/fhir/StructureDefinition/variable",
            "valueExpression": {"name": "a", "language": "text/fhirpath", "expression": "1"}
        }));
        assert!(matches!(extension.kind(), EntryKind::Variable(_)));
    }

    #[test]
    fn variable_url_without_payload_is_other() {
        let extension = entry(json!({
            "url": "http://hl7.org/fhir/StructureDefinition/variable",
            "valueString": "not an expression"
        }));
        assert_eq!(extension.kind(), EntryKind::Other);
    }

    #[test]
    fn launch_context_joins_type_codes() {
        let extension = entry(json!({
            "url": "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-launchContext",
            "extension": [
                {"url": "name", "valueId": "patient"},
                {"url": "type", "valueCode": "Patient"},
                {"url": "type", "valueCode": "Person"},
                {"url": "description", "valueString": "the subject"}
            ]
        }));

        let EntryKind::LaunchContext(context) = extension.kind() else {
            panic!("expected a launch context");
        };
        assert_eq!(context.name, "patient");
        assert_eq!(context.type_codes, "Patient|Person");
        assert_eq!(context.description.as_deref(), Some("the subject"));
    }

    #[test]
    fn launch_context_without_name_is_other() {
        let extension = entry(json!({
            "url": "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-launchContext",
            "extension": [{"url": "type", "valueCode": "Patient"}]
        }));
        assert_eq!(extension.kind(), EntryKind::Other);
    }

    #[test]
    fn simple_syntax_companion_lookup() {
        let extension = entry(json!({
            "url": "http://hl7.org/fhir/StructureDefinition/variable",
            "valueExpression": {"name": "a", "language": "text/fhirpath", "expression": "1 + 1"},
            "extension": [{
                "url": "http://lhcforms.nlm.nih.gov/fhir/ext/simple-syntax",
                "valueString": "1 + 1"
            }]
        }));
        assert_eq!(extension.simple_syntax(), Some("1 + 1"));
    }
}
