//! Questionnaire tree structs
//!
//! Only the fields the engine traverses are typed; everything else is kept
//! in a flattened map so a document round-trips without loss (modulo key
//! ordering).

use crate::extension::Extension;
use crate::urls;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A FHIR Questionnaire resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    /// Resource type, expected to be "Questionnaire"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Top-level items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<Item>>,
    /// Root-level extensions (variables, launch contexts, anything else)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
    /// Fields this engine does not interpret, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Questionnaire {
    /// True when the document has the minimal shape the engine can work with
    pub fn is_traversable(&self) -> bool {
        self.resource_type.as_deref() == Some("Questionnaire")
            && self.item.as_ref().is_some_and(|items| !items.is_empty())
    }

    /// Top-level items, empty slice when absent
    pub fn items(&self) -> &[Item] {
        self.item.as_deref().unwrap_or_default()
    }
}

/// A Questionnaire item (question, group, or display node)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable identifier, unique within the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_id: Option<String>,
    /// Question text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Child items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<Item>>,
    /// Item-level extensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
    /// Selectable answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_option: Option<Vec<AnswerOption>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// True if any answer option carries an ordinal-value extension
    pub fn has_score(&self) -> bool {
        self.answer_option
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|option| {
                option
                    .extension
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .any(|extension| extension.url == urls::ORDINAL_VALUE)
            })
    }

    /// Declared unit of the question, honored only for UCUM codings
    pub fn question_unit(&self) -> Option<&str> {
        self.extension
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|extension| {
                extension.url == urls::QUESTIONNAIRE_UNIT
                    && extension
                        .value_coding
                        .as_ref()
                        .is_some_and(|coding| coding.system.as_deref() == Some(urls::UCUM_SYSTEM))
            })
            .and_then(|extension| extension.value_coding.as_ref())
            .and_then(|coding| coding.code.as_deref())
    }
}

/// One selectable answer of a question item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_coding: Option<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A coded value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn unknown_keys_round_trip() {
        let source = json!({
            "resourceType": "Questionnaire",
            "status": "draft",
            "item": [{
                "linkId": "a",
                "type": "decimal",
                "code": [{"code": "x"}]
            }]
        });

        let parsed: Questionnaire = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), source);
    }

    #[test]
    fn absent_lists_stay_absent() {
        let parsed: Questionnaire =
            serde_json::from_value(json!({"resourceType": "Questionnaire", "item": [{"linkId": "a"}]}))
                .unwrap();
        let out = serde_json::to_value(&parsed).unwrap();
        assert!(out.get("extension").is_none());
        assert!(out["item"][0].get("extension").is_none());
    }

    #[test]
    fn score_detection_requires_ordinal_value() {
        let item: Item = serde_json::from_value(json!({
            "linkId": "q",
            "answerOption": [
                {"valueCoding": {"code": "a"}},
                {
                    "valueCoding": {"code": "b"},
                    "extension": [{
                        "url": "http://hl7.org/fhir/StructureDefinition/ordinalValue",
                        "valueDecimal": 2
                    }]
                }
            ]
        }))
        .unwrap();
        assert!(item.has_score());

        let plain: Item = serde_json::from_value(json!({
            "linkId": "q",
            "answerOption": [{"valueCoding": {"code": "a"}}]
        }))
        .unwrap();
        assert!(!plain.has_score());
    }

    #[test]
    fn question_unit_ignores_non_ucum_systems() {
        let item: Item = serde_json::from_value(json!({
            "linkId": "weight",
            "extension": [
                {
                    "url": "http://hl7.org/fhir/StructureDefinition/questionnaire-unit",
                    "valueCoding": {"system": "http://example.org/units", "code": "stone"}
                },
                {
                    "url": "http://hl7.org/fhir/StructureDefinition/questionnaire-unit",
                    "valueCoding": {"system": "http://unitsofmeasure.org", "code": "kg"}
                }
            ]
        }))
        .unwrap();
        assert_eq!(item.question_unit(), Some("kg"));
    }
}
