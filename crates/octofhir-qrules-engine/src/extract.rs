//! Extraction of rule metadata from a document
//!
//! Variable entries and the targeted final-expression entry are consumed
//! (removed from the document) as they are extracted; everything else stays
//! in place, in order.

use octofhir_qrules_expr::{Variable, classify_fhirpath, classify_query};
use octofhir_qrules_model::{EntryKind, Extension, Item, Questionnaire, urls};

use crate::UneditableVariable;

/// Result of [`extract_variables`]
#[derive(Debug)]
pub struct ExtractedVariables {
    /// Classified variables, in document order, carrying their original
    /// positions
    pub variables: Vec<Variable>,
    /// Original positions of the entries left on the document root, used to
    /// re-interleave the variables on export
    pub retained_indices: Vec<usize>,
}

/// Pull all variable entries off the document root, classifying each one.
/// Entries with the variable URL but an unrecognized language or a missing
/// name/expression are treated as opaque and left in place.
pub fn extract_variables<F>(questionnaire: &mut Questionnaire, unit_for_question: F) -> ExtractedVariables
where
    F: Fn(&str) -> Option<String>,
{
    let Some(entries) = questionnaire.extension.take() else {
        return ExtractedVariables {
            variables: Vec::new(),
            retained_indices: Vec::new(),
        };
    };

    let mut variables = Vec::new();
    let mut retained = Vec::new();
    let mut retained_indices = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        match classify_entry(&entry, index, &unit_for_question) {
            Some(variable) => variables.push(variable),
            None => {
                retained_indices.push(index);
                retained.push(entry);
            }
        }
    }

    questionnaire.extension = Some(retained);

    ExtractedVariables {
        variables,
        retained_indices,
    }
}

fn classify_entry<F>(entry: &Extension, index: usize, unit_for_question: &F) -> Option<Variable>
where
    F: Fn(&str) -> Option<String>,
{
    let EntryKind::Variable(value) = entry.kind() else {
        return None;
    };
    let name = value.name.as_deref()?;
    let expression = value.expression.as_deref()?;

    match value.language.as_deref() {
        Some(urls::LANGUAGE_FHIRPATH) => Some(classify_fhirpath(
            name,
            expression,
            Some(index),
            entry.simple_syntax(),
            unit_for_question,
        )),
        Some(urls::LANGUAGE_FHIR_QUERY) => Some(classify_query(name, expression, Some(index))),
        _ => None,
    }
}

/// Collect the launch-context variables declared on the document root.
/// These are supplied by the rendering environment and not editable.
pub fn extract_uneditable_variables(questionnaire: &Questionnaire) -> Vec<UneditableVariable> {
    questionnaire
        .extension
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(Extension::as_launch_context)
        .collect()
}

/// Find and remove the final-expression entry: at the item whose `linkId`
/// matches, the first extension with the given URL, FHIRPath language, and
/// a non-empty expression.
///
/// The walk is intentionally non-exhaustive, matching the documents this
/// editor has always produced: when an item with children is reached, the
/// search descends into that subtree and returns its result without ever
/// visiting the remaining siblings. A target that is not on the first
/// spine of items-with-children is not found.
pub fn extract_final_expression(
    items: &mut [Item],
    expression_url: &str,
    link_id: &str,
) -> Option<Extension> {
    for item in items {
        if item.link_id.as_deref() == Some(link_id)
            && let Some(entries) = item.extension.as_mut()
        {
            let position = entries.iter().position(|entry| {
                entry.url == expression_url
                    && entry.value_expression.as_ref().is_some_and(|value| {
                        value.language.as_deref() == Some(urls::LANGUAGE_FHIRPATH)
                            && value.expression.as_deref().is_some_and(|text| !text.is_empty())
                    })
            });

            if let Some(position) = position {
                return Some(entries.remove(position));
            }
        } else if let Some(children) = &mut item.item {
            return extract_final_expression(children, expression_url, link_id);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_qrules_expr::VariableKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn questionnaire(value: serde_json::Value) -> Questionnaire {
        serde_json::from_value(value).unwrap()
    }

    const CALCULATED: &str =
        "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-calculatedExpression";

    #[test]
    fn variables_are_consumed_and_everything_else_retained() {
        let mut document = questionnaire(json!({
            "resourceType": "Questionnaire",
            "extension": [
                {"url": "http://example.org/opaque", "valueString": "keep me"},
                {
                    "url": "http://hl7.org/fhir/StructureDefinition/variable",
                    "valueExpression": {"name": "a", "language": "text/fhirpath", "expression": "1 + 1"}
                },
                {
                    "url": "http://hl7.org/fhir/StructureDefinition/variable",
                    "valueExpression": {
                        "name": "q",
                        "language": "application/x-fhir-query",
                        "expression": "Patient?_id=1"
                    }
                }
            ],
            "item": [{"linkId": "1"}]
        }));

        let extracted = extract_variables(&mut document, |_| None);

        assert_eq!(extracted.variables.len(), 2);
        assert_eq!(extracted.variables[0].original_index, Some(1));
        assert_eq!(extracted.variables[0].kind, VariableKind::Expression);
        assert_eq!(extracted.variables[1].original_index, Some(2));
        assert_eq!(extracted.variables[1].kind, VariableKind::Query);
        assert_eq!(extracted.retained_indices, vec![0]);
        assert_eq!(document.extension.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn unrecognized_language_passes_through() {
        let mut document = questionnaire(json!({
            "resourceType": "Questionnaire",
            "extension": [{
                "url": "http://hl7.org/fhir/StructureDefinition/variable",
                "valueExpression": {"name": "c", "language": "text/cql", "expression": "1"}
            }],
            "item": [{"linkId": "1"}]
        }));

        let extracted = extract_variables(&mut document, |_| None);

        assert!(extracted.variables.is_empty());
        assert_eq!(document.extension.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn final_expression_is_removed_from_the_target_item() {
        let mut document = questionnaire(json!({
            "resourceType": "Questionnaire",
            "item": [{
                "linkId": "total",
                "extension": [
                    {"url": CALCULATED, "valueExpression": {"language": "application/x-fhir-query", "expression": "x"}},
                    {"url": CALCULATED, "valueExpression": {"language": "text/fhirpath", "expression": "%a + %b"}}
                ]
            }]
        }));

        let entry =
            extract_final_expression(document.item.as_mut().unwrap(), CALCULATED, "total").unwrap();

        assert_eq!(
            entry.value_expression.unwrap().expression.as_deref(),
            Some("%a + %b")
        );
        // the query-language entry with the same URL stays behind
        assert_eq!(
            document.item.as_ref().unwrap()[0].extension.as_ref().unwrap().len(),
            1
        );
    }

    #[test]
    fn empty_expressions_are_not_extracted() {
        let mut document = questionnaire(json!({
            "resourceType": "Questionnaire",
            "item": [{
                "linkId": "total",
                "extension": [{"url": CALCULATED, "valueExpression": {"language": "text/fhirpath", "expression": ""}}]
            }]
        }));

        assert!(
            extract_final_expression(document.item.as_mut().unwrap(), CALCULATED, "total").is_none()
        );
    }

    #[test]
    fn search_descends_the_first_subtree_and_skips_later_siblings() {
        // The target sits on a sibling after an item with children; the walk
        // descends into the first subtree and never reaches it.
        let mut document = questionnaire(json!({
            "resourceType": "Questionnaire",
            "item": [
                {"linkId": "group", "item": [{"linkId": "inner"}]},
                {
                    "linkId": "total",
                    "extension": [{"url": CALCULATED, "valueExpression": {"language": "text/fhirpath", "expression": "1"}}]
                }
            ]
        }));

        assert!(
            extract_final_expression(document.item.as_mut().unwrap(), CALCULATED, "total").is_none()
        );

        // With the target inside the first subtree it is found.
        let mut document = questionnaire(json!({
            "resourceType": "Questionnaire",
            "item": [{
                "linkId": "group",
                "item": [{
                    "linkId": "total",
                    "extension": [{"url": CALCULATED, "valueExpression": {"language": "text/fhirpath", "expression": "1"}}]
                }]
            }]
        }));

        assert!(
            extract_final_expression(document.item.as_mut().unwrap(), CALCULATED, "total").is_some()
        );
    }

    #[test]
    fn launch_contexts_become_uneditable_variables() {
        let document = questionnaire(json!({
            "resourceType": "Questionnaire",
            "extension": [{
                "url": "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-launchContext",
                "extension": [
                    {"url": "name", "valueId": "patient"},
                    {"url": "type", "valueCode": "Patient"}
                ]
            }],
            "item": [{"linkId": "1"}]
        }));

        let uneditable = extract_uneditable_variables(&document);
        assert_eq!(uneditable.len(), 1);
        assert_eq!(uneditable[0].name, "patient");
        assert_eq!(uneditable[0].type_codes, "Patient");
    }
}
