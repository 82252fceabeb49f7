//! Total-score synthesis
//!
//! Generates one variable per scored sibling question, a guard variable
//! checking whether anything was answered, and a calculated expression
//! summing the scores; all tagged with marker extensions so they can be
//! detected and removed later.

use octofhir_qrules_expr::{labels, synthesis};
use octofhir_qrules_model::{
    Extension, ExpressionValue, Item, Questionnaire, navigator, urls,
};

/// Description attached to the generated calculated expression
const TOTAL_SCORE_DESCRIPTION: &str = "Total score calculation";

/// Count the top-level items with a scored answer, excluding one
/// identifier. Only the immediate item array is scanned, not the full tree.
pub fn score_item_count(questionnaire: &Questionnaire, exclude_link_id: &str) -> usize {
    questionnaire
        .items()
        .iter()
        .filter(|item| item.link_id.as_deref() != Some(exclude_link_id) && item.has_score())
        .count()
}

/// Attach a generated total-score rule at `link_id`: per-question score
/// variables, the `any_questions_answered` guard, and the calculated sum.
///
/// Labels are allocated against the batch only, so they can collide with
/// names already used elsewhere in the document; a known gap.
pub fn add_total_score_rule(questionnaire: &mut Questionnaire, link_id: &str) {
    let score_link_ids: Vec<String> = questionnaire
        .items()
        .iter()
        .filter(|item| item.link_id.as_deref() != Some(link_id) && item.has_score())
        .filter_map(|item| item.link_id.clone())
        .collect();

    let mut names: Vec<String> = Vec::new();
    for _ in &score_link_ids {
        names.push(labels::next_label(&names));
    }

    let mut entries: Vec<Extension> = score_link_ids
        .iter()
        .zip(&names)
        .map(|(question_id, name)| {
            score_entry(
                urls::VARIABLE,
                urls::SCORE_VARIABLE,
                ExpressionValue {
                    name: Some(name.clone()),
                    language: Some(urls::LANGUAGE_FHIRPATH.to_string()),
                    expression: Some(synthesis::score_variable_expression(question_id)),
                    ..ExpressionValue::default()
                },
            )
        })
        .collect();

    entries.push(score_entry(
        urls::VARIABLE,
        urls::SCORE_VARIABLE,
        ExpressionValue {
            name: Some(synthesis::ANY_ANSWERED_NAME.to_string()),
            language: Some(urls::LANGUAGE_FHIRPATH.to_string()),
            expression: Some(synthesis::any_answered_expression(&names)),
            ..ExpressionValue::default()
        },
    ));

    entries.push(score_entry(
        urls::CALCULATED_EXPRESSION,
        urls::SCORE_EXPRESSION,
        ExpressionValue {
            description: Some(TOTAL_SCORE_DESCRIPTION.to_string()),
            language: Some(urls::LANGUAGE_FHIRPATH.to_string()),
            expression: Some(synthesis::total_score_expression(&names)),
            ..ExpressionValue::default()
        },
    ));

    if let Some(items) = questionnaire.item.as_mut() {
        if !navigator::insert_extensions(items, link_id, entries) {
            log::debug!("no item {link_id} found, total-score rule not attached");
        }
    }
}

fn score_entry(url: &str, marker: &str, mut value: ExpressionValue) -> Extension {
    value.extension = Some(vec![Extension::new(marker)]);
    Extension {
        url: url.to_string(),
        value_expression: Some(value),
        ..Extension::default()
    }
}

/// True when the item at `link_id` (searched recursively) carries an entry
/// generated by the total-score feature.
pub fn is_score_calculation(questionnaire: &Questionnaire, link_id: &str) -> bool {
    fn check(items: &[Item], link_id: &str) -> bool {
        items.iter().any(|item| {
            if item.link_id.as_deref() == Some(link_id)
                && item
                    .extension
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .any(is_score_extension)
            {
                return true;
            }

            item.item
                .as_deref()
                .is_some_and(|children| check(children, link_id))
        })
    }

    check(questionnaire.items(), link_id)
}

/// Strip every entry carrying a generated-score marker, from all items or
/// only from items matching `link_id`. Children are always visited.
pub fn remove_sum_of_scores(questionnaire: &mut Questionnaire, link_id: Option<&str>) {
    fn strip(items: &mut [Item], link_id: Option<&str>) {
        for item in items {
            if link_id.is_none() || link_id == item.link_id.as_deref() {
                if let Some(entries) = item.extension.as_mut() {
                    entries.retain(|entry| !is_score_extension(entry));
                }
            }

            if let Some(children) = item.item.as_mut() {
                strip(children, link_id);
            }
        }
    }

    if let Some(items) = questionnaire.item.as_mut() {
        strip(items, link_id);
    }
}

/// Replace the generated rule at `link_id` with a freshly synthesized one.
/// Not transactional: the removal is not rolled back if insertion finds no
/// matching item.
pub fn update_score_calculation(questionnaire: &mut Questionnaire, link_id: &str) {
    remove_sum_of_scores(questionnaire, Some(link_id));
    add_total_score_rule(questionnaire, link_id);
}

/// An entry generated by the total-score feature carries a marker in its
/// expression's nested extension list
fn is_score_extension(entry: &Extension) -> bool {
    entry
        .value_expression
        .as_ref()
        .and_then(|value| value.extension.as_deref())
        .unwrap_or_default()
        .iter()
        .any(|marker| marker.url == urls::SCORE_VARIABLE || marker.url == urls::SCORE_EXPRESSION)
}
