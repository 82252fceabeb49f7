//! Expression classification against the recognized structural templates
//!
//! Templates are attempted in a fixed priority order and the first match
//! wins. The recognizer is one-way; serialization back to extension entries
//! is the engine's concern.

use crate::units;
use crate::variable::{Variable, VariableKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Reference to the answer of a question, optionally multiplied by a factor
static QUESTION_TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^%resource\.item\.where\(linkId='(.*)'\)\.answer\.value(?:\*(\d*\.?\d*))?$")
        .expect("question template must compile")
});

/// Observation query filtered by code set, windowed to the last N units,
/// for the current patient, newest first, single result
static OBSERVATION_QUERY_TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Observation\?code=(.+)&date=gt\{\{today\(\)-(\d+) (.+)\}\}&patient=\{\{%patient\.id\}\}&_sort=-date&_count=1$",
    )
    .expect("observation query template must compile")
});

/// URL-encoded comma separating codes in the query template
const ENCODED_COMMA: &str = "%2C";

/// Classify a FHIRPath variable expression.
///
/// `simple` is the text of a simple-syntax companion when the entry carries
/// one. `unit_for_question` resolves a question `linkId` to its declared
/// unit and is only consulted when the question template matches with a
/// factor.
///
/// When a factor is present but the source unit or factor is untabulated,
/// the variable is still a Question, just without a resolved unit. That
/// silent degradation matches the documents already in circulation.
pub fn classify_fhirpath<F>(
    name: &str,
    expression: &str,
    index: Option<usize>,
    simple: Option<&str>,
    unit_for_question: F,
) -> Variable
where
    F: FnOnce(&str) -> Option<String>,
{
    if let Some(captures) = QUESTION_TEMPLATE.captures(expression) {
        let link_id = captures[1].to_string();
        let factor = captures
            .get(2)
            .map(|m| m.as_str())
            .filter(|factor| !factor.is_empty());

        let mut unit = None;
        if let Some(factor) = factor {
            unit = unit_for_question(&link_id)
                .and_then(|source| units::destination_for_factor(&source, factor))
                .map(String::from);
            if unit.is_none() {
                log::debug!(
                    "no tabulated conversion for factor {factor} on question {link_id}; \
                     leaving the unit unresolved"
                );
            }
        }

        return Variable::at_index(index, name, expression, VariableKind::Question { link_id, unit });
    }

    if let Some(simple) = simple {
        return Variable::at_index(
            index,
            name,
            expression,
            VariableKind::Simple {
                simple: simple.to_string(),
            },
        );
    }

    Variable::at_index(index, name, expression, VariableKind::Expression)
}

/// Classify an x-fhir-query variable expression.
pub fn classify_query(name: &str, expression: &str, index: Option<usize>) -> Variable {
    if let Some(captures) = OBSERVATION_QUERY_TEMPLATE.captures(expression) {
        if let Ok(time_interval) = captures[2].parse::<u32>() {
            let codes = captures[1]
                .split(ENCODED_COMMA)
                .map(String::from)
                .collect();

            return Variable::at_index(
                index,
                name,
                expression,
                VariableKind::QueryObservation {
                    codes,
                    time_interval,
                    time_interval_unit: captures[3].to_string(),
                },
            );
        }
    }

    Variable::at_index(index, name, expression, VariableKind::Query)
}
