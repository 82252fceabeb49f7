//! Template builders, the inverse of classification
//!
//! These synthesize the exact expression strings the classifier recognizes,
//! plus the generated expressions of the total-score feature.

use crate::units;
use once_cell::sync::Lazy;
use regex::Regex;

/// Name of the generated guard variable in a total-score rule
pub const ANY_ANSWERED_NAME: &str = "any_questions_answered";

/// Detects the `iif(...)` case-statement form of a final expression
static CASE_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*iif\s*\((.*)\)\s*$").expect("case template must compile"));

/// True when the expression is a top-level `iif(...)` case statement
pub fn is_case_statement(expression: &str) -> bool {
    CASE_TEMPLATE.is_match(expression)
}

/// Reference to the answer of a question, optionally multiplied by a factor
pub fn question_answer_expression(link_id: &str, factor: Option<&str>) -> String {
    let base = format!("%resource.item.where(linkId='{link_id}').answer.value");
    match factor {
        Some(factor) => format!("{base}*{factor}"),
        None => base,
    }
}

/// Observation query filtered by codes, windowed to the last
/// `interval` `unit`s, for the current patient, newest first, one result
pub fn observation_query_expression<S: AsRef<str>>(
    codes: &[S],
    interval: u32,
    unit: &str,
) -> String {
    let codes = codes
        .iter()
        .map(|code| code.as_ref())
        .collect::<Vec<_>>()
        .join("%2C");
    format!(
        "Observation?code={codes}&date=gt{{{{today()-{interval} {unit}}}}}&patient={{{{%patient.id}}}}&_sort=-date&_count=1"
    )
}

/// The ordinal value of the answer currently selected for a question
pub fn score_variable_expression(link_id: &str) -> String {
    format!(
        "%questionnaire.item.where(linkId = '{link_id}').answerOption\
         .where(valueCoding.code=%resource.item.where(linkId = '{link_id}').answer.valueCoding.code).extension\
         .where(url='http://hl7.org/fhir/StructureDefinition/ordinalValue').valueDecimal"
    )
}

/// Logical OR of "variable exists" over the generated score variables
pub fn any_answered_expression<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| format!("%{}.exists()", name.as_ref()))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Sum of the generated score variables, absent ones counted as zero
pub fn sum_expression<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            format!("iif(%{name}.exists(), %{name}, 0)")
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// The final total-score calculation: the sum when anything is answered,
/// the empty result otherwise
pub fn total_score_expression<S: AsRef<str>>(names: &[S]) -> String {
    format!(
        "iif(%{ANY_ANSWERED_NAME}, {}, {{}})",
        sum_expression(names)
    )
}

/// The expression for a question reference: its score fetch when the item
/// is scored, a unit-converted answer value when a tabulated pair is given,
/// the plain answer value otherwise (including when the pair turns out to
/// be untabulated).
pub fn value_or_score_expression(
    link_id: &str,
    has_score: bool,
    convertible: bool,
    unit: Option<&str>,
    to_unit: Option<&str>,
) -> String {
    if has_score {
        return score_variable_expression(link_id);
    }

    if convertible {
        if let (Some(unit), Some(to_unit)) = (unit, to_unit) {
            if let Some(factor) = units::factor_between(unit, to_unit) {
                return question_answer_expression(link_id, Some(factor));
            }
        }
    }

    question_answer_expression(link_id, None)
}
