//! Extension URLs and expression language tags recognized by the engine

/// Variable extension wrapper
pub const VARIABLE: &str = "http://hl7.org/fhir/StructureDefinition/variable";

/// SDC launch context (externally supplied, uneditable variables)
pub const LAUNCH_CONTEXT: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-launchContext";

/// Marker on variables generated by the total-score feature
pub const SCORE_VARIABLE: &str =
    "http://lhcforms.nlm.nih.gov/fhir/ext/rule-editor-score-variable";

/// Marker on the calculated expression generated by the total-score feature
pub const SCORE_EXPRESSION: &str =
    "http://lhcforms.nlm.nih.gov/fhir/ext/rule-editor-expression";

/// Companion extension carrying the simple-syntax form of an expression
pub const SIMPLE_SYNTAX: &str = "http://lhcforms.nlm.nih.gov/fhir/ext/simple-syntax";

/// Ordinal value attached to answer options of scored questions
pub const ORDINAL_VALUE: &str = "http://hl7.org/fhir/StructureDefinition/ordinalValue";

/// Declared unit of a question item
pub const QUESTIONNAIRE_UNIT: &str =
    "http://hl7.org/fhir/StructureDefinition/questionnaire-unit";

/// Coding system required on a `questionnaire-unit` for it to count as a unit
pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";

/// Well-known final-expression URLs a caller may pick among. The engine is
/// agnostic to which one is used; it takes the URL per call.
pub const CALCULATED_EXPRESSION: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-calculatedExpression";
pub const ANSWER_EXPRESSION: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-answerExpression";
pub const ENABLE_WHEN_EXPRESSION: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-enableWhenExpression";
pub const INITIAL_EXPRESSION: &str =
    "http://hl7.org/fhir/uv/sdc/StructureDefinition/sdc-questionnaire-initialExpression";

/// FHIRPath expression language tag
pub const LANGUAGE_FHIRPATH: &str = "text/fhirpath";

/// Templated x-fhir-query expression language tag
pub const LANGUAGE_FHIR_QUERY: &str = "application/x-fhir-query";
