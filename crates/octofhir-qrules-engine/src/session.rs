//! The rule-editing session
//!
//! One session holds one current document at a time. `import` rebuilds the
//! whole in-memory model from the document; `export` reconstructs a
//! document from the current model. Operations are synchronous and run to
//! completion; concurrent imports must be serialized by the caller (last
//! write wins, no merge).

use indexmap::IndexMap;
use octofhir_qrules_expr::{Question, Variable, VariableKind, labels, synthesis};
use octofhir_qrules_model::{
    Extension, ExpressionValue, Questionnaire, navigator, urls,
};

use crate::UneditableVariable;
use crate::error::{RuleError, RuleResult};
use crate::events::{ChangeEvent, ChangeListeners, SubscriptionId};
use crate::extract;
use crate::score;
use crate::translator::SimpleSyntaxTranslator;

/// Maximum question length shown in the registry before truncating
const MAX_QUESTION_LEN: usize = 60;

/// More than this many scored questions suggests a total-score form
const SCORE_MIN_QUESTIONS: usize = 1;

/// Description of the synthesized patient launch context
const PATIENT_CONTEXT_DESCRIPTION: &str =
    "For filling in patient information as the subject for the form";

/// Which syntax the final expression is edited in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyntaxType {
    /// Simple syntax with a FHIRPath companion kept in sync by the translator
    #[default]
    Simple,
    /// Raw FHIRPath, advanced interface only
    FhirPath,
}

/// A rule-editing session over one Questionnaire
#[derive(Debug, Default)]
pub struct RuleSession {
    syntax: SyntaxType,
    link_id_context: String,
    uneditable_variables: Vec<UneditableVariable>,
    variables: Vec<Variable>,
    questions: Vec<Question>,
    final_expression: String,
    simple_expression: String,
    case_statements: bool,
    needs_advanced_interface: bool,
    might_be_score: bool,
    /// The last imported document, stripped of the entries the session now
    /// owns; the base every export starts from
    source: Option<Questionnaire>,
    /// Original positions of the root entries retained in `source`
    retained_indices: Vec<usize>,
    listeners: ChangeListeners,
}

impl RuleSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change subscriber
    pub fn subscribe(&mut self, listener: impl Fn(&ChangeEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    /// Drop a change subscriber
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // --- accessors ---

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Vec<Variable> {
        &mut self.variables
    }

    pub fn uneditable_variables(&self) -> &[UneditableVariable] {
        &self.uneditable_variables
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn final_expression(&self) -> &str {
        &self.final_expression
    }

    pub fn simple_expression(&self) -> &str {
        &self.simple_expression
    }

    pub fn syntax(&self) -> SyntaxType {
        self.syntax
    }

    /// True when the final expression is a top-level `iif(...)` case form
    pub fn case_statements(&self) -> bool {
        self.case_statements
    }

    pub fn needs_advanced_interface(&self) -> bool {
        self.needs_advanced_interface
    }

    /// True when the imported document looks like a total-score form
    pub fn might_be_score(&self) -> bool {
        self.might_be_score
    }

    pub fn link_id_context(&self) -> &str {
        &self.link_id_context
    }

    // --- import ---

    /// Rebuild the whole session model from a document.
    ///
    /// `expression_url` selects which final-expression extension to edit at
    /// the item identified by `link_id_context`. A document without the
    /// minimal traversable shape makes this a no-op: nothing is loaded and
    /// the previous model is left in place, but the export base is cleared.
    pub fn import(
        &mut self,
        expression_url: &str,
        questionnaire: Questionnaire,
        link_id_context: &str,
    ) {
        self.link_id_context = link_id_context.to_string();

        if !questionnaire.is_traversable() {
            log::debug!("not a traversable Questionnaire, nothing loaded");
            self.source = None;
            self.retained_indices.clear();
            return;
        }

        let mut document = questionnaire;

        self.might_be_score =
            score::score_item_count(&document, link_id_context) > SCORE_MIN_QUESTIONS;
        self.emit(ChangeEvent::MightBeScore(self.might_be_score));

        self.uneditable_variables = extract::extract_uneditable_variables(&document);
        self.emit(ChangeEvent::UneditableVariables(self.uneditable_variables.clone()));

        let registry = build_question_registry(&document);
        self.needs_advanced_interface = false;

        let extracted = extract::extract_variables(&mut document, |link_id| {
            registry.get(link_id).and_then(|question| question.unit.clone())
        });
        self.variables = extracted.variables;
        self.retained_indices = extracted.retained_indices;
        if self.variables.iter().any(|variable| variable.kind.is_advanced()) {
            self.needs_advanced_interface = true;
        }
        self.emit(ChangeEvent::Variables(self.variables.clone()));

        self.questions = registry.into_values().collect();
        self.emit(ChangeEvent::Questions(self.questions.clone()));

        let final_entry = extract::extract_final_expression(
            document.item.as_deref_mut().unwrap_or(&mut []),
            expression_url,
            link_id_context,
        );

        match final_entry {
            Some(entry) => {
                self.final_expression = entry
                    .value_expression
                    .as_ref()
                    .and_then(|value| value.expression.clone())
                    .unwrap_or_default();
                self.case_statements = synthesis::is_case_statement(&self.final_expression);

                match entry.simple_syntax() {
                    None if !self.final_expression.is_empty() => {
                        self.syntax = SyntaxType::FhirPath;
                        self.needs_advanced_interface = true;
                        self.simple_expression.clear();
                    }
                    companion => {
                        self.syntax = SyntaxType::Simple;
                        self.simple_expression = companion.unwrap_or_default().to_string();
                    }
                }
            }
            None => {
                self.syntax = SyntaxType::Simple;
                self.simple_expression.clear();
                self.final_expression.clear();
                self.case_statements = false;
            }
        }
        self.emit(ChangeEvent::FinalExpression(self.final_expression.clone()));

        self.source = Some(document);
    }

    // --- editing ---

    /// Add an empty question variable with a freshly allocated label. The
    /// label can be empty when all short names are taken.
    pub fn add_variable(&mut self) {
        let existing: Vec<String> = self
            .variables
            .iter()
            .map(|variable| variable.label.clone())
            .chain(
                self.uneditable_variables
                    .iter()
                    .map(|uneditable| uneditable.name.clone()),
            )
            .collect();

        self.variables.push(Variable::new(
            labels::next_label(&existing),
            "",
            VariableKind::Question {
                link_id: String::new(),
                unit: None,
            },
        ));
        self.emit(ChangeEvent::Variables(self.variables.clone()));
    }

    /// Remove the variable at `index`, ignoring out-of-range indices
    pub fn remove_variable(&mut self, index: usize) {
        if index < self.variables.len() {
            self.variables.remove(index);
        }
    }

    /// Re-emit the variable list, e.g. after editing labels in place
    pub fn notify_variables_changed(&mut self) {
        self.emit(ChangeEvent::Variables(self.variables.clone()));
    }

    /// Recompute (or force on) the advanced-interface requirement
    pub fn check_advanced_interface(&mut self, toggle_on: bool) {
        if toggle_on {
            self.needs_advanced_interface = true;
        } else {
            self.needs_advanced_interface = self
                .variables
                .iter()
                .any(|variable| variable.kind.is_advanced())
                || self.syntax == SyntaxType::FhirPath;
        }

        self.emit(ChangeEvent::NeedsAdvancedInterface(self.needs_advanced_interface));
    }

    /// Flip the total-score suggestion flag
    pub fn toggle_might_be_score(&mut self) {
        self.might_be_score = !self.might_be_score;
        self.emit(ChangeEvent::MightBeScore(self.might_be_score));
    }

    /// Update the final expression from simple-syntax text. The text is
    /// translated first and committed only on success; a translator failure
    /// leaves the session untouched.
    pub fn set_simple_expression(
        &mut self,
        simple: &str,
        translator: &dyn SimpleSyntaxTranslator,
    ) -> RuleResult<()> {
        let known: Vec<String> = self
            .uneditable_variables
            .iter()
            .map(|uneditable| uneditable.name.clone())
            .chain(self.variables.iter().map(|variable| variable.label.clone()))
            .collect();

        let translated = translator.translate(simple, &known)?;

        self.syntax = SyntaxType::Simple;
        self.simple_expression = simple.to_string();
        self.set_final_expression(&translated);
        Ok(())
    }

    /// Set the final expression directly (advanced interface)
    pub fn set_final_expression(&mut self, expression: &str) {
        self.final_expression = expression.to_string();
        self.case_statements = synthesis::is_case_statement(expression);
        self.emit(ChangeEvent::FinalExpression(self.final_expression.clone()));
    }

    // --- export ---

    /// Reconstruct a document from the current model: variables re-merged
    /// into their original positions (session-added ones appended), the
    /// final expression attached at the context item under `url`, and a
    /// patient launch context synthesized when an observation query needs
    /// one. The stored snapshot is never mutated, so repeated exports do
    /// not accumulate.
    pub fn export(&mut self, url: &str, final_expression: &str) -> RuleResult<Questionnaire> {
        let source = self.source.as_ref().ok_or(RuleError::NothingLoaded)?;
        let mut document = source.clone();

        let mut positioned: Vec<(usize, Extension)> = Vec::new();
        let mut added: Vec<Extension> = Vec::new();
        for variable in &self.variables {
            let entry = serialize_variable(variable);
            match variable.original_index {
                Some(index) => positioned.push((index, entry)),
                None => added.push(entry),
            }
        }

        let retained = document.extension.take().unwrap_or_default();
        positioned.extend(retained.into_iter().zip(self.retained_indices.iter()).map(
            |(entry, index)| (*index, entry),
        ));
        positioned.sort_by_key(|(index, _)| *index);

        let mut merged: Vec<Extension> =
            positioned.into_iter().map(|(_, entry)| entry).collect();
        merged.extend(added);

        if !merged.is_empty() || source.extension.is_some() {
            document.extension = Some(merged);
        }

        let mut final_entry = Extension {
            url: url.to_string(),
            value_expression: Some(ExpressionValue {
                language: Some(urls::LANGUAGE_FHIRPATH.to_string()),
                expression: Some(final_expression.to_string()),
                ..ExpressionValue::default()
            }),
            ..Extension::default()
        };
        if self.syntax == SyntaxType::Simple {
            final_entry.extension = Some(vec![Extension::simple_syntax_companion(
                &self.simple_expression,
            )]);
        }

        if let Some(items) = document.item.as_mut() {
            if !navigator::insert_extensions(items, &self.link_id_context, vec![final_entry]) {
                log::debug!(
                    "no item {} found, final expression not attached",
                    self.link_id_context
                );
            }
        }

        let needs_patient_context = self
            .variables
            .iter()
            .any(|variable| matches!(variable.kind, VariableKind::QueryObservation { .. }));
        if needs_patient_context && !has_patient_launch_context(&document) {
            document
                .extension
                .get_or_insert_with(Vec::new)
                .push(Extension::launch_context(
                    "patient",
                    "Patient",
                    PATIENT_CONTEXT_DESCRIPTION,
                ));

            if !self
                .uneditable_variables
                .iter()
                .any(|uneditable| uneditable.name == "patient")
            {
                self.uneditable_variables.push(UneditableVariable {
                    name: "patient".to_string(),
                    type_codes: "Patient".to_string(),
                    description: Some(PATIENT_CONTEXT_DESCRIPTION.to_string()),
                });
                self.emit(ChangeEvent::UneditableVariables(
                    self.uneditable_variables.clone(),
                ));
            }
        }

        Ok(document)
    }

    fn emit(&self, event: ChangeEvent) {
        self.listeners.emit(&event);
    }
}

/// Flat linkId → question registry, document order. Re-inserted duplicate
/// ids keep their first position with the later item's data.
fn build_question_registry(document: &Questionnaire) -> IndexMap<String, Question> {
    let mut registry = IndexMap::new();

    navigator::for_each_item(document.items(), &mut |item| {
        let Some(link_id) = item.link_id.clone() else {
            return;
        };
        let text = item.text.as_deref().unwrap_or_default();

        registry.insert(
            link_id.clone(),
            Question {
                link_id,
                text: truncate_text(text),
                unit: item.question_unit().map(String::from),
            },
        );
    });

    registry
}

fn truncate_text(text: &str) -> String {
    if text.chars().count() > MAX_QUESTION_LEN {
        let mut truncated: String = text.chars().take(MAX_QUESTION_LEN).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.to_string()
    }
}

/// True when the document root already declares a launch context named
/// `patient`
fn has_patient_launch_context(document: &Questionnaire) -> bool {
    document
        .extension
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|entry| {
            entry.url == urls::LAUNCH_CONTEXT
                && entry
                    .extension
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .any(|sub| sub.url == "name" && sub.value_id.as_deref() == Some("patient"))
        })
}

fn serialize_variable(variable: &Variable) -> Extension {
    let language = if variable.kind.is_query_language() {
        urls::LANGUAGE_FHIR_QUERY
    } else {
        urls::LANGUAGE_FHIRPATH
    };

    let mut entry = Extension {
        url: urls::VARIABLE.to_string(),
        value_expression: Some(ExpressionValue {
            name: Some(variable.label.clone()),
            language: Some(language.to_string()),
            expression: Some(variable.expression.clone()),
            ..ExpressionValue::default()
        }),
        ..Extension::default()
    };

    if let VariableKind::Simple { simple } = &variable.kind {
        entry.extension = Some(vec![Extension::simple_syntax_companion(simple)]);
    }

    entry
}
