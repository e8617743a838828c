use std::collections::BTreeMap;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::{Answers, Form, FormField, FormStep, RuleKind, ValidationRule};

/// Field id to first failing rule message.
pub type StepErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub step_id: String,
    pub field_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub unknown_fields: Vec<String>,
}

impl ValidationResult {
    /// Errors for one step, in the shape the step aggregator returns.
    pub fn step_errors(&self, step_id: &str) -> StepErrors {
        self.errors
            .iter()
            .filter(|error| error.step_id == step_id)
            .map(|error| (error.field_id.clone(), error.message.clone()))
            .collect()
    }
}

/// Evaluates the field's rules in order and returns the first failing message.
pub fn validate_field(field: &FormField, value: Option<&Value>) -> Option<String> {
    let value = value.unwrap_or(&Value::Null);
    field
        .validation
        .iter()
        .find(|rule| rule_fails(rule, value))
        .map(|rule| rule.message.clone())
}

/// Validates every field of a step against the caller's answers.
pub fn validate_step(step: &FormStep, answers: &Answers) -> StepErrors {
    step.fields
        .iter()
        .filter_map(|field| {
            validate_field(field, answers.get(&field.id)).map(|message| (field.id.clone(), message))
        })
        .collect()
}

pub fn validate_form(form: &Form, answers: &Answers) -> ValidationResult {
    let mut errors = Vec::new();
    for step in &form.steps {
        for (field_id, message) in validate_step(step, answers) {
            errors.push(ValidationError {
                step_id: step.id.clone(),
                field_id,
                message,
            });
        }
    }

    let unknown_fields: Vec<String> = answers
        .keys()
        .filter(|key| form.field(key).is_none())
        .cloned()
        .collect();

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        unknown_fields,
    }
}

fn rule_fails(rule: &ValidationRule, value: &Value) -> bool {
    match rule.kind {
        RuleKind::Required => is_falsy(value) || is_empty_array(value),
        RuleKind::MinLength => {
            if let Some(text) = value.as_str()
                && let Some(min) = rule.numeric_value()
            {
                (text.chars().count() as f64) < min
            } else {
                false
            }
        }
        RuleKind::MaxLength => {
            if let Some(text) = value.as_str()
                && let Some(max) = rule.numeric_value()
            {
                (text.chars().count() as f64) > max
            } else {
                false
            }
        }
        RuleKind::Pattern => {
            if let Some(text) = value.as_str()
                && let Some(regex) = compile_pattern(rule)
            {
                !regex.is_match(text)
            } else {
                false
            }
        }
        RuleKind::Min => {
            if let Some(number) = value.as_f64()
                && let Some(min) = rule.numeric_value()
            {
                number < min
            } else {
                false
            }
        }
        RuleKind::Max => {
            if let Some(number) = value.as_f64()
                && let Some(max) = rule.numeric_value()
            {
                number > max
            } else {
                false
            }
        }
    }
}

fn compile_pattern(rule: &ValidationRule) -> Option<Regex> {
    let pattern = rule.value.as_ref()?.as_text();
    if pattern.is_empty() {
        return None;
    }
    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::warn!(%pattern, error = %err, "skipping invalid pattern rule");
            None
        }
    }
}

/// `null`, `false`, `0` and `""` count as no answer.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().map(|n| n == 0.0).unwrap_or(false),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn is_empty_array(value: &Value) -> bool {
    value.as_array().map(Vec::is_empty).unwrap_or(false)
}
