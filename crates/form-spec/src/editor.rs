//! Structural edits over a form document.
//!
//! Every edit borrows the current form and returns `Some(updated)` when it
//! applies, or `None` when the edit is a no-op (unknown id, last step, a
//! patch that changes nothing, out-of-range move). Applied edits advance `updated_at`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{advance, new_id, now_millis};
use crate::spec::{
    FieldDraft, FieldOption, FieldType, Form, FormField, FormStep, FormTemplate, RuleKind,
    RulePatch, ValidationRule,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormMetaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FormField>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Vec<ValidationRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
}

impl FieldPatch {
    fn apply_to(&self, field: &mut FormField) {
        if let Some(kind) = self.kind {
            field.kind = kind;
        }
        if let Some(label) = &self.label {
            field.label = label.clone();
        }
        if let Some(placeholder) = &self.placeholder {
            field.placeholder = Some(placeholder.clone());
        }
        if let Some(help_text) = &self.help_text {
            field.help_text = Some(help_text.clone());
        }
        if let Some(options) = &self.options {
            field.options = options.clone();
        }
        if let Some(validation) = &self.validation {
            field.validation = validation.clone();
        }
        if let Some(is_required) = self.is_required {
            field.is_required = is_required;
        }
    }
}

pub const FIRST_STEP_TITLE: &str = "Step 1";

/// Builds a fresh form with a single empty step.
pub fn new_form(title: &str, description: Option<&str>) -> Form {
    let now = now_millis();
    Form {
        id: new_id(),
        title: title.to_string(),
        description: description.map(str::to_string),
        steps: vec![FormStep {
            id: new_id(),
            title: FIRST_STEP_TITLE.to_string(),
            fields: Vec::new(),
        }],
        created_at: now,
        updated_at: now,
    }
}

/// Stamps a template into a new form. Step, field and option ids are kept as in the template.
pub fn instantiate_template(template: &FormTemplate) -> Form {
    let now = now_millis();
    Form {
        id: new_id(),
        title: template.form.title.clone(),
        description: template.form.description.clone(),
        steps: template.form.steps.clone(),
        created_at: now,
        updated_at: now,
    }
}

pub fn update_meta(form: &Form, patch: &FormMetaPatch) -> Option<Form> {
    let mut next = form.clone();
    if let Some(title) = &patch.title {
        next.title = title.clone();
    }
    if let Some(description) = &patch.description {
        next.description = Some(description.clone());
    }
    changed(next, form)
}

/// Appends `Step {N+1}`.
pub fn add_step(form: &Form) -> Option<Form> {
    let mut next = form.clone();
    next.steps.push(FormStep {
        id: new_id(),
        title: format!("Step {}", form.steps.len() + 1),
        fields: Vec::new(),
    });
    Some(touch(next, form))
}

pub fn update_step(form: &Form, step_id: &str, patch: &StepPatch) -> Option<Form> {
    let index = form.step_index(step_id)?;
    let mut next = form.clone();
    let step = &mut next.steps[index];
    if let Some(title) = &patch.title {
        step.title = title.clone();
    }
    if let Some(fields) = &patch.fields {
        step.fields = fields.clone();
    }
    changed(next, form)
}

/// Removes a step, keeping at least one.
pub fn delete_step(form: &Form, step_id: &str) -> Option<Form> {
    if form.steps.len() <= 1 {
        return None;
    }
    let index = form.step_index(step_id)?;
    let mut next = form.clone();
    next.steps.remove(index);
    Some(touch(next, form))
}

pub fn reorder_steps(form: &Form, from: usize, to: usize) -> Option<Form> {
    let mut next = form.clone();
    if !move_item(&mut next.steps, from, to) {
        return None;
    }
    Some(touch(next, form))
}

/// Completes the draft with defaults and appends it to the step.
pub fn add_field(form: &Form, step_id: &str, draft: FieldDraft) -> Option<(Form, String)> {
    let index = form.step_index(step_id)?;
    let field = FormField::from_draft(draft);
    let field_id = field.id.clone();
    let mut next = form.clone();
    next.steps[index].fields.push(field);
    Some((touch(next, form), field_id))
}

pub fn update_field(
    form: &Form,
    step_id: &str,
    field_id: &str,
    patch: &FieldPatch,
) -> Option<Form> {
    let step_index = form.step_index(step_id)?;
    let field_index = form.steps[step_index].field_index(field_id)?;
    let mut next = form.clone();
    patch.apply_to(&mut next.steps[step_index].fields[field_index]);
    changed(next, form)
}

pub fn delete_field(form: &Form, step_id: &str, field_id: &str) -> Option<Form> {
    let step_index = form.step_index(step_id)?;
    let field_index = form.steps[step_index].field_index(field_id)?;
    let mut next = form.clone();
    next.steps[step_index].fields.remove(field_index);
    Some(touch(next, form))
}

pub fn reorder_fields(form: &Form, step_id: &str, from: usize, to: usize) -> Option<Form> {
    let step_index = form.step_index(step_id)?;
    let mut next = form.clone();
    if !move_item(&mut next.steps[step_index].fields, from, to) {
        return None;
    }
    Some(touch(next, form))
}

/// Switches a rule kind on or off for a field.
///
/// Enabling a kind that is already present keeps the rule list as is, but
/// `required` still raises `is_required`. Disabling drops every rule of the
/// kind and `required` clears `is_required`.
pub fn toggle_rule(field: &FormField, kind: RuleKind, enabled: bool) -> FieldPatch {
    let validation = if enabled {
        let mut rules = field.validation.clone();
        if !field.has_rule(kind) {
            rules.push(kind.default_rule());
        }
        rules
    } else {
        field
            .validation
            .iter()
            .filter(|rule| rule.kind != kind)
            .cloned()
            .collect()
    };

    FieldPatch {
        validation: Some(validation),
        is_required: Some(if kind == RuleKind::Required {
            enabled
        } else {
            field.is_required
        }),
        ..FieldPatch::default()
    }
}

/// Merges the patch into every rule of the given kind.
pub fn update_rule(field: &FormField, kind: RuleKind, patch: &RulePatch) -> FieldPatch {
    let validation = field
        .validation
        .iter()
        .map(|rule| {
            let mut rule = rule.clone();
            if rule.kind == kind {
                if let Some(value) = &patch.value {
                    rule.value = Some(value.clone());
                }
                if let Some(message) = &patch.message {
                    rule.message = message.clone();
                }
            }
            rule
        })
        .collect();
    FieldPatch {
        validation: Some(validation),
        ..FieldPatch::default()
    }
}

/// Appends an option derived from `label`; blank labels are ignored.
pub fn add_option(field: &FormField, label: &str) -> Option<FieldPatch> {
    if label.trim().is_empty() {
        return None;
    }
    let mut options = field.options.clone();
    options.push(FieldOption::from_label(label));
    Some(FieldPatch {
        options: Some(options),
        ..FieldPatch::default()
    })
}

pub fn delete_option(field: &FormField, option_id: &str) -> Option<FieldPatch> {
    if !field.options.iter().any(|option| option.id == option_id) {
        return None;
    }
    let options = field
        .options
        .iter()
        .filter(|option| option.id != option_id)
        .cloned()
        .collect();
    Some(FieldPatch {
        options: Some(options),
        ..FieldPatch::default()
    })
}

/// Splice move: remove at `from`, insert at `to` in the shortened list.
/// A `to` past the end lands at the end.
fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() {
        return false;
    }
    let to = to.min(items.len() - 1);
    if from == to {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Merges that leave the document as it was are no-ops.
fn changed(next: Form, previous: &Form) -> Option<Form> {
    if next == *previous {
        None
    } else {
        Some(touch(next, previous))
    }
}

fn touch(mut next: Form, previous: &Form) -> Form {
    next.updated_at = advance(previous.updated_at);
    next
}
