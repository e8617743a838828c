use thiserror::Error;

use crate::editor::{self, FieldPatch, FormMetaPatch, StepPatch};
use crate::history::History;
use crate::responses::ResponseLog;
use crate::spec::{
    Answers, FieldDraft, Form, FormField, FormResponse, FormTemplate, PreviewMode, RuleKind,
    RulePatch,
};
use crate::validate::{ValidationResult, validate_form};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form '{0}' is not available")]
    UnknownForm(String),
    #[error("answers failed validation ({} field(s))", .0.errors.len())]
    Invalid(ValidationResult),
}

/// Owned editing state: the forms collection, the form being edited, its
/// session history, collected responses and the preview viewport.
///
/// The current form always equals the history snapshot under the cursor and
/// the entry with the same id in `forms`.
#[derive(Debug, Clone, Default)]
pub struct FormStore {
    forms: Vec<Form>,
    current: Option<Form>,
    responses: ResponseLog,
    preview_mode: PreviewMode,
    history: History,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted state; no form is current.
    pub fn from_parts(forms: Vec<Form>, responses: ResponseLog, preview_mode: PreviewMode) -> Self {
        Self {
            forms,
            current: None,
            responses,
            preview_mode,
            history: History::new(),
        }
    }

    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    pub fn form(&self, form_id: &str) -> Option<&Form> {
        self.forms.iter().find(|form| form.id == form_id)
    }

    pub fn current_form(&self) -> Option<&Form> {
        self.current.as_ref()
    }

    pub fn responses(&self) -> &ResponseLog {
        &self.responses
    }

    pub fn preview_mode(&self) -> PreviewMode {
        self.preview_mode
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Creates a form with one empty step and makes it current.
    pub fn create_form(&mut self, title: &str, description: Option<&str>) -> String {
        let form = editor::new_form(title, description);
        let id = form.id.clone();
        self.open(form, true);
        tracing::debug!(form_id = %id, "form created");
        id
    }

    /// Stamps a template into a new current form with a fresh history.
    pub fn load_template(&mut self, template: &FormTemplate) -> String {
        let form = editor::instantiate_template(template);
        let id = form.id.clone();
        self.open(form, true);
        tracing::debug!(form_id = %id, template_id = %template.id, "form created from template");
        id
    }

    /// Replaces a stored form by id, refreshing `updated_at`. Not recorded as an
    /// undo step; when it is the current form the snapshot under the cursor is
    /// replaced too.
    pub fn update_form(&mut self, mut form: Form) -> bool {
        let Some(existing) = self.form(&form.id) else {
            return false;
        };
        form.updated_at = crate::ids::advance(existing.updated_at);
        if self
            .current
            .as_ref()
            .is_some_and(|current| current.id == form.id)
        {
            self.history.rebase(form.clone());
            self.current = Some(form.clone());
        }
        self.replace_in_collection(&form);
        true
    }

    pub fn delete_form(&mut self, form_id: &str) -> bool {
        let before = self.forms.len();
        self.forms.retain(|form| form.id != form_id);
        if self
            .current
            .as_ref()
            .is_some_and(|current| current.id == form_id)
        {
            self.current = None;
            self.history.clear();
        }
        before != self.forms.len()
    }

    /// Makes a stored form current and restarts its history.
    pub fn load_form(&mut self, form_id: &str) -> Option<&Form> {
        let form = self.form(form_id).cloned();
        self.set_current_form(form);
        self.current.as_ref()
    }

    pub fn set_current_form(&mut self, form: Option<Form>) {
        match form {
            Some(form) => self.open(form, false),
            None => {
                self.current = None;
                self.history.clear();
            }
        }
    }

    pub fn update_current_form(&mut self, patch: &FormMetaPatch) -> bool {
        self.edit("update_form_meta", |form| editor::update_meta(form, patch))
    }

    /// Appends a step and returns its id.
    pub fn add_step(&mut self) -> Option<String> {
        let applied = self.edit("add_step", editor::add_step);
        applied
            .then(|| self.current.as_ref())
            .flatten()
            .and_then(|form| form.steps.last())
            .map(|step| step.id.clone())
    }

    pub fn update_step(&mut self, step_id: &str, patch: &StepPatch) -> bool {
        self.edit("update_step", |form| {
            editor::update_step(form, step_id, patch)
        })
    }

    pub fn delete_step(&mut self, step_id: &str) -> bool {
        self.edit("delete_step", |form| editor::delete_step(form, step_id))
    }

    pub fn reorder_steps(&mut self, from: usize, to: usize) -> bool {
        self.edit("reorder_steps", |form| editor::reorder_steps(form, from, to))
    }

    /// Adds a field built from the draft and returns its id.
    pub fn add_field(&mut self, step_id: &str, draft: FieldDraft) -> Option<String> {
        let (form, field_id) = self
            .current
            .as_ref()
            .and_then(|form| editor::add_field(form, step_id, draft))
            .unzip();
        self.commit("add_field", form).then_some(field_id).flatten()
    }

    pub fn update_field(&mut self, step_id: &str, field_id: &str, patch: &FieldPatch) -> bool {
        self.edit("update_field", |form| {
            editor::update_field(form, step_id, field_id, patch)
        })
    }

    pub fn delete_field(&mut self, step_id: &str, field_id: &str) -> bool {
        self.edit("delete_field", |form| {
            editor::delete_field(form, step_id, field_id)
        })
    }

    pub fn reorder_fields(&mut self, step_id: &str, from: usize, to: usize) -> bool {
        self.edit("reorder_fields", |form| {
            editor::reorder_fields(form, step_id, from, to)
        })
    }

    pub fn toggle_rule(
        &mut self,
        step_id: &str,
        field_id: &str,
        kind: RuleKind,
        enabled: bool,
    ) -> bool {
        let Some(field) = self.current_field(step_id, field_id) else {
            return false;
        };
        let patch = editor::toggle_rule(field, kind, enabled);
        self.update_field(step_id, field_id, &patch)
    }

    pub fn update_rule(
        &mut self,
        step_id: &str,
        field_id: &str,
        kind: RuleKind,
        patch: &RulePatch,
    ) -> bool {
        let Some(field) = self.current_field(step_id, field_id) else {
            return false;
        };
        let patch = editor::update_rule(field, kind, patch);
        self.update_field(step_id, field_id, &patch)
    }

    pub fn add_option(&mut self, step_id: &str, field_id: &str, label: &str) -> bool {
        let Some(patch) = self
            .current_field(step_id, field_id)
            .and_then(|field| editor::add_option(field, label))
        else {
            return false;
        };
        self.update_field(step_id, field_id, &patch)
    }

    pub fn delete_option(&mut self, step_id: &str, field_id: &str, option_id: &str) -> bool {
        let Some(patch) = self
            .current_field(step_id, field_id)
            .and_then(|field| editor::delete_option(field, option_id))
        else {
            return false;
        };
        self.update_field(step_id, field_id, &patch)
    }

    pub fn undo(&mut self) -> bool {
        let Some(form) = self.history.undo().cloned() else {
            return false;
        };
        tracing::debug!(form_id = %form.id, index = ?self.history.index(), "undo");
        self.replace_in_collection(&form);
        self.current = Some(form);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(form) = self.history.redo().cloned() else {
            return false;
        };
        tracing::debug!(form_id = %form.id, index = ?self.history.index(), "redo");
        self.replace_in_collection(&form);
        self.current = Some(form);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn add_response(&mut self, form_id: &str, data: Answers) -> String {
        let id = self.responses.add(form_id, data);
        tracing::debug!(form_id, response_id = %id, "response recorded");
        id
    }

    pub fn form_responses(&self, form_id: &str) -> Vec<&FormResponse> {
        self.responses.for_form(form_id)
    }

    /// Validates every step and records the answers only when all pass.
    pub fn submit(&mut self, form_id: &str, answers: Answers) -> Result<String, SubmitError> {
        let form = self
            .form(form_id)
            .ok_or_else(|| SubmitError::UnknownForm(form_id.to_string()))?;
        let result = validate_form(form, &answers);
        if !result.valid {
            return Err(SubmitError::Invalid(result));
        }
        Ok(self.add_response(form_id, answers))
    }

    pub fn set_preview_mode(&mut self, mode: PreviewMode) {
        self.preview_mode = mode;
    }

    fn current_field(&self, step_id: &str, field_id: &str) -> Option<&FormField> {
        self.current.as_ref()?.step(step_id)?.field(field_id)
    }

    fn open(&mut self, form: Form, insert: bool) {
        if insert {
            self.forms.push(form.clone());
        }
        self.history.reset(form.clone());
        self.current = Some(form);
    }

    fn edit(&mut self, operation: &'static str, apply: impl FnOnce(&Form) -> Option<Form>) -> bool {
        let next = self.current.as_ref().and_then(apply);
        self.commit(operation, next)
    }

    fn commit(&mut self, operation: &'static str, next: Option<Form>) -> bool {
        let Some(next) = next else {
            tracing::trace!(operation, "edit skipped");
            return false;
        };
        tracing::debug!(operation, form_id = %next.id, updated_at = next.updated_at, "edit applied");
        self.replace_in_collection(&next);
        self.history.record(next.clone());
        self.current = Some(next);
        true
    }

    fn replace_in_collection(&mut self, form: &Form) {
        if let Some(slot) = self.forms.iter_mut().find(|slot| slot.id == form.id) {
            *slot = form.clone();
        }
    }
}
