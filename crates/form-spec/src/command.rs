use serde::{Deserialize, Serialize};

use crate::editor::{FieldPatch, FormMetaPatch, StepPatch};
use crate::spec::{FieldDraft, RuleKind, RulePatch};
use crate::store::FormStore;

/// A single user action against the current form, replayable from a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    UpdateMeta {
        #[serde(flatten)]
        patch: FormMetaPatch,
    },
    AddStep,
    UpdateStep {
        step_id: String,
        #[serde(flatten)]
        patch: StepPatch,
    },
    DeleteStep {
        step_id: String,
    },
    ReorderSteps {
        from: usize,
        to: usize,
    },
    AddField {
        step_id: String,
        field: FieldDraft,
    },
    UpdateField {
        step_id: String,
        field_id: String,
        #[serde(flatten)]
        patch: FieldPatch,
    },
    DeleteField {
        step_id: String,
        field_id: String,
    },
    ReorderFields {
        step_id: String,
        from: usize,
        to: usize,
    },
    ToggleRule {
        step_id: String,
        field_id: String,
        rule: RuleKind,
        enabled: bool,
    },
    UpdateRule {
        step_id: String,
        field_id: String,
        rule: RuleKind,
        #[serde(flatten)]
        patch: RulePatch,
    },
    AddOption {
        step_id: String,
        field_id: String,
        label: String,
    },
    DeleteOption {
        step_id: String,
        field_id: String,
        option_id: String,
    },
    Undo,
    Redo,
}

impl EditCommand {
    /// Runs the command; `false` means it was a no-op.
    pub fn apply(&self, store: &mut FormStore) -> bool {
        match self {
            EditCommand::UpdateMeta { patch } => store.update_current_form(patch),
            EditCommand::AddStep => store.add_step().is_some(),
            EditCommand::UpdateStep { step_id, patch } => store.update_step(step_id, patch),
            EditCommand::DeleteStep { step_id } => store.delete_step(step_id),
            EditCommand::ReorderSteps { from, to } => store.reorder_steps(*from, *to),
            EditCommand::AddField { step_id, field } => {
                store.add_field(step_id, field.clone()).is_some()
            }
            EditCommand::UpdateField {
                step_id,
                field_id,
                patch,
            } => store.update_field(step_id, field_id, patch),
            EditCommand::DeleteField { step_id, field_id } => {
                store.delete_field(step_id, field_id)
            }
            EditCommand::ReorderFields { step_id, from, to } => {
                store.reorder_fields(step_id, *from, *to)
            }
            EditCommand::ToggleRule {
                step_id,
                field_id,
                rule,
                enabled,
            } => store.toggle_rule(step_id, field_id, *rule, *enabled),
            EditCommand::UpdateRule {
                step_id,
                field_id,
                rule,
                patch,
            } => store.update_rule(step_id, field_id, *rule, patch),
            EditCommand::AddOption {
                step_id,
                field_id,
                label,
            } => store.add_option(step_id, field_id, label),
            EditCommand::DeleteOption {
                step_id,
                field_id,
                option_id,
            } => store.delete_option(step_id, field_id, option_id),
            EditCommand::Undo => store.undo(),
            EditCommand::Redo => store.redo(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::UpdateMeta { .. } => "update_meta",
            EditCommand::AddStep => "add_step",
            EditCommand::UpdateStep { .. } => "update_step",
            EditCommand::DeleteStep { .. } => "delete_step",
            EditCommand::ReorderSteps { .. } => "reorder_steps",
            EditCommand::AddField { .. } => "add_field",
            EditCommand::UpdateField { .. } => "update_field",
            EditCommand::DeleteField { .. } => "delete_field",
            EditCommand::ReorderFields { .. } => "reorder_fields",
            EditCommand::ToggleRule { .. } => "toggle_rule",
            EditCommand::UpdateRule { .. } => "update_rule",
            EditCommand::AddOption { .. } => "add_option",
            EditCommand::DeleteOption { .. } => "delete_option",
            EditCommand::Undo => "undo",
            EditCommand::Redo => "redo",
        }
    }
}
