#![allow(missing_docs)]

pub mod answers_schema;
pub mod command;
pub mod editor;
pub mod history;
pub mod ids;
pub mod render;
pub mod responses;
pub mod spec;
pub mod storage;
pub mod store;
pub mod templates;
pub mod validate;

pub use answers_schema::{form_document_schema, generate as answers_schema};
pub use command::EditCommand;
pub use editor::{FieldPatch, FormMetaPatch, StepPatch};
pub use history::History;
pub use render::{
    render_form_json, render_form_text, render_response_text, render_responses_json,
    value_to_display,
};
pub use responses::{DEFAULT_PAGE_SIZE, ResponseLog};
pub use spec::{
    Answers, FieldDraft, FieldOption, FieldType, Form, FormField, FormResponse, FormStep,
    FormTemplate, PreviewMode, RuleKind, RulePatch, RuleValue, TemplateForm, ValidationRule,
};
pub use storage::{
    DEFAULT_NAMESPACE, FileStore, KeyValueStore, MemoryStore, PersistedState, StorageError,
    load_state, save_state,
};
pub use store::{FormStore, SubmitError};
pub use templates::{builtin_template_ids, builtin_templates, find_template};
pub use validate::{
    StepErrors, ValidationError, ValidationResult, validate_field, validate_form, validate_step,
};
