pub mod field;
pub mod form;
pub mod response;
pub mod rule;

pub use field::{
    DEFAULT_FIELD_LABEL, FieldDraft, FieldOption, FieldType, FormField, option_value_from_label,
};
pub use form::{Form, FormStep, FormTemplate, PreviewMode, TemplateForm};
pub use response::{Answers, FormResponse};
pub use rule::{RuleKind, RulePatch, RuleValue, ValidationRule};
