use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::new_id;
use crate::spec::rule::{RuleKind, ValidationRule};

/// Closed set of field kinds offered by the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Dropdown,
    Checkbox,
    Radio,
    Date,
    Email,
    Number,
    Phone,
    Url,
    Password,
    File,
}

impl FieldType {
    /// Palette order.
    pub const ALL: [FieldType; 12] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Email,
        FieldType::Number,
        FieldType::Phone,
        FieldType::Url,
        FieldType::Date,
        FieldType::Dropdown,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::File,
        FieldType::Password,
    ];

    /// Whether `options` carries meaning for this kind.
    pub fn supports_options(self) -> bool {
        matches!(
            self,
            FieldType::Dropdown | FieldType::Checkbox | FieldType::Radio
        )
    }

    /// Wire name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Dropdown => "dropdown",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Date => "date",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Phone => "phone",
            FieldType::Url => "url",
            FieldType::Password => "password",
            FieldType::File => "file",
        }
    }

    /// Human-friendly palette label.
    pub fn label(self) -> &'static str {
        match self {
            FieldType::Text => "Text Field",
            FieldType::Textarea => "Text Area",
            FieldType::Dropdown => "Dropdown",
            FieldType::Checkbox => "Checkbox",
            FieldType::Radio => "Radio",
            FieldType::Date => "Date",
            FieldType::Email => "Email",
            FieldType::Number => "Number",
            FieldType::Phone => "Phone",
            FieldType::Url => "URL",
            FieldType::Password => "Password",
            FieldType::File => "File Upload",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_lowercase();
        FieldType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown field type '{}'", value))
    }
}

/// A selectable choice of a dropdown, checkbox or radio field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldOption {
    pub id: String,
    pub label: String,
    pub value: String,
}

impl FieldOption {
    /// Builds an option whose value is derived from the label.
    pub fn from_label(label: &str) -> Self {
        Self {
            id: new_id(),
            label: label.to_string(),
            value: option_value_from_label(label),
        }
    }
}

/// Lower-cases the label and replaces each whitespace run with `-`.
pub fn option_value_from_label(label: &str) -> String {
    let mut value = String::with_capacity(label.len());
    let mut in_whitespace = false;
    for ch in label.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                value.push('-');
            }
            in_whitespace = true;
        } else {
            value.push(ch);
            in_whitespace = false;
        }
    }
    value
}

/// A single input within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationRule>,
    #[serde(default)]
    pub is_required: bool,
}

/// Partially specified field handed to `add_field`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDraft {
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

impl FieldDraft {
    pub fn new(kind: FieldType, label: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

pub const DEFAULT_FIELD_LABEL: &str = "New Field";

impl FormField {
    /// Completes a draft with the creation defaults and a fresh id.
    pub fn from_draft(draft: FieldDraft) -> Self {
        Self {
            id: new_id(),
            kind: draft.kind.unwrap_or_default(),
            label: draft
                .label
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| DEFAULT_FIELD_LABEL.to_string()),
            placeholder: Some(draft.placeholder.unwrap_or_default()),
            help_text: Some(draft.help_text.unwrap_or_default()),
            options: draft.options.unwrap_or_default(),
            validation: draft.validation.unwrap_or_default(),
            is_required: draft.is_required.unwrap_or(false),
        }
    }

    pub fn has_rule(&self, kind: RuleKind) -> bool {
        self.validation.iter().any(|rule| rule.kind == kind)
    }

    /// A field counts as required when flagged or when it carries a `required` rule.
    pub fn is_effectively_required(&self) -> bool {
        self.is_required || self.has_rule(RuleKind::Required)
    }

    pub fn option_values(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|option| option.value.clone())
            .collect()
    }
}
