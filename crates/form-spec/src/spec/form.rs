use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::field::FormField;

/// Viewport simulated by the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl PreviewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PreviewMode::Desktop => "desktop",
            PreviewMode::Tablet => "tablet",
            PreviewMode::Mobile => "mobile",
        }
    }

    /// CSS width used by the preview frame.
    pub fn viewport_width(self) -> &'static str {
        match self {
            PreviewMode::Desktop => "100%",
            PreviewMode::Tablet => "768px",
            PreviewMode::Mobile => "375px",
        }
    }
}

impl std::str::FromStr for PreviewMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "desktop" => Ok(PreviewMode::Desktop),
            "tablet" => Ok(PreviewMode::Tablet),
            "mobile" => Ok(PreviewMode::Mobile),
            _ => Err(format!("unknown preview mode '{}'", value)),
        }
    }
}

/// One page of a multi-step form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl FormStep {
    pub fn field(&self, field_id: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.id == field_id)
    }

    pub fn field_index(&self, field_id: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.id == field_id)
    }
}

/// Top-level form document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<FormStep>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Form {
    pub fn step(&self, step_id: &str) -> Option<&FormStep> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    /// Finds a field in any step.
    pub fn field(&self, field_id: &str) -> Option<&FormField> {
        self.fields().find(|field| field.id == field_id)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.steps.iter().flat_map(|step| step.fields.iter())
    }

    pub fn field_count(&self) -> usize {
        self.steps.iter().map(|step| step.fields.len()).sum()
    }
}

/// Form body carried by a template: a form without id or timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TemplateForm {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<FormStep>,
}

/// Static stamp used to seed new forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub form: TemplateForm,
}
