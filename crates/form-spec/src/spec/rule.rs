use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declarative rule kinds a field can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Pattern,
    Min,
    Max,
}

impl RuleKind {
    pub const ALL: [RuleKind; 6] = [
        RuleKind::Required,
        RuleKind::MinLength,
        RuleKind::MaxLength,
        RuleKind::Pattern,
        RuleKind::Min,
        RuleKind::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Pattern => "pattern",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
        }
    }

    /// Rule installed when the kind is switched on in the field editor.
    pub fn default_rule(self) -> ValidationRule {
        let (value, message) = match self {
            RuleKind::Required => (None, "This field is required"),
            RuleKind::MinLength => (Some("3"), "Minimum length is 3 characters"),
            RuleKind::MaxLength => (Some("100"), "Maximum length is 100 characters"),
            RuleKind::Pattern => (Some(""), "Invalid format"),
            RuleKind::Min => (Some("0"), "Minimum value is 0"),
            RuleKind::Max => (Some("100"), "Maximum value is 100"),
        };
        ValidationRule {
            kind: self,
            value: value.map(|text| RuleValue::Text(text.to_string())),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule parameter; templates store numbers as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RuleValue {
    Number(f64),
    Text(String),
}

impl RuleValue {
    /// Numeric reading of the parameter. Blank text reads as zero.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RuleValue::Number(value) => Some(*value).filter(|value| !value.is_nan()),
            RuleValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok().filter(|value| !value.is_nan())
                }
            }
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            RuleValue::Number(value) => value.to_string(),
            RuleValue::Text(text) => text.clone(),
        }
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        RuleValue::Text(value.to_string())
    }
}

impl From<f64> for RuleValue {
    fn from(value: f64) -> Self {
        RuleValue::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RuleValue>,
    pub message: String,
}

impl ValidationRule {
    pub fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_value(mut self, value: impl Into<RuleValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_ref().and_then(RuleValue::as_number)
    }
}

/// Partial update merged into every rule of one kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RulePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RuleValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
