use serde_json::{Map, Value, json};

use crate::spec::{FieldType, Form, FormField, RuleKind};

/// JSON Schema describing the answer map a respondent submits for `form`.
pub fn generate(form: &Form) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in form.fields() {
        properties.insert(field.id.clone(), field_schema(field));
        if field.is_effectively_required() {
            required.push(Value::String(field.id.clone()));
        }
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": form.title,
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": true,
    })
}

/// Schema of the form document itself.
pub fn form_document_schema() -> Value {
    schemars::schema_for!(Form).to_value()
}

fn field_schema(field: &FormField) -> Value {
    let mut schema = Map::new();
    schema.insert("title".into(), Value::String(field.label.clone()));
    if let Some(help) = field.help_text.as_ref().filter(|help| !help.is_empty()) {
        schema.insert("description".into(), Value::String(help.clone()));
    }

    match field.kind {
        FieldType::Number => {
            schema.insert("type".into(), Value::String("number".into()));
        }
        FieldType::Checkbox => {
            let mut items = Map::new();
            items.insert("type".into(), Value::String("string".into()));
            if !field.options.is_empty() {
                items.insert("enum".into(), option_enum(field));
            }
            schema.insert("type".into(), Value::String("array".into()));
            schema.insert("items".into(), Value::Object(items));
        }
        FieldType::Dropdown | FieldType::Radio => {
            schema.insert("type".into(), Value::String("string".into()));
            if !field.options.is_empty() {
                schema.insert("enum".into(), option_enum(field));
            }
        }
        FieldType::File => {}
        FieldType::Email => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert("format".into(), Value::String("email".into()));
        }
        FieldType::Url => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert("format".into(), Value::String("uri".into()));
        }
        FieldType::Date => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert("format".into(), Value::String("date".into()));
        }
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Phone
        | FieldType::Password => {
            schema.insert("type".into(), Value::String("string".into()));
        }
    }

    for rule in &field.validation {
        let keyword = match rule.kind {
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Min => "minimum",
            RuleKind::Max => "maximum",
            RuleKind::Pattern => {
                if let Some(pattern) = rule
                    .value
                    .as_ref()
                    .map(|value| value.as_text())
                    .filter(|pattern| !pattern.is_empty())
                {
                    schema
                        .entry("pattern")
                        .or_insert(Value::String(pattern));
                }
                continue;
            }
            RuleKind::Required => continue,
        };
        if let Some(bound) = rule.numeric_value() {
            let bound = if matches!(rule.kind, RuleKind::MinLength | RuleKind::MaxLength) {
                json!(bound.max(0.0).ceil() as u64)
            } else {
                json!(bound)
            };
            schema.entry(keyword).or_insert(bound);
        }
    }

    Value::Object(schema)
}

fn option_enum(field: &FormField) -> Value {
    Value::Array(
        field
            .option_values()
            .into_iter()
            .map(Value::String)
            .collect(),
    )
}
