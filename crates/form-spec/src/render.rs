use serde_json::{Map, Value, json};

use crate::spec::{Form, FormField, FormResponse, PreviewMode};

/// Outline of a form for terminal output.
pub fn render_form_text(form: &Form) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", form.title, form.id));
    if let Some(description) = form.description.as_ref().filter(|text| !text.is_empty()) {
        lines.push(format!("Description: {}", description));
    }
    lines.push(format!(
        "Steps: {} / Fields: {}",
        form.steps.len(),
        form.field_count()
    ));

    for (index, step) in form.steps.iter().enumerate() {
        lines.push(format!("{}. {} ({})", index + 1, step.title, step.id));
        if step.fields.is_empty() {
            lines.push("   (no fields)".to_string());
        }
        for field in &step.fields {
            let mut entry = format!("   - {} [{}] ({})", field.label, field.kind, field.id);
            if field.is_effectively_required() {
                entry.push_str(" [required]");
            }
            lines.push(entry);
            if field.kind.supports_options() && !field.options.is_empty() {
                let options = field
                    .options
                    .iter()
                    .map(|option| format!("{}={}", option.label, option.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!("     options: {}", options));
            }
            for rule in &field.validation {
                let value = rule
                    .value
                    .as_ref()
                    .map(|value| format!(" {}", value.as_text()))
                    .unwrap_or_default();
                lines.push(format!(
                    "     rule: {}{} -> {}",
                    rule.kind, value, rule.message
                ));
            }
        }
    }

    lines.join("\n")
}

/// Structured preview payload for a viewport.
pub fn render_form_json(form: &Form, mode: PreviewMode) -> Value {
    let total = form.steps.len();
    let steps = form
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            json!({
                "id": step.id,
                "title": step.title,
                "position": index + 1,
                "isLast": index + 1 == total,
                "fields": step.fields.iter().map(field_json).collect::<Vec<_>>(),
            })
        })
        .collect::<Vec<_>>();

    json!({
        "formId": form.id,
        "title": form.title,
        "description": form.description,
        "previewMode": mode.as_str(),
        "viewportWidth": mode.viewport_width(),
        "stepCount": total,
        "steps": steps,
    })
}

fn field_json(field: &FormField) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), Value::String(field.id.clone()));
    map.insert("type".into(), Value::String(field.kind.as_str().into()));
    map.insert("label".into(), Value::String(field.label.clone()));
    map.insert(
        "required".into(),
        Value::Bool(field.is_effectively_required()),
    );
    if let Some(placeholder) = field.placeholder.as_ref().filter(|text| !text.is_empty()) {
        map.insert("placeholder".into(), Value::String(placeholder.clone()));
    }
    if let Some(help) = field.help_text.as_ref().filter(|text| !text.is_empty()) {
        map.insert("helpText".into(), Value::String(help.clone()));
    }
    if field.kind.supports_options() {
        map.insert(
            "options".into(),
            Value::Array(
                field
                    .options
                    .iter()
                    .map(|option| json!({ "label": option.label, "value": option.value }))
                    .collect(),
            ),
        );
    }
    Value::Object(map)
}

/// One response, with field labels in form order. Answers for fields no
/// longer in the form are listed last under their ids.
pub fn render_response_text(form: &Form, response: &FormResponse) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Response {}", response.id));
    lines.push(format!("Submitted at: {}", response.submitted_at));

    for field in form.fields() {
        let value = response
            .data
            .get(&field.id)
            .map(value_to_display)
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!("  {}: {}", field.label, value));
    }
    for (key, value) in &response.data {
        if form.field(key).is_none() {
            lines.push(format!("  {}: {}", key, value_to_display(value)));
        }
    }

    lines.join("\n")
}

pub fn render_responses_json(form: &Form, responses: &[&FormResponse]) -> Value {
    let entries = responses
        .iter()
        .map(|response| {
            let answers = form
                .fields()
                .map(|field| {
                    json!({
                        "fieldId": field.id,
                        "label": field.label,
                        "value": response.data.get(&field.id).cloned().unwrap_or(Value::Null),
                    })
                })
                .collect::<Vec<_>>();
            json!({
                "id": response.id,
                "submittedAt": response.submitted_at,
                "answers": answers,
            })
        })
        .collect::<Vec<_>>();

    json!({
        "formId": form.id,
        "title": form.title,
        "count": responses.len(),
        "responses": entries,
    })
}

/// Display text for an answer; lists are comma-joined and file handles show their name.
pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => num.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_display)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
    }
}
