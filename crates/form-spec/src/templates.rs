use crate::spec::FormTemplate;

const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
    ("contact-form", include_str!("../templates/contact-form.json")),
    (
        "job-application",
        include_str!("../templates/job-application.json"),
    ),
    (
        "event-registration",
        include_str!("../templates/event-registration.json"),
    ),
    (
        "feedback-survey",
        include_str!("../templates/feedback-survey.json"),
    ),
];

/// Ids of the bundled templates, in library order.
pub fn builtin_template_ids() -> impl Iterator<Item = &'static str> {
    BUILTIN_TEMPLATES.iter().map(|(id, _)| *id)
}

/// Parses the bundled template library. Entries that fail to parse are logged and skipped.
pub fn builtin_templates() -> Vec<FormTemplate> {
    BUILTIN_TEMPLATES
        .iter()
        .filter_map(|(id, raw)| parse(id, raw))
        .collect()
}

pub fn find_template(id: &str) -> Option<FormTemplate> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(candidate, _)| *candidate == id)
        .and_then(|(id, raw)| parse(id, raw))
}

fn parse(id: &str, raw: &str) -> Option<FormTemplate> {
    match serde_json::from_str(raw) {
        Ok(template) => Some(template),
        Err(err) => {
            tracing::warn!(template_id = id, error = %err, "bundled template is malformed");
            None
        }
    }
}
