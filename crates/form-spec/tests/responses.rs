use serde_json::json;

use form_spec::{
    Answers, FormStore, ResponseLog, SubmitError, builtin_templates, find_template,
    render_response_text, render_responses_json,
};

fn answers(value: serde_json::Value) -> Answers {
    serde_json::from_value(value).expect("answers map")
}

#[test]
fn responses_keep_insertion_order_per_form() {
    let mut store = FormStore::new();
    let form_id = store.create_form("Poll", None);
    let other_id = store.create_form("Other", None);

    let first = store.add_response(&form_id, answers(json!({ "f1": "a" })));
    store.add_response(&other_id, answers(json!({ "f1": "x" })));
    let second = store.add_response(&form_id, answers(json!({ "f1": "b" })));

    let responses = store.form_responses(&form_id);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].id, first);
    assert_eq!(responses[1].id, second);
    assert_ne!(first, second);
    assert_eq!(responses[0].data["f1"], "a");
    assert_eq!(responses[1].data["f1"], "b");
    assert!(responses[0].submitted_at <= responses[1].submitted_at);
    assert!(store.form_responses("unknown").is_empty());

    let log = store.responses();
    assert_eq!(log.len(), 3);
    assert_eq!(log.count_for(&form_id), 2);
    assert_eq!(
        log.get(&second).map(|response| response.form_id.as_str()),
        Some(form_id.as_str())
    );
    assert!(log.get("missing").is_none());
}

#[test]
fn pages_are_one_based() {
    let mut log = ResponseLog::new();
    for index in 0..23 {
        log.add("form", answers(json!({ "n": index })));
    }
    assert_eq!(log.page_count("form", 10), 3);
    assert_eq!(log.page("form", 1, 10).len(), 10);
    assert_eq!(log.page("form", 3, 10).len(), 3);
    assert_eq!(log.page("form", 3, 10)[0].data["n"], 20);
    assert!(log.page("form", 4, 10).is_empty());
    assert!(log.page("form", 0, 10).is_empty());
    assert!(log.page("form", usize::MAX, 10).is_empty());
    assert!(log.page("form", 2, usize::MAX).is_empty());
    assert_eq!(log.page_count("missing", 10), 0);
}

#[test]
fn submit_records_only_valid_answers() {
    let mut store = FormStore::new();
    let template = find_template("contact-form").expect("template");
    let form_id = store.load_template(&template);

    let err = store
        .submit(&form_id, answers(json!({ "contact-full-name": "Ann" })))
        .expect_err("missing answers");
    match err {
        SubmitError::Invalid(result) => {
            assert_eq!(result.errors.len(), 2);
            assert_eq!(result.errors[0].field_id, "contact-email");
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(store.form_responses(&form_id).is_empty());

    let id = store
        .submit(
            &form_id,
            answers(json!({
                "contact-full-name": "Ann",
                "contact-email": "ann@example.com",
                "contact-message": "Hello there, team!"
            })),
        )
        .expect("valid submission");
    assert_eq!(store.form_responses(&form_id)[0].id, id);

    assert!(matches!(
        store.submit("nope", Answers::new()),
        Err(SubmitError::UnknownForm(_))
    ));
}

#[test]
fn template_instantiation_keeps_step_ids() {
    let template = find_template("contact-form").expect("template");
    let mut store = FormStore::new();
    let first = store.load_template(&template);
    let second = store.load_template(&template);

    assert_ne!(first, template.id);
    assert_ne!(first, second);
    let form = store.form(&first).expect("form");
    assert_eq!(form.steps, template.form.steps);
    assert_eq!(form.title, "Contact Us");
    assert_eq!(form.created_at, form.updated_at);
    assert_eq!(
        store.form(&second).expect("form").steps[0].id,
        form.steps[0].id
    );
}

#[test]
fn bundled_templates_parse_and_validate_their_patterns() {
    let templates = builtin_templates();
    let ids: Vec<_> = templates.iter().map(|template| template.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "contact-form",
            "job-application",
            "event-registration",
            "feedback-survey"
        ]
    );
    assert!(find_template("unknown").is_none());

    let event = find_template("event-registration").expect("template");
    let email = event
        .form
        .steps
        .iter()
        .flat_map(|step| step.fields.iter())
        .find(|field| field.id == "event-email")
        .expect("email field");
    assert_eq!(
        form_spec::validate_field(email, Some(&json!("not an email"))).as_deref(),
        Some("Please enter a valid email address")
    );
    assert_eq!(
        form_spec::validate_field(email, Some(&json!("first.last@mail.example.org"))),
        None
    );
}

#[test]
fn response_rendering_uses_labels() {
    let template = find_template("event-registration").expect("template");
    let mut store = FormStore::new();
    let form_id = store.load_template(&template);
    store.add_response(
        &form_id,
        answers(json!({
            "event-full-name": "Ann",
            "event-sessions": ["keynote", "lunch"],
            "legacy": { "name": "cv.pdf" }
        })),
    );
    let form = store.form(&form_id).expect("form").clone();
    let responses = store.form_responses(&form_id);

    let text = render_response_text(&form, responses[0]);
    assert!(text.contains("Full Name: Ann"));
    assert!(text.contains("Which sessions are you interested in attending?: keynote, lunch"));
    assert!(text.contains("T-Shirt Size: -"));
    assert!(text.contains("legacy: cv.pdf"));

    let json = render_responses_json(&form, &responses);
    assert_eq!(json["count"], 1);
    assert_eq!(json["responses"][0]["answers"][0]["label"], "Full Name");
    assert_eq!(json["responses"][0]["answers"][0]["value"], "Ann");
}
