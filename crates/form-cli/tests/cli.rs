use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

const CONTACT_ANSWERS: &str = include_str!("fixtures/contact_answers.json");
const CONTACT_INVALID: &str = include_str!("fixtures/contact_invalid.json");
const EDIT_SCRIPT: &str = include_str!("fixtures/edit_script.json");

fn cli(state: &Path) -> Command {
    let mut cmd = Command::cargo_bin("form-builder").expect("binary");
    cmd.env_remove("FORM_BUILDER_STATE")
        .env_remove("FORM_BUILDER_NAMESPACE")
        .env_remove("RUST_LOG")
        .arg("--state")
        .arg(state);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("run");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf8")
}

fn contact_form(state: &Path) -> String {
    stdout_of(cli(state).args(["from-template", "contact-form"]))
        .trim()
        .to_string()
}

#[test]
fn new_form_is_listed_and_shown() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");

    let id = stdout_of(cli(state.path()).args(["new", "--title", "Survey"]))
        .trim()
        .to_string();
    assert!(!id.is_empty());
    state.assert(predicate::str::contains("form-builder-storage"));

    cli(state.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{}  Survey", id)));
    cli(state.path())
        .args(["show", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Form: Survey"))
        .stdout(predicate::str::contains("1. Step 1"));
}

#[test]
fn fields_are_added_to_steps_by_position() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");
    let id = stdout_of(cli(state.path()).args(["new", "--title", "Poll"]))
        .trim()
        .to_string();
    let step_id = stdout_of(cli(state.path()).args([
        "add-step",
        id.as_str(),
        "--title",
        "Details",
    ]))
    .trim()
    .to_string();

    cli(state.path())
        .args([
            "add-field", id.as_str(), "--step", "2", "--type", "radio", "--label", "Colour",
            "--option", "Sky Blue", "--option", "Red", "--required",
        ])
        .assert()
        .success();

    let listing = stdout_of(cli(state.path()).args(["list", "--format", "json"]));
    let forms: Value = serde_json::from_str(&listing).expect("json");
    assert_eq!(forms[0]["steps"], 2);
    assert_eq!(forms[0]["fields"], 1);

    cli(state.path())
        .args(["show", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("2. Details ({})", step_id)))
        .stdout(predicate::str::contains("Colour [radio]"))
        .stdout(predicate::str::contains("options: Sky Blue=sky-blue, Red=red"));

    cli(state.path())
        .args(["add-field", id.as_str(), "--step", "7", "--label", "Lost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step '7' not found"));
}

#[test]
fn submit_records_valid_answers_only() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");
    let answers = temp.child("answers.json");
    answers.write_str(CONTACT_ANSWERS).expect("write answers");
    let invalid = temp.child("invalid.json");
    invalid.write_str(CONTACT_INVALID).expect("write answers");
    let id = contact_form(state.path());

    cli(state.path())
        .args(["submit", id.as_str(), "--answers"])
        .arg(invalid.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Please enter a valid email address"))
        .stdout(predicate::str::contains("Message must be at least 10 characters"))
        .stdout(predicate::str::contains("Unknown answer fields: legacy-field"));

    let recorded = stdout_of(
        cli(state.path())
            .args(["submit", id.as_str(), "--answers"])
            .arg(answers.path()),
    );
    let response_id = recorded
        .trim()
        .strip_prefix("Response recorded: ")
        .expect("response id")
        .to_string();

    cli(state.path())
        .args(["responses", id.as_str(), "--id", response_id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Response {}", response_id)))
        .stdout(predicate::str::contains("Email Address: ann@example.com"));

    cli(state.path())
        .args(["responses", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact Us: 1 response(s)"))
        .stdout(predicate::str::contains("Full Name: Ann Example"));

    let json = stdout_of(
        cli(state.path()).args(["responses", id.as_str(), "--format", "json"]),
    );
    let value: Value = serde_json::from_str(&json).expect("json");
    assert_eq!(value["count"], 1);
    assert_eq!(value["responses"][0]["answers"][1]["value"], "ann@example.com");
}

#[test]
fn validate_reports_step_errors() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");
    let invalid = temp.child("invalid.json");
    invalid.write_str(CONTACT_INVALID).expect("write answers");
    let id = contact_form(state.path());

    cli(state.path())
        .args(["validate", id.as_str(), "--step", "1", "--answers"])
        .arg(invalid.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Step 1 (Contact Information): invalid"))
        .stdout(predicate::str::contains(
            "Email Address (contact-email) - Please enter a valid email address",
        ));

    cli(state.path())
        .args(["validate", id.as_str(), "--step", "4", "--answers"])
        .arg(invalid.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("form has no step 4"));
}

#[test]
fn script_replays_edits_with_undo_and_redo() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");
    let script = temp.child("script.json");
    script.write_str(EDIT_SCRIPT).expect("write script");
    let id = contact_form(state.path());

    cli(state.path())
        .args(["apply", id.as_str(), "--script"])
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "add_field: applied\n\
             update_meta: applied\n\
             undo: applied\n\
             redo: applied\n\
             delete_step: no-op\n\
             reorder_fields: applied\n\
             toggle_rule: applied\n",
        ));

    let preview = stdout_of(
        cli(state.path()).args(["show", id.as_str(), "--format", "json"]),
    );
    let preview: Value = serde_json::from_str(&preview).expect("json");
    assert_eq!(preview["title"], "Get in touch");
    assert_eq!(preview["steps"][0]["fields"][0]["label"], "Phone");
    assert_eq!(preview["steps"][0]["fields"].as_array().map(Vec::len), Some(4));
}

#[test]
fn fill_reprompts_failed_fields_before_submitting() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");
    let id = contact_form(state.path());

    cli(state.path())
        .args(["fill", id.as_str()])
        .write_stdin("Ann\nnot-an-email\nHi\nann@example.com\nHello there, team!\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 1/1: Contact Information"))
        .stdout(predicate::str::contains(
            "Email Address: Please enter a valid email address",
        ))
        .stdout(predicate::str::contains("Response recorded:"));

    cli(state.path())
        .args(["responses", id.as_str(), "--page", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Page 1 of 1"))
        .stdout(predicate::str::contains("Message: Hello there, team!"));
}

#[test]
fn fill_fails_when_input_runs_out() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");
    let id = contact_form(state.path());

    cli(state.path())
        .args(["fill", id.as_str()])
        .write_stdin("Ann\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input ended"));
}

#[test]
fn unknown_template_lists_available_ids() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");

    cli(state.path())
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("feedback-survey  Feedback Survey"));
    cli(state.path())
        .args(["from-template", "wedding"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("available: contact-form"));
}

#[test]
fn preview_mode_persists_and_drives_json_preview() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");
    let id = contact_form(state.path());

    cli(state.path())
        .args(["preview-mode", "mobile"])
        .assert()
        .success()
        .stdout("mobile (375px)\n");
    cli(state.path())
        .args(["show", id.as_str(), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"viewportWidth\": \"375px\""));
    cli(state.path())
        .args(["show", id.as_str(), "--format", "json", "--mode", "tablet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"viewportWidth\": \"768px\""));
}

#[test]
fn delete_keeps_responses_but_drops_form() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");
    let answers = temp.child("answers.json");
    answers.write_str(CONTACT_ANSWERS).expect("write answers");
    let id = contact_form(state.path());
    cli(state.path())
        .args(["submit", id.as_str(), "--answers"])
        .arg(answers.path())
        .assert()
        .success();

    cli(state.path()).args(["delete", id.as_str()]).assert().success();
    cli(state.path())
        .args(["show", id.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    state.assert(predicate::str::contains("Ann Example"));
}

#[test]
fn schema_describes_answers_or_documents() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");
    let id = contact_form(state.path());

    let schema = stdout_of(cli(state.path()).args(["schema", id.as_str()]));
    let schema: Value = serde_json::from_str(&schema).expect("json");
    assert_eq!(schema["properties"]["contact-email"]["format"], "email");
    assert_eq!(schema["required"].as_array().map(Vec::len), Some(3));

    let document = stdout_of(cli(state.path()).arg("schema"));
    assert!(document.contains("\"steps\""));
}

#[test]
fn state_path_falls_back_to_environment() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("from-env.json");

    Command::cargo_bin("form-builder")
        .expect("binary")
        .env("FORM_BUILDER_STATE", state.path())
        .args(["new", "--title", "Env"])
        .assert()
        .success();
    state.assert(predicate::str::contains("Env"));

    cli(state.path())
        .args(["--namespace", "other", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No forms yet"));
}

#[test]
fn palette_lists_field_types_and_rules() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");

    cli(state.path())
        .arg("palette")
        .assert()
        .success()
        .stdout(predicate::str::contains("file      File Upload"))
        .stdout(predicate::str::contains("radio     Radio  (with options)"))
        .stdout(predicate::str::contains(
            "minLength 3  -> Minimum length is 3 characters",
        ));
}

#[test]
fn catalogue_commands_ignore_a_corrupt_state_file() {
    let temp = TempDir::new().expect("temp dir");
    let state = temp.child("state.json");
    state.write_str("{ truncated").expect("write state");

    cli(state.path()).arg("templates").assert().success();
    cli(state.path()).arg("palette").assert().success();
    cli(state.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Json"));
}
