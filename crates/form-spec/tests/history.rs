use form_spec::{EditCommand, FieldDraft, FieldType, FormMetaPatch, FormStore, find_template};

fn edited_store(edits: usize) -> FormStore {
    let mut store = FormStore::new();
    store.create_form("Survey", None);
    for _ in 0..edits {
        store.add_step().expect("step added");
    }
    store
}

#[test]
fn n_edits_produce_n_plus_one_snapshots() {
    let store = edited_store(4);
    assert_eq!(store.history().index(), Some(4));
    assert_eq!(store.history().len(), 5);
    assert!(store.can_undo());
    assert!(!store.can_redo());
}

#[test]
fn undo_all_then_redo_all_round_trips() {
    let mut store = FormStore::new();
    store.create_form("Survey", None);
    let created = store.current_form().cloned().expect("created");
    let step_id = created.steps[0].id.clone();

    store.add_step();
    store.add_field(&step_id, FieldDraft::new(FieldType::Email, "Email"));
    store.update_current_form(&FormMetaPatch {
        title: Some("Renamed".into()),
        ..Default::default()
    });
    let latest = store.current_form().cloned().expect("latest");

    for _ in 0..3 {
        assert!(store.undo());
    }
    assert!(!store.undo());
    let undone = store.current_form().expect("current");
    assert_eq!(undone.steps, created.steps);
    assert_eq!(undone.title, "Survey");
    assert_eq!(store.form(&created.id), Some(undone));

    for _ in 0..3 {
        assert!(store.redo());
    }
    assert!(!store.redo());
    assert_eq!(store.current_form(), Some(&latest));
    assert_eq!(store.form(&latest.id), Some(&latest));
}

#[test]
fn edit_after_undo_discards_redo_branch() {
    let mut store = edited_store(2);
    assert!(store.undo());
    assert!(store.can_redo());

    assert!(store.update_current_form(&FormMetaPatch {
        title: Some("Branch".into()),
        ..Default::default()
    }));
    assert!(!store.can_redo());
    assert!(!store.redo());

    let form = store.current_form().expect("current");
    assert_eq!(form.title, "Branch");
    assert_eq!(form.steps.len(), 2);
    assert_eq!(store.history().len(), 3);
    assert_eq!(store.history().index(), Some(2));
}

#[test]
fn undo_and_redo_do_not_record() {
    let mut store = edited_store(2);
    store.undo();
    store.redo();
    store.undo();
    assert_eq!(store.history().len(), 3);
    assert_eq!(store.history().index(), Some(1));
}

#[test]
fn opening_a_form_resets_history() {
    let mut store = edited_store(3);
    let first_id = store.current_form().expect("current").id.clone();

    let template = find_template("contact-form").expect("template");
    store.load_template(&template);
    assert_eq!(store.history().len(), 1);
    assert!(!store.can_undo());

    store.load_form(&first_id).expect("stored form");
    assert_eq!(store.history().len(), 1);
    assert_eq!(store.history().index(), Some(0));
    assert_eq!(
        store.current_form().map(|form| form.steps.len()),
        Some(4)
    );

    store.set_current_form(None);
    assert_eq!(store.history().index(), None);
    assert!(!store.can_undo());
    assert!(!store.can_redo());
}

#[test]
fn deleting_the_current_form_clears_session() {
    let mut store = edited_store(1);
    let id = store.current_form().expect("current").id.clone();
    assert!(store.delete_form(&id));
    assert!(store.current_form().is_none());
    assert!(store.history().is_empty());
    assert!(!store.delete_form(&id));
}

#[test]
fn scripted_commands_replay_with_undo_and_redo() {
    let mut store = FormStore::new();
    store.create_form("Scripted", None);
    let step_id = store.current_form().expect("form").steps[0].id.clone();

    let script: Vec<EditCommand> = serde_json::from_value(serde_json::json!([
        { "op": "add_field", "step_id": step_id, "field": { "type": "text", "label": "Name" } },
        { "op": "update_meta", "title": "Scripted form" },
        { "op": "undo" },
        { "op": "redo" },
        { "op": "delete_step", "step_id": step_id },
        { "op": "update_step", "step_id": step_id, "title": "Intro" }
    ]))
    .expect("script");

    let applied: Vec<bool> = script.iter().map(|command| command.apply(&mut store)).collect();
    assert_eq!(applied, vec![true, true, true, true, false, true]);

    let form = store.current_form().expect("form");
    assert_eq!(form.title, "Scripted form");
    assert_eq!(form.steps[0].title, "Intro");
    assert_eq!(form.steps[0].fields.len(), 1);
    assert_eq!(script[4].name(), "delete_step");
}
