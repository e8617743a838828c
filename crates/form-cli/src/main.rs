mod wizard;

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use form_spec::{
    Answers, DEFAULT_NAMESPACE, DEFAULT_PAGE_SIZE, EditCommand, FieldDraft, FieldOption,
    FieldType, FileStore, Form, FormStore, PreviewMode, RuleKind, StepErrors, StepPatch,
    SubmitError, ValidationResult, answers_schema, builtin_template_ids, builtin_templates,
    find_template, form_document_schema, load_state, render_form_json, render_form_text,
    render_response_text, render_responses_json, save_state, validate_form, validate_step,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wizard::{FillPresenter, Verbosity};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const STATE_ENV: &str = "FORM_BUILDER_STATE";
const DEFAULT_STATE_FILE: &str = "form-builder-storage.json";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Multi-step form builder",
    long_about = "Builds multi-step forms, validates and collects answers, and lists responses. State is kept in a local JSON file."
)]
struct Cli {
    /// State file (defaults to FORM_BUILDER_STATE or ./form-builder-storage.json).
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,
    /// Key under which the form state is stored.
    #[arg(
        long,
        global = true,
        env = "FORM_BUILDER_NAMESPACE",
        default_value = DEFAULT_NAMESPACE
    )]
    namespace: String,
    /// Debug logging and extra detail while filling.
    #[arg(long, global = true, alias = "debug")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty form with a single step.
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List stored forms.
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print a form outline, or its preview payload with `--format json`.
    Show {
        form: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Viewport for the JSON preview (defaults to the stored preview mode).
        #[arg(long)]
        mode: Option<PreviewMode>,
    },
    /// Remove a form. Its responses are kept.
    Delete { form: String },
    /// List the bundled templates.
    Templates,
    /// List field types and the validation rules a field can carry.
    Palette,
    /// Create a form from a bundled template.
    FromTemplate { template: String },
    /// Append a step to a form.
    AddStep {
        form: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Append a field to a step.
    AddField {
        form: String,
        /// Step id or 1-based position.
        #[arg(long)]
        step: String,
        #[arg(long = "type", value_name = "TYPE", default_value = "text")]
        kind: FieldType,
        #[arg(long)]
        label: String,
        #[arg(long)]
        placeholder: Option<String>,
        #[arg(long)]
        help: Option<String>,
        /// Attach a `required` rule.
        #[arg(long)]
        required: bool,
        /// Option label for dropdown, radio and checkbox fields (repeatable).
        #[arg(long = "option", value_name = "LABEL")]
        options: Vec<String>,
    },
    /// Replay a JSON array of edit commands against a form in one session.
    Apply {
        form: String,
        #[arg(long, value_name = "SCRIPT")]
        script: PathBuf,
    },
    /// Validate an answers file against a form or one of its steps.
    Validate {
        form: String,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
        /// 1-based step to validate on its own.
        #[arg(long)]
        step: Option<usize>,
    },
    /// Validate and record an answers file as a response.
    Submit {
        form: String,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Fill a form interactively, one step at a time.
    Fill { form: String },
    /// Print the responses collected for a form.
    Responses {
        form: String,
        /// Print a single response.
        #[arg(long, value_name = "RESPONSE", conflicts_with = "page")]
        id: Option<String>,
        /// 1-based page; all responses when omitted.
        #[arg(long)]
        page: Option<usize>,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        per_page: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// JSON Schema for a form's answers, or for the form document when no form is given.
    Schema { form: Option<String> },
    /// Show or set the preview viewport.
    PreviewMode { mode: Option<PreviewMode> },
}

fn main() -> CliResult<()> {
    let Cli {
        state,
        namespace,
        verbose,
        command,
    } = Cli::parse();
    init_tracing(verbose);

    let verbosity = Verbosity::from_verbose(verbose);
    let open = || -> CliResult<Session> {
        Session::open(resolve_state_path(state.clone())?, namespace.clone())
    };

    match command {
        Command::Templates => run_templates(),
        Command::Palette => run_palette(),
        Command::New { title, description } => run_new(&mut open()?, &title, description),
        Command::List { format } => run_list(&open()?, format),
        Command::Show { form, format, mode } => run_show(&open()?, &form, format, mode),
        Command::Delete { form } => run_delete(&mut open()?, &form),
        Command::FromTemplate { template } => run_from_template(&mut open()?, &template),
        Command::AddStep { form, title } => run_add_step(&mut open()?, &form, title),
        Command::AddField {
            form,
            step,
            kind,
            label,
            placeholder,
            help,
            required,
            options,
        } => {
            let draft = FieldDraft {
                placeholder,
                help_text: help,
                options: Some(
                    options
                        .iter()
                        .map(|option| FieldOption::from_label(option))
                        .collect(),
                ),
                ..FieldDraft::new(kind, label)
            };
            run_add_field(&mut open()?, &form, &step, draft, required)
        }
        Command::Apply { form, script } => run_apply(&mut open()?, &form, &script),
        Command::Validate {
            form,
            answers,
            step,
        } => run_validate(&open()?, &form, &answers, step),
        Command::Submit { form, answers } => run_submit(&mut open()?, &form, &answers),
        Command::Fill { form } => run_fill(&mut open()?, &form, verbosity),
        Command::Responses {
            form,
            id,
            page,
            per_page,
            format,
        } => match id {
            Some(id) => run_response(&open()?, &form, &id, format),
            None => run_responses(&open()?, &form, page, per_page, format),
        },
        Command::Schema { form } => run_schema(&open()?, form.as_deref()),
        Command::PreviewMode { mode } => run_preview_mode(&mut open()?, mode),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn resolve_state_path(state: Option<PathBuf>) -> CliResult<PathBuf> {
    let candidate = match state {
        Some(path) => path,
        None => env::var_os(STATE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
    };
    if candidate.as_os_str().is_empty() {
        return Err("state path cannot be empty".into());
    }
    Ok(candidate)
}

/// One CLI invocation: the persisted store plus where it came from.
struct Session {
    kv: FileStore,
    namespace: String,
    store: FormStore,
}

impl Session {
    fn open(path: PathBuf, namespace: String) -> CliResult<Self> {
        let kv = FileStore::new(path);
        tracing::debug!(path = %kv.path().display(), namespace = %namespace, "loading state");
        let store = load_state(&kv, &namespace)?;
        Ok(Self {
            kv,
            namespace,
            store,
        })
    }

    fn save(&mut self) -> CliResult<()> {
        save_state(&self.store, &mut self.kv, &self.namespace)?;
        Ok(())
    }

    fn form(&self, form_id: &str) -> CliResult<&Form> {
        self.store
            .form(form_id)
            .ok_or_else(|| format!("form '{}' not found", form_id).into())
    }

    /// Makes `form_id` the form under edit.
    fn edit(&mut self, form_id: &str) -> CliResult<Form> {
        self.store
            .load_form(form_id)
            .cloned()
            .ok_or_else(|| format!("form '{}' not found", form_id).into())
    }
}

fn run_new(session: &mut Session, title: &str, description: Option<String>) -> CliResult<()> {
    let id = session.store.create_form(title, description.as_deref());
    session.save()?;
    println!("{}", id);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FormSummary<'a> {
    id: &'a str,
    title: &'a str,
    steps: usize,
    fields: usize,
    responses: usize,
    updated_at: i64,
}

fn run_list(session: &Session, format: OutputFormat) -> CliResult<()> {
    let summaries = session
        .store
        .forms()
        .iter()
        .map(|form| FormSummary {
            id: &form.id,
            title: &form.title,
            steps: form.steps.len(),
            fields: form.field_count(),
            responses: session.store.responses().count_for(&form.id),
            updated_at: form.updated_at,
        })
        .collect::<Vec<_>>();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Text => {
            if summaries.is_empty() {
                println!("No forms yet. Create one with `new` or `from-template`.");
            }
            for summary in &summaries {
                println!(
                    "{}  {}  ({} step(s), {} field(s), {} response(s))",
                    summary.id, summary.title, summary.steps, summary.fields, summary.responses
                );
            }
        }
    }
    Ok(())
}

fn run_show(
    session: &Session,
    form_id: &str,
    format: OutputFormat,
    mode: Option<PreviewMode>,
) -> CliResult<()> {
    let form = session.form(form_id)?;
    match format {
        OutputFormat::Text => println!("{}", render_form_text(form)),
        OutputFormat::Json => {
            let mode = mode.unwrap_or(session.store.preview_mode());
            println!(
                "{}",
                serde_json::to_string_pretty(&render_form_json(form, mode))?
            );
        }
    }
    Ok(())
}

fn run_delete(session: &mut Session, form_id: &str) -> CliResult<()> {
    if !session.store.delete_form(form_id) {
        return Err(format!("form '{}' not found", form_id).into());
    }
    session.save()?;
    println!("Deleted {}", form_id);
    Ok(())
}

fn run_templates() -> CliResult<()> {
    for template in builtin_templates() {
        let fields: usize = template
            .form
            .steps
            .iter()
            .map(|step| step.fields.len())
            .sum();
        println!(
            "{}  {}  ({} step(s), {} field(s))",
            template.id,
            template.name,
            template.form.steps.len(),
            fields
        );
        println!("    {}", template.description);
    }
    Ok(())
}

fn run_palette() -> CliResult<()> {
    println!("Field types:");
    for kind in FieldType::ALL {
        let note = if kind.supports_options() {
            "  (with options)"
        } else {
            ""
        };
        println!("  {:<9} {}{}", kind.as_str(), kind.label(), note);
    }
    println!("Validation rules:");
    for kind in RuleKind::ALL {
        let rule = kind.default_rule();
        let value = rule
            .value
            .map(|value| format!(" {}", value.as_text()))
            .unwrap_or_default();
        println!("  {}{}  -> {}", kind, value, rule.message);
    }
    Ok(())
}

fn run_from_template(session: &mut Session, template_id: &str) -> CliResult<()> {
    let template = find_template(template_id).ok_or_else(|| {
        format!(
            "unknown template '{}' (available: {})",
            template_id,
            builtin_template_ids().collect::<Vec<_>>().join(", ")
        )
    })?;
    let id = session.store.load_template(&template);
    session.save()?;
    println!("{}", id);
    Ok(())
}

fn run_add_step(session: &mut Session, form_id: &str, title: Option<String>) -> CliResult<()> {
    session.edit(form_id)?;
    let step_id = session
        .store
        .add_step()
        .ok_or("no form is open for editing")?;
    if let Some(title) = title {
        session.store.update_step(
            &step_id,
            &StepPatch {
                title: Some(title),
                ..StepPatch::default()
            },
        );
    }
    session.save()?;
    println!("{}", step_id);
    Ok(())
}

fn run_add_field(
    session: &mut Session,
    form_id: &str,
    step: &str,
    draft: FieldDraft,
    required: bool,
) -> CliResult<()> {
    let form = session.edit(form_id)?;
    let step_id = resolve_step(&form, step)?;
    let field_id = session
        .store
        .add_field(&step_id, draft)
        .ok_or_else(|| format!("step '{}' not found", step_id))?;
    if required {
        session
            .store
            .toggle_rule(&step_id, &field_id, RuleKind::Required, true);
    }
    session.save()?;
    println!("{}", field_id);
    Ok(())
}

/// Accepts a step id or a 1-based step position.
fn resolve_step(form: &Form, selector: &str) -> CliResult<String> {
    if let Some(step) = form.step(selector) {
        return Ok(step.id.clone());
    }
    selector
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| form.steps.get(index))
        .map(|step| step.id.clone())
        .ok_or_else(|| format!("step '{}' not found in form '{}'", selector, form.id).into())
}

fn run_apply(session: &mut Session, form_id: &str, script_path: &Path) -> CliResult<()> {
    let script = fs::read_to_string(script_path)?;
    let commands: Vec<EditCommand> = serde_json::from_str(&script)?;
    session.edit(form_id)?;

    let mut applied = 0;
    for command in &commands {
        let changed = command.apply(&mut session.store);
        if changed {
            applied += 1;
        }
        println!(
            "{}: {}",
            command.name(),
            if changed { "applied" } else { "no-op" }
        );
    }
    tracing::debug!(form_id, applied, total = commands.len(), "script replayed");
    session.save()?;
    Ok(())
}

fn read_answers(path: &Path) -> CliResult<Answers> {
    let contents = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    if !value.is_object() {
        return Err("answers file must contain a JSON object".into());
    }
    Ok(serde_json::from_value(value)?)
}

fn run_validate(
    session: &Session,
    form_id: &str,
    answers_path: &Path,
    step: Option<usize>,
) -> CliResult<()> {
    let form = session.form(form_id)?;
    let answers = read_answers(answers_path)?;

    let valid = match step {
        Some(position) => {
            let step = position
                .checked_sub(1)
                .and_then(|index| form.steps.get(index))
                .ok_or_else(|| format!("form has no step {}", position))?;
            let errors = validate_step(step, &answers);
            println!(
                "Step {} ({}): {}",
                position,
                step.title,
                if errors.is_empty() { "valid" } else { "invalid" }
            );
            describe_step_errors(form, &errors);
            errors.is_empty()
        }
        None => {
            let result = validate_form(form, &answers);
            println!(
                "Validation result: {}",
                if result.valid { "valid" } else { "invalid" }
            );
            describe_validation(form, &result);
            result.valid
        }
    };

    if valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn field_label<'a>(form: &'a Form, field_id: &'a str) -> &'a str {
    form.field(field_id)
        .map(|field| field.label.as_str())
        .unwrap_or(field_id)
}

fn describe_step_errors(form: &Form, errors: &StepErrors) {
    if errors.is_empty() {
        return;
    }
    println!("Errors:");
    for (field_id, message) in errors {
        println!("  {} ({}) - {}", field_label(form, field_id), field_id, message);
    }
}

fn describe_validation(form: &Form, result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!(
                "  {} ({}) - {}",
                field_label(form, &error.field_id),
                error.field_id,
                error.message
            );
        }
    }
    if !result.unknown_fields.is_empty() {
        println!(
            "Unknown answer fields: {}",
            result.unknown_fields.join(", ")
        );
    }
}

fn run_submit(session: &mut Session, form_id: &str, answers_path: &Path) -> CliResult<()> {
    let answers = read_answers(answers_path)?;
    match session.store.submit(form_id, answers) {
        Ok(response_id) => {
            session.save()?;
            println!("Response recorded: {}", response_id);
            Ok(())
        }
        Err(SubmitError::Invalid(result)) => {
            describe_validation(session.form(form_id)?, &result);
            Err(SubmitError::Invalid(result).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn run_fill(session: &mut Session, form_id: &str, verbosity: Verbosity) -> CliResult<()> {
    let form = session.form(form_id)?.clone();
    let presenter = FillPresenter::new(verbosity);
    let answers = wizard::collect_answers(&form, &mut io::stdin().lock(), &presenter)?;
    let response_id = session.store.submit(&form.id, answers.clone())?;
    session.save()?;
    presenter.show_completion(&response_id, &answers);
    Ok(())
}

fn run_responses(
    session: &Session,
    form_id: &str,
    page: Option<usize>,
    per_page: usize,
    format: OutputFormat,
) -> CliResult<()> {
    let form = session.form(form_id)?;
    let log = session.store.responses();
    let responses = match page {
        Some(page) => log.page(form_id, page, per_page),
        None => log.for_form(form_id),
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&render_responses_json(form, &responses))?
            );
        }
        OutputFormat::Text => {
            let total = log.count_for(form_id);
            println!("{}: {} response(s)", form.title, total);
            if let Some(page) = page {
                println!("Page {} of {}", page, log.page_count(form_id, per_page).max(1));
            }
            for response in &responses {
                println!();
                println!("{}", render_response_text(form, response));
            }
        }
    }
    Ok(())
}

fn run_response(
    session: &Session,
    form_id: &str,
    response_id: &str,
    format: OutputFormat,
) -> CliResult<()> {
    let form = session.form(form_id)?;
    let response = session
        .store
        .responses()
        .get(response_id)
        .filter(|response| response.form_id == form_id)
        .ok_or_else(|| format!("response '{}' not found for form '{}'", response_id, form_id))?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render_responses_json(form, &[response]))?
        ),
        OutputFormat::Text => println!("{}", render_response_text(form, response)),
    }
    Ok(())
}

fn run_schema(session: &Session, form_id: Option<&str>) -> CliResult<()> {
    let schema = match form_id {
        Some(form_id) => answers_schema(session.form(form_id)?),
        None => form_document_schema(),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn run_preview_mode(session: &mut Session, mode: Option<PreviewMode>) -> CliResult<()> {
    if let Some(mode) = mode {
        session.store.set_preview_mode(mode);
        session.save()?;
    }
    let mode = session.store.preview_mode();
    println!("{} ({})", mode.as_str(), mode.viewport_width());
    Ok(())
}
