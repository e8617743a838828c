use std::io::{self, BufRead, Write};

use form_spec::{
    Answers, FieldType, Form, FormField, FormStep, StepErrors, validate_step, value_to_display,
};
use serde_json::{Number, Value, json};

use crate::CliResult;

/// Controls which bits of state the fill session prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: step headers and prompts only.
    Clean,
    /// Verbose output: field types, placeholders and the collected answers.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints the respondent-facing view of a form while it is being filled.
pub struct FillPresenter {
    verbosity: Verbosity,
}

impl FillPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn show_header(&self, form: &Form) {
        println!("Form: {}", form.title);
        if let Some(description) = form.description.as_ref().filter(|text| !text.is_empty()) {
            println!("{}", description);
        }
        println!("Type 'exit' to abort. Leave a line blank to skip a field.");
    }

    pub fn show_step(&self, position: usize, total: usize, step: &FormStep) {
        println!();
        println!("Step {}/{}: {}", position, total, step.title);
        if step.fields.is_empty() {
            println!("(nothing to answer on this step)");
        }
    }

    pub fn show_prompt(&self, field: &FormField) {
        let mut line = field.label.clone();
        if field.is_effectively_required() {
            line.push_str(" *");
        }
        if self.verbosity.is_verbose() {
            line.push_str(&format!(" [{}]", field.kind));
            if let Some(placeholder) = field.placeholder.as_ref().filter(|text| !text.is_empty())
            {
                line.push_str(&format!(" e.g. {}", placeholder));
            }
        } else if let Some(hint) = input_hint(field.kind) {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
        if let Some(help) = field.help_text.as_ref().filter(|text| !text.is_empty()) {
            println!("{}", help);
        }
        if field.kind.supports_options() {
            for (index, option) in field.options.iter().enumerate() {
                println!("  {}) {}", index + 1, option.label);
            }
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if let Some(debug) = &error.debug_message {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_step_errors(&self, step: &FormStep, errors: &StepErrors) {
        println!("Please fix the following before continuing:");
        for field in step.fields.iter().filter(|field| errors.contains_key(&field.id)) {
            println!("  {}: {}", field.label, errors[&field.id]);
        }
    }

    pub fn show_completion(&self, response_id: &str, answers: &Answers) {
        println!();
        println!("Response recorded: {}", response_id);
        if self.verbosity.is_verbose() {
            for (key, value) in answers {
                println!("  {} = {}", key, value_to_display(value));
            }
        }
    }
}

fn input_hint(kind: FieldType) -> Option<&'static str> {
    match kind {
        FieldType::Checkbox => Some("(comma separated)"),
        FieldType::Dropdown | FieldType::Radio => Some("(number or label)"),
        FieldType::Number => Some("(number)"),
        FieldType::Date => Some("(YYYY-MM-DD)"),
        FieldType::File => Some("(file name)"),
        _ => None,
    }
}

/// Walks the steps in order and only advances once a step validates.
/// Fields that failed are asked again; the others keep their answers.
pub fn collect_answers<R: BufRead>(
    form: &Form,
    input: &mut R,
    presenter: &FillPresenter,
) -> CliResult<Answers> {
    let mut answers = Answers::new();
    presenter.show_header(form);

    let total = form.steps.len();
    for (index, step) in form.steps.iter().enumerate() {
        presenter.show_step(index + 1, total, step);
        let mut pending: Vec<&FormField> = step.fields.iter().collect();
        loop {
            for field in &pending {
                match prompt_field(field, input, presenter)? {
                    Some(value) => {
                        answers.insert(field.id.clone(), value);
                    }
                    None => {
                        answers.remove(&field.id);
                    }
                }
            }
            let errors = validate_step(step, &answers);
            if errors.is_empty() {
                break;
            }
            tracing::debug!(step_id = %step.id, failed = errors.len(), "step blocked");
            presenter.show_step_errors(step, &errors);
            pending = step
                .fields
                .iter()
                .filter(|field| errors.contains_key(&field.id))
                .collect();
        }
    }

    Ok(answers)
}

fn prompt_field<R: BufRead>(
    field: &FormField,
    input: &mut R,
    presenter: &FillPresenter,
) -> CliResult<Option<Value>> {
    loop {
        presenter.show_prompt(field);
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err("input ended before the form was completed".into());
        }

        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") {
            return Err("fill aborted by user".into());
        }

        match parse_answer(field, trimmed) {
            Ok(value) => return Ok(value),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

/// Error surfaced when a typed answer cannot be coerced into the field's shape.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

/// Turns one line of input into an answer value. Blank input leaves the field unanswered.
pub fn parse_answer(field: &FormField, raw: &str) -> Result<Option<Value>, AnswerParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match field.kind {
        FieldType::Number => parse_number(raw).map(Some),
        FieldType::Checkbox => parse_choices(field, raw),
        FieldType::Dropdown | FieldType::Radio => {
            parse_choice(field, raw).map(|value| Some(Value::String(value)))
        }
        FieldType::File => Ok(Some(json!({ "name": raw }))),
        _ => Ok(Some(Value::String(raw.to_string()))),
    }
}

fn parse_number(raw: &str) -> Result<Value, AnswerParseError> {
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| {
            AnswerParseError::new("Please enter a number.", Some("finite number".to_string()))
        })
}

fn parse_choice(field: &FormField, raw: &str) -> Result<String, AnswerParseError> {
    if field.options.is_empty() {
        return Ok(raw.to_string());
    }
    if let Ok(position) = raw.parse::<usize>()
        && let Some(option) = position
            .checked_sub(1)
            .and_then(|index| field.options.get(index))
    {
        return Ok(option.value.clone());
    }
    field
        .options
        .iter()
        .find(|option| {
            option.label.eq_ignore_ascii_case(raw) || option.value.eq_ignore_ascii_case(raw)
        })
        .map(|option| option.value.clone())
        .ok_or_else(|| {
            let labels = field
                .options
                .iter()
                .map(|option| option.label.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            AnswerParseError::new(
                format!("'{}' is not one of the listed options.", raw),
                Some(format!("one of: {}", labels)),
            )
        })
}

fn parse_choices(field: &FormField, raw: &str) -> Result<Option<Value>, AnswerParseError> {
    let picked = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_choice(field, part).map(Value::String))
        .collect::<Result<Vec<_>, _>>()?;
    if picked.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Value::Array(picked)))
    }
}
