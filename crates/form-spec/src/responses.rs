use serde::{Deserialize, Serialize};

use crate::ids::{advance, new_id};
use crate::spec::{Answers, FormResponse};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Append-only log of submitted answer sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseLog {
    responses: Vec<FormResponse>,
}

impl ResponseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_responses(responses: Vec<FormResponse>) -> Self {
        Self { responses }
    }

    /// Records a response and returns its id.
    pub fn add(&mut self, form_id: &str, data: Answers) -> String {
        let last = self
            .responses
            .last()
            .map(|response| response.submitted_at)
            .unwrap_or(0);
        let response = FormResponse {
            id: new_id(),
            form_id: form_id.to_string(),
            data,
            submitted_at: advance(last),
        };
        let id = response.id.clone();
        self.responses.push(response);
        id
    }

    /// Responses of one form, oldest first.
    pub fn for_form(&self, form_id: &str) -> Vec<&FormResponse> {
        self.responses
            .iter()
            .filter(|response| response.form_id == form_id)
            .collect()
    }

    pub fn count_for(&self, form_id: &str) -> usize {
        self.responses
            .iter()
            .filter(|response| response.form_id == form_id)
            .count()
    }

    /// One-based page of a form's responses.
    pub fn page(&self, form_id: &str, page: usize, per_page: usize) -> Vec<&FormResponse> {
        if page == 0 || per_page == 0 {
            return Vec::new();
        }
        let Some(offset) = (page - 1).checked_mul(per_page) else {
            return Vec::new();
        };
        self.for_form(form_id)
            .into_iter()
            .skip(offset)
            .take(per_page)
            .collect()
    }

    pub fn page_count(&self, form_id: &str, per_page: usize) -> usize {
        if per_page == 0 {
            return 0;
        }
        self.count_for(form_id).div_ceil(per_page)
    }

    pub fn get(&self, response_id: &str) -> Option<&FormResponse> {
        self.responses
            .iter()
            .find(|response| response.id == response_id)
    }

    pub fn all(&self) -> &[FormResponse] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}
