//! DTOs for statement import, matching, and export.

use serde::Serialize;

use crate::domain::reconciliation::{Candidate, NewReconciliationRule, Suggestion};

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub entry_id: i32,
    pub suggestions: Vec<Suggestion>,
}

/// Proposed rule; `None` when the entry is not matched.
#[derive(Debug, Serialize)]
pub struct LearnedRule {
    pub rule: Option<NewReconciliationRule>,
}

#[derive(Debug, Serialize)]
pub struct TitleSearchResponse {
    pub titles: Vec<Candidate>,
}

/// CSV document ready to be sent as an attachment.
#[derive(Debug)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}
