use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::domain::money;
use crate::domain::reconciliation::{
    DEFAULT_SUGGESTIONS, MatchField, MatchOperator, MatchTarget, NewReconciliationRule, RuleAction,
};
use crate::domain::types::{BankAccountId, TenantId};
use crate::forms::{FormError, id_error};

/// Most suggestions a caller may request for one entry.
pub const MAX_SUGGESTIONS: usize = 20;

/// Statement upload: OFX, CNAB 240 or CNAB 400.
#[derive(MultipartForm)]
pub struct ImportStatementForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
    pub bank_account_id: Option<Text<i32>>,
}

pub struct ImportStatementPayload {
    pub filename: String,
    pub content: String,
    pub bank_account_id: Option<BankAccountId>,
}

impl ImportStatementPayload {
    /// Bank files are often Latin-1; invalid UTF-8 is replaced rather than
    /// rejected since only ASCII columns are interpreted.
    pub fn new(
        filename: Option<&str>,
        bytes: &[u8],
        bank_account_id: Option<i32>,
    ) -> Result<Self, FormError> {
        let content = String::from_utf8_lossy(bytes).into_owned();
        if content.trim().is_empty() {
            return Err(FormError::Empty("statement file"));
        }

        Ok(Self {
            filename: filename
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or("extrato")
                .to_string(),
            content,
            bank_account_id: bank_account_id
                .map(BankAccountId::new)
                .transpose()
                .map_err(id_error("bank account id"))?,
        })
    }
}

impl TryFrom<ImportStatementForm> for ImportStatementPayload {
    type Error = FormError;

    fn try_from(form: ImportStatementForm) -> Result<Self, Self::Error> {
        let bytes = std::fs::read(form.file.file.path()).map_err(|e| {
            log::error!("Failed to read uploaded statement: {e}");
            FormError::UnreadableFile
        })?;
        Self::new(
            form.file.file_name.as_deref(),
            &bytes,
            form.bank_account_id.map(Text::into_inner),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct MatchEntryForm {
    pub matched_type: String,
    pub matched_id: i32,
}

pub struct MatchEntryPayload {
    pub target: MatchTarget,
    pub id: i32,
}

impl TryFrom<MatchEntryForm> for MatchEntryPayload {
    type Error = FormError;

    fn try_from(form: MatchEntryForm) -> Result<Self, Self::Error> {
        let target = MatchTarget::normalize(&form.matched_type)
            .ok_or_else(|| FormError::InvalidMatchTarget(form.matched_type.clone()))?;
        if form.matched_id <= 0 {
            return Err(FormError::InvalidId("matched id"));
        }
        Ok(Self {
            target,
            id: form.matched_id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsQuery {
    pub limit: Option<usize>,
}

impl SuggestionsQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_SUGGESTIONS)
            .clamp(1, MAX_SUGGESTIONS)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchTitlesQuery {
    #[serde(rename = "type")]
    pub target: String,
    #[serde(default)]
    pub q: String,
}

pub struct SearchTitlesPayload {
    pub target: MatchTarget,
    pub query: String,
}

impl TryFrom<SearchTitlesQuery> for SearchTitlesPayload {
    type Error = FormError;

    fn try_from(query: SearchTitlesQuery) -> Result<Self, Self::Error> {
        let target = MatchTarget::normalize(&query.target)
            .ok_or_else(|| FormError::InvalidMatchTarget(query.target.clone()))?;
        Ok(Self {
            target,
            query: query.q.trim().to_string(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRuleForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub match_field: String,
    pub match_operator: String,
    #[validate(length(max = 255))]
    pub match_value: Option<String>,
    pub match_amount_min: Option<Decimal>,
    pub match_amount_max: Option<Decimal>,
    pub action: String,
    pub target_id: Option<i32>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: i32,
}

pub struct CreateRulePayload {
    pub name: String,
    pub match_field: MatchField,
    pub match_operator: MatchOperator,
    pub match_value: Option<String>,
    pub match_amount_min: Option<Decimal>,
    pub match_amount_max: Option<Decimal>,
    pub action: RuleAction,
    pub target: Option<(MatchTarget, i32)>,
    pub category: Option<String>,
    pub priority: i32,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<CreateRuleForm> for CreateRulePayload {
    type Error = FormError;

    fn try_from(form: CreateRuleForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let match_field = form
            .match_field
            .parse::<MatchField>()
            .map_err(|e| FormError::InvalidRule(e.to_string()))?;
        let match_operator = form
            .match_operator
            .parse::<MatchOperator>()
            .map_err(|e| FormError::InvalidRule(e.to_string()))?;
        let action = form
            .action
            .parse::<RuleAction>()
            .map_err(|e| FormError::InvalidRule(e.to_string()))?;
        let match_value = non_blank(form.match_value);
        let category = non_blank(form.category);

        match match_field {
            MatchField::Description => {
                if !matches!(
                    match_operator,
                    MatchOperator::Contains
                        | MatchOperator::Equals
                        | MatchOperator::StartsWith
                        | MatchOperator::EndsWith
                ) {
                    return Err(FormError::InvalidRule(format!(
                        "operator {match_operator} does not apply to descriptions"
                    )));
                }
                if match_value.is_none() {
                    return Err(FormError::Empty("match value"));
                }
            }
            MatchField::Amount => {
                let (min, max) = (form.match_amount_min, form.match_amount_max);
                if min
                    .into_iter()
                    .chain(max)
                    .any(|amount| money::ensure_amount(amount).is_err())
                {
                    return Err(FormError::InvalidAmount);
                }
                let bounds_ok = match match_operator {
                    MatchOperator::Equals | MatchOperator::GreaterThan => min.is_some(),
                    MatchOperator::LessThan => max.is_some(),
                    MatchOperator::Between => min.zip(max).is_some_and(|(lo, hi)| lo <= hi),
                    _ => false,
                };
                if !bounds_ok {
                    return Err(FormError::InvalidRule(format!(
                        "operator {match_operator} needs valid amount bounds"
                    )));
                }
            }
        }

        let target = match action {
            RuleAction::MatchReceivable | RuleAction::MatchPayable => {
                let id = form
                    .target_id
                    .filter(|id| *id > 0)
                    .ok_or(FormError::InvalidId("target id"))?;
                let kind = if action == RuleAction::MatchReceivable {
                    MatchTarget::Receivable
                } else {
                    MatchTarget::Payable
                };
                Some((kind, id))
            }
            RuleAction::Categorize if category.is_none() => {
                return Err(FormError::Empty("category"));
            }
            RuleAction::Categorize | RuleAction::Ignore => None,
        };

        Ok(Self {
            name: form.name.trim().to_string(),
            match_field,
            match_operator,
            match_value,
            match_amount_min: form.match_amount_min,
            match_amount_max: form.match_amount_max,
            action,
            target,
            category,
            priority: form.priority,
        })
    }
}

impl CreateRulePayload {
    pub fn into_domain(self, tenant_id: TenantId) -> NewReconciliationRule {
        NewReconciliationRule {
            tenant_id,
            name: self.name,
            match_field: self.match_field,
            match_operator: self.match_operator,
            match_value: self.match_value,
            match_amount_min: self.match_amount_min,
            match_amount_max: self.match_amount_max,
            action: self.action,
            target_type: self.target.map(|(kind, _)| kind),
            target_id: self.target.map(|(_, id)| id),
            category: self.category,
            priority: self.priority,
        }
    }
}
