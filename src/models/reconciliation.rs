//! Diesel models for bank statements, their entries, and matching rules.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::money;
use crate::domain::reconciliation::{
    BankStatement as DomainBankStatement, EntryUpdate, MatchTarget,
    NewReconciliationRule as DomainNewReconciliationRule, ParsedEntry,
    ReconciliationRule as DomainReconciliationRule, StatementEntry as DomainStatementEntry,
};
use crate::domain::types::{
    BankAccountId, BankStatementId, ReconciliationRuleId, StatementEntryId, TenantId,
    TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::bank_statements)]
pub struct BankStatement {
    pub id: i32,
    pub tenant_id: i32,
    pub bank_account_id: Option<i32>,
    pub filename: String,
    pub format: String,
    pub imported_at: NaiveDateTime,
    pub created_by: Option<i32>,
    pub total_entries: i32,
    pub matched_entries: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::bank_statements)]
pub struct NewBankStatement<'a> {
    pub tenant_id: i32,
    pub bank_account_id: Option<i32>,
    pub filename: &'a str,
    pub format: &'a str,
    pub imported_at: NaiveDateTime,
    pub created_by: Option<i32>,
    pub total_entries: i32,
    pub matched_entries: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::bank_statement_entries)]
pub struct StatementEntry {
    pub id: i32,
    pub bank_statement_id: i32,
    pub tenant_id: i32,
    pub entry_date: NaiveDate,
    pub description: String,
    pub amount_cents: i64,
    pub entry_type: String,
    pub status: String,
    pub matched_type: Option<String>,
    pub matched_id: Option<i32>,
    pub possible_duplicate: bool,
    pub category: Option<String>,
    pub rule_id: Option<i32>,
    pub reconciled_by: Option<String>,
    pub reconciled_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::bank_statement_entries)]
/// Entries are stored with their absolute amount and classified by sign.
pub struct NewStatementEntry<'a> {
    pub bank_statement_id: i32,
    pub tenant_id: i32,
    pub entry_date: NaiveDate,
    pub description: &'a str,
    pub amount_cents: i64,
    pub entry_type: &'a str,
    pub status: &'a str,
    pub possible_duplicate: bool,
}

impl<'a> NewStatementEntry<'a> {
    pub fn pending(
        statement_id: i32,
        tenant_id: i32,
        entry: &'a ParsedEntry,
    ) -> Result<Self, TypeConstraintError> {
        use crate::domain::reconciliation::{EntryStatus, EntryType};

        Ok(Self {
            bank_statement_id: statement_id,
            tenant_id,
            entry_date: entry.date,
            description: entry.description.as_str(),
            amount_cents: money::to_cents(entry.amount.abs())?,
            entry_type: EntryType::of_amount(entry.amount).as_str(),
            status: EntryStatus::Pending.as_str(),
            possible_duplicate: false,
        })
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::bank_statement_entries)]
/// Partial update of an entry; `None` fields are left untouched.
pub struct EntryChangeset<'a> {
    pub status: Option<&'a str>,
    pub matched_type: Option<Option<&'a str>>,
    pub matched_id: Option<Option<i32>>,
    pub category: Option<Option<&'a str>>,
    pub rule_id: Option<Option<i32>>,
    pub reconciled_by: Option<Option<&'a str>>,
    pub reconciled_at: Option<Option<NaiveDateTime>>,
    pub updated_at: NaiveDateTime,
}

impl<'a> EntryChangeset<'a> {
    pub fn new(update: &'a EntryUpdate, now: NaiveDateTime) -> Self {
        Self {
            status: update.status.map(|s| s.as_str()),
            matched_type: update
                .matched
                .map(|matched| matched.map(|(target, _)| target.as_str())),
            matched_id: update.matched.map(|matched| matched.map(|(_, id)| id)),
            category: update.category.as_ref().map(|c| c.as_deref()),
            rule_id: update.rule_id.map(|id| Some(id.get())),
            reconciled_by: update.reconciled_by.as_deref().map(Some),
            reconciled_at: update.reconciled_at.map(Some),
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::reconciliation_rules)]
pub struct ReconciliationRule {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub match_field: String,
    pub match_operator: String,
    pub match_value: Option<String>,
    pub match_amount_min_cents: Option<i64>,
    pub match_amount_max_cents: Option<i64>,
    pub rule_action: String,
    pub target_type: Option<String>,
    pub target_id: Option<i32>,
    pub category: Option<String>,
    pub priority: i32,
    pub is_active: bool,
    pub times_applied: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::reconciliation_rules)]
pub struct NewReconciliationRule<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub match_field: &'a str,
    pub match_operator: &'a str,
    pub match_value: Option<&'a str>,
    pub match_amount_min_cents: Option<i64>,
    pub match_amount_max_cents: Option<i64>,
    pub rule_action: &'a str,
    pub target_type: Option<&'a str>,
    pub target_id: Option<i32>,
    pub category: Option<&'a str>,
    pub priority: i32,
    pub is_active: bool,
}

impl TryFrom<BankStatement> for DomainBankStatement {
    type Error = TypeConstraintError;

    fn try_from(statement: BankStatement) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BankStatementId::try_from(statement.id)?,
            tenant_id: TenantId::try_from(statement.tenant_id)?,
            bank_account_id: statement
                .bank_account_id
                .map(BankAccountId::try_from)
                .transpose()?,
            filename: statement.filename,
            format: statement.format.parse()?,
            imported_at: statement.imported_at,
            created_by: statement.created_by.map(UserId::try_from).transpose()?,
            total_entries: statement.total_entries,
            matched_entries: statement.matched_entries,
        })
    }
}

impl TryFrom<StatementEntry> for DomainStatementEntry {
    type Error = TypeConstraintError;

    fn try_from(entry: StatementEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StatementEntryId::try_from(entry.id)?,
            bank_statement_id: BankStatementId::try_from(entry.bank_statement_id)?,
            tenant_id: TenantId::try_from(entry.tenant_id)?,
            entry_date: entry.entry_date,
            description: entry.description,
            amount: money::from_cents(entry.amount_cents),
            entry_type: entry.entry_type.parse()?,
            status: entry.status.parse()?,
            matched_type: entry
                .matched_type
                .as_deref()
                .and_then(MatchTarget::normalize),
            matched_id: entry.matched_id,
            possible_duplicate: entry.possible_duplicate,
            category: entry.category,
            rule_id: entry.rule_id.map(ReconciliationRuleId::try_from).transpose()?,
            reconciled_by: entry.reconciled_by,
            reconciled_at: entry.reconciled_at,
        })
    }
}

impl TryFrom<ReconciliationRule> for DomainReconciliationRule {
    type Error = TypeConstraintError;

    fn try_from(rule: ReconciliationRule) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReconciliationRuleId::try_from(rule.id)?,
            tenant_id: TenantId::try_from(rule.tenant_id)?,
            name: rule.name,
            match_field: rule.match_field.parse()?,
            match_operator: rule.match_operator.parse()?,
            match_value: rule.match_value,
            match_amount_min: rule.match_amount_min_cents.map(money::from_cents),
            match_amount_max: rule.match_amount_max_cents.map(money::from_cents),
            action: rule.rule_action.parse()?,
            target_type: rule.target_type.as_deref().and_then(MatchTarget::normalize),
            target_id: rule.target_id,
            category: rule.category,
            priority: rule.priority,
            is_active: rule.is_active,
            times_applied: rule.times_applied,
        })
    }
}

impl<'a> From<&'a DomainNewReconciliationRule> for NewReconciliationRule<'a> {
    fn from(rule: &'a DomainNewReconciliationRule) -> Self {
        Self {
            tenant_id: rule.tenant_id.get(),
            name: rule.name.as_str(),
            match_field: rule.match_field.as_str(),
            match_operator: rule.match_operator.as_str(),
            match_value: rule.match_value.as_deref(),
            match_amount_min_cents: rule.match_amount_min.map(money::to_cents),
            match_amount_max_cents: rule.match_amount_max.map(money::to_cents),
            rule_action: rule.action.as_str(),
            target_type: rule.target_type.map(|t| t.as_str()),
            target_id: rule.target_id,
            category: rule.category.as_deref(),
            priority: rule.priority,
            is_active: true,
        }
    }
}
