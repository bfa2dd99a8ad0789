//! Bank statement import, matching, rules, and export.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::reconciliation::{
    Candidate, EntryStatus, EntryType, EntryUpdate, ImportReport, ImportedEntry, MatchTarget,
    NewBankStatement, RECONCILED_BY_AUTO, RECONCILED_BY_MANUAL, ReconciliationRule,
    ReconciliationSummary, StatementEntry, auto_match, learn_rule as propose_rule, rank_suggestions,
};
use crate::domain::types::{BankStatementId, StatementEntryId, TenantId};
use crate::dto::reconciliation::{CsvExport, LearnedRule, SuggestionsResponse, TitleSearchResponse};
use crate::forms::reconciliation::{
    CreateRuleForm, CreateRulePayload, ImportStatementForm, ImportStatementPayload,
    MatchEntryForm, MatchEntryPayload, SearchTitlesPayload, SearchTitlesQuery, SuggestionsQuery,
};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{AccessReader, ReconciliationReader, ReconciliationWriter};
use crate::services::{Actor, ServiceError, ServiceResult, ensure_permission};
use crate::statements;

pub const PERMISSION_VIEW: &str = "financial.bank_account.view";
pub const PERMISSION_UPDATE: &str = "financial.bank_account.update";

/// Candidates fetched around an entry's amount before scoring.
pub const SUGGESTION_POOL: i64 = 20;
/// Most titles returned by a manual search.
pub const TITLE_SEARCH_LIMIT: i64 = 20;

pub fn import_statement<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ImportStatementForm,
) -> ServiceResult<ImportReport>
where
    R: AccessReader + ReconciliationReader + ReconciliationWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_UPDATE)?;
    let payload = ImportStatementPayload::try_from(form)?;
    import_as(repo, actor, payload)
}

/// Imports an upload already read into memory.
pub fn import_payload<R>(
    repo: &R,
    user: &AuthenticatedUser,
    payload: ImportStatementPayload,
) -> ServiceResult<ImportReport>
where
    R: AccessReader + ReconciliationReader + ReconciliationWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_UPDATE)?;
    import_as(repo, actor, payload)
}

/// Parses a statement, reconciles what it can, and stores the result.
///
/// Entries are first auto-matched against open titles, each title claimed by
/// one entry at most; the rest go through the tenant's rules, first match
/// wins. Outcomes are decided before anything
/// is written so the statement lands in a single repository call.
fn import_as<R>(
    repo: &R,
    actor: Actor,
    payload: ImportStatementPayload,
) -> ServiceResult<ImportReport>
where
    R: ReconciliationReader + ReconciliationWriter + ?Sized,
{
    let now = Utc::now().naive_utc();

    let format = statements::detect_format(&payload.content, Some(&payload.filename));
    let parsed = statements::parse(format, &payload.content, now.date())?;
    if parsed.is_empty() {
        return Err(ServiceError::Form(format!(
            "no transactions found in {} ({format})",
            payload.filename
        )));
    }

    let rules = repo.list_reconciliation_rules(actor.tenant_id)?;
    let mut receivables: Option<Vec<Candidate>> = None;
    let mut payables: Option<Vec<Candidate>> = None;
    let mut auto_matched = 0;
    let mut rules_applied = 0;
    let mut entries = Vec::with_capacity(parsed.len());

    for entry in parsed {
        let target = MatchTarget::for_entry(EntryType::of_amount(entry.amount));
        let pool = match target {
            MatchTarget::Receivable => &mut receivables,
            MatchTarget::Payable => &mut payables,
        };
        if pool.is_none() {
            *pool = Some(repo.list_open_titles(actor.tenant_id, target)?);
        }
        let candidates = pool.get_or_insert_with(Vec::new);
        let amount = entry.amount.abs();

        let resolution = if let Some(title_id) =
            auto_match(entry.date, amount, candidates).map(|c| c.id)
        {
            candidates.retain(|c| c.id != title_id);
            auto_matched += 1;
            Some(EntryUpdate {
                status: Some(EntryStatus::Matched),
                matched: Some(Some((target, title_id))),
                reconciled_by: Some(RECONCILED_BY_AUTO.to_string()),
                reconciled_at: Some(now),
                ..Default::default()
            })
        } else if let Some(rule) = rules
            .iter()
            .find(|rule| rule.matches(&entry.description, amount))
        {
            rules_applied += 1;
            Some(rule.outcome(now))
        } else {
            None
        };

        entries.push(ImportedEntry {
            parsed: entry,
            resolution,
        });
    }

    let (statement, stored) = repo.import_bank_statement(&NewBankStatement {
        tenant_id: actor.tenant_id,
        bank_account_id: payload.bank_account_id,
        filename: payload.filename,
        format,
        created_by: Some(actor.user_id),
        entries,
    })?;
    let duplicates = stored.iter().filter(|e| e.possible_duplicate).count();

    log::info!(
        "Imported {} ({format}): {} entries, {duplicates} possible duplicates, \
         {auto_matched} auto-matched, {rules_applied} by rules",
        statement.filename,
        statement.total_entries
    );

    Ok(ImportReport {
        statement,
        duplicates,
        auto_matched,
        rules_applied,
    })
}

fn load_entry<R>(repo: &R, entry_id: i32, tenant_id: TenantId) -> ServiceResult<StatementEntry>
where
    R: ReconciliationReader + ?Sized,
{
    repo.get_statement_entry(StatementEntryId::new(entry_id)?, tenant_id)?
        .ok_or(ServiceError::NotFound)
}

/// Open titles near the entry's amount, best score first.
pub fn suggestions<R>(
    repo: &R,
    user: &AuthenticatedUser,
    entry_id: i32,
    query: SuggestionsQuery,
) -> ServiceResult<SuggestionsResponse>
where
    R: AccessReader + ReconciliationReader + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_VIEW)?;
    let entry = load_entry(repo, entry_id, actor.tenant_id)?;

    let candidates = repo.list_titles_near_amount(
        actor.tenant_id,
        MatchTarget::for_entry(entry.entry_type),
        entry.amount,
        SUGGESTION_POOL,
    )?;

    Ok(SuggestionsResponse {
        entry_id: entry.id.get(),
        suggestions: rank_suggestions(&entry, candidates, query.limit()),
    })
}

pub fn match_entry<R>(
    repo: &R,
    user: &AuthenticatedUser,
    entry_id: i32,
    form: MatchEntryForm,
) -> ServiceResult<StatementEntry>
where
    R: AccessReader + ReconciliationReader + ReconciliationWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_UPDATE)?;
    let payload = MatchEntryPayload::try_from(form)?;
    let entry = load_entry(repo, entry_id, actor.tenant_id)?;

    if !repo.title_exists(actor.tenant_id, payload.target, payload.id)? {
        return Err(ServiceError::Form(format!(
            "{} {} does not exist",
            payload.target, payload.id
        )));
    }

    Ok(repo.update_statement_entry(
        entry.id,
        &EntryUpdate {
            status: Some(EntryStatus::Matched),
            matched: Some(Some((payload.target, payload.id))),
            reconciled_by: Some(RECONCILED_BY_MANUAL.to_string()),
            reconciled_at: Some(Utc::now().naive_utc()),
            ..Default::default()
        },
    )?)
}

/// Returns a matched entry to pending.
pub fn unmatch_entry<R>(
    repo: &R,
    user: &AuthenticatedUser,
    entry_id: i32,
) -> ServiceResult<StatementEntry>
where
    R: AccessReader + ReconciliationReader + ReconciliationWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_UPDATE)?;
    let entry = load_entry(repo, entry_id, actor.tenant_id)?;
    if entry.status != EntryStatus::Matched {
        return Err(ServiceError::Conflict(format!(
            "entry {} is {}, not matched",
            entry.id, entry.status
        )));
    }

    Ok(repo.update_statement_entry(
        entry.id,
        &EntryUpdate {
            status: Some(EntryStatus::Pending),
            matched: Some(None),
            ..Default::default()
        },
    )?)
}

pub fn ignore_entry<R>(
    repo: &R,
    user: &AuthenticatedUser,
    entry_id: i32,
) -> ServiceResult<StatementEntry>
where
    R: AccessReader + ReconciliationReader + ReconciliationWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_UPDATE)?;
    let entry = load_entry(repo, entry_id, actor.tenant_id)?;

    Ok(repo.update_statement_entry(
        entry.id,
        &EntryUpdate {
            status: Some(EntryStatus::Ignored),
            matched: Some(None),
            ..Default::default()
        },
    )?)
}

/// Rule proposal from a matched entry. Nothing is stored.
pub fn learn_rule<R>(
    repo: &R,
    user: &AuthenticatedUser,
    entry_id: i32,
) -> ServiceResult<LearnedRule>
where
    R: AccessReader + ReconciliationReader + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_VIEW)?;
    let entry = load_entry(repo, entry_id, actor.tenant_id)?;

    Ok(LearnedRule {
        rule: propose_rule(&entry),
    })
}

pub fn summary<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<ReconciliationSummary>
where
    R: AccessReader + ReconciliationReader + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_VIEW)?;
    Ok(repo.reconciliation_summary(actor.tenant_id)?)
}

#[derive(Serialize)]
struct ExportRow<'a> {
    date: NaiveDate,
    description: &'a str,
    #[serde(rename = "type")]
    entry_type: &'a str,
    amount: Decimal,
    status: &'a str,
    matched_to: Option<String>,
    possible_duplicate: bool,
    category: Option<&'a str>,
    reconciled_by: Option<&'a str>,
}

impl<'a> From<&'a StatementEntry> for ExportRow<'a> {
    fn from(entry: &'a StatementEntry) -> Self {
        Self {
            date: entry.entry_date,
            description: &entry.description,
            entry_type: entry.entry_type.as_str(),
            amount: entry.amount,
            status: entry.status.as_str(),
            matched_to: entry
                .matched_type
                .zip(entry.matched_id)
                .map(|(target, id)| format!("{target} #{id}")),
            possible_duplicate: entry.possible_duplicate,
            category: entry.category.as_deref(),
            reconciled_by: entry.reconciled_by.as_deref(),
        }
    }
}

/// CSV with one row per entry of the statement, in date order.
pub fn export_statement<R>(
    repo: &R,
    user: &AuthenticatedUser,
    statement_id: i32,
) -> ServiceResult<CsvExport>
where
    R: AccessReader + ReconciliationReader + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_VIEW)?;
    let statement = repo
        .get_bank_statement(BankStatementId::new(statement_id)?, actor.tenant_id)?
        .ok_or(ServiceError::NotFound)?;
    let entries = repo.list_statement_entries(statement.id)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in &entries {
        writer
            .serialize(ExportRow::from(entry))
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    let content = String::from_utf8(bytes).map_err(|e| ServiceError::Internal(e.to_string()))?;

    let stem = statement
        .filename
        .rsplit_once('.')
        .map_or(statement.filename.as_str(), |(stem, _)| stem);

    Ok(CsvExport {
        filename: format!("conciliacao-{stem}.csv"),
        content,
    })
}

/// Open titles for manual matching, latest due date first.
pub fn search_titles<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SearchTitlesQuery,
) -> ServiceResult<TitleSearchResponse>
where
    R: AccessReader + ReconciliationReader + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_VIEW)?;
    let payload = SearchTitlesPayload::try_from(query)?;

    Ok(TitleSearchResponse {
        titles: repo.search_open_titles(
            actor.tenant_id,
            payload.target,
            &payload.query,
            TITLE_SEARCH_LIMIT,
        )?,
    })
}

pub fn create_rule<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateRuleForm,
) -> ServiceResult<ReconciliationRule>
where
    R: AccessReader + ReconciliationReader + ReconciliationWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_UPDATE)?;
    let payload = CreateRulePayload::try_from(form)?;

    if let Some((target, id)) = payload.target {
        if !repo.title_exists(actor.tenant_id, target, id)? {
            return Err(ServiceError::Form(format!("{target} {id} does not exist")));
        }
    }

    let rule = repo.create_reconciliation_rule(&payload.into_domain(actor.tenant_id))?;
    log::info!("Created reconciliation rule {} ({})", rule.id, rule.name);

    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reconciliation::{
        BankStatement, MatchField, MatchOperator, RuleAction, StatementFormat,
    };
    use crate::domain::types::ReconciliationRuleId;
    use crate::repository::errors::RepositoryError;
    use crate::services::test_support::*;

    const OFX: &str = "<OFX><BANKTRANLIST>\
        <STMTTRN><TRNTYPE>CREDIT<DTPOSTED>20260410<TRNAMT>1500.00<MEMO>PIX RECEBIDO CLIENTE ACME</STMTTRN>\
        <STMTTRN><TRNTYPE>DEBIT<DTPOSTED>20260411<TRNAMT>-12.90<MEMO>TARIFA PACOTE SERVICOS</STMTTRN>\
        </BANKTRANLIST></OFX>";

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, day).expect("valid date")
    }

    fn statement(total: i32) -> BankStatement {
        BankStatement {
            id: BankStatementId::new(1).expect("valid id"),
            tenant_id: TenantId::new(TENANT).expect("valid id"),
            bank_account_id: None,
            filename: "extrato.ofx".to_string(),
            format: StatementFormat::Ofx,
            imported_at: now(),
            created_by: None,
            total_entries: total,
            matched_entries: 0,
        }
    }

    fn entry(id: i32, description: &str, amount: Decimal, day: u32) -> StatementEntry {
        StatementEntry {
            id: StatementEntryId::new(id).expect("valid id"),
            bank_statement_id: BankStatementId::new(1).expect("valid id"),
            tenant_id: TenantId::new(TENANT).expect("valid id"),
            entry_date: date(day),
            description: description.to_string(),
            amount: amount.abs(),
            entry_type: EntryType::of_amount(amount),
            status: EntryStatus::Pending,
            matched_type: None,
            matched_id: None,
            possible_duplicate: false,
            category: None,
            rule_id: None,
            reconciled_by: None,
            reconciled_at: None,
        }
    }

    fn receivable(id: i32, amount: Decimal, day: u32) -> Candidate {
        Candidate {
            target: MatchTarget::Receivable,
            id,
            description: "Fatura OS-000001".to_string(),
            amount,
            due_date: date(day),
            customer: Some("ACME Ltda".to_string()),
        }
    }

    fn fee_rule() -> ReconciliationRule {
        ReconciliationRule {
            id: ReconciliationRuleId::new(3).expect("valid id"),
            tenant_id: TenantId::new(TENANT).expect("valid id"),
            name: "Tarifas".to_string(),
            match_field: MatchField::Description,
            match_operator: MatchOperator::Contains,
            match_value: Some("tarifa".to_string()),
            match_amount_min: None,
            match_amount_max: None,
            action: RuleAction::Categorize,
            target_type: None,
            target_id: None,
            category: Some("Tarifas bancárias".to_string()),
            priority: 1,
            is_active: true,
            times_applied: 0,
        }
    }

    fn applied(update: &EntryUpdate, id: StatementEntryId) -> StatementEntry {
        let mut stored = entry(id.get(), "x", Decimal::ONE, 10);
        if let Some(status) = update.status {
            stored.status = status;
        }
        if let Some(matched) = update.matched {
            stored.matched_type = matched.map(|(t, _)| t);
            stored.matched_id = matched.map(|(_, i)| i);
        }
        stored
    }

    #[test]
    fn import_decides_matches_and_rules_before_storing() {
        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_list_open_titles()
            .withf(|_, target| *target == MatchTarget::Receivable)
            .times(1)
            .returning(|_, _| Ok(vec![receivable(21, Decimal::new(150002, 2), 12)]));
        repo.expect_list_open_titles()
            .withf(|_, target| *target == MatchTarget::Payable)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        repo.expect_list_reconciliation_rules()
            .returning(|_| Ok(vec![fee_rule()]));
        repo.expect_import_bank_statement()
            .times(1)
            .returning(|new| {
                assert_eq!(new.format, StatementFormat::Ofx);
                assert_eq!(new.entries.len(), 2);

                let credit = new.entries[0].resolution.as_ref().expect("auto-matched");
                assert_eq!(credit.matched, Some(Some((MatchTarget::Receivable, 21))));
                assert_eq!(credit.reconciled_by.as_deref(), Some(RECONCILED_BY_AUTO));

                let fee = new.entries[1].resolution.as_ref().expect("rule applied");
                assert_eq!(fee.category, Some(Some("Tarifas bancárias".to_string())));
                assert_eq!(fee.rule_id.map(ReconciliationRuleId::get), Some(3));
                Ok((
                    statement(2),
                    vec![
                        entry(1, "PIX RECEBIDO CLIENTE ACME", Decimal::new(150000, 2), 10),
                        entry(2, "TARIFA PACOTE SERVICOS", Decimal::new(-1290, 2), 11),
                    ],
                ))
            });
        repo.expect_update_statement_entry().never();

        let payload = ImportStatementPayload::new(Some("extrato.ofx"), OFX.as_bytes(), None)
            .expect("valid upload");
        let report = import_payload(&repo, &user(), payload).expect("imported");

        assert_eq!(report.auto_matched, 1);
        assert_eq!(report.rules_applied, 1);
        assert_eq!(report.duplicates, 0);
    }

    #[test]
    fn a_title_is_claimed_by_one_entry_only() {
        const TWO_CREDITS: &str = "<OFX><BANKTRANLIST>\
            <STMTTRN><TRNTYPE>CREDIT<DTPOSTED>20260410<TRNAMT>1500.00<MEMO>PIX ACME PARCELA 1</STMTTRN>\
            <STMTTRN><TRNTYPE>CREDIT<DTPOSTED>20260411<TRNAMT>1500.00<MEMO>PIX ACME PARCELA 2</STMTTRN>\
            </BANKTRANLIST></OFX>";

        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_list_open_titles()
            .times(1)
            .returning(|_, _| Ok(vec![receivable(21, Decimal::new(150000, 2), 12)]));
        repo.expect_list_reconciliation_rules()
            .returning(|_| Ok(Vec::new()));
        repo.expect_import_bank_statement().returning(|new| {
            let resolutions: Vec<_> = new
                .entries
                .iter()
                .map(|e| e.resolution.as_ref().and_then(|r| r.matched))
                .collect();
            assert_eq!(resolutions, vec![Some(Some((MatchTarget::Receivable, 21))), None]);
            Ok((statement(2), Vec::new()))
        });

        let payload =
            ImportStatementPayload::new(Some("extrato.ofx"), TWO_CREDITS.as_bytes(), None)
                .expect("valid upload");
        let report = import_payload(&repo, &user(), payload).expect("imported");

        assert_eq!(report.auto_matched, 1);
        assert_eq!(report.rules_applied, 0);
    }

    #[test]
    fn failed_import_writes_nothing_else() {
        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_list_open_titles()
            .returning(|_, _| Ok(vec![receivable(21, Decimal::new(150000, 2), 10)]));
        repo.expect_list_reconciliation_rules()
            .returning(|_| Ok(vec![fee_rule()]));
        repo.expect_import_bank_statement().times(1).returning(|_| {
            Err(RepositoryError::ConstraintViolation(
                "foreign key: FOREIGN KEY constraint failed".to_string(),
            ))
        });
        repo.expect_update_statement_entry().never();

        let payload = ImportStatementPayload::new(Some("extrato.ofx"), OFX.as_bytes(), None)
            .expect("valid upload");

        assert!(matches!(
            import_payload(&repo, &user(), payload),
            Err(ServiceError::Repository(RepositoryError::ConstraintViolation(_)))
        ));
    }

    #[test]
    fn empty_statement_is_rejected() {
        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_import_bank_statement().never();

        let payload = ImportStatementPayload::new(Some("extrato.ofx"), b"<OFX></OFX>", None)
            .expect("valid upload");

        assert!(matches!(
            import_payload(&repo, &user(), payload),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn suggestions_are_ranked_and_limited() {
        let mut repo = repo_granting(&[PERMISSION_VIEW]);
        repo.expect_get_statement_entry().returning(|id, _| {
            Ok(Some(entry(id.get(), "Fatura OS-000001", Decimal::from(1000), 10)))
        });
        repo.expect_list_titles_near_amount()
            .withf(|_, target, amount, limit| {
                *target == MatchTarget::Receivable
                    && *amount == Decimal::from(1000)
                    && *limit == SUGGESTION_POOL
            })
            .returning(|_, _, _, _| {
                Ok(vec![
                    receivable(1, Decimal::from(900), 25),
                    receivable(2, Decimal::from(1000), 10),
                    receivable(3, Decimal::from(1100), 12),
                ])
            });

        let response = suggestions(&repo, &user(), 4, SuggestionsQuery { limit: Some(2) })
            .expect("suggested");

        assert_eq!(response.suggestions.len(), 2);
        assert_eq!(response.suggestions[0].candidate.id, 2);
    }

    #[test]
    fn manual_match_requires_existing_title() {
        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_get_statement_entry()
            .returning(|id, _| Ok(Some(entry(id.get(), "PIX", Decimal::from(10), 10))));
        repo.expect_title_exists().returning(|_, _, _| Ok(false));
        repo.expect_update_statement_entry().never();

        let form = MatchEntryForm {
            matched_type: "receivable".to_string(),
            matched_id: 99,
        };

        assert!(matches!(
            match_entry(&repo, &user(), 1, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn only_matched_entries_can_be_unmatched() {
        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_get_statement_entry()
            .returning(|id, _| Ok(Some(entry(id.get(), "PIX", Decimal::from(10), 10))));
        repo.expect_update_statement_entry().never();

        assert!(matches!(
            unmatch_entry(&repo, &user(), 1),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn ignoring_clears_the_match() {
        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_get_statement_entry()
            .returning(|id, _| Ok(Some(entry(id.get(), "PIX", Decimal::from(10), 10))));
        repo.expect_update_statement_entry()
            .withf(|_, update| {
                update.status == Some(EntryStatus::Ignored) && update.matched == Some(None)
            })
            .times(1)
            .returning(|id, update| Ok(applied(update, id)));

        let entry = ignore_entry(&repo, &user(), 1).expect("ignored");

        assert_eq!(entry.status, EntryStatus::Ignored);
    }

    #[test]
    fn export_writes_one_row_per_entry() {
        let mut repo = repo_granting(&[PERMISSION_VIEW]);
        repo.expect_get_bank_statement()
            .returning(|_, _| Ok(Some(statement(2))));
        repo.expect_list_statement_entries().returning(|_| {
            let mut matched = entry(1, "PIX RECEBIDO", Decimal::new(150000, 2), 10);
            matched.status = EntryStatus::Matched;
            matched.matched_type = Some(MatchTarget::Receivable);
            matched.matched_id = Some(21);
            Ok(vec![
                matched,
                entry(2, "TARIFA", Decimal::new(-1290, 2), 11),
            ])
        });

        let export = export_statement(&repo, &user(), 1).expect("exported");
        let lines: Vec<&str> = export.content.lines().collect();

        assert_eq!(export.filename, "conciliacao-extrato.csv");
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,description,type,amount,status,matched_to"));
        assert!(lines[1].contains("receivable #21"));
        assert!(lines[2].contains("debit"));
    }

    #[test]
    fn rule_targets_must_exist() {
        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_title_exists().returning(|_, _, _| Ok(false));
        repo.expect_create_reconciliation_rule().never();

        let form = CreateRuleForm {
            name: "Aluguel".to_string(),
            match_field: "description".to_string(),
            match_operator: "starts_with".to_string(),
            match_value: Some("aluguel".to_string()),
            match_amount_min: None,
            match_amount_max: None,
            action: "match_payable".to_string(),
            target_id: Some(40),
            category: None,
            priority: 5,
        };

        assert!(matches!(
            create_rule(&repo, &user(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn learned_rule_needs_a_matched_entry() {
        let mut repo = repo_granting(&[PERMISSION_VIEW]);
        repo.expect_get_statement_entry()
            .returning(|id, _| Ok(Some(entry(id.get(), "PIX", Decimal::from(10), 10))));

        let learned = learn_rule(&repo, &user(), 1).expect("evaluated");

        assert!(learned.rule.is_none());
    }
}
