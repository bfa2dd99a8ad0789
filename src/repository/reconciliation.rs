use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::{
    domain::{
        finance::OPEN_STATUSES,
        money,
        reconciliation::{
            BankStatement, Candidate, EntryStatus, EntryType, EntryUpdate, MatchTarget,
            NewBankStatement, NewReconciliationRule, ReconciliationRule, ReconciliationSummary,
            StatementEntry,
        },
        types::{BankAccountId, BankStatementId, StatementEntryId, TenantId, UserId},
    },
    models::reconciliation::{
        BankStatement as DbBankStatement, EntryChangeset, NewBankStatement as DbNewBankStatement,
        NewReconciliationRule as DbNewReconciliationRule, NewStatementEntry as DbNewStatementEntry,
        ReconciliationRule as DbReconciliationRule, StatementEntry as DbStatementEntry,
    },
    repository::{
        DieselRepository, ReconciliationReader, ReconciliationWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

/// Amount window, in cents, of a possible duplicate.
const DUPLICATE_WINDOW_CENTS: i64 = 1;

type TitleRow = (i32, String, i64, NaiveDate, Option<String>);

fn to_candidates(target: MatchTarget, rows: Vec<TitleRow>) -> Vec<Candidate> {
    rows.into_iter()
        .map(|(id, description, amount_cents, due_date, customer)| Candidate {
            target,
            id,
            description,
            amount: money::from_cents(amount_cents),
            due_date,
            customer,
        })
        .collect()
}

/// Open titles of `target` whose amount lies in `[min_cents, max_cents]`
/// (unbounded when `None`), earliest due first.
fn load_open_titles(
    conn: &mut SqliteConnection,
    tenant_id: TenantId,
    target: MatchTarget,
    range: Option<(i64, i64)>,
    limit: Option<i64>,
) -> QueryResult<Vec<Candidate>> {
    use crate::schema::{accounts_payable, accounts_receivable, customers};

    let rows = match target {
        MatchTarget::Receivable => {
            let mut query = accounts_receivable::table
                .left_join(customers::table)
                .filter(accounts_receivable::tenant_id.eq(tenant_id.get()))
                .filter(accounts_receivable::status.eq_any(OPEN_STATUSES))
                .filter(accounts_receivable::deleted_at.is_null())
                .select((
                    accounts_receivable::id,
                    accounts_receivable::description,
                    accounts_receivable::amount_cents,
                    accounts_receivable::due_date,
                    customers::name.nullable(),
                ))
                .order((accounts_receivable::due_date.asc(), accounts_receivable::id.asc()))
                .into_boxed();
            if let Some((min, max)) = range {
                query = query.filter(accounts_receivable::amount_cents.between(min, max));
            }
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            query.load::<TitleRow>(conn)?
        }
        MatchTarget::Payable => {
            let mut query = accounts_payable::table
                .filter(accounts_payable::tenant_id.eq(tenant_id.get()))
                .filter(accounts_payable::status.eq_any(OPEN_STATUSES))
                .filter(accounts_payable::deleted_at.is_null())
                .select((
                    accounts_payable::id,
                    accounts_payable::description,
                    accounts_payable::amount_cents,
                    accounts_payable::due_date,
                    accounts_payable::supplier_name,
                ))
                .order((accounts_payable::due_date.asc(), accounts_payable::id.asc()))
                .into_boxed();
            if let Some((min, max)) = range {
                query = query.filter(accounts_payable::amount_cents.between(min, max));
            }
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            query.load::<TitleRow>(conn)?
        }
    };

    Ok(to_candidates(target, rows))
}

impl ReconciliationReader for DieselRepository {
    fn get_bank_statement(
        &self,
        id: BankStatementId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<BankStatement>> {
        use crate::schema::bank_statements;

        let mut conn = self.conn()?;
        let db_statement = bank_statements::table
            .filter(bank_statements::id.eq(id.get()))
            .filter(bank_statements::tenant_id.eq(tenant_id.get()))
            .first::<DbBankStatement>(&mut conn)
            .optional()?;

        db_statement
            .map(|statement| BankStatement::try_from(statement).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_statement_entries(
        &self,
        statement_id: BankStatementId,
    ) -> RepositoryResult<Vec<StatementEntry>> {
        use crate::schema::bank_statement_entries;

        let mut conn = self.conn()?;
        let db_entries = bank_statement_entries::table
            .filter(bank_statement_entries::bank_statement_id.eq(statement_id.get()))
            .order((
                bank_statement_entries::entry_date.asc(),
                bank_statement_entries::id.asc(),
            ))
            .load::<DbStatementEntry>(&mut conn)?;

        db_entries
            .into_iter()
            .map(|entry| StatementEntry::try_from(entry).map_err(RepositoryError::from))
            .collect()
    }

    fn get_statement_entry(
        &self,
        id: StatementEntryId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<StatementEntry>> {
        use crate::schema::bank_statement_entries;

        let mut conn = self.conn()?;
        let db_entry = bank_statement_entries::table
            .filter(bank_statement_entries::id.eq(id.get()))
            .filter(bank_statement_entries::tenant_id.eq(tenant_id.get()))
            .first::<DbStatementEntry>(&mut conn)
            .optional()?;

        db_entry
            .map(|entry| StatementEntry::try_from(entry).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_open_titles(
        &self,
        tenant_id: TenantId,
        target: MatchTarget,
    ) -> RepositoryResult<Vec<Candidate>> {
        let mut conn = self.conn()?;
        Ok(load_open_titles(&mut conn, tenant_id, target, None, None)?)
    }

    fn list_titles_near_amount(
        &self,
        tenant_id: TenantId,
        target: MatchTarget,
        amount: Decimal,
        limit: i64,
    ) -> RepositoryResult<Vec<Candidate>> {
        let min = money::to_cents(money::mul(amount, Decimal::new(8, 1)))?;
        let max = money::to_cents(money::mul(amount, Decimal::new(12, 1)))?;

        let mut conn = self.conn()?;
        Ok(load_open_titles(
            &mut conn,
            tenant_id,
            target,
            Some((min, max)),
            Some(limit),
        )?)
    }

    fn title_exists(
        &self,
        tenant_id: TenantId,
        target: MatchTarget,
        id: i32,
    ) -> RepositoryResult<bool> {
        use crate::schema::{accounts_payable, accounts_receivable};

        let mut conn = self.conn()?;
        let count = match target {
            MatchTarget::Receivable => accounts_receivable::table
                .filter(accounts_receivable::id.eq(id))
                .filter(accounts_receivable::tenant_id.eq(tenant_id.get()))
                .filter(accounts_receivable::deleted_at.is_null())
                .count()
                .get_result::<i64>(&mut conn)?,
            MatchTarget::Payable => accounts_payable::table
                .filter(accounts_payable::id.eq(id))
                .filter(accounts_payable::tenant_id.eq(tenant_id.get()))
                .filter(accounts_payable::deleted_at.is_null())
                .count()
                .get_result::<i64>(&mut conn)?,
        };

        Ok(count > 0)
    }

    fn list_reconciliation_rules(
        &self,
        tenant_id: TenantId,
    ) -> RepositoryResult<Vec<ReconciliationRule>> {
        use crate::schema::reconciliation_rules;

        let mut conn = self.conn()?;
        let db_rules = reconciliation_rules::table
            .filter(reconciliation_rules::tenant_id.eq(tenant_id.get()))
            .filter(reconciliation_rules::is_active.eq(true))
            .order((
                reconciliation_rules::priority.asc(),
                reconciliation_rules::id.asc(),
            ))
            .load::<DbReconciliationRule>(&mut conn)?;

        db_rules
            .into_iter()
            .map(|rule| ReconciliationRule::try_from(rule).map_err(RepositoryError::from))
            .collect()
    }

    fn reconciliation_summary(
        &self,
        tenant_id: TenantId,
    ) -> RepositoryResult<ReconciliationSummary> {
        use crate::schema::bank_statement_entries;

        let mut conn = self.conn()?;
        let rows = bank_statement_entries::table
            .filter(bank_statement_entries::tenant_id.eq(tenant_id.get()))
            .select((
                bank_statement_entries::status,
                bank_statement_entries::entry_type,
                bank_statement_entries::amount_cents,
                bank_statement_entries::possible_duplicate,
            ))
            .load::<(String, String, i64, bool)>(&mut conn)?;

        let mut summary = ReconciliationSummary::default();
        let (mut credits, mut debits) = (0i64, 0i64);
        for (status, entry_type, amount_cents, duplicate) in rows {
            summary.total_entries += 1;
            match status.parse::<EntryStatus>() {
                Ok(EntryStatus::Pending) => summary.pending_count += 1,
                Ok(EntryStatus::Matched) => summary.matched_count += 1,
                Ok(EntryStatus::Ignored) => summary.ignored_count += 1,
                Err(err) => log::warn!("Skipping entry status in summary: {err}"),
            }
            match entry_type.parse::<EntryType>() {
                Ok(EntryType::Credit) => credits += amount_cents,
                Ok(EntryType::Debit) => debits += amount_cents,
                Err(err) => log::warn!("Skipping entry type in summary: {err}"),
            }
            if duplicate {
                summary.duplicate_count += 1;
            }
        }
        summary.total_credits = money::from_cents(credits);
        summary.total_debits = money::from_cents(debits);

        Ok(summary.with_percent())
    }

    fn search_open_titles(
        &self,
        tenant_id: TenantId,
        target: MatchTarget,
        query: &str,
        limit: i64,
    ) -> RepositoryResult<Vec<Candidate>> {
        use crate::schema::{accounts_payable, accounts_receivable, customers};

        let pattern = format!("%{}%", query.trim());
        let mut conn = self.conn()?;

        let rows = match target {
            MatchTarget::Receivable => accounts_receivable::table
                .left_join(customers::table)
                .filter(accounts_receivable::tenant_id.eq(tenant_id.get()))
                .filter(accounts_receivable::status.eq_any(OPEN_STATUSES))
                .filter(accounts_receivable::deleted_at.is_null())
                .filter(
                    accounts_receivable::description
                        .like(&pattern)
                        .or(customers::name.nullable().like(&pattern)),
                )
                .select((
                    accounts_receivable::id,
                    accounts_receivable::description,
                    accounts_receivable::amount_cents,
                    accounts_receivable::due_date,
                    customers::name.nullable(),
                ))
                .order(accounts_receivable::due_date.desc())
                .limit(limit)
                .load::<TitleRow>(&mut conn)?,
            MatchTarget::Payable => accounts_payable::table
                .filter(accounts_payable::tenant_id.eq(tenant_id.get()))
                .filter(accounts_payable::status.eq_any(OPEN_STATUSES))
                .filter(accounts_payable::deleted_at.is_null())
                .filter(
                    accounts_payable::description
                        .like(&pattern)
                        .or(accounts_payable::supplier_name.like(&pattern)),
                )
                .select((
                    accounts_payable::id,
                    accounts_payable::description,
                    accounts_payable::amount_cents,
                    accounts_payable::due_date,
                    accounts_payable::supplier_name,
                ))
                .order(accounts_payable::due_date.desc())
                .limit(limit)
                .load::<TitleRow>(&mut conn)?,
        };

        Ok(to_candidates(target, rows))
    }
}

/// Recounts matched entries of a statement and stores the total.
fn refresh_matched_entries(
    conn: &mut SqliteConnection,
    statement_id: i32,
    now: NaiveDateTime,
) -> QueryResult<i32> {
    use crate::schema::{bank_statement_entries, bank_statements};

    let matched = bank_statement_entries::table
        .filter(bank_statement_entries::bank_statement_id.eq(statement_id))
        .filter(bank_statement_entries::status.eq(EntryStatus::Matched.as_str()))
        .count()
        .get_result::<i64>(conn)?;
    let matched = i32::try_from(matched).unwrap_or(i32::MAX);

    diesel::update(bank_statements::table.filter(bank_statements::id.eq(statement_id)))
        .set((
            bank_statements::matched_entries.eq(matched),
            bank_statements::updated_at.eq(now),
        ))
        .execute(conn)?;
    Ok(matched)
}

impl ReconciliationWriter for DieselRepository {
    fn import_bank_statement(
        &self,
        statement: &NewBankStatement,
    ) -> RepositoryResult<(BankStatement, Vec<StatementEntry>)> {
        use crate::schema::{bank_statement_entries, bank_statements, reconciliation_rules};

        let mut conn = self.conn()?;
        let tenant_id = statement.tenant_id.get();
        let now = Utc::now().naive_utc();
        let total_entries = i32::try_from(statement.entries.len())
            .map_err(|_| RepositoryError::ValidationError("too many entries".to_string()))?;

        let db_new_statement = DbNewBankStatement {
            tenant_id,
            bank_account_id: statement.bank_account_id.map(BankAccountId::get),
            filename: statement.filename.as_str(),
            format: statement.format.as_str(),
            imported_at: now,
            created_by: statement.created_by.map(UserId::get),
            total_entries,
            matched_entries: 0,
        };

        let (db_statement, db_entries) = conn.transaction::<_, RepositoryError, _>(|conn| {
            let mut db_statement = diesel::insert_into(bank_statements::table)
                .values(&db_new_statement)
                .get_result::<DbBankStatement>(conn)?;

            let mut db_entries = Vec::with_capacity(statement.entries.len());
            for imported in &statement.entries {
                let mut new_entry =
                    DbNewStatementEntry::pending(db_statement.id, tenant_id, &imported.parsed)?;

                let duplicates = bank_statement_entries::table
                    .filter(bank_statement_entries::tenant_id.eq(tenant_id))
                    .filter(bank_statement_entries::bank_statement_id.ne(db_statement.id))
                    .filter(bank_statement_entries::entry_date.eq(new_entry.entry_date))
                    .filter(bank_statement_entries::amount_cents.between(
                        new_entry.amount_cents - DUPLICATE_WINDOW_CENTS,
                        new_entry.amount_cents + DUPLICATE_WINDOW_CENTS,
                    ))
                    .filter(bank_statement_entries::description.eq(new_entry.description))
                    .count()
                    .get_result::<i64>(conn)?;
                new_entry.possible_duplicate = duplicates > 0;

                let mut db_entry = diesel::insert_into(bank_statement_entries::table)
                    .values(&new_entry)
                    .get_result::<DbStatementEntry>(conn)?;

                if let Some(update) = &imported.resolution {
                    db_entry = diesel::update(
                        bank_statement_entries::table
                            .filter(bank_statement_entries::id.eq(db_entry.id)),
                    )
                    .set(&EntryChangeset::new(update, now))
                    .get_result::<DbStatementEntry>(conn)?;

                    if let Some(rule_id) = update.rule_id {
                        diesel::update(
                            reconciliation_rules::table
                                .filter(reconciliation_rules::id.eq(rule_id.get())),
                        )
                        .set((
                            reconciliation_rules::times_applied
                                .eq(reconciliation_rules::times_applied + 1),
                            reconciliation_rules::updated_at.eq(now),
                        ))
                        .execute(conn)?;
                    }
                }
                db_entries.push(db_entry);
            }

            db_statement.matched_entries = refresh_matched_entries(conn, db_statement.id, now)?;
            Ok((db_statement, db_entries))
        })?;

        let statement = BankStatement::try_from(db_statement)?;
        let entries = db_entries
            .into_iter()
            .map(StatementEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((statement, entries))
    }

    fn update_statement_entry(
        &self,
        id: StatementEntryId,
        update: &EntryUpdate,
    ) -> RepositoryResult<StatementEntry> {
        use crate::schema::bank_statement_entries;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();
        let changeset = EntryChangeset::new(update, now);

        let db_entry = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let db_entry = diesel::update(
                bank_statement_entries::table.filter(bank_statement_entries::id.eq(id.get())),
            )
            .set(&changeset)
            .get_result::<DbStatementEntry>(conn)?;

            refresh_matched_entries(conn, db_entry.bank_statement_id, now)?;
            Ok(db_entry)
        })?;

        StatementEntry::try_from(db_entry).map_err(RepositoryError::from)
    }

    fn create_reconciliation_rule(
        &self,
        rule: &NewReconciliationRule,
    ) -> RepositoryResult<ReconciliationRule> {
        use crate::schema::reconciliation_rules;

        let mut conn = self.conn()?;
        let db_new_rule: DbNewReconciliationRule = rule.into();

        let db_rule = diesel::insert_into(reconciliation_rules::table)
            .values(&db_new_rule)
            .get_result::<DbReconciliationRule>(&mut conn)?;

        ReconciliationRule::try_from(db_rule).map_err(RepositoryError::from)
    }
}
