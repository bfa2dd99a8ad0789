use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::{
    domain::{
        commission::{
            Campaign, CommissionEvent, CommissionEventStatus, CommissionRule, NewCommissionEvent,
            NewSettlement, Release, Settlement, SettlementStatus, Trigger,
        },
        finance::Receivable,
        money,
        types::{
            CommissionEventId, ReceivableId, SettlementId, TenantId, UserId, WorkOrderId,
        },
    },
    models::{
        commission::{
            CommissionCampaign as DbCommissionCampaign, CommissionEvent as DbCommissionEvent,
            CommissionRule as DbCommissionRule, CommissionSettlement as DbCommissionSettlement,
            NewCommissionEvent as DbNewCommissionEvent,
            NewCommissionSettlement as DbNewCommissionSettlement,
        },
        finance::AccountReceivable as DbAccountReceivable,
    },
    repository::{
        CommissionReader, CommissionWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
};

fn to_events(db_events: Vec<DbCommissionEvent>) -> RepositoryResult<Vec<CommissionEvent>> {
    db_events
        .into_iter()
        .map(|event| CommissionEvent::try_from(event).map_err(RepositoryError::from))
        .collect()
}

impl CommissionReader for DieselRepository {
    fn list_commission_rules(&self, tenant_id: TenantId) -> RepositoryResult<Vec<CommissionRule>> {
        use crate::schema::commission_rules;

        let mut conn = self.conn()?;
        let db_rules = commission_rules::table
            .filter(commission_rules::tenant_id.eq(tenant_id.get()))
            .filter(commission_rules::active.eq(true))
            .order((commission_rules::priority.desc(), commission_rules::id.asc()))
            .load::<DbCommissionRule>(&mut conn)?;

        db_rules
            .into_iter()
            .map(|rule| CommissionRule::try_from(rule).map_err(RepositoryError::from))
            .collect()
    }

    fn list_running_campaigns(
        &self,
        tenant_id: TenantId,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<Campaign>> {
        use crate::schema::commission_campaigns;

        let mut conn = self.conn()?;
        let db_campaigns = commission_campaigns::table
            .filter(commission_campaigns::tenant_id.eq(tenant_id.get()))
            .filter(commission_campaigns::active.eq(true))
            .filter(commission_campaigns::starts_at.le(today))
            .filter(commission_campaigns::ends_at.ge(today))
            .load::<DbCommissionCampaign>(&mut conn)?;

        db_campaigns
            .into_iter()
            .map(|campaign| Campaign::try_from(campaign).map_err(RepositoryError::from))
            .collect()
    }

    fn commission_events_exist(
        &self,
        work_order_id: WorkOrderId,
        trigger: Trigger,
    ) -> RepositoryResult<bool> {
        use crate::schema::commission_events;

        let mut conn = self.conn()?;
        let count = commission_events::table
            .filter(commission_events::work_order_id.eq(work_order_id.get()))
            .filter(commission_events::trigger_event.eq(trigger.as_str()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count > 0)
    }

    fn list_pending_commission_events(
        &self,
        work_order_id: WorkOrderId,
    ) -> RepositoryResult<Vec<CommissionEvent>> {
        use crate::schema::commission_events;

        let mut conn = self.conn()?;
        let db_events = commission_events::table
            .filter(commission_events::work_order_id.eq(work_order_id.get()))
            .filter(commission_events::status.eq(CommissionEventStatus::Pending.as_str()))
            .order(commission_events::id.asc())
            .load::<DbCommissionEvent>(&mut conn)?;

        to_events(db_events)
    }

    fn get_receivable_by_id(
        &self,
        id: ReceivableId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Receivable>> {
        use crate::schema::accounts_receivable;

        let mut conn = self.conn()?;
        let db_receivable = accounts_receivable::table
            .filter(accounts_receivable::id.eq(id.get()))
            .filter(accounts_receivable::tenant_id.eq(tenant_id.get()))
            .filter(accounts_receivable::deleted_at.is_null())
            .first::<DbAccountReceivable>(&mut conn)
            .optional()?;

        db_receivable
            .map(|receivable| Receivable::try_from(receivable).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_settleable_events(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        period: &str,
    ) -> RepositoryResult<Vec<CommissionEvent>> {
        use crate::schema::{commission_events, work_orders};

        let mut conn = self.conn()?;
        let rows = commission_events::table
            .inner_join(work_orders::table)
            .filter(commission_events::tenant_id.eq(tenant_id.get()))
            .filter(commission_events::user_id.eq(user_id.get()))
            .filter(commission_events::status.eq(CommissionEventStatus::Approved.as_str()))
            .filter(commission_events::settlement_id.is_null())
            .order(commission_events::id.asc())
            .select((commission_events::all_columns, work_orders::completed_at))
            .load::<(DbCommissionEvent, Option<NaiveDateTime>)>(&mut conn)?;

        // An event belongs to the month its order completed, else the month
        // it was created.
        let in_period = rows
            .into_iter()
            .filter(|(event, completed_at)| {
                completed_at
                    .unwrap_or(event.created_at)
                    .format("%Y-%m")
                    .to_string()
                    == period
            })
            .map(|(event, _)| event)
            .collect();

        to_events(in_period)
    }

    fn get_settlement_by_period(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        period: &str,
    ) -> RepositoryResult<Option<Settlement>> {
        use crate::schema::commission_settlements;

        let mut conn = self.conn()?;
        let db_settlement = commission_settlements::table
            .filter(commission_settlements::tenant_id.eq(tenant_id.get()))
            .filter(commission_settlements::user_id.eq(user_id.get()))
            .filter(commission_settlements::period.eq(period))
            .first::<DbCommissionSettlement>(&mut conn)
            .optional()?;

        db_settlement
            .map(|settlement| Settlement::try_from(settlement).map_err(RepositoryError::from))
            .transpose()
    }

    fn get_settlement_by_id(
        &self,
        id: SettlementId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Settlement>> {
        use crate::schema::commission_settlements;

        let mut conn = self.conn()?;
        let db_settlement = commission_settlements::table
            .filter(commission_settlements::id.eq(id.get()))
            .filter(commission_settlements::tenant_id.eq(tenant_id.get()))
            .first::<DbCommissionSettlement>(&mut conn)
            .optional()?;

        db_settlement
            .map(|settlement| Settlement::try_from(settlement).map_err(RepositoryError::from))
            .transpose()
    }
}

impl CommissionWriter for DieselRepository {
    fn create_commission_events(
        &self,
        events: &[NewCommissionEvent],
    ) -> RepositoryResult<Vec<CommissionEvent>> {
        use crate::schema::commission_events;

        let mut conn = self.conn()?;
        let db_new_events = events
            .iter()
            .map(DbNewCommissionEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let db_events = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            db_new_events
                .iter()
                .map(|event| {
                    diesel::insert_into(commission_events::table)
                        .values(event)
                        .get_result::<DbCommissionEvent>(conn)
                })
                .collect::<QueryResult<Vec<_>>>()
        })?;

        to_events(db_events)
    }

    fn apply_commission_releases(
        &self,
        receivable_id: ReceivableId,
        releases: &[(CommissionEvent, Release)],
    ) -> RepositoryResult<usize> {
        use crate::schema::commission_events;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();
        let approved = CommissionEventStatus::Approved.as_str();

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            for (event, release) in releases {
                let target = commission_events::table.filter(commission_events::id.eq(event.id.get()));
                match release {
                    Release::Full { proportion, notes } => {
                        diesel::update(target)
                            .set((
                                commission_events::status.eq(approved),
                                commission_events::account_receivable_id
                                    .eq(Some(receivable_id.get())),
                                commission_events::proportion.eq(proportion.to_string()),
                                commission_events::notes.eq(Some(notes.as_str())),
                                commission_events::updated_at.eq(now),
                            ))
                            .execute(conn)?;
                    }
                    Release::Partial {
                        released_amount,
                        remaining_amount,
                        proportion,
                        released_notes,
                        remaining_notes,
                    } => {
                        let released = NewCommissionEvent {
                            tenant_id: event.tenant_id,
                            commission_rule_id: event.commission_rule_id,
                            work_order_id: event.work_order_id,
                            account_receivable_id: Some(receivable_id),
                            user_id: event.user_id,
                            trigger: event.trigger,
                            base_amount: event.base_amount,
                            commission_amount: *released_amount,
                            proportion: *proportion,
                            status: CommissionEventStatus::Approved,
                            notes: Some(released_notes.clone()),
                        };
                        diesel::insert_into(commission_events::table)
                            .values(DbNewCommissionEvent::try_from(&released)?)
                            .execute(conn)?;

                        diesel::update(target)
                            .set((
                                commission_events::commission_amount_cents
                                    .eq(money::to_cents(*remaining_amount)?),
                                commission_events::notes.eq(Some(remaining_notes.as_str())),
                                commission_events::updated_at.eq(now),
                            ))
                            .execute(conn)?;
                    }
                }
            }
            Ok(releases.len())
        })
    }

    fn close_settlement(
        &self,
        settlement: &NewSettlement,
        event_ids: &[CommissionEventId],
    ) -> RepositoryResult<Settlement> {
        use crate::schema::{commission_events, commission_settlements};

        let mut conn = self.conn()?;
        let db_new_settlement = DbNewCommissionSettlement::try_from(settlement)?;
        let ids = event_ids.iter().map(|id| id.get()).collect::<Vec<i32>>();

        let db_settlement = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let db_settlement = diesel::insert_into(commission_settlements::table)
                .values(&db_new_settlement)
                .on_conflict((
                    commission_settlements::tenant_id,
                    commission_settlements::user_id,
                    commission_settlements::period,
                ))
                .do_update()
                .set((
                    commission_settlements::total_cents.eq(db_new_settlement.total_cents),
                    commission_settlements::events_count.eq(db_new_settlement.events_count),
                    commission_settlements::status.eq(SettlementStatus::Closed.as_str()),
                    commission_settlements::closed_at.eq(db_new_settlement.closed_at),
                    commission_settlements::approved_by.eq(None::<i32>),
                    commission_settlements::approved_at.eq(None::<NaiveDateTime>),
                    commission_settlements::paid_at.eq(None::<NaiveDateTime>),
                    commission_settlements::paid_amount_cents.eq(None::<i64>),
                    commission_settlements::updated_at.eq(db_new_settlement.closed_at),
                ))
                .get_result::<DbCommissionSettlement>(conn)?;

            diesel::update(commission_events::table.filter(commission_events::id.eq_any(ids)))
                .set((
                    commission_events::settlement_id.eq(Some(db_settlement.id)),
                    commission_events::updated_at.eq(db_new_settlement.closed_at),
                ))
                .execute(conn)?;

            Ok(db_settlement)
        })?;

        Settlement::try_from(db_settlement).map_err(RepositoryError::from)
    }

    fn approve_settlement(
        &self,
        id: SettlementId,
        approved_by: UserId,
        at: NaiveDateTime,
    ) -> RepositoryResult<Settlement> {
        use crate::schema::commission_settlements;

        let mut conn = self.conn()?;
        let db_settlement = diesel::update(
            commission_settlements::table.filter(commission_settlements::id.eq(id.get())),
        )
        .set((
            commission_settlements::status.eq(SettlementStatus::Approved.as_str()),
            commission_settlements::approved_by.eq(Some(approved_by.get())),
            commission_settlements::approved_at.eq(Some(at)),
            commission_settlements::updated_at.eq(at),
        ))
        .get_result::<DbCommissionSettlement>(&mut conn)?;

        Settlement::try_from(db_settlement).map_err(RepositoryError::from)
    }

    fn pay_settlement(
        &self,
        id: SettlementId,
        paid_amount: Decimal,
        at: NaiveDateTime,
    ) -> RepositoryResult<Settlement> {
        use crate::schema::{commission_events, commission_settlements};

        let paid_cents = money::to_cents(paid_amount)?;
        let mut conn = self.conn()?;

        let db_settlement = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let db_settlement = diesel::update(
                commission_settlements::table.filter(commission_settlements::id.eq(id.get())),
            )
            .set((
                commission_settlements::status.eq(SettlementStatus::Paid.as_str()),
                commission_settlements::paid_at.eq(Some(at)),
                commission_settlements::paid_amount_cents.eq(Some(paid_cents)),
                commission_settlements::updated_at.eq(at),
            ))
            .get_result::<DbCommissionSettlement>(conn)?;

            diesel::update(
                commission_events::table.filter(commission_events::settlement_id.eq(id.get())),
            )
            .set((
                commission_events::status.eq(CommissionEventStatus::Paid.as_str()),
                commission_events::updated_at.eq(at),
            ))
            .execute(conn)?;

            Ok(db_settlement)
        })?;

        Settlement::try_from(db_settlement).map_err(RepositoryError::from)
    }
}
