use diesel::{dsl::max, prelude::*};
use rust_decimal::Decimal;

use crate::{
    domain::{
        finance::EXPENSE_APPROVED,
        money,
        sla::SlaPolicy,
        types::{CustomerId, QuoteId, SlaPolicyId, TenantId, UserId, WorkOrderId},
        work_order::{
            self, NewWorkOrder, NewWorkOrderItem, OrderTechnician, StatusChange, WorkOrder,
            WorkOrderItem,
        },
    },
    models::{
        sla::SlaPolicy as DbSlaPolicy,
        work_order::{
            NewStatusHistory as DbNewStatusHistory, NewWorkOrder as DbNewWorkOrder,
            NewWorkOrderItem as DbNewWorkOrderItem,
            NewWorkOrderTechnician as DbNewWorkOrderTechnician, WorkOrder as DbWorkOrder,
            WorkOrderItem as DbWorkOrderItem, WorkOrderTechnician as DbWorkOrderTechnician,
        },
    },
    repository::{
        DieselRepository, WorkOrderReader, WorkOrderWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

fn load_items(conn: &mut SqliteConnection, id: i32) -> QueryResult<Vec<DbWorkOrderItem>> {
    use crate::schema::work_order_items;

    work_order_items::table
        .filter(work_order_items::work_order_id.eq(id))
        .order(work_order_items::id.asc())
        .load::<DbWorkOrderItem>(conn)
}

impl WorkOrderReader for DieselRepository {
    fn get_work_order_by_id(
        &self,
        id: WorkOrderId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<WorkOrder>> {
        use crate::schema::work_orders;

        let mut conn = self.conn()?;
        let db_order = work_orders::table
            .filter(work_orders::id.eq(id.get()))
            .filter(work_orders::tenant_id.eq(tenant_id.get()))
            .filter(work_orders::deleted_at.is_null())
            .first::<DbWorkOrder>(&mut conn)
            .optional()?;

        db_order
            .map(|order| WorkOrder::try_from(order).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_work_order_items(&self, id: WorkOrderId) -> RepositoryResult<Vec<WorkOrderItem>> {
        let mut conn = self.conn()?;
        let db_items = load_items(&mut conn, id.get())?;

        db_items
            .into_iter()
            .map(|item| WorkOrderItem::try_from(item).map_err(RepositoryError::from))
            .collect()
    }

    fn list_work_order_technicians(
        &self,
        id: WorkOrderId,
    ) -> RepositoryResult<Vec<OrderTechnician>> {
        use crate::schema::work_order_technicians;

        let mut conn = self.conn()?;
        let db_technicians = work_order_technicians::table
            .filter(work_order_technicians::work_order_id.eq(id.get()))
            .order(work_order_technicians::user_id.asc())
            .load::<DbWorkOrderTechnician>(&mut conn)?;

        db_technicians
            .into_iter()
            .map(|technician| OrderTechnician::try_from(technician).map_err(RepositoryError::from))
            .collect()
    }

    fn get_quote_source(&self, id: QuoteId) -> RepositoryResult<Option<String>> {
        use crate::schema::quotes;

        let mut conn = self.conn()?;
        let source = quotes::table
            .filter(quotes::id.eq(id.get()))
            .select(quotes::source)
            .first::<Option<String>>(&mut conn)
            .optional()?;

        Ok(source.flatten())
    }

    fn sum_approved_expenses(&self, id: WorkOrderId) -> RepositoryResult<Decimal> {
        use crate::schema::expenses;

        let mut conn = self.conn()?;
        let amounts = expenses::table
            .filter(expenses::work_order_id.eq(id.get()))
            .filter(expenses::status.eq(EXPENSE_APPROVED))
            .filter(expenses::affects_net_value.eq(true))
            .filter(expenses::deleted_at.is_null())
            .select(expenses::amount_cents)
            .load::<i64>(&mut conn)?;

        Ok(money::from_cents(amounts.into_iter().sum()))
    }

    fn get_sla_policy(
        &self,
        id: SlaPolicyId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<SlaPolicy>> {
        use crate::schema::sla_policies;

        let mut conn = self.conn()?;
        let db_policy = sla_policies::table
            .filter(sla_policies::id.eq(id.get()))
            .filter(sla_policies::tenant_id.eq(tenant_id.get()))
            .first::<DbSlaPolicy>(&mut conn)
            .optional()?;

        db_policy
            .map(|policy| SlaPolicy::try_from(policy).map_err(RepositoryError::from))
            .transpose()
    }

    fn customer_exists(&self, id: CustomerId, tenant_id: TenantId) -> RepositoryResult<bool> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let count = customers::table
            .filter(customers::id.eq(id.get()))
            .filter(customers::tenant_id.eq(tenant_id.get()))
            .filter(customers::deleted_at.is_null())
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count > 0)
    }
}

impl WorkOrderWriter for DieselRepository {
    fn create_work_order(&self, order: &NewWorkOrder) -> RepositoryResult<WorkOrder> {
        use crate::schema::work_orders;

        let mut conn = self.conn()?;

        let db_order = conn.transaction::<DbWorkOrder, RepositoryError, _>(|conn| {
            // Soft-deleted orders keep their numbers.
            let last = work_orders::table
                .filter(work_orders::tenant_id.eq(order.tenant_id.get()))
                .select(max(work_orders::number))
                .first::<Option<String>>(conn)?;

            let number = work_order::next_number(last.as_deref())?;
            let db_new_order = DbNewWorkOrder::numbered(order, &number)?;

            Ok(diesel::insert_into(work_orders::table)
                .values(&db_new_order)
                .get_result::<DbWorkOrder>(conn)?)
        })?;

        WorkOrder::try_from(db_order).map_err(RepositoryError::from)
    }

    fn add_work_order_item(&self, item: &NewWorkOrderItem) -> RepositoryResult<WorkOrder> {
        use crate::schema::{work_order_items, work_orders};

        let mut conn = self.conn()?;
        let db_new_item = DbNewWorkOrderItem::try_from(item)?;
        let order_id = item.work_order_id.get();

        let db_order = conn.transaction::<DbWorkOrder, RepositoryError, _>(|conn| {
            diesel::insert_into(work_order_items::table)
                .values(&db_new_item)
                .execute(conn)?;

            let order = work_orders::table
                .filter(work_orders::id.eq(order_id))
                .first::<DbWorkOrder>(conn)?;
            let order = WorkOrder::try_from(order)?;

            let items = load_items(conn, order_id)?
                .into_iter()
                .map(WorkOrderItem::try_from)
                .collect::<Result<Vec<_>, _>>()?;

            let totals = work_order::recalculate_total(
                &items,
                order.discount_percentage,
                order.discount,
                order.displacement,
            );

            let updated = diesel::update(work_orders::table.filter(work_orders::id.eq(order_id)))
                .set((
                    work_orders::discount_amount_cents.eq(money::to_cents(totals.discount_amount)?),
                    work_orders::total_cents.eq(money::to_cents(totals.total)?),
                    work_orders::updated_at.eq(chrono::Utc::now().naive_utc()),
                ))
                .get_result::<DbWorkOrder>(conn)?;
            Ok(updated)
        })?;

        WorkOrder::try_from(db_order).map_err(RepositoryError::from)
    }

    fn change_work_order_status(&self, change: &StatusChange) -> RepositoryResult<WorkOrder> {
        use crate::schema::{work_order_status_history, work_orders};

        let mut conn = self.conn()?;
        let history: DbNewStatusHistory = change.into();

        let db_order = conn.transaction::<DbWorkOrder, diesel::result::Error, _>(|conn| {
            let target = work_orders::table
                .filter(work_orders::id.eq(change.work_order_id.get()))
                .filter(work_orders::tenant_id.eq(change.tenant_id.get()))
                // Guards against a concurrent transition from the same state.
                .filter(work_orders::status.eq(change.from.as_str()));

            let updated = match change.completed_at {
                Some(completed_at) => diesel::update(target)
                    .set((
                        work_orders::status.eq(change.to.as_str()),
                        work_orders::completed_at.eq(completed_at),
                        work_orders::updated_at.eq(change.changed_at),
                    ))
                    .get_result::<DbWorkOrder>(conn)?,
                None => diesel::update(target)
                    .set((
                        work_orders::status.eq(change.to.as_str()),
                        work_orders::updated_at.eq(change.changed_at),
                    ))
                    .get_result::<DbWorkOrder>(conn)?,
            };

            diesel::insert_into(work_order_status_history::table)
                .values(&history)
                .execute(conn)?;

            Ok(updated)
        })?;

        WorkOrder::try_from(db_order).map_err(RepositoryError::from)
    }

    fn assign_technician(
        &self,
        work_order_id: WorkOrderId,
        user_id: UserId,
        role: &str,
    ) -> RepositoryResult<()> {
        use crate::schema::work_order_technicians;

        let mut conn = self.conn()?;
        diesel::insert_into(work_order_technicians::table)
            .values(DbNewWorkOrderTechnician {
                work_order_id: work_order_id.get(),
                user_id: user_id.get(),
                role,
            })
            .on_conflict((
                work_order_technicians::work_order_id,
                work_order_technicians::user_id,
            ))
            .do_update()
            .set(work_order_technicians::role.eq(role))
            .execute(&mut conn)?;

        Ok(())
    }
}

