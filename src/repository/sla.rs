use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::{
    domain::{
        sla::{CLOSED_CALL_STATUSES, ServiceCall},
        system_alert::{NewSystemAlert, SystemAlert},
        types::TenantId,
        work_order::{WorkOrder, WorkOrderStatus},
    },
    models::{
        sla::{
            NewSystemAlert as DbNewSystemAlert, ServiceCall as DbServiceCall,
            SystemAlert as DbSystemAlert,
        },
        work_order::WorkOrder as DbWorkOrder,
    },
    repository::{
        DieselRepository, SlaReader, SlaWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

fn to_orders(db_orders: Vec<DbWorkOrder>) -> RepositoryResult<Vec<WorkOrder>> {
    db_orders
        .into_iter()
        .map(|order| WorkOrder::try_from(order).map_err(RepositoryError::from))
        .collect()
}

impl SlaReader for DieselRepository {
    fn list_open_work_orders_with_deadline(
        &self,
        tenant_id: TenantId,
    ) -> RepositoryResult<Vec<WorkOrder>> {
        use crate::schema::work_orders;

        let closed = WorkOrderStatus::ALL
            .iter()
            .filter(|status| status.is_closed())
            .map(|status| status.as_str())
            .collect::<Vec<_>>();

        let mut conn = self.conn()?;
        let db_orders = work_orders::table
            .filter(work_orders::tenant_id.eq(tenant_id.get()))
            .filter(work_orders::sla_deadline.is_not_null())
            .filter(work_orders::deleted_at.is_null())
            .filter(work_orders::status.ne_all(closed))
            .order(work_orders::id.asc())
            .load::<DbWorkOrder>(&mut conn)?;

        to_orders(db_orders)
    }

    fn list_open_service_calls_with_deadline(
        &self,
        tenant_id: TenantId,
    ) -> RepositoryResult<Vec<ServiceCall>> {
        use crate::schema::service_calls;

        let mut conn = self.conn()?;
        let db_calls = service_calls::table
            .filter(service_calls::tenant_id.eq(tenant_id.get()))
            .filter(service_calls::sla_deadline.is_not_null())
            .filter(service_calls::deleted_at.is_null())
            .filter(service_calls::status.ne_all(CLOSED_CALL_STATUSES))
            .order(service_calls::id.asc())
            .load::<DbServiceCall>(&mut conn)?;

        db_calls
            .into_iter()
            .map(|call| ServiceCall::try_from(call).map_err(RepositoryError::from))
            .collect()
    }

    fn list_sla_tracked_work_orders(
        &self,
        tenant_id: TenantId,
    ) -> RepositoryResult<Vec<WorkOrder>> {
        use crate::schema::work_orders;

        let mut conn = self.conn()?;
        let db_orders = work_orders::table
            .filter(work_orders::tenant_id.eq(tenant_id.get()))
            .filter(work_orders::sla_deadline.is_not_null())
            .filter(work_orders::deleted_at.is_null())
            .filter(work_orders::status.ne(WorkOrderStatus::Cancelled.as_str()))
            .order(work_orders::id.asc())
            .load::<DbWorkOrder>(&mut conn)?;

        to_orders(db_orders)
    }

    fn alert_recorded_since(
        &self,
        tenant_id: TenantId,
        alert_type: &str,
        model_type: &str,
        model_id: i32,
        since: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        use crate::schema::system_alerts;

        let mut conn = self.conn()?;
        let count = system_alerts::table
            .filter(system_alerts::tenant_id.eq(tenant_id.get()))
            .filter(system_alerts::alert_type.eq(alert_type))
            .filter(system_alerts::model_type.eq(model_type))
            .filter(system_alerts::model_id.eq(model_id))
            .filter(system_alerts::created_at.ge(since))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count > 0)
    }
}

impl SlaWriter for DieselRepository {
    fn create_system_alert(&self, alert: &NewSystemAlert) -> RepositoryResult<SystemAlert> {
        use crate::schema::system_alerts;

        let mut conn = self.conn()?;
        let db_new_alert = DbNewSystemAlert::at(alert, Utc::now().naive_utc());

        let db_alert = diesel::insert_into(system_alerts::table)
            .values(&db_new_alert)
            .get_result::<DbSystemAlert>(&mut conn)?;

        SystemAlert::try_from(db_alert).map_err(RepositoryError::from)
    }
}
