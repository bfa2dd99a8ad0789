//! Work order creation, items, technicians, and the status machine.

use chrono::Utc;

use crate::domain::commission::{ROLE_TECHNICIAN, Trigger};
use crate::domain::types::WorkOrderId;
use crate::domain::work_order::{
    NewWorkOrderItem, StatusChange, WorkOrder, WorkOrderStatus, sla_deadline,
};
use crate::dto::work_orders::{StatusChangeOutcome, WorkOrderDetails};
use crate::forms::work_orders::{
    AddItemForm, AddItemPayload, AssignTechnicianForm, AssignTechnicianPayload,
    ChangeStatusForm, ChangeStatusPayload, CreateWorkOrderForm, CreateWorkOrderPayload,
};
use crate::models::auth::AuthenticatedUser;
use crate::repository::errors::RepositoryError;
use crate::repository::{
    AccessReader, CommissionReader, CommissionWriter, TenantReader, WorkOrderReader,
    WorkOrderWriter,
};
use crate::services::commissions::generate_for_order;
use crate::services::{ServiceError, ServiceResult, ensure_permission};

pub const PERMISSION_CREATE: &str = "os.work_order.create";
pub const PERMISSION_UPDATE: &str = "os.work_order.update";
pub const PERMISSION_CHANGE_STATUS: &str = "os.work_order.change_status";

/// Pivot roles a technician may hold on an order.
pub const TECHNICIAN_ROLES: [&str; 2] = [ROLE_TECHNICIAN, "auxiliar"];

/// Creates an order with the next tenant number.
///
/// With an SLA policy the deadline is the creation time plus the policy's
/// resolution hours.
pub fn create_work_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateWorkOrderForm,
) -> ServiceResult<WorkOrder>
where
    R: AccessReader + WorkOrderReader + WorkOrderWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_CREATE)?;

    let payload = CreateWorkOrderPayload::try_from(form)?;

    if !repo.customer_exists(payload.customer_id, actor.tenant_id)? {
        return Err(ServiceError::Form(format!(
            "customer {} does not exist",
            payload.customer_id
        )));
    }

    let deadline = match payload.sla_policy_id {
        Some(policy_id) => {
            let policy = repo
                .get_sla_policy(policy_id, actor.tenant_id)?
                .ok_or_else(|| {
                    ServiceError::Form(format!("SLA policy {policy_id} does not exist"))
                })?;
            Some(sla_deadline(
                Utc::now().naive_utc(),
                policy.resolution_hours,
            ))
        }
        None => None,
    };

    let order = repo.create_work_order(&payload.into_domain(
        actor.tenant_id,
        actor.user_id,
        deadline,
    ))?;
    log::info!("Created work order {} in tenant {}", order.number, order.tenant_id);

    Ok(order)
}

/// Adds a line to an order that is still open for changes and returns the
/// recalculated order.
pub fn add_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    work_order_id: i32,
    form: AddItemForm,
) -> ServiceResult<WorkOrderDetails>
where
    R: AccessReader + WorkOrderReader + WorkOrderWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_UPDATE)?;

    let payload = AddItemPayload::try_from(form)?;

    let order = repo
        .get_work_order_by_id(WorkOrderId::new(work_order_id)?, actor.tenant_id)?
        .ok_or(ServiceError::NotFound)?;
    if matches!(
        order.status,
        WorkOrderStatus::Invoiced | WorkOrderStatus::Cancelled
    ) {
        return Err(ServiceError::Conflict(format!(
            "items cannot be added to a {} order",
            order.status.as_str()
        )));
    }

    let order = repo.add_work_order_item(&NewWorkOrderItem {
        work_order_id: order.id,
        tenant_id: actor.tenant_id,
        item_type: payload.item_type,
        description: payload.description,
        quantity: payload.quantity,
        unit_price: payload.unit_price,
        cost_price: payload.cost_price,
    })?;
    let items = repo.list_work_order_items(order.id)?;

    Ok(WorkOrderDetails { order, items })
}

/// Moves an order along the status machine and records the history row.
///
/// Entering `completed` or `invoiced` generates the matching commissions.
/// Commission failures never undo the transition; they are logged and the
/// outcome carries no events.
pub fn change_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    work_order_id: i32,
    form: ChangeStatusForm,
) -> ServiceResult<StatusChangeOutcome>
where
    R: AccessReader
        + WorkOrderReader
        + WorkOrderWriter
        + CommissionReader
        + CommissionWriter
        + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_CHANGE_STATUS)?;

    let payload = ChangeStatusPayload::try_from(form)?;

    let order = repo
        .get_work_order_by_id(WorkOrderId::new(work_order_id)?, actor.tenant_id)?
        .ok_or(ServiceError::NotFound)?;
    if !order.status.can_transition_to(payload.status) {
        return Err(ServiceError::Conflict(format!(
            "cannot move {} from {} to {}",
            order.number,
            order.status.as_str(),
            payload.status.as_str()
        )));
    }

    let now = Utc::now().naive_utc();
    let change = StatusChange {
        work_order_id: order.id,
        tenant_id: actor.tenant_id,
        user_id: actor.user_id,
        from: order.status,
        to: payload.status,
        notes: payload.notes,
        changed_at: now,
        completed_at: (payload.status == WorkOrderStatus::Completed).then_some(now),
    };

    let order = match repo.change_work_order_status(&change) {
        Ok(order) => order,
        Err(RepositoryError::NotFound) => {
            return Err(ServiceError::Conflict(format!(
                "{} changed status concurrently",
                order.number
            )));
        }
        Err(e) => return Err(e.into()),
    };
    log::info!(
        "Work order {} moved from {} to {}",
        order.number,
        change.from.as_str(),
        change.to.as_str()
    );

    let trigger = match order.status {
        WorkOrderStatus::Completed => Some(Trigger::OsCompleted),
        WorkOrderStatus::Invoiced => Some(Trigger::OsInvoiced),
        _ => None,
    };
    let commissions = match trigger.map(|t| generate_for_order(repo, &order, t)) {
        Some(Ok(events)) => events,
        Some(Err(ServiceError::Conflict(message))) => {
            log::info!("Skipping commissions: {message}");
            Vec::new()
        }
        Some(Err(e)) => {
            log::error!("Failed to generate commissions for {}: {e}", order.number);
            Vec::new()
        }
        None => Vec::new(),
    };

    Ok(StatusChangeOutcome { order, commissions })
}

/// Attaches a user of the tenant to the order; assigning again updates the
/// pivot role.
pub fn assign_technician<R>(
    repo: &R,
    user: &AuthenticatedUser,
    work_order_id: i32,
    form: AssignTechnicianForm,
) -> ServiceResult<()>
where
    R: AccessReader + TenantReader + WorkOrderReader + WorkOrderWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_UPDATE)?;

    let payload = AssignTechnicianPayload::try_from(form)?;
    if !TECHNICIAN_ROLES.contains(&payload.role.as_str()) {
        return Err(ServiceError::Form(format!(
            "technician role must be one of {}",
            TECHNICIAN_ROLES.join(", ")
        )));
    }

    let order = repo
        .get_work_order_by_id(WorkOrderId::new(work_order_id)?, actor.tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    let technician = repo
        .get_user_by_id(payload.user_id)?
        .filter(|u| {
            u.tenant_id == Some(actor.tenant_id) || u.current_tenant_id == Some(actor.tenant_id)
        })
        .ok_or_else(|| ServiceError::Form(format!("user {} does not exist", payload.user_id)))?;

    repo.assign_technician(order.id, technician.id, payload.role.as_str())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::commission::CommissionEventStatus;
    use crate::domain::sla::SlaPolicy;
    use crate::domain::types::{SlaPolicyId, TenantId};
    use crate::services::test_support::*;

    fn create_form() -> CreateWorkOrderForm {
        CreateWorkOrderForm {
            customer_id: 3,
            branch_id: None,
            quote_id: None,
            priority: "high".to_string(),
            description: Some("Calibração de balança".to_string()),
            assigned_to: Some(7),
            seller_id: None,
            driver_id: None,
            sla_policy_id: Some(2),
            is_warranty: false,
            displacement: None,
        }
    }

    fn status_form(status: &str) -> ChangeStatusForm {
        ChangeStatusForm {
            status: status.to_string(),
            notes: None,
        }
    }

    #[test]
    fn creation_derives_sla_deadline_from_policy() {
        let mut repo = repo_granting(&[PERMISSION_CREATE]);
        repo.expect_customer_exists().returning(|_, _| Ok(true));
        repo.expect_get_sla_policy().returning(|id, tenant_id| {
            Ok(Some(SlaPolicy {
                id,
                tenant_id,
                name: "Alta".to_string(),
                priority: "high".to_string(),
                response_hours: 2,
                resolution_hours: 8,
                is_active: true,
            }))
        });
        repo.expect_create_work_order()
            .withf(|new| {
                let hours = new
                    .sla_deadline
                    .map(|d| (d - Utc::now().naive_utc()).num_minutes());
                new.sla_policy_id == SlaPolicyId::new(2).ok()
                    && hours.is_some_and(|m| (475..=480).contains(&m))
                    && new.created_by.map(|u| u.get()) == Some(USER)
            })
            .times(1)
            .returning(|_| Ok(work_order(1, WorkOrderStatus::Open)));

        let order = create_work_order(&repo, &user(), create_form()).expect("created");

        assert_eq!(order.number, "OS-000001");
    }

    #[test]
    fn unknown_customer_is_rejected() {
        let mut repo = repo_granting(&[PERMISSION_CREATE]);
        repo.expect_customer_exists().returning(|_, _| Ok(false));
        repo.expect_create_work_order().never();

        assert!(matches!(
            create_work_order(&repo, &user(), create_form()),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn invoiced_orders_take_no_items() {
        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_get_work_order_by_id()
            .returning(|id, _| Ok(Some(work_order(id.get(), WorkOrderStatus::Invoiced))));
        repo.expect_add_work_order_item().never();

        let form = AddItemForm {
            item_type: "service".to_string(),
            description: "Mão de obra".to_string(),
            quantity: Decimal::ONE,
            unit_price: Decimal::from(150),
            cost_price: None,
        };

        assert!(matches!(
            add_item(&repo, &user(), 5, form),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn illegal_transition_is_a_conflict() {
        let mut repo = repo_granting(&[PERMISSION_CHANGE_STATUS]);
        repo.expect_get_work_order_by_id()
            .returning(|id, _| Ok(Some(work_order(id.get(), WorkOrderStatus::Open))));
        repo.expect_change_work_order_status().never();

        assert!(matches!(
            change_status(&repo, &user(), 5, status_form("invoiced")),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn concurrent_change_is_a_conflict() {
        let mut repo = repo_granting(&[PERMISSION_CHANGE_STATUS]);
        repo.expect_get_work_order_by_id()
            .returning(|id, _| Ok(Some(work_order(id.get(), WorkOrderStatus::Open))));
        repo.expect_change_work_order_status()
            .returning(|_| Err(RepositoryError::NotFound));

        assert!(matches!(
            change_status(&repo, &user(), 5, status_form("in_progress")),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn completion_generates_commissions() {
        let mut repo = repo_granting(&[PERMISSION_CHANGE_STATUS]);
        repo.expect_get_work_order_by_id()
            .returning(|id, _| Ok(Some(work_order(id.get(), WorkOrderStatus::InProgress))));
        repo.expect_change_work_order_status()
            .withf(|change| change.completed_at.is_some() && change.to == WorkOrderStatus::Completed)
            .returning(|change| {
                let mut order = work_order(change.work_order_id.get(), change.to);
                order.completed_at = change.completed_at;
                Ok(order)
            });
        repo.expect_commission_events_exist()
            .returning(|_, trigger| Ok(trigger != Trigger::OsCompleted));
        expect_commission_inputs(&mut repo, vec![technician_rule(10, Trigger::OsCompleted)]);
        repo.expect_create_commission_events().returning(|events| {
            Ok(events
                .iter()
                .map(|e| {
                    commission_event(
                        1,
                        e.work_order_id.get(),
                        e.commission_amount,
                        CommissionEventStatus::Pending,
                    )
                })
                .collect())
        });

        let outcome =
            change_status(&repo, &user(), 5, status_form("completed")).expect("transitioned");

        assert_eq!(outcome.order.status, WorkOrderStatus::Completed);
        assert_eq!(outcome.commissions.len(), 1);
    }

    #[test]
    fn already_generated_commissions_do_not_block_the_transition() {
        let mut repo = repo_granting(&[PERMISSION_CHANGE_STATUS]);
        repo.expect_get_work_order_by_id()
            .returning(|id, _| Ok(Some(work_order(id.get(), WorkOrderStatus::Delivered))));
        repo.expect_change_work_order_status()
            .returning(|change| Ok(work_order(change.work_order_id.get(), change.to)));
        repo.expect_commission_events_exist()
            .returning(|_, _| Ok(true));
        repo.expect_create_commission_events().never();

        let outcome =
            change_status(&repo, &user(), 5, status_form("invoiced")).expect("transitioned");

        assert!(outcome.commissions.is_empty());
    }

    #[test]
    fn technician_roles_are_restricted() {
        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_assign_technician().never();

        let form = AssignTechnicianForm {
            user_id: 7,
            role: "motorista".to_string(),
        };

        assert!(matches!(
            assign_technician(&repo, &user(), 5, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn technician_is_attached_with_pivot_role() {
        let mut repo = repo_granting(&[PERMISSION_UPDATE]);
        repo.expect_get_work_order_by_id()
            .returning(|id, _| Ok(Some(work_order(id.get(), WorkOrderStatus::Open))));
        repo.expect_get_user_by_id().returning(|id| {
            Ok(Some(crate::domain::tenant::User {
                id,
                tenant_id: TenantId::new(TENANT).ok(),
                current_tenant_id: TenantId::new(TENANT).ok(),
                name: crate::domain::types::PersonName::new("Carlos Souza").expect("valid"),
                email: crate::domain::types::Email::new("carlos@calibracoes.com.br")
                    .expect("valid"),
                is_active: true,
            }))
        });
        repo.expect_assign_technician()
            .withf(|order, user, role| order.get() == 5 && user.get() == 8 && role == "auxiliar")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let form = AssignTechnicianForm {
            user_id: 8,
            role: "auxiliar".to_string(),
        };

        assign_technician(&repo, &user(), 5, form).expect("assigned");
    }
}
