//! SLA sweeps and the compliance dashboard.

use chrono::{Duration, NaiveDateTime, Utc};

use crate::domain::sla::{
    CheckResults, DashboardStats, Escalation, EscalationLevel, SlaSubject, evaluate, percent_used,
};
use crate::domain::system_alert::NewSystemAlert;
use crate::domain::types::TenantId;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{AccessReader, SlaReader, SlaWriter};
use crate::services::{ServiceResult, ensure_permission};

pub const PERMISSION_RUN_CHECKS: &str = "os.work_order.update";
pub const PERMISSION_VIEW_DASHBOARD: &str = "os.work_order.view";

/// Window in which an escalation level is not repeated for the same record.
pub const ESCALATION_COOLDOWN_HOURS: i64 = 24;

struct Tracked {
    subject: SlaSubject,
    id: i32,
    label: String,
    created_at: NaiveDateTime,
    deadline: NaiveDateTime,
}

/// Escalation due for one record, consulting recent alerts only for the
/// levels its elapsed time has reached.
fn escalation_for<R>(
    repo: &R,
    tenant_id: TenantId,
    record: &Tracked,
    now: NaiveDateTime,
) -> ServiceResult<Option<Escalation>>
where
    R: SlaReader + ?Sized,
{
    let Some(percent) = percent_used(record.created_at, record.deadline, now) else {
        return Ok(None);
    };

    let since = now - Duration::hours(ESCALATION_COOLDOWN_HOURS);
    let mut recent = Vec::new();
    for level in EscalationLevel::ALL {
        if percent < f64::from(level.threshold()) {
            break;
        }
        if repo.alert_recorded_since(
            tenant_id,
            &record.subject.alert_type(level),
            record.subject.model_type(),
            record.id,
            since,
        )? {
            recent.push(level);
        }
    }

    Ok(evaluate(record.created_at, record.deadline, now, |level| {
        recent.contains(&level)
    }))
}

/// Evaluates every open work order and service call of the caller's tenant
/// and records an alert for each new escalation.
pub fn run_checks<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<CheckResults>
where
    R: AccessReader + SlaReader + SlaWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_RUN_CHECKS)?;
    let tenant_id = actor.tenant_id;
    let now = Utc::now().naive_utc();

    let orders = repo
        .list_open_work_orders_with_deadline(tenant_id)?
        .into_iter()
        .filter_map(|order| {
            order.sla_deadline.map(|deadline| Tracked {
                subject: SlaSubject::WorkOrder,
                id: order.id.get(),
                label: order.number,
                created_at: order.created_at,
                deadline,
            })
        });
    let calls = repo
        .list_open_service_calls_with_deadline(tenant_id)?
        .into_iter()
        .filter_map(|call| {
            call.sla_deadline.map(|deadline| Tracked {
                subject: SlaSubject::ServiceCall,
                id: call.id.get(),
                label: call.call_number,
                created_at: call.created_at,
                deadline,
            })
        });

    let mut results = CheckResults::default();
    for record in orders.chain(calls) {
        results.checked += 1;

        let Some(escalation) = escalation_for(repo, tenant_id, &record, now)? else {
            continue;
        };

        repo.create_system_alert(&NewSystemAlert::sla_escalation(
            tenant_id,
            record.subject,
            record.id,
            &escalation,
        ))?;
        log::warn!(
            "SLA {} for {} ({}% used, notify {:?})",
            escalation.level,
            record.label,
            escalation.percent_used,
            escalation.target
        );

        results.escalated += 1;
        if record.subject == SlaSubject::WorkOrder && escalation.level == EscalationLevel::Breached
        {
            results.breached += 1;
        }
    }

    log::info!(
        "SLA check for tenant {tenant_id}: {} checked, {} escalated, {} breached",
        results.checked,
        results.escalated,
        results.breached
    );

    Ok(results)
}

/// Compliance snapshot of the tenant's SLA-tracked work orders.
pub fn dashboard<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<DashboardStats>
where
    R: AccessReader + SlaReader + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_VIEW_DASHBOARD)?;
    let now = Utc::now().naive_utc();

    let mut stats = DashboardStats::default();
    for order in repo.list_sla_tracked_work_orders(actor.tenant_id)? {
        let Some(deadline) = order.sla_deadline else {
            continue;
        };
        if order.status.is_closed() {
            stats.record_finished(order.completed_at.unwrap_or(order.updated_at), deadline);
        } else {
            stats.record_open(percent_used(order.created_at, deadline, now));
        }
    }

    Ok(stats.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::system_alert::SystemAlert;
    use crate::domain::types::SystemAlertId;
    use crate::domain::work_order::{WorkOrder, WorkOrderStatus};
    use crate::services::test_support::*;

    /// Order created `elapsed` hours ago with a ten hour window.
    fn running_order(id: i32, elapsed: i64, status: WorkOrderStatus) -> WorkOrder {
        let mut order = work_order(id, status);
        order.created_at = now() - Duration::hours(elapsed);
        order.sla_deadline = Some(order.created_at + Duration::hours(10));
        order
    }

    fn stored(alert: &NewSystemAlert) -> SystemAlert {
        SystemAlert {
            id: SystemAlertId::new(1).expect("valid id"),
            tenant_id: alert.tenant_id,
            alert_type: alert.alert_type.clone(),
            severity: alert.severity.clone(),
            title: alert.title.clone(),
            message: alert.message.clone(),
            model_type: alert.model_type.clone(),
            model_id: alert.model_id,
            metadata: alert.metadata.clone(),
            acknowledged_at: None,
            created_at: now(),
        }
    }

    #[test]
    fn checks_escalate_and_count_breaches() {
        let mut repo = repo_granting(&[PERMISSION_RUN_CHECKS]);
        repo.expect_list_open_work_orders_with_deadline()
            .returning(|_| {
                Ok(vec![
                    running_order(1, 2, WorkOrderStatus::Open),
                    running_order(2, 8, WorkOrderStatus::InProgress),
                    running_order(3, 12, WorkOrderStatus::InProgress),
                ])
            });
        repo.expect_list_open_service_calls_with_deadline()
            .returning(|_| Ok(Vec::new()));
        repo.expect_alert_recorded_since()
            .returning(|_, _, _, _, _| Ok(false));
        repo.expect_create_system_alert()
            .times(2)
            .returning(|alert| Ok(stored(alert)));

        let results = run_checks(&repo, &user()).expect("checked");

        assert_eq!(
            results,
            CheckResults {
                checked: 3,
                escalated: 2,
                breached: 1,
            }
        );
    }

    #[test]
    fn recent_escalations_are_not_repeated() {
        let mut repo = repo_granting(&[PERMISSION_RUN_CHECKS]);
        repo.expect_list_open_work_orders_with_deadline()
            .returning(|_| Ok(vec![running_order(2, 8, WorkOrderStatus::InProgress)]));
        repo.expect_list_open_service_calls_with_deadline()
            .returning(|_| Ok(Vec::new()));
        repo.expect_alert_recorded_since()
            .returning(|_, alert_type, model_type, _, _| {
                Ok(model_type == "work_order" && alert_type != "sla_escalation_warning")
            });
        repo.expect_create_system_alert()
            .withf(|alert| alert.alert_type == "sla_escalation_warning")
            .times(1)
            .returning(|alert| Ok(stored(alert)));

        let results = run_checks(&repo, &user()).expect("checked");

        assert_eq!(results.escalated, 1);
        assert_eq!(results.breached, 0);
    }

    #[test]
    fn dashboard_reports_compliance() {
        let mut repo = repo_granting(&[PERMISSION_VIEW_DASHBOARD]);
        repo.expect_list_sla_tracked_work_orders().returning(|_| {
            let mut late = running_order(4, 20, WorkOrderStatus::Completed);
            late.completed_at = late.sla_deadline.map(|d| d + Duration::hours(1));
            let mut early = running_order(5, 20, WorkOrderStatus::Completed);
            early.completed_at = Some(early.created_at + Duration::hours(3));
            Ok(vec![
                running_order(1, 2, WorkOrderStatus::Open),
                running_order(2, 8, WorkOrderStatus::InProgress),
                late,
                early,
            ])
        });

        let stats = dashboard(&repo, &user()).expect("computed");

        assert_eq!(stats.total, 4);
        assert_eq!(stats.on_time, 2);
        assert_eq!(stats.at_risk, 1);
        assert_eq!(stats.breached, 1);
        assert_eq!(stats.compliance_rate, 50.0);
    }
}
