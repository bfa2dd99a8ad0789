//! Commission simulation, generation, payment release, and settlements.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::commission::{
    CalculationContext, CommissionCalculation, CommissionEvent, CommissionInput, NewCommissionEvent,
    NewSettlement, Release, Settlement, SettlementStatus, Trigger, calculate_commissions,
    identify_beneficiaries, plan_release, release_proportion, validate_period,
};
use crate::domain::money;
use crate::domain::types::{ReceivableId, SettlementId, WorkOrderId};
use crate::domain::work_order::WorkOrder;
use crate::dto::commissions::{GeneratedCommissions, ReleaseOutcome, SimulationResponse};
use crate::forms::commissions::{
    CloseSettlementForm, CloseSettlementPayload, GenerateCommissionsForm,
    GenerateCommissionsPayload, PaySettlementForm, PaySettlementPayload,
};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{AccessReader, CommissionReader, CommissionWriter, WorkOrderReader};
use crate::services::{ServiceError, ServiceResult, ensure_permission};

pub const PERMISSION_RULE_VIEW: &str = "commissions.rule.view";
pub const PERMISSION_RULE_CREATE: &str = "commissions.rule.create";
pub const PERMISSION_RECEIVABLE_SETTLE: &str = "finance.receivable.settle";
pub const PERMISSION_SETTLEMENT_CREATE: &str = "commissions.settlement.create";
pub const PERMISSION_SETTLEMENT_APPROVE: &str = "commissions.settlement.approve";

fn calculate<R>(
    repo: &R,
    order: &WorkOrder,
    trigger: Option<Trigger>,
) -> ServiceResult<Vec<CommissionCalculation>>
where
    R: WorkOrderReader + CommissionReader + ?Sized,
{
    let items = repo.list_work_order_items(order.id)?;
    let expenses = repo.sum_approved_expenses(order.id)?;
    let context = CalculationContext::from_order(order, &items, expenses);

    let technicians = repo.list_work_order_technicians(order.id)?;
    let beneficiaries = identify_beneficiaries(
        &order.number,
        order.assigned_to,
        &technicians,
        order.seller_id,
        order.driver_id,
    );

    let rules = repo.list_commission_rules(order.tenant_id)?;
    let campaigns = repo.list_running_campaigns(order.tenant_id, Utc::now().date_naive())?;
    let quote_source = match order.quote_id {
        Some(quote_id) => repo.get_quote_source(quote_id)?,
        None => None,
    };

    Ok(calculate_commissions(
        &CommissionInput {
            order,
            context: &context,
            beneficiaries: &beneficiaries,
            rules: &rules,
            campaigns: &campaigns,
            quote_source: quote_source.as_deref(),
        },
        trigger,
    ))
}

/// Persists the pending events `trigger` earns on `order`.
///
/// Fails with [`ServiceError::Conflict`] when events for this order and
/// trigger already exist. Callers authorize.
pub fn generate_for_order<R>(
    repo: &R,
    order: &WorkOrder,
    trigger: Trigger,
) -> ServiceResult<Vec<CommissionEvent>>
where
    R: WorkOrderReader + CommissionReader + CommissionWriter + ?Sized,
{
    if repo.commission_events_exist(order.id, trigger)? {
        return Err(ServiceError::Conflict(format!(
            "commissions for {} on {trigger} were already generated",
            order.number
        )));
    }

    let calculations = calculate(repo, order, Some(trigger))?;
    if calculations.is_empty() {
        return Ok(Vec::new());
    }

    let events: Vec<NewCommissionEvent> = calculations
        .iter()
        .map(|calc| NewCommissionEvent::pending(order, trigger, calc))
        .collect();
    let created = repo.create_commission_events(&events)?;
    log::info!(
        "Generated {} commission events for {} on {trigger}",
        created.len(),
        order.number
    );

    Ok(created)
}

/// Tries every trigger in order and returns the first non-empty result.
///
/// An already generated trigger stops the search; other failures are logged
/// and the next trigger is tried.
pub fn generate_any_trigger<R>(repo: &R, order: &WorkOrder) -> ServiceResult<Vec<CommissionEvent>>
where
    R: WorkOrderReader + CommissionReader + CommissionWriter + ?Sized,
{
    for trigger in Trigger::ALL {
        match generate_for_order(repo, order, *trigger) {
            Ok(events) if !events.is_empty() => return Ok(events),
            Ok(_) => {}
            Err(err @ ServiceError::Conflict(_)) => return Err(err),
            Err(err) => {
                log::warn!(
                    "Commission generation for {} on {trigger} failed: {err}",
                    order.number
                );
            }
        }
    }
    Ok(Vec::new())
}

/// Previews every beneficiary's commission without persisting anything.
pub fn simulate<R>(
    repo: &R,
    user: &AuthenticatedUser,
    work_order_id: i32,
) -> ServiceResult<SimulationResponse>
where
    R: AccessReader + WorkOrderReader + CommissionReader + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_RULE_VIEW)?;

    let order = repo
        .get_work_order_by_id(WorkOrderId::new(work_order_id)?, actor.tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    Ok(SimulationResponse {
        work_order_id: order.id.get(),
        calculations: calculate(repo, &order, None)?,
    })
}

pub fn generate<R>(
    repo: &R,
    user: &AuthenticatedUser,
    work_order_id: i32,
    form: GenerateCommissionsForm,
) -> ServiceResult<GeneratedCommissions>
where
    R: AccessReader + WorkOrderReader + CommissionReader + CommissionWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_RULE_CREATE)?;

    let payload = GenerateCommissionsPayload::try_from(form)?;

    let order = repo
        .get_work_order_by_id(WorkOrderId::new(work_order_id)?, actor.tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    let events = match payload.trigger {
        Some(trigger) => generate_for_order(repo, &order, trigger)?,
        None => generate_any_trigger(repo, &order)?,
    };

    Ok(GeneratedCommissions {
        work_order_id: order.id.get(),
        events,
    })
}

/// Releases the pending commissions of the receivable's work order in
/// proportion to the payment.
///
/// Receivables without an order, and orders without a positive total,
/// release nothing.
pub fn release_by_payment<R>(
    repo: &R,
    user: &AuthenticatedUser,
    receivable_id: i32,
) -> ServiceResult<ReleaseOutcome>
where
    R: AccessReader + WorkOrderReader + CommissionReader + CommissionWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_RECEIVABLE_SETTLE)?;

    let receivable = repo
        .get_receivable_by_id(ReceivableId::new(receivable_id)?, actor.tenant_id)?
        .ok_or(ServiceError::NotFound)?;

    let Some(work_order_id) = receivable.work_order_id else {
        return Ok(ReleaseOutcome::default());
    };
    let Some(order) = repo.get_work_order_by_id(work_order_id, actor.tenant_id)? else {
        return Ok(ReleaseOutcome::default());
    };
    if order.total <= Decimal::ZERO {
        return Ok(ReleaseOutcome::default());
    }

    let proportion = release_proportion(receivable.amount, order.total);
    let pending = repo.list_pending_commission_events(order.id)?;
    if pending.is_empty() {
        return Ok(ReleaseOutcome {
            proportion,
            released: 0,
        });
    }

    let today = Utc::now().date_naive();
    let releases: Vec<(CommissionEvent, Release)> = pending
        .into_iter()
        .map(|event| {
            let release = plan_release(&event, proportion, receivable.id, today);
            (event, release)
        })
        .collect();

    let released = repo.apply_commission_releases(receivable.id, &releases)?;
    log::info!(
        "Released {released} commissions of {} for receivable {} ({proportion})",
        order.number,
        receivable.id
    );

    Ok(ReleaseOutcome {
        proportion,
        released,
    })
}

/// Closes a user's approved commissions of a month into a settlement.
pub fn close_settlement<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CloseSettlementForm,
) -> ServiceResult<Settlement>
where
    R: AccessReader + CommissionReader + CommissionWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_SETTLEMENT_CREATE)?;

    let payload = CloseSettlementPayload::try_from(form)?;
    let now = Utc::now().naive_utc();
    let period = validate_period(&payload.period, now.date())
        .map_err(|e| ServiceError::Form(e.to_string()))?;

    let existing = repo.get_settlement_by_period(actor.tenant_id, payload.user_id, &period)?;
    if existing.is_some_and(|s| s.status == SettlementStatus::Paid) {
        return Err(ServiceError::Form(format!(
            "the settlement of {period} was already paid"
        )));
    }

    let events = repo.list_settleable_events(actor.tenant_id, payload.user_id, &period)?;
    if events.is_empty() {
        return Err(ServiceError::Form(format!(
            "no approved commissions in {period}"
        )));
    }

    let total_amount = money::truncate(events.iter().map(|e| e.commission_amount).sum());
    let event_ids: Vec<_> = events.iter().map(|e| e.id).collect();
    let settlement = repo.close_settlement(
        &NewSettlement {
            tenant_id: actor.tenant_id,
            user_id: payload.user_id,
            period,
            total_amount,
            events_count: i32::try_from(event_ids.len()).unwrap_or(i32::MAX),
            closed_at: now,
        },
        &event_ids,
    )?;
    log::info!(
        "Closed settlement {} for user {} ({} events)",
        settlement.period,
        settlement.user_id,
        settlement.events_count
    );

    Ok(settlement)
}

pub fn approve_settlement<R>(
    repo: &R,
    user: &AuthenticatedUser,
    settlement_id: i32,
) -> ServiceResult<Settlement>
where
    R: AccessReader + CommissionReader + CommissionWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_SETTLEMENT_APPROVE)?;

    let settlement = repo
        .get_settlement_by_id(SettlementId::new(settlement_id)?, actor.tenant_id)?
        .ok_or(ServiceError::NotFound)?;
    if settlement.status != SettlementStatus::Closed {
        return Err(ServiceError::Conflict(format!(
            "only closed settlements can be approved; this one is {}",
            settlement.status
        )));
    }

    Ok(repo.approve_settlement(settlement.id, actor.user_id, Utc::now().naive_utc())?)
}

/// Pays a closed or approved settlement. The paid amount defaults to the
/// settlement total.
pub fn pay_settlement<R>(
    repo: &R,
    user: &AuthenticatedUser,
    settlement_id: i32,
    form: PaySettlementForm,
) -> ServiceResult<Settlement>
where
    R: AccessReader + CommissionReader + CommissionWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_SETTLEMENT_CREATE)?;

    let payload = PaySettlementPayload::try_from(form)?;

    let settlement = repo
        .get_settlement_by_id(SettlementId::new(settlement_id)?, actor.tenant_id)?
        .ok_or(ServiceError::NotFound)?;
    if settlement.status == SettlementStatus::Paid {
        return Err(ServiceError::Conflict(
            "settlement is already paid".to_string(),
        ));
    }

    let amount = payload.paid_amount.unwrap_or(settlement.total_amount);
    let paid = repo.pay_settlement(settlement.id, amount, Utc::now().naive_utc())?;
    log::info!("Paid settlement {} ({amount})", paid.id);

    Ok(paid)
}
