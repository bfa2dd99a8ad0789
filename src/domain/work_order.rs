//! Work orders (ordens de serviço), their items, and the status machine.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money;
use crate::domain::types::{
    BranchId, CustomerId, QuoteId, SanitizedText, SlaPolicyId, TenantId, TypeConstraintError,
    UserId, WorkOrderId,
};

/// Prefix of every work order number.
pub const NUMBER_PREFIX: &str = "OS-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Open,
    AwaitingDispatch,
    InProgress,
    WaitingParts,
    WaitingApproval,
    Completed,
    Delivered,
    Invoiced,
    Cancelled,
}

impl WorkOrderStatus {
    pub const ALL: [WorkOrderStatus; 9] = [
        WorkOrderStatus::Open,
        WorkOrderStatus::AwaitingDispatch,
        WorkOrderStatus::InProgress,
        WorkOrderStatus::WaitingParts,
        WorkOrderStatus::WaitingApproval,
        WorkOrderStatus::Completed,
        WorkOrderStatus::Delivered,
        WorkOrderStatus::Invoiced,
        WorkOrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkOrderStatus::Open => "open",
            WorkOrderStatus::AwaitingDispatch => "awaiting_dispatch",
            WorkOrderStatus::InProgress => "in_progress",
            WorkOrderStatus::WaitingParts => "waiting_parts",
            WorkOrderStatus::WaitingApproval => "waiting_approval",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Delivered => "delivered",
            WorkOrderStatus::Invoiced => "invoiced",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable from `self` in a single transition.
    pub fn allowed_transitions(self) -> &'static [WorkOrderStatus] {
        use WorkOrderStatus::*;
        match self {
            Open => &[AwaitingDispatch, InProgress, Cancelled],
            AwaitingDispatch => &[InProgress, Cancelled],
            InProgress => &[WaitingParts, WaitingApproval, Completed, Cancelled],
            WaitingParts => &[InProgress, Cancelled],
            WaitingApproval => &[InProgress, Completed, Cancelled],
            Completed => &[Delivered, InProgress, Cancelled],
            Delivered => &[Invoiced],
            Invoiced => &[],
            Cancelled => &[Open],
        }
    }

    pub fn can_transition_to(self, next: WorkOrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Orders in these statuses no longer run against their SLA.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            WorkOrderStatus::Completed | WorkOrderStatus::Cancelled | WorkOrderStatus::Invoiced
        )
    }
}

impl Display for WorkOrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkOrderStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkOrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TypeConstraintError::UnknownVariant {
                kind: "work order status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Product,
    Service,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Product => "product",
            ItemType::Service => "service",
        }
    }
}

impl FromStr for ItemType {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(ItemType::Product),
            "service" => Ok(ItemType::Service),
            other => Err(TypeConstraintError::UnknownVariant {
                kind: "item type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    pub tenant_id: TenantId,
    pub branch_id: Option<BranchId>,
    pub customer_id: CustomerId,
    pub quote_id: Option<QuoteId>,
    pub number: String,
    pub status: WorkOrderStatus,
    pub priority: String,
    pub description: Option<String>,
    pub assigned_to: Option<UserId>,
    pub seller_id: Option<UserId>,
    pub driver_id: Option<UserId>,
    pub sla_policy_id: Option<SlaPolicyId>,
    pub sla_deadline: Option<NaiveDateTime>,
    pub is_warranty: bool,
    pub discount: Decimal,
    pub discount_percentage: Decimal,
    pub discount_amount: Decimal,
    pub displacement: Decimal,
    pub total: Decimal,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewWorkOrder {
    pub tenant_id: TenantId,
    pub branch_id: Option<BranchId>,
    pub customer_id: CustomerId,
    pub quote_id: Option<QuoteId>,
    pub priority: String,
    pub description: Option<SanitizedText>,
    pub assigned_to: Option<UserId>,
    pub seller_id: Option<UserId>,
    pub driver_id: Option<UserId>,
    pub created_by: Option<UserId>,
    pub sla_policy_id: Option<SlaPolicyId>,
    pub sla_deadline: Option<NaiveDateTime>,
    pub is_warranty: bool,
    pub displacement: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkOrderItem {
    pub item_type: ItemType,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub cost_price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewWorkOrderItem {
    pub work_order_id: WorkOrderId,
    pub tenant_id: TenantId,
    pub item_type: ItemType,
    pub description: SanitizedText,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub cost_price: Decimal,
}

impl NewWorkOrderItem {
    /// Line total: quantity times unit price.
    pub fn total(&self) -> Decimal {
        money::mul(self.quantity, self.unit_price)
    }
}

/// Technician attached to an order through the pivot table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTechnician {
    pub user_id: UserId,
    pub role: String,
}

/// A validated status change ready to be persisted with its history row.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub work_order_id: WorkOrderId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub from: WorkOrderStatus,
    pub to: WorkOrderStatus,
    pub notes: Option<String>,
    pub changed_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

/// Discount and total after applying items, displacement, and discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub discount_amount: Decimal,
    pub total: Decimal,
}

/// Formats the `n`-th order number of a tenant, e.g. `OS-000042`.
pub fn format_number(sequence: u64) -> String {
    format!("{NUMBER_PREFIX}{sequence:06}")
}

/// Next sequence after the highest existing number; missing or non-numeric
/// numbers restart at one. Fails once the sequence cannot grow.
pub fn next_number(last: Option<&str>) -> Result<String, TypeConstraintError> {
    let Some(digits) = last
        .and_then(|n| n.strip_prefix(NUMBER_PREFIX))
        .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
    else {
        return Ok(format_number(1));
    };

    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_add(1))
        .map(format_number)
        .ok_or_else(|| {
            TypeConstraintError::InvalidValue(format!("work order sequence exhausted at {digits}"))
        })
}

/// Items total plus displacement minus discount, clamped at zero.
///
/// A positive percentage takes precedence; otherwise the fixed discount
/// applies. The two are never combined.
pub fn recalculate_total(
    items: &[WorkOrderItem],
    discount_percentage: Decimal,
    discount: Decimal,
    displacement: Decimal,
) -> Totals {
    let items_total = money::truncate(items.iter().map(|i| i.total).sum());

    let discount_amount = if discount_percentage > Decimal::ZERO {
        let factor = money::div(discount_percentage, Decimal::ONE_HUNDRED, 4);
        money::mul(items_total, factor)
    } else {
        discount
    };

    let total = money::truncate(items_total + displacement - discount_amount);

    Totals {
        discount_amount,
        total: total.max(Decimal::ZERO),
    }
}

/// Deadline for a new order under a policy with `resolution_hours`.
pub fn sla_deadline(created_at: NaiveDateTime, resolution_hours: i32) -> NaiveDateTime {
    created_at + Duration::hours(i64::from(resolution_hours))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn item(item_type: ItemType, total: i64) -> WorkOrderItem {
        WorkOrderItem {
            item_type,
            description: "item".to_string(),
            quantity: Decimal::ONE,
            unit_price: money::from_cents(total),
            cost_price: Decimal::ZERO,
            total: money::from_cents(total),
        }
    }

    #[test]
    fn transition_table_matches_workflow() {
        use WorkOrderStatus::*;
        assert!(Open.can_transition_to(InProgress));
        assert!(Open.can_transition_to(AwaitingDispatch));
        assert!(!Open.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Delivered));
        assert!(Completed.can_transition_to(InProgress));
        assert!(Delivered.can_transition_to(Invoiced));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(Invoiced.allowed_transitions().is_empty());
        assert_eq!(Cancelled.allowed_transitions(), &[Open]);
    }

    #[test]
    fn every_status_round_trips_through_text() {
        for status in WorkOrderStatus::ALL {
            assert_eq!(status.as_str().parse::<WorkOrderStatus>(), Ok(status));
        }
        assert!("concluida".parse::<WorkOrderStatus>().is_err());
    }

    #[test]
    fn numbering_continues_from_highest() {
        assert_eq!(next_number(None).as_deref(), Ok("OS-000001"));
        assert_eq!(next_number(Some("OS-000041")).as_deref(), Ok("OS-000042"));
        assert_eq!(next_number(Some("legacy")).as_deref(), Ok("OS-000001"));
        assert_eq!(next_number(Some("OS-4294967295")).as_deref(), Ok("OS-4294967296"));
        assert_eq!(format_number(1_234_567), "OS-1234567");
    }

    #[test]
    fn exhausted_sequence_is_an_error() {
        assert!(next_number(Some("OS-18446744073709551615")).is_err());
        assert!(next_number(Some("OS-99999999999999999999999")).is_err());
    }

    #[test]
    fn percentage_discount_wins_over_fixed() {
        let items = vec![item(ItemType::Service, 100_000), item(ItemType::Product, 50_000)];

        let totals = recalculate_total(
            &items,
            Decimal::from(10),
            money::from_cents(99_999),
            money::from_cents(5_000),
        );

        assert_eq!(totals.discount_amount, money::from_cents(15_000));
        assert_eq!(totals.total, money::from_cents(140_000));
    }

    #[test]
    fn fixed_discount_applies_and_total_clamps_at_zero() {
        let items = vec![item(ItemType::Service, 10_000)];

        let totals = recalculate_total(
            &items,
            Decimal::ZERO,
            money::from_cents(20_000),
            Decimal::ZERO,
        );

        assert_eq!(totals.discount_amount, money::from_cents(20_000));
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn deadline_adds_resolution_hours() {
        let created = NaiveDate::from_ymd_opt(2026, 3, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid datetime");
        let deadline = sla_deadline(created, 48);
        assert_eq!(deadline, created + Duration::hours(48));
    }
}
