//! Diesel models for work orders, their items, technicians, and history.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::money;
use crate::domain::types::{
    BranchId, CustomerId, QuoteId, SanitizedText, SlaPolicyId, TenantId, TypeConstraintError,
    UserId, WorkOrderId,
};
use crate::domain::work_order::{
    NewWorkOrder as DomainNewWorkOrder, NewWorkOrderItem as DomainNewWorkOrderItem,
    OrderTechnician as DomainOrderTechnician, StatusChange, WorkOrder as DomainWorkOrder,
    WorkOrderItem as DomainWorkOrderItem,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::work_orders)]
/// Diesel model for [`crate::domain::work_order::WorkOrder`].
pub struct WorkOrder {
    pub id: i32,
    pub tenant_id: i32,
    pub branch_id: Option<i32>,
    pub customer_id: i32,
    pub equipment_id: Option<i32>,
    pub quote_id: Option<i32>,
    pub number: String,
    pub status: String,
    pub priority: String,
    pub origin: String,
    pub lead_source: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<i32>,
    pub seller_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub created_by: Option<i32>,
    pub sla_policy_id: Option<i32>,
    pub sla_deadline: Option<NaiveDateTime>,
    pub is_warranty: bool,
    pub discount_cents: i64,
    pub discount_percentage: String,
    pub discount_amount_cents: i64,
    pub displacement_cents: i64,
    pub total_cents: i64,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::work_orders)]
pub struct NewWorkOrder<'a> {
    pub tenant_id: i32,
    pub branch_id: Option<i32>,
    pub customer_id: i32,
    pub quote_id: Option<i32>,
    pub number: &'a str,
    pub priority: &'a str,
    pub description: Option<&'a str>,
    pub assigned_to: Option<i32>,
    pub seller_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub created_by: Option<i32>,
    pub sla_policy_id: Option<i32>,
    pub sla_deadline: Option<NaiveDateTime>,
    pub is_warranty: bool,
    pub displacement_cents: i64,
    pub total_cents: i64,
}

impl<'a> NewWorkOrder<'a> {
    /// Insertable row for `order` under the already allocated `number`.
    pub fn numbered(
        order: &'a DomainNewWorkOrder,
        number: &'a str,
    ) -> Result<Self, TypeConstraintError> {
        let displacement_cents = money::to_cents(order.displacement)?;
        Ok(Self {
            tenant_id: order.tenant_id.get(),
            branch_id: order.branch_id.map(BranchId::get),
            customer_id: order.customer_id.get(),
            quote_id: order.quote_id.map(QuoteId::get),
            number,
            priority: order.priority.as_str(),
            description: order.description.as_ref().map(SanitizedText::as_str),
            assigned_to: order.assigned_to.map(UserId::get),
            seller_id: order.seller_id.map(UserId::get),
            driver_id: order.driver_id.map(UserId::get),
            created_by: order.created_by.map(UserId::get),
            sla_policy_id: order.sla_policy_id.map(SlaPolicyId::get),
            sla_deadline: order.sla_deadline,
            is_warranty: order.is_warranty,
            displacement_cents,
            total_cents: displacement_cents,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::work_order_items)]
pub struct WorkOrderItem {
    pub id: i32,
    pub tenant_id: i32,
    pub work_order_id: i32,
    pub item_type: String,
    pub description: String,
    pub quantity: String,
    pub unit_price_cents: i64,
    pub cost_price_cents: i64,
    pub total_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::work_order_items)]
pub struct NewWorkOrderItem<'a> {
    pub tenant_id: i32,
    pub work_order_id: i32,
    pub item_type: &'a str,
    pub description: &'a str,
    pub quantity: String,
    pub unit_price_cents: i64,
    pub cost_price_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::work_order_technicians)]
pub struct WorkOrderTechnician {
    pub work_order_id: i32,
    pub user_id: i32,
    pub role: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::work_order_technicians)]
pub struct NewWorkOrderTechnician<'a> {
    pub work_order_id: i32,
    pub user_id: i32,
    pub role: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::work_order_status_history)]
pub struct NewStatusHistory<'a> {
    pub tenant_id: i32,
    pub work_order_id: i32,
    pub user_id: Option<i32>,
    pub from_status: Option<&'a str>,
    pub to_status: &'a str,
    pub notes: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<WorkOrder> for DomainWorkOrder {
    type Error = TypeConstraintError;

    fn try_from(order: WorkOrder) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WorkOrderId::try_from(order.id)?,
            tenant_id: TenantId::try_from(order.tenant_id)?,
            branch_id: order.branch_id.map(BranchId::try_from).transpose()?,
            customer_id: CustomerId::try_from(order.customer_id)?,
            quote_id: order.quote_id.map(QuoteId::try_from).transpose()?,
            number: order.number,
            status: order.status.parse()?,
            priority: order.priority,
            description: order.description,
            assigned_to: order.assigned_to.map(UserId::try_from).transpose()?,
            seller_id: order.seller_id.map(UserId::try_from).transpose()?,
            driver_id: order.driver_id.map(UserId::try_from).transpose()?,
            sla_policy_id: order.sla_policy_id.map(SlaPolicyId::try_from).transpose()?,
            sla_deadline: order.sla_deadline,
            is_warranty: order.is_warranty,
            discount: money::from_cents(order.discount_cents),
            discount_percentage: money::parse_decimal(&order.discount_percentage)?,
            discount_amount: money::from_cents(order.discount_amount_cents),
            displacement: money::from_cents(order.displacement_cents),
            total: money::from_cents(order.total_cents),
            completed_at: order.completed_at,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}

impl TryFrom<WorkOrderItem> for DomainWorkOrderItem {
    type Error = TypeConstraintError;

    fn try_from(item: WorkOrderItem) -> Result<Self, Self::Error> {
        Ok(Self {
            item_type: item.item_type.parse()?,
            description: item.description,
            quantity: money::parse_decimal(&item.quantity)?,
            unit_price: money::from_cents(item.unit_price_cents),
            cost_price: money::from_cents(item.cost_price_cents),
            total: money::from_cents(item.total_cents),
        })
    }
}

impl<'a> TryFrom<&'a DomainNewWorkOrderItem> for NewWorkOrderItem<'a> {
    type Error = TypeConstraintError;

    fn try_from(item: &'a DomainNewWorkOrderItem) -> Result<Self, Self::Error> {
        Ok(Self {
            tenant_id: item.tenant_id.get(),
            work_order_id: item.work_order_id.get(),
            item_type: item.item_type.as_str(),
            description: item.description.as_str(),
            quantity: item.quantity.normalize().to_string(),
            unit_price_cents: money::to_cents(item.unit_price)?,
            cost_price_cents: money::to_cents(item.cost_price)?,
            total_cents: money::to_cents(item.total())?,
        })
    }
}

impl TryFrom<WorkOrderTechnician> for DomainOrderTechnician {
    type Error = TypeConstraintError;

    fn try_from(technician: WorkOrderTechnician) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::try_from(technician.user_id)?,
            role: technician.role,
        })
    }
}

impl<'a> From<&'a StatusChange> for NewStatusHistory<'a> {
    fn from(change: &'a StatusChange) -> Self {
        Self {
            tenant_id: change.tenant_id.get(),
            work_order_id: change.work_order_id.get(),
            user_id: Some(change.user_id.get()),
            from_status: Some(change.from.as_str()),
            to_status: change.to.as_str(),
            notes: change.notes.as_deref(),
            created_at: change.changed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::work_order::{ItemType, WorkOrderStatus};

    fn row() -> WorkOrder {
        WorkOrder {
            id: 5,
            tenant_id: 1,
            branch_id: None,
            customer_id: 2,
            equipment_id: None,
            quote_id: None,
            number: "OS-000005".into(),
            status: "in_progress".into(),
            priority: "normal".into(),
            origin: "manual".into(),
            lead_source: None,
            description: None,
            assigned_to: Some(7),
            seller_id: None,
            driver_id: None,
            created_by: None,
            sla_policy_id: None,
            sla_deadline: None,
            is_warranty: false,
            discount_cents: 0,
            discount_percentage: "10.5".into(),
            discount_amount_cents: 1050,
            displacement_cents: 2500,
            total_cents: 11450,
            completed_at: None,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
            deleted_at: None,
        }
    }

    #[test]
    fn work_order_row_into_domain() {
        let order = DomainWorkOrder::try_from(row()).expect("valid order");

        assert_eq!(order.status, WorkOrderStatus::InProgress);
        assert_eq!(order.discount_percentage, Decimal::new(105, 1));
        assert_eq!(order.total, Decimal::new(11450, 2));
        assert_eq!(order.assigned_to.map(UserId::get), Some(7));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut db = row();
        db.status = "concluida".into();

        assert!(DomainWorkOrder::try_from(db).is_err());
    }

    #[test]
    fn new_item_stores_cents_and_total() {
        let item = DomainNewWorkOrderItem {
            work_order_id: WorkOrderId::new(5).expect("valid id"),
            tenant_id: TenantId::new(1).expect("valid id"),
            item_type: ItemType::Product,
            description: SanitizedText::new("Sensor de pressão").expect("non-empty"),
            quantity: Decimal::new(250, 2),
            unit_price: Decimal::new(1999, 2),
            cost_price: Decimal::new(1000, 2),
        };

        let new = NewWorkOrderItem::try_from(&item).expect("amounts in range");

        assert_eq!(new.quantity, "2.5");
        assert_eq!(new.unit_price_cents, 1999);
        assert_eq!(new.total_cents, 4997);
    }

    #[test]
    fn new_item_rejects_totals_beyond_cents_range() {
        let item = DomainNewWorkOrderItem {
            work_order_id: WorkOrderId::new(5).expect("valid id"),
            tenant_id: TenantId::new(1).expect("valid id"),
            item_type: ItemType::Product,
            description: SanitizedText::new("Lote").expect("non-empty"),
            quantity: Decimal::MAX,
            unit_price: Decimal::from(10),
            cost_price: Decimal::ZERO,
        };

        assert!(NewWorkOrderItem::try_from(&item).is_err());
    }
}
