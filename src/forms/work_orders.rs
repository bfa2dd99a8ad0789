use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::domain::commission::ROLE_TECHNICIAN;
use crate::domain::money;
use crate::domain::types::{
    BranchId, CustomerId, QuoteId, RoleName, SanitizedText, SlaPolicyId, TenantId,
    TypeConstraintError, UserId,
};
use crate::domain::work_order::{ItemType, NewWorkOrder, WorkOrderStatus};
use crate::forms::{FormError, id_error};

pub const PRIORITIES: [&str; 4] = ["low", "normal", "high", "urgent"];

fn default_priority() -> String {
    "normal".to_string()
}

fn default_technician_role() -> String {
    ROLE_TECHNICIAN.to_string()
}

fn optional_id<T>(
    value: Option<i32>,
    field: &'static str,
    new: fn(i32) -> Result<T, TypeConstraintError>,
) -> Result<Option<T>, FormError> {
    value.map(new).transpose().map_err(id_error(field))
}

fn optional_text(value: Option<String>) -> Option<SanitizedText> {
    value.and_then(|text| SanitizedText::new(text).ok())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkOrderForm {
    pub customer_id: i32,
    pub branch_id: Option<i32>,
    pub quote_id: Option<i32>,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub assigned_to: Option<i32>,
    pub seller_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub sla_policy_id: Option<i32>,
    #[serde(default)]
    pub is_warranty: bool,
    pub displacement: Option<Decimal>,
}

pub struct CreateWorkOrderPayload {
    pub customer_id: CustomerId,
    pub branch_id: Option<BranchId>,
    pub quote_id: Option<QuoteId>,
    pub priority: String,
    pub description: Option<SanitizedText>,
    pub assigned_to: Option<UserId>,
    pub seller_id: Option<UserId>,
    pub driver_id: Option<UserId>,
    pub sla_policy_id: Option<SlaPolicyId>,
    pub is_warranty: bool,
    pub displacement: Decimal,
}

impl TryFrom<CreateWorkOrderForm> for CreateWorkOrderPayload {
    type Error = FormError;

    fn try_from(form: CreateWorkOrderForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let priority = form.priority.trim().to_lowercase();
        if !PRIORITIES.contains(&priority.as_str()) {
            return Err(FormError::InvalidPriority(form.priority));
        }

        let displacement = form.displacement.unwrap_or_default();
        if displacement < Decimal::ZERO || money::ensure_amount(displacement).is_err() {
            return Err(FormError::InvalidAmount);
        }

        Ok(Self {
            customer_id: CustomerId::new(form.customer_id).map_err(id_error("customer id"))?,
            branch_id: optional_id(form.branch_id, "branch id", BranchId::new)?,
            quote_id: optional_id(form.quote_id, "quote id", QuoteId::new)?,
            priority,
            description: optional_text(form.description),
            assigned_to: optional_id(form.assigned_to, "assigned user id", UserId::new)?,
            seller_id: optional_id(form.seller_id, "seller id", UserId::new)?,
            driver_id: optional_id(form.driver_id, "driver id", UserId::new)?,
            sla_policy_id: optional_id(form.sla_policy_id, "sla policy id", SlaPolicyId::new)?,
            is_warranty: form.is_warranty,
            displacement,
        })
    }
}

impl CreateWorkOrderPayload {
    pub fn into_domain(
        self,
        tenant_id: TenantId,
        created_by: UserId,
        sla_deadline: Option<chrono::NaiveDateTime>,
    ) -> NewWorkOrder {
        NewWorkOrder {
            tenant_id,
            branch_id: self.branch_id,
            customer_id: self.customer_id,
            quote_id: self.quote_id,
            priority: self.priority,
            description: self.description,
            assigned_to: self.assigned_to,
            seller_id: self.seller_id,
            driver_id: self.driver_id,
            created_by: Some(created_by),
            sla_policy_id: self.sla_policy_id,
            sla_deadline,
            is_warranty: self.is_warranty,
            displacement: self.displacement,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemForm {
    pub item_type: String,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub cost_price: Option<Decimal>,
}

pub struct AddItemPayload {
    pub item_type: ItemType,
    pub description: SanitizedText,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub cost_price: Decimal,
}

impl TryFrom<AddItemForm> for AddItemPayload {
    type Error = FormError;

    fn try_from(form: AddItemForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let item_type = form
            .item_type
            .parse::<ItemType>()
            .map_err(|_| FormError::InvalidItemType(form.item_type.clone()))?;
        let cost_price = form.cost_price.unwrap_or_default();
        let in_range = |amount: Decimal| {
            amount >= Decimal::ZERO && money::ensure_amount(amount).is_ok()
        };
        if form.quantity <= Decimal::ZERO
            || form.quantity > Decimal::from(money::MAX_QUANTITY)
            || !in_range(form.unit_price)
            || !in_range(cost_price)
        {
            return Err(FormError::InvalidAmount);
        }

        Ok(Self {
            item_type,
            description: SanitizedText::new(form.description)
                .map_err(|_| FormError::Empty("description"))?,
            quantity: form.quantity,
            unit_price: form.unit_price,
            cost_price,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeStatusForm {
    pub status: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

pub struct ChangeStatusPayload {
    pub status: WorkOrderStatus,
    pub notes: Option<String>,
}

impl TryFrom<ChangeStatusForm> for ChangeStatusPayload {
    type Error = FormError;

    fn try_from(form: ChangeStatusForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let status = form
            .status
            .parse::<WorkOrderStatus>()
            .map_err(|_| FormError::InvalidStatus(form.status.clone()))?;

        Ok(Self {
            status,
            notes: optional_text(form.notes).map(SanitizedText::into_inner),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignTechnicianForm {
    pub user_id: i32,
    #[serde(default = "default_technician_role")]
    pub role: String,
}

pub struct AssignTechnicianPayload {
    pub user_id: UserId,
    pub role: RoleName,
}

impl TryFrom<AssignTechnicianForm> for AssignTechnicianPayload {
    type Error = FormError;

    fn try_from(form: AssignTechnicianForm) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(form.user_id).map_err(id_error("user id"))?,
            role: RoleName::new(form.role.as_str())
                .map_err(|_| FormError::InvalidRole(form.role.clone()))?,
        })
    }
}
