//! Receivables, payables, and expenses touched by commissions and
//! reconciliation.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::types::{CustomerId, PayableId, ReceivableId, TenantId, WorkOrderId};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PARTIAL: &str = "partial";
pub const STATUS_PAID: &str = "paid";

/// Statuses a title may be matched against a bank entry in.
pub const OPEN_STATUSES: [&str; 2] = [STATUS_PENDING, STATUS_PARTIAL];

pub const EXPENSE_APPROVED: &str = "approved";

#[derive(Debug, Clone, Serialize)]
pub struct Receivable {
    pub id: ReceivableId,
    pub tenant_id: TenantId,
    pub customer_id: Option<CustomerId>,
    pub work_order_id: Option<WorkOrderId>,
    pub description: String,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub due_date: NaiveDate,
    pub paid_at: Option<NaiveDateTime>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Payable {
    pub id: PayableId,
    pub tenant_id: TenantId,
    pub supplier_name: Option<String>,
    pub description: String,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub due_date: NaiveDate,
    pub status: String,
}
