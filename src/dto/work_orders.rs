use serde::Serialize;

use crate::domain::commission::CommissionEvent;
use crate::domain::work_order::{WorkOrder, WorkOrderItem};

#[derive(Debug, Serialize)]
pub struct WorkOrderDetails {
    pub order: WorkOrder,
    pub items: Vec<WorkOrderItem>,
}

/// Result of a status change, including any commissions it generated.
#[derive(Debug, Serialize)]
pub struct StatusChangeOutcome {
    pub order: WorkOrder,
    pub commissions: Vec<CommissionEvent>,
}
