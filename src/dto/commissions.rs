//! DTOs for commission simulation, generation, and release.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::commission::{CommissionCalculation, CommissionEvent};

#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub work_order_id: i32,
    pub calculations: Vec<CommissionCalculation>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedCommissions {
    pub work_order_id: i32,
    pub events: Vec<CommissionEvent>,
}

/// Outcome of releasing an order's pending commissions for a payment.
#[derive(Debug, Default, Serialize)]
pub struct ReleaseOutcome {
    pub proportion: Decimal,
    pub released: usize,
}
