//! Domain entities and the pure rules that operate on them.

pub mod access;
pub mod commission;
pub mod finance;
pub mod formula;
pub mod money;
pub mod reconciliation;
pub mod sla;
pub mod system_alert;
pub mod tenant;
pub mod types;
pub mod work_order;
