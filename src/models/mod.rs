//! Diesel row models and their conversions into domain entities.

pub mod access;
#[cfg(feature = "server")]
pub mod auth;
pub mod commission;
pub mod config;
pub mod finance;
pub mod reconciliation;
pub mod sla;
pub mod tenant;
pub mod work_order;
