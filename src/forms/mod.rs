//! Request bodies accepted by the HTTP API and their validated payloads.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod access;
pub mod commissions;
pub mod reconciliation;
pub mod work_orders;

#[derive(Debug, Error)]
/// Errors that can occur when processing request data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid {0}")]
    InvalidId(&'static str),

    #[error("invalid permission name: {0}")]
    InvalidPermission(String),

    #[error("invalid role name: {0}")]
    InvalidRole(String),

    #[error("unknown status: {0}")]
    InvalidStatus(String),

    #[error("unknown priority: {0}")]
    InvalidPriority(String),

    #[error("unknown item type: {0}")]
    InvalidItemType(String),

    #[error("unknown commission trigger: {0}")]
    InvalidTrigger(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("invalid match target: {0}")]
    InvalidMatchTarget(String),

    #[error("invalid amount")]
    InvalidAmount,

    #[error("invalid rule: {0}")]
    InvalidRule(String),

    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("uploaded file could not be read")]
    UnreadableFile,
}

/// Maps an id constraint failure onto the named field.
pub(crate) fn id_error(field: &'static str) -> impl Fn(TypeConstraintError) -> FormError {
    move |_| FormError::InvalidId(field)
}
