//! Response shapes returned by the services to the HTTP layer.

use serde::Serialize;

pub mod access;
pub mod commissions;
pub mod reconciliation;
pub mod work_orders;

/// Body of every non-2xx JSON response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
