//! DTOs returned by the access control endpoints.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::access::RoleWithPermissions;
use crate::domain::types::PermissionName;

/// Effective permissions of the caller in their current tenant.
#[derive(Debug, Serialize)]
pub struct MyPermissions {
    pub tenant_id: i32,
    pub permissions: Vec<PermissionName>,
}

/// The catalog grouped by module prefix.
#[derive(Debug, Serialize)]
pub struct PermissionCatalog {
    pub total: usize,
    pub groups: BTreeMap<String, Vec<PermissionName>>,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<RoleWithPermissions>,
}

#[derive(Debug, Serialize)]
pub struct SyncOutcome {
    pub role_id: i32,
    pub permissions: usize,
}

#[derive(Debug, Serialize)]
pub struct AssignmentOutcome {
    pub user_id: i32,
    pub role_id: i32,
    /// `false` when the user already held the role.
    pub created: bool,
}
