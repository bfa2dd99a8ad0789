//! Role-based access control entities.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::types::{PermissionId, PermissionName, RoleId, RoleName, TenantId, UserId};

/// Guard every permission and role is registered under.
pub const DEFAULT_GUARD: &str = "web";

/// Role that always holds the whole catalog and cannot be edited.
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: PermissionName,
    pub guard_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
    pub guard_name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

/// Role creation or refresh request; display data is overwritten on upsert.
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: RoleName,
    pub guard_name: String,
    pub display_name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<PermissionName>,
}

/// Assignment of a role to a user, optionally scoped to one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub tenant_id: Option<TenantId>,
}

/// Groups permissions by their first name segment, preserving input order
/// inside each group.
pub fn group_by_module(permissions: &[Permission]) -> BTreeMap<String, Vec<PermissionName>> {
    let mut grouped: BTreeMap<String, Vec<PermissionName>> = BTreeMap::new();
    for permission in permissions {
        grouped
            .entry(permission.name.module().to_string())
            .or_default()
            .push(permission.name.clone());
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(id: i32, name: &str) -> Permission {
        Permission {
            id: PermissionId::new(id).expect("valid id"),
            name: PermissionName::new(name).expect("valid name"),
            guard_name: DEFAULT_GUARD.to_string(),
        }
    }

    #[test]
    fn groups_by_first_segment() {
        let permissions = vec![
            permission(1, "os.work_order.view"),
            permission(2, "finance.payable.view"),
            permission(3, "os.work_order.update"),
        ];

        let grouped = group_by_module(&permissions);

        assert_eq!(grouped.len(), 2);
        let os: Vec<&str> = grouped["os"].iter().map(|p| p.as_str()).collect();
        assert_eq!(os, vec!["os.work_order.view", "os.work_order.update"]);
        assert_eq!(grouped["finance"].len(), 1);
    }
}
