use serde::Deserialize;

use crate::domain::types::{PermissionName, RoleId};
use crate::forms::{FormError, id_error};

/// Replacement permission list for a role.
#[derive(Debug, Deserialize)]
pub struct SyncRolePermissionsForm {
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Sorted, deduplicated permission names.
pub struct SyncRolePermissionsPayload {
    pub permissions: Vec<PermissionName>,
}

impl TryFrom<SyncRolePermissionsForm> for SyncRolePermissionsPayload {
    type Error = FormError;

    fn try_from(form: SyncRolePermissionsForm) -> Result<Self, Self::Error> {
        let mut permissions = form
            .permissions
            .iter()
            .map(|name| {
                PermissionName::new(name.as_str())
                    .map_err(|_| FormError::InvalidPermission(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        permissions.sort_unstable();
        permissions.dedup();

        Ok(Self { permissions })
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleForm {
    pub role_id: i32,
}

pub struct AssignRolePayload {
    pub role_id: RoleId,
}

impl TryFrom<AssignRoleForm> for AssignRolePayload {
    type Error = FormError;

    fn try_from(form: AssignRoleForm) -> Result<Self, Self::Error> {
        Ok(Self {
            role_id: RoleId::new(form.role_id).map_err(id_error("role id"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_are_sorted_and_deduplicated() {
        let form = SyncRolePermissionsForm {
            permissions: vec![
                "os.work_order.view".to_string(),
                "finance.payable.view".to_string(),
                "os.work_order.view".to_string(),
            ],
        };

        let payload = SyncRolePermissionsPayload::try_from(form).expect("valid payload");

        let names: Vec<&str> = payload.permissions.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["finance.payable.view", "os.work_order.view"]);
    }

    #[test]
    fn malformed_permission_is_rejected() {
        let form = SyncRolePermissionsForm {
            permissions: vec!["Not A Permission".to_string()],
        };

        assert!(matches!(
            SyncRolePermissionsPayload::try_from(form),
            Err(FormError::InvalidPermission(_))
        ));
    }
}
