//! Identity and access management services.

use std::collections::BTreeSet;

use crate::domain::access::{RoleAssignment, SUPER_ADMIN_ROLE, group_by_module};
use crate::domain::types::{PermissionName, RoleId, UserId};
use crate::dto::access::{
    AssignmentOutcome, MyPermissions, PermissionCatalog, RolesResponse, SyncOutcome,
};
use crate::forms::access::{
    AssignRoleForm, AssignRolePayload, SyncRolePermissionsForm, SyncRolePermissionsPayload,
};
use crate::models::auth::AuthenticatedUser;
use crate::repository::{AccessReader, AccessWriter, TenantReader};
use crate::services::{Actor, ServiceError, ServiceResult, ensure_permission};

pub const PERMISSION_ROLE_VIEW: &str = "iam.role.view";
pub const PERMISSION_ROLE_UPDATE: &str = "iam.role.update";
pub const PERMISSION_USER_UPDATE: &str = "iam.user.update";
pub const PERMISSION_MANAGE: &str = "iam.permission.manage";

/// Permissions the caller holds in their current tenant. Needs no grant.
pub fn my_permissions<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<MyPermissions>
where
    R: AccessReader + ?Sized,
{
    let actor = Actor::from_user(user)?;
    let permissions = repo.list_user_permissions(actor.user_id, actor.tenant_id)?;

    Ok(MyPermissions {
        tenant_id: actor.tenant_id.get(),
        permissions,
    })
}

pub fn list_permissions<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<PermissionCatalog>
where
    R: AccessReader + ?Sized,
{
    ensure_permission(repo, user, PERMISSION_ROLE_VIEW)?;

    let permissions = repo.list_permissions()?;

    Ok(PermissionCatalog {
        total: permissions.len(),
        groups: group_by_module(&permissions),
    })
}

pub fn list_roles<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<RolesResponse>
where
    R: AccessReader + ?Sized,
{
    ensure_permission(repo, user, PERMISSION_ROLE_VIEW)?;

    Ok(RolesResponse {
        roles: repo.list_roles_with_permissions()?,
    })
}

/// Replaces a role's permissions.
///
/// Roles are shared by every tenant, so editing one also needs
/// `iam.permission.manage`, and the caller can only grant permissions it
/// already holds. Every name must exist in the catalog. `super_admin` always
/// holds the whole catalog and cannot be edited.
pub fn sync_role_permissions<R>(
    repo: &R,
    user: &AuthenticatedUser,
    role_id: i32,
    form: SyncRolePermissionsForm,
) -> ServiceResult<SyncOutcome>
where
    R: AccessReader + AccessWriter + ?Sized,
{
    ensure_permission(repo, user, PERMISSION_ROLE_UPDATE)?;
    let actor = ensure_permission(repo, user, PERMISSION_MANAGE)?;

    let payload = SyncRolePermissionsPayload::try_from(form)?;

    let role = repo
        .get_role_by_id(RoleId::new(role_id)?)?
        .ok_or(ServiceError::NotFound)?;
    if role.name.as_str() == SUPER_ADMIN_ROLE {
        return Err(ServiceError::Conflict(
            "the super_admin role cannot be edited".to_string(),
        ));
    }

    let known: BTreeSet<String> = repo
        .list_permissions()?
        .into_iter()
        .map(|p| p.name.into_inner())
        .collect();
    let unknown: Vec<&str> = payload
        .permissions
        .iter()
        .map(|p| p.as_str())
        .filter(|name| !known.contains(*name))
        .collect();
    if !unknown.is_empty() {
        return Err(ServiceError::Form(format!(
            "unknown permissions: {}",
            unknown.join(", ")
        )));
    }

    let held: BTreeSet<String> = repo
        .list_user_permissions(actor.user_id, actor.tenant_id)?
        .into_iter()
        .map(PermissionName::into_inner)
        .collect();
    if payload
        .permissions
        .iter()
        .any(|name| !held.contains(name.as_str()))
    {
        log::warn!(
            "User {} tried to grant permissions it does not hold to role {}",
            actor.user_id,
            role.name
        );
        return Err(ServiceError::Unauthorized);
    }

    let synced = repo.sync_role_permissions(role.id, &payload.permissions)?;
    log::info!("Role {} now holds {synced} permissions", role.name);

    Ok(SyncOutcome {
        role_id: role.id.get(),
        permissions: synced,
    })
}

/// Assigns a role to a user of the caller's tenant, scoped to that tenant.
pub fn assign_role<R>(
    repo: &R,
    user: &AuthenticatedUser,
    user_id: i32,
    form: AssignRoleForm,
) -> ServiceResult<AssignmentOutcome>
where
    R: TenantReader + AccessReader + AccessWriter + ?Sized,
{
    let actor = ensure_permission(repo, user, PERMISSION_USER_UPDATE)?;

    let payload = AssignRolePayload::try_from(form)?;

    let target = repo
        .get_user_by_id(UserId::new(user_id)?)?
        .filter(|u| {
            u.tenant_id == Some(actor.tenant_id) || u.current_tenant_id == Some(actor.tenant_id)
        })
        .ok_or(ServiceError::NotFound)?;

    let role = repo
        .get_role_by_id(payload.role_id)?
        .ok_or(ServiceError::NotFound)?;
    if role.name.as_str() == SUPER_ADMIN_ROLE {
        ensure_permission(repo, user, PERMISSION_MANAGE)?;
    }

    let created = repo.assign_role(&RoleAssignment {
        user_id: target.id,
        role_id: role.id,
        tenant_id: Some(actor.tenant_id),
    })?;

    Ok(AssignmentOutcome {
        user_id: target.id.get(),
        role_id: role.id.get(),
        created,
    })
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;
    use crate::domain::access::{DEFAULT_GUARD, Permission, Role};
    use crate::domain::tenant::User;
    use crate::domain::types::{
        Email, PermissionId, PermissionName, PersonName, RoleName, TenantId,
    };
    use crate::services::test_support::*;

    fn role(id: i32, name: &str) -> Role {
        Role {
            id: RoleId::new(id).expect("valid id"),
            name: RoleName::new(name).expect("valid name"),
            guard_name: DEFAULT_GUARD.to_string(),
            display_name: None,
            description: None,
        }
    }

    fn permission(id: i32, name: &str) -> Permission {
        Permission {
            id: PermissionId::new(id).expect("valid id"),
            name: PermissionName::new(name).expect("valid name"),
            guard_name: DEFAULT_GUARD.to_string(),
        }
    }

    fn member(id: i32, tenant: i32) -> User {
        User {
            id: UserId::new(id).expect("valid id"),
            tenant_id: Some(TenantId::new(tenant).expect("valid id")),
            current_tenant_id: Some(TenantId::new(tenant).expect("valid id")),
            name: PersonName::new("Ana Costa").expect("valid name"),
            email: Email::new("ana@calibracoes.com.br").expect("valid email"),
            is_active: true,
        }
    }

    #[test]
    fn my_permissions_needs_no_grant() {
        let mut repo = repo_granting(&[]);
        repo.expect_list_user_permissions().returning(|_, _| {
            Ok(vec![
                PermissionName::new("os.work_order.view").expect("valid name"),
            ])
        });

        let result = my_permissions(&repo, &user()).expect("listed");

        assert_eq!(result.tenant_id, TENANT);
        assert_eq!(result.permissions.len(), 1);
    }

    #[test]
    fn catalog_is_grouped_by_module() {
        let mut repo = repo_granting(&[PERMISSION_ROLE_VIEW]);
        repo.expect_list_permissions().returning(|| {
            Ok(vec![
                permission(1, "os.work_order.view"),
                permission(2, "iam.role.view"),
            ])
        });

        let catalog = list_permissions(&repo, &user()).expect("listed");

        assert_eq!(catalog.total, 2);
        assert_eq!(
            catalog.groups.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["iam", "os"]
        );
    }

    #[test]
    fn super_admin_cannot_be_edited() {
        let mut repo = repo_granting(&[PERMISSION_ROLE_UPDATE, PERMISSION_MANAGE]);
        repo.expect_get_role_by_id()
            .returning(|_| Ok(Some(role(1, SUPER_ADMIN_ROLE))));
        repo.expect_sync_role_permissions().never();

        let result = sync_role_permissions(
            &repo,
            &user(),
            1,
            SyncRolePermissionsForm {
                permissions: vec!["os.work_order.view".to_string()],
            },
        );

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn unknown_permissions_are_rejected() {
        let mut repo = repo_granting(&[PERMISSION_ROLE_UPDATE, PERMISSION_MANAGE]);
        repo.expect_get_role_by_id()
            .returning(|_| Ok(Some(role(5, "tecnico"))));
        repo.expect_list_permissions()
            .returning(|| Ok(vec![permission(1, "os.work_order.view")]));
        repo.expect_sync_role_permissions().never();

        let result = sync_role_permissions(
            &repo,
            &user(),
            5,
            SyncRolePermissionsForm {
                permissions: vec![
                    "os.work_order.view".to_string(),
                    "os.work_order.teleport".to_string(),
                ],
            },
        );

        match result {
            Err(ServiceError::Form(message)) => assert!(message.contains("teleport")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn sync_replaces_grants() {
        let mut repo = repo_granting(&[PERMISSION_ROLE_UPDATE, PERMISSION_MANAGE]);
        repo.expect_get_role_by_id()
            .returning(|_| Ok(Some(role(5, "tecnico"))));
        repo.expect_list_permissions()
            .returning(|| Ok(vec![permission(1, "os.work_order.view")]));
        repo.expect_list_user_permissions().returning(|_, _| {
            Ok(vec![
                PermissionName::new("os.work_order.view").expect("valid name"),
            ])
        });
        repo.expect_sync_role_permissions()
            .withf(|id, names| id.get() == 5 && names.len() == 1)
            .times(1)
            .returning(|_, names| Ok(names.len()));

        let outcome = sync_role_permissions(
            &repo,
            &user(),
            5,
            SyncRolePermissionsForm {
                permissions: vec!["os.work_order.view".to_string()],
            },
        )
        .expect("synced");

        assert_eq!(outcome.permissions, 1);
    }

    #[test]
    fn role_update_alone_cannot_edit_shared_roles() {
        let mut repo = repo_granting(&[PERMISSION_ROLE_UPDATE]);
        repo.expect_sync_role_permissions().never();

        let result = sync_role_permissions(
            &repo,
            &user(),
            2,
            SyncRolePermissionsForm {
                permissions: vec!["platform.tenant.create".to_string()],
            },
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn cannot_grant_permissions_the_caller_lacks() {
        let mut repo = repo_granting(&[PERMISSION_ROLE_UPDATE, PERMISSION_MANAGE]);
        repo.expect_get_role_by_id()
            .returning(|_| Ok(Some(role(5, "tecnico"))));
        repo.expect_list_permissions().returning(|| {
            Ok(vec![
                permission(1, "os.work_order.view"),
                permission(2, "platform.tenant.create"),
            ])
        });
        repo.expect_list_user_permissions().returning(|_, _| {
            Ok(vec![
                PermissionName::new("os.work_order.view").expect("valid name"),
            ])
        });
        repo.expect_sync_role_permissions().never();

        let result = sync_role_permissions(
            &repo,
            &user(),
            5,
            SyncRolePermissionsForm {
                permissions: vec![
                    "os.work_order.view".to_string(),
                    "platform.tenant.create".to_string(),
                ],
            },
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn catalog_listing_needs_role_view() {
        let mut repo = repo_granting(&[PERMISSION_ROLE_UPDATE]);
        repo.expect_list_permissions().never();

        assert!(matches!(
            list_permissions(&repo, &user()),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn assignment_is_scoped_to_callers_tenant() {
        let mut repo = repo_granting(&[PERMISSION_USER_UPDATE]);
        repo.expect_get_user_by_id()
            .with(eq(UserId::new(9).expect("valid id")))
            .returning(|_| Ok(Some(member(9, TENANT))));
        repo.expect_get_role_by_id()
            .returning(|_| Ok(Some(role(5, "tecnico"))));
        repo.expect_assign_role()
            .withf(|a| a.user_id.get() == 9 && a.tenant_id.map(TenantId::get) == Some(TENANT))
            .times(1)
            .returning(|_| Ok(true));

        let outcome =
            assign_role(&repo, &user(), 9, AssignRoleForm { role_id: 5 }).expect("assigned");

        assert!(outcome.created);
    }

    #[test]
    fn users_of_other_tenants_are_not_found() {
        let mut repo = repo_granting(&[PERMISSION_USER_UPDATE]);
        repo.expect_get_user_by_id()
            .returning(|_| Ok(Some(member(9, TENANT + 1))));
        repo.expect_assign_role().never();

        assert!(matches!(
            assign_role(&repo, &user(), 9, AssignRoleForm { role_id: 5 }),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn granting_super_admin_needs_permission_management() {
        let mut repo = repo_granting(&[PERMISSION_USER_UPDATE]);
        repo.expect_get_user_by_id()
            .returning(|_| Ok(Some(member(9, TENANT))));
        repo.expect_get_role_by_id()
            .returning(|_| Ok(Some(role(1, SUPER_ADMIN_ROLE))));
        repo.expect_assign_role().never();

        assert!(matches!(
            assign_role(&repo, &user(), 9, AssignRoleForm { role_id: 1 }),
            Err(ServiceError::Unauthorized)
        ));
    }
}
