//! Idempotent seeding of the permission catalog, the system roles, and the
//! demo tenants.

use serde::Serialize;

use crate::domain::access::{DEFAULT_GUARD, NewRole, RoleAssignment};
use crate::domain::tenant::{NewBranch, NewTenant, NewUser};
use crate::domain::types::{
    BranchCode, DocumentNumber, Email, PermissionName, PersonName, PhoneNumber, RoleName,
    TenantId, TenantName,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AccessReader, AccessWriter, TenantReader, TenantWriter};

pub mod demo;
pub mod permissions;
pub mod roles;

use permissions::PERMISSIONS;
use roles::{SYSTEM_ROLES, resolve_grants};

/// Outcome of a permission seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Size of the catalog.
    pub total: usize,
    /// Permissions inserted by this run.
    pub created: usize,
    /// Roles upserted and synced.
    pub roles: usize,
}

/// Outcome of a demo seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemoReport {
    pub tenants_created: usize,
    pub tenants_skipped: usize,
    pub users_created: usize,
}

fn permission_names(names: &[&str]) -> RepositoryResult<Vec<PermissionName>> {
    names
        .iter()
        .map(|name| PermissionName::new(*name).map_err(RepositoryError::from))
        .collect()
}

/// Registers the permission catalog and the system roles.
///
/// Missing permissions are inserted, every role is upserted with its current
/// display data, and each role's grants are replaced by its resolved policy.
/// A second run creates nothing and leaves the grants unchanged.
pub fn seed_permissions<R>(repo: &R) -> RepositoryResult<SeedReport>
where
    R: AccessWriter + ?Sized,
{
    let catalog = permission_names(PERMISSIONS)?;
    let created = repo.create_missing_permissions(&catalog, DEFAULT_GUARD)?;
    log::info!(
        "Permission catalog: {} total, {created} created",
        catalog.len()
    );

    for system_role in SYSTEM_ROLES {
        let role = repo.upsert_role(&NewRole {
            name: RoleName::new(system_role.name)?,
            guard_name: DEFAULT_GUARD.to_string(),
            display_name: system_role.display_name.to_string(),
            description: system_role.description.to_string(),
        })?;

        let grants = permission_names(&resolve_grants(system_role))?;
        let synced = repo.sync_role_permissions(role.id, &grants)?;
        log::info!("Role {} synced with {synced} permissions", system_role.name);
    }

    Ok(SeedReport {
        total: catalog.len(),
        created,
        roles: SYSTEM_ROLES.len(),
    })
}

/// Creates the demo tenants, their branches, and their users.
///
/// Tenants whose document already exists are skipped together with their
/// branches and users. System roles must be seeded first.
pub fn seed_demo<R>(repo: &R) -> RepositoryResult<DemoReport>
where
    R: TenantReader + TenantWriter + AccessReader + AccessWriter + ?Sized,
{
    let mut report = DemoReport::default();
    let mut tenant_ids: Vec<TenantId> = Vec::with_capacity(demo::TENANTS.len());

    for demo_tenant in demo::TENANTS {
        let document = DocumentNumber::new(demo_tenant.document)?;
        if let Some(existing) = repo.get_tenant_by_document(&document)? {
            log::info!("Tenant {} already exists; skipping", demo_tenant.name);
            report.tenants_skipped += 1;
            tenant_ids.push(existing.id);
            continue;
        }

        let tenant = repo.create_tenant(&NewTenant::new(
            TenantName::new(demo_tenant.name)?,
            document,
            Some(Email::new(demo_tenant.email)?),
            Some(PhoneNumber::new(demo_tenant.phone)?),
        ))?;

        for branch in demo_tenant.branches {
            repo.create_branch(&NewBranch {
                tenant_id: tenant.id,
                name: branch.name.to_string(),
                code: BranchCode::new(branch.code)?,
                address_city: Some(branch.city.to_string()),
                address_state: Some(branch.state.to_string()),
            })?;
        }

        for demo_user in demo_tenant.users {
            let email = Email::new(demo_user.email)?;
            if repo.get_user_by_email(&email)?.is_some() {
                continue;
            }

            let user = repo.create_user(&NewUser {
                tenant_id: tenant.id,
                name: PersonName::new(demo_user.name)?,
                email,
                phone: None,
            })?;

            let role_name = RoleName::new(demo_user.role)?;
            let role = repo.get_role_by_name(&role_name)?.ok_or_else(|| {
                RepositoryError::ValidationError(format!(
                    "role {role_name} is missing; seed permissions first"
                ))
            })?;

            // Platform administrators hold their role in every tenant.
            let scope = if demo_user.global { None } else { Some(tenant.id) };
            repo.assign_role(&RoleAssignment {
                user_id: user.id,
                role_id: role.id,
                tenant_id: scope,
            })?;
            report.users_created += 1;
        }

        log::info!("Created demo tenant {}", demo_tenant.name);
        report.tenants_created += 1;
        tenant_ids.push(tenant.id);
    }

    let admin_email = Email::new(demo::PLATFORM_ADMIN_EMAIL)?;
    if let Some(admin) = repo.get_user_by_email(&admin_email)? {
        for tenant_id in tenant_ids.iter().skip(1) {
            repo.attach_user_to_tenant(admin.id, *tenant_id, false)?;
        }
    }

    Ok(report)
}
