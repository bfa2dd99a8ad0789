use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error::DatabaseError};
use diesel::{prelude::*, upsert::excluded};

use crate::{
    domain::{
        access::{NewRole, Permission, Role, RoleAssignment, RoleWithPermissions},
        types::{PermissionName, RoleId, RoleName, TenantId, UserId},
    },
    models::access::{
        NewPermission as DbNewPermission, NewRole as DbNewRole, NewUserRole as DbNewUserRole,
        Permission as DbPermission, Role as DbRole, RoleHasPermission as DbRoleHasPermission,
    },
    repository::{
        AccessReader, AccessWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
};

/// Role ids the user holds in `tenant_id`, including global assignments.
fn assigned_role_ids(
    conn: &mut SqliteConnection,
    user_id: UserId,
    tenant_id: TenantId,
) -> QueryResult<Vec<i32>> {
    use crate::schema::user_roles;

    user_roles::table
        .filter(user_roles::user_id.eq(user_id.get()))
        .filter(
            user_roles::tenant_id
                .eq(tenant_id.get())
                .or(user_roles::tenant_id.is_null()),
        )
        .select(user_roles::role_id)
        .distinct()
        .load::<i32>(conn)
}

impl AccessReader for DieselRepository {
    fn list_permissions(&self) -> RepositoryResult<Vec<Permission>> {
        use crate::schema::permissions;

        let mut conn = self.conn()?;
        let db_permissions = permissions::table
            .order(permissions::name.asc())
            .load::<DbPermission>(&mut conn)?;

        db_permissions
            .into_iter()
            .map(|permission| Permission::try_from(permission).map_err(RepositoryError::from))
            .collect()
    }

    fn list_roles_with_permissions(&self) -> RepositoryResult<Vec<RoleWithPermissions>> {
        use crate::schema::{permissions, role_has_permissions, roles};

        let mut conn = self.conn()?;
        let db_roles = roles::table
            .order(roles::id.asc())
            .load::<DbRole>(&mut conn)?;

        let role_ids = db_roles.iter().map(|role| role.id).collect::<Vec<i32>>();

        let grants = role_has_permissions::table
            .inner_join(permissions::table)
            .filter(role_has_permissions::role_id.eq_any(role_ids))
            .order(permissions::name.asc())
            .select((role_has_permissions::role_id, permissions::name))
            .load::<(i32, String)>(&mut conn)?;

        db_roles
            .into_iter()
            .map(|db_role| -> RepositoryResult<RoleWithPermissions> {
                let permissions = grants
                    .iter()
                    .filter(|(role_id, _)| *role_id == db_role.id)
                    .map(|(_, name)| PermissionName::new(name.as_str()))
                    .collect::<Result<Vec<_>, _>>()?;
                let role = Role::try_from(db_role)?;
                Ok(RoleWithPermissions { role, permissions })
            })
            .collect()
    }

    fn get_role_by_id(&self, id: RoleId) -> RepositoryResult<Option<Role>> {
        use crate::schema::roles;

        let mut conn = self.conn()?;
        let db_role = roles::table
            .filter(roles::id.eq(id.get()))
            .first::<DbRole>(&mut conn)
            .optional()?;

        db_role
            .map(|role| Role::try_from(role).map_err(RepositoryError::from))
            .transpose()
    }

    fn get_role_by_name(&self, name: &RoleName) -> RepositoryResult<Option<Role>> {
        use crate::schema::roles;

        let mut conn = self.conn()?;
        let db_role = roles::table
            .filter(roles::name.eq(name.as_str()))
            .first::<DbRole>(&mut conn)
            .optional()?;

        db_role
            .map(|role| Role::try_from(role).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_user_permissions(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Vec<PermissionName>> {
        use crate::schema::{permissions, role_has_permissions};

        let mut conn = self.conn()?;
        let role_ids = assigned_role_ids(&mut conn, user_id, tenant_id)?;

        let names = role_has_permissions::table
            .inner_join(permissions::table)
            .filter(role_has_permissions::role_id.eq_any(role_ids))
            .select(permissions::name)
            .distinct()
            .order(permissions::name.asc())
            .load::<String>(&mut conn)?;

        names
            .into_iter()
            .map(|name| PermissionName::new(name).map_err(RepositoryError::from))
            .collect()
    }

    fn user_has_permission(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
        permission: &str,
    ) -> RepositoryResult<bool> {
        use crate::schema::{permissions, role_has_permissions};

        let mut conn = self.conn()?;
        let role_ids = assigned_role_ids(&mut conn, user_id, tenant_id)?;

        let count = role_has_permissions::table
            .inner_join(permissions::table)
            .filter(role_has_permissions::role_id.eq_any(role_ids))
            .filter(permissions::name.eq(permission))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count > 0)
    }
}

impl AccessWriter for DieselRepository {
    fn create_missing_permissions(
        &self,
        names: &[PermissionName],
        guard_name: &str,
    ) -> RepositoryResult<usize> {
        use crate::schema::permissions;

        let mut conn = self.conn()?;

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            let existing = permissions::table
                .filter(permissions::guard_name.eq(guard_name))
                .select(permissions::name)
                .load::<String>(conn)?;

            let missing = names
                .iter()
                .filter(|name| !existing.iter().any(|e| e == name.as_str()))
                .map(|name| DbNewPermission {
                    name: name.as_str(),
                    guard_name,
                })
                .collect::<Vec<_>>();

            if missing.is_empty() {
                return Ok(0);
            }

            diesel::insert_into(permissions::table)
                .values(&missing)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }

    fn upsert_role(&self, role: &NewRole) -> RepositoryResult<Role> {
        use crate::schema::roles;

        let mut conn = self.conn()?;
        let db_new_role: DbNewRole = role.into();

        let db_role = diesel::insert_into(roles::table)
            .values(&db_new_role)
            .on_conflict((roles::name, roles::guard_name))
            .do_update()
            .set((
                roles::display_name.eq(excluded(roles::display_name)),
                roles::description.eq(excluded(roles::description)),
                roles::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbRole>(&mut conn)?;

        Role::try_from(db_role).map_err(RepositoryError::from)
    }

    fn sync_role_permissions(
        &self,
        role_id: RoleId,
        names: &[PermissionName],
    ) -> RepositoryResult<usize> {
        use crate::schema::{permissions, role_has_permissions, roles};

        let mut conn = self.conn()?;
        let names = names.iter().map(PermissionName::as_str).collect::<Vec<_>>();

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            let guard_name = roles::table
                .filter(roles::id.eq(role_id.get()))
                .select(roles::guard_name)
                .first::<String>(conn)?;

            let permission_ids = permissions::table
                .filter(permissions::guard_name.eq(&guard_name))
                .filter(permissions::name.eq_any(names))
                .select(permissions::id)
                .load::<i32>(conn)?;

            diesel::delete(
                role_has_permissions::table
                    .filter(role_has_permissions::role_id.eq(role_id.get())),
            )
            .execute(conn)?;

            let grants = permission_ids
                .into_iter()
                .map(|permission_id| DbRoleHasPermission {
                    permission_id,
                    role_id: role_id.get(),
                })
                .collect::<Vec<_>>();

            if grants.is_empty() {
                return Ok(0);
            }

            diesel::insert_into(role_has_permissions::table)
                .values(&grants)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }

    fn assign_role(&self, assignment: &RoleAssignment) -> RepositoryResult<bool> {
        use crate::schema::user_roles;

        let mut conn = self.conn()?;
        let db_assignment: DbNewUserRole = assignment.into();

        conn.transaction::<bool, diesel::result::Error, _>(|conn| {
            let mut query = user_roles::table
                .filter(user_roles::role_id.eq(db_assignment.role_id))
                .filter(user_roles::user_id.eq(db_assignment.user_id))
                .into_boxed();
            query = match db_assignment.tenant_id {
                Some(tenant_id) => query.filter(user_roles::tenant_id.eq(tenant_id)),
                None => query.filter(user_roles::tenant_id.is_null()),
            };

            let existing = query.count().get_result::<i64>(conn)?;
            if existing > 0 {
                return Ok(false);
            }

            match diesel::insert_into(user_roles::table)
                .values(&db_assignment)
                .execute(conn)
            {
                Ok(_) => Ok(true),
                // Lost a race with a concurrent assignment.
                Err(DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Ok(false),
                Err(err) => Err(err),
            }
        })
        .map_err(RepositoryError::from)
    }
}
