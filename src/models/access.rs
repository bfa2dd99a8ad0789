//! Diesel models for permissions, roles, and their assignments.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::access::{
    NewRole as DomainNewRole, Permission as DomainPermission, Role as DomainRole,
    RoleAssignment as DomainRoleAssignment,
};
use crate::domain::types::{PermissionId, PermissionName, RoleId, RoleName, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::permissions)]
pub struct Permission {
    pub id: i32,
    pub name: String,
    pub guard_name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::permissions)]
pub struct NewPermission<'a> {
    pub name: &'a str,
    pub guard_name: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::roles)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub guard_name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::roles)]
pub struct NewRole<'a> {
    pub name: &'a str,
    pub guard_name: &'a str,
    pub display_name: Option<&'a str>,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::role_has_permissions)]
pub struct RoleHasPermission {
    pub permission_id: i32,
    pub role_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::user_roles)]
pub struct NewUserRole {
    pub role_id: i32,
    pub user_id: i32,
    pub tenant_id: Option<i32>,
}

impl TryFrom<Permission> for DomainPermission {
    type Error = TypeConstraintError;

    fn try_from(permission: Permission) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PermissionId::try_from(permission.id)?,
            name: PermissionName::new(permission.name)?,
            guard_name: permission.guard_name,
        })
    }
}

impl TryFrom<Role> for DomainRole {
    type Error = TypeConstraintError;

    fn try_from(role: Role) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RoleId::try_from(role.id)?,
            name: RoleName::new(role.name)?,
            guard_name: role.guard_name,
            display_name: role.display_name,
            description: role.description,
        })
    }
}

impl<'a> From<&'a DomainNewRole> for NewRole<'a> {
    fn from(role: &'a DomainNewRole) -> Self {
        Self {
            name: role.name.as_str(),
            guard_name: role.guard_name.as_str(),
            display_name: Some(role.display_name.as_str()),
            description: Some(role.description.as_str()),
        }
    }
}

impl From<&DomainRoleAssignment> for NewUserRole {
    fn from(assignment: &DomainRoleAssignment) -> Self {
        Self {
            role_id: assignment.role_id.get(),
            user_id: assignment.user_id.get(),
            tenant_id: assignment.tenant_id.map(|id| id.get()),
        }
    }
}
