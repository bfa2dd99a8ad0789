//! Diesel models for tenants, branches, and users.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::tenant::{
    Branch as DomainBranch, NewBranch as DomainNewBranch, NewTenant as DomainNewTenant,
    NewUser as DomainNewUser, Tenant as DomainTenant, User as DomainUser,
};
use crate::domain::types::{
    BranchCode, BranchId, DocumentNumber, Email, PersonName, PhoneNumber, PublicId, TenantId,
    TenantName, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tenants)]
/// Diesel model for [`crate::domain::tenant::Tenant`].
pub struct Tenant {
    pub id: i32,
    pub public_id: Vec<u8>,
    pub name: String,
    pub document: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tenants)]
pub struct NewTenant<'a> {
    pub public_id: &'a [u8],
    pub name: &'a str,
    pub document: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::branches)]
pub struct Branch {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub code: String,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::branches)]
pub struct NewBranch<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub code: &'a str,
    pub address_city: Option<&'a str>,
    pub address_state: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub tenant_id: Option<i32>,
    pub current_tenant_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
/// New users start in their home tenant.
pub struct NewUser<'a> {
    pub tenant_id: Option<i32>,
    pub current_tenant_id: Option<i32>,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tenant_user)]
pub struct NewTenantUser {
    pub tenant_id: i32,
    pub user_id: i32,
    pub is_default: bool,
}

impl TryFrom<Tenant> for DomainTenant {
    type Error = TypeConstraintError;

    fn try_from(tenant: Tenant) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TenantId::try_from(tenant.id)?,
            public_id: PublicId::from_bytes(&tenant.public_id)?,
            name: TenantName::new(tenant.name)?,
            document: DocumentNumber::new(tenant.document)?,
            email: tenant.email.map(Email::new).transpose()?,
            phone: tenant.phone.map(PhoneNumber::new).transpose()?,
            status: tenant.status,
            created_at: tenant.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewTenant> for NewTenant<'a> {
    fn from(tenant: &'a DomainNewTenant) -> Self {
        Self {
            public_id: tenant.public_id.as_bytes(),
            name: tenant.name.as_str(),
            document: tenant.document.as_str(),
            email: tenant.email.as_ref().map(Email::as_str),
            phone: tenant.phone.as_ref().map(PhoneNumber::as_str),
        }
    }
}

impl TryFrom<Branch> for DomainBranch {
    type Error = TypeConstraintError;

    fn try_from(branch: Branch) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BranchId::try_from(branch.id)?,
            tenant_id: TenantId::try_from(branch.tenant_id)?,
            name: branch.name,
            code: BranchCode::new(branch.code)?,
            address_city: branch.address_city,
            address_state: branch.address_state,
        })
    }
}

impl<'a> From<&'a DomainNewBranch> for NewBranch<'a> {
    fn from(branch: &'a DomainNewBranch) -> Self {
        Self {
            tenant_id: branch.tenant_id.get(),
            name: branch.name.as_str(),
            code: branch.code.as_str(),
            address_city: branch.address_city.as_deref(),
            address_state: branch.address_state.as_deref(),
        }
    }
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::try_from(user.id)?,
            tenant_id: user.tenant_id.map(TenantId::try_from).transpose()?,
            current_tenant_id: user.current_tenant_id.map(TenantId::try_from).transpose()?,
            name: PersonName::new(user.name)?,
            email: Email::new(user.email)?,
            is_active: user.is_active,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            tenant_id: Some(user.tenant_id.get()),
            current_tenant_id: Some(user.tenant_id.get()),
            name: user.name.as_str(),
            email: user.email.as_str(),
            phone: user.phone.as_ref().map(PhoneNumber::as_str),
        }
    }
}
