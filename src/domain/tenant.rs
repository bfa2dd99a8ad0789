//! Tenants, their branches, and the users that belong to them.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{
    BranchCode, BranchId, DocumentNumber, Email, PersonName, PhoneNumber, PublicId, TenantId,
    TenantName, UserId,
};

/// Isolation boundary for a customer organization.
#[derive(Debug, Clone, Serialize)]
pub struct Tenant {
    pub id: TenantId,
    pub public_id: PublicId,
    pub name: TenantName,
    pub document: DocumentNumber,
    pub email: Option<Email>,
    pub phone: Option<PhoneNumber>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTenant {
    pub public_id: PublicId,
    pub name: TenantName,
    pub document: DocumentNumber,
    pub email: Option<Email>,
    pub phone: Option<PhoneNumber>,
}

impl NewTenant {
    pub fn new(
        name: TenantName,
        document: DocumentNumber,
        email: Option<Email>,
        phone: Option<PhoneNumber>,
    ) -> Self {
        Self {
            public_id: PublicId::new(),
            name,
            document,
            email,
            phone,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Branch {
    pub id: BranchId,
    pub tenant_id: TenantId,
    pub name: String,
    pub code: BranchCode,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBranch {
    pub tenant_id: TenantId,
    pub name: String,
    pub code: BranchCode,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
}

/// Platform user; `current_tenant_id` is the tenant the user is acting in.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: Option<TenantId>,
    pub current_tenant_id: Option<TenantId>,
    pub name: PersonName,
    pub email: Email,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub tenant_id: TenantId,
    pub name: PersonName,
    pub email: Email,
    pub phone: Option<PhoneNumber>,
}
