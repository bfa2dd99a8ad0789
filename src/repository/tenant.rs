use diesel::prelude::*;

use crate::{
    domain::{
        tenant::{Branch, NewBranch, NewTenant, NewUser, Tenant, User},
        types::{DocumentNumber, Email, TenantId, UserId},
    },
    models::tenant::{
        Branch as DbBranch, NewBranch as DbNewBranch, NewTenant as DbNewTenant,
        NewTenantUser as DbNewTenantUser, NewUser as DbNewUser, Tenant as DbTenant,
        User as DbUser,
    },
    repository::{
        DieselRepository, TenantReader, TenantWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl TenantReader for DieselRepository {
    fn get_tenant_by_document(
        &self,
        document: &DocumentNumber,
    ) -> RepositoryResult<Option<Tenant>> {
        use crate::schema::tenants;

        let mut conn = self.conn()?;
        let db_tenant = tenants::table
            .filter(tenants::document.eq(document.as_str()))
            .first::<DbTenant>(&mut conn)
            .optional()?;

        db_tenant
            .map(|tenant| Tenant::try_from(tenant).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_tenants(&self) -> RepositoryResult<Vec<Tenant>> {
        use crate::schema::tenants;

        let mut conn = self.conn()?;
        let db_tenants = tenants::table
            .order(tenants::id.asc())
            .load::<DbTenant>(&mut conn)?;

        db_tenants
            .into_iter()
            .map(|tenant| Tenant::try_from(tenant).map_err(RepositoryError::from))
            .collect()
    }

    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::id.eq(id.get()))
            .filter(users::deleted_at.is_null())
            .first::<DbUser>(&mut conn)
            .optional()?;

        db_user
            .map(|user| User::try_from(user).map_err(RepositoryError::from))
            .transpose()
    }

    fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::email.eq(email.as_str()))
            .filter(users::deleted_at.is_null())
            .first::<DbUser>(&mut conn)
            .optional()?;

        db_user
            .map(|user| User::try_from(user).map_err(RepositoryError::from))
            .transpose()
    }
}

impl TenantWriter for DieselRepository {
    fn create_tenant(&self, tenant: &NewTenant) -> RepositoryResult<Tenant> {
        use crate::schema::tenants;

        let mut conn = self.conn()?;
        let db_new_tenant: DbNewTenant = tenant.into();

        let db_tenant = diesel::insert_into(tenants::table)
            .values(&db_new_tenant)
            .get_result::<DbTenant>(&mut conn)?;

        Tenant::try_from(db_tenant).map_err(RepositoryError::from)
    }

    fn create_branch(&self, branch: &NewBranch) -> RepositoryResult<Branch> {
        use crate::schema::branches;

        let mut conn = self.conn()?;
        let db_new_branch: DbNewBranch = branch.into();

        let db_branch = diesel::insert_into(branches::table)
            .values(&db_new_branch)
            .get_result::<DbBranch>(&mut conn)?;

        Branch::try_from(db_branch).map_err(RepositoryError::from)
    }

    fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::{tenant_user, users};

        let mut conn = self.conn()?;
        let db_new_user: DbNewUser = user.into();
        let tenant_id = user.tenant_id.get();

        let db_user = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let db_user = diesel::insert_into(users::table)
                .values(&db_new_user)
                .get_result::<DbUser>(conn)?;

            diesel::insert_into(tenant_user::table)
                .values(DbNewTenantUser {
                    tenant_id,
                    user_id: db_user.id,
                    is_default: true,
                })
                .execute(conn)?;

            Ok(db_user)
        })?;

        User::try_from(db_user).map_err(RepositoryError::from)
    }

    fn attach_user_to_tenant(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
        is_default: bool,
    ) -> RepositoryResult<()> {
        use crate::schema::tenant_user;

        let mut conn = self.conn()?;
        diesel::insert_into(tenant_user::table)
            .values(DbNewTenantUser {
                tenant_id: tenant_id.get(),
                user_id: user_id.get(),
                is_default,
            })
            .on_conflict((tenant_user::tenant_id, tenant_user::user_id))
            .do_update()
            .set(tenant_user::is_default.eq(is_default))
            .execute(&mut conn)?;

        Ok(())
    }
}
