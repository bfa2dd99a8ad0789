#![allow(dead_code)]

use diesel::RunQueryDsl;
use fieldops::db::{DbPool, establish_connection_pool, run_pending_migrations};
use fieldops::domain::types::{Email, TenantId, UserId};
use fieldops::repository::{DieselRepository, TenantReader};
use fieldops::seed::{seed_demo, seed_permissions};
use tempfile::TempDir;

/// Migrated SQLite database living in a temporary directory.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let url = dir.path().join(name);
        let pool =
            establish_connection_pool(url.to_str().expect("utf-8 path")).expect("pool");
        {
            let mut conn = pool.get().expect("connection");
            run_pending_migrations(&mut conn).expect("migrations");
        }
        Self { _dir: dir, pool }
    }

    /// Database with the permission catalog, system roles, and demo tenants.
    pub fn seeded(name: &str) -> Self {
        let db = Self::new(name);
        let repo = db.repo();
        seed_permissions(&repo).expect("permissions seeded");
        seed_demo(&repo).expect("demo seeded");
        db
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    pub fn execute(&self, sql: &str) {
        let mut conn = self.pool.get().expect("connection");
        diesel::sql_query(sql).execute(&mut conn).expect(sql);
    }

    /// Id and default tenant of a demo user.
    pub fn demo_user(&self, email: &str) -> (UserId, TenantId) {
        let user = self
            .repo()
            .get_user_by_email(&Email::new(email).expect("valid email"))
            .expect("query")
            .expect("demo user exists");
        (user.id, user.tenant_id.expect("demo users belong to a tenant"))
    }

    /// Customer of `tenant_id` for work order tests.
    pub fn insert_customer(&self, tenant_id: TenantId, name: &str) -> i32 {
        self.execute(&format!(
            "INSERT INTO customers (tenant_id, name) VALUES ({}, '{name}')",
            tenant_id.get()
        ));
        self.last_id("customers")
    }

    pub fn last_id(&self, table: &str) -> i32 {
        #[derive(diesel::QueryableByName)]
        struct Row {
            #[diesel(sql_type = diesel::sql_types::Integer)]
            id: i32,
        }

        let mut conn = self.pool.get().expect("connection");
        diesel::sql_query(format!("SELECT MAX(id) AS id FROM {table}"))
            .get_result::<Row>(&mut conn)
            .expect("row")
            .id
    }
}
