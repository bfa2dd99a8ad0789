use diesel::RunQueryDsl;
use diesel::sql_types::Text;
use fieldops::db::{
    MigrationError, migration_status, revert_all_migrations, revert_last_migration,
    run_pending_migrations,
};

mod common;

#[derive(diesel::QueryableByName)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

fn application_tables(db: &common::TestDb) -> Vec<String> {
    let mut conn = db.pool().get().expect("connection");
    diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type = 'table' \
         AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' \
         ORDER BY name",
    )
    .load::<TableName>(&mut conn)
    .expect("tables")
    .into_iter()
    .map(|t| t.name)
    .collect()
}

#[test]
fn migrates_down_to_empty_and_back_up() {
    let db = common::TestDb::new("migrations_round_trip.db");
    let tables = application_tables(&db);
    for expected in [
        "tenants",
        "permissions",
        "roles",
        "work_orders",
        "commission_events",
        "bank_statement_entries",
        "system_alerts",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing {expected}");
    }

    let mut conn = db.pool().get().expect("connection");
    let reverted = revert_all_migrations(&mut conn).expect("reverted");
    assert!(!reverted.is_empty());
    drop(conn);
    assert!(application_tables(&db).is_empty());

    let mut conn = db.pool().get().expect("connection");
    let applied = run_pending_migrations(&mut conn).expect("re-applied");
    assert_eq!(applied.len(), reverted.len());
}

#[test]
fn status_tracks_rollback() {
    let db = common::TestDb::new("migrations_status.db");
    let mut conn = db.pool().get().expect("connection");

    let states = migration_status(&mut conn).expect("status");
    assert!(states.iter().all(|s| s.applied));
    let newest = states.last().expect("at least one migration").version.clone();

    let reverted = revert_last_migration(&mut conn).expect("reverted");
    assert_eq!(reverted, newest);

    let states = migration_status(&mut conn).expect("status");
    let pending: Vec<_> = states.iter().filter(|s| !s.applied).collect();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].version, newest);
}

#[test]
fn nothing_to_revert_on_empty_schema() {
    let db = common::TestDb::new("migrations_empty.db");
    let mut conn = db.pool().get().expect("connection");
    revert_all_migrations(&mut conn).expect("reverted");

    assert!(matches!(
        revert_last_migration(&mut conn),
        Err(MigrationError::NothingToRevert)
    ));
}
