use fieldops::domain::types::{RoleName, TenantId};
use fieldops::repository::{AccessReader, TenantReader};
use fieldops::seed::permissions::PERMISSIONS;
use fieldops::seed::{seed_demo, seed_permissions};

mod common;

fn grants(db: &common::TestDb, role: &str) -> Vec<String> {
    let mut names: Vec<String> = db
        .repo()
        .list_roles_with_permissions()
        .expect("roles")
        .into_iter()
        .find(|r| r.role.name.as_str() == role)
        .unwrap_or_else(|| panic!("role {role} exists"))
        .permissions
        .into_iter()
        .map(|p| p.as_str().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn seeding_permissions_is_idempotent() {
    let db = common::TestDb::new("seed_idempotent.db");
    let repo = db.repo();

    let first = seed_permissions(&repo).expect("first run");
    assert_eq!(first.total, PERMISSIONS.len());
    assert_eq!(first.created, PERMISSIONS.len());
    let admin_before = grants(&db, "admin");

    let second = seed_permissions(&repo).expect("second run");
    assert_eq!(second.created, 0);
    assert_eq!(second.roles, first.roles);
    assert_eq!(grants(&db, "admin"), admin_before);
    assert_eq!(repo.list_permissions().expect("catalog").len(), PERMISSIONS.len());
}

#[test]
fn role_policies_are_applied() {
    let db = common::TestDb::new("seed_policies.db");
    seed_permissions(&db.repo()).expect("seeded");

    let viewer = grants(&db, "visualizador");
    let mut views: Vec<String> = PERMISSIONS
        .iter()
        .filter(|p| p.ends_with(".view"))
        .map(|p| p.to_string())
        .collect();
    views.sort();
    assert_eq!(viewer, views);

    let admin = grants(&db, "admin");
    assert!(!admin.iter().any(|p| p == "iam.permission.manage"));
    assert!(!admin.iter().any(|p| p.starts_with("platform.tenant.")));

    assert_eq!(grants(&db, "super_admin").len(), PERMISSIONS.len());
}

#[test]
fn demo_seed_skips_existing_tenants() {
    let db = common::TestDb::new("seed_demo.db");
    let repo = db.repo();
    seed_permissions(&repo).expect("permissions");

    let first = seed_demo(&repo).expect("first run");
    assert_eq!(first.tenants_created, 3);
    assert_eq!(first.users_created, 14);

    let second = seed_demo(&repo).expect("second run");
    assert_eq!(second.tenants_created, 0);
    assert_eq!(second.tenants_skipped, 3);
    assert_eq!(repo.list_tenants().expect("tenants").len(), 3);
}

#[test]
fn platform_admin_holds_everything_in_every_tenant() {
    let db = common::TestDb::seeded("seed_admin_scope.db");
    let repo = db.repo();
    let (admin, _) = db.demo_user("admin@sistema.local");

    for tenant in repo.list_tenants().expect("tenants") {
        assert!(
            repo.user_has_permission(admin, tenant.id, "iam.permission.manage")
                .expect("checked")
        );
    }
}

#[test]
fn tenant_roles_do_not_leak_across_tenants() {
    let db = common::TestDb::seeded("seed_tenant_scope.db");
    let repo = db.repo();
    let (paulo, own_tenant) = db.demo_user("paulo@techassist.com.br");
    let other: TenantId = repo
        .list_tenants()
        .expect("tenants")
        .into_iter()
        .map(|t| t.id)
        .find(|id| *id != own_tenant)
        .expect("another tenant");

    assert!(repo.user_has_permission(paulo, own_tenant, "os.work_order.create").expect("checked"));
    assert!(!repo.user_has_permission(paulo, other, "os.work_order.create").expect("checked"));
    assert!(
        repo.get_role_by_name(&RoleName::new("admin").expect("valid name"))
            .expect("query")
            .is_some()
    );
}
