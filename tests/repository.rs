use rust_decimal::Decimal;

use fieldops::domain::reconciliation::EntryStatus;
use fieldops::domain::types::{TenantId, UserId};
use fieldops::domain::work_order::WorkOrderStatus;
use fieldops::forms::reconciliation::ImportStatementPayload;
use fieldops::forms::work_orders::{AddItemForm, ChangeStatusForm, CreateWorkOrderForm};
use fieldops::models::auth::AuthenticatedUser;
use fieldops::repository::ReconciliationReader;
use fieldops::services::{ServiceError, reconciliation, work_orders};

mod common;

const MANAGER: &str = "carlos@calibracoes.com.br";
const TECHNICIAN: &str = "roberto@calibracoes.com.br";

const OFX: &str = "<OFX><BANKTRANLIST>\n\
    <STMTTRN><TRNTYPE>CREDIT<DTPOSTED>20260410<TRNAMT>1500.00<MEMO>PIX RECEBIDO ACME LTDA</STMTTRN>\n\
    <STMTTRN><TRNTYPE>DEBIT<DTPOSTED>20260411<TRNAMT>-12.90<MEMO>TARIFA PACOTE SERVICOS</STMTTRN>\n\
    </BANKTRANLIST></OFX>";

fn acting_as(db: &common::TestDb, email: &str) -> (AuthenticatedUser, TenantId) {
    let (user_id, tenant_id): (UserId, TenantId) = db.demo_user(email);
    (
        AuthenticatedUser::new(user_id, tenant_id, email, "Demo"),
        tenant_id,
    )
}

fn order_form(customer_id: i32, assigned_to: Option<i32>) -> CreateWorkOrderForm {
    CreateWorkOrderForm {
        customer_id,
        branch_id: None,
        quote_id: None,
        priority: "normal".to_string(),
        description: Some("Calibração anual".to_string()),
        assigned_to,
        seller_id: None,
        driver_id: None,
        sla_policy_id: None,
        is_warranty: false,
        displacement: None,
    }
}

fn status(value: &str) -> ChangeStatusForm {
    ChangeStatusForm {
        status: value.to_string(),
        notes: None,
    }
}

#[test]
fn work_order_lifecycle_generates_commissions() {
    let db = common::TestDb::seeded("work_order_lifecycle.db");
    let repo = db.repo();
    let (user, tenant_id) = acting_as(&db, MANAGER);
    let (technician, _) = db.demo_user(TECHNICIAN);
    let customer = db.insert_customer(tenant_id, "ACME Ltda");
    db.execute(&format!(
        "INSERT INTO commission_rules (tenant_id, name, value) VALUES ({}, 'Técnico 10%', '10')",
        tenant_id.get()
    ));

    let order = work_orders::create_work_order(
        &repo,
        &user,
        order_form(customer, Some(technician.get())),
    )
    .expect("created");
    assert_eq!(order.number, "OS-000001");
    assert_eq!(order.status, WorkOrderStatus::Open);
    let second = work_orders::create_work_order(&repo, &user, order_form(customer, None))
        .expect("created");
    assert_eq!(second.number, "OS-000002");

    let details = work_orders::add_item(
        &repo,
        &user,
        order.id.get(),
        AddItemForm {
            item_type: "service".to_string(),
            description: "Calibração de balança".to_string(),
            quantity: Decimal::from(2),
            unit_price: Decimal::from(150),
            cost_price: None,
        },
    )
    .expect("item added");
    assert_eq!(details.order.total, Decimal::from(300));
    assert_eq!(details.items.len(), 1);

    work_orders::change_status(&repo, &user, order.id.get(), status("in_progress"))
        .expect("started");
    let outcome = work_orders::change_status(&repo, &user, order.id.get(), status("completed"))
        .expect("completed");

    assert!(outcome.order.completed_at.is_some());
    assert_eq!(outcome.commissions.len(), 1);
    assert_eq!(outcome.commissions[0].user_id, technician);
    assert_eq!(outcome.commissions[0].commission_amount, Decimal::from(30));

    assert!(matches!(
        work_orders::change_status(&repo, &user, order.id.get(), status("invoiced")),
        Err(ServiceError::Conflict(_))
    ));
}

#[test]
fn orders_of_other_tenants_are_invisible() {
    let db = common::TestDb::seeded("work_order_isolation.db");
    let repo = db.repo();
    let (user, tenant_id) = acting_as(&db, MANAGER);
    let customer = db.insert_customer(tenant_id, "ACME Ltda");
    let order =
        work_orders::create_work_order(&repo, &user, order_form(customer, None)).expect("created");

    let (outsider, _) = acting_as(&db, "paulo@techassist.com.br");

    assert!(matches!(
        work_orders::change_status(&repo, &outsider, order.id.get(), status("in_progress")),
        Err(ServiceError::NotFound)
    ));
}

#[test]
fn statement_import_matches_and_flags_duplicates() {
    let db = common::TestDb::seeded("statement_import.db");
    let repo = db.repo();
    let (user, tenant_id) = acting_as(&db, MANAGER);
    db.execute(&format!(
        "INSERT INTO accounts_receivable (tenant_id, description, amount_cents, due_date) \
         VALUES ({}, 'Fatura OS-000001', 150000, '2026-04-12')",
        tenant_id.get()
    ));
    let receivable = db.last_id("accounts_receivable");

    let payload = ImportStatementPayload::new(Some("abril.ofx"), OFX.as_bytes(), None)
        .expect("valid upload");
    let first = reconciliation::import_payload(&repo, &user, payload).expect("imported");

    assert_eq!(first.statement.total_entries, 2);
    assert_eq!(first.statement.matched_entries, 1);
    assert_eq!(first.auto_matched, 1);
    assert_eq!(first.duplicates, 0);

    let entries = repo
        .list_statement_entries(first.statement.id)
        .expect("entries");
    let credit = entries
        .iter()
        .find(|e| e.status == EntryStatus::Matched)
        .expect("matched credit");
    assert_eq!(credit.matched_id, Some(receivable));
    assert_eq!(credit.reconciled_by.as_deref(), Some("auto"));

    let payload = ImportStatementPayload::new(Some("abril.ofx"), OFX.as_bytes(), None)
        .expect("valid upload");
    let second = reconciliation::import_payload(&repo, &user, payload).expect("imported");
    assert_eq!(second.duplicates, 2);

    let summary = reconciliation::summary(&repo, &user).expect("summary");
    assert_eq!(summary.total_entries, 4);
    assert_eq!(summary.duplicate_count, 2);

    let export =
        reconciliation::export_statement(&repo, &user, first.statement.id.get()).expect("csv");
    assert!(export.content.contains(&format!("receivable #{receivable}")));

    let entry = reconciliation::unmatch_entry(&repo, &user, credit.id.get()).expect("unmatched");
    assert_eq!(entry.status, EntryStatus::Pending);
    assert_eq!(entry.matched_id, None);
}

#[test]
fn tenant_admin_cannot_rewrite_shared_roles() {
    use fieldops::domain::types::RoleName;
    use fieldops::forms::access::SyncRolePermissionsForm;
    use fieldops::repository::AccessReader;
    use fieldops::seed::permissions::PERMISSIONS;
    use fieldops::services::access;

    let db = common::TestDb::seeded("shared_roles.db");
    let repo = db.repo();
    let (paulo, _) = acting_as(&db, "paulo@techassist.com.br");
    let admin_role = repo
        .get_role_by_name(&RoleName::new("admin").expect("valid name"))
        .expect("query")
        .expect("admin role seeded");

    let result = access::sync_role_permissions(
        &repo,
        &paulo,
        admin_role.id.get(),
        SyncRolePermissionsForm {
            permissions: PERMISSIONS.iter().map(|p| p.to_string()).collect(),
        },
    );
    assert!(matches!(result, Err(ServiceError::Unauthorized)));

    let (maria, medequip) = db.demo_user("maria@medequip.com.br");
    for name in ["iam.permission.manage", "platform.tenant.create"] {
        assert!(
            !repo
                .user_has_permission(maria, medequip, name)
                .expect("query"),
            "{name} leaked to another tenant's admin"
        );
    }
}

#[test]
fn statement_import_is_all_or_nothing() {
    use chrono::{NaiveDate, Utc};
    use fieldops::domain::reconciliation::{
        EntryUpdate, ImportedEntry, NewBankStatement, ParsedEntry, StatementFormat,
    };
    use fieldops::domain::types::ReconciliationRuleId;
    use fieldops::repository::ReconciliationWriter;
    use fieldops::repository::errors::RepositoryError;

    let db = common::TestDb::seeded("statement_rollback.db");
    let repo = db.repo();
    let (user, tenant_id) = acting_as(&db, MANAGER);
    db.execute(&format!(
        "INSERT INTO reconciliation_rules \
         (tenant_id, name, match_value, rule_action, category) \
         VALUES ({}, 'Tarifas', 'tarifa', 'categorize', 'Tarifas bancárias')",
        tenant_id.get()
    ));
    let rule_id = ReconciliationRuleId::new(db.last_id("reconciliation_rules")).expect("valid id");

    let parsed = |day: u32, description: &str, amount: Decimal| ParsedEntry {
        date: NaiveDate::from_ymd_opt(2026, 4, day).expect("valid date"),
        description: description.to_string(),
        amount,
    };
    let by_rule = |id: ReconciliationRuleId| EntryUpdate {
        rule_id: Some(id),
        category: Some(Some("Tarifas bancárias".to_string())),
        reconciled_by: Some("rule".to_string()),
        reconciled_at: Some(Utc::now().naive_utc()),
        ..Default::default()
    };
    let missing_rule = ReconciliationRuleId::new(9_999).expect("valid id");

    let result = repo.import_bank_statement(&NewBankStatement {
        tenant_id,
        bank_account_id: None,
        filename: "abril.ofx".to_string(),
        format: StatementFormat::Ofx,
        created_by: None,
        entries: vec![
            ImportedEntry::pending(parsed(10, "PIX RECEBIDO ACME LTDA", Decimal::new(150000, 2))),
            ImportedEntry {
                parsed: parsed(11, "TARIFA PACOTE SERVICOS", Decimal::new(-1290, 2)),
                resolution: Some(by_rule(rule_id)),
            },
            ImportedEntry {
                parsed: parsed(12, "TARIFA TED", Decimal::new(-990, 2)),
                resolution: Some(by_rule(missing_rule)),
            },
        ],
    });
    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));

    let summary = repo.reconciliation_summary(tenant_id).expect("summary");
    assert_eq!(summary.total_entries, 0);
    let rules = repo.list_reconciliation_rules(tenant_id).expect("rules");
    assert_eq!(rules[0].times_applied, 0);

    let payload = ImportStatementPayload::new(Some("abril.ofx"), OFX.as_bytes(), None)
        .expect("valid upload");
    let report = reconciliation::import_payload(&repo, &user, payload).expect("imported");
    assert_eq!(report.rules_applied, 1);

    let rules = repo.list_reconciliation_rules(tenant_id).expect("rules");
    assert_eq!(rules[0].times_applied, 1);
    let entries = repo
        .list_statement_entries(report.statement.id)
        .expect("entries");
    let fee = entries
        .iter()
        .find(|e| e.rule_id == Some(rule_id))
        .expect("fee categorized by rule");
    assert_eq!(fee.category.as_deref(), Some("Tarifas bancárias"));
}

#[test]
fn global_role_assignments_are_unique() {
    use diesel::RunQueryDsl;
    use fieldops::domain::access::RoleAssignment;
    use fieldops::domain::types::{Email, RoleName};
    use fieldops::repository::{AccessReader, AccessWriter, TenantReader};
    use fieldops::seed::demo::PLATFORM_ADMIN_EMAIL;

    let db = common::TestDb::seeded("global_roles.db");
    let repo = db.repo();
    let admin = repo
        .get_user_by_email(&Email::new(PLATFORM_ADMIN_EMAIL).expect("valid email"))
        .expect("query")
        .expect("platform admin seeded");
    let super_admin = repo
        .get_role_by_name(&RoleName::new("super_admin").expect("valid name"))
        .expect("query")
        .expect("role seeded");

    let mut conn = db.pool().get().expect("connection");
    let duplicate = diesel::sql_query(format!(
        "INSERT INTO user_roles (role_id, user_id, tenant_id) VALUES ({}, {}, NULL)",
        super_admin.id.get(),
        admin.id.get()
    ))
    .execute(&mut conn);
    assert!(duplicate.is_err(), "second global assignment was stored");
    drop(conn);

    let assigned = repo
        .assign_role(&RoleAssignment {
            user_id: admin.id,
            role_id: super_admin.id,
            tenant_id: None,
        })
        .expect("assignment");
    assert!(!assigned);
}
