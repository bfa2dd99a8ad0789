use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::{
    db::{DbConnection, DbPool},
    domain::{
        access::{NewRole, Permission, Role, RoleAssignment, RoleWithPermissions},
        commission::{
            Campaign, CommissionEvent, CommissionRule, NewCommissionEvent, NewSettlement, Release,
            Settlement, Trigger,
        },
        finance::Receivable,
        reconciliation::{
            BankStatement, Candidate, EntryUpdate, MatchTarget, NewBankStatement,
            NewReconciliationRule, ReconciliationRule, ReconciliationSummary, StatementEntry,
        },
        sla::{ServiceCall, SlaPolicy},
        system_alert::{NewSystemAlert, SystemAlert},
        tenant::{Branch, NewBranch, NewTenant, NewUser, Tenant, User},
        types::{
            BankStatementId, CommissionEventId, CustomerId, DocumentNumber, Email, PermissionName,
            QuoteId, ReceivableId, RoleId, RoleName, SettlementId, SlaPolicyId, StatementEntryId,
            TenantId, UserId, WorkOrderId,
        },
        work_order::{
            NewWorkOrder, NewWorkOrderItem, OrderTechnician, StatusChange, WorkOrder,
            WorkOrderItem,
        },
    },
    repository::errors::RepositoryResult,
};

pub mod access;
pub mod commission;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod reconciliation;
pub mod sla;
pub mod tenant;
pub mod work_order;

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only tenancy operations.
pub trait TenantReader {
    fn get_tenant_by_document(&self, document: &DocumentNumber)
    -> RepositoryResult<Option<Tenant>>;
    fn list_tenants(&self) -> RepositoryResult<Vec<Tenant>>;
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>>;
}

/// Write operations for tenants, branches, and users.
pub trait TenantWriter {
    fn create_tenant(&self, tenant: &NewTenant) -> RepositoryResult<Tenant>;
    fn create_branch(&self, branch: &NewBranch) -> RepositoryResult<Branch>;
    /// Inserts the user and makes its tenant the default membership.
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
    fn attach_user_to_tenant(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
        is_default: bool,
    ) -> RepositoryResult<()>;
}

/// Read-only access control operations.
pub trait AccessReader {
    fn list_permissions(&self) -> RepositoryResult<Vec<Permission>>;
    fn list_roles_with_permissions(&self) -> RepositoryResult<Vec<RoleWithPermissions>>;
    fn get_role_by_id(&self, id: RoleId) -> RepositoryResult<Option<Role>>;
    fn get_role_by_name(&self, name: &RoleName) -> RepositoryResult<Option<Role>>;
    /// Permissions granted through roles assigned in `tenant_id` or globally.
    fn list_user_permissions(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Vec<PermissionName>>;
    fn user_has_permission(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
        permission: &str,
    ) -> RepositoryResult<bool>;
}

/// Write operations for permissions, roles, and assignments.
pub trait AccessWriter {
    /// Inserts the names that do not exist yet and returns how many were created.
    fn create_missing_permissions(
        &self,
        names: &[PermissionName],
        guard_name: &str,
    ) -> RepositoryResult<usize>;
    /// Creates the role or refreshes its display name and description.
    fn upsert_role(&self, role: &NewRole) -> RepositoryResult<Role>;
    /// Replaces the role's permissions with exactly `names`.
    fn sync_role_permissions(
        &self,
        role_id: RoleId,
        names: &[PermissionName],
    ) -> RepositoryResult<usize>;
    /// Returns `false` when the assignment already existed.
    fn assign_role(&self, assignment: &RoleAssignment) -> RepositoryResult<bool>;
}

pub trait WorkOrderReader {
    fn get_work_order_by_id(
        &self,
        id: WorkOrderId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<WorkOrder>>;
    fn list_work_order_items(&self, id: WorkOrderId) -> RepositoryResult<Vec<WorkOrderItem>>;
    fn list_work_order_technicians(
        &self,
        id: WorkOrderId,
    ) -> RepositoryResult<Vec<OrderTechnician>>;
    fn get_quote_source(&self, id: QuoteId) -> RepositoryResult<Option<String>>;
    /// Approved, non-deleted expenses of the order that affect its net value.
    fn sum_approved_expenses(&self, id: WorkOrderId) -> RepositoryResult<Decimal>;
    fn get_sla_policy(
        &self,
        id: SlaPolicyId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<SlaPolicy>>;
    fn customer_exists(&self, id: CustomerId, tenant_id: TenantId) -> RepositoryResult<bool>;
}

pub trait WorkOrderWriter {
    /// Allocates the next tenant number and inserts the order atomically.
    fn create_work_order(&self, order: &NewWorkOrder) -> RepositoryResult<WorkOrder>;
    /// Inserts the item and recalculates the order total.
    fn add_work_order_item(&self, item: &NewWorkOrderItem) -> RepositoryResult<WorkOrder>;
    /// Writes the new status together with its history row.
    fn change_work_order_status(&self, change: &StatusChange) -> RepositoryResult<WorkOrder>;
    fn assign_technician(
        &self,
        work_order_id: WorkOrderId,
        user_id: UserId,
        role: &str,
    ) -> RepositoryResult<()>;
}

pub trait CommissionReader {
    /// Active rules of the tenant.
    fn list_commission_rules(&self, tenant_id: TenantId) -> RepositoryResult<Vec<CommissionRule>>;
    /// Active campaigns whose date range contains `today`.
    fn list_running_campaigns(
        &self,
        tenant_id: TenantId,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<Campaign>>;
    fn commission_events_exist(
        &self,
        work_order_id: WorkOrderId,
        trigger: Trigger,
    ) -> RepositoryResult<bool>;
    fn list_pending_commission_events(
        &self,
        work_order_id: WorkOrderId,
    ) -> RepositoryResult<Vec<CommissionEvent>>;
    fn get_receivable_by_id(
        &self,
        id: ReceivableId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Receivable>>;
    /// Approved, unsettled events of a user that fall in `period` (`YYYY-MM`).
    fn list_settleable_events(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        period: &str,
    ) -> RepositoryResult<Vec<CommissionEvent>>;
    fn get_settlement_by_period(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        period: &str,
    ) -> RepositoryResult<Option<Settlement>>;
    fn get_settlement_by_id(
        &self,
        id: SettlementId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<Settlement>>;
}

pub trait CommissionWriter {
    fn create_commission_events(
        &self,
        events: &[NewCommissionEvent],
    ) -> RepositoryResult<Vec<CommissionEvent>>;
    /// Applies every planned release for a payment in one transaction.
    fn apply_commission_releases(
        &self,
        receivable_id: ReceivableId,
        releases: &[(CommissionEvent, Release)],
    ) -> RepositoryResult<usize>;
    /// Creates or refreshes the period's settlement and links the events to it.
    fn close_settlement(
        &self,
        settlement: &NewSettlement,
        event_ids: &[CommissionEventId],
    ) -> RepositoryResult<Settlement>;
    fn approve_settlement(
        &self,
        id: SettlementId,
        approved_by: UserId,
        at: NaiveDateTime,
    ) -> RepositoryResult<Settlement>;
    /// Marks the settlement and its events paid.
    fn pay_settlement(
        &self,
        id: SettlementId,
        paid_amount: Decimal,
        at: NaiveDateTime,
    ) -> RepositoryResult<Settlement>;
}

pub trait SlaReader {
    /// Work orders still running against a deadline.
    fn list_open_work_orders_with_deadline(
        &self,
        tenant_id: TenantId,
    ) -> RepositoryResult<Vec<WorkOrder>>;
    fn list_open_service_calls_with_deadline(
        &self,
        tenant_id: TenantId,
    ) -> RepositoryResult<Vec<ServiceCall>>;
    /// Non-cancelled work orders that have a deadline.
    fn list_sla_tracked_work_orders(&self, tenant_id: TenantId)
    -> RepositoryResult<Vec<WorkOrder>>;
    fn alert_recorded_since(
        &self,
        tenant_id: TenantId,
        alert_type: &str,
        model_type: &str,
        model_id: i32,
        since: NaiveDateTime,
    ) -> RepositoryResult<bool>;
}

pub trait SlaWriter {
    fn create_system_alert(&self, alert: &NewSystemAlert) -> RepositoryResult<SystemAlert>;
}

pub trait ReconciliationReader {
    fn get_bank_statement(
        &self,
        id: BankStatementId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<BankStatement>>;
    /// Entries ordered by date then id.
    fn list_statement_entries(
        &self,
        statement_id: BankStatementId,
    ) -> RepositoryResult<Vec<StatementEntry>>;
    fn get_statement_entry(
        &self,
        id: StatementEntryId,
        tenant_id: TenantId,
    ) -> RepositoryResult<Option<StatementEntry>>;
    /// Pending or partially paid titles of the given kind.
    fn list_open_titles(
        &self,
        tenant_id: TenantId,
        target: MatchTarget,
    ) -> RepositoryResult<Vec<Candidate>>;
    /// Open titles within 20% of `amount`, earliest due first.
    fn list_titles_near_amount(
        &self,
        tenant_id: TenantId,
        target: MatchTarget,
        amount: Decimal,
        limit: i64,
    ) -> RepositoryResult<Vec<Candidate>>;
    fn title_exists(
        &self,
        tenant_id: TenantId,
        target: MatchTarget,
        id: i32,
    ) -> RepositoryResult<bool>;
    /// Active rules in ascending priority.
    fn list_reconciliation_rules(
        &self,
        tenant_id: TenantId,
    ) -> RepositoryResult<Vec<ReconciliationRule>>;
    fn reconciliation_summary(&self, tenant_id: TenantId)
    -> RepositoryResult<ReconciliationSummary>;
    /// Open titles whose description or counterparty contains `query`.
    fn search_open_titles(
        &self,
        tenant_id: TenantId,
        target: MatchTarget,
        query: &str,
        limit: i64,
    ) -> RepositoryResult<Vec<Candidate>>;
}

pub trait ReconciliationWriter {
    /// Inserts the statement and its entries in one transaction, flagging
    /// possible duplicates and applying each entry's resolution.
    fn import_bank_statement(
        &self,
        statement: &NewBankStatement,
    ) -> RepositoryResult<(BankStatement, Vec<StatementEntry>)>;
    /// Applies `update` and refreshes the statement's matched count.
    fn update_statement_entry(
        &self,
        id: StatementEntryId,
        update: &EntryUpdate,
    ) -> RepositoryResult<StatementEntry>;
    fn create_reconciliation_rule(
        &self,
        rule: &NewReconciliationRule,
    ) -> RepositoryResult<ReconciliationRule>;
}
