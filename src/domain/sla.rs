//! SLA escalation levels and deadline evaluation.

use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{CustomerId, ServiceCallId, SlaPolicyId, TenantId, UserId};

/// Service call statuses that stop the SLA clock.
pub const CLOSED_CALL_STATUSES: [&str; 3] = ["closed", "cancelled", "resolved"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationLevel {
    Warning,
    High,
    Critical,
    Breached,
}

/// Who gets notified when a level is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTarget {
    Assigned,
    Supervisor,
    Manager,
    Director,
}

impl EscalationLevel {
    /// Levels in ascending threshold order.
    pub const ALL: [EscalationLevel; 4] = [
        EscalationLevel::Warning,
        EscalationLevel::High,
        EscalationLevel::Critical,
        EscalationLevel::Breached,
    ];

    /// Percentage of the SLA window at which the level fires.
    pub fn threshold(self) -> u8 {
        match self {
            EscalationLevel::Warning => 50,
            EscalationLevel::High => 75,
            EscalationLevel::Critical => 90,
            EscalationLevel::Breached => 100,
        }
    }

    pub fn target(self) -> EscalationTarget {
        match self {
            EscalationLevel::Warning => EscalationTarget::Assigned,
            EscalationLevel::High => EscalationTarget::Supervisor,
            EscalationLevel::Critical => EscalationTarget::Manager,
            EscalationLevel::Breached => EscalationTarget::Director,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EscalationLevel::Warning => "warning",
            EscalationLevel::High => "high",
            EscalationLevel::Critical => "critical",
            EscalationLevel::Breached => "breached",
        }
    }

    /// Alert severity; a breach is reported as critical.
    pub fn severity(self) -> &'static str {
        match self {
            EscalationLevel::Breached => "critical",
            other => other.as_str(),
        }
    }
}

impl Display for EscalationLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tenant deadline policy applied to new work orders.
#[derive(Debug, Clone, Serialize)]
pub struct SlaPolicy {
    pub id: SlaPolicyId,
    pub tenant_id: TenantId,
    pub name: String,
    pub priority: String,
    pub response_hours: i32,
    pub resolution_hours: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceCall {
    pub id: ServiceCallId,
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    pub call_number: String,
    pub subject: String,
    pub status: String,
    pub priority: String,
    pub assigned_to: Option<UserId>,
    pub sla_deadline: Option<NaiveDateTime>,
    pub resolved_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// Kind of record running against an SLA deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlaSubject {
    WorkOrder,
    ServiceCall,
}

impl SlaSubject {
    /// Value stored in `system_alerts.model_type`.
    pub fn model_type(self) -> &'static str {
        match self {
            SlaSubject::WorkOrder => "work_order",
            SlaSubject::ServiceCall => "service_call",
        }
    }

    /// Alert type key used both to record and to deduplicate escalations.
    pub fn alert_type(self, level: EscalationLevel) -> String {
        match self {
            SlaSubject::WorkOrder => format!("sla_escalation_{level}"),
            SlaSubject::ServiceCall => format!("sla_sc_escalation_{level}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Escalation {
    pub level: EscalationLevel,
    pub target: EscalationTarget,
    pub threshold: u8,
    pub percent_used: f64,
    pub minutes_remaining: i64,
    pub deadline: NaiveDateTime,
}

/// Raw percentage of the window between `created_at` and `deadline` consumed
/// at `now`. `None` for empty or inverted windows.
pub fn percent_used(
    created_at: NaiveDateTime,
    deadline: NaiveDateTime,
    now: NaiveDateTime,
) -> Option<f64> {
    let total = (deadline - created_at).num_minutes();
    if total <= 0 {
        return None;
    }
    let elapsed = (now - created_at).num_minutes().max(0);
    Some(elapsed as f64 / total as f64 * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Highest reached escalation level that has not fired yet.
///
/// `already_escalated` reports whether a level was escalated for this record
/// within the last 24 hours.
pub fn evaluate(
    created_at: NaiveDateTime,
    deadline: NaiveDateTime,
    now: NaiveDateTime,
    already_escalated: impl Fn(EscalationLevel) -> bool,
) -> Option<Escalation> {
    let percent = percent_used(created_at, deadline, now)?;

    let level = EscalationLevel::ALL
        .into_iter()
        .filter(|level| percent >= f64::from(level.threshold()))
        .filter(|level| !already_escalated(*level))
        .next_back()?;

    let total = (deadline - created_at).num_minutes();
    let elapsed = (now - created_at).num_minutes().max(0);

    Some(Escalation {
        level,
        target: level.target(),
        threshold: level.threshold(),
        percent_used: round1(percent),
        minutes_remaining: (total - elapsed).max(0),
        deadline,
    })
}

/// Outcome of one SLA sweep over a tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckResults {
    pub checked: u32,
    pub escalated: u32,
    pub breached: u32,
}

/// SLA compliance snapshot of a tenant's work orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub on_time: u32,
    pub at_risk: u32,
    pub breached: u32,
    pub total: u32,
    pub compliance_rate: f64,
}

impl DashboardStats {
    /// Counts a finished order by comparing its completion with the deadline.
    pub fn record_finished(&mut self, completed_at: NaiveDateTime, deadline: NaiveDateTime) {
        self.total += 1;
        if completed_at <= deadline {
            self.on_time += 1;
        } else {
            self.breached += 1;
        }
    }

    /// Counts an order still running against its deadline.
    pub fn record_open(&mut self, percent: Option<f64>) {
        self.total += 1;
        match percent {
            None => self.on_time += 1,
            Some(p) if p < 75.0 => self.on_time += 1,
            Some(p) if p < 100.0 => self.at_risk += 1,
            Some(_) => self.breached += 1,
        }
    }

    pub fn finish(mut self) -> Self {
        self.compliance_rate = if self.total == 0 {
            100.0
        } else {
            round1(f64::from(self.on_time) / f64::from(self.total) * 100.0)
        };
        self
    }
}
