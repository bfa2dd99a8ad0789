//! Diesel models for SLA policies, service calls, and system alerts.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::sla::{ServiceCall as DomainServiceCall, SlaPolicy as DomainSlaPolicy};
use crate::domain::system_alert::{
    NewSystemAlert as DomainNewSystemAlert, SystemAlert as DomainSystemAlert,
};
use crate::domain::types::{
    CustomerId, ServiceCallId, SlaPolicyId, SystemAlertId, TenantId, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::sla_policies)]
pub struct SlaPolicy {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub priority: String,
    pub response_hours: i32,
    pub resolution_hours: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::service_calls)]
pub struct ServiceCall {
    pub id: i32,
    pub tenant_id: i32,
    pub customer_id: i32,
    pub call_number: String,
    pub subject: String,
    pub status: String,
    pub priority: String,
    pub assigned_to: Option<i32>,
    pub sla_deadline: Option<NaiveDateTime>,
    pub resolved_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::system_alerts)]
pub struct SystemAlert {
    pub id: i32,
    pub tenant_id: i32,
    pub alert_type: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub model_type: Option<String>,
    pub model_id: Option<i32>,
    pub metadata: Option<String>,
    pub acknowledged_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::system_alerts)]
pub struct NewSystemAlert<'a> {
    pub tenant_id: i32,
    pub alert_type: &'a str,
    pub severity: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub model_type: Option<&'a str>,
    pub model_id: Option<i32>,
    pub metadata: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<SlaPolicy> for DomainSlaPolicy {
    type Error = TypeConstraintError;

    fn try_from(policy: SlaPolicy) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SlaPolicyId::try_from(policy.id)?,
            tenant_id: TenantId::try_from(policy.tenant_id)?,
            name: policy.name,
            priority: policy.priority,
            response_hours: policy.response_hours,
            resolution_hours: policy.resolution_hours,
            is_active: policy.is_active,
        })
    }
}

impl TryFrom<ServiceCall> for DomainServiceCall {
    type Error = TypeConstraintError;

    fn try_from(call: ServiceCall) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ServiceCallId::try_from(call.id)?,
            tenant_id: TenantId::try_from(call.tenant_id)?,
            customer_id: CustomerId::try_from(call.customer_id)?,
            call_number: call.call_number,
            subject: call.subject,
            status: call.status,
            priority: call.priority,
            assigned_to: call.assigned_to.map(UserId::try_from).transpose()?,
            sla_deadline: call.sla_deadline,
            resolved_at: call.resolved_at,
            created_at: call.created_at,
        })
    }
}

impl TryFrom<SystemAlert> for DomainSystemAlert {
    type Error = TypeConstraintError;

    fn try_from(alert: SystemAlert) -> Result<Self, Self::Error> {
        let metadata = alert
            .metadata
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|err| TypeConstraintError::InvalidValue(format!("alert metadata: {err}")))?;

        Ok(Self {
            id: SystemAlertId::try_from(alert.id)?,
            tenant_id: TenantId::try_from(alert.tenant_id)?,
            alert_type: alert.alert_type,
            severity: alert.severity,
            title: alert.title,
            message: alert.message,
            model_type: alert.model_type,
            model_id: alert.model_id,
            metadata,
            acknowledged_at: alert.acknowledged_at,
            created_at: alert.created_at,
        })
    }
}

impl<'a> NewSystemAlert<'a> {
    /// Insertable row for `alert` stamped at `now`.
    pub fn at(alert: &'a DomainNewSystemAlert, now: NaiveDateTime) -> Self {
        Self {
            tenant_id: alert.tenant_id.get(),
            alert_type: alert.alert_type.as_str(),
            severity: alert.severity.as_str(),
            title: alert.title.as_str(),
            message: alert.message.as_str(),
            model_type: alert.model_type.as_deref(),
            model_id: alert.model_id,
            metadata: alert.metadata.as_ref().map(|value| value.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}
