//! Diesel models for commission rules, campaigns, events, and settlements.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use log::warn;
use serde_json::{Value, json};

use crate::domain::commission::{
    CalculationType, Campaign as DomainCampaign, CommissionEvent as DomainCommissionEvent,
    CommissionRule as DomainCommissionRule, NewCommissionEvent as DomainNewCommissionEvent,
    NewSettlement as DomainNewSettlement, Settlement as DomainSettlement, Tier,
};
use crate::domain::money;
use crate::domain::types::{
    CommissionEventId, CommissionRuleId, ReceivableId, SettlementId, TenantId,
    TypeConstraintError, UserId, WorkOrderId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::commission_rules)]
pub struct CommissionRule {
    pub id: i32,
    pub tenant_id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub calculation_type: String,
    pub value: String,
    pub applies_to_role: String,
    pub applies_when: String,
    pub tiers: Option<String>,
    pub source_filter: Option<String>,
    pub priority: i32,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::commission_rules)]
pub struct NewCommissionRule<'a> {
    pub tenant_id: i32,
    pub user_id: Option<i32>,
    pub name: &'a str,
    pub calculation_type: &'a str,
    pub value: String,
    pub applies_to_role: &'a str,
    pub applies_when: &'a str,
    pub tiers: Option<String>,
    pub source_filter: Option<&'a str>,
    pub priority: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::commission_campaigns)]
pub struct CommissionCampaign {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub multiplier: String,
    pub applies_to_role: Option<String>,
    pub applies_to_calculation_type: Option<String>,
    pub starts_at: NaiveDate,
    pub ends_at: NaiveDate,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::commission_events)]
pub struct CommissionEvent {
    pub id: i32,
    pub tenant_id: i32,
    pub commission_rule_id: Option<i32>,
    pub work_order_id: i32,
    pub account_receivable_id: Option<i32>,
    pub settlement_id: Option<i32>,
    pub user_id: i32,
    pub trigger_event: String,
    pub base_amount_cents: i64,
    pub commission_amount_cents: i64,
    pub proportion: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::commission_events)]
pub struct NewCommissionEvent<'a> {
    pub tenant_id: i32,
    pub commission_rule_id: Option<i32>,
    pub work_order_id: i32,
    pub account_receivable_id: Option<i32>,
    pub user_id: i32,
    pub trigger_event: &'a str,
    pub base_amount_cents: i64,
    pub commission_amount_cents: i64,
    pub proportion: String,
    pub status: &'a str,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::commission_settlements)]
pub struct CommissionSettlement {
    pub id: i32,
    pub tenant_id: i32,
    pub user_id: i32,
    pub period: String,
    pub total_cents: i64,
    pub events_count: i32,
    pub status: String,
    pub closed_at: NaiveDateTime,
    pub approved_by: Option<i32>,
    pub approved_at: Option<NaiveDateTime>,
    pub paid_at: Option<NaiveDateTime>,
    pub paid_amount_cents: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::commission_settlements)]
pub struct NewCommissionSettlement<'a> {
    pub tenant_id: i32,
    pub user_id: i32,
    pub period: &'a str,
    pub total_cents: i64,
    pub events_count: i32,
    pub status: &'a str,
    pub closed_at: NaiveDateTime,
}

/// Splits the `tiers` JSON column into marginal tiers and an optional custom
/// formula stored as `{"formula": "..."}`.
pub fn decode_tiers(raw: Option<&str>) -> Result<(Vec<Tier>, Option<String>), TypeConstraintError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok((Vec::new(), None));
    };
    let invalid = |err: serde_json::Error| TypeConstraintError::InvalidValue(format!("tiers: {err}"));

    match serde_json::from_str::<Value>(raw).map_err(invalid)? {
        Value::Object(mut map) => {
            let formula = map
                .remove("formula")
                .and_then(|f| f.as_str().map(str::to_string));
            Ok((Vec::new(), formula))
        }
        value @ Value::Array(_) => Ok((serde_json::from_value(value).map_err(invalid)?, None)),
        Value::Null => Ok((Vec::new(), None)),
        other => Err(TypeConstraintError::InvalidValue(format!(
            "tiers must be a list or an object, got {other}"
        ))),
    }
}

/// Inverse of [`decode_tiers`].
pub fn encode_tiers(tiers: &[Tier], formula: Option<&str>) -> Option<String> {
    match formula {
        Some(formula) => Some(json!({ "formula": formula }).to_string()),
        None if tiers.is_empty() => None,
        None => serde_json::to_string(tiers).ok(),
    }
}

impl TryFrom<CommissionRule> for DomainCommissionRule {
    type Error = TypeConstraintError;

    fn try_from(rule: CommissionRule) -> Result<Self, Self::Error> {
        let calculation_type = rule.calculation_type.parse().unwrap_or_else(|err| {
            warn!("Commission rule {} falls back to percent_gross: {err}", rule.id);
            CalculationType::PercentGross
        });
        let (tiers, formula) = decode_tiers(rule.tiers.as_deref())?;

        Ok(Self {
            id: CommissionRuleId::try_from(rule.id)?,
            tenant_id: TenantId::try_from(rule.tenant_id)?,
            user_id: rule.user_id.map(UserId::try_from).transpose()?,
            name: rule.name,
            calculation_type,
            value: money::parse_decimal(&rule.value)?,
            applies_to_role: rule.applies_to_role,
            applies_when: rule.applies_when.parse()?,
            tiers,
            formula,
            source_filter: rule.source_filter,
            priority: rule.priority,
            active: rule.active,
        })
    }
}

impl<'a> From<&'a DomainCommissionRule> for NewCommissionRule<'a> {
    fn from(rule: &'a DomainCommissionRule) -> Self {
        Self {
            tenant_id: rule.tenant_id.get(),
            user_id: rule.user_id.map(UserId::get),
            name: rule.name.as_str(),
            calculation_type: rule.calculation_type.as_str(),
            value: rule.value.to_string(),
            applies_to_role: rule.applies_to_role.as_str(),
            applies_when: rule.applies_when.as_str(),
            tiers: encode_tiers(&rule.tiers, rule.formula.as_deref()),
            source_filter: rule.source_filter.as_deref(),
            priority: rule.priority,
            active: rule.active,
        }
    }
}

impl TryFrom<CommissionCampaign> for DomainCampaign {
    type Error = TypeConstraintError;

    fn try_from(campaign: CommissionCampaign) -> Result<Self, Self::Error> {
        Ok(Self {
            name: campaign.name,
            multiplier: money::parse_decimal(&campaign.multiplier)?,
            applies_to_role: campaign.applies_to_role,
            applies_to_calculation_type: campaign
                .applies_to_calculation_type
                .filter(|t| !t.is_empty())
                .map(|t| t.parse())
                .transpose()?,
            starts_at: campaign.starts_at,
            ends_at: campaign.ends_at,
            active: campaign.active,
        })
    }
}

impl TryFrom<CommissionEvent> for DomainCommissionEvent {
    type Error = TypeConstraintError;

    fn try_from(event: CommissionEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CommissionEventId::try_from(event.id)?,
            tenant_id: TenantId::try_from(event.tenant_id)?,
            commission_rule_id: event
                .commission_rule_id
                .map(CommissionRuleId::try_from)
                .transpose()?,
            work_order_id: WorkOrderId::try_from(event.work_order_id)?,
            account_receivable_id: event
                .account_receivable_id
                .map(ReceivableId::try_from)
                .transpose()?,
            settlement_id: event.settlement_id.map(SettlementId::try_from).transpose()?,
            user_id: UserId::try_from(event.user_id)?,
            trigger: event.trigger_event.parse()?,
            base_amount: money::from_cents(event.base_amount_cents),
            commission_amount: money::from_cents(event.commission_amount_cents),
            proportion: money::parse_decimal(&event.proportion)?,
            status: event.status.parse()?,
            notes: event.notes,
            created_at: event.created_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainNewCommissionEvent> for NewCommissionEvent<'a> {
    type Error = TypeConstraintError;

    fn try_from(event: &'a DomainNewCommissionEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            tenant_id: event.tenant_id.get(),
            commission_rule_id: event.commission_rule_id.map(CommissionRuleId::get),
            work_order_id: event.work_order_id.get(),
            account_receivable_id: event.account_receivable_id.map(ReceivableId::get),
            user_id: event.user_id.get(),
            trigger_event: event.trigger.as_str(),
            base_amount_cents: money::to_cents(event.base_amount)?,
            commission_amount_cents: money::to_cents(event.commission_amount)?,
            proportion: event.proportion.to_string(),
            status: event.status.as_str(),
            notes: event.notes.as_deref(),
        })
    }
}

impl TryFrom<CommissionSettlement> for DomainSettlement {
    type Error = TypeConstraintError;

    fn try_from(settlement: CommissionSettlement) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SettlementId::try_from(settlement.id)?,
            tenant_id: TenantId::try_from(settlement.tenant_id)?,
            user_id: UserId::try_from(settlement.user_id)?,
            period: settlement.period,
            total_amount: money::from_cents(settlement.total_cents),
            events_count: settlement.events_count,
            status: settlement.status.parse()?,
            closed_at: settlement.closed_at,
            approved_by: settlement.approved_by.map(UserId::try_from).transpose()?,
            approved_at: settlement.approved_at,
            paid_at: settlement.paid_at,
            paid_amount: settlement.paid_amount_cents.map(money::from_cents),
        })
    }
}

impl<'a> TryFrom<&'a DomainNewSettlement> for NewCommissionSettlement<'a> {
    type Error = TypeConstraintError;

    fn try_from(settlement: &'a DomainNewSettlement) -> Result<Self, Self::Error> {
        Ok(Self {
            tenant_id: settlement.tenant_id.get(),
            user_id: settlement.user_id.get(),
            period: settlement.period.as_str(),
            total_cents: money::to_cents(settlement.total_amount)?,
            events_count: settlement.events_count,
            status: "closed",
            closed_at: settlement.closed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn tiers_column_holds_tiers_or_formula() {
        let (tiers, formula) =
            decode_tiers(Some(r#"[{"up_to": 5000, "percent": 5}, {"up_to": null, "percent": 10}]"#))
                .expect("valid tiers");
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].up_to, Some(Decimal::from(5000)));
        assert_eq!(tiers[1].up_to, None);
        assert_eq!(formula, None);

        let (tiers, formula) =
            decode_tiers(Some(r#"{"formula": "gross * percent / 100"}"#)).expect("valid formula");
        assert!(tiers.is_empty());
        assert_eq!(formula.as_deref(), Some("gross * percent / 100"));

        assert_eq!(decode_tiers(None), Ok((Vec::new(), None)));
        assert!(decode_tiers(Some("42")).is_err());
    }

    #[test]
    fn encode_prefers_formula() {
        assert_eq!(
            encode_tiers(&[], Some("gross")).as_deref(),
            Some(r#"{"formula":"gross"}"#)
        );
        assert_eq!(encode_tiers(&[], None), None);
    }

    #[test]
    fn unknown_calculation_type_falls_back() {
        let row = CommissionRule {
            id: 1,
            tenant_id: 1,
            user_id: None,
            name: "Legacy".into(),
            calculation_type: "percent_of_something".into(),
            value: "10".into(),
            applies_to_role: "tecnico".into(),
            applies_when: "os_completed".into(),
            tiers: None,
            source_filter: None,
            priority: 0,
            active: true,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        };

        let rule = DomainCommissionRule::try_from(row).expect("valid rule");

        assert_eq!(rule.calculation_type, CalculationType::PercentGross);
        assert_eq!(rule.value, Decimal::from(10));
    }
}
