//! Commission rules, campaigns, events, and settlements.
//!
//! The calculation itself is pure: callers load the order context, the
//! tenant's active rules and campaigns, and get back the commissions each
//! beneficiary earns. Persistence lives in the repository layer.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::formula;
use crate::domain::money;
use crate::domain::types::{
    CommissionEventId, CommissionRuleId, ReceivableId, SettlementId, TenantId, TypeConstraintError,
    UserId, WorkOrderId, text_enum,
};
use crate::domain::work_order::{ItemType, OrderTechnician, WorkOrder, WorkOrderItem};

pub const ROLE_TECHNICIAN: &str = "tecnico";
pub const ROLE_SELLER: &str = "vendedor";
pub const ROLE_DRIVER: &str = "motorista";

/// Upper bound used for a tier without `up_to`.
const UNBOUNDED_TIER: i64 = 99_999_999_999;

text_enum!(CalculationType, "calculation type", {
    PercentGross => "percent_gross",
    PercentNet => "percent_net",
    PercentGrossMinusDisplacement => "percent_gross_minus_displacement",
    PercentServicesOnly => "percent_services_only",
    PercentProductsOnly => "percent_products_only",
    FixedPerOs => "fixed_per_os",
    PercentProfit => "percent_profit",
    PercentGrossMinusExpenses => "percent_gross_minus_expenses",
    TieredGross => "tiered_gross",
    FixedPerItem => "fixed_per_item",
    CustomFormula => "custom_formula",
});

text_enum!(Trigger, "commission trigger", {
    OsCompleted => "os_completed",
    OsInvoiced => "os_invoiced",
    InstallmentPaid => "installment_paid",
});

text_enum!(CommissionEventStatus, "commission event status", {
    Pending => "pending",
    Approved => "approved",
    Paid => "paid",
    Reversed => "reversed",
});

text_enum!(SettlementStatus, "settlement status", {
    Closed => "closed",
    Approved => "approved",
    Paid => "paid",
});

/// Marginal bracket of a `tiered_gross` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    #[serde(default)]
    pub up_to: Option<Decimal>,
    pub percent: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommissionRule {
    pub id: CommissionRuleId,
    pub tenant_id: TenantId,
    pub user_id: Option<UserId>,
    pub name: String,
    pub calculation_type: CalculationType,
    pub value: Decimal,
    pub applies_to_role: String,
    pub applies_when: Trigger,
    pub tiers: Vec<Tier>,
    pub formula: Option<String>,
    pub source_filter: Option<String>,
    pub priority: i32,
    pub active: bool,
}

/// Order figures every calculation type draws from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationContext {
    pub gross: Decimal,
    pub expenses: Decimal,
    pub displacement: Decimal,
    pub products_total: Decimal,
    pub services_total: Decimal,
    pub cost: Decimal,
    pub items_count: u32,
}

impl CalculationContext {
    /// Builds the context from an order, its items, and the sum of its
    /// approved expenses that affect the net value.
    pub fn from_order(order: &WorkOrder, items: &[WorkOrderItem], expenses: Decimal) -> Self {
        let mut ctx = CalculationContext {
            gross: order.total,
            expenses,
            displacement: order.displacement,
            items_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
            ..Default::default()
        };
        for item in items {
            ctx.cost = money::truncate(ctx.cost + money::mul(item.cost_price, item.quantity));
            match item.item_type {
                ItemType::Product => ctx.products_total += item.total,
                ItemType::Service => ctx.services_total += item.total,
            }
        }
        ctx
    }
}

impl CommissionRule {
    fn factor(&self) -> Decimal {
        money::percent_factor(self.value)
    }

    /// Commission earned on `base` under this rule, before split and campaigns.
    pub fn calculate(&self, base: Decimal, ctx: &CalculationContext) -> Decimal {
        let pct = self.factor();
        let base = money::truncate(base);
        match self.calculation_type {
            CalculationType::PercentGross => money::mul(base, pct),
            CalculationType::PercentNet => {
                money::mul(money::truncate(base - ctx.expenses - ctx.cost), pct)
            }
            CalculationType::PercentGrossMinusDisplacement => {
                money::mul(money::truncate(base - ctx.displacement), pct)
            }
            CalculationType::PercentServicesOnly => money::mul(ctx.services_total, pct),
            CalculationType::PercentProductsOnly => money::mul(ctx.products_total, pct),
            CalculationType::FixedPerOs => money::truncate(self.value),
            CalculationType::FixedPerItem => {
                money::mul(self.value, Decimal::from(ctx.items_count))
            }
            CalculationType::PercentProfit => money::mul(money::truncate(base - ctx.cost), pct),
            CalculationType::PercentGrossMinusExpenses => {
                money::mul(money::truncate(base - ctx.expenses), pct)
            }
            CalculationType::TieredGross => self.calculate_tiered(base),
            CalculationType::CustomFormula => self.calculate_custom(base, ctx),
        }
    }

    fn calculate_tiered(&self, amount: Decimal) -> Decimal {
        let mut commission = Decimal::ZERO;
        let mut remaining = amount;
        let mut previous = Decimal::ZERO;

        for tier in &self.tiers {
            let up_to = tier.up_to.unwrap_or(Decimal::from(UNBOUNDED_TIER));
            let range_size = up_to - previous;
            let range_amount = remaining.min(range_size);
            if range_amount <= Decimal::ZERO {
                break;
            }
            let pct = money::percent_factor(tier.percent);
            commission = money::truncate(commission + money::mul(range_amount, pct));
            remaining -= range_amount;
            previous = up_to;
        }

        commission
    }

    fn calculate_custom(&self, amount: Decimal, ctx: &CalculationContext) -> Decimal {
        let fallback = || money::mul(amount, self.factor());

        let Some(expression) = self.formula.as_deref() else {
            return fallback();
        };

        let gross = if ctx.gross.is_zero() { amount } else { ctx.gross };
        let vars = HashMap::from([
            ("gross", gross),
            ("net", money::truncate(gross - ctx.expenses)),
            ("products", ctx.products_total),
            ("services", ctx.services_total),
            ("expenses", ctx.expenses),
            ("displacement", ctx.displacement),
            ("cost", ctx.cost),
            ("percent", self.value),
        ]);

        match formula::evaluate(expression, &vars) {
            Ok(Some(result)) => money::truncate(result.max(Decimal::ZERO)),
            Ok(None) => Decimal::ZERO,
            Err(err) => {
                log::warn!("Commission formula of rule {} failed: {err}", self.id);
                fallback()
            }
        }
    }

    /// Whether this rule may pay `beneficiary`.
    pub fn applies_to(&self, beneficiary: &Beneficiary) -> bool {
        self.active
            && self.applies_to_role == beneficiary.role
            && self.user_id.is_none_or(|id| id == beneficiary.user_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub name: String,
    pub multiplier: Decimal,
    pub applies_to_role: Option<String>,
    pub applies_to_calculation_type: Option<CalculationType>,
    pub starts_at: NaiveDate,
    pub ends_at: NaiveDate,
    pub active: bool,
}

impl Campaign {
    pub fn is_running(&self, today: NaiveDate) -> bool {
        self.active && self.starts_at <= today && today <= self.ends_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignOutcome {
    pub final_amount: Decimal,
    pub multiplier: Decimal,
    pub campaign_name: Option<String>,
}

/// Applies the largest multiplier among campaigns matching the role and
/// calculation type. Without a match the amount is unchanged.
pub fn apply_campaigns(
    campaigns: &[Campaign],
    role: &str,
    calculation_type: CalculationType,
    amount: Decimal,
) -> CampaignOutcome {
    let mut multiplier = Decimal::ONE;
    let mut campaign_name = None;

    for campaign in campaigns {
        if campaign
            .applies_to_role
            .as_deref()
            .is_some_and(|r| !r.is_empty() && r != role)
        {
            continue;
        }
        if campaign
            .applies_to_calculation_type
            .is_some_and(|t| t != calculation_type)
        {
            continue;
        }
        if money::truncate(campaign.multiplier) > money::truncate(multiplier) {
            multiplier = campaign.multiplier;
            campaign_name = Some(campaign.name.clone());
        }
    }

    CampaignOutcome {
        final_amount: money::mul(amount, multiplier),
        multiplier,
        campaign_name,
    }
}

/// Someone entitled to a commission on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Beneficiary {
    pub user_id: UserId,
    pub role: String,
    pub split_divisor: u32,
}

/// Lists the order's beneficiaries.
///
/// The assigned technician comes first, then pivot technicians (deduplicated
/// by user and role). When more than one distinct technician works the order,
/// each technician's share is divided by their count. A seller who is also a
/// technician on the order earns nothing as seller. The driver is always
/// included.
pub fn identify_beneficiaries(
    order_number: &str,
    assigned_to: Option<UserId>,
    technicians: &[OrderTechnician],
    seller_id: Option<UserId>,
    driver_id: Option<UserId>,
) -> Vec<Beneficiary> {
    let mut list: Vec<(UserId, String)> = Vec::new();
    let mut tech_ids: Vec<UserId> = Vec::new();

    if let Some(id) = assigned_to {
        list.push((id, ROLE_TECHNICIAN.to_string()));
        tech_ids.push(id);
    }

    for tech in technicians {
        let role = if tech.role.is_empty() {
            ROLE_TECHNICIAN
        } else {
            tech.role.as_str()
        };
        if list.iter().any(|(id, r)| *id == tech.user_id && r == role) {
            continue;
        }
        list.push((tech.user_id, role.to_string()));
        if role == ROLE_TECHNICIAN {
            tech_ids.push(tech.user_id);
        }
    }

    tech_ids.sort();
    tech_ids.dedup();
    let tech_count = u32::try_from(tech_ids.len()).unwrap_or(u32::MAX);

    let mut beneficiaries: Vec<Beneficiary> = list
        .into_iter()
        .map(|(user_id, role)| {
            let split_divisor = if role == ROLE_TECHNICIAN && tech_count > 1 {
                tech_count
            } else {
                1
            };
            Beneficiary {
                user_id,
                role,
                split_divisor,
            }
        })
        .collect();

    if let Some(seller) = seller_id {
        if tech_ids.contains(&seller) {
            info!(
                "Seller #{seller} is also a technician on order {order_number}; seller commission blocked."
            );
        } else {
            beneficiaries.push(Beneficiary {
                user_id: seller,
                role: ROLE_SELLER.to_string(),
                split_divisor: 1,
            });
        }
    }

    if let Some(driver) = driver_id {
        beneficiaries.push(Beneficiary {
            user_id: driver,
            role: ROLE_DRIVER.to_string(),
            split_divisor: 1,
        });
    }

    beneficiaries
}

/// Commission computed for one beneficiary, persisted or simulated.
#[derive(Debug, Clone, Serialize)]
pub struct CommissionCalculation {
    pub user_id: UserId,
    pub role: String,
    pub rule_id: CommissionRuleId,
    pub rule_name: String,
    pub calculation_type: CalculationType,
    pub applies_when: Trigger,
    pub base_amount: Decimal,
    pub commission_amount: Decimal,
    pub multiplier: Decimal,
    pub campaign_name: Option<String>,
    pub split_divisor: u32,
    pub notes: String,
}

/// Inputs of a commission run over one order.
pub struct CommissionInput<'a> {
    pub order: &'a WorkOrder,
    pub context: &'a CalculationContext,
    pub beneficiaries: &'a [Beneficiary],
    pub rules: &'a [CommissionRule],
    pub campaigns: &'a [Campaign],
    pub quote_source: Option<&'a str>,
}

/// Selects, per beneficiary, the first rule by descending priority that
/// yields a positive amount.
///
/// With `trigger` set only rules firing on that trigger are considered;
/// simulations pass `None` to preview every rule regardless of trigger.
/// Warranty orders and orders without a positive total earn nothing.
pub fn calculate_commissions(
    input: &CommissionInput<'_>,
    trigger: Option<Trigger>,
) -> Vec<CommissionCalculation> {
    let order = input.order;
    if order.is_warranty || order.total <= Decimal::ZERO {
        return Vec::new();
    }

    let mut rules: Vec<&CommissionRule> = input.rules.iter().collect();
    rules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));

    let mut results = Vec::new();

    for beneficiary in input.beneficiaries {
        let is_seller = beneficiary.role == ROLE_SELLER;

        for rule in rules.iter().filter(|r| r.applies_to(beneficiary)) {
            if is_seller {
                let filter = rule.source_filter.as_deref().filter(|f| !f.is_empty());
                if filter
                    .zip(input.quote_source)
                    .is_some_and(|(filter, source)| filter != source)
                {
                    continue;
                }
            }

            if trigger.is_some_and(|t| t != rule.applies_when) {
                continue;
            }

            let mut amount = rule.calculate(order.total, input.context);
            if amount <= Decimal::ZERO {
                continue;
            }

            if beneficiary.split_divisor > 1 {
                amount = money::div(amount, Decimal::from(beneficiary.split_divisor), 2);
            }

            let outcome = apply_campaigns(
                input.campaigns,
                &beneficiary.role,
                rule.calculation_type,
                amount,
            );

            let mut notes = format!("Regra: {} ({})", rule.name, rule.calculation_type);
            if beneficiary.split_divisor > 1 {
                notes.push_str(&format!(" | Divisão 1/{}", beneficiary.split_divisor));
            }
            if let Some(name) = &outcome.campaign_name {
                notes.push_str(&format!(" | Campanha: {name} (x{})", outcome.multiplier));
            }

            results.push(CommissionCalculation {
                user_id: beneficiary.user_id,
                role: beneficiary.role.clone(),
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                calculation_type: rule.calculation_type,
                applies_when: rule.applies_when,
                base_amount: order.total,
                commission_amount: outcome.final_amount,
                multiplier: outcome.multiplier,
                campaign_name: outcome.campaign_name,
                split_divisor: beneficiary.split_divisor,
                notes,
            });
            break;
        }
    }

    results
}

#[derive(Debug, Clone, Serialize)]
pub struct CommissionEvent {
    pub id: CommissionEventId,
    pub tenant_id: TenantId,
    pub commission_rule_id: Option<CommissionRuleId>,
    pub work_order_id: WorkOrderId,
    pub account_receivable_id: Option<ReceivableId>,
    pub settlement_id: Option<SettlementId>,
    pub user_id: UserId,
    pub trigger: Trigger,
    pub base_amount: Decimal,
    pub commission_amount: Decimal,
    pub proportion: Decimal,
    pub status: CommissionEventStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCommissionEvent {
    pub tenant_id: TenantId,
    pub commission_rule_id: Option<CommissionRuleId>,
    pub work_order_id: WorkOrderId,
    pub account_receivable_id: Option<ReceivableId>,
    pub user_id: UserId,
    pub trigger: Trigger,
    pub base_amount: Decimal,
    pub commission_amount: Decimal,
    pub proportion: Decimal,
    pub status: CommissionEventStatus,
    pub notes: Option<String>,
}

impl NewCommissionEvent {
    /// Pending event for a freshly calculated commission.
    pub fn pending(order: &WorkOrder, trigger: Trigger, calc: &CommissionCalculation) -> Self {
        Self {
            tenant_id: order.tenant_id,
            commission_rule_id: Some(calc.rule_id),
            work_order_id: order.id,
            account_receivable_id: None,
            user_id: calc.user_id,
            trigger,
            base_amount: calc.base_amount,
            commission_amount: calc.commission_amount,
            proportion: Decimal::ONE,
            status: CommissionEventStatus::Pending,
            notes: Some(calc.notes.clone()),
        }
    }
}

/// Share of an order's commissions released by a payment: payment divided by
/// order total, four places, capped at one.
pub fn release_proportion(payment: Decimal, order_total: Decimal) -> Decimal {
    money::div(payment, order_total, 4).min(Decimal::ONE)
}

/// Changes to apply to one pending event when a payment arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    /// The whole event is released.
    Full { proportion: Decimal, notes: String },
    /// A proportional approved event is split off; the pending event keeps
    /// the remainder.
    Partial {
        released_amount: Decimal,
        remaining_amount: Decimal,
        proportion: Decimal,
        released_notes: String,
        remaining_notes: String,
    },
}

/// Plans the release of `event` for receivable `receivable_id`.
pub fn plan_release(
    event: &CommissionEvent,
    proportion: Decimal,
    receivable_id: ReceivableId,
    today: NaiveDate,
) -> Release {
    let notes = event.notes.clone().unwrap_or_default();
    if proportion < Decimal::ONE {
        let released_amount = money::mul(event.commission_amount, proportion);
        Release::Partial {
            released_amount,
            remaining_amount: money::truncate(event.commission_amount - released_amount),
            proportion,
            released_notes: format!(
                "{notes} | Liberada proporcional ({proportion:.4}) pgto #{receivable_id}"
            ),
            remaining_notes: format!("{notes} | Restante após pgto parcial #{receivable_id}"),
        }
    } else {
        Release::Full {
            proportion,
            notes: format!(
                "{notes} | Liberada por pagamento #{receivable_id} em {}",
                today.format("%d/%m/%Y")
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub period: String,
    pub total_amount: Decimal,
    pub events_count: i32,
    pub status: SettlementStatus,
    pub closed_at: NaiveDateTime,
    pub approved_by: Option<UserId>,
    pub approved_at: Option<NaiveDateTime>,
    pub paid_at: Option<NaiveDateTime>,
    pub paid_amount: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewSettlement {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub period: String,
    pub total_amount: Decimal,
    pub events_count: i32,
    pub closed_at: NaiveDateTime,
}

/// Validates a `YYYY-MM` settlement period that is not after `today`'s month.
pub fn validate_period(period: &str, today: NaiveDate) -> Result<String, TypeConstraintError> {
    let trimmed = period.trim();
    let valid_shape = trimmed.len() == 7
        && trimmed.as_bytes()[4] == b'-'
        && NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").is_ok();
    if !valid_shape {
        return Err(TypeConstraintError::InvalidValue(format!(
            "period must be YYYY-MM, got {trimmed}"
        )));
    }
    if trimmed > today.format("%Y-%m").to_string().as_str() {
        return Err(TypeConstraintError::InvalidValue(
            "future periods cannot be closed".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::work_order::WorkOrderStatus;
    use crate::domain::types::CustomerId;

    fn uid(id: i32) -> UserId {
        UserId::new(id).expect("valid user id")
    }

    fn dec(value: &str) -> Decimal {
        value.parse().expect("valid decimal")
    }

    fn rule(id: i32, calculation_type: CalculationType, value: &str) -> CommissionRule {
        CommissionRule {
            id: CommissionRuleId::new(id).expect("valid rule id"),
            tenant_id: TenantId::new(1).expect("valid tenant id"),
            user_id: None,
            name: format!("rule {id}"),
            calculation_type,
            value: dec(value),
            applies_to_role: ROLE_TECHNICIAN.to_string(),
            applies_when: Trigger::OsCompleted,
            tiers: Vec::new(),
            formula: None,
            source_filter: None,
            priority: 0,
            active: true,
        }
    }

    fn context() -> CalculationContext {
        CalculationContext {
            gross: dec("10000"),
            expenses: dec("1000"),
            displacement: dec("500"),
            products_total: dec("4000"),
            services_total: dec("5500"),
            cost: dec("2000"),
            items_count: 3,
        }
    }

    fn order(total: &str) -> WorkOrder {
        let now = NaiveDate::from_ymd_opt(2026, 3, 10)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid datetime");
        WorkOrder {
            id: WorkOrderId::new(5).expect("valid order id"),
            tenant_id: TenantId::new(1).expect("valid tenant id"),
            branch_id: None,
            customer_id: CustomerId::new(1).expect("valid customer id"),
            quote_id: None,
            number: "OS-000005".to_string(),
            status: WorkOrderStatus::Completed,
            priority: "normal".to_string(),
            description: None,
            assigned_to: Some(uid(10)),
            seller_id: None,
            driver_id: None,
            sla_policy_id: None,
            sla_deadline: None,
            is_warranty: false,
            discount: Decimal::ZERO,
            discount_percentage: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            displacement: dec("500"),
            total: dec(total),
            completed_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn percentage_types_use_their_base() {
        let ctx = context();
        let base = dec("10000");
        let cases = [
            (CalculationType::PercentGross, "1000"),
            (CalculationType::PercentNet, "700"),
            (CalculationType::PercentGrossMinusDisplacement, "950"),
            (CalculationType::PercentServicesOnly, "550"),
            (CalculationType::PercentProductsOnly, "400"),
            (CalculationType::PercentProfit, "800"),
            (CalculationType::PercentGrossMinusExpenses, "900"),
        ];
        for (calculation_type, expected) in cases {
            let amount = rule(1, calculation_type, "10").calculate(base, &ctx);
            assert_eq!(amount, dec(expected), "{calculation_type}");
        }
    }

    #[test]
    fn fixed_types_ignore_the_base() {
        let ctx = context();
        assert_eq!(
            rule(1, CalculationType::FixedPerOs, "150").calculate(dec("10000"), &ctx),
            dec("150")
        );
        assert_eq!(
            rule(1, CalculationType::FixedPerItem, "25.50").calculate(dec("10000"), &ctx),
            dec("76.50")
        );
    }

    #[test]
    fn tiered_gross_is_marginal() {
        let mut tiered = rule(1, CalculationType::TieredGross, "0");
        tiered.tiers = vec![
            Tier {
                up_to: Some(dec("5000")),
                percent: dec("5"),
            },
            Tier {
                up_to: Some(dec("10000")),
                percent: dec("8"),
            },
            Tier {
                up_to: None,
                percent: dec("10"),
            },
        ];

        let amount = tiered.calculate(dec("12000"), &CalculationContext::default());

        // 5000 * 5% + 5000 * 8% + 2000 * 10%
        assert_eq!(amount, dec("850"));
    }

    #[test]
    fn custom_formula_clamps_and_falls_back() {
        let ctx = context();
        let mut custom = rule(1, CalculationType::CustomFormula, "10");

        custom.formula = Some("(gross - expenses - cost) * percent / 100".to_string());
        assert_eq!(custom.calculate(dec("10000"), &ctx), dec("700"));

        custom.formula = Some("expenses - gross".to_string());
        assert_eq!(custom.calculate(dec("10000"), &ctx), Decimal::ZERO);

        custom.formula = Some("1.2.3 * gross".to_string());
        assert_eq!(custom.calculate(dec("10000"), &ctx), dec("1000"));

        custom.formula = None;
        assert_eq!(custom.calculate(dec("10000"), &ctx), dec("1000"));
    }

    #[test]
    fn technicians_split_and_seller_blocked() {
        let technicians = vec![
            OrderTechnician {
                user_id: uid(11),
                role: ROLE_TECHNICIAN.to_string(),
            },
            OrderTechnician {
                user_id: uid(10),
                role: ROLE_TECHNICIAN.to_string(),
            },
            OrderTechnician {
                user_id: uid(12),
                role: "auxiliar".to_string(),
            },
        ];

        let list =
            identify_beneficiaries("OS-1", Some(uid(10)), &technicians, Some(uid(11)), Some(uid(13)));

        let summary: Vec<(i32, &str, u32)> = list
            .iter()
            .map(|b| (b.user_id.get(), b.role.as_str(), b.split_divisor))
            .collect();
        assert_eq!(
            summary,
            vec![
                (10, ROLE_TECHNICIAN, 2),
                (11, ROLE_TECHNICIAN, 2),
                (12, "auxiliar", 1),
                (13, ROLE_DRIVER, 1),
            ]
        );
    }

    #[test]
    fn highest_campaign_multiplier_applies() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date");
        let campaign = |name: &str, multiplier: &str, role: Option<&str>| Campaign {
            name: name.to_string(),
            multiplier: dec(multiplier),
            applies_to_role: role.map(str::to_string),
            applies_to_calculation_type: None,
            starts_at: today,
            ends_at: today,
            active: true,
        };
        let campaigns = vec![
            campaign("Março", "1.5", None),
            campaign("Vendas", "3", Some(ROLE_SELLER)),
            campaign("Técnicos", "2", Some(ROLE_TECHNICIAN)),
        ];

        let outcome = apply_campaigns(
            &campaigns,
            ROLE_TECHNICIAN,
            CalculationType::PercentGross,
            dec("100"),
        );

        assert_eq!(outcome.final_amount, dec("200"));
        assert_eq!(outcome.campaign_name.as_deref(), Some("Técnicos"));
    }

    #[test]
    fn first_positive_rule_by_priority_wins() {
        let order = order("10000");
        let ctx = context();
        let beneficiaries = identify_beneficiaries("OS-000005", Some(uid(10)), &[], None, None);

        let mut low = rule(1, CalculationType::PercentGross, "5");
        low.priority = 1;
        let mut zero = rule(2, CalculationType::PercentServicesOnly, "0");
        zero.priority = 10;
        let mut other_trigger = rule(3, CalculationType::PercentGross, "50");
        other_trigger.priority = 20;
        other_trigger.applies_when = Trigger::OsInvoiced;
        let rules = vec![low, zero, other_trigger];

        let input = CommissionInput {
            order: &order,
            context: &ctx,
            beneficiaries: &beneficiaries,
            rules: &rules,
            campaigns: &[],
            quote_source: None,
        };

        let completed = calculate_commissions(&input, Some(Trigger::OsCompleted));
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].rule_id.get(), 1);
        assert_eq!(completed[0].commission_amount, dec("500"));

        let simulated = calculate_commissions(&input, None);
        assert_eq!(simulated[0].rule_id.get(), 3);
    }

    #[test]
    fn warranty_orders_earn_nothing() {
        let mut order = order("10000");
        order.is_warranty = true;
        let beneficiaries = identify_beneficiaries("OS-000005", Some(uid(10)), &[], None, None);
        let rules = vec![rule(1, CalculationType::PercentGross, "5")];
        let ctx = context();
        let input = CommissionInput {
            order: &order,
            context: &ctx,
            beneficiaries: &beneficiaries,
            rules: &rules,
            campaigns: &[],
            quote_source: None,
        };

        assert!(calculate_commissions(&input, Some(Trigger::OsCompleted)).is_empty());
    }

    #[test]
    fn release_proportion_is_capped() {
        assert_eq!(release_proportion(dec("5000"), dec("10000")), dec("0.5"));
        assert_eq!(release_proportion(dec("3333"), dec("10000")), dec("0.3333"));
        assert_eq!(release_proportion(dec("20000"), dec("10000")), Decimal::ONE);
    }

    #[test]
    fn period_validation() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date");
        assert_eq!(validate_period("2026-03", today), Ok("2026-03".to_string()));
        assert!(validate_period("2026-04", today).is_err());
        assert!(validate_period("2026-13", today).is_err());
        assert!(validate_period("26-03", today).is_err());
    }
}
