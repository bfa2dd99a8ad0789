//! Bank statement entries, reconciliation rules, and match scoring.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    BankAccountId, BankStatementId, ReconciliationRuleId, StatementEntryId, TenantId, UserId,
    text_enum,
};

/// Amount tolerance of an automatic match.
pub const AUTO_MATCH_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
/// Days around the entry date a due date may fall for an automatic match.
pub const AUTO_MATCH_DAYS: i64 = 5;
/// Amount tolerance when flagging possible duplicates.
pub const DUPLICATE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
pub const DEFAULT_SUGGESTIONS: usize = 5;
pub const LEARNED_RULE_PRIORITY: i32 = 50;

pub const RECONCILED_BY_RULE: &str = "rule";
pub const RECONCILED_BY_MANUAL: &str = "manual";
pub const RECONCILED_BY_AUTO: &str = "auto";

text_enum!(StatementFormat, "statement format", {
    Ofx => "ofx",
    Cnab240 => "cnab240",
    Cnab400 => "cnab400",
});

text_enum!(EntryType, "entry type", {
    Credit => "credit",
    Debit => "debit",
});

text_enum!(EntryStatus, "entry status", {
    Pending => "pending",
    Matched => "matched",
    Ignored => "ignored",
});

text_enum!(MatchTarget, "match target", {
    Receivable => "receivable",
    Payable => "payable",
});

text_enum!(MatchField, "rule match field", {
    Description => "description",
    Amount => "amount",
});

text_enum!(MatchOperator, "rule match operator", {
    Contains => "contains",
    Equals => "equals",
    StartsWith => "starts_with",
    EndsWith => "ends_with",
    GreaterThan => "greater_than",
    LessThan => "less_than",
    Between => "between",
});

text_enum!(RuleAction, "rule action", {
    Ignore => "ignore",
    Categorize => "categorize",
    MatchReceivable => "match_receivable",
    MatchPayable => "match_payable",
});

impl MatchTarget {
    /// Accepts the aliases clients send for a match target.
    pub fn normalize(value: &str) -> Option<MatchTarget> {
        match value.trim().to_lowercase().as_str() {
            "receivable" | "account_receivable" | "accountreceivable" => {
                Some(MatchTarget::Receivable)
            }
            "payable" | "account_payable" | "accountpayable" => Some(MatchTarget::Payable),
            _ => None,
        }
    }

    /// Titles of this kind are settled by entries of the returned type.
    pub fn for_entry(entry_type: EntryType) -> MatchTarget {
        match entry_type {
            EntryType::Credit => MatchTarget::Receivable,
            EntryType::Debit => MatchTarget::Payable,
        }
    }
}

impl EntryType {
    pub fn of_amount(amount: Decimal) -> EntryType {
        if amount >= Decimal::ZERO {
            EntryType::Credit
        } else {
            EntryType::Debit
        }
    }
}

/// Transaction read from a statement file; `amount` is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedEntry {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BankStatement {
    pub id: BankStatementId,
    pub tenant_id: TenantId,
    pub bank_account_id: Option<BankAccountId>,
    pub filename: String,
    pub format: StatementFormat,
    pub imported_at: NaiveDateTime,
    pub created_by: Option<UserId>,
    pub total_entries: i32,
    pub matched_entries: i32,
}

#[derive(Debug, Clone)]
pub struct NewBankStatement {
    pub tenant_id: TenantId,
    pub bank_account_id: Option<BankAccountId>,
    pub filename: String,
    pub format: StatementFormat,
    pub created_by: Option<UserId>,
    pub entries: Vec<ImportedEntry>,
}

/// Parsed transaction with the reconciliation decided before it is stored.
#[derive(Debug, Clone)]
pub struct ImportedEntry {
    pub parsed: ParsedEntry,
    pub resolution: Option<EntryUpdate>,
}

impl ImportedEntry {
    pub fn pending(parsed: ParsedEntry) -> Self {
        Self {
            parsed,
            resolution: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementEntry {
    pub id: StatementEntryId,
    pub bank_statement_id: BankStatementId,
    pub tenant_id: TenantId,
    pub entry_date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub matched_type: Option<MatchTarget>,
    pub matched_id: Option<i32>,
    pub possible_duplicate: bool,
    pub category: Option<String>,
    pub rule_id: Option<ReconciliationRuleId>,
    pub reconciled_by: Option<String>,
    pub reconciled_at: Option<NaiveDateTime>,
}

/// Changes written to an entry by a rule, a manual action, or auto-match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryUpdate {
    pub status: Option<EntryStatus>,
    /// `Some(None)` clears the match.
    pub matched: Option<Option<(MatchTarget, i32)>>,
    pub category: Option<Option<String>>,
    pub rule_id: Option<ReconciliationRuleId>,
    pub reconciled_by: Option<String>,
    pub reconciled_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationRule {
    pub id: ReconciliationRuleId,
    pub tenant_id: TenantId,
    pub name: String,
    pub match_field: MatchField,
    pub match_operator: MatchOperator,
    pub match_value: Option<String>,
    pub match_amount_min: Option<Decimal>,
    pub match_amount_max: Option<Decimal>,
    pub action: RuleAction,
    pub target_type: Option<MatchTarget>,
    pub target_id: Option<i32>,
    pub category: Option<String>,
    pub priority: i32,
    pub is_active: bool,
    pub times_applied: i32,
}

impl ReconciliationRule {
    /// Whether the rule applies to an entry.
    ///
    /// Description operators compare case-insensitively. Amount operators
    /// use the entry's absolute amount: `equals` and `greater_than` compare
    /// with the minimum, `less_than` with the maximum, and `between` is
    /// inclusive on both ends.
    pub fn matches(&self, description: &str, amount: Decimal) -> bool {
        match self.match_field {
            MatchField::Description => {
                let Some(needle) = self.match_value.as_deref().map(str::to_lowercase) else {
                    return false;
                };
                if needle.is_empty() {
                    return false;
                }
                let haystack = description.to_lowercase();
                match self.match_operator {
                    MatchOperator::Contains => haystack.contains(&needle),
                    MatchOperator::Equals => haystack.trim() == needle.trim(),
                    MatchOperator::StartsWith => haystack.starts_with(&needle),
                    MatchOperator::EndsWith => haystack.ends_with(&needle),
                    _ => false,
                }
            }
            MatchField::Amount => {
                let amount = amount.abs();
                match (self.match_operator, self.match_amount_min, self.match_amount_max) {
                    (MatchOperator::Equals, Some(min), _) => amount == min,
                    (MatchOperator::GreaterThan, Some(min), _) => amount > min,
                    (MatchOperator::LessThan, _, Some(max)) => amount < max,
                    (MatchOperator::Between, Some(min), Some(max)) => {
                        min <= amount && amount <= max
                    }
                    _ => false,
                }
            }
        }
    }

    /// Entry changes produced when this rule fires.
    pub fn outcome(&self, now: NaiveDateTime) -> EntryUpdate {
        let mut update = EntryUpdate {
            rule_id: Some(self.id),
            category: Some(self.category.clone()),
            reconciled_by: Some(RECONCILED_BY_RULE.to_string()),
            reconciled_at: Some(now),
            ..Default::default()
        };
        match (self.action, self.target_id) {
            (RuleAction::Ignore, _) => update.status = Some(EntryStatus::Ignored),
            (RuleAction::Categorize, _) => {}
            (RuleAction::MatchReceivable, Some(id)) => {
                update.status = Some(EntryStatus::Matched);
                update.matched = Some(Some((MatchTarget::Receivable, id)));
            }
            (RuleAction::MatchPayable, Some(id)) => {
                update.status = Some(EntryStatus::Matched);
                update.matched = Some(Some((MatchTarget::Payable, id)));
            }
            _ => {}
        }
        update
    }
}

/// Rule proposal derived from a matched entry; the user decides whether to
/// save it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReconciliationRule {
    pub tenant_id: TenantId,
    pub name: String,
    pub match_field: MatchField,
    pub match_operator: MatchOperator,
    pub match_value: Option<String>,
    pub match_amount_min: Option<Decimal>,
    pub match_amount_max: Option<Decimal>,
    pub action: RuleAction,
    pub target_type: Option<MatchTarget>,
    pub target_id: Option<i32>,
    pub category: Option<String>,
    pub priority: i32,
}

/// Proposes a `contains` rule from the first three words longer than three
/// characters of a matched entry's description.
pub fn learn_rule(entry: &StatementEntry) -> Option<NewReconciliationRule> {
    if entry.status != EntryStatus::Matched {
        return None;
    }
    let target = entry.matched_type?;

    let separators = Regex::new(r"[\s/\-*]+").ok()?;
    let keywords: Vec<&str> = separators
        .split(&entry.description)
        .filter(|word| word.chars().count() > 3)
        .take(3)
        .collect();
    let pattern = if keywords.is_empty() {
        entry.description.clone()
    } else {
        keywords.join(" ")
    };

    let action = match target {
        MatchTarget::Receivable => RuleAction::MatchReceivable,
        MatchTarget::Payable => RuleAction::MatchPayable,
    };

    Some(NewReconciliationRule {
        tenant_id: entry.tenant_id,
        name: format!(
            "Auto: {}",
            entry.description.chars().take(60).collect::<String>()
        ),
        match_field: MatchField::Description,
        match_operator: MatchOperator::Contains,
        match_value: Some(pattern.to_lowercase()),
        match_amount_min: None,
        match_amount_max: None,
        action,
        target_type: Some(target),
        target_id: entry.matched_id,
        category: None,
        priority: LEARNED_RULE_PRIORITY,
    })
}

/// Open receivable or payable considered for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub target: MatchTarget,
    pub id: i32,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub customer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub score: f64,
}

/// Earliest-due candidate within the automatic match window of the entry.
pub fn auto_match<'a>(
    entry_date: NaiveDate,
    amount: Decimal,
    candidates: &'a [Candidate],
) -> Option<&'a Candidate> {
    candidates
        .iter()
        .filter(|c| (c.amount - amount).abs() <= AUTO_MATCH_TOLERANCE)
        .filter(|c| (c.due_date - entry_date).num_days().abs() <= AUTO_MATCH_DAYS)
        .min_by_key(|c| (c.due_date, c.id))
}

/// Similarity score out of 100: value closeness (50), due-date proximity
/// (30), and description similarity (20).
pub fn score(entry: &StatementEntry, candidate: &Candidate) -> f64 {
    let entry_amount = entry.amount.to_f64().unwrap_or_default();
    let candidate_amount = candidate.amount.to_f64().unwrap_or_default();

    let value_diff = (entry_amount - candidate_amount).abs();
    let value_score = (50.0 - value_diff / entry_amount.max(0.01) * 100.0).max(0.0);

    let days = (entry.entry_date - candidate.due_date).num_days().abs() as f64;
    let date_score = (30.0 - days * 3.0).max(0.0);

    let a = entry.description.trim().to_lowercase();
    let b = candidate.description.trim().to_lowercase();
    let description_score = if a.is_empty() || b.is_empty() {
        0.0
    } else {
        similar_text_percent(&a, &b) / 100.0 * 20.0
    };

    ((value_score + date_score + description_score) * 100.0).round() / 100.0
}

/// Scores candidates and keeps the best `limit`, highest first.
pub fn rank_suggestions(
    entry: &StatementEntry,
    candidates: Vec<Candidate>,
    limit: usize,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .into_iter()
        .map(|candidate| Suggestion {
            score: score(entry, &candidate),
            candidate,
        })
        .collect();
    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
    suggestions.truncate(limit);
    suggestions
}

fn similar_chars(a: &[u8], b: &[u8]) -> usize {
    let mut best = 0;
    let mut pos_a = 0;
    let mut pos_b = 0;
    for i in 0..a.len() {
        for j in 0..b.len() {
            let mut k = 0;
            while i + k < a.len() && j + k < b.len() && a[i + k] == b[j + k] {
                k += 1;
            }
            if k > best {
                best = k;
                pos_a = i;
                pos_b = j;
            }
        }
    }
    if best == 0 {
        return 0;
    }
    best + similar_chars(&a[..pos_a], &b[..pos_b])
        + similar_chars(&a[pos_a + best..], &b[pos_b + best..])
}

/// Byte-wise similarity percentage: twice the common characters over the
/// combined length.
pub fn similar_text_percent(a: &str, b: &str) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    let common = similar_chars(a.as_bytes(), b.as_bytes());
    common as f64 * 2.0 * 100.0 / total as f64
}

/// Reconciliation progress of a tenant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationSummary {
    pub total_entries: i64,
    pub pending_count: i64,
    pub matched_count: i64,
    pub ignored_count: i64,
    pub matched_percent: f64,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub duplicate_count: i64,
}

impl ReconciliationSummary {
    pub fn with_percent(mut self) -> Self {
        self.matched_percent = if self.total_entries > 0 {
            (self.matched_count as f64 / self.total_entries as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };
        self
    }
}

/// What an import did.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub statement: BankStatement,
    pub duplicates: usize,
    pub auto_matched: usize,
    pub rules_applied: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, day).expect("valid date")
    }

    fn dec(value: &str) -> Decimal {
        value.parse().expect("valid decimal")
    }

    fn entry(description: &str, amount: &str) -> StatementEntry {
        StatementEntry {
            id: StatementEntryId::new(1).expect("valid id"),
            bank_statement_id: BankStatementId::new(1).expect("valid id"),
            tenant_id: TenantId::new(1).expect("valid id"),
            entry_date: date(10),
            description: description.to_string(),
            amount: dec(amount),
            entry_type: EntryType::Credit,
            status: EntryStatus::Pending,
            matched_type: None,
            matched_id: None,
            possible_duplicate: false,
            category: None,
            rule_id: None,
            reconciled_by: None,
            reconciled_at: None,
        }
    }

    fn candidate(id: i32, amount: &str, due_day: u32, description: &str) -> Candidate {
        Candidate {
            target: MatchTarget::Receivable,
            id,
            description: description.to_string(),
            amount: dec(amount),
            due_date: date(due_day),
            customer: None,
        }
    }

    fn rule(field: MatchField, operator: MatchOperator) -> ReconciliationRule {
        ReconciliationRule {
            id: ReconciliationRuleId::new(3).expect("valid id"),
            tenant_id: TenantId::new(1).expect("valid id"),
            name: "Tarifas".to_string(),
            match_field: field,
            match_operator: operator,
            match_value: None,
            match_amount_min: None,
            match_amount_max: None,
            action: RuleAction::Ignore,
            target_type: None,
            target_id: None,
            category: Some("tarifas".to_string()),
            priority: 1,
            is_active: true,
            times_applied: 0,
        }
    }

    #[test]
    fn similar_text_percent_of_common_characters() {
        assert_eq!(similar_text_percent("world", "word"), 8.0 * 100.0 / 9.0);
        assert_eq!(similar_text_percent("abc", "abc"), 100.0);
        assert_eq!(similar_text_percent("abc", "xyz"), 0.0);
    }

    #[test]
    fn auto_match_picks_earliest_due_within_window() {
        let candidates = vec![
            candidate(1, "100.04", 14, "a"),
            candidate(2, "100.00", 6, "b"),
            candidate(3, "100.00", 3, "c"),
            candidate(4, "100.10", 10, "d"),
        ];

        let matched = auto_match(date(10), dec("100.00"), &candidates).expect("match");

        assert_eq!(matched.id, 2);
        assert!(auto_match(date(25), dec("100.00"), &candidates).is_none());
    }

    #[test]
    fn suggestions_rank_by_score() {
        let entry = entry("PIX Cliente Alfa", "1000.00");
        let candidates = vec![
            candidate(1, "1100.00", 20, "Outro"),
            candidate(2, "1000.00", 10, "pix cliente alfa"),
        ];

        let ranked = rank_suggestions(&entry, candidates, 5);

        assert_eq!(ranked[0].candidate.id, 2);
        assert_eq!(ranked[0].score, 100.0);
        // value 40, date 0, description partial
        assert!(ranked[1].score >= 40.0 && ranked[1].score < 60.0);
        assert_eq!(rank_suggestions(&entry, Vec::new(), 5).len(), 0);
    }

    #[test]
    fn description_rules_are_case_insensitive() {
        let mut contains = rule(MatchField::Description, MatchOperator::Contains);
        contains.match_value = Some("TARIFA".to_string());
        assert!(contains.matches("Tarifa bancária", dec("12.90")));

        let mut starts = rule(MatchField::Description, MatchOperator::StartsWith);
        starts.match_value = Some("pix".to_string());
        assert!(starts.matches("PIX recebido", dec("1")));
        assert!(!starts.matches("TED PIX", dec("1")));

        let empty = rule(MatchField::Description, MatchOperator::Contains);
        assert!(!empty.matches("anything", dec("1")));
    }

    #[test]
    fn amount_rules_use_absolute_value() {
        let mut between = rule(MatchField::Amount, MatchOperator::Between);
        between.match_amount_min = Some(dec("10"));
        between.match_amount_max = Some(dec("20"));
        assert!(between.matches("x", dec("-15")));
        assert!(between.matches("x", dec("20")));
        assert!(!between.matches("x", dec("20.01")));

        let mut greater = rule(MatchField::Amount, MatchOperator::GreaterThan);
        greater.match_amount_min = Some(dec("100"));
        assert!(greater.matches("x", dec("100.01")));
        assert!(!greater.matches("x", dec("100")));
    }

    #[test]
    fn rule_outcome_depends_on_action() {
        let now = date(10).and_hms_opt(12, 0, 0).expect("valid time");

        let ignore = rule(MatchField::Description, MatchOperator::Contains).outcome(now);
        assert_eq!(ignore.status, Some(EntryStatus::Ignored));
        assert_eq!(ignore.category, Some(Some("tarifas".to_string())));
        assert_eq!(ignore.reconciled_by.as_deref(), Some(RECONCILED_BY_RULE));

        let mut categorize = rule(MatchField::Description, MatchOperator::Contains);
        categorize.action = RuleAction::Categorize;
        assert_eq!(categorize.outcome(now).status, None);

        let mut receivable = rule(MatchField::Description, MatchOperator::Contains);
        receivable.action = RuleAction::MatchReceivable;
        assert_eq!(receivable.outcome(now).status, None);
        receivable.target_id = Some(8);
        let update = receivable.outcome(now);
        assert_eq!(update.status, Some(EntryStatus::Matched));
        assert_eq!(update.matched, Some(Some((MatchTarget::Receivable, 8))));
    }

    #[test]
    fn learns_rule_from_keywords() {
        let mut matched = entry("PIX REC/CLIENTE-ALFA LTDA*123", "10");
        matched.status = EntryStatus::Matched;
        matched.matched_type = Some(MatchTarget::Payable);
        matched.matched_id = Some(4);

        let proposal = learn_rule(&matched).expect("rule proposal");

        assert_eq!(proposal.match_value.as_deref(), Some("cliente alfa ltda"));
        assert_eq!(proposal.action, RuleAction::MatchPayable);
        assert_eq!(proposal.target_id, Some(4));
        assert_eq!(proposal.priority, LEARNED_RULE_PRIORITY);
        assert_eq!(proposal.name, "Auto: PIX REC/CLIENTE-ALFA LTDA*123");

        let pending = entry("PIX", "10");
        assert!(learn_rule(&pending).is_none());
    }

    #[test]
    fn target_aliases_normalize() {
        assert_eq!(
            MatchTarget::normalize("Account_Receivable"),
            Some(MatchTarget::Receivable)
        );
        assert_eq!(MatchTarget::normalize("payable"), Some(MatchTarget::Payable));
        assert_eq!(MatchTarget::normalize("invoice"), None);
    }

    #[test]
    fn summary_percent_has_one_decimal() {
        let summary = ReconciliationSummary {
            total_entries: 3,
            matched_count: 1,
            ..Default::default()
        }
        .with_percent();
        assert_eq!(summary.matched_percent, 33.3);
        assert_eq!(ReconciliationSummary::default().with_percent().matched_percent, 0.0);
    }
}
