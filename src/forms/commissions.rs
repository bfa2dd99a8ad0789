use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::commission::Trigger;
use crate::domain::money;
use crate::domain::types::UserId;
use crate::forms::{FormError, id_error};

/// Optional trigger for manual generation. Without one every trigger is
/// tried in order.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateCommissionsForm {
    pub trigger: Option<String>,
}

pub struct GenerateCommissionsPayload {
    pub trigger: Option<Trigger>,
}

impl TryFrom<GenerateCommissionsForm> for GenerateCommissionsPayload {
    type Error = FormError;

    fn try_from(form: GenerateCommissionsForm) -> Result<Self, Self::Error> {
        let trigger = form
            .trigger
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                raw.parse::<Trigger>()
                    .map_err(|_| FormError::InvalidTrigger(raw.clone()))
            })
            .transpose()?;

        Ok(Self { trigger })
    }
}

#[derive(Debug, Deserialize)]
pub struct CloseSettlementForm {
    pub user_id: i32,
    pub period: String,
}

/// The period is checked against the current month by the service.
pub struct CloseSettlementPayload {
    pub user_id: UserId,
    pub period: String,
}

impl TryFrom<CloseSettlementForm> for CloseSettlementPayload {
    type Error = FormError;

    fn try_from(form: CloseSettlementForm) -> Result<Self, Self::Error> {
        let period = form.period.trim().to_string();
        if period.is_empty() {
            return Err(FormError::Empty("period"));
        }

        Ok(Self {
            user_id: UserId::new(form.user_id).map_err(id_error("user id"))?,
            period,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PaySettlementForm {
    pub paid_amount: Option<Decimal>,
}

pub struct PaySettlementPayload {
    pub paid_amount: Option<Decimal>,
}

impl TryFrom<PaySettlementForm> for PaySettlementPayload {
    type Error = FormError;

    fn try_from(form: PaySettlementForm) -> Result<Self, Self::Error> {
        if form
            .paid_amount
            .is_some_and(|amount| amount < Decimal::ZERO || money::ensure_amount(amount).is_err())
        {
            return Err(FormError::InvalidAmount);
        }
        Ok(Self {
            paid_amount: form.paid_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_trigger_means_any() {
        let payload = GenerateCommissionsPayload::try_from(GenerateCommissionsForm {
            trigger: Some("  ".to_string()),
        })
        .expect("valid form");
        assert_eq!(payload.trigger, None);

        let payload = GenerateCommissionsPayload::try_from(GenerateCommissionsForm {
            trigger: Some("os_invoiced".to_string()),
        })
        .expect("valid form");
        assert_eq!(payload.trigger, Some(Trigger::OsInvoiced));
    }

    #[test]
    fn unknown_trigger_is_rejected() {
        assert!(matches!(
            GenerateCommissionsPayload::try_from(GenerateCommissionsForm {
                trigger: Some("on_delivery".to_string()),
            }),
            Err(FormError::InvalidTrigger(_))
        ));
    }

    #[test]
    fn negative_payment_is_rejected() {
        assert!(matches!(
            PaySettlementPayload::try_from(PaySettlementForm {
                paid_amount: Some(Decimal::from(-1)),
            }),
            Err(FormError::InvalidAmount)
        ));
    }
}
