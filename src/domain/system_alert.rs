use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::domain::sla::{Escalation, SlaSubject};
use crate::domain::types::{SystemAlertId, TenantId};

#[derive(Debug, Clone, Serialize)]
pub struct SystemAlert {
    pub id: SystemAlertId,
    pub tenant_id: TenantId,
    pub alert_type: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub model_type: Option<String>,
    pub model_id: Option<i32>,
    pub metadata: Option<Value>,
    pub acknowledged_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSystemAlert {
    pub tenant_id: TenantId,
    pub alert_type: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub model_type: Option<String>,
    pub model_id: Option<i32>,
    pub metadata: Option<Value>,
}

impl NewSystemAlert {
    /// Alert recorded when a work order or service call reaches an SLA level.
    pub fn sla_escalation(
        tenant_id: TenantId,
        subject: SlaSubject,
        model_id: i32,
        escalation: &Escalation,
    ) -> Self {
        let level = escalation.level;
        let (title, message) = match subject {
            SlaSubject::WorkOrder => {
                let tail = if escalation.minutes_remaining > 0 {
                    format!("Restam {} minutos.", escalation.minutes_remaining)
                } else {
                    "PRAZO ESTOURADO.".to_string()
                };
                (
                    format!("SLA {level}: OS #{model_id}"),
                    format!(
                        "OS #{model_id} atingiu {}% do SLA. {tail}",
                        escalation.percent_used
                    ),
                )
            }
            SlaSubject::ServiceCall => (
                format!("SLA {level}: Chamado #{model_id}"),
                format!(
                    "Chamado #{model_id} atingiu {}% do SLA.",
                    escalation.percent_used
                ),
            ),
        };

        Self {
            tenant_id,
            alert_type: subject.alert_type(level),
            severity: level.severity().to_string(),
            title,
            message,
            model_type: Some(subject.model_type().to_string()),
            model_id: Some(model_id),
            metadata: serde_json::to_value(escalation).ok(),
        }
    }
}
