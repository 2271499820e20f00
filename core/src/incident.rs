use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::action::derive_action;

/// A persisted, classified report. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Incident {
    pub id: i64,
    pub message: String,
    pub category: String,
    pub severity: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// Labels returned by the classification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    pub category: String,
    pub severity: String,
}

impl Classification {
    pub fn new(category: impl Into<String>, severity: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            severity: severity.into(),
        }
    }
}

/// Row contents handed to a store; `id` and `created_at` are assigned there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncident {
    pub message: String,
    pub category: String,
    pub severity: String,
    pub action: String,
}

impl NewIncident {
    /// Build the row for `message`, deriving the action from the severity once.
    pub fn classified(message: impl Into<String>, classification: Classification) -> Self {
        let action = derive_action(&classification.severity).to_string();
        Self {
            message: message.into(),
            category: classification.category,
            severity: classification.severity,
            action,
        }
    }

    pub(crate) fn into_incident(self, id: i64, created_at: DateTime<Utc>) -> Incident {
        Incident {
            id,
            message: self.message,
            category: self.category,
            severity: self.severity,
            action: self.action,
            created_at,
        }
    }
}
