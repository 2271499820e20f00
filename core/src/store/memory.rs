use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::IncidentStore;
use super::StoreError;
use crate::incident::Incident;
use crate::incident::NewIncident;

#[derive(Default)]
struct MemoryInner {
    // Kept in insertion order, which is also ascending id order.
    rows: Vec<Incident>,
    last_id: i64,
}

/// In-process store with the same contract as the Postgres adapter.
#[derive(Default)]
pub struct MemoryIncidentStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryIncidentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl IncidentStore for MemoryIncidentStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, incident: NewIncident) -> Result<Incident, StoreError> {
        if incident.message.is_empty() {
            return Err(StoreError::Constraint(
                "incident message must not be empty".to_string(),
            ));
        }
        let mut inner = self.inner.lock().await;
        inner.last_id += 1;
        let stored = incident.into_incident(inner.last_id, Utc::now());
        inner.rows.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Incident>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.iter().rev().cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
