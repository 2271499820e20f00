mod memory;
mod postgres;

pub use memory::MemoryIncidentStore;
pub use postgres::PgIncidentStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::incident::Incident;
use crate::incident::NewIncident;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of incidents.
///
/// Rows are append-only: there is no update or delete. Implementations must
/// hand out strictly increasing ids and list newest first.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Create the incident table if it does not exist. Safe to call repeatedly.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Append one row and return it with its store-assigned `id` and `created_at`.
    async fn insert(&self, incident: NewIncident) -> Result<Incident, StoreError>;

    /// Every stored incident ordered by `id` descending.
    async fn list_all(&self) -> Result<Vec<Incident>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
