//! PostgreSQL adapter. Queries are runtime-checked (`sqlx::query`, not the
//! `query!` macros) so building does not need a live database.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use super::IncidentStore;
use super::StoreError;
use crate::incident::Incident;
use crate::incident::NewIncident;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

// An `incidents` table created by an earlier deployment may use `SERIAL`,
// `TIMESTAMP` and nullable text columns. `IF NOT EXISTS` keeps that table, so
// reads and `RETURNING` cast to the types this adapter decodes.
const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS incidents (
    id BIGSERIAL PRIMARY KEY,
    message TEXT NOT NULL CHECK (message <> ''),
    category VARCHAR(255) NOT NULL,
    severity VARCHAR(50) NOT NULL,
    action TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const INSERT_SQL: &str = r#"
INSERT INTO incidents (message, category, severity, action)
VALUES ($1, $2, $3, $4)
RETURNING id::int8 AS id, created_at::timestamptz AS created_at
"#;

const LIST_SQL: &str = r#"
SELECT
    id::int8 AS id,
    COALESCE(message, '') AS message,
    COALESCE(category, '') AS category,
    COALESCE(severity, '') AS severity,
    COALESCE(action, '') AS action,
    created_at::timestamptz AS created_at
FROM incidents
ORDER BY id DESC
"#;

#[derive(Debug, Clone)]
pub struct PgIncidentStore {
    pool: PgPool,
}

impl PgIncidentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool without opening a connection; reachability is checked
    /// separately through [`IncidentStore::ping`].
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy(database_url)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl IncidentStore for PgIncidentStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        info!(op = "store.ensure_schema", "incidents table ensured");
        Ok(())
    }

    async fn insert(&self, incident: NewIncident) -> Result<Incident, StoreError> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(INSERT_SQL)
            .bind(&incident.message)
            .bind(&incident.category)
            .bind(&incident.severity)
            .bind(&incident.action)
            .fetch_one(&self.pool)
            .await?;
        Ok(incident.into_incident(id, created_at))
    }

    async fn list_all(&self) -> Result<Vec<Incident>, StoreError> {
        let rows = sqlx::query_as::<_, Incident>(LIST_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
