//! Startup sequencing: open storage, wait for it to answer, ensure schema.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use incident_core::IncidentStore;
use incident_core::MemoryIncidentStore;
use incident_core::PgIncidentStore;
use incident_core::StoreError;
use thiserror::Error;
use tokio::time::sleep;
use tokio::time::timeout;
use tracing::info;
use tracing::warn;

use crate::config::ServerConfig;

/// Fatal startup conditions. Any of these ends the process.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to configure storage connection: {0}")]
    Connect(#[source] StoreError),
    #[error("storage unreachable after {attempts} attempts: {source}")]
    StoreUnreachable {
        attempts: u32,
        #[source]
        source: StoreError,
    },
    #[error("failed to ensure incident schema: {0}")]
    Schema(#[source] StoreError),
}

/// Lower bound on how long a single ping may take, so a zero interval does
/// not time out every ping before it can complete.
const MIN_PING_TIMEOUT: Duration = Duration::from_secs(1);

/// Fixed-interval, bounded retry for the startup liveness check. Each ping is
/// also cut off after `interval` (at least one second), so the whole wait
/// stays within roughly `2 * attempts * interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_secs(2),
        }
    }
}

/// Call `ping` until it succeeds or `policy.attempts` calls have failed,
/// sleeping `policy.interval` between calls. At least one attempt is made, and
/// a ping still pending after `policy.interval` counts as a failure.
///
/// Returns the number of the attempt that succeeded.
pub async fn wait_until_ready<F, Fut>(policy: RetryPolicy, mut ping: F) -> Result<u32, BootstrapError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), StoreError>>,
{
    let attempts = policy.attempts.max(1);
    let ping_timeout = policy.interval.max(MIN_PING_TIMEOUT);
    let mut attempt = 1;
    loop {
        let outcome = timeout(ping_timeout, ping()).await.unwrap_or_else(|_| {
            Err(StoreError::Unavailable(format!(
                "ping timed out after {}s",
                ping_timeout.as_secs_f64()
            )))
        });
        match outcome {
            Ok(()) => {
                info!(op = "bootstrap.ping", attempt, "storage reachable");
                return Ok(attempt);
            }
            Err(err) if attempt < attempts => {
                warn!(
                    op = "bootstrap.ping",
                    attempt,
                    max_attempts = attempts,
                    "waiting for storage: {err}"
                );
                sleep(policy.interval).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(BootstrapError::StoreUnreachable {
                    attempts,
                    source: err,
                });
            }
        }
    }
}

/// Wait for `store` and create its schema.
pub async fn prepare_store(
    store: &dyn IncidentStore,
    policy: RetryPolicy,
) -> Result<(), BootstrapError> {
    wait_until_ready(policy, || store.ping()).await?;
    store.ensure_schema().await.map_err(BootstrapError::Schema)
}

/// Build the configured store and bring it to a serviceable state.
pub async fn open_store(config: &ServerConfig) -> Result<Arc<dyn IncidentStore>, BootstrapError> {
    let store: Arc<dyn IncidentStore> = if config.memory_store {
        info!(op = "bootstrap.store", "using in-memory incident store");
        Arc::new(MemoryIncidentStore::new())
    } else {
        let store = PgIncidentStore::connect_lazy(&config.database_url, config.max_connections)
            .map_err(BootstrapError::Connect)?;
        Arc::new(store)
    };
    prepare_store(store.as_ref(), config.retry_policy()).await?;
    Ok(store)
}
