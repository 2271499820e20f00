use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::bootstrap::RetryPolicy;

pub const DEFAULT_DATABASE_URL: &str =
    "postgres://postgres:postgres@db:5432/incidents?sslmode=disable";
pub const DEFAULT_CLASSIFIER_URL: &str = "http://ai-engine:5000";

/// Runtime configuration. Every flag can also be supplied through the
/// environment (a `.env` file is honoured).
#[derive(Debug, Clone, Parser)]
#[command(name = "incident-server", about = "Classify and store incident reports")]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "INCIDENTS_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = DEFAULT_DATABASE_URL,
        hide_env_values = true
    )]
    pub database_url: String,

    #[arg(long, env = "INCIDENTS_DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Base URL of the classification service; `/predict` is appended.
    #[arg(long, env = "CLASSIFIER_URL", default_value = DEFAULT_CLASSIFIER_URL)]
    pub classifier_url: String,

    #[arg(long, env = "CLASSIFIER_TIMEOUT_SECS", default_value_t = 10)]
    pub classifier_timeout_secs: u64,

    /// How many times to ping the database before giving up at startup.
    #[arg(long, env = "INCIDENTS_DB_CONNECT_ATTEMPTS", default_value_t = 10)]
    pub db_connect_attempts: u32,

    #[arg(long, env = "INCIDENTS_DB_CONNECT_INTERVAL_SECS", default_value_t = 2)]
    pub db_connect_interval_secs: u64,

    /// Keep incidents in process memory instead of PostgreSQL.
    #[arg(long, env = "INCIDENTS_MEMORY_STORE")]
    pub memory_store: bool,
}

impl ServerConfig {
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.db_connect_attempts,
            interval: Duration::from_secs(self.db_connect_interval_secs),
        }
    }
}
