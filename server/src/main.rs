use clap::Parser;
use incident_server::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Values from `.env` must be in place before clap reads the environment.
    let _ = dotenvy::dotenv();
    setup_tracing();
    let config = ServerConfig::parse();
    incident_server::run(config).await
}

fn setup_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
