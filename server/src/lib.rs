pub mod bootstrap;
pub mod config;
mod error;
mod handlers;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use axum::routing::post;
use incident_core::Classifier;
use incident_core::HttpClassifier;
use incident_core::IncidentStore;
use incident_core::IngestPipeline;
use tokio::net::TcpListener;
use tracing::info;
use tracing::warn;

pub use bootstrap::BootstrapError;
pub use bootstrap::RetryPolicy;
pub use config::ServerConfig;
pub use error::ApiError;

/// Shared handler state. Cloned per request; holds only `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pipeline: IngestPipeline,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>, store: Arc<dyn IncidentStore>) -> Self {
        Self {
            pipeline: IngestPipeline::new(classifier, store),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(handlers::ingest))
        .route("/incidents", get(handlers::list_incidents))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}

/// Serve `state` on `listener` until `shutdown` resolves, then drain
/// in-flight requests.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Bootstrap storage, build the classifier, bind and serve until a
/// termination signal arrives.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    info!(
        listen = %config.listen,
        classifier = %config.classifier_url,
        memory_store = config.memory_store,
        "incident server starting"
    );

    let store = bootstrap::open_store(&config).await?;
    let classifier = HttpClassifier::new(&config.classifier_url, config.classifier_timeout())
        .context("failed to build classification client")?;
    let state = AppState::new(Arc::new(classifier), store);

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    info!("incident server listening on {}", config.listen);

    serve(listener, state, shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;
    info!("incident server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
