use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::classifier::Classifier;
use crate::classifier::ClassifyError;
use crate::incident::Incident;
use crate::incident::NewIncident;
use crate::store::IncidentStore;
use crate::store::StoreError;

/// Ingestion error domain. Each variant is terminal for its request.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Message required")]
    MissingMessage,
    #[error("invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),
    #[error("classification error: {0}")]
    Classification(#[from] ClassifyError),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl IngestError {
    /// Whether the caller, rather than a collaborator, caused the failure.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingMessage | Self::InvalidBody(_))
    }
}

/// Body accepted by `POST /ingest`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl IngestRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Decode a raw request body. Anything that is not a JSON object with an
    /// optional string `message` is a client error.
    pub fn from_json(body: &[u8]) -> Result<Self, IngestError> {
        serde_json::from_slice(body).map_err(IngestError::InvalidBody)
    }

    fn into_message(self) -> Result<String, IngestError> {
        match self.message {
            Some(message) if !message.is_empty() => Ok(message),
            _ => Err(IngestError::MissingMessage),
        }
    }
}

/// Validate → classify → derive action → persist, stopping at the first failure.
#[derive(Clone)]
pub struct IngestPipeline {
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn IncidentStore>,
}

impl IngestPipeline {
    pub fn new(classifier: Arc<dyn Classifier>, store: Arc<dyn IncidentStore>) -> Self {
        Self { classifier, store }
    }

    pub fn store(&self) -> &Arc<dyn IncidentStore> {
        &self.store
    }

    /// Run one report through the pipeline.
    ///
    /// # Returns
    /// The stored [`Incident`], including its store-assigned `id` and `created_at`.
    ///
    /// # Errors
    /// [`IngestError::MissingMessage`] before any side effect when the message
    /// is absent or empty; [`IngestError::Classification`] when the classifier
    /// fails, in which case nothing is stored; [`IngestError::Storage`] when
    /// the insert fails, discarding the classification.
    pub async fn ingest(&self, request: IngestRequest) -> Result<Incident, IngestError> {
        let message = request.into_message()?;

        let classification = self.classifier.classify(&message).await.inspect_err(|err| {
            warn!(op = "ingest.classify", "{err}");
        })?;

        let row = NewIncident::classified(message, classification);
        let incident = self.store.insert(row).await.inspect_err(|err| {
            warn!(op = "ingest.persist", "{err}");
        })?;

        info!(
            op = "ingest",
            id = incident.id,
            category = %incident.category,
            severity = %incident.severity,
            action = %incident.action,
            msg = "incident stored"
        );
        Ok(incident)
    }

    /// Decode `body` as an [`IngestRequest`] and ingest it.
    pub async fn ingest_json(&self, body: &[u8]) -> Result<Incident, IngestError> {
        let request = IngestRequest::from_json(body)?;
        self.ingest(request).await
    }

    /// Every stored incident, newest first.
    pub async fn list(&self) -> Result<Vec<Incident>, StoreError> {
        self.store.list_all().await
    }
}
