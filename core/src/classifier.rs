use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::incident::Classification;

const PREDICT_PATH: &str = "predict";

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classification request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classification endpoint returned status {status}")]
    Status { status: u16 },
    #[error("malformed classification response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed classification response: expected a JSON object")]
    NotAnObject,
}

/// Maps report text to a category/severity pair.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, message: &str) -> Result<Classification, ClassifyError>;
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

/// Absent or `null` labels decode to the empty string.
#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    severity: Option<String>,
}

/// Classifier backed by the `POST {base}/predict` endpoint.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    predict_url: String,
}

impl HttpClassifier {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClassifyError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            predict_url: predict_url(base_url),
        }
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, message: &str) -> Result<Classification, ClassifyError> {
        let response = self
            .client
            .post(&self.predict_url)
            .json(&PredictRequest { text: message })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                op = "classify",
                status = status.as_u16(),
                "classification endpoint rejected request"
            );
            return Err(ClassifyError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        let classification = parse_prediction(&body).inspect_err(|err| {
            warn!(op = "classify", "{err}");
        })?;
        debug!(
            op = "classify",
            category = %classification.category,
            severity = %classification.severity,
            "report classified"
        );
        Ok(classification)
    }
}

fn predict_url(base_url: &str) -> String {
    format!("{}/{PREDICT_PATH}", base_url.trim_end_matches('/'))
}

fn parse_prediction(body: &[u8]) -> Result<Classification, ClassifyError> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(ClassifyError::NotAnObject);
    }
    let prediction: PredictResponse = serde_json::from_value(value)?;
    Ok(Classification {
        category: prediction.category.unwrap_or_default(),
        severity: prediction.severity.unwrap_or_default(),
    })
}
