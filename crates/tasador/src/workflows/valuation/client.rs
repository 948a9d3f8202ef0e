use std::future::Future;

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::domain::{PredictionResult, PropertyPayload};
use crate::config::PredictionConfig;

/// Boundary to the remote estimator so the form can be driven by fakes in tests.
pub trait PredictionClient: Send + Sync {
    fn predict(
        &self,
        payload: &PropertyPayload,
    ) -> impl Future<Output = Result<PredictionResult, PredictionError>> + Send;
}

/// Transport-level failure of a single prediction exchange.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("prediction endpoint unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("prediction endpoint answered HTTP {0}")]
    Status(StatusCode),
    #[error("prediction endpoint returned an unexpected body: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

/// Body of the service's health route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

/// Issues one POST per prediction against a fixed endpoint. No retries and no
/// timeout beyond reqwest's defaults.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    endpoint: Url,
    health: Url,
}

impl HttpPredictionClient {
    pub fn new(config: &PredictionConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.endpoint.clone())
    }

    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        // `/prod/predict` -> `/prod/`, where the service mounts its health route.
        let health = endpoint.join("./").unwrap_or_else(|_| endpoint.clone());
        Self {
            http,
            endpoint,
            health,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn health_url(&self) -> &Url {
        &self.health
    }

    pub async fn health(&self) -> Result<ServiceHealth, PredictionError> {
        let response = self
            .http
            .get(self.health.clone())
            .send()
            .await
            .map_err(PredictionError::Transport)?;
        decode(response).await
    }
}

impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, payload: &PropertyPayload) -> Result<PredictionResult, PredictionError> {
        debug!(endpoint = %self.endpoint, "posting prediction request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(PredictionError::Transport)?;
        decode(response).await
    }
}

async fn decode<T>(response: reqwest::Response) -> Result<T, PredictionError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if !status.is_success() {
        return Err(PredictionError::Status(status));
    }

    let body = response
        .bytes()
        .await
        .map_err(PredictionError::Transport)?;
    serde_json::from_slice(&body).map_err(PredictionError::MalformedResponse)
}
