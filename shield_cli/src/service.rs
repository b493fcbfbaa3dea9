//! Ways to reach the classification action: over HTTP or in-process.

use std::future::Future;
use std::sync::Arc;

use analyzers::{ClassificationRequest, ClassificationResult, ModelBackend};
use reqwest::Client as HttpClient;
use steganoshield_api::{AppState, ErrorBody, classify_image_action};
use thiserror::Error;

/// The only thing a failed classification tells the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ServiceError(pub String);

pub trait ClassifyService: Send + Sync {
    fn classify(
        &self,
        request: ClassificationRequest,
    ) -> impl Future<Output = Result<ClassificationResult, ServiceError>> + Send;
}

/// Talks to a running `steganoshield-api` server.
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    endpoint: String,
    http: HttpClient,
}

impl RemoteClassifier {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/api/classify", base_url.trim().trim_end_matches('/')),
            http: HttpClient::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ClassifyService for RemoteClassifier {
    async fn classify(
        &self,
        request: ClassificationRequest,
    ) -> Result<ClassificationResult, ServiceError> {
        log::debug!("POST {}", self.endpoint);
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError(format!("Could not reach the classification server: {e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError(format!("Could not read the server response: {e}")))?;

        if status.is_success() {
            return serde_json::from_slice(&body)
                .map_err(|e| ServiceError(format!("Server returned an unreadable analysis: {e}")));
        }

        match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(error) => Err(ServiceError(error.error)),
            Err(_) => Err(ServiceError(format!(
                "An unknown error occurred during analysis (server returned {status})."
            ))),
        }
    }
}

/// Runs the classification action inside this process.
#[derive(Debug)]
pub struct LocalClassifier<B> {
    state: Arc<AppState<B>>,
}

impl<B: ModelBackend> LocalClassifier<B> {
    pub fn new(backend: B) -> Self {
        Self {
            state: AppState::new(backend),
        }
    }

    pub fn from_state(state: Arc<AppState<B>>) -> Self {
        Self { state }
    }
}

impl<B: ModelBackend> ClassifyService for LocalClassifier<B> {
    async fn classify(
        &self,
        request: ClassificationRequest,
    ) -> Result<ClassificationResult, ServiceError> {
        classify_image_action(&self.state.invoker, &self.state.prompt, &request)
            .await
            .map_err(|e| ServiceError(e.message().to_string()))
    }
}
