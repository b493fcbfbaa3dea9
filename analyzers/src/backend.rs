use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::gemini::GeminiBackend;
use crate::mock::MockBackend;
use crate::prompt::PromptPart;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("No API key configured: set GEMINI_API_KEY or GOOGLE_API_KEY")]
    MissingApiKey,

    #[error("Model endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model endpoint returned an unreadable response: {0}")]
    InvalidResponse(String),
}

/// One rendered prompt, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub prompt_name: String,
    pub parts: Vec<PromptPart>,
    pub output_schema: Value,
}

/// A text/vision completion endpoint.
///
/// `Ok(None)` means the endpoint answered but produced no output.
pub trait ModelBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(
        &self,
        request: &ModelRequest,
    ) -> impl Future<Output = Result<Option<String>, BackendError>> + Send;
}

/// Runtime choice between the hosted model and local mock data.
#[derive(Debug)]
pub enum Backend {
    Gemini(GeminiBackend),
    Mock(MockBackend),
}

impl ModelBackend for Backend {
    fn name(&self) -> &'static str {
        match self {
            Backend::Gemini(backend) => backend.name(),
            Backend::Mock(backend) => backend.name(),
        }
    }

    async fn generate(&self, request: &ModelRequest) -> Result<Option<String>, BackendError> {
        match self {
            Backend::Gemini(backend) => backend.generate(request).await,
            Backend::Mock(backend) => backend.generate(request).await,
        }
    }
}
