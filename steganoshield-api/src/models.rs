use std::sync::Arc;

use analyzers::{ClassificationInvoker, ModelBackend, PromptDefinition};
use serde::{Deserialize, Serialize};

/// Shared by every request; immutable apart from the invoker's fallback RNG.
#[derive(Debug)]
pub struct AppState<B> {
    pub invoker: ClassificationInvoker<B>,
    pub prompt: PromptDefinition,
}

impl<B: ModelBackend> AppState<B> {
    pub fn new(backend: B) -> Arc<Self> {
        Self::with_invoker(ClassificationInvoker::new(backend))
    }

    pub fn with_invoker(invoker: ClassificationInvoker<B>) -> Arc<Self> {
        Arc::new(Self {
            invoker,
            prompt: PromptDefinition::classify_image(),
        })
    }
}

/// Body of every non-2xx response. The message is the whole error surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub description: String,
    pub backend: String,
    pub endpoint: String,
}
