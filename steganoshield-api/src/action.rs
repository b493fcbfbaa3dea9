//! The one place where internal failures become end-user text.

use analyzers::{
    ClassificationInvoker, ClassificationRequest, ClassificationResult, ModelBackend,
    PromptDefinition,
};
use thiserror::Error;

pub const INCOMPLETE_ANALYSIS: &str =
    "AI failed to return a complete analysis. Please check server logs for more details.";

const UNDERLYING_ERROR: &str = "An underlying error occurred during image analysis.";

const CREDENTIAL_MARKERS: [&str; 4] = ["api key", "quota", "permission", "authentication"];

/// Which follow-up advice a failure message gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorGuidance {
    Credentials,
    Generic,
}

impl ErrorGuidance {
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if CREDENTIAL_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            ErrorGuidance::Credentials
        } else {
            ErrorGuidance::Generic
        }
    }

    pub fn user_message(self, message: &str) -> String {
        match self {
            ErrorGuidance::Credentials => format!(
                "An API or permissions error occurred: {message}. Please verify your Gemini API key and permissions in the server environment. Also, check server logs."
            ),
            ErrorGuidance::Generic => format!(
                "Analysis failed: {message}. Check server logs for more details (e.g., regarding API keys, model access, or other configurations)."
            ),
        }
    }
}

/// A failed classification as the user sees it: a message and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn wrap(underlying: &str) -> Self {
        let underlying = if underlying.trim().is_empty() {
            UNDERLYING_ERROR
        } else {
            underlying
        };
        Self {
            message: ErrorGuidance::classify(underlying).user_message(underlying),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn is_complete(result: &ClassificationResult) -> bool {
    !result.explanation.is_empty() && result.entropy.is_finite()
}

pub async fn classify_image_action<B: ModelBackend>(
    invoker: &ClassificationInvoker<B>,
    prompt: &PromptDefinition,
    request: &ClassificationRequest,
) -> Result<ClassificationResult, ActionError> {
    let failure = match invoker.classify(prompt, request).await {
        Ok(result) if is_complete(&result) => return Ok(result),
        Ok(result) => {
            tracing::error!(?result, "model returned an incomplete analysis");
            INCOMPLETE_ANALYSIS.to_string()
        }
        Err(err) => {
            tracing::error!(error = ?err, "image classification failed");
            err.to_string()
        }
    };

    Err(ActionError::wrap(&failure))
}
