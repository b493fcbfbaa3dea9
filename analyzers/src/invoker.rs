use parsers::{DataUri, DataUriError};
use thiserror::Error;

use crate::backend::{BackendError, ModelBackend, ModelRequest};
use crate::classification::{ClassificationRequest, ClassificationResult};
use crate::prompt::PromptDefinition;
use crate::sanitize::{FallbackEntropy, extract_json};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Invalid image data: {0}")]
    InvalidImageData(#[from] DataUriError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("The AI failed to provide a classification for the image.")]
    NoClassification,
}

/// Sends one image through a model backend and repairs whatever comes back.
/// No caching and no retries.
#[derive(Debug)]
pub struct ClassificationInvoker<B> {
    backend: B,
    entropy: FallbackEntropy,
}

impl<B: ModelBackend> ClassificationInvoker<B> {
    pub fn new(backend: B) -> Self {
        Self::with_entropy(backend, FallbackEntropy::from_entropy())
    }

    pub fn with_entropy(backend: B, entropy: FallbackEntropy) -> Self {
        Self { backend, entropy }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn classify(
        &self,
        prompt: &PromptDefinition,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResult, ClassifyError> {
        let image = DataUri::parse(&request.image_data)?;
        tracing::info!(
            backend = self.backend.name(),
            mime_type = image.mime_type(),
            payload_len = image.payload().len(),
            "classifying image"
        );

        let model_request = ModelRequest {
            prompt_name: prompt.name.clone(),
            parts: prompt.render(&image),
            output_schema: prompt.output_schema.clone(),
        };

        let output = self.backend.generate(&model_request).await?;
        let raw = output
            .as_deref()
            .and_then(extract_json)
            .ok_or(ClassifyError::NoClassification)?;

        let result = self.entropy.sanitize(raw);
        tracing::info!(
            classification = %result.classification,
            entropy = result.entropy,
            "classification complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Classification;
    use crate::sanitize::{FALLBACK_ENTROPY_RANGE, INVALID_CLASSIFICATION_EXPLANATION};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

    struct Scripted {
        output: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(output: Option<&'static str>) -> Self {
            Self {
                output,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ModelBackend for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn generate(&self, request: &ModelRequest) -> Result<Option<String>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(request.parts.iter().any(|p| matches!(
                p,
                crate::prompt::PromptPart::Media { mime_type, .. } if mime_type == "image/png"
            )));
            Ok(self.output.map(str::to_string))
        }
    }

    struct Failing;

    impl ModelBackend for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn generate(&self, _: &ModelRequest) -> Result<Option<String>, BackendError> {
            Err(BackendError::Api {
                status: 403,
                message: "permission denied".to_string(),
            })
        }
    }

    async fn classify<B: ModelBackend>(backend: B) -> Result<ClassificationResult, ClassifyError> {
        ClassificationInvoker::with_entropy(backend, FallbackEntropy::seeded(9))
            .classify(
                &PromptDefinition::classify_image(),
                &ClassificationRequest::new(IMAGE),
            )
            .await
    }

    #[tokio::test]
    async fn rounds_entropy_of_valid_result() {
        let result = classify(Scripted::new(Some(
            r#"{"classification":"Benign","explanation":"Looks normal","entropy":6.1234}"#,
        )))
        .await
        .unwrap();
        assert_eq!(result.classification, Classification::Benign);
        assert_eq!(result.explanation, "Looks normal");
        assert_eq!(result.entropy, 6.12);
    }

    #[tokio::test]
    async fn coerces_bogus_label() {
        let result = classify(Scripted::new(Some(
            r#"{"classification":"bogus","explanation":"x","entropy":5.0}"#,
        )))
        .await
        .unwrap();
        assert_eq!(result.classification, Classification::Benign);
        assert_eq!(result.explanation, INVALID_CLASSIFICATION_EXPLANATION);
        assert_eq!(result.entropy, 5.0);
    }

    #[tokio::test]
    async fn substitutes_missing_entropy() {
        let result = classify(Scripted::new(Some(
            r#"{"classification":"Suspected Malware Artifacts","explanation":"stripes"}"#,
        )))
        .await
        .unwrap();
        assert_eq!(result.classification, Classification::SuspectedMalwareArtifacts);
        assert!(FALLBACK_ENTROPY_RANGE.contains(&result.entropy));
    }

    #[tokio::test]
    async fn no_output_is_an_error() {
        for output in [None, Some(""), Some("no idea")] {
            let err = classify(Scripted::new(output)).await.unwrap_err();
            assert!(matches!(err, ClassifyError::NoClassification));
        }
    }

    #[tokio::test]
    async fn invalid_data_uri_never_reaches_backend() {
        let backend = Scripted::new(Some("{}"));
        let invoker = ClassificationInvoker::new(backend);
        let err = invoker
            .classify(
                &PromptDefinition::classify_image(),
                &ClassificationRequest::new("not-a-data-uri"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidImageData(_)));
        assert_eq!(invoker.backend().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_errors_propagate_with_message() {
        let err = classify(Failing).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Backend(_)));
        assert_eq!(err.to_string(), "Model endpoint returned 403: permission denied");
    }
}
