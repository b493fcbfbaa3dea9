//! Client for the Gemini `generateContent` REST endpoint.

use reqwest::Client as HttpClient;
use serde_json::{Value, json};

use crate::backend::{BackendError, ModelBackend, ModelRequest};
use crate::prompt::PromptPart;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiBackend {
    config: GeminiConfig,
    http: HttpClient,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: HttpClient::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        let base = self.config.api_base.trim().trim_end_matches('/');
        let model = self.config.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{base}/{model_path}:generateContent")
    }

    pub fn build_body(request: &ModelRequest) -> Value {
        let parts: Vec<Value> = request
            .parts
            .iter()
            .map(|part| match part {
                PromptPart::Text(text) => json!({ "text": text }),
                PromptPart::Media { mime_type, data } => json!({
                    "inlineData": {
                        "mimeType": mime_type,
                        "data": data,
                    }
                }),
            })
            .collect();

        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": request.output_schema,
            }
        })
    }

    fn api_key(&self) -> Result<&str, BackendError> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(BackendError::MissingApiKey)
    }
}

/// Concatenated text of the first candidate, `None` when there is none.
pub fn candidate_text(response: &Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() { None } else { Some(text) }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

impl ModelBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, request: &ModelRequest) -> Result<Option<String>, BackendError> {
        let api_key = self.api_key()?;
        let endpoint = self.endpoint();
        tracing::debug!(%endpoint, prompt = %request.prompt_name, "calling model endpoint");

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", api_key)
            .json(&Self::build_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        let text = candidate_text(&payload);
        if text.is_none() {
            let block_reason = payload
                .get("promptFeedback")
                .and_then(|feedback| feedback.get("blockReason"))
                .and_then(Value::as_str);
            tracing::warn!(?block_reason, "model endpoint returned no candidate text");
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use std::sync::{Arc, Mutex};

    fn request() -> ModelRequest {
        ModelRequest {
            prompt_name: "classifyImagePrompt".to_string(),
            parts: vec![
                PromptPart::Text("Analyze:".to_string()),
                PromptPart::Media {
                    mime_type: "image/png".to_string(),
                    data: "iVBORw0KGgo=".to_string(),
                },
            ],
            output_schema: json!({ "type": "OBJECT" }),
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1beta")
    }

    fn backend(api_base: String, api_key: Option<&str>) -> GeminiBackend {
        GeminiBackend::new(GeminiConfig {
            api_base,
            api_key: api_key.map(str::to_string),
            model: "gemini-test".to_string(),
        })
    }

    #[test]
    fn endpoint_normalizes_model_path() {
        let mut b = backend("https://example.test/v1beta/".to_string(), None);
        assert_eq!(
            b.endpoint(),
            "https://example.test/v1beta/models/gemini-test:generateContent"
        );
        b.config.model = "models/gemini-x".to_string();
        assert_eq!(
            b.endpoint(),
            "https://example.test/v1beta/models/gemini-x:generateContent"
        );
    }

    #[test]
    fn body_carries_inline_image_and_schema() {
        let body = GeminiBackend::build_body(&request());
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "Analyze:");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "iVBORw0KGgo=");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn candidate_text_joins_parts() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        });
        assert_eq!(candidate_text(&response).as_deref(), Some("{\"a\":1}"));
        assert_eq!(candidate_text(&json!({ "candidates": [] })), None);
        assert_eq!(candidate_text(&json!({ "promptFeedback": {} })), None);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let err = backend("http://127.0.0.1:1".to_string(), Some("  "))
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::MissingApiKey));
        assert!(err.to_string().to_lowercase().contains("api key"));
    }

    #[tokio::test]
    async fn returns_candidate_text_from_endpoint() {
        let seen_key = Arc::new(Mutex::new(None::<String>));
        let recorder = seen_key.clone();
        let app = Router::new().route(
            "/v1beta/models/gemini-test:generateContent",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    *recorder.lock().unwrap() = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/png");
                    Json(json!({
                        "candidates": [{ "content": { "parts": [{ "text": "{\"classification\":\"Benign\"}" }] } }]
                    }))
                }
            }),
        );
        let base = serve(app).await;

        let text = backend(base, Some("secret")).generate(&request()).await.unwrap();
        assert_eq!(text.as_deref(), Some("{\"classification\":\"Benign\"}"));
        assert_eq!(seen_key.lock().unwrap().as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn surfaces_upstream_error_message() {
        let app = Router::new().route(
            "/v1beta/models/gemini-test:generateContent",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": { "code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT" } })),
                )
            }),
        );
        let base = serve(app).await;

        let err = backend(base, Some("bad")).generate(&request()).await.unwrap_err();
        match err {
            BackendError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid. Please pass a valid API key.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn blocked_prompt_is_no_output() {
        let app = Router::new().route(
            "/v1beta/models/gemini-test:generateContent",
            post(|| async { Json(json!({ "promptFeedback": { "blockReason": "SAFETY" } })) }),
        );
        let base = serve(app).await;

        let text = backend(base, Some("k")).generate(&request()).await.unwrap();
        assert_eq!(text, None);
    }
}
