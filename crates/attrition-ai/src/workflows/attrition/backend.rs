use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::NarrativeConfig;

/// One chat-completion call: a system instruction plus a single user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub system: String,
    pub user: String,
}

/// Failures while calling or interpreting the completion provider. None of
/// these reach the HTTP caller; the narrative service absorbs them.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("completion backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("malformed completion response: {0}")]
    MalformedBackendResponse(String),
    #[error("completion payload missing `{0}`")]
    IncompleteBackendPayload(&'static str),
}

impl NarrativeError {
    pub fn kind(&self) -> &'static str {
        match self {
            NarrativeError::BackendUnavailable(_) => "backend_unavailable",
            NarrativeError::MalformedBackendResponse(_) => "malformed_backend_response",
            NarrativeError::IncompleteBackendPayload(_) => "incomplete_backend_payload",
        }
    }
}

impl From<reqwest::Error> for NarrativeError {
    fn from(value: reqwest::Error) -> Self {
        NarrativeError::BackendUnavailable(value.to_string())
    }
}

/// Text-completion provider seam so the service can be exercised in isolation.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the raw content of the first completion choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, NarrativeError>;
}

/// Backend used when no API key is configured; every call fails fast.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredBackend;

#[async_trait]
impl CompletionBackend for UnconfiguredBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, NarrativeError> {
        Err(NarrativeError::BackendUnavailable(
            "no completion API key configured".to_string(),
        ))
    }
}

/// OpenAI-compatible `/chat/completions` client (Groq by default).
#[derive(Clone)]
pub struct ChatCompletionsBackend {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionsBackend {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, NarrativeError> {
        let mut builder = reqwest::Client::builder().user_agent("attrition-ai/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, NarrativeError> {
        let body = ChatCompletionBody {
            model: &request.model,
            temperature: request.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NarrativeError::BackendUnavailable(format!(
                "provider returned {status}: {detail}"
            )));
        }

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| NarrativeError::MalformedBackendResponse(err.to_string()))?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                NarrativeError::MalformedBackendResponse("empty completion content".to_string())
            })
    }
}

/// Pick the live client when a key is configured, otherwise the fail-fast stub.
pub fn backend_from_config(
    config: &NarrativeConfig,
) -> Result<Arc<dyn CompletionBackend>, NarrativeError> {
    match config.api_key.as_deref() {
        Some(key) => Ok(Arc::new(ChatCompletionsBackend::new(
            &config.base_url,
            key,
            config.timeout,
        )?)),
        None => Ok(Arc::new(UnconfiguredBackend)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn spawn_provider(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}/v1")
    }

    fn completion_request() -> CompletionRequest {
        CompletionRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.85,
            system: "system voice".to_string(),
            user: "user prompt".to_string(),
        }
    }

    #[tokio::test]
    async fn sends_json_mode_chat_request_and_returns_first_choice() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer test-key")
                );
                assert_eq!(body["model"], "llama-3.3-70b-versatile");
                assert_eq!(body["response_format"]["type"], "json_object");
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][1]["content"], "user prompt");
                Json(json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "{\"analysis\":\"a\"}" } }
                    ]
                }))
            }),
        );
        let base_url = spawn_provider(router).await;
        let backend = ChatCompletionsBackend::new(&base_url, "test-key", None).expect("client");

        let content = backend
            .complete(&completion_request())
            .await
            .expect("completion succeeds");
        assert_eq!(content, "{\"analysis\":\"a\"}");
    }

    #[tokio::test]
    async fn non_success_status_is_backend_unavailable() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base_url = spawn_provider(router).await;
        let backend = ChatCompletionsBackend::new(&base_url, "k", None).expect("client");

        let err = backend.complete(&completion_request()).await.unwrap_err();
        assert!(matches!(err, NarrativeError::BackendUnavailable(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn empty_choices_are_malformed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base_url = spawn_provider(router).await;
        let backend = ChatCompletionsBackend::new(&base_url, "k", None).expect("client");

        let err = backend.complete(&completion_request()).await.unwrap_err();
        assert_eq!(err.kind(), "malformed_backend_response");
    }

    #[tokio::test]
    async fn unreachable_provider_is_backend_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let backend = ChatCompletionsBackend::new(
            &format!("http://{addr}/v1/"),
            "k",
            Some(Duration::from_secs(2)),
        )
        .expect("client");
        assert_eq!(backend.endpoint(), format!("http://{addr}/v1/chat/completions"));

        let err = backend.complete(&completion_request()).await.unwrap_err();
        assert_eq!(err.kind(), "backend_unavailable");
    }

    #[tokio::test]
    async fn provider_slower_than_timeout_is_backend_unavailable() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "choices": [] }))
            }),
        );
        let base_url = spawn_provider(router).await;
        let backend =
            ChatCompletionsBackend::new(&base_url, "k", Some(Duration::from_millis(200)))
                .expect("client");

        let err = backend.complete(&completion_request()).await.unwrap_err();
        assert_eq!(err.kind(), "backend_unavailable");
    }

    #[tokio::test]
    async fn unconfigured_backend_always_fails() {
        let err = UnconfiguredBackend
            .complete(&completion_request())
            .await
            .unwrap_err();
        assert!(matches!(err, NarrativeError::BackendUnavailable(_)));
    }
}
