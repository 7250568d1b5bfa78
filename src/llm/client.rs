//! Completion service trait and the HTTP adapter.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::error::{CompletionError, classify_error};
use super::types::{CompletionRequest, CompletionResponse};
use crate::credential::ApiCredential;

/// A stateless chat-completion backend.
///
/// Implementations hold no conversation state: the full transcript travels
/// with every request. Identical transcripts may still produce different
/// replies; the remote service is non-deterministic by design.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Exchange a transcript for a completion with at least one choice.
    ///
    /// A successful response never has empty `choices`; implementations
    /// return [`CompletionError::MalformedResponse`] instead. No retries are
    /// performed here. Callers that want backoff can act on
    /// [`CompletionError::RateLimited`].
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError>;
}

/// HTTP client for an OpenAI-compatible completion endpoint.
pub struct HttpCompletionClient {
    client: Client,
    base_url: String,
    credential: ApiCredential,
}

impl HttpCompletionClient {
    pub fn new(base_url: impl Into<String>, credential: ApiCredential) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            credential,
        }
    }
}

#[async_trait]
impl CompletionService for HttpCompletionClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header(
                "Authorization",
                format!("Bearer {}", self.credential.expose()),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, retry_after, body));
        }

        let completion: CompletionResponse = response.json().await?;
        if completion.choices.is_empty() {
            return Err(CompletionError::MalformedResponse);
        }

        debug!(
            id = %completion.id,
            choices = completion.choices.len(),
            "completion received"
        );
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::Json;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Router, response::IntoResponse};
    use serde_json::{Value, json};

    use super::*;
    use crate::credential::{CREDENTIAL_LEN, CREDENTIAL_PREFIX};
    use crate::llm::{GenerationParams, Message};

    fn test_credential() -> ApiCredential {
        let raw = format!(
            "sk-{}",
            "a".repeat(CREDENTIAL_LEN - CREDENTIAL_PREFIX.len())
        );
        ApiCredential::parse(&raw).unwrap()
    }

    fn test_request() -> CompletionRequest {
        CompletionRequest::new(
            "chatgpt-4o-latest",
            vec![
                Message::system("You are Sentinel."),
                Message::user("Hello"),
            ],
            &GenerationParams::default(),
        )
    }

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[derive(Clone, Default)]
    struct Captured {
        body: Arc<Mutex<Option<Value>>>,
        auth: Arc<Mutex<Option<String>>>,
    }

    async fn ok_handler(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        *captured.body.lock().unwrap() = Some(body);
        *captured.auth.lock().unwrap() = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Json(json!({
            "id": "chatcmpl-test",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello from the mock."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        }))
    }

    #[tokio::test]
    async fn sends_transcript_and_returns_completion() {
        let captured = Captured::default();
        let router = Router::new()
            .route("/chat/completions", post(ok_handler))
            .with_state(captured.clone());
        let base_url = spawn_server(router).await;

        let client = HttpCompletionClient::new(base_url, test_credential());
        let completion = client.complete(test_request()).await.unwrap();

        assert_eq!(completion.choices[0].message.content, "Hello from the mock.");
        assert_eq!(completion.usage.unwrap().total_tokens, 17);

        let body = captured.body.lock().unwrap().take().unwrap();
        assert_eq!(body["model"], "chatgpt-4o-latest");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["max_tokens"], 1500);

        let auth = captured.auth.lock().unwrap().take().unwrap();
        assert!(auth.starts_with("Bearer sk-"));
    }

    #[tokio::test]
    async fn unauthorized_surfaces_credential_rejected() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "Incorrect API key provided", "code": "invalid_api_key"}})),
                )
            }),
        );
        let base_url = spawn_server(router).await;

        let client = HttpCompletionClient::new(base_url, test_credential());
        let err = client.complete(test_request()).await.unwrap_err();

        match err {
            CompletionError::CredentialRejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_parses_retry_after_header() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                let mut headers = HeaderMap::new();
                headers.insert("retry-after", "3".parse().unwrap());
                (StatusCode::TOO_MANY_REQUESTS, headers, "slow down").into_response()
            }),
        );
        let base_url = spawn_server(router).await;

        let client = HttpCompletionClient::new(base_url, test_credential());
        let err = client.complete(test_request()).await.unwrap_err();

        match err {
            CompletionError::RateLimited { retry_after } => assert_eq!(retry_after, Some(3)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_surface_malformed_response() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"id": "chatcmpl-empty", "choices": []})) }),
        );
        let base_url = spawn_server(router).await;

        let client = HttpCompletionClient::new(base_url, test_credential());
        let err = client.complete(test_request()).await.unwrap_err();

        assert!(matches!(err, CompletionError::MalformedResponse));
    }

    #[tokio::test]
    async fn unreachable_endpoint_surfaces_network_failure() {
        // Port 1 on localhost refuses connections.
        let client = HttpCompletionClient::new("http://127.0.0.1:1", test_credential());
        let err = client.complete(test_request()).await.unwrap_err();

        assert!(matches!(err, CompletionError::Network(_)));
    }
}
