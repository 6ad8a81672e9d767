/// LLM Client — the single point of entry for all chat completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// Everything else sees the narrow `TextGenerator` trait.
///
/// Model: gpt-4 (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// The model used for every generation call.
pub const MODEL: &str = "gpt-4";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Anything that turns a prompt into generated text.
///
/// `LlmClient` is the production implementation; tests substitute stubs.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the non-blank text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Thin wrapper over the Chat Completions endpoint. One request per call, no retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Makes a single call to the Chat Completions API, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &body));
        }

        let body = response.text().await?;
        let chat_response: ChatResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Maps a non-success status and its body to an `LlmError`, preferring the
/// API's own error message when the body carries one.
fn error_for_status(status: StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        _ => LlmError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;

    #[test]
    fn test_request_serializes_system_then_user() {
        let request = ChatRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hello",
                },
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_response_text_from_first_choice() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Dear Acme Corp, ..."}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), Some("Dear Acme Corp, ..."));
    }

    #[test]
    fn test_response_without_choices_has_no_text() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_response_with_null_or_blank_content_has_no_text() {
        let null_content: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert!(null_content.text().is_none());

        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "  \n"}}]}"#).unwrap();
        assert!(blank.text().is_none());
    }

    #[test]
    fn test_malformed_response_fails_to_parse() {
        let result: Result<ChatResponse, _> = serde_json::from_str(r#"{"unexpected": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unauthorized_status_maps_to_auth_error() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "auth"}}"#;
        match error_for_status(StatusCode::UNAUTHORIZED, body) {
            LlmError::Unauthorized { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn test_rate_limit_maps_to_api_error_with_raw_body() {
        match error_for_status(StatusCode::TOO_MANY_REQUESTS, "slow down") {
            LlmError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn test_completions_url_joins_base() {
        let client = LlmClient::new("sk-test".to_string(), "http://localhost:9/v1".to_string())
            .unwrap();
        assert_eq!(
            client.completions_url(),
            "http://localhost:9/v1/chat/completions"
        );
    }

    // HTTP round trips against a local mock server

    const LETTER_BODY: &str = r#"{
        "choices": [{"message": {"role": "assistant", "content": "Dear Acme Corp, ..."}}],
        "usage": {"prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49}
    }"#;

    const BAD_KEY_BODY: &str =
        r#"{"error": {"message": "Incorrect API key", "type": "invalid_request_error"}}"#;

    fn client_for(server: &MockServer, api_key: &str) -> LlmClient {
        LlmClient::new(api_key.to_string(), server.url("/v1")).unwrap()
    }

    #[tokio::test]
    async fn test_generate_sends_bearer_key_and_returns_letter() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-good")
                .body_contains("\"model\":\"gpt-4\"")
                .body_contains("Write about Acme Corp");
            then.status(200)
                .header("content-type", "application/json")
                .body(LETTER_BODY);
        });

        let letter = client_for(&server, "sk-good")
            .generate("Write about Acme Corp", "system")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(letter, "Dear Acme Corp, ...");
    }

    #[tokio::test]
    async fn test_rejected_key_is_unauthorized_end_to_end() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-bad");
            then.status(401)
                .header("content-type", "application/json")
                .body(BAD_KEY_BODY);
        });

        let err = client_for(&server, "sk-bad")
            .generate("prompt", "system")
            .await
            .unwrap_err();

        mock.assert();
        match err {
            LlmError::Unauthorized { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key");
            }
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_api_error_with_single_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(503).body("upstream unavailable");
        });

        let err = client_for(&server, "sk-good")
            .generate("prompt", "system")
            .await
            .unwrap_err();

        // No retries: exactly one request reaches the server.
        mock.assert_hits(1);
        assert!(matches!(err, LlmError::Api { status: 503, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_parse_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .header("content-type", "application/json")
                .body("this is not json");
        });

        let err = client_for(&server, "sk-good")
            .generate("prompt", "system")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Parse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_content() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"choices": []}"#);
        });

        let err = client_for(&server, "sk-good")
            .generate("prompt", "system")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::EmptyContent), "got {err:?}");
    }
}
