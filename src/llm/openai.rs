//! OpenAI-compatible chat completions provider.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::provider::LlmProvider;
use crate::error::LlmError;

const PROVIDER: &str = "openai";

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

const TEMPERATURE: f32 = 0.7;

/// Talks to `{base_url}/chat/completions` with bearer auth.
pub struct OpenAiProvider {
    api_key: SecretString,
    model: String,
    chat_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(base_url: &str, api_key: SecretString, model: impl Into<String>) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let chat_url = if base_url.ends_with("/chat/completions") {
            base_url.to_string()
        } else {
            format!("{base_url}/chat/completions")
        };
        Self {
            api_key,
            model: model.into(),
            chat_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let cut: String = body.chars().take(MAX_ERROR_BODY).collect();
    format!("{cut}...")
}

/// Pull the first choice's text out of a response body.
fn extract_reply(body: &str) -> Result<String, LlmError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER.into(),
            reason: format!("malformed JSON: {e}"),
        })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.into(),
            reason: "no choices in response".into(),
        })?;

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content.trim().to_string()),
        _ => Err(LlmError::EmptyResponse {
            provider: PROVIDER.into(),
        }),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| LlmError::RequestFailed {
            provider: PROVIDER.into(),
            reason: format!("failed to read body: {e}"),
        })?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Chat completion request failed");
            return Err(LlmError::HttpStatus {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let reply = extract_reply(&body)?;
        tracing::debug!(model = %self.model, chars = reply.len(), "Chat completion received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base: &str) -> OpenAiProvider {
        OpenAiProvider::new(base, SecretString::from("sk-test"), "gpt-3.5-turbo")
    }

    #[test]
    fn chat_url_appends_endpoint() {
        assert_eq!(
            provider("https://api.openai.com/v1").chat_url(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            provider("https://api.openai.com/v1/").chat_url(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            provider("https://proxy.local/chat/completions").chat_url(),
            "https://proxy.local/chat/completions"
        );
    }

    #[test]
    fn request_serializes_system_then_user() {
        let req = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: [
                Message {
                    role: "system",
                    content: "be nice",
                },
                Message {
                    role: "user",
                    content: "ask for passport",
                },
            ],
            temperature: 0.7,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "ask for passport");
    }

    #[test]
    fn extract_reply_takes_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"  Hi there \n"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "Hi there");
    }

    #[test]
    fn extract_reply_rejects_empty_choices() {
        let err = extract_reply(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }

    #[test]
    fn extract_reply_rejects_null_and_blank_content() {
        let null = extract_reply(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap_err();
        assert!(matches!(null, LlmError::EmptyResponse { .. }));
        let blank = extract_reply(r#"{"choices":[{"message":{"content":"   "}}]}"#).unwrap_err();
        assert!(matches!(blank, LlmError::EmptyResponse { .. }));
    }

    #[test]
    fn extract_reply_rejects_garbage() {
        let err = extract_reply("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY + 100);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.len(), MAX_ERROR_BODY + 3);
    }

    #[tokio::test]
    async fn generate_posts_and_returns_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "instruction"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Please send your passport."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let llm = provider(&format!("{}/v1", server.uri()));
        let reply = llm.generate("persona", "instruction").await.unwrap();
        assert_eq!(reply, "Please send your passport.");
    }

    #[tokio::test]
    async fn generate_maps_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = provider(&server.uri())
            .generate("s", "u")
            .await
            .unwrap_err();
        match err {
            LlmError::HttpStatus { status, body, .. } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_maps_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": ""}}]
            })))
            .mount(&server)
            .await;

        let err = provider(&server.uri()).generate("s", "u").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn generate_reports_connection_failure() {
        // Nothing listens on port 9 of localhost.
        let err = provider("http://127.0.0.1:9")
            .generate("s", "u")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RequestFailed { .. }));
    }
}
