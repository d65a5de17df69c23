//! HTTP adapter speaking the chat-completions shape shared by the AI
//! providers CiteWatch monitors.
//!
//! One [`HttpChatClient`] is constructed per configured platform and
//! injected into the orchestrator; the concrete provider only varies by
//! base URL, API key, and model name.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use citewatch_core::{PlatformId, PlatformQueryResult, QueryErrorKind};

use crate::client::PlatformClient;
use crate::retry::{retry_with_backoff, HttpError};

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant providing informative recommendations and comparisons.";

/// Settings for one platform's HTTP adapter.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

/// Chat-completions client for one platform.
pub struct HttpChatClient {
    platform: PlatformId,
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl HttpChatClient {
    /// Create a client for `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(platform: PlatformId, config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent("citewatch/0.1 (brand-monitoring)")
            .build()?;

        Ok(Self {
            platform,
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key,
            model: config.model,
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        })
    }

    async fn send_query(&self, query_text: &str, timeout: Duration) -> Result<String, HttpError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: query_text,
                },
            ],
            temperature: 0.7,
            max_tokens: 1000,
        };

        let mut request = self.client.post(&url).timeout(timeout).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(HttpError::RateLimited);
        }
        if !status.is_success() {
            return Err(HttpError::Status(status));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| HttpError::Malformed(e.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| HttpError::Malformed("response has no choices".to_owned()))
    }

    fn categorize(error: &HttpError) -> QueryErrorKind {
        match error {
            HttpError::RateLimited => QueryErrorKind::RateLimited,
            HttpError::Malformed(_) => QueryErrorKind::Malformed,
            HttpError::Http(e) if e.is_timeout() => QueryErrorKind::Timeout,
            HttpError::Http(_) | HttpError::Status(_) => QueryErrorKind::Provider,
        }
    }
}

#[async_trait::async_trait]
impl PlatformClient for HttpChatClient {
    fn platform(&self) -> PlatformId {
        self.platform
    }

    async fn query(&self, query_text: &str, timeout: Duration) -> PlatformQueryResult {
        let issued_at = Utc::now();
        let started = Instant::now();

        // Bound the whole retried exchange by the caller's timeout; each
        // attempt also carries it as its request timeout.
        let attempt = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_query(query_text, timeout)
        });
        let outcome = tokio::time::timeout(timeout, attempt).await;

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(Ok(text)) => {
                tracing::debug!(
                    platform = %self.platform,
                    latency_ms,
                    "platform query succeeded"
                );
                PlatformQueryResult::success(self.platform, query_text, text, issued_at, latency_ms)
            }
            Ok(Err(error)) => {
                tracing::warn!(
                    platform = %self.platform,
                    latency_ms,
                    error = %error,
                    "platform query failed"
                );
                PlatformQueryResult::failure(
                    self.platform,
                    query_text,
                    issued_at,
                    latency_ms,
                    Self::categorize(&error),
                    error.to_string(),
                )
            }
            Err(_elapsed) => PlatformQueryResult::failure(
                self.platform,
                query_text,
                issued_at,
                latency_ms,
                QueryErrorKind::Timeout,
                format!("query did not complete within {}s", timeout.as_secs()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> HttpClientConfig {
        HttpClientConfig {
            base_url: base_url.to_owned(),
            api_key: Some("test-key".to_owned()),
            model: "gpt-4".to_owned(),
            max_retries: 2,
            backoff_base_ms: 0,
        }
    }

    fn chat_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    #[tokio::test]
    async fn successful_query_returns_response_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Acme is popular.")))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            HttpChatClient::new(PlatformId::ChatGpt, config(&server.uri())).expect("client");
        let result = client
            .query("best crm tools?", Duration::from_secs(5))
            .await;

        assert!(result.succeeded);
        assert_eq!(result.response_text, "Acme is popular.");
        assert_eq!(result.platform, PlatformId::ChatGpt);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn server_error_is_retried_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("recovered")))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            HttpChatClient::new(PlatformId::Claude, config(&server.uri())).expect("client");
        let result = client.query("q", Duration::from_secs(5)).await;

        assert!(result.succeeded);
        assert_eq!(result.response_text, "recovered");
    }

    #[tokio::test]
    async fn rate_limit_is_categorized_and_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            HttpChatClient::new(PlatformId::Gemini, config(&server.uri())).expect("client");
        let result = client.query("q", Duration::from_secs(5)).await;

        assert!(!result.succeeded);
        assert_eq!(result.error, Some(QueryErrorKind::RateLimited));
    }

    #[tokio::test]
    async fn malformed_body_is_categorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client =
            HttpChatClient::new(PlatformId::ChatGpt, config(&server.uri())).expect("client");
        let result = client.query("q", Duration::from_secs(5)).await;

        assert!(!result.succeeded);
        assert_eq!(result.error, Some(QueryErrorKind::Malformed));
    }

    #[tokio::test]
    async fn empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let client =
            HttpChatClient::new(PlatformId::ChatGpt, config(&server.uri())).expect("client");
        let result = client.query("q", Duration::from_secs(5)).await;

        assert!(!result.succeeded);
        assert_eq!(result.error, Some(QueryErrorKind::Malformed));
    }

    #[tokio::test]
    async fn client_error_is_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            HttpChatClient::new(PlatformId::Reddit, config(&server.uri())).expect("client");
        let result = client.query("q", Duration::from_secs(5)).await;

        assert!(!result.succeeded);
        assert_eq!(result.error, Some(QueryErrorKind::Provider));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            HttpChatClient::new(PlatformId::ChatGpt, config(&server.uri())).expect("client");
        let result = client.query("q", Duration::from_millis(50)).await;

        assert!(!result.succeeded);
        assert_eq!(result.error, Some(QueryErrorKind::Timeout));
    }

    #[tokio::test]
    async fn base_url_trailing_slash_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/", server.uri());
        let client = HttpChatClient::new(PlatformId::ChatGpt, config(&base)).expect("client");
        let result = client.query("q", Duration::from_secs(5)).await;
        assert!(result.succeeded);
    }
}
