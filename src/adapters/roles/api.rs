//! Anthropic Messages API role adapter.
//!
//! One `ApiRole` per reasoning role, each carrying its own behavioral brief
//! as the system prompt. The conversation is projected onto the API's
//! user/assistant alternation: human messages become user turns, every role
//! output becomes an assistant turn, and consecutive same-side messages are
//! coalesced.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::RoleError;
use crate::domain::models::{ApiConfig, Message, RoleTag};
use crate::domain::ports::Role;
use crate::services::UsageLedger;

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ApiSide {
    User,
    Assistant,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: ApiSide,
    content: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    #[serde(default)]
    usage: Usage,
}

/// HTTP-backed reasoning role.
pub struct ApiRole {
    tag: RoleTag,
    brief: String,
    client: reqwest::Client,
    config: ApiConfig,
    ledger: Option<Arc<UsageLedger>>,
}

impl ApiRole {
    pub fn new(
        tag: RoleTag,
        brief: impl Into<String>,
        config: &ApiConfig,
        ledger: Option<Arc<UsageLedger>>,
    ) -> Result<Self, RoleError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            RoleError::NotConfigured(
                "no API key: set api.api_key or the ANTHROPIC_API_KEY environment variable"
                    .to_string(),
            )
        })?;

        let mut headers = header::HeaderMap::new();
        let mut key_value = header::HeaderValue::from_str(&api_key)
            .map_err(|e| RoleError::NotConfigured(format!("invalid API key: {e}")))?;
        key_value.set_sensitive(true);
        headers.insert("x-api-key", key_value);
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(API_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RoleError::Transport(e.to_string()))?;

        Ok(Self {
            tag,
            brief: brief.into(),
            client,
            config: config.clone(),
            ledger,
        })
    }

    /// Project the conversation onto user/assistant turns, coalescing
    /// consecutive same-side messages.
    fn to_api_messages(conversation: &[Message]) -> Vec<ApiMessage> {
        let mut out: Vec<ApiMessage> = Vec::new();
        for message in conversation {
            let side = match message.role {
                RoleTag::Human => ApiSide::User,
                _ => ApiSide::Assistant,
            };
            match out.last_mut() {
                Some(last) if last.role == side => {
                    last.content.push_str("\n\n");
                    last.content.push_str(&message.content);
                }
                _ => out.push(ApiMessage {
                    role: side,
                    content: message.content.clone(),
                }),
            }
        }
        out
    }
}

#[async_trait]
impl Role for ApiRole {
    fn tag(&self) -> RoleTag {
        self.tag
    }

    async fn transform(&self, conversation: &[Message]) -> Result<Message, RoleError> {
        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: Some(self.brief.clone()),
            messages: Self::to_api_messages(conversation),
            temperature: Some(self.config.temperature),
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| RoleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RoleError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| RoleError::Transport(e.to_string()))?;

        let text = body
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if text.is_empty() {
            return Err(RoleError::EmptyResponse);
        }

        debug!(
            role = %self.tag,
            input_tokens = body.usage.input_tokens,
            output_tokens = body.usage.output_tokens,
            "role transform complete"
        );

        if let Some(ledger) = &self.ledger {
            ledger
                .record(
                    self.tag.as_str(),
                    &body.model,
                    body.usage.input_tokens,
                    body.usage.output_tokens,
                )
                .await;
        }

        Ok(Message::new(self.tag, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: String) -> ApiConfig {
        ApiConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_conversation_projection_coalesces_assistant_turns() {
        let conversation = vec![
            Message::new(RoleTag::Human, "model a DC motor"),
            Message::new(RoleTag::Draft, "problem statement"),
            Message::new(RoleTag::Implement, "code v1"),
            Message::new(RoleTag::Validate, "FAIL: No ports defined."),
        ];

        let api_messages = ApiRole::to_api_messages(&conversation);
        assert_eq!(api_messages.len(), 2);
        assert_eq!(api_messages[0].role, ApiSide::User);
        assert_eq!(api_messages[1].role, ApiSide::Assistant);
        assert!(api_messages[1].content.contains("problem statement"));
        assert!(api_messages[1].content.contains("FAIL: No ports defined."));
    }

    #[tokio::test]
    async fn test_transform_returns_tagged_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", API_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "content": [{"type": "text", "text": "fn motor(name) { component(name) }"}],
                    "model": "claude-sonnet-4-5",
                    "usage": {"input_tokens": 120, "output_tokens": 40}
                }"#,
            )
            .create_async()
            .await;

        let role = ApiRole::new(
            RoleTag::Implement,
            "brief",
            &test_config(server.url()),
            None,
        )
        .unwrap();

        let message = role
            .transform(&[Message::new(RoleTag::Human, "build it")])
            .await
            .unwrap();

        assert_eq!(message.role, RoleTag::Implement);
        assert_eq!(message.content, "fn motor(name) { component(name) }");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transform_records_usage_in_ledger() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "content": [{"type": "text", "text": "ok"}],
                    "model": "claude-sonnet-4-5",
                    "usage": {"input_tokens": 1000000, "output_tokens": 1000000}
                }"#,
            )
            .create_async()
            .await;

        let ledger = Arc::new(UsageLedger::in_memory());
        let role = ApiRole::new(
            RoleTag::Draft,
            "brief",
            &test_config(server.url()),
            Some(ledger.clone()),
        )
        .unwrap();

        role.transform(&[Message::new(RoleTag::Human, "task")])
            .await
            .unwrap();

        let state = ledger.snapshot().await;
        let usage = state.roles.get("draft").unwrap();
        assert_eq!(usage.input_tokens, 1_000_000);
        assert_eq!(usage.output_tokens, 1_000_000);
        // One million input + one million output tokens of sonnet.
        assert!((state.cumulative_usd - 18.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_transform_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let role =
            ApiRole::new(RoleTag::Review, "brief", &test_config(server.url()), None).unwrap();

        let err = role
            .transform(&[Message::new(RoleTag::Human, "task")])
            .await
            .unwrap_err();
        match err {
            RoleError::Api { status, .. } => assert_eq!(status, 429),
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
