use super::ChatClient;
use crate::model::{ChatCompletion, ChatMessage};
use crate::providers::route::ProviderRoute;
use async_trait::async_trait;
use serde_json::json;

/// Client for any endpoint speaking the OpenAI chat-completions protocol.
pub struct OpenAiCompatClient {
    pub model: String,
    pub route: ProviderRoute,
    pub client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn from_route(model: String, route: ProviderRoute) -> Self {
        Self {
            model,
            route,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.route.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatClient for OpenAiCompatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<ChatCompletion> {
        let body = json!({
            "model": self.model,
            "messages": messages,
        });

        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.route.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "{} chat API error ({}): {}",
                self.route.provider.as_str(),
                status,
                error_text
            );
        }

        let json: serde_json::Value = resp.json().await?;
        parse_completion(json)
    }

    fn provider_name(&self) -> &'static str {
        self.route.provider.as_str()
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Reads `choices[0].message.content` and both `usage` counters; any of them
/// missing is an error.
pub fn parse_completion(json: serde_json::Value) -> anyhow::Result<ChatCompletion> {
    let content = json
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("chat API response missing content"))?
        .to_string();
    let prompt_tokens = json
        .pointer("/usage/prompt_tokens")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| anyhow::anyhow!("chat API response missing usage.prompt_tokens"))?;
    let completion_tokens = json
        .pointer("/usage/completion_tokens")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| anyhow::anyhow!("chat API response missing usage.completion_tokens"))?;

    Ok(ChatCompletion {
        content,
        prompt_tokens,
        completion_tokens,
        raw: json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::route::{Provider, ANYSCALE_BASE_URL};

    #[test]
    fn parses_full_response() {
        let c = parse_completion(json!({
            "choices": [{"message": {"role": "assistant", "content": "SELECT 1;"}}],
            "usage": {"prompt_tokens": 42, "completion_tokens": 4, "total_tokens": 46}
        }))
        .unwrap();
        assert_eq!(c.content, "SELECT 1;");
        assert_eq!(c.prompt_tokens, 42);
        assert_eq!(c.completion_tokens, 4);
    }

    #[test]
    fn missing_usage_is_an_error() {
        let err = parse_completion(json!({
            "choices": [{"message": {"content": "SELECT 1;"}}]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("usage.prompt_tokens"));
    }

    #[test]
    fn missing_choices_is_an_error() {
        assert!(parse_completion(json!({"error": {"message": "overloaded"}})).is_err());
    }

    #[test]
    fn endpoint_joins_base_url() {
        let c = OpenAiCompatClient::from_route(
            "m".into(),
            ProviderRoute {
                provider: Provider::Anyscale,
                base_url: format!("{}/", ANYSCALE_BASE_URL),
                api_key: "k".into(),
            },
        );
        assert_eq!(
            c.endpoint(),
            "https://api.endpoints.anyscale.com/v1/chat/completions"
        );
        assert_eq!(c.provider_name(), "anyscale");
    }
}
