use super::ChatClient;
use crate::model::{ChatCompletion, ChatMessage};
use async_trait::async_trait;
use std::sync::Mutex;

/// What a `FakeClient` answers for one call.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Fail(String),
}

type Responder = Box<dyn Fn(usize, &[ChatMessage]) -> FakeReply + Send + Sync>;

/// Deterministic in-process client. Token counts are whitespace word counts.
pub struct FakeClient {
    model: String,
    responder: Responder,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeClient {
    pub fn from_fn(
        model: impl Into<String>,
        f: impl Fn(usize, &[ChatMessage]) -> FakeReply + Send + Sync + 'static,
    ) -> Self {
        Self {
            model: model.into(),
            responder: Box::new(f),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replies in order; calls past the end of the script fail.
    pub fn scripted(model: impl Into<String>, replies: Vec<FakeReply>) -> Self {
        Self::from_fn(model, move |i, _| {
            replies
                .get(i)
                .cloned()
                .unwrap_or_else(|| FakeReply::Fail("fake script exhausted".into()))
        })
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

fn word_count(s: &str) -> u64 {
    s.split_whitespace().count() as u64
}

#[async_trait]
impl ChatClient for FakeClient {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<ChatCompletion> {
        let idx = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(messages.to_vec());
            calls.len() - 1
        };
        match (self.responder)(idx, messages) {
            FakeReply::Text(content) => {
                let prompt_tokens: u64 = messages.iter().map(|m| word_count(&m.content)).sum();
                let completion_tokens = word_count(&content);
                Ok(ChatCompletion {
                    raw: serde_json::json!({
                        "choices": [{"message": {"role": "assistant", "content": content}}],
                        "usage": {"prompt_tokens": prompt_tokens, "completion_tokens": completion_tokens}
                    }),
                    content,
                    prompt_tokens,
                    completion_tokens,
                })
            }
            FakeReply::Fail(msg) => anyhow::bail!(msg),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
