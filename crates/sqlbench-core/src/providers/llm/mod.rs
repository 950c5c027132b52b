use crate::model::{ChatCompletion, ChatMessage};
use async_trait::async_trait;

/// A chat-completion endpoint bound to one model.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<ChatCompletion>;
    fn provider_name(&self) -> &'static str;
    fn model(&self) -> &str;
}

pub mod fake;
pub mod openai;
