//! Model aliases and the provider each model is served from.

use crate::config::Secrets;
use crate::errors::ConfigError;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANYSCALE_BASE_URL: &str = "https://api.endpoints.anyscale.com/v1";

pub const MODEL_META_LLAMA: &str = "meta-llama/Llama-2-70b-chat-hf";
pub const MODEL_META_CODELLAMA_70B: &str = "codellama/CodeLlama-70b-Instruct-hf";
pub const MODEL_META_CODELLAMA_34B: &str = "codellama/CodeLlama-34b-Instruct-hf";
pub const MODEL_MISTRAL_7B: &str = "mistralai/Mistral-7B-Instruct-v0.1";
pub const MODEL_MIXTRAL_8X7B: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";
pub const MODEL_GPT_3: &str = "gpt-3.5-turbo-16k";
pub const MODEL_GPT_4: &str = "gpt-4-turbo-preview";

/// CLI alias -> model id, in display order.
pub const MODEL_CATALOG: &[(&str, &str)] = &[
    ("cl-70", MODEL_META_CODELLAMA_70B),
    ("cl-34", MODEL_META_CODELLAMA_34B),
    ("mistral", MODEL_MISTRAL_7B),
    ("mixtral", MODEL_MIXTRAL_8X7B),
    ("llama", MODEL_META_LLAMA),
    ("gpt-4", MODEL_GPT_4),
    ("gpt-3", MODEL_GPT_3),
];

const COMMERCIAL_MODELS: &[&str] = &[MODEL_GPT_4, MODEL_GPT_3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anyscale,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anyscale => "anyscale",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => OPENAI_BASE_URL,
            Provider::Anyscale => ANYSCALE_BASE_URL,
        }
    }
}

pub fn resolve_alias(alias: &str) -> Result<&'static str, ConfigError> {
    let alias = alias.trim();
    MODEL_CATALOG
        .iter()
        .find(|(a, _)| *a == alias)
        .map(|(_, id)| *id)
        .ok_or_else(|| {
            let known: Vec<&str> = MODEL_CATALOG.iter().map(|(a, _)| *a).collect();
            ConfigError(format!(
                "unknown model alias '{}' (supported: {})",
                alias,
                known.join(", ")
            ))
        })
}

pub fn provider_for(model_id: &str) -> Provider {
    if COMMERCIAL_MODELS.contains(&model_id) {
        Provider::OpenAi
    } else {
        Provider::Anyscale
    }
}

/// Everything needed to build a client for one model.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderRoute {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: String,
}

impl std::fmt::Debug for ProviderRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRoute")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

pub fn route_for(model_id: &str, secrets: &Secrets) -> Result<ProviderRoute, ConfigError> {
    let provider = provider_for(model_id);
    let api_key = match provider {
        Provider::OpenAi => secrets.require_openai()?,
        Provider::Anyscale => secrets.require_anyscale()?,
    };
    Ok(ProviderRoute {
        provider,
        base_url: provider.base_url().to_string(),
        api_key: api_key.to_string(),
    })
}
