pub mod llm;
pub mod route;

use crate::config::Secrets;
use crate::errors::ConfigError;
use llm::openai::OpenAiCompatClient;
use llm::ChatClient;
use std::sync::Arc;

/// HTTP client for `model_id`, bound to the provider its route selects.
pub fn build_client(model_id: &str, secrets: &Secrets) -> Result<Arc<dyn ChatClient>, ConfigError> {
    let route = route::route_for(model_id, secrets)?;
    tracing::debug!(
        event = "client_built",
        model = %model_id,
        provider = route.provider.as_str(),
        base_url = %route.base_url,
    );
    Ok(Arc::new(OpenAiCompatClient::from_route(
        model_id.to_string(),
        route,
    )))
}
