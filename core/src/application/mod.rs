use crate::{
    domain::common::{FreeFindConfig, entities::app_errors::CoreError, services::Service},
    infrastructure::llm::GeminiLLMClient,
};

pub type FreeFindService = Service<GeminiLLMClient>;

/// Resolves the model gateway once; a gateway that fails to initialize leaves
/// the service running with fallback-only CO2 estimates.
///
/// The startup probe is bounded by the same timeout as analysis calls so an
/// unresponsive endpoint cannot keep the server from binding.
pub async fn create_service(config: FreeFindConfig) -> FreeFindService {
    let timeout = config.limits.llm_timeout;
    let connected = tokio::time::timeout(timeout, GeminiLLMClient::connect(&config.llm))
        .await
        .unwrap_or(Err(CoreError::GatewayTimeout(timeout)));

    let gateway = match connected {
        Ok(client) => {
            tracing::info!(
                "Gemini model gateway initialized with model: {}",
                client.model_name()
            );
            Some(client)
        }
        Err(e) => {
            tracing::warn!("Gemini model gateway initialization failed: {}", e);
            None
        }
    };

    Service::new(gateway, config.limits)
}
