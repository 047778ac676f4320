use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::domain::{
    common::{LLMConfig, entities::app_errors::CoreError},
    donation::{
        entities::{EncodedImage, ModelReply},
        ports::ModelGateway,
    },
};

use super::service_account::ServiceAccountTokenSource;

const GENERATIVE_LANGUAGE_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiLLMClient {
    endpoint: GeminiEndpoint,
    model_name: String,
    client: Client,
}

#[derive(Debug, Clone)]
enum GeminiEndpoint {
    ApiKey {
        base_url: String,
        api_key: String,
    },
    VertexAi {
        base_url: String,
        project_id: String,
        location: String,
        token_source: Arc<ServiceAccountTokenSource>,
    },
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

impl GenerationConfig {
    fn new(response_schema: Option<serde_json::Value>) -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            max_output_tokens: 8192,
            response_mime_type: response_schema
                .as_ref()
                .map(|_| "application/json".to_string()),
            response_schema,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

impl GeminiResponse {
    /// Joins the text parts of the first candidate; no candidate yields an empty reply.
    fn into_reply(self) -> ModelReply {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        ModelReply { text }
    }
}

impl GeminiLLMClient {
    pub fn new(api_key: String, model_name: String) -> Self {
        Self {
            endpoint: GeminiEndpoint::ApiKey {
                base_url: GENERATIVE_LANGUAGE_BASE_URL.to_string(),
                api_key,
            },
            model_name,
            client: Client::new(),
        }
    }

    pub fn vertex(
        project_id: String,
        location: String,
        token_source: ServiceAccountTokenSource,
        model_name: String,
    ) -> Self {
        Self {
            endpoint: GeminiEndpoint::VertexAi {
                base_url: vertex_base_url(&location),
                project_id,
                location,
                token_source: Arc::new(token_source),
            },
            model_name,
            client: Client::new(),
        }
    }

    /// Points the client at another host, e.g. a proxy.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        match &mut self.endpoint {
            GeminiEndpoint::ApiKey { base_url, .. } => *base_url = url,
            GeminiEndpoint::VertexAi { base_url, .. } => *base_url = url,
        }
        self
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Builds a client from configuration and verifies the model is reachable,
    /// switching to the fallback model when the primary one is not.
    pub async fn connect(config: &LLMConfig) -> Result<Self, CoreError> {
        let client = Self::from_config(config).await?;

        match client.probe().await {
            Ok(()) => Ok(client),
            Err(primary_err) => {
                tracing::warn!(
                    "Primary model '{}' unavailable ({}); attempting fallback '{}'",
                    config.gemini_model,
                    primary_err,
                    config.fallback_model
                );
                let fallback = client.with_model(config.fallback_model.clone());
                fallback.probe().await?;
                tracing::info!("Fallback model '{}' initialized", config.fallback_model);
                Ok(fallback)
            }
        }
    }

    async fn from_config(config: &LLMConfig) -> Result<Self, CoreError> {
        let client = if let Some(api_key) = config.gemini_api_key.clone() {
            Self::new(api_key, config.gemini_model.clone())
        } else if let Some(path) = &config.credentials_path {
            let token_source = ServiceAccountTokenSource::from_file(path).await?;
            let project_id = config
                .project_id
                .clone()
                .or_else(|| token_source.project_id().map(str::to_string))
                .ok_or_else(|| {
                    CoreError::Configuration("no Google Cloud project id configured".to_string())
                })?;
            Self::vertex(
                project_id,
                config.location.clone(),
                token_source,
                config.gemini_model.clone(),
            )
        } else {
            return Err(CoreError::Configuration(
                "neither an API key nor a service account key is configured".to_string(),
            ));
        };

        Ok(match &config.base_url {
            Some(base_url) => client.with_base_url(base_url.clone()),
            None => client,
        })
    }

    fn generate_url(&self) -> String {
        match &self.endpoint {
            GeminiEndpoint::ApiKey { base_url, .. } => {
                format!("{}/v1beta/models/{}:generateContent", base_url, self.model_name)
            }
            GeminiEndpoint::VertexAi {
                base_url,
                project_id,
                location,
                ..
            } => format!(
                "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
                base_url, project_id, location, self.model_name
            ),
        }
    }

    fn model_url(&self) -> String {
        match &self.endpoint {
            GeminiEndpoint::ApiKey { base_url, .. } => {
                format!("{}/v1beta/models/{}", base_url, self.model_name)
            }
            GeminiEndpoint::VertexAi { base_url, .. } => format!(
                "{}/v1beta1/publishers/google/models/{}",
                base_url, self.model_name
            ),
        }
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, CoreError> {
        match &self.endpoint {
            GeminiEndpoint::ApiKey { api_key, .. } => Ok(request.query(&[("key", api_key)])),
            GeminiEndpoint::VertexAi { token_source, .. } => {
                let token = token_source.access_token(&self.client).await?;
                Ok(request.bearer_auth(token))
            }
        }
    }

    /// Fetches model metadata to confirm the model exists and credentials work.
    async fn probe(&self) -> Result<(), CoreError> {
        let request = self.authorize(self.client.get(self.model_url())).await?;
        let response = request.send().await.map_err(|e| {
            CoreError::GatewayCallFailed(format!("model lookup failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(CoreError::GatewayCallFailed(format!(
                "model '{}' lookup returned {}",
                self.model_name,
                response.status()
            )));
        }

        Ok(())
    }

    async fn call_gemini_api(&self, request: GeminiRequest) -> Result<ModelReply, CoreError> {
        let http_request = self
            .authorize(self.client.post(self.generate_url()))
            .await?
            .json(&request);

        let response = http_request.send().await.map_err(|e| {
            tracing::error!("Gemini API request failed: {}", e);
            CoreError::GatewayCallFailed(format!("LLM API error: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: {} - {}", status, error_text);
            return Err(CoreError::GatewayCallFailed(format!(
                "LLM API returned error: {} - {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            CoreError::GatewayCallFailed(format!("Failed to parse LLM response: {}", e))
        })?;

        Ok(gemini_response.into_reply())
    }
}

impl ModelGateway for GeminiLLMClient {
    async fn generate_with_image(
        &self,
        prompt: String,
        image: EncodedImage,
        response_schema: Option<serde_json::Value>,
    ) -> Result<ModelReply, CoreError> {
        let base64_image = general_purpose::STANDARD.encode(&image.data);

        let request = GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.to_string(),
                            data: base64_image,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig::new(response_schema),
        };

        self.call_gemini_api(request).await
    }

    async fn generate_with_text(
        &self,
        prompt: String,
        response_schema: Option<serde_json::Value>,
    ) -> Result<ModelReply, CoreError> {
        let request = GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part::Text { text: prompt }],
            }],
            generation_config: GenerationConfig::new(response_schema),
        };

        self.call_gemini_api(request).await
    }
}

fn vertex_base_url(location: &str) -> String {
    if location == "global" {
        "https://aiplatform.googleapis.com".to_string()
    } else {
        format!("https://{}-aiplatform.googleapis.com", location)
    }
}
