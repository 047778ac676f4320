use std::{path::PathBuf, time::Duration};

pub mod entities;
pub mod services;

pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct FreeFindConfig {
    pub llm: LLMConfig,
    pub limits: AnalysisLimits,
}

#[derive(Clone, Debug)]
pub struct LLMConfig {
    pub gemini_api_key: Option<String>,
    pub project_id: Option<String>,
    pub location: String,
    pub credentials_path: Option<PathBuf>,
    pub gemini_model: String,
    pub fallback_model: String,
    pub base_url: Option<String>,
}

/// Per-request bounds applied by the analysis service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisLimits {
    pub llm_timeout: Duration,
    pub max_image_bytes: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            llm_timeout: DEFAULT_LLM_TIMEOUT,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}
