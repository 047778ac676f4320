use std::{path::PathBuf, time::Duration};

use clap::Parser;
use freefind_core::domain::common::{AnalysisLimits, FreeFindConfig, LLMConfig};

#[derive(Debug, Clone, Parser)]
#[command(name = "freefind-api", version, about = "FreeFind donation analysis API")]
pub struct Args {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServerArgs {
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    #[arg(long, env = "SERVER_ROOT_PATH", default_value = "")]
    pub root_path: String,

    /// Comma-separated list; `*` allows any origin.
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub allowed_origins: Vec<String>,

    /// Limit on decoded image bytes.
    #[arg(long, env = "MAX_IMAGE_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_image_bytes: usize,

    #[arg(long, env = "TLS_CERT_PATH", requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long, env = "TLS_KEY_PATH", requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    #[arg(long, env = "METRICS_DISABLED")]
    pub disable_metrics: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LlmArgs {
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GOOGLE_CLOUD_PROJECT_ID")]
    pub project_id: Option<String>,

    #[arg(long, env = "GOOGLE_CLOUD_LOCATION", default_value = "us-central1")]
    pub location: String,

    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub credentials_path: Option<PathBuf>,

    #[arg(long, env = "GEMINI_MODEL_NAME", default_value = "gemini-2.5-flash")]
    pub model: String,

    #[arg(long, env = "GEMINI_FALLBACK_MODEL", default_value = "gemini-1.5-flash")]
    pub fallback_model: String,

    #[arg(long, env = "GEMINI_BASE_URL")]
    pub gemini_base_url: Option<String>,

    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 60)]
    pub llm_timeout_secs: u64,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl Args {
    pub fn analysis_limits(&self) -> AnalysisLimits {
        AnalysisLimits {
            llm_timeout: Duration::from_secs(self.llm.llm_timeout_secs),
            max_image_bytes: self.server.max_image_bytes,
        }
    }
}

impl From<Args> for FreeFindConfig {
    fn from(args: Args) -> Self {
        let limits = args.analysis_limits();

        FreeFindConfig {
            llm: LLMConfig {
                gemini_api_key: args.llm.gemini_api_key,
                project_id: args.llm.project_id,
                location: args.llm.location,
                credentials_path: args.llm.credentials_path,
                gemini_model: args.llm.model,
                fallback_model: args.llm.fallback_model,
                base_url: args.llm.gemini_base_url,
            },
            limits,
        }
    }
}
