pub mod gemini_client;
pub mod service_account;

pub use gemini_client::GeminiLLMClient;
pub use service_account::ServiceAccountTokenSource;
