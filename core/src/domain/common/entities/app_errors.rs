use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid image data: {0}")]
    InvalidImageData(String),

    #[error("image exceeds the {max_bytes} byte limit")]
    ImageTooLarge { max_bytes: usize },

    #[error("model gateway is not initialized")]
    ModelUnavailable,

    #[error("model gateway call failed: {0}")]
    GatewayCallFailed(String),

    #[error("model gateway did not answer within {0:?}")]
    GatewayTimeout(Duration),

    #[error("model returned no output")]
    NoModelOutput,

    #[error("could not decode model output: {0}")]
    DecodeFailure(String),

    #[error("gateway configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable identifier exposed to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::MissingField(_) => "missing_field",
            CoreError::InvalidImageData(_) => "invalid_image_data",
            CoreError::ImageTooLarge { .. } => "image_too_large",
            CoreError::ModelUnavailable => "model_unavailable",
            CoreError::GatewayCallFailed(_) => "gateway_call_failed",
            CoreError::GatewayTimeout(_) => "gateway_timeout",
            CoreError::NoModelOutput => "no_model_output",
            CoreError::DecodeFailure(_) => "decode_failure",
            CoreError::Configuration(_) => "configuration",
            CoreError::Internal(_) => "internal",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::MissingField(_)
                | CoreError::InvalidImageData(_)
                | CoreError::ImageTooLarge { .. }
        )
    }
}
