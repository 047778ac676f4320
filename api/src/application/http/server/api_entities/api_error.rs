use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use freefind_core::domain::common::entities::app_errors::CoreError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { kind: &'static str, message: String },

    #[error("{message}")]
    InternalServerError { kind: &'static str, message: String },

    #[error("{message}")]
    GatewayTimeout { kind: &'static str, message: String },
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
    pub kind: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::GatewayTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest { kind, .. }
            | ApiError::InternalServerError { kind, .. }
            | ApiError::GatewayTimeout { kind, .. } => kind,
        }
    }

    fn internal(kind: &'static str, message: &str) -> Self {
        ApiError::InternalServerError {
            kind,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiErrorResponse {
            success: false,
            error: self.to_string(),
            kind: self.kind().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        let kind = error.kind();

        match error {
            CoreError::MissingField(field) => ApiError::BadRequest {
                kind,
                message: format!("Missing required field: {}", field),
            },
            CoreError::InvalidImageData(detail) => {
                tracing::debug!("Rejected image payload: {}", detail);
                ApiError::BadRequest {
                    kind,
                    message: "Invalid image data".to_string(),
                }
            }
            CoreError::ImageTooLarge { max_bytes } => ApiError::BadRequest {
                kind,
                message: format!("Image too large. Max size is {} bytes", max_bytes),
            },
            CoreError::ModelUnavailable => ApiError::internal(
                kind,
                "Gemini AI model not initialized. Please check your configuration.",
            ),
            CoreError::GatewayCallFailed(detail) => {
                tracing::error!("Model gateway call failed: {}", detail);
                ApiError::internal(kind, "Gemini AI processing failed")
            }
            CoreError::GatewayTimeout(timeout) => {
                tracing::error!("Model gateway timed out after {:?}", timeout);
                ApiError::GatewayTimeout {
                    kind,
                    message: "Gemini AI did not respond in time".to_string(),
                }
            }
            CoreError::NoModelOutput => ApiError::internal(kind, "No response from Gemini AI"),
            CoreError::DecodeFailure(detail) => {
                tracing::error!("Model output could not be decoded: {}", detail);
                ApiError::internal(kind, "Gemini AI response could not be decoded")
            }
            CoreError::Configuration(detail) | CoreError::Internal(detail) => {
                tracing::error!("Unexpected error: {}", detail);
                ApiError::internal(kind, "Unexpected server error")
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();

        ApiError::from(CoreError::MissingField(fields.join(", ")))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            kind: "invalid_body",
            message: rejection.body_text(),
        }
    }
}

/// JSON body extractor that runs `validator` rules before the handler sees the payload.
pub struct ValidateJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await?;
        payload.validate()?;
        Ok(ValidateJson(payload))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        let error = ApiError::from(CoreError::MissingField("image".to_string()));
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.kind(), "missing_field");
        assert_eq!(error.to_string(), "Missing required field: image");

        let error = ApiError::from(CoreError::InvalidImageData("bad magic".to_string()));
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert!(!error.to_string().contains("bad magic"));
    }

    #[test]
    fn test_upstream_detail_is_not_leaked() {
        let error = ApiError::from(CoreError::GatewayCallFailed(
            "403 PERMISSION_DENIED project secret-project".to_string(),
        ));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.kind(), "gateway_call_failed");
        assert!(!error.to_string().contains("secret-project"));
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let error = ApiError::from(CoreError::GatewayTimeout(Duration::from_secs(60)));
        assert_eq!(error.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_model_unavailable_is_server_error() {
        let error = ApiError::from(CoreError::ModelUnavailable);
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.kind(), "model_unavailable");
    }
}
