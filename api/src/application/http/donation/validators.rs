use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_IMAGE_TASK: &str = "categorize";
pub const DEFAULT_TEXT_TASK: &str = "analyze";

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AnalyzeImageRequest {
    /// Base64 image, optionally as a `data:` URL.
    #[validate(required, length(min = 1, message = "image is required"))]
    pub image: Option<String>,

    /// `categorize` (default) or any other value for a free-form description.
    #[serde(default)]
    pub task: Option<String>,

    #[serde(default)]
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AnalyzeTextRequest {
    #[validate(required, length(min = 1, message = "text is required"))]
    pub text: Option<String>,

    #[serde(default)]
    pub task: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct EstimateCo2Request {
    #[validate(required, length(min = 1, message = "category is required"))]
    pub category: Option<String>,

    #[validate(required, length(min = 1, message = "condition is required"))]
    pub condition: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Accepted for compatibility with older clients; always `co2_estimate`.
    #[serde(default)]
    pub task: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_image_is_rejected() {
        let request: AnalyzeImageRequest = serde_json::from_str(r#"{"task": "categorize"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("image"));
    }

    #[test]
    fn test_empty_condition_is_rejected() {
        let request: EstimateCo2Request =
            serde_json::from_str(r#"{"category": "Furniture", "condition": ""}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("condition"));
        assert!(!errors.field_errors().contains_key("category"));
    }

    #[test]
    fn test_optional_fields_default() {
        let request: AnalyzeTextRequest = serde_json::from_str(r#"{"text": "a chair"}"#).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.task.is_none());
    }
}
