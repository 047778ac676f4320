use crate::application::http::donation::validators::{AnalyzeImageRequest, DEFAULT_IMAGE_TASK};
use crate::application::http::server::api_entities::api_error::{
    ApiError, ApiErrorResponse, ValidateJson,
};
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;
use axum::extract::State;
use freefind_core::domain::donation::{
    AnalyzeImageInput, DonationAnalysisService, ImageAnalysisResult,
};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info_span};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AnalyzeImageResponse {
    pub success: bool,
    pub task: String,
    pub result: ImageAnalysisResult,
}

#[utoipa::path(
    post,
    path = "/analyze-image",
    tag = "donation",
    summary = "Analyze a donation photo",
    description = "Categorizes the pictured item, or describes it when a task other than `categorize` is given. Unparseable model output is returned as a raw response envelope.",
    responses(
        (status = 200, body = AnalyzeImageResponse),
        (status = 400, body = ApiErrorResponse),
        (status = 500, body = ApiErrorResponse),
        (status = 504, body = ApiErrorResponse)
    ),
    request_body = AnalyzeImageRequest
)]
pub async fn analyze_image(
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<AnalyzeImageRequest>,
) -> Result<Response<AnalyzeImageResponse>, ApiError> {
    let task = payload
        .task
        .unwrap_or_else(|| DEFAULT_IMAGE_TASK.to_string());
    let span = info_span!("analyze_image", request_id = %Uuid::now_v7(), task = %task);

    let analysis = state
        .service
        .analyze_image(AnalyzeImageInput {
            image_base64: payload.image.unwrap_or_default(),
            task,
            custom_prompt: payload.custom_prompt,
        })
        .instrument(span)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(AnalyzeImageResponse {
        success: true,
        task: analysis.task,
        result: analysis.result,
    }))
}
