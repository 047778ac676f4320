use crate::application::http::donation::validators::{AnalyzeTextRequest, DEFAULT_TEXT_TASK};
use crate::application::http::server::api_entities::api_error::{
    ApiError, ApiErrorResponse, ValidateJson,
};
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;
use axum::extract::State;
use freefind_core::domain::donation::{AnalyzeTextInput, DonationAnalysisService};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info_span};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TextAnalysisResult {
    pub analysis: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AnalyzeTextResponse {
    pub success: bool,
    pub task: String,
    pub result: TextAnalysisResult,
}

#[utoipa::path(
    post,
    path = "/analyze-text",
    tag = "donation",
    summary = "Analyze an item description",
    responses(
        (status = 200, body = AnalyzeTextResponse),
        (status = 400, body = ApiErrorResponse),
        (status = 500, body = ApiErrorResponse),
        (status = 504, body = ApiErrorResponse)
    ),
    request_body = AnalyzeTextRequest
)]
pub async fn analyze_text(
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<AnalyzeTextRequest>,
) -> Result<Response<AnalyzeTextResponse>, ApiError> {
    let task = payload
        .task
        .unwrap_or_else(|| DEFAULT_TEXT_TASK.to_string());
    let span = info_span!("analyze_text", request_id = %Uuid::now_v7(), task = %task);

    let analysis = state
        .service
        .analyze_text(AnalyzeTextInput {
            text: payload.text.unwrap_or_default(),
            task,
        })
        .instrument(span)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(AnalyzeTextResponse {
        success: true,
        task: analysis.task,
        result: TextAnalysisResult {
            analysis: analysis.analysis,
        },
    }))
}
