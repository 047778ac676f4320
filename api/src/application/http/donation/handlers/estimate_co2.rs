use crate::application::http::donation::validators::EstimateCo2Request;
use crate::application::http::server::api_entities::api_error::{
    ApiError, ApiErrorResponse, ValidateJson,
};
use crate::application::http::server::api_entities::response::Response;
use crate::application::http::server::app_state::AppState;
use axum::extract::State;
use freefind_core::domain::donation::{Co2Estimate, DonationAnalysisService, EstimateCo2Input};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info_span};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct EstimateCo2Response {
    pub success: bool,
    pub result: Co2Estimate,
}

#[utoipa::path(
    post,
    path = "/estimate-co2",
    tag = "donation",
    summary = "Estimate CO2 saved by reusing an item",
    description = "Asks the model for an estimate and falls back to a category and condition table when the model is unavailable or its answer cannot be decoded.",
    responses(
        (status = 200, body = EstimateCo2Response),
        (status = 400, body = ApiErrorResponse)
    ),
    request_body = EstimateCo2Request
)]
pub async fn estimate_co2(
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<EstimateCo2Request>,
) -> Result<Response<EstimateCo2Response>, ApiError> {
    let span = info_span!("estimate_co2", request_id = %Uuid::now_v7());

    let estimate = state
        .service
        .estimate_co2(EstimateCo2Input {
            category: payload.category.unwrap_or_default(),
            condition: payload.condition.unwrap_or_default(),
            title: payload.title,
            description: payload.description,
        })
        .instrument(span)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(EstimateCo2Response {
        success: true,
        result: estimate,
    }))
}
