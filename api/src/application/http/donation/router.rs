use super::handlers::analyze_image::{__path_analyze_image, analyze_image};
use super::handlers::analyze_text::{__path_analyze_text, analyze_text};
use super::handlers::estimate_co2::{__path_estimate_co2, estimate_co2};
use crate::application::http::server::app_state::AppState;

use axum::{Router, routing::post};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(analyze_image, analyze_text, estimate_co2))]
pub struct DonationApiDoc;

pub fn donation_routes(root_path: &str) -> Router<AppState> {
    Router::new()
        .route(&format!("{}/analyze-image", root_path), post(analyze_image))
        .route(&format!("{}/analyze-text", root_path), post(analyze_text))
        .route(&format!("{}/estimate-co2", root_path), post(estimate_co2))
}
