use crate::application::http::{donation::router::DonationApiDoc, health::HealthApiDoc};
use crate::application::http::server::api_entities::api_error::ApiErrorResponse;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FreeFind API",
        description = "Donation item categorization and CO2 savings estimates"
    ),
    components(schemas(ApiErrorResponse))
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Full document with every route group merged in.
    pub fn build() -> utoipa::openapi::OpenApi {
        let mut openapi = ApiDoc::openapi();
        openapi.merge(DonationApiDoc::openapi());
        openapi.merge(HealthApiDoc::openapi());
        openapi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_all_routes() {
        let openapi = ApiDoc::build();

        for path in ["/analyze-image", "/analyze-text", "/estimate-co2", "/health"] {
            assert!(openapi.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
