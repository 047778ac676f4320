use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    donation::{
        entities::{Co2Estimate, EncodedImage, ImageAnalysis, ModelReply, TextAnalysis},
        value_objects::{AnalyzeImageInput, AnalyzeTextInput, EstimateCo2Input},
    },
};

/// Generative model the analysis pipeline delegates to
#[cfg_attr(test, mockall::automock)]
pub trait ModelGateway: Send + Sync {
    fn generate_with_image(
        &self,
        prompt: String,
        image: EncodedImage,
        response_schema: Option<serde_json::Value>,
    ) -> impl Future<Output = Result<ModelReply, CoreError>> + Send;

    fn generate_with_text(
        &self,
        prompt: String,
        response_schema: Option<serde_json::Value>,
    ) -> impl Future<Output = Result<ModelReply, CoreError>> + Send;
}

/// Service trait for donation analysis
#[cfg_attr(test, mockall::automock)]
pub trait DonationAnalysisService: Send + Sync {
    fn analyze_image(
        &self,
        input: AnalyzeImageInput,
    ) -> impl Future<Output = Result<ImageAnalysis, CoreError>> + Send;

    fn analyze_text(
        &self,
        input: AnalyzeTextInput,
    ) -> impl Future<Output = Result<TextAnalysis, CoreError>> + Send;

    /// Never fails once the required fields are present: any gateway problem
    /// degrades to the table-driven estimate.
    fn estimate_co2(
        &self,
        input: EstimateCo2Input,
    ) -> impl Future<Output = Result<Co2Estimate, CoreError>> + Send;
}
