use std::{future::Future, time::Duration};

use tracing::{error, instrument, warn};

use crate::domain::{
    common::{entities::app_errors::CoreError, services::Service},
    donation::{
        entities::{AnalysisTask, Co2Estimate, ImageAnalysis, ImageAnalysisResult, TextAnalysis},
        fallback::{self, FallbackReason},
        image_normalizer::{decode_base64_image, normalize_image},
        normalizer::{decode_co2_estimate, normalize_categorization},
        ports::{DonationAnalysisService, ModelGateway},
        prompts::{categorize_prompt, co2_estimate_prompt, custom_image_prompt, text_analysis_prompt},
        schema::{categorization_schema, co2_estimate_schema},
        value_objects::{AnalyzeImageInput, AnalyzeTextInput, EstimateCo2Input},
    },
};

impl<G> DonationAnalysisService for Service<G>
where
    G: ModelGateway,
{
    #[instrument(skip(self, input), fields(task = %input.task))]
    async fn analyze_image(&self, input: AnalyzeImageInput) -> Result<ImageAnalysis, CoreError> {
        let gateway = self.gateway.as_ref().ok_or(CoreError::ModelUnavailable)?;

        let bytes = decode_base64_image(&input.image_base64, self.limits.max_image_bytes)?;
        let image = normalize_image(&bytes)?;

        let task = AnalysisTask::for_image(&input.task);
        let (prompt, response_schema) = match task {
            AnalysisTask::Categorize => (categorize_prompt(), Some(categorization_schema())),
            _ => (custom_image_prompt(input.custom_prompt.as_deref()), None),
        };

        let reply = with_deadline(
            self.limits.llm_timeout,
            gateway.generate_with_image(prompt, image, response_schema),
        )
        .await?;

        if reply.is_empty() {
            return Err(CoreError::NoModelOutput);
        }

        let result = match task {
            AnalysisTask::Categorize => normalize_categorization(&reply.text),
            _ => ImageAnalysisResult::Described {
                description: reply.text,
            },
        };

        Ok(ImageAnalysis {
            task: input.task,
            result,
        })
    }

    #[instrument(skip(self, input), fields(task = %input.task))]
    async fn analyze_text(&self, input: AnalyzeTextInput) -> Result<TextAnalysis, CoreError> {
        let gateway = self.gateway.as_ref().ok_or(CoreError::ModelUnavailable)?;

        let prompt = text_analysis_prompt(&input.task, &input.text);
        let reply = with_deadline(
            self.limits.llm_timeout,
            gateway.generate_with_text(prompt, None),
        )
        .await?;

        if reply.is_empty() {
            return Err(CoreError::NoModelOutput);
        }

        Ok(TextAnalysis {
            task: input.task,
            analysis: reply.text,
        })
    }

    #[instrument(skip(self, input), fields(category = %input.category, condition = %input.condition))]
    async fn estimate_co2(&self, input: EstimateCo2Input) -> Result<Co2Estimate, CoreError> {
        require_field(&input.category, "category")?;
        require_field(&input.condition, "condition")?;

        let Some(gateway) = self.gateway.as_ref() else {
            warn!("Model gateway not initialized, using fallback CO2 estimate");
            return Ok(fallback_estimate(&input, FallbackReason::ModelUnavailable));
        };

        let reply = match with_deadline(
            self.limits.llm_timeout,
            gateway.generate_with_text(co2_estimate_prompt(&input), Some(co2_estimate_schema())),
        )
        .await
        {
            Ok(reply) => reply,
            Err(e) => {
                error!("CO2 estimation call failed, using fallback: {}", e);
                return Ok(fallback_estimate(&input, FallbackReason::ModelUnavailable));
            }
        };

        if reply.is_empty() {
            warn!("Model returned no output, using fallback CO2 estimate");
            return Ok(fallback_estimate(&input, FallbackReason::ModelUnavailable));
        }

        match decode_co2_estimate(&reply.text) {
            Ok(estimate) => Ok(estimate),
            Err(e) => {
                warn!("Unusable CO2 estimate from model, using fallback: {}", e);
                Ok(fallback_estimate(
                    &input,
                    FallbackReason::UnusableReply(&reply.text),
                ))
            }
        }
    }
}

fn fallback_estimate(input: &EstimateCo2Input, reason: FallbackReason<'_>) -> Co2Estimate {
    fallback::estimate(&input.category, &input.condition, reason)
}

fn require_field(value: &str, field: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::MissingField(field.to_string()));
    }
    Ok(())
}

/// Bounds a gateway call; the gateway itself never cancels.
async fn with_deadline<T, F>(timeout: Duration, call: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| CoreError::GatewayTimeout(timeout))?
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use base64::{Engine as _, engine::general_purpose};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use super::*;
    use crate::domain::{
        common::AnalysisLimits,
        donation::{
            entities::{EncodedImage, ItemCategory, ModelReply},
            normalizer::RAW_RESPONSE_NOTE,
            ports::MockModelGateway,
        },
    };

    /// Gateway double returning a canned reply, optionally after a delay.
    #[derive(Clone)]
    struct StubGateway {
        reply: Result<ModelReply, CoreError>,
        delay: Option<Duration>,
        calls: Arc<AtomicUsize>,
    }

    impl StubGateway {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(ModelReply::new(text)),
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(error: CoreError) -> Self {
            Self {
                reply: Err(error),
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        async fn respond(&self) -> Result<ModelReply, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone()
        }
    }

    impl ModelGateway for StubGateway {
        async fn generate_with_image(
            &self,
            _prompt: String,
            image: EncodedImage,
            _response_schema: Option<serde_json::Value>,
        ) -> Result<ModelReply, CoreError> {
            assert_eq!(image.mime_type, "image/jpeg");
            self.respond().await
        }

        async fn generate_with_text(
            &self,
            _prompt: String,
            _response_schema: Option<serde_json::Value>,
        ) -> Result<ModelReply, CoreError> {
            self.respond().await
        }
    }

    fn service(gateway: Option<StubGateway>) -> Service<StubGateway> {
        Service::new(gateway, AnalysisLimits::default())
    }

    fn sample_image() -> String {
        let image = RgbImage::from_pixel(2, 2, Rgb([10, 200, 10]));
        let mut cursor = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        general_purpose::STANDARD.encode(cursor.into_inner())
    }

    fn image_input(task: &str) -> AnalyzeImageInput {
        AnalyzeImageInput {
            image_base64: sample_image(),
            task: task.to_string(),
            custom_prompt: None,
        }
    }

    fn co2_input(category: &str, condition: &str) -> EstimateCo2Input {
        EstimateCo2Input {
            category: category.to_string(),
            condition: condition.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_categorize_returns_typed_result() {
        let gateway = StubGateway::replying(
            "```json\n{\"category\": \"toys\", \"title\": \"Teddy\", \"description\": \"Plush bear\", \"condition\": \"Like New\", \"confidence\": 0.75}\n```",
        );
        let analysis = service(Some(gateway))
            .analyze_image(image_input("categorize"))
            .await
            .unwrap();

        assert_eq!(analysis.task, "categorize");
        match analysis.result {
            ImageAnalysisResult::Categorized(result) => {
                assert_eq!(result.category, ItemCategory::Toys);
                assert_eq!(result.title, "Teddy");
            }
            other => panic!("expected categorized result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_categorize_invalid_json_is_still_success() {
        let gateway = StubGateway::replying("I think this is a lamp.");
        let analysis = service(Some(gateway))
            .analyze_image(image_input("categorize"))
            .await
            .unwrap();

        assert_eq!(
            analysis.result,
            ImageAnalysisResult::Unparsed {
                raw_response: "I think this is a lamp.".to_string(),
                note: RAW_RESPONSE_NOTE.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_custom_task_returns_description() {
        let gateway = StubGateway::replying("A green square.");
        let analysis = service(Some(gateway))
            .analyze_image(image_input("describe"))
            .await
            .unwrap();

        assert_eq!(analysis.task, "describe");
        assert_eq!(
            analysis.result,
            ImageAnalysisResult::Described {
                description: "A green square.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_image_without_gateway_is_unavailable() {
        let error = service(None)
            .analyze_image(image_input("categorize"))
            .await
            .unwrap_err();
        assert_eq!(error, CoreError::ModelUnavailable);
    }

    #[tokio::test]
    async fn test_invalid_image_never_reaches_gateway() {
        let gateway = StubGateway::replying("{}");
        let calls = gateway.calls.clone();
        let input = AnalyzeImageInput {
            image_base64: general_purpose::STANDARD.encode(b"not an image"),
            task: "categorize".to_string(),
            custom_prompt: None,
        };

        let error = service(Some(gateway)).analyze_image(input).await.unwrap_err();

        assert!(matches!(error, CoreError::InvalidImageData(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_reply_fails_image_and_text() {
        let gateway = StubGateway::replying("");
        let service = service(Some(gateway));

        let error = service
            .analyze_image(image_input("categorize"))
            .await
            .unwrap_err();
        assert_eq!(error, CoreError::NoModelOutput);

        let error = service
            .analyze_text(AnalyzeTextInput {
                text: "chair".to_string(),
                task: "analyze".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(error, CoreError::NoModelOutput);
    }

    #[tokio::test]
    async fn test_whitespace_reply_is_unparsed_not_missing() {
        let gateway = StubGateway::replying("  \n");
        let analysis = service(Some(gateway))
            .analyze_image(image_input("categorize"))
            .await
            .unwrap();

        assert_eq!(
            analysis.result,
            ImageAnalysisResult::Unparsed {
                raw_response: "  \n".to_string(),
                note: RAW_RESPONSE_NOTE.to_string(),
            }
        );
    }

    fn failing_mock() -> MockModelGateway {
        let mut gateway = MockModelGateway::new();
        gateway
            .expect_generate_with_image()
            .returning(|_, _, _| {
                Box::pin(async {
                    Err(CoreError::GatewayCallFailed("503 Service Unavailable".to_string()))
                })
            });
        gateway.expect_generate_with_text().returning(|_, _| {
            Box::pin(async {
                Err(CoreError::GatewayCallFailed("503 Service Unavailable".to_string()))
            })
        });
        gateway
    }

    #[tokio::test]
    async fn test_gateway_failure_surfaces_for_image_and_text() {
        let service = Service::new(Some(failing_mock()), AnalysisLimits::default());

        let error = service
            .analyze_image(image_input("categorize"))
            .await
            .unwrap_err();
        assert!(matches!(error, CoreError::GatewayCallFailed(_)));

        let error = service
            .analyze_image(image_input("describe"))
            .await
            .unwrap_err();
        assert!(matches!(error, CoreError::GatewayCallFailed(_)));

        let error = service
            .analyze_text(AnalyzeTextInput {
                text: "chair".to_string(),
                task: "analyze".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(error, CoreError::GatewayCallFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_image_never_calls_gateway() {
        let mut gateway = MockModelGateway::new();
        gateway.expect_generate_with_image().times(0);
        let service = Service::new(Some(gateway), AnalysisLimits::default());

        let error = service
            .analyze_image(AnalyzeImageInput {
                image_base64: String::new(),
                task: "categorize".to_string(),
                custom_prompt: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(error, CoreError::InvalidImageData(_)));
    }

    #[tokio::test]
    async fn test_text_analysis_passes_reply_through() {
        let gateway = StubGateway::replying("It is a chair.");
        let analysis = service(Some(gateway))
            .analyze_text(AnalyzeTextInput {
                text: "wooden chair".to_string(),
                task: "analyze".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(analysis.analysis, "It is a chair.");
        assert_eq!(analysis.task, "analyze");
    }

    #[tokio::test]
    async fn test_co2_without_gateway_uses_fallback() {
        let estimate = service(None)
            .estimate_co2(co2_input("Furniture", "Fair"))
            .await
            .unwrap();

        assert!((estimate.co2_savings - 41.6).abs() < 1e-9);
        assert_eq!(estimate.confidence, 0.7);
    }

    #[tokio::test]
    async fn test_co2_empty_reply_matches_missing_gateway() {
        let without_gateway = service(None)
            .estimate_co2(co2_input("Electronics", "Good"))
            .await
            .unwrap();
        let empty_reply = service(Some(StubGateway::replying("")))
            .estimate_co2(co2_input("Electronics", "Good"))
            .await
            .unwrap();

        assert_eq!(without_gateway, empty_reply);
        assert!((empty_reply.co2_savings - 102.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_co2_gateway_failure_uses_fallback() {
        let gateway = StubGateway::failing(CoreError::GatewayCallFailed("503".to_string()));
        let estimate = service(Some(gateway))
            .estimate_co2(co2_input("Books", "Good"))
            .await
            .unwrap();

        assert_eq!(estimate.confidence, 0.7);
        assert!((estimate.co2_savings - 1.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_co2_unparseable_reply_quotes_preview() {
        let gateway = StubGateway::replying("Roughly forty kilograms.");
        let estimate = service(Some(gateway))
            .estimate_co2(co2_input("Furniture", "Fair"))
            .await
            .unwrap();

        assert_eq!(estimate.confidence, 0.6);
        assert!(estimate.explanation.contains("Roughly forty kilograms."));
    }

    #[tokio::test]
    async fn test_co2_reply_without_savings_key_uses_fallback() {
        let gateway = StubGateway::replying(r#"{"confidence": 0.9, "unit": "kg"}"#);
        let estimate = service(Some(gateway))
            .estimate_co2(co2_input("Toys", "Poor"))
            .await
            .unwrap();

        assert_eq!(estimate.confidence, 0.6);
        assert!((estimate.co2_savings - 3.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_co2_model_estimate_is_returned() {
        let gateway = StubGateway::replying(
            r#"Here is the estimate: {"co2_savings": 55.5, "unit": "kg", "confidence": 0.85, "explanation": "Oak table", "methodology": "LCA"}"#,
        );
        let estimate = service(Some(gateway))
            .estimate_co2(co2_input("Furniture", "Good"))
            .await
            .unwrap();

        assert_eq!(estimate.co2_savings, 55.5);
        assert_eq!(estimate.confidence, 0.85);
        assert_eq!(estimate.methodology, "LCA");
    }

    #[tokio::test]
    async fn test_co2_requires_category_and_condition() {
        let error = service(None)
            .estimate_co2(co2_input(" ", "Good"))
            .await
            .unwrap_err();
        assert_eq!(error, CoreError::MissingField("category".to_string()));

        let error = service(None)
            .estimate_co2(co2_input("Toys", ""))
            .await
            .unwrap_err();
        assert_eq!(error, CoreError::MissingField("condition".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_gateway_times_out() {
        let mut gateway = StubGateway::replying("late");
        gateway.delay = Some(Duration::from_secs(120));
        let service = Service::new(
            Some(gateway),
            AnalysisLimits {
                llm_timeout: Duration::from_secs(5),
                ..AnalysisLimits::default()
            },
        );

        let error = service
            .analyze_text(AnalyzeTextInput {
                text: "chair".to_string(),
                task: "analyze".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(error, CoreError::GatewayTimeout(Duration::from_secs(5)));

        let estimate = service
            .estimate_co2(co2_input("Toys", "Good"))
            .await
            .unwrap();
        assert_eq!(estimate.confidence, 0.7);
    }
}
