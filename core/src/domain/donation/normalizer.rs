//! Turns free-form model text into schema-conformant results.
//!
//! Categorization replies must be a single JSON object once code fences are
//! removed; anything else degrades to a raw-text envelope. CO2 replies may wrap
//! the object in prose, so the first complete top-level object is extracted.

use serde_json::{Map, Value};

use crate::domain::{
    common::entities::app_errors::CoreError,
    donation::entities::{
        CategorizationResult, Co2Estimate, ImageAnalysisResult, clamp_unit, coerce_number,
    },
};

pub const RAW_RESPONSE_NOTE: &str = "Could not parse as JSON, returning raw response";
pub const DEFAULT_MODEL_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_MODEL_METHODOLOGY: &str = "AI lifecycle assessment estimate";

const OPENING_FENCES: [&str; 2] = ["```json", "```"];
const CLOSING_FENCE: &str = "```";

/// Removes at most one opening and one closing fence marker, independently.
pub fn strip_code_fence(text: &str) -> &str {
    let mut cleaned = text.trim();

    if let Some(rest) = OPENING_FENCES
        .iter()
        .find_map(|fence| cleaned.strip_prefix(fence))
    {
        cleaned = rest;
    }

    if let Some(rest) = cleaned.strip_suffix(CLOSING_FENCE) {
        cleaned = rest;
    }

    cleaned.trim()
}

/// Categorization replies never fail: undecodable text is returned verbatim.
pub fn normalize_categorization(text: &str) -> ImageAnalysisResult {
    match decode_categorization(text) {
        Ok(result) => ImageAnalysisResult::Categorized(result),
        Err(e) => {
            tracing::warn!("Returning raw model response: {}", e);
            ImageAnalysisResult::Unparsed {
                raw_response: text.to_string(),
                note: RAW_RESPONSE_NOTE.to_string(),
            }
        }
    }
}

pub fn decode_categorization(text: &str) -> Result<CategorizationResult, CoreError> {
    let cleaned = strip_code_fence(text);
    let value: Value =
        serde_json::from_str(cleaned).map_err(|e| CoreError::DecodeFailure(e.to_string()))?;

    let fields = value
        .as_object()
        .ok_or_else(|| CoreError::DecodeFailure("expected a JSON object".to_string()))?;

    Ok(CategorizationResult::from_model_fields(fields))
}

/// Finds the first balanced top-level JSON object in `text`.
///
/// Every `{` is tried as a start position; serde's streaming deserializer stops
/// at the end of the first complete value, so nested objects and trailing prose
/// are both handled.
pub fn extract_first_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(fields))) => Some(fields),
            _ => None,
        }
    })
}

pub fn decode_co2_estimate(text: &str) -> Result<Co2Estimate, CoreError> {
    let cleaned = strip_code_fence(text);
    let fields = extract_first_object(cleaned)
        .ok_or_else(|| CoreError::DecodeFailure("no JSON object found".to_string()))?;

    let savings = fields
        .get("co2_savings")
        .ok_or_else(|| CoreError::DecodeFailure("missing co2_savings".to_string()))?;
    let savings = coerce_number(savings)
        .ok_or_else(|| CoreError::DecodeFailure("co2_savings is not a number".to_string()))?;

    let confidence = fields
        .get("confidence")
        .and_then(coerce_number)
        .map(clamp_unit)
        .unwrap_or(DEFAULT_MODEL_CONFIDENCE);

    Ok(Co2Estimate {
        co2_savings: savings.max(0.0),
        unit: "kg".to_string(),
        confidence,
        explanation: text_field(&fields, "explanation").unwrap_or_default(),
        methodology: text_field(&fields, "methodology")
            .unwrap_or_else(|| DEFAULT_MODEL_METHODOLOGY.to_string()),
    })
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
