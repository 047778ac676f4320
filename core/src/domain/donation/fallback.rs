use crate::domain::donation::entities::Co2Estimate;

pub const REUSE_FACTOR: f64 = 0.8;
pub const DEFAULT_CATEGORY_FOOTPRINT_KG: f64 = 15.0;
pub const DEFAULT_CONDITION_MULTIPLIER: f64 = 0.7;

const PREVIEW_CHARS: usize = 200;
const FALLBACK_METHODOLOGY: &str =
    "Category production footprint x condition reuse multiplier x 0.8 displacement factor";

/// Why the table-driven estimate was used instead of the model's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason<'a> {
    /// No gateway, a failed call, or an empty reply.
    ModelUnavailable,
    /// The model answered but no usable estimate could be decoded.
    UnusableReply(&'a str),
}

impl FallbackReason<'_> {
    pub fn confidence(&self) -> f64 {
        match self {
            FallbackReason::ModelUnavailable => 0.7,
            FallbackReason::UnusableReply(_) => 0.6,
        }
    }

    fn explanation(&self) -> String {
        match self {
            FallbackReason::ModelUnavailable => {
                "Estimated with the category-based fallback calculation because the AI model was unavailable."
                    .to_string()
            }
            FallbackReason::UnusableReply(raw) => format!(
                "Estimated with the category-based fallback calculation because the AI response could not be parsed. Response preview: {}",
                preview(raw)
            ),
        }
    }
}

/// Base kilograms CO2e for producing a new item of the category.
pub fn category_footprint_kg(category: &str) -> f64 {
    match category.trim().to_lowercase().as_str() {
        "electronics" => 150.0,
        "furniture" => 80.0,
        "clothing" => 25.0,
        "sports & outdoors" => 20.0,
        "kitchenware" => 15.0,
        "toys" => 10.0,
        "books" => 2.5,
        _ => DEFAULT_CATEGORY_FOOTPRINT_KG,
    }
}

pub fn condition_multiplier(condition: &str) -> f64 {
    match condition.trim().to_lowercase().as_str() {
        "excellent" => 1.0,
        "good" => 0.85,
        "fair" => 0.65,
        "poor" => 0.4,
        _ => DEFAULT_CONDITION_MULTIPLIER,
    }
}

/// Savings in kg, rounded to two decimals.
pub fn savings_kg(category: &str, condition: &str) -> f64 {
    let raw = category_footprint_kg(category) * condition_multiplier(condition) * REUSE_FACTOR;
    (raw * 100.0).round() / 100.0
}

pub fn estimate(category: &str, condition: &str, reason: FallbackReason<'_>) -> Co2Estimate {
    Co2Estimate {
        co2_savings: savings_kg(category, condition),
        unit: "kg".to_string(),
        confidence: reason.confidence(),
        explanation: reason.explanation(),
        methodology: FALLBACK_METHODOLOGY.to_string(),
    }
}

fn preview(raw: &str) -> String {
    let raw = raw.trim();
    let mut preview: String = raw.chars().take(PREVIEW_CHARS).collect();
    if raw.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
