use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Bumped whenever the categorization fields or their permitted values change.
pub const CATEGORIZATION_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ItemCategory {
    Furniture,
    Clothing,
    Electronics,
    Books,
    Toys,
    Kitchenware,
    #[serde(rename = "Sports & Outdoors")]
    SportsAndOutdoors,
    Other,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 8] = [
        ItemCategory::Furniture,
        ItemCategory::Clothing,
        ItemCategory::Electronics,
        ItemCategory::Books,
        ItemCategory::Toys,
        ItemCategory::Kitchenware,
        ItemCategory::SportsAndOutdoors,
        ItemCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Furniture => "Furniture",
            ItemCategory::Clothing => "Clothing",
            ItemCategory::Electronics => "Electronics",
            ItemCategory::Books => "Books",
            ItemCategory::Toys => "Toys",
            ItemCategory::Kitchenware => "Kitchenware",
            ItemCategory::SportsAndOutdoors => "Sports & Outdoors",
            ItemCategory::Other => "Other",
        }
    }

    /// Case-insensitive match against the permitted labels; anything else is `Other`.
    pub fn parse_lenient(value: &str) -> Self {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
            .unwrap_or(ItemCategory::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ItemCondition {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

impl ItemCondition {
    /// Conditions the model is allowed to report.
    pub const RATED: [ItemCondition; 4] = [
        ItemCondition::Excellent,
        ItemCondition::Good,
        ItemCondition::Fair,
        ItemCondition::Poor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::Excellent => "Excellent",
            ItemCondition::Good => "Good",
            ItemCondition::Fair => "Fair",
            ItemCondition::Poor => "Poor",
            ItemCondition::Unknown => "Unknown",
        }
    }

    /// "New" and "Like New" from older prompt revisions collapse into `Excellent`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" | "like new" | "excellent" => ItemCondition::Excellent,
            "good" => ItemCondition::Good,
            "fair" => ItemCondition::Fair,
            "poor" => ItemCondition::Poor,
            _ => ItemCondition::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTask {
    Categorize,
    Custom,
}

impl AnalysisTask {
    /// Image requests only know `categorize`; every other label is a custom prompt.
    pub fn for_image(task: &str) -> Self {
        if task == "categorize" {
            AnalysisTask::Categorize
        } else {
            AnalysisTask::Custom
        }
    }
}

/// Text produced by the model gateway. Empty text is a valid reply; text made
/// only of whitespace still counts as output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub text: String,
}

impl ModelReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Image bytes in the transport encoding the gateway expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorizationResult {
    pub category: ItemCategory,
    pub title: String,
    pub description: String,
    pub condition: ItemCondition,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2_savings: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2_explanation: Option<String>,
    pub schema_version: u32,
}

impl CategorizationResult {
    /// Builds a result from a decoded model object, coercing every field into range.
    pub fn from_model_fields(fields: &Map<String, Value>) -> Self {
        let category = fields
            .get("category")
            .and_then(Value::as_str)
            .map(ItemCategory::parse_lenient)
            .unwrap_or(ItemCategory::Other);

        let condition = fields
            .get("condition")
            .and_then(Value::as_str)
            .map(ItemCondition::parse_lenient)
            .unwrap_or(ItemCondition::Unknown);

        Self {
            category,
            title: string_field(fields, "title").unwrap_or_default(),
            description: string_field(fields, "description").unwrap_or_default(),
            condition,
            confidence: fields
                .get("confidence")
                .and_then(coerce_number)
                .map(clamp_unit)
                .unwrap_or(0.0),
            co2_savings: fields
                .get("co2_savings")
                .and_then(coerce_number)
                .map(|savings| savings.max(0.0)),
            co2_explanation: string_field(fields, "co2_explanation"),
            schema_version: CATEGORIZATION_SCHEMA_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Co2Estimate {
    pub co2_savings: f64,
    pub unit: String,
    pub confidence: f64,
    pub explanation: String,
    pub methodology: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ImageAnalysisResult {
    Categorized(CategorizationResult),
    Unparsed { raw_response: String, note: String },
    Described { description: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageAnalysis {
    pub task: String,
    pub result: ImageAnalysisResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAnalysis {
    pub task: String,
    pub analysis: String,
}

/// Accepts JSON numbers and numeric strings such as `"0.8"` or `"12.5 kg"`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let text = text.trim();
            let text = text
                .strip_suffix("kg")
                .or_else(|| text.strip_suffix("KG"))
                .unwrap_or(text);
            text.trim().parse::<f64>().ok()
        }
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
