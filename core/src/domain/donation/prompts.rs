use crate::domain::donation::{
    entities::{ItemCategory, ItemCondition},
    value_objects::EstimateCo2Input,
};

pub const DEFAULT_IMAGE_PROMPT: &str = "Describe what you see in this image.";

/// Instruction for the image categorization task.
pub fn categorize_prompt() -> String {
    let categories = ItemCategory::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let conditions = ItemCondition::RATED
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Analyze this image of a donated item and provide the following information in JSON format:

{{
    "category": "one of: {categories}",
    "title": "suggested title for the item",
    "description": "brief description of the item",
    "condition": "one of: {conditions}",
    "confidence": "confidence level from 0.0 to 1.0",
    "co2_savings": "estimated CO2 savings in kg when this item is donated vs thrown away",
    "co2_explanation": "brief explanation of the CO2 calculation"
}}

For CO2 estimation, consider:
- Manufacturing emissions avoided (someone reuses instead of buying new)
- Disposal emissions avoided (item doesn't go to landfill)
- Item condition impact on reuse potential
- Typical production footprint for this category

Base CO2 estimates on real lifecycle assessment data. Be conservative but realistic.

Be accurate and helpful. If you're unsure about the category, use "Other" and explain in the description.
Only return the JSON, no other text."#
    )
}

/// Caller-supplied instruction for non-categorize image tasks.
pub fn custom_image_prompt(custom_prompt: Option<&str>) -> String {
    match custom_prompt.map(str::trim) {
        Some(prompt) if !prompt.is_empty() => prompt.to_string(),
        _ => DEFAULT_IMAGE_PROMPT.to_string(),
    }
}

pub fn text_analysis_prompt(task: &str, text: &str) -> String {
    format!(
        "Task: {task}\n\nText to analyze: {text}\n\nPlease provide a helpful analysis or response."
    )
}

pub fn co2_estimate_prompt(input: &EstimateCo2Input) -> String {
    let title = input.title.as_deref().unwrap_or("").trim();
    let description = input.description.as_deref().unwrap_or("").trim();

    format!(
        r#"Estimate the CO2 emissions saved when the following item is donated for reuse instead of being thrown away.

Item details:
- Category: {category}
- Condition: {condition}
- Title: {title}
- Description: {description}

Weigh these factors:
1. Manufacturing emissions avoided because someone reuses this item instead of buying new
2. Disposal emissions avoided because the item does not go to landfill or incineration
3. Transport savings from local reuse compared with shipping a new product
4. Condition impact: items in better condition displace more new purchases

Base the estimate on real lifecycle assessment data. Be conservative but realistic.

Respond with exactly this JSON object and nothing else:
{{
    "co2_savings": <number, kilograms of CO2e saved, 0 or greater>,
    "unit": "kg",
    "confidence": <number from 0.0 to 1.0>,
    "explanation": "<one or two sentences explaining the estimate>",
    "methodology": "<short description of the lifecycle data used>"
}}"#,
        category = input.category.trim(),
        condition = input.condition.trim(),
    )
}
