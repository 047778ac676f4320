use serde_json::json;

use crate::domain::donation::entities::{ItemCategory, ItemCondition};

/// Returns the JSON schema for categorization responses
pub fn categorization_schema() -> serde_json::Value {
    let categories: Vec<&str> = ItemCategory::ALL.iter().map(|c| c.as_str()).collect();
    let conditions: Vec<&str> = ItemCondition::RATED.iter().map(|c| c.as_str()).collect();

    json!({
        "type": "object",
        "properties": {
            "category": { "type": "string", "enum": categories },
            "title": { "type": "string" },
            "description": { "type": "string" },
            "condition": { "type": "string", "enum": conditions },
            "confidence": { "type": "number" },
            "co2_savings": { "type": "number" },
            "co2_explanation": { "type": "string" }
        },
        "required": ["category", "title", "description", "condition", "confidence"]
    })
}

/// Returns the JSON schema for CO2 estimate responses
pub fn co2_estimate_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "co2_savings": { "type": "number" },
            "unit": { "type": "string" },
            "confidence": { "type": "number" },
            "explanation": { "type": "string" },
            "methodology": { "type": "string" }
        },
        "required": ["co2_savings", "unit", "confidence", "explanation", "methodology"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorization_schema_lists_every_category() {
        let schema = categorization_schema();
        let categories = schema["properties"]["category"]["enum"].as_array().unwrap();
        assert_eq!(categories.len(), ItemCategory::ALL.len());
        assert!(categories.iter().any(|c| c == "Sports & Outdoors"));

        let conditions = schema["properties"]["condition"]["enum"].as_array().unwrap();
        assert!(!conditions.iter().any(|c| c == "Unknown"));
    }

    #[test]
    fn test_co2_schema_requires_savings() {
        let schema = co2_estimate_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|field| field == "co2_savings"));
    }
}
