#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeImageInput {
    /// Base64 payload, optionally prefixed with a `data:` URL header.
    pub image_base64: String,
    pub task: String,
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeTextInput {
    pub text: String,
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EstimateCo2Input {
    pub category: String,
    pub condition: String,
    pub title: Option<String>,
    pub description: Option<String>,
}
