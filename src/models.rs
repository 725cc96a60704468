use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub generated_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub classifier: String,
    pub generator: String,
}
