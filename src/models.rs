use serde::{Deserialize, Serialize};

use crate::quiz::{Difficulty, QuizQuestion};

fn default_count() -> u32 {
    crate::quiz::MIN_QUESTIONS
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionApiRequest {
    pub image_base64: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CaptionApiResponse {
    pub caption: String,
}

#[derive(Debug, Deserialize)]
pub struct QuizApiRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_count")]
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct QuizApiResponse {
    pub questions: Vec<QuizQuestion>,
}
