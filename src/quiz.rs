use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::gateway::ModelGateway;

// ── Constants ────────────────────────────────────────────────────────────────

pub const MIN_QUESTIONS: u32 = 5;
pub const MAX_QUESTIONS: u32 = 12;

/// First `[` through the last `]`, newlines included. Deliberately greedy so
/// nested arrays inside the question records stay inside the match. Known
/// limitation: unrelated brackets on either side of the real array widen the
/// span and the parse step rejects it.
static JSON_ARRAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

// ── Data model ───────────────────────────────────────────────────────────────

/// One multiple-choice question as produced by the model.
///
/// Parsing is deliberately lenient: records with missing fields, more or
/// fewer than 4 options, or an out-of-range `correct_answer` are preserved
/// as-is. Consumers compare indices by equality only and never index
/// `options` with `correct_answer` unchecked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

/// Generation parameters. `count` must already be clamped to
/// `[MIN_QUESTIONS, MAX_QUESTIONS]` by the caller; it is passed through
/// literally into the prompt.
#[derive(Debug, Clone)]
pub struct QuizRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub count: u32,
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Generates a list of multiple-choice questions for the given topic.
pub async fn generate_questions(
    gateway: &dyn ModelGateway,
    request: QuizRequest,
) -> Result<Vec<QuizQuestion>, ServiceError> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(ServiceError::Validation("topic is required".to_string()));
    }

    tracing::info!(
        topic,
        difficulty = request.difficulty.as_str(),
        count = request.count,
        "generating quiz questions"
    );

    let prompt = build_prompt(topic, request.difficulty, request.count);
    let response = gateway.invoke(&prompt, None).await?;

    let questions = parse_questions(&response)?;
    if questions.is_empty() {
        return Err(ServiceError::EmptyResult(
            "no questions generated".to_string(),
        ));
    }

    tracing::info!(count = questions.len(), "quiz questions generated");
    Ok(questions)
}

fn build_prompt(topic: &str, difficulty: Difficulty, count: u32) -> String {
    format!(
        r#"Generate {count} multiple-choice quiz questions about "{topic}" at {difficulty} difficulty level.

Format each question as JSON with this structure:
{{
  "question": "Question text",
  "options": ["Option A", "Option B", "Option C", "Option D"],
  "correctAnswer": 0,
  "explanation": "Why this is correct"
}}

Return only a JSON array of questions, no other text."#,
        count = count,
        topic = topic,
        difficulty = difficulty.as_str(),
    )
}

// ── Extraction ───────────────────────────────────────────────────────────────

/// Best-effort lift of a JSON array out of free text: the span from the
/// first `[` to the last `]`. Returns `None` when no such span exists.
pub fn extract_json_array(text: &str) -> Option<&str> {
    JSON_ARRAY_RE.find(text).map(|m| m.as_str())
}

/// No bracketed span means the model produced nothing usable, which callers
/// treat as an empty list. A span that is not valid JSON is a `Parse` error.
fn parse_questions(response: &str) -> Result<Vec<QuizQuestion>, ServiceError> {
    let Some(raw) = extract_json_array(response) else {
        return Ok(Vec::new());
    };

    serde_json::from_str(raw).map_err(|e| {
        tracing::error!(error = %e, "model output was not a parseable question array");
        ServiceError::Parse(e.to_string())
    })
}
