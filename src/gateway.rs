use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ServiceError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Binary payload sent alongside a prompt as a Gemini inline-data part.
#[derive(Debug, Clone)]
pub struct InlineMedia {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Single-attempt access to a generative-language model: one prompt in, the
/// model's text out. Services depend on this trait so tests can script the
/// model's side of the conversation.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(
        &self,
        prompt: &str,
        media: Option<InlineMedia>,
    ) -> Result<String, ServiceError>;
}

// ── Gemini wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

/// Untagged union of text and inline media parts. Variant order matters for
/// `#[serde(untagged)]` decoding.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

// ── Gemini gateway ───────────────────────────────────────────────────────────

/// Calls Gemini's `generateContent` endpoint. No retries, no streaming; the
/// caller decides how to surface a failure.
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGateway {
    /// `model` is the bare model ID (for example `gemini-2.0-flash`); a
    /// `models/` prefix is stripped if present.
    pub fn new(api_key: String, model: String) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn build_request(prompt: &str, media: Option<InlineMedia>) -> GenerateContentRequest {
        let mut parts = Vec::new();
        if let Some(media) = media {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: media.mime_type,
                    data: base64::engine::general_purpose::STANDARD.encode(media.data),
                },
            });
        }
        parts.push(Part::Text {
            text: prompt.to_string(),
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        }
    }

    fn extract_text(response: GenerateContentResponse) -> Option<String> {
        response.candidates.into_iter().next().and_then(|c| {
            c.content.parts.into_iter().find_map(|p| match p {
                Part::Text { text } => Some(text),
                Part::InlineData { .. } => None,
            })
        })
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn invoke(
        &self,
        prompt: &str,
        media: Option<InlineMedia>,
    ) -> Result<String, ServiceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = Self::build_request(prompt, media);

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to reach the Gemini API");
                ServiceError::Upstream(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "Gemini API returned an error");
            return Err(ServiceError::Upstream(format!(
                "Gemini API error (status {}): {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "unrecognized Gemini response envelope");
            ServiceError::Upstream(format!("unrecognized Gemini response: {}", e))
        })?;

        Self::extract_text(parsed)
            .ok_or_else(|| ServiceError::Upstream("no text in model response".to_string()))
    }
}

// ── Test double ──────────────────────────────────────────────────────────────

#[cfg(test)]
pub mod test_support {
    use super::{InlineMedia, ModelGateway};
    use crate::error::ServiceError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every invocation and replays a scripted response.
    pub struct ScriptedGateway {
        response: Result<String, ServiceError>,
        pub calls: Mutex<Vec<(String, Option<InlineMedia>)>>,
    }

    impl ScriptedGateway {
        pub fn replying(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(error: ServiceError) -> Self {
            Self {
                response: Err(error),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn last_prompt(&self) -> String {
            self.calls
                .lock()
                .unwrap()
                .last()
                .map(|(prompt, _)| prompt.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn invoke(
            &self,
            prompt: &str,
            media: Option<InlineMedia>,
        ) -> Result<String, ServiceError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), media));
            self.response.clone()
        }
    }
}
