//! Gemini `generateContent` client for planning suggestions and vows help.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use wedplan_core::model::Task;
use wedplan_core::suggestion::{Suggestion, parse_suggestions, suggestion_prompt, vows_prompt};
use wedplan_core::{WeddingError, WeddingResult};

const GEMINI_API: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        GeminiClient {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Ask which items the plan is missing. A reply that cannot be read as
    /// suggestions yields an empty list; transport failures are errors.
    pub async fn suggest(&self, tasks: &[Task], theme: &str) -> WeddingResult<Vec<Suggestion>> {
        let request = generate_request(&suggestion_prompt(tasks, theme), Some(suggestion_schema()));
        let text = self.generate(request).await.map_err(remote_error)?;
        Ok(parse_suggestions(&text))
    }

    /// Draft or polish the vows in the requested tone.
    pub async fn help_with_vows(&self, current_vows: &str, tone: &str) -> WeddingResult<String> {
        let request = generate_request(&vows_prompt(current_vows, tone), None);
        let text = self.generate(request).await.map_err(remote_error)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(WeddingError::Remote("Gemini returned an empty reply".into()));
        }
        Ok(text.to_string())
    }

    async fn generate(&self, request: Value) -> Result<String> {
        let mut url = Url::parse(GEMINI_API).context("Invalid Gemini base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Gemini base URL cannot have path segments"))?
            .extend(["models", &format!("{}:generateContent", self.model)]);

        debug!(model = %self.model, "calling Gemini");
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini returned {status}: {error_text}");
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;
        Ok(body.text())
    }
}

fn remote_error(e: anyhow::Error) -> WeddingError {
    WeddingError::Remote(format!("{e:#}"))
}

fn generate_request(prompt: &str, schema: Option<Value>) -> Value {
    let mut request = json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
    });
    if let Some(schema) = schema {
        request["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        });
    }
    request
}

/// Array of `{title, category, reason}`, all required.
fn suggestion_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "category": { "type": "STRING" },
                "reason": { "type": "STRING" },
            },
            "required": ["title", "category", "reason"],
        },
    })
}
