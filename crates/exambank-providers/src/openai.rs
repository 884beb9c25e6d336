//! OpenAI chat-completions drafting backend.

use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use exambank_core::model::ChoiceLabel;
use exambank_core::traits::{DraftRequest, QuestionDraft, QuestionDrafter};

use crate::error::DrafterError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const SYSTEM_PROMPT: &str = "You are an exam item writer for a building-accessibility certification. \
Respond ONLY with a JSON object of the form \
{\"stem\": string, \"options\": [string, string, string, string], \"correct\": \"A\"|\"B\"|\"C\"|\"D\", \"explanation\": string}. \
No markdown, no prose outside the JSON.";

/// OpenAI-compatible chat-completions drafter.
pub struct OpenAiDrafter {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiDrafter {
    pub fn new(api_key: &str, base_url: Option<String>, model: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        }
    }
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<OpenAiMessage>,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    content: String,
}

/// Shape the model is asked to return.
#[derive(Deserialize)]
struct DraftPayload {
    stem: String,
    options: Vec<String>,
    correct: String,
    #[serde(default)]
    explanation: String,
}

fn build_prompt(request: &DraftRequest) -> String {
    let mut prompt = format!(
        "Write one {} multiple-choice question.\n\
         Difficulty: {}\n\
         Category: {} ({})\n\
         Topic: {}\n",
        request.exam_type, request.difficulty, request.category_code, request.category_label,
        request.topic,
    );
    if !request.reference_snippets.is_empty() {
        prompt.push_str("\nGround the question in these source excerpts:\n");
        for snippet in &request.reference_snippets {
            prompt.push_str(&format!("---\n{snippet}\n"));
        }
    }
    if !request.reference_questions.is_empty() {
        prompt.push_str("\nMatch the style of these existing questions:\n");
        for q in &request.reference_questions {
            prompt.push_str(&format!("- {}\n", q.text));
        }
    }
    prompt
}

/// Strip a markdown code fence if the model wrapped its JSON in one.
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim();
        }
    }
    trimmed
}

fn parse_draft(content: &str) -> Result<QuestionDraft, DrafterError> {
    let payload: DraftPayload = serde_json::from_str(extract_json(content))
        .map_err(|e| DrafterError::MalformedDraft(format!("invalid JSON: {e}")))?;

    let options: [String; 4] = payload
        .options
        .try_into()
        .map_err(|v: Vec<String>| {
            DrafterError::MalformedDraft(format!("expected 4 options, got {}", v.len()))
        })?;
    let correct = ChoiceLabel::from_str(&payload.correct)
        .map_err(DrafterError::MalformedDraft)?;
    if payload.stem.trim().is_empty() {
        return Err(DrafterError::MalformedDraft("empty stem".into()));
    }

    Ok(QuestionDraft {
        stem: payload.stem,
        options,
        correct,
        explanation: payload.explanation,
    })
}

#[async_trait]
impl QuestionDrafter for OpenAiDrafter {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(category = %request.category_code, difficulty = %request.difficulty))]
    async fn draft(&self, request: &DraftRequest) -> anyhow::Result<QuestionDraft> {
        let start = Instant::now();

        let body = OpenAiRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            temperature: 0.7,
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: build_prompt(request),
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DrafterError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    DrafterError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(DrafterError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(DrafterError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(DrafterError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let api_response: OpenAiResponse = response.json().await.map_err(|e| {
            DrafterError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let content = api_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();
        let draft = parse_draft(&content)?;

        tracing::debug!(latency_ms = start.elapsed().as_millis() as u64, "draft received");
        Ok(draft)
    }
}
