/// LLM client: the single point of entry for DeepSeek calls in the review API.
///
/// Talks to the OpenAI-compatible chat completions endpoint. One attempt per
/// call; a failed call surfaces as `LLM_CALL_FAILED` to the uploader.
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

pub mod prompts;

const TEMPERATURE: f32 = 0.1;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("DEEPSEEK_API_KEY is not set")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM JSON missing keys: {0:?}")]
    MissingKeys(Vec<String>),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .context("Failed to build HTTP client")?,
            api_key: config.deepseek_api_key.clone(),
            base_url: config.deepseek_base_url.trim_end_matches('/').to_string(),
            model: config.deepseek_model.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one system + user exchange and returns the assistant's text.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            stream: false,
        };

        info!(
            "Calling DeepSeek model={}, prompt_chars={}",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("DeepSeek API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    /// Calls the model with the review prompt and returns the parsed JSON
    /// object, which is guaranteed to carry `scores` and `reviews` keys.
    pub async fn review_json(&self, paper_text: &str) -> Result<Value, LlmError> {
        let prompt = prompts::build_review_prompt(paper_text);
        let content = self.call(&prompt, prompts::REVIEW_SYSTEM).await?;
        parse_review_json(&content)
    }
}

fn parse_review_json(content: &str) -> Result<Value, LlmError> {
    let sanitized = sanitize_llm_json(content);
    let parsed: Value = serde_json::from_str(sanitized).map_err(|e| {
        let head: String = sanitized.chars().take(200).collect();
        warn!("JSON parse failed after sanitize: {e}; content_head={head}");
        LlmError::Parse(e)
    })?;

    let missing: Vec<String> = ["scores", "reviews"]
        .into_iter()
        .filter(|key| parsed.get(key).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(LlmError::MissingKeys(missing));
    }

    Ok(parsed)
}

/// Normalizes model output to a bare JSON object: prefers the contents of a
/// ``` fence, drops `json:` / `response:` / `output:` labels, and otherwise
/// clips to the outermost braces.
fn sanitize_llm_json(content: &str) -> &str {
    let mut text = content.trim();

    if let Some(fenced) = fenced_block(text) {
        debug!("Sanitize: removed Markdown code fence from LLM content");
        text = fenced;
    }

    text = strip_label(text);

    if !text.starts_with('{') || !text.ends_with('}') {
        if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
            if end > start {
                debug!("Sanitize: clipped to JSON braces segment");
                text = &text[start..=end];
            }
        }
    }

    text
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    let close = after_open.find("```")?;
    let inner = &after_open[..close];
    let inner = match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &inner[4..],
        _ => inner,
    };
    Some(inner.trim())
}

fn strip_label(text: &str) -> &str {
    for label in ["json", "response", "output"] {
        let matches_label = text
            .get(..label.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(label));
        if matches_label {
            let rest = text[label.len()..].trim_start();
            if let Some(rest) = rest.strip_prefix(':') {
                return rest.trim_start();
            }
        }
    }
    text
}
