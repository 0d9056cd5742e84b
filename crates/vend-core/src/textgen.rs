//! Text-generation adapter.
//!
//! Wraps one chat-completion call against an OpenAI-compatible endpoint.
//! No retry, no streaming, no rate limiting. Nothing in the HTTP surface
//! calls it yet; the server only constructs it when an API key is set.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Context;
use crate::error::CoreError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Anything that turns a prompt (plus optional context text) into generated
/// text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, context: Option<&str>) -> Result<String, CoreError>;
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ── OpenAiGenerator ──────────────────────────────────────────────────────────

/// Chat-completion client for OpenAI and compatible servers.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CoreError> {
        Self::with_timeout(api_key, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::ExternalService(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout,
        })
    }

    /// Point at another OpenAI-compatible server (`…/v1`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str, context: Option<&str>) -> Result<String, CoreError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(context) = context {
            messages.push(ChatMessage { role: "system", content: context });
        }
        messages.push(ChatMessage { role: "user", content: prompt });
        let body = ChatRequest { model: &self.model, messages, temperature: DEFAULT_TEMPERATURE };

        debug!(model = %self.model, prompt_len = prompt.len(), has_context = context.is_some(), "text generation request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            warn!(%status, detail = %detail, "text generation rejected");
            return Err(CoreError::ExternalService(format!("{status}: {detail}")));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| self.transport_error(e))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CoreError::ExternalService("resposta sem conteúdo".to_owned()))
    }
}

impl OpenAiGenerator {
    fn transport_error(&self, e: reqwest::Error) -> CoreError {
        if e.is_timeout() {
            CoreError::Timeout { operation: "text_generation", after: self.timeout }
        } else {
            CoreError::ExternalService(e.to_string())
        }
    }
}

/// System text describing a context: description, period and members.
pub fn context_block(context: &Context) -> String {
    let day = |d: Option<chrono::DateTime<chrono::Utc>>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "indefinido".to_owned())
    };
    let mut block = format!(
        "Contexto: {}\nPeríodo: {} até {}\nPessoas envolvidas:\n",
        context.description,
        day(context.start_date),
        day(context.end_date),
    );
    for person in &context.people {
        block.push_str(&format!("- {} ({})\n", person.name, person.email));
    }
    block
}

// ── Tests ──────────────────────────────────────────────────────────────────────
